//! Connection parameters for PostgreSQL pools.
//!
//! The dialect itself never connects; these parameters are handed to whatever
//! provisions the pool, either as a URL or as [`PgConnectOptions`].

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use url::Url;

use crate::error::{DialectError, Result};

/// Default PostgreSQL port.
pub const DEFAULT_PORT: u16 = 5432;

/// Default host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default database name.
pub const DEFAULT_DATABASE: &str = "postgres";

/// Default user name.
pub const DEFAULT_USERNAME: &str = "postgres";

/// URL scheme used for connection strings.
pub const URL_SCHEME: &str = "postgresql";

const JDBC_PREFIX: &str = "jdbc:postgresql:";

/// Host, port, database and credentials of a PostgreSQL server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParameters {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database name.
    pub database: String,
    /// User name.
    pub username: String,
    /// Password, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: None,
        }
    }
}

impl ConnectionParameters {
    /// Creates parameters with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the database.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = username.into();
        self.password = password;
        self
    }

    /// Returns the connection URL, without credentials.
    #[must_use]
    pub fn to_url(&self) -> String {
        format!(
            "{URL_SCHEME}://{}:{}/{}",
            self.host, self.port, self.database
        )
    }

    /// Parses a `postgresql://`, `postgres://` or `jdbc:postgresql:` URL.
    ///
    /// Parts missing from the URL keep their defaults; the environment is
    /// never consulted. Credentials are only taken from the URL when it
    /// carries them, the password never is.
    pub fn from_url(url: &str) -> Result<Self> {
        let url = url.trim();
        let normalized = match url.strip_prefix(JDBC_PREFIX) {
            Some(rest) => format!("{URL_SCHEME}:{rest}"),
            None => url.to_string(),
        };
        let parsed =
            Url::parse(&normalized).map_err(|e| DialectError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "postgresql" | "postgres") {
            return Err(DialectError::InvalidUrl(url.to_string()));
        }

        let mut params = Self::default();
        if let Some(host) = parsed.host_str().filter(|host| !host.is_empty()) {
            params.host = host.to_string();
        }
        if let Some(port) = parsed.port() {
            params.port = port;
        }
        let database = parsed.path().trim_start_matches('/');
        if !database.is_empty() {
            params.database = database.to_string();
        }
        if !parsed.username().is_empty() {
            params.username = parsed.username().to_string();
        }
        Ok(params)
    }

    /// Builds sqlx connect options for pool provisioning.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username);
        match self.password {
            Some(ref password) => options.password(password),
            None => options,
        }
    }
}
