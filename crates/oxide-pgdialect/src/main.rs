//! oxide-pgdialect CLI
//!
//! Command-line tool printing the SQL the PostgreSQL dialect generates.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use oxide_pgdialect::prelude::*;

/// PostgreSQL dialect rules for schema-driven SQL.
#[derive(Parser)]
#[command(name = "oxide-pgdialect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the DDL creating a table.
    Create {
        /// JSON file holding an array of schema definitions.
        #[arg(short, long)]
        schemas: PathBuf,

        /// Schema to generate the table for.
        #[arg(short, long)]
        table: String,

        /// Print the table on a single line.
        #[arg(long)]
        compact: bool,
    },

    /// Print an INSERT statement for a record.
    Insert {
        /// JSON file holding an array of schema definitions.
        #[arg(short, long)]
        schemas: PathBuf,

        /// Schema the record belongs to.
        #[arg(short, long)]
        table: String,

        /// JSON file holding the record as an object.
        #[arg(short, long)]
        record: PathBuf,

        /// Print the statement on a single line.
        #[arg(long)]
        compact: bool,
    },

    /// Rewrite the named parameters of a query.
    Rewrite {
        /// JSON file holding an array of schema definitions.
        #[arg(short, long)]
        schemas: PathBuf,

        /// Schema describing the query parameters.
        #[arg(short, long)]
        table: String,

        /// Query template.
        #[arg(short, long)]
        query: String,
    },

    /// Add pagination to a query.
    Limit {
        /// Query to paginate.
        #[arg(short, long)]
        query: String,

        /// Rows to skip.
        #[arg(long)]
        offset: Option<u64>,

        /// Maximum number of rows.
        #[arg(long)]
        limit: Option<u32>,

        /// Print the row counting query instead.
        #[arg(long)]
        count: bool,
    },

    /// Show the connection parameters of a database URL.
    Url {
        /// Database URL (postgresql://, postgres:// or jdbc:postgresql:).
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
}

fn load_registry(path: &Path) -> anyhow::Result<SchemaRegistry> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schemas from {}", path.display()))?;
    let registry = SchemaRegistry::from_json(&json)
        .with_context(|| format!("Invalid schemas in {}", path.display()))?;
    debug!(path = %path.display(), schemas = registry.len(), "Loaded schemas");
    Ok(registry)
}

fn find_schema<'a>(
    registry: &'a SchemaRegistry,
    name: &str,
) -> anyhow::Result<&'a SchemaDefinition> {
    match registry.resolve(name) {
        Some(schema) => Ok(schema),
        None => bail!("Unknown schema '{name}'"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, generated SQL to stdout.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dialect = PostgresDialect::new();

    match cli.command {
        Commands::Create {
            schemas,
            table,
            compact,
        } => {
            let registry = load_registry(&schemas)?;
            let schema = find_schema(&registry, &table)?;
            print!("{}", dialect.create_sql(schema, &registry, compact)?);
        }

        Commands::Insert {
            schemas,
            table,
            record,
            compact,
        } => {
            let registry = load_registry(&schemas)?;
            let schema = find_schema(&registry, &table)?.inherit_key(&registry)?;
            let json = std::fs::read_to_string(&record)
                .with_context(|| format!("Failed to read record from {}", record.display()))?;
            let record = Record::from_json(&json)?;
            println!("{}", dialect.insert_sql(&schema, &record, compact)?);
        }

        Commands::Rewrite {
            schemas,
            table,
            query,
        } => {
            let registry = load_registry(&schemas)?;
            let schema = find_schema(&registry, &table)?;
            println!("{}", dialect.rewrite(&query, schema));
        }

        Commands::Limit {
            query,
            offset,
            limit,
            count,
        } => {
            if count {
                println!("{}", dialect.total_count_query(&query));
            } else {
                println!("{}", dialect.limit(&query, offset, limit));
            }
        }

        Commands::Url { database_url } => {
            let params = match database_url {
                Some(url) => ConnectionParameters::from_url(&url)?,
                None => ConnectionParameters::new(),
            };
            println!("{}", params.to_url());
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
    }

    Ok(())
}
