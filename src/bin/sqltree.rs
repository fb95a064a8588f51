//! sqltree: render condition trees from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Render a WHERE clause for PostgreSQL
//! sqltree -d postgresql conditions '{"age": {">": 18}}' --prepend WHERE
//!
//! # Render a column definition
//! sqltree -d mysql column '{"name": "title", "type": "string", "null": false}'
//!
//! # Read the tree from stdin
//! echo '[{"a": 1}, {":or": [{"b": 2}, {"c": 3}]}]' | sqltree conditions -
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde_json::Value;
use sqltree::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqltree")]
#[command(version)]
#[command(about = "Render JSON condition trees into dialect-correct SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqltree conditions '{\"id\": [1, 2, 3]}'
    sqltree -d mysql names '[\"users.id\", {\"name\": \"n\"}]'
    sqltree -d sqlite mapped '{\"use\": \"decimal\", \"precision\": 2}'")]
struct Cli {
    /// Config file (defaults to ./sqltree.toml, then the user config dir)
    #[arg(short, long, env = "SQLTREE_CONFIG")]
    config: Option<PathBuf>,

    /// Dialect, overriding the config file
    #[arg(short, long, env = "SQLTREE_DIALECT")]
    dialect: Option<DialectKind>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "sql")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Sql,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a condition tree
    Conditions {
        /// JSON tree, or `-` for stdin
        tree: String,
        /// Keyword put in front of a non-empty result, e.g. WHERE
        #[arg(long)]
        prepend: Option<String>,
        /// Operator joining the top-level operands
        #[arg(long, default_value = ":and")]
        operator: String,
    },
    /// Render an identifier list
    Names {
        /// JSON name, list or `{name: alias}` map, or `-` for stdin
        names: String,
    },
    /// Render a column definition
    Column {
        /// JSON column descriptor, or `-` for stdin
        descriptor: String,
    },
    /// Render a table constraint
    Constraint {
        /// Template name: primary, unique, foreign key, check, index
        kind: String,
        /// JSON constraint descriptor, or `-` for stdin
        descriptor: String,
    },
    /// Resolve a native column type to its abstract type
    Mapped {
        /// Native type name or JSON column map with `use`
        column: String,
    },
    /// List the abstract column types of the dialect
    Types,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sqltree=debug" } else { "sqltree=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::discover()?,
    };
    if let Some(kind) = cli.dialect {
        config.dialect = Some(kind.id().to_string());
    }
    let dialect = config.dialect()?;

    if cli.verbose {
        eprintln!("{} {}", "Dialect:".dimmed(), dialect.kind().to_string().cyan());
    }

    match &cli.command {
        Commands::Conditions {
            tree,
            prepend,
            operator,
        } => {
            let tree = read_json(tree)?;
            let mut options = ConditionOptions::new()
                .operator(operator)
                .aliases(&config.aliases);
            if let Some(keyword) = prepend {
                options = options.prepend(keyword);
            }
            emit(cli.format, dialect.conditions(&tree, &options)?);
        }
        Commands::Names { names } => {
            let names = read_json(names)?;
            emit(cli.format, dialect.names(&names, Some(&config.aliases))?);
        }
        Commands::Column { descriptor } => {
            let def = ColumnDef::from_value(&read_json(descriptor)?)?;
            emit(cli.format, dialect.column(&def)?);
        }
        Commands::Constraint { kind, descriptor } => {
            let constraint = Constraint::from_value(&read_json(descriptor)?)?;
            let options = ConditionOptions::new().aliases(&config.aliases);
            emit(cli.format, dialect.constraint(kind, &constraint, &options)?);
        }
        Commands::Mapped { column } => {
            let column = serde_json::from_str(column).unwrap_or_else(|_| Value::String(column.clone()));
            emit(cli.format, dialect.mapped(&column)?);
        }
        Commands::Types => show_types(cli.format, &dialect)?,
    }
    Ok(())
}

/// Parse a JSON argument; `-` reads stdin.
fn read_json(arg: &str) -> Result<Value> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}

fn emit(format: OutputFormat, sql: String) {
    match format {
        OutputFormat::Sql => println!("{}", sql),
        OutputFormat::Json => println!("{}", serde_json::json!({ ":plain": sql })),
    }
}

fn show_types(format: OutputFormat, dialect: &Dialect) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let types: serde_json::Map<String, Value> = dialect
                .types()
                .map(|(name, def)| Ok((name.to_string(), serde_json::to_value(def)?)))
                .collect::<Result<_, serde_json::Error>>()?;
            println!("{}", serde_json::to_string_pretty(&types)?);
        }
        OutputFormat::Sql => {
            println!("{}", format!("{} column types", dialect.kind()).cyan().bold());
            let width = dialect.types().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, def) in dialect.types() {
                println!("  {}  {}", format!("{:width$}", name, width = width).yellow(), def);
            }
        }
    }
    Ok(())
}
