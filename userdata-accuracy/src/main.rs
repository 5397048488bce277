//! userdata-accuracy - Accuracy classification for user data records
//!
//! Stores submissions, rescores comparison groups and publishes the payload
//! schemas used to validate them.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use userdata_accuracy::{Classifier, ScoringService};
use userdata_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use userdata_common::db::{init_database, RecordRepository};
use userdata_common::{uuid_utils, Category};
use uuid::Uuid;

/// Command-line arguments for userdata-accuracy
#[derive(Parser, Debug)]
#[command(name = "userdata-accuracy")]
#[command(about = "Accuracy classification for user data records")]
#[command(version)]
struct Args {
    /// Root folder holding the database
    #[arg(short, long, env = "USERDATA_ROOT_FOLDER", global = true)]
    root_folder: Option<PathBuf>,

    /// Explicit TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a new record and rescore its comparison group
    Submit {
        #[arg(long, value_parser = parse_owner)]
        owner: Uuid,
        #[arg(long, value_parser = parse_category)]
        category: Category,
        /// Record payload as a JSON object
        #[arg(long)]
        payload: String,
    },

    /// Recompute every score of an existing comparison group
    Rescore {
        #[arg(long, value_parser = parse_owner)]
        owner: Uuid,
        #[arg(long, value_parser = parse_category)]
        category: Category,
    },

    /// Print the payload schema and weights published for a category
    Schema {
        #[arg(long, value_parser = parse_category)]
        category: Category,
    },
}

fn parse_owner(s: &str) -> std::result::Result<Uuid, String> {
    uuid_utils::parse(s).map_err(|e| e.to_string())
}

fn parse_category(s: &str) -> std::result::Result<Category, String> {
    Category::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = Category::all_variants()
            .iter()
            .map(|c| c.to_db_string())
            .collect();
        format!("unknown category '{}' (expected one of {})", s, known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        root_folder,
        config: config_path,
        command,
    } = Args::parse();
    let config = TomlConfig::load_or_default(config_path.as_deref());

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting userdata-accuracy v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match command {
        Command::Schema { category } => return print_schema(category, &config),
        Command::Submit {
            owner,
            category,
            payload,
        } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("Payload is not valid JSON")?;
            open_service(root_folder, &config)
                .await?
                .submit(owner, category, payload)
                .await
                .context("Submission failed")?
        }
        Command::Rescore { owner, category } => open_service(root_folder, &config)
            .await?
            .rescore(owner, category)
            .await
            .context("Rescore failed")?,
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Resolve the root folder, open the database and build the scoring service
async fn open_service(root_folder: Option<PathBuf>, config: &TomlConfig) -> Result<ScoringService> {
    let root_folder = RootFolderResolver::new()
        .with_cli_arg(root_folder)
        .with_config(config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    Ok(ScoringService::new(RecordRepository::new(pool), &config.scoring))
}

fn print_schema(category: Category, config: &TomlConfig) -> Result<()> {
    let classifier = Classifier::new(&config.scoring);
    let (Some(schema), Some(weights)) = (
        classifier.schema_for(category),
        classifier.weights_for(category),
    ) else {
        bail!("Category {} has no accuracy model", category);
    };

    let published = serde_json::json!({
        "category": category,
        "schema": schema,
        "weights": weights,
    });
    println!("{}", serde_json::to_string_pretty(&published)?);
    Ok(())
}
