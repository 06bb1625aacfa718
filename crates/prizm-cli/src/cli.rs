use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use prizm_domain::ImportSource;
use prizm_import::CanonicalField;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "prizm")]
#[command(about = "Detect and import Trello, Jira, Asana and CSV exports as PrizmAI boards", long_about = None)]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PRIZM_BUILD_COMMIT"), ")"))]
pub struct Cli {
    /// Config file (defaults to the platform config dir, or set PRIZM_CONFIG)
    #[arg(long, global = true, value_name = "FILE", env = "PRIZM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report which format a file looks like
    Detect(DetectArgs),
    /// Import a file and print the normalized board
    Import(ImportArgs),
    /// List supported import formats
    Formats,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct DetectArgs {
    /// Export file to inspect
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Export file to import
    pub file: PathBuf,

    /// Skip detection and use this format (native, trello, jira, asana, csv)
    #[arg(long, short)]
    pub format: Option<ImportSource>,

    /// JSON array of platform users to match assignees against
    #[arg(long, value_name = "USERS.json")]
    pub users: Option<PathBuf>,

    /// Only match users belonging to this organization
    #[arg(long, requires = "users")]
    pub organization: Option<Uuid>,

    /// Map a CSV header to a field, e.g. --map "Ticket=title"
    #[arg(long = "map", value_name = "HEADER=FIELD", value_parser = parse_mapping)]
    pub mappings: Vec<(String, CanonicalField)>,

    /// Also write the result in PrizmAI's native export format
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn parse_mapping(value: &str) -> Result<(String, CanonicalField), String> {
    let (header, field) = value
        .split_once('=')
        .ok_or_else(|| format!("expected HEADER=FIELD, got '{}'", value))?;
    if header.trim().is_empty() {
        return Err("header must not be empty".to_string());
    }
    let field = field.parse::<CanonicalField>().map_err(|e| e.to_string())?;
    Ok((header.trim().to_string(), field))
}
