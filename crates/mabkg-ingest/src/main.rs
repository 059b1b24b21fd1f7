//! MABKG Ingest - antibody table to relation documents

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mabkg_common::logging::{init_logging, LogConfig, LogLevel};
use mabkg_ingest::config::{AntibodyKey, IngestConfig};
use mabkg_ingest::enrich::HttpDiseaseLookup;
use mabkg_ingest::pipeline::{write_output, Pipeline};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mabkg-ingest")]
#[command(author, version, about = "Antibody knowledge-graph ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a table into relation documents
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Merge documents that share an _id
        #[arg(long)]
        dedup: bool,

        /// Antibody column used in document ids: name or uid
        #[arg(long)]
        antibody_key: Option<AntibodyKey>,

        /// Fill disease names from the enrichment service
        #[arg(long)]
        enrich: bool,

        /// Enrichment service base URL
        #[arg(long, env = "MABKG_ENRICH_URL")]
        enrich_url: Option<String>,
    },

    /// Read and validate a table without converting it
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Input table
    #[arg(short, long)]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Field delimiter: tab, comma, or a single character
    #[arg(short, long)]
    delimiter: Option<String>,
}

impl SourceArgs {
    /// File, then environment, then flags
    fn load_config(&self) -> Result<IngestConfig> {
        let config = match &self.config {
            Some(path) => IngestConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => IngestConfig::default(),
        };
        let mut config = config.merge_env()?;

        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("mabkg-ingest")
        .build()
        .merge_env()?;

    init_logging(&log_config)?;

    match cli.command {
        Command::Convert {
            source,
            output,
            dedup,
            antibody_key,
            enrich,
            enrich_url,
        } => {
            let mut config = source.load_config()?;
            config.dedup.enabled |= dedup;
            if let Some(key) = antibody_key {
                config.dedup.antibody_key = key;
            }
            config.enrichment.enabled |= enrich;
            if let Some(url) = enrich_url {
                config.enrichment.base_url = url;
            }

            let pipeline = Pipeline::new(config)?;
            let mut result = pipeline.run_path(&source.input)?;

            if pipeline.config().enrichment.enabled {
                let lookup = HttpDiseaseLookup::new(&pipeline.config().enrichment)?;
                pipeline.enrich(&mut result, &lookup).await;
            }

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_output(BufWriter::new(file), &result.documents)?;
                    info!(
                        path = %path.display(),
                        documents = result.documents.len(),
                        "Wrote documents"
                    );
                },
                None => write_output(std::io::stdout().lock(), &result.documents)?,
            }
        },
        Command::Check { source } => {
            let pipeline = Pipeline::new(source.load_config()?)?;
            let stats = pipeline.check_path(&source.input)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        },
    }

    Ok(())
}
