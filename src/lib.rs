pub mod aggregate;
pub mod clean;
pub mod cli;
pub mod country;
pub mod data;
pub mod dimensions;
pub mod impute;
pub mod io_utils;
pub mod pipeline;
pub mod rows;
pub mod schema;
pub mod sink;
pub mod source;
pub mod table;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("met_etl", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => pipeline::execute(&args),
        Commands::Clean(args) => clean::execute(&args),
        Commands::Schema(args) => handle_schema(&args),
    }
}

fn handle_schema(args: &cli::SchemaArgs) -> Result<()> {
    let schema = schema::Schema::met_objects();
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            schema
                .save(path)
                .with_context(|| format!("Writing schema to {path:?}"))?;
            info!(
                "Wrote schema with {} column(s) to {:?}",
                schema.columns.len(),
                path
            );
        }
        _ => {
            let yaml = schema.to_yaml_string()?;
            std::io::stdout()
                .write_all(yaml.as_bytes())
                .context("Writing schema to stdout")?;
        }
    }
    Ok(())
}
