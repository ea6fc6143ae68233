use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean museum-object exports and summarize them by country",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate, clean and aggregate an export into four summary tables
    Run(RunArgs),
    /// Write the cleaned record set (parsed dimensions, country keys, imputed ids)
    Clean(CleanArgs),
    /// Write the built-in MetObjects schema as YAML
    Schema(SchemaArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Input export file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Schema YAML overriding the built-in MetObjects layout
    #[arg(short = 's', long = "schema")]
    pub schema: Option<PathBuf>,
    /// Input delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Directory receiving table1.csv .. table4.csv and manifest.json
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: PathBuf,
    /// Delimiter for the written tables (defaults to comma)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Also print each table to stdout as an aligned text table
    #[arg(long)]
    pub preview: bool,
    /// Maximum rows per table shown by --preview
    #[arg(long = "preview-rows", default_value_t = 10)]
    pub preview_rows: usize,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Output file for the cleaned records (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter for the output (defaults to the input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("pipe"), Ok(b'|'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn run_arguments_parse_with_flattened_input() {
        let cli = Cli::try_parse_from([
            "met-etl",
            "run",
            "-i",
            "MetObjects.txt",
            "-o",
            "data",
            "--delimiter",
            "tab",
            "--preview",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.source.input, PathBuf::from("MetObjects.txt"));
                assert_eq!(args.source.delimiter, Some(b'\t'));
                assert_eq!(args.output_dir, PathBuf::from("data"));
                assert!(args.preview);
                assert_eq!(args.preview_rows, 10);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
