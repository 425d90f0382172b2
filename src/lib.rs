//! The `jpq` command line: evaluates one path against one JSON document.
mod error;

pub use error::CliError;

use clap::Parser;
use jpq_jpath::JsonPath;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Select values from a JSON document with a path expression", long_about = None)]
pub struct Args {
    /// Path expression, e.g. `$.store.book[?(@.price < 10)].title`
    pub path: String,

    /// JSON document to read; standard input when omitted or `-`
    pub file: Option<PathBuf>,

    /// Fail when a step cannot resolve instead of skipping it
    #[arg(short, long, env = "JPQ_STRICT")]
    pub strict: bool,

    /// Require at most one match
    #[arg(short = '1', long)]
    pub single: bool,

    /// Print each match on a single line
    #[arg(short, long, env = "JPQ_COMPACT")]
    pub compact: bool,
}

impl Args {
    /// The input file, or `None` for standard input.
    fn input_file(&self) -> Option<&Path> {
        self.file.as_deref().filter(|file| file.as_os_str() != "-")
    }
}

/// Reads the input document named by `args`.
pub fn read_document(args: &Args) -> Result<Value, CliError> {
    let text = match args.input_file() {
        Some(file) => {
            log::debug!("Reading document from {}", file.display());
            fs::read_to_string(file)?
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    Ok(serde_json::from_str(&text)?)
}

/// Evaluates the path in `args` against `document`, rendering each match as
/// JSON text.
pub fn run(args: &Args, document: &Value) -> Result<Vec<String>, CliError> {
    let path = JsonPath::parse(&args.path)?;
    let matches = if args.single {
        path.select_token(document, args.strict)?.into_iter().collect()
    } else {
        path.select_all(document, args.strict)?
    };
    log::info!("'{}' matched {} value(s)", args.path, matches.len());

    matches
        .into_iter()
        .map(|value| {
            let rendered = if args.compact {
                serde_json::to_string(value)
            } else {
                serde_json::to_string_pretty(value)
            };
            rendered.map_err(CliError::from)
        })
        .collect()
}
