//! Command-line front end for the consistency engine.
//!
//! Reads a flat parameter file, completes it against the built-in cosmology
//! table or a model file, and renders the result as YAML or JSON.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use cosmosis_consistency::{
    Completion, ConfigError, Consistency, Model, ModelError, ParamId, Parameters, Provenance,
    cosmology_consistency,
};

#[derive(Parser, Debug)]
#[command(name = "cosmosis-consistency")]
#[command(about = "Complete and cross-check a set of redundant parameters")]
pub struct Cli {
    /// Parameter file: a YAML or JSON mapping of name to value
    pub parameters: PathBuf,

    /// Model file with the relation table (built-in cosmology table if omitted)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Report where each value came from
    #[arg(long)]
    pub provenance: bool,

    /// Log every derivation
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Errors surfaced by the command-line tool
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse parameters: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid relation table: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Consistency(#[from] cosmosis_consistency::Error),

    #[error("failed to render YAML: {0}")]
    RenderYaml(#[source] serde_yaml::Error),

    #[error("failed to render JSON: {0}")]
    RenderJson(#[from] serde_json::Error),
}

pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,cosmosis_consistency=debug,cosmosis_consistency_run=debug")
        } else {
            EnvFilter::new("warn,cosmosis_consistency_run=info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse a flat name-to-value mapping
pub fn parse_parameters(text: &str) -> Result<Parameters, RunError> {
    serde_yaml::from_str(text).map_err(RunError::Parse)
}

pub fn load_parameters(path: &Path) -> Result<Parameters, RunError> {
    let text = std::fs::read_to_string(path).map_err(|source| RunError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_parameters(&text)
}

/// Engine from a model file, or the cosmology table
pub fn load_engine(model: Option<&Path>) -> Result<Consistency, RunError> {
    match model {
        Some(path) => {
            let model = Model::load(path)?;
            info!(model = %model.metadata.name, relations = model.relations.len(), "model loaded");
            Ok(model.build()?)
        }
        None => Ok(cosmology_consistency()?),
    }
}

#[derive(Debug, Serialize)]
struct Entry<'a> {
    value: f64,
    #[serde(flatten)]
    provenance: &'a Provenance,
}

/// Render a completion in the requested format
pub fn render(
    completion: &Completion,
    format: OutputFormat,
    with_provenance: bool,
) -> Result<String, RunError> {
    if with_provenance {
        let entries: IndexMap<&ParamId, Entry<'_>> = completion
            .parameters
            .iter()
            .filter_map(|(name, &value)| {
                let provenance = completion.provenance.get(name)?;
                Some((name, Entry { value, provenance }))
            })
            .collect();
        serialize(&entries, format)
    } else {
        serialize(&completion.parameters, format)
    }
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, RunError> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(RunError::RenderYaml),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Load, complete and render according to the command line
pub fn run(cli: &Cli) -> Result<String, RunError> {
    let engine = load_engine(cli.model.as_deref())?;
    let parameters = load_parameters(&cli.parameters)?;
    debug!(supplied = parameters.len(), "parameters loaded");

    let completion = engine.complete(&parameters)?;
    if completion.assumptions > 0 {
        let used: Vec<String> = engine.defaults()[..completion.assumptions]
            .iter()
            .map(ToString::to_string)
            .collect();
        info!(assumptions = %used.join(", "), "completed using defaults");
    }

    render(&completion, cli.format, cli.provenance)
}
