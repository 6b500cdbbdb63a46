//! Launch parameter parsing for the inspector.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use panotour::{BackendConfig, SceneId};

/// Default number of records kept by the client cache.
const DEFAULT_CACHE_ENTRIES: usize = 256;

/// Where scene and hotspot records come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// The remote record store.
    #[default]
    Backend,
    /// A tour file, or the built-in demo tour when no file is given.
    Static,
}

/// How the loaded tour is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented outline of scenes and hotspots.
    #[default]
    Summary,
    /// The loaded graph as nested JSON.
    Tree,
    /// The flat renderer-facing index as JSON.
    Index,
}

/// Launch parameters for the inspector.
#[derive(Parser, Debug)]
#[command(about = "Load and inspect a virtual tour scene graph")]
pub struct LaunchParams {
    /// Scene to start the tour from.
    #[arg(long, default_value = "1")]
    pub scene: SceneId,

    /// Where to load records from.
    #[arg(long, value_enum, default_value_t = Source::default())]
    pub source: Source,

    /// Tour file to load with `--source static`.
    #[arg(long)]
    pub tour_file: Option<PathBuf>,

    /// Base URL of the record store.
    #[arg(long, env = "PANOTOUR_URL")]
    pub url: Option<String>,

    /// API key of the record store.
    #[arg(long, env = "PANOTOUR_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Maximum number of records kept in the client cache.
    #[arg(long, default_value_t = DEFAULT_CACHE_ENTRIES)]
    pub cache_entries: usize,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::default())]
    pub format: OutputFormat,
}

impl LaunchParams {
    /// Backend settings from the command line, falling back to the environment.
    pub fn backend_config(&self) -> panotour::Result<BackendConfig> {
        match (&self.url, &self.key) {
            (Some(url), Some(key)) => BackendConfig::new(url.as_str(), key.as_str()),
            _ => BackendConfig::from_env(),
        }
    }
}

/// Parse launch parameters from the command line.
pub fn parse() -> LaunchParams {
    LaunchParams::parse()
}
