//! Command-line inspector for virtual tour scene graphs.
//!
//! Loads the scenes reachable from a starting scene, either from the remote
//! record store or from static tour tables, and prints the result.

mod launch_params;
mod summary;

use std::process::ExitCode;

use launch_params::{LaunchParams, OutputFormat, Source};
use panotour::{Client, MemoryCache, SceneNode, StaticTour, TourIndex};

#[tokio::main]
async fn main() -> ExitCode {
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let params = launch_params::parse();

    match run(&params).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to load tour from scene {}: {}", params.scene, e);
            ExitCode::FAILURE
        }
    }
}

async fn run(params: &LaunchParams) -> panotour::Result<String> {
    let graph = load(params).await?;

    match params.format {
        OutputFormat::Summary => Ok(summary::outline(&graph)),
        OutputFormat::Tree => Ok(serde_json::to_string_pretty(&graph)?),
        OutputFormat::Index => Ok(serde_json::to_string_pretty(&TourIndex::from_graph(
            &graph,
        ))?),
    }
}

async fn load(params: &LaunchParams) -> panotour::Result<SceneNode> {
    match params.source {
        Source::Backend => {
            let config = params.backend_config()?;
            tracing::info!(url = %config.url, scene = %params.scene, "Loading tour from backend");
            let client =
                Client::with_cache(config, MemoryCache::with_max_entries(params.cache_entries));
            panotour::load_graph(client, params.scene).await
        }
        Source::Static => {
            let tour = match &params.tour_file {
                Some(path) => StaticTour::from_path(path)?,
                None => StaticTour::demo(),
            };
            tracing::info!(scenes = tour.len(), scene = %params.scene, "Loading static tour");
            panotour::load_graph(tour, params.scene).await
        }
    }
}
