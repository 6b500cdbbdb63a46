//! Async loading of 360° virtual tour scene graphs.
//!
//! A tour is a set of panoramic scenes connected by hotspots. This crate
//! fetches scene and hotspot records from a remote record store (or from
//! in-memory tables) and assembles the scenes reachable from a starting scene
//! into a navigation graph ready for a panorama renderer.
//!
//! # Design principles
//!
//! - **Runtime-agnostic**: Returns `impl Future`, works with any executor
//! - **Fetch seam**: The loader only sees [`RecordFetcher`], so stores, caches
//!   and test doubles are interchangeable
//! - **Fault isolation**: A broken link degrades one hotspot, not the tour
//!
//! # Example
//!
//! ```ignore
//! use panotour::{BackendConfig, Client, GraphLoader, MemoryCache, SceneId, TourIndex};
//!
//! let client = Client::with_cache(BackendConfig::from_env()?, MemoryCache::new());
//! let graph = GraphLoader::new(client).load(SceneId(1)).await?;
//! let index = TourIndex::from_graph(&graph);
//! ```

pub mod cache;
mod client;
mod error;
pub mod fetcher;
pub mod graph;
pub mod index;
pub mod orientation;
pub mod rows;
mod static_tour;
pub mod types;

pub use cache::{MemoryCache, NoCache, RecordCache};
pub use client::{BackendConfig, Client, TableNames};
pub use error::{Error, Result};
pub use fetcher::RecordFetcher;
pub use graph::{load_graph, GraphLoader, VisitedSet};
pub use index::{HotspotView, SceneView, TourIndex};
pub use static_tour::StaticTour;
pub use types::{
    DestinationSummary, Hotspot, HotspotNode, LinkStatus, Rotation, Scene, SceneId, SceneNode,
};
