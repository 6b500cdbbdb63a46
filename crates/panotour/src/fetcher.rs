//! The record fetching seam between the graph loader and a record store.
//!
//! # Implementations
//!
//! - [`Client`](crate::Client): the remote store over HTTP
//! - [`StaticTour`](crate::StaticTour): hard-coded or file-based scene tables

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Hotspot, Scene, SceneId};

/// Future type returned by record fetches.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Read access to scene and hotspot records.
pub trait RecordFetcher: Send + Sync {
    /// Fetch a single scene by its identifier.
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the scene does
    /// not exist.
    fn get_scene(&self, id: SceneId) -> FetchFuture<'_, Scene>;

    /// Fetch every hotspot whose origin is the given scene.
    ///
    /// An empty list is a valid answer (a dead-end scene). The order of the
    /// returned hotspots is the order the store returned them in.
    fn get_hotspots_by_origin(&self, id: SceneId) -> FetchFuture<'_, Vec<Hotspot>>;
}

impl<T: RecordFetcher + ?Sized> RecordFetcher for &T {
    fn get_scene(&self, id: SceneId) -> FetchFuture<'_, Scene> {
        (**self).get_scene(id)
    }

    fn get_hotspots_by_origin(&self, id: SceneId) -> FetchFuture<'_, Vec<Hotspot>> {
        (**self).get_hotspots_by_origin(id)
    }
}

impl<T: RecordFetcher + ?Sized> RecordFetcher for Arc<T> {
    fn get_scene(&self, id: SceneId) -> FetchFuture<'_, Scene> {
        (**self).get_scene(id)
    }

    fn get_hotspots_by_origin(&self, id: SceneId) -> FetchFuture<'_, Vec<Hotspot>> {
        (**self).get_hotspots_by_origin(id)
    }
}

impl<T: RecordFetcher + ?Sized> RecordFetcher for Box<T> {
    fn get_scene(&self, id: SceneId) -> FetchFuture<'_, Scene> {
        (**self).get_scene(id)
    }

    fn get_hotspots_by_origin(&self, id: SceneId) -> FetchFuture<'_, Vec<Hotspot>> {
        (**self).get_hotspots_by_origin(id)
    }
}
