//! Recursive loading of a tour's navigation graph.
//!
//! Starting from a root scene, the loader fetches the scene and its hotspots,
//! then resolves every hotspot's destination concurrently, recursing into
//! scenes it has not seen yet. The result is a tree: a scene reached a second
//! time (through a cycle or a second hotspot) appears only once, at the point
//! where it was first reached.
//!
//! Errors have two severities:
//!
//! - Fetching the scene or hotspot list of the scene being loaded fails the
//!   call for that scene.
//! - A failure while resolving one hotspot's destination is logged and turns
//!   that hotspot into a [`LinkStatus::Failed`] link. Its siblings and the
//!   enclosing scene still load.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use futures::future::join_all;
use web_time::Instant;

use crate::error::Result;
use crate::fetcher::{FetchFuture, RecordFetcher};
use crate::types::{Hotspot, HotspotNode, LinkStatus, SceneId, SceneNode};

/// Scene ids already claimed by one traversal.
///
/// Created once per top-level load and shared by reference with every
/// recursive step. Check-and-insert is a single locked operation, so two
/// sibling branches can never both claim the same scene, even when driven on
/// different threads.
#[derive(Debug, Default)]
pub struct VisitedSet {
    ids: Mutex<HashSet<SceneId>>,
}

impl VisitedSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a scene id. Returns `false` if it was already claimed.
    pub fn insert(&self, id: SceneId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id)
    }

    /// Check if a scene id has been claimed.
    #[must_use]
    pub fn contains(&self, id: SceneId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Number of claimed scene ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if no scene id has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claimed ids in ascending order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<SceneId> {
        let mut ids: Vec<_> = self
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Loads navigation graphs through a [`RecordFetcher`].
#[derive(Debug, Clone)]
pub struct GraphLoader<F> {
    fetcher: F,
}

impl<F: RecordFetcher> GraphLoader<F> {
    /// Create a loader over the given fetcher.
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// The fetcher used by this loader.
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Load the graph reachable from `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root scene or its hotspot list cannot be
    /// fetched. Failures further down the graph only null out the affected
    /// hotspots.
    pub async fn load(&self, root: SceneId) -> Result<SceneNode> {
        let visited = VisitedSet::new();
        let started = Instant::now();

        visited.insert(root);
        let node = self.load_scene(root, &visited).await?;

        tracing::info!(
            %root,
            scenes = node.scene_count(),
            visited = visited.len(),
            elapsed = ?started.elapsed(),
            "loaded tour graph"
        );
        Ok(node)
    }

    /// Load the graph reachable from `id`, sharing `visited` with the caller.
    ///
    /// Returns `Ok(None)` without fetching anything if `id` was already
    /// visited. Otherwise `id` is claimed before any fetch, so cycles back to
    /// it terminate.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene or its hotspot list cannot be fetched.
    pub fn load_graph<'a>(
        &'a self,
        id: SceneId,
        visited: &'a VisitedSet,
    ) -> FetchFuture<'a, Option<SceneNode>> {
        Box::pin(async move {
            if !visited.insert(id) {
                tracing::trace!(%id, "scene already visited");
                return Ok(None);
            }
            self.load_scene(id, visited).await.map(Some)
        })
    }

    /// Fetch and assemble a scene whose id is already claimed.
    async fn load_scene(&self, id: SceneId, visited: &VisitedSet) -> Result<SceneNode> {
        let scene = self.fetcher.get_scene(id).await?;
        let hotspots = self.fetcher.get_hotspots_by_origin(id).await?;

        tracing::debug!(%id, hotspots = hotspots.len(), "fetched scene");

        // `join_all` yields results in input order, whatever order they finish in.
        let hotspots = join_all(
            hotspots
                .into_iter()
                .map(|hotspot| self.resolve_hotspot(id, hotspot, visited)),
        )
        .await;

        Ok(SceneNode {
            id: scene.id,
            image: scene.image,
            entry_rotation: scene.entry_rotation.to_radians(),
            capture_height: scene.capture_height,
            hotspots,
        })
    }

    /// Resolve one hotspot's destination. Never fails.
    async fn resolve_hotspot(
        &self,
        origin: SceneId,
        hotspot: Hotspot,
        visited: &VisitedSet,
    ) -> HotspotNode {
        let destination_id = hotspot.destination_id();

        let (destination, link) = match destination_id {
            None => (None, LinkStatus::DeadEnd),
            Some(dest) if visited.contains(dest) => (None, LinkStatus::AlreadyVisited),
            Some(dest) => match self.load_graph(dest, visited).await {
                Ok(Some(node)) => (Some(Box::new(node)), LinkStatus::Resolved),
                Ok(None) => (None, LinkStatus::AlreadyVisited),
                Err(error) => {
                    tracing::warn!(
                        scene = %origin,
                        hotspot = hotspot.id,
                        destination = %dest,
                        %error,
                        "failed to resolve hotspot destination"
                    );
                    (None, LinkStatus::Failed)
                }
            },
        };

        HotspotNode {
            id: hotspot.id,
            rotation: hotspot.rotation().to_radians(),
            label: hotspot.label,
            position: hotspot.position,
            destination_id,
            destination,
            link,
        }
    }
}

/// Load the graph reachable from `root` with a one-off loader.
///
/// # Errors
///
/// See [`GraphLoader::load`].
pub async fn load_graph<F: RecordFetcher>(fetcher: F, root: SceneId) -> Result<SceneNode> {
    GraphLoader::new(fetcher).load(root).await
}
