//! Flat, renderer-facing view of a loaded tour.
//!
//! The loaded graph is a tree in which each scene appears once. A renderer
//! navigates by scene id instead, so the index keys every scene by id and
//! gives each hotspot a `target` id string whenever its destination is
//! present anywhere in the tour, including links that close a cycle.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::Serialize;

use crate::types::{HotspotNode, Rotation, SceneId, SceneNode};

/// Position used for hotspots that do not specify one.
pub const DEFAULT_HOTSPOT_POSITION: Vec3 = Vec3::new(0.0, 0.0, -5.0);

/// A scene as the renderer consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneView {
    pub id: String,
    /// Texture path of the panorama.
    pub image: String,
    /// Entry orientation in radians.
    pub entry_rotation: Rotation,
    pub capture_height: f32,
    pub hotspots: Vec<HotspotView>,
}

/// A hotspot as the renderer consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotView {
    pub id: i64,
    pub label: String,
    /// Position in scene units.
    pub position: Vec3,
    /// Orientation in radians.
    pub rotation: Rotation,
    /// Id of the scene to navigate to on selection.
    pub target: Option<String>,
}

/// Every scene of a loaded tour, keyed by id.
#[derive(Debug, Clone, Serialize)]
pub struct TourIndex {
    start: SceneId,
    scenes: BTreeMap<SceneId, SceneView>,
}

impl TourIndex {
    /// Flatten a loaded graph.
    #[must_use]
    pub fn from_graph(root: &SceneNode) -> Self {
        let mut scenes: BTreeMap<SceneId, SceneView> = root
            .iter()
            .map(|node| (node.id, scene_view(node)))
            .collect();

        // Drop targets that did not make it into the tour (failed branches).
        let present: Vec<SceneId> = scenes.keys().copied().collect();
        for view in scenes.values_mut() {
            for hotspot in &mut view.hotspots {
                let missing = hotspot
                    .target
                    .as_deref()
                    .and_then(|t| t.parse::<SceneId>().ok())
                    .is_some_and(|id| present.binary_search(&id).is_err());
                if missing {
                    hotspot.target = None;
                }
            }
        }

        Self {
            start: root.id,
            scenes,
        }
    }

    /// Id of the scene the tour starts in.
    #[must_use]
    pub fn start_id(&self) -> SceneId {
        self.start
    }

    /// The scene the tour starts in.
    #[must_use]
    pub fn start(&self) -> Option<&SceneView> {
        self.scenes.get(&self.start)
    }

    /// Look up a scene by its id string.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SceneView> {
        let id = id.parse::<SceneId>().ok()?;
        self.scenes.get(&id)
    }

    /// The scene reached by selecting `hotspot_id` in scene `from`.
    #[must_use]
    pub fn navigate(&self, from: &str, hotspot_id: i64) -> Option<&SceneView> {
        let target = self
            .get(from)?
            .hotspots
            .iter()
            .find(|h| h.id == hotspot_id)?
            .target
            .as_deref()?;
        self.get(target)
    }

    /// Number of scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Check if the index has no scenes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Scene ids in ascending order.
    pub fn scene_ids(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.scenes.keys().copied()
    }

    /// Scenes in ascending id order.
    pub fn scenes(&self) -> impl Iterator<Item = &SceneView> {
        self.scenes.values()
    }
}

fn scene_view(node: &SceneNode) -> SceneView {
    SceneView {
        id: node.id.to_string(),
        image: node.image.clone(),
        entry_rotation: node.entry_rotation,
        capture_height: node.capture_height,
        hotspots: node.hotspots.iter().map(hotspot_view).collect(),
    }
}

fn hotspot_view(hotspot: &HotspotNode) -> HotspotView {
    HotspotView {
        id: hotspot.id,
        label: hotspot.label.clone(),
        position: hotspot.position.unwrap_or(DEFAULT_HOTSPOT_POSITION),
        rotation: hotspot.rotation,
        target: hotspot.destination_id.map(|id| id.to_string()),
    }
}
