//! In-memory scene tables.
//!
//! A `StaticTour` answers record lookups from tables held in memory, either
//! built in code, parsed from a tour file, or taken from [`StaticTour::demo`].
//! Tour files use the same column names as the remote store:
//!
//! ```json
//! {
//!   "scenes": [{ "id": 1, "caminho_imagem": "/pano/entrance.jpg" }],
//!   "hotspots": [{ "id": 10, "descricao": "Hall", "cena_origem": 1, "cena_destino": 2 }]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fetcher::{FetchFuture, RecordFetcher};
use crate::rows::{HotspotRow, SceneRow};
use crate::types::{DestinationSummary, Hotspot, Rotation, Scene, SceneId};

/// Tables held by a static tour.
#[derive(Debug, Clone, Default)]
pub struct StaticTour {
    scenes: HashMap<SceneId, Scene>,
    labels: HashMap<SceneId, String>,
    /// Hotspots with their origin scene, in insertion order.
    hotspots: Vec<(SceneId, Hotspot)>,
}

#[derive(Debug, Deserialize)]
struct TourFile {
    scenes: Vec<SceneRow>,
    #[serde(default)]
    hotspots: Vec<HotspotRow>,
}

impl StaticTour {
    /// Create an empty tour.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a scene.
    #[must_use]
    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scenes.insert(scene.id, scene);
        self
    }

    /// Add a hotspot to the given origin scene.
    #[must_use]
    pub fn with_hotspot(mut self, origin: impl Into<SceneId>, hotspot: Hotspot) -> Self {
        self.hotspots.push((origin.into(), hotspot));
        self
    }

    /// Parse a tour from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: TourFile = serde_json::from_str(json).map_err(|e| Error::Decode {
            context: "tour file",
            message: e.to_string(),
        })?;

        let mut tour = Self::new();
        for row in file.scenes {
            if let Some(label) = row.label.clone() {
                tour.labels.insert(SceneId(row.id), label);
            }
            tour.scenes.insert(SceneId(row.id), Scene::from(row));
        }
        for row in file.hotspots {
            let origin = row.origin.ok_or_else(|| Error::Decode {
                context: "tour file",
                message: format!("hotspot {} has no cena_origem", row.id),
            })?;
            tour.hotspots.push((SceneId(origin), Hotspot::from(row)));
        }
        Ok(tour)
    }

    /// Read and parse a tour file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::TourFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// A small built-in tour of a house.
    ///
    /// Scene 1 is the entrance. The living room and kitchen link back to each
    /// other and to the entrance, and the garden is a dead end with one
    /// unlinked information marker.
    #[must_use]
    pub fn demo() -> Self {
        let scene = |id: i64, image: &str, yaw: f32| Scene {
            entry_rotation: Rotation::new(yaw, 0.0, 0.0),
            ..Scene::new(id, image)
        };
        let link = |id: i64, label: &str, to: i64, position: Vec3| Hotspot {
            position: Some(position),
            destination: Some(DestinationSummary {
                id: SceneId(to),
                image: None,
                label: None,
            }),
            ..Hotspot::new(id, label)
        };

        let mut tour = Self::new()
            .with_scene(scene(1, "/panoramas/entrance.jpg", 0.0))
            .with_scene(scene(2, "/panoramas/living-room.jpg", 90.0))
            .with_scene(Scene {
                capture_height: 1.5,
                ..scene(3, "/panoramas/kitchen.jpg", 180.0)
            })
            .with_scene(scene(4, "/panoramas/garden.jpg", -90.0))
            .with_hotspot(1, link(101, "Living room", 2, Vec3::new(0.0, 0.0, -5.0)))
            .with_hotspot(1, link(102, "Garden", 4, Vec3::new(5.0, -0.5, 0.0)))
            .with_hotspot(2, link(201, "Kitchen", 3, Vec3::new(-4.0, 0.0, -3.0)))
            .with_hotspot(2, link(202, "Entrance", 1, Vec3::new(0.0, 0.0, 5.0)))
            .with_hotspot(3, link(301, "Living room", 2, Vec3::new(4.0, 0.0, 3.0)))
            .with_hotspot(
                4,
                Hotspot {
                    position: Some(Vec3::new(0.0, 1.0, -6.0)),
                    yaw: Some(15.0),
                    ..Hotspot::new(401, "Fountain")
                },
            );

        for (id, label) in [
            (1, "Entrance"),
            (2, "Living room"),
            (3, "Kitchen"),
            (4, "Garden"),
        ] {
            tour.labels.insert(SceneId(id), label.to_string());
        }
        tour
    }

    /// Number of scenes in the tour.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Check if the tour has no scenes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Fill in the destination summary from the scene table, as the store's
    /// embedded projection would.
    fn project_destination(&self, mut hotspot: Hotspot) -> Hotspot {
        if let Some(dest) = hotspot.destination.as_mut() {
            if let Some(scene) = self.scenes.get(&dest.id) {
                dest.image.get_or_insert_with(|| scene.image.clone());
            }
            if dest.label.is_none() {
                dest.label = self.labels.get(&dest.id).cloned();
            }
        }
        hotspot
    }
}

impl RecordFetcher for StaticTour {
    fn get_scene(&self, id: SceneId) -> FetchFuture<'_, Scene> {
        let result = self.scenes.get(&id).cloned().ok_or(Error::NotFound(id));
        Box::pin(async move { result })
    }

    fn get_hotspots_by_origin(&self, id: SceneId) -> FetchFuture<'_, Vec<Hotspot>> {
        let hotspots: Vec<Hotspot> = self
            .hotspots
            .iter()
            .filter(|(origin, _)| *origin == id)
            .map(|(_, hotspot)| self.project_destination(hotspot.clone()))
            .collect();
        Box::pin(async move { Ok(hotspots) })
    }
}
