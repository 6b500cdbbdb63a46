//! High-level types for virtual tour data.
//!
//! Records ([`Scene`], [`Hotspot`]) mirror what the record store returns and
//! carry angles in degrees. Assembled nodes ([`SceneNode`], [`HotspotNode`])
//! are produced by the graph loader and carry angles in radians.

use std::fmt;
use std::str::FromStr;

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Capture height used when a scene does not specify one, in scene units.
pub const DEFAULT_CAPTURE_HEIGHT: f32 = 1.2;

/// Identifier of a scene, the primary key in the scene table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub i64);

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SceneId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(SceneId)
            .map_err(|_| Error::InvalidSceneId(s.to_string()))
    }
}

impl From<i64> for SceneId {
    fn from(id: i64) -> Self {
        SceneId(id)
    }
}

/// Yaw/pitch/roll orientation.
///
/// The unit depends on where the value lives: records hold degrees, assembled
/// nodes hold radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Rotation {
    /// Create a rotation from its components.
    #[must_use]
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Convert a rotation in degrees to radians.
    #[must_use]
    pub fn to_radians(self) -> Self {
        Self {
            yaw: self.yaw.to_radians(),
            pitch: self.pitch.to_radians(),
            roll: self.roll.to_radians(),
        }
    }

    /// Quaternion for a rotation in radians, applied yaw, then pitch, then roll.
    #[must_use]
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }
}

/// A scene record: one 360° panorama.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: SceneId,
    /// Path or URL of the panoramic image.
    pub image: String,
    /// Orientation the viewer faces on entering the scene, in degrees.
    pub entry_rotation: Rotation,
    /// Height of the camera above the floor when the image was captured.
    pub capture_height: f32,
}

impl Scene {
    /// Create a scene with default orientation and capture height.
    #[must_use]
    pub fn new(id: impl Into<SceneId>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            entry_rotation: Rotation::default(),
            capture_height: DEFAULT_CAPTURE_HEIGHT,
        }
    }
}

/// Summary of a hotspot's destination scene, embedded in the hotspot record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationSummary {
    pub id: SceneId,
    pub image: Option<String>,
    pub label: Option<String>,
}

/// A hotspot record: a clickable marker inside its origin scene.
///
/// The orientation fields are kept as stored; [`Hotspot::rotation`] applies
/// the fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub id: i64,
    pub label: String,
    pub position: Option<Vec3>,
    /// Yaw override in degrees.
    pub yaw: Option<f32>,
    /// Legacy entry yaw in degrees, used when `yaw` is absent.
    pub entry_yaw: Option<f32>,
    pub pitch: Option<f32>,
    pub roll: Option<f32>,
    pub destination: Option<DestinationSummary>,
}

impl Hotspot {
    /// Create a dead-end hotspot with no position or orientation.
    #[must_use]
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            position: None,
            yaw: None,
            entry_yaw: None,
            pitch: None,
            roll: None,
            destination: None,
        }
    }

    /// Identifier of the destination scene, if any.
    #[must_use]
    pub fn destination_id(&self) -> Option<SceneId> {
        self.destination.as_ref().map(|d| d.id)
    }

    /// Resolved orientation in degrees.
    ///
    /// Yaw prefers `yaw`, then `entry_yaw`, then 0. Pitch and roll default to 0.
    #[must_use]
    pub fn rotation(&self) -> Rotation {
        Rotation {
            yaw: first_present(&[self.yaw, self.entry_yaw]),
            pitch: first_present(&[self.pitch]),
            roll: first_present(&[self.roll]),
        }
    }
}

/// First value present in a fallback chain, or 0.
#[must_use]
pub fn first_present(chain: &[Option<f32>]) -> f32 {
    chain.iter().find_map(|v| *v).unwrap_or(0.0)
}

/// How a hotspot's destination was resolved during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// The destination subgraph is embedded in `destination`.
    Resolved,
    /// The hotspot has no destination.
    DeadEnd,
    /// The destination was already visited earlier in the same traversal.
    AlreadyVisited,
    /// Resolving the destination failed; the failure was logged.
    Failed,
}

/// An assembled scene with its hotspots and resolved destinations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: SceneId,
    pub image: String,
    /// Entry orientation in radians.
    pub entry_rotation: Rotation,
    pub capture_height: f32,
    /// Hotspots in the order the store returned them.
    pub hotspots: Vec<HotspotNode>,
}

impl SceneNode {
    /// Number of scenes in this subtree, including this one.
    #[must_use]
    pub fn scene_count(&self) -> usize {
        1 + self
            .hotspots
            .iter()
            .filter_map(|h| h.destination.as_deref())
            .map(SceneNode::scene_count)
            .sum::<usize>()
    }

    /// Depth-first iterator over every scene in this subtree.
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            for hotspot in node.hotspots.iter().rev() {
                if let Some(dest) = hotspot.destination.as_deref() {
                    stack.push(dest);
                }
            }
            Some(node)
        })
    }
}

/// An assembled hotspot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotNode {
    pub id: i64,
    pub label: String,
    pub position: Option<Vec3>,
    /// Orientation in radians.
    pub rotation: Rotation,
    /// The referenced destination, whether or not it was embedded.
    pub destination_id: Option<SceneId>,
    /// Embedded destination subgraph; `None` unless `link` is `Resolved`.
    pub destination: Option<Box<SceneNode>>,
    pub link: LinkStatus,
}
