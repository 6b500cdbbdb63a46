//! Row shapes of the scene and hotspot tables.
//!
//! Column names follow the store's schema. Rows are converted into the
//! crate's record types without touching angle units.

use glam::Vec3;
use serde::Deserialize;

use crate::types::{DestinationSummary, Hotspot, Rotation, Scene, SceneId, DEFAULT_CAPTURE_HEIGHT};

/// Select expression for hotspot rows: every column the table has, plus the
/// embedded destination.
///
/// Angle columns differ between deployments (`yaw`/`pitch`/`roll` or
/// `entrada_rotacao_y`), and naming a missing column fails the whole query,
/// so optional columns are never listed.
pub const HOTSPOT_SELECT: &str = "*,cena_destino(id,caminho_imagem,descricao)";

/// A row of the scene table.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneRow {
    pub id: i64,
    #[serde(rename = "caminho_imagem")]
    pub image: String,
    #[serde(rename = "entrada_rotacao_y", default)]
    pub entry_yaw: Option<f32>,
    #[serde(rename = "entrada_rotacao_pitch", default)]
    pub entry_pitch: Option<f32>,
    #[serde(rename = "entrada_rotacao_roll", default)]
    pub entry_roll: Option<f32>,
    #[serde(default)]
    pub capture_height: Option<f32>,
    /// Display label, only present in some deployments.
    #[serde(rename = "descricao", default)]
    pub label: Option<String>,
}

/// A row of the hotspot table.
#[derive(Debug, Clone, Deserialize)]
pub struct HotspotRow {
    pub id: i64,
    #[serde(rename = "descricao", default)]
    pub label: Option<String>,
    /// Origin scene. Omitted by some projections since it is implied by the query.
    #[serde(rename = "cena_origem", default)]
    pub origin: Option<i64>,
    #[serde(default)]
    pub pos_x: Option<f32>,
    #[serde(default)]
    pub pos_y: Option<f32>,
    #[serde(default)]
    pub pos_z: Option<f32>,
    #[serde(default)]
    pub yaw: Option<f32>,
    #[serde(default)]
    pub pitch: Option<f32>,
    #[serde(default)]
    pub roll: Option<f32>,
    #[serde(rename = "entrada_rotacao_y", default)]
    pub entry_yaw: Option<f32>,
    #[serde(rename = "cena_destino", default)]
    pub destination: Option<DestinationRef>,
}

/// Destination reference of a hotspot row.
///
/// The store returns the embedded projection when the join is requested; a
/// bare foreign key is accepted as well, as found in static tour files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DestinationRef {
    Id(i64),
    Embedded(DestinationRow),
}

/// Embedded projection of a hotspot's destination scene.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationRow {
    pub id: i64,
    #[serde(rename = "caminho_imagem", default)]
    pub image: Option<String>,
    #[serde(rename = "descricao", default)]
    pub label: Option<String>,
}

impl From<SceneRow> for Scene {
    fn from(row: SceneRow) -> Self {
        Scene {
            id: SceneId(row.id),
            image: row.image,
            entry_rotation: Rotation {
                yaw: row.entry_yaw.unwrap_or(0.0),
                pitch: row.entry_pitch.unwrap_or(0.0),
                roll: row.entry_roll.unwrap_or(0.0),
            },
            capture_height: row.capture_height.unwrap_or(DEFAULT_CAPTURE_HEIGHT),
        }
    }
}

impl From<HotspotRow> for Hotspot {
    fn from(row: HotspotRow) -> Self {
        let position = if row.pos_x.is_none() && row.pos_y.is_none() && row.pos_z.is_none() {
            None
        } else {
            Some(Vec3::new(
                row.pos_x.unwrap_or(0.0),
                row.pos_y.unwrap_or(0.0),
                row.pos_z.unwrap_or(0.0),
            ))
        };

        let destination = row.destination.map(|dest| match dest {
            DestinationRef::Id(id) => DestinationSummary {
                id: SceneId(id),
                image: None,
                label: None,
            },
            DestinationRef::Embedded(row) => DestinationSummary {
                id: SceneId(row.id),
                image: row.image,
                label: row.label,
            },
        });

        Hotspot {
            id: row.id,
            label: row.label.unwrap_or_default(),
            position,
            yaw: row.yaw,
            entry_yaw: row.entry_yaw,
            pitch: row.pitch,
            roll: row.roll,
            destination,
        }
    }
}
