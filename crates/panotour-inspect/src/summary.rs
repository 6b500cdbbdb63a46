//! Plain-text outline of a loaded tour.

use std::fmt;

use panotour::{LinkStatus, SceneNode};

/// Render the graph as an indented outline, one line per scene and hotspot.
pub fn outline(root: &SceneNode) -> String {
    Outline(root).to_string()
}

struct Outline<'a>(&'a SceneNode);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scene(f, self.0, 0)?;
        writeln!(f, "{} scene(s) loaded", self.0.scene_count())
    }
}

fn write_scene(f: &mut fmt::Formatter<'_>, node: &SceneNode, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    writeln!(
        f,
        "{indent}scene {} {} (yaw {:.1}°, height {:.2})",
        node.id,
        node.image,
        node.entry_rotation.yaw.to_degrees(),
        node.capture_height
    )?;

    for hotspot in &node.hotspots {
        let target = hotspot
            .destination_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let status = match hotspot.link {
            LinkStatus::Resolved => "",
            LinkStatus::DeadEnd => " (dead end)",
            LinkStatus::AlreadyVisited => " (already visited)",
            LinkStatus::Failed => " (failed)",
        };
        writeln!(
            f,
            "{indent}  hotspot {} {:?} -> {target}{status}",
            hotspot.id, hotspot.label
        )?;

        if let Some(dest) = hotspot.destination.as_deref() {
            write_scene(f, dest, depth + 2)?;
        }
    }
    Ok(())
}
