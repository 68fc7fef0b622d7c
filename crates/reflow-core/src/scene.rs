// crates/reflow-core/src/scene.rs
//! JSON scene files: a component tree as the server would describe it,
//! with the sizes a host would have measured for each leaf.

use serde::Deserialize;
use std::path::Path;

use crate::geometry::{Dimension, SizeReport};
use crate::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: String,
    /// Layout descriptor; present on containers only
    #[serde(default)]
    pub layout: Option<String>,
    /// Constraint string inside the parent's layout
    #[serde(default)]
    pub constraints: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub preferred_size: Option<String>,
    #[serde(default)]
    pub minimum_size: Option<String>,
    #[serde(default)]
    pub maximum_size: Option<String>,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

fn default_visible() -> bool {
    true
}

impl SceneNode {
    pub fn is_container(&self) -> bool {
        self.layout.is_some()
    }

    /// Size report of a leaf. Leaves have no measured size of their own
    /// here, so the preferred size string doubles as the measurement.
    pub fn size_report(&self) -> Result<SizeReport> {
        SizeReport::from_strings(
            Dimension::ZERO,
            self.preferred_size.as_deref(),
            self.minimum_size.as_deref(),
            self.maximum_size.as_deref(),
        )
    }

    /// Depth-first count of nodes, self included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

pub fn parse_scene(json: &str) -> Result<SceneNode> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneNode> {
    let data = std::fs::read_to_string(path.as_ref())?;
    parse_scene(&data)
}
