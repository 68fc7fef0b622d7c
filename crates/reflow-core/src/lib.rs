// crates/reflow-core/src/lib.rs
pub mod constraint;
pub mod descriptor;
pub mod geometry;
pub mod scene;

pub use constraint::*;
pub use descriptor::*;
pub use geometry::*;
pub use scene::{load_scene, parse_scene, SceneNode};

/// Identifier of a child, unique within its container
pub type ComponentId = String;

#[derive(Debug, thiserror::Error)]
pub enum ReflowError {
    #[error("Unknown layout kind: {0:?}")]
    UnknownLayout(String),

    #[error("Invalid size: {0:?}")]
    InvalidSize(String),

    #[error("Invalid constraint: {0:?}")]
    InvalidConstraint(String),

    #[error("Invalid scene: {0}")]
    Scene(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReflowError>;
