// crates/reflow-layout/src/lib.rs

use reflow_core::{ComponentConstraint, ComponentId, Dimension, LayoutBox, LayoutDescriptor, LayoutKind, SizeReport};
use std::collections::HashMap;
use tracing::{debug, warn};

pub mod anchors;
pub mod border;
pub mod container;
pub mod flow;
pub mod form;
pub mod grid;
pub mod null;
pub mod tree;

pub use anchors::{Anchor, AnchorError, AnchorGraph, AnchorPosition};
pub use border::BorderLayout;
pub use container::{LayoutContainer, LayoutPass, LayoutSnapshot, SizeListener};
pub use flow::FlowLayout;
pub use form::FormLayout;
pub use grid::GridLayout;
pub use null::{NullLayout, UnlaidLayout};
pub use tree::LayoutTree;

/// Child id to box, relative to the container's origin
pub type SizeMap = HashMap<ComponentId, LayoutBox>;

/// Everything an engine knows about one child for a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutChild {
    pub id: ComponentId,
    pub constraint: ComponentConstraint,
    pub sizes: SizeReport,
    pub visible: bool,
    /// Stable insertion index, used instead of render order
    pub index: usize,
}

impl LayoutChild {
    pub fn new(id: &str, constraint: ComponentConstraint, sizes: SizeReport) -> Self {
        Self {
            id: id.to_string(),
            constraint,
            sizes,
            visible: true,
            index: 0,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Natural size of a container, margins included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    pub preferred: Dimension,
    pub minimum: Dimension,
}

impl Measurement {
    /// What the container reports to its own parent
    pub fn to_report(self) -> SizeReport {
        SizeReport::new(self.preferred, self.minimum, Dimension::UNBOUNDED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResult {
    pub preferred_size: Dimension,
    pub minimum_size: Dimension,
    /// Empty for a measure-only pass
    pub size_map: SizeMap,
}

pub trait LayoutEngine: std::fmt::Debug + Send {
    /// `None` for the fallback used when a descriptor could not be read
    fn kind(&self) -> Option<LayoutKind>;

    fn measure(&mut self, children: &[LayoutChild]) -> Measurement;

    /// Place every visible child inside `bounds`
    fn arrange(&mut self, children: &[LayoutChild], bounds: Dimension) -> SizeMap;

    /// Without bounds only the natural size is computed; placement waits
    /// until the container itself has been measured.
    fn compute_layout(&mut self, children: &[LayoutChild], bounds: Option<Dimension>) -> LayoutResult {
        let measurement = self.measure(children);
        let size_map = match bounds {
            Some(bounds) => self.arrange(children, bounds),
            None => SizeMap::new(),
        };

        debug!(
            "{:?} pass over {} children: preferred={} placed={}",
            self.kind(),
            children.len(),
            measurement.preferred,
            size_map.len()
        );

        LayoutResult {
            preferred_size: measurement.preferred,
            minimum_size: measurement.minimum,
            size_map,
        }
    }
}

pub fn create_engine(descriptor: &LayoutDescriptor) -> Box<dyn LayoutEngine> {
    match descriptor.kind {
        LayoutKind::Form => Box::new(FormLayout::new(descriptor)),
        LayoutKind::Flow => Box::new(FlowLayout::new(descriptor)),
        LayoutKind::Border => Box::new(BorderLayout::new(descriptor)),
        LayoutKind::Grid => Box::new(GridLayout::new(descriptor)),
        LayoutKind::Null => Box::new(NullLayout::new(descriptor)),
    }
}

/// Engine for a raw descriptor string. Unreadable descriptors get the
/// fallback engine so the children still render, unpositioned.
pub fn engine_for(source: &str) -> (Option<LayoutDescriptor>, Box<dyn LayoutEngine>) {
    match LayoutDescriptor::parse(source) {
        Ok(descriptor) => {
            let engine = create_engine(&descriptor);
            (Some(descriptor), engine)
        }
        Err(err) => {
            warn!("{}, children are left unlaid", err);
            (None, Box::new(UnlaidLayout))
        }
    }
}

/// Visible children sorted by their stable index
pub(crate) fn visible_in_order(children: &[LayoutChild]) -> Vec<&LayoutChild> {
    let mut visible: Vec<&LayoutChild> = children.iter().filter(|c| c.visible).collect();
    visible.sort_by_key(|c| c.index);
    visible
}
