// crates/reflow-layout/src/null.rs

use reflow_core::{Dimension, Insets, LayoutBox, LayoutDescriptor, LayoutKind};
use tracing::trace;

use crate::{visible_in_order, LayoutChild, LayoutEngine, Measurement, SizeMap};

/// Absolute placement: children carry their own bounds
#[derive(Debug, Clone)]
pub struct NullLayout {
    margins: Insets,
}

impl NullLayout {
    pub fn new(descriptor: &LayoutDescriptor) -> Self {
        Self {
            margins: descriptor.margins,
        }
    }

    fn place(&self, child: &LayoutChild, size: Dimension) -> LayoutBox {
        child
            .constraint
            .as_bounds()
            .unwrap_or_else(|| LayoutBox::at(self.margins.origin(), size))
    }

    fn natural_size(&self, visible: &[&LayoutChild], size_of: impl Fn(&LayoutChild) -> Dimension) -> Dimension {
        let origin = (self.margins.left, self.margins.top);
        let (right, bottom) = visible.iter().fold(origin, |(right, bottom), child| {
            let placed = self.place(child, size_of(*child));
            (right.max(placed.right()), bottom.max(placed.bottom()))
        });
        Dimension::new(
            right.saturating_add(self.margins.right),
            bottom.saturating_add(self.margins.bottom),
        )
    }
}

impl LayoutEngine for NullLayout {
    fn kind(&self) -> Option<LayoutKind> {
        Some(LayoutKind::Null)
    }

    fn measure(&mut self, children: &[LayoutChild]) -> Measurement {
        let visible = visible_in_order(children);
        Measurement {
            preferred: self.natural_size(&visible, |c| c.sizes.preferred),
            minimum: self.natural_size(&visible, |c| c.sizes.minimum),
        }
    }

    fn arrange(&mut self, children: &[LayoutChild], _bounds: Dimension) -> SizeMap {
        visible_in_order(children)
            .into_iter()
            .map(|child| {
                let placed = self.place(child, child.sizes.preferred);
                trace!("Null child {:?} -> {:?}", child.id, placed);
                (child.id.clone(), placed)
            })
            .collect()
    }
}

/// Stand-in for a container whose descriptor could not be read. Every
/// visible child gets an empty box so it still exists for the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlaidLayout;

impl LayoutEngine for UnlaidLayout {
    fn kind(&self) -> Option<LayoutKind> {
        None
    }

    fn measure(&mut self, _children: &[LayoutChild]) -> Measurement {
        Measurement::default()
    }

    fn arrange(&mut self, children: &[LayoutChild], _bounds: Dimension) -> SizeMap {
        visible_in_order(children)
            .into_iter()
            .map(|child| (child.id.clone(), LayoutBox::ZERO))
            .collect()
    }
}
