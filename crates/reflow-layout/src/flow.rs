// crates/reflow-layout/src/flow.rs

use glam::IVec2;
use reflow_core::{Alignment, Axis, Dimension, Gaps, Insets, LayoutBox, LayoutDescriptor, LayoutKind, Orientation};
use tracing::trace;

use crate::{visible_in_order, LayoutChild, LayoutEngine, Measurement, SizeMap};

/// Sequential placement along one axis, no wrapping
#[derive(Debug, Clone)]
pub struct FlowLayout {
    margins: Insets,
    gaps: Gaps,
    orientation: Orientation,
    horizontal_alignment: Alignment,
    vertical_alignment: Alignment,
    inner_alignment: Alignment,
}

impl FlowLayout {
    pub fn new(descriptor: &LayoutDescriptor) -> Self {
        Self {
            margins: descriptor.margins,
            gaps: descriptor.gaps,
            orientation: descriptor.orientation,
            horizontal_alignment: descriptor.horizontal_alignment,
            vertical_alignment: descriptor.vertical_alignment,
            inner_alignment: descriptor.inner_alignment,
        }
    }

    fn main_axis(&self) -> Axis {
        match self.orientation {
            Orientation::Horizontal => Axis::Horizontal,
            Orientation::Vertical => Axis::Vertical,
        }
    }

    fn outer_alignment(&self, axis: Axis) -> Alignment {
        match axis {
            Axis::Horizontal => self.horizontal_alignment,
            Axis::Vertical => self.vertical_alignment,
        }
    }

    /// Sum along the main axis (gaps included) and max across it
    fn run_extent(&self, sizes: impl Iterator<Item = Dimension>) -> (i32, i32) {
        let main = self.main_axis();
        let gap = self.gaps.along(main);

        let mut count = 0;
        let mut total = 0i32;
        let mut cross = 0;
        for size in sizes {
            total = total.saturating_add(size.along(main));
            cross = cross.max(size.along(main.cross()));
            count += 1;
        }
        if count > 1 {
            total = total.saturating_add(gap.saturating_mul(count - 1));
        }
        (total, cross)
    }

    fn outer_size(&self, main_extent: i32, cross_extent: i32) -> Dimension {
        let inner = Dimension::ZERO
            .with_along(self.main_axis(), main_extent)
            .with_along(self.main_axis().cross(), cross_extent);
        self.margins.grow(inner)
    }
}

impl LayoutEngine for FlowLayout {
    fn kind(&self) -> Option<LayoutKind> {
        Some(LayoutKind::Flow)
    }

    fn measure(&mut self, children: &[LayoutChild]) -> Measurement {
        let visible = visible_in_order(children);
        let (pref_main, pref_cross) = self.run_extent(visible.iter().map(|c| c.sizes.preferred));
        let (min_main, min_cross) = self.run_extent(visible.iter().map(|c| c.sizes.minimum));

        Measurement {
            preferred: self.outer_size(pref_main, pref_cross),
            minimum: self.outer_size(min_main, min_cross),
        }
    }

    fn arrange(&mut self, children: &[LayoutChild], bounds: Dimension) -> SizeMap {
        let visible = visible_in_order(children);
        let mut size_map = SizeMap::with_capacity(visible.len());
        if visible.is_empty() {
            return size_map;
        }

        let main = self.main_axis();
        let cross = main.cross();
        let gap = self.gaps.along(main);
        let inner = self.margins.shrink(bounds);

        let (total_main, max_cross) = self.run_extent(visible.iter().map(|c| c.sizes.preferred));

        let main_alignment = self.outer_alignment(main);
        let cross_alignment = self.outer_alignment(cross);

        // Stretch adds the same amount to every child instead of scaling
        let leftover = inner.along(main) - total_main;
        let (grow, start) = if main_alignment == Alignment::Stretch {
            (leftover.max(0) / visible.len() as i32, 0)
        } else {
            (0, main_alignment.offset(inner.along(main), total_main))
        };

        let (line_extent, line_start) = if cross_alignment == Alignment::Stretch {
            (inner.along(cross), 0)
        } else {
            (max_cross, cross_alignment.offset(inner.along(cross), max_cross))
        };

        let mut position = start;
        for child in visible {
            let preferred = child.sizes.preferred;
            let main_size = preferred.along(main).saturating_add(grow);

            let (cross_size, cross_offset) =
                if cross_alignment == Alignment::Stretch || self.inner_alignment == Alignment::Stretch {
                    (line_extent, 0)
                } else {
                    let size = preferred.along(cross);
                    (size, self.inner_alignment.offset(line_extent, size))
                };

            let size = Dimension::ZERO
                .with_along(main, main_size)
                .with_along(cross, cross_size);
            let across = line_start.saturating_add(cross_offset);
            let offset = match main {
                Axis::Horizontal => IVec2::new(position, across),
                Axis::Vertical => IVec2::new(across, position),
            };

            let placed = LayoutBox::at(self.margins.origin(), size).translate(offset);
            trace!("Flow child {:?} -> {:?}", child.id, placed);
            size_map.insert(child.id.clone(), placed);

            position = position.saturating_add(main_size).saturating_add(gap);
        }

        size_map
    }
}
