// crates/reflow-layout/src/grid.rs

use glam::IVec2;
use reflow_core::{Dimension, Gaps, GridCell, Insets, LayoutBox, LayoutDescriptor, LayoutKind, SizeReport};
use tracing::trace;

use crate::{visible_in_order, LayoutChild, LayoutEngine, Measurement, SizeMap};

/// Uniform cells, children spanning whole cells. Overlapping spans are
/// placed as given.
#[derive(Debug, Clone)]
pub struct GridLayout {
    margins: Insets,
    gaps: Gaps,
    columns: i32,
    rows: i32,
}

/// Cells of a child without a grid constraint
const FALLBACK_CELL: GridCell = GridCell {
    column: 0,
    row: 0,
    width: 1,
    height: 1,
};

fn cell_of(child: &LayoutChild) -> GridCell {
    child.constraint.as_cell().unwrap_or(FALLBACK_CELL)
}

/// Smallest share per spanned cell that still fits `size`
fn share(size: i32, span: i32, gap: i32) -> i32 {
    let span = span.max(1);
    let content = size.saturating_sub(gap.saturating_mul(span - 1)).max(0);
    content / span + i32::from(content % span != 0)
}

/// Largest share per cell so that `span` cells fit in `size`
fn share_down(size: i32, span: i32, gap: i32) -> i32 {
    let content = size.saturating_sub(gap.saturating_mul(span - 1));
    (content / span).max(0)
}

/// Length of `span` cells of `cell` pixels with a gap between each pair
fn span_extent(cell: i32, span: i32, gap: i32) -> i32 {
    cell.saturating_mul(span).saturating_add(gap.saturating_mul(span - 1))
}

impl GridLayout {
    pub fn new(descriptor: &LayoutDescriptor) -> Self {
        Self {
            margins: descriptor.margins,
            gaps: descriptor.gaps,
            columns: descriptor.columns,
            rows: descriptor.rows,
        }
    }

    /// Column and row count, derived from the children when unset
    fn dimensions(&self, visible: &[&LayoutChild]) -> (i32, i32) {
        let furthest = visible.iter().map(|c| cell_of(c)).fold((1, 1), |(cols, rows), cell| {
            (
                cols.max(cell.column.saturating_add(cell.width)),
                rows.max(cell.row.saturating_add(cell.height)),
            )
        });

        let columns = if self.columns > 0 { self.columns } else { furthest.0 };
        let rows = if self.rows > 0 { self.rows } else { furthest.1 };
        (columns, rows)
    }

    fn natural_size(&self, visible: &[&LayoutChild], pick: fn(&SizeReport) -> Dimension) -> Dimension {
        let (columns, rows) = self.dimensions(visible);

        let (cell_width, cell_height) = visible.iter().fold((0, 0), |(w, h), child| {
            let cell = cell_of(child);
            let size = pick(&child.sizes);
            (
                w.max(share(size.width, cell.width, self.gaps.horizontal)),
                h.max(share(size.height, cell.height, self.gaps.vertical)),
            )
        });

        let inner = Dimension::new(
            span_extent(cell_width, columns, self.gaps.horizontal),
            span_extent(cell_height, rows, self.gaps.vertical),
        );
        self.margins.grow(inner)
    }
}

impl LayoutEngine for GridLayout {
    fn kind(&self) -> Option<LayoutKind> {
        Some(LayoutKind::Grid)
    }

    fn measure(&mut self, children: &[LayoutChild]) -> Measurement {
        let visible = visible_in_order(children);
        Measurement {
            preferred: self.natural_size(&visible, |s| s.preferred),
            minimum: self.natural_size(&visible, |s| s.minimum),
        }
    }

    fn arrange(&mut self, children: &[LayoutChild], bounds: Dimension) -> SizeMap {
        let visible = visible_in_order(children);
        let (columns, rows) = self.dimensions(&visible);
        let inner = self.margins.shrink(bounds);

        let cell_width = share_down(inner.width, columns, self.gaps.horizontal);
        let cell_height = share_down(inner.height, rows, self.gaps.vertical);
        let pitch = (
            cell_width.saturating_add(self.gaps.horizontal),
            cell_height.saturating_add(self.gaps.vertical),
        );

        let mut size_map = SizeMap::with_capacity(visible.len());
        for child in visible {
            let cell = cell_of(child);
            let offset = IVec2::new(
                cell.column.saturating_mul(pitch.0),
                cell.row.saturating_mul(pitch.1),
            );
            let size = Dimension::new(
                span_extent(cell_width, cell.width, self.gaps.horizontal),
                span_extent(cell_height, cell.height, self.gaps.vertical),
            );

            let placed = LayoutBox::at(self.margins.origin(), size).translate(offset);
            trace!("Grid child {:?} at {:?} -> {:?}", child.id, cell, placed);
            size_map.insert(child.id.clone(), placed);
        }

        size_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn grid(source: &str) -> GridLayout {
        GridLayout::new(&LayoutDescriptor::parse(source).unwrap())
    }

    fn cell(id: &str, constraint: &str, width: i32, height: i32) -> LayoutChild {
        parse_child(LayoutKind::Grid, id, constraint, width, height)
    }

    #[test]
    fn test_spanning_child() {
        let mut layout = grid("GridLayout,0,0,0,0,0,0,2,2");
        let children = indexed(vec![cell("wide", "0;0;2;1", 10, 10), cell("tile", "1;1;1;1", 10, 10)]);
        let map = layout.arrange(&children, Dimension::new(200, 200));
        assert_eq!(map["wide"], LayoutBox::new(0, 0, 200, 100));
        assert_eq!(map["tile"], LayoutBox::new(100, 100, 100, 100));
    }

    #[test]
    fn test_gaps_and_margins() {
        let mut layout = grid("GridLayout,5,5,5,5,10,4,3,2");
        let children = indexed(vec![cell("a", "0;0;1;1", 1, 1), cell("b", "1;1;2;1", 1, 1)]);
        let map = layout.arrange(&children, Dimension::new(210, 114));
        // cells are 60 by 50
        assert_eq!(map["a"], LayoutBox::new(5, 5, 60, 50));
        assert_eq!(map["b"], LayoutBox::new(75, 59, 130, 50));
    }

    #[test]
    fn test_rounding_loss_is_below_column_count() {
        for width in 90..130 {
            let mut layout = grid("GridLayout,0,0,0,0,0,0,7,1");
            let children = indexed((0..7).map(|i| cell(&format!("c{}", i), &format!("{};0;1;1", i), 1, 1)).collect());
            let map = layout.arrange(&children, Dimension::new(width, 10));
            let covered: i32 = map.values().map(|b| b.width).sum();
            assert!(width - covered < 7, "width {} covered {}", width, covered);
            assert!(covered <= width);
        }
    }

    #[test]
    fn test_dimensions_derived_from_children() {
        let mut layout = grid("GridLayout,0,0,0,0,0,0,0,0");
        let children = indexed(vec![cell("a", "0;0;1;1", 1, 1), cell("b", "3;1;1;1", 1, 1)]);
        let map = layout.arrange(&children, Dimension::new(400, 100));
        assert_eq!(map["b"], LayoutBox::new(300, 50, 100, 50));
    }

    #[test]
    fn test_overlapping_cells_are_kept() {
        let mut layout = grid("GridLayout,0,0,0,0,0,0,2,2");
        let children = indexed(vec![cell("a", "0;0;2;2", 1, 1), cell("b", "1;1;1;1", 1, 1)]);
        let map = layout.arrange(&children, Dimension::new(100, 100));
        assert_eq!(map["a"], LayoutBox::new(0, 0, 100, 100));
        assert_eq!(map["b"], LayoutBox::new(50, 50, 50, 50));
    }

    #[test]
    fn test_preferred_size_from_largest_share() {
        let mut layout = grid("GridLayout,1,1,1,1,2,2,2,2");
        let children = indexed(vec![cell("a", "0;0;1;1", 30, 10), cell("b", "0;1;2;1", 80, 20)]);
        // b needs 39 per column, a needs 30
        let measurement = layout.measure(&children);
        assert_eq!(measurement.preferred, Dimension::new(2 + 39 * 2 + 2, 2 + 20 * 2 + 2));
    }

    #[test]
    fn test_far_cell_saturates() {
        let mut layout = grid("GridLayout,0,0,0,0,0,0,0,0");
        let children = vec![cell("far", "2147483647;0;1;1", 10, 10)];
        assert_eq!(layout.measure(&children).preferred, Dimension::new(reflow_core::UNBOUNDED, 10));

        let map = layout.arrange(&children, Dimension::new(200, 200));
        assert_eq!(map["far"], LayoutBox::new(0, 0, 0, 200));
    }

    #[test]
    fn test_huge_column_count_saturates() {
        let mut layout = grid("GridLayout,0,0,0,0,10,0,2147483647,1");
        let children = vec![cell("a", "0;0;1;1", 10, 10), cell("b", "5;0;1;1", 10, 10)];
        assert_eq!(layout.measure(&children).preferred, Dimension::new(reflow_core::UNBOUNDED, 10));

        let map = layout.arrange(&children, Dimension::new(400, 40));
        assert_eq!(map["a"], LayoutBox::new(0, 0, 0, 40));
        assert_eq!(map["b"], LayoutBox::new(50, 0, 0, 40));
    }
}
