// crates/reflow-layout/src/border.rs

use reflow_core::{BorderRegion, Dimension, Gaps, Insets, LayoutBox, LayoutDescriptor, LayoutKind, SizeReport};
use tracing::{trace, warn};

use crate::{visible_in_order, LayoutChild, LayoutEngine, Measurement, SizeMap};

/// North/South/East/West/Center placement
#[derive(Debug, Clone)]
pub struct BorderLayout {
    margins: Insets,
    gaps: Gaps,
}

/// The child occupying each region for one pass
#[derive(Default)]
struct Regions<'a> {
    north: Option<&'a LayoutChild>,
    south: Option<&'a LayoutChild>,
    east: Option<&'a LayoutChild>,
    west: Option<&'a LayoutChild>,
    center: Option<&'a LayoutChild>,
    /// Children that lost their region to a later sibling
    displaced: Vec<&'a LayoutChild>,
}

impl<'a> Regions<'a> {
    fn collect(children: &'a [LayoutChild]) -> Self {
        let mut regions = Regions::default();

        for child in visible_in_order(children) {
            let region = child.constraint.as_region().unwrap_or(BorderRegion::Center);
            let slot = match region {
                BorderRegion::North => &mut regions.north,
                BorderRegion::South => &mut regions.south,
                BorderRegion::East => &mut regions.east,
                BorderRegion::West => &mut regions.west,
                BorderRegion::Center => &mut regions.center,
            };
            if let Some(previous) = slot.replace(child) {
                warn!("{:?} replaces {:?} in region {:?}", child.id, previous.id, region);
                regions.displaced.push(previous);
            }
        }

        regions
    }
}

fn size_of(child: Option<&LayoutChild>, pick: fn(&SizeReport) -> Dimension) -> Dimension {
    child.map_or(Dimension::ZERO, |c| pick(&c.sizes))
}

fn saturating_sum(parts: &[i32]) -> i32 {
    parts.iter().fold(0, |total, part| total.saturating_add(*part))
}

/// Gap contributed by a region: present regions get one, absent ones none
fn gap_if(child: Option<&LayoutChild>, gap: i32) -> i32 {
    if child.is_some() {
        gap
    } else {
        0
    }
}

impl BorderLayout {
    pub fn new(descriptor: &LayoutDescriptor) -> Self {
        Self {
            margins: descriptor.margins,
            gaps: descriptor.gaps,
        }
    }

    fn natural_size(&self, regions: &Regions<'_>, pick: fn(&SizeReport) -> Dimension) -> Dimension {
        let north = size_of(regions.north, pick);
        let south = size_of(regions.south, pick);
        let east = size_of(regions.east, pick);
        let west = size_of(regions.west, pick);
        let center = size_of(regions.center, pick);

        let middle_width = saturating_sum(&[
            west.width,
            gap_if(regions.west, self.gaps.horizontal),
            center.width,
            gap_if(regions.east, self.gaps.horizontal),
            east.width,
        ]);
        let middle_height = west.height.max(center.height).max(east.height);

        let inner = Dimension::new(
            middle_width.max(north.width).max(south.width),
            saturating_sum(&[
                north.height,
                gap_if(regions.north, self.gaps.vertical),
                middle_height,
                gap_if(regions.south, self.gaps.vertical),
                south.height,
            ]),
        );
        self.margins.grow(inner)
    }
}

impl LayoutEngine for BorderLayout {
    fn kind(&self) -> Option<LayoutKind> {
        Some(LayoutKind::Border)
    }

    fn measure(&mut self, children: &[LayoutChild]) -> Measurement {
        let regions = Regions::collect(children);
        Measurement {
            preferred: self.natural_size(&regions, |s| s.preferred),
            minimum: self.natural_size(&regions, |s| s.minimum),
        }
    }

    fn arrange(&mut self, children: &[LayoutChild], bounds: Dimension) -> SizeMap {
        let regions = Regions::collect(children);
        let inner = self.margins.shrink(bounds);
        let (left, top) = (self.margins.left, self.margins.top);
        let mut size_map = SizeMap::with_capacity(children.len());

        let mut place = |child: Option<&LayoutChild>, placed: LayoutBox| {
            if let Some(child) = child {
                trace!("Border child {:?} -> {:?}", child.id, placed);
                size_map.insert(child.id.clone(), placed);
            }
        };

        let north_height = size_of(regions.north, |s| s.preferred).height;
        let south_height = size_of(regions.south, |s| s.preferred).height;
        let west_width = size_of(regions.west, |s| s.preferred).width;
        let east_width = size_of(regions.east, |s| s.preferred).width;

        let north_gap = gap_if(regions.north, self.gaps.vertical);
        let south_gap = gap_if(regions.south, self.gaps.vertical);
        let west_gap = gap_if(regions.west, self.gaps.horizontal);
        let east_gap = gap_if(regions.east, self.gaps.horizontal);

        place(regions.north, LayoutBox::new(left, top, inner.width, north_height));
        let south_top = top.saturating_add(inner.height - south_height);
        place(regions.south, LayoutBox::new(left, south_top, inner.width, south_height));

        let middle_top = saturating_sum(&[top, north_height, north_gap]);
        let middle_height = inner
            .height
            .saturating_sub(saturating_sum(&[north_height, south_height, north_gap, south_gap]))
            .max(0);

        place(regions.west, LayoutBox::new(left, middle_top, west_width, middle_height));
        let east_left = left.saturating_add(inner.width - east_width);
        place(regions.east, LayoutBox::new(east_left, middle_top, east_width, middle_height));

        let center_left = saturating_sum(&[left, west_width, west_gap]);
        let center_width = inner
            .width
            .saturating_sub(saturating_sum(&[west_width, east_width, west_gap, east_gap]));
        place(
            regions.center,
            LayoutBox::new(center_left, middle_top, center_width, middle_height),
        );

        for child in &regions.displaced {
            place(Some(*child), LayoutBox::ZERO);
        }

        size_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn border(source: &str) -> BorderLayout {
        BorderLayout::new(&LayoutDescriptor::parse(source).unwrap())
    }

    fn region(id: &str, name: &str, width: i32, height: i32) -> LayoutChild {
        parse_child(LayoutKind::Border, id, name, width, height)
    }

    #[test]
    fn test_all_regions() {
        let mut layout = border("BorderLayout,0,0,0,0,5,4");
        let children = indexed(vec![
            region("n", "North", 50, 20),
            region("s", "South", 50, 10),
            region("w", "West", 30, 50),
            region("e", "East", 40, 50),
            region("c", "Center", 100, 100),
        ]);

        let map = layout.arrange(&children, Dimension::new(300, 200));
        assert_eq!(map["n"], LayoutBox::new(0, 0, 300, 20));
        assert_eq!(map["s"], LayoutBox::new(0, 190, 300, 10));
        assert_eq!(map["w"], LayoutBox::new(0, 24, 30, 162));
        assert_eq!(map["e"], LayoutBox::new(260, 24, 40, 162));
        assert_eq!(map["c"], LayoutBox::new(35, 24, 220, 162));

        let measurement = layout.measure(&children);
        assert_eq!(measurement.preferred, Dimension::new(180, 138));
    }

    #[test]
    fn test_center_height_for_every_region_combination() {
        let gap = 6;
        for mask in 0..4 {
            let mut children = vec![region("c", "Center", 10, 10)];
            if mask & 1 != 0 {
                children.push(region("n", "North", 10, 15));
            }
            if mask & 2 != 0 {
                children.push(region("s", "South", 10, 25));
            }
            let children = indexed(children);

            let mut layout = border("BorderLayout,0,0,0,0,6,6");
            let map = layout.arrange(&children, Dimension::new(100, 200));

            let north = if mask & 1 != 0 { 15 + gap } else { 0 };
            let south = if mask & 2 != 0 { 25 + gap } else { 0 };
            assert_eq!(map["c"].height, 200 - north - south, "mask {}", mask);
        }
    }

    #[test]
    fn test_margins_are_respected() {
        let mut layout = border("BorderLayout,1,2,3,4,0,0");
        let children = vec![region("c", "Center", 10, 10)];
        let map = layout.arrange(&children, Dimension::new(100, 50));
        assert_eq!(map["c"], LayoutBox::new(2, 1, 94, 46));
    }

    #[test]
    fn test_later_child_wins_region() {
        let mut layout = border("BorderLayout,0,0,0,0,0,0");
        let children = indexed(vec![region("old", "North", 10, 10), region("new", "North", 10, 30)]);
        let map = layout.arrange(&children, Dimension::new(100, 100));
        assert_eq!(map["new"].height, 30);
        assert_eq!(map["old"], LayoutBox::ZERO);
    }

    #[test]
    fn test_unconstrained_child_goes_to_center() {
        let mut layout = border("BorderLayout,0,0,0,0,0,0");
        let children = vec![child("loose", reflow_core::ComponentConstraint::Unconstrained, 5, 5)];
        let map = layout.arrange(&children, Dimension::new(40, 40));
        assert_eq!(map["loose"], LayoutBox::new(0, 0, 40, 40));
    }

    #[test]
    fn test_unbounded_region_saturates() {
        let mut layout = border("BorderLayout,0,0,0,0,5,5");
        let children = indexed(vec![
            region("n", "North", 10, reflow_core::UNBOUNDED),
            region("w", "West", reflow_core::UNBOUNDED, 10),
            region("c", "Center", 20, 20),
        ]);

        let measurement = layout.measure(&children);
        assert_eq!(measurement.preferred, Dimension::UNBOUNDED);

        let map = layout.arrange(&children, Dimension::new(100, 100));
        assert_eq!(map["n"], LayoutBox::new(0, 0, 100, reflow_core::UNBOUNDED));
        assert_eq!(map["c"].height, 0);
        assert_eq!(map["c"].top, reflow_core::UNBOUNDED);
        assert_eq!(map["c"].width, 0);
    }
}
