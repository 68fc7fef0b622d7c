// crates/reflow-layout/src/form.rs
//! Anchor constraint solver.
//!
//! Each child is bound to four anchors. Auto anchors take their span from
//! the preferred size of the children they bracket, then every anchor is
//! resolved to a pixel offset and the children are boxed between them.

use glam::IVec2;
use reflow_core::{Alignment, AnchorConstraint, Axis, Dimension, Insets, LayoutBox, LayoutDescriptor, LayoutKind, SizeReport};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

use crate::anchors::{AnchorError, AnchorGraph, AnchorPosition, Side};
use crate::{visible_in_order, LayoutChild, LayoutEngine, Measurement, SizeMap};

type SizePick = fn(&SizeReport) -> Dimension;

#[derive(Debug, Clone)]
pub struct FormLayout {
    margins: Insets,
    horizontal_alignment: Alignment,
    vertical_alignment: Alignment,
    graph: AnchorGraph,
}

impl FormLayout {
    pub fn new(descriptor: &LayoutDescriptor) -> Self {
        Self {
            margins: descriptor.margins,
            horizontal_alignment: descriptor.horizontal_alignment,
            vertical_alignment: descriptor.vertical_alignment,
            graph: AnchorGraph::from_descriptor(descriptor),
        }
    }

    pub fn graph(&self) -> &AnchorGraph {
        &self.graph
    }

    /// Create every anchor a child names. Anchors of hidden children are
    /// created too, they just never contribute a size.
    fn prepare(&mut self, children: &[LayoutChild]) {
        for anchors in children.iter().filter_map(|c| c.constraint.as_anchors()) {
            for name in anchors.names() {
                if let Err(err) = self.graph.ensure(name) {
                    warn!("{}", err);
                }
            }
        }
    }

    /// Spans of all auto anchors, grown until every visible child fits the
    /// segment between its leading and trailing anchor.
    fn auto_spans(&self, children: &[&LayoutChild], pick: SizePick) -> HashMap<String, i32> {
        let mut spans: HashMap<String, i32> = self
            .graph
            .anchors()
            .filter(|a| a.is_auto())
            .map(|a| (a.name.clone(), 0))
            .collect();

        let rounds = spans.len() + 1;
        for round in 0..rounds {
            let mut changed = false;

            for child in children {
                let Some(anchors) = child.constraint.as_anchors() else {
                    continue;
                };
                let size = pick(&child.sizes);

                for (axis, lead, trail) in edges(anchors) {
                    let Some((segment, sign)) = self.graph.segment(lead, trail) else {
                        continue;
                    };
                    let Some(target) = segment.iter().find(|a| a.is_auto()) else {
                        continue;
                    };

                    let used = segment
                        .iter()
                        .filter(|a| a.name != target.name)
                        .map(|a| match a.position {
                            AnchorPosition::Fixed(offset) => offset.saturating_mul(sign),
                            AnchorPosition::Auto => spans.get(&a.name).copied().unwrap_or(0),
                        })
                        .fold(0i32, i32::saturating_add);
                    let needed = size.along(axis).saturating_sub(used).max(0);

                    if let Some(span) = spans.get_mut(&target.name) {
                        if needed > *span {
                            *span = needed;
                            changed = true;
                        }
                    }
                }
            }

            if !changed {
                trace!("Auto spans settled after {} rounds", round + 1);
                break;
            }
        }

        spans
    }

    /// Natural size for the given spans, margins included
    fn extent(&self, children: &[&LayoutChild], spans: &HashMap<String, i32>, pick: SizePick) -> Dimension {
        let mut resolver = self.graph.resolver(spans, Dimension::ZERO, IVec2::ZERO);

        let referenced: HashSet<&str> = children
            .iter()
            .filter_map(|c| c.constraint.as_anchors())
            .flat_map(|a| a.names())
            .collect();

        let mut leading = [0, 0];
        let mut trailing = [0, 0];
        let mut bridged = [0, 0];

        for name in &referenced {
            let Some(anchor) = self.graph.get(name) else {
                continue;
            };
            let (Ok(side), Ok(value)) = (self.graph.side(name), resolver.resolve(name)) else {
                continue;
            };
            let slot = axis_slot(anchor.axis);
            match side {
                Side::Leading => {
                    leading[slot] = leading[slot].max(value.saturating_sub(self.margins.leading(anchor.axis)));
                }
                Side::Trailing => {
                    let inward = value.saturating_neg().saturating_sub(self.margins.trailing(anchor.axis));
                    trailing[slot] = trailing[slot].max(inward);
                }
            }
        }

        // Children pinned to both sides need room for their own size
        // between the two chains.
        for child in children {
            let Some(anchors) = child.constraint.as_anchors() else {
                continue;
            };
            let size = pick(&child.sizes);
            for (axis, lead, trail) in edges(anchors) {
                let sides = (self.graph.side(lead), self.graph.side(trail));
                if sides != (Ok(Side::Leading), Ok(Side::Trailing)) {
                    continue;
                }
                let (Ok(start), Ok(end)) = (resolver.resolve(lead), resolver.resolve(trail)) else {
                    continue;
                };
                let needed = start
                    .saturating_sub(self.margins.leading(axis))
                    .max(0)
                    .saturating_add(size.along(axis))
                    .saturating_add(end.saturating_neg().saturating_sub(self.margins.trailing(axis)).max(0));
                let slot = axis_slot(axis);
                bridged[slot] = bridged[slot].max(needed);
            }
        }

        let inner = Dimension::new(
            leading[0].max(0).saturating_add(trailing[0].max(0)).max(bridged[0]),
            leading[1].max(0).saturating_add(trailing[1].max(0)).max(bridged[1]),
        );
        self.margins.grow(inner)
    }

    fn touches_trailing_side(&self, children: &[&LayoutChild], axis: Axis) -> bool {
        children
            .iter()
            .filter_map(|c| c.constraint.as_anchors())
            .flat_map(|anchors| edges(anchors).into_iter().filter(move |(a, _, _)| *a == axis))
            .any(|(_, lead, trail)| {
                self.graph.side(lead) == Ok(Side::Trailing) || self.graph.side(trail) == Ok(Side::Trailing)
            })
    }

    fn alignment(&self, axis: Axis) -> Alignment {
        match axis {
            Axis::Horizontal => self.horizontal_alignment,
            Axis::Vertical => self.vertical_alignment,
        }
    }

    /// Apply the outer alignment to content that is pinned to the leading
    /// edges only. Returns the origin shift; stretch grows the spans instead.
    fn align(
        &self,
        children: &[&LayoutChild],
        spans: &mut HashMap<String, i32>,
        preferred: Dimension,
        bounds: Dimension,
    ) -> IVec2 {
        let mut origin = IVec2::ZERO;

        for axis in [Axis::Horizontal, Axis::Vertical] {
            if self.touches_trailing_side(children, axis) {
                continue;
            }
            let extra = (bounds.along(axis) - preferred.along(axis)).max(0);
            let alignment = self.alignment(axis);

            if alignment == Alignment::Stretch {
                let stretchable: Vec<String> = self
                    .graph
                    .anchors()
                    .filter(|a| a.axis == axis && a.is_auto())
                    .filter(|a| self.graph.side(&a.name) == Ok(Side::Leading))
                    .filter(|a| spans.get(&a.name).is_some_and(|span| *span > 0))
                    .map(|a| a.name.clone())
                    .collect();
                if stretchable.is_empty() {
                    continue;
                }
                let share = extra / stretchable.len() as i32;
                for name in stretchable {
                    if let Some(span) = spans.get_mut(&name) {
                        *span = span.saturating_add(share);
                    }
                }
            } else {
                let offset = alignment.offset(bounds.along(axis), preferred.along(axis)).max(0);
                match axis {
                    Axis::Horizontal => origin.x = offset,
                    Axis::Vertical => origin.y = offset,
                }
            }
        }

        origin
    }

    fn place(
        &self,
        resolver: &mut crate::anchors::Resolver<'_>,
        anchors: &AnchorConstraint,
    ) -> Result<LayoutBox, AnchorError> {
        let left = resolver.resolve(&anchors.left)?;
        let top = resolver.resolve(&anchors.top)?;
        let right = resolver.resolve(&anchors.right)?;
        let bottom = resolver.resolve(&anchors.bottom)?;
        Ok(LayoutBox::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top)))
    }
}

fn edges(anchors: &AnchorConstraint) -> [(Axis, &str, &str); 2] {
    [
        (Axis::Horizontal, anchors.left.as_str(), anchors.right.as_str()),
        (Axis::Vertical, anchors.top.as_str(), anchors.bottom.as_str()),
    ]
}

fn axis_slot(axis: Axis) -> usize {
    match axis {
        Axis::Horizontal => 0,
        Axis::Vertical => 1,
    }
}

fn preferred_of(report: &SizeReport) -> Dimension {
    report.preferred
}

fn minimum_of(report: &SizeReport) -> Dimension {
    report.minimum
}

impl LayoutEngine for FormLayout {
    fn kind(&self) -> Option<LayoutKind> {
        Some(LayoutKind::Form)
    }

    fn measure(&mut self, children: &[LayoutChild]) -> Measurement {
        self.prepare(children);
        let visible = visible_in_order(children);

        let preferred_spans = self.auto_spans(&visible, preferred_of);
        let minimum_spans = self.auto_spans(&visible, minimum_of);

        Measurement {
            preferred: self.extent(&visible, &preferred_spans, preferred_of),
            minimum: self.extent(&visible, &minimum_spans, minimum_of),
        }
    }

    fn arrange(&mut self, children: &[LayoutChild], bounds: Dimension) -> SizeMap {
        self.prepare(children);
        let visible = visible_in_order(children);

        let mut spans = self.auto_spans(&visible, preferred_of);
        let preferred = self.extent(&visible, &spans, preferred_of);
        let origin = self.align(&visible, &mut spans, preferred, bounds);
        debug!("Form layout in {}: preferred={} origin={:?}", bounds, preferred, origin);

        let mut resolver = self.graph.resolver(&spans, bounds, origin);
        let mut size_map = SizeMap::with_capacity(visible.len());

        for child in visible {
            let fallback = LayoutBox::at(IVec2::ZERO, child.sizes.preferred);
            let placed = match child.constraint.as_anchors() {
                Some(anchors) => self.place(&mut resolver, anchors).unwrap_or_else(|err| {
                    warn!("Child {:?}: {}, placing at origin", child.id, err);
                    fallback
                }),
                None => {
                    warn!("Child {:?} has no anchor constraint, placing at origin", child.id);
                    fallback
                }
            };
            trace!("Form child {:?} -> {:?}", child.id, placed);
            size_map.insert(child.id.clone(), placed);
        }

        size_map
    }
}
