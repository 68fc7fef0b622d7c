// crates/reflow-layout/src/container.rs
//! Size negotiation for one container.
//!
//! Children report their sizes first. Once every visible child has
//! reported, the container is quiescent and a pass can run over an
//! immutable snapshot. A finished pass is committed as a shared map that
//! children read their own box from.

use reflow_core::{ComponentConstraint, ComponentId, Dimension, LayoutBox, LayoutDescriptor, LayoutKind, SizeReport};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{engine_for, LayoutChild, LayoutEngine, LayoutResult, SizeMap};

/// Called with the container id whenever its own size report changes
pub type SizeListener = Box<dyn FnMut(&str, SizeReport) + Send>;

#[derive(Debug, Clone)]
struct TrackedChild {
    id: ComponentId,
    constraint_source: Option<String>,
    constraint: ComponentConstraint,
    visible: bool,
    index: usize,
    report: Option<SizeReport>,
}

impl TrackedChild {
    fn to_layout_child(&self) -> LayoutChild {
        LayoutChild {
            id: self.id.clone(),
            constraint: self.constraint.clone(),
            sizes: self.report.unwrap_or_default(),
            visible: self.visible,
            index: self.index,
        }
    }
}

/// Immutable view of the children taken when the container was quiescent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSnapshot {
    generation: u64,
    children: Vec<LayoutChild>,
}

impl LayoutSnapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn children(&self) -> &[LayoutChild] {
        &self.children
    }
}

/// Output of one solve, waiting to be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPass {
    pub generation: u64,
    pub result: LayoutResult,
}

pub struct LayoutContainer {
    id: ComponentId,
    descriptor_source: String,
    descriptor: Option<LayoutDescriptor>,
    engine: Box<dyn LayoutEngine>,
    children: Vec<TrackedChild>,
    next_index: usize,
    /// Bumped by every change to the children or the descriptor
    generation: u64,
    committed_generation: Option<u64>,
    size_map: Arc<SizeMap>,
    last_report: Option<SizeReport>,
    listener: Option<SizeListener>,
}

impl fmt::Debug for LayoutContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutContainer")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor_source)
            .field("children", &self.children.len())
            .field("generation", &self.generation)
            .field("committed_generation", &self.committed_generation)
            .finish_non_exhaustive()
    }
}

impl LayoutContainer {
    pub fn new(id: &str, descriptor: &str) -> Self {
        let (parsed, engine) = engine_for(descriptor);
        Self {
            id: id.to_string(),
            descriptor_source: descriptor.to_string(),
            descriptor: parsed,
            engine,
            children: Vec::new(),
            next_index: 0,
            generation: 0,
            committed_generation: None,
            size_map: Arc::new(SizeMap::new()),
            last_report: None,
            listener: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn descriptor(&self) -> Option<&LayoutDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn kind(&self) -> Option<LayoutKind> {
        self.engine.kind()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_size_listener(&mut self, listener: SizeListener) {
        self.listener = Some(listener);
    }

    fn parse_constraint(&self, source: Option<&str>) -> ComponentConstraint {
        match &self.descriptor {
            Some(descriptor) => ComponentConstraint::parse_or_default(descriptor.kind, source),
            None => ComponentConstraint::Unconstrained,
        }
    }

    fn child_mut(&mut self, id: &str) -> Option<&mut TrackedChild> {
        self.children.iter_mut().find(|c| c.id == id)
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    /// Track a child. Indices are handed out in insertion order and never
    /// reused. Adding a tracked id again updates it in place.
    pub fn add_child(&mut self, id: &str, constraint: Option<&str>, visible: bool) -> usize {
        let parsed = self.parse_constraint(constraint);
        self.touch();

        if let Some(existing) = self.child_mut(id) {
            warn!("Child {:?} is already tracked, updating it", id);
            existing.constraint_source = constraint.map(str::to_string);
            existing.constraint = parsed;
            existing.visible = visible;
            return existing.index;
        }

        let index = self.next_index;
        self.next_index += 1;
        self.children.push(TrackedChild {
            id: id.to_string(),
            constraint_source: constraint.map(str::to_string),
            constraint: parsed,
            visible,
            index,
            report: None,
        });
        index
    }

    pub fn remove_child(&mut self, id: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c.id != id);
        let removed = self.children.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        let changed = match self.child_mut(id) {
            Some(child) if child.visible != visible => {
                child.visible = visible;
                true
            }
            _ => false,
        };
        if changed {
            self.touch();
        }
        changed
    }

    pub fn set_constraint(&mut self, id: &str, constraint: Option<&str>) -> bool {
        let parsed = self.parse_constraint(constraint);
        let Some(child) = self.child_mut(id) else {
            return false;
        };
        child.constraint_source = constraint.map(str::to_string);
        child.constraint = parsed;
        self.touch();
        true
    }

    /// Swap the layout. The engine is rebuilt and every child constraint is
    /// read again under the new kind.
    pub fn set_descriptor(&mut self, descriptor: &str) {
        let (parsed, engine) = engine_for(descriptor);
        debug!(
            "Container {:?} layout {:?} -> {:?}",
            self.id,
            self.engine.kind(),
            engine.kind()
        );

        self.descriptor_source = descriptor.to_string();
        self.descriptor = parsed;
        self.engine = engine;

        let reparsed: Vec<ComponentConstraint> = self
            .children
            .iter()
            .map(|c| self.parse_constraint(c.constraint_source.as_deref()))
            .collect();
        for (child, constraint) in self.children.iter_mut().zip(reparsed) {
            child.constraint = constraint;
        }
        self.touch();
    }

    /// Record a child's size. Reports for children this container does not
    /// track are discarded. Returns whether anything changed.
    pub fn report_size(&mut self, id: &str, report: SizeReport) -> bool {
        let Some(child) = self.child_mut(id) else {
            warn!("Discarding size report for unknown child {:?}", id);
            return false;
        };
        if child.report == Some(report) {
            return false;
        }
        child.report = Some(report);
        self.touch();
        true
    }

    /// Visible children that have not reported a size yet
    pub fn pending(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter(|c| c.visible && c.report.is_none())
            .map(|c| c.id.as_str())
            .collect()
    }

    pub fn is_quiescent(&self) -> bool {
        self.children.iter().all(|c| !c.visible || c.report.is_some())
    }

    fn layout_children(&self) -> Vec<LayoutChild> {
        self.children.iter().map(TrackedChild::to_layout_child).collect()
    }

    pub fn snapshot(&self) -> Option<LayoutSnapshot> {
        if !self.is_quiescent() {
            debug!("Container {:?} still waiting on {:?}", self.id, self.pending());
            return None;
        }
        Some(LayoutSnapshot {
            generation: self.generation,
            children: self.layout_children(),
        })
    }

    pub fn solve(&mut self, snapshot: &LayoutSnapshot, bounds: Option<Dimension>) -> LayoutPass {
        LayoutPass {
            generation: snapshot.generation,
            result: self.engine.compute_layout(&snapshot.children, bounds),
        }
    }

    /// Install a pass. A pass older than the one already committed is
    /// discarded.
    pub fn commit(&mut self, pass: LayoutPass) -> bool {
        if let Some(committed) = self.committed_generation {
            if pass.generation < committed {
                warn!(
                    "Container {:?} discarding stale pass {} (committed {})",
                    self.id, pass.generation, committed
                );
                return false;
            }
        }
        self.committed_generation = Some(pass.generation);
        self.size_map = Arc::new(pass.result.size_map);
        true
    }

    /// The container's own size report. Fires the size listener when it
    /// differs from the previous one. `None` while children are still
    /// pending, and the listener stays silent until they have all reported.
    pub fn measure(&mut self) -> Option<SizeReport> {
        let snapshot = self.snapshot()?;
        let report = self.engine.measure(&snapshot.children).to_report();

        if self.last_report != Some(report) {
            self.last_report = Some(report);
            if let Some(listener) = self.listener.as_mut() {
                listener(&self.id, report);
            }
        }
        Some(report)
    }

    /// Snapshot, solve and commit in one go. `None` while children are
    /// still pending.
    pub fn layout(&mut self, bounds: Dimension) -> Option<Arc<SizeMap>> {
        let snapshot = self.snapshot()?;
        let pass = self.solve(&snapshot, Some(bounds));
        self.commit(pass);
        Some(self.size_map())
    }

    pub fn box_of(&self, id: &str) -> Option<LayoutBox> {
        self.size_map.get(id).copied()
    }

    pub fn size_map(&self) -> Arc<SizeMap> {
        Arc::clone(&self.size_map)
    }
}
