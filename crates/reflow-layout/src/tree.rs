// crates/reflow-layout/src/tree.rs

use glam::IVec2;
use reflow_core::{ComponentId, Dimension, LayoutBox, SceneNode, SizeReport};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use crate::LayoutContainer;

/// Size hints given by the scene; absent entries defer to the measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SizeHints {
    preferred: Option<Dimension>,
    minimum: Option<Dimension>,
    maximum: Option<Dimension>,
}

impl SizeHints {
    fn from_scene(node: &SceneNode) -> reflow_core::Result<Self> {
        let parse = |value: &Option<String>| value.as_deref().map(Dimension::parse).transpose();
        Ok(Self {
            preferred: parse(&node.preferred_size)?,
            minimum: parse(&node.minimum_size)?,
            maximum: parse(&node.maximum_size)?,
        })
    }

    fn apply(&self, measured: SizeReport) -> SizeReport {
        SizeReport::new(
            self.preferred.unwrap_or(measured.preferred),
            self.minimum.unwrap_or(measured.minimum),
            self.maximum.unwrap_or(measured.maximum),
        )
    }
}

#[derive(Debug)]
enum NodeKind {
    Leaf(SizeReport),
    Container(LayoutContainer),
}

#[derive(Debug)]
struct TreeNode {
    id: ComponentId,
    hints: SizeHints,
    children: Vec<usize>,
    kind: NodeKind,
}

/// A whole component tree: containers negotiate with their children
/// bottom-up, then boxes are handed out top-down in absolute coordinates.
#[derive(Debug)]
pub struct LayoutTree {
    nodes: Vec<TreeNode>,
    index: HashMap<ComponentId, usize>,
}

impl LayoutTree {
    pub fn from_scene(scene: &SceneNode) -> reflow_core::Result<Self> {
        let mut tree = Self {
            nodes: Vec::with_capacity(scene.node_count()),
            index: HashMap::new(),
        };
        tree.insert(scene)?;
        debug!("Built layout tree with {} nodes", tree.nodes.len());
        Ok(tree)
    }

    /// Add a node and its subtree. A node whose id is already taken is
    /// dropped with its subtree and `None` is returned.
    fn insert(&mut self, node: &SceneNode) -> reflow_core::Result<Option<usize>> {
        if self.index.contains_key(&node.id) {
            warn!("Duplicate component id {:?}, the node and its subtree are skipped", node.id);
            return Ok(None);
        }
        let hints = SizeHints::from_scene(node)?;
        let slot = self.nodes.len();

        let kind = match &node.layout {
            Some(descriptor) => NodeKind::Container(LayoutContainer::new(&node.id, descriptor)),
            None => {
                if !node.children.is_empty() {
                    warn!("Node {:?} has children but no layout, they are ignored", node.id);
                }
                NodeKind::Leaf(hints.apply(SizeReport::default()))
            }
        };
        self.nodes.push(TreeNode {
            id: node.id.clone(),
            hints,
            children: Vec::new(),
            kind,
        });
        self.index.insert(node.id.clone(), slot);

        if node.is_container() {
            for child in &node.children {
                let Some(child_slot) = self.insert(child)? else {
                    continue;
                };
                self.nodes[slot].children.push(child_slot);
                if let NodeKind::Container(container) = &mut self.nodes[slot].kind {
                    container.add_child(&child.id, child.constraints.as_deref(), child.visible);
                }
            }
        }

        Ok(Some(slot))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn container(&self, id: &str) -> Option<&LayoutContainer> {
        let slot = *self.index.get(id)?;
        match &self.nodes[slot].kind {
            NodeKind::Container(container) => Some(container),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Change what a leaf reports. Returns false for unknown ids and
    /// containers.
    pub fn set_leaf_size(&mut self, id: &str, report: SizeReport) -> bool {
        let Some(&slot) = self.index.get(id) else {
            return false;
        };
        match &mut self.nodes[slot].kind {
            NodeKind::Leaf(current) => {
                *current = report;
                true
            }
            NodeKind::Container(_) => false,
        }
    }

    /// Size report of a node after its subtree has been measured
    fn measure(&mut self, slot: usize) -> SizeReport {
        let children = self.nodes[slot].children.clone();
        let reports: Vec<(ComponentId, SizeReport)> = children
            .into_iter()
            .map(|child| (self.nodes[child].id.clone(), self.measure(child)))
            .collect();

        let node = &mut self.nodes[slot];
        match &mut node.kind {
            NodeKind::Leaf(report) => *report,
            NodeKind::Container(container) => {
                for (id, report) in reports {
                    container.report_size(&id, report);
                }
                let measured = container.measure().unwrap_or_else(|| {
                    warn!("Container {:?} measured with children still pending", node.id);
                    SizeReport::default()
                });
                node.hints.apply(measured)
            }
        }
    }

    fn place(&mut self, slot: usize, placed: LayoutBox, out: &mut HashMap<ComponentId, LayoutBox>) {
        let id = self.nodes[slot].id.clone();
        trace!("Tree node {:?} -> {:?}", id, placed);
        out.insert(id.clone(), placed);

        let size_map = match &mut self.nodes[slot].kind {
            NodeKind::Leaf(_) => return,
            NodeKind::Container(container) => match container.layout(placed.size()) {
                Some(size_map) => size_map,
                None => {
                    warn!("Container {:?} is not quiescent, children left unplaced", id);
                    return;
                }
            },
        };

        let offset: IVec2 = placed.position();
        for child in self.nodes[slot].children.clone() {
            // Hidden children get no box
            if let Some(relative) = size_map.get(&self.nodes[child].id) {
                self.place(child, relative.translate(offset), out);
            }
        }
    }

    /// Measure everything, then place the root at the origin with `bounds`.
    /// Boxes in the result are absolute.
    pub fn compute(&mut self, bounds: Dimension) -> HashMap<ComponentId, LayoutBox> {
        let mut out = HashMap::with_capacity(self.nodes.len());
        if self.nodes.is_empty() {
            return out;
        }

        let root = self.measure(0);
        debug!("Root {:?} measured {}", self.nodes[0].id, root.preferred);
        self.place(0, LayoutBox::at(IVec2::ZERO, bounds), &mut out);
        out
    }

    /// Preferred size of the whole tree
    pub fn preferred_size(&mut self) -> Dimension {
        if self.nodes.is_empty() {
            return Dimension::ZERO;
        }
        self.measure(0).preferred
    }
}
