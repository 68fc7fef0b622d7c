// crates/reflow-layout/src/anchors.rs
//! Named anchors of a form layout.
//!
//! Anchors live in an arena keyed by name and point at their related anchor
//! by name. Every chain ends in one of the four roots: `l` and `t` sit at the
//! container origin, `r` and `b` at the container's right and bottom edge.
//! Chains rooted at `l`/`t` grow auto spans in the positive direction, chains
//! rooted at `r`/`b` in the negative one.

use glam::IVec2;
use reflow_core::{Axis, Dimension, Gaps, Insets, LayoutDescriptor};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Anchor names beyond this column/row index are not synthesized
const MAX_SYNTHESIZED_INDEX: i32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorPosition {
    /// Signed pixel offset from the related anchor
    Fixed(i32),
    /// Offset taken from the content anchored next to it
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub name: String,
    pub axis: Axis,
    pub related: Option<String>,
    pub position: AnchorPosition,
}

impl Anchor {
    pub fn new(name: &str, axis: Axis, related: Option<&str>, position: AnchorPosition) -> Self {
        Self {
            name: name.to_string(),
            axis,
            related: related.map(str::to_string),
            position,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.position == AnchorPosition::Auto
    }

    pub fn is_root(&self) -> bool {
        self.related.is_none()
    }

    /// Parse a `name,related,auto,position` record
    pub fn parse_record(record: &str) -> Result<Self, AnchorError> {
        let mut parts = record.split(',').map(str::trim);
        let name = parts
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AnchorError::Malformed(record.to_string()))?;
        let axis = axis_of(name).ok_or_else(|| AnchorError::Unoriented(name.to_string()))?;

        let related = parts.next().filter(|r| !r.is_empty() && *r != "-");
        let auto = parts.next() == Some("a");
        let position = if auto {
            AnchorPosition::Auto
        } else {
            AnchorPosition::Fixed(parts.next().and_then(|p| p.parse().ok()).unwrap_or(0))
        };

        Ok(Self::new(name, axis, related, position))
    }
}

/// Which root a chain ends in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Leading,
    Trailing,
}

impl Side {
    pub fn sign(self) -> i32 {
        match self {
            Side::Leading => 1,
            Side::Trailing => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
    #[error("Anchor {0:?} does not exist")]
    Missing(String),

    #[error("Anchor {0:?} is part of a cycle")]
    Cycle(String),

    #[error("Anchor name {0:?} has no orientation")]
    Unoriented(String),

    #[error("Malformed anchor record {0:?}")]
    Malformed(String),
}

pub fn axis_of(name: &str) -> Option<Axis> {
    match name.chars().next()? {
        'l' | 'r' => Some(Axis::Horizontal),
        't' | 'b' => Some(Axis::Vertical),
        _ => None,
    }
}

fn root_side(name: &str) -> Side {
    match name {
        "r" | "b" => Side::Trailing,
        _ => Side::Leading,
    }
}

fn edge_letters(axis: Axis) -> (char, char) {
    match axis {
        Axis::Horizontal => ('l', 'r'),
        Axis::Vertical => ('t', 'b'),
    }
}

/// All anchors of one container, keyed by name
#[derive(Debug, Clone)]
pub struct AnchorGraph {
    anchors: HashMap<String, Anchor>,
    gaps: Gaps,
}

impl AnchorGraph {
    /// Roots plus the four margin anchors
    pub fn new(margins: Insets, gaps: Gaps) -> Self {
        let mut graph = Self {
            anchors: HashMap::new(),
            gaps,
        };

        for (name, axis) in [
            ("l", Axis::Horizontal),
            ("r", Axis::Horizontal),
            ("t", Axis::Vertical),
            ("b", Axis::Vertical),
        ] {
            graph.anchors.insert(name.to_string(), Anchor::new(name, axis, None, AnchorPosition::Fixed(0)));
        }

        graph.insert(Anchor::new("lm", Axis::Horizontal, Some("l"), AnchorPosition::Fixed(margins.left)));
        graph.insert(Anchor::new("tm", Axis::Vertical, Some("t"), AnchorPosition::Fixed(margins.top)));
        graph.insert(Anchor::new("rm", Axis::Horizontal, Some("r"), AnchorPosition::Fixed(-margins.right)));
        graph.insert(Anchor::new("bm", Axis::Vertical, Some("b"), AnchorPosition::Fixed(-margins.bottom)));

        graph
    }

    pub fn from_descriptor(descriptor: &LayoutDescriptor) -> Self {
        let mut graph = Self::new(descriptor.margins, descriptor.gaps);
        for record in &descriptor.anchor_data {
            match Anchor::parse_record(record) {
                Ok(anchor) => graph.insert(anchor),
                Err(err) => warn!("Skipping anchor record: {}", err),
            }
        }
        graph
    }

    /// Add or replace an anchor. The four roots cannot be replaced, and a
    /// non-root without a related anchor is hung off the root its name
    /// starts with: `r`/`b` names off the trailing root, others off the
    /// leading one.
    pub fn insert(&mut self, mut anchor: Anchor) {
        if matches!(anchor.name.as_str(), "l" | "r" | "t" | "b") {
            warn!("Ignoring redefinition of root anchor {:?}", anchor.name);
            return;
        }
        if anchor.related.is_none() {
            let (lead, trail) = edge_letters(anchor.axis);
            let root = if anchor.name.starts_with(trail) { trail } else { lead };
            anchor.related = Some(root.to_string());
        }
        self.anchors.insert(anchor.name.clone(), anchor);
    }

    pub fn get(&self, name: &str) -> Option<&Anchor> {
        self.anchors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.anchors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.values()
    }

    /// Make sure `name` exists, synthesizing it and whatever it relates to
    /// from the column/row naming convention.
    pub fn ensure(&mut self, name: &str) -> Result<(), AnchorError> {
        let mut pending = vec![name.to_string()];

        while let Some(next) = pending.pop() {
            if self.anchors.contains_key(&next) {
                continue;
            }
            let anchor = self.synthesize(&next)?;
            if let Some(related) = &anchor.related {
                if !self.anchors.contains_key(related) {
                    pending.push(related.clone());
                }
            }
            debug!("Synthesized anchor {:?} -> {:?} {:?}", anchor.name, anchor.related, anchor.position);
            self.anchors.insert(anchor.name.clone(), anchor);
        }

        Ok(())
    }

    fn synthesize(&self, name: &str) -> Result<Anchor, AnchorError> {
        let axis = axis_of(name).ok_or_else(|| AnchorError::Unoriented(name.to_string()))?;
        let (lead, trail) = edge_letters(axis);
        let gap = self.gaps.along(axis);
        let is_lead = name.starts_with(lead);

        let index = name[1..]
            .parse::<i32>()
            .ok()
            .filter(|i| i.unsigned_abs() <= MAX_SYNTHESIZED_INDEX as u32);

        let (related, position) = match (is_lead, index) {
            (true, Some(0)) => (format!("{lead}m"), AnchorPosition::Fixed(0)),
            (true, Some(i)) if i > 0 => (format!("{trail}{}", i - 1), AnchorPosition::Fixed(gap)),
            (true, Some(i)) => (format!("{trail}{i}"), AnchorPosition::Auto),
            (false, Some(i)) if i >= 0 => (format!("{lead}{i}"), AnchorPosition::Auto),
            (false, Some(-1)) => (format!("{trail}m"), AnchorPosition::Fixed(0)),
            (false, Some(i)) => (format!("{lead}{}", i + 1), AnchorPosition::Fixed(-gap)),
            (_, None) => {
                warn!("Anchor {:?} is unknown, using a placeholder", name);
                (format!("{lead}m"), AnchorPosition::Fixed(0))
            }
        };

        Ok(Anchor {
            name: name.to_string(),
            axis,
            related: Some(related),
            position,
        })
    }

    /// The anchors from `name` up to and including its root
    pub fn chain<'a>(&'a self, name: &'a str) -> Result<Vec<&'a Anchor>, AnchorError> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = name;

        loop {
            if !visited.insert(current) {
                return Err(AnchorError::Cycle(name.to_string()));
            }
            let anchor = self
                .anchors
                .get(current)
                .ok_or_else(|| AnchorError::Missing(current.to_string()))?;
            chain.push(anchor);
            match &anchor.related {
                Some(related) => current = related.as_str(),
                None => return Ok(chain),
            }
        }
    }

    pub fn side(&self, name: &str) -> Result<Side, AnchorError> {
        let chain = self.chain(name)?;
        // chain() never returns an empty list
        Ok(chain.last().map_or(Side::Leading, |root| root_side(&root.name)))
    }

    /// Anchors walked from `from` until `to` is reached, `to` excluded.
    /// `None` when `to` is not on `from`'s chain.
    pub fn path_between<'a>(&'a self, from: &str, to: &str) -> Option<Vec<&'a Anchor>> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.anchors.get(from)?;

        while current.name != to {
            if !visited.insert(current.name.as_str()) {
                return None;
            }
            path.push(current);
            current = self.anchors.get(current.related.as_deref()?)?;
        }

        Some(path)
    }

    /// Chain segment spanned by a child bound to `lead` and `trail`.
    ///
    /// On leading-side chains the trailing anchor relates back to the
    /// leading one; on trailing-side chains it is the other way round. The
    /// returned sign converts fixed offsets of the segment into distances.
    pub fn segment<'a>(&'a self, lead: &str, trail: &str) -> Option<(Vec<&'a Anchor>, i32)> {
        if let Some(path) = self.path_between(trail, lead) {
            return Some((path, 1));
        }
        self.path_between(lead, trail).map(|path| (path, -1))
    }

    pub fn resolver<'a>(
        &'a self,
        spans: &'a HashMap<String, i32>,
        extent: Dimension,
        origin: IVec2,
    ) -> Resolver<'a> {
        Resolver {
            graph: self,
            spans,
            extent,
            origin,
            memo: HashMap::new(),
        }
    }
}

/// Resolves anchors to offsets from the container origin for one pass
pub struct Resolver<'a> {
    graph: &'a AnchorGraph,
    spans: &'a HashMap<String, i32>,
    extent: Dimension,
    origin: IVec2,
    memo: HashMap<String, i32>,
}

impl Resolver<'_> {
    pub fn resolve(&mut self, name: &str) -> Result<i32, AnchorError> {
        if let Some(value) = self.memo.get(name) {
            return Ok(*value);
        }

        let chain = self.graph.chain(name)?;
        let Some(root) = chain.last() else {
            return Err(AnchorError::Missing(name.to_string()));
        };
        let sign = root_side(&root.name).sign();

        // Start from the closest anchor already resolved in this pass
        let start = chain
            .iter()
            .position(|anchor| self.memo.contains_key(&anchor.name))
            .unwrap_or(chain.len() - 1);
        let mut value = match self.memo.get(&chain[start].name) {
            Some(value) => *value,
            None => self.root_value(&root.name),
        };
        self.memo.insert(chain[start].name.clone(), value);

        for anchor in chain[..start].iter().rev() {
            let delta = match anchor.position {
                AnchorPosition::Fixed(offset) => offset,
                AnchorPosition::Auto => sign * self.spans.get(&anchor.name).copied().unwrap_or(0),
            };
            value = value.saturating_add(delta);
            self.memo.insert(anchor.name.clone(), value);
        }

        Ok(value)
    }

    fn root_value(&self, root: &str) -> i32 {
        match root {
            "l" => self.origin.x,
            "t" => self.origin.y,
            "r" => self.extent.width,
            "b" => self.extent.height,
            _ => 0,
        }
    }
}
