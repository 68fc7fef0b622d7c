// crates/reflow-core/src/constraint.rs
use crate::descriptor::LayoutKind;
use crate::geometry::LayoutBox;
use crate::{ReflowError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderRegion {
    North,
    South,
    East,
    West,
    Center,
}

impl BorderRegion {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "North" => Some(BorderRegion::North),
            "South" => Some(BorderRegion::South),
            "East" => Some(BorderRegion::East),
            "West" => Some(BorderRegion::West),
            "Center" => Some(BorderRegion::Center),
            _ => None,
        }
    }
}

/// The four anchors a form child is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorConstraint {
    pub top: String,
    pub left: String,
    pub bottom: String,
    pub right: String,
}

impl AnchorConstraint {
    pub fn new(top: &str, left: &str, bottom: &str, right: &str) -> Self {
        Self {
            top: top.to_string(),
            left: left.to_string(),
            bottom: bottom.to_string(),
            right: right.to_string(),
        }
    }

    pub fn names(&self) -> [&str; 4] {
        [&self.top, &self.left, &self.bottom, &self.right]
    }
}

/// A child's cell rectangle inside a grid layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub column: i32,
    pub row: i32,
    pub width: i32,
    pub height: i32,
}

/// Association of one child to its container's layout
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ComponentConstraint {
    Anchors(AnchorConstraint),
    Region(BorderRegion),
    Cell(GridCell),
    Bounds(LayoutBox),
    /// Flow children, and anything whose constraint could not be read
    #[default]
    Unconstrained,
}

impl ComponentConstraint {
    /// Parse a constraint string the way the given layout kind reads it
    pub fn parse(kind: LayoutKind, value: &str) -> Result<Self> {
        let value = value.trim();
        let invalid = || ReflowError::InvalidConstraint(value.to_string());

        match kind {
            LayoutKind::Form => {
                let parts: Vec<&str> = value.split(';').map(str::trim).collect();
                match parts.as_slice() {
                    [top, left, bottom, right] if parts.iter().all(|p| !p.is_empty()) => Ok(
                        ComponentConstraint::Anchors(AnchorConstraint::new(top, left, bottom, right)),
                    ),
                    _ => Err(invalid()),
                }
            }
            LayoutKind::Border => BorderRegion::from_name(value)
                .map(ComponentConstraint::Region)
                .ok_or_else(invalid),
            LayoutKind::Grid => {
                let [column, row, width, height] = parse_ints(value).ok_or_else(invalid)?;
                if column < 0 || row < 0 || width < 1 || height < 1 {
                    return Err(invalid());
                }
                Ok(ComponentConstraint::Cell(GridCell {
                    column,
                    row,
                    width,
                    height,
                }))
            }
            LayoutKind::Null => {
                let [left, top, width, height] = parse_ints(value).ok_or_else(invalid)?;
                Ok(ComponentConstraint::Bounds(LayoutBox::new(left, top, width, height)))
            }
            LayoutKind::Flow => Ok(ComponentConstraint::Unconstrained),
        }
    }

    /// Lenient variant used by hosts: unreadable constraints become
    /// `Unconstrained` and the engines fall back for that child.
    pub fn parse_or_default(kind: LayoutKind, value: Option<&str>) -> Self {
        match value {
            Some(value) => Self::parse(kind, value).unwrap_or_else(|err| {
                tracing::warn!("{}, child left unconstrained", err);
                ComponentConstraint::Unconstrained
            }),
            None => ComponentConstraint::Unconstrained,
        }
    }

    pub fn as_anchors(&self) -> Option<&AnchorConstraint> {
        match self {
            ComponentConstraint::Anchors(anchors) => Some(anchors),
            _ => None,
        }
    }

    pub fn as_region(&self) -> Option<BorderRegion> {
        match self {
            ComponentConstraint::Region(region) => Some(*region),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<GridCell> {
        match self {
            ComponentConstraint::Cell(cell) => Some(*cell),
            _ => None,
        }
    }

    pub fn as_bounds(&self) -> Option<LayoutBox> {
        match self {
            ComponentConstraint::Bounds(bounds) => Some(*bounds),
            _ => None,
        }
    }
}

fn parse_ints(value: &str) -> Option<[i32; 4]> {
    let mut out = [0; 4];
    let mut parts = value.split(';');
    for slot in out.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
