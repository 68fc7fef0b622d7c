// crates/reflow-core/src/geometry.rs
use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::{ReflowError, Result};

/// Sentinel for "no maximum". The wire value 0x80000000 saturates to this.
pub const UNBOUNDED: i32 = i32::MAX;

/// A width/height pair in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

impl Dimension {
    pub const ZERO: Dimension = Dimension { width: 0, height: 0 };
    pub const UNBOUNDED: Dimension = Dimension {
        width: UNBOUNDED,
        height: UNBOUNDED,
    };

    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Parse a `"<width>,<height>"` size string
    pub fn parse(value: &str) -> Result<Self> {
        let mut parts = value.split(',').map(str::trim);
        let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ReflowError::InvalidSize(value.to_string()));
        };

        let width = parse_extent(w).ok_or_else(|| ReflowError::InvalidSize(value.to_string()))?;
        let height = parse_extent(h).ok_or_else(|| ReflowError::InvalidSize(value.to_string()))?;

        Ok(Self { width, height })
    }

    /// Extent along an axis
    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn with_along(mut self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::Horizontal => self.width = value,
            Axis::Vertical => self.height = value,
        }
        self
    }

    pub fn max(self, other: Dimension) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    pub fn min(self, other: Dimension) -> Self {
        Self::new(self.width.min(other.width), self.height.min(other.height))
    }

    pub fn is_unbounded(&self) -> bool {
        self.width == UNBOUNDED && self.height == UNBOUNDED
    }

    pub fn to_ivec2(self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }
}

impl From<IVec2> for Dimension {
    fn from(v: IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.width, self.height)
    }
}

fn parse_extent(token: &str) -> Option<i32> {
    // i64 first so 0x80000000-style values saturate instead of failing
    let value = token.parse::<i64>().ok()?;
    if value < 0 {
        return None;
    }
    Some(value.min(UNBOUNDED as i64) as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Absolute placement of one child, relative to its container's origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayoutBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl LayoutBox {
    pub const ZERO: LayoutBox = LayoutBox {
        left: 0,
        top: 0,
        width: 0,
        height: 0,
    };

    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn at(position: IVec2, size: Dimension) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn position(&self) -> IVec2 {
        IVec2::new(self.left, self.top)
    }

    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    pub fn translate(self, offset: IVec2) -> Self {
        Self {
            left: self.left.saturating_add(offset.x),
            top: self.top.saturating_add(offset.y),
            ..self
        }
    }
}

/// Container margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Insets {
    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    pub fn vertical(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }

    /// Sum of both margins along an axis
    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.horizontal(),
            Axis::Vertical => self.vertical(),
        }
    }

    /// Leading margin (left or top) along an axis
    pub fn leading(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    pub fn trailing(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.right,
            Axis::Vertical => self.bottom,
        }
    }

    pub fn origin(&self) -> IVec2 {
        IVec2::new(self.left, self.top)
    }

    /// Area left inside `outer` once the margins are taken off
    pub fn shrink(&self, outer: Dimension) -> Dimension {
        Dimension::new(
            (outer.width - self.horizontal()).max(0),
            (outer.height - self.vertical()).max(0),
        )
    }

    /// Outer size needed to fit `inner` plus the margins
    pub fn grow(&self, inner: Dimension) -> Dimension {
        Dimension::new(
            inner.width.saturating_add(self.horizontal()),
            inner.height.saturating_add(self.vertical()),
        )
    }
}

/// Horizontal and vertical spacing between children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gaps {
    pub horizontal: i32,
    pub vertical: i32,
}

impl Gaps {
    pub fn new(horizontal: i32, vertical: i32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

/// The three size hints a child reports to its layout parent.
///
/// Construction clamps so `minimum <= preferred <= maximum` holds
/// component-wise; layout engines rely on that and never clamp again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeReport {
    pub preferred: Dimension,
    pub minimum: Dimension,
    pub maximum: Dimension,
}

impl SizeReport {
    pub fn new(preferred: Dimension, minimum: Dimension, maximum: Dimension) -> Self {
        let minimum = minimum.max(Dimension::ZERO);
        let maximum = maximum.max(minimum);
        let preferred = preferred.max(minimum).min(maximum);
        Self {
            preferred,
            minimum,
            maximum,
        }
    }

    /// Only a preferred size; no minimum and no maximum
    pub fn preferred(preferred: Dimension) -> Self {
        Self::new(preferred, Dimension::ZERO, Dimension::UNBOUNDED)
    }

    /// Combine a measured size with the optional sizes set by the server.
    /// Absent entries mean "use measured" for preferred, zero for minimum
    /// and unbounded for maximum.
    pub fn from_hints(
        measured: Dimension,
        preferred: Option<Dimension>,
        minimum: Option<Dimension>,
        maximum: Option<Dimension>,
    ) -> Self {
        Self::new(
            preferred.unwrap_or(measured),
            minimum.unwrap_or(Dimension::ZERO),
            maximum.unwrap_or(Dimension::UNBOUNDED),
        )
    }

    /// Same as [`SizeReport::from_hints`] but taking raw size strings
    pub fn from_strings(
        measured: Dimension,
        preferred: Option<&str>,
        minimum: Option<&str>,
        maximum: Option<&str>,
    ) -> Result<Self> {
        let parse = |value: Option<&str>| value.map(Dimension::parse).transpose();
        Ok(Self::from_hints(
            measured,
            parse(preferred)?,
            parse(minimum)?,
            parse(maximum)?,
        ))
    }
}

impl Default for SizeReport {
    fn default() -> Self {
        Self::preferred(Dimension::ZERO)
    }
}
