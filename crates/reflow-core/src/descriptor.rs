// crates/reflow-core/src/descriptor.rs
//! Decoder for the comma separated layout descriptors sent by the server.
//!
//! ```text
//! FormLayout,mt,ml,mb,mr,hgap,vgap,halign,valign[,anchors]
//! FlowLayout,mt,ml,mb,mr,hgap,vgap,orientation,halign,valign,inner[,autowrap]
//! BorderLayout,mt,ml,mb,mr,hgap,vgap
//! GridLayout,mt,ml,mb,mr,hgap,vgap,columns,rows
//! NullLayout[,mt,ml,mb,mr]
//! ```
//!
//! Only the leading kind keyword is mandatory. Every other token falls back
//! to a default when it is missing or not a number.

use tracing::trace;

use crate::geometry::{Gaps, Insets};
use crate::{ReflowError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Form,
    Flow,
    Border,
    Grid,
    Null,
}

impl LayoutKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "FormLayout" => Some(LayoutKind::Form),
            "FlowLayout" => Some(LayoutKind::Flow),
            "BorderLayout" => Some(LayoutKind::Border),
            "GridLayout" => Some(LayoutKind::Grid),
            "NullLayout" => Some(LayoutKind::Null),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            LayoutKind::Form => "FormLayout",
            LayoutKind::Flow => "FlowLayout",
            LayoutKind::Border => "BorderLayout",
            LayoutKind::Grid => "GridLayout",
            LayoutKind::Null => "NullLayout",
        }
    }
}

/// Alignment along one axis. `Start` is left or top, `End` is right or bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

impl Alignment {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Alignment::Start),
            1 => Some(Alignment::Center),
            2 => Some(Alignment::End),
            3 => Some(Alignment::Stretch),
            _ => None,
        }
    }

    /// Offset of an item of `used` pixels inside `available` pixels.
    /// `Stretch` positions like `Start`; callers size the item themselves.
    pub fn offset(self, available: i32, used: i32) -> i32 {
        match self {
            Alignment::Start | Alignment::Stretch => 0,
            Alignment::Center => (available - used) / 2,
            Alignment::End => available - used,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Parsed, immutable description of one container's layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDescriptor {
    pub kind: LayoutKind,
    pub margins: Insets,
    pub gaps: Gaps,
    pub orientation: Orientation,
    pub horizontal_alignment: Alignment,
    pub vertical_alignment: Alignment,
    pub inner_alignment: Alignment,
    /// Carried for completeness, flow layouts never wrap
    pub auto_wrap: bool,
    pub columns: i32,
    pub rows: i32,
    /// Raw `name,related,auto,position` anchor records of a form layout
    pub anchor_data: Vec<String>,
}

impl LayoutDescriptor {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            margins: Insets::default(),
            gaps: Gaps::default(),
            orientation: Orientation::Horizontal,
            horizontal_alignment: Alignment::Start,
            vertical_alignment: Alignment::Start,
            inner_alignment: Alignment::Start,
            auto_wrap: false,
            columns: 0,
            rows: 0,
            anchor_data: Vec::new(),
        }
    }

    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        let keyword = source.split(',').next().unwrap_or_default().trim();
        let kind = LayoutKind::from_keyword(keyword)
            .ok_or_else(|| ReflowError::UnknownLayout(keyword.to_string()))?;

        let mut descriptor = Self::new(kind);

        // Form anchors contain commas themselves, so they are split off
        // before the numeric fields are tokenized.
        let (fields, anchors) = if kind == LayoutKind::Form {
            let mut parts = source.splitn(10, ',');
            let fields: Vec<&str> = parts.by_ref().take(9).collect();
            (fields, parts.next())
        } else {
            (source.split(',').collect(), None)
        };

        let tokens = Tokens(&fields[1..]);

        descriptor.margins = Insets::new(
            tokens.pixels(0),
            tokens.pixels(1),
            tokens.pixels(2),
            tokens.pixels(3),
        );

        match kind {
            LayoutKind::Form => {
                descriptor.gaps = Gaps::new(tokens.pixels(4), tokens.pixels(5));
                descriptor.horizontal_alignment = tokens.alignment(6);
                descriptor.vertical_alignment = tokens.alignment(7);
                descriptor.anchor_data = anchors
                    .map(|data| {
                        data.split(';')
                            .map(str::trim)
                            .filter(|record| !record.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
            }
            LayoutKind::Flow => {
                descriptor.gaps = Gaps::new(tokens.pixels(4), tokens.pixels(5));
                descriptor.orientation = match tokens.int(6) {
                    1 => Orientation::Vertical,
                    _ => Orientation::Horizontal,
                };
                descriptor.horizontal_alignment = tokens.alignment(7);
                descriptor.vertical_alignment = tokens.alignment(8);
                descriptor.inner_alignment = tokens.alignment(9);
                descriptor.auto_wrap = matches!(tokens.get(10), Some("true") | Some("1"));
            }
            LayoutKind::Border => {
                descriptor.gaps = Gaps::new(tokens.pixels(4), tokens.pixels(5));
            }
            LayoutKind::Grid => {
                descriptor.gaps = Gaps::new(tokens.pixels(4), tokens.pixels(5));
                descriptor.columns = tokens.int(6);
                descriptor.rows = tokens.int(7);
            }
            LayoutKind::Null => {}
        }

        trace!("Parsed {} descriptor: {:?}", kind.keyword(), descriptor);
        Ok(descriptor)
    }
}

impl std::str::FromStr for LayoutDescriptor {
    type Err = ReflowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

struct Tokens<'a>(&'a [&'a str]);

impl Tokens<'_> {
    fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|token| token.trim())
    }

    fn int(&self, index: usize) -> i32 {
        self.get(index)
            .and_then(|token| token.parse().ok())
            .unwrap_or(0)
    }

    fn pixels(&self, index: usize) -> i32 {
        self.int(index).max(0)
    }

    fn alignment(&self, index: usize) -> Alignment {
        self.get(index)
            .and_then(|token| token.parse().ok())
            .and_then(Alignment::from_code)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_layout() {
        let d = LayoutDescriptor::parse("FormLayout,5,6,7,8,10,11,1,2,l0,lm,-,0;r0,l0,a,0").unwrap();
        assert_eq!(d.kind, LayoutKind::Form);
        assert_eq!(d.margins, Insets::new(5, 6, 7, 8));
        assert_eq!(d.gaps, Gaps::new(10, 11));
        assert_eq!(d.horizontal_alignment, Alignment::Center);
        assert_eq!(d.vertical_alignment, Alignment::End);
        assert_eq!(d.anchor_data, vec!["l0,lm,-,0", "r0,l0,a,0"]);
    }

    #[test]
    fn test_parse_form_without_anchors() {
        let d = LayoutDescriptor::parse("FormLayout,1,1,1,1,0,0,0,0").unwrap();
        assert!(d.anchor_data.is_empty());

        let d = LayoutDescriptor::parse("FormLayout,1,1,1,1,0,0,0,0,").unwrap();
        assert!(d.anchor_data.is_empty());
    }

    #[test]
    fn test_parse_flow_layout() {
        let d = LayoutDescriptor::parse("FlowLayout,0,0,0,0,10,5,1,1,3,2,true").unwrap();
        assert_eq!(d.orientation, Orientation::Vertical);
        assert_eq!(d.horizontal_alignment, Alignment::Center);
        assert_eq!(d.vertical_alignment, Alignment::Stretch);
        assert_eq!(d.inner_alignment, Alignment::End);
        assert!(d.auto_wrap);
    }

    #[test]
    fn test_missing_trailing_tokens_use_defaults() {
        let d = LayoutDescriptor::parse("FlowLayout,2,2").unwrap();
        assert_eq!(d.margins, Insets::new(2, 2, 0, 0));
        assert_eq!(d.gaps, Gaps::default());
        assert_eq!(d.orientation, Orientation::Horizontal);
        assert_eq!(d.horizontal_alignment, Alignment::Start);
        assert_eq!(d.inner_alignment, Alignment::Start);
        assert!(!d.auto_wrap);
    }

    #[test]
    fn test_non_numeric_tokens_default_to_zero() {
        let d = LayoutDescriptor::parse("GridLayout,x,5,-3,5,gap,4,2,two").unwrap();
        assert_eq!(d.margins, Insets::new(0, 5, 0, 5));
        assert_eq!(d.gaps, Gaps::new(0, 4));
        assert_eq!(d.columns, 2);
        assert_eq!(d.rows, 0);
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let err = LayoutDescriptor::parse("CardLayout,0,0,0,0").unwrap_err();
        assert!(matches!(err, ReflowError::UnknownLayout(k) if k == "CardLayout"));
        assert!(LayoutDescriptor::parse("").is_err());
    }

    #[test]
    fn test_alignment_offset() {
        assert_eq!(Alignment::Start.offset(300, 170), 0);
        assert_eq!(Alignment::Center.offset(300, 170), 65);
        assert_eq!(Alignment::End.offset(300, 170), 130);
        assert_eq!(Alignment::Stretch.offset(300, 170), 0);
    }
}
