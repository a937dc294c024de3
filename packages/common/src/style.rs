//! # Styles
//!
//! Formatting requests that can be attached to text ranges, paragraphs and table
//! cells. None of these change the size of the content they cover, so applying
//! them never requires offset recomputation.
//!
//! Each style reports the remote field mask it touches via `fields()`; an empty
//! mask means there is nothing to send.

use serde::{Deserialize, Serialize};

/// RGB color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };

        let channel = |i: usize| -> Option<f32> {
            let byte = u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok()?;
            Some(byte as f32 / 255.0)
        };

        Some(Self {
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
        })
    }
}

/// Character-level formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    /// Point size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = Some(true);
        self
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link = Some(url.into());
        self
    }

    pub fn with_color(mut self, hex: &str) -> Self {
        self.text_color = Color::from_hex(hex);
        self
    }

    pub fn with_font_size(mut self, points: f64) -> Self {
        self.font_size = Some(points);
        self
    }

    /// Remote field mask
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.text_color.is_some() {
            fields.push("foregroundColor");
        }
        if self.bold.is_some() {
            fields.push("bold");
        }
        if self.italic.is_some() {
            fields.push("italic");
        }
        if self.underline.is_some() {
            fields.push("underline");
        }
        if self.strikethrough.is_some() {
            fields.push("strikethrough");
        }
        if self.font_size.is_some() {
            fields.push("fontSize");
        }
        if self.font_family.is_some() {
            fields.push("weightedFontFamily");
        }
        if self.link.is_some() {
            fields.push("link");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alignment {
    Start,
    Center,
    End,
    Justify,
}

/// Paragraph-level formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

impl ParagraphStyle {
    pub fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment: Some(alignment),
        }
    }

    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.alignment.is_some() {
            fields.push("alignment");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

/// Table-cell formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    /// Padding on every side, in inches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VerticalAlignment>,
}

impl TableCellStyle {
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.background_color.is_some() {
            fields.push("backgroundColor");
        }
        if self.padding.is_some() {
            fields.extend(["paddingTop", "paddingBottom", "paddingLeft", "paddingRight"]);
        }
        if self.vertical_alignment.is_some() {
            fields.push("contentAlignment");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// Everything a table cell can be styled with in one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    #[serde(flatten)]
    pub cell: TableCellStyle,
    #[serde(flatten)]
    pub text: TextStyle,
    #[serde(flatten)]
    pub paragraph: ParagraphStyle,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(mut self, cell: TableCellStyle) -> Self {
        self.cell = cell;
        self
    }

    pub fn with_text(mut self, text: TextStyle) -> Self {
        self.text = text;
        self
    }

    pub fn with_paragraph(mut self, paragraph: ParagraphStyle) -> Self {
        self.paragraph = paragraph;
        self
    }
}

/// Bullet glyph presets for list paragraphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BulletPreset {
    Arrow,
    Arrow3d,
    Checkbox,
    Circle,
    Diamond,
    DiamondX,
    HollowDiamond,
    Disc,
    Square,
    Star,
    Alpha,
    UpperAlpha,
    Decimal,
    ZeroDecimal,
    Roman,
    UpperRoman,
    LeftTriangle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let white = Color::from_hex("#fff").unwrap();
        assert_eq!(white, Color { red: 1.0, green: 1.0, blue: 1.0 });

        let blue = Color::from_hex("046492").unwrap();
        assert!((blue.blue - 146.0 / 255.0).abs() < f32::EPSILON);

        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#zzzzzz").is_none());
    }

    #[test]
    fn test_field_masks() {
        let style = TextStyle::new().bold().with_link("https://example.com");
        assert_eq!(style.fields(), vec!["bold", "link"]);
        assert!(TextStyle::new().is_empty());

        let cell = TableCellStyle {
            padding: Some(0.03),
            ..Default::default()
        };
        assert_eq!(cell.fields().len(), 4);
    }

    #[test]
    fn test_bullet_preset_names() {
        assert_eq!(serde_json::to_string(&BulletPreset::Arrow3d).unwrap(), "\"ARROW3D\"");
        assert_eq!(
            serde_json::to_string(&BulletPreset::HollowDiamond).unwrap(),
            "\"HOLLOWDIAMOND\""
        );
    }
}
