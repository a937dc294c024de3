//! # Cell Values
//!
//! The value type carried by every grid cell, whether the grid is backed by a
//! document table or a spreadsheet tab.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A hyperlink with display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

impl Link {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Value held by a single grid cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Link(Link),
}

impl CellValue {
    /// Infer a typed value from the plain text of a document table cell.
    ///
    /// `""` becomes `Empty`, finite numbers become `Number`, `true`/`false` in any
    /// case become `Bool`, anything else stays `Text`.
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(num) = trimmed.parse::<f64>() {
            if num.is_finite() {
                return CellValue::Number(num);
            }
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "true" => CellValue::Bool(true),
            "false" => CellValue::Bool(false),
            _ => CellValue::Text(text.to_string()),
        }
    }

    /// Absent and empty-string values count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Loose equality used for change suppression.
    ///
    /// Blank values are all equal to each other. Links only equal links with the
    /// same url and text. Everything else compares by display string, so
    /// `Number(1.0)` equals `Text("1")`.
    pub fn loose_eq(&self, other: &CellValue) -> bool {
        match (self, other) {
            (a, b) if a.is_blank() && b.is_blank() => true,
            (CellValue::Link(a), CellValue::Link(b)) => a == b,
            (CellValue::Link(_), _) | (_, CellValue::Link(_)) => false,
            (a, b) => a == b || a.to_string() == b.to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Link(link) => Some(&link.text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            CellValue::Link(link) => Some(link),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => f.write_str(s),
            CellValue::Link(link) => f.write_str(&link.text),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<Link> for CellValue {
    fn from(link: Link) -> Self {
        CellValue::Link(link)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Drop trailing empty cells from each row, then trailing empty rows
pub fn trim_rows(rows: Vec<Vec<CellValue>>) -> Vec<Vec<CellValue>> {
    let mut rows: Vec<Vec<CellValue>> = rows
        .into_iter()
        .map(|mut row| {
            while matches!(row.last(), Some(CellValue::Empty)) {
                row.pop();
            }
            row
        })
        .collect();

    while matches!(rows.last(), Some(row) if row.is_empty()) {
        rows.pop();
    }

    rows
}
