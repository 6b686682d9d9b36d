//! Resolved paragraph styles and the per-document style map

use super::element::{ElementKind, MAX_HEADING_LEVEL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Line spacing value Word uses for single spacing (240ths of a line)
pub const SINGLE_LINE_SPACING: u32 = 240;

/// Paragraph alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse a `w:jc` value
    pub fn from_ooxml(val: &str) -> Option<Self> {
        match val {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" => Some(Alignment::Justify),
            _ => None,
        }
    }

    /// The `w:jc` value for this alignment
    pub fn to_ooxml(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

/// Fully resolved formatting of one element kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Paragraph style id inside the style authority
    pub style_id: String,
    /// Human-readable style name (`heading 1`, `Normal`, ...)
    pub style_name: String,
    /// Font family
    pub font_family: String,
    /// Font size in half-points
    pub font_size: u32,
    /// Bold weight
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Text color as RRGGBB hex
    pub color: String,
    /// Paragraph alignment
    pub alignment: Alignment,
    /// Line spacing in 240ths of a line
    pub line_spacing: u32,
    /// Left indentation in twips
    pub indent_left: i32,
    /// Hanging indentation in twips
    pub indent_hanging: i32,
    /// Set once a caller edited this entry; edited entries are written as direct formatting
    #[serde(default)]
    pub overridden: bool,
}

/// Partial edit of an [`ElementStyle`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementStylePatch {
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<String>,
    pub alignment: Option<Alignment>,
    pub line_spacing: Option<u32>,
    pub indent_left: Option<i32>,
    pub indent_hanging: Option<i32>,
}

impl ElementStylePatch {
    /// Apply the patch on top of `style`, marking the result as overridden
    pub fn apply(&self, style: &ElementStyle) -> ElementStyle {
        let mut patched = style.clone();
        if let Some(font_family) = &self.font_family {
            patched.font_family = font_family.clone();
        }
        if let Some(font_size) = self.font_size {
            patched.font_size = font_size;
        }
        if let Some(bold) = self.bold {
            patched.bold = bold;
        }
        if let Some(italic) = self.italic {
            patched.italic = italic;
        }
        if let Some(color) = &self.color {
            patched.color = color.trim_start_matches('#').to_ascii_uppercase();
        }
        if let Some(alignment) = self.alignment {
            patched.alignment = alignment;
        }
        if let Some(line_spacing) = self.line_spacing {
            patched.line_spacing = line_spacing;
        }
        if let Some(indent_left) = self.indent_left {
            patched.indent_left = indent_left;
        }
        if let Some(indent_hanging) = self.indent_hanging {
            patched.indent_hanging = indent_hanging;
        }
        patched.overridden = true;
        patched
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Page margins in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
    pub header: i32,
    pub footer: i32,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            top: 1440,
            right: 1440,
            bottom: 1440,
            left: 1440,
            header: 720,
            footer: 720,
        }
    }
}

static BUILTIN_STYLES: LazyLock<[ElementStyle; 7]> =
    LazyLock::new(|| ElementKind::ALL.map(builtin_style_for));

fn builtin_style_for(kind: ElementKind) -> ElementStyle {
    let body = ElementStyle {
        style_id: "Normal".to_string(),
        style_name: "Normal".to_string(),
        font_family: "Calibri".to_string(),
        font_size: 22,
        bold: false,
        italic: false,
        color: "000000".to_string(),
        alignment: Alignment::Left,
        line_spacing: SINGLE_LINE_SPACING,
        indent_left: 0,
        indent_hanging: 0,
        overridden: false,
    };

    match kind {
        ElementKind::Heading(level) => {
            let level = level.clamp(1, MAX_HEADING_LEVEL);
            let font_size = match level {
                1 => 32,
                2 => 26,
                3 => 24,
                _ => 22,
            };
            ElementStyle {
                style_id: format!("Heading{}", level),
                style_name: format!("heading {}", level),
                font_family: "Calibri Light".to_string(),
                font_size,
                bold: true,
                color: "2F5496".to_string(),
                ..body
            }
        }
        ElementKind::Body => body,
        ElementKind::NumberedItem | ElementKind::BulletedItem => ElementStyle {
            style_id: "ListParagraph".to_string(),
            style_name: "List Paragraph".to_string(),
            indent_left: 720,
            indent_hanging: 360,
            ..body
        },
    }
}

fn builtin_index(kind: ElementKind) -> usize {
    match kind {
        ElementKind::Heading(level) => usize::from(level.clamp(1, MAX_HEADING_LEVEL) - 1),
        ElementKind::Body => 4,
        ElementKind::NumberedItem => 5,
        ElementKind::BulletedItem => 6,
    }
}

/// Built-in fallback style for a kind
pub fn builtin_style(kind: ElementKind) -> &'static ElementStyle {
    &BUILTIN_STYLES[builtin_index(kind)]
}

/// Default ordinal format for a list level
pub fn default_numbering_format(level: u8) -> &'static str {
    match level % 3 {
        0 => "decimal",
        1 => "lowerLetter",
        _ => "lowerRoman",
    }
}

/// Per-document mapping from element kind to resolved formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStyleMap {
    styles: BTreeMap<ElementKind, ElementStyle>,
    /// Level → `w:numFmt` of the document's primary ordinal list
    pub numbering_formats: BTreeMap<u8, String>,
    /// Page margins of the final section
    pub page_margins: PageMargins,
}

impl DocumentStyleMap {
    /// A style map carrying every built-in default explicitly
    pub fn builtin() -> Self {
        let mut map = Self::default();
        for kind in ElementKind::ALL {
            map.set(kind, builtin_style(kind).clone());
        }
        map
    }

    /// Resolve the style of a kind, falling back to the built-in default
    pub fn resolve(&self, kind: ElementKind) -> &ElementStyle {
        self.styles
            .get(&kind)
            .unwrap_or_else(|| builtin_style(kind))
    }

    /// Whether the document defines its own entry for `kind`
    pub fn is_explicit(&self, kind: ElementKind) -> bool {
        self.styles.contains_key(&kind)
    }

    pub fn set(&mut self, kind: ElementKind, style: ElementStyle) {
        self.styles.insert(kind, style);
    }

    /// Apply a patch to the resolved style of `kind`
    pub fn patch(&mut self, kind: ElementKind, patch: &ElementStylePatch) {
        let patched = patch.apply(self.resolve(kind));
        self.set(kind, patched);
    }

    /// Format string of a list level, falling back to the default cycle
    pub fn numbering_format(&self, level: u8) -> &str {
        self.numbering_formats
            .get(&level)
            .map(String::as_str)
            .unwrap_or_else(|| default_numbering_format(level))
    }

    /// Every kind paired with its resolved style
    pub fn iter_resolved(&self) -> impl Iterator<Item = (ElementKind, &ElementStyle)> {
        ElementKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.resolve(kind)))
    }
}
