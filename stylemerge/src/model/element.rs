//! Structural elements of a parsed document

use super::text_run::TextRun;
use std::fmt;
use std::str::FromStr;

/// Deepest heading level the engine distinguishes
pub const MAX_HEADING_LEVEL: u8 = 4;

/// Structural classification of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    /// Heading level 1 to 4
    Heading(u8),
    /// Ordinary body paragraph
    Body,
    /// Item of an ordinal (numbered) list
    NumberedItem,
    /// Item of a bulleted list
    BulletedItem,
}

impl ElementKind {
    /// Every kind a style map must be able to resolve
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Heading(1),
        ElementKind::Heading(2),
        ElementKind::Heading(3),
        ElementKind::Heading(4),
        ElementKind::Body,
        ElementKind::NumberedItem,
        ElementKind::BulletedItem,
    ];

    /// Heading kind for a 1-based level, `None` outside 1..=4
    pub fn heading(level: u8) -> Option<Self> {
        (1..=MAX_HEADING_LEVEL)
            .contains(&level)
            .then_some(ElementKind::Heading(level))
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, ElementKind::Heading(_))
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, ElementKind::NumberedItem | ElementKind::BulletedItem)
    }

    /// Config/CLI name of the kind (`heading1`, `body`, `numbered`, `bulleted`)
    pub fn key(&self) -> String {
        match self {
            ElementKind::Heading(level) => format!("heading{}", level),
            ElementKind::Body => "body".to_string(),
            ElementKind::NumberedItem => "numbered".to_string(),
            ElementKind::BulletedItem => "bulleted".to_string(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Heading(level) => write!(f, "Heading {}", level),
            ElementKind::Body => write!(f, "Body"),
            ElementKind::NumberedItem => write!(f, "Numbered item"),
            ElementKind::BulletedItem => write!(f, "Bulleted item"),
        }
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "body" => Ok(ElementKind::Body),
            "numbered" => Ok(ElementKind::NumberedItem),
            "bulleted" => Ok(ElementKind::BulletedItem),
            _ => key
                .strip_prefix("heading")
                .and_then(|level| level.parse::<u8>().ok())
                .and_then(ElementKind::heading)
                .ok_or_else(|| format!("unknown element kind '{}'", s)),
        }
    }
}

/// Whether a list shows ordinals or symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListFamily {
    Ordinal,
    Bullet,
}

impl ListFamily {
    /// Classify a `w:numFmt` value
    pub fn from_format(format: &str) -> Self {
        if format == "bullet" {
            ListFamily::Bullet
        } else {
            ListFamily::Ordinal
        }
    }

    /// Element kind a plain paragraph of this list family becomes
    pub fn item_kind(&self) -> ElementKind {
        match self {
            ListFamily::Ordinal => ElementKind::NumberedItem,
            ListFamily::Bullet => ElementKind::BulletedItem,
        }
    }
}

/// Numbering attached to a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListInfo {
    /// Document-local numbering instance (`w:numId`)
    pub num_id: String,
    /// Zero-based list level (`w:ilvl`)
    pub level: u8,
    /// Ordinal or bullet list
    pub family: ListFamily,
    /// Level format (`decimal`, `lowerLetter`, `bullet`, ...)
    pub format: String,
    /// Counter value this item displays
    pub ordinal: u32,
}

/// One structural unit of a document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentElement {
    /// Structural classification
    pub kind: ElementKind,
    /// Formatted text content, in order
    pub runs: Vec<TextRun>,
    /// Numbering, for list items
    pub list: Option<ListInfo>,
    /// Paragraph style id inside the source document (not portable)
    pub style_id: Option<String>,
    /// Nesting depth for list items, 0 otherwise
    pub indent_level: u8,
}

impl DocumentElement {
    /// Create an unnumbered element
    pub fn new(kind: ElementKind, runs: Vec<TextRun>) -> Self {
        Self {
            kind,
            runs,
            list: None,
            style_id: None,
            indent_level: 0,
        }
    }

    /// Attach numbering to the element
    pub fn with_list(mut self, list: ListInfo) -> Self {
        self.indent_level = list.level;
        self.list = Some(list);
        self
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}
