//! Text run representation with formatting overrides
//!
//! A text run is a span of text with consistent formatting applied.
//! Overrides are tri-state: `None` means "inherit from the paragraph style",
//! which is what lets a merged run pick up the style authority's look.

/// A span of text with run-level formatting overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    /// The text content (`\t` for tabs, `\n` for line breaks)
    pub text: String,

    /// Bold override
    pub bold: Option<bool>,

    /// Italic override
    pub italic: Option<bool>,

    /// Underline override
    pub underline: Option<bool>,

    /// Text color override as RRGGBB hex
    pub color: Option<String>,

    /// Font family override
    pub font: Option<String>,

    /// Font size override in half-points
    pub size: Option<u32>,
}

impl TextRun {
    /// Create a new plain text run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Check if this text run overrides anything of its paragraph style
    pub fn has_formatting(&self) -> bool {
        self.bold.is_some()
            || self.italic.is_some()
            || self.underline.is_some()
            || self.color.is_some()
            || self.font.is_some()
            || self.size.is_some()
    }

    /// Keep emphasis overrides, drop the ones that change the typeface look
    pub fn emphasis_only(&self) -> Self {
        Self {
            text: self.text.clone(),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            color: None,
            font: None,
            size: None,
        }
    }

    /// Drop every override
    pub fn plain(&self) -> Self {
        Self::new(self.text.clone())
    }
}
