//! Merge settings and the policies they select

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the non-main documents are combined with the style authority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// One document; lists continue the main document's numbering
    #[default]
    #[serde(alias = "smart")]
    SmartMerge,
    /// One document; every source list restarts its numbering
    #[serde(alias = "simple")]
    SimpleMerge,
    /// One restyled document per non-main input
    StyleOnly,
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::SmartMerge => write!(f, "smart merge"),
            MergeMode::SimpleMerge => write!(f, "simple merge"),
            MergeMode::StyleOnly => write!(f, "style only"),
        }
    }
}

/// When a list of a merged document continues the main document's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContinuationPolicy {
    /// Every list item continues the counter of its family and level
    #[default]
    Level,
    /// Only items whose level format matches the main document's format continue;
    /// other lists restart as independent lists
    SameFormat,
}

/// Which run-level overrides of merged documents survive restyling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunFormattingPolicy {
    /// Keep every run override
    KeepAll,
    /// Keep bold, italic and underline; drop font, size and color
    #[default]
    KeepEmphasis,
    /// Drop every run override
    Strip,
}

/// What adding a page-description (PDF) file does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageDescriptionPolicy {
    /// Add an explicitly empty document that merges as a no-op
    #[default]
    EmptyDocument,
    /// Refuse the file with an unsupported-format error
    Reject,
}

/// Settings of one merge session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    pub mode: MergeMode,
    pub continuation: ContinuationPolicy,
    pub run_formatting: RunFormattingPolicy,
    /// Start every merged document on a new page
    pub page_break_between_documents: bool,
    pub page_description_input: PageDescriptionPolicy,
    /// Stem of the merged file name; the main document's stem when unset
    pub output_stem: Option<String>,
}

/// Partial update of [`MergeSettings`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettingsPatch {
    pub mode: Option<MergeMode>,
    pub continuation: Option<ContinuationPolicy>,
    pub run_formatting: Option<RunFormattingPolicy>,
    pub page_break_between_documents: Option<bool>,
    pub page_description_input: Option<PageDescriptionPolicy>,
    pub output_stem: Option<String>,
}

impl MergeSettings {
    /// Settings with every field of `patch` that is set applied
    pub fn patched(&self, patch: &MergeSettingsPatch) -> Self {
        Self {
            mode: patch.mode.unwrap_or(self.mode),
            continuation: patch.continuation.unwrap_or(self.continuation),
            run_formatting: patch.run_formatting.unwrap_or(self.run_formatting),
            page_break_between_documents: patch
                .page_break_between_documents
                .unwrap_or(self.page_break_between_documents),
            page_description_input: patch
                .page_description_input
                .unwrap_or(self.page_description_input),
            output_stem: patch
                .output_stem
                .clone()
                .or_else(|| self.output_stem.clone()),
        }
    }
}
