//! Derived structure summary of a document

use super::element::{DocumentElement, ElementKind, ListFamily};
use std::collections::BTreeSet;

/// Number of list levels whose counters are tracked
pub const TRACKED_LEVELS: usize = 4;

/// Which headings and lists a document uses, and where its counters ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStructure {
    /// Heading levels (1-4) that appear
    pub heading_levels: BTreeSet<u8>,
    /// Whether any ordinal list item appears
    pub has_numbered_lists: bool,
    /// Whether any bulleted list item appears
    pub has_bulleted_lists: bool,
    /// Highest ordinal reached per level by numbered items (and numbered headings)
    pub last_heading_numbers: [u32; TRACKED_LEVELS],
    /// Highest ordinal reached per level by bulleted items
    pub last_bullet_numbers: [u32; TRACKED_LEVELS],
}

impl DocumentStructure {
    /// Summarize an element stream
    pub fn from_elements(elements: &[DocumentElement]) -> Self {
        let mut structure = Self::default();

        for element in elements {
            match element.kind {
                ElementKind::Heading(level) => {
                    structure.heading_levels.insert(level);
                }
                ElementKind::NumberedItem => structure.has_numbered_lists = true,
                ElementKind::BulletedItem => structure.has_bulleted_lists = true,
                ElementKind::Body => {}
            }

            if let Some(list) = &element.list {
                let slot = tracked_level(list.level);
                let counters = match list.family {
                    ListFamily::Ordinal => &mut structure.last_heading_numbers,
                    ListFamily::Bullet => &mut structure.last_bullet_numbers,
                };
                counters[slot] = counters[slot].max(list.ordinal);
            }
        }

        structure
    }

    /// Counters of one list family
    pub fn last_counters(&self, family: ListFamily) -> [u32; TRACKED_LEVELS] {
        match family {
            ListFamily::Ordinal => self.last_heading_numbers,
            ListFamily::Bullet => self.last_bullet_numbers,
        }
    }

    pub fn has_lists(&self) -> bool {
        self.has_numbered_lists || self.has_bulleted_lists
    }
}

/// Counter slot of a list level; levels past the tracked depth share the last slot
pub fn tracked_level(level: u8) -> usize {
    usize::from(level).min(TRACKED_LEVELS - 1)
}
