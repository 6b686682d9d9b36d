//! Style definitions from `word/styles.xml`

use super::props::Props;
use super::xml::{attr, is_wml, parse_xml, wml, wml_val};
use crate::error::ParseError;
use crate::model::{ElementKind, STYLES_PART};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `Heading 1`, `heading1`, `HEADING 3`, ...
static HEADING_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^heading\s*([1-9])$").unwrap_or_else(|e| panic!("invalid heading pattern: {e}"))
});

/// Longest `basedOn` chain followed before giving up
const MAX_STYLE_DEPTH: usize = 16;

/// One `w:style` definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDef {
    pub id: String,
    pub name: Option<String>,
    pub style_type: String,
    pub based_on: Option<String>,
    pub is_default: bool,
    pub props: Props,
}

impl StyleDef {
    /// Heading level encoded in the style's name or id
    fn named_heading_level(&self) -> Option<u8> {
        self.name
            .as_deref()
            .and_then(heading_level_of)
            .or_else(|| heading_level_of(&self.id))
    }

    fn matches(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|candidate| {
            self.id.eq_ignore_ascii_case(candidate)
                || self
                    .name
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(candidate))
        })
    }
}

/// Heading level (1-9) of a style name such as `heading 2`
pub fn heading_level_of(name: &str) -> Option<u8> {
    HEADING_NAME
        .captures(name.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|level| level.as_str().parse().ok())
}

/// All paragraph styles of a document plus its defaults
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    /// `w:docDefaults` formatting
    pub defaults: Props,
    styles: HashMap<String, StyleDef>,
    default_paragraph: Option<String>,
}

impl StyleSheet {
    /// Parse `word/styles.xml`
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let doc = parse_xml(STYLES_PART, xml)?;
        let root = doc.root_element();
        let mut sheet = Self::default();

        if let Some(doc_defaults) = wml(root, "docDefaults") {
            let ppr = wml(doc_defaults, "pPrDefault").and_then(|n| wml(n, "pPr"));
            let rpr = wml(doc_defaults, "rPrDefault").and_then(|n| wml(n, "rPr"));
            sheet.defaults = Props::read(ppr, rpr);
        }

        for node in root.children().filter(|n| is_wml(*n, "style")) {
            let Some(id) = attr(node, "styleId") else {
                continue;
            };
            let style_type = attr(node, "type").unwrap_or("paragraph").to_string();
            let is_default = attr(node, "default").is_some_and(|v| v == "1" || v == "true");

            if is_default && style_type == "paragraph" && sheet.default_paragraph.is_none() {
                sheet.default_paragraph = Some(id.to_string());
            }

            let def = StyleDef {
                id: id.to_string(),
                name: wml_val(node, "name").map(str::to_string),
                style_type,
                based_on: wml_val(node, "basedOn").map(str::to_string),
                is_default,
                props: Props::read(wml(node, "pPr"), wml(node, "rPr")),
            };
            sheet.styles.insert(def.id.clone(), def);
        }

        log::debug!("Parsed {} style definitions", sheet.styles.len());
        Ok(sheet)
    }

    pub fn get(&self, id: &str) -> Option<&StyleDef> {
        self.styles.get(id)
    }

    /// Whether `id` names a paragraph style; character and table styles may share ids
    pub fn defines_paragraph_style(&self, id: &str) -> bool {
        self.styles
            .get(id)
            .is_some_and(|def| def.style_type == "paragraph")
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Id of the paragraph style applied to paragraphs without `w:pStyle`
    pub fn default_paragraph_id(&self) -> Option<&str> {
        self.default_paragraph.as_deref()
    }

    /// The style and its `basedOn` ancestors, nearest first
    pub fn chain(&self, id: &str) -> Vec<&StyleDef> {
        let mut chain: Vec<&StyleDef> = Vec::new();
        let mut next = Some(id);

        while let Some(current) = next {
            if chain.len() >= MAX_STYLE_DEPTH || chain.iter().any(|s| s.id == current) {
                log::warn!("Style chain of '{}' is cyclic or too deep", id);
                break;
            }
            let Some(def) = self.styles.get(current) else {
                break;
            };
            chain.push(def);
            next = def.based_on.as_deref();
        }

        chain
    }

    /// Formatting the style chain assigns, nearest definition winning
    pub fn resolved_props(&self, id: &str) -> Props {
        let mut props = Props::default();
        for def in self.chain(id) {
            props.fill_from(&def.props);
        }
        props
    }

    /// Heading level of a paragraph style from its name, ancestors, or outline level
    pub fn heading_level(&self, id: &str) -> Option<u8> {
        let chain = self.chain(id);
        chain
            .iter()
            .find_map(|def| def.named_heading_level())
            .or_else(|| {
                chain
                    .iter()
                    .find_map(|def| def.props.outline_level)
                    .map(|outline| outline.saturating_add(1))
            })
            .or_else(|| {
                // Undefined style ids still carry their conventional meaning
                chain.is_empty().then(|| heading_level_of(id)).flatten()
            })
    }

    /// The paragraph style a document defines for an element kind, if any
    pub fn paragraph_style_for(&self, kind: ElementKind) -> Option<&StyleDef> {
        let mut paragraph_styles: Vec<&StyleDef> = self
            .styles
            .values()
            .filter(|def| def.style_type == "paragraph")
            .collect();
        paragraph_styles.sort_by(|a, b| a.id.cmp(&b.id));

        match kind {
            ElementKind::Heading(level) => paragraph_styles
                .into_iter()
                .find(|def| def.named_heading_level() == Some(level)),
            ElementKind::Body => self
                .default_paragraph
                .as_deref()
                .and_then(|id| self.styles.get(id))
                .or_else(|| paragraph_styles.into_iter().find(|def| def.matches(&["Normal"]))),
            ElementKind::NumberedItem => find_first(
                &paragraph_styles,
                &[&["ListNumber", "List Number"], &["ListParagraph", "List Paragraph"]],
            ),
            ElementKind::BulletedItem => find_first(
                &paragraph_styles,
                &[&["ListBullet", "List Bullet"], &["ListParagraph", "List Paragraph"]],
            ),
        }
    }
}

fn find_first<'a>(styles: &[&'a StyleDef], preferences: &[&[&str]]) -> Option<&'a StyleDef> {
    preferences
        .iter()
        .find_map(|candidates| styles.iter().copied().find(|def| def.matches(candidates)))
}
