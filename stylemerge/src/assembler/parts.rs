//! Splicing generated content into the authority's XML parts
//!
//! Parts are edited as text so everything the engine does not understand
//! survives byte for byte.

use super::paragraph::escape_xml;
use crate::error::PackagingError;
use crate::model::{
    ElementStyle, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART, NUMBERING_PART,
    STYLES_PART,
};
use crate::parser::{StyleSheet, WML_NS};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static RELATIONSHIP_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Id="rId(\d+)""#).unwrap_or_else(|e| panic!("invalid relationship pattern: {e}"))
});

/// Opening tag of the first `w:num` (not `w:numbering`, `w:numPicBullet`, ...)
static FIRST_NUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:num[\s>/]").unwrap_or_else(|e| panic!("invalid numbering pattern: {e}"))
});

const NUMBERING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const NUMBERING_RELATIONSHIP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const STYLES_RELATIONSHIP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

fn malformed(part: &str, reason: impl Into<String>) -> PackagingError {
    PackagingError::Malformed {
        part: part.to_string(),
        reason: reason.into(),
    }
}

/// Insert `content` before the last occurrence of `closing`
fn insert_before_closing(
    xml: &str,
    closing: &str,
    content: &str,
    part: &str,
) -> Result<String, PackagingError> {
    let pos = xml
        .rfind(closing)
        .ok_or_else(|| malformed(part, format!("could not find {}", closing)))?;
    let mut result = String::with_capacity(xml.len() + content.len());
    result.push_str(&xml[..pos]);
    result.push_str(content);
    result.push_str(&xml[pos..]);
    Ok(result)
}

/// Byte offsets of `w:body` inside `document.xml`
struct BodyLayout {
    /// The whole `w:body` element
    element: Range<usize>,
    /// Between the opening and closing tags; `None` for `<w:body/>`
    inner: Option<Range<usize>>,
    /// The final body-level `w:sectPr`
    section: Option<Range<usize>>,
}

impl BodyLayout {
    fn locate(document_xml: &str) -> Result<Self, PackagingError> {
        let doc = roxmltree::Document::parse(document_xml)
            .map_err(|e| malformed(DOCUMENT_PART, e.to_string()))?;
        let root = doc.root_element();

        if root.lookup_prefix(WML_NS) != Some("w") {
            return Err(malformed(
                DOCUMENT_PART,
                "WordprocessingML namespace is not bound to the 'w' prefix",
            ));
        }

        let body = root
            .children()
            .find(|n| {
                n.is_element()
                    && n.tag_name().name() == "body"
                    && n.tag_name().namespace() == Some(WML_NS)
            })
            .ok_or_else(|| malformed(DOCUMENT_PART, "could not find <w:body>"))?;

        let element = body.range();
        let text = &document_xml[element.clone()];
        if text.ends_with("/>") {
            return Ok(Self {
                element,
                inner: None,
                section: None,
            });
        }

        let open_end = text
            .find('>')
            .map(|pos| element.start + pos + 1)
            .ok_or_else(|| malformed(DOCUMENT_PART, "unterminated <w:body> tag"))?;
        let close_start = text
            .rfind("</")
            .map(|pos| element.start + pos)
            .ok_or_else(|| malformed(DOCUMENT_PART, "could not find </w:body>"))?;

        let section = body
            .children()
            .rev()
            .find(|n| n.is_element())
            .filter(|n| n.tag_name().name() == "sectPr" && n.tag_name().namespace() == Some(WML_NS))
            .map(|n| n.range());

        Ok(Self {
            element,
            inner: Some(open_end..close_start),
            section,
        })
    }
}

/// `document_xml` with `<w:body/>` expanded around `content`
fn fill_empty_body(document_xml: &str, element: &Range<usize>, content: &str) -> String {
    let mut result = String::with_capacity(document_xml.len() + content.len());
    result.push_str(&document_xml[..element.start]);
    result.push_str("<w:body>");
    result.push_str(content);
    result.push_str("</w:body>");
    result.push_str(&document_xml[element.end..]);
    result
}

/// Replace the body of `document.xml` with `content`
///
/// The root element, its namespace declarations and the final section
/// properties of the body are kept.
pub fn replace_body(document_xml: &str, content: &str) -> Result<String, PackagingError> {
    let layout = BodyLayout::locate(document_xml)?;
    let Some(inner) = layout.inner else {
        return Ok(fill_empty_body(document_xml, &layout.element, content));
    };

    let mut result = String::with_capacity(document_xml.len() + content.len());
    result.push_str(&document_xml[..inner.start]);
    result.push_str(content);
    if let Some(section) = layout.section {
        result.push_str(&document_xml[section]);
    }
    result.push_str(&document_xml[inner.end..]);
    Ok(result)
}

/// Insert `content` after the existing body children of `document.xml`
///
/// Everything already in the body stays byte for byte; `content` lands
/// before the final section properties.
pub fn append_to_body(document_xml: &str, content: &str) -> Result<String, PackagingError> {
    let layout = BodyLayout::locate(document_xml)?;
    let Some(inner) = layout.inner else {
        return Ok(fill_empty_body(document_xml, &layout.element, content));
    };

    let at = layout.section.map_or(inner.end, |section| section.start);
    let mut result = String::with_capacity(document_xml.len() + content.len());
    result.push_str(&document_xml[..at]);
    result.push_str(content);
    result.push_str(&document_xml[at..]);
    Ok(result)
}

/// Append definitions for style ids `styles_xml` does not define
///
/// Returns `None` when every style is already defined.
pub fn ensure_styles(
    styles_xml: &str,
    required: &[&ElementStyle],
) -> Result<Option<String>, PackagingError> {
    let sheet = StyleSheet::parse(styles_xml).map_err(|e| malformed(STYLES_PART, e.to_string()))?;
    let missing: Vec<&ElementStyle> = required
        .iter()
        .copied()
        .filter(|style| !sheet.defines_paragraph_style(&style.style_id))
        .collect();

    if missing.is_empty() {
        return Ok(None);
    }

    for style in &missing {
        log::info!("Adding missing style definition '{}'", style.style_id);
    }
    let definitions: String = missing.iter().map(|style| style_xml(style)).collect();
    insert_before_closing(styles_xml, "</w:styles>", &definitions, STYLES_PART).map(Some)
}

/// A new `word/styles.xml` holding only `required`
pub fn new_styles_part(required: &[&ElementStyle]) -> String {
    let definitions: String = required.iter().map(|style| style_xml(style)).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{}">{}</w:styles>"#,
        WML_NS, definitions
    )
}

/// Paragraph style definition derived from a resolved style
fn style_xml(style: &ElementStyle) -> String {
    let mut xml = format!(
        r#"<w:style w:type="paragraph" w:customStyle="1" w:styleId="{}"><w:name w:val="{}"/><w:qFormat/><w:pPr>"#,
        escape_xml(&style.style_id),
        escape_xml(&style.style_name)
    );
    xml.push_str(&format!(
        r#"<w:spacing w:line="{}" w:lineRule="auto"/>"#,
        style.line_spacing
    ));
    if style.indent_left != 0 || style.indent_hanging != 0 {
        xml.push_str(&format!(
            r#"<w:ind w:left="{}" w:hanging="{}"/>"#,
            style.indent_left, style.indent_hanging
        ));
    }
    xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, style.alignment.to_ooxml()));
    xml.push_str("</w:pPr><w:rPr>");
    xml.push_str(&format!(
        r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
        escape_xml(&style.font_family)
    ));
    if style.bold {
        xml.push_str("<w:b/><w:bCs/>");
    }
    if style.italic {
        xml.push_str("<w:i/><w:iCs/>");
    }
    xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape_xml(&style.color)));
    xml.push_str(&format!(
        r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
        style.font_size
    ));
    xml.push_str("</w:rPr></w:style>");
    xml
}

/// Append generated abstract definitions and instances to `numbering.xml`
pub fn extend_numbering(
    numbering_xml: &str,
    abstracts: &str,
    nums: &str,
) -> Result<String, PackagingError> {
    // Abstract definitions must precede every instance
    let with_abstracts = match FIRST_NUM.find(numbering_xml) {
        Some(first_num) if !abstracts.is_empty() => {
            let mut result = String::with_capacity(numbering_xml.len() + abstracts.len());
            result.push_str(&numbering_xml[..first_num.start()]);
            result.push_str(abstracts);
            result.push_str(&numbering_xml[first_num.start()..]);
            result
        }
        _ => insert_before_closing(numbering_xml, "</w:numbering>", abstracts, NUMBERING_PART)?,
    };
    insert_before_closing(&with_abstracts, "</w:numbering>", nums, NUMBERING_PART)
}

/// A new `word/numbering.xml`
pub fn new_numbering_part(abstracts: &str, nums: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="{}">{}{}</w:numbering>"#,
        WML_NS, abstracts, nums
    )
}

/// Which created parts must be registered with the package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedPart {
    Styles,
    Numbering,
}

impl CreatedPart {
    fn part_name(self) -> &'static str {
        match self {
            CreatedPart::Styles => STYLES_PART,
            CreatedPart::Numbering => NUMBERING_PART,
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            CreatedPart::Styles => STYLES_CONTENT_TYPE,
            CreatedPart::Numbering => NUMBERING_CONTENT_TYPE,
        }
    }

    fn relationship(self) -> &'static str {
        match self {
            CreatedPart::Styles => STYLES_RELATIONSHIP,
            CreatedPart::Numbering => NUMBERING_RELATIONSHIP,
        }
    }
}

/// Ensure `[Content_Types].xml` declares the created part
pub fn register_content_type(
    content_types_xml: &str,
    part: CreatedPart,
) -> Result<String, PackagingError> {
    let part_name = format!("/{}", part.part_name());
    if content_types_xml.contains(&format!(r#"PartName="{}""#, part_name)) {
        return Ok(content_types_xml.to_string());
    }
    let entry = format!(
        r#"<Override PartName="{}" ContentType="{}"/>"#,
        part_name,
        part.content_type()
    );
    insert_before_closing(content_types_xml, "</Types>", &entry, CONTENT_TYPES_PART)
}

/// Ensure the document relationships point at the created part
pub fn register_relationship(rels_xml: &str, part: CreatedPart) -> Result<String, PackagingError> {
    if rels_xml.contains(part.relationship()) {
        return Ok(rels_xml.to_string());
    }

    let next_id = RELATIONSHIP_ID
        .captures_iter(rels_xml)
        .filter_map(|caps| caps.get(1).and_then(|id| id.as_str().parse::<u32>().ok()))
        .max()
        .unwrap_or(0)
        + 1;
    let target = part
        .part_name()
        .strip_prefix("word/")
        .unwrap_or(part.part_name());
    let entry = format!(
        r#"<Relationship Id="rId{}" Type="{}" Target="{}"/>"#,
        next_id,
        part.relationship(),
        target
    );
    insert_before_closing(rels_xml, "</Relationships>", &entry, DOCUMENT_RELS_PART)
}
