//! Structural parser
//!
//! Turns the raw bytes of one input file into a [`ParsedDocument`]: a
//! canonical element stream, the style map derived from it and a summary of
//! its heading and list structure.

mod body;
mod cascade;
mod numbering;
mod package;
mod props;
mod styles;
mod xml;

pub use cascade::{resolve_element_style, resolve_props, ResolveContext, Resolver, CASCADE};
pub use numbering::{AbstractNum, LevelDef, ListCounters, NumInstance, NumberingDefinitions};
pub use package::read_package;
pub use props::{NumRef, Props};
pub use styles::{heading_level_of, StyleDef, StyleSheet};
pub(crate) use xml::part_text;
pub use xml::WML_NS;

use crate::error::ParseError;
use crate::model::{
    DocumentElement, DocumentId, DocumentStructure, DocumentStyleMap, ElementKind, ElementStyle,
    ListFamily, Package, ParsedDocument, SourceType, TextRun, DOCUMENT_PART, NUMBERING_PART, STYLES_PART,
};
use itertools::Itertools;
use std::sync::Arc;

/// Parse one input file
///
/// Page-description and unknown inputs yield an explicitly empty document
/// with `supported = false`; callers decide whether to keep it.
pub fn parse_document(
    id: DocumentId,
    name: &str,
    bytes: &[u8],
    source_type: SourceType,
) -> Result<ParsedDocument, ParseError> {
    log::info!("Parsing '{}' as {}", name, source_type);

    match source_type {
        SourceType::Container => parse_container(id, name, bytes),
        SourceType::PlainText => Ok(parse_plain_text(id, name, bytes)),
        other => {
            log::warn!("'{}' is {}; adding it as an empty document", name, other);
            Ok(ParsedDocument::unsupported(id, name, other))
        }
    }
}

fn parse_container(id: DocumentId, name: &str, bytes: &[u8]) -> Result<ParsedDocument, ParseError> {
    let package = read_package(bytes)?;

    let document_xml = part_text(&package, DOCUMENT_PART)?
        .ok_or_else(|| ParseError::MissingPart(DOCUMENT_PART.to_string()))?;
    let sheet = match part_text(&package, STYLES_PART)? {
        Some(xml) => StyleSheet::parse(&xml)?,
        None => StyleSheet::default(),
    };
    let numbering = match part_text(&package, NUMBERING_PART)? {
        Some(xml) => NumberingDefinitions::parse(&xml)?,
        None => NumberingDefinitions::default(),
    };

    let content = body::read_body(&document_xml, &sheet, &numbering)?;

    let mut style_map = build_style_map(&content.observed, &sheet);
    style_map.numbering_formats = if content.numbering_formats.is_empty() {
        // No ordinal list in the body; the first ordinal definition stands in
        numbering
            .abstracts()
            .find(|def| def.family() == Some(ListFamily::Ordinal))
            .map(|def| def.formats())
            .unwrap_or_default()
    } else {
        content.numbering_formats
    };
    style_map.page_margins = content.page_margins.unwrap_or_default();

    let structure = DocumentStructure::from_elements(&content.elements);
    log::info!(
        "Parsed '{}': {} elements, heading levels {:?}",
        name,
        content.elements.len(),
        structure.heading_levels
    );

    Ok(ParsedDocument {
        id,
        name: name.to_string(),
        source_type: SourceType::Container,
        elements: content.elements,
        style_map,
        structure,
        is_main_document: false,
        order: 0,
        supported: true,
        package: Some(Arc::new(package)),
    })
}

/// One body element per line of text
fn parse_plain_text(id: DocumentId, name: &str, bytes: &[u8]) -> ParsedDocument {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');

    let elements: Vec<DocumentElement> = text
        .lines()
        .map(|line| {
            let runs = if line.is_empty() {
                Vec::new()
            } else {
                vec![TextRun::new(line)]
            };
            DocumentElement::new(ElementKind::Body, runs)
        })
        .collect();

    log::info!("Parsed '{}': {} lines of plain text", name, elements.len());

    ParsedDocument {
        id,
        name: name.to_string(),
        source_type: SourceType::PlainText,
        elements,
        style_map: DocumentStyleMap::default(),
        structure: DocumentStructure::default(),
        is_main_document: false,
        order: 0,
        supported: true,
        package: None,
    }
}

/// Majority observed style per kind, then the document's own style definitions
fn build_style_map(observed: &[(ElementKind, ElementStyle)], sheet: &StyleSheet) -> DocumentStyleMap {
    let mut map = DocumentStyleMap::default();

    let by_kind = observed.iter().into_group_map_by(|(kind, _)| *kind);
    for (kind, entries) in by_kind {
        let styles: Vec<&ElementStyle> = entries.into_iter().map(|(_, style)| style).collect();
        let counts = styles.iter().counts();

        // Ties go to the style observed first
        let mut best: Option<(&ElementStyle, usize)> = None;
        for style in &styles {
            let count = counts.get(style).copied().unwrap_or(0);
            if best.is_none_or(|(_, max)| count > max) {
                best = Some((*style, count));
            }
        }
        if let Some((style, _)) = best {
            map.set(kind, heading_style(kind, style, sheet));
        }
    }

    for kind in ElementKind::ALL {
        if map.is_explicit(kind) {
            continue;
        }
        if let Some(def) = sheet.paragraph_style_for(kind) {
            let direct = Props::default();
            let style = resolve_element_style(&ResolveContext {
                sheet,
                direct: &direct,
                style_id: Some(&def.id),
                kind,
            });
            log::debug!("{} not observed; using defined style '{}'", kind, def.id);
            map.set(kind, style);
        }
    }

    map
}

/// A style for `kind` whose id itself marks a heading of that level
///
/// Headings recognized from a direct outline level often sit on `Normal`;
/// that id would turn merged headings back into body text.
fn heading_style(kind: ElementKind, observed: &ElementStyle, sheet: &StyleSheet) -> ElementStyle {
    let ElementKind::Heading(level) = kind else {
        return observed.clone();
    };
    if sheet.heading_level(&observed.style_id) == Some(level) {
        return observed.clone();
    }

    if let Some(def) = sheet.paragraph_style_for(kind) {
        log::debug!(
            "{} observed on '{}'; using defined style '{}'",
            kind,
            observed.style_id,
            def.id
        );
        let direct = Props::default();
        return resolve_element_style(&ResolveContext {
            sheet,
            direct: &direct,
            style_id: Some(&def.id),
            kind,
        });
    }

    log::debug!(
        "{} observed on '{}'; no heading style is defined",
        kind,
        observed.style_id
    );
    ElementStyle {
        style_id: format!("Heading{}", level),
        style_name: format!("heading {}", level),
        ..observed.clone()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::model::ListFamily;

    #[test]
    fn test_parse_container_builds_stream_map_and_structure() {
        // Arrange
        let bytes = docx(
            &[
                heading(1, "Overview"),
                paragraph("Intro text"),
                list_item(1, 0, "one"),
                list_item(1, 0, "two"),
                list_item(1, 0, "three"),
                list_item(2, 0, "dot"),
            ]
            .concat(),
        );

        // Act
        let doc = parse_document(DocumentId(1), "a.docx", &bytes, SourceType::Container).unwrap();

        // Assert
        assert!(doc.supported);
        assert!(doc.is_container());
        assert_eq!(doc.elements.len(), 6);
        assert_eq!(doc.structure.last_heading_numbers[0], 3);
        assert_eq!(doc.structure.last_bullet_numbers[0], 1);
        assert!(doc.structure.heading_levels.contains(&1));

        let heading_style = doc.style_map.resolve(ElementKind::Heading(1));
        assert_eq!(heading_style.style_id, "Heading1");
        assert_eq!(heading_style.font_family, "Cambria");
        assert_eq!(heading_style.font_size, 36);
        assert_eq!(heading_style.color, "17365D");

        let body_style = doc.style_map.resolve(ElementKind::Body);
        assert_eq!(body_style.style_id, "Normal");
        assert_eq!(body_style.font_size, 24);

        assert_eq!(doc.style_map.numbering_format(1), "lowerLetter");
        assert_eq!(doc.style_map.page_margins.left, 1200);
        assert_eq!(doc.elements[5].list.as_ref().unwrap().family, ListFamily::Bullet);
    }

    #[test]
    fn test_unobserved_kinds_use_defined_styles() {
        let bytes = docx(&paragraph("Only body text"));

        let doc = parse_document(DocumentId(1), "a.docx", &bytes, SourceType::Container).unwrap();

        // Heading 2 is defined but never used
        let heading2 = doc.style_map.resolve(ElementKind::Heading(2));
        assert!(doc.style_map.is_explicit(ElementKind::Heading(2)));
        assert_eq!(heading2.font_size, 28);
        // Heading 3 is neither used nor defined
        assert!(!doc.style_map.is_explicit(ElementKind::Heading(3)));
        assert_eq!(doc.style_map.resolve(ElementKind::Heading(3)).style_id, "Heading3");
        // No list in the body; formats come from the first ordinal definition
        assert_eq!(doc.style_map.numbering_formats.get(&1).map(String::as_str), Some("lowerLetter"));
    }

    #[test]
    fn test_majority_style_wins() {
        let bold_body = r#"<w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>loud</w:t></w:r></w:p>"#;
        let bytes = docx(&[bold_body.to_string(), paragraph("a"), paragraph("b")].concat());

        let doc = parse_document(DocumentId(1), "a.docx", &bytes, SourceType::Container).unwrap();

        assert!(!doc.style_map.resolve(ElementKind::Body).bold);
    }

    #[test]
    fn test_plain_text_lines_become_body_elements() {
        let bytes = "\u{feff}First line\r\nSecond line\n".as_bytes();

        let doc = parse_document(DocumentId(2), "notes.txt", bytes, SourceType::PlainText).unwrap();

        let texts: Vec<String> = doc.elements.iter().map(DocumentElement::text).collect();
        assert_eq!(texts, vec!["First line", "Second line"]);
        assert!(doc.elements.iter().all(|e| e.kind == ElementKind::Body));
        assert!(doc.supported);
        assert!(!doc.is_container());
    }

    #[test]
    fn test_plain_text_keeps_interior_blank_lines() {
        let doc = parse_document(DocumentId(2), "notes.txt", b"One\n\nTwo\n\n", SourceType::PlainText).unwrap();

        let texts: Vec<String> = doc.elements.iter().map(DocumentElement::text).collect();
        assert_eq!(texts, vec!["One", "", "Two", ""]);
    }

    #[test]
    fn test_direct_outline_heading_maps_to_defined_heading_style() {
        let outlined = r#"<w:p><w:pPr><w:outlineLvl w:val="0"/></w:pPr><w:r><w:t>Scope</w:t></w:r></w:p>"#;
        let bytes = docx(&[outlined.to_string(), paragraph("Body")].concat());

        let doc = parse_document(DocumentId(1), "a.docx", &bytes, SourceType::Container).unwrap();

        assert_eq!(doc.elements[0].kind, ElementKind::Heading(1));
        let style = doc.style_map.resolve(ElementKind::Heading(1));
        assert_eq!(style.style_id, "Heading1");
        assert_eq!(style.font_size, 36);
        assert!(style.bold);
    }

    #[test]
    fn test_direct_outline_heading_without_defined_style_gets_heading_id() {
        let outlined = r#"<w:p><w:pPr><w:outlineLvl w:val="2"/></w:pPr><w:r><w:t>Detail</w:t></w:r></w:p>"#;
        let bytes = docx(outlined);

        let doc = parse_document(DocumentId(1), "a.docx", &bytes, SourceType::Container).unwrap();

        assert_eq!(doc.elements[0].kind, ElementKind::Heading(3));
        let style = doc.style_map.resolve(ElementKind::Heading(3));
        assert_eq!(style.style_id, "Heading3");
        assert_eq!(style.style_name, "heading 3");
        // The look observed on the paragraph is kept
        assert_eq!(style.font_family, "Cambria");
        assert_eq!(style.font_size, 24);
    }

    #[test]
    fn test_out_of_range_outline_level_is_body_text() {
        let styles = styles_xml().replace(
            "</w:styles>",
            r#"<w:style w:type="paragraph" w:styleId="Deep"><w:name w:val="Deep"/><w:pPr><w:outlineLvl w:val="255"/></w:pPr></w:style></w:styles>"#,
        );
        let bytes = archive(&[
            ("word/document.xml", document_xml(r#"<w:p><w:pPr><w:pStyle w:val="Deep"/></w:pPr><w:r><w:t>deep</w:t></w:r></w:p>"#)),
            ("word/styles.xml", styles),
        ]);

        let doc = parse_document(DocumentId(1), "a.docx", &bytes, SourceType::Container).unwrap();

        assert_eq!(doc.elements[0].kind, ElementKind::Body);
    }

    #[test]
    fn test_list_start_at_counter_limit_saturates() {
        let numbering = numbering_xml().replace(
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/>"#,
            r#"<w:lvl w:ilvl="0"><w:start w:val="4294967295"/><w:numFmt w:val="decimal"/>"#,
        );
        let bytes = archive(&[
            ("word/document.xml", document_xml(&[list_item(1, 0, "a"), list_item(1, 0, "b")].concat())),
            ("word/styles.xml", styles_xml()),
            ("word/numbering.xml", numbering),
        ]);

        let doc = parse_document(DocumentId(1), "a.docx", &bytes, SourceType::Container).unwrap();

        let ordinals: Vec<u32> = doc.elements.iter().filter_map(|e| e.list.as_ref().map(|l| l.ordinal)).collect();
        assert_eq!(ordinals, vec![u32::MAX, u32::MAX]);
    }

    #[test]
    fn test_page_description_is_an_empty_unsupported_document() {
        let doc = parse_document(DocumentId(3), "scan.pdf", b"%PDF-1.4", SourceType::PageDescription).unwrap();

        assert!(!doc.supported);
        assert!(doc.elements.is_empty());
    }

    #[test]
    fn test_malformed_archive_and_missing_body() {
        let err = parse_document(DocumentId(4), "bad.docx", b"PK\x03\x04garbage", SourceType::Container)
            .unwrap_err();
        assert!(matches!(err, ParseError::Archive(_)));

        let bytes = archive(&[("word/styles.xml", styles_xml())]);
        let err = parse_document(DocumentId(5), "empty.docx", &bytes, SourceType::Container).unwrap_err();
        assert!(matches!(err, ParseError::MissingPart(ref part) if part == DOCUMENT_PART));
    }

    #[test]
    fn test_non_utf8_part_is_an_encoding_error() {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut writer, &[0xff, 0xfe, 0x00, 0x3c]).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = parse_document(DocumentId(6), "bad.docx", &bytes, SourceType::Container).unwrap_err();

        assert!(matches!(err, ParseError::Encoding { .. }));
    }
}
