//! Walking `w:body` into an element stream

use super::cascade::{resolve_element_style, ResolveContext};
use super::numbering::{ListCounters, NumberingDefinitions};
use super::props::{run_overrides, Props};
use super::styles::StyleSheet;
use super::xml::{attr, is_wml, parse_xml, wml, wml_val};
use crate::error::ParseError;
use crate::model::{
    DocumentElement, ElementKind, ElementStyle, ListFamily, ListInfo, PageMargins, TextRun,
    DOCUMENT_PART,
};
use roxmltree::Node;
use std::collections::BTreeMap;

/// Block containers whose paragraphs are flattened into the stream
const CONTAINERS: [&str; 6] = ["tbl", "tr", "tc", "sdt", "sdtContent", "customXml"];

/// Elements, observed styles and section data of one document body
#[derive(Debug, Default)]
pub struct BodyContent {
    pub elements: Vec<DocumentElement>,
    /// Resolved style of every element, in stream order
    pub observed: Vec<(ElementKind, ElementStyle)>,
    /// Formats of the first ordinal list the body uses
    pub numbering_formats: BTreeMap<u8, String>,
    /// Margins of the final section, when it declares them
    pub page_margins: Option<PageMargins>,
}

/// Parse `word/document.xml` against the document's styles and numbering
pub fn read_body(
    xml: &str,
    sheet: &StyleSheet,
    numbering: &NumberingDefinitions,
) -> Result<BodyContent, ParseError> {
    let doc = parse_xml(DOCUMENT_PART, xml)?;
    let body = wml(doc.root_element(), "body").ok_or_else(|| ParseError::Xml {
        part: DOCUMENT_PART.to_string(),
        message: "no w:body element".to_string(),
    })?;

    let mut paragraphs = Vec::new();
    collect_paragraphs(body, &mut paragraphs);

    let mut content = BodyContent::default();
    let mut counters = ListCounters::default();

    for paragraph in paragraphs {
        let (element, style) = read_paragraph(paragraph, sheet, numbering, &mut counters);

        if content.numbering_formats.is_empty() {
            if let Some(list) = element.list.as_ref().filter(|l| l.family == ListFamily::Ordinal) {
                content.numbering_formats = numbering.formats(&list.num_id);
            }
        }

        log::debug!(
            "Paragraph classified as {} (style {})",
            element.kind,
            style.style_id
        );
        content.observed.push((element.kind, style));
        content.elements.push(element);
    }

    content.page_margins = wml(body, "sectPr")
        .and_then(|sect| wml(sect, "pgMar"))
        .map(read_margins);

    Ok(content)
}

fn collect_paragraphs<'a, 'input>(node: Node<'a, 'input>, out: &mut Vec<Node<'a, 'input>>) {
    for child in node.children().filter(Node::is_element) {
        if is_wml(child, "p") {
            out.push(child);
        } else if CONTAINERS.iter().any(|name| is_wml(child, name)) {
            collect_paragraphs(child, out);
        }
    }
}

fn read_paragraph(
    paragraph: Node,
    sheet: &StyleSheet,
    numbering: &NumberingDefinitions,
    counters: &mut ListCounters,
) -> (DocumentElement, ElementStyle) {
    let ppr = wml(paragraph, "pPr");
    let mark_rpr = ppr.and_then(|p| wml(p, "rPr"));
    let direct = Props::read(ppr, mark_rpr);

    let style_id = ppr
        .and_then(|p| wml_val(p, "pStyle"))
        .or_else(|| sheet.default_paragraph_id());

    let heading = direct
        .outline_level
        .map(|outline| outline.saturating_add(1))
        .or_else(|| style_id.and_then(|id| sheet.heading_level(id)))
        .and_then(ElementKind::heading);

    let list = match heading {
        Some(_) => None,
        None => read_list(&direct, style_id, sheet, numbering, counters),
    };

    let kind = heading
        .or_else(|| list.as_ref().map(|l| l.family.item_kind()))
        .unwrap_or(ElementKind::Body);

    let style = resolve_element_style(&ResolveContext {
        sheet,
        direct: &direct,
        style_id,
        kind,
    });

    let mut element = DocumentElement::new(kind, read_runs(paragraph));
    element.style_id = style_id.map(str::to_string);
    if let Some(list) = list {
        element = element.with_list(list);
    }

    (element, style)
}

fn read_list(
    direct: &Props,
    style_id: Option<&str>,
    sheet: &StyleSheet,
    numbering: &NumberingDefinitions,
    counters: &mut ListCounters,
) -> Option<ListInfo> {
    let style_numbering = style_id.and_then(|id| sheet.resolved_props(id).numbering);
    let num_ref = direct.numbering.as_ref().or(style_numbering.as_ref())?;

    if num_ref.num_id == "0" {
        return None;
    }

    let level = num_ref
        .level
        .or_else(|| style_numbering.as_ref().and_then(|n| n.level))
        .unwrap_or(0);
    let Some(def) = numbering.level(&num_ref.num_id, level) else {
        log::warn!(
            "Paragraph references undefined numbering {} level {}",
            num_ref.num_id,
            level
        );
        return None;
    };

    if def.format == "none" {
        return None;
    }

    let start = numbering.start(&num_ref.num_id, level);
    Some(ListInfo {
        num_id: num_ref.num_id.clone(),
        level,
        family: ListFamily::from_format(&def.format),
        format: def.format.clone(),
        ordinal: counters.next(&num_ref.num_id, level, start),
    })
}

/// Runs that belong to this paragraph, skipping those of nested paragraphs
fn read_runs(paragraph: Node) -> Vec<TextRun> {
    paragraph
        .descendants()
        .filter(|node| is_wml(*node, "r"))
        .filter(|run| {
            run.ancestors()
                .skip(1)
                .find(|ancestor| is_wml(*ancestor, "p"))
                == Some(paragraph)
        })
        .filter_map(|run| {
            let mut text = String::new();
            for child in run.children().filter(Node::is_element) {
                if is_wml(child, "t") {
                    text.push_str(child.text().unwrap_or_default());
                } else if is_wml(child, "tab") {
                    text.push('\t');
                } else if is_wml(child, "br") || is_wml(child, "cr") {
                    text.push('\n');
                }
            }
            if text.is_empty() {
                return None;
            }

            let mut formatted = wml(run, "rPr").map(run_overrides).unwrap_or_default();
            formatted.text = text;
            Some(formatted)
        })
        .collect()
}

fn read_margins(pg_mar: Node) -> PageMargins {
    let defaults = PageMargins::default();
    let read = |name: &str, fallback: i32| {
        attr(pg_mar, name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(fallback)
    };
    PageMargins {
        top: read("top", defaults.top),
        right: read("right", defaults.right),
        bottom: read("bottom", defaults.bottom),
        left: read("left", defaults.left),
        header: read("header", defaults.header),
        footer: read("footer", defaults.footer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::xml::WML_NS;

    fn document(body: &str) -> String {
        format!(
            r#"<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
            WML_NS, body
        )
    }

    fn numbering() -> NumberingDefinitions {
        let xml = format!(
            r#"<w:numbering xmlns:w="{}">
                 <w:abstractNum w:abstractNumId="0">
                   <w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl>
                   <w:lvl w:ilvl="1"><w:numFmt w:val="lowerRoman"/></w:lvl>
                 </w:abstractNum>
                 <w:abstractNum w:abstractNumId="1">
                   <w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/></w:lvl>
                 </w:abstractNum>
                 <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
                 <w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
               </w:numbering>"#,
            WML_NS
        );
        NumberingDefinitions::parse(&xml).unwrap()
    }

    fn item(num_id: &str, level: u8, text: &str) -> String {
        format!(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
            level, num_id, text
        )
    }

    #[test]
    fn test_classifies_headings_lists_and_body() {
        let xml = document(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Scope</w:t></w:r></w:p>
               {}{}{}
               <w:p><w:r><w:t>Closing words</w:t></w:r></w:p>"#,
            item("1", 0, "first"),
            item("2", 0, "dot"),
            item("0", 0, "unnumbered"),
        ));

        let content = read_body(&xml, &StyleSheet::default(), &numbering()).unwrap();
        let kinds: Vec<ElementKind> = content.elements.iter().map(|e| e.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ElementKind::Heading(2),
                ElementKind::NumberedItem,
                ElementKind::BulletedItem,
                ElementKind::Body,
                ElementKind::Body,
            ]
        );
        assert_eq!(content.observed.len(), 5);
        assert_eq!(content.numbering_formats.get(&1).map(String::as_str), Some("lowerRoman"));
    }

    #[test]
    fn test_ordinals_count_per_instance_and_reset_deeper_levels() {
        let xml = document(&[
            item("1", 0, "a"),
            item("1", 1, "a.i"),
            item("1", 1, "a.ii"),
            item("1", 0, "b"),
            item("1", 1, "b.i"),
        ]
        .concat());

        let content = read_body(&xml, &StyleSheet::default(), &numbering()).unwrap();
        let ordinals: Vec<(u8, u32)> = content
            .elements
            .iter()
            .filter_map(|e| e.list.as_ref().map(|l| (l.level, l.ordinal)))
            .collect();

        assert_eq!(ordinals, vec![(0, 1), (1, 1), (1, 2), (0, 2), (1, 1)]);
        assert_eq!(content.elements[1].indent_level, 1);
    }

    #[test]
    fn test_runs_keep_breaks_and_skip_nested_paragraphs() {
        let xml = document(
            r#"<w:p>
                 <w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Total: </w:t></w:r>
                 <w:r><w:tab/><w:t>42</w:t><w:br/><w:t>units</w:t></w:r>
               </w:p>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );

        let content = read_body(&xml, &StyleSheet::default(), &NumberingDefinitions::default()).unwrap();

        assert_eq!(content.elements.len(), 2);
        let runs = &content.elements[0].runs;
        assert_eq!(runs[0].text, "Total: ");
        assert_eq!(runs[0].bold, Some(true));
        assert_eq!(runs[1].text, "\t42\nunits");
        assert_eq!(content.elements[1].text(), "cell");
    }

    #[test]
    fn test_reads_final_section_margins() {
        let xml = document(
            r#"<w:p/><w:sectPr><w:pgMar w:top="720" w:right="1080" w:bottom="720" w:left="1080" w:header="360" w:footer="360" w:gutter="0"/></w:sectPr>"#,
        );

        let content = read_body(&xml, &StyleSheet::default(), &NumberingDefinitions::default()).unwrap();

        let margins = content.page_margins.unwrap();
        assert_eq!(margins.top, 720);
        assert_eq!(margins.left, 1080);
        assert_eq!(margins.footer, 360);
    }

    #[test]
    fn test_missing_body_is_an_xml_error() {
        let xml = format!(r#"<w:document xmlns:w="{}"/>"#, WML_NS);

        let err = read_body(&xml, &StyleSheet::default(), &NumberingDefinitions::default()).unwrap_err();

        assert!(matches!(err, ParseError::Xml { .. }));
    }
}
