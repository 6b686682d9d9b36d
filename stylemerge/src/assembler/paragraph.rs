//! WordprocessingML for output paragraphs

use crate::merge::OutputElement;
use crate::model::{ElementStyle, TextRun};

/// Numbering reference written into `w:numPr`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    pub num_id: u32,
    pub level: u8,
}

/// Escape special XML characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Generate a `w:p` for one output element
///
/// `direct` carries the style of the element's kind when the caller edited
/// it; its attributes are then written as direct formatting.
pub fn paragraph_xml(
    element: &OutputElement,
    numbering: Option<NumberingRef>,
    direct: Option<&ElementStyle>,
) -> String {
    let mut xml = String::from("<w:p><w:pPr>");
    xml.push_str(&format!(
        r#"<w:pStyle w:val="{}"/>"#,
        escape_xml(&element.style_id)
    ));

    if element.page_break_before {
        xml.push_str("<w:pageBreakBefore/>");
    }

    if let Some(numbering) = numbering {
        xml.push_str(&format!(
            r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
            numbering.level, numbering.num_id
        ));
    }

    if let Some(style) = direct {
        xml.push_str(&format!(
            r#"<w:spacing w:line="{}" w:lineRule="auto"/>"#,
            style.line_spacing
        ));
        // List indentation comes from the numbering level
        if numbering.is_none() {
            xml.push_str(&indentation_xml(style));
        }
        xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, style.alignment.to_ooxml()));
        xml.push_str(&run_properties_xml(&TextRun::default(), Some(style)));
    }

    xml.push_str("</w:pPr>");

    for run in &element.runs {
        xml.push_str(&run_xml(run, direct));
    }

    xml.push_str("</w:p>");
    xml
}

fn indentation_xml(style: &ElementStyle) -> String {
    if style.indent_hanging > 0 {
        format!(
            r#"<w:ind w:left="{}" w:hanging="{}"/>"#,
            style.indent_left, style.indent_hanging
        )
    } else {
        format!(r#"<w:ind w:left="{}"/>"#, style.indent_left)
    }
}

/// Generate a `w:r`, splitting tabs and line breaks into their own elements
pub fn run_xml(run: &TextRun, direct: Option<&ElementStyle>) -> String {
    let mut xml = String::from("<w:r>");
    xml.push_str(&run_properties_xml(run, direct));

    let mut segment = String::new();
    for c in run.text.chars() {
        match c {
            '\t' | '\n' => {
                push_text(&mut xml, &segment);
                segment.clear();
                xml.push_str(if c == '\t' { "<w:tab/>" } else { "<w:br/>" });
            }
            _ => segment.push(c),
        }
    }
    push_text(&mut xml, &segment);

    xml.push_str("</w:r>");
    xml
}

fn push_text(xml: &mut String, text: &str) {
    if !text.is_empty() {
        xml.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape_xml(text)
        ));
    }
}

/// `w:rPr` of a run: its own overrides, then the edited style's attributes
fn run_properties_xml(run: &TextRun, direct: Option<&ElementStyle>) -> String {
    let font = run
        .font
        .clone()
        .or_else(|| direct.map(|style| style.font_family.clone()));
    let bold = run.bold.or_else(|| direct.map(|style| style.bold));
    let italic = run.italic.or_else(|| direct.map(|style| style.italic));
    let color = run
        .color
        .clone()
        .or_else(|| direct.map(|style| style.color.clone()));
    let size = run.size.or_else(|| direct.map(|style| style.font_size));

    let mut props = String::new();
    if let Some(font) = font {
        let font = escape_xml(&font);
        props.push_str(&format!(
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
            font
        ));
    }
    push_toggle(&mut props, "b", bold);
    push_toggle(&mut props, "i", italic);
    if let Some(color) = color {
        props.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape_xml(&color)));
    }
    if let Some(size) = size {
        props.push_str(&format!(
            r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
            size
        ));
    }
    match run.underline {
        Some(true) => props.push_str(r#"<w:u w:val="single"/>"#),
        Some(false) => props.push_str(r#"<w:u w:val="none"/>"#),
        None => {}
    }

    if props.is_empty() {
        props
    } else {
        format!("<w:rPr>{}</w:rPr>", props)
    }
}

fn push_toggle(props: &mut String, name: &str, value: Option<bool>) {
    match value {
        Some(true) => props.push_str(&format!("<w:{}/>", name)),
        Some(false) => props.push_str(&format!(r#"<w:{} w:val="0"/>"#, name)),
        None => {}
    }
}
