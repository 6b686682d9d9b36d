//! WordprocessingML helpers over roxmltree

use crate::error::ParseError;
use crate::model::Package;
use roxmltree::{Document, Node};

/// WordprocessingML main namespace
pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Parse an XML part, attributing failures to the part name
pub fn parse_xml<'input>(part: &str, text: &'input str) -> Result<Document<'input>, ParseError> {
    Document::parse(text).map_err(|e| ParseError::Xml {
        part: part.to_string(),
        message: e.to_string(),
    })
}

/// Read a part as UTF-8 text; `Ok(None)` when the part is absent
pub fn part_text(package: &Package, part: &str) -> Result<Option<String>, ParseError> {
    let Some(bytes) = package.get(part) else {
        return Ok(None);
    };
    let text = std::str::from_utf8(bytes).map_err(|_| ParseError::Encoding {
        part: part.to_string(),
    })?;
    Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
}

/// Whether `node` is the WML element `name`
pub fn is_wml(node: Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(WML_NS)
}

/// First WML child element called `name`
pub fn wml<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_wml(*child, name))
}

/// A WML attribute of `node`
pub fn attr<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<&'a str> {
    node.attribute((WML_NS, name))
}

/// The `w:val` attribute of the WML child `name`
pub fn wml_val<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<&'a str> {
    wml(node, name).and_then(|child| attr(child, "val"))
}

/// A WML toggle property (`w:b`, `w:i`): present without `w:val="0"`/`"false"` means on
pub fn wml_bool(node: Node, name: &str) -> Option<bool> {
    wml(node, name).map(|child| {
        attr(child, "val").is_none_or(|v| v != "0" && v != "false" && v != "off")
    })
}
