//! Package assembler
//!
//! Serializes an [`OutputStream`] into a DOCX archive built from the style
//! authority's parts.
//!
//! # Approach
//! 1. Copy every part of the authority package
//! 2. Write the stream into `word/document.xml`: after the authority's own
//!    body when the stream extends it, in place of that body otherwise
//! 3. Append style definitions the stream references but the authority lacks
//! 4. Append numbering instances for lists that are not the authority's own
//! 5. Register parts that had to be created
//!
//! The archive is written to memory and only returned when every step
//! succeeded.

mod numbering;
mod paragraph;
mod parts;

pub use numbering::NumberingPlan;
pub use paragraph::{escape_xml, paragraph_xml, run_xml, NumberingRef};

use crate::error::{Error, PackagingError, Result};
use crate::merge::{OutputElement, OutputStream};
use crate::model::{
    DocumentStyleMap, ElementStyle, Package, ParsedDocument, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART,
    NUMBERING_PART, STYLES_PART,
};
use crate::parser::{part_text, NumberingDefinitions};
use parts::CreatedPart;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build the DOCX bytes of `stream` using `authority`'s parts
pub fn assemble(stream: &OutputStream, authority: &ParsedDocument) -> Result<Vec<u8>> {
    let package = authority
        .package
        .as_deref()
        .ok_or_else(|| PackagingError::NotAContainer(authority.name.clone()))?;

    log::info!(
        "Assembling '{}' ({} elements) from '{}'",
        stream.name,
        stream.elements.len(),
        authority.name
    );

    let written: Vec<&OutputElement> = stream
        .elements
        .iter()
        .filter(|element| !stream.extends_authority || element.source != authority.id)
        .collect();

    let referenced = referenced_styles(&written, &stream.style_map)?;
    let numbering_defs = match text(package, NUMBERING_PART)? {
        Some(xml) => NumberingDefinitions::parse(&xml).map_err(|e| PackagingError::Malformed {
            part: NUMBERING_PART.to_string(),
            reason: e.to_string(),
        })?,
        None => NumberingDefinitions::default(),
    };
    let plan = NumberingPlan::build(stream, &numbering_defs);

    let mut replaced: BTreeMap<&str, String> = BTreeMap::new();
    let mut created: Vec<CreatedPart> = Vec::new();

    let document_xml = text(package, DOCUMENT_PART)?.ok_or_else(|| PackagingError::Malformed {
        part: DOCUMENT_PART.to_string(),
        reason: "part is missing".to_string(),
    })?;
    let body = body_xml(&written, &stream.style_map, &plan);
    let document_xml = if stream.extends_authority {
        parts::append_to_body(&document_xml, &body)?
    } else {
        parts::replace_body(&document_xml, &body)?
    };
    replaced.insert(DOCUMENT_PART, document_xml);

    match text(package, STYLES_PART)? {
        Some(styles_xml) => {
            if let Some(updated) = parts::ensure_styles(&styles_xml, &referenced)? {
                replaced.insert(STYLES_PART, updated);
            }
        }
        None => {
            replaced.insert(STYLES_PART, parts::new_styles_part(&referenced));
            created.push(CreatedPart::Styles);
        }
    }

    if !plan.is_empty() {
        match text(package, NUMBERING_PART)? {
            Some(numbering_xml) => {
                let updated =
                    parts::extend_numbering(&numbering_xml, &plan.abstracts_xml(), &plan.nums_xml())?;
                replaced.insert(NUMBERING_PART, updated);
            }
            None => {
                replaced.insert(
                    NUMBERING_PART,
                    parts::new_numbering_part(&plan.abstracts_xml(), &plan.nums_xml()),
                );
                created.push(CreatedPart::Numbering);
            }
        }
    }

    if !created.is_empty() {
        let mut content_types = required_text(package, CONTENT_TYPES_PART)?;
        let mut rels = required_text(package, DOCUMENT_RELS_PART)?;
        for part in &created {
            content_types = parts::register_content_type(&content_types, *part)?;
            rels = parts::register_relationship(&rels, *part)?;
        }
        replaced.insert(CONTENT_TYPES_PART, content_types);
        replaced.insert(DOCUMENT_RELS_PART, rels);
    }

    let bytes = write_archive(package, replaced)?;
    log::info!("Assembled '{}' ({} bytes)", stream.name, bytes.len());
    Ok(bytes)
}

/// Distinct styles the written elements reference, in first-use order
fn referenced_styles<'a>(
    elements: &[&OutputElement],
    style_map: &'a DocumentStyleMap,
) -> Result<Vec<&'a ElementStyle>> {
    let mut styles: Vec<&ElementStyle> = Vec::new();
    for element in elements {
        if element.style_id.trim().is_empty() {
            return Err(Error::StyleResolution { kind: element.kind });
        }
        if styles.iter().any(|style| style.style_id == element.style_id) {
            continue;
        }
        let style = style_map.resolve(element.kind);
        if style.style_id == element.style_id {
            styles.push(style);
        }
    }
    Ok(styles)
}

fn body_xml(elements: &[&OutputElement], style_map: &DocumentStyleMap, plan: &NumberingPlan) -> String {
    elements
        .iter()
        .map(|element| {
            let numbering = element
                .list
                .as_ref()
                .and_then(|list| plan.reference(&list.sequence, list.level));
            let style = style_map.resolve(element.kind);
            let direct = style.overridden.then_some(style);
            paragraph_xml(element, numbering, direct)
        })
        .collect()
}

fn text(package: &Package, part: &str) -> Result<Option<String>, PackagingError> {
    part_text(package, part).map_err(|e| PackagingError::Malformed {
        part: part.to_string(),
        reason: e.to_string(),
    })
}

fn required_text(package: &Package, part: &str) -> Result<String, PackagingError> {
    text(package, part)?.ok_or_else(|| PackagingError::Malformed {
        part: part.to_string(),
        reason: "part is missing".to_string(),
    })
}

/// Write the authority's parts, replacing and appending as planned
fn write_archive(
    package: &Package,
    mut replaced: BTreeMap<&str, String>,
) -> Result<Vec<u8>, PackagingError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for part in package.parts() {
        writer.start_file(part.name.as_str(), options)?;
        match replaced.remove(part.name.as_str()) {
            Some(contents) => writer.write_all(contents.as_bytes())?,
            None => writer.write_all(&part.data)?,
        }
    }

    // Parts the authority did not have
    for (name, contents) in replaced {
        writer.start_file(name, options)?;
        writer.write_all(contents.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}
