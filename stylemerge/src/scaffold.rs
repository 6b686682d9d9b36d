//! Empty style authority documents built with docx-rs
//!
//! A scaffold carries one paragraph style per element kind, an ordinal and a
//! bullet list definition and the page margins of a [`DocumentStyleMap`], but
//! no body content. It can be used as the main document of a session.

use crate::model::{Alignment, DocumentStyleMap, ElementKind, ElementStyle, ListFamily};
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, Level, LevelJc, LevelText, NumberFormat, Numbering,
    PageMargin, RunFonts, SpecialIndentType, Start, Style, StyleType,
};
use itertools::Itertools;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Levels declared by each list definition
const LIST_LEVELS: usize = 9;

/// Twips of indentation per list level
const LEVEL_INDENT: i32 = 720;

/// Numbering instance (and abstract definition) of ordinal lists
pub const ORDINAL_NUM_ID: usize = 1;

/// Numbering instance (and abstract definition) of bulleted lists
pub const BULLET_NUM_ID: usize = 2;

/// Errors while writing a scaffold
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// docx-rs failed to pack the archive
    #[error("failed to write DOCX: {0}")]
    Pack(String),

    /// Writing the output file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build an empty authority document for `style_map`
pub fn scaffold(style_map: &DocumentStyleMap) -> Result<Vec<u8>, ScaffoldError> {
    let mut docx = Docx::new();

    let styles = style_map
        .iter_resolved()
        .unique_by(|(_, style)| style.style_id.clone())
        .collect::<Vec<_>>();
    for (kind, style) in &styles {
        log::debug!("Scaffold style {} for {}", style.style_id, kind);
        docx = docx.add_style(paragraph_style(*kind, style));
    }

    docx = docx
        .add_abstract_numbering(list_definition(ORDINAL_NUM_ID, ListFamily::Ordinal, style_map))
        .add_numbering(Numbering::new(ORDINAL_NUM_ID, ORDINAL_NUM_ID))
        .add_abstract_numbering(list_definition(BULLET_NUM_ID, ListFamily::Bullet, style_map))
        .add_numbering(Numbering::new(BULLET_NUM_ID, BULLET_NUM_ID));

    let margins = style_map.page_margins;
    docx = docx.page_margin(
        PageMargin::new()
            .top(margins.top)
            .right(margins.right)
            .bottom(margins.bottom)
            .left(margins.left)
            .header(margins.header)
            .footer(margins.footer),
    );

    let mut buffer = Vec::new();
    docx.build()
        .pack(&mut Cursor::new(&mut buffer))
        .map_err(|e| ScaffoldError::Pack(e.to_string()))?;

    log::info!(
        "Built scaffold with {} paragraph styles ({} bytes)",
        styles.len(),
        buffer.len()
    );
    Ok(buffer)
}

/// Build a scaffold and write it to `output_path`
pub fn write_scaffold(style_map: &DocumentStyleMap, output_path: &Path) -> Result<(), ScaffoldError> {
    let bytes = scaffold(style_map)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    log::info!("Writing scaffold to: {}", output_path.display());
    std::fs::write(output_path, bytes)?;
    Ok(())
}

fn paragraph_style(kind: ElementKind, element_style: &ElementStyle) -> Style {
    let fonts = RunFonts::new()
        .ascii(&element_style.font_family)
        .hi_ansi(&element_style.font_family)
        .cs(&element_style.font_family);

    let mut style = Style::new(&element_style.style_id, StyleType::Paragraph)
        .name(&element_style.style_name)
        .fonts(fonts)
        .size(element_style.font_size as usize)
        .color(&element_style.color)
        .align(alignment_type(element_style.alignment));

    if kind != ElementKind::Body {
        style = style.based_on("Normal");
    }
    if element_style.bold {
        style = style.bold();
    }
    if element_style.italic {
        style = style.italic();
    }
    if element_style.indent_left != 0 || element_style.indent_hanging != 0 {
        let hanging = (element_style.indent_hanging > 0)
            .then_some(SpecialIndentType::Hanging(element_style.indent_hanging));
        style = style.indent(Some(element_style.indent_left), hanging, None, None);
    }

    style
}

fn list_definition(id: usize, family: ListFamily, style_map: &DocumentStyleMap) -> AbstractNumbering {
    (0..LIST_LEVELS).fold(AbstractNumbering::new(id), |definition, level| {
        let (format, text) = match family {
            ListFamily::Ordinal => (
                style_map.numbering_format(level as u8).to_string(),
                format!("%{}.", level + 1),
            ),
            ListFamily::Bullet => ("bullet".to_string(), "\u{2022}".to_string()),
        };
        definition.add_level(
            Level::new(
                level,
                Start::new(1),
                NumberFormat::new(format),
                LevelText::new(text),
                LevelJc::new("left"),
            )
            .indent(
                Some(LEVEL_INDENT * (level as i32 + 1)),
                Some(SpecialIndentType::Hanging(360)),
                None,
                None,
            ),
        )
    })
}

fn alignment_type(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
        Alignment::Justify => AlignmentType::Both,
    }
}
