//! Canonical style and structure model
//!
//! These types are produced by the parser, transformed by the merge engine
//! and serialized by the assembler. Nothing here knows about ZIP archives or
//! XML; the container's raw parts are only carried along in [`Package`].

mod document;
mod element;
mod package;
mod structure;
mod style;
mod text_run;

pub use document::{DocumentId, ParsedDocument, SourceType};
pub use element::{DocumentElement, ElementKind, ListFamily, ListInfo, MAX_HEADING_LEVEL};
pub use package::{
    Package, PackagePart, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART, NUMBERING_PART,
    STYLES_PART,
};
pub use structure::{tracked_level, DocumentStructure, TRACKED_LEVELS};
pub use style::{
    builtin_style, default_numbering_format, Alignment, DocumentStyleMap, ElementStyle,
    ElementStylePatch, PageMargins, SINGLE_LINE_SPACING,
};
pub use text_run::TextRun;
