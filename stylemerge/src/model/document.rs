//! Parsed documents and their source classification

use super::element::DocumentElement;
use super::package::Package;
use super::structure::DocumentStructure;
use super::style::DocumentStyleMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Session-unique document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Input format classification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// ZIP/XML word-processing container (.docx)
    Container,
    /// Plain UTF-8 text
    PlainText,
    /// Page-description format (.pdf), recognized but not parsed
    PageDescription,
    /// Anything else, with the extension that was seen
    Unknown(String),
}

impl SourceType {
    /// Classify input by magic bytes first, then by file extension
    pub fn detect(name: &str, bytes: &[u8]) -> Self {
        if bytes.starts_with(b"PK\x03\x04") {
            return SourceType::Container;
        }
        if bytes.starts_with(b"%PDF") {
            return SourceType::PageDescription;
        }

        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "docx" | "docm" | "dotx" => SourceType::Container,
            "pdf" => SourceType::PageDescription,
            "txt" | "text" => SourceType::PlainText,
            "" if looks_like_text(bytes) => SourceType::PlainText,
            _ => SourceType::Unknown(extension),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, SourceType::Container)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Container => write!(f, "DOCX"),
            SourceType::PlainText => write!(f, "plain text"),
            SourceType::PageDescription => write!(f, "PDF"),
            SourceType::Unknown(ext) if ext.is_empty() => write!(f, "unknown"),
            SourceType::Unknown(ext) => write!(f, "unknown (.{})", ext),
        }
    }
}

fn looks_like_text(bytes: &[u8]) -> bool {
    !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok()
}

/// A document after structural parsing
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub id: DocumentId,
    /// Original file name
    pub name: String,
    pub source_type: SourceType,
    /// Canonical element stream
    pub elements: Vec<DocumentElement>,
    /// Kind → formatting, numbering formats, page margins
    pub style_map: DocumentStyleMap,
    /// Derived heading/list summary
    pub structure: DocumentStructure,
    /// Whether this document is the style authority
    pub is_main_document: bool,
    /// Position in the merge sequence
    pub order: usize,
    /// False for the explicitly empty placeholder of an unparsed format
    pub supported: bool,
    /// Raw container parts, kept for containers so they can act as style authority
    pub package: Option<Arc<Package>>,
}

impl ParsedDocument {
    /// An explicitly empty document for a format the parser does not read
    pub fn unsupported(id: DocumentId, name: &str, source_type: SourceType) -> Self {
        Self {
            id,
            name: name.to_string(),
            source_type,
            elements: Vec::new(),
            style_map: DocumentStyleMap::default(),
            structure: DocumentStructure::default(),
            is_main_document: false,
            order: 0,
            supported: false,
            package: None,
        }
    }

    /// Whether this document can act as style authority
    pub fn is_container(&self) -> bool {
        self.source_type.is_container() && self.package.is_some()
    }

    /// Whether this document contributes content to a merge
    pub fn is_mergeable(&self) -> bool {
        self.supported
    }

    /// File name without directories or extension
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("document")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_prefers_magic_bytes() {
        assert_eq!(
            SourceType::detect("report.bin", b"PK\x03\x04rest"),
            SourceType::Container
        );
        assert_eq!(
            SourceType::detect("scan.docx", b"%PDF-1.7"),
            SourceType::PageDescription
        );
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(SourceType::detect("notes.TXT", b"hello"), SourceType::PlainText);
        assert_eq!(SourceType::detect("README", b"hello"), SourceType::PlainText);
        assert_eq!(
            SourceType::detect("photo.png", b"\x89PNG\r\n"),
            SourceType::Unknown("png".to_string())
        );
        assert_eq!(
            SourceType::detect("blob", b"\x00\x01"),
            SourceType::Unknown(String::new())
        );
    }

    #[test]
    fn test_stem_strips_directories_and_extension() {
        let doc = ParsedDocument::unsupported(DocumentId(1), "in/Quarterly Report.docx", SourceType::Container);
        assert_eq!(doc.stem(), "Quarterly Report");
        assert!(!doc.is_container());
        assert!(!doc.is_mergeable());
    }
}
