//! Raw parts of a container document

/// Part holding the main document body
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Part holding paragraph/character style definitions
pub const STYLES_PART: &str = "word/styles.xml";
/// Part holding list numbering definitions
pub const NUMBERING_PART: &str = "word/numbering.xml";
/// Content type registry
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
/// Relationships of the main document part
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// One named part of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePart {
    pub name: String,
    pub data: Vec<u8>,
}

/// All file parts of a container, in archive order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    parts: Vec<PackagePart>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part, replacing an existing part of the same name in place
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|part| part.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(PackagePart { name, data }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.data.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn parts(&self) -> &[PackagePart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
