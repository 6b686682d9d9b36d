//! Session controller
//!
//! A [`Session`] owns the document collection and the merge settings. Every
//! transition consumes the session and returns the next state, so callers
//! always hold exactly one current value.

use crate::assembler::assemble;
use crate::error::{Error, Result};
use crate::merge::merge_collection;
use crate::model::{DocumentId, ElementKind, ElementStylePatch, ParsedDocument, SourceType};
use crate::parser::parse_document;
use crate::settings::{MergeSettings, MergeSettingsPatch, PageDescriptionPolicy};
use std::path::{Path, PathBuf};

/// Deepest list level a numbering format can be set for
const MAX_LIST_LEVEL: u8 = 8;

/// Raw input handed over by the caller
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Known type of the input; detected from name and content when `None`
    pub source_type: Option<SourceType>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            source_type: None,
        }
    }
}

/// One produced document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl OutputFile {
    /// Write the file into `dir`, creating it when needed
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        log::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// An input that could not be added
#[derive(Debug)]
pub struct FileError {
    /// Name of the rejected input
    pub name: String,
    pub error: Error,
}

/// Documents, settings and error state of one merge session
#[derive(Debug, Default)]
pub struct Session {
    documents: Vec<ParsedDocument>,
    settings: MergeSettings,
    file_errors: Vec<FileError>,
    error: Option<String>,
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh session with the given settings
    pub fn with_settings(settings: MergeSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Documents in merge order
    pub fn documents(&self) -> &[ParsedDocument] {
        &self.documents
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    /// Errors of the most recent batch of added files
    pub fn file_errors(&self) -> &[FileError] {
        &self.file_errors
    }

    /// Error of the most recent `process` call
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn main_document(&self) -> Option<&ParsedDocument> {
        self.documents.iter().find(|doc| doc.is_main_document)
    }

    pub fn document(&self, id: DocumentId) -> Option<&ParsedDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Parse and append a batch of files
    pub fn add_documents(self, files: Vec<InputFile>) -> Self {
        self.add_documents_with_progress(files, |_| {})
    }

    /// Parse and append a batch of files, reporting the percentage done after each one
    pub fn add_documents_with_progress(
        mut self,
        files: Vec<InputFile>,
        mut progress: impl FnMut(u8),
    ) -> Self {
        let total = files.len();
        let mut file_errors = Vec::new();

        for (index, file) in files.into_iter().enumerate() {
            match self.parse_input(&file) {
                Ok(mut doc) => {
                    doc.order = self.documents.len();
                    log::info!("Added '{}' as {}", doc.name, doc.id);
                    self.documents.push(doc);
                }
                Err(error) => {
                    log::warn!("Could not add '{}': {}", file.name, error);
                    file_errors.push(FileError {
                        name: file.name,
                        error,
                    });
                }
            }

            let done = (index + 1) * 100 / total;
            progress(u8::try_from(done).unwrap_or(100));
        }

        self.file_errors = file_errors;
        self.ensure_main();
        self
    }

    fn parse_input(&mut self, file: &InputFile) -> Result<ParsedDocument> {
        let source_type = file
            .source_type
            .clone()
            .unwrap_or_else(|| SourceType::detect(&file.name, &file.bytes));

        match &source_type {
            SourceType::Unknown(_) => return Err(Error::UnsupportedFormat(source_type)),
            SourceType::PageDescription
                if self.settings.page_description_input == PageDescriptionPolicy::Reject =>
            {
                return Err(Error::UnsupportedFormat(source_type));
            }
            _ => {}
        }

        let doc = parse_document(DocumentId(self.next_id), &file.name, &file.bytes, source_type)?;
        self.next_id += 1;
        Ok(doc)
    }

    /// Make the document `id` the style authority
    pub fn set_main_document(mut self, id: DocumentId) -> Self {
        if self.document(id).is_none() {
            log::warn!("Cannot set main document: {} is not in the session", id);
            return self;
        }
        for doc in &mut self.documents {
            doc.is_main_document = doc.id == id;
        }
        self
    }

    /// Move the document at position `from` to position `to`
    pub fn reorder_documents(mut self, from: usize, to: usize) -> Self {
        let len = self.documents.len();
        if from >= len || to >= len {
            log::warn!(
                "Cannot move document {} to {}: the session holds {} documents",
                from,
                to,
                len
            );
            return self;
        }
        let doc = self.documents.remove(from);
        self.documents.insert(to, doc);
        self.renumber();
        self
    }

    /// Remove the document `id`; removing the main document promotes the new first one
    pub fn remove_document(mut self, id: DocumentId) -> Self {
        let Some(index) = self.documents.iter().position(|doc| doc.id == id) else {
            log::warn!("Cannot remove {}: it is not in the session", id);
            return self;
        };
        let removed = self.documents.remove(index);
        log::info!("Removed '{}'", removed.name);
        self.renumber();
        self.ensure_main();
        self
    }

    pub fn update_settings(mut self, patch: &MergeSettingsPatch) -> Self {
        self.settings = self.settings.patched(patch);
        self
    }

    /// Edit the main document's style for one element kind
    pub fn update_main_style(mut self, kind: ElementKind, patch: &ElementStylePatch) -> Self {
        match self.documents.iter_mut().find(|doc| doc.is_main_document) {
            Some(main) => main.style_map.patch(kind, patch),
            None => log::warn!("Cannot update {} style: no main document", kind),
        }
        self
    }

    /// Set the ordinal format of one list level in the main document's style map
    pub fn update_numbering_format(mut self, level: u8, format: impl Into<String>) -> Self {
        if level > MAX_LIST_LEVEL {
            log::warn!("Cannot set numbering format of level {}", level);
            return self;
        }
        match self.documents.iter_mut().find(|doc| doc.is_main_document) {
            Some(main) => {
                main.style_map.numbering_formats.insert(level, format.into());
            }
            None => log::warn!("Cannot update numbering format: no main document"),
        }
        self
    }

    /// Merge and assemble every output document
    ///
    /// On failure no file is returned and [`Session::error`] describes why;
    /// documents and settings are left as they were.
    pub fn process(mut self) -> (Self, Vec<OutputFile>) {
        self.error = None;

        match self.run() {
            Ok(files) => {
                log::info!("Produced {} document(s)", files.len());
                (self, files)
            }
            Err(error) => {
                log::error!("Processing failed: {}", error);
                self.error = Some(error.to_string());
                (self, Vec::new())
            }
        }
    }

    fn run(&self) -> Result<Vec<OutputFile>> {
        let streams = merge_collection(&self.documents, &self.settings)?;
        let Some(main) = self.main_document() else {
            return Ok(Vec::new());
        };

        streams
            .iter()
            .map(|stream| {
                Ok(OutputFile {
                    bytes: assemble(stream, main)?,
                    filename: stream.name.clone(),
                })
            })
            .collect()
    }

    /// Back to an empty session with default settings
    pub fn reset(self) -> Self {
        log::info!("Session reset");
        Self::new()
    }

    fn renumber(&mut self) {
        for (order, doc) in self.documents.iter_mut().enumerate() {
            doc.order = order;
        }
    }

    fn ensure_main(&mut self) {
        let mains = self.documents.iter().filter(|doc| doc.is_main_document).count();
        if mains == 0 {
            if let Some(first) = self.documents.first_mut() {
                log::info!("'{}' is now the main document", first.name);
                first.is_main_document = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use crate::parser::fixtures;
    use crate::settings::MergeMode;

    fn docx(name: &str, paragraphs: &[String]) -> InputFile {
        InputFile::new(name, fixtures::docx(&paragraphs.concat()))
    }

    fn report() -> InputFile {
        docx(
            "report.docx",
            &[
                fixtures::heading(1, "Findings"),
                fixtures::list_item(2, 0, "first bullet"),
                fixtures::list_item(2, 0, "second bullet"),
            ],
        )
    }

    fn session_with(names: &[&str]) -> Session {
        let files = names
            .iter()
            .map(|name| docx(name, &[fixtures::paragraph(name)]))
            .collect();
        Session::new().add_documents(files)
    }

    fn orders(session: &Session) -> Vec<usize> {
        session.documents().iter().map(|doc| doc.order).collect()
    }

    fn names(session: &Session) -> Vec<&str> {
        session.documents().iter().map(|doc| doc.name.as_str()).collect()
    }

    #[test]
    fn test_batch_with_unsupported_file_keeps_valid_documents() {
        // Arrange
        let files = vec![report(), InputFile::new("diagram.png", b"\x89PNG\r\n\x1a\n".to_vec())];

        // Act
        let session = Session::new().add_documents(files);

        // Assert
        assert_eq!(names(&session), vec!["report.docx"]);
        assert_eq!(session.file_errors().len(), 1);
        assert_eq!(session.file_errors()[0].name, "diagram.png");
        assert!(matches!(session.file_errors()[0].error, Error::UnsupportedFormat(_)));
        assert!(session.error().is_none());
        assert!(session.documents()[0].is_main_document);
    }

    #[test]
    fn test_malformed_container_is_a_per_file_parse_error() {
        let files = vec![InputFile::new("broken.docx", b"PK\x03\x04not a zip".to_vec()), report()];

        let session = Session::new().add_documents(files);

        assert_eq!(names(&session), vec!["report.docx"]);
        assert!(matches!(session.file_errors()[0].error, Error::Parse(_)));
    }

    #[test]
    fn test_file_errors_are_replaced_per_batch() {
        let session = Session::new().add_documents(vec![InputFile::new("a.bin", vec![0, 1, 2])]);
        assert_eq!(session.file_errors().len(), 1);

        let session = session.add_documents(vec![report()]);

        assert!(session.file_errors().is_empty());
    }

    #[test]
    fn test_progress_is_reported_after_each_file() {
        let mut reported = Vec::new();

        let session = Session::new().add_documents_with_progress(
            vec![report(), InputFile::new("notes.txt", b"hello".to_vec()), report()],
            |percent| reported.push(percent),
        );

        assert_eq!(reported, vec![33, 66, 100]);
        assert_eq!(orders(&session), vec![0, 1, 2]);
    }

    #[test]
    fn test_page_description_policy() {
        let pdf = || InputFile::new("scan.pdf", b"%PDF-1.7".to_vec());

        let session = Session::new().add_documents(vec![report(), pdf()]);
        assert_eq!(session.documents().len(), 2);
        assert!(!session.documents()[1].supported);

        let session = session
            .reset()
            .update_settings(&MergeSettingsPatch {
                page_description_input: Some(PageDescriptionPolicy::Reject),
                ..MergeSettingsPatch::default()
            })
            .add_documents(vec![report(), pdf()]);
        assert_eq!(session.documents().len(), 1);
        assert!(matches!(session.file_errors()[0].error, Error::UnsupportedFormat(SourceType::PageDescription)));
    }

    #[test]
    fn test_removing_main_promotes_new_first_document() {
        let session = session_with(&["a.docx", "b.docx", "c.docx"]);
        let b = session.documents()[1].id;
        let session = session.set_main_document(b);
        assert_eq!(session.main_document().unwrap().name, "b.docx");

        let session = session.remove_document(b).reorder_documents(1, 0);
        let main_id = session.main_document().unwrap().id;
        let session = session.remove_document(main_id);

        assert_eq!(names(&session), vec!["c.docx"]);
        assert_eq!(orders(&session), vec![0]);
        let mains: Vec<&ParsedDocument> = session.documents().iter().filter(|d| d.is_main_document).collect();
        assert_eq!(mains.len(), 1);
        assert_eq!(mains[0].order, 0);
    }

    #[test]
    fn test_reorder_keeps_membership_and_contiguous_order() {
        let session = session_with(&["a.docx", "b.docx", "c.docx", "d.docx"]);
        let mut expected: Vec<String> = names(&session).iter().map(|n| n.to_string()).collect();
        expected.sort_unstable();

        let session = session
            .reorder_documents(0, 3)
            .reorder_documents(2, 1)
            .reorder_documents(7, 0)
            .reorder_documents(3, 3);

        assert_eq!(names(&session), vec!["b.docx", "d.docx", "c.docx", "a.docx"]);
        assert_eq!(orders(&session), vec![0, 1, 2, 3]);
        let mut members: Vec<String> = names(&session).iter().map(|n| n.to_string()).collect();
        members.sort_unstable();
        assert_eq!(members, expected);
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let session = session_with(&["a.docx", "b.docx"]);

        let session = session
            .remove_document(DocumentId(99))
            .set_main_document(DocumentId(99));

        assert_eq!(names(&session), vec!["a.docx", "b.docx"]);
        assert_eq!(session.main_document().unwrap().name, "a.docx");
    }

    #[test]
    fn test_smart_merge_without_other_documents_fails_without_touching_collection() {
        let session = Session::new().add_documents(vec![report()]);
        let before = names(&session).iter().map(|n| n.to_string()).collect::<Vec<_>>();

        let (session, files) = session.process();

        assert!(files.is_empty());
        assert_eq!(session.error(), Some(MergeError::NoMergeableDocuments.to_string().as_str()));
        assert_eq!(names(&session), before);
        assert!(session.documents()[0].is_main_document);
    }

    #[test]
    fn test_process_produces_named_outputs_and_clears_error() {
        let session = Session::new().add_documents(vec![report()]);
        let (session, _) = session.process();
        assert!(session.error().is_some());

        let session = session.add_documents(vec![
            InputFile::new("appendix.txt", b"Appendix text".to_vec()),
            InputFile::new("glossary.txt", b"Glossary".to_vec()),
        ]);
        let (session, files) = session.process();
        assert!(session.error().is_none());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "report-merged.docx");

        let session = session.update_settings(&MergeSettingsPatch {
            mode: Some(MergeMode::StyleOnly),
            ..MergeSettingsPatch::default()
        });
        let (_, files) = session.process();
        let filenames: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(filenames, vec!["appendix-styled.docx", "glossary-styled.docx"]);
    }

    #[test]
    fn test_plain_text_main_is_invalid() {
        let session = Session::new().add_documents(vec![
            InputFile::new("notes.txt", b"hello".to_vec()),
            report(),
        ]);

        let (session, files) = session.process();

        assert!(files.is_empty());
        assert!(session.error().unwrap().contains("notes.txt"));
    }

    #[test]
    fn test_style_updates_apply_to_main_document() {
        let session = Session::new()
            .add_documents(vec![report()])
            .update_main_style(
                ElementKind::Heading(1),
                &ElementStylePatch {
                    bold: Some(false),
                    ..ElementStylePatch::default()
                },
            )
            .update_numbering_format(0, "upperRoman")
            .update_numbering_format(12, "decimal");

        let main = session.main_document().unwrap();
        let heading = main.style_map.resolve(ElementKind::Heading(1));
        assert!(!heading.bold);
        assert!(heading.overridden);
        assert_eq!(main.style_map.numbering_format(0), "upperRoman");
        assert!(!main.style_map.numbering_formats.contains_key(&12));
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let session = Session::new()
            .update_settings(&MergeSettingsPatch {
                mode: Some(MergeMode::SimpleMerge),
                ..MergeSettingsPatch::default()
            })
            .add_documents(vec![report()])
            .reset();

        assert!(session.documents().is_empty());
        assert_eq!(session.settings(), &MergeSettings::default());
        assert!(session.file_errors().is_empty());
    }
}
