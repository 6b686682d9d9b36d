//! stylemerge - document style merging engine
//!
//! Combines word-processing documents under the styles of one main document.
//! Inputs are parsed into a format-independent element model, merged under
//! one of three policies and written back into a copy of the main
//! document's container.
//!
//! ```no_run
//! use stylemerge::{InputFile, Session};
//!
//! let session = Session::new().add_documents(vec![
//!     InputFile::new("handbook.docx", std::fs::read("handbook.docx")?),
//!     InputFile::new("chapter.docx", std::fs::read("chapter.docx")?),
//! ]);
//! let (session, files) = session.process();
//! if let Some(error) = session.error() {
//!     eprintln!("{}", error);
//! }
//! for file in &files {
//!     file.write_to(std::path::Path::new("out"))?;
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

pub mod assembler;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod parser;
pub mod scaffold;
pub mod session;
pub mod settings;
pub mod walker;

pub use config::{ConfigError, MergeConfig, DEFAULT_CONFIG_FILE};
pub use error::{Error, MergeError, PackagingError, ParseError, Result};
pub use model::{
    DocumentElement, DocumentId, DocumentStyleMap, ElementKind, ElementStyle, ElementStylePatch,
    ParsedDocument, SourceType,
};
pub use session::{FileError, InputFile, OutputFile, Session};
pub use settings::{
    ContinuationPolicy, MergeMode, MergeSettings, MergeSettingsPatch, PageDescriptionPolicy,
    RunFormattingPolicy,
};
