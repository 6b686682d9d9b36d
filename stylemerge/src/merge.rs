//! Merge engine
//!
//! Combines parsed documents into format-independent output streams. Every
//! element is rewritten to the style the main document uses for its kind and
//! every list item is placed into a numbering sequence the assembler can
//! instantiate.

use crate::error::MergeError;
use crate::model::{
    tracked_level, DocumentId, DocumentStructure, DocumentStyleMap, ElementKind, ListFamily,
    ListInfo, ParsedDocument, TextRun, TRACKED_LEVELS,
};
use crate::settings::{ContinuationPolicy, MergeMode, MergeSettings, RunFormattingPolicy};
use std::collections::HashMap;
use std::hash::Hash;

/// Logical list an output list item belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SequenceKey {
    /// A numbering instance of the style authority, reused as is
    Authority(String),
    /// A list the assembler must instantiate
    Synthesized(usize),
}

/// Numbering of one output list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPlacement {
    pub family: ListFamily,
    pub level: u8,
    /// Counter value the item displays
    pub ordinal: u32,
    pub sequence: SequenceKey,
}

/// One paragraph of an output stream
#[derive(Debug, Clone, PartialEq)]
pub struct OutputElement {
    pub kind: ElementKind,
    pub runs: Vec<TextRun>,
    /// Paragraph style id inside the style authority
    pub style_id: String,
    pub list: Option<ListPlacement>,
    /// Document the element came from
    pub source: DocumentId,
    pub page_break_before: bool,
}

impl OutputElement {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// One output document before serialization
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStream {
    /// File name of the output document
    pub name: String,
    /// Style map of the style authority
    pub style_map: DocumentStyleMap,
    pub elements: Vec<OutputElement>,
    /// Whether the authority's own body is kept and only the elements of
    /// other documents are written after it
    pub extends_authority: bool,
}

/// Merge the documents of a collection according to `settings`
///
/// The main document is the one flagged `is_main_document`; the others are
/// taken in `order`.
pub fn merge_collection(
    documents: &[ParsedDocument],
    settings: &MergeSettings,
) -> Result<Vec<OutputStream>, MergeError> {
    let main = documents.iter().find(|doc| doc.is_main_document);
    let mut others: Vec<&ParsedDocument> = documents
        .iter()
        .filter(|doc| !doc.is_main_document)
        .collect();
    others.sort_by_key(|doc| doc.order);

    merge(main, &others, settings)
}

/// Merge `others` into the style of `main`
pub fn merge(
    main: Option<&ParsedDocument>,
    others: &[&ParsedDocument],
    settings: &MergeSettings,
) -> Result<Vec<OutputStream>, MergeError> {
    let main = main.ok_or(MergeError::NoMainDocument)?;
    if !main.is_container() {
        return Err(MergeError::InvalidMainDocument {
            name: main.name.clone(),
            source_type: main.source_type.clone(),
        });
    }

    let eligible: Vec<&ParsedDocument> = others
        .iter()
        .copied()
        .filter(|doc| {
            if !doc.is_mergeable() {
                log::debug!("Skipping '{}': no content to merge", doc.name);
            }
            doc.is_mergeable()
        })
        .collect();

    log::info!(
        "Running {} with main '{}' and {} document(s)",
        settings.mode,
        main.name,
        eligible.len()
    );

    match settings.mode {
        MergeMode::SmartMerge | MergeMode::SimpleMerge if eligible.is_empty() => {
            Err(MergeError::NoMergeableDocuments)
        }
        MergeMode::SmartMerge => Ok(vec![smart_merge(main, &eligible, settings)]),
        MergeMode::SimpleMerge => Ok(vec![simple_merge(main, &eligible, settings)]),
        MergeMode::StyleOnly => {
            if eligible.is_empty() {
                log::warn!("Style-only merge without documents to restyle produces no output");
            }
            Ok(eligible
                .iter()
                .map(|doc| style_only(main, doc, settings))
                .collect())
        }
    }
}

/// Output name of the single merged document
fn merged_name(main: &ParsedDocument, settings: &MergeSettings) -> String {
    let stem = settings
        .output_stem
        .as_deref()
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| main.stem());
    format!("{}-merged.docx", stem)
}

/// Running counters per list family and tracked level
struct ContinuationCounters {
    counters: HashMap<ListFamily, [u32; TRACKED_LEVELS]>,
}

impl ContinuationCounters {
    fn starting_from(structure: &DocumentStructure) -> Self {
        let counters = [ListFamily::Ordinal, ListFamily::Bullet]
            .into_iter()
            .map(|family| (family, structure.last_counters(family)))
            .collect();
        Self { counters }
    }

    fn advance(&mut self, family: ListFamily, level: u8) -> u32 {
        let slot = tracked_level(level);
        let levels = self.counters.entry(family).or_insert([0; TRACKED_LEVELS]);
        levels[slot] = levels[slot].saturating_add(1);
        for deeper in levels.iter_mut().skip(slot + 1) {
            *deeper = 0;
        }
        levels[slot]
    }
}

/// Allocates synthesized sequence ids in first-use order
struct SequenceAllocator<K> {
    ids: HashMap<K, usize>,
    next: usize,
}

impl<K> Default for SequenceAllocator<K> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            next: 0,
        }
    }
}

impl<K: Hash + Eq> SequenceAllocator<K> {
    fn key(&mut self, key: K) -> SequenceKey {
        let next = &mut self.next;
        let id = *self.ids.entry(key).or_insert_with(|| {
            let id = *next;
            *next += 1;
            id
        });
        SequenceKey::Synthesized(id)
    }
}

/// Identifies a synthesized sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SequenceSource {
    /// All continued items of one family
    Continued(ListFamily),
    /// One source list kept on its own
    Source(DocumentId, String),
}

/// Main document elements keep their own numbering instances
fn main_elements(main: &ParsedDocument) -> Vec<OutputElement> {
    main.elements
        .iter()
        .map(|element| OutputElement {
            kind: element.kind,
            runs: element.runs.clone(),
            style_id: main.style_map.resolve(element.kind).style_id.clone(),
            list: element.list.as_ref().map(|list| ListPlacement {
                family: list.family,
                level: list.level,
                ordinal: list.ordinal,
                sequence: SequenceKey::Authority(list.num_id.clone()),
            }),
            source: main.id,
            page_break_before: false,
        })
        .collect()
}

/// Restyle the elements of a non-main document, numbering lists with `place`
fn restyled_elements(
    main: &ParsedDocument,
    doc: &ParsedDocument,
    settings: &MergeSettings,
    page_break: bool,
    mut place: impl FnMut(&ListInfo) -> (u32, SequenceKey),
) -> Vec<OutputElement> {
    doc.elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let list = element.list.as_ref().map(|list| {
                let (ordinal, sequence) = place(list);
                ListPlacement {
                    family: list.family,
                    level: list.level,
                    ordinal,
                    sequence,
                }
            });
            OutputElement {
                kind: element.kind,
                runs: element
                    .runs
                    .iter()
                    .map(|run| apply_run_policy(run, settings.run_formatting))
                    .collect(),
                style_id: main.style_map.resolve(element.kind).style_id.clone(),
                list,
                source: doc.id,
                page_break_before: page_break && index == 0,
            }
        })
        .collect()
}

fn apply_run_policy(run: &TextRun, policy: RunFormattingPolicy) -> TextRun {
    match policy {
        RunFormattingPolicy::KeepAll => run.clone(),
        RunFormattingPolicy::KeepEmphasis => run.emphasis_only(),
        RunFormattingPolicy::Strip => run.plain(),
    }
}

fn smart_merge(
    main: &ParsedDocument,
    others: &[&ParsedDocument],
    settings: &MergeSettings,
) -> OutputStream {
    let mut elements = main_elements(main);
    let mut counters = ContinuationCounters::starting_from(&main.structure);
    let mut sequences = SequenceAllocator::<SequenceSource>::default();

    for doc in others {
        let page_break = settings.page_break_between_documents && !elements.is_empty();
        let merged = restyled_elements(main, doc, settings, page_break, |list| {
            let continues = match settings.continuation {
                ContinuationPolicy::Level => true,
                ContinuationPolicy::SameFormat => {
                    list.family == ListFamily::Bullet
                        || list.format == main.style_map.numbering_format(list.level)
                }
            };

            if continues {
                let ordinal = counters.advance(list.family, list.level);
                (ordinal, sequences.key(SequenceSource::Continued(list.family)))
            } else {
                log::debug!(
                    "List {} of '{}' uses {} and restarts",
                    list.num_id,
                    doc.name,
                    list.format
                );
                (
                    list.ordinal,
                    sequences.key(SequenceSource::Source(doc.id, list.num_id.clone())),
                )
            }
        });
        elements.extend(merged);
    }

    OutputStream {
        name: merged_name(main, settings),
        style_map: main.style_map.clone(),
        elements,
        extends_authority: true,
    }
}

fn simple_merge(
    main: &ParsedDocument,
    others: &[&ParsedDocument],
    settings: &MergeSettings,
) -> OutputStream {
    let mut elements = main_elements(main);
    let mut sequences = SequenceAllocator::<SequenceSource>::default();

    for doc in others {
        let page_break = settings.page_break_between_documents && !elements.is_empty();
        let merged = restyled_elements(main, doc, settings, page_break, |list| {
            (
                list.ordinal,
                sequences.key(SequenceSource::Source(doc.id, list.num_id.clone())),
            )
        });
        elements.extend(merged);
    }

    OutputStream {
        name: merged_name(main, settings),
        style_map: main.style_map.clone(),
        elements,
        extends_authority: true,
    }
}

fn style_only(main: &ParsedDocument, doc: &ParsedDocument, settings: &MergeSettings) -> OutputStream {
    let mut sequences = SequenceAllocator::<String>::default();
    let elements = restyled_elements(main, doc, settings, false, |list| {
        (list.ordinal, sequences.key(list.num_id.clone()))
    });

    OutputStream {
        name: format!("{}-styled.docx", doc.stem()),
        style_map: main.style_map.clone(),
        elements,
        extends_authority: false,
    }
}
