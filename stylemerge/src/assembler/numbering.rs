//! Numbering instances for the lists of an output stream

use super::paragraph::NumberingRef;
use crate::merge::{OutputStream, SequenceKey};
use crate::model::{DocumentStyleMap, ListFamily, TRACKED_LEVELS};
use crate::parser::{AbstractNum, NumberingDefinitions};
use std::collections::{BTreeMap, HashMap};

/// Levels a synthesized abstract definition declares
const ABSTRACT_LEVELS: u8 = 9;

/// Twips of indentation per list level
const LEVEL_INDENT: u32 = 720;

/// A list the assembler instantiates as a new `w:num`
#[derive(Debug, Clone, PartialEq, Eq)]
struct SynthesizedNum {
    num_id: u32,
    abstract_id: String,
    /// First ordinal of each level, pinned with `w:startOverride`
    starts: BTreeMap<u8, u32>,
}

/// Numbering definitions the output needs beyond the authority's own
#[derive(Debug, Default)]
pub struct NumberingPlan {
    ids: HashMap<SequenceKey, u32>,
    nums: Vec<SynthesizedNum>,
    /// Generated `w:abstractNum` elements
    abstracts: Vec<String>,
}

impl NumberingPlan {
    /// Allocate a numbering instance for every synthesized sequence of `stream`
    pub fn build(stream: &OutputStream, authority: &NumberingDefinitions) -> Self {
        let mut plan = Self::default();
        let mut next_num = authority.max_num_id().saturating_add(1);
        let mut next_abstract = authority
            .max_abstract_id()
            .map_or(0, |id| id.saturating_add(1));
        let mut family_abstracts: HashMap<ListFamily, String> = HashMap::new();

        for element in &stream.elements {
            let Some(list) = &element.list else {
                continue;
            };

            if let SequenceKey::Authority(num_id) = &list.sequence {
                if let Some(id) = num_id.parse::<u32>().ok().filter(|id| *id > 0) {
                    plan.ids.insert(list.sequence.clone(), id);
                    continue;
                }
                if !plan.ids.contains_key(&list.sequence) {
                    log::warn!(
                        "Numbering instance '{}' has no usable w:numId; writing a new instance",
                        num_id
                    );
                }
            }

            if let Some(num) = plan
                .ids
                .get(&list.sequence)
                .and_then(|id| plan.nums.iter_mut().find(|num| num.num_id == *id))
            {
                num.starts.entry(list.level).or_insert(list.ordinal);
                continue;
            }

            let abstract_id = family_abstracts
                .entry(list.family)
                .or_insert_with(|| {
                    match matching_abstract(authority, list.family, &stream.style_map) {
                        Some(existing) => {
                            log::debug!(
                                "Reusing abstract numbering {} for {:?} lists",
                                existing.id,
                                list.family
                            );
                            existing.id.clone()
                        }
                        None => {
                            let id = next_abstract;
                            next_abstract = next_abstract.saturating_add(1);
                            plan.abstracts
                                .push(abstract_num_xml(id, list.family, &stream.style_map));
                            id.to_string()
                        }
                    }
                })
                .clone();

            plan.ids.insert(list.sequence.clone(), next_num);
            plan.nums.push(SynthesizedNum {
                num_id: next_num,
                abstract_id,
                starts: BTreeMap::from([(list.level, list.ordinal)]),
            });
            next_num = next_num.saturating_add(1);
        }

        plan
    }

    /// `w:numPr` reference of a sequence at `level`
    pub fn reference(&self, sequence: &SequenceKey, level: u8) -> Option<NumberingRef> {
        self.ids
            .get(sequence)
            .map(|num_id| NumberingRef {
                num_id: *num_id,
                level,
            })
    }

    /// Whether the numbering part must be written at all
    pub fn is_empty(&self) -> bool {
        self.nums.is_empty() && self.abstracts.is_empty()
    }

    /// Generated `w:abstractNum` elements
    pub fn abstracts_xml(&self) -> String {
        self.abstracts.concat()
    }

    /// Generated `w:num` elements
    pub fn nums_xml(&self) -> String {
        self.nums
            .iter()
            .map(|num| {
                let mut xml = format!(
                    r#"<w:num w:numId="{}"><w:abstractNumId w:val="{}"/>"#,
                    num.num_id, num.abstract_id
                );
                for (level, start) in &num.starts {
                    xml.push_str(&format!(
                        r#"<w:lvlOverride w:ilvl="{}"><w:startOverride w:val="{}"/></w:lvlOverride>"#,
                        level, start
                    ));
                }
                xml.push_str("</w:num>");
                xml
            })
            .collect()
    }
}

/// An authority definition of `family` whose level formats agree with the style map
fn matching_abstract<'a>(
    authority: &'a NumberingDefinitions,
    family: ListFamily,
    style_map: &DocumentStyleMap,
) -> Option<&'a AbstractNum> {
    authority.abstracts().find(|candidate| {
        if candidate.family() != Some(family) {
            return false;
        }
        match family {
            ListFamily::Bullet => true,
            ListFamily::Ordinal => candidate
                .levels
                .iter()
                .filter(|(level, _)| usize::from(**level) < TRACKED_LEVELS)
                .all(|(level, def)| def.format == style_map.numbering_format(*level)),
        }
    })
}

fn abstract_num_xml(id: u32, family: ListFamily, style_map: &DocumentStyleMap) -> String {
    let mut xml = format!(
        r#"<w:abstractNum w:abstractNumId="{}"><w:multiLevelType w:val="hybridMultilevel"/>"#,
        id
    );
    for level in 0..ABSTRACT_LEVELS {
        let (format, text) = match family {
            ListFamily::Ordinal => (
                style_map.numbering_format(level).to_string(),
                format!("%{}.", level + 1),
            ),
            ListFamily::Bullet => ("bullet".to_string(), "\u{2022}".to_string()),
        };
        xml.push_str(&format!(
            r#"<w:lvl w:ilvl="{level}"><w:start w:val="1"/><w:numFmt w:val="{format}"/><w:lvlText w:val="{text}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{left}" w:hanging="360"/></w:pPr></w:lvl>"#,
            level = level,
            format = format,
            text = text,
            left = LEVEL_INDENT * (u32::from(level) + 1),
        ));
    }
    xml.push_str("</w:abstractNum>");
    xml
}
