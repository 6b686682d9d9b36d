//! Numbering definitions from `word/numbering.xml` and per-instance counters

use super::xml::{attr, is_wml, parse_xml, wml, wml_val};
use crate::error::ParseError;
use crate::model::{ListFamily, NUMBERING_PART};
use std::collections::{BTreeMap, HashMap};

/// One `w:lvl` of an abstract numbering definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDef {
    /// `w:numFmt` value
    pub format: String,
    /// `w:lvlText` pattern such as `%1.`
    pub text: Option<String>,
    /// `w:start` value
    pub start: u32,
}

/// A `w:abstractNum`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbstractNum {
    pub id: String,
    pub levels: BTreeMap<u8, LevelDef>,
}

impl AbstractNum {
    /// Family of the first level, which decides how the list reads
    pub fn family(&self) -> Option<ListFamily> {
        self.levels
            .values()
            .next()
            .map(|level| ListFamily::from_format(&level.format))
    }

    /// Level formats keyed by level
    pub fn formats(&self) -> BTreeMap<u8, String> {
        self.levels
            .iter()
            .map(|(level, def)| (*level, def.format.clone()))
            .collect()
    }
}

/// A `w:num` instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumInstance {
    pub abstract_id: String,
    /// `w:lvlOverride/w:startOverride` per level
    pub start_overrides: BTreeMap<u8, u32>,
}

/// Every numbering definition of one document
#[derive(Debug, Clone, Default)]
pub struct NumberingDefinitions {
    abstracts: BTreeMap<String, AbstractNum>,
    nums: HashMap<String, NumInstance>,
}

impl NumberingDefinitions {
    /// Parse `word/numbering.xml`
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let doc = parse_xml(NUMBERING_PART, xml)?;
        let root = doc.root_element();
        let mut defs = Self::default();

        for node in root.children().filter(|n| is_wml(*n, "abstractNum")) {
            let Some(id) = attr(node, "abstractNumId") else {
                continue;
            };
            let mut abstract_num = AbstractNum {
                id: id.to_string(),
                levels: BTreeMap::new(),
            };
            for lvl in node.children().filter(|n| is_wml(*n, "lvl")) {
                let Some(level) = attr(lvl, "ilvl").and_then(|v| v.parse::<u8>().ok()) else {
                    continue;
                };
                abstract_num.levels.insert(
                    level,
                    LevelDef {
                        format: wml_val(lvl, "numFmt").unwrap_or("decimal").to_string(),
                        text: wml_val(lvl, "lvlText").map(str::to_string),
                        start: wml_val(lvl, "start").and_then(|v| v.parse().ok()).unwrap_or(1),
                    },
                );
            }
            defs.abstracts.insert(abstract_num.id.clone(), abstract_num);
        }

        for node in root.children().filter(|n| is_wml(*n, "num")) {
            let (Some(num_id), Some(abstract_id)) =
                (attr(node, "numId"), wml_val(node, "abstractNumId"))
            else {
                continue;
            };
            let start_overrides = node
                .children()
                .filter(|n| is_wml(*n, "lvlOverride"))
                .filter_map(|ovr| {
                    let level = attr(ovr, "ilvl")?.parse::<u8>().ok()?;
                    let start = wml_val(ovr, "startOverride")?.parse::<u32>().ok()?;
                    Some((level, start))
                })
                .collect();
            defs.nums.insert(
                num_id.to_string(),
                NumInstance {
                    abstract_id: abstract_id.to_string(),
                    start_overrides,
                },
            );
        }

        log::debug!(
            "Parsed {} abstract numbering definitions, {} instances",
            defs.abstracts.len(),
            defs.nums.len()
        );
        Ok(defs)
    }

    /// Abstract definition behind a numbering instance
    pub fn abstract_for(&self, num_id: &str) -> Option<&AbstractNum> {
        self.nums
            .get(num_id)
            .and_then(|num| self.abstracts.get(&num.abstract_id))
    }

    /// Level definition of an instance
    pub fn level(&self, num_id: &str, level: u8) -> Option<&LevelDef> {
        self.abstract_for(num_id)
            .and_then(|abstract_num| abstract_num.levels.get(&level))
    }

    /// First counter value of a level, honouring instance overrides
    pub fn start(&self, num_id: &str, level: u8) -> u32 {
        self.nums
            .get(num_id)
            .and_then(|num| num.start_overrides.get(&level).copied())
            .or_else(|| self.level(num_id, level).map(|def| def.start))
            .unwrap_or(1)
    }

    /// Level formats of the instance's abstract definition
    pub fn formats(&self, num_id: &str) -> BTreeMap<u8, String> {
        self.abstract_for(num_id)
            .map(AbstractNum::formats)
            .unwrap_or_default()
    }

    pub fn abstracts(&self) -> impl Iterator<Item = &AbstractNum> {
        self.abstracts.values()
    }

    /// Instance ids that point at `abstract_id`, in ascending numeric order
    pub fn instances_of(&self, abstract_id: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .nums
            .iter()
            .filter(|(_, num)| num.abstract_id == abstract_id)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_by_key(|id| id.parse::<u32>().unwrap_or(u32::MAX));
        ids
    }

    /// Highest numeric `w:numId`, 0 when there is none
    pub fn max_num_id(&self) -> u32 {
        self.nums
            .keys()
            .filter_map(|id| id.parse().ok())
            .max()
            .unwrap_or(0)
    }

    /// Highest numeric `w:abstractNumId`, `None` when there is none
    pub fn max_abstract_id(&self) -> Option<u32> {
        self.abstracts.keys().filter_map(|id| id.parse().ok()).max()
    }

    pub fn is_empty(&self) -> bool {
        self.abstracts.is_empty() && self.nums.is_empty()
    }
}

/// Running list counters per `(numId, level)`
#[derive(Debug, Default)]
pub struct ListCounters {
    counters: HashMap<(String, u8), u32>,
}

impl ListCounters {
    /// Advance the counter of an item and reset deeper levels of the same instance
    pub fn next(&mut self, num_id: &str, level: u8, start: u32) -> u32 {
        let value = match self.counters.get(&(num_id.to_string(), level)) {
            Some(current) => current.saturating_add(1),
            None => start,
        };
        self.counters.insert((num_id.to_string(), level), value);
        self.counters
            .retain(|(id, lvl), _| id != num_id || *lvl <= level);
        value
    }
}
