//! Partially specified paragraph formatting read from `w:pPr` / `w:rPr`

use super::xml::{attr, wml, wml_bool, wml_val};
use crate::model::{Alignment, ElementStyle, TextRun};
use roxmltree::Node;

/// Reference to a numbering instance from `w:numPr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumRef {
    pub num_id: String,
    pub level: Option<u8>,
}

/// Formatting attributes where `None` means "not specified at this layer"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props {
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub color: Option<String>,
    pub alignment: Option<Alignment>,
    pub line_spacing: Option<u32>,
    pub indent_left: Option<i32>,
    pub indent_hanging: Option<i32>,
    pub outline_level: Option<u8>,
    pub numbering: Option<NumRef>,
}

impl Props {
    /// Read paragraph properties plus the run properties that apply to the paragraph
    pub fn read(ppr: Option<Node>, rpr: Option<Node>) -> Self {
        let mut props = Self::default();
        if let Some(ppr) = ppr {
            props.read_paragraph(ppr);
        }
        if let Some(rpr) = rpr {
            props.read_run(rpr);
        }
        props
    }

    fn read_paragraph(&mut self, ppr: Node) {
        self.alignment = wml_val(ppr, "jc").and_then(Alignment::from_ooxml);

        if let Some(spacing) = wml(ppr, "spacing") {
            // Only proportional spacing maps onto a line multiple
            let proportional = attr(spacing, "lineRule").is_none_or(|rule| rule == "auto");
            if proportional {
                self.line_spacing = attr(spacing, "line").and_then(|v| v.parse().ok());
            }
        }

        if let Some(ind) = wml(ppr, "ind") {
            self.indent_left = attr(ind, "left")
                .or_else(|| attr(ind, "start"))
                .and_then(|v| v.parse().ok());
            self.indent_hanging = attr(ind, "hanging").and_then(|v| v.parse().ok());
        }

        self.outline_level = wml_val(ppr, "outlineLvl").and_then(|v| v.parse().ok());

        if let Some(num_pr) = wml(ppr, "numPr") {
            if let Some(num_id) = wml_val(num_pr, "numId") {
                self.numbering = Some(NumRef {
                    num_id: num_id.to_string(),
                    level: wml_val(num_pr, "ilvl").and_then(|v| v.parse().ok()),
                });
            }
        }
    }

    fn read_run(&mut self, rpr: Node) {
        let overrides = run_overrides(rpr);
        self.font_family = overrides.font;
        self.font_size = overrides.size;
        self.bold = overrides.bold;
        self.italic = overrides.italic;
        self.underline = overrides.underline;
        self.color = overrides.color;
    }

    /// Fill every attribute still unset from a lower-precedence layer
    pub fn fill_from(&mut self, lower: &Props) {
        fn fill<T: Clone>(slot: &mut Option<T>, lower: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(lower);
            }
        }
        fill(&mut self.font_family, &lower.font_family);
        fill(&mut self.font_size, &lower.font_size);
        fill(&mut self.bold, &lower.bold);
        fill(&mut self.italic, &lower.italic);
        fill(&mut self.underline, &lower.underline);
        fill(&mut self.color, &lower.color);
        fill(&mut self.alignment, &lower.alignment);
        fill(&mut self.line_spacing, &lower.line_spacing);
        fill(&mut self.indent_left, &lower.indent_left);
        fill(&mut self.indent_hanging, &lower.indent_hanging);
        fill(&mut self.outline_level, &lower.outline_level);
        fill(&mut self.numbering, &lower.numbering);
    }

    /// Layer that specifies every formatting attribute of a resolved style
    pub fn from_style(style: &ElementStyle) -> Self {
        Self {
            font_family: Some(style.font_family.clone()),
            font_size: Some(style.font_size),
            bold: Some(style.bold),
            italic: Some(style.italic),
            underline: None,
            color: Some(style.color.clone()),
            alignment: Some(style.alignment),
            line_spacing: Some(style.line_spacing),
            indent_left: Some(style.indent_left),
            indent_hanging: Some(style.indent_hanging),
            outline_level: None,
            numbering: None,
        }
    }
}

/// Run-level overrides of a `w:rPr`, as carried by [`TextRun`]
pub fn run_overrides(rpr: Node) -> TextRun {
    TextRun {
        text: String::new(),
        bold: wml_bool(rpr, "b"),
        italic: wml_bool(rpr, "i"),
        underline: wml_val(rpr, "u").map(|v| v != "none"),
        color: wml_val(rpr, "color")
            .filter(|v| *v != "auto")
            .map(str::to_ascii_uppercase),
        font: wml(rpr, "rFonts")
            .and_then(|fonts| attr(fonts, "ascii").or_else(|| attr(fonts, "hAnsi")))
            .map(str::to_string),
        size: wml_val(rpr, "sz").and_then(|v| v.parse().ok()),
    }
}
