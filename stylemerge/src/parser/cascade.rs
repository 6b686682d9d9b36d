//! Style resolution cascade
//!
//! Formatting is resolved by running [`CASCADE`] in order. Each resolver
//! contributes one layer of [`Props`]; a layer only fills attributes that
//! every earlier layer left unset.

use super::props::Props;
use super::styles::StyleSheet;
use crate::model::{builtin_style, ElementKind, ElementStyle};

/// Everything a resolver may consult for one paragraph
pub struct ResolveContext<'a> {
    pub sheet: &'a StyleSheet,
    /// Direct paragraph properties and paragraph-mark run properties
    pub direct: &'a Props,
    /// Effective paragraph style id
    pub style_id: Option<&'a str>,
    pub kind: ElementKind,
}

/// One layer of the cascade
pub type Resolver = fn(&ResolveContext) -> Props;

/// Resolvers from highest to lowest precedence
pub const CASCADE: [(&str, Resolver); 4] = [
    ("inline", inline),
    ("paragraph-style", paragraph_style),
    ("document-default", document_default),
    ("built-in", built_in),
];

fn inline(ctx: &ResolveContext) -> Props {
    ctx.direct.clone()
}

fn paragraph_style(ctx: &ResolveContext) -> Props {
    ctx.style_id
        .map(|id| ctx.sheet.resolved_props(id))
        .unwrap_or_default()
}

fn document_default(ctx: &ResolveContext) -> Props {
    ctx.sheet.defaults.clone()
}

fn built_in(ctx: &ResolveContext) -> Props {
    Props::from_style(builtin_style(ctx.kind))
}

/// Run every resolver in order
pub fn resolve_props(ctx: &ResolveContext) -> Props {
    CASCADE
        .iter()
        .fold(Props::default(), |mut props, (name, resolver)| {
            let layer = resolver(ctx);
            log::trace!("Cascade layer '{}' for {}", name, ctx.kind);
            props.fill_from(&layer);
            props
        })
}

/// Resolved formatting of a paragraph as an [`ElementStyle`]
pub fn resolve_element_style(ctx: &ResolveContext) -> ElementStyle {
    let builtin = builtin_style(ctx.kind);
    let props = resolve_props(ctx);

    let style_id = ctx
        .style_id
        .map(str::to_string)
        .unwrap_or_else(|| builtin.style_id.clone());
    let style_name = ctx
        .style_id
        .and_then(|id| ctx.sheet.get(id))
        .and_then(|def| def.name.clone())
        .unwrap_or_else(|| builtin.style_name.clone());

    // The built-in layer guarantees every attribute is set
    ElementStyle {
        style_id,
        style_name,
        font_family: props.font_family.unwrap_or_else(|| builtin.font_family.clone()),
        font_size: props.font_size.unwrap_or(builtin.font_size),
        bold: props.bold.unwrap_or(builtin.bold),
        italic: props.italic.unwrap_or(builtin.italic),
        color: props.color.unwrap_or_else(|| builtin.color.clone()),
        alignment: props.alignment.unwrap_or(builtin.alignment),
        line_spacing: props.line_spacing.unwrap_or(builtin.line_spacing),
        indent_left: props.indent_left.unwrap_or(builtin.indent_left),
        indent_hanging: props.indent_hanging.unwrap_or(builtin.indent_hanging),
        overridden: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alignment;
    use crate::parser::xml::WML_NS;

    fn sheet() -> StyleSheet {
        let xml = format!(
            r#"<w:styles xmlns:w="{}">
                 <w:docDefaults>
                   <w:rPrDefault><w:rPr><w:rFonts w:ascii="Aptos"/><w:sz w:val="24"/></w:rPr></w:rPrDefault>
                   <w:pPrDefault><w:pPr><w:spacing w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault>
                 </w:docDefaults>
                 <w:style w:type="paragraph" w:styleId="Heading1">
                   <w:name w:val="heading 1"/>
                   <w:rPr><w:b/><w:sz w:val="36"/><w:color w:val="1F3864"/></w:rPr>
                 </w:style>
               </w:styles>"#,
            WML_NS
        );
        StyleSheet::parse(&xml).unwrap()
    }

    fn context<'a>(sheet: &'a StyleSheet, direct: &'a Props, style_id: Option<&'a str>) -> ResolveContext<'a> {
        ResolveContext {
            sheet,
            direct,
            style_id,
            kind: ElementKind::Heading(1),
        }
    }

    #[test]
    fn test_cascade_order() {
        let names: Vec<&str> = CASCADE.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["inline", "paragraph-style", "document-default", "built-in"]);
    }

    #[test]
    fn test_inline_layer_only_reports_direct_properties() {
        let sheet = sheet();
        let direct = Props {
            alignment: Some(Alignment::Center),
            ..Props::default()
        };

        let layer = inline(&context(&sheet, &direct, Some("Heading1")));

        assert_eq!(layer.alignment, Some(Alignment::Center));
        assert_eq!(layer.font_size, None);
    }

    #[test]
    fn test_paragraph_style_layer_reads_style_chain() {
        let sheet = sheet();
        let direct = Props::default();

        let layer = paragraph_style(&context(&sheet, &direct, Some("Heading1")));

        assert_eq!(layer.font_size, Some(36));
        assert_eq!(layer.bold, Some(true));
        assert_eq!(layer.font_family, None);
        assert_eq!(paragraph_style(&context(&sheet, &direct, None)), Props::default());
    }

    #[test]
    fn test_document_default_layer() {
        let sheet = sheet();
        let direct = Props::default();

        let layer = document_default(&context(&sheet, &direct, None));

        assert_eq!(layer.font_family.as_deref(), Some("Aptos"));
        assert_eq!(layer.line_spacing, Some(276));
    }

    #[test]
    fn test_built_in_layer_is_complete() {
        let sheet = StyleSheet::default();
        let direct = Props::default();

        let layer = built_in(&context(&sheet, &direct, None));

        assert_eq!(layer, Props::from_style(builtin_style(ElementKind::Heading(1))));
    }

    #[test]
    fn test_resolve_element_style_combines_layers() {
        let sheet = sheet();
        let direct = Props {
            font_size: Some(40),
            ..Props::default()
        };

        let style = resolve_element_style(&context(&sheet, &direct, Some("Heading1")));

        assert_eq!(style.style_id, "Heading1");
        assert_eq!(style.style_name, "heading 1");
        assert_eq!(style.font_size, 40);
        assert_eq!(style.color, "1F3864");
        assert_eq!(style.font_family, "Aptos");
        assert_eq!(style.line_spacing, 276);
        assert!(style.bold);
        assert!(!style.overridden);
    }
}
