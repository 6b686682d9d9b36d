use std::io::{Cursor, Write};
use stylemerge::parser::parse_document;
use stylemerge::scaffold::scaffold;
use stylemerge::{
    DocumentId, DocumentStyleMap, ElementKind, InputFile, MergeConfig, MergeMode,
    MergeSettingsPatch, ParsedDocument, Session, SourceType,
};
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:sz w:val="20"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:rPr><w:b/><w:sz w:val="40"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="720"/></w:pPr></w:style></w:styles>"#;

const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl><w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="%2)"/></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

fn heading(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
        text
    )
}

fn item(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
        text
    )
}

fn paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t>{}</w:t></w:r></w:p>"#, text)
}

/// A DOCX archive with the given body paragraphs
fn docx(paragraphs: &[String]) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720"/></w:sectPr></w:body></w:document>"#,
        paragraphs.concat()
    );
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/document.xml", document),
        ("word/styles.xml", STYLES.to_string()),
        ("word/numbering.xml", NUMBERING.to_string()),
    ];

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn reparse(name: &str, bytes: &[u8]) -> ParsedDocument {
    parse_document(DocumentId(100), name, bytes, SourceType::Container).unwrap()
}

fn ordinals(doc: &ParsedDocument) -> Vec<u32> {
    doc.elements
        .iter()
        .filter_map(|element| element.list.as_ref())
        .map(|list| list.ordinal)
        .collect()
}

fn handbook() -> InputFile {
    InputFile::new(
        "handbook.docx",
        docx(&[heading("Procedures"), item("Prepare"), item("Review"), item("Approve")]),
    )
}

fn chapter() -> InputFile {
    InputFile::new(
        "chapter.docx",
        docx(&[heading("Release"), paragraph("Steps follow."), item("Tag"), item("Publish")]),
    )
}

#[test]
fn test_smart_merge_writes_continuous_document() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let session = Session::new().add_documents(vec![handbook(), chapter()]);

    // Act
    let (session, files) = session.process();
    let paths: Vec<_> = files
        .iter()
        .map(|file| file.write_to(dir.path()).unwrap())
        .collect();

    // Assert
    assert!(session.error().is_none());
    assert_eq!(paths, vec![dir.path().join("handbook-merged.docx")]);

    let merged = reparse("handbook-merged.docx", &std::fs::read(&paths[0]).unwrap());
    let texts: Vec<String> = merged.elements.iter().map(|e| e.text()).collect();
    assert_eq!(
        texts,
        vec!["Procedures", "Prepare", "Review", "Approve", "Release", "Steps follow.", "Tag", "Publish"]
    );
    assert_eq!(ordinals(&merged), vec![1, 2, 3, 4, 5]);
    assert_eq!(merged.elements[4].kind, ElementKind::Heading(1));
    assert_eq!(merged.style_map.resolve(ElementKind::Heading(1)).font_size, 40);
}

#[test]
fn test_simple_merge_restarts_lists() {
    let session = Session::new()
        .update_settings(&MergeSettingsPatch {
            mode: Some(MergeMode::SimpleMerge),
            output_stem: Some("combined".to_string()),
            ..MergeSettingsPatch::default()
        })
        .add_documents(vec![handbook(), chapter()]);

    let (_, files) = session.process();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "combined-merged.docx");
    let merged = reparse(&files[0].filename, &files[0].bytes);
    assert_eq!(ordinals(&merged), vec![1, 2, 3, 1, 2]);
}

#[test]
fn test_style_only_restyles_each_input() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::new()
        .update_settings(&MergeSettingsPatch {
            mode: Some(MergeMode::StyleOnly),
            ..MergeSettingsPatch::default()
        })
        .add_documents(vec![
            handbook(),
            chapter(),
            InputFile::new("notes.txt", b"First note\nSecond note".to_vec()),
        ]);

    let (_, files) = session.process();
    for file in &files {
        file.write_to(dir.path()).unwrap();
    }

    let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["chapter-styled.docx", "notes-styled.docx"]);
    assert!(dir.path().join("notes-styled.docx").is_file());

    let notes = reparse("notes-styled.docx", &files[1].bytes);
    assert_eq!(notes.elements.len(), 2);
    assert!(notes.elements.iter().all(|e| e.kind == ElementKind::Body));
    assert_eq!(notes.style_map.resolve(ElementKind::Body).font_family, "Arial");
}

#[test]
fn test_scaffold_serves_as_main_document() {
    let mut style_map = DocumentStyleMap::builtin();
    let config: MergeConfig = toml::from_str(
        r#"
[styles.heading1]
font_family = "Georgia"
font_size = 44
"#,
    )
    .unwrap();
    config.apply_to_style_map(&mut style_map).unwrap();
    let authority = scaffold(&style_map).unwrap();

    let session = Session::new().add_documents(vec![InputFile::new("authority.docx", authority), chapter()]);
    let (session, files) = session.process();

    assert!(session.error().is_none(), "{:?}", session.error());
    let merged = reparse(&files[0].filename, &files[0].bytes);
    let texts: Vec<String> = merged.elements.iter().map(|e| e.text()).collect();
    assert_eq!(texts, vec!["Release", "Steps follow.", "Tag", "Publish"]);
    assert_eq!(merged.elements[0].kind, ElementKind::Heading(1));
    let heading = merged.style_map.resolve(ElementKind::Heading(1));
    assert_eq!(heading.font_family, "Georgia");
    assert_eq!(heading.font_size, 44);
    assert_eq!(ordinals(&merged), vec![1, 2]);
}

#[test]
fn test_config_file_drives_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stylemerge.toml");
    std::fs::write(
        &path,
        r#"
[settings]
mode = "simple-merge"
page_break_between_documents = true

[styles.body]
italic = true
"#,
    )
    .unwrap();
    let config = MergeConfig::load(&path).unwrap();

    let session = Session::new().add_documents(vec![handbook(), chapter()]);
    let session = config.apply(session).unwrap();
    let (_, files) = session.process();

    let xml = document_xml(&files[0].bytes);
    assert!(xml.contains("<w:pageBreakBefore/>"));
    // Overridden body style is written as direct formatting
    assert!(xml.contains("<w:i/>"));
    let merged = reparse(&files[0].filename, &files[0].bytes);
    assert_eq!(ordinals(&merged), vec![1, 2, 3, 1, 2]);
}

fn document_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    std::io::Read::read_to_string(&mut file, &mut xml).unwrap();
    xml
}
