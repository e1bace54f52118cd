//! WordprocessingML (`.docx`) serializer.
//!
//! A `.docx` file is a zip package of XML parts. We write the minimum set a
//! word processor needs to open the file with proper styles:
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! docProps/core.xml
//! word/document.xml            one <w:p> per Block
//! word/styles.xml              Title, Heading1–4, ListBullet, ListNumber
//! word/numbering.xml           bullet + decimal list definitions
//! word/_rels/document.xml.rels
//! ```
//!
//! The output is built entirely in memory and returned as bytes.

use crate::document::{Block, Document};
use crate::error::LessonDocError;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Left indent added per bullet nesting level (0.25 inch).
pub const INDENT_TWIPS_PER_LEVEL: usize = 360;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Serialize `doc` into a `.docx` byte buffer.
pub fn to_docx(doc: &Document) -> Result<Vec<u8>, LessonDocError> {
    let title = doc.blocks().iter().find_map(|b| match b {
        Block::Title { text } => Some(text.as_str()),
        _ => None,
    });

    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", package_rels_xml()),
        ("docProps/core.xml", core_props_xml(title)),
        ("word/document.xml", document_xml(doc)),
        ("word/styles.xml", styles_xml()),
        ("word/numbering.xml", numbering_xml()),
        ("word/_rels/document.xml.rels", document_rels_xml()),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, xml) in &parts {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(*name, options)?;
        zip.write_all(xml.as_bytes())
            .map_err(|e| LessonDocError::DocumentWrite(format!("{name}: {e}")))?;
    }

    let bytes = zip.finish()?.into_inner();
    debug!("Serialized {} blocks into {} bytes", doc.len(), bytes.len());
    Ok(bytes)
}

// ── word/document.xml ────────────────────────────────────────────────────

/// Body XML for `doc`.
pub fn document_xml(doc: &Document) -> String {
    let mut xml = String::with_capacity(256 + doc.len() * 96);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<w:document xmlns:w="{W_NS}"><w:body>"#));
    for block in doc.blocks() {
        push_paragraph(&mut xml, block);
    }
    xml.push_str(
        r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
    );
    xml.push_str("</w:body></w:document>");
    xml
}

fn push_paragraph(xml: &mut String, block: &Block) {
    let (style, indent, centered, text): (Option<String>, usize, bool, &str) = match block {
        Block::Empty => {
            xml.push_str("<w:p/>");
            return;
        }
        Block::Title { text } => (Some("Title".into()), 0, true, text.as_str()),
        Block::Heading { level, text } => (
            Some(format!("Heading{}", (*level).clamp(1, 4))),
            0,
            false,
            text.as_str(),
        ),
        Block::Bullet { indent_level, text } => {
            (Some("ListBullet".into()), *indent_level, false, text.as_str())
        }
        Block::Numbered { text } => (Some("ListNumber".into()), 0, false, text.as_str()),
        Block::Paragraph { text } => (None, 0, false, text.as_str()),
    };

    xml.push_str("<w:p>");
    if style.is_some() || indent > 0 || centered {
        xml.push_str("<w:pPr>");
        if let Some(style) = style {
            xml.push_str(&format!(r#"<w:pStyle w:val="{style}"/>"#));
        }
        if indent > 0 {
            xml.push_str(&format!(
                r#"<w:ind w:left="{}" w:hanging="360"/>"#,
                indent * INDENT_TWIPS_PER_LEVEL
            ));
        }
        if centered {
            xml.push_str(r#"<w:jc w:val="center"/>"#);
        }
        xml.push_str("</w:pPr>");
    }
    if !text.is_empty() {
        xml.push_str(r#"<w:r><w:t xml:space="preserve">"#);
        xml.push_str(&escape_xml(text));
        xml.push_str("</w:t></w:r>");
    }
    xml.push_str("</w:p>");
}

/// Escape XML special characters and drop characters XML 1.0 forbids.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

// ── Package parts ────────────────────────────────────────────────────────

fn content_types_xml() -> String {
    format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#
    )
}

fn package_rels_xml() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#
    )
}

fn document_rels_xml() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#
    )
}

fn core_props_xml(title: Option<&str>) -> String {
    let title = title.map(escape_xml).unwrap_or_default();
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>edgequake-lessondoc</dc:creator></cp:coreProperties>"#
    )
}

fn heading_style(id: &str, name: &str, size_half_points: u32, outline: u8) -> String {
    format!(
        r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="{outline}"/></w:pPr><w:rPr><w:b/><w:color w:val="1F3864"/><w:sz w:val="{size_half_points}"/></w:rPr></w:style>"#
    )
}

fn styles_xml() -> String {
    let mut xml = format!(
        r#"{XML_DECL}<w:styles xmlns:w="{W_NS}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#
    );
    xml.push_str(
        r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:color w:val="17365D"/><w:sz w:val="52"/></w:rPr></w:style>"#,
    );
    for (level, size) in [(1u8, 32u32), (2, 26), (3, 24), (4, 22)] {
        xml.push_str(&heading_style(
            &format!("Heading{level}"),
            &format!("heading {level}"),
            size,
            level - 1,
        ));
    }
    xml.push_str(
        r#"<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style>"#,
    );
    xml.push_str(
        r#"<w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="2"/></w:numPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style>"#,
    );
    xml.push_str("</w:styles>");
    xml
}

fn numbering_xml() -> String {
    format!(
        r#"{XML_DECL}<w:numbering xmlns:w="{W_NS}"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num><w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num></w:numbering>"#
    )
}
