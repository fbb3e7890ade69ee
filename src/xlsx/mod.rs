mod decoder;
mod grid;
mod materialize;
mod relationships;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Seek};

use log::{debug, warn};
use quick_xml::{
    events::{attributes::Attribute, BytesStart, Event},
    name::QName,
    Reader as XmlReader,
};
use zip::read::{ZipArchive, ZipFile};
use zip::result::ZipError;

use crate::formats::{builtin_format_by_id, detect_custom_number_format, CellFormat, FormatContext};
use crate::sheet::Sheet;
use crate::utils::unescape_entity_to_buffer;

pub use decoder::SheetDecoder;
pub use materialize::CellType;
pub use relationships::{relationships_part_name, Relationships};

/// Markup token stream over one part of the archive
pub type XlReader<'a, RS> = XmlReader<BufReader<ZipFile<'a, RS>>>;

/// Maximum number of rows allowed in an xlsx file
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns allowed in an xlsx file
pub const MAX_COLUMNS: u32 = 16_384;

/// An enum for Xlsx specific errors
#[derive(Debug)]
pub enum XlsxError {
    /// Io error
    Io(std::io::Error),
    /// Zip error
    Zip(zip::result::ZipError),
    /// Xml error
    Xml(quick_xml::Error),
    /// Xml attribute error
    XmlAttr(quick_xml::events::attributes::AttrError),
    /// XML Encoding error
    Encoding(quick_xml::encoding::EncodingError),
    /// Unexpected end of xml
    XmlEof(&'static str),
    /// File not found
    FileNotFound(String),
    /// Relationship not found
    RelationshipNotFound(String),
    /// Worksheet not found
    WorksheetNotFound(String),
    /// Shared string index is not a number or not in the table
    SharedString(String),
    /// Cell 't' attribute error
    CellTAttribute(String),
    /// Scanned value does not have the requested type
    TypeMismatch {
        /// column of the offending cell
        col: usize,
        /// requested type
        expected: &'static str,
        /// actual content
        found: &'static str,
    },
    /// More scan targets than columns
    ColumnOutOfRange {
        /// requested column
        col: usize,
        /// row width
        width: usize,
    },
    /// The row cursor is not on a row, `next_row` must be called first
    NoCurrentRow,
}

from_err!(std::io::Error, XlsxError, Io);
from_err!(zip::result::ZipError, XlsxError, Zip);
from_err!(quick_xml::Error, XlsxError, Xml);
from_err!(quick_xml::encoding::EncodingError, XlsxError, Encoding);
from_err!(
    quick_xml::events::attributes::AttrError,
    XlsxError,
    XmlAttr
);

impl std::fmt::Display for XlsxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XlsxError::Io(e) => write!(f, "I/O error: {e}"),
            XlsxError::Zip(e) => write!(f, "Zip error: {e}"),
            XlsxError::Xml(e) => write!(f, "Xml error: {e}"),
            XlsxError::XmlAttr(e) => write!(f, "Xml attribute error: {e}"),
            XlsxError::Encoding(e) => write!(f, "XML encoding error: {e}"),
            XlsxError::XmlEof(e) => write!(f, "Unexpected end of xml, expecting '</{e}>'"),
            XlsxError::FileNotFound(e) => write!(f, "File not found '{e}'"),
            XlsxError::RelationshipNotFound(id) => write!(f, "Relationship '{id}' not found"),
            XlsxError::WorksheetNotFound(n) => write!(f, "Worksheet '{n}' not found"),
            XlsxError::SharedString(idx) => {
                write!(f, "Cell string index '{idx}' not found in shared strings table")
            }
            XlsxError::CellTAttribute(e) => write!(f, "Unknown cell 't' attribute: {e:?}"),
            XlsxError::TypeMismatch {
                col,
                expected,
                found,
            } => write!(f, "Cannot scan {found} cell in column {col} as {expected}"),
            XlsxError::ColumnOutOfRange { col, width } => {
                write!(f, "Column {col} is out of range, row has {width} columns")
            }
            XlsxError::NoCurrentRow => write!(f, "No current row, call `next_row` first"),
        }
    }
}

impl std::error::Error for XlsxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XlsxError::Io(e) => Some(e),
            XlsxError::Zip(e) => Some(e),
            XlsxError::Xml(e) => Some(e),
            XlsxError::XmlAttr(e) => Some(e),
            XlsxError::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

/// Xlsx reader options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XlsxOptions {
    /// Rows kept per sheet, larger declared dimensions are truncated
    pub max_rows: u32,
    /// Columns kept per sheet, larger declared dimensions are truncated
    pub max_columns: u32,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        XlsxOptions {
            max_rows: MAX_ROWS,
            max_columns: MAX_COLUMNS,
        }
    }
}

/// A struct representing xml zipped excel file
/// Xlsx, Xlsm, Xlam
pub struct Xlsx<RS> {
    zip: ZipArchive<RS>,
    /// Shared strings
    strings: Vec<String>,
    /// Sheets: name, part path
    sheets: Vec<(String, String)>,
    /// Number format of each cell style
    formats: Vec<CellFormat>,
    /// 1904 datetime system
    is_1904: bool,
    /// Reader options
    options: XlsxOptions,
}

impl<RS: Read + Seek> Xlsx<RS> {
    /// Opens the archive and loads the shared strings, styles and sheet list.
    pub fn new(reader: RS) -> Result<Self, XlsxError> {
        let mut xlsx = Xlsx {
            zip: ZipArchive::new(reader)?,
            strings: Vec::new(),
            sheets: Vec::new(),
            formats: Vec::new(),
            is_1904: false,
            options: XlsxOptions::default(),
        };
        xlsx.read_shared_strings()?;
        xlsx.read_styles()?;
        let relationships = xlsx.read_relationships()?;
        xlsx.read_workbook(&relationships)?;
        Ok(xlsx)
    }

    /// Bounds the grid of every sheet decoded from now on.
    pub fn with_limits(&mut self, max_rows: u32, max_columns: u32) -> &mut Self {
        self.options.max_rows = max_rows.clamp(1, MAX_ROWS);
        self.options.max_columns = max_columns.clamp(1, MAX_COLUMNS);
        self
    }

    /// Opens a named part of the archive as a markup token stream.
    ///
    /// Returns `None` when the part does not exist.
    pub fn open_part(&mut self, name: &str) -> Option<Result<XlReader<'_, RS>, XlsxError>> {
        xml_reader(&mut self.zip, name)
    }

    /// Sheet names, in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Shared strings table
    pub fn shared_strings(&self) -> &[String] {
        &self.strings
    }

    /// Number format of each cell style, indexed by the cells' `s` attribute
    pub fn formats(&self) -> &[CellFormat] {
        &self.formats
    }

    /// Settings the number formats are interpreted with
    pub fn format_context(&self) -> FormatContext {
        FormatContext {
            is_1904: self.is_1904,
        }
    }

    /// Decodes the worksheet called `name`.
    ///
    /// Only an unknown name is an error: failures while reading the sheet are
    /// kept in [`Sheet::error`] next to the rows decoded so far.
    pub fn worksheet(&mut self, name: &str) -> Result<Sheet, XlsxError> {
        let path = self
            .sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| XlsxError::WorksheetNotFound(name.into()))?;
        Ok(self.worksheet_part(&path))
    }

    /// Decodes the worksheet stored in part `path`, e.g. `xl/worksheets/sheet1.xml`.
    pub fn worksheet_part(&mut self, path: &str) -> Sheet {
        let links = self.read_sheet_relationships(path);
        let decoder = SheetDecoder::new(&self.strings, &self.formats)
            .with_format_context(FormatContext {
                is_1904: self.is_1904,
            })
            .with_options(self.options)
            .with_relationships(links);
        match xml_reader(&mut self.zip, path) {
            None => Sheet::failed(path, XlsxError::FileNotFound(path.into())),
            Some(Err(e)) => Sheet::failed(path, e),
            Some(Ok(mut xml)) => decoder.decode_xml(path, &mut xml),
        }
    }

    /// Loads the hyperlink targets of a sheet, an absent or broken part gives
    /// an empty map.
    fn read_sheet_relationships(&mut self, path: &str) -> Relationships {
        let rels = relationships_part_name(path);
        let mut links = Relationships::default();
        match xml_reader(&mut self.zip, &rels) {
            None => debug!("no relationships part '{rels}'"),
            Some(Err(e)) => warn!("cannot open relationships part '{rels}': {e}"),
            Some(Ok(mut xml)) => {
                if let Err(e) = links.read_hyperlinks(&mut xml) {
                    warn!("cannot read relationships part '{rels}': {e}");
                }
            }
        }
        links
    }

    fn read_shared_strings(&mut self) -> Result<(), XlsxError> {
        let mut xml = match xml_reader(&mut self.zip, "xl/sharedStrings.xml") {
            None => return Ok(()),
            Some(x) => x?,
        };
        let mut buf = Vec::with_capacity(1024);
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"si" => {
                    let s = read_string(&mut xml, e.name())?;
                    self.strings.push(s.unwrap_or_default());
                }
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sst" => break,
                Ok(Event::Eof) => return Err(XlsxError::XmlEof("sst")),
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => (),
            }
        }
        Ok(())
    }

    fn read_styles(&mut self) -> Result<(), XlsxError> {
        let mut xml = match xml_reader(&mut self.zip, "xl/styles.xml") {
            None => return Ok(()),
            Some(x) => x?,
        };

        let mut number_formats = BTreeMap::new();
        let mut buf = Vec::with_capacity(1024);
        let mut inner_buf = Vec::with_capacity(1024);
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"numFmts" => loop {
                    inner_buf.clear();
                    match xml.read_event_into(&mut inner_buf) {
                        Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"numFmt" => {
                            let mut id = None;
                            let mut format = String::new();
                            for a in e.attributes() {
                                let a = a.map_err(XlsxError::XmlAttr)?;
                                match a.key {
                                    QName(b"numFmtId") => {
                                        id = atoi_simd::parse::<u32>(&a.value).ok()
                                    }
                                    QName(b"formatCode") => {
                                        format =
                                            a.decode_and_unescape_value(xml.decoder())?.into_owned()
                                    }
                                    _ => (),
                                }
                            }
                            if let Some(id) = id {
                                number_formats.insert(id, detect_custom_number_format(&format));
                            }
                        }
                        Ok(Event::End(ref e)) if e.local_name().as_ref() == b"numFmts" => break,
                        Ok(Event::Eof) => return Err(XlsxError::XmlEof("numFmts")),
                        Err(e) => return Err(XlsxError::Xml(e)),
                        _ => (),
                    }
                },
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"cellXfs" => loop {
                    inner_buf.clear();
                    match xml.read_event_into(&mut inner_buf) {
                        Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"xf" => {
                            let id = get_attribute(e, QName(b"numFmtId"))?
                                .and_then(|v| atoi_simd::parse::<u32>(v).ok())
                                .unwrap_or(0);
                            let format = match number_formats.get(&id) {
                                Some(format) => *format,
                                None => builtin_format_by_id(id),
                            };
                            self.formats.push(format);
                        }
                        Ok(Event::End(ref e)) if e.local_name().as_ref() == b"cellXfs" => break,
                        Ok(Event::Eof) => return Err(XlsxError::XmlEof("cellXfs")),
                        Err(e) => return Err(XlsxError::Xml(e)),
                        _ => (),
                    }
                },
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"styleSheet" => break,
                Ok(Event::Eof) => return Err(XlsxError::XmlEof("styleSheet")),
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => (),
            }
        }
        Ok(())
    }

    fn read_relationships(&mut self) -> Result<BTreeMap<Vec<u8>, String>, XlsxError> {
        let mut xml = match xml_reader(&mut self.zip, "xl/_rels/workbook.xml.rels") {
            None => {
                return Err(XlsxError::FileNotFound(
                    "xl/_rels/workbook.xml.rels".to_string(),
                ));
            }
            Some(x) => x?,
        };
        let mut relationships = BTreeMap::new();
        let mut buf = Vec::with_capacity(64);
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"Relationship" => {
                    let mut id = Vec::new();
                    let mut target = String::new();
                    for a in e.attributes() {
                        match a.map_err(XlsxError::XmlAttr)? {
                            Attribute {
                                key: QName(b"Id"),
                                value: v,
                            } => id.extend_from_slice(&v),
                            a @ Attribute {
                                key: QName(b"Target"),
                                ..
                            } => target = a.decode_and_unescape_value(xml.decoder())?.into_owned(),
                            _ => (),
                        }
                    }
                    relationships.insert(id, target);
                }
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"Relationships" => break,
                Ok(Event::Eof) => return Err(XlsxError::XmlEof("Relationships")),
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => (),
            }
        }
        Ok(relationships)
    }

    fn read_workbook(
        &mut self,
        relationships: &BTreeMap<Vec<u8>, String>,
    ) -> Result<(), XlsxError> {
        let mut xml = match xml_reader(&mut self.zip, "xl/workbook.xml") {
            None => return Ok(()),
            Some(x) => x?,
        };
        let mut buf = Vec::with_capacity(1024);
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sheet" => {
                    let mut name = String::new();
                    let mut path = String::new();
                    for a in e.attributes() {
                        let a = a.map_err(XlsxError::XmlAttr)?;
                        match a.key {
                            QName(b"name") => {
                                name = a.decode_and_unescape_value(xml.decoder())?.to_string();
                            }
                            QName(b"r:id") | QName(b"relationships:id") => {
                                let r = &relationships.get(&*a.value).ok_or_else(|| {
                                    XlsxError::RelationshipNotFound(
                                        String::from_utf8_lossy(&a.value).into_owned(),
                                    )
                                })?[..];
                                // target may have pre-prended "/xl/" or "xl/" path;
                                // strip if present
                                path = if let Some(r) = r.strip_prefix('/') {
                                    r.to_string()
                                } else if r.starts_with("xl/") {
                                    r.to_string()
                                } else {
                                    format!("xl/{r}")
                                };
                            }
                            _ => (),
                        }
                    }
                    self.sheets.push((name, path));
                }
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"workbookPr" => {
                    self.is_1904 = match get_attribute(e, QName(b"date1904"))? {
                        Some(c) => matches!(c, b"1" | b"true"),
                        None => false,
                    };
                }
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"workbook" => break,
                Ok(Event::Eof) => return Err(XlsxError::XmlEof("workbook")),
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => (),
            }
        }
        Ok(())
    }
}

/// Applies the reader settings every part is parsed with
pub(crate) fn configure<R>(r: &mut XmlReader<R>) {
    let config = r.config_mut();
    config.check_end_names = false;
    config.trim_text(false);
    config.check_comments = false;
    config.expand_empty_elements = true;
}

fn xml_reader<'a, RS: Read + Seek>(
    zip: &'a mut ZipArchive<RS>,
    path: &str,
) -> Option<Result<XlReader<'a, RS>, XlsxError>> {
    let actual_path = zip
        .file_names()
        .find(|n| n.eq_ignore_ascii_case(path))?
        .to_owned();
    match zip.by_name(&actual_path) {
        Ok(f) => {
            let mut r = XmlReader::from_reader(BufReader::new(f));
            configure(&mut r);
            Some(Ok(r))
        }
        Err(ZipError::FileNotFound) => None,
        Err(e) => Some(Err(e.into())),
    }
}

/// search through an Element's attributes for the named one
pub(crate) fn get_attribute<'a>(
    e: &'a BytesStart<'_>,
    n: QName,
) -> Result<Option<&'a [u8]>, XlsxError> {
    for a in e.attributes() {
        match a {
            Ok(Attribute {
                key,
                value: Cow::Borrowed(value),
            }) if key == n => return Ok(Some(value)),
            Err(e) => return Err(XlsxError::XmlAttr(e)),
            _ => {} // ignore other attributes
        }
    }
    Ok(None)
}

/// attempts to read either a simple or richtext string
pub(crate) fn read_string<R: BufRead>(
    xml: &mut XmlReader<R>,
    closing: QName,
) -> Result<Option<String>, XlsxError> {
    let mut buf = Vec::with_capacity(1024);
    let mut val_buf = Vec::with_capacity(1024);
    let mut rich_buffer: Option<String> = None;
    let mut is_phonetic_text = false;
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"r" => {
                if rich_buffer.is_none() {
                    // use a buffer since richtext has multiples <r> and <t> for the same cell
                    rich_buffer = Some(String::new());
                }
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"rPh" => {
                is_phonetic_text = true;
            }
            Ok(Event::End(ref e)) if e.name() == closing => {
                return Ok(rich_buffer);
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"rPh" => {
                is_phonetic_text = false;
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"t" && !is_phonetic_text => {
                val_buf.clear();
                let mut value = String::new();
                loop {
                    match xml.read_event_into(&mut val_buf)? {
                        Event::Text(t) => value.push_str(&t.xml10_content()?),
                        Event::GeneralRef(e) => unescape_entity_to_buffer(&e, &mut value)?,
                        Event::End(end) if end.name() == e.name() => break,
                        Event::Eof => return Err(XlsxError::XmlEof("t")),
                        _ => (),
                    }
                }
                if let Some(ref mut s) = rich_buffer {
                    s.push_str(&value);
                } else {
                    // consume any remaining events up to expected closing tag
                    xml.read_to_end_into(closing, &mut val_buf)?;
                    return Ok(Some(value));
                }
            }
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive(parts: &[(&str, &str)]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut zip_writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in parts {
            zip_writer.start_file(*name, options).unwrap();
            zip_writer.write_all(data.as_bytes()).unwrap();
        }
        let cursor = zip_writer.finish().unwrap();
        ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap()
    }

    fn xlsx(parts: &[(&str, &str)]) -> Xlsx<Cursor<Vec<u8>>> {
        Xlsx {
            zip: archive(parts),
            strings: vec![],
            sheets: vec![],
            formats: vec![],
            is_1904: false,
            options: XlsxOptions::default(),
        }
    }

    #[test]
    fn test_read_shared_strings_with_namespaced_si_name() {
        let shared_strings_data = r#"<?xml version="1.0" encoding="utf-8"?>
<x:sst count="1187" uniqueCount="1187" xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <x:si>
        <x:t>String 1</x:t>
    </x:si>
    <x:si>
        <x:r>
            <x:rPr>
                <x:sz val="11"/>
            </x:rPr>
            <x:t>String 2</x:t>
        </x:r>
    </x:si>
    <x:si>
        <x:r>
            <x:t>String 3</x:t>
        </x:r>
    </x:si>
</x:sst>"#;

        let mut xlsx = xlsx(&[("xl/sharedStrings.xml", shared_strings_data)]);
        assert!(xlsx.read_shared_strings().is_ok());
        assert_eq!(3, xlsx.strings.len());
        assert_eq!("String 1", &xlsx.strings[0]);
        assert_eq!("String 2", &xlsx.strings[1]);
        assert_eq!("String 3", &xlsx.strings[2]);
    }

    #[test]
    fn test_shared_strings_entities_and_phonetic_runs() {
        let data = r#"<sst>
<si><t>Fish &amp; Chips</t></si>
<si><r><t>漢</t></r><r><t>字</t></r><rPh sb="0" eb="1"><t>かんじ</t></rPh></si>
<si><t/></si>
</sst>"#;
        let mut xlsx = xlsx(&[("xl/sharedStrings.xml", data)]);
        xlsx.read_shared_strings().unwrap();
        assert_eq!(xlsx.strings, vec!["Fish & Chips", "漢字", ""]);
    }

    #[test]
    fn test_read_styles() {
        let styles = r##"<styleSheet>
<numFmts count="2">
  <numFmt numFmtId="164" formatCode="yyyy-mm-dd"/>
  <numFmt numFmtId="165" formatCode="#,##0.000"/>
</numFmts>
<cellXfs count="4">
  <xf numFmtId="0" fontId="0"/>
  <xf numFmtId="164" fontId="0" applyNumberFormat="1"/>
  <xf numFmtId="165" fontId="0" applyNumberFormat="1"/>
  <xf numFmtId="10" fontId="0" applyNumberFormat="1"><alignment wrapText="1"/></xf>
</cellXfs>
</styleSheet>"##;
        let mut xlsx = xlsx(&[("xl/styles.xml", styles)]);
        xlsx.read_styles().unwrap();
        assert_eq!(
            xlsx.formats,
            vec![
                CellFormat::General,
                CellFormat::Date,
                CellFormat::Number {
                    decimals: 3,
                    thousands: true
                },
                CellFormat::Percent { decimals: 2 },
            ]
        );
    }

    #[test]
    fn test_read_workbook() {
        let rels = r#"<Relationships>
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>
</Relationships>"#;
        let workbook = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<workbookPr date1904="1"/>
<sheets>
  <sheet name="Data &amp; More" sheetId="1" r:id="rId1"/>
  <sheet name="Second" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#;
        let mut xlsx = xlsx(&[
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/workbook.xml", workbook),
        ]);
        let relationships = xlsx.read_relationships().unwrap();
        xlsx.read_workbook(&relationships).unwrap();
        assert!(xlsx.is_1904);
        assert_eq!(
            xlsx.sheets,
            vec![
                ("Data & More".to_string(), "xl/worksheets/sheet1.xml".to_string()),
                ("Second".to_string(), "xl/worksheets/sheet2.xml".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_part() {
        let mut xlsx = xlsx(&[("xl/workbook.xml", "<workbook/>")]);
        assert!(xlsx.open_part("xl/worksheets/sheet9.xml").is_none());
        assert!(xlsx.open_part("XL/Workbook.xml").is_some());

        let sheet = xlsx.worksheet_part("xl/worksheets/sheet9.xml");
        assert!(matches!(sheet.error(), Some(XlsxError::FileNotFound(_))));
        assert_eq!(sheet.height(), 0);
    }

    #[test]
    fn test_unknown_worksheet_name() {
        let mut xlsx = xlsx(&[]);
        assert!(matches!(
            xlsx.worksheet("nope"),
            Err(XlsxError::WorksheetNotFound(n)) if n == "nope"
        ));
    }
}
