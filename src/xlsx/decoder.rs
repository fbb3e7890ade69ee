use std::io::BufRead;
use std::ops::ControlFlow;

use log::{trace, warn};
use quick_xml::{events::Event, name::QName, Reader as XmlReader};

use super::grid::Grid;
use super::materialize::{materialize, CellType};
use super::{configure, get_attribute, Relationships, XlsxError, XlsxOptions};
use crate::address::{ref_to_indexes, split_range};
use crate::datatype::CellValue;
use crate::formats::{CellFormat, FormatContext};
use crate::sheet::Sheet;
use crate::utils::unescape_entity_to_buffer;
use crate::Dimensions;

/// Worksheet markup, reduced to what the grid is built from
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SheetEvent<'a> {
    /// `dimension[ref]`
    Dimension(&'a str),
    /// `row[r]`, one based
    RowStart(Option<u32>),
    /// `c[t,r,s]`
    CellStart {
        cell_type: CellType,
        reference: Option<&'a str>,
        style: Option<usize>,
    },
    /// `v`, or `t` of an inline string
    PayloadStart,
    Text(&'a str),
    PayloadEnd,
    CellEnd,
    /// `mergeCell[ref]`
    MergeCell(&'a str),
    /// `hyperlink[ref,r:id,location]`
    Hyperlink {
        reference: &'a str,
        id: Option<&'a str>,
        location: Option<&'a str>,
    },
}

/// The cell being decoded
#[derive(Debug, Default)]
pub(crate) struct ParseState {
    in_cell: bool,
    in_payload: bool,
    /// Inside `rPh`, whose text is never a payload
    phonetic: bool,
    /// `(col, row)`, `None` for a malformed reference
    position: Option<(u32, u32)>,
    cell_type: CellType,
    format: CellFormat,
    payload: String,
    row: u32,
    next_row: u32,
    next_col: u32,
}

/// Applies [`SheetEvent`]s to a grid
pub(crate) struct SheetBuilder<'a> {
    strings: &'a [String],
    formats: &'a [CellFormat],
    ctx: FormatContext,
    links: Relationships,
    grid: Grid,
    defects: Vec<XlsxError>,
}

impl SheetBuilder<'_> {
    pub fn apply(&mut self, state: &mut ParseState, event: SheetEvent<'_>) -> ControlFlow<()> {
        match event {
            SheetEvent::Dimension("A1") => {
                self.grid.declare_empty();
                return ControlFlow::Break(());
            }
            SheetEvent::Dimension(r) => match parse_dimension(r) {
                Some(dims) => self.grid.declare(dims),
                None => warn!("invalid dimension '{r}', sheet bounds are inferred"),
            },
            SheetEvent::RowStart(r) => {
                state.row = match r {
                    Some(r) if r > 0 => r - 1,
                    _ => state.next_row,
                };
                state.next_row = state.row.saturating_add(1);
                state.next_col = 0;
            }
            SheetEvent::CellStart {
                cell_type,
                reference,
                style,
            } => {
                state.position = match reference {
                    Some(r) => ref_to_indexes(r),
                    None => Some((state.next_col, state.row)),
                };
                state.next_col = match state.position {
                    Some((col, _)) => col.saturating_add(1),
                    None => state.next_col.saturating_add(1),
                };
                state.in_cell = true;
                state.cell_type = cell_type;
                state.format = style
                    .and_then(|s| self.formats.get(s))
                    .or_else(|| self.formats.first())
                    .copied()
                    .unwrap_or_default();
                state.payload.clear();
            }
            SheetEvent::PayloadStart => state.in_payload = state.in_cell,
            SheetEvent::Text(t) => {
                if state.in_payload {
                    state.payload.push_str(t);
                }
            }
            SheetEvent::PayloadEnd => state.in_payload = false,
            SheetEvent::CellEnd => {
                if let Some((col, row)) = state.position.take() {
                    if state.in_cell && !state.payload.is_empty() {
                        self.place(state, row, col);
                    }
                }
                state.in_cell = false;
                state.in_payload = false;
                state.cell_type = CellType::Blank;
                state.payload.clear();
            }
            SheetEvent::MergeCell(r) => {
                if let (first, Some(last)) = split_range(r) {
                    if let (Some(first), Some(last)) = (ref_to_indexes(first), ref_to_indexes(last))
                    {
                        self.grid.merge(first, last);
                    }
                }
            }
            SheetEvent::Hyperlink {
                reference,
                id,
                location,
            } => {
                let (first, _) = split_range(reference);
                if let Some((col, row)) = ref_to_indexes(first) {
                    let target = match (id, location) {
                        (Some(id), _) => self.links.get(id).unwrap_or_default(),
                        (None, Some(location)) => location,
                        (None, None) => "",
                    };
                    self.grid.attach_hyperlink(row, col, target);
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn place(&mut self, state: &ParseState, row: u32, col: u32) {
        match materialize(
            &state.cell_type,
            &state.payload,
            &state.format,
            &self.ctx,
            self.strings,
        ) {
            Ok(Some((data, display))) => self.grid.place(row, col, CellValue::new(data, display)),
            Ok(None) => (),
            Err(e) => {
                warn!("skipping cell at row {row}, column {col}: {e}");
                self.defects.push(e);
            }
        }
    }

    fn into_sheet(self, part: &str, error: Option<XlsxError>) -> Sheet {
        let dimensions = self.grid.dimensions();
        let empty = self.grid.is_empty();
        Sheet::new(
            part,
            dimensions,
            empty,
            self.grid.into_rows(),
            error,
            self.defects,
        )
    }
}

/// `"B2:D5"` or `"D5"`, a lone endpoint spans from `A1`
fn parse_dimension(r: &str) -> Option<Dimensions> {
    match split_range(r) {
        (end, None) => {
            let (col, row) = ref_to_indexes(end)?;
            Some(Dimensions::new((0, 0), (row, col)))
        }
        (start, Some(end)) => {
            let (c0, r0) = ref_to_indexes(start)?;
            let (c1, r1) = ref_to_indexes(end)?;
            Some(Dimensions::new(
                (r0.min(r1), c0.min(c1)),
                (r0.max(r1), c0.max(c1)),
            ))
        }
    }
}

/// Decodes one worksheet part into a [`Sheet`]
///
/// The shared strings and number formats are borrowed for the duration of
/// the decode; the hyperlink targets come from the sheet's relationships
/// part.
///
/// # Examples
///
/// ```
/// use xlgrid::{CellFormat, SheetDecoder};
///
/// let strings = vec!["Name".to_string()];
/// let formats = vec![CellFormat::General];
/// let xml = r#"<worksheet><sheetData>
///     <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>42</v></c></row>
/// </sheetData></worksheet>"#;
///
/// let mut sheet = SheetDecoder::new(&strings, &formats).decode("sheet1.xml", xml.as_bytes());
/// assert!(sheet.next_row());
/// assert_eq!(sheet.strings().unwrap(), vec!["Name", "42"]);
/// ```
pub struct SheetDecoder<'a> {
    strings: &'a [String],
    formats: &'a [CellFormat],
    ctx: FormatContext,
    links: Relationships,
    options: XlsxOptions,
}

impl<'a> SheetDecoder<'a> {
    /// Creates a decoder resolving cells against `strings` and `formats`
    pub fn new(strings: &'a [String], formats: &'a [CellFormat]) -> Self {
        SheetDecoder {
            strings,
            formats,
            ctx: FormatContext::default(),
            links: Relationships::default(),
            options: XlsxOptions::default(),
        }
    }

    /// Sets the date system
    pub fn with_format_context(mut self, ctx: FormatContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Sets the hyperlink targets
    pub fn with_relationships(mut self, links: Relationships) -> Self {
        self.links = links;
        self
    }

    /// Sets the grid limits
    pub fn with_options(mut self, options: XlsxOptions) -> Self {
        self.options = options;
        self
    }

    /// Decodes the worksheet markup read from `reader`.
    ///
    /// A read or markup error ends the decode: the rows placed so far are
    /// kept and the error is available from [`Sheet::error`].
    pub fn decode<R: BufRead>(self, part: &str, reader: R) -> Sheet {
        let mut xml = XmlReader::from_reader(reader);
        configure(&mut xml);
        self.decode_xml(part, &mut xml)
    }

    pub(crate) fn decode_xml<R: BufRead>(self, part: &str, xml: &mut XmlReader<R>) -> Sheet {
        let mut builder = SheetBuilder {
            strings: self.strings,
            formats: self.formats,
            ctx: self.ctx,
            links: self.links,
            grid: Grid::new(self.options),
            defects: Vec::new(),
        };
        let error = read_sheet(&mut builder, xml).err();
        if let Some(e) = &error {
            warn!("worksheet '{part}' truncated: {e}");
        }
        builder.into_sheet(part, error)
    }
}

fn read_sheet<R: BufRead>(
    builder: &mut SheetBuilder<'_>,
    xml: &mut XmlReader<R>,
) -> Result<(), XlsxError> {
    let mut state = ParseState::default();
    let mut buf = Vec::with_capacity(1024);
    let mut entity = String::new();
    loop {
        buf.clear();
        let flow = match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"dimension" => {
                    let Some(r) = get_attribute(e, QName(b"ref"))? else {
                        continue;
                    };
                    let r = xml.decoder().decode(r)?;
                    builder.apply(&mut state, SheetEvent::Dimension(&r))
                }
                b"row" => {
                    let r = get_attribute(e, QName(b"r"))?
                        .and_then(|r| atoi_simd::parse::<u32>(r).ok());
                    builder.apply(&mut state, SheetEvent::RowStart(r))
                }
                b"c" => {
                    let mut cell_type = CellType::Number;
                    let mut reference = None;
                    let mut style = None;
                    for a in e.attributes() {
                        let a = a?;
                        match a.key {
                            QName(b"t") => cell_type = CellType::from_attr(&a.value),
                            QName(b"r") => {
                                reference = Some(xml.decoder().decode(&a.value)?.into_owned())
                            }
                            QName(b"s") => style = atoi_simd::parse::<usize>(&a.value).ok(),
                            _ => (),
                        }
                    }
                    let event = SheetEvent::CellStart {
                        cell_type,
                        reference: reference.as_deref(),
                        style,
                    };
                    builder.apply(&mut state, event)
                }
                b"v" => builder.apply(&mut state, SheetEvent::PayloadStart),
                b"t" if !state.phonetic => builder.apply(&mut state, SheetEvent::PayloadStart),
                b"rPh" => {
                    state.phonetic = true;
                    ControlFlow::Continue(())
                }
                b"mergeCell" => {
                    let Some(r) = get_attribute(e, QName(b"ref"))? else {
                        continue;
                    };
                    let r = xml.decoder().decode(r)?;
                    builder.apply(&mut state, SheetEvent::MergeCell(&r))
                }
                b"hyperlink" => {
                    let mut reference = None;
                    let mut id = None;
                    let mut location = None;
                    for a in e.attributes() {
                        let a = a?;
                        match a.key.local_name().as_ref() {
                            b"ref" => reference = Some(a.decode_and_unescape_value(xml.decoder())?),
                            b"id" => id = Some(a.decode_and_unescape_value(xml.decoder())?),
                            b"location" => {
                                location = Some(a.decode_and_unescape_value(xml.decoder())?)
                            }
                            _ => (),
                        }
                    }
                    match reference {
                        Some(reference) => builder.apply(
                            &mut state,
                            SheetEvent::Hyperlink {
                                reference: &reference,
                                id: id.as_deref(),
                                location: location.as_deref(),
                            },
                        ),
                        None => ControlFlow::Continue(()),
                    }
                }
                b"worksheet" | b"sheetData" | b"mergeCells" | b"hyperlinks" | b"is" | b"r"
                | b"f" => ControlFlow::Continue(()),
                name => {
                    trace!("ignoring element '{}'", String::from_utf8_lossy(name));
                    ControlFlow::Continue(())
                }
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" => builder.apply(&mut state, SheetEvent::PayloadEnd),
                b"t" if !state.phonetic => builder.apply(&mut state, SheetEvent::PayloadEnd),
                b"rPh" => {
                    state.phonetic = false;
                    ControlFlow::Continue(())
                }
                b"c" => builder.apply(&mut state, SheetEvent::CellEnd),
                _ => ControlFlow::Continue(()),
            },
            Event::Text(t) if state.in_payload => {
                let t = t.xml10_content()?;
                builder.apply(&mut state, SheetEvent::Text(&t))
            }
            Event::CData(t) if state.in_payload => {
                let t = t.xml10_content()?;
                builder.apply(&mut state, SheetEvent::Text(&t))
            }
            Event::GeneralRef(e) if state.in_payload => {
                entity.clear();
                unescape_entity_to_buffer(&e, &mut entity)?;
                builder.apply(&mut state, SheetEvent::Text(&entity))
            }
            Event::Eof => return Ok(()),
            _ => ControlFlow::Continue(()),
        };
        if flow.is_break() {
            return Ok(());
        }
    }
}
