//! Decode xlsx worksheets into a typed, rectangular grid
//!
//! **xlgrid** streams one worksheet of an xlsx workbook through
//! [quick-xml](https://docs.rs/quick-xml), materializes every cell into a
//! typed [`Data`] value plus its display string, propagates merged regions
//! and hyperlinks onto the placed cells, and hands back a [`Sheet`] with a
//! row cursor.
//!
//! # Examples
//! ```no_run
//! use xlgrid::{open_workbook, NaiveDateTime};
//!
//! let mut workbook = open_workbook("report.xlsx").expect("Cannot open file");
//! let mut sheet = workbook.worksheet("Sheet1").expect("Cannot find sheet");
//!
//! while sheet.next_row() {
//!     println!("{}", sheet.strings().unwrap().join(" | "));
//! }
//!
//! // typed access: column A holds names, column B dates
//! let mut sheet = workbook.worksheet("Sheet1").unwrap();
//! sheet.next_row(); // header
//! while sheet.next_row() {
//!     let mut name = String::new();
//!     let mut date = NaiveDateTime::default();
//!     sheet.scan(&mut [&mut name, &mut date]).unwrap();
//! }
//!
//! // partial sheets keep their rows, the cause is kept aside
//! if let Some(e) = sheet.error() {
//!     eprintln!("sheet truncated: {e}");
//! }
//! ```
#![deny(missing_docs)]

#[macro_use]
mod utils;

mod address;
mod datatype;
mod formats;
mod sheet;
mod xlsx;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use chrono::NaiveDateTime;

pub use crate::address::{ref_to_indexes, split_range};
pub use crate::datatype::{CellValue, Data, FromCell, MergeMarker, ScanTarget};
pub use crate::formats::{
    builtin_format_by_id, detect_custom_number_format, serial_to_datetime, CellFormat,
    FormatContext,
};
pub use crate::sheet::{Rows, Sheet};
pub use crate::xlsx::{
    relationships_part_name, CellType, Relationships, SheetDecoder, XlReader, Xlsx, XlsxError,
    XlsxOptions, MAX_COLUMNS, MAX_ROWS,
};

/// Declared extent of a worksheet
///
/// Positions are zero based `(row, column)` pairs, both ends inclusive.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Dimensions {
    /// start: (row, col)
    pub start: (u32, u32),
    /// end: (row, col)
    pub end: (u32, u32),
}

impl Dimensions {
    /// create dimensions info with start position and end position
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self { start, end }
    }

    /// check if a position is in it
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start.0 && row <= self.end.0 && col >= self.start.1 && col <= self.end.1
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        (self.end.1 - self.start.1) as usize + 1
    }
}

/// Convenient function to open an xlsx file with a `BufReader<File>`.
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Xlsx<BufReader<File>>, XlsxError> {
    let file = BufReader::new(File::open(path)?);
    Xlsx::new(file)
}
