use std::fmt;

use chrono::NaiveDateTime;

use crate::XlsxError;

/// An enum to represent all different data types that can appear as
/// a value in a worksheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Signed integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
    /// Boolean
    Bool(bool),
    /// Date or Time
    DateTime(NaiveDateTime),
}

impl Data {
    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Data::Int(_) => "int",
            Data::Float(_) => "float",
            Data::String(_) => "string",
            Data::Bool(_) => "bool",
            Data::DateTime(_) => "datetime",
        }
    }

    /// Try getting string value
    pub fn get_string(&self) -> Option<&str> {
        if let Data::String(v) = self {
            Some(&**v)
        } else {
            None
        }
    }
}

impl PartialEq<&str> for Data {
    fn eq(&self, other: &&str) -> bool {
        matches!(*self, Data::String(ref s) if s == other)
    }
}

impl PartialEq<f64> for Data {
    fn eq(&self, other: &f64) -> bool {
        matches!(*self, Data::Float(ref s) if *s == *other)
    }
}

impl PartialEq<bool> for Data {
    fn eq(&self, other: &bool) -> bool {
        matches!(*self, Data::Bool(ref s) if *s == *other)
    }
}

impl PartialEq<i64> for Data {
    fn eq(&self, other: &i64) -> bool {
        matches!(*self, Data::Int(ref s) if *s == *other)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Data::Int(ref e) => write!(f, "{e}"),
            Data::Float(ref e) => write!(f, "{e}"),
            Data::String(ref e) => write!(f, "{e}"),
            Data::Bool(ref e) => write!(f, "{e}"),
            Data::DateTime(ref e) => write!(f, "{e}"),
        }
    }
}

/// Marks a cell covered by a merge region anchored elsewhere
///
/// Only the top-left cell of a region holds the value; every other cell of
/// the region holds one of these markers, telling in which direction the
/// region goes on from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMarker {
    /// Interior cell, the region continues to the right
    ContinuesRight,
    /// In the anchor column, the region continues downwards
    ContinuesDown,
    /// Last column of the region
    EndsColumn,
    /// Last row of the region, in the anchor column
    EndsRow,
    /// Bottom-right corner: last row and last column
    EndsRegion,
}

impl MergeMarker {
    /// The region has no more rows below this cell
    pub fn ends_row(&self) -> bool {
        matches!(self, MergeMarker::EndsRow | MergeMarker::EndsRegion)
    }

    /// The region has no more columns right of this cell
    pub fn ends_column(&self) -> bool {
        matches!(self, MergeMarker::EndsColumn | MergeMarker::EndsRegion)
    }
}

/// Content of one grid slot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No data
    #[default]
    Empty,
    /// A typed value and the string it displays as
    Value {
        /// Typed value
        data: Data,
        /// Display string, rendered through the cell's number format
        display: String,
    },
    /// Part of a merge region
    Merged(MergeMarker),
}

impl CellValue {
    /// Builds a value slot
    pub fn new(data: Data, display: String) -> Self {
        CellValue::Value { data, display }
    }

    /// True for slots that never received a value
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The typed value, if any
    pub fn data(&self) -> Option<&Data> {
        match self {
            CellValue::Value { data, .. } => Some(data),
            _ => None,
        }
    }

    /// The display string; empty and merged cells display as ""
    pub fn display(&self) -> &str {
        match self {
            CellValue::Value { display, .. } => display,
            _ => "",
        }
    }

    /// The merge marker, if any
    pub fn merge_marker(&self) -> Option<MergeMarker> {
        match self {
            CellValue::Merged(m) => Some(*m),
            _ => None,
        }
    }

    /// Short name of the slot content, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Value { data, .. } => data.kind(),
            CellValue::Merged(_) => "merged",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Types a cell can be scanned into
///
/// No coercion happens: an integer cell does not scan into `f64`, an empty
/// cell only scans into `Option<T>` or `CellValue`.
pub trait FromCell: Sized {
    /// Name of the expected kind, used in mismatch errors
    const EXPECTED: &'static str;

    /// Extracts the value, `None` on type mismatch
    fn from_cell(cell: &CellValue) -> Option<Self>;
}

impl FromCell for bool {
    const EXPECTED: &'static str = "bool";
    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell.data()? {
            Data::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromCell for i64 {
    const EXPECTED: &'static str = "int";
    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell.data()? {
            Data::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromCell for f64 {
    const EXPECTED: &'static str = "float";
    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell.data()? {
            Data::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromCell for String {
    const EXPECTED: &'static str = "string";
    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell.data()? {
            Data::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromCell for NaiveDateTime {
    const EXPECTED: &'static str = "datetime";
    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell.data()? {
            Data::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl FromCell for Data {
    const EXPECTED: &'static str = "value";
    fn from_cell(cell: &CellValue) -> Option<Self> {
        cell.data().cloned()
    }
}

impl FromCell for CellValue {
    const EXPECTED: &'static str = "any";
    fn from_cell(cell: &CellValue) -> Option<Self> {
        Some(cell.clone())
    }
}

impl<T: FromCell> FromCell for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;
    fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Empty | CellValue::Merged(_) => Some(None),
            _ => T::from_cell(cell).map(Some),
        }
    }
}

/// A destination for [`Sheet::scan`](crate::Sheet::scan)
pub trait ScanTarget {
    /// Overwrites `self` with the value of `cell`, found in column `col`
    fn scan_from(&mut self, col: usize, cell: &CellValue) -> Result<(), XlsxError>;
}

impl<T: FromCell> ScanTarget for T {
    fn scan_from(&mut self, col: usize, cell: &CellValue) -> Result<(), XlsxError> {
        *self = T::from_cell(cell).ok_or(XlsxError::TypeMismatch {
            col,
            expected: T::EXPECTED,
            found: cell.kind(),
        })?;
        Ok(())
    }
}
