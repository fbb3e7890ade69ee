use crate::datatype::{CellValue, FromCell, ScanTarget};
use crate::{Dimensions, XlsxError};

/// A decoded worksheet and its row cursor
///
/// The cursor starts before the first row, [`Sheet::next_row`] must be
/// called before reading.
///
/// A sheet whose part could not be read to the end still holds the rows
/// decoded before the failure; [`Sheet::error`] tells why it stopped.
#[derive(Debug)]
pub struct Sheet {
    part: String,
    dimensions: Option<Dimensions>,
    rows: Vec<Vec<CellValue>>,
    empty: bool,
    cursor: Option<usize>,
    error: Option<XlsxError>,
    defects: Vec<XlsxError>,
}

impl Sheet {
    pub(crate) fn new(
        part: &str,
        dimensions: Option<Dimensions>,
        empty: bool,
        rows: Vec<Vec<CellValue>>,
        error: Option<XlsxError>,
        defects: Vec<XlsxError>,
    ) -> Self {
        Sheet {
            part: part.to_string(),
            dimensions,
            rows,
            empty,
            cursor: None,
            error,
            defects,
        }
    }

    /// A sheet with no rows whose part could not be opened
    pub(crate) fn failed(part: &str, error: XlsxError) -> Self {
        Sheet::new(part, None, true, Vec::new(), Some(error), Vec::new())
    }

    /// Name of the part the sheet was decoded from
    pub fn part(&self) -> &str {
        &self.part
    }

    /// Moves the cursor to the next row, returns `false` past the last one.
    pub fn next_row(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1).min(self.rows.len());
        self.cursor = Some(next);
        next < self.rows.len()
    }

    /// Cells of the current row
    pub fn row(&self) -> Result<&[CellValue], XlsxError> {
        self.cursor
            .and_then(|c| self.rows.get(c))
            .map(|r| &r[..])
            .ok_or(XlsxError::NoCurrentRow)
    }

    /// Display strings of the current row, "" for empty and merged cells
    pub fn strings(&self) -> Result<Vec<String>, XlsxError> {
        Ok(self
            .row()?
            .iter()
            .map(|c| c.display().to_string())
            .collect())
    }

    /// Copies the leading cells of the current row into `targets`, one per
    /// column.
    ///
    /// Stops at the first cell whose value does not fit its target
    /// ([`XlsxError::TypeMismatch`]); no conversion between types is done.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> Result<(), xlgrid::XlsxError> {
    /// let mut workbook = xlgrid::open_workbook("people.xlsx")?;
    /// let mut sheet = workbook.worksheet("People")?;
    /// while sheet.next_row() {
    ///     let mut name = String::new();
    ///     let mut age: Option<i64> = None;
    ///     sheet.scan(&mut [&mut name, &mut age])?;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn scan(&self, targets: &mut [&mut dyn ScanTarget]) -> Result<(), XlsxError> {
        let row = self.row()?;
        if targets.len() > row.len() {
            return Err(XlsxError::ColumnOutOfRange {
                col: row.len(),
                width: row.len(),
            });
        }
        for (col, (target, cell)) in targets.iter_mut().zip(row).enumerate() {
            target.scan_from(col, cell)?;
        }
        Ok(())
    }

    /// Typed value of column `col` (zero based, relative to the first
    /// column of the sheet) of the current row
    pub fn get<T: FromCell>(&self, col: usize) -> Result<T, XlsxError> {
        let row = self.row()?;
        let cell = row.get(col).ok_or(XlsxError::ColumnOutOfRange {
            col,
            width: row.len(),
        })?;
        T::from_cell(cell).ok_or(XlsxError::TypeMismatch {
            col,
            expected: T::EXPECTED,
            found: cell.kind(),
        })
    }

    /// No cell was written while decoding
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// The error that ended decoding early, if any
    pub fn error(&self) -> Option<&XlsxError> {
        self.error.as_ref()
    }

    /// Cells skipped while decoding, e.g. unknown shared strings
    pub fn defects(&self) -> &[XlsxError] {
        &self.defects
    }

    /// Declared bounds of the sheet, or the extent of its cells when the
    /// sheet declares none
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    /// Number of decoded rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns of every row
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    /// Iterates over all rows, independently of the cursor
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            inner: self.rows.iter(),
        }
    }
}

/// An iterator over the rows of a [`Sheet`]
#[derive(Clone, Debug)]
pub struct Rows<'a> {
    inner: std::slice::Iter<'a, Vec<CellValue>>,
}

impl<'a> Iterator for Rows<'a> {
    type Item = &'a [CellValue];
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|r| &r[..])
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Rows<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|r| &r[..])
    }
}

impl ExactSizeIterator for Rows<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{Data, MergeMarker};
    use chrono::{NaiveDate, NaiveDateTime};

    fn value(data: Data, display: &str) -> CellValue {
        CellValue::new(data, display.to_string())
    }

    fn sheet() -> Sheet {
        let dt = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rows = vec![
            vec![
                value(Data::String("a".to_string()), "a"),
                value(Data::Int(1), "1"),
                value(Data::Float(0.25), "25%"),
                value(Data::Bool(true), "1"),
                value(Data::DateTime(dt), "2024-02-29"),
            ],
            vec![
                CellValue::Merged(MergeMarker::EndsRow),
                CellValue::Empty,
                value(Data::Float(2.5), "2.5"),
                CellValue::Empty,
                CellValue::Empty,
            ],
        ];
        Sheet::new(
            "xl/worksheets/sheet1.xml",
            Some(Dimensions::new((0, 0), (1, 4))),
            false,
            rows,
            None,
            Vec::new(),
        )
    }

    #[test]
    fn cursor_must_advance_first() {
        let mut sheet = sheet();
        assert!(matches!(sheet.strings(), Err(XlsxError::NoCurrentRow)));
        assert!(sheet.next_row());
        assert!(sheet.next_row());
        assert!(!sheet.next_row());
        assert!(!sheet.next_row());
        assert!(matches!(sheet.strings(), Err(XlsxError::NoCurrentRow)));
    }

    #[test]
    fn strings_of_each_row() {
        let mut sheet = sheet();
        sheet.next_row();
        assert_eq!(sheet.strings().unwrap(), vec!["a", "1", "25%", "1", "2024-02-29"]);
        sheet.next_row();
        assert_eq!(sheet.strings().unwrap(), vec!["", "", "2.5", "", ""]);
    }

    #[test]
    fn scan_typed_values() {
        let mut sheet = sheet();
        sheet.next_row();
        let mut s = String::new();
        let mut i = 0i64;
        let mut f = 0f64;
        let mut b = false;
        let mut dt = NaiveDateTime::default();
        sheet
            .scan(&mut [&mut s, &mut i, &mut f, &mut b, &mut dt])
            .unwrap();
        assert_eq!((s.as_str(), i, f, b), ("a", 1, 0.25, true));
        assert_eq!(dt.to_string(), "2024-02-29 00:00:00");

        sheet.next_row();
        let mut anchor = CellValue::Empty;
        let mut missing: Option<i64> = Some(7);
        sheet.scan(&mut [&mut anchor, &mut missing]).unwrap();
        assert_eq!(anchor, CellValue::Merged(MergeMarker::EndsRow));
        assert_eq!(missing, None);
    }

    #[test]
    fn scan_does_not_coerce() {
        let mut sheet = sheet();
        sheet.next_row();
        let mut s = String::new();
        let mut f = 0f64;
        let err = sheet.scan(&mut [&mut s, &mut f]).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::TypeMismatch {
                col: 1,
                expected: "float",
                found: "int"
            }
        ));

        let mut many: Vec<String> = vec![String::new(); 6];
        let mut targets: Vec<&mut dyn ScanTarget> =
            many.iter_mut().map(|s| s as &mut dyn ScanTarget).collect();
        assert!(matches!(
            sheet.scan(&mut targets),
            Err(XlsxError::ColumnOutOfRange { width: 5, .. })
        ));
    }

    #[test]
    fn get_by_column() {
        let mut sheet = sheet();
        sheet.next_row();
        assert_eq!(sheet.get::<i64>(1).unwrap(), 1);
        assert_eq!(sheet.get::<Data>(2).unwrap(), Data::Float(0.25));
        assert!(sheet.get::<bool>(0).is_err());
        assert!(matches!(
            sheet.get::<bool>(9),
            Err(XlsxError::ColumnOutOfRange { col: 9, width: 5 })
        ));
    }

    #[test]
    fn rows_iterator() {
        let sheet = sheet();
        assert_eq!(sheet.rows().len(), 2);
        assert!(sheet.rows().all(|r| r.len() == sheet.width()));
        assert_eq!(sheet.rows().next_back().unwrap()[2].display(), "2.5");
        assert_eq!(sheet.height(), 2);
        assert_eq!(sheet.part(), "xl/worksheets/sheet1.xml");
    }
}
