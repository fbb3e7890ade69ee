use log::warn;

use super::XlsxOptions;
use crate::datatype::{CellValue, Data, MergeMarker};
use crate::Dimensions;

/// Rectangular cell storage of a sheet being decoded
///
/// Positions are absolute `(row, col)`; storage is relative to the start of
/// the declared dimension. Without a declaration the grid starts at `A1` and
/// widens as cells arrive, up to the configured limits.
#[derive(Debug)]
pub(crate) struct Grid {
    declared: Option<Dimensions>,
    limits: XlsxOptions,
    rows: Vec<Vec<CellValue>>,
    width: usize,
    empty: bool,
}

impl Grid {
    pub fn new(limits: XlsxOptions) -> Self {
        Grid {
            declared: None,
            limits,
            rows: Vec::new(),
            width: 0,
            empty: true,
        }
    }

    /// Sets the bounds, truncated to the limits. Cells placed before the
    /// declaration are moved to the new origin.
    pub fn declare(&mut self, dimensions: Dimensions) {
        let mut dims = dimensions;
        let max_end = (
            dims.start.0.saturating_add(self.limits.max_rows.saturating_sub(1)),
            dims.start.1.saturating_add(self.limits.max_columns.saturating_sub(1)),
        );
        if dims.end.0 > max_end.0 || dims.end.1 > max_end.1 {
            warn!(
                "dimension {:?} exceeds the limit of {} rows and {} columns, truncating",
                dimensions, self.limits.max_rows, self.limits.max_columns
            );
            dims.end = (dims.end.0.min(max_end.0), dims.end.1.min(max_end.1));
        }

        let previous = self.declared.replace(dims);
        let origin = previous.map_or((0, 0), |d| d.start);
        let old = std::mem::take(&mut self.rows);
        self.width = dims.width();
        self.empty = true;
        for (r, row) in old.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                if !cell.is_empty() {
                    self.place(origin.0 + r as u32, origin.1 + c as u32, cell);
                }
            }
        }
    }

    /// Collapses the sheet to an empty `A1`
    pub fn declare_empty(&mut self) {
        self.declared = Some(Dimensions::new((0, 0), (0, 0)));
        self.rows.clear();
        self.width = 1;
        self.empty = true;
    }

    /// Writes `value` at `(row, col)`, outside of the bounds it is dropped.
    pub fn place(&mut self, row: u32, col: u32, value: CellValue) {
        let (r, c) = match self.declared {
            Some(dims) => {
                if !dims.contains(row, col) {
                    return;
                }
                ((row - dims.start.0) as usize, (col - dims.start.1) as usize)
            }
            None => {
                if row >= self.limits.max_rows || col >= self.limits.max_columns {
                    return;
                }
                let c = col as usize;
                if c >= self.width {
                    self.width = c + 1;
                    for r in &mut self.rows {
                        r.resize(self.width, CellValue::Empty);
                    }
                }
                (row as usize, c)
            }
        };
        if r >= self.rows.len() {
            self.rows.resize(r + 1, vec![CellValue::Empty; self.width]);
        }
        self.rows[r][c] = value;
        self.empty = false;
    }

    /// Cell at absolute position `(row, col)`
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        let start = self.declared.map_or((0, 0), |d| d.start);
        let r = row.checked_sub(start.0)? as usize;
        let c = col.checked_sub(start.1)? as usize;
        self.rows.get(r)?.get(c)
    }

    /// Marks every cell of the region but its top-left anchor.
    ///
    /// Corners are `(col, row)` as returned by `ref_to_indexes`.
    pub fn merge(&mut self, first: (u32, u32), last: (u32, u32)) {
        let (c0, c1) = (first.0.min(last.0), first.0.max(last.0));
        let (r0, r1) = (first.1.min(last.1), first.1.max(last.1));

        // only visit the cells `place` keeps
        let (lo, hi) = match self.declared {
            Some(d) => (d.start, d.end),
            None => (
                (0, 0),
                (
                    self.limits.max_rows.saturating_sub(1),
                    self.limits.max_columns.saturating_sub(1),
                ),
            ),
        };
        if r0 > hi.0 || c0 > hi.1 {
            return;
        }
        for row in r0.max(lo.0)..=r1.min(hi.0) {
            for col in c0.max(lo.1)..=c1.min(hi.1) {
                if row == r0 && col == c0 {
                    continue;
                }
                let marker = match (col == c0, col == c1, row == r1) {
                    (true, _, true) => MergeMarker::EndsRow,
                    (true, _, false) => MergeMarker::ContinuesDown,
                    (false, true, true) => MergeMarker::EndsRegion,
                    (false, true, false) => MergeMarker::EndsColumn,
                    (false, false, _) => MergeMarker::ContinuesRight,
                };
                self.place(row, col, CellValue::Merged(marker));
            }
        }
    }

    /// Appends `target` to the text of a cell, or writes it alone.
    pub fn attach_hyperlink(&mut self, row: u32, col: u32, target: &str) {
        let text = match self.get(row, col).and_then(|c| c.data()?.get_string()) {
            Some(text) => format!("{text} <{target}>"),
            None => target.to_string(),
        };
        self.place(row, col, CellValue::new(Data::String(text.clone()), text));
    }

    /// Declared bounds, or the extent of the placed cells
    pub fn dimensions(&self) -> Option<Dimensions> {
        match self.declared {
            Some(d) => Some(d),
            None if self.rows.is_empty() => None,
            None => Some(Dimensions::new(
                (0, 0),
                (self.rows.len() as u32 - 1, self.width as u32 - 1),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ref_to_indexes;

    fn text(s: &str) -> CellValue {
        CellValue::new(Data::String(s.to_string()), s.to_string())
    }

    fn declared(start: (u32, u32), end: (u32, u32)) -> Grid {
        let mut grid = Grid::new(XlsxOptions::default());
        grid.declare(Dimensions::new(start, end));
        grid
    }

    #[test]
    fn place_within_bounds() {
        let mut grid = declared((0, 0), (2, 3));
        assert!(grid.is_empty());
        grid.place(1, 2, text("x"));
        assert!(!grid.is_empty());
        let rows = grid.into_rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 4));
        assert_eq!(rows[1][2], text("x"));
    }

    #[test]
    fn out_of_bounds_is_a_no_op() {
        let mut grid = declared((1, 1), (2, 2));
        grid.place(1, 1, text("a"));
        grid.place(3, 1, text("below"));
        grid.place(1, 3, text("right"));
        grid.place(0, 1, text("above"));
        grid.place(1, 0, text("left"));
        assert_eq!(grid.get(1, 1), Some(&text("a")));
        assert_eq!(grid.into_rows(), vec![vec![text("a"), CellValue::Empty]]);
    }

    #[test]
    fn undeclared_grid_widens() {
        let mut grid = Grid::new(XlsxOptions::default());
        grid.place(0, 0, text("a"));
        grid.place(2, 3, text("b"));
        assert_eq!(grid.dimensions(), Some(Dimensions::new((0, 0), (2, 3))));
        let rows = grid.into_rows();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 4));
        assert_eq!(rows[2][3], text("b"));
    }

    #[test]
    fn limits_bound_the_grid() {
        let mut grid = Grid::new(XlsxOptions {
            max_rows: 2,
            max_columns: 2,
        });
        grid.place(5, 0, text("dropped"));
        grid.place(0, 5, text("dropped"));
        assert!(grid.is_empty());

        grid.declare(Dimensions::new((0, 0), (99, 99)));
        assert_eq!(grid.dimensions(), Some(Dimensions::new((0, 0), (1, 1))));
    }

    #[test]
    fn late_declaration_moves_cells() {
        let mut grid = Grid::new(XlsxOptions::default());
        grid.place(1, 1, text("kept"));
        grid.place(0, 0, text("outside"));
        grid.declare(Dimensions::new((1, 1), (2, 2)));
        assert_eq!(grid.get(1, 1), Some(&text("kept")));
        assert_eq!(grid.get(0, 0), None);
    }

    #[test]
    fn merge_region_markers() {
        let mut grid = declared((0, 0), (3, 3));
        grid.place(1, 1, text("anchor"));
        let b2 = ref_to_indexes("B2").unwrap();
        let c3 = ref_to_indexes("C3").unwrap();
        grid.merge(b2, c3);

        assert_eq!(grid.get(1, 1), Some(&text("anchor")));
        assert_eq!(
            grid.get(1, 2),
            Some(&CellValue::Merged(MergeMarker::EndsColumn))
        );
        assert_eq!(grid.get(2, 1), Some(&CellValue::Merged(MergeMarker::EndsRow)));
        let corner = grid.get(2, 2).and_then(|c| c.merge_marker()).unwrap();
        assert!(corner.ends_row() && corner.ends_column());
    }

    #[test]
    fn merge_wide_and_tall() {
        let mut grid = declared((0, 0), (2, 2));
        grid.merge((0, 0), (2, 2));
        let markers: Vec<Vec<Option<MergeMarker>>> = grid
            .into_rows()
            .iter()
            .map(|r| r.iter().map(|c| c.merge_marker()).collect())
            .collect();
        use MergeMarker::*;
        assert_eq!(
            markers,
            vec![
                vec![None, Some(ContinuesRight), Some(EndsColumn)],
                vec![Some(ContinuesDown), Some(ContinuesRight), Some(EndsColumn)],
                vec![Some(EndsRow), Some(ContinuesRight), Some(EndsRegion)],
            ]
        );
    }

    #[test]
    fn merge_clipped_and_single_cell() {
        let mut grid = declared((0, 0), (1, 1));
        grid.merge((1, 1), (1, 1));
        assert!(grid.is_empty());

        // A1:A1048576 only touches the declared rows
        grid.merge((0, 0), (0, 1_048_575));
        assert_eq!(
            grid.get(1, 0),
            Some(&CellValue::Merged(MergeMarker::ContinuesDown))
        );
        assert_eq!(grid.into_rows().len(), 2);
    }

    #[test]
    fn hyperlink_composition() {
        let mut grid = declared((0, 0), (0, 2));
        grid.place(0, 0, text("Example"));
        grid.place(0, 2, CellValue::new(Data::Int(3), "3".to_string()));
        grid.attach_hyperlink(0, 0, "http://x");
        grid.attach_hyperlink(0, 1, "http://x");
        grid.attach_hyperlink(0, 2, "http://y");
        assert_eq!(grid.get(0, 0).unwrap().display(), "Example <http://x>");
        assert_eq!(grid.get(0, 1).unwrap().display(), "http://x");
        assert_eq!(grid.get(0, 2).unwrap().display(), "http://y");
    }
}
