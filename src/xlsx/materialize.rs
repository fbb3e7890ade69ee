use chrono::{NaiveDate, NaiveDateTime};

use super::XlsxError;
use crate::datatype::Data;
use crate::formats::{CellFormat, FormatContext};

/// Value of the `t` attribute of a cell
///
/// # References
///
/// - ECMA-376 Part 1, Section 18.18.11 (ST_CellType)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellType {
    /// `b`
    Boolean,
    /// `n`, or no attribute at all
    Number,
    /// `s`, the payload indexes the shared strings table
    SharedString,
    /// `inlineStr`
    InlineString,
    /// `str`, cached result of a formula
    FormulaString,
    /// `e`
    Error,
    /// `d`, ISO 8601 date or serial number
    Date,
    /// A cell without payload
    #[default]
    Blank,
    /// Any other tag
    Unrecognized(String),
}

impl CellType {
    /// Reads the `t` attribute value, an empty one means `Number`
    pub fn from_attr(value: &[u8]) -> Self {
        match value {
            b"" | b"n" => CellType::Number,
            b"b" => CellType::Boolean,
            b"s" => CellType::SharedString,
            b"inlineStr" => CellType::InlineString,
            b"str" => CellType::FormulaString,
            b"e" => CellType::Error,
            b"d" => CellType::Date,
            t => CellType::Unrecognized(String::from_utf8_lossy(t).into_owned()),
        }
    }
}

/// Turns the raw payload of a cell into its typed value and display string.
///
/// `Ok(None)` means there is nothing to place.
pub(crate) fn materialize(
    cell_type: &CellType,
    raw: &str,
    format: &CellFormat,
    ctx: &FormatContext,
    strings: &[String],
) -> Result<Option<(Data, String)>, XlsxError> {
    let value = match cell_type {
        CellType::Blank => return Ok(None),
        CellType::Unrecognized(t) => return Err(XlsxError::CellTAttribute(t.clone())),
        CellType::Boolean => (Data::Bool(raw.starts_with('1')), raw.to_string()),
        CellType::Number => number(raw, format, ctx),
        CellType::SharedString => {
            let s = atoi_simd::parse::<usize>(raw.as_bytes())
                .ok()
                .and_then(|idx| strings.get(idx))
                .ok_or_else(|| XlsxError::SharedString(raw.to_string()))?;
            (Data::String(s.clone()), s.clone())
        }
        CellType::InlineString | CellType::FormulaString | CellType::Error => {
            (Data::String(raw.to_string()), raw.to_string())
        }
        CellType::Date => match iso_datetime(raw) {
            Some(dt) => (Data::DateTime(dt), raw.to_string()),
            None => number(raw, format, ctx),
        },
    };
    Ok(Some(value))
}

fn number(raw: &str, format: &CellFormat, ctx: &FormatContext) -> (Data, String) {
    match fast_float2::parse::<f64, _>(raw) {
        Ok(v) => {
            let (display, data) = format.format(ctx, v);
            (data, display)
        }
        Err(_) => (Data::String(raw.to_string()), raw.to_string()),
    }
}

/// `2024-02-29T08:30:00`, `2024-02-29T08:30:00.250Z` or `2024-02-29`
fn iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.strip_suffix('Z').unwrap_or(raw);
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings() -> Vec<String> {
        vec!["alpha".to_string(), "beta".to_string()]
    }

    fn run(cell_type: CellType, raw: &str, format: CellFormat) -> Option<(Data, String)> {
        materialize(&cell_type, raw, &format, &FormatContext::default(), &strings()).unwrap()
    }

    #[rstest]
    #[case(b"", CellType::Number)]
    #[case(b"n", CellType::Number)]
    #[case(b"b", CellType::Boolean)]
    #[case(b"s", CellType::SharedString)]
    #[case(b"inlineStr", CellType::InlineString)]
    #[case(b"str", CellType::FormulaString)]
    #[case(b"e", CellType::Error)]
    #[case(b"d", CellType::Date)]
    #[case(b"x", CellType::Unrecognized("x".to_string()))]
    fn cell_type_attribute(#[case] attr: &[u8], #[case] expected: CellType) {
        assert_eq!(CellType::from_attr(attr), expected);
    }

    #[test]
    fn number_default_format() {
        assert_eq!(
            run(CellType::Number, "42", CellFormat::General),
            Some((Data::Int(42), "42".to_string()))
        );
        assert_eq!(
            run(CellType::Number, "0.5", CellFormat::General),
            Some((Data::Float(0.5), "0.5".to_string()))
        );
        assert_eq!(
            run(CellType::Number, "n/a", CellFormat::General),
            Some((Data::String("n/a".to_string()), "n/a".to_string()))
        );
    }

    #[test]
    fn number_with_date_format() {
        let (data, display) = run(CellType::Number, "45351.5", CellFormat::DateTime).unwrap();
        assert_eq!(display, "2024-02-29 12:00:00");
        assert!(matches!(data, Data::DateTime(_)));
    }

    #[test]
    fn elapsed_time_out_of_range() {
        assert_eq!(
            run(CellType::Number, "1.5", CellFormat::TimeDelta),
            Some((Data::Float(1.5), "36:00:00".to_string()))
        );
        for raw in ["-1e300", "1e300"] {
            let (data, _) = run(CellType::Number, raw, CellFormat::TimeDelta).unwrap();
            assert!(matches!(data, Data::Float(v) if v.abs() >= 1e300));
        }
    }

    #[test]
    fn booleans() {
        assert_eq!(
            run(CellType::Boolean, "1", CellFormat::General),
            Some((Data::Bool(true), "1".to_string()))
        );
        assert_eq!(
            run(CellType::Boolean, "0", CellFormat::General),
            Some((Data::Bool(false), "0".to_string()))
        );
    }

    #[test]
    fn shared_strings() {
        assert_eq!(
            run(CellType::SharedString, "1", CellFormat::General),
            Some((Data::String("beta".to_string()), "beta".to_string()))
        );
        for raw in ["2", "-1", "x", ""] {
            let res = materialize(
                &CellType::SharedString,
                raw,
                &CellFormat::General,
                &FormatContext::default(),
                &strings(),
            );
            assert!(matches!(res, Err(XlsxError::SharedString(s)) if s == raw));
        }
    }

    #[test]
    fn verbatim_strings() {
        for t in [CellType::InlineString, CellType::FormulaString, CellType::Error] {
            assert_eq!(
                run(t, "#DIV/0!", CellFormat::Percent { decimals: 2 }),
                Some((Data::String("#DIV/0!".to_string()), "#DIV/0!".to_string()))
            );
        }
    }

    #[test]
    fn dates() {
        let dt = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(
            run(CellType::Date, "2024-02-29T08:30:00Z", CellFormat::General),
            Some((Data::DateTime(dt), "2024-02-29T08:30:00Z".to_string()))
        );
        let midnight = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            run(CellType::Date, "2024-02-29", CellFormat::General),
            Some((Data::DateTime(midnight), "2024-02-29".to_string()))
        );
        assert_eq!(
            run(CellType::Date, "45351", CellFormat::Date),
            Some((Data::DateTime(midnight), "2024-02-29".to_string()))
        );
        assert_eq!(
            run(CellType::Date, "soon", CellFormat::Date),
            Some((Data::String("soon".to_string()), "soon".to_string()))
        );
    }

    #[test]
    fn blank_and_unknown() {
        assert_eq!(run(CellType::Blank, "1", CellFormat::General), None);
        let res = materialize(
            &CellType::Unrecognized("zz".to_string()),
            "1",
            &CellFormat::General,
            &FormatContext::default(),
            &[],
        );
        assert!(matches!(res, Err(XlsxError::CellTAttribute(t)) if t == "zz"));
    }
}
