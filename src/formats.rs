use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::datatype::Data;

static EXCEL_EPOCH: OnceLock<NaiveDateTime> = OnceLock::new();

/// https://learn.microsoft.com/en-us/office/troubleshoot/excel/1900-and-1904-date-system
const EXCEL_1900_1904_DIFF: f64 = 1462.;

const MS_MULTIPLIER: f64 = 24f64 * 60f64 * 60f64 * 1e+3f64;

/// Integral values above this magnitude are kept as floats.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.;

/// Workbook wide settings a number format needs to interpret a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatContext {
    /// Dates are counted from 1904-01-01 instead of 1900-01-01
    pub is_1904: bool,
}

/// Cell number format kinds
///
/// Each cell style resolves to one of these. Formatting a numeric payload
/// with it yields the display string and, for date and time kinds, a
/// timestamp in place of the raw serial number.
///
/// # References
///
/// - ECMA-376 Part 1, Section 18.8.30 (numFmt)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellFormat {
    /// General format: shortest representation of the number
    #[default]
    General,
    /// Fixed number of decimals, optionally with thousands separators ("#,##0.00")
    Number {
        /// Digits after the decimal point
        decimals: u8,
        /// Group thousands with ','
        thousands: bool,
    },
    /// Percentage ("0.00%")
    Percent {
        /// Digits after the decimal point
        decimals: u8,
    },
    /// Scientific notation ("0.00E+00")
    Scientific {
        /// Digits after the decimal point
        decimals: u8,
    },
    /// Text format ("@"), numbers are shown as with `General`
    Text,
    /// Date only ("yyyy-mm-dd")
    Date,
    /// Time of day only ("h:mm:ss")
    Time,
    /// Date and time ("m/d/yy h:mm")
    DateTime,
    /// Elapsed time ("[h]:mm:ss")
    TimeDelta,
}

impl CellFormat {
    /// Formats `value`, returning the display string and the interpreted value.
    ///
    /// # Examples
    ///
    /// ```
    /// use xlgrid::{CellFormat, Data, FormatContext};
    ///
    /// let ctx = FormatContext::default();
    /// let (display, value) = CellFormat::General.format(&ctx, 42.);
    /// assert_eq!(display, "42");
    /// assert_eq!(value, Data::Int(42));
    /// ```
    pub fn format(&self, ctx: &FormatContext, value: f64) -> (String, Data) {
        match *self {
            CellFormat::General | CellFormat::Text => general(value),
            CellFormat::Number {
                decimals,
                thousands,
            } => (fixed(value, decimals, thousands), number(value)),
            CellFormat::Percent { decimals } => {
                let mut display = fixed(value * 100., decimals, false);
                display.push('%');
                (display, number(value))
            }
            CellFormat::Scientific { decimals } => (scientific(value, decimals), number(value)),
            CellFormat::Date => datetime(ctx, value, "%Y-%m-%d"),
            CellFormat::Time => datetime(ctx, value, "%H:%M:%S"),
            CellFormat::DateTime => datetime(ctx, value, "%Y-%m-%d %H:%M:%S"),
            CellFormat::TimeDelta => match elapsed(value) {
                Some(display) => (display, Data::Float(value)),
                None => general(value),
            },
        }
    }
}

fn number(value: f64) -> Data {
    if value.fract() == 0. && value.abs() < MAX_EXACT_INT {
        Data::Int(value as i64)
    } else {
        Data::Float(value)
    }
}

fn general(value: f64) -> (String, Data) {
    let data = number(value);
    let display = match data {
        Data::Int(i) => i.to_string(),
        _ => value.to_string(),
    };
    (display, data)
}

fn fixed(value: f64, decimals: u8, thousands: bool) -> String {
    let s = format!("{:.*}", decimals as usize, value);
    if !thousands {
        return s;
    }
    let (sign, digits) = match s.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", s.as_str()),
    };
    let (int, frac) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let mut grouped = String::with_capacity(s.len() + int.len() / 3);
    grouped.push_str(sign);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

fn scientific(value: f64, decimals: u8) -> String {
    let s = format!("{:.*e}", decimals as usize, value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}E{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

/// `None` when the number of seconds does not fit an `i64`
fn elapsed(value: f64) -> Option<String> {
    let seconds = value * 86_400.;
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    let total = seconds.round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    Some(format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    ))
}

fn datetime(ctx: &FormatContext, value: f64, pattern: &str) -> (String, Data) {
    match serial_to_datetime(value, ctx.is_1904) {
        Some(dt) => (dt.format(pattern).to_string(), Data::DateTime(dt)),
        None => general(value),
    }
}

/// Converts an Excel date serial number into a timestamp.
///
/// Serials before 1900-03-01 are shifted by one day to account for the
/// non-existent 1900-02-29 of the 1900 date system.
pub fn serial_to_datetime(value: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !value.is_finite() || value < 0. {
        return None;
    }
    let excel_epoch = EXCEL_EPOCH.get_or_init(|| {
        NaiveDate::from_ymd_opt(1899, 12, 30)
            .unwrap_or_default()
            .and_time(NaiveTime::MIN)
    });
    let f = if is_1904 {
        value + EXCEL_1900_1904_DIFF
    } else {
        value
    };
    let f = if f >= 60.0 { f } else { f + 1.0 };
    let ms = f * MS_MULTIPLIER;
    if ms > i64::MAX as f64 {
        return None;
    }
    let excel_duration = Duration::try_milliseconds(ms.round() as i64)?;
    excel_epoch.checked_add_signed(excel_duration)
}

/// Determine cell format from built-in format ID
pub fn builtin_format_by_id(id: u32) -> CellFormat {
    match id {
        // 0, 0.00, #,##0, #,##0.00
        1 => CellFormat::Number {
            decimals: 0,
            thousands: false,
        },
        2 => CellFormat::Number {
            decimals: 2,
            thousands: false,
        },
        3 | 37 | 38 => CellFormat::Number {
            decimals: 0,
            thousands: true,
        },
        4 | 39 | 40 => CellFormat::Number {
            decimals: 2,
            thousands: true,
        },
        9 => CellFormat::Percent { decimals: 0 },
        10 => CellFormat::Percent { decimals: 2 },
        11 => CellFormat::Scientific { decimals: 2 },
        48 => CellFormat::Scientific { decimals: 1 },
        // mm-dd-yy, d-mmm-yy, d-mmm, mmm-yy
        14..=17 => CellFormat::Date,
        // h:mm AM/PM, h:mm:ss AM/PM, h:mm, h:mm:ss, mm:ss, mmss.0
        18..=21 | 45 | 47 => CellFormat::Time,
        // m/d/yy h:mm
        22 => CellFormat::DateTime,
        // [h]:mm:ss
        46 => CellFormat::TimeDelta,
        49 => CellFormat::Text,
        _ => CellFormat::General,
    }
}

/// Check excel number format type from format string
///
/// Only the first section (up to the first unquoted `;`) is considered. An
/// `m` is read as minutes when it follows an hour or precedes a second,
/// and as months otherwise.
pub fn detect_custom_number_format(format: &str) -> CellFormat {
    let mut escaped = false;
    let mut is_quote = false;
    let mut brackets = 0u8;
    let mut prev = ' ';
    let mut hms = false;
    let mut ap = false;
    let mut am_pm = false;
    let mut tokens = Vec::new();
    let mut literal = String::with_capacity(format.len());

    for s in format.chars() {
        match (s, escaped, is_quote, ap, brackets) {
            (_, true, ..) => escaped = false, // if escaped, ignore
            ('_' | '\\', ..) => escaped = true,
            ('"', _, true, _, _) => is_quote = false,
            (_, _, true, _, _) => (),
            ('"', _, _, _, _) => is_quote = true,
            (';', ..) => break, // first format only
            ('[', ..) => brackets = brackets.saturating_add(1),
            (']', .., 1) if hms => return CellFormat::TimeDelta, // if closing
            (']', ..) => brackets = brackets.saturating_sub(1),
            ('a' | 'A', _, _, false, 0) => ap = true,
            ('p' | 'm' | '/' | 'P' | 'M', _, _, true, 0) => am_pm = true,
            ('d' | 'm' | 'h' | 'y' | 's' | 'D' | 'M' | 'H' | 'Y' | 'S', _, _, false, 0) => {
                tokens.push(s.to_ascii_lowercase())
            }
            _ => {
                if hms && s.eq_ignore_ascii_case(&prev) {
                    // ok ...
                } else {
                    hms = prev == '[' && matches!(s, 'm' | 'h' | 's' | 'M' | 'H' | 'S');
                }
                if brackets == 0 {
                    literal.push(s);
                }
            }
        }
        prev = s;
    }

    let mut date = false;
    let mut time = am_pm;
    for (i, t) in tokens.iter().enumerate() {
        match t {
            'd' | 'y' => date = true,
            'h' | 's' => time = true,
            _ => {
                let before = tokens[..i].iter().rev().find(|c| **c != 'm');
                let after = tokens[i..].iter().find(|c| **c != 'm');
                if before == Some(&'h') || after == Some(&'s') {
                    time = true;
                } else {
                    date = true;
                }
            }
        }
    }

    match (date, time) {
        (true, true) => CellFormat::DateTime,
        (true, false) => CellFormat::Date,
        (false, true) => CellFormat::Time,
        (false, false) => detect_numeric_pattern(&literal),
    }
}

/// Classifies the unquoted, unbracketed characters of a non-date format
fn detect_numeric_pattern(pattern: &str) -> CellFormat {
    let pattern = pattern.trim();
    if pattern == "@" {
        return CellFormat::Text;
    }
    let decimals = pattern
        .split_once('.')
        .map(|(_, frac)| {
            frac.chars()
                .take_while(|c| matches!(c, '0' | '#' | '?'))
                .count()
                .min(u8::MAX as usize) as u8
        })
        .unwrap_or(0);
    if pattern.contains("E+") || pattern.contains("E-") || pattern.contains("e+") {
        CellFormat::Scientific { decimals }
    } else if pattern.contains('%') {
        CellFormat::Percent { decimals }
    } else if pattern.contains(['0', '#']) {
        CellFormat::Number {
            decimals,
            thousands: pattern.contains(','),
        }
    } else {
        CellFormat::General
    }
}
