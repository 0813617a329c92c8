//! Positional column layout shared with the backend and the row codec.
//!
//! The order `[userId, x, y, online, notification, color]` is a wire contract
//! with every stored table; changing it needs a data migration.

use roster_types::{Color, PlayerRecord};

use crate::backend::CellValue;

pub const HEADER_ROW: usize = 1;
pub const FIRST_DATA_ROW: usize = 2;

pub const USER_ID_COL: usize = 1;
pub const X_COL: usize = 2;
pub const Y_COL: usize = 3;
pub const ONLINE_COL: usize = 4;
pub const NOTIFICATION_COL: usize = 5;
pub const COLOR_COL: usize = 6;
pub const COLUMN_COUNT: usize = 6;

pub const HEADERS: [&str; COLUMN_COUNT] = ["userId", "x", "y", "online", "notification", "color"];

/// Largest magnitude an integer field may have. Cells hold numbers as `f64`,
/// which is exact only up to 2^53.
pub const MAX_EXACT_INTEGER: i64 = 1 << 53;

static EMPTY_CELL: CellValue = CellValue::Empty;

pub fn header_row() -> Vec<CellValue> {
    HEADERS.iter().map(|&h| CellValue::from(h)).collect()
}

/// Renders a record into the raw row written by a single `set_rows` call.
pub fn encode_row(record: &PlayerRecord) -> Vec<CellValue> {
    vec![
        CellValue::from(record.user_id),
        CellValue::from(record.x),
        CellValue::from(record.y),
        CellValue::from(if record.online { 1_i64 } else { 0 }),
        CellValue::from(record.notification),
        CellValue::from(record.color.as_str()),
    ]
}

/// Same as [`encode_row`], but writes `color` back exactly as it was read
/// instead of re-rendering the record's token.
pub fn encode_row_with_color(record: &PlayerRecord, color: CellValue) -> Vec<CellValue> {
    let mut row = encode_row(record);
    row[COLOR_COL - 1] = color;
    row
}

/// True when `value` survives a round trip through a numeric cell.
pub fn is_exact_integer(value: i64) -> bool {
    (-MAX_EXACT_INTEGER..=MAX_EXACT_INTEGER).contains(&value)
}

/// Strict key parse used for lookups; anything that is not an integer never
/// matches a caller's key.
pub fn parse_key(cell: &CellValue) -> Option<i64> {
    parse_integer(cell)
}

/// Best-effort row decoding. Fields that had to be coerced are reported by
/// column so callers can log them; the record is produced regardless.
pub fn decode_row(cells: &[CellValue]) -> (PlayerRecord, Vec<usize>) {
    let cell = |col: usize| cells.get(col - 1).unwrap_or(&EMPTY_CELL);
    let mut coerced = Vec::new();

    let mut integer = |col: usize| match parse_integer(cell(col)) {
        Some(value) => value,
        None => {
            coerced.push(col);
            0
        }
    };
    let user_id = integer(USER_ID_COL);
    let x = integer(X_COL);
    let y = integer(Y_COL);
    let notification = integer(NOTIFICATION_COL);

    let mut position = |col: usize, value: i64| {
        let clamped = saturate_i16(value);
        if clamped as i64 != value {
            coerced.push(col);
        }
        clamped
    };
    let x = position(X_COL, x);
    let y = position(Y_COL, y);

    let record = PlayerRecord {
        user_id,
        x,
        y,
        online: is_online(cell(ONLINE_COL)),
        notification,
        color: decode_color(cell(COLOR_COL)),
    };
    (record, coerced)
}

/// True only for a stored value equal to 1: the number 1, the text "1", or a
/// boolean true.
pub fn is_online(cell: &CellValue) -> bool {
    match cell {
        CellValue::Number(n) => *n == 1.0,
        CellValue::Text(s) => s.trim().parse::<f64>().map_or(false, |n| n == 1.0),
        CellValue::Bool(b) => *b,
        CellValue::Empty => false,
    }
}

pub fn decode_color(cell: &CellValue) -> Color {
    Color::new(cell.to_string())
}

fn parse_integer(cell: &CellValue) -> Option<i64> {
    let number = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        CellValue::Bool(_) | CellValue::Empty => return None,
    };
    if !number.is_finite() || number.fract() != 0.0 {
        return None;
    }
    if number < i64::MIN as f64 || number > i64::MAX as f64 {
        return None;
    }
    Some(number as i64)
}

fn saturate_i16(value: i64) -> i16 {
    value.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[CellValue]) -> Vec<CellValue> {
        cells.to_vec()
    }

    #[test]
    fn test_decode_well_formed_row() {
        let (record, coerced) = decode_row(&row(&[
            CellValue::Number(7.0),
            CellValue::Number(10.0),
            CellValue::Number(-20.0),
            CellValue::Number(1.0),
            CellValue::Number(0.0),
            "red".into(),
        ]));

        assert!(coerced.is_empty());
        assert_eq!(record.user_id, 7);
        assert_eq!((record.x, record.y), (10, -20));
        assert!(record.online);
        assert_eq!(record.notification, 0);
        assert_eq!(record.color, Color::from("red"));
    }

    #[test]
    fn test_decode_numeric_text() {
        let (record, coerced) = decode_row(&row(&[
            " 8 ".into(),
            "3".into(),
            "4".into(),
            "1".into(),
            "2".into(),
            "green".into(),
        ]));

        assert!(coerced.is_empty());
        assert_eq!(record.user_id, 8);
        assert_eq!((record.x, record.y), (3, 4));
        assert!(record.online);
        assert_eq!(record.notification, 2);
    }

    #[test]
    fn test_malformed_fields_fall_back_to_zero() {
        let (record, coerced) = decode_row(&row(&[
            CellValue::Number(9.0),
            "left".into(),
            CellValue::Empty,
            "yes".into(),
            CellValue::Number(2.5),
        ]));

        assert_eq!(record.user_id, 9);
        assert_eq!((record.x, record.y), (0, 0));
        assert!(!record.online);
        assert_eq!(record.notification, 0);
        assert!(record.color.is_empty());
        assert_eq!(coerced, vec![X_COL, Y_COL, NOTIFICATION_COL]);
    }

    #[test]
    fn test_out_of_range_positions_are_clamped_and_reported() {
        let (record, coerced) = decode_row(&row(&[
            CellValue::Number(2.0),
            CellValue::Number(40000.0),
            CellValue::Number(-40000.0),
            CellValue::Number(1.0),
            CellValue::Number(0.0),
            "red".into(),
        ]));

        assert_eq!((record.x, record.y), (i16::MAX, i16::MIN));
        assert_eq!(coerced, vec![X_COL, Y_COL]);
    }

    #[test]
    fn test_exact_integer_bounds() {
        assert!(is_exact_integer(MAX_EXACT_INTEGER));
        assert!(is_exact_integer(-MAX_EXACT_INTEGER));
        assert!(!is_exact_integer(MAX_EXACT_INTEGER + 1));
        assert!(!is_exact_integer(i64::MIN));
    }

    #[test]
    fn test_color_cell_is_written_back_untouched() {
        let record = PlayerRecord {
            user_id: 7,
            x: 1,
            y: 1,
            online: true,
            notification: 0,
            color: Color::from("3"),
        };

        let encoded = encode_row_with_color(&record, CellValue::Number(3.0));

        assert_eq!(encoded[COLOR_COL - 1], CellValue::Number(3.0));
        assert_eq!(encoded[USER_ID_COL - 1], CellValue::Number(7.0));
    }

    #[test]
    fn test_online_is_true_only_for_one() {
        assert!(is_online(&CellValue::Number(1.0)));
        assert!(is_online(&"1".into()));
        assert!(is_online(&CellValue::Bool(true)));

        assert!(!is_online(&CellValue::Number(0.0)));
        assert!(!is_online(&CellValue::Number(2.0)));
        assert!(!is_online(&CellValue::Empty));
        assert!(!is_online(&"true".into()));
        assert!(!is_online(&CellValue::Bool(false)));
    }

    #[test]
    fn test_numeric_color_is_rendered_as_text() {
        assert_eq!(decode_color(&CellValue::Number(3.0)), Color::from("3"));
    }

    #[test]
    fn test_encode_uses_one_zero_for_online() {
        let record = PlayerRecord {
            user_id: 7,
            x: 11,
            y: 19,
            online: false,
            notification: 3,
            color: Color::from("red"),
        };

        let encoded = encode_row(&record);

        assert_eq!(encoded.len(), COLUMN_COUNT);
        assert_eq!(encoded[ONLINE_COL - 1], CellValue::Number(0.0));
        assert_eq!(encoded[COLOR_COL - 1], CellValue::from("red"));
        assert_eq!(decode_row(&encoded).0, record);
    }

    #[test]
    fn test_key_parse_is_strict() {
        assert_eq!(parse_key(&CellValue::Number(7.0)), Some(7));
        assert_eq!(parse_key(&"7".into()), Some(7));
        assert_eq!(parse_key(&CellValue::Empty), None);
        assert_eq!(parse_key(&"seven".into()), None);
        assert_eq!(parse_key(&CellValue::Number(7.5)), None);
    }
}
