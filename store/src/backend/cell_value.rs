use std::fmt::Display;

/// A raw value as held by the backend, before any typing is applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Tag stored next to the rendered value by textual backends.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
            CellValue::Bool(_) => "bool",
        }
    }

    /// Inverse of [`CellValue::kind`] plus [`Display`]. Returns `None` when the
    /// pair does not describe a value.
    pub fn from_parts(kind: &str, value: &str) -> Option<Self> {
        match kind {
            "empty" => Some(CellValue::Empty),
            "number" => value.parse().ok().map(CellValue::Number),
            "text" => Some(CellValue::Text(value.to_string())),
            "bool" => value.parse().ok().map(CellValue::Bool),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i16> for CellValue {
    fn from(value: i16) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_survive_storage() {
        for cell in [
            CellValue::Number(-12.5),
            CellValue::Text("red".to_string()),
            CellValue::Bool(true),
            CellValue::Empty,
        ] {
            let stored = cell.to_string();
            assert_eq!(CellValue::from_parts(cell.kind(), &stored), Some(cell));
        }
    }

    #[test]
    fn test_rejects_unknown_parts() {
        assert_eq!(CellValue::from_parts("number", "abc"), None);
        assert_eq!(CellValue::from_parts("formula", "=A1"), None);
    }
}
