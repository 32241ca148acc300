use std::fmt;

/// A field value as the widgets carry it between label, editor and wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    None,
    Text(String),
    Flag(bool),
    Date(CalendarDate),
    Items(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(v) => v.is_empty(),
            Self::Items(v) => v.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn to_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            Self::Text(v) => match v.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Text shown in the label view for this value.
    pub fn display(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Text(v) => v.clone(),
            Self::Flag(v) => v.to_string(),
            Self::Date(v) => v.to_string(),
            Self::Items(v) => v.join(", "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::Items(value)
    }
}

// ---------------------------------------------------------------------------
// CalendarDate
// ---------------------------------------------------------------------------

pub const YEAR_MIN: u16 = 1900;
pub const YEAR_MAX: u16 = 2100;

/// A plain `YYYY-MM-DD` date. No timezone, no clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        let date = Self { year, month, day };
        date.is_valid().then_some(date)
    }

    pub fn is_valid(&self) -> bool {
        (YEAR_MIN..=YEAR_MAX).contains(&self.year)
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
    }

    /// Parse the `YYYY-MM-DD` wire form.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.splitn(3, '-');
        let year = parts.next()?.parse::<u16>().ok()?;
        let month = parts.next()?.parse::<u8>().ok()?;
        let day = parts.next()?.parse::<u8>().ok()?;
        Self::new(year, month, day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_wire_dates() {
        let date = CalendarDate::parse("2024-03-07").unwrap();
        assert_eq!(date, CalendarDate { year: 2024, month: 3, day: 7 });
        assert_eq!(date.to_string(), "2024-03-07");
    }

    #[test]
    fn rejects_out_of_range_segments() {
        assert!(CalendarDate::parse("2024-13-01").is_none());
        assert!(CalendarDate::parse("2024-00-01").is_none());
        assert!(CalendarDate::parse("2024-01-32").is_none());
        assert!(CalendarDate::parse("1899-01-01").is_none());
        assert!(CalendarDate::parse("garbage").is_none());
    }

    #[test]
    fn flag_coercion_accepts_common_spellings() {
        assert_eq!(FieldValue::Text("true".into()).to_flag(), Some(true));
        assert_eq!(FieldValue::Text("0".into()).to_flag(), Some(false));
        assert_eq!(FieldValue::Text("maybe".into()).to_flag(), None);
        assert_eq!(FieldValue::Flag(true).to_flag(), Some(true));
    }
}
