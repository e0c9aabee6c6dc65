//! Configuration access port trait.

use crate::domain::error::QmoneyError;
use chrono::NaiveDate;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Optional integer value; present but unparsable is an error.
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, QmoneyError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| QmoneyError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("expected an integer, got {:?}", s),
                }),
        }
    }

    /// Optional `YYYY-MM-DD` value; present but unparsable is an error.
    fn get_date(&self, section: &str, key: &str) -> Result<Option<NaiveDate>, QmoneyError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| QmoneyError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: "invalid date format (expected YYYY-MM-DD)".into(),
                }),
        }
    }
}
