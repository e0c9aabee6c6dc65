//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Config with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::QmoneyError;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_provider_and_ranking() {
        let content = r#"
[provider]
kind = tiingo
base_url = https://api.tiingo.com/tiingo/daily
token = abc123

[ranking]
policy = partial
max_concurrency = 6
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("provider", "base_url"),
            Some("https://api.tiingo.com/tiingo/daily".to_string())
        );
        assert_eq!(adapter.get_string("provider", "token"), Some("abc123".to_string()));
        assert_eq!(adapter.get_int("ranking", "max_concurrency").unwrap(), Some(6));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[ranking]\npolicy = partial\n").unwrap();
        assert_eq!(adapter.get_string("ranking", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_rejects_non_numeric_and_skips_missing() {
        let adapter =
            FileConfigAdapter::from_string("[ranking]\nmax_concurrency = many\n").unwrap();
        let err = adapter.get_int("ranking", "max_concurrency").unwrap_err();
        assert!(matches!(err, QmoneyError::ConfigInvalid { key, .. } if key == "max_concurrency"));
        assert_eq!(adapter.get_int("ranking", "fetch_timeout_secs").unwrap(), None);
    }

    #[test]
    fn get_date_parses_iso_dates() {
        let adapter = FileConfigAdapter::from_string("[ranking]\nend_date = 2019-12-12\n").unwrap();
        assert_eq!(
            adapter.get_date("ranking", "end_date").unwrap(),
            NaiveDate::from_ymd_opt(2019, 12, 12)
        );
        assert_eq!(adapter.get_date("ranking", "missing").unwrap(), None);
    }

    #[test]
    fn empty_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("provider", "kind"), None);
        assert_eq!(adapter.get_int("ranking", "max_concurrency").unwrap(), None);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[provider]\nkind = csv\ndata_dir = /data/prices\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("provider", "data_dir"),
            Some("/data/prices".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/qmoney.ini");
        assert!(result.is_err());
    }
}
