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
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(&section.to_lowercase())
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[backtest]
initial_capital = 10000

[strategy]
name = sma_cross
fast = 10
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("strategy", "name"),
            Some("sma_cross".to_string())
        );
        assert_eq!(adapter.get_string("strategy", "fast"), Some("10".to_string()));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn keys_lists_section_sorted() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nslow = 50\nname = sma_cross\nfast = 20\n")
                .unwrap();
        assert_eq!(adapter.keys("strategy"), vec!["fast", "name", "slow"]);
        assert!(adapter.keys("missing").is_empty());
    }

    #[test]
    fn keys_and_lookup_ignore_case() {
        let adapter = FileConfigAdapter::from_string("[Indicator.SMA]\nPeriod = 9\n").unwrap();
        assert_eq!(adapter.keys("indicator.sma"), vec!["period"]);
        assert_eq!(adapter.get_string("indicator.sma", "period"), Some("9".to_string()));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[indicators]\nactive = sma, rsi\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("indicators", "active"),
            Some("sma, rsi".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
