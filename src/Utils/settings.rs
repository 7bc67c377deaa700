//! Session settings of the calculator, optionally read from a TOML file:
//!
//! ```toml
//! [calc]
//! relaxed = true
//! precision = 10
//!
//! [log]
//! level = "debug"
//! file = "calc.log"
//! ```
//! Missing sections and keys keep their defaults, unknown keys are ignored.

use crate::Utils::logger::parse_level;
use crate::symbolic::symbolic_numbers::MAX_DIGITS;
use simplelog::LevelFilter;
use std::fs;
use std::path::Path;
use toml::{Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct CalcSettings {
    /// relaxed grammar (implicit multiplication)
    pub relaxed: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<String>,
    /// default digit count of `N(expr)`
    pub precision: u32,
}

impl Default for CalcSettings {
    fn default() -> Self {
        CalcSettings {
            relaxed: false,
            log_level: LevelFilter::Warn,
            log_file: None,
            precision: 15,
        }
    }
}

impl CalcSettings {
    pub fn set_relaxed(mut self, relaxed: bool) -> Self {
        self.relaxed = relaxed;
        self
    }

    pub fn set_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn set_log_file(mut self, file: &str) -> Self {
        self.log_file = Some(file.to_string());
        self
    }

    pub fn set_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        let table: Table = text
            .parse()
            .map_err(|e| format!("invalid settings: {}", e))?;
        let mut settings = CalcSettings::default();
        if let Some(calc) = section(&table, "calc")? {
            if let Some(value) = calc.get("relaxed") {
                settings.relaxed = value
                    .as_bool()
                    .ok_or_else(|| wrong_type("calc.relaxed", "a boolean"))?;
            }
            if let Some(value) = calc.get("precision") {
                let expected = format!("an integer from 1 to {}", MAX_DIGITS);
                settings.precision = value
                    .as_integer()
                    .and_then(|d| u32::try_from(d).ok())
                    .filter(|d| (1..=MAX_DIGITS).contains(d))
                    .ok_or_else(|| wrong_type("calc.precision", &expected))?;
            }
        }
        if let Some(log) = section(&table, "log")? {
            if let Some(value) = log.get("level") {
                let level = value
                    .as_str()
                    .ok_or_else(|| wrong_type("log.level", "a string"))?;
                settings.log_level = parse_level(level)?;
            }
            if let Some(value) = log.get("file") {
                let file = value
                    .as_str()
                    .ok_or_else(|| wrong_type("log.file", "a string"))?;
                settings.log_file = Some(file.to_string());
            }
        }
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&text)
    }
}

fn section<'t>(table: &'t Table, name: &str) -> Result<Option<&'t Table>, String> {
    match table.get(name) {
        None => Ok(None),
        Some(Value::Table(section)) => Ok(Some(section)),
        Some(_) => Err(wrong_type(name, "a table")),
    }
}

fn wrong_type(key: &str, expected: &str) -> String {
    format!("settings key '{}' must be {}", key, expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = CalcSettings::from_toml_str("").unwrap();
        assert_eq!(settings, CalcSettings::default());
        assert!(!settings.relaxed);
        assert_eq!(settings.precision, 15);
        assert_eq!(settings.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_full_file() {
        let text = r#"
            [calc]
            relaxed = true
            precision = 10
            colour = "blue"

            [log]
            level = "debug"
            file = "calc.log"
        "#;
        let settings = CalcSettings::from_toml_str(text).unwrap();
        let expected = CalcSettings::default()
            .set_relaxed(true)
            .set_precision(10)
            .set_log_level(LevelFilter::Debug)
            .set_log_file("calc.log");
        assert_eq!(settings, expected);
    }

    #[test]
    fn test_wrong_types() {
        let err = CalcSettings::from_toml_str("[calc]\nrelaxed = \"yes\"").unwrap_err();
        assert_eq!(err, "settings key 'calc.relaxed' must be a boolean");
        assert!(CalcSettings::from_toml_str("[calc]\nprecision = -3").is_err());
        let err = CalcSettings::from_toml_str("[calc]\nprecision = 40").unwrap_err();
        assert_eq!(err, "settings key 'calc.precision' must be an integer from 1 to 15");
        assert!(CalcSettings::from_toml_str("calc = 1").is_err());
        assert!(CalcSettings::from_toml_str("[log]\nlevel = \"loud\"").is_err());
        assert!(CalcSettings::from_toml_str("[calc").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[calc]\nrelaxed = true").unwrap();
        let settings = CalcSettings::from_file(file.path()).unwrap();
        assert!(settings.relaxed);
        assert!(CalcSettings::from_file("/nonexistent-dir/calc.toml").is_err());
    }
}
