use simplelog::*;
use std::fs::File;

/// Initialize the console logger and, when `log_file` is given, a file logger with the same level.
/// A second call in the same process is an error because the global logger is already set.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<(), String> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(filename) = log_file {
        let file = File::create(filename)
            .map_err(|e| format!("cannot create log file {}: {}", filename, e))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    CombinedLogger::init(loggers).map_err(|e| format!("logger already initialized: {}", e))
}

/// Parses `off`, `error`, `warn`, `info`, `debug`, `trace` (any case).
pub fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level: {}", level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Ok(LevelFilter::Debug));
        assert_eq!(parse_level("WARN"), Ok(LevelFilter::Warn));
        assert_eq!(parse_level(" off "), Ok(LevelFilter::Off));
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_bad_log_file_is_reported() {
        let result = init_logger(LevelFilter::Off, Some("/nonexistent-dir/calc.log"));
        assert!(result.unwrap_err().starts_with("cannot create log file"));
    }
}
