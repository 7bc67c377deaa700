#![allow(non_snake_case)]
use RustedCalc::Utils::logger::init_logger;
use RustedCalc::Utils::settings::CalcSettings;
use RustedCalc::calc::pipeline::Calculator;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

/// Reads one expression per line from stdin and prints its value.
#[derive(Parser, Debug)]
#[command(name = "RustedCalc", version, about = "Safe symbolic calculator")]
struct Cli {
    /// Accept implicit multiplication, implicit function application and `sin^2(x)`
    #[arg(long)]
    relaxed: bool,

    /// TOML settings file with [calc] and [log] sections
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Default digit count of N(expr)
    #[arg(long, value_name = "DIGITS")]
    precision: Option<u32>,
}

impl Cli {
    /// Settings from the file, if any, with command line flags on top.
    fn settings(&self) -> Result<CalcSettings, String> {
        let mut settings = match &self.config {
            Some(path) => CalcSettings::from_file(path)?,
            None => CalcSettings::default(),
        };
        if self.relaxed {
            settings = settings.set_relaxed(true);
        }
        if let Some(digits) = self.precision {
            settings = settings.set_precision(digits);
        }
        Ok(settings)
    }
}

fn main() {
    let cli = Cli::parse();
    let settings = cli.settings().unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        process::exit(2);
    });
    if let Err(e) = init_logger(settings.log_level, settings.log_file.as_deref()) {
        eprintln!("error: {}", e);
    }
    let calculator = Calculator::from_settings(&settings).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match calculator.evaluate(&line) {
            Ok(value) => println!("{}", value),
            Err(e) => println!("error: {}", e),
        }
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["RustedCalc", "--relaxed", "--precision", "5"]).unwrap();
        assert!(cli.relaxed);
        assert!(cli.config.is_none());
        let settings = cli.settings().unwrap();
        assert!(settings.relaxed);
        assert_eq!(settings.precision, 5);

        let cli = Cli::try_parse_from(["RustedCalc"]).unwrap();
        assert_eq!(cli.settings().unwrap(), CalcSettings::default());
    }

    #[test]
    fn test_rejects_unknown_arguments() {
        assert!(Cli::try_parse_from(["RustedCalc", "--fast"]).is_err());
        assert!(Cli::try_parse_from(["RustedCalc", "--config"]).is_err());
        assert!(Cli::try_parse_from(["RustedCalc", "--precision", "many"]).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[calc]\nrelaxed = false\nprecision = 10").unwrap();
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["RustedCalc", "--config", path, "--relaxed"]).unwrap();
        let settings = cli.settings().unwrap();
        assert!(settings.relaxed);
        assert_eq!(settings.precision, 10);
    }

    #[test]
    fn test_out_of_range_precision_is_refused() {
        let cli = Cli::try_parse_from(["RustedCalc", "--precision", "40"]).unwrap();
        let settings = cli.settings().unwrap();
        assert!(Calculator::from_settings(&settings).is_err());
    }
}
