//! different utility modules used throughout the project
/// simplelog setup: terminal logger plus optional log file
pub mod logger;
/// session settings, read from a TOML file
pub mod settings;
