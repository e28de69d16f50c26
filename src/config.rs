//! Configuration management for gluster-dissect
//!
//! Loads configuration from:
//! 1. CLI argument `--config <path>` (if provided)
//! 2. Default path `/etc/gluster-dissect/config.toml` (falls back to defaults if not found)

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dispatch::Direction;
use crate::dissector::DecodeOptions;
use crate::protocol::dict::DictLayout;

const DEFAULT_CONFIG_PATH: &str = "/etc/gluster-dissect/config.toml";

#[derive(Parser, Debug)]
#[command(name = "gluster-dissect")]
#[command(about = "GlusterFS RPC payload dissector", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode one message body given as hex
    Decode {
        #[arg(long)]
        program: u32,
        #[arg(long)]
        version: u32,
        #[arg(long)]
        procedure: u32,
        /// call, reply or error
        #[arg(long, default_value = "call")]
        direction: Direction,
        /// Byte offset of the body inside the payload
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Hex payload, whitespace allowed; read from stdin when omitted
        hex: Option<String>,
    },
    /// Dissect a record-marked RPC stream
    Trace {
        /// Capture file; stdin when omitted or "-"
        input: Option<PathBuf>,
    },
    /// List known programs and procedures
    Procedures,
    /// List registered header fields
    Fields,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub decode: DecodeConfig,
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DecodeConfig {
    pub dict_layout: DictLayout,
    /// Print byte offset and length in front of every field
    pub show_offsets: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub max_record_size: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level. If not set, falls back to RUST_LOG env var, then "info"
    pub level: Option<String>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_record_size: 16 * 1024 * 1024,
        }
    }
}

impl DecodeConfig {
    pub fn options(&self) -> DecodeOptions {
        DecodeOptions {
            dict_layout: self.dict_layout,
        }
    }
}

impl LoggingConfig {
    /// Get log level with fallback: config -> RUST_LOG -> "info"
    pub fn effective_level(&self) -> String {
        match self.level.as_deref() {
            Some(level) => level.to_string(),
            None => std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (config_path, user_specified) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            eprintln!("  Config: {}", config_path.display());
            Ok(config)
        } else if user_specified {
            // User specified --config but file doesn't exist
            anyhow::bail!("Configuration file not found: {}", config_path.display());
        } else {
            // Default path doesn't exist, use defaults
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_config_default() {
        let config = DecodeConfig::default();
        assert_eq!(config.dict_layout, DictLayout::Implicit);
        assert!(!config.show_offsets);
        assert_eq!(config.options(), DecodeOptions::default());
    }

    #[test]
    fn test_trace_config_default() {
        let config = TraceConfig::default();
        assert_eq!(config.max_record_size, 16 * 1024 * 1024);
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.level.is_none());
    }

    #[test]
    fn test_effective_level_with_config() {
        let config = LoggingConfig {
            level: Some("debug".to_string()),
        };
        assert_eq!(config.effective_level(), "debug");
    }

    #[test]
    fn test_effective_level_fallback() {
        // Determine expected level based on current environment without mutating it
        let expected = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let config = LoggingConfig { level: None };
        assert_eq!(config.effective_level(), expected);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [logging]
            level = "trace"

            [decode]
            dict_layout = "key-length"
            show_offsets = true

            [trace]
            max_record_size = 65536
        "#;

        let config: Config = toml::from_str(toml).expect("Failed to parse TOML");
        assert_eq!(config.logging.level, Some("trace".to_string()));
        assert_eq!(config.decode.dict_layout, DictLayout::KeyLength);
        assert!(config.decode.show_offsets);
        assert_eq!(config.trace.max_record_size, 65536);
    }

    #[test]
    fn test_parse_partial_toml() {
        // Only specify decode section, others should use defaults
        let toml = r#"
            [decode]
            show_offsets = true
        "#;

        let config: Config = toml::from_str(toml).expect("Failed to parse TOML");
        assert!(config.decode.show_offsets);
        assert_eq!(config.decode.dict_layout, DictLayout::Implicit); // default
        assert_eq!(config.trace.max_record_size, 16 * 1024 * 1024); // default
        assert!(config.logging.level.is_none()); // default
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: Config = toml::from_str("").expect("Failed to parse empty TOML");
        assert_eq!(config.decode.dict_layout, DictLayout::Implicit);
        assert_eq!(config.trace.max_record_size, 16 * 1024 * 1024);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("this is not valid toml [[[");
        assert!(result.is_err());

        let result: Result<Config, _> = toml::from_str("[decode]\ndict_layout = \"sideways\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_cli_decode_arguments() {
        let cli = Cli::try_parse_from([
            "gluster-dissect",
            "decode",
            "--program",
            "1238433",
            "--version",
            "1",
            "--procedure",
            "1",
            "--direction",
            "reply",
            "00 00 00 01",
        ])
        .unwrap();
        match cli.command {
            Command::Decode {
                program,
                direction,
                hex,
                offset,
                ..
            } => {
                assert_eq!(program, 1238433);
                assert_eq!(direction, Direction::Reply);
                assert_eq!(offset, 0);
                assert_eq!(hex.as_deref(), Some("00 00 00 01"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["gluster-dissect", "decode", "--direction", "x"]).is_err());
    }
}
