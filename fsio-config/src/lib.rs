//! fsio Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all fsio crates.

use serde::Deserialize;

/// Byte order requested for newly created buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrderSetting {
    Big,
    Little,
    /// Whatever the host uses
    Native,
}

/// Configuration for buffer construction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Byte order for multi-byte scalar access
    pub byte_order: ByteOrderSetting,
    /// Alignment of direct buffer allocations (power of two)
    pub direct_alignment: usize,
}

/// Configuration for bulk transfers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Bytes moved per read/write call when streaming a whole file
    pub chunk_size: usize,
}

/// Log level vocabulary, independent of any logging backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// Nothing at all
    Off,
}

impl LogLevel {
    /// Parse a level name, case-insensitive. "silent" is an alias for "off".
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Component enum for component-specific log levels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Buffer,
    Facade,
    Backend,
    Cli,
}

impl Component {
    /// Get the string name of the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Buffer => "buffer",
            Component::Facade => "facade",
            Component::Backend => "backend",
            Component::Cli => "cli",
        }
    }

    /// Get the log target name for this component
    pub fn target(&self) -> String {
        format!("fsio::{}", self.as_str())
    }

    /// All components, in layering order
    pub fn all() -> [Component; 4] {
        [
            Component::Buffer,
            Component::Facade,
            Component::Backend,
            Component::Cli,
        ]
    }
}

/// Log configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level for every target
    pub global: LogLevel,
    pub buffer: Option<LogLevel>,
    pub facade: Option<LogLevel>,
    pub backend: Option<LogLevel>,
    pub cli: Option<LogLevel>,
}

impl LogConfig {
    /// Effective level for a component: its own override, else the global level
    pub fn level_for(&self, component: Component) -> LogLevel {
        let specific = match component {
            Component::Buffer => self.buffer,
            Component::Facade => self.facade,
            Component::Backend => self.backend,
            Component::Cli => self.cli,
        };
        specific.unwrap_or(self.global)
    }
}

/// Aggregate configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub buffer: BufferConfig,
    pub io: IoConfig,
    pub log: LogConfig,
}

impl Config {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrderSetting::Big,
            direct_alignment: 8,
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LogLevel::Warn,
            buffer: None,
            facade: None,
            backend: None,
            cli: None,
        }
    }
}
