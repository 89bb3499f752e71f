//! Server configuration
//!
//! Defaults mirror a small single-process deployment. Every value can be
//! overridden through `LOBBY_*` environment variables.

use std::collections::HashSet;
use std::env;

use crate::error::ConfigError;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Channel buffer size for server commands
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// Channel buffer size for per-session outbound events
pub const SESSION_BUFFER_SIZE: usize = 32;

/// Numeric codes, like "40712"
pub const DEFAULT_CODE_ALPHABET: &str = "0123456789";
pub const DEFAULT_CODE_LENGTH: usize = 5;
pub const DEFAULT_CODE_MAX_ATTEMPTS: u32 = 32;

/// Room code shape and sampling budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeConfig {
    /// Characters a code is built from, stored uppercase
    pub alphabet: Vec<char>,
    /// Fixed number of characters per code
    pub length: usize,
    /// Random draws before falling back to a scan of the code space
    pub max_attempts: u32,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_CODE_ALPHABET.chars().collect(),
            length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_CODE_MAX_ATTEMPTS,
        }
    }
}

impl CodeConfig {
    /// Build a config from an alphabet string, normalizing it to uppercase
    pub fn new(alphabet: &str, length: usize, max_attempts: u32) -> Result<Self, ConfigError> {
        let config = Self {
            alphabet: alphabet.to_uppercase().chars().collect(),
            length,
            max_attempts,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unique: HashSet<char> = self.alphabet.iter().copied().collect();
        // Codes are trimmed on input, so blank characters could never match.
        let blank = self
            .alphabet
            .iter()
            .any(|c| c.is_whitespace() || c.is_control());
        if self.alphabet.is_empty() || blank || unique.len() != self.alphabet.len() {
            return Err(ConfigError::InvalidAlphabet);
        }
        if self.length == 0 {
            return Err(ConfigError::Zero("Room code length"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Zero("Room code attempt count"));
        }
        Ok(())
    }

    /// Number of distinct codes, saturating at `u64::MAX`
    pub fn capacity(&self) -> u64 {
        let base = self.alphabet.len() as u64;
        let mut capacity: u64 = 1;
        for _ in 0..self.length {
            capacity = capacity.saturating_mul(base);
        }
        capacity
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    pub bind_addr: String,
    pub channel_buffer_size: usize,
    pub session_buffer_size: usize,
    pub code: CodeConfig,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            channel_buffer_size: CHANNEL_BUFFER_SIZE,
            session_buffer_size: SESSION_BUFFER_SIZE,
            code: CodeConfig::default(),
        }
    }
}

impl LobbyConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("LOBBY_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let alphabet =
            lookup("LOBBY_CODE_ALPHABET").unwrap_or_else(|| DEFAULT_CODE_ALPHABET.to_string());
        let length = parse_or(&lookup, "LOBBY_CODE_LENGTH", DEFAULT_CODE_LENGTH)?;
        let max_attempts = parse_or(&lookup, "LOBBY_CODE_MAX_ATTEMPTS", DEFAULT_CODE_MAX_ATTEMPTS)?;

        Ok(Self {
            bind_addr,
            code: CodeConfig::new(&alphabet, length, max_attempts)?,
            ..Self::default()
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
