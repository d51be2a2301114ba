//! Import configuration.
//!
//! Loaded from a TOML file (`import.toml` by convention); any field left out
//! falls back to its default, and an absent file yields all defaults:
//!
//! ```toml
//! duplicate_behaviour = "skip"      # fail | overwrite | skip
//! missing_ref_behaviour = "create"  # fail | ignore | create
//! time_zone = "+02:00"
//! reset = false
//! ```

use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// What to do when an incoming record's checksum is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateBehaviour {
    #[default]
    Fail,
    Overwrite,
    Skip,
}

/// What to do when a record names a related entity that is not stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRefBehaviour {
    #[default]
    Fail,
    Ignore,
    Create,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub duplicate_behaviour: DuplicateBehaviour,
    pub missing_ref_behaviour: MissingRefBehaviour,
    /// UTC offset used when back-filling absent timestamps.
    pub time_zone: String,
    /// Drop and recreate the schema before importing.
    pub reset: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            duplicate_behaviour: DuplicateBehaviour::Fail,
            missing_ref_behaviour: MissingRefBehaviour::Fail,
            time_zone: "+00:00".to_string(),
            reset: false,
        }
    }
}

impl ImportConfig {
    /// Read a config file. A file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        if !path.exists() {
            log::debug!("No import config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Parse the configured time zone.
    pub fn offset(&self) -> Result<FixedOffset, ImportError> {
        parse_offset(&self.time_zone)
    }
}

/// Parse a UTC offset such as `+02:00`, `-0530` or `Z`.
pub fn parse_offset(s: &str) -> Result<FixedOffset, ImportError> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    let invalid = || ImportError::InvalidTimeZone(s.to_string());

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Policies and clock settings threaded into every importer of a run.
#[derive(Debug, Clone, Copy)]
pub struct ImportContext {
    pub duplicate: DuplicateBehaviour,
    pub missing_refs: MissingRefBehaviour,
    pub offset: FixedOffset,
}

impl ImportContext {
    pub fn new(config: &ImportConfig) -> Result<Self, ImportError> {
        Ok(Self {
            duplicate: config.duplicate_behaviour,
            missing_refs: config.missing_ref_behaviour,
            offset: config.offset()?,
        })
    }

    /// The stored form of a record timestamp: the record's own value when it
    /// parses as RFC 3339, otherwise the current time. Either way expressed
    /// in the configured zone.
    pub fn timestamp(&self, value: Option<&str>) -> String {
        if let Some(raw) = value {
            match chrono::DateTime::parse_from_rfc3339(raw) {
                Ok(t) => return t.with_timezone(&self.offset).to_rfc3339(),
                Err(e) => log::debug!("Unparseable timestamp '{}': {}", raw, e),
            }
        }
        self.now()
    }

    pub fn now(&self) -> String {
        Utc::now().with_timezone(&self.offset).to_rfc3339()
    }
}
