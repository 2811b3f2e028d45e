//! Per-user check-in configuration
//!
//! Configuration is an explicit structure handed into the pipeline, never
//! process-wide state, so runs for different users stay independent. The
//! persisted form lives in [`store`].

pub mod store;

pub use store::ConfigStore;

use crate::checkin::jitter::DEFAULT_OFFSET;
use crate::error::{PunchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Everything one user needs for a check-in run, plus the auto-run settings
/// the scheduler consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Session cookie, forwarded verbatim; never parsed.
    #[serde(default)]
    pub cookie: String,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
    /// Pinned class id; empty means resolve from the dashboard.
    #[serde(default)]
    pub class_id: String,
    /// Coordinate jitter magnitude.
    #[serde(default = "UserConfig::default_offset")]
    pub offset: f64,
    #[serde(default)]
    pub auto_enabled: bool,
    /// Daily auto check-in time, local, HH:MM.
    #[serde(default = "UserConfig::default_auto_time")]
    pub auto_time: String,
    /// Notification target -> level.
    #[serde(default)]
    pub notifications: BTreeMap<String, NotificationLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_auto_run_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_auto_run_at: Option<DateTime<Utc>>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            lat: String::new(),
            lng: String::new(),
            class_id: String::new(),
            offset: Self::default_offset(),
            auto_enabled: false,
            auto_time: Self::default_auto_time(),
            notifications: BTreeMap::new(),
            last_auto_run_at: None,
            next_auto_run_at: None,
        }
    }
}

impl UserConfig {
    fn default_offset() -> f64 {
        DEFAULT_OFFSET
    }

    fn default_auto_time() -> String {
        "08:00".to_string()
    }

    /// Check the required fields, reporting the first missing one in the
    /// order the portal flow needs them: cookie, latitude, longitude.
    pub fn require_complete(&self) -> Result<()> {
        if self.cookie.is_empty() {
            return Err(PunchError::MissingField { field: "cookie" });
        }
        if self.lat.is_empty() {
            return Err(PunchError::MissingField { field: "latitude" });
        }
        if self.lng.is_empty() {
            return Err(PunchError::MissingField { field: "longitude" });
        }
        Ok(())
    }
}

/// When a target gets told about a run's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Always,
    Never,
    FailureOnly,
}

impl NotificationLevel {
    pub fn should_notify(&self, success: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::FailureOnly => !success,
        }
    }
}

impl FromStr for NotificationLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "failure_only" => Ok(Self::FailureOnly),
            other => Err(format!(
                "unknown notification level {other:?}, expected always/never/failure_only"
            )),
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
            Self::FailureOnly => write!(f, "failure_only"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_complete_reports_fields_in_order() {
        let mut cfg = UserConfig::default();
        assert!(matches!(
            cfg.require_complete(),
            Err(PunchError::MissingField { field: "cookie" })
        ));
        cfg.cookie = "sess123".into();
        assert!(matches!(
            cfg.require_complete(),
            Err(PunchError::MissingField { field: "latitude" })
        ));
        cfg.lat = "20.0".into();
        assert!(matches!(
            cfg.require_complete(),
            Err(PunchError::MissingField { field: "longitude" })
        ));
        cfg.lng = "100.0".into();
        assert!(cfg.require_complete().is_ok());
    }

    #[test]
    fn empty_json_deserializes_with_defaults() {
        let cfg: UserConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.offset, DEFAULT_OFFSET);
        assert_eq!(cfg.auto_time, "08:00");
        assert!(!cfg.auto_enabled);
        assert!(cfg.notifications.is_empty());
    }

    #[test]
    fn notification_levels_round_trip_as_snake_case() {
        let json = serde_json::to_string(&NotificationLevel::FailureOnly).unwrap();
        assert_eq!(json, "\"failure_only\"");
        let level: NotificationLevel = serde_json::from_str("\"always\"").unwrap();
        assert_eq!(level, NotificationLevel::Always);
    }

    #[test]
    fn notification_level_parsing() {
        assert_eq!(
            "failure_only".parse::<NotificationLevel>().unwrap(),
            NotificationLevel::FailureOnly
        );
        assert!("sometimes".parse::<NotificationLevel>().is_err());
    }

    #[test]
    fn notification_gate() {
        assert!(NotificationLevel::Always.should_notify(true));
        assert!(NotificationLevel::Always.should_notify(false));
        assert!(!NotificationLevel::Never.should_notify(true));
        assert!(!NotificationLevel::Never.should_notify(false));
        assert!(!NotificationLevel::FailureOnly.should_notify(true));
        assert!(NotificationLevel::FailureOnly.should_notify(false));
    }
}
