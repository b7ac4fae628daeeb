// MIT License - Copyright (c) 2026 Peter Wright
// Panel settings and command enums

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::constants::{DEFAULT_AUTH_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SESSION_FILE};
use crate::error::{NxError, Result};

/// Keypad-level system trigger.
///
/// The integer ordinals (`Arm = 0` .. `Chime = 3`) match the values external
/// callers historically passed; each trigger maps to a fixed keypad code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemTrigger {
    /// Away arm (keypad code 17)
    Arm,
    /// Stay arm (keypad code 18)
    Stay,
    /// Disarm (keypad code 16)
    Disarm,
    /// Toggle chime (keypad code 1)
    Chime,
}

impl SystemTrigger {
    /// The `data2` keypad code sent to `keyfunction.cgi`.
    pub fn key_code(&self) -> u32 {
        match self {
            Self::Arm => 17,
            Self::Stay => 18,
            Self::Disarm => 16,
            Self::Chime => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Stay => "stay",
            Self::Disarm => "disarm",
            Self::Chime => "chime",
        }
    }
}

impl TryFrom<i32> for SystemTrigger {
    type Error = NxError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Arm),
            1 => Ok(Self::Stay),
            2 => Ok(Self::Disarm),
            3 => Ok(Self::Chime),
            other => Err(NxError::InvalidTrigger {
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for SystemTrigger {
    type Err = NxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "arm" | "away" => Ok(Self::Arm),
            "stay" => Ok(Self::Stay),
            "disarm" => Ok(Self::Disarm),
            "chime" => Ok(Self::Chime),
            _ => Err(NxError::InvalidTrigger {
                value: s.to_string(),
            }),
        }
    }
}

/// What `fetch_zone_status` does when a single zone-state row fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneFetchMode {
    /// Abort the whole zone fetch on the first failing row.
    Strict,
    /// Log the failure, keep going and mark decoded zones as degraded.
    #[default]
    BestEffort,
}

/// Connection settings for one panel. Immutable once built.
#[derive(Debug, Clone)]
pub struct PanelSettings {
    /// `http` or `https`
    pub protocol: String,
    /// Host name or IP (optionally with `:port`)
    pub host: String,
    /// Account display name
    pub name: String,
    /// Web user name (`lgname`)
    pub user: String,
    /// Web PIN (`lgpin`)
    pub pin: String,
    /// Where the last session token is persisted
    pub session_file: PathBuf,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Attempts per operation, re-login included (minimum 1)
    pub max_auth_attempts: u32,
    /// Per-row failure policy for zone fetches
    pub zone_fetch_mode: ZoneFetchMode,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: String::new(),
            name: String::new(),
            user: String::new(),
            pin: String::new(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_auth_attempts: DEFAULT_AUTH_ATTEMPTS,
            zone_fetch_mode: ZoneFetchMode::default(),
        }
    }
}

impl PanelSettings {
    /// Create a new settings builder starting from defaults.
    pub fn builder() -> PanelSettingsBuilder {
        PanelSettingsBuilder::default()
    }

    /// Load settings from `NX_*` environment variables.
    ///
    /// `NX_HOST`, `NX_USER` and `NX_PIN` are required. `NX_NAME` falls back to
    /// the misspelled `NX_NANE` that older deployments set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`PanelSettings::from_env`], with variables missing from the
    /// environment taken from a dotenv file at `path`. A missing file is not an
    /// error.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = read_env_file(path.as_ref())?;
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| NxError::Config {
                    details: format!("{key} is not set"),
                })
        };

        let mut builder = PanelSettings::builder()
            .host(required("NX_HOST")?)
            .user(required("NX_USER")?)
            .pin(required("NX_PIN")?);

        if let Some(protocol) = lookup("NX_PROTOCOL").filter(|v| !v.is_empty()) {
            builder = builder.protocol(protocol);
        }
        if let Some(name) = lookup("NX_NAME").or_else(|| lookup("NX_NANE")) {
            builder = builder.name(name);
        }
        if let Some(path) = lookup("NX_SESSION_FILE").filter(|v| !v.is_empty()) {
            builder = builder.session_file(path);
        }
        if let Some(ms) = lookup("NX_TIMEOUT_MS") {
            let ms = ms.parse::<u64>().map_err(|_| NxError::Config {
                details: format!("NX_TIMEOUT_MS is not a number: {ms}"),
            })?;
            builder = builder.request_timeout_ms(ms);
        }

        let settings = builder.build();
        settings.validate()?;
        Ok(settings)
    }

    /// Check the fields the transport cannot work without.
    pub fn validate(&self) -> Result<()> {
        match self.protocol.as_str() {
            "http" | "https" => {}
            other => {
                return Err(NxError::Config {
                    details: format!("unsupported protocol: {other}"),
                })
            }
        }
        if self.host.is_empty() {
            return Err(NxError::Config {
                details: "host is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Base URL all endpoint paths are relative to: `protocol://host/`.
    pub fn base_url(&self) -> String {
        format!("{}://{}/", self.protocol, self.host)
    }

    /// Absolute URL of an endpoint path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path.trim_start_matches('/'))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Attempts per operation, never below one.
    pub fn auth_attempts(&self) -> u32 {
        self.max_auth_attempts.max(1)
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let config_err = |e: dotenvy::Error| NxError::Config {
        details: format!("{}: {e}", path.display()),
    };
    match dotenvy::from_path_iter(path) {
        Ok(iter) => {
            let vars = iter
                .collect::<std::result::Result<HashMap<_, _>, _>>()
                .map_err(config_err)?;
            debug!("Loaded {} variables from {}", vars.len(), path.display());
            Ok(vars)
        }
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(config_err(e)),
    }
}

/// Builder for PanelSettings.
#[derive(Debug, Clone, Default)]
pub struct PanelSettingsBuilder {
    settings: PanelSettings,
}

impl PanelSettingsBuilder {
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.settings.protocol = protocol.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.settings.host = host.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.settings.name = name.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.settings.user = user.into();
        self
    }

    pub fn pin(mut self, pin: impl Into<String>) -> Self {
        self.settings.pin = pin.into();
        self
    }

    pub fn session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.session_file = path.into();
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.settings.request_timeout_ms = ms;
        self
    }

    pub fn max_auth_attempts(mut self, attempts: u32) -> Self {
        self.settings.max_auth_attempts = attempts;
        self
    }

    pub fn zone_fetch_mode(mut self, mode: ZoneFetchMode) -> Self {
        self.settings.zone_fetch_mode = mode;
        self
    }

    pub fn build(self) -> PanelSettings {
        self.settings
    }
}
