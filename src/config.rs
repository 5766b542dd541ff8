//! Configuration types.

use std::net::SocketAddr;

use crate::error::ConfigError;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Interface to bind, e.g. "0.0.0.0".
    pub bind_addr: String,
    pub port: u16,
    /// Sessions untouched for this long are discarded.
    pub session_idle_minutes: u32,
    /// How often the idle-session sweep runs.
    pub sweep_interval_secs: u64,
    /// Redirect requests for steps whose predecessors are incomplete instead
    /// of serving them. Off by default: navigation chrome only hides them.
    pub enforce_step_order: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            session_idle_minutes: 60,
            sweep_interval_secs: 60,
            enforce_step_order: false,
        }
    }
}

impl WizardConfig {
    /// Load from `ONBOARDING_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: lookup("ONBOARDING_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or(&lookup, "ONBOARDING_PORT", defaults.port)?,
            session_idle_minutes: parse_or(
                &lookup,
                "ONBOARDING_SESSION_IDLE_MIN",
                defaults.session_idle_minutes,
            )?,
            sweep_interval_secs: parse_or(
                &lookup,
                "ONBOARDING_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval_secs,
            )?,
            enforce_step_order: match lookup("ONBOARDING_ENFORCE_STEP_ORDER") {
                Some(raw) => parse_bool("ONBOARDING_ENFORCE_STEP_ORDER", &raw)?,
                None => defaults.enforce_step_order,
            },
        })
    }

    /// Socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "ONBOARDING_BIND_ADDR".to_string(),
                message: e.to_string(),
            })
    }

    pub fn session_idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.session_idle_minutes))
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: expected true/false"),
        }),
    }
}
