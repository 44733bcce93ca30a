use std::path::PathBuf;
use std::time::Duration;

use beacon_core::sos::{WorkflowConfig, DEFAULT_MAX_RESPONDERS, DEFAULT_SEARCH_RADIUS_METERS};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory that SOS attachments are written to and served from.
    pub uploads_dir: PathBuf,
    /// Lifetime of a pending signup and its OTP, in minutes (default: `10`).
    pub otp_ttl_mins: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// SOS workflow tunables.
    pub sos: SosConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                        |
    /// |------------------------|------------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                      |
    /// | `PORT`                 | `5000`                                         |
    /// | `CORS_ORIGINS`         | `http://localhost:8081,http://localhost:19006` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                           |
    /// | `UPLOADS_DIR`          | `uploads`                                      |
    /// | `OTP_TTL_MINS`         | `10`                                           |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8081,http://localhost:19006".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let uploads_dir =
            PathBuf::from(std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into()));

        let otp_ttl_mins: u64 = std::env::var("OTP_TTL_MINS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("OTP_TTL_MINS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            uploads_dir,
            otp_ttl_mins,
            jwt: JwtConfig::from_env(),
            sos: SosConfig::from_env(),
        }
    }

    pub fn otp_ttl(&self) -> Duration {
        Duration::from_secs(self.otp_ttl_mins * 60)
    }
}

/// SOS workflow settings.
#[derive(Debug, Clone)]
pub struct SosConfig {
    pub radius_meters: f64,
    pub max_responders: usize,
    /// Bound on each dispatch and lookup call.
    pub external_call_timeout_secs: u64,
    /// Messaging-sandbox recipient. When set, every alert is delivered here.
    pub override_recipient: Option<String>,
    /// Externally reachable base URL of this server, used to turn
    /// `/uploads/...` paths into media URLs the messaging channel can fetch.
    pub public_base_url: Option<String>,
}

impl Default for SosConfig {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            max_responders: DEFAULT_MAX_RESPONDERS,
            external_call_timeout_secs: 8,
            override_recipient: None,
            public_base_url: None,
        }
    }
}

impl SosConfig {
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `SOS_RADIUS_METERS`          | `10000` |
    /// | `SOS_MAX_RESPONDERS`         | `3`     |
    /// | `EXTERNAL_CALL_TIMEOUT_SECS` | `8`     |
    /// | `WHATSAPP_OVERRIDE_TO`       | unset   |
    /// | `PUBLIC_BASE_URL`            | unset   |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let radius_meters: f64 = std::env::var("SOS_RADIUS_METERS")
            .map(|v| v.parse().expect("SOS_RADIUS_METERS must be a number"))
            .unwrap_or(defaults.radius_meters);

        let max_responders: usize = std::env::var("SOS_MAX_RESPONDERS")
            .map(|v| v.parse().expect("SOS_MAX_RESPONDERS must be a valid usize"))
            .unwrap_or(defaults.max_responders);

        let external_call_timeout_secs: u64 = std::env::var("EXTERNAL_CALL_TIMEOUT_SECS")
            .map(|v| {
                v.parse()
                    .expect("EXTERNAL_CALL_TIMEOUT_SECS must be a valid u64")
            })
            .unwrap_or(defaults.external_call_timeout_secs);

        Self {
            radius_meters,
            max_responders,
            external_call_timeout_secs,
            override_recipient: non_empty_var("WHATSAPP_OVERRIDE_TO"),
            public_base_url: non_empty_var("PUBLIC_BASE_URL"),
        }
    }

    pub fn external_call_timeout(&self) -> Duration {
        Duration::from_secs(self.external_call_timeout_secs)
    }

    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            radius_meters: self.radius_meters,
            max_responders: self.max_responders,
            call_timeout: self.external_call_timeout(),
            override_recipient: self.override_recipient.clone(),
            media_base_url: self.public_base_url.clone(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
