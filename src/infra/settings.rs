//! Usage: Portal settings (schema, TOML file + env loading, sanitize/validate helpers).

use crate::shared::error::AppResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:3000";
pub const GOOGLE_CALLBACK_PATH: &str = "/login/app-google-auth/callback";
const DEFAULT_APP_NAME: &str = "10XR Sales Assistant";
const DEFAULT_DEEP_LINK_SCHEME: &str = "10xr";
const DEFAULT_DEEP_LINK_PATH: &str = "auth/callback";
const DEFAULT_PENDING_LOGIN_TTL_SECONDS: u32 = 600;
const DEFAULT_HTTP_CONNECT_TIMEOUT_SECONDS: u32 = 10;
const DEFAULT_HTTP_REQUEST_TIMEOUT_SECONDS: u32 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";
const MIN_PENDING_LOGIN_TTL_SECONDS: u32 = 30;
const MAX_PENDING_LOGIN_TTL_SECONDS: u32 = 60 * 60;
const MAX_HTTP_CONNECT_TIMEOUT_SECONDS: u32 = 60;
const MAX_HTTP_REQUEST_TIMEOUT_SECONDS: u32 = 5 * 60;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const GOOGLE_TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/tokeninfo";
const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
];

pub const ENV_CONFIG_PATH: &str = "TENXR_PORTAL_CONFIG";
const ENV_LISTEN: &str = "TENXR_PORTAL_LISTEN";
const ENV_PUBLIC_BASE_URL: &str = "TENXR_PORTAL_PUBLIC_BASE_URL";
const ENV_GOOGLE_CLIENT_ID: &str = "TENXR_PORTAL_GOOGLE_CLIENT_ID";
const ENV_GOOGLE_CLIENT_ID_LEGACY: &str = "NEXT_PUBLIC_GOOGLE_CLIENT_ID";
const ENV_GOOGLE_CLIENT_SECRET: &str = "TENXR_PORTAL_GOOGLE_CLIENT_SECRET";
const ENV_LOG_DIR: &str = "TENXR_PORTAL_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: String,
    // Optional for public clients; Google web clients normally need it for the code exchange.
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub tokeninfo_url: String,
    pub scopes: Vec<String>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            tokeninfo_url: GOOGLE_TOKENINFO_URL.to_string(),
            scopes: GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Directory for daily rolling log files; stdout only when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    // host, host:port, [v6] or [v6]:port.
    pub listen_address: String,
    // Origin the browser sees; used to build the Google redirect URI.
    pub public_base_url: String,
    pub app_name: String,
    pub deep_link_scheme: String,
    pub deep_link_path: String,
    pub pending_login_ttl_seconds: u32,
    pub http_connect_timeout_seconds: u32,
    pub http_request_timeout_seconds: u32,
    pub google: GoogleSettings,
    pub log: LogSettings,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            deep_link_scheme: DEFAULT_DEEP_LINK_SCHEME.to_string(),
            deep_link_path: DEFAULT_DEEP_LINK_PATH.to_string(),
            pending_login_ttl_seconds: DEFAULT_PENDING_LOGIN_TTL_SECONDS,
            http_connect_timeout_seconds: DEFAULT_HTTP_CONNECT_TIMEOUT_SECONDS,
            http_request_timeout_seconds: DEFAULT_HTTP_REQUEST_TIMEOUT_SECONDS,
            google: GoogleSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl PortalSettings {
    /// Redirect URI registered with Google for the code flow.
    pub fn google_redirect_uri(&self) -> String {
        format!(
            "{}{GOOGLE_CALLBACK_PATH}",
            self.public_base_url.trim_end_matches('/')
        )
    }

    /// Trim strings and clamp numeric fields into their supported ranges.
    /// Returns `true` when anything changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;

        for field in [
            &mut self.listen_address,
            &mut self.public_base_url,
            &mut self.app_name,
            &mut self.deep_link_scheme,
            &mut self.google.client_id,
            &mut self.google.auth_url,
            &mut self.google.token_url,
            &mut self.google.userinfo_url,
            &mut self.google.tokeninfo_url,
            &mut self.log.level,
        ] {
            changed |= trim_in_place(field);
        }

        let path = self.deep_link_path.trim().trim_matches('/').to_string();
        if path != self.deep_link_path {
            self.deep_link_path = path;
            changed = true;
        }

        if self
            .google
            .client_secret
            .as_deref()
            .is_some_and(|v| v.trim().is_empty())
        {
            self.google.client_secret = None;
            changed = true;
        } else if let Some(secret) = self.google.client_secret.as_mut() {
            changed |= trim_in_place(secret);
        }

        let scopes_before = self.google.scopes.len();
        self.google.scopes = self
            .google
            .scopes
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.google.scopes.len() != scopes_before {
            changed = true;
        }
        if self.google.scopes.is_empty() {
            self.google.scopes = GoogleSettings::default().scopes;
            changed = true;
        }

        if self.app_name.is_empty() {
            self.app_name = DEFAULT_APP_NAME.to_string();
            changed = true;
        }
        if self.log.level.is_empty() {
            self.log.level = DEFAULT_LOG_LEVEL.to_string();
            changed = true;
        }

        changed |= clamp_or_default(
            &mut self.pending_login_ttl_seconds,
            MIN_PENDING_LOGIN_TTL_SECONDS,
            MAX_PENDING_LOGIN_TTL_SECONDS,
            DEFAULT_PENDING_LOGIN_TTL_SECONDS,
        );
        changed |= clamp_or_default(
            &mut self.http_connect_timeout_seconds,
            1,
            MAX_HTTP_CONNECT_TIMEOUT_SECONDS,
            DEFAULT_HTTP_CONNECT_TIMEOUT_SECONDS,
        );
        changed |= clamp_or_default(
            &mut self.http_request_timeout_seconds,
            1,
            MAX_HTTP_REQUEST_TIMEOUT_SECONDS,
            DEFAULT_HTTP_REQUEST_TIMEOUT_SECONDS,
        );

        changed
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.google.client_id.trim().is_empty() {
            return Err(format!(
                "CONFIG_INVALID: google client id is required (set {ENV_GOOGLE_CLIENT_ID})"
            )
            .into());
        }
        if !is_valid_scheme(&self.deep_link_scheme) {
            return Err(format!(
                "CONFIG_INVALID: invalid deep link scheme: {:?}",
                self.deep_link_scheme
            )
            .into());
        }
        if self.deep_link_path.is_empty() {
            return Err("CONFIG_INVALID: deep link path must not be empty"
                .to_string()
                .into());
        }
        if !is_http_url(&self.public_base_url) {
            return Err(format!(
                "CONFIG_INVALID: public base url must be http(s): {:?}",
                self.public_base_url
            )
            .into());
        }
        for (name, url) in [
            ("auth_url", &self.google.auth_url),
            ("token_url", &self.google.token_url),
            ("userinfo_url", &self.google.userinfo_url),
            ("tokeninfo_url", &self.google.tokeninfo_url),
        ] {
            if !is_http_url(url) {
                return Err(format!("CONFIG_INVALID: google {name} must be http(s): {url:?}").into());
            }
        }
        Ok(())
    }
}

fn trim_in_place(value: &mut String) -> bool {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        return false;
    }
    *value = trimmed.to_string();
    true
}

fn clamp_or_default(value: &mut u32, min: u32, max: u32, default: u32) -> bool {
    let next = if *value == 0 {
        default
    } else {
        (*value).clamp(min, max)
    };
    if next == *value {
        return false;
    }
    *value = next;
    true
}

fn is_valid_scheme(scheme: &str) -> bool {
    static SCHEME_RE: OnceLock<Regex> = OnceLock::new();
    SCHEME_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9+.\-]*$").expect("valid scheme regex"))
        .is_match(scheme)
}

fn is_http_url(raw: &str) -> bool {
    reqwest::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse settings from TOML text. Unknown keys are ignored, missing keys take defaults.
pub fn parse_toml(raw: &str) -> AppResult<PortalSettings> {
    toml::from_str::<PortalSettings>(raw)
        .map_err(|e| format!("CONFIG_INVALID: settings toml invalid: {e}").into())
}

pub fn read_file(path: &Path) -> AppResult<PortalSettings> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        format!(
            "CONFIG_INVALID: failed to read settings file {}: {e}",
            path.display()
        )
    })?;
    parse_toml(&raw)
}

/// Overlay environment variables onto `settings`.
pub fn apply_env_overrides(settings: &mut PortalSettings) {
    if let Some(v) = env_non_empty(ENV_LISTEN) {
        settings.listen_address = v;
    }
    if let Some(v) = env_non_empty(ENV_PUBLIC_BASE_URL) {
        settings.public_base_url = v;
    }
    if let Some(v) =
        env_non_empty(ENV_GOOGLE_CLIENT_ID).or_else(|| env_non_empty(ENV_GOOGLE_CLIENT_ID_LEGACY))
    {
        settings.google.client_id = v;
    }
    if let Some(v) = env_non_empty(ENV_GOOGLE_CLIENT_SECRET) {
        settings.google.client_secret = Some(v);
    }
    if let Some(v) = env_non_empty(ENV_LOG_DIR) {
        settings.log.dir = Some(PathBuf::from(v));
    }
}

/// Load settings: optional TOML file from `TENXR_PORTAL_CONFIG`, env overrides, sanitize, validate.
pub fn load() -> AppResult<PortalSettings> {
    let mut settings = match env_non_empty(ENV_CONFIG_PATH) {
        Some(path) => read_file(Path::new(&path))?,
        None => PortalSettings::default(),
    };
    apply_env_overrides(&mut settings);
    settings.sanitize();
    settings.validate()?;
    Ok(settings)
}
