//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Environment variables are read by the binaries only; the helpers
//! here parse the raw values so request handling never performs ambient lookups.

use crate::constants::{
    DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_HOST, DEFAULT_OBSERVER_EMAIL,
    DEFAULT_PORT, DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_PUBLIC_DIR, DEFAULT_SMTP_HOST,
    DEFAULT_UPLOAD_DIR, DEFAULT_V0_BASE_URL,
};
use crate::{EraError, EraResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which upstream image-to-code API the generation client talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// v0 `generate`/`convert` endpoints returning `{code|html|content}`.
    V0,
    /// Chat-completions style endpoint returning `choices[0].message.content`.
    ChatCompletions,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::V0 => DEFAULT_V0_BASE_URL,
            ProviderKind::ChatCompletions => DEFAULT_CHAT_BASE_URL,
        }
    }

    /// Name of the environment variable holding this provider's credential.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            ProviderKind::V0 => "V0_API_KEY",
            ProviderKind::ChatCompletions => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = EraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v0" => Ok(ProviderKind::V0),
            "chat" | "openai" => Ok(ProviderKind::ChatCompletions),
            other => Err(EraError::Configuration(format!(
                "unknown generation provider {other:?} (expected \"v0\" or \"chat\")"
            ))),
        }
    }
}

/// Generation provider settings.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    kind: ProviderKind,
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl ProviderConfig {
    /// Create provider settings, filling the base URL and model from defaults when not given.
    ///
    /// A missing `api_key` is accepted here; the generation client reports it as a
    /// configuration error when a request is actually made.
    pub fn new(
        kind: ProviderKind,
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Self {
        let base_url = non_blank(base_url)
            .unwrap_or_else(|| kind.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            kind,
            api_key: non_blank(api_key),
            base_url,
            model: non_blank(model).unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            timeout,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// SMTP account used to send outgoing mail.
#[derive(Clone, Debug)]
pub struct MailCredentials {
    pub user: String,
    pub pass: String,
}

/// Outgoing mail settings.
#[derive(Clone, Debug)]
pub struct MailConfig {
    credentials: Option<MailCredentials>,
    smtp_host: String,
    observer: String,
}

impl MailConfig {
    /// Create mail settings.
    ///
    /// Credentials are only kept when both user and password are present. `observer` overrides
    /// the default notification recipient.
    pub fn new(
        user: Option<String>,
        pass: Option<String>,
        smtp_host: Option<String>,
        observer: Option<String>,
    ) -> Self {
        let credentials = match (non_blank(user), non_blank(pass)) {
            (Some(user), Some(pass)) => Some(MailCredentials { user, pass }),
            _ => None,
        };

        Self {
            credentials,
            smtp_host: non_blank(smtp_host).unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            observer: non_blank(observer).unwrap_or_else(|| DEFAULT_OBSERVER_EMAIL.to_string()),
        }
    }

    pub fn credentials(&self) -> Option<&MailCredentials> {
        self.credentials.as_ref()
    }

    pub fn smtp_host(&self) -> &str {
        &self.smtp_host
    }

    /// Address that receives a copy of every generated page and shared example.
    pub fn observer(&self) -> &str {
        &self.observer
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct EraConfig {
    host: String,
    port: u16,
    upload_dir: PathBuf,
    public_dir: PathBuf,
    provider: ProviderConfig,
    mail: MailConfig,
}

impl EraConfig {
    /// Create a new `EraConfig`.
    pub fn new(
        host: Option<String>,
        port: u16,
        upload_dir: Option<PathBuf>,
        public_dir: Option<PathBuf>,
        provider: ProviderConfig,
        mail: MailConfig,
    ) -> EraResult<Self> {
        let host = non_blank(host).unwrap_or_else(|| DEFAULT_HOST.to_string());
        if host.contains(char::is_whitespace) {
            return Err(EraError::Configuration(format!(
                "bind host must not contain whitespace: {host:?}"
            )));
        }

        Ok(Self {
            host,
            port,
            upload_dir: upload_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            public_dir: public_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR)),
            provider,
            mail,
        })
    }

    /// `host:port` string suitable for binding a listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    pub fn mail(&self) -> &MailConfig {
        &self.mail
    }
}

/// Parse the listening port from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PORT`].
pub fn port_from_env_value(value: Option<String>) -> EraResult<u16> {
    match non_blank(value) {
        None => Ok(DEFAULT_PORT),
        Some(v) => v
            .parse::<u16>()
            .map_err(|e| EraError::Configuration(format!("invalid PORT {v:?}: {e}"))),
    }
}

/// Parse the generation provider from an optional string value.
///
/// Defaults to [`ProviderKind::ChatCompletions`].
pub fn provider_kind_from_env_value(value: Option<String>) -> EraResult<ProviderKind> {
    non_blank(value)
        .map(|v| v.parse::<ProviderKind>())
        .transpose()
        .map(|kind| kind.unwrap_or(ProviderKind::ChatCompletions))
}

/// Parse the provider timeout (whole seconds) from an optional string value.
pub fn timeout_from_env_value(value: Option<String>) -> EraResult<Duration> {
    let secs = match non_blank(value) {
        None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        Some(v) => v.parse::<u64>().map_err(|e| {
            EraError::Configuration(format!("invalid ERA_PROVIDER_TIMEOUT_SECS {v:?}: {e}"))
        })?,
    };
    if secs == 0 {
        return Err(EraError::Configuration(
            "ERA_PROVIDER_TIMEOUT_SECS must be greater than zero".into(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_unset_or_blank() {
        assert_eq!(port_from_env_value(None).unwrap(), 3000);
        assert_eq!(port_from_env_value(Some("  ".into())).unwrap(), 3000);
        assert_eq!(port_from_env_value(Some("8080".into())).unwrap(), 8080);
    }

    #[test]
    fn port_rejects_garbage() {
        let err = port_from_env_value(Some("eighty".into())).unwrap_err();
        assert!(matches!(err, EraError::Configuration(_)));
    }

    #[test]
    fn provider_kind_parsing() {
        assert_eq!(
            provider_kind_from_env_value(None).unwrap(),
            ProviderKind::ChatCompletions
        );
        assert_eq!(
            provider_kind_from_env_value(Some("V0".into())).unwrap(),
            ProviderKind::V0
        );
        assert_eq!(
            provider_kind_from_env_value(Some("openai".into())).unwrap(),
            ProviderKind::ChatCompletions
        );
        assert!(provider_kind_from_env_value(Some("gemini".into())).is_err());
    }

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(
            timeout_from_env_value(None).unwrap(),
            Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS)
        );
        assert!(timeout_from_env_value(Some("0".into())).is_err());
        assert_eq!(
            timeout_from_env_value(Some("30".into())).unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn provider_config_fills_defaults_and_drops_blank_key() {
        let cfg = ProviderConfig::new(
            ProviderKind::V0,
            Some("   ".into()),
            Some("https://example.test/api/".into()),
            None,
            Duration::from_secs(5),
        );
        assert!(cfg.api_key().is_none());
        assert_eq!(cfg.base_url(), "https://example.test/api");
        assert_eq!(cfg.model(), DEFAULT_CHAT_MODEL);

        let cfg = ProviderConfig::new(
            ProviderKind::ChatCompletions,
            Some("sk-test".into()),
            None,
            Some("gpt-4o-mini".into()),
            Duration::from_secs(5),
        );
        assert_eq!(cfg.api_key(), Some("sk-test"));
        assert_eq!(cfg.base_url(), DEFAULT_CHAT_BASE_URL);
        assert_eq!(cfg.model(), "gpt-4o-mini");
    }

    #[test]
    fn mail_config_requires_both_credentials() {
        let cfg = MailConfig::new(Some("era@example.test".into()), None, None, None);
        assert!(cfg.credentials().is_none());
        assert_eq!(cfg.smtp_host(), DEFAULT_SMTP_HOST);
        assert_eq!(cfg.observer(), DEFAULT_OBSERVER_EMAIL);

        let cfg = MailConfig::new(
            Some("era@example.test".into()),
            Some("secret".into()),
            Some("smtp.example.test".into()),
            Some("observer@example.test".into()),
        );
        assert_eq!(cfg.credentials().map(|c| c.user.as_str()), Some("era@example.test"));
        assert_eq!(cfg.observer(), "observer@example.test");
    }

    #[test]
    fn era_config_bind_addr() {
        let provider = ProviderConfig::new(
            ProviderKind::ChatCompletions,
            None,
            None,
            None,
            Duration::from_secs(1),
        );
        let mail = MailConfig::new(None, None, None, None);
        let cfg = EraConfig::new(None, 3000, None, None, provider.clone(), mail.clone()).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        assert_eq!(cfg.upload_dir(), Path::new(DEFAULT_UPLOAD_DIR));

        assert!(EraConfig::new(Some("local host".into()), 1, None, None, provider, mail).is_err());
    }
}
