use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// SMTP relay settings for booking/contact notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub from_address: String,
    /// Recipient of the admin alert for every new booking/contact.
    #[serde(default)]
    pub admin_address: String,
}

fn default_true() -> bool { true }
fn default_smtp_port() -> u16 { 587 }

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_address: String::new(),
            admin_address: String::new(),
        }
    }
}

/// Identity provider settings. ID tokens are HS256 signed with the client secret.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub issuer: Option<String>,
    /// Accounts that receive the admin role the first time they sign in.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

fn env_or(key: &str, current: &mut String) {
    if current.trim().is_empty() {
        if let Ok(v) = std::env::var(key) {
            *current = v;
        }
    }
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build a configuration purely from environment variables, used when no
    /// TOML file is present.
    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if let Some(port) = std::env::var("SMTP_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.mail.port = port;
        }
        if let Ok(fmt) = std::env::var("LOG_FORMAT") {
            if fmt.eq_ignore_ascii_case("json") {
                cfg.logging.format = LogFormat::Json;
            }
        }
        cfg.fill_from_env();
        cfg
    }

    /// Load `config.toml` (or `CONFIG_PATH`), falling back to the environment
    /// when the file is missing, then validate.
    pub fn load_or_env() -> Result<Self> {
        Self::load_path_or_env(&config_path())
    }

    /// Only a missing file falls back to the environment; an unreadable or
    /// malformed one is an error.
    pub fn load_path_or_env(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => Self::from_env(),
            Err(e) => return Err(e.context(format!("failed to load {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    fn fill_from_env(&mut self) {
        self.database.normalize_from_env();
        env_or("SMTP_HOST", &mut self.mail.host);
        env_or("SMTP_USERNAME", &mut self.mail.username);
        env_or("SMTP_PASSWORD", &mut self.mail.password);
        env_or("MAIL_FROM", &mut self.mail.from_address);
        env_or("ADMIN_EMAIL", &mut self.mail.admin_address);
        env_or("AUTH_CLIENT_ID", &mut self.auth.client_id);
        env_or("AUTH_CLIENT_SECRET", &mut self.auth.client_secret);
        if self.auth.issuer.is_none() {
            self.auth.issuer = std::env::var("AUTH_ISSUER").ok().filter(|s| !s.trim().is_empty());
        }
        if self.auth.admin_emails.is_empty() {
            if let Ok(list) = std::env::var("ADMIN_EMAILS") {
                self.auth.admin_emails = list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.fill_from_env();
        self.database.validate()?;
        self.mail.normalize();
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl MailConfig {
    /// Mail is considered active only with a relay host and both addresses.
    pub fn is_active(&self) -> bool {
        self.enabled
            && !self.host.trim().is_empty()
            && !self.from_address.trim().is_empty()
            && !self.admin_address.trim().is_empty()
    }

    fn normalize(&mut self) {
        if self.port == 0 {
            self.port = default_smtp_port();
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.client_secret.trim().is_empty() {
            return Err(anyhow!("auth.client_secret is empty; set it in config.toml or AUTH_CLIENT_SECRET"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("tempfile");
        f.write_all(body.as_bytes()).expect("write");
        f
    }

    #[test]
    fn parses_full_file() {
        let f = write_config(
            r#"
[server]
host = "0.0.0.0"
port = 9000

[database]
url = "postgres://u:p@localhost/movedesk"
max_connections = 5
min_connections = 1

[mail]
host = "smtp.example.com"
port = 2525
from_address = "bookings@example.com"
admin_address = "office@example.com"

[auth]
client_id = "web"
client_secret = "shh"
admin_emails = ["owner@example.com"]

[logging]
format = "json"
"#,
        );
        let mut cfg = load_from_file(f.path().to_str().unwrap()).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.mail.port, 2525);
        assert!(cfg.mail.is_active());
        assert_eq!(cfg.auth.admin_emails, vec!["owner@example.com".to_string()]);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let f = write_config("[database\nurl = \"postgres://u:p@localhost/movedesk\"\n");
        let err = AppConfig::load_path_or_env(f.path().to_str().unwrap()).unwrap_err();
        assert!(!is_missing_file(&err));
        assert!(err.to_string().contains("failed to load"));
    }

    #[test]
    fn only_a_missing_file_counts_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("config.toml");
        let err = load_from_file(missing.to_str().unwrap()).unwrap_err();
        assert!(is_missing_file(&err));

        let f = write_config("port = [");
        let err = load_from_file(f.path().to_str().unwrap()).unwrap_err();
        assert!(!is_missing_file(&err));
    }

    #[test]
    fn rejects_unsupported_database_scheme() {
        let db = DatabaseConfig { url: "mysql://localhost/x".into(), ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let db = DatabaseConfig {
            url: "postgres://localhost/x".into(),
            max_connections: 1,
            min_connections: 3,
            ..Default::default()
        };
        assert!(db.validate().is_err());
    }

    #[test]
    fn sqlite_url_is_accepted() {
        let db = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
        assert!(db.validate().is_ok());
    }

    #[test]
    fn mail_inactive_without_host() {
        let mail = MailConfig { from_address: "a@b.co".into(), admin_address: "c@d.co".into(), ..Default::default() };
        assert!(!mail.is_active());
    }

    #[test]
    fn auth_requires_secret() {
        assert!(AuthConfig::default().validate().is_err());
        let auth = AuthConfig { client_secret: "k".into(), ..Default::default() };
        assert!(auth.validate().is_ok());
    }
}
