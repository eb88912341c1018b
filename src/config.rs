//! Site configuration loaded from environment variables (and `.env` via dotenvy).

use anyhow::Context;
use std::time::Duration;

pub const DEFAULT_MAC_INSTALLER_URL: &str = "/downloads/NavEye-mac.dmg";
pub const DEFAULT_WINDOWS_INSTALLER_URL: &str =
    "https://github.com/twashin-Ilahi/eye-scroll-magic/releases/download/Windows_v1/NavEye.exe";
pub const DEFAULT_STATS_STALE_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub frontend_url: String,
    /// "development", "staging" or "production"
    pub environment: String,
    pub port: u16,
    pub mac_installer_url: String,
    pub windows_installer_url: String,
    /// Directory served under `/downloads`
    pub downloads_dir: String,
    pub stats_stale_after: Duration,
    pub admin_setup_secret: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub sentry_dsn: Option<String>,
}

impl SiteConfig {
    /// Configuration with local defaults for everything except the two values
    /// that have no sensible default.
    pub fn local(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            frontend_url: "http://localhost:8080".to_string(),
            environment: "development".to_string(),
            port: 3000,
            mac_installer_url: DEFAULT_MAC_INSTALLER_URL.to_string(),
            windows_installer_url: DEFAULT_WINDOWS_INSTALLER_URL.to_string(),
            downloads_dir: "public/downloads".to_string(),
            stats_stale_after: Duration::from_secs(DEFAULT_STATS_STALE_SECS),
            admin_setup_secret: None,
            admin_email: None,
            admin_password: None,
            sentry_dsn: None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::local(required("DATABASE_URL")?, required("JWT_SECRET_KEY")?);

        if let Some(url) = optional("FRONTEND_URL") {
            config.frontend_url = url;
        }
        if let Some(environment) = optional("ENVIRONMENT") {
            config.environment = environment;
        }
        config.port = match optional("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {}", port))?,
            None if config.environment == "staging" => 3100,
            None => 3000,
        };
        if let Some(url) = optional("MAC_INSTALLER_URL") {
            config.mac_installer_url = url;
        }
        if let Some(url) = optional("WINDOWS_INSTALLER_URL") {
            config.windows_installer_url = url;
        }
        if let Some(dir) = optional("DOWNLOADS_DIR") {
            config.downloads_dir = dir;
        }
        if let Some(secs) = optional("STATS_STALE_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("STATS_STALE_SECS must be a number of seconds, got {}", secs))?;
            config.stats_stale_after = Duration::from_secs(secs);
        }
        config.admin_setup_secret = optional("ADMIN_SETUP_SECRET");
        config.admin_email = optional("ADMIN_EMAIL");
        config.admin_password = optional("ADMIN_PASSWORD");
        config.sentry_dsn = optional("SENTRY_DSN");

        Ok(config)
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{} must be set", name))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_config_uses_published_installers() {
        let config = SiteConfig::local(":memory:", "secret");
        assert_eq!(config.mac_installer_url, "/downloads/NavEye-mac.dmg");
        assert!(config.windows_installer_url.ends_with("/NavEye.exe"));
        assert_eq!(config.stats_stale_after, Duration::from_secs(30));
    }
}
