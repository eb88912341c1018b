use serde::Serialize;
use crate::config::SiteConfig;
use crate::models::download_models::Platform;

const FALLBACK_FILE_NAME: &str = "NavEye";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Installer {
    pub platform: Platform,
    pub name: &'static str,
    pub version: &'static str,
    pub size: &'static str,
    pub url: String,
    pub file_name: String,
    pub requirements: Vec<&'static str>,
}

/// Installer descriptors for every supported platform.
#[derive(Debug, Clone)]
pub struct InstallerCatalog {
    mac: Installer,
    windows: Installer,
}

impl InstallerCatalog {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            mac: Installer {
                platform: Platform::Mac,
                name: Platform::Mac.display_name(),
                version: "1.0.0",
                size: "~210 MB",
                file_name: file_name_from_url(&config.mac_installer_url),
                url: config.mac_installer_url.clone(),
                requirements: vec![
                    "macOS 12 Monterey or later",
                    "Apple Silicon or Intel processor",
                    "Built-in or external webcam",
                ],
            },
            windows: Installer {
                platform: Platform::Windows,
                name: Platform::Windows.display_name(),
                version: "1.0.0",
                size: "~210 MB",
                file_name: file_name_from_url(&config.windows_installer_url),
                url: config.windows_installer_url.clone(),
                requirements: vec![
                    "Windows 10 or Windows 11",
                    "64-bit processor",
                    "Built-in or external webcam",
                ],
            },
        }
    }

    pub fn get(&self, platform: Platform) -> &Installer {
        match platform {
            Platform::Mac => &self.mac,
            Platform::Windows => &self.windows,
        }
    }

    pub fn all(&self) -> Vec<&Installer> {
        Platform::ALL.iter().map(|p| self.get(*p)).collect()
    }
}

/// Name the browser saves the file under: the last path segment of the URL.
pub fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or("");
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => FALLBACK_FILE_NAME.to_string(),
    }
}
