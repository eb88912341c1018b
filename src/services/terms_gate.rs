use serde::{Deserialize, Serialize};
use crate::{
    models::download_models::Platform,
    services::{
        download_tracker::DownloadTracker,
        installers::{Installer, InstallerCatalog},
        site_content::{setup_guide, SetupGuide},
    },
};

/// Where the download was started from. Platform pages follow the download
/// with first-time setup instructions; the overview page does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadPage {
    #[default]
    Overview,
    PlatformPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "platform", rename_all = "snake_case")]
pub enum GateState {
    Idle,
    TermsShown(Platform),
    Recording(Platform),
    DownloadTriggered(Platform),
    FirstTimeSetupShown(Platform),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    #[error("cannot {action} while the download flow is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: GateState,
    },
}

/// What the client needs to start the file transfer itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadTicket {
    pub platform: Platform,
    pub url: String,
    pub file_name: String,
}

/// Starts the actual file transfer for an installer.
#[cfg_attr(test, mockall::automock)]
pub trait DownloadLauncher: Send + Sync {
    fn launch(&self, installer: &Installer) -> DownloadTicket;
}

/// Hands the browser a URL and file name for a synthesized anchor click.
pub struct AnchorLauncher;

impl DownloadLauncher for AnchorLauncher {
    fn launch(&self, installer: &Installer) -> DownloadTicket {
        DownloadTicket {
            platform: installer.platform,
            url: installer.url.clone(),
            file_name: installer.file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
}

/// Non-blocking toast shown after agreeing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub description: Option<&'static str>,
}

impl Notice {
    fn recorded() -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Thank you for downloading NavEye!",
            description: Some("Your download will start shortly."),
        }
    }

    fn tracking_failed() -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: "Download tracking failed, but your download should still work.",
            description: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgreeOutcome {
    pub download: DownloadTicket,
    pub recorded: bool,
    pub notice: Notice,
    pub first_time_setup: Option<SetupGuide>,
    pub state: GateState,
}

/// The terms-acceptance gate in front of a download.
///
/// `Idle → TermsShown → (cancel → Idle | agree → Recording → DownloadTriggered
/// → FirstTimeSetupShown | Idle)`. The transfer is launched whether or not
/// recording succeeded.
#[derive(Debug, Clone)]
pub struct TermsGate {
    page: DownloadPage,
    state: GateState,
}

impl TermsGate {
    pub fn new(page: DownloadPage) -> Self {
        Self {
            page,
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GateState::Idle
    }

    fn reject(&self, action: &'static str) -> GateError {
        GateError::InvalidTransition {
            action,
            state: self.state,
        }
    }

    /// User clicked a platform's download button.
    pub fn request(&mut self, platform: Platform) -> Result<(), GateError> {
        match self.state {
            GateState::Idle => {
                self.state = GateState::TermsShown(platform);
                Ok(())
            }
            _ => Err(self.reject("request a download")),
        }
    }

    /// User dismissed the terms. Nothing is recorded or downloaded.
    pub fn cancel(&mut self) -> Result<(), GateError> {
        match self.state {
            GateState::TermsShown(_) => {
                self.state = GateState::Idle;
                Ok(())
            }
            _ => Err(self.reject("cancel")),
        }
    }

    /// User accepted the terms: record, then launch regardless of the record
    /// outcome.
    pub async fn agree(
        &mut self,
        tracker: &DownloadTracker,
        installers: &InstallerCatalog,
        launcher: &dyn DownloadLauncher,
    ) -> Result<AgreeOutcome, GateError> {
        let platform = match self.state {
            GateState::TermsShown(platform) => platform,
            _ => return Err(self.reject("agree")),
        };

        self.state = GateState::Recording(platform);
        let recorded = match tracker.record(platform).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(platform = %platform, "Download tracking failed: {}", e);
                false
            }
        };

        let download = launcher.launch(installers.get(platform));
        self.state = GateState::DownloadTriggered(platform);

        let first_time_setup = match self.page {
            DownloadPage::PlatformPage => {
                self.state = GateState::FirstTimeSetupShown(platform);
                Some(setup_guide(platform))
            }
            DownloadPage::Overview => {
                self.state = GateState::Idle;
                None
            }
        };

        Ok(AgreeOutcome {
            download,
            recorded,
            notice: if recorded {
                Notice::recorded()
            } else {
                Notice::tracking_failed()
            },
            first_time_setup,
            state: self.state,
        })
    }

    /// User closed the first-time setup dialog.
    pub fn dismiss_setup(&mut self) -> Result<(), GateError> {
        match self.state {
            GateState::FirstTimeSetupShown(_) => {
                self.state = GateState::Idle;
                Ok(())
            }
            _ => Err(self.reject("dismiss setup")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::error::StoreError;
    use crate::repositories::download_store::{DownloadStore, MockDownloadStore};
    use crate::services::download_stats::StatsCache;
    use std::sync::Arc;
    use std::time::Duration;

    fn tracker_with(store: MockDownloadStore) -> DownloadTracker {
        let store: Arc<dyn DownloadStore> = Arc::new(store);
        let stats = Arc::new(StatsCache::new(store.clone(), Duration::from_secs(30)));
        DownloadTracker::new(store, stats)
    }

    fn catalog() -> InstallerCatalog {
        InstallerCatalog::from_config(&SiteConfig::local(":memory:", "secret"))
    }

    #[tokio::test]
    async fn cancel_records_nothing_and_launches_nothing() {
        let mut store = MockDownloadStore::new();
        store.expect_insert_download().never();
        let tracker = tracker_with(store);
        let mut launcher = MockDownloadLauncher::new();
        launcher.expect_launch().never();

        let mut gate = TermsGate::new(DownloadPage::PlatformPage);
        gate.request(Platform::Mac).unwrap();
        assert_eq!(gate.state(), GateState::TermsShown(Platform::Mac));
        gate.cancel().unwrap();
        assert!(gate.is_idle());

        // Agreeing after cancelling is not possible.
        assert!(gate.agree(&tracker, &catalog(), &launcher).await.is_err());
    }

    #[tokio::test]
    async fn download_launches_even_when_recording_fails() {
        let mut store = MockDownloadStore::new();
        store
            .expect_insert_download()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("network down".to_string())));
        let tracker = tracker_with(store);
        let mut launcher = MockDownloadLauncher::new();
        launcher
            .expect_launch()
            .times(1)
            .returning(|installer| AnchorLauncher.launch(installer));

        let mut gate = TermsGate::new(DownloadPage::Overview);
        gate.request(Platform::Windows).unwrap();
        let outcome = gate.agree(&tracker, &catalog(), &launcher).await.unwrap();

        assert!(!outcome.recorded);
        assert_eq!(outcome.notice.level, NoticeLevel::Warning);
        assert_eq!(outcome.download.platform, Platform::Windows);
        assert_eq!(outcome.download.file_name, "NavEye.exe");
        assert!(gate.is_idle());
    }

    #[tokio::test]
    async fn platform_page_shows_setup_before_returning_to_idle() {
        let mut store = MockDownloadStore::new();
        store
            .expect_insert_download()
            .withf(|platform| *platform == Platform::Mac)
            .times(1)
            .returning(|_| Ok(()));
        let tracker = tracker_with(store);

        let mut gate = TermsGate::new(DownloadPage::PlatformPage);
        gate.request(Platform::Mac).unwrap();
        let outcome = gate.agree(&tracker, &catalog(), &AnchorLauncher).await.unwrap();

        assert!(outcome.recorded);
        assert_eq!(outcome.notice.level, NoticeLevel::Success);
        assert_eq!(outcome.download.url, "/downloads/NavEye-mac.dmg");
        let guide = outcome.first_time_setup.expect("platform page shows setup");
        assert_eq!(guide.platform, Platform::Mac);
        assert_eq!(gate.state(), GateState::FirstTimeSetupShown(Platform::Mac));

        gate.dismiss_setup().unwrap();
        assert!(gate.is_idle());

        // The gate is reusable for another platform.
        gate.request(Platform::Windows).unwrap();
        assert_eq!(gate.state(), GateState::TermsShown(Platform::Windows));
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut gate = TermsGate::new(DownloadPage::Overview);
        assert_eq!(
            gate.cancel(),
            Err(GateError::InvalidTransition {
                action: "cancel",
                state: GateState::Idle
            })
        );
        assert!(gate.dismiss_setup().is_err());

        gate.request(Platform::Mac).unwrap();
        assert!(gate.request(Platform::Windows).is_err());
        assert_eq!(gate.state(), GateState::TermsShown(Platform::Mac));
    }
}
