//! Modal dialog state

use lyra_core::types::{ReportId, ReportType, UserId};
use tokio::sync::watch;
use tracing::debug;

/// Every dialog the client can open, with the data it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Edit the signed-in user's profile
    Profile,
    CreateAlbum,
    /// File a report against a document
    Report {
        kind: ReportType,
        target_id: String,
        target_user: UserId,
    },
    /// Resolve or reject a pending report (admins)
    ReportAction { report: ReportId },
    /// Start a conversation with another user
    StartMessage { user: UserId },
}

impl Modal {
    pub fn name(&self) -> &'static str {
        match self {
            Modal::Profile => "profile",
            Modal::CreateAlbum => "createAlbum",
            Modal::Report { .. } => "report",
            Modal::ReportAction { .. } => "reportAction",
            Modal::StartMessage { .. } => "startMessage",
        }
    }

    /// Whether only admins may open this dialog
    pub fn requires_admin(&self) -> bool {
        matches!(self, Modal::ReportAction { .. })
    }
}

/// At most one open modal
pub struct ModalStore {
    current: watch::Sender<Option<Modal>>,
}

impl ModalStore {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// Open `modal`, replacing whatever was open
    pub fn open(&self, modal: Modal) {
        debug!(modal = modal.name(), "Opening modal");
        self.current.send_replace(Some(modal));
    }

    pub fn close(&self) {
        self.current.send_replace(None);
    }

    pub fn current(&self) -> Option<Modal> {
        self.current.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn watch(&self) -> watch::Receiver<Option<Modal>> {
        self.current.subscribe()
    }
}

impl Default for ModalStore {
    fn default() -> Self {
        Self::new()
    }
}
