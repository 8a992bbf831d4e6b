//! Verification gate: derives how protected content is presented from the
//! current session alone. It makes no network calls and keeps no state
//! beyond its subscription to the session store.

use super::session::{Session, SessionStore};
use std::sync::Arc;
use tokio::sync::watch;

/// Prompt shown over blocked content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationOverlay {
    pub email: String,
}

impl VerificationOverlay {
    #[must_use]
    pub fn title(&self) -> &'static str {
        "Verify your email"
    }

    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "We sent a verification link to {}. Please verify your email to access the dashboard.",
            self.email
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateView {
    Unrestricted,
    Blocked(VerificationOverlay),
}

/// Rendering hints for the UI layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    pub blurred: bool,
    pub pointer_events: bool,
    pub overlay: Option<VerificationOverlay>,
}

impl GateView {
    /// Anonymous visitors and verified users see content as is; a signed-in
    /// user whose email is not verified is blocked behind the overlay.
    #[must_use]
    pub fn evaluate(session: &Session) -> Self {
        match session.user() {
            Some(user) if !user.email_verified => Self::Blocked(VerificationOverlay {
                email: user.email.clone(),
            }),
            _ => Self::Unrestricted,
        }
    }

    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    #[must_use]
    pub fn presentation(&self) -> Presentation {
        match self {
            Self::Unrestricted => Presentation {
                blurred: false,
                pointer_events: true,
                overlay: None,
            },
            Self::Blocked(overlay) => Presentation {
                blurred: true,
                pointer_events: false,
                overlay: Some(overlay.clone()),
            },
        }
    }
}

/// Follows the session store and re-derives the view on every change.
#[derive(Debug)]
pub struct VerificationGate {
    rx: watch::Receiver<Arc<Session>>,
}

impl VerificationGate {
    #[must_use]
    pub fn new(store: &SessionStore) -> Self {
        Self {
            rx: store.subscribe(),
        }
    }

    #[must_use]
    pub fn current(&self) -> GateView {
        GateView::evaluate(&self.rx.borrow())
    }

    /// Waits for the next session replacement and returns the new view, or
    /// `None` once every store handle is gone.
    pub async fn changed(&mut self) -> Option<GateView> {
        self.rx.changed().await.ok()?;
        Some(GateView::evaluate(&self.rx.borrow_and_update()))
    }
}
