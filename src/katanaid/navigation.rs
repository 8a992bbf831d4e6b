//! Navigation signals emitted by the core for the embedding UI. The core never
//! routes by itself; it only tells the UI where to go.

use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Send the user to the login entry point.
    Login { path: String },
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Navigation);
}

/// Forwards navigation events over an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Navigation>,
}

impl ChannelNavigator {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, to: Navigation) {
        if self.tx.send(to).is_err() {
            warn!("navigation receiver dropped");
        }
    }
}

/// Logs navigation requests and does nothing else. Used by the CLI.
#[derive(Clone, Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, to: Navigation) {
        debug!(?to, "navigation requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_navigator_delivers_events() {
        let (navigator, mut rx) = ChannelNavigator::new();
        navigator.navigate(Navigation::Login {
            path: "/login".to_string(),
        });
        assert_eq!(
            rx.try_recv().ok(),
            Some(Navigation::Login {
                path: "/login".to_string()
            })
        );
    }

    #[test]
    fn channel_navigator_survives_dropped_receiver() {
        let (navigator, rx) = ChannelNavigator::new();
        drop(rx);
        navigator.navigate(Navigation::Login {
            path: "/login".to_string(),
        });
    }
}
