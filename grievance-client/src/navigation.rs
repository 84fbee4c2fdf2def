//! Navigation surface
//!
//! The routing library is an external collaborator; the client only needs to
//! ask it to move somewhere.

use std::sync::RwLock;
use tracing::debug;

/// Something that can move the user to a route
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);

    /// Route currently shown, if known
    fn current(&self) -> Option<String>;
}

/// Navigator that keeps the full path history.
///
/// Stands in for the browser history in the CLI and in tests.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: RwLock<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `path` without recording a navigation event
    pub fn starting_at(path: &str) -> Self {
        Self {
            history: RwLock::new(vec![path.to_string()]),
        }
    }

    /// Every route visited, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        debug!(path, "Navigating");
        if let Ok(mut history) = self.history.write() {
            history.push(path.to_string());
        }
    }

    fn current(&self) -> Option<String> {
        self.history
            .read()
            .ok()
            .and_then(|history| history.last().cloned())
    }
}
