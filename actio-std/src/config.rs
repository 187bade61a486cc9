//! Action configuration.
//!
//! Every field has a default, so an `ActionConfig` can be embedded in a host's
//! own configuration file and only override what it needs.

use serde::{Deserialize, Serialize};

/// Tunables of an [`Action`](crate::Action).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Whether accepted calls start a work phase. Toggled later with
    /// [`Action::set_run_work`](crate::Action::set_run_work).
    pub run_work: bool,
    /// Name prefix of work threads; the work id is appended.
    pub worker_name: String,
    /// Stack size of work threads, platform default when unset.
    pub worker_stack_size: Option<usize>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            run_work: true,
            worker_name: "actio-work".to_string(),
            worker_stack_size: None,
        }
    }
}

impl ActionConfig {
    /// Sets [`run_work`](Self::run_work).
    pub fn run_work(mut self, run: bool) -> Self {
        self.run_work = run;
        self
    }

    /// Sets [`worker_name`](Self::worker_name).
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Sets [`worker_stack_size`](Self::worker_stack_size).
    pub fn worker_stack_size(mut self, size: usize) -> Self {
        self.worker_stack_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_keep_defaults() {
        let config: ActionConfig = serde_json::from_str(r#"{ "worker_name": "ui-work" }"#).unwrap();
        assert!(config.run_work);
        assert_eq!(config.worker_name, "ui-work");
        assert_eq!(config.worker_stack_size, None);
    }

    #[test]
    fn round_trips_through_json() {
        let config = ActionConfig::default()
            .run_work(false)
            .worker_stack_size(256 * 1024);
        let json = serde_json::to_string(&config).unwrap();
        let back: ActionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
