#![allow(dead_code)]

use std::{sync::OnceLock, time::Duration};

pub const WAIT: Duration = Duration::from_secs(5);

/// Installs a test subscriber once; filter with `RUST_LOG`.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Test Interfaces
// ============================================================================

#[actio::interface]
pub trait Clickable: Send + Sync {
    fn on_click(&self, x: i32, y: i32) -> bool;
    fn on_hover(&self, label: &str);
}

#[actio::interface(name = "Selection")]
pub trait Selectable: Send + Sync {
    fn on_select(&self, index: usize) -> Option<String>;
}
