//! # actio-std
//!
//! The dispatcher and standard host pieces for actio.
//!
//! This crate provides:
//! - **Dispatcher**: [`Action`], with its work-phase records ([`WorkRecord`])
//! - **Construction**: [`ActionBuilder`], [`ActionConfig`]
//! - **Schedulers**: [`LooperScheduler`], [`QueueScheduler`] and, with the
//!   `async` feature, `AsyncScheduler`
//! - **Testing**: recording doubles in [`testing`]

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
#[allow(clippy::pub_use)]
pub use actio_core;

mod action;
mod builder;
mod config;
mod work;

pub mod scheduler;
pub mod testing;

#[allow(clippy::pub_use)]
pub use action::Action;
#[allow(clippy::pub_use)]
pub use builder::ActionBuilder;
#[allow(clippy::pub_use)]
pub use config::ActionConfig;
#[allow(clippy::pub_use)]
pub use scheduler::{LooperScheduler, QueueScheduler};
#[allow(clippy::pub_use)]
pub use work::WorkRecord;

#[cfg(feature = "async")]
#[allow(clippy::pub_use)]
pub use scheduler::{AsyncScheduler, SchedulerLoop};
