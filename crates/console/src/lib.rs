//! Orchestration layer of the script control surface.
//!
//! [`state::Console`] composes the catalog, the sequence being built, the
//! launcher, the task monitor, the schedule manager and the notification
//! sink over one [`scriptdeck_client::ExecutionService`].

pub mod background;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod launcher;
pub mod monitor;
pub mod notifications;
pub mod schedules;
pub mod sequence;
pub mod state;
