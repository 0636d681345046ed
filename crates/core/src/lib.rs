//! Domain types and pure state machines for the scriptdeck control surface.
//!
//! This crate has zero internal deps so it can be shared by the HTTP
//! client, the orchestration layer, and any future front end.

pub mod detail;
pub mod error;
pub mod notification;
pub mod schedule;
pub mod sequence;
pub mod task;
pub mod types;
