//! Smart router client - session and request-lifecycle orchestration for a
//! System 1 / System 2 LLM query router
//!
//! This library talks to the router backend's `/route`, `/health` and `/metrics`
//! endpoints and keeps the client-side state around them: a single-flight,
//! last-submission-wins request controller, a persisted session transcript, background
//! health polling, a metrics snapshot and auto-expiring notifications.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod notify;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ClientError, RouterClient};
