//! HTTP request boundary for the comic generation service.
//!
//! Exposes generation submission, status polling, artifact download, job
//! listing/deletion, and health. The boundary validates requests, creates
//! jobs in the registry, and schedules pipeline runs without blocking the
//! response; all later observation happens through status polling.

pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
