//! External service adapters for text, image, and video generation.
//!
//! Each external capability is one narrow async trait ([`text::TextGenerator`],
//! [`media::ImageGenerator`], [`media::VideoGenerator`]); one concrete adapter
//! per provider implements it over HTTP. Stage executors depend only on the
//! traits, so providers can be substituted without touching orchestration.
//!
//! Transient network-class failures are retried here, with bounded
//! exponential backoff ([`retry`]). This is the only retry layer in the
//! system.

pub mod error;
pub mod media;
pub mod retry;
pub mod text;
