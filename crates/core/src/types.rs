//! Shared primitive type aliases.

/// Unique job identifier (UUID v4, assigned at creation).
pub type JobId = uuid::Uuid;

/// UTC timestamp type used across all entities.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
