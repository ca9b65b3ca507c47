//! Stage executors, one module per pipeline stage.
//!
//! Each stage is a pure async transformation from the previous stage's
//! payload (plus the job input and provider handles) to its own typed
//! output, failing with a [`StageError`](crate::stage::StageError).

pub mod assembly;
pub mod ingest;
pub mod script;
pub mod story;
pub mod text;
pub mod video;
pub mod visual;

use std::future::Future;
use std::time::Duration;

use inkforge_providers::error::ProviderError;
use inkforge_providers::media::FetchStatus;

use crate::stage::StageError;

/// Poll a pending media request until it resolves.
///
/// Shared by the visual and video stages. `what` names the work in error
/// messages (e.g. `"Panel 3 clip"`). A provider-reported failure maps to a
/// generation error; expiry of `timeout` maps to a timeout error.
pub(crate) async fn poll_until_ready<F, Fut>(
    mut fetch: F,
    interval: Duration,
    timeout: Duration,
    what: &str,
) -> Result<String, StageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<FetchStatus, ProviderError>>,
{
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match fetch().await? {
            FetchStatus::Ready(url) => return Ok(url),
            FetchStatus::Failed(message) => {
                return Err(StageError::generation(format!(
                    "{what} failed at provider: {message}"
                )));
            }
            FetchStatus::Processing => {}
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(StageError::timeout(format!(
                "{what} did not resolve within {}s",
                timeout.as_secs()
            )));
        }

        tokio::time::sleep(interval).await;
    }
}
