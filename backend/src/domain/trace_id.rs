//! Correlation identifier carried by each request.
//!
//! The id lives in a tokio task-local for the duration of a request, so
//! [`super::Error`] values can pick it up wherever they are built. Spawned
//! tasks do not inherit it; re-enter with [`TraceId::scope`] when needed.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Header used both to accept an upstream id and to echo the id back.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// UUID naming one request across logs, error bodies and response headers.
///
/// ```
/// use marketplace::TraceId;
///
/// let upstream = "7d0f3a52-4a2e-4d1b-9a55-0c7e4b2f6a10";
/// assert_eq!(TraceId::accept_or_generate(Some(upstream)).to_string(), upstream);
/// assert_ne!(TraceId::accept_or_generate(Some("not-a-uuid")).to_string(), "not-a-uuid");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a well-formed upstream id, otherwise start a new one.
    #[must_use]
    pub fn accept_or_generate(upstream: Option<&str>) -> Self {
        upstream
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// The id of the request being handled, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` as the current id.
    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw).map(Self)
    }
}
