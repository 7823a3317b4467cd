//! Resolver - orchestrates provider lookups for one query
//!
//! This is the high-level API collaborators call:
//! 1. Validate the query (empty code/title is the only `Err`)
//! 2. Pick candidate providers for the query's capability, best rank first
//! 3. For each candidate: admission check, bounded-time call, classify
//! 4. Return the first usable result, or `found = false` on exhaustion or
//!    when the overall deadline runs out
//!
//! The loop is strictly sequential: one outstanding provider call per query.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;

use super::domain::{
    Attempt, AttemptOutcome, IdentifierQuery, ProviderError, ProviderResult, Query, TextQuery,
    ValidationError,
};
use super::traits::{Capabilities, ProviderClient};
use crate::ratelimit::RateLimiter;

/// Overall budget used by [`Resolver::resolve_default`] unless configured
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(8);

/// A provider plus the policy the resolver applies to it
#[derive(Clone)]
pub struct ProviderEntry {
    pub client: Arc<dyn ProviderClient>,
    /// Token bucket key (usually the provider id)
    pub rate_key: String,
    /// Lower ranks are tried first
    pub rank: u32,
    /// Per-call budget, further capped by the overall deadline
    pub timeout: Duration,
}

impl ProviderEntry {
    pub fn new(client: Arc<dyn ProviderClient>, rank: u32, timeout: Duration) -> Self {
        Self {
            rate_key: client.id().to_string(),
            client,
            rank,
            timeout,
        }
    }

    pub fn with_rate_key(mut self, rate_key: impl Into<String>) -> Self {
        self.rate_key = rate_key.into();
        self
    }

    pub fn id(&self) -> &str {
        self.client.id()
    }

    /// Whether this provider can answer `query` at all
    pub fn supports(&self, query: &Query) -> bool {
        let client = &self.client;
        match query {
            Query::Identifier(q) => {
                client.capabilities().contains(Capabilities::IDENTIFIER)
                    && client.accepts_code(q.code_kind)
            }
            Query::Text(q) => {
                client.capabilities().contains(Capabilities::TEXT)
                    && q.kind.is_none_or(|kind| client.media_kinds().contains(&kind))
            }
        }
    }
}

/// How a resolution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStatus {
    Found,
    /// Every candidate was tried (or skipped) without a usable result
    NotFound,
    /// The overall deadline ran out; remaining candidates were abandoned
    DeadlineExceeded,
}

/// Outcome of a resolution: the result (if any) plus the attempt log
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub result: Option<ProviderResult>,
    pub status: ResolutionStatus,
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    pub fn found(&self) -> bool {
        self.status == ResolutionStatus::Found
    }
}

/// Sequential first-success-wins resolver over ranked providers
pub struct Resolver {
    providers: Vec<ProviderEntry>,
    limiter: Arc<RateLimiter>,
    default_deadline: Duration,
}

impl Resolver {
    /// Create a resolver with no providers
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self {
            providers: Vec::new(),
            limiter,
            default_deadline: DEFAULT_DEADLINE,
        }
    }

    /// Add a provider. Order is kept by (rank, id) so equal ranks resolve
    /// deterministically.
    pub fn with_provider(mut self, entry: ProviderEntry) -> Self {
        self.providers.push(entry);
        self.providers
            .sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id().cmp(b.id())));
        self
    }

    pub fn with_default_deadline(mut self, deadline: Duration) -> Self {
        self.default_deadline = deadline;
        self
    }

    /// Providers in the order they will be tried
    pub fn providers(&self) -> &[ProviderEntry] {
        &self.providers
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn default_deadline(&self) -> Duration {
        self.default_deadline
    }

    /// Providers that will be consulted for `query`, in order
    pub fn candidates(&self, query: &Query) -> Vec<&ProviderEntry> {
        self.providers.iter().filter(|p| p.supports(query)).collect()
    }

    /// Resolve a scanned barcode within `deadline`
    pub async fn resolve_by_identifier(
        &self,
        code: &str,
        deadline: Duration,
    ) -> Result<Resolution, ValidationError> {
        let query = Query::Identifier(IdentifierQuery::new(code)?);
        self.resolve(&query, deadline).await
    }

    /// Resolve a title (plus hints) within `deadline`
    pub async fn resolve_by_text(
        &self,
        query: TextQuery,
        deadline: Duration,
    ) -> Result<Resolution, ValidationError> {
        self.resolve(&Query::Text(query), deadline).await
    }

    /// Resolve with the configured default deadline
    pub async fn resolve_default(&self, query: &Query) -> Result<Resolution, ValidationError> {
        self.resolve(query, self.default_deadline).await
    }

    /// Resolve any query within `deadline`.
    ///
    /// Only malformed input is an `Err`. Provider failures are logged in the
    /// attempt list and drive fallback to the next candidate.
    pub async fn resolve(
        &self,
        query: &Query,
        deadline: Duration,
    ) -> Result<Resolution, ValidationError> {
        query.validate()?;

        let overall_deadline = Instant::now() + deadline;
        let candidates = self.candidates(query);
        let mut attempts = Vec::with_capacity(candidates.len());
        let mut status = ResolutionStatus::NotFound;

        tracing::debug!(
            candidates = candidates.len(),
            deadline_ms = deadline.as_millis() as u64,
            "Resolving query"
        );

        for entry in candidates {
            if Instant::now() >= overall_deadline {
                status = ResolutionStatus::DeadlineExceeded;
                break;
            }

            let started_at = Utc::now();
            let start = Instant::now();

            // Never wait for tokens: skipping keeps the deadline predictable
            if !self.limiter.allow(&entry.rate_key) {
                tracing::debug!(provider = entry.id(), "Admission denied by local rate limiter");
                attempts.push(record(entry, started_at, Duration::ZERO, AttemptOutcome::AdmissionDenied));
                continue;
            }

            let call_deadline = (start + entry.timeout).min(overall_deadline);
            let outcome = tokio::time::timeout_at(call_deadline, lookup(entry.client.as_ref(), query))
                .await
                .unwrap_or(Err(ProviderError::Timeout));
            let elapsed = start.elapsed();

            match outcome {
                Ok(mut result) => {
                    result.source = entry.id().to_string();
                    result.normalize();
                    if !result.is_usable() {
                        tracing::warn!(provider = entry.id(), "Provider returned no usable fields");
                        attempts.push(record(entry, started_at, elapsed, AttemptOutcome::NotFound));
                        continue;
                    }

                    attempts.push(record(entry, started_at, elapsed, AttemptOutcome::Success));
                    tracing::info!(
                        provider = entry.id(),
                        confidence = %result.confidence,
                        attempts = attempts.len(),
                        "Resolved metadata"
                    );
                    return Ok(Resolution {
                        result: Some(result),
                        status: ResolutionStatus::Found,
                        attempts,
                    });
                }
                Err(err) => {
                    if matches!(err, ProviderError::NotFound) {
                        tracing::debug!(provider = entry.id(), "No match");
                    } else {
                        tracing::warn!(provider = entry.id(), error = %err, "Provider lookup failed");
                    }
                    attempts.push(record(entry, started_at, elapsed, err.outcome()));
                }
            }
        }

        if status == ResolutionStatus::NotFound && Instant::now() >= overall_deadline && !attempts.is_empty() {
            // The last call consumed what was left of the budget
            status = ResolutionStatus::DeadlineExceeded;
        }

        tracing::info!(
            status = ?status,
            attempts = attempts.len(),
            "No metadata found"
        );
        Ok(Resolution {
            result: None,
            status,
            attempts,
        })
    }
}

/// Dispatch to the lookup matching the query's capability
async fn lookup(client: &dyn ProviderClient, query: &Query) -> Result<ProviderResult, ProviderError> {
    match query {
        Query::Identifier(q) => client.lookup_by_identifier(q).await,
        Query::Text(q) => client.lookup_by_text(q).await,
    }
}

/// Build an attempt record and emit it as a structured event
fn record(
    entry: &ProviderEntry,
    started_at: chrono::DateTime<Utc>,
    duration: Duration,
    outcome: AttemptOutcome,
) -> Attempt {
    tracing::debug!(
        provider = entry.id(),
        outcome = outcome.as_str(),
        latency_ms = duration.as_millis() as u64,
        "Provider attempt"
    );
    Attempt {
        provider: entry.id().to_string(),
        started_at,
        duration,
        outcome,
    }
}
