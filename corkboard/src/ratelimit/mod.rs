//! Sliding-window request-rate governor
//!
//! [`RateGovernor`] guards mutation entry points with a per-key sliding
//! window: timestamps older than the window are pruned on every check, and a
//! request is admitted while fewer than `capacity` remain. Keys combine a
//! route with a subject (an authenticated user id, or a fingerprint of
//! client IP plus truncated user-agent). The table is process-local shared
//! state, constructed once per process and injected into handlers; running N
//! instances yields up to N times the nominal capacity, an accepted scaling
//! limitation. Buckets are garbage-collected opportunistically once the
//! table crosses a size threshold, so no background timer is needed.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::debug;

/// How much of the user-agent string participates in the anonymous
/// fingerprint
const USER_AGENT_FINGERPRINT_LEN: usize = 64;

/// Window and capacity for one governed route
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RatePolicy {
    /// Trailing interval the capacity applies to
    #[serde(with = "humantime_serde")]
    pub window: Duration,

    /// Requests admitted per subject within the window
    pub capacity: u32,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            capacity: 30,
        }
    }
}

/// Who a request is counted against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateSubject {
    /// An authenticated user
    User(String),
    /// An unauthenticated client, identified by fingerprint
    Anonymous(String),
}

impl RateSubject {
    /// Subject for an authenticated user id
    pub fn user(id: impl Into<String>) -> Self {
        RateSubject::User(id.into())
    }

    /// Subject for an unauthenticated client: a fingerprint of the client
    /// IP and a truncated user-agent string
    pub fn anonymous(client_ip: &str, user_agent: &str) -> Self {
        let truncated: String = user_agent.chars().take(USER_AGENT_FINGERPRINT_LEN).collect();
        let mut hasher = Sha256::new();
        hasher.update(client_ip.as_bytes());
        hasher.update(b"\n");
        hasher.update(truncated.as_bytes());
        let digest = hasher.finalize();

        let mut fingerprint = String::with_capacity(32);
        for byte in digest.iter().take(16) {
            let _ = write!(fingerprint, "{byte:02x}");
        }
        RateSubject::Anonymous(fingerprint)
    }

    fn key(&self) -> String {
        match self {
            RateSubject::User(id) => format!("user:{id}"),
            RateSubject::Anonymous(fingerprint) => format!("anon:{fingerprint}"),
        }
    }
}

/// Outcome of a rate check, carrying everything the response headers need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request was admitted
    pub allowed: bool,

    /// The capacity of the window
    pub limit: u32,

    /// Admissions left in the window after this check
    pub remaining: u32,

    /// Epoch seconds at which the oldest counted request leaves the window
    pub reset_at: i64,

    /// Seconds until a retry can succeed; only set on denials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

#[derive(Debug)]
struct Bucket {
    window: Duration,
    stamps: Vec<Instant>,
}

/// Process-local sliding-window limiter keyed by route and subject
#[derive(Debug)]
pub struct RateGovernor {
    buckets: DashMap<String, Bucket>,
    sweep_threshold: usize,
}

impl RateGovernor {
    /// Create a governor that sweeps dead buckets once the table holds more
    /// than `sweep_threshold` entries
    pub fn new(sweep_threshold: usize) -> Self {
        Self {
            buckets: DashMap::new(),
            sweep_threshold,
        }
    }

    /// Check and count a request for `subject` against `route_key`'s policy
    pub fn check(&self, route_key: &str, policy: &RatePolicy, subject: &RateSubject) -> RateDecision {
        let key = format!("{route_key}:{}", subject.key());
        let now = Instant::now();

        let decision = {
            let mut bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
                window: policy.window,
                stamps: Vec::new(),
            });
            bucket.window = policy.window;
            bucket
                .stamps
                .retain(|stamp| now.duration_since(*stamp) < policy.window);

            if (bucket.stamps.len() as u32) < policy.capacity {
                bucket.stamps.push(now);
                let oldest = bucket.stamps[0];
                RateDecision {
                    allowed: true,
                    limit: policy.capacity,
                    remaining: policy.capacity - bucket.stamps.len() as u32,
                    reset_at: reset_epoch(oldest, now, policy.window),
                    retry_after_secs: None,
                }
            } else {
                let oldest = bucket.stamps[0];
                RateDecision {
                    allowed: false,
                    limit: policy.capacity,
                    remaining: 0,
                    reset_at: reset_epoch(oldest, now, policy.window),
                    retry_after_secs: Some(secs_until_free(oldest, now, policy.window)),
                }
            }
        };

        if self.buckets.len() > self.sweep_threshold {
            self.sweep(now);
        }

        decision
    }

    /// Drop every bucket with no timestamp left inside its window
    fn sweep(&self, now: Instant) {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| {
            bucket
                .stamps
                .iter()
                .any(|stamp| now.duration_since(*stamp) < bucket.window)
        });
        debug!(swept = before - self.buckets.len(), "swept idle rate buckets");
    }

    /// Number of live buckets, for metrics and tests
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Epoch seconds when `oldest` exits the window
fn reset_epoch(oldest: Instant, now: Instant, window: Duration) -> i64 {
    let remaining = window.saturating_sub(now.duration_since(oldest));
    Utc::now().timestamp() + remaining.as_secs() as i64
}

/// Whole seconds until `oldest` exits the window, rounded up, at least 1
fn secs_until_free(oldest: Instant, now: Instant, window: Duration) -> u64 {
    let remaining = window.saturating_sub(now.duration_since(oldest));
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(window_secs: u64, capacity: u32) -> RatePolicy {
        RatePolicy {
            window: Duration::from_secs(window_secs),
            capacity,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sixth_request_denied_then_window_reopens() {
        let governor = RateGovernor::new(1024);
        let subject = RateSubject::user("alice");
        let policy = policy(60, 5);

        for i in 0..5 {
            let decision = governor.check("friends:send", &policy, &subject);
            assert!(decision.allowed, "request {i} should be admitted");
            assert_eq!(decision.remaining, 4 - i);
        }

        let denied = governor.check("friends:send", &policy, &subject);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.limit, 5);
        assert!(denied.retry_after_secs.unwrap() >= 1);

        tokio::time::advance(Duration::from_secs(61)).await;

        let reopened = governor.check("friends:send", &policy, &subject);
        assert!(reopened.allowed);
        assert_eq!(reopened.remaining, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides_rather_than_resetting() {
        let governor = RateGovernor::new(1024);
        let subject = RateSubject::user("alice");
        let policy = policy(60, 2);

        governor.check("k", &policy, &subject);
        tokio::time::advance(Duration::from_secs(40)).await;
        governor.check("k", &policy, &subject);

        // 20s later the first stamp has aged out but the second has not
        tokio::time::advance(Duration::from_secs(21)).await;
        let decision = governor.check("k", &policy, &subject);
        assert!(decision.allowed);

        let denied = governor.check("k", &policy, &subject);
        assert!(!denied.allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn subjects_and_routes_are_isolated() {
        let governor = RateGovernor::new(1024);
        let policy = policy(60, 1);

        assert!(governor.check("send", &policy, &RateSubject::user("a")).allowed);
        assert!(!governor.check("send", &policy, &RateSubject::user("a")).allowed);
        assert!(governor.check("send", &policy, &RateSubject::user("b")).allowed);
        assert!(governor.check("decline", &policy, &RateSubject::user("a")).allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_drops_idle_buckets_past_threshold() {
        let governor = RateGovernor::new(3);
        let policy = policy(10, 5);

        for i in 0..4 {
            governor.check("k", &policy, &RateSubject::user(format!("u{i}")));
        }
        assert_eq!(governor.bucket_count(), 4);

        tokio::time::advance(Duration::from_secs(11)).await;
        // The check that pushes the table past the threshold also sweeps it
        governor.check("k", &policy, &RateSubject::user("fresh"));
        assert!(governor.bucket_count() <= 2);
    }

    #[test]
    fn anonymous_fingerprint_is_stable_and_truncates_user_agent() {
        let long_agent = "agent/".repeat(50);
        let a = RateSubject::anonymous("10.0.0.1", &long_agent);
        let b = RateSubject::anonymous("10.0.0.1", &long_agent);
        assert_eq!(a, b);

        let other_ip = RateSubject::anonymous("10.0.0.2", &long_agent);
        assert_ne!(a, other_ip);

        // Differences past the truncation point do not change the subject
        let mut mutated = long_agent.clone();
        mutated.push('x');
        assert_eq!(a, RateSubject::anonymous("10.0.0.1", &mutated));
    }
}
