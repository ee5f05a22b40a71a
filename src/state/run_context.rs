use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Run-scoped bookkeeping shared by the fetch policy and the crawl driver
///
/// The request counter is atomic so the context can be shared behind an
/// `Arc` if sources are ever processed in parallel.
#[derive(Debug)]
pub struct RunContext {
    requests: AtomicU64,
    started_at: DateTime<Utc>,
    config_hash: String,
}

impl RunContext {
    pub fn new(config_hash: impl Into<String>) -> Self {
        Self {
            requests: AtomicU64::new(0),
            started_at: Utc::now(),
            config_hash: config_hash.into(),
        }
    }

    /// Records one issued HTTP request and returns the new total
    pub fn record_request(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Total requests issued so far in this run
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counter_starts_at_zero() {
        let ctx = RunContext::new("abc");
        assert_eq!(ctx.requests(), 0);
        assert_eq!(ctx.config_hash(), "abc");
    }

    #[test]
    fn test_record_request_increments() {
        let ctx = RunContext::default();
        assert_eq!(ctx.record_request(), 1);
        assert_eq!(ctx.record_request(), 2);
        assert_eq!(ctx.requests(), 2);
    }

    #[test]
    fn test_counter_is_shared_across_threads() {
        let ctx = Arc::new(RunContext::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        ctx.record_request();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ctx.requests(), 100);
    }
}
