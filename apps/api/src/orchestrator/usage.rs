//! Per-provider usage accounting. Counters live for the process lifetime
//! and are mutated by concurrent pipeline calls, so all access goes
//! through one mutex-guarded map.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::providers::ProviderId;

/// Running totals for one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageCounter {
    pub requests: u64,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Default)]
pub struct UsageTracker {
    counters: Mutex<HashMap<ProviderId, UsageCounter>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful invocation against a provider.
    pub fn record(&self, provider: ProviderId, tokens_used: u32, cost: f64) {
        let mut counters = self.counters.lock().expect("usage counter mutex poisoned");
        let counter = counters.entry(provider).or_default();
        counter.requests += 1;
        counter.tokens += u64::from(tokens_used);
        counter.cost += cost;
    }

    /// Read-only snapshot of all counters.
    pub fn snapshot(&self) -> HashMap<ProviderId, UsageCounter> {
        self.counters
            .lock()
            .expect("usage counter mutex poisoned")
            .clone()
    }
}
