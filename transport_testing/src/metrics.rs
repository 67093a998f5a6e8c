//! Capture of metrics emitted while a closure runs.
//!
//! A [`DebuggingRecorder`] snapshot drains its counters, so the capture takes
//! exactly one snapshot at the end of each [`MetricsCapture::record`] call and
//! answers every later query from the stored entries.

use std::cell::RefCell;

use metrics::{SharedString, Unit};
use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};

/// One metric as reported by [`Snapshotter::snapshot`].
pub type SnapshotEntry = (CompositeKey, Option<Unit>, Option<SharedString>, DebugValue);

/// Local metrics recorder for a single test.
pub struct MetricsCapture {
    recorder: DebuggingRecorder,
    snapshotter: Snapshotter,
    entries: RefCell<Vec<SnapshotEntry>>,
}

impl MetricsCapture {
    /// Create an empty capture.
    pub fn new() -> Self {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        Self {
            recorder,
            snapshotter,
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Run `f` with this capture installed as the thread-local recorder, then
    /// store what it emitted.
    pub fn record<T>(&self, f: impl FnOnce() -> T) -> T {
        let result = ::metrics::with_local_recorder(&self.recorder, f);
        self.entries
            .borrow_mut()
            .extend(self.snapshotter.snapshot().into_vec());
        result
    }

    /// Total of the counter `name` whose labels include every pair in
    /// `labels`, or zero when it was never incremented.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        counter_value(&self.entries.borrow(), name, labels)
    }

    /// Last value set on the gauge `name`.
    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.entries
            .borrow()
            .iter()
            .rev()
            .find_map(|(key, _, _, value)| match value {
                DebugValue::Gauge(value) if key.key().name() == name => Some(value.into_inner()),
                _ => None,
            })
    }
}

impl Default for MetricsCapture {
    fn default() -> Self { Self::new() }
}

/// Sum of every counter named `name` whose labels include `labels`.
pub fn counter_value(entries: &[SnapshotEntry], name: &str, labels: &[(&str, &str)]) -> u64 {
    entries
        .iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && labels.iter().all(|(label, expected)| {
                    key.key()
                        .labels()
                        .any(|l| l.key() == *label && l.value() == *expected)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => *count,
            _ => 0,
        })
        .sum()
}
