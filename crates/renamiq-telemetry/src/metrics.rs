//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters relevant to rename batches, undo replays and inventory reads.

use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use prometheus::core::Collector;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    rename_items_total: IntCounterVec,
    rename_failures_total: IntCounterVec,
    rename_batches_total: IntCounterVec,
    undo_items_total: IntCounterVec,
    inventory_files_total: IntCounterVec,
    inventory_skipped_total: IntCounter,
    events_emitted_total: IntCounterVec,
    last_batch_duration_ms: IntGauge,
}

/// Snapshot of selected counters for reporting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Items renamed on disk.
    pub renamed: u64,
    /// Items that resolved to their current name.
    pub unchanged: u64,
    /// Items that failed to rename.
    pub failed: u64,
    /// Undo entries restored.
    pub undo_restored: u64,
    /// Undo entries that could not be restored.
    pub undo_failed: u64,
    /// Inventory entries skipped.
    pub inventory_skipped: u64,
    /// Duration (ms) of the most recent batch.
    pub last_batch_duration_ms: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let rename_items_total = counter_vec(
            "rename_items_total",
            "Rename operations processed by outcome",
            &["outcome"],
        )?;
        let rename_failures_total = counter_vec(
            "rename_failures_total",
            "Rename failures by error kind",
            &["kind"],
        )?;
        let rename_batches_total = counter_vec(
            "rename_batches_total",
            "Rename batches executed by mode",
            &["mode"],
        )?;
        let undo_items_total = counter_vec(
            "undo_items_total",
            "Undo entries replayed by outcome",
            &["outcome"],
        )?;
        let inventory_files_total = counter_vec(
            "inventory_files_total",
            "Regular files returned by inventory reads",
            &["source"],
        )?;
        let inventory_skipped_total = IntCounter::with_opts(Opts::new(
            "inventory_skipped_total",
            "Inventory entries skipped because they were unreadable or not files",
        ))
        .map_err(|source| TelemetryError::Collector {
            name: "inventory_skipped_total",
            stage: "build",
            source,
        })?;
        let events_emitted_total = counter_vec(
            "events_emitted_total",
            "Domain events emitted by type",
            &["type"],
        )?;
        let last_batch_duration_ms = IntGauge::with_opts(Opts::new(
            "last_batch_duration_ms",
            "Wall-clock duration of the most recent rename batch (ms)",
        ))
        .map_err(|source| TelemetryError::Collector {
            name: "last_batch_duration_ms",
            stage: "build",
            source,
        })?;

        register(&registry, "rename_items_total", &rename_items_total)?;
        register(&registry, "rename_failures_total", &rename_failures_total)?;
        register(&registry, "rename_batches_total", &rename_batches_total)?;
        register(&registry, "undo_items_total", &undo_items_total)?;
        register(&registry, "inventory_files_total", &inventory_files_total)?;
        register(&registry, "inventory_skipped_total", &inventory_skipped_total)?;
        register(&registry, "events_emitted_total", &events_emitted_total)?;
        register(&registry, "last_batch_duration_ms", &last_batch_duration_ms)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                rename_items_total,
                rename_failures_total,
                rename_batches_total,
                undo_items_total,
                inventory_files_total,
                inventory_skipped_total,
                events_emitted_total,
                last_batch_duration_ms,
            }),
        })
    }

    /// Count one processed rename item (`renamed`, `unchanged` or `failed`).
    pub fn inc_rename_item(&self, outcome: &str) {
        self.inner
            .rename_items_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Count one rename failure of the given kind.
    pub fn inc_rename_failure(&self, kind: &str) {
        self.inner
            .rename_failures_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Count one executed batch (`execute` or `preview`).
    pub fn inc_rename_batch(&self, mode: &str) {
        self.inner
            .rename_batches_total
            .with_label_values(&[mode])
            .inc();
    }

    /// Count one replayed undo entry (`restored` or `failed`).
    pub fn inc_undo_item(&self, outcome: &str) {
        self.inner
            .undo_items_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record files returned and skipped by an inventory read.
    pub fn record_inventory(&self, source: &str, files: usize, skipped: usize) {
        self.inner
            .inventory_files_total
            .with_label_values(&[source])
            .inc_by(u64::try_from(files).unwrap_or(u64::MAX));
        self.inner
            .inventory_skipped_total
            .inc_by(u64::try_from(skipped).unwrap_or(u64::MAX));
    }

    /// Increment the emitted event counter for the specific event type.
    pub fn inc_event(&self, event_type: &str) {
        self.inner
            .events_emitted_total
            .with_label_values(&[event_type])
            .inc();
    }

    /// Record how long the most recent batch took.
    pub fn observe_batch_duration(&self, duration: Duration) {
        self.inner
            .last_batch_duration_ms
            .set(Self::duration_to_ms(duration));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::Render { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::RenderEncoding { source })
    }

    /// Take a point-in-time snapshot of the rename counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let items = &self.inner.rename_items_total;
        let undo = &self.inner.undo_items_total;
        MetricsSnapshot {
            renamed: items.with_label_values(&["renamed"]).get(),
            unchanged: items.with_label_values(&["unchanged"]).get(),
            failed: items.with_label_values(&["failed"]).get(),
            undo_restored: undo.with_label_values(&["restored"]).get(),
            undo_failed: undo.with_label_values(&["failed"]).get(),
            inventory_skipped: self.inner.inventory_skipped_total.get(),
            last_batch_duration_ms: self.inner.last_batch_duration_ms.get(),
        }
    }

    /// Convert a duration to milliseconds saturating at `i64::MAX`.
    pub(crate) fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::Collector {
            name,
            stage: "build",
            source,
        })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::Collector {
            name,
            stage: "register",
            source,
        })
}
