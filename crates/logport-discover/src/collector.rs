//! The collector protocol seam.
//!
//! The metrics protocol itself is an external collaborator; discovery only
//! needs five primitives from it: open a session to a host, resolve a metric
//! name to an id, fetch that metric's descriptor, fetch its current values,
//! and resolve an instance id to its external name. These traits capture
//! exactly that surface, so the remote query can be exercised against any
//! implementation (the shipped TCP client, or a mock in tests).

use serde::{Deserialize, Serialize};

use logport_core::LogportResult;

/// Opaque metric identifier assigned by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricId(pub u32);

/// Metadata the collector holds for a metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricDesc {
    /// Instance domain mapping this metric's instance ids to external names.
    pub indom: u32,
}

/// One instance's current value within a fetched value set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InstanceValue {
    /// Instance identifier within the metric's instance domain.
    pub inst: i32,
    /// The instance's current value.
    pub value: i64,
}

/// The current values of one metric across its instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSet {
    /// Number of values the collector reported. A negative count encodes a
    /// collector-side per-metric error and makes the set unusable.
    pub numval: i32,
    /// The per-instance values.
    pub values: Vec<InstanceValue>,
}

/// An open session against one collector.
///
/// Sessions are plain values: dropping one releases the underlying
/// connection on every exit path.
pub trait CollectorSession {
    /// Resolve a metric name to the collector's id for it.
    fn lookup_name(&mut self, metric: &str) -> LogportResult<MetricId>;

    /// Retrieve a metric's descriptor (value semantics, instance domain).
    fn lookup_desc(&mut self, metric: MetricId) -> LogportResult<MetricDesc>;

    /// Fetch the metric's current value set.
    fn fetch(&mut self, metric: MetricId) -> LogportResult<ValueSet>;

    /// Resolve an instance id to its external name within an instance domain.
    fn instance_name(&mut self, indom: u32, inst: i32) -> LogportResult<String>;
}

/// A way of opening collector sessions.
pub trait CollectorClient {
    /// The session type this client produces.
    type Session: CollectorSession;

    /// Open a session against the collector on `host`.
    fn connect(&self, host: &str) -> LogportResult<Self::Session>;
}
