//! Structured diagnostics for the layering pipeline.
//!
//! The engine never prints. Instead each decision point emits a typed
//! [`TraceEvent`] to the passive listeners registered on the
//! [`LayoutEngine`](crate::layout::LayoutEngine). With no listeners
//! registered, events are never constructed.
//!
//! [`TraceLog`] is a ready-made listener target: a bounded buffer that keeps
//! the most recent events and counts what it had to drop.

use crate::dag::EdgeClass;
use crate::graph::MissingEndpoint;
use crate::stage::StageReason;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A diagnostic event emitted by one of the pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    // -- Graph --
    GraphBuilt {
        materials: usize,
        relationships: usize,
        skipped: usize,
    },
    RelationshipSkipped {
        index: usize,
        subject: String,
        object: String,
        missing: MissingEndpoint,
    },

    // -- Stage --
    NodeClassified {
        uuid: String,
        layer: f64,
        reason: StageReason,
    },

    // -- DAG filter --
    EdgeClassified {
        index: usize,
        subject: String,
        object: String,
        class: EdgeClass,
        /// Source and target share a layer; counted as backward.
        equal_layers: bool,
    },
    EdgeDropped {
        index: usize,
        subject: String,
        object: String,
    },

    // -- Stats --
    StatsComputed {
        total_flows: usize,
        recycling_flows: usize,
        recycling_rate: String,
    },
}

/// Discriminant-only mirror of [`TraceEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceKind {
    GraphBuilt,
    RelationshipSkipped,
    NodeClassified,
    EdgeClassified,
    EdgeDropped,
    StatsComputed,
}

impl TraceEvent {
    pub fn kind(&self) -> TraceKind {
        match self {
            TraceEvent::GraphBuilt { .. } => TraceKind::GraphBuilt,
            TraceEvent::RelationshipSkipped { .. } => TraceKind::RelationshipSkipped,
            TraceEvent::NodeClassified { .. } => TraceKind::NodeClassified,
            TraceEvent::EdgeClassified { .. } => TraceKind::EdgeClassified,
            TraceEvent::EdgeDropped { .. } => TraceKind::EdgeDropped,
            TraceEvent::StatsComputed { .. } => TraceKind::StatsComputed,
        }
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A passive, read-only trace listener. Must be shareable across threads so
/// one engine can serve concurrent callers.
pub type TraceListener = Box<dyn Fn(&TraceEvent) + Send + Sync>;

const NO_LISTENERS: &[TraceListener] = &[];

/// Borrowed view of the registered listeners, threaded through the stages.
#[derive(Clone, Copy)]
pub(crate) struct Tracer<'a> {
    listeners: &'a [TraceListener],
}

impl<'a> Tracer<'a> {
    pub(crate) fn new(listeners: &'a [TraceListener]) -> Self {
        Self { listeners }
    }

    pub(crate) fn silent() -> Tracer<'static> {
        Tracer {
            listeners: NO_LISTENERS,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Build the event only if someone is listening, then deliver it to each
    /// listener in registration order.
    pub(crate) fn emit(&self, make: impl FnOnce() -> TraceEvent) {
        if !self.is_active() {
            return;
        }
        let event = make();
        for listener in self.listeners {
            listener(&event);
        }
    }
}

// ---------------------------------------------------------------------------
// TraceLog -- bounded collector
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TraceLogInner {
    events: VecDeque<TraceEvent>,
    total_written: u64,
}

/// A bounded, thread-safe buffer of trace events. When full, the oldest
/// events are dropped.
///
/// Cloning shares the underlying buffer, so a clone can be moved into a
/// listener while the original is kept for inspection.
#[derive(Debug, Clone)]
pub struct TraceLog {
    inner: Arc<Mutex<TraceLogInner>>,
    capacity: usize,
}

impl TraceLog {
    /// Create a log holding at most `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "TraceLog capacity must be > 0");
        Self {
            inner: Arc::new(Mutex::new(TraceLogInner {
                events: VecDeque::with_capacity(capacity.min(1024)),
                total_written: 0,
            })),
            capacity,
        }
    }

    /// A listener that records every event into this log.
    pub fn listener(&self) -> TraceListener {
        let log = self.clone();
        Box::new(move |event: &TraceEvent| log.record(event.clone()))
    }

    /// Record one event, evicting the oldest if at capacity.
    pub fn record(&self, event: TraceEvent) {
        let mut inner = self.lock();
        if inner.events.len() == self.capacity {
            inner.events.pop_front();
        }
        inner.events.push_back(event);
        inner.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events currently held.
    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    /// Total events ever recorded, including dropped ones.
    pub fn total_written(&self) -> u64 {
        self.lock().total_written
    }

    /// Events evicted because the log was full.
    pub fn dropped_count(&self) -> u64 {
        let inner = self.lock();
        inner.total_written - inner.events.len() as u64
    }

    /// Snapshot of the held events, oldest first.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.lock().events.iter().cloned().collect()
    }

    /// Snapshot of the held events of one kind, oldest first.
    pub fn events_of(&self, kind: TraceKind) -> Vec<TraceEvent> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    /// Drop all held events. `total_written` is reset too.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.events.clear();
        inner.total_written = 0;
    }

    fn lock(&self) -> MutexGuard<'_, TraceLogInner> {
        // Events are plain data; a poisoned lock is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new(4096)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
