// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::level::StandardLevel;
use crate::log_record::LogRecord;
use crate::marker::Marker;
use std::fmt::Debug;
use std::sync::Arc;

/// The backend that renders, stores or transmits finished records.
pub trait Sink: Debug + Send + Sync {
    /**
    Whether records at `level` are wanted at all.

    Consulted by the level gate on every call, after the logger's own threshold,
    so implementations should answer from a field or a constant.
    */
    fn is_level_enabled(&self, level: StandardLevel) -> bool {
        let _ = level;
        true
    }

    /**
        Submits the record. Called exactly once per admitted log call.
    */
    fn log_record(&self, record: LogRecord);

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn prepare_to_die(&self);
}

pub type SharedSink = Arc<dyn Sink>;

/// Decides whether a call carrying a marker goes through.
///
/// Runs after the level gate and only when a marker is present.
pub trait MarkerFilter: Debug + Send + Sync {
    fn admits(&self, level: StandardLevel, marker: &Marker) -> bool;
}

/// Admits every marker. The default filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AcceptAllMarkers;

impl MarkerFilter for AcceptAllMarkers {
    #[inline]
    fn admits(&self, _level: StandardLevel, _marker: &Marker) -> bool {
        true
    }
}

/// Rejects calls whose marker is, or descends from, the given marker.
#[derive(Debug, Clone)]
pub struct DenyMarker(pub Marker);

impl MarkerFilter for DenyMarker {
    fn admits(&self, _level: StandardLevel, marker: &Marker) -> bool {
        !marker.is_instance_of(&self.0)
    }
}

/*
Boilerplate notes.

# Sink

Clone on a sink doesn't make sense; it usually owns a buffer or a handle, and sinks are shared as Arc anyway.
PartialEq/Eq: data equality or identity?  Registries compare sinks by Arc pointer when they need to, so no.
Ord makes no sense.
Default is not sensible since who knows how the sink is constructed.
Display is not very sensible.
Send/Sync are required; records arrive from any thread.

# MarkerFilter

Same as Sink.  The two filters provided here are plain data and derive what they can.
*/
