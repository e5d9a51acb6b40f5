//! Inbound provider interfaces and event marshalling.
//!
//! The fusion state machine assumes serialized, one-at-a-time event
//! processing. Raw providers may deliver callbacks on arbitrary native
//! threads, so every signal is marshalled through a [`ProducerSink`] onto
//! one single-consumer queue before it reaches the state machine. This is a
//! mandatory integration requirement, not an optimization.

use tokio::sync::mpsc;
use tracing::trace;

use super::listener::LocationListener;
use super::model::LocationSample;
use super::region::Region;

/// Errors reported by positioning providers at registration time.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider ran out of resources (listener slots, sessions, ...).
    #[error("provider out of resources: {0}")]
    ResourceExhausted(String),

    /// Any other registration failure.
    #[error("registration rejected: {0}")]
    Registration(String),
}

/// Read-only record exposed by the indoor provider, captured once at
/// producer construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderExtraInfo {
    /// Protocol/SDK version string.
    pub version: String,

    /// Per-session trace identifier for debugging.
    pub trace_id: String,
}

/// The high-accuracy, region-aware indoor positioning provider.
///
/// Implementations deliver samples and region enter/exit events through the
/// sink handed to the registration calls, from whatever thread suits them.
pub trait IndoorPositionProvider: Send + Sync {
    /// Begin delivering indoor location samples into `sink`.
    fn request_location_updates(&self, sink: ProducerSink) -> Result<(), ProviderError>;

    /// Stop delivering location samples.
    fn remove_location_updates(&self);

    /// Begin delivering region enter/exit events into `sink`.
    fn register_region_listener(&self, sink: ProducerSink) -> Result<(), ProviderError>;

    /// Stop delivering region events.
    fn unregister_region_listener(&self);

    /// Provider metadata (version, session trace id).
    fn extra_info(&self) -> ProviderExtraInfo;

    /// Release provider resources. No further calls after this.
    fn destroy(&self);
}

/// The lower-accuracy outdoor positioning provider (no region concept).
pub trait OutdoorPositionProvider: Send + Sync {
    /// Begin delivering outdoor location samples into `sink`.
    fn request_location_updates(&self, sink: ProducerSink) -> Result<(), ProviderError>;

    /// Stop delivering location samples.
    fn remove_location_updates(&self);

    /// Synchronously return the last known fix, if the provider has one.
    fn last_known_sample(&self) -> Option<LocationSample>;
}

/// Events consumed by the fusion state machine, in arrival order.
pub(crate) enum ProducerEvent {
    IndoorSample(LocationSample),
    OutdoorSample(LocationSample),
    EnterRegion(Region),
    ExitRegion(Region),
    /// Venue-exit debounce timer fired. The generation identifies the arm
    /// call that scheduled it; stale generations are ignored.
    DebounceElapsed(u64),
    SetListener(Box<dyn LocationListener>),
    Shutdown,
}

impl std::fmt::Debug for ProducerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndoorSample(s) => f.debug_tuple("IndoorSample").field(s).finish(),
            Self::OutdoorSample(s) => f.debug_tuple("OutdoorSample").field(s).finish(),
            Self::EnterRegion(r) => f.debug_tuple("EnterRegion").field(r).finish(),
            Self::ExitRegion(r) => f.debug_tuple("ExitRegion").field(r).finish(),
            Self::DebounceElapsed(gen) => f.debug_tuple("DebounceElapsed").field(gen).finish(),
            Self::SetListener(_) => f.write_str("SetListener"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Thread-safe handle through which providers push signals to a producer.
///
/// Cloneable; all clones feed the same single-consumer queue. Pushing after
/// the producer has been destroyed is silently dropped.
#[derive(Clone)]
pub struct ProducerSink {
    events: mpsc::UnboundedSender<ProducerEvent>,
}

impl ProducerSink {
    pub(crate) fn new(events: mpsc::UnboundedSender<ProducerEvent>) -> Self {
        Self { events }
    }

    /// Deliver an indoor location sample.
    pub fn indoor_sample(&self, sample: LocationSample) {
        self.send(ProducerEvent::IndoorSample(sample));
    }

    /// Deliver an outdoor location sample.
    pub fn outdoor_sample(&self, sample: LocationSample) {
        self.send(ProducerEvent::OutdoorSample(sample));
    }

    /// Deliver a region entry event.
    pub fn enter_region(&self, region: Region) {
        self.send(ProducerEvent::EnterRegion(region));
    }

    /// Deliver a region exit event.
    pub fn exit_region(&self, region: Region) {
        self.send(ProducerEvent::ExitRegion(region));
    }

    pub(crate) fn send(&self, event: ProducerEvent) {
        if self.events.send(event).is_err() {
            trace!("producer gone, dropping event");
        }
    }
}
