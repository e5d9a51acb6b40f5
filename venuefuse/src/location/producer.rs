//! Producer abstraction.
//!
//! Abstracts location producing to make simulation and testing easier:
//! consumers depend only on [`LocationProducer`] and the listener contract,
//! never on the raw positioning providers. The two implementations are the
//! live [`FusedLocationProducer`](super::FusedLocationProducer) and the
//! scripted [`PlaybackLocationProducer`](super::PlaybackLocationProducer).

use super::listener::LocationListener;
use super::model::LocationSample;
use super::provider::ProviderError;

/// Errors surfaced by producer lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    /// Registration with the indoor positioning provider failed.
    #[error("indoor provider registration failed")]
    IndoorRegistration(#[source] ProviderError),

    /// Registration with the outdoor positioning provider failed.
    #[error("outdoor provider registration failed")]
    OutdoorRegistration(#[source] ProviderError),

    /// The producer has been destroyed; no further calls are permitted.
    #[error("producer has been destroyed")]
    Destroyed,

    /// The producer's event loop has terminated and cannot be restarted.
    #[error("producer event loop has terminated")]
    Terminated,
}

/// A source of location updates and semantic venue events.
///
/// Producers push events to a single [`LocationListener`] slot and expose
/// read-only snapshots of their session state. There is no automatic retry
/// anywhere: a failed [`start`](LocationProducer::start) is reported to the
/// caller, and restart is an explicit `stop()` + `start()` decision.
pub trait LocationProducer {
    /// Start producing location updates.
    ///
    /// Registration failures are propagated; the producer does not retry
    /// internally. Calling `start` while already started is a no-op.
    fn start(&mut self) -> Result<(), ProducerError>;

    /// Stop producing location updates.
    ///
    /// Session state is kept; a later `start` resumes from it.
    fn stop(&mut self);

    /// Release any allocated resources.
    ///
    /// There will be no further calls to this instance.
    fn destroy(&mut self);

    /// Install the consumer of location updates.
    ///
    /// Passing `None` installs a no-op listener.
    fn set_listener(&mut self, listener: Option<Box<dyn LocationListener>>);

    /// Returns `true` if it appears that the user is indoors.
    fn is_indoors(&self) -> bool;

    /// Returns the currently detected venue id, if any.
    fn venue_id(&self) -> Option<String>;

    /// Returns the currently detected floor-plan id, if any.
    fn floor_plan_id(&self) -> Option<String>;

    /// Returns the currently detected floor level, if any.
    ///
    /// The live producer formats its numeric level (`"-1"` while unknown);
    /// the playback producer returns the scripted value.
    fn floor_level(&self) -> Option<String>;

    /// Returns the last seen location, if any has been heard yet.
    fn last_location(&self) -> Option<LocationSample>;

    /// Id that identifies the positioning session for debugging purposes.
    fn trace_id(&self) -> Option<String>;
}
