//! Live fusion of indoor and outdoor positioning signals.
//!
//! [`FusedLocationProducer`] consumes raw provider callbacks and emits
//! semantic venue events plus fused location updates through the listener
//! contract. Region events (discrete, authoritative about containment) and
//! location samples (continuous, authoritative about position) are
//! deliberately decoupled: the floor *level* is never read off a region
//! event, because the provider only guarantees containment - the numeric
//! value arrives embedded in the next indoor sample.
//!
//! # Architecture
//!
//! ```text
//! indoor provider  ──┐
//! outdoor provider ──┼──► ProducerSink ──► event queue ──► EngineLoop ──► listener
//! debounce timer   ──┘                   (single consumer,
//!                                         serialized processing)
//! ```
//!
//! All signals are marshalled onto one single-consumer queue; session state
//! is mutated only by the queue's event loop. The venue-exit debounce
//! tolerates boundary flicker: a floor-plan exit arms a timer instead of
//! exiting the venue immediately, and a floor-plan or venue entry before
//! the timer elapses cancels it. Re-entry canceling the pending exit is
//! the mechanism's core correctness property.
//!
//! # States
//!
//! Derived from session state, not enumerated: *outdoor* (not indoors, no
//! venue), *near venue* (not indoors, venue set), *indoors*. While indoors
//! only indoor samples are emitted; otherwise only outdoor samples are.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::debounce::DebounceTimer;
use super::listener::{LocationListener, NoopListener};
use super::model::{LocationSample, LocationUpdate};
use super::producer::{LocationProducer, ProducerError};
use super::provider::{
    IndoorPositionProvider, OutdoorPositionProvider, ProducerEvent, ProducerSink,
    ProviderExtraInfo,
};
use super::region::{Region, RegionKind};

/// Sentinel floor level while no sample has resolved the actual value.
pub const UNKNOWN_FLOOR_LEVEL: i32 = -1;

/// Configuration for the fused producer.
#[derive(Debug, Clone)]
pub struct FusedProducerConfig {
    /// Delay after the last floor-plan exit before a venue exit is fired
    /// locally, unless a region entry cancels it first.
    pub exit_venue_delay: Duration,
}

impl Default for FusedProducerConfig {
    fn default() -> Self {
        Self {
            exit_venue_delay: Duration::from_millis(1500),
        }
    }
}

/// Session state owned by the engine loop.
///
/// Consumers never see this directly; they observe it through emitted
/// events and the snapshot accessors on [`FusedLocationProducer`].
#[derive(Debug, Clone)]
struct SessionState {
    /// True only while positioned inside a floor-plan region.
    is_indoors: bool,
    venue_id: Option<String>,
    floor_plan_id: Option<String>,
    floor_level: i32,
    last_location: Option<LocationSample>,
    /// True between a floor-plan entry and the next indoor sample that
    /// resolves the floor level.
    pending_floor_change: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_indoors: false,
            venue_id: None,
            floor_plan_id: None,
            floor_level: UNKNOWN_FLOOR_LEVEL,
            last_location: None,
            pending_floor_change: false,
        }
    }
}

/// The single-consumer event loop behind a [`FusedLocationProducer`].
struct EngineLoop {
    events: mpsc::UnboundedReceiver<ProducerEvent>,
    /// Loopback sink for the debounce timer firing.
    sink: ProducerSink,
    state: Arc<RwLock<SessionState>>,
    listener: Box<dyn LocationListener>,
    debounce: DebounceTimer,
    /// Generation of the currently armed venue-exit timer. A firing whose
    /// generation does not match, or that arrives after a cancel, is stale
    /// and ignored - canceling and firing must never both win.
    debounce_generation: u64,
    debounce_armed: bool,
    config: FusedProducerConfig,
}

impl EngineLoop {
    async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            trace!(event = ?event, "processing event");
            match event {
                ProducerEvent::IndoorSample(sample) => self.handle_indoor_sample(sample),
                ProducerEvent::OutdoorSample(sample) => self.handle_outdoor_sample(sample),
                ProducerEvent::EnterRegion(region) => self.handle_enter_region(region),
                ProducerEvent::ExitRegion(region) => self.handle_exit_region(region),
                ProducerEvent::DebounceElapsed(generation) => {
                    self.handle_debounce_elapsed(generation)
                }
                ProducerEvent::SetListener(listener) => self.listener = listener,
                ProducerEvent::Shutdown => break,
            }
        }
        debug!("fusion event loop terminated");
    }

    fn handle_indoor_sample(&mut self, sample: LocationSample) {
        if !self.state.read().is_indoors {
            // Not yet confirmed indoors; the indoor source is not
            // authoritative.
            trace!("dropping indoor sample while outdoors");
            return;
        }

        let resolved = {
            let mut state = self.state.write();
            state.last_location = Some(sample.clone());
            if state.pending_floor_change {
                state.pending_floor_change = false;
                state.floor_level = sample.floor_level.unwrap_or(UNKNOWN_FLOOR_LEVEL);
                Some((
                    state.venue_id.clone(),
                    state.floor_plan_id.clone(),
                    state.floor_level,
                ))
            } else {
                None
            }
        };

        if let Some((venue_id, floor_plan_id, floor_level)) = resolved {
            debug!(
                venue_id = ?venue_id,
                floor_plan_id = ?floor_plan_id,
                floor_level,
                "resolved pending floor change"
            );
            self.listener.on_floor_changed(
                venue_id.as_deref(),
                floor_plan_id.as_deref(),
                Some(&floor_level.to_string()),
            );
        }

        self.listener
            .on_location_changed(&LocationUpdate::indoor(sample));
    }

    fn handle_outdoor_sample(&mut self, sample: LocationSample) {
        if self.state.read().is_indoors {
            // The outdoor source is not authoritative while indoors.
            trace!("dropping outdoor sample while indoors");
            return;
        }
        self.state.write().last_location = Some(sample.clone());
        self.listener
            .on_location_changed(&LocationUpdate::outdoor(sample));
    }

    fn handle_enter_region(&mut self, region: Region) {
        // Any region entry invalidates a pending venue exit.
        self.cancel_exit_debounce();

        match region.kind {
            RegionKind::Venue => {
                info!(venue_id = %region.id, venue_name = ?region.name, "entered venue");
                {
                    let mut state = self.state.write();
                    state.floor_plan_id = None;
                    state.venue_id = Some(region.id.clone());
                }
                self.listener
                    .on_enter_venue(&region.id, region.name.as_deref());
            }
            RegionKind::FloorPlan => {
                info!(floor_plan_id = %region.id, "entered floor plan");
                let (first_entry, venue_id) = {
                    let mut state = self.state.write();
                    state.floor_plan_id = Some(region.id);
                    let first_entry = !state.is_indoors;
                    state.is_indoors = true;
                    state.pending_floor_change = true;
                    (first_entry, state.venue_id.clone())
                };
                if first_entry {
                    self.listener.on_enter_indoors(venue_id.as_deref());
                }
            }
            RegionKind::Other(ref kind) => {
                warn!(kind = %kind, region_id = %region.id, "unsupported region kind");
            }
        }
    }

    fn handle_exit_region(&mut self, region: Region) {
        match region.kind {
            RegionKind::FloorPlan => {
                debug!(floor_plan_id = %region.id, "exited floor plan, arming venue-exit timer");
                {
                    let mut state = self.state.write();
                    state.floor_level = UNKNOWN_FLOOR_LEVEL;
                    state.floor_plan_id = None;
                }
                self.arm_exit_debounce();
            }
            RegionKind::Venue => self.exit_venue(),
            RegionKind::Other(ref kind) => {
                warn!(kind = %kind, region_id = %region.id, "unsupported region kind");
            }
        }
    }

    fn handle_debounce_elapsed(&mut self, generation: u64) {
        if !self.debounce_armed || generation != self.debounce_generation {
            trace!(generation, "ignoring stale venue-exit timer");
            return;
        }
        self.debounce_armed = false;
        debug!(
            venue_id = ?self.state.read().venue_id,
            "triggering timed venue exit"
        );
        // The provider did not report the exit in time; fire it locally.
        self.exit_venue();
    }

    fn exit_venue(&mut self) {
        let (was_indoors, venue_id) = {
            let mut state = self.state.write();
            let was_indoors = state.is_indoors;
            state.is_indoors = false;
            state.pending_floor_change = false;
            (was_indoors, state.venue_id.clone())
        };
        info!(venue_id = ?venue_id, was_indoors, "exited venue");
        if was_indoors {
            self.listener.on_exit_indoors(venue_id.as_deref());
        }
        self.listener.on_exit_venue(venue_id.as_deref());
        self.state.write().venue_id = None;
    }

    fn arm_exit_debounce(&mut self) {
        self.debounce_generation = self.debounce_generation.wrapping_add(1);
        self.debounce_armed = true;
        let generation = self.debounce_generation;
        let sink = self.sink.clone();
        self.debounce.arm(self.config.exit_venue_delay, move || {
            sink.send(ProducerEvent::DebounceElapsed(generation));
        });
    }

    fn cancel_exit_debounce(&mut self) {
        self.debounce_armed = false;
        self.debounce.cancel();
    }
}

/// Fuses locations from indoors (region-aware provider) and outdoors
/// (continuous provider) into a single producer.
///
/// Must be created within a Tokio runtime: construction spawns the engine
/// loop task, which runs until [`destroy`](LocationProducer::destroy).
pub struct FusedLocationProducer {
    indoor: Arc<dyn IndoorPositionProvider>,
    outdoor: Arc<dyn OutdoorPositionProvider>,
    sink: ProducerSink,
    state: Arc<RwLock<SessionState>>,
    info: ProviderExtraInfo,
    started: bool,
    destroyed: bool,
}

impl FusedLocationProducer {
    /// Create a fused producer with the default configuration.
    pub fn new(
        indoor: Arc<dyn IndoorPositionProvider>,
        outdoor: Arc<dyn OutdoorPositionProvider>,
    ) -> Self {
        Self::with_config(indoor, outdoor, FusedProducerConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(
        indoor: Arc<dyn IndoorPositionProvider>,
        outdoor: Arc<dyn OutdoorPositionProvider>,
        config: FusedProducerConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let sink = ProducerSink::new(events_tx);
        let state = Arc::new(RwLock::new(SessionState::default()));

        let info = indoor.extra_info();
        debug!(version = %info.version, trace_id = %info.trace_id, "indoor provider info");

        let engine = EngineLoop {
            events: events_rx,
            sink: sink.clone(),
            state: Arc::clone(&state),
            listener: Box::new(NoopListener),
            debounce: DebounceTimer::new(),
            debounce_generation: 0,
            debounce_armed: false,
            config,
        };
        tokio::spawn(engine.run());

        Self {
            indoor,
            outdoor,
            sink,
            state,
            info,
            started: false,
            destroyed: false,
        }
    }

    /// Provider metadata captured at construction (version, trace id).
    pub fn provider_info(&self) -> &ProviderExtraInfo {
        &self.info
    }
}

impl LocationProducer for FusedLocationProducer {
    fn start(&mut self) -> Result<(), ProducerError> {
        if self.destroyed {
            return Err(ProducerError::Destroyed);
        }
        if self.started {
            debug!("already started, ignoring");
            return Ok(());
        }
        debug!("start requesting location updates");
        self.indoor
            .request_location_updates(self.sink.clone())
            .map_err(ProducerError::IndoorRegistration)?;
        self.indoor
            .register_region_listener(self.sink.clone())
            .map_err(ProducerError::IndoorRegistration)?;
        self.outdoor
            .request_location_updates(self.sink.clone())
            .map_err(ProducerError::OutdoorRegistration)?;
        self.started = true;

        // Replay the last known outdoor fix, if the provider has one.
        if let Some(sample) = self.outdoor.last_known_sample() {
            self.sink.outdoor_sample(sample);
        }
        Ok(())
    }

    fn stop(&mut self) {
        debug!("stop requesting location updates");
        self.indoor.remove_location_updates();
        self.indoor.unregister_region_listener();
        self.outdoor.remove_location_updates();
        self.started = false;
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.indoor.destroy();
        self.sink.send(ProducerEvent::Shutdown);
    }

    fn set_listener(&mut self, listener: Option<Box<dyn LocationListener>>) {
        let listener = listener.unwrap_or_else(|| Box::new(NoopListener));
        self.sink.send(ProducerEvent::SetListener(listener));
    }

    fn is_indoors(&self) -> bool {
        self.state.read().is_indoors
    }

    fn venue_id(&self) -> Option<String> {
        self.state.read().venue_id.clone()
    }

    fn floor_plan_id(&self) -> Option<String> {
        self.state.read().floor_plan_id.clone()
    }

    fn floor_level(&self) -> Option<String> {
        Some(self.state.read().floor_level.to_string())
    }

    fn last_location(&self) -> Option<LocationSample> {
        self.state.read().last_location.clone()
    }

    fn trace_id(&self) -> Option<String> {
        Some(self.info.trace_id.clone())
    }
}
