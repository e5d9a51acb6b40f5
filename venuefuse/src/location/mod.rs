//! Indoor/outdoor location fusion.
//!
//! This module fuses two independent, asynchronous position sources - a
//! high-accuracy indoor provider (venue and floor-plan aware) and a
//! lower-accuracy outdoor provider (continuous coordinates only) - into a
//! single coherent stream of location updates plus semantic venue events
//! (entering/leaving a venue's proximity, entering/leaving mapped indoor
//! space, floor changes). Consumers react only to this derived stream and
//! never touch the raw providers.
//!
//! # Architecture
//!
//! Raw providers push signals through a [`ProducerSink`] onto a
//! single-consumer queue; the fused engine processes them serially,
//! maintains session state, and dispatches listener callbacks
//! synchronously. Source authority is exclusive, determined purely by the
//! current indoor/outdoor state - there is no blending of coordinates.
//!
//! Floor-plan boundary crossings are noisy in practice (a user standing
//! near a doorway can flicker exit/enter rapidly), so a floor-plan exit
//! arms a debounce timer instead of exiting the venue immediately; a
//! qualifying re-entry cancels it.
//!
//! # Components
//!
//! - [`model`] - value types: [`LocationSample`], [`LocationUpdate`],
//!   [`SampleSource`]
//! - [`region`] - [`Region`] and [`RegionKind`] enter/exit event types
//! - [`listener`] - the [`LocationListener`] contract and [`NoopListener`]
//! - [`producer`] - the [`LocationProducer`] abstraction
//! - [`provider`] - inbound provider interfaces and event marshalling
//! - [`debounce`] - the single-shot cancelable [`DebounceTimer`]
//! - [`fused`] - [`FusedLocationProducer`], the live fusion engine
//! - [`playback`] - [`PlaybackLocationProducer`], deterministic scripted
//!   replay
//!
//! # Usage
//!
//! ```ignore
//! use venuefuse::location::{FusedLocationProducer, LocationProducer};
//!
//! let mut producer = FusedLocationProducer::new(indoor, outdoor);
//! producer.set_listener(Some(Box::new(map_controller)));
//! producer.start()?;
//!
//! // ... later
//! producer.stop();
//! producer.destroy();
//! ```

mod debounce;
mod fused;
mod listener;
mod model;
mod playback;
mod producer;
mod provider;
mod region;

pub use debounce::DebounceTimer;
pub use fused::{FusedLocationProducer, FusedProducerConfig, UNKNOWN_FLOOR_LEVEL};
pub use listener::{LocationListener, NoopListener};
pub use model::{LocationSample, LocationUpdate, SampleSource};
pub use playback::{
    PlaybackConfig, PlaybackError, PlaybackLocationProducer, DEFAULT_PLAYBACK_DELAY,
};
pub use producer::{LocationProducer, ProducerError};
pub use provider::{
    IndoorPositionProvider, OutdoorPositionProvider, ProducerSink, ProviderError,
    ProviderExtraInfo,
};
pub use region::{Region, RegionKind};
