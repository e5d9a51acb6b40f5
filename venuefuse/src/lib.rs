//! VenueFuse - Indoor/outdoor location fusion for venue-aware navigation
//!
//! This library fuses two independent positioning sources - a high-accuracy
//! indoor provider (venue and floor-plan aware) and a lower-accuracy outdoor
//! provider (continuous coordinates only) - into a single stream of location
//! updates and semantic venue events.
//!
//! # High-Level API
//!
//! Consumers implement [`location::LocationListener`] and attach it to a
//! [`location::LocationProducer`]:
//!
//! ```ignore
//! use venuefuse::location::{FusedLocationProducer, LocationProducer};
//!
//! let mut producer = FusedLocationProducer::new(indoor, outdoor);
//! producer.set_listener(Some(Box::new(MyMapController::new())));
//! producer.start()?;
//! ```
//!
//! The [`location::PlaybackLocationProducer`] replays a recorded script
//! through the identical listener contract for deterministic testing.

pub mod location;

/// Version of the VenueFuse library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
