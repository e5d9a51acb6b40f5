//! Core value types for location updates.
//!
//! This module defines the immutable types that flow from the producers to
//! their listener:
//!
//! - [`SampleSource`] - Which positioning source produced a sample?
//! - [`LocationSample`] - A single position fix with metadata
//! - [`LocationUpdate`] - A sample paired with its originating source,
//!   as emitted to listeners

use serde::{Deserialize, Serialize};

/// Positioning source of a location sample.
///
/// Source authority is exclusive: while the session is indoors only
/// [`SampleSource::Indoor`] samples are emitted, and while outdoors only
/// [`SampleSource::Outdoor`] samples are. There is no blending of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleSource {
    /// From the indoor positioning provider (venue/floor-plan aware).
    Indoor,
    /// From the outdoor positioning provider (continuous coordinates only).
    Outdoor,
}

impl std::fmt::Display for SampleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indoor => write!(f, "Indoor"),
            Self::Outdoor => write!(f, "Outdoor"),
        }
    }
}

/// A single position fix delivered by a provider.
///
/// Created at the moment a provider delivers a signal, consumed once by the
/// fusion state machine and then wrapped into a [`LocationUpdate`] for
/// emission. Never mutated after construction.
///
/// # Floor level
///
/// Only indoor samples carry a floor level. The level is deliberately read
/// from samples rather than from region events - the indoor provider
/// guarantees region containment, not the numeric floor value, which is
/// embedded in the next sample after a floor-plan entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,

    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,

    /// Bearing in degrees (0-360).
    pub bearing: f32,

    /// Horizontal accuracy in meters (lower is better, never negative).
    pub accuracy: f32,

    /// Floor level reported with this sample, if any.
    ///
    /// `None` for outdoor samples and for indoor samples without floor
    /// information.
    pub floor_level: Option<i32>,

    /// Source that produced this sample.
    pub source: SampleSource,
}

impl LocationSample {
    /// Create a sample as delivered by the indoor positioning provider.
    pub fn indoor(
        latitude: f64,
        longitude: f64,
        bearing: f32,
        accuracy: f32,
        floor_level: Option<i32>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            bearing,
            accuracy,
            floor_level,
            source: SampleSource::Indoor,
        }
    }

    /// Create a sample as delivered by the outdoor positioning provider.
    pub fn outdoor(latitude: f64, longitude: f64, bearing: f32, accuracy: f32) -> Self {
        Self {
            latitude,
            longitude,
            bearing,
            accuracy,
            floor_level: None,
            source: SampleSource::Outdoor,
        }
    }

    /// Get the position as a (latitude, longitude) pair.
    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// A location update as emitted to listeners.
///
/// Pairs a [`LocationSample`] with the source that was authoritative when
/// the update was emitted. Value type with no identity beyond content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    /// The underlying position sample.
    pub sample: LocationSample,

    /// Source under whose authority the update was emitted.
    pub source: SampleSource,
}

impl LocationUpdate {
    /// Wrap a sample emitted under indoor authority.
    pub fn indoor(sample: LocationSample) -> Self {
        Self {
            sample,
            source: SampleSource::Indoor,
        }
    }

    /// Wrap a sample emitted under outdoor authority.
    pub fn outdoor(sample: LocationSample) -> Self {
        Self {
            sample,
            source: SampleSource::Outdoor,
        }
    }
}

impl std::fmt::Display for LocationUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.6}, {:.6})",
            self.source, self.sample.latitude, self.sample.longitude
        )
    }
}
