//! Region events reported by the indoor positioning provider.
//!
//! Regions are transient enter/exit events, never queried by value - the
//! fusion state machine's own session fields are the durable record of
//! "currently inside".

/// Kind of a reported region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionKind {
    /// Approximate proximity area around a mapped location.
    Venue,
    /// Precisely mapped sub-region of a venue; the unit at which
    /// "indoors" is defined.
    FloorPlan,
    /// A kind this crate does not recognize, carrying the provider's raw
    /// type tag. Newer provider SDK region types pass through here instead
    /// of crashing the session; the state machine logs and ignores them.
    Other(String),
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Venue => write!(f, "venue"),
            Self::FloorPlan => write!(f, "floor plan"),
            Self::Other(tag) => write!(f, "other({})", tag),
        }
    }
}

/// A region as reported in a provider enter/exit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Kind of the region.
    pub kind: RegionKind,

    /// Opaque provider-specific identifier.
    pub id: String,

    /// Display name, reported for venues only.
    pub name: Option<String>,
}

impl Region {
    /// Create a venue region without a display name.
    pub fn venue(id: impl Into<String>) -> Self {
        Self {
            kind: RegionKind::Venue,
            id: id.into(),
            name: None,
        }
    }

    /// Create a venue region with a display name.
    pub fn venue_named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: RegionKind::Venue,
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// Create a floor-plan region.
    pub fn floor_plan(id: impl Into<String>) -> Self {
        Self {
            kind: RegionKind::FloorPlan,
            id: id.into(),
            name: None,
        }
    }
}
