//! Listener contract between producers and their consumer.
//!
//! A producer holds exactly one listener slot. The slot defaults to
//! [`NoopListener`] so dispatch code never branches on absence, and is
//! swapped on the producer's own sequencing context.

use super::model::LocationUpdate;

/// The consumer interface for location events.
///
/// All methods have empty default bodies so consumers override only the
/// callbacks they care about.
///
/// # Reentrancy
///
/// Dispatch is synchronous on the producer's event loop. A listener must
/// not call back into the producer's mutating operations (`start`, `stop`,
/// `set_listener`) from within a callback; reading the snapshot accessors
/// is fine. Consumers needing mutation must defer it to a later turn.
///
/// # Nullable identifiers
///
/// Venue and floor-plan identifiers are `Option<&str>`: a floor plan can be
/// entered before any venue event has been seen, and during the debounce
/// window after a floor exit the floor-plan id is already cleared.
pub trait LocationListener: Send {
    /// Triggered for both indoor and outdoor location updates.
    fn on_location_changed(&mut self, update: &LocationUpdate) {
        let _ = update;
    }

    /// Triggered when the user enters a first floor or switches floors.
    ///
    /// The switch can also be on the same level, from one floor plan to
    /// another.
    fn on_floor_changed(
        &mut self,
        venue_id: Option<&str>,
        floor_id: Option<&str>,
        floor_level: Option<&str>,
    ) {
        let _ = (venue_id, floor_id, floor_level);
    }

    /// Triggered when it appears that the user has entered mapped indoor
    /// space.
    fn on_enter_indoors(&mut self, venue_id: Option<&str>) {
        let _ = venue_id;
    }

    /// Triggered when it appears that the user leaves mapped indoor space.
    fn on_exit_indoors(&mut self, venue_id: Option<&str>) {
        let _ = venue_id;
    }

    /// Triggered when it appears that the user has entered the near
    /// proximity of a venue.
    fn on_enter_venue(&mut self, venue_id: &str, venue_name: Option<&str>) {
        let _ = (venue_id, venue_name);
    }

    /// Triggered when it appears that the user has exited the near
    /// proximity of a venue.
    fn on_exit_venue(&mut self, venue_id: Option<&str>) {
        let _ = venue_id;
    }
}

/// A listener that ignores every event.
///
/// Installed whenever no listener is set, so producers never hold an empty
/// slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl LocationListener for NoopListener {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::model::LocationSample;

    #[test]
    fn test_noop_listener_accepts_all_callbacks() {
        let mut listener = NoopListener;

        let update = LocationUpdate::outdoor(LocationSample::outdoor(60.1, 24.9, 0.0, 5.0));
        listener.on_location_changed(&update);
        listener.on_floor_changed(Some("v"), Some("f"), Some("1"));
        listener.on_enter_indoors(Some("v"));
        listener.on_exit_indoors(None);
        listener.on_enter_venue("v", Some("Mall"));
        listener.on_exit_venue(Some("v"));
    }

    #[test]
    fn test_default_bodies_allow_partial_impls() {
        struct CountingListener {
            updates: usize,
        }

        impl LocationListener for CountingListener {
            fn on_location_changed(&mut self, _update: &LocationUpdate) {
                self.updates += 1;
            }
        }

        let mut listener = CountingListener { updates: 0 };
        let update = LocationUpdate::indoor(LocationSample::indoor(60.1, 24.9, 0.0, 2.0, Some(1)));
        listener.on_location_changed(&update);
        listener.on_enter_venue("v", None);
        assert_eq!(listener.updates, 1);
    }
}
