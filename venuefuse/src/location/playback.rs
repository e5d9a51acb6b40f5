//! Scripted playback of recorded location events.
//!
//! [`PlaybackLocationProducer`] replays a fixed, ordered sequence of
//! recorded events through the same listener contract as the live fused
//! producer, on a configurable cadence and optionally looping. It exists to
//! exercise consumer logic deterministically, without live signals.
//!
//! # Script format
//!
//! A JSON array of entries, each either
//!
//! ```json
//! {"type": "location", "coordinates": [60.1, 24.9]}
//! ```
//!
//! or
//!
//! ```json
//! {"type": "context", "kind": "venue-entry", "id": "v1", "name": "Mall"}
//! {"type": "context", "kind": "floor-entry", "id": "f1", "floorLevel": "2"}
//! {"type": "context", "kind": "venue-exit"}
//! ```
//!
//! There is no versioning field; format changes are breaking.
//!
//! The script is read from disk on the dispatch task the first time
//! [`start`](super::LocationProducer::start) takes effect and cached for
//! later starts - the one blocking read in this crate, kept off any
//! latency-sensitive path. Entries are interpreted one at a time: the first
//! structurally malformed entry (missing required field) stops the engine
//! permanently, because script integrity cannot be partially trusted.
//! Unknown event or context kinds are logged and skipped instead.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use super::listener::{LocationListener, NoopListener};
use super::model::{LocationSample, LocationUpdate};
use super::producer::{LocationProducer, ProducerError};

/// Default delay between dispatched events.
pub const DEFAULT_PLAYBACK_DELAY: Duration = Duration::from_millis(1000);

/// Errors raised while loading or interpreting a playback script.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The script file could not be read.
    #[error("failed to read playback script {path}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script file is not valid JSON.
    #[error("playback script {path} is not valid JSON")]
    ScriptParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The script document is valid JSON but not an array of events.
    #[error("playback script {path} must be a JSON array of events")]
    NotAnArray { path: PathBuf },

    /// An entry is missing a required field or has the wrong shape.
    #[error("malformed playback entry at index {index}")]
    MalformedEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A location entry without a [lat, lon] coordinate pair.
    #[error("malformed playback entry at index {index}: location requires [lat, lon] coordinates")]
    MalformedCoordinates { index: usize },
}

/// Configuration for the playback producer.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Delay between dispatched events.
    pub update_delay: Duration,

    /// Restart from the first event after the last one.
    pub looping: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            update_delay: DEFAULT_PLAYBACK_DELAY,
            looping: false,
        }
    }
}

/// One entry of the playback script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ScriptEntry {
    Location { coordinates: Vec<f64> },
    Context(ContextEvent),
    #[serde(other)]
    Unknown,
}

/// A semantic context change within the script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
enum ContextEvent {
    #[serde(rename = "venue-entry")]
    VenueEntry {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(rename = "floor-entry")]
    FloorEntry {
        id: String,
        #[serde(rename = "floorLevel", default)]
        floor_level: Option<String>,
    },
    #[serde(rename = "venue-exit")]
    VenueExit,
    #[serde(other)]
    Unknown,
}

/// Session fields accumulated during playback.
#[derive(Debug, Clone, Default)]
struct PlaybackState {
    is_indoors: bool,
    venue_id: Option<String>,
    floor_plan_id: Option<String>,
    floor_level: Option<String>,
    last_location: Option<LocationSample>,
}

enum PlaybackCommand {
    Start,
    Stop,
    SetListener(Box<dyn LocationListener>),
    Quit,
}

/// The dispatch task behind a [`PlaybackLocationProducer`].
struct PlaybackLoop {
    commands: mpsc::UnboundedReceiver<PlaybackCommand>,
    script_path: PathBuf,
    config: PlaybackConfig,
    /// Parsed script entries, cached after the first successful load.
    events: Option<Vec<Value>>,
    state: Arc<RwLock<PlaybackState>>,
    listener: Box<dyn LocationListener>,
}

impl PlaybackLoop {
    async fn run(mut self) {
        let mut next_index: Option<usize> = None;
        let mut deadline = Instant::now();
        loop {
            let command = if next_index.is_some() {
                tokio::select! {
                    command = self.commands.recv() => Some(command),
                    _ = tokio::time::sleep_until(deadline) => None,
                }
            } else {
                Some(self.commands.recv().await)
            };

            match command {
                Some(None) | Some(Some(PlaybackCommand::Quit)) => break,
                Some(Some(PlaybackCommand::Stop)) => {
                    debug!("playback stopped");
                    next_index = None;
                }
                Some(Some(PlaybackCommand::SetListener(listener))) => self.listener = listener,
                Some(Some(PlaybackCommand::Start)) => {
                    debug!("playback starting from the first event");
                    self.state.write().is_indoors = false;
                    next_index = Some(0);
                    deadline = Instant::now();
                }
                None => {
                    // Delay elapsed; dispatch the scheduled event.
                    let index = next_index.take().unwrap_or(0);
                    match self.dispatch(index) {
                        Ok(Some(next)) => {
                            next_index = Some(next);
                            deadline = Instant::now() + self.config.update_delay;
                        }
                        Ok(None) => debug!("end of playback reached, not looping"),
                        Err(error) => {
                            error!(error = %error, "processing playback data failed");
                            break;
                        }
                    }
                }
            }
        }
        debug!("playback loop terminated");
    }

    /// Invoke the listener with the `index`'th event.
    ///
    /// Returns the index to dispatch next, or `None` when there are no
    /// further events to send.
    fn dispatch(&mut self, index: usize) -> Result<Option<usize>, PlaybackError> {
        if self.events.is_none() {
            let events = load_script(&self.script_path)?;
            info!(
                path = %self.script_path.display(),
                count = events.len(),
                "loaded playback script"
            );
            self.events = Some(events);
        }
        let events = self.events.as_deref().unwrap_or_default();
        let count = events.len();
        if index >= count {
            warn!(index, count, "asked to dispatch an event that does not exist");
            return Ok(None);
        }

        let entry: ScriptEntry = serde_json::from_value(events[index].clone())
            .map_err(|source| PlaybackError::MalformedEntry { index, source })?;
        trace!(index, entry = ?entry, "processing event");
        self.apply(index, entry)?;

        if index + 1 == count {
            Ok(if self.config.looping { Some(0) } else { None })
        } else {
            Ok(Some(index + 1))
        }
    }

    fn apply(&mut self, index: usize, entry: ScriptEntry) -> Result<(), PlaybackError> {
        match entry {
            ScriptEntry::Location { coordinates } => {
                if coordinates.len() < 2 {
                    return Err(PlaybackError::MalformedCoordinates { index });
                }
                let (latitude, longitude) = (coordinates[0], coordinates[1]);
                let update = {
                    let mut state = self.state.write();
                    let sample = if state.is_indoors {
                        LocationSample::indoor(latitude, longitude, 0.0, 0.0, None)
                    } else {
                        LocationSample::outdoor(latitude, longitude, 0.0, 0.0)
                    };
                    state.last_location = Some(sample.clone());
                    if state.is_indoors {
                        LocationUpdate::indoor(sample)
                    } else {
                        LocationUpdate::outdoor(sample)
                    }
                };
                self.listener.on_location_changed(&update);
            }
            ScriptEntry::Context(ContextEvent::VenueEntry { id, name }) => {
                self.state.write().venue_id = Some(id.clone());
                self.listener.on_enter_venue(&id, name.as_deref());
            }
            ScriptEntry::Context(ContextEvent::FloorEntry { id, floor_level }) => {
                let (first_entry, venue_id) = {
                    let mut state = self.state.write();
                    let first_entry = !state.is_indoors;
                    state.is_indoors = true;
                    (first_entry, state.venue_id.clone())
                };
                if first_entry {
                    self.listener.on_enter_indoors(venue_id.as_deref());
                }
                {
                    let mut state = self.state.write();
                    state.floor_plan_id = Some(id.clone());
                    state.floor_level = floor_level.clone();
                }
                self.listener
                    .on_floor_changed(venue_id.as_deref(), Some(&id), floor_level.as_deref());
            }
            ScriptEntry::Context(ContextEvent::VenueExit) => {
                let venue_id = {
                    let mut state = self.state.write();
                    state.is_indoors = false;
                    state.floor_plan_id = None;
                    state.venue_id.take()
                };
                self.listener.on_exit_venue(venue_id.as_deref());
                self.listener.on_exit_indoors(venue_id.as_deref());
            }
            ScriptEntry::Context(ContextEvent::Unknown) => {
                warn!(index, "unsupported context kind in playback script");
            }
            ScriptEntry::Unknown => {
                warn!(index, "unsupported event type in playback script");
            }
        }
        Ok(())
    }
}

fn load_script(path: &PathBuf) -> Result<Vec<Value>, PlaybackError> {
    let raw = std::fs::read_to_string(path).map_err(|source| PlaybackError::ScriptRead {
        path: path.clone(),
        source,
    })?;
    let document: Value =
        serde_json::from_str(&raw).map_err(|source| PlaybackError::ScriptParse {
            path: path.clone(),
            source,
        })?;
    match document {
        Value::Array(events) => Ok(events),
        _ => Err(PlaybackError::NotAnArray { path: path.clone() }),
    }
}

/// Produces location events from a recorded script instead of live signals.
///
/// Observationally interchangeable with the fused producer from a
/// consumer's point of view: the same listener callbacks fire and the same
/// category of session fields is kept current. Must be created within a
/// Tokio runtime: construction spawns the dispatch task.
///
/// After a fatal script error the dispatch task is gone for good;
/// subsequent `start` calls report
/// [`ProducerError::Terminated`](super::ProducerError::Terminated).
pub struct PlaybackLocationProducer {
    commands: mpsc::UnboundedSender<PlaybackCommand>,
    state: Arc<RwLock<PlaybackState>>,
    destroyed: bool,
}

impl PlaybackLocationProducer {
    /// Create a playback producer with the default configuration.
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        Self::with_config(script_path, PlaybackConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(script_path: impl Into<PathBuf>, config: PlaybackConfig) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let state = Arc::new(RwLock::new(PlaybackState::default()));

        let playback = PlaybackLoop {
            commands: commands_rx,
            script_path: script_path.into(),
            config,
            events: None,
            state: Arc::clone(&state),
            listener: Box::new(NoopListener),
        };
        tokio::spawn(playback.run());

        Self {
            commands: commands_tx,
            state,
            destroyed: false,
        }
    }

    fn send(&self, command: PlaybackCommand) -> Result<(), ProducerError> {
        self.commands
            .send(command)
            .map_err(|_| ProducerError::Terminated)
    }
}

impl LocationProducer for PlaybackLocationProducer {
    fn start(&mut self) -> Result<(), ProducerError> {
        if self.destroyed {
            return Err(ProducerError::Destroyed);
        }
        self.send(PlaybackCommand::Start)
    }

    fn stop(&mut self) {
        let _ = self.send(PlaybackCommand::Stop);
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let _ = self.send(PlaybackCommand::Quit);
    }

    fn set_listener(&mut self, listener: Option<Box<dyn LocationListener>>) {
        let listener = listener.unwrap_or_else(|| Box::new(NoopListener));
        let _ = self.send(PlaybackCommand::SetListener(listener));
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
        self.state.read().floor_level.clone()
    }

    fn last_location(&self) -> Option<LocationSample> {
        self.state.read().last_location.clone()
    }

    fn trace_id(&self) -> Option<String> {
        // No positioning session behind a playback run.
        None
    }
}
