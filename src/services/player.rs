//! Video player capability and its remote implementation

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Player states as reported by the embedded video player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    VideoCued,
}

impl PlayerState {
    /// Numeric code used by the embedded player API
    pub fn code(self) -> i32 {
        match self {
            PlayerState::Unstarted => -1,
            PlayerState::Ended => 0,
            PlayerState::Playing => 1,
            PlayerState::Paused => 2,
            PlayerState::Buffering => 3,
            PlayerState::VideoCued => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(PlayerState::Unstarted),
            0 => Some(PlayerState::Ended),
            1 => Some(PlayerState::Playing),
            2 => Some(PlayerState::Paused),
            3 => Some(PlayerState::Buffering),
            5 => Some(PlayerState::VideoCued),
            _ => None,
        }
    }
}

/// Callback invoked by a player on every state transition.
pub type StateListener = Box<dyn FnMut(PlayerState) + Send>;

/// An embeddable video player the quiz timer can drive.
pub trait VideoPlayer {
    /// Length of the loaded media in whole seconds.
    fn duration_secs(&self) -> u32;

    fn seek_to(&mut self, offset_secs: u32, allow_seek_ahead: bool);

    fn set_volume(&mut self, percent: u8);

    /// Whether `stop_video` does anything on this player.
    fn can_stop(&self) -> bool {
        true
    }

    fn stop_video(&mut self);

    /// Register the listener for state-change notifications.
    ///
    /// A player keeps a single listener; registering again replaces it.
    fn add_state_listener(&mut self, listener: StateListener);
}

/// Command queued for a player living on the other side of HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerCommand {
    Seek { offset_secs: u32, allow_seek_ahead: bool },
    Volume { percent: u8 },
    Stop,
}

/// Last known state of a remote player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub duration_secs: u32,
    pub position_secs: Option<u32>,
    pub volume: Option<u8>,
    pub stopped: bool,
    pub listening: bool,
}

struct PlayerLink {
    view: PlayerView,
    commands: Vec<PlayerCommand>,
    listener: Option<StateListener>,
}

/// Player embedded in a remote page.
///
/// Commands issued by the timer are queued until the page drains them, and
/// state notifications posted by the page are forwarded to the registered
/// listener. Clones share the same link.
#[derive(Clone)]
pub struct RemotePlayer {
    link: Arc<Mutex<PlayerLink>>,
}

impl RemotePlayer {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            link: Arc::new(Mutex::new(PlayerLink {
                view: PlayerView {
                    duration_secs,
                    position_secs: None,
                    volume: None,
                    stopped: false,
                    listening: false,
                },
                commands: Vec::new(),
                listener: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlayerLink> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forward a state change reported by the page.
    ///
    /// Returns false when no listener is registered yet; the notification
    /// is dropped in that case.
    pub fn notify(&self, state: PlayerState) -> bool {
        let mut link = self.lock();
        match link.listener.as_mut() {
            Some(listener) => {
                listener(state);
                true
            }
            None => {
                debug!("Dropping player state {:?}, no listener registered", state);
                false
            }
        }
    }

    /// Take every command queued since the last drain
    pub fn drain_commands(&self) -> Vec<PlayerCommand> {
        std::mem::take(&mut self.lock().commands)
    }

    pub fn view(&self) -> PlayerView {
        self.lock().view.clone()
    }
}

impl fmt::Debug for RemotePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemotePlayer").field("view", &self.view()).finish()
    }
}

impl VideoPlayer for RemotePlayer {
    fn duration_secs(&self) -> u32 {
        self.lock().view.duration_secs
    }

    fn seek_to(&mut self, offset_secs: u32, allow_seek_ahead: bool) {
        let mut link = self.lock();
        link.view.position_secs = Some(offset_secs);
        link.commands.push(PlayerCommand::Seek { offset_secs, allow_seek_ahead });
    }

    fn set_volume(&mut self, percent: u8) {
        let mut link = self.lock();
        link.view.volume = Some(percent);
        link.commands.push(PlayerCommand::Volume { percent });
    }

    fn stop_video(&mut self) {
        let mut link = self.lock();
        if link.view.stopped {
            warn!("Player stop requested twice");
        }
        link.view.stopped = true;
        link.commands.push(PlayerCommand::Stop);
    }

    fn add_state_listener(&mut self, listener: StateListener) {
        let mut link = self.lock();
        link.view.listening = true;
        link.listener = Some(listener);
    }
}
