pub use config::{ConfigError, ConfigManager, Settings};
pub use midi::{note_off, note_on, MidiMessage};
pub use modules::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage};
pub use session::{
    DeviceSnapshot, EqBand, NudgeDirection, ParameterSnapshot, SessionCommand, SessionEvent,
};
pub use session_state::{eq_three, SessionState, TrackState};

mod config;
pub mod midi;
mod modules;
pub mod session;
mod session_state;
