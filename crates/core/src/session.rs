//! The contract between a control surface and the host session.
//!
//! The surface never mutates session state directly: it sends
//! [`SessionCommand`]s and redraws from [`SessionEvent`]s. Every event
//! carries the new value so a redraw handler can be re-run any number of
//! times without drifting.

/// One band of a track's 3-band EQ device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EqBand {
    Low = 0,
    Mid = 1,
    High = 2,
}

impl EqBand {
    pub const ALL: [EqBand; 3] = [EqBand::Low, EqBand::Mid, EqBand::High];
}

/// Direction of a tempo nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NudgeDirection {
    Down,
    Up,
}

/// One parameter of a device, as reported in a device-list change.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    pub name: String,
    pub value: f32,
}

/// One device on a track, as reported in a device-list change.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub name: String,
    pub parameters: Vec<ParameterSnapshot>,
}

impl DeviceSnapshot {
    /// Index of the named parameter, if the device has one.
    pub fn parameter(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }
}

/// Commands sent from the surface to the host session.
///
/// All commands are fire-and-forget: the host applies them synchronously and
/// reports the outcome through [`SessionEvent`]s. There is no retry or
/// rollback.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    ToggleMute {
        track: usize,
    },
    ToggleSolo {
        track: usize,
    },
    /// Stop all clips playing on a track.
    StopTrack {
        track: usize,
    },
    SetVolume {
        track: usize,
        gain: f32,
    },
    SetParameter {
        track: usize,
        device: usize,
        parameter: usize,
        value: f32,
    },
    /// Flip a 0/1-valued parameter (EQ band cut, device on/off).
    ToggleParameter {
        track: usize,
        device: usize,
        parameter: usize,
    },
    /// Move the playing clip's position by a number of beats
    /// (negative = backwards).
    ScrubBy {
        track: usize,
        beats: f64,
    },
    AdjustTempo {
        delta: f64,
    },
    SetNudge {
        direction: NudgeDirection,
        active: bool,
    },
}

/// Change notifications reported by the host session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MuteChanged {
        track: usize,
        muted: bool,
    },
    SoloChanged {
        track: usize,
        soloed: bool,
    },
    VolumeChanged {
        track: usize,
        gain: f32,
    },
    /// The track's device list was replaced. Bindings derived from a previous
    /// list are stale and must be resolved again from this snapshot.
    DevicesChanged {
        track: usize,
        devices: Vec<DeviceSnapshot>,
    },
    ParameterChanged {
        track: usize,
        device: usize,
        parameter: usize,
        value: f32,
    },
    PlayingSlotChanged {
        track: usize,
        slot: Option<usize>,
    },
    TempoChanged {
        tempo: f64,
    },
    NudgeChanged {
        direction: NudgeDirection,
        active: bool,
    },
}
