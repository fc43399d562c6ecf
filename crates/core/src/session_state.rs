//! Loopback session host.
//!
//! A minimal in-memory stand-in for a real session host, used by the binary
//! for standalone bring-up and by tests. It applies [`SessionCommand`]s and
//! reports the resulting [`SessionEvent`]s. It is deliberately not a DAW
//! model: no clips, automation, or audio.

use crate::session::{
    DeviceSnapshot, NudgeDirection, ParameterSnapshot, SessionCommand, SessionEvent,
};

const MIN_TEMPO: f64 = 20.0;
const MAX_TEMPO: f64 = 999.0;

#[derive(Debug, Clone)]
pub struct TrackState {
    pub muted: bool,
    pub soloed: bool,
    pub gain: f32,
    pub devices: Vec<DeviceSnapshot>,
    pub playing_slot: Option<usize>,
    pub position_beats: f64,
}

impl Default for TrackState {
    fn default() -> Self {
        Self {
            muted: false,
            soloed: false,
            gain: 0.85,
            devices: Vec::new(),
            playing_slot: None,
            position_beats: 0.0,
        }
    }
}

pub struct SessionState {
    tracks: Vec<TrackState>,
    tempo: f64,
    nudge_down: bool,
    nudge_up: bool,
}

impl SessionState {
    pub fn new(track_count: usize) -> Self {
        Self {
            tracks: vec![TrackState::default(); track_count],
            tempo: 120.0,
            nudge_down: false,
            nudge_up: false,
        }
    }

    /// A session where every track carries a stock 3-band EQ device.
    pub fn with_eq_devices(track_count: usize) -> Self {
        let mut state = Self::new(track_count);
        for track in &mut state.tracks {
            track.devices = vec![eq_three()];
        }
        state
    }

    pub fn track(&self, index: usize) -> Option<&TrackState> {
        self.tracks.get(index)
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn nudge(&self, direction: NudgeDirection) -> bool {
        match direction {
            NudgeDirection::Down => self.nudge_down,
            NudgeDirection::Up => self.nudge_up,
        }
    }

    /// Replace a track's device list, as a host would on device add/remove.
    pub fn set_devices(
        &mut self,
        track: usize,
        devices: Vec<DeviceSnapshot>,
    ) -> Option<SessionEvent> {
        let state = self.tracks.get_mut(track)?;
        state.devices = devices.clone();
        Some(SessionEvent::DevicesChanged { track, devices })
    }

    /// Full-state events for a surface that just attached.
    pub fn snapshot_events(&self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for (track, state) in self.tracks.iter().enumerate() {
            events.push(SessionEvent::DevicesChanged {
                track,
                devices: state.devices.clone(),
            });
            events.push(SessionEvent::MuteChanged {
                track,
                muted: state.muted,
            });
            events.push(SessionEvent::SoloChanged {
                track,
                soloed: state.soloed,
            });
            events.push(SessionEvent::VolumeChanged {
                track,
                gain: state.gain,
            });
            events.push(SessionEvent::PlayingSlotChanged {
                track,
                slot: state.playing_slot,
            });
        }
        events.push(SessionEvent::TempoChanged { tempo: self.tempo });
        events
    }

    /// Apply one command and report the resulting change notifications.
    ///
    /// Commands addressing missing tracks, devices, or parameters are
    /// dropped with a debug log line, mirroring a host that ignores stale
    /// surface input.
    pub fn apply(&mut self, command: &SessionCommand) -> Vec<SessionEvent> {
        match *command {
            SessionCommand::ToggleMute { track } => {
                let Some(state) = self.tracks.get_mut(track) else {
                    log::debug!("ToggleMute for unknown track {track}");
                    return Vec::new();
                };
                state.muted = !state.muted;
                vec![SessionEvent::MuteChanged {
                    track,
                    muted: state.muted,
                }]
            }
            SessionCommand::ToggleSolo { track } => {
                let Some(state) = self.tracks.get_mut(track) else {
                    log::debug!("ToggleSolo for unknown track {track}");
                    return Vec::new();
                };
                state.soloed = !state.soloed;
                vec![SessionEvent::SoloChanged {
                    track,
                    soloed: state.soloed,
                }]
            }
            SessionCommand::StopTrack { track } => {
                let Some(state) = self.tracks.get_mut(track) else {
                    log::debug!("StopTrack for unknown track {track}");
                    return Vec::new();
                };
                state.playing_slot = None;
                vec![SessionEvent::PlayingSlotChanged { track, slot: None }]
            }
            SessionCommand::SetVolume { track, gain } => {
                let Some(state) = self.tracks.get_mut(track) else {
                    log::debug!("SetVolume for unknown track {track}");
                    return Vec::new();
                };
                state.gain = gain.clamp(0.0, 1.0);
                vec![SessionEvent::VolumeChanged {
                    track,
                    gain: state.gain,
                }]
            }
            SessionCommand::SetParameter {
                track,
                device,
                parameter,
                value,
            } => match self.parameter_mut(track, device, parameter) {
                Some(param) => {
                    param.value = value;
                    vec![SessionEvent::ParameterChanged {
                        track,
                        device,
                        parameter,
                        value,
                    }]
                }
                None => {
                    log::debug!("SetParameter for unknown {track}/{device}/{parameter}");
                    Vec::new()
                }
            },
            SessionCommand::ToggleParameter {
                track,
                device,
                parameter,
            } => match self.parameter_mut(track, device, parameter) {
                Some(param) => {
                    param.value = if param.value == 0.0 { 1.0 } else { 0.0 };
                    let value = param.value;
                    vec![SessionEvent::ParameterChanged {
                        track,
                        device,
                        parameter,
                        value,
                    }]
                }
                None => {
                    log::debug!("ToggleParameter for unknown {track}/{device}/{parameter}");
                    Vec::new()
                }
            },
            SessionCommand::ScrubBy { track, beats } => {
                let Some(state) = self.tracks.get_mut(track) else {
                    log::debug!("ScrubBy for unknown track {track}");
                    return Vec::new();
                };
                state.position_beats = (state.position_beats + beats).max(0.0);
                Vec::new()
            }
            SessionCommand::AdjustTempo { delta } => {
                self.tempo = (self.tempo + delta).clamp(MIN_TEMPO, MAX_TEMPO);
                vec![SessionEvent::TempoChanged { tempo: self.tempo }]
            }
            SessionCommand::SetNudge { direction, active } => {
                match direction {
                    NudgeDirection::Down => self.nudge_down = active,
                    NudgeDirection::Up => self.nudge_up = active,
                }
                vec![SessionEvent::NudgeChanged { direction, active }]
            }
        }
    }

    fn parameter_mut(
        &mut self,
        track: usize,
        device: usize,
        parameter: usize,
    ) -> Option<&mut ParameterSnapshot> {
        self.tracks
            .get_mut(track)?
            .devices
            .get_mut(device)?
            .parameters
            .get_mut(parameter)
    }
}

/// Stock EQ Three device snapshot: gain per band at 0 dB, all bands on.
pub fn eq_three() -> DeviceSnapshot {
    let param = |name: &str, value: f32| ParameterSnapshot {
        name: name.to_string(),
        value,
    };
    DeviceSnapshot {
        name: "EQ Three".to_string(),
        parameters: vec![
            param("Device On", 1.0),
            param("GainLo", 0.85),
            param("GainMid", 0.85),
            param("GainHi", 0.85),
            param("LowOn", 1.0),
            param("MidOn", 1.0),
            param("HighOn", 1.0),
            param("FreqLo", 0.5),
            param("FreqHi", 0.5),
        ],
    }
}
