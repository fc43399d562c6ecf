//! Xone:K2 MIDI mapping.
//!
//! Translates raw note/CC numbers into session commands. Translation is
//! stateless; the two pieces of transient state that affect it (which
//! encoder switches are held) live in [`HeldState`] and are owned by the
//! module.

use xonek2_core::session::{EqBand, NudgeDirection, SessionCommand};

use crate::bindings::EqBinding;
use crate::curves::{eq_knob_to_gain, fader_to_gain, relative_delta};

/// Beats moved per scrobble tick: 4 bars normally, 1 beat while the
/// encoder's switch is held.
const SCROBBLE_COARSE_BEATS: f64 = 16.0;
const SCROBBLE_FINE_BEATS: f64 = 1.0;

/// BPM per tempo encoder tick, unheld/held.
const TEMPO_COARSE_STEPS: (f64, f64) = (1.0, 0.1);
const TEMPO_FINE_STEPS: (f64, f64) = (0.1, 0.01);

/// Xone:K2 note and CC constants, per the vendor MIDI implementation chart.
pub struct K2Mapping;

impl K2Mapping {
    pub const STRIPS: usize = 4;

    // === Encoders and knobs (CC, left to right per row) ===
    pub const CC_SCROBBLE_FIRST: u8 = 0;
    pub const CC_SCROBBLE_LAST: u8 = 3;
    pub const CC_EQ_HIGH_FIRST: u8 = 4;
    pub const CC_EQ_HIGH_LAST: u8 = 7;
    pub const CC_EQ_MID_FIRST: u8 = 8;
    pub const CC_EQ_MID_LAST: u8 = 11;
    pub const CC_EQ_LOW_FIRST: u8 = 12;
    pub const CC_EQ_LOW_LAST: u8 = 15;
    pub const CC_FADER_FIRST: u8 = 16;
    pub const CC_FADER_LAST: u8 = 19;
    pub const CC_TEMPO_COARSE: u8 = 20;
    pub const CC_TEMPO_FINE: u8 = 21;

    // === Buttons (notes) ===
    pub const NOTE_SCROBBLE_SWITCH_FIRST: u8 = 52;
    pub const NOTE_SCROBBLE_SWITCH_LAST: u8 = 55;
    pub const NOTE_CUT_HIGH_FIRST: u8 = 48;
    pub const NOTE_CUT_HIGH_LAST: u8 = 51;
    pub const NOTE_CUT_MID_FIRST: u8 = 44;
    pub const NOTE_CUT_MID_LAST: u8 = 47;
    pub const NOTE_CUT_LOW_FIRST: u8 = 40;
    pub const NOTE_CUT_LOW_LAST: u8 = 43;

    // Matrix rows, top to bottom
    pub const NOTE_MUTE_FIRST: u8 = 36;
    pub const NOTE_MUTE_LAST: u8 = 39;
    pub const NOTE_SOLO_FIRST: u8 = 32;
    pub const NOTE_SOLO_LAST: u8 = 35;
    pub const NOTE_KILL_FIRST: u8 = 28;
    pub const NOTE_KILL_LAST: u8 = 31;
    pub const NOTE_STOP_FIRST: u8 = 24;
    pub const NOTE_STOP_LAST: u8 = 27;

    // Bottom row
    pub const NOTE_LAYER: u8 = 12;
    pub const NOTE_TEMPO_COARSE_PUSH: u8 = 13;
    pub const NOTE_TEMPO_FINE_PUSH: u8 = 14;
    pub const NOTE_EXIT: u8 = 15;

    /// Translate a button press. `bindings` supplies the per-track EQ
    /// targets; a press on an unbound EQ control translates to nothing.
    pub fn translate_note_on(note: u8, bindings: &[EqBinding]) -> Option<SessionCommand> {
        match note {
            Self::NOTE_MUTE_FIRST..=Self::NOTE_MUTE_LAST => Some(SessionCommand::ToggleMute {
                track: (note - Self::NOTE_MUTE_FIRST) as usize,
            }),
            Self::NOTE_SOLO_FIRST..=Self::NOTE_SOLO_LAST => Some(SessionCommand::ToggleSolo {
                track: (note - Self::NOTE_SOLO_FIRST) as usize,
            }),
            Self::NOTE_STOP_FIRST..=Self::NOTE_STOP_LAST => Some(SessionCommand::StopTrack {
                track: (note - Self::NOTE_STOP_FIRST) as usize,
            }),
            Self::NOTE_KILL_FIRST..=Self::NOTE_KILL_LAST => {
                let track = (note - Self::NOTE_KILL_FIRST) as usize;
                let (device, parameter) = bindings.get(track)?.kill_parameter()?;
                Some(SessionCommand::ToggleParameter {
                    track,
                    device,
                    parameter,
                })
            }
            Self::NOTE_CUT_HIGH_FIRST..=Self::NOTE_CUT_HIGH_LAST => {
                Self::cut(note, Self::NOTE_CUT_HIGH_FIRST, EqBand::High, bindings)
            }
            Self::NOTE_CUT_MID_FIRST..=Self::NOTE_CUT_MID_LAST => {
                Self::cut(note, Self::NOTE_CUT_MID_FIRST, EqBand::Mid, bindings)
            }
            Self::NOTE_CUT_LOW_FIRST..=Self::NOTE_CUT_LOW_LAST => {
                Self::cut(note, Self::NOTE_CUT_LOW_FIRST, EqBand::Low, bindings)
            }
            Self::NOTE_LAYER => Some(SessionCommand::SetNudge {
                direction: NudgeDirection::Down,
                active: true,
            }),
            Self::NOTE_EXIT => Some(SessionCommand::SetNudge {
                direction: NudgeDirection::Up,
                active: true,
            }),
            _ => None,
        }
    }

    /// Translate a button release. Only the nudge buttons act on release.
    pub fn translate_note_off(note: u8) -> Option<SessionCommand> {
        match note {
            Self::NOTE_LAYER => Some(SessionCommand::SetNudge {
                direction: NudgeDirection::Down,
                active: false,
            }),
            Self::NOTE_EXIT => Some(SessionCommand::SetNudge {
                direction: NudgeDirection::Up,
                active: false,
            }),
            _ => None,
        }
    }

    /// Translate a control change from a fader, knob, or encoder.
    pub fn translate_cc(
        cc: u8,
        value: u8,
        held: &HeldState,
        bindings: &[EqBinding],
    ) -> Option<SessionCommand> {
        match cc {
            Self::CC_FADER_FIRST..=Self::CC_FADER_LAST => Some(SessionCommand::SetVolume {
                track: (cc - Self::CC_FADER_FIRST) as usize,
                gain: fader_to_gain(value),
            }),
            Self::CC_EQ_HIGH_FIRST..=Self::CC_EQ_HIGH_LAST => {
                Self::eq_gain(cc, Self::CC_EQ_HIGH_FIRST, EqBand::High, value, bindings)
            }
            Self::CC_EQ_MID_FIRST..=Self::CC_EQ_MID_LAST => {
                Self::eq_gain(cc, Self::CC_EQ_MID_FIRST, EqBand::Mid, value, bindings)
            }
            Self::CC_EQ_LOW_FIRST..=Self::CC_EQ_LOW_LAST => {
                Self::eq_gain(cc, Self::CC_EQ_LOW_FIRST, EqBand::Low, value, bindings)
            }
            Self::CC_SCROBBLE_FIRST..=Self::CC_SCROBBLE_LAST => {
                let track = (cc - Self::CC_SCROBBLE_FIRST) as usize;
                let delta = relative_delta(value);
                if delta == 0 {
                    return None;
                }
                let step = if held.scrobble[track] {
                    SCROBBLE_FINE_BEATS
                } else {
                    SCROBBLE_COARSE_BEATS
                };
                Some(SessionCommand::ScrubBy {
                    track,
                    beats: f64::from(delta) * step,
                })
            }
            Self::CC_TEMPO_COARSE => {
                Self::tempo(value, TEMPO_COARSE_STEPS, held.tempo_coarse)
            }
            Self::CC_TEMPO_FINE => Self::tempo(value, TEMPO_FINE_STEPS, held.tempo_fine),
            _ => None,
        }
    }

    fn cut(
        note: u8,
        first: u8,
        band: EqBand,
        bindings: &[EqBinding],
    ) -> Option<SessionCommand> {
        let track = (note - first) as usize;
        let (device, parameter) = bindings.get(track)?.cut_parameter(band)?;
        Some(SessionCommand::ToggleParameter {
            track,
            device,
            parameter,
        })
    }

    fn eq_gain(
        cc: u8,
        first: u8,
        band: EqBand,
        value: u8,
        bindings: &[EqBinding],
    ) -> Option<SessionCommand> {
        let track = (cc - first) as usize;
        let (device, parameter) = bindings.get(track)?.gain_parameter(band)?;
        Some(SessionCommand::SetParameter {
            track,
            device,
            parameter,
            value: eq_knob_to_gain(value),
        })
    }

    fn tempo(value: u8, steps: (f64, f64), held: bool) -> Option<SessionCommand> {
        let delta = relative_delta(value);
        if delta == 0 {
            return None;
        }
        let step = if held { steps.1 } else { steps.0 };
        Some(SessionCommand::AdjustTempo {
            delta: f64::from(delta) * step,
        })
    }
}

/// Which modifier switches are currently held down.
///
/// One implicit two-state machine per push-modified control; the state only
/// selects the step size of the next rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldState {
    pub scrobble: [bool; 4],
    pub tempo_coarse: bool,
    pub tempo_fine: bool,
}

impl HeldState {
    /// Record a press; returns true if the note was a tracked modifier.
    pub fn note_on(&mut self, note: u8) -> bool {
        self.set(note, true)
    }

    /// Record a release; returns true if the note was a tracked modifier.
    pub fn note_off(&mut self, note: u8) -> bool {
        self.set(note, false)
    }

    fn set(&mut self, note: u8, held: bool) -> bool {
        match note {
            K2Mapping::NOTE_SCROBBLE_SWITCH_FIRST..=K2Mapping::NOTE_SCROBBLE_SWITCH_LAST => {
                self.scrobble[(note - K2Mapping::NOTE_SCROBBLE_SWITCH_FIRST) as usize] = held;
                true
            }
            K2Mapping::NOTE_TEMPO_COARSE_PUSH => {
                self.tempo_coarse = held;
                true
            }
            K2Mapping::NOTE_TEMPO_FINE_PUSH => {
                self.tempo_fine = held;
                true
            }
            _ => false,
        }
    }
}
