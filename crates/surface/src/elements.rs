//! Addressable input endpoints and the declarative control map.
//!
//! Every physical control is an [`Element`]: a MIDI address (note or CC) on
//! the fixed channel plus a semantic name. For buttons the name doubles as
//! the key into the LED color table. [`layout`] enumerates the whole
//! surface as indexed channel strips, so wiring code iterates data instead
//! of capturing loop variables.

use crate::mapping::K2Mapping;
use crate::notes::{ENCODER_SWITCH_NAMES, MATRIX_NAMES, POT_SWITCH_NAMES};

/// The K2 ships on hardware MIDI channel 15, zero-indexed 14.
pub const MIDI_CHANNEL: u8 = 15 - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Momentary, note on/off
    Button,
    /// Absolute CC 0-127
    Fader,
    /// Absolute CC 0-127
    Knob,
    /// Relative CC, 1 = +1 tick, 127 = -1 tick
    Encoder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub channel: u8,
    pub number: u8,
    pub name: &'static str,
}

pub fn button(note: u8, name: &'static str) -> Element {
    Element {
        kind: ElementKind::Button,
        channel: MIDI_CHANNEL,
        number: note,
        name,
    }
}

pub fn fader(cc: u8, name: &'static str) -> Element {
    Element {
        kind: ElementKind::Fader,
        channel: MIDI_CHANNEL,
        number: cc,
        name,
    }
}

pub fn knob(cc: u8, name: &'static str) -> Element {
    Element {
        kind: ElementKind::Knob,
        channel: MIDI_CHANNEL,
        number: cc,
        name,
    }
}

pub fn encoder(cc: u8, name: &'static str) -> Element {
    Element {
        kind: ElementKind::Encoder,
        channel: MIDI_CHANNEL,
        number: cc,
        name,
    }
}

/// One channel strip: the column of controls bound to one session track.
#[derive(Debug, Clone, Copy)]
pub struct Strip {
    pub index: usize,
    pub fader: Element,
    pub eq_high: Element,
    pub eq_mid: Element,
    pub eq_low: Element,
    pub cut_high: Element,
    pub cut_mid: Element,
    pub cut_low: Element,
    pub mute: Element,
    pub solo: Element,
    pub kill: Element,
    pub stop: Element,
    pub scrobble: Element,
    pub scrobble_switch: Element,
}

/// The four channel strips, indexed left to right.
pub fn layout() -> Vec<Strip> {
    (0..K2Mapping::STRIPS)
        .map(|index| {
            let col = index as u8;
            Strip {
                index,
                fader: fader(K2Mapping::CC_FADER_FIRST + col, "fader"),
                eq_high: knob(K2Mapping::CC_EQ_HIGH_FIRST + col, "eq_high"),
                eq_mid: knob(K2Mapping::CC_EQ_MID_FIRST + col, "eq_mid"),
                eq_low: knob(K2Mapping::CC_EQ_LOW_FIRST + col, "eq_low"),
                cut_high: button(K2Mapping::NOTE_CUT_HIGH_FIRST + col, POT_SWITCH_NAMES[index]),
                cut_mid: button(
                    K2Mapping::NOTE_CUT_MID_FIRST + col,
                    POT_SWITCH_NAMES[4 + index],
                ),
                cut_low: button(
                    K2Mapping::NOTE_CUT_LOW_FIRST + col,
                    POT_SWITCH_NAMES[8 + index],
                ),
                mute: button(K2Mapping::NOTE_MUTE_FIRST + col, MATRIX_NAMES[index]),
                solo: button(K2Mapping::NOTE_SOLO_FIRST + col, MATRIX_NAMES[4 + index]),
                kill: button(K2Mapping::NOTE_KILL_FIRST + col, MATRIX_NAMES[8 + index]),
                stop: button(K2Mapping::NOTE_STOP_FIRST + col, MATRIX_NAMES[12 + index]),
                scrobble: encoder(K2Mapping::CC_SCROBBLE_FIRST + col, "scrobble"),
                scrobble_switch: button(
                    K2Mapping::NOTE_SCROBBLE_SWITCH_FIRST + col,
                    ENCODER_SWITCH_NAMES[index],
                ),
            }
        })
        .collect()
}

/// Global (non-strip) controls.
pub struct GlobalControls {
    pub tempo_coarse: Element,
    pub tempo_coarse_push: Element,
    pub tempo_fine: Element,
    pub tempo_fine_push: Element,
    pub nudge_down: Element,
    pub nudge_up: Element,
}

pub fn global_controls() -> GlobalControls {
    GlobalControls {
        tempo_coarse: encoder(K2Mapping::CC_TEMPO_COARSE, "tempo_coarse"),
        tempo_coarse_push: button(K2Mapping::NOTE_TEMPO_COARSE_PUSH, "tempo_coarse_push"),
        tempo_fine: encoder(K2Mapping::CC_TEMPO_FINE, "tempo_fine"),
        tempo_fine_push: button(K2Mapping::NOTE_TEMPO_FINE_PUSH, "tempo_fine_push"),
        nudge_down: button(K2Mapping::NOTE_LAYER, "layer_button"),
        nudge_up: button(K2Mapping::NOTE_EXIT, "exit_button"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_has_four_strips() {
        let strips = layout();
        assert_eq!(strips.len(), 4);
        for (i, strip) in strips.iter().enumerate() {
            assert_eq!(strip.index, i);
        }
    }

    #[test]
    fn test_strip_zero_addresses() {
        let strip = layout()[0];
        assert_eq!(strip.fader.number, 16);
        assert_eq!(strip.eq_high.number, 4);
        assert_eq!(strip.eq_low.number, 12);
        assert_eq!(strip.mute.number, 36);
        assert_eq!(strip.stop.number, 24);
        assert_eq!(strip.scrobble.number, 0);
        assert_eq!(strip.mute.name, "matrix_button_a");
        assert_eq!(strip.stop.name, "matrix_button_m");
    }

    #[test]
    fn test_all_elements_on_fixed_channel() {
        for strip in layout() {
            assert_eq!(strip.fader.channel, MIDI_CHANNEL);
            assert_eq!(strip.mute.channel, MIDI_CHANNEL);
        }
        assert_eq!(global_controls().nudge_down.channel, MIDI_CHANNEL);
    }

    #[test]
    fn test_button_led_names_resolve() {
        let table = crate::notes::element_color_table();
        for strip in layout() {
            for element in [
                strip.cut_high,
                strip.cut_mid,
                strip.cut_low,
                strip.mute,
                strip.solo,
                strip.kill,
                strip.stop,
                strip.scrobble_switch,
            ] {
                assert!(
                    table.contains_key(element.name),
                    "{} has no LED entry",
                    element.name
                );
                // A button's own note is its red LED note.
                assert_eq!(table[element.name].red, element.number);
            }
        }
    }
}
