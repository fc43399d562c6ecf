//! LED feedback state.
//!
//! Tracks the desired color of every element and generates the wire
//! messages to get the hardware there. The K2 firmware keeps an independent
//! on/off bit per color layer, so showing one color means note-on for that
//! layer and note-off for the other two.

use std::collections::{HashMap, HashSet};

use xonek2_core::midi::{note_off, note_on};

use crate::notes::{element_color_table, ElementLeds};

/// The three LED layers of a K2 element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedColor {
    Red,
    Orange,
    Green,
}

impl LedColor {
    pub const ALL: [LedColor; 3] = [LedColor::Red, LedColor::Orange, LedColor::Green];
}

const LED_VELOCITY: u8 = 127;

/// Current color per element, with dirty tracking.
///
/// Setting an element to the color it already shows is a no-op, so redraw
/// handlers may run redundantly without producing traffic.
pub struct LedState {
    channel: u8,
    table: HashMap<&'static str, ElementLeds>,
    current: HashMap<&'static str, Option<LedColor>>,
    dirty: HashSet<&'static str>,
}

impl LedState {
    pub fn new(channel: u8) -> Self {
        let table = element_color_table();
        let current = table.keys().map(|&name| (name, None)).collect();
        Self {
            channel,
            table,
            current,
            dirty: HashSet::new(),
        }
    }

    pub fn light_up(&mut self, element: &str, color: LedColor) {
        self.set(element, Some(color));
    }

    pub fn dim(&mut self, element: &str) {
        self.set(element, None);
    }

    /// Current color of an element, if it exists and is lit.
    pub fn color(&self, element: &str) -> Option<LedColor> {
        self.current.get(element).copied().flatten()
    }

    fn set(&mut self, element: &str, color: Option<LedColor>) {
        let Some((&name, _)) = self.table.get_key_value(element) else {
            tracing::warn!("Unknown LED element '{element}'");
            return;
        };
        if self.current[name] != color {
            self.current.insert(name, color);
            self.dirty.insert(name);
        }
    }

    /// Dim every element.
    pub fn clear(&mut self) {
        let names: Vec<&'static str> = self.table.keys().copied().collect();
        for name in names {
            self.set(name, None);
        }
    }

    /// Wire messages for every element changed since the last flush.
    pub fn to_midi_messages(&mut self) -> Vec<[u8; 3]> {
        let mut names: Vec<&'static str> = self.dirty.drain().collect();
        names.sort_unstable();

        let mut messages = Vec::with_capacity(names.len() * 3);
        for name in names {
            let leds = self.table[name];
            let active = self.current[name];
            for color in LedColor::ALL {
                let message = if active == Some(color) {
                    note_on(self.channel, leds.note(color), LED_VELOCITY)
                } else {
                    note_off(self.channel, leds.note(color), LED_VELOCITY)
                };
                messages.push(message);
            }
        }
        messages
    }

    /// Full off sweep: one pass per color layer over every element, used at
    /// construction and teardown to reach a known-dark state regardless of
    /// what the firmware currently shows.
    pub fn reset_messages(&self) -> Vec<[u8; 3]> {
        let mut names: Vec<&'static str> = self.table.keys().copied().collect();
        names.sort_unstable();

        let mut messages = Vec::with_capacity(names.len() * 3);
        for color in LedColor::ALL {
            for &name in &names {
                messages.push(note_off(self.channel, self.table[name].note(color), LED_VELOCITY));
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_up_emits_one_on_and_two_offs() {
        let mut leds = LedState::new(14);
        leds.light_up("matrix_button_a", LedColor::Red);

        let messages = leds.to_midi_messages();
        assert_eq!(messages.len(), 3);
        // Red layer on, orange and green layers off.
        assert!(messages.contains(&[0x9E, 36, 127]));
        assert!(messages.contains(&[0x8E, 72, 127]));
        assert!(messages.contains(&[0x8E, 108, 127]));
    }

    #[test]
    fn test_redundant_redraw_is_silent() {
        let mut leds = LedState::new(14);
        leds.light_up("matrix_button_a", LedColor::Green);
        assert!(!leds.to_midi_messages().is_empty());

        leds.light_up("matrix_button_a", LedColor::Green);
        assert!(leds.to_midi_messages().is_empty());
        assert_eq!(leds.color("matrix_button_a"), Some(LedColor::Green));
    }

    #[test]
    fn test_dim_turns_all_layers_off() {
        let mut leds = LedState::new(14);
        leds.light_up("layer_button", LedColor::Orange);
        leds.to_midi_messages();

        leds.dim("layer_button");
        let messages = leds.to_midi_messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m[0] == 0x8E));
    }

    #[test]
    fn test_dim_when_already_dark_is_silent() {
        let mut leds = LedState::new(14);
        leds.dim("matrix_button_p");
        assert!(leds.to_midi_messages().is_empty());
    }

    #[test]
    fn test_unknown_element_is_ignored() {
        let mut leds = LedState::new(14);
        leds.light_up("flux_capacitor", LedColor::Red);
        assert!(leds.to_midi_messages().is_empty());
    }

    #[test]
    fn test_reset_covers_three_passes() {
        let leds = LedState::new(14);
        let messages = leds.reset_messages();
        // 34 elements, one note-off per element per color layer.
        assert_eq!(messages.len(), 34 * 3);
        assert!(messages.iter().all(|m| m[0] == 0x8E && m[2] == 127));
    }

    #[test]
    fn test_clear_dims_everything_lit() {
        let mut leds = LedState::new(14);
        leds.light_up("matrix_button_a", LedColor::Red);
        leds.light_up("exit_button", LedColor::Green);
        leds.to_midi_messages();

        leds.clear();
        let messages = leds.to_midi_messages();
        // Only the two lit elements were dirty.
        assert_eq!(messages.len(), 6);
        assert!(messages.iter().all(|m| m[0] == 0x8E));
    }
}
