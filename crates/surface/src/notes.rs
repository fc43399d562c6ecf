//! Static note and LED tables from the K2 MIDI implementation chart.
//!
//! The chart addresses everything by note name, so the tables are built the
//! same way: a pitch-class/octave enumeration first, then the per-element
//! color table derived from it. Matrix buttons, pot switches, and encoder
//! switches light red on their own note, orange at note+36, and green at
//! note+72; the two bottom buttons (layer/exit) use +4/+8 instead.

use std::collections::HashMap;

use crate::feedback::LedColor;

pub const PITCH_CLASSES: [&str; 12] = [
    "c", "c#", "d", "d#", "e", "f", "f#", "g", "g#", "a", "a#", "b",
];

pub const MATRIX_NAMES: [&str; 16] = [
    "matrix_button_a",
    "matrix_button_b",
    "matrix_button_c",
    "matrix_button_d",
    "matrix_button_e",
    "matrix_button_f",
    "matrix_button_g",
    "matrix_button_h",
    "matrix_button_i",
    "matrix_button_j",
    "matrix_button_k",
    "matrix_button_l",
    "matrix_button_m",
    "matrix_button_n",
    "matrix_button_o",
    "matrix_button_p",
];

pub const POT_SWITCH_NAMES: [&str; 12] = [
    "pot_switch_1",
    "pot_switch_2",
    "pot_switch_3",
    "pot_switch_4",
    "pot_switch_5",
    "pot_switch_6",
    "pot_switch_7",
    "pot_switch_8",
    "pot_switch_9",
    "pot_switch_10",
    "pot_switch_11",
    "pot_switch_12",
];

pub const ENCODER_SWITCH_NAMES: [&str; 4] = [
    "encoder_switch_1",
    "encoder_switch_2",
    "encoder_switch_3",
    "encoder_switch_4",
];

/// Enumerate 12 pitch classes across octaves -1..=9 in chart order.
///
/// Keys are labels like "c#1" or "g4"; values count up from 0, so the table
/// is injective by construction. The top four labels (g#9..b9) exceed 127
/// and are never referenced by the chart.
pub fn note_table() -> HashMap<String, u8> {
    let mut table = HashMap::new();
    let mut number: u8 = 0;
    for octave in -1..=9 {
        for pitch in PITCH_CLASSES {
            table.insert(format!("{pitch}{octave}"), number);
            number += 1;
        }
    }
    table
}

/// The three LED notes of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementLeds {
    pub red: u8,
    pub orange: u8,
    pub green: u8,
}

impl ElementLeds {
    /// Matrix/pot/encoder layering: orange and green sit 3 and 6 octaves
    /// above the red note.
    fn layered(red: u8) -> Self {
        Self {
            red,
            orange: red + 36,
            green: red + 72,
        }
    }

    pub fn note(&self, color: LedColor) -> u8 {
        match color {
            LedColor::Red => self.red,
            LedColor::Orange => self.orange,
            LedColor::Green => self.green,
        }
    }
}

/// Element name -> LED notes, covering every light on the surface.
pub fn element_color_table() -> HashMap<&'static str, ElementLeds> {
    let notes = note_table();
    let note = |name: &str| notes[name];

    let mut table = HashMap::new();

    // Matrix rows top to bottom: a-d, e-h, i-l, m-p.
    let matrix_row_bases = [note("c2"), note("g#1"), note("e1"), note("c1")];
    for (row, base) in matrix_row_bases.into_iter().enumerate() {
        for col in 0..4 {
            table.insert(
                MATRIX_NAMES[row * 4 + col],
                ElementLeds::layered(base + col as u8),
            );
        }
    }

    // Pot switch rows top to bottom.
    let pot_row_bases = [note("c3"), note("g#2"), note("e2")];
    for (row, base) in pot_row_bases.into_iter().enumerate() {
        for col in 0..4 {
            table.insert(
                POT_SWITCH_NAMES[row * 4 + col],
                ElementLeds::layered(base + col as u8),
            );
        }
    }

    for (col, name) in ENCODER_SWITCH_NAMES.into_iter().enumerate() {
        table.insert(name, ElementLeds::layered(note("e3") + col as u8));
    }

    // The bottom buttons pack their three colors 4 semitones apart.
    table.insert(
        "layer_button",
        ElementLeds {
            red: note("c0"),
            orange: note("e0"),
            green: note("g#0"),
        },
    );
    table.insert(
        "exit_button",
        ElementLeds {
            red: note("d#0"),
            orange: note("g0"),
            green: note("b0"),
        },
    );

    table
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_note_table_is_injective() {
        let table = note_table();
        assert_eq!(table.len(), 132);
        let values: HashSet<u8> = table.values().copied().collect();
        assert_eq!(values.len(), 132);
    }

    #[test]
    fn test_note_table_chart_anchors() {
        let table = note_table();
        assert_eq!(table["c-1"], 0);
        assert_eq!(table["c0"], 12);
        assert_eq!(table["c#1"], 25);
        assert_eq!(table["g4"], 67);
    }

    #[test]
    fn test_every_element_color_is_a_valid_note() {
        for (name, leds) in element_color_table() {
            for color in LedColor::ALL {
                assert!(leds.note(color) <= 127, "{name} {color:?} out of range");
            }
        }
    }

    #[test]
    fn test_element_colors_are_distinct() {
        for (name, leds) in element_color_table() {
            let unique: HashSet<u8> = LedColor::ALL.iter().map(|&c| leds.note(c)).collect();
            assert_eq!(unique.len(), 3, "{name} reuses a note across colors");
        }
    }

    #[test]
    fn test_no_note_shared_within_a_color_layer() {
        let table = element_color_table();
        for color in LedColor::ALL {
            let notes: HashSet<u8> = table.values().map(|leds| leds.note(color)).collect();
            assert_eq!(notes.len(), table.len());
        }
    }

    #[test]
    fn test_full_element_count() {
        // 16 matrix + 12 pot switches + 4 encoder switches + layer + exit
        assert_eq!(element_color_table().len(), 34);
    }

    #[test]
    fn test_layer_button_matches_chart() {
        let table = element_color_table();
        let leds = table["layer_button"];
        assert_eq!((leds.red, leds.orange, leds.green), (12, 16, 20));
    }

    #[test]
    fn test_matrix_a_matches_chart() {
        let table = element_color_table();
        let leds = table["matrix_button_a"];
        assert_eq!((leds.red, leds.orange, leds.green), (36, 72, 108));
    }
}
