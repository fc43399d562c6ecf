//! Channel-message parsing and building.

/// MIDI messages the surface cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// (note, velocity)
    NoteOn(u8, u8),
    NoteOff(u8),
    /// (controller number, value)
    ControlChange(u8, u8),
}

/// Parse a raw channel message addressed to `channel` (0-15).
///
/// Messages on other channels and non-channel messages are dropped. A
/// note-on with velocity 0 folds to [`MidiMessage::NoteOff`].
pub fn parse(channel: u8, message: &[u8]) -> Option<MidiMessage> {
    if message.len() < 3 {
        return None;
    }
    if message[0] & 0x0F != channel {
        return None;
    }
    match message[0] & 0xF0 {
        0x90 => {
            if message[2] > 0 {
                Some(MidiMessage::NoteOn(message[1], message[2]))
            } else {
                Some(MidiMessage::NoteOff(message[1]))
            }
        }
        0x80 => Some(MidiMessage::NoteOff(message[1])),
        0xB0 => Some(MidiMessage::ControlChange(message[1], message[2])),
        _ => None,
    }
}

/// Build a note-on wire message on `channel`.
pub fn note_on(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

/// Build a note-off wire message on `channel`.
pub fn note_off(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}
