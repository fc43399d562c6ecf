//! Allen & Heath Xone:K2 control surface driver.
//!
//! Translates the K2's buttons, faders, knobs, and encoders into session
//! commands and mirrors session state back onto the hardware's tri-color
//! LEDs.
//!
//! # Control layout
//!
//! The four channel strips map to four session tracks:
//! - Faders (CC 16-19): track volume
//! - Top knob rows (CC 4-7 / 8-11 / 12-15): EQ high/mid/low gain
//! - Pot switch rows (notes 48-51 / 44-47 / 40-43): EQ band cut toggles
//! - Matrix rows (notes 36-39 / 32-35 / 28-31 / 24-27): mute, solo,
//!   EQ kill, track stop
//! - Top encoders (CC 0-3, switches 52-55): scrobble, 4 bars per tick or
//!   1 beat while the switch is held
//! - Bottom encoders (CC 20/21, switches 13/14): coarse/fine tempo
//! - Layer and exit buttons (notes 12/15): tempo nudge down/up
//!
//! All traffic rides MIDI channel 15 (14 zero-indexed). LEDs are driven by
//! note-on/note-off per color layer; the firmware keeps an independent
//! on/off bit for each of red, orange, and green.

pub mod bindings;
pub mod curves;
pub mod elements;
pub mod feedback;
pub mod mapping;
pub mod module;
pub mod notes;

pub use module::K2SurfaceModule;
