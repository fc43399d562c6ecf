//! Async module binding the Xone:K2 hardware to a session host.

use std::collections::HashMap;

use async_trait::async_trait;
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use thiserror::Error;
use tokio::sync::mpsc;

use xonek2_core::midi::{self, MidiMessage};
use xonek2_core::session::{DeviceSnapshot, EqBand, NudgeDirection, SessionCommand, SessionEvent};
use xonek2_core::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage, Settings};

use crate::bindings::EqBinding;
use crate::elements::layout;
use crate::elements::Strip;
use crate::feedback::{LedColor, LedState};
use crate::mapping::{HeldState, K2Mapping};

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("MIDI init failed: {0}")]
    Init(#[from] midir::InitError),
    #[error("MIDI input port matching '{0}' not found")]
    InputPortNotFound(String),
    #[error("failed to connect MIDI input: {0}")]
    InputConnect(String),
    #[error("failed to connect MIDI output: {0}")]
    OutputConnect(String),
}

/// Xone:K2 control surface module.
///
/// Hardware input becomes [`SessionCommand`]s on the module's message
/// channel; [`SessionEvent`]s delivered into the run loop become LED
/// updates. Both directions run to completion per message, in arrival
/// order.
pub struct K2SurfaceModule {
    settings: Settings,

    /// MIDI input connection (callback feeds `midi_rx`)
    midi_input: Option<MidiInputConnection<mpsc::UnboundedSender<Vec<u8>>>>,

    /// MIDI output connection for LED feedback
    midi_output: Option<MidiOutputConnection>,

    /// Raw MIDI receiver (from callback)
    midi_rx: Option<mpsc::UnboundedReceiver<Vec<u8>>>,

    leds: LedState,

    /// The four channel strips
    strips: Vec<Strip>,

    /// Per-track EQ bindings, replaced wholesale on device-list changes
    bindings: Vec<EqBinding>,

    /// Encoder switches currently held down
    held: HeldState,

    /// Module status
    status: HashMap<String, String>,
}

impl K2SurfaceModule {
    pub fn new(settings: Settings) -> Self {
        let leds = LedState::new(settings.midi_channel);
        let strips = layout();
        let bindings = vec![EqBinding::default(); strips.len()];
        Self {
            settings,
            midi_input: None,
            midi_output: None,
            midi_rx: None,
            leds,
            strips,
            bindings,
            held: HeldState::default(),
            status: HashMap::new(),
        }
    }

    /// Connect to the K2's MIDI ports. Input is required; a missing output
    /// port only disables LED feedback.
    fn connect_midi(&mut self) -> Result<(), SurfaceError> {
        let device = self.settings.midi_device.clone();

        let midi_in = MidiInput::new("xonek2_in")?;
        let in_port = midi_in
            .ports()
            .into_iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .map(|n| n.contains(&device))
                    .unwrap_or(false)
            })
            .ok_or_else(|| {
                self.status
                    .insert("midi_input".to_string(), "not_found".to_string());
                SurfaceError::InputPortNotFound(device.clone())
            })?;

        let (tx, rx) = mpsc::unbounded_channel();
        self.midi_rx = Some(rx);

        let connection = midi_in
            .connect(
                &in_port,
                "xonek2-input",
                move |_timestamp, message, tx| {
                    // Hand raw bytes to the async loop
                    let _ = tx.send(message.to_vec());
                },
                tx,
            )
            .map_err(|e| SurfaceError::InputConnect(e.to_string()))?;
        self.midi_input = Some(connection);
        self.status
            .insert("midi_input".to_string(), "connected".to_string());

        let midi_out = MidiOutput::new("xonek2_out")?;
        let out_port = midi_out.ports().into_iter().find(|p| {
            midi_out
                .port_name(p)
                .map(|n| n.contains(&device))
                .unwrap_or(false)
        });

        match out_port {
            Some(port) => {
                let connection = midi_out
                    .connect(&port, "xonek2-output")
                    .map_err(|e| SurfaceError::OutputConnect(e.to_string()))?;
                self.midi_output = Some(connection);
                self.status
                    .insert("midi_output".to_string(), "connected".to_string());
            }
            None => {
                self.status
                    .insert("midi_output".to_string(), "not_found".to_string());
                tracing::warn!("Xone:K2 MIDI output not found - LED feedback disabled");
            }
        }

        tracing::info!("Xone:K2 MIDI connected");
        Ok(())
    }

    /// Translate one raw hardware message into a session command.
    fn handle_midi_message(&mut self, message: &[u8]) -> Option<SessionCommand> {
        match midi::parse(self.settings.midi_channel, message)? {
            MidiMessage::NoteOn(note, _velocity) => {
                if self.held.note_on(note) {
                    return None;
                }
                K2Mapping::translate_note_on(note, &self.bindings)
            }
            MidiMessage::NoteOff(note) => {
                if self.held.note_off(note) {
                    return None;
                }
                K2Mapping::translate_note_off(note)
            }
            MidiMessage::ControlChange(cc, value) => {
                K2Mapping::translate_cc(cc, value, &self.held, &self.bindings)
            }
        }
    }

    /// Redraw handler: mirror one host-side change onto the LEDs.
    ///
    /// Each arm recomputes the LED color from the value the event carries,
    /// so redundant deliveries settle without traffic.
    fn handle_session_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::MuteChanged { track, muted } => {
                let Some(strip) = self.strip(*track) else { return };
                if *muted {
                    self.leds.dim(strip.mute.name);
                } else {
                    // Lit while audible
                    self.leds.light_up(strip.mute.name, LedColor::Red);
                }
            }
            SessionEvent::SoloChanged { track, soloed } => {
                let Some(strip) = self.strip(*track) else { return };
                if *soloed {
                    self.leds.light_up(strip.solo.name, LedColor::Green);
                } else {
                    self.leds.dim(strip.solo.name);
                }
            }
            SessionEvent::VolumeChanged { .. } => {
                // Faders have no LED
            }
            SessionEvent::DevicesChanged { track, devices } => {
                if *track >= self.bindings.len() {
                    return;
                }
                self.bindings[*track] = EqBinding::resolve(devices);
                self.redraw_eq(*track, devices);
            }
            SessionEvent::ParameterChanged {
                track,
                device,
                parameter,
                value,
            } => {
                let Some(binding) = self.bindings.get(*track) else {
                    return;
                };
                if binding.is_kill(*device, *parameter) {
                    self.draw_kill(*track, *value);
                } else if let Some(band) = binding.cut_band(*device, *parameter) {
                    self.draw_cut(*track, band, *value);
                }
            }
            SessionEvent::PlayingSlotChanged { track, slot } => {
                let Some(strip) = self.strip(*track) else { return };
                if slot.is_some() {
                    self.leds.light_up(strip.stop.name, LedColor::Orange);
                } else {
                    self.leds.dim(strip.stop.name);
                }
            }
            SessionEvent::TempoChanged { tempo } => {
                tracing::debug!("Session tempo now {tempo:.2}");
            }
            SessionEvent::NudgeChanged { direction, active } => {
                let element = match direction {
                    NudgeDirection::Down => "layer_button",
                    NudgeDirection::Up => "exit_button",
                };
                if *active {
                    self.leds.light_up(element, LedColor::Green);
                } else {
                    self.leds.dim(element);
                }
            }
        }
    }

    fn strip(&self, track: usize) -> Option<Strip> {
        self.strips.get(track).copied()
    }

    /// Redraw kill and cut LEDs for a track from a fresh device snapshot.
    fn redraw_eq(&mut self, track: usize, devices: &[DeviceSnapshot]) {
        let Some(strip) = self.strip(track) else { return };

        match self.bindings[track]
            .kill_parameter()
            .and_then(|(d, p)| parameter_value(devices, d, p))
        {
            Some(value) => self.draw_kill(track, value),
            None => self.leds.dim(strip.kill.name),
        }

        for band in EqBand::ALL {
            match self.bindings[track]
                .cut_parameter(band)
                .and_then(|(d, p)| parameter_value(devices, d, p))
            {
                Some(value) => self.draw_cut(track, band, value),
                None => self.leds.dim(cut_element(&strip, band)),
            }
        }
    }

    /// Kill LED: red while the EQ device is bypassed.
    fn draw_kill(&mut self, track: usize, value: f32) {
        let Some(strip) = self.strip(track) else { return };
        if value == 0.0 {
            self.leds.light_up(strip.kill.name, LedColor::Red);
        } else {
            self.leds.dim(strip.kill.name);
        }
    }

    /// Cut LED: red while the band is switched off.
    fn draw_cut(&mut self, track: usize, band: EqBand, value: f32) {
        let Some(strip) = self.strip(track) else { return };
        let element = cut_element(&strip, band);
        if value == 0.0 {
            self.leds.light_up(element, LedColor::Red);
        } else {
            self.leds.dim(element);
        }
    }

    fn send_messages(&mut self, messages: &[[u8; 3]]) {
        if let Some(ref mut output) = self.midi_output {
            for message in messages {
                if let Err(e) = output.send(message) {
                    tracing::warn!("Failed to send LED message: {e}");
                }
            }
        }
    }

    fn flush_leds(&mut self) {
        let messages = self.leds.to_midi_messages();
        self.send_messages(&messages);
    }
}

fn cut_element(strip: &Strip, band: EqBand) -> &'static str {
    match band {
        EqBand::Low => strip.cut_low.name,
        EqBand::Mid => strip.cut_mid.name,
        EqBand::High => strip.cut_high.name,
    }
}

fn parameter_value(devices: &[DeviceSnapshot], device: usize, parameter: usize) -> Option<f32> {
    Some(devices.get(device)?.parameters.get(parameter)?.value)
}

#[async_trait]
impl AsyncModule for K2SurfaceModule {
    fn id(&self) -> ModuleId {
        ModuleId::Surface
    }

    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Initializing Xone:K2 surface");

        self.connect_midi()?;

        // Known-dark starting point: one off pass per color layer, because
        // the firmware keeps an independent bit per color.
        let reset = self.leds.reset_messages();
        self.send_messages(&reset);

        self.status
            .insert("state".to_string(), "initialized".to_string());
        Ok(())
    }

    async fn run(
        &mut self,
        mut rx: mpsc::Receiver<ModuleEvent>,
        tx: mpsc::Sender<ModuleMessage>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Xone:K2 surface running");
        self.status
            .insert("state".to_string(), "running".to_string());

        // Take ownership of the MIDI receiver
        let mut midi_rx = self.midi_rx.take();

        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    match event {
                        ModuleEvent::Shutdown => {
                            tracing::info!("Xone:K2 surface received shutdown");
                            break;
                        }
                        ModuleEvent::Session(event) => {
                            self.handle_session_event(&event);
                            self.flush_leds();
                        }
                    }
                }

                Some(message) = async {
                    if let Some(ref mut rx) = midi_rx {
                        rx.recv().await
                    } else {
                        std::future::pending().await
                    }
                } => {
                    if let Some(command) = self.handle_midi_message(&message) {
                        // try_send keeps the loop from blocking; a full
                        // channel drops the command, acceptable for MIDI.
                        if let Err(e) = tx.try_send(ModuleMessage::Command(command)) {
                            tracing::debug!("Dropped surface command (channel full): {e}");
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Shutting down Xone:K2 surface");

        self.leds.clear();
        self.flush_leds();
        let reset = self.leds.reset_messages();
        self.send_messages(&reset);

        self.midi_input = None;
        self.midi_output = None;

        self.status
            .insert("state".to_string(), "shutdown".to_string());
        Ok(())
    }

    fn status(&self) -> HashMap<String, String> {
        self.status.clone()
    }
}

#[cfg(test)]
mod tests {
    use xonek2_core::eq_three;

    use super::*;

    fn module() -> K2SurfaceModule {
        K2SurfaceModule::new(Settings::default())
    }

    fn devices_changed(track: usize) -> SessionEvent {
        SessionEvent::DevicesChanged {
            track,
            devices: vec![eq_three()],
        }
    }

    #[test]
    fn test_fader_message_sets_volume() {
        let mut module = module();
        let cmd = module.handle_midi_message(&[0xBE, 16, 127]);
        let Some(SessionCommand::SetVolume { track, gain }) = cmd else {
            panic!("expected SetVolume, got {cmd:?}");
        };
        assert_eq!(track, 0);
        assert!((gain - 0.84335).abs() < 1e-4);
    }

    #[test]
    fn test_other_channel_is_ignored() {
        let mut module = module();
        assert_eq!(module.handle_midi_message(&[0x90, 36, 127]), None);
    }

    #[test]
    fn test_scrobble_switch_changes_step() {
        let mut module = module();

        let cmd = module.handle_midi_message(&[0xBE, 0, 1]);
        assert_eq!(
            cmd,
            Some(SessionCommand::ScrubBy {
                track: 0,
                beats: 16.0
            })
        );

        // Hold the encoder switch: press itself emits nothing
        assert_eq!(module.handle_midi_message(&[0x9E, 52, 127]), None);
        let cmd = module.handle_midi_message(&[0xBE, 0, 1]);
        assert_eq!(
            cmd,
            Some(SessionCommand::ScrubBy {
                track: 0,
                beats: 1.0
            })
        );

        // Release (note-on velocity 0) restores the coarse step
        assert_eq!(module.handle_midi_message(&[0x9E, 52, 0]), None);
        let cmd = module.handle_midi_message(&[0xBE, 0, 1]);
        assert_eq!(
            cmd,
            Some(SessionCommand::ScrubBy {
                track: 0,
                beats: 16.0
            })
        );
    }

    #[test]
    fn test_kill_press_needs_device_list_first() {
        let mut module = module();
        assert_eq!(module.handle_midi_message(&[0x9E, 28, 127]), None);

        module.handle_session_event(&devices_changed(0));
        let cmd = module.handle_midi_message(&[0x9E, 28, 127]);
        assert!(matches!(
            cmd,
            Some(SessionCommand::ToggleParameter { track: 0, .. })
        ));
    }

    #[test]
    fn test_device_list_replacement_drops_stale_binding() {
        let mut module = module();
        module.handle_session_event(&devices_changed(1));
        assert!(!module.bindings[1].is_empty());

        module.handle_session_event(&SessionEvent::DevicesChanged {
            track: 1,
            devices: vec![],
        });
        assert!(module.bindings[1].is_empty());
        assert_eq!(module.handle_midi_message(&[0x9E, 29, 127]), None);
    }

    #[test]
    fn test_mute_event_drives_led() {
        let mut module = module();

        module.handle_session_event(&SessionEvent::MuteChanged {
            track: 0,
            muted: false,
        });
        assert_eq!(module.leds.color("matrix_button_a"), Some(LedColor::Red));

        module.handle_session_event(&SessionEvent::MuteChanged {
            track: 0,
            muted: true,
        });
        assert_eq!(module.leds.color("matrix_button_a"), None);
        let messages = module.leds.to_midi_messages();
        assert!(messages.contains(&[0x8E, 36, 127]));
    }

    #[test]
    fn test_redundant_event_is_idempotent() {
        let mut module = module();
        module.handle_session_event(&SessionEvent::SoloChanged {
            track: 2,
            soloed: true,
        });
        assert!(!module.leds.to_midi_messages().is_empty());

        module.handle_session_event(&SessionEvent::SoloChanged {
            track: 2,
            soloed: true,
        });
        assert!(module.leds.to_midi_messages().is_empty());
    }

    #[test]
    fn test_cut_parameter_change_drives_band_led() {
        let mut module = module();
        module.handle_session_event(&devices_changed(0));
        let (device, parameter) = module.bindings[0].cut_parameter(EqBand::Mid).unwrap();

        module.handle_session_event(&SessionEvent::ParameterChanged {
            track: 0,
            device,
            parameter,
            value: 0.0,
        });
        assert_eq!(module.leds.color("pot_switch_5"), Some(LedColor::Red));

        module.handle_session_event(&SessionEvent::ParameterChanged {
            track: 0,
            device,
            parameter,
            value: 1.0,
        });
        assert_eq!(module.leds.color("pot_switch_5"), None);
    }

    #[test]
    fn test_nudge_event_lights_paired_led() {
        let mut module = module();
        module.handle_session_event(&SessionEvent::NudgeChanged {
            direction: NudgeDirection::Up,
            active: true,
        });
        assert_eq!(module.leds.color("exit_button"), Some(LedColor::Green));

        module.handle_session_event(&SessionEvent::NudgeChanged {
            direction: NudgeDirection::Up,
            active: false,
        });
        assert_eq!(module.leds.color("exit_button"), None);
    }

    #[test]
    fn test_run_loop_draws_events_until_shutdown() {
        tokio_test::block_on(async {
            let mut module = module();
            let (event_tx, event_rx) = mpsc::channel(16);
            let (message_tx, _message_rx) = mpsc::channel(16);

            event_tx
                .send(ModuleEvent::Session(SessionEvent::SoloChanged {
                    track: 1,
                    soloed: true,
                }))
                .await
                .unwrap();
            event_tx.send(ModuleEvent::Shutdown).await.unwrap();

            module.run(event_rx, message_tx).await.unwrap();

            // The event was drawn before the shutdown was honored.
            assert_eq!(module.leds.color("matrix_button_f"), Some(LedColor::Green));
            assert_eq!(module.status()["state"], "running");
        });
    }

    #[test]
    fn test_playing_slot_drives_stop_led() {
        let mut module = module();
        module.handle_session_event(&SessionEvent::PlayingSlotChanged {
            track: 3,
            slot: Some(2),
        });
        assert_eq!(module.leds.color("matrix_button_p"), Some(LedColor::Orange));

        module.handle_session_event(&SessionEvent::PlayingSlotChanged {
            track: 3,
            slot: None,
        });
        assert_eq!(module.leds.color("matrix_button_p"), None);
    }
}
