//! Per-track EQ parameter bindings.
//!
//! Resolved from the host's device-list snapshot whenever a track's devices
//! change, and replaced wholesale rather than merged. Every field is
//! optional: a track without an EQ device yields an empty binding, and all
//! controls that depend on it degrade to no-ops.

use xonek2_core::session::{DeviceSnapshot, EqBand};

const GAIN_NAMES: [&str; 3] = ["GainLo", "GainMid", "GainHi"];
const CUT_NAMES: [&str; 3] = ["LowOn", "MidOn", "HighOn"];
const DEVICE_ON_NAME: &str = "Device On";

/// Indices into one track's device list for its EQ device and parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EqBinding {
    pub device: Option<usize>,
    gain: [Option<usize>; 3],
    cut: [Option<usize>; 3],
    device_on: Option<usize>,
}

impl EqBinding {
    /// Bind to the first device whose name marks it as an EQ.
    pub fn resolve(devices: &[DeviceSnapshot]) -> Self {
        let Some((index, device)) = devices
            .iter()
            .enumerate()
            .find(|(_, d)| d.name.contains("EQ"))
        else {
            return Self::default();
        };

        Self {
            device: Some(index),
            gain: GAIN_NAMES.map(|name| device.parameter(name)),
            cut: CUT_NAMES.map(|name| device.parameter(name)),
            device_on: device.parameter(DEVICE_ON_NAME),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.device.is_none()
    }

    /// (device, parameter) for a band's gain, if bound.
    pub fn gain_parameter(&self, band: EqBand) -> Option<(usize, usize)> {
        Some((self.device?, self.gain[band as usize]?))
    }

    /// (device, parameter) for a band's on/off switch, if bound.
    pub fn cut_parameter(&self, band: EqBand) -> Option<(usize, usize)> {
        Some((self.device?, self.cut[band as usize]?))
    }

    /// (device, parameter) for the device's global on/off, if bound.
    pub fn kill_parameter(&self) -> Option<(usize, usize)> {
        Some((self.device?, self.device_on?))
    }

    /// Which band a (device, parameter) pair controls the cut of, if any.
    pub fn cut_band(&self, device: usize, parameter: usize) -> Option<EqBand> {
        if self.device != Some(device) {
            return None;
        }
        EqBand::ALL
            .into_iter()
            .find(|&band| self.cut[band as usize] == Some(parameter))
    }

    pub fn is_kill(&self, device: usize, parameter: usize) -> bool {
        self.device == Some(device) && self.device_on == Some(parameter)
    }
}

#[cfg(test)]
mod tests {
    use xonek2_core::session::ParameterSnapshot;
    use xonek2_core::SessionState;

    use super::*;

    fn eq_devices() -> Vec<DeviceSnapshot> {
        SessionState::with_eq_devices(1).track(0).unwrap().devices.clone()
    }

    #[test]
    fn test_resolve_stock_eq() {
        let devices = eq_devices();
        let binding = EqBinding::resolve(&devices);
        assert!(!binding.is_empty());
        assert_eq!(binding.device, Some(0));
        for band in EqBand::ALL {
            assert!(binding.gain_parameter(band).is_some());
            assert!(binding.cut_parameter(band).is_some());
        }
        assert!(binding.kill_parameter().is_some());
    }

    #[test]
    fn test_resolve_without_eq_is_empty() {
        let devices = vec![DeviceSnapshot {
            name: "Reverb".to_string(),
            parameters: vec![],
        }];
        let binding = EqBinding::resolve(&devices);
        assert!(binding.is_empty());
        assert_eq!(binding.gain_parameter(EqBand::Low), None);
        assert_eq!(binding.kill_parameter(), None);
    }

    #[test]
    fn test_resolve_skips_non_eq_devices() {
        let mut devices = vec![DeviceSnapshot {
            name: "Compressor".to_string(),
            parameters: vec![],
        }];
        devices.extend(eq_devices());
        let binding = EqBinding::resolve(&devices);
        assert_eq!(binding.device, Some(1));
    }

    #[test]
    fn test_partial_parameters_bind_partially() {
        let devices = vec![DeviceSnapshot {
            name: "EQ Three".to_string(),
            parameters: vec![ParameterSnapshot {
                name: "GainLo".to_string(),
                value: 0.85,
            }],
        }];
        let binding = EqBinding::resolve(&devices);
        assert_eq!(binding.gain_parameter(EqBand::Low), Some((0, 0)));
        assert_eq!(binding.gain_parameter(EqBand::Mid), None);
        assert_eq!(binding.kill_parameter(), None);
    }

    #[test]
    fn test_cut_band_lookup() {
        let devices = eq_devices();
        let binding = EqBinding::resolve(&devices);
        let (device, parameter) = binding.cut_parameter(EqBand::Mid).unwrap();
        assert_eq!(binding.cut_band(device, parameter), Some(EqBand::Mid));
        assert_eq!(binding.cut_band(device + 1, parameter), None);
    }
}
