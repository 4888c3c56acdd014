//! Expresses [`VoiceState`] as the two signals an analog monosynth is driven by.

use crate::{
    configuration::Configuration,
    voice::{PITCH_WHEEL_CENTER, VoiceState},
};
use measurements::Voltage;

/// The gate and pitch signals for one processing cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outputs {
    /// [`Configuration::gate_level`] while a note sounds, otherwise zero.
    pub gate: Voltage,
    /// Distance of the sounding (bent) note from [`Configuration::reference_note`], scaled by
    /// [`Configuration::voltage_per_octave`]. Negative below the reference note.
    pub pitch: Voltage,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Outputs {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Outputs {{ gate: {}V, pitch: {}V }}",
            self.gate.as_volts(),
            self.pitch.as_volts()
        );
    }
}

/// Computes the [`Outputs`] for `voice`. Pure; called once per cycle.
pub fn compute_outputs(voice: &VoiceState, config: &Configuration) -> Outputs {
    let gate = if voice.gate_open() {
        config.gate_level
    } else {
        Voltage::from_volts(0.0)
    };

    Outputs {
        gate,
        pitch: Voltage::from_volts(octaves(voice, config) * config.voltage_per_octave.as_volts()),
    }
}

/// Pitch relative to the reference note in octaves, bend included.
fn octaves(voice: &VoiceState, config: &Configuration) -> f64 {
    let semitones =
        f64::from(u8::from(voice.current_note())) - f64::from(u8::from(config.reference_note));
    let deflection =
        f64::from(u8::from(voice.pitch_wheel())) - f64::from(u8::from(PITCH_WHEEL_CENTER));
    let bend = config.bend_semitones * deflection / 64.0;
    (semitones + bend) / 12.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::BendRange;
    use wmidi::{Note, U7};

    fn voice(note: Note, pitch_wheel: u8) -> VoiceState {
        let mut voice = VoiceState::default();
        voice.sound(note);
        voice.set_pitch_wheel(U7::from_u8_lossy(pitch_wheel));
        voice
    }

    fn assert_volts(expected: f64, actual: Voltage) {
        assert!(
            (expected - actual.as_volts()).abs() < 1e-9,
            "Expected {} volts but got {}",
            expected,
            actual.as_volts()
        );
    }

    #[test]
    fn gate_follows_voice() {
        let config = Configuration::default();
        let mut voice = voice(Note::C4, 64);
        assert_volts(5.0, compute_outputs(&voice, &config).gate);

        voice.silence();
        assert_volts(0.0, compute_outputs(&voice, &config).gate);
    }

    #[test]
    fn octave_above_reference() {
        let outputs = compute_outputs(&voice(Note::E5, 64), &Configuration::default());
        assert_volts(1.0, outputs.pitch);
    }

    #[test]
    fn reference_note_is_zero() {
        let outputs = compute_outputs(&voice(Note::E4, 64), &Configuration::default());
        assert_volts(0.0, outputs.pitch);
    }

    #[test]
    fn below_reference_is_negative() {
        let outputs = compute_outputs(&voice(Note::C4, 64), &Configuration::default());
        assert_volts(-4.0 / 12.0, outputs.pitch);
    }

    #[test]
    fn bend_up() {
        let outputs = compute_outputs(&voice(Note::E5, 96), &Configuration::default());
        assert_volts((12.0 + 1.0) / 12.0, outputs.pitch);
    }

    #[test]
    fn full_bend_down_is_bend_range() {
        let config = Configuration::default().with_bend_range(BendRange::Octave);
        let outputs = compute_outputs(&voice(Note::E5, 0), &config);
        assert_volts(0.0, outputs.pitch);
    }

    #[test]
    fn arbitrary_bend_range() {
        let config = Configuration {
            bend_semitones: 3.0,
            ..Configuration::default()
        };
        let outputs = compute_outputs(&voice(Note::E4, 127), &config);
        assert_volts(3.0 * 63.0 / 64.0 / 12.0, outputs.pitch);
    }

    #[test]
    fn scaled_by_voltage_per_octave() {
        let config = Configuration {
            voltage_per_octave: Voltage::from_volts(1.2),
            reference_note: Note::F3,
            ..Configuration::default()
        };
        let outputs = compute_outputs(&voice(Note::F4, 64), &config);
        assert_volts(1.2, outputs.pitch);
    }

    #[test]
    fn gate_level_is_configurable() {
        let config = Configuration {
            gate_level: Voltage::from_volts(10.0),
            ..Configuration::default()
        };
        assert_volts(10.0, compute_outputs(&voice(Note::C4, 64), &config).gate);
    }
}
