//! Provides [`VoiceState`], the note, gate, and pitch wheel values from which output signals are derived.

use wmidi::{Note, U7};

/// Pitch wheel value meaning "no bend."
pub const PITCH_WHEEL_CENTER: U7 = U7::from_u8_lossy(64);

/// What the voice is doing right now.
///
/// When the gate closes, `current_note` keeps the last sounding note so the oscillator holds its frequency through the
/// release of the envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceState {
    current_note: Note,
    gate_open: bool,
    pitch_wheel: U7,
}

impl Default for VoiceState {
    fn default() -> Self {
        Self {
            current_note: Note::E4,
            gate_open: false,
            pitch_wheel: PITCH_WHEEL_CENTER,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for VoiceState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "VoiceState {{ current_note: {}, gate_open: {}, pitch_wheel: {} }}",
            self.current_note.to_str(),
            self.gate_open,
            u8::from(self.pitch_wheel)
        );
    }
}

impl VoiceState {
    /// The note the pitch signal tracks.
    pub fn current_note(&self) -> Note {
        self.current_note
    }

    /// Whether a note should currently sound.
    pub fn gate_open(&self) -> bool {
        self.gate_open
    }

    /// Most significant seven bits of the last pitch bend received.
    pub fn pitch_wheel(&self) -> U7 {
        self.pitch_wheel
    }

    /// Opens the gate on `note`.
    pub(crate) fn sound(&mut self, note: Note) {
        self.current_note = note;
        self.gate_open = true;
    }

    /// Moves the pitch to `note` without touching the gate.
    pub(crate) fn retarget(&mut self, note: Note) {
        self.current_note = note;
    }

    /// Closes the gate, leaving the current note in place.
    pub(crate) fn silence(&mut self) {
        self.gate_open = false;
    }

    pub(crate) fn set_pitch_wheel(&mut self, value: U7) {
        self.pitch_wheel = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_silent_on_reference_note() {
        let voice = VoiceState::default();
        assert!(!voice.gate_open(), "Voice should start silent");
        assert_eq!(Note::E4, voice.current_note(), "Expected left but got right");
        assert_eq!(64, u8::from(voice.pitch_wheel()), "Expected left but got right");
    }

    #[test]
    fn silence_keeps_note() {
        let mut voice = VoiceState::default();
        voice.sound(Note::C4);
        voice.silence();
        assert!(!voice.gate_open(), "Gate should be closed");
        assert_eq!(Note::C4, voice.current_note(), "Expected left but got right");
    }
}
