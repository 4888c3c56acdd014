//! Provides [`SustainController`], which holds the sustain pedal and decides what the voice does once a key is lifted
//! or the pedal moves.

use crate::{note_stack::NoteStack, voice::VoiceState};

/// Outcome of re-deriving the voice after a release or pedal change.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Settlement {
    /// The pedal is held, so the voice was left exactly as it was.
    Sustained,
    /// The voice moved to (or stayed on) the most recently pressed key still held.
    Fallback,
    /// Nothing is held and the pedal is up; the gate closed.
    Silenced,
}

/// The state of MIDI CC 64, the sustain (damper) pedal.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SustainController {
    held: bool,
}

impl SustainController {
    /// Whether the pedal is down.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Records the pedal position. Returns `true` if it moved.
    pub fn set_held(&mut self, held: bool) -> bool {
        let moved = self.held != held;
        self.held = held;
        moved
    }

    /// Brings `voice` in line with the held `notes` and the pedal.
    ///
    /// While the pedal is down nothing changes, so a sounding note outlives its key. Otherwise the most recently pressed
    /// key still held sounds, and with no keys held the gate closes.
    pub fn settle<const N: usize>(&self, notes: &NoteStack<N>, voice: &mut VoiceState) -> Settlement {
        if self.held {
            return Settlement::Sustained;
        }
        match notes.peek() {
            // a held key implies an open gate, so only the note moves
            Some(note) => {
                voice.retarget(note);
                Settlement::Fallback
            }
            None => {
                voice.silence();
                Settlement::Silenced
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmidi::Note;

    fn sounding(note: Note) -> VoiceState {
        let mut voice = VoiceState::default();
        voice.sound(note);
        voice
    }

    #[test]
    fn set_held_reports_movement() {
        let mut pedal = SustainController::default();
        assert!(!pedal.is_held(), "Pedal should start up");
        assert!(pedal.set_held(true), "Pedal should have moved down");
        assert!(!pedal.set_held(true), "Pedal was already down");
        assert!(pedal.is_held(), "Pedal should be down");
    }

    #[test]
    fn held_pedal_leaves_voice_alone() {
        let pedal = SustainController { held: true };
        let mut voice = sounding(Note::C4);
        let settlement = pedal.settle(&NoteStack::<4>::new(), &mut voice);

        assert_eq!(Settlement::Sustained, settlement, "Expected left but got right");
        assert_eq!(sounding(Note::C4), voice, "Expected left but got right");
    }

    #[test]
    fn falls_back_to_most_recent_held_note() {
        let pedal = SustainController::default();
        let mut notes = NoteStack::<4>::new();
        notes.press(Note::C4);
        notes.press(Note::G4);
        let mut voice = sounding(Note::A4);

        let settlement = pedal.settle(&notes, &mut voice);

        assert_eq!(Settlement::Fallback, settlement, "Expected left but got right");
        assert_eq!(sounding(Note::G4), voice, "Expected left but got right");
    }

    #[test]
    fn silences_when_nothing_is_held() {
        let pedal = SustainController::default();
        let mut voice = sounding(Note::C4);

        let settlement = pedal.settle(&NoteStack::<4>::new(), &mut voice);

        assert_eq!(Settlement::Silenced, settlement, "Expected left but got right");
        assert!(!voice.gate_open(), "Gate should be closed");
        assert_eq!(Note::C4, voice.current_note(), "Expected left but got right");
    }
}
