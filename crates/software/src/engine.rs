//! Provides [`Engine`], the state machine that turns raw MIDI messages into voice state, and [`Change`], which reports
//! what a batch of messages altered.

use bitmask_enum::bitmask;
use wmidi::{Note, U7};

use crate::{
    configuration::Configuration,
    midi::{RawMessage, VoiceEvent, decode},
    note_stack::NoteStack,
    output::{Outputs, compute_outputs},
    sustain::{Settlement, SustainController},
    voice::VoiceState,
};

/// Aspects of state that may be altered while processing messages.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Change {
    /// A note was pressed or released.
    NoteStack,
    /// The gate opened or closed.
    Gate,
    /// The sounding note changed.
    Pitch,
    /// The sustain pedal moved.
    Sustain,
    /// The pitch wheel moved.
    PitchBend,
}

/// A monophonic voice with last-note priority and sustain, driven by raw MIDI messages.
///
/// The engine never blocks and never fails. Feed it every pending message once per processing cycle, in arrival order,
/// then sample [`outputs()`](Self::outputs).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Engine {
    config: Configuration,
    notes: NoteStack,
    sustain: SustainController,
    voice: VoiceState,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl Engine {
    /// Constructs a silent [`Engine`] with nothing held.
    pub fn new(config: Configuration) -> Self {
        info!("Creating engine: {}", config);
        Self {
            config,
            notes: NoteStack::new(),
            sustain: SustainController::default(),
            voice: VoiceState::default(),
        }
    }

    /// Getter.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Mutable access to the configuration. Changes show up in the next [`outputs()`](Self::outputs).
    pub fn config_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    /// Keys currently held.
    pub fn notes(&self) -> &NoteStack {
        &self.notes
    }

    /// The sustain pedal.
    pub fn sustain(&self) -> &SustainController {
        &self.sustain
    }

    /// Getter.
    pub fn voice(&self) -> &VoiceState {
        &self.voice
    }

    /// Decodes and applies a single message. Messages on other channels and unsupported messages change nothing.
    pub fn receive(&mut self, raw: RawMessage) -> Change {
        match decode(raw, self.config.channel) {
            Some(VoiceEvent::Press(note)) => self.press_note(note),
            Some(VoiceEvent::Release(note)) => self.release_note(note),
            Some(VoiceEvent::Sustain(held)) => self.set_sustain(held),
            Some(VoiceEvent::PitchBend(value)) => self.bend(value),
            None => Change::none(),
        }
    }

    /// Applies `messages` strictly in order. Returns everything they changed.
    pub fn update<I>(&mut self, messages: I) -> Change
    where
        I: IntoIterator<Item = RawMessage>,
    {
        messages
            .into_iter()
            .fold(Change::none(), |change, raw| change | self.receive(raw))
    }

    /// Runs one processing cycle: applies the pending `messages`, then computes the outputs.
    pub fn tick<I>(&mut self, messages: I) -> Outputs
    where
        I: IntoIterator<Item = RawMessage>,
    {
        let change = self.update(messages);
        if !change.is_none() {
            trace!("Cycle changed {}: {}", change, self.voice);
        }
        self.outputs()
    }

    /// The gate and pitch signals for the current state.
    pub fn outputs(&self) -> Outputs {
        compute_outputs(&self.voice, &self.config)
    }

    /// Sounds `note`, making it the highest priority key.
    pub fn press_note(&mut self, note: Note) -> Change {
        let before = self.voice;
        self.notes.press(note);
        self.voice.sound(note);
        debug!("Pressed {}; holding {}", note.to_str(), self.notes);
        Change::NoteStack | self.voice_change(before)
    }

    /// Lifts the key for `note`. Unless the pedal is down, the voice falls back to the most recently pressed key still
    /// held, or goes silent when none is.
    ///
    /// Releasing a note that is not held still re-derives the voice.
    pub fn release_note(&mut self, note: Note) -> Change {
        let before = self.voice;
        let change = if self.notes.release(note) {
            Change::NoteStack
        } else {
            Change::none()
        };
        let settlement = self.settle();
        debug!("Released {}: {}", note.to_str(), settlement);
        change | self.voice_change(before)
    }

    /// Moves the sustain pedal and re-derives the voice.
    ///
    /// Pedal down never re-attacks; it only keeps whatever is sounding from being released.
    pub fn set_sustain(&mut self, held: bool) -> Change {
        let change = if self.sustain.set_held(held) {
            Change::Sustain
        } else {
            Change::none()
        };
        change | self.reevaluate_after_pedal_change()
    }

    /// Re-derives the voice from the held keys and the current pedal position, e.g., so that lifting the pedal
    /// silences notes whose keys were released while it was down.
    pub fn reevaluate_after_pedal_change(&mut self) -> Change {
        let before = self.voice;
        let settlement = self.settle();
        debug!("Pedal {}: {}", self.sustain.is_held(), settlement);
        self.voice_change(before)
    }

    /// Records the pitch wheel position.
    pub fn bend(&mut self, value: U7) -> Change {
        if self.voice.pitch_wheel() == value {
            return Change::none();
        }
        self.voice.set_pitch_wheel(value);
        Change::PitchBend
    }

    fn settle(&mut self) -> Settlement {
        self.sustain.settle(&self.notes, &mut self.voice)
    }

    fn voice_change(&self, before: VoiceState) -> Change {
        let mut change = Change::none();
        if before.gate_open() != self.voice.gate_open() {
            change |= Change::Gate;
        }
        if before.current_note() != self.voice.current_note() {
            change |= Change::Pitch;
        }
        change
    }
}
