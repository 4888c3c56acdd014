//! This crate contains architecture-agnostic logic for a monophonic MIDI-to-CV/gate converter. It turns a stream of
//! [MIDI](https://midi.org/midi-1-0) channel voice messages into the two signals an analog-style monosynth needs: a
//! gate which is high while a note should sound and a pitch level scaled to one volt per octave
//! ([CV/gate](https://en.wikipedia.org/wiki/CV/gate)).
//!
//! Note selection follows "last-note priority with sustain": the most recently pressed key sounds, releasing it falls
//! back to the next most recent key still held, and a held sustain pedal keeps the voice sounding after keys are lifted.
//!
//! The crate performs no I/O. A transport hands raw messages to an [`Engine`](engine::Engine) once per processing
//! cycle and samples the resulting [`Outputs`](output::Outputs).

#![deny(missing_docs)]
#![no_std]

#[macro_use]
mod fmt;

pub mod configuration;
pub mod engine;
pub mod midi;
pub mod note_stack;
pub mod output;
pub mod sustain;
pub mod voice;
