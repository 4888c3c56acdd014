//! Decoding of raw MIDI channel voice messages into the handful of events a monophonic voice responds to.
//!
//! Decoding is permissive: anything that is not a recognized event on the configured channel is dropped rather than
//! reported as an error.

use wmidi::{Channel, Note, U7};

/// A MIDI message packed into a single word: `data2 << 16 | data1 << 8 | status << 4 | channel`.
///
/// This is the layout host MIDI libraries such as PortMidi deliver; the low byte is the MIDI status byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawMessage(u32);

impl RawMessage {
    /// Wraps an already packed word.
    pub const fn new(word: u32) -> Self {
        Self(word)
    }

    /// Packs a status byte and its two data bytes.
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self((bytes[2] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[0] as u32)
    }

    /// Returns the status byte and both data bytes.
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.0 as u8, self.data1(), self.data2()]
    }

    /// Zero-based channel number (the low nibble of the status byte).
    pub const fn channel(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    /// Message kind (the high nibble of the status byte).
    pub const fn status(self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }

    /// First data byte.
    pub const fn data1(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Second data byte.
    pub const fn data2(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }
}

impl From<u32> for RawMessage {
    fn from(word: u32) -> Self {
        Self::new(word)
    }
}

impl From<RawMessage> for u32 {
    fn from(msg: RawMessage) -> Self {
        msg.0
    }
}

/// The events a monophonic voice reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VoiceEvent {
    /// A key was struck.
    Press(Note),
    /// A key was lifted. Includes note-on messages with a velocity of zero.
    Release(Note),
    /// The sustain (damper) pedal moved; `true` while held.
    Sustain(bool),
    /// The pitch wheel moved. Only the most significant seven bits are kept.
    PitchBend(U7),
}

#[cfg(feature = "defmt")]
impl defmt::Format for VoiceEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Press(note) => defmt::write!(fmt, "Press({})", note.to_str()),
            Self::Release(note) => defmt::write!(fmt, "Release({})", note.to_str()),
            Self::Sustain(held) => defmt::write!(fmt, "Sustain({})", held),
            Self::PitchBend(value) => defmt::write!(fmt, "PitchBend({})", u8::from(*value)),
        }
    }
}

/// MIDI CC 64: Sustain (Damper) Pedal.
const SUSTAIN_CONTROLLER: u8 = 0x40;

/// Controller values at or above this threshold turn a switch controller (e.g., the sustain pedal) on.
const SWITCH_ON_THRESHOLD: u8 = 64;

const NOTE_OFF: u8 = 0x8;
const NOTE_ON: u8 = 0x9;
const CONTROL_CHANGE: u8 = 0xB;
const PITCH_BEND: u8 = 0xE;

/// Decodes `raw` into a [`VoiceEvent`] if it is a supported message addressed to `channel`.
///
/// Only the bytes an event needs are looked at: velocity is only compared against zero, and a pitch bend only keeps its
/// second data byte. Returns `None` for messages on other channels, unsupported message kinds, controllers other than
/// the sustain pedal, note numbers outside the MIDI range, and pitch bends whose second data byte exceeds seven bits.
pub fn decode(raw: RawMessage, channel: Channel) -> Option<VoiceEvent> {
    if raw.channel() != channel.index() {
        trace!(
            "Dropping message on channel {}; listening on {}",
            raw.channel(),
            channel.index()
        );
        return None;
    }
    trace!(
        "channel {} status {} data1 {} data2 {}",
        raw.channel(),
        raw.status(),
        raw.data1(),
        raw.data2()
    );

    match raw.status() {
        NOTE_OFF => note(raw).map(VoiceEvent::Release),
        // many keyboards signal a key release with a velocity-zero note on
        NOTE_ON if raw.data2() == 0 => note(raw).map(VoiceEvent::Release),
        NOTE_ON => note(raw).map(VoiceEvent::Press),
        CONTROL_CHANGE if raw.data1() == SUSTAIN_CONTROLLER => {
            Some(VoiceEvent::Sustain(raw.data2() >= SWITCH_ON_THRESHOLD))
        }
        PITCH_BEND => match U7::new(raw.data2()) {
            Ok(value) => Some(VoiceEvent::PitchBend(value)),
            Err(_) => {
                trace!("Ignoring pitch bend beyond seven bits: {}", raw.data2());
                None
            }
        },
        _ => {
            trace!("Ignoring unsupported message: {}", raw.to_bytes());
            None
        }
    }
}

/// The note number carried in the first data byte, if it is one.
fn note(raw: RawMessage) -> Option<Note> {
    match U7::new(raw.data1()) {
        Ok(u7) => Some(Note::from(u7)),
        Err(_) => {
            trace!("Ignoring note number out of range: {}", raw.data1());
            None
        }
    }
}

/// Splits data received over USB into [`RawMessage`]s, one per USB-MIDI Event Packet.
///
/// Each packet is four bytes; the first (cable number and code index) is not of interest, and the remaining three hold
/// the MIDI message. Messages shorter than three bytes are zero-padded by the sender, which decoding tolerates.
pub fn usb_event_packets(data: &[u8]) -> impl Iterator<Item = RawMessage> + '_ {
    data.chunks(4).filter_map(|potential_packet| {
        if potential_packet.len() != 4 {
            warn!("USB-MIDI Event Packets must always be 32 bits long");
            None
        } else {
            Some(RawMessage::from_bytes([
                potential_packet[1],
                potential_packet[2],
                potential_packet[3],
            ]))
        }
    })
}
