//! This module contains the settings an [`Engine`](crate::engine::Engine) is built with, along with a trait that makes
//! enum-valued settings easy to step through from a pushbutton.

mod bend_range;
pub use bend_range::*;

use measurements::Voltage;
use num_traits::{FromPrimitive, ToPrimitive};
use wmidi::{Channel, Note};

/// A trait which allows infinite cycling of an enum's variants.
///
/// Useful for pushbutton user interfaces, allowing presses to advance from the current to the next variant,
/// cycling back to the beginning when all variants have been exhausted.
pub trait CycleConfig {
    /// Return the next variant, cycling back to the beginning as needed.
    fn cycle(self) -> Self
    where
        Self: FromPrimitive + ToPrimitive + Sized,
    {
        let index = self
            .to_u8()
            .expect("enum variants should be castable to u8");
        match <Self as FromPrimitive>::from_u8(index + 1) {
            Some(new_selection) => new_selection,
            None => FromPrimitive::from_u8(0).expect("enum should not be empty"),
        }
    }
}

/// The note which produces a pitch level of zero when the pitch wheel is centered.
pub const DEFAULT_REFERENCE_NOTE: Note = Note::E4;

/// Logic-high level of the gate signal.
pub const DEFAULT_GATE_VOLTS: f64 = 5.0;

/// Settings that determine which messages are honored and how voice state is expressed as signals.
///
/// Changing any of these never alters voice state; the new values take effect the next time outputs are computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Configuration {
    /// Messages on any other channel are dropped before they are interpreted.
    pub channel: Channel,
    /// The note that maps to a pitch level of zero.
    pub reference_note: Note,
    /// How far, in semitones, a fully deflected pitch wheel bends the sounding note in either direction. Any value is
    /// accepted; [`BendRange`] lists the common presets.
    pub bend_semitones: f64,
    /// Level of the gate signal while a note sounds.
    pub gate_level: Voltage,
    /// Pitch level change per octave.
    pub voltage_per_octave: Voltage,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            channel: Channel::Ch1,
            reference_note: DEFAULT_REFERENCE_NOTE,
            bend_semitones: BendRange::default().semitones(),
            gate_level: Voltage::from_volts(DEFAULT_GATE_VOLTS),
            voltage_per_octave: Voltage::from_volts(1.0),
        }
    }
}

impl Configuration {
    /// Constructs a default [`Configuration`] listening on the channel with the given zero-based index.
    ///
    /// Fails if `index` is not in `0..=15`.
    pub fn with_channel_index(index: u8) -> Result<Self, wmidi::Error> {
        let channel = Channel::from_index(index)?;
        Ok(Self {
            channel,
            ..Self::default()
        })
    }

    /// Returns this [`Configuration`] with the bend range set to a preset.
    pub fn with_bend_range(self, range: BendRange) -> Self {
        Self {
            bend_semitones: range.semitones(),
            ..self
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Configuration {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Configuration {{ channel: {}, reference_note: {}, bend_semitones: {}, gate_level: {}, voltage_per_octave: {} }}",
            self.channel.index(),
            self.reference_note.to_str(),
            self.bend_semitones,
            self.gate_level.as_volts(),
            self.voltage_per_octave.as_volts()
        );
    }
}
