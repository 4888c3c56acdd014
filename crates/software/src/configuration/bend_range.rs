use num_derive::{FromPrimitive, ToPrimitive};

/// Preset pitch-bend ranges, selectable from a pushbutton. See [`Configuration::bend_semitones`](super::Configuration::bend_semitones).
#[derive(Debug, Default, Clone, Copy, ToPrimitive, FromPrimitive, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BendRange {
    /// ±2 semitones, the General MIDI default.
    #[default]
    WholeTone,
    /// ±7 semitones.
    Fifth,
    /// ±12 semitones.
    Octave,
    /// ±24 semitones.
    TwoOctaves,
}

impl BendRange {
    /// Returns the bend range in semitones.
    pub fn semitones(&self) -> f64 {
        match self {
            Self::WholeTone => 2.0,
            Self::Fifth => 7.0,
            Self::Octave => 12.0,
            Self::TwoOctaves => 24.0,
        }
    }
}

impl super::CycleConfig for BendRange {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::CycleConfig;

    #[test]
    fn semitones() {
        assert_eq!(2.0, BendRange::WholeTone.semitones(), "Expected left but got right");
        assert_eq!(24.0, BendRange::TwoOctaves.semitones(), "Expected left but got right");
    }

    #[test]
    fn cycle_wraps() {
        assert_eq!(
            BendRange::WholeTone,
            BendRange::TwoOctaves.cycle(),
            "Should wrap around to first variant; expected left but got right"
        );
    }
}
