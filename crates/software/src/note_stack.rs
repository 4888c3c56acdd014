//! Provides [`NoteStack`], the ordered set of keys currently held down. On a monophonic instrument many keys may be
//! held while only one sounds; the stack remembers the rest so that releasing the sounding key can fall back to them.

use tinyvec::{ArrayVec, array_vec};
use wmidi::{Note, U7};

/// Number of distinct MIDI notes. A stack of this capacity can hold every note at once and so never overflows.
pub const NOTE_RANGE: usize = 128;

/// Held notes ordered by press recency, most recently pressed last. A note appears at most once.
///
/// Internally, this struct uses the [`U7`] type because [`tinyvec`] requires that `Items` implement [`Default`].
/// However, [`U7`] can be a bit unwieldy, so public interfaces will deal with the related [`Note`] type instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteStack<const N: usize = NOTE_RANGE> {
    data: ArrayVec<[U7; N]>,
}

impl<const N: usize> Default for NoteStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for NoteStack<N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "NoteStack {{ data: [");
        for (i, note) in self.iter().enumerate() {
            if i == 0 {
                defmt::write!(fmt, " ");
            } else {
                defmt::write!(fmt, ", ");
            }
            defmt::write!(fmt, "{} ({})", note.to_str(), u8::from(note));
        }
        defmt::write!(fmt, " ] }}");
    }
}

impl<const N: usize> NoteStack<N> {
    /// Construct an empty `NoteStack`.
    pub fn new() -> Self {
        Self { data: array_vec!() }
    }

    /// Makes `note` the most recently pressed note, moving it to the top if it was already held.
    ///
    /// When the stack is full, the least recently pressed note is forgotten to make room.
    pub fn press(&mut self, note: Note) {
        let u7 = U7::from_u8_lossy(note as u8);
        self.data.retain(|&n| n != u7);
        if self.data.len() == self.data.capacity() {
            self.data.remove(0);
        }
        self.data.push(u7);
    }

    /// Forgets `note`. Returns `true` if it was held.
    pub fn release(&mut self, note: Note) -> bool {
        let u7 = U7::from_u8_lossy(note as u8);
        let before = self.data.len();
        self.data.retain(|&n| n != u7);
        self.data.len() != before
    }

    /// Returns the most recently pressed note still held.
    pub fn peek(&self) -> Option<Note> {
        self.data.last().map(|&u7| Note::from(u7))
    }

    /// Determine if `note` is held.
    pub fn contains(&self, note: Note) -> bool {
        self.data.contains(&U7::from_u8_lossy(note as u8))
    }

    /// Number of held notes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Determine if any [`Note`]s are held.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns an [`Iterator`] over the held [`Note`]s.
    ///
    /// Order is preserved; e.g., the earliest pressed `Note` can be accessed via the first call to `.next()`, and the
    /// most recently pressed `Note` is accessible via `.last()`.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.data.iter().map(|&i| Note::from(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C_NOTE: U7 = U7::from_u8_lossy(60);
    const D_NOTE: U7 = U7::from_u8_lossy(62);
    const E_NOTE: U7 = U7::from_u8_lossy(64);
    const G_NOTE: U7 = U7::from_u8_lossy(67);

    fn chord() -> NoteStack {
        NoteStack {
            data: array_vec!([U7; NOTE_RANGE] => E_NOTE, C_NOTE, G_NOTE),
        }
    }

    #[test]
    fn new() {
        let expected: NoteStack = NoteStack { data: array_vec!() };
        let actual = NoteStack::new();
        assert_eq!(expected, actual, "Expected left but got right");
    }

    #[test]
    fn press_appends() {
        let expected = NoteStack {
            data: array_vec!([U7; NOTE_RANGE] => E_NOTE, C_NOTE, G_NOTE, D_NOTE),
        };

        let mut actual = chord();
        actual.press(D_NOTE.into());

        assert_eq!(expected, actual, "Expected left but got right");
    }

    #[test]
    fn repeated_press_moves_note_to_top() {
        let expected = NoteStack {
            data: array_vec!([U7; NOTE_RANGE] => E_NOTE, G_NOTE, C_NOTE),
        };

        let mut actual = chord();
        actual.press(C_NOTE.into());

        assert_eq!(expected, actual, "Expected left but got right");
    }

    #[test]
    fn same_note_twice_is_held_once() {
        let mut stack: NoteStack = NoteStack::new();
        stack.press(Note::C4);
        stack.press(Note::C4);
        assert_eq!(1, stack.len(), "Expected left but got right");
        assert_eq!(Some(Note::C4), stack.peek(), "Expected left but got right");

        stack.release(Note::C4);
        assert!(stack.is_empty(), "A single release should forget a note pressed twice");
    }

    #[test]
    fn press_evicts_oldest_when_full() {
        let mut stack = NoteStack::<2>::new();
        stack.press(Note::C4);
        stack.press(Note::D4);
        stack.press(Note::E4);

        let mut iter = stack.iter();
        assert_eq!(Some(Note::D4), iter.next());
        assert_eq!(Some(Note::E4), iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn full_stack_repress_does_not_evict() {
        let mut stack = NoteStack::<2>::new();
        stack.press(Note::C4);
        stack.press(Note::D4);
        stack.press(Note::C4);

        let mut iter = stack.iter();
        assert_eq!(Some(Note::D4), iter.next());
        assert_eq!(Some(Note::C4), iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn release() {
        let expected = NoteStack {
            data: array_vec!([U7; NOTE_RANGE] => E_NOTE, G_NOTE),
        };

        let mut actual = chord();
        assert!(actual.release(C_NOTE.into()), "C should have been held");

        assert_eq!(expected, actual, "Expected left but got right");
    }

    #[test]
    fn release_of_unheld_note_is_noop() {
        let mut actual = chord();
        assert!(!actual.release(D_NOTE.into()), "D should not have been held");
        assert_eq!(chord(), actual, "Expected left but got right");
    }

    #[test]
    fn peek() {
        assert_eq!(Some(Note::G4), chord().peek(), "Expected left but got right");
        assert_eq!(None, NoteStack::<4>::new().peek(), "Expected left but got right");
    }

    #[test]
    fn contains() {
        assert!(chord().contains(Note::E4));
        assert!(!chord().contains(Note::D4));
    }

    #[test]
    fn should_be_empty() {
        let stack: NoteStack = NoteStack { data: array_vec!() };
        assert!(stack.is_empty());
    }

    #[test]
    fn should_not_be_empty() {
        assert!(!chord().is_empty());
    }

    #[test]
    fn iter() {
        let chord = chord();
        let mut iter = chord.iter();
        assert_eq!(Some(Note::E4), iter.next());
        assert_eq!(Some(Note::C4), iter.next());
        assert_eq!(Some(Note::G4), iter.next());
        assert_eq!(None, iter.next());
    }
}
