/*!
  Bitfield access on a single instruction word.

  Every GalaxyScript VM instruction is one 32 bit word. Fields are addressed by half open
  bit ranges `[start, stop)` counted from the least significant bit, so the opcode lives in
  `[26, 32)` and the first register field in `[21, 26)`. Extraction right-aligns the field:

    ```text
    31      26 25   21 20   16 15   11 10                 0
    [ opcode ][ reg A ][ reg B ][ reg C ][       ...        ]
    ```

  Ranges are fixed by the decode rules, so a bad range is a bug in this crate rather than a
  property of the input. It is therefore an assertion, not an `Err`.
*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use crate::error::Error;

// If you change this you must also change `extract` and the opcode table size.
pub type Word = u32;
pub const WORD_BITS: u32 = 32;
/// Every instruction is exactly one word.
pub const INSTRUCTION_SIZE: u32 = 4;

/// A half open bit interval `[start, stop)` within a word.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BitRange {
  start: u32,
  stop : u32
}

impl BitRange {
  /// Panics unless `start <= stop <= 32`.
  pub fn new(start: u32, stop: u32) -> BitRange {
    assert!(
      start <= stop && stop <= WORD_BITS,
      "invalid bit range [{}, {}) for a {} bit word", start, stop, WORD_BITS
    );
    BitRange{ start, stop }
  }

  pub fn start(&self) -> u32 {
    self.start
  }

  pub fn stop(&self) -> u32 {
    self.stop
  }

  pub fn width(&self) -> u32 {
    self.stop - self.start
  }

  /// The field selected by this range, right-aligned.
  pub fn extract(&self, word: Word) -> Word {
    // Widen so that neither a 32 bit shift nor a 32 bit mask overflows.
    let mask = (1u64 << self.width()) - 1;
    (((word as u64) >> self.start) & mask) as Word
  }
}

impl Display for BitRange {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}, {})", self.start, self.stop)
  }
}

/// Computes `((2^(stop - start) - 1) << start) & word) >> start`.
pub fn extract(word: Word, start: u32, stop: u32) -> Word {
  BitRange::new(start, stop).extract(word)
}


/// A raw, not yet decoded instruction word.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EncodedInstruction(Word);

impl EncodedInstruction {
  pub fn new(raw: Word) -> EncodedInstruction {
    EncodedInstruction(raw)
  }

  pub fn raw(&self) -> Word {
    self.0
  }

  /// Shorthand for `extract(self.raw(), start, stop)`.
  pub fn bits(&self, start: u32, stop: u32) -> Word {
    extract(self.0, start, stop)
  }

  /// The 6 bit opcode field.
  pub fn opcode(&self) -> u8 {
    self.bits(26, 32) as u8
  }
}

impl From<Word> for EncodedInstruction {
  fn from(raw: Word) -> Self {
    EncodedInstruction(raw)
  }
}

impl From<EncodedInstruction> for Word {
  fn from(insn: EncodedInstruction) -> Self {
    insn.0
  }
}

impl Display for EncodedInstruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:08X}", self.0)
  }
}

/// Wider integer types convert only when the value fits in a word.
macro_rules! impl_try_from_wide {
  ($($t:ty),*) => {
    $(
      impl TryFrom<$t> for EncodedInstruction {
        type Error = Error;

        fn try_from(raw: $t) -> Result<Self, Self::Error> {
          Word::try_from(raw)
            .map(EncodedInstruction)
            .map_err(|_| Error::InvalidWord(raw as i128))
        }
      }
    )*
  };
}

impl_try_from_wide!(u64, i64, i32, usize, isize);


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn full_range_is_identity(){
    for &word in &[0u32, 1, 0xDEAD_BEEF, 0x8000_0000, Word::max_value()] {
      assert_eq!(extract(word, 0, 32), word);
    }
  }

  #[test]
  fn empty_range_is_zero(){
    for n in 0..=32 {
      assert_eq!(extract(Word::max_value(), n, n), 0);
    }
  }

  #[test]
  fn fields(){
    let word = 0b000111_00011_00010_00001_00000000101;
    assert_eq!(extract(word, 26, 32), 0b000111);
    assert_eq!(extract(word, 21, 26), 3);
    assert_eq!(extract(word, 16, 21), 2);
    assert_eq!(extract(word, 11, 16), 1);
    assert_eq!(extract(word, 0, 11), 5);
    assert_eq!(extract(word, 0, 1), 1);
    assert_eq!(extract(word, 1, 2), 0);
  }

  #[test]
  fn top_bit(){
    assert_eq!(extract(0x8000_0000, 31, 32), 1);
    assert_eq!(extract(0xFC00_0000, 26, 32), 0x3F);
    assert_eq!(EncodedInstruction::new(0xFC00_0000).opcode(), 0x3F);
  }

  #[test]
  #[should_panic]
  fn reversed_range_panics(){
    extract(0, 5, 4);
  }

  #[test]
  #[should_panic]
  fn out_of_word_range_panics(){
    extract(0, 0, 33);
  }

  #[test]
  fn try_from_wide_values(){
    assert_eq!(EncodedInstruction::try_from(0xFFFF_FFFFu64), Ok(EncodedInstruction(0xFFFF_FFFF)));
    assert_eq!(EncodedInstruction::try_from(0x1_0000_0000u64), Err(Error::InvalidWord(0x1_0000_0000)));
    assert_eq!(EncodedInstruction::try_from(-1i64), Err(Error::InvalidWord(-1)));
    assert_eq!(EncodedInstruction::try_from(7i32).map(|e| e.raw()), Ok(7));
  }

  #[test]
  fn display(){
    assert_eq!(EncodedInstruction::new(0x1C).to_string(), "0000001C");
    assert_eq!(BitRange::new(21, 26).to_string(), "[21, 26)");
  }
}
