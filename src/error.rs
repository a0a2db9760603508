//! Errors raised while turning raw values or byte streams into instructions. Note that an
//! unknown opcode is *not* an error: it decodes to a `ud_XX` placeholder.

use thiserror::Error as ThisError;

#[derive(ThisError, Clone, Debug, Eq, PartialEq)]
pub enum Error {
  /// The raw value does not fit in an unsigned 32 bit word.
  #[error("invalid raw instruction: {0} does not fit in 32 unsigned bits")]
  InvalidWord(i128),

  /// The byte stream ended in the middle of a word.
  #[error("truncated instruction stream: {trailing} trailing byte(s) at offset {offset:#X}")]
  TruncatedStream {
    offset   : usize,
    trailing : usize
  },

  /// The text is not the mnemonic of any defined opcode.
  #[error("unknown mnemonic `{0}`")]
  UnknownMnemonic(String),
}

pub type Result<T> = std::result::Result<T, Error>;
