/*!
  This module is responsible for splitting a bytecode image into instruction words. The image
  is a flat sequence of 32 bit little-endian words with no header or padding, so the word at
  byte offset `4 * n` is instruction `n`.
*/

use log::{trace, warn};
use nom::{
  error::ErrorKind,
  multi::many0,
  number::complete::le_u32,
  IResult
};

use crate::bitview::{Word, INSTRUCTION_SIZE};
use crate::error::Error;
use super::{decode, DecodedInstruction};

type WordResult<'a, O> = IResult<&'a [u8], O, (&'a [u8], ErrorKind)>;

fn words_p(input: &[u8]) -> WordResult<'_, Vec<Word>> {
  many0(le_u32)(input)
}

/// Splits `bytes` into whole words and whatever trails the last whole word.
pub fn split_words(bytes: &[u8]) -> (Vec<Word>, &[u8]) {
  match words_p(bytes) {
    Ok((rest, words)) => (words, rest),
    // `many0` stops at the first short word instead of failing, so this is not reached.
    Err(_) => (Vec::new(), bytes)
  }
}

/// All words of the image. A length that is not a multiple of four is an error.
pub fn decode_words(bytes: &[u8]) -> Result<Vec<Word>, Error> {
  let (words, rest) = split_words(bytes);
  match rest.is_empty() {
    true  => Ok(words),
    false => {
      let offset = words.len() * INSTRUCTION_SIZE as usize;
      warn!("{} trailing byte(s) after the last whole word at offset {:#X}", rest.len(), offset);
      Err(Error::TruncatedStream{ offset, trailing: rest.len() })
    }
  }
}

/// Decodes every word of the image, in order.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<DecodedInstruction>, Error> {
  let words = decode_words(bytes)?;
  Ok(
    words.into_iter()
         .enumerate()
         .map(|(i, word)| {
           let instruction = decode(word);
           trace!("{:08X}: {:08X} {}", i * INSTRUCTION_SIZE as usize, word, instruction);
           instruction
         })
         .collect()
  )
}

/// Encodes words back into a little-endian image.
pub fn encode_words(words: &[Word]) -> Vec<u8> {
  words.iter().flat_map(|word| word.to_le_bytes().to_vec()).collect()
}


/// Lazily yields `(byte offset, word)` pairs, stopping before a trailing partial word.
pub struct WordStream<'a> {
  input  : &'a [u8],
  offset : usize
}

impl<'a> WordStream<'a> {
  pub fn new(bytes: &'a [u8]) -> WordStream<'a> {
    WordStream{ input: bytes, offset: 0 }
  }

  /// Bytes not yet consumed. After the stream is exhausted, non-empty only for a truncated
  /// image.
  pub fn remainder(&self) -> &'a [u8] {
    self.input
  }

  pub fn offset(&self) -> usize {
    self.offset
  }
}

impl<'a> Iterator for WordStream<'a> {
  type Item = (usize, Word);

  fn next(&mut self) -> Option<Self::Item> {
    let result: WordResult<'a, Word> = le_u32(self.input);
    match result {
      Ok((rest, word)) => {
        let offset = self.offset;
        self.input = rest;
        self.offset += INSTRUCTION_SIZE as usize;
        Some((offset, word))
      }
      Err(_) => None
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn little_endian_words(){
    let bytes = [0x01, 0x00, 0x00, 0x1C, 0xFF, 0xFF, 0xFF, 0xFF];
    assert_eq!(decode_words(&bytes), Ok(vec![0x1C00_0001, 0xFFFF_FFFF]));
  }

  #[test]
  fn empty_image(){
    assert_eq!(decode_words(&[]), Ok(vec![]));
    assert_eq!(decode_stream(&[]).map(|v| v.len()), Ok(0));
  }

  #[test]
  fn truncated_tail(){
    let bytes = [0, 0, 0, 0, 1, 2];
    assert_eq!(decode_words(&bytes), Err(Error::TruncatedStream{ offset: 4, trailing: 2 }));
    let (words, rest) = split_words(&bytes);
    assert_eq!(words, vec![0]);
    assert_eq!(rest, &[1, 2]);
  }

  #[test]
  fn encode_then_split(){
    let words = vec![0, 0x1C00_0001, 0xDEAD_BEEF];
    let bytes = encode_words(&words);
    assert_eq!(bytes.len(), 12);
    assert_eq!(&bytes[4..8], &[0x01, 0x00, 0x00, 0x1C]);
    assert_eq!(split_words(&bytes).0, words);
  }

  #[test]
  fn word_stream(){
    let bytes = [1, 0, 0, 0, 2, 0, 0, 0, 3];
    let mut stream = WordStream::new(&bytes);
    assert_eq!(stream.next(), Some((0, 1)));
    assert_eq!(stream.next(), Some((4, 2)));
    assert_eq!(stream.next(), None);
    assert_eq!(stream.offset(), 8);
    assert_eq!(stream.remainder(), &[3]);
  }

  #[test]
  fn stream_keeps_order(){
    let bytes = encode_words(&[0, 0x07 << 26 | 1, 0x2B << 26, 0x3F << 26]);
    let mnemonics: Vec<String> =
      decode_stream(&bytes)
        .unwrap()
        .iter()
        .map(|i| i.mnemonic().to_string())
        .collect();
    assert_eq!(mnemonics, vec!["add", "jmp", "retn", "ud_3F"]);
  }
}
