//! Whole-image output: plain assembly text, one line per word, and an addressed listing that
//! also shows the raw word and where control goes next.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::bitview::{Word, INSTRUCTION_SIZE};
use crate::bytecode::{decode, decode_stream, decode_words, DecodedInstruction};
use crate::error::Error;

/// Renders every word of the image, each line terminated by a newline, in input order.
pub fn disassemble(bytes: &[u8]) -> Result<String, Error> {
  let mut text = String::with_capacity(bytes.len() * 8);
  for instruction in decode_stream(bytes)? {
    text.push_str(&instruction.to_string());
    text.push('\n');
  }
  Ok(text)
}

pub struct ListingRow {
  pub address     : Word,
  pub instruction : DecodedInstruction,
}

impl ListingRow {
  fn flow(&self) -> String {
    let mut parts = vec![];
    if !self.instruction.falls_through() {
      parts.push("stop".to_string());
    }
    if let Some(target) = self.instruction.jump_target(self.address) {
      parts.push(format!("-> {:08X}", target));
    }
    if self.instruction.is_call() {
      parts.push("call".to_string());
    }
    parts.join(" ")
  }
}

/// Decoded image with load addresses, starting at `base`.
pub struct Listing {
  base : Word,
  rows : Vec<ListingRow>,
}

impl Listing {
  pub fn new(base: Word, bytes: &[u8]) -> Result<Listing, Error> {
    let rows =
      decode_words(bytes)?
        .into_iter()
        .enumerate()
        .map(|(i, word)| ListingRow {
          address     : base.wrapping_add(i as Word * INSTRUCTION_SIZE),
          instruction : decode(word),
        })
        .collect();
    Ok(Listing{ base, rows })
  }

  pub fn base(&self) -> Word {
    self.base
  }

  pub fn rows(&self) -> &[ListingRow] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn to_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubr->"Word", ubl->"Instruction", ubl->"Flow"]);

    for row in &self.rows {
      table.add_row(
        row![
          r->format!("{:08X}", row.address),
          r->format!("{:08X}", row.instruction.raw()),
          row.instruction.to_string(),
          row.flow()
        ]
      );
    }
    table
  }
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Listing {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.to_table())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::encode_words;

  #[test]
  fn four_words_four_lines(){
    let bytes = encode_words(&[0, 0x16 << 26 | 1 << 21 | 2 << 16, 0x07 << 26 | 1, 0x2B << 26]);
    assert_eq!(bytes.len(), 16);
    let text = disassemble(&bytes).unwrap();
    assert_eq!(
      text,
      "add              r0, r0, r0\n\
       mov              r1, r2\n\
       jmp              c::[+#04h]\n\
       retn             #00h\n"
    );
    assert_eq!(text.lines().count(), 4);
  }

  #[test]
  fn truncated_image_is_an_error(){
    assert_eq!(disassemble(&[0, 0, 0]), Err(Error::TruncatedStream{ offset: 0, trailing: 3 }));
  }

  #[test]
  fn addresses_and_flow(){
    let bytes = encode_words(&[0x06 << 26 | 2 << 21 | 1, 0x07 << 26 | 3, 0x0F << 26 | 3 << 21]);
    let listing = Listing::new(0x1000, &bytes).unwrap();
    assert_eq!(listing.len(), 3);
    let addresses: Vec<Word> = listing.rows().iter().map(|r| r.address).collect();
    assert_eq!(addresses, vec![0x1000, 0x1004, 0x1008]);
    assert_eq!(listing.rows()[0].flow(), "-> 00001008");
    assert_eq!(listing.rows()[1].flow(), "stop -> 00001014");
    assert_eq!(listing.rows()[2].flow(), "call");

    let table = listing.to_string();
    assert!(table.contains("00001004"));
    assert!(table.contains("jmp              c::[+#0Ch]"));
  }

  #[test]
  fn listing_renders_as_table(){
    let listing = Listing::new(0, &encode_words(&[0, 0x2B << 26])).unwrap();
    let text = listing.to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].contains("Address") && lines[0].contains("Instruction"));
    let add = lines.iter().find(|l| l.contains("add              r0, r0, r0")).unwrap();
    assert!(add.contains("00000000"));
    let retn = lines.iter().find(|l| l.contains("retn")).unwrap();
    assert!(retn.contains("00000004") && retn.contains("AC000000") && retn.contains("stop"));
  }
}
