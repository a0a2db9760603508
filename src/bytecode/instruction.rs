/*!
  Decoding of a single instruction word into its mnemonic, flags and operands, along with
  the metadata a disassembler host needs to draw control flow edges.
*/

use std::borrow::Cow;
use std::convert::TryFrom;

use log::debug;

use crate::bitview::{EncodedInstruction, Word, INSTRUCTION_SIZE};
use crate::error::Error;
use crate::operand::Operand;
use super::rules;
use super::table::lookup;
use super::{InstructionFlags, Opcode};

/// Holds the decoded components of one instruction word.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DecodedInstruction {
  raw       : Word,
  opcode    : u8,
  operation : Option<Opcode>,
  mnemonic  : Cow<'static, str>,
  flags     : InstructionFlags,
  operands  : Vec<Operand>,
}

/**
  Decodes one word. Never fails: opcodes without a table entry decode to `ud_XX` (two digit
  uppercase hex) with no operands and no flags, since images may contain opcodes newer than
  the table.
*/
pub fn decode(word: Word) -> DecodedInstruction {
  let insn   = EncodedInstruction::new(word);
  let opcode = insn.opcode();

  match lookup(opcode) {

    Some(entry) => {
      DecodedInstruction {
        raw       : word,
        opcode,
        operation : Some(entry.opcode),
        mnemonic  : Cow::Borrowed(entry.mnemonic()),
        flags     : entry.flags,
        operands  : entry.decode_operands(insn),
      }
    }

    None => {
      debug!("no table entry for opcode {:02X} in word {}", opcode, insn);
      DecodedInstruction {
        raw       : word,
        opcode,
        operation : None,
        mnemonic  : Cow::Owned(format!("ud_{:02X}", opcode)),
        flags     : InstructionFlags::empty(),
        operands  : rules::unknown(insn),
      }
    }

  }
}

/// Like `decode`, for values that are not known to fit in 32 unsigned bits.
pub fn try_decode_instruction<T>(raw: T) -> Result<DecodedInstruction, Error>
  where EncodedInstruction: TryFrom<T, Error = Error>
{
  let insn = EncodedInstruction::try_from(raw)?;
  Ok(decode(insn.raw()))
}

impl DecodedInstruction {
  pub fn raw(&self) -> Word {
    self.raw
  }

  /// The 6 bit opcode field, whether or not it is assigned.
  pub fn opcode(&self) -> u8 {
    self.opcode
  }

  /// `None` for unassigned opcodes.
  pub fn operation(&self) -> Option<Opcode> {
    self.operation
  }

  pub fn is_unknown(&self) -> bool {
    self.operation.is_none()
  }

  pub fn mnemonic(&self) -> &str {
    &self.mnemonic
  }

  pub fn flags(&self) -> InstructionFlags {
    self.flags
  }

  pub fn operands(&self) -> &[Operand] {
    &self.operands
  }

  /// Every instruction is one word.
  pub fn size(&self) -> u32 {
    INSTRUCTION_SIZE
  }

  /// Whether operand `n` (1-based) is read.
  pub fn uses(&self, n: usize) -> bool {
    self.flags.uses(n)
  }

  /// Whether operand `n` (1-based) is written.
  pub fn changes(&self, n: usize) -> bool {
    self.flags.changes(n)
  }

  pub fn is_jump(&self) -> bool {
    self.flags.is_jump()
  }

  pub fn is_call(&self) -> bool {
    self.flags.is_call()
  }

  pub fn is_return(&self) -> bool {
    self.operation == Some(Opcode::Retn)
  }

  pub fn falls_through(&self) -> bool {
    self.flags.falls_through()
  }

  /// The operand holding the branch target: the only operand of `jmp`, the second of the
  /// conditional branches.
  pub fn jump_operand(&self) -> Option<&Operand> {
    if !self.is_jump() {
      return None;
    }
    let index = match self.operation {
      Some(Opcode::Jmp) => 0,
      _ => 1
    };
    self.operands.get(index)
  }

  /**
    The absolute branch target when this instruction sits at `address`. Code offsets are
    relative to the following instruction. `None` unless the jump operand is a reference to
    an immediate offset.
  */
  pub fn jump_target(&self, address: Word) -> Option<Word> {
    let offset = self.jump_operand()?.memory_address()?;
    Some(address.wrapping_add(self.size()).wrapping_add(offset))
  }

  /// Fall-through address first, then the branch target.
  pub fn successors(&self, address: Word) -> Vec<Word> {
    let mut successors = Vec::with_capacity(2);
    if self.falls_through() {
      successors.push(address.wrapping_add(self.size()));
    }
    if let Some(target) = self.jump_target(address) {
      successors.push(target);
    }
    successors
  }
}
