/*!

  GalaxyScript VM instructions are fixed width 32 bit little-endian words. The top six bits
  select the operation; the layout of the remaining 26 bits depends on the opcode:

    ```text
    [Opcode:6][A:5][B:5][C:5][Reserved:11]     three registers
    [Opcode:6][A:5][Immediate:21]              register and constant / code offset
    [Opcode:6][A:5][B:5][Immediate:16]         register, base register, displacement
    ```

  A few opcodes reuse part of that encoding space: `call` with register field zero is a
  direct call by function index, `push bp` pushes an immediate, and a store whose value
  register is `sp` stores zero. Those special cases live in the decode rules, see
  `rules.rs`. The per-opcode rule, mnemonic and flags are collected in the opcode table in
  `table.rs`, which is built once and never modified.

  An enum is used only for the opcode itself. Operands are decoded into the small operand
  language of `crate::operand`.

*/

mod assembly;
mod binary;
mod instruction;
mod rules;
mod table;

pub use assembly::{render, MNEMONIC_WIDTH};
pub use binary::{decode_stream, decode_words, encode_words, split_words, WordStream};
pub use instruction::{decode, try_decode_instruction, DecodedInstruction};
pub use table::{lookup, DecodeRule, TableEntry, TABLE_SIZE};

use std::fmt::{Display, Formatter};
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Error;

/**
  Opcodes of the virtual machine.

  The discriminant is the 6 bit opcode field, so the order and the explicit values below are
  significant. Opcodes above `Xor` are unassigned and decode to a `ud_XX` placeholder.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[repr(u8)]
pub enum Opcode {
  // Arithmetic and logic //
  #[strum(serialize = "add")]          Add         = 0x00,
  #[strum(serialize = "add_gc")]       AddGc       = 0x01,
  #[strum(serialize = "add_i21")]      AddI21      = 0x02,
  #[strum(serialize = "add_lsh11")]    AddLsh11    = 0x03,
  #[strum(serialize = "and")]          And         = 0x04,
  #[strum(serialize = "ckarbnds")]     CkArBnds    = 0x05,

  // Control transfer //
  #[strum(serialize = "jz")]           Jz          = 0x06,
  #[strum(serialize = "jmp")]          Jmp         = 0x07,
  #[strum(serialize = "jnz")]          Jnz         = 0x08,

  #[strum(serialize = "not")]          Not         = 0x09,
  #[strum(serialize = "div")]          Div         = 0x0A,
  #[strum(serialize = "fdiv")]         FDiv        = 0x0B,
  #[strum(serialize = "decref")]       DecRef      = 0x0C,
  #[strum(serialize = "seteq")]        SetEq       = 0x0D,
  #[strum(serialize = "seteq_gc")]     SetEqGc     = 0x0E,
  #[strum(serialize = "call")]         Call        = 0x0F,
  #[strum(serialize = "setge")]        SetGe       = 0x10,
  #[strum(serialize = "enter")]        Enter       = 0x11,
  #[strum(serialize = "bp")]           Breakpoint  = 0x12,

  // Loads //
  #[strum(serialize = "ld_const_i21")] LdConstI21  = 0x13,
  #[strum(serialize = "ld_global32i")] LdGlobal32i = 0x14,
  #[strum(serialize = "ld_global8i")]  LdGlobal8i  = 0x15,
  #[strum(serialize = "mov")]          Mov         = 0x16,
  #[strum(serialize = "add_i8")]       AddI8       = 0x17,
  #[strum(serialize = "ld_local32b")]  LdLocal32b  = 0x18,
  #[strum(serialize = "ld_local32")]   LdLocal32   = 0x19,
  #[strum(serialize = "ld_local8")]    LdLocal8    = 0x1A,
  #[strum(serialize = "ld_global32")]  LdGlobal32  = 0x1B,
  #[strum(serialize = "ld_global8")]   LdGlobal8   = 0x1C,
  #[strum(serialize = "ld_mem32")]     LdMem32     = 0x1D,
  #[strum(serialize = "ld_mem8")]      LdMem8      = 0x1E,

  #[strum(serialize = "mod")]          Mod         = 0x1F,
  #[strum(serialize = "mul")]          Mul         = 0x20,
  #[strum(serialize = "mul_i21")]      MulI21      = 0x21,
  #[strum(serialize = "fmul")]         FMul        = 0x22,
  #[strum(serialize = "setneq")]       SetNeq      = 0x23,
  #[strum(serialize = "neg")]          Neg         = 0x24,
  #[strum(serialize = "setneq_gc")]    SetNeqGc    = 0x25,
  #[strum(serialize = "seteq0")]       SetEq0      = 0x26,
  #[strum(serialize = "or")]           Or          = 0x27,

  // Stack //
  #[strum(serialize = "pop")]          Pop         = 0x28,
  #[strum(serialize = "push")]         Push        = 0x29,
  #[strum(serialize = "push_local32")] PushLocal32 = 0x2A,
  #[strum(serialize = "retn")]         Retn        = 0x2B,

  #[strum(serialize = "shl_r")]        ShlR        = 0x2C,
  #[strum(serialize = "shl_i8")]       ShlI8       = 0x2D,
  #[strum(serialize = "shr_r")]        ShrR        = 0x2E,
  #[strum(serialize = "shr_i8")]       ShrI8       = 0x2F,

  // Stores //
  #[strum(serialize = "st_mem32")]     StMem32     = 0x30,
  #[strum(serialize = "st_mem8")]      StMem8      = 0x31,
  #[strum(serialize = "st_gc")]        StGc        = 0x32,

  // Reference counting and strings //
  #[strum(serialize = "mkgc")]         MkGc        = 0x33,
  #[strum(serialize = "mkstr")]        MkStr       = 0x34,
  #[strum(serialize = "strcat")]       StrCat      = 0x35,
  // Operand shape is known, semantics are not.
  #[strum(serialize = "unk_36")]       Unk36       = 0x36,

  #[strum(serialize = "sub")]          Sub         = 0x37,
  #[strum(serialize = "sub_gc")]       SubGc       = 0x38,
  #[strum(serialize = "xor")]          Xor         = 0x39,
}

/// The highest opcode with a table entry.
pub const MAX_DEFINED_OPCODE: u8 = 0x39;
/// Mask of the 6 bit opcode field once shifted down.
pub const OPCODE_MASK: u8 = 0x3F;

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn mnemonic(&self) -> &'static str {
    (*self).into()
  }

  /// `None` for unassigned opcode values.
  pub fn from_code(code: u8) -> Option<Opcode> {
    Opcode::try_from_primitive(code).ok()
  }

  /// Resolves assembly text back to an opcode, e.g. `"ld_local32"`.
  pub fn from_mnemonic(mnemonic: &str) -> Result<Opcode, Error> {
    Opcode::from_str(mnemonic).map_err(|_| Error::UnknownMnemonic(mnemonic.to_string()))
  }

  pub fn flags(&self) -> InstructionFlags {
    match lookup(self.code()) {
      Some(entry) => entry.flags,
      None        => InstructionFlags::empty()
    }
  }
}


/**
  Operand usage and control flow behavior of an opcode. Operand numbers count from one, in
  the order the decode rule produces the operands.
*/
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
pub struct InstructionFlags(u16);

impl InstructionFlags {
  pub const USE1: InstructionFlags = InstructionFlags(1 << 1);
  pub const USE2: InstructionFlags = InstructionFlags(1 << 2);
  pub const USE3: InstructionFlags = InstructionFlags(1 << 3);
  pub const CHG1: InstructionFlags = InstructionFlags(1 << 4);
  pub const CHG2: InstructionFlags = InstructionFlags(1 << 5);
  pub const CHG3: InstructionFlags = InstructionFlags(1 << 6);
  pub const JUMP: InstructionFlags = InstructionFlags(1 << 7);
  pub const CALL: InstructionFlags = InstructionFlags(1 << 8);
  /// Does not pass control to the next instruction.
  pub const NO_FALLTHROUGH: InstructionFlags = InstructionFlags(1 << 9);
  // Read and written.
  pub const UCG1: InstructionFlags = InstructionFlags((1 << 1) | (1 << 4));

  const USES   : [InstructionFlags; 3] = [Self::USE1, Self::USE2, Self::USE3];
  const CHANGES: [InstructionFlags; 3] = [Self::CHG1, Self::CHG2, Self::CHG3];

  pub fn empty() -> InstructionFlags {
    InstructionFlags(0)
  }

  pub fn bits(&self) -> u16 {
    self.0
  }

  pub fn from_bits(bits: u16) -> InstructionFlags {
    InstructionFlags(bits)
  }

  pub fn is_empty(&self) -> bool {
    self.0 == 0
  }

  pub fn contains(&self, other: InstructionFlags) -> bool {
    self.0 & other.0 == other.0
  }

  /// Whether operand `n` (1-based) is read. Always false outside `1..=3`.
  pub fn uses(&self, n: usize) -> bool {
    n >= 1 && n <= 3 && self.contains(Self::USES[n - 1])
  }

  /// Whether operand `n` (1-based) is written. Always false outside `1..=3`.
  pub fn changes(&self, n: usize) -> bool {
    n >= 1 && n <= 3 && self.contains(Self::CHANGES[n - 1])
  }

  pub fn is_jump(&self) -> bool {
    self.contains(Self::JUMP)
  }

  pub fn is_call(&self) -> bool {
    self.contains(Self::CALL)
  }

  pub fn falls_through(&self) -> bool {
    !self.contains(Self::NO_FALLTHROUGH)
  }
}

impl BitOr for InstructionFlags {
  type Output = InstructionFlags;
  fn bitor(self, rhs: InstructionFlags) -> InstructionFlags {
    InstructionFlags(self.0 | rhs.0)
  }
}

impl BitOrAssign for InstructionFlags {
  fn bitor_assign(&mut self, rhs: InstructionFlags) {
    self.0 |= rhs.0;
  }
}

impl BitAnd for InstructionFlags {
  type Output = InstructionFlags;
  fn bitand(self, rhs: InstructionFlags) -> InstructionFlags {
    InstructionFlags(self.0 & rhs.0)
  }
}

impl Display for InstructionFlags {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let names = [
      (Self::USE1, "USE1"), (Self::USE2, "USE2"), (Self::USE3, "USE3"),
      (Self::CHG1, "CHG1"), (Self::CHG2, "CHG2"), (Self::CHG3, "CHG3"),
      (Self::JUMP, "JUMP"), (Self::CALL, "CALL"), (Self::NO_FALLTHROUGH, "NFLW"),
    ];
    let set: Vec<&str> =
      names.iter()
           .filter(|(flag, _)| self.contains(*flag))
           .map(|(_, name)| *name)
           .collect();
    match set.is_empty() {
      true  => write!(f, "-"),
      false => write!(f, "{}", set.join("|"))
    }
  }
}
