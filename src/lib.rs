/*!
  Decoder and disassembler for GalaxyScript VM bytecode.

  The decoding pipeline is this:
  ```text
  word -> [`EncodedInstruction`] -> opcode (bits 26..32) -> [opcode table] ->⋯

  ⋯-> [decode rule] -> `Operand`s -> `DecodedInstruction` -> [`render`] -> text
  ```
  Each word is decoded on its own; there is no state carried from one instruction to the
  next, and the opcode table is read-only once built. Decoding a stream is therefore an
  independent map over its words.

  ```
  use gsdisas::{decode, render};

  assert_eq!(render(&decode(0)), "add              r0, r0, r0");
  assert_eq!(decode(0xE800_0000).mnemonic(), "ud_3A");
  ```
*/

#[macro_use] extern crate lazy_static;
#[macro_use] extern crate prettytable;

pub mod bitview;
pub mod bytecode;
pub mod error;
pub mod listing;
pub mod logging;
pub mod operand;

pub use bitview::{extract, BitRange, EncodedInstruction, Word, INSTRUCTION_SIZE};
pub use bytecode::{
  decode, decode_stream, render, try_decode_instruction, DecodedInstruction, InstructionFlags,
  Opcode
};
pub use error::Error;
pub use listing::{disassemble, Listing};
pub use operand::{
  AddressSpace, Expression, Immediate, ImmediateKind, Operand, OperandClass, Operator, Reference,
  Register
};
