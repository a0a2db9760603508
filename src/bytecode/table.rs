//! The opcode table: for every opcode its mnemonic, operand decode rule and flags. It is built
//! on first use and is read-only afterwards, so it can be shared freely between threads.

use crate::bitview::EncodedInstruction;
use super::rules::{self, Operands};
use super::{InstructionFlags, Opcode};

/// Decodes the operands of one instruction word.
pub type DecodeRule = fn(EncodedInstruction) -> Operands;

/// One slot per value of the 6 bit opcode field.
pub const TABLE_SIZE: usize = 64;

#[derive(Copy, Clone)]
pub struct TableEntry {
  pub opcode : Opcode,
  pub rule   : DecodeRule,
  pub flags  : InstructionFlags,
}

impl TableEntry {
  pub fn mnemonic(&self) -> &'static str {
    self.opcode.mnemonic()
  }

  pub fn decode_operands(&self, insn: EncodedInstruction) -> Operands {
    (self.rule)(insn)
  }
}

impl std::fmt::Debug for TableEntry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TableEntry")
     .field("opcode", &self.opcode)
     .field("flags", &self.flags)
     .finish()
  }
}

/// The table entry for `opcode`, or `None` if the opcode is unassigned.
pub fn lookup(opcode: u8) -> Option<&'static TableEntry> {
  let table: &'static [Option<TableEntry>; TABLE_SIZE] = &OPCODE_TABLE;
  table.get(opcode as usize).and_then(Option::as_ref)
}

fn entry(opcode: Opcode, rule: DecodeRule, flags: InstructionFlags) -> TableEntry {
  TableEntry{ opcode, rule, flags }
}

fn build_table() -> [Option<TableEntry>; TABLE_SIZE] {
  const USE1: InstructionFlags = InstructionFlags::USE1;
  const USE2: InstructionFlags = InstructionFlags::USE2;
  const USE3: InstructionFlags = InstructionFlags::USE3;
  const CHG1: InstructionFlags = InstructionFlags::CHG1;
  const UCG1: InstructionFlags = InstructionFlags::UCG1;
  const JUMP: InstructionFlags = InstructionFlags::JUMP;
  const CALL: InstructionFlags = InstructionFlags::CALL;
  const NFLW: InstructionFlags = InstructionFlags::NO_FALLTHROUGH;
  let none = InstructionFlags::empty();

  use Opcode::*;
  let entries = vec![
    entry(Add,         rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(AddGc,       rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(AddI21,      rules::reg_const21,              CHG1 | USE2       ),
    entry(AddLsh11,    rules::reg_const21_lsh11,        UCG1 | USE2       ),
    entry(And,         rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(CkArBnds,    rules::reg_const21,              USE1 | USE2       ),
    entry(Jz,          rules::conditional_branch,       USE1 | USE2 | JUMP),
    entry(Jmp,         rules::jump,                     USE1 | JUMP | NFLW),
    entry(Jnz,         rules::conditional_branch,       USE1 | USE2 | JUMP),
    entry(Not,         rules::reg_reg,                  CHG1 | USE2       ),
    entry(Div,         rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(FDiv,        rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(DecRef,      rules::decref,                   USE1              ),
    entry(SetEq,       rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(SetEqGc,     rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(Call,        rules::call,                     USE1 | USE2 | CALL),
    entry(SetGe,       rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(Enter,       rules::reg_const21,              USE1 | USE2       ),
    entry(Breakpoint,  rules::no_operands,              none              ),
    entry(LdConstI21,  rules::reg_const21,              CHG1 | USE2       ),
    entry(LdGlobal32i, rules::reg_global21,             CHG1 | USE2       ),
    entry(LdGlobal8i,  rules::reg_global21,             CHG1 | USE2       ),
    entry(Mov,         rules::mov,                      CHG1 | USE2       ),
    entry(AddI8,       rules::reg_reg_const8,           CHG1 | USE2 | USE3),
    entry(LdLocal32b,  rules::load_local,               CHG1 | USE2       ),
    entry(LdLocal32,   rules::reg_base_const16_stack,   CHG1 | USE2       ),
    entry(LdLocal8,    rules::reg_base_const16_stack,   CHG1 | USE2       ),
    entry(LdGlobal32,  rules::reg_base_const16_global,  CHG1 | USE2       ),
    entry(LdGlobal8,   rules::reg_base_const16_global,  CHG1 | USE2       ),
    entry(LdMem32,     rules::reg_base_const16_unified, CHG1 | USE2       ),
    entry(LdMem8,      rules::reg_base_const16_unified, CHG1 | USE2       ),
    entry(Mod,         rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(Mul,         rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(MulI21,      rules::reg_const21,              UCG1 | USE2       ),
    entry(FMul,        rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(SetNeq,      rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(Neg,         rules::reg_reg,                  CHG1 | USE2       ),
    entry(SetNeqGc,    rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(SetEq0,      rules::reg_reg,                  CHG1 | USE2       ),
    entry(Or,          rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(Pop,         rules::pop,                      USE1 | USE2       ),
    entry(Push,        rules::push,                     USE1              ),
    entry(PushLocal32, rules::push_local,               USE1 | USE2       ),
    entry(Retn,        rules::retn,                     USE1 | NFLW       ),
    entry(ShlR,        rules::reg_reg,                  UCG1 | USE2       ),
    entry(ShlI8,       rules::reg_const8,               UCG1 | USE2       ),
    entry(ShrR,        rules::reg_reg,                  UCG1 | USE2       ),
    entry(ShrI8,       rules::reg_const8,               UCG1 | USE2       ),
    entry(StMem32,     rules::store,                    CHG1 | USE2       ),
    entry(StMem8,      rules::store,                    CHG1 | USE2       ),
    entry(StGc,        rules::store,                    CHG1 | USE2       ),
    entry(MkGc,        rules::reg,                      USE1              ),
    entry(MkStr,       rules::reg_global21,             CHG1 | USE2       ),
    entry(StrCat,      rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(Unk36,       rules::reg_base_const16_global,  none              ),
    entry(Sub,         rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(SubGc,       rules::reg_reg_reg,              CHG1 | USE2 | USE3),
    entry(Xor,         rules::reg_reg_reg,              CHG1 | USE2 | USE3),
  ];

  let mut table: [Option<TableEntry>; TABLE_SIZE] = [None; TABLE_SIZE];
  for e in entries {
    let slot = &mut table[e.opcode.code() as usize];
    assert!(slot.is_none(), "duplicate opcode table entry for {}", e.opcode);
    *slot = Some(e);
  }
  table
}

lazy_static! {
  static ref OPCODE_TABLE: [Option<TableEntry>; TABLE_SIZE] = build_table();
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::MAX_DEFINED_OPCODE;

  #[test]
  fn defined_opcodes_have_entries(){
    for code in 0..=MAX_DEFINED_OPCODE {
      let entry = lookup(code).expect("missing table entry");
      assert_eq!(entry.opcode.code(), code);
    }
  }

  #[test]
  fn unassigned_opcodes_have_no_entry(){
    for code in (MAX_DEFINED_OPCODE + 1)..(TABLE_SIZE as u8) {
      assert!(lookup(code).is_none());
    }
    assert!(lookup(0xFF).is_none());
  }

  #[test]
  fn unk_36_keeps_its_shape_without_flags(){
    let entry = lookup(0x36).unwrap();
    assert_eq!(entry.mnemonic(), "unk_36");
    assert!(entry.flags.is_empty());
    let operands = entry.decode_operands(EncodedInstruction::new((0x36 << 26) | (1 << 21) | (2 << 16) | 4));
    assert_eq!(operands.len(), 2);
    assert_eq!(operands[1].to_string(), "g::[r2+#04h]");
  }

  #[test]
  fn control_flow_flags(){
    let jmp = lookup(Opcode::Jmp.code()).unwrap();
    assert!(jmp.flags.is_jump() && !jmp.flags.falls_through());
    let jz = lookup(Opcode::Jz.code()).unwrap();
    assert!(jz.flags.is_jump() && jz.flags.falls_through());
    let retn = lookup(Opcode::Retn.code()).unwrap();
    assert!(!retn.flags.is_jump() && !retn.flags.falls_through());
    assert!(lookup(Opcode::Call.code()).unwrap().flags.is_call());
  }
}
