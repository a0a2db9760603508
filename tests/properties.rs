//! Property tests over the whole word space: extraction identities, total decoding, operand
//! counts per opcode and deterministic rendering.

use gsdisas::bytecode::{lookup, MAX_DEFINED_OPCODE, MNEMONIC_WIDTH};
use gsdisas::{decode, extract, render, Opcode, Word};
use proptest::prelude::*;

/// Operand count each defined opcode produces, independent of the other fields.
fn expected_operand_count(opcode: Opcode) -> usize {
  use Opcode::*;
  match opcode {
    Breakpoint => 0,
    Jmp | Push | Retn | DecRef | MkGc => 1,
    Add | AddGc | And | Div | FDiv | SetEq | SetEqGc | SetGe | AddI8 | Mod | Mul | FMul
    | SetNeq | SetNeqGc | Or | StrCat | Sub | SubGc | Xor => 3,
    _ => 2,
  }
}

fn with_opcode(opcode: u8, rest: Word) -> Word {
  ((opcode as Word) << 26) | (rest & 0x03FF_FFFF)
}

proptest! {
  #[test]
  fn full_range_is_identity(word in any::<u32>()) {
    prop_assert_eq!(extract(word, 0, 32), word);
  }

  #[test]
  fn empty_range_is_zero(word in any::<u32>(), n in 0u32..=32) {
    prop_assert_eq!(extract(word, n, n), 0);
  }

  #[test]
  fn extract_fits_width(word in any::<u32>(), start in 0u32..=32, width in 0u32..=32) {
    let stop = (start + width).min(32);
    let value = extract(word, start, stop) as u64;
    prop_assert!(value < (1u64 << (stop - start)));
  }

  #[test]
  fn defined_opcodes_decode_to_table_shape(opcode in 0u8..=MAX_DEFINED_OPCODE, rest in any::<u32>()) {
    let entry = lookup(opcode).unwrap();
    let insn = decode(with_opcode(opcode, rest));
    prop_assert_eq!(insn.mnemonic(), entry.mnemonic());
    prop_assert_eq!(insn.opcode(), opcode);
    prop_assert_eq!(insn.flags(), entry.flags);
    prop_assert_eq!(insn.operands().len(), expected_operand_count(entry.opcode));
  }

  #[test]
  fn undefined_opcodes_fall_back(opcode in (MAX_DEFINED_OPCODE + 1)..=0x3Fu8, rest in any::<u32>()) {
    let insn = decode(with_opcode(opcode, rest));
    prop_assert_eq!(insn.mnemonic().to_string(), format!("ud_{:02X}", opcode));
    prop_assert!(insn.operands().is_empty());
    prop_assert!(insn.flags().is_empty());
  }

  #[test]
  fn render_is_deterministic(word in any::<u32>()) {
    let first = render(&decode(word));
    let second = render(&decode(word));
    prop_assert_eq!(&first, &second);
    prop_assert!(first.len() > MNEMONIC_WIDTH);
    prop_assert_eq!(first.as_bytes()[MNEMONIC_WIDTH], b' ');
    prop_assert!(!first.contains('\n'));
  }

  #[test]
  fn mov_never_renders_zero_displacement(dst in 0u32..32, src in 0u32..32) {
    let text = render(&decode((0x16 << 26) | (dst << 21) | (src << 16)));
    prop_assert!(!text.contains("+#00h"));
  }
}
