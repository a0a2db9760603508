/*!
  Operand decode rules. Each rule is a pure function of the instruction word and only reads
  fixed bit positions. Field names used below:

    ```text
    A  = [21, 26)    first register field
    B  = [16, 21)    second register field
    C  = [11, 16)    third register field
    ```
*/

use crate::bitview::{EncodedInstruction, Word};
use crate::operand::{AddressSpace, Expression, Immediate, Operand, Reference, Register};

pub type Operands = Vec<Operand>;

fn field_a(insn: EncodedInstruction) -> Word {
  insn.bits(21, 26)
}

fn field_b(insn: EncodedInstruction) -> Word {
  insn.bits(16, 21)
}

fn reg_a(insn: EncodedInstruction) -> Register {
  Register::new(field_a(insn))
}

fn reg_b(insn: EncodedInstruction) -> Register {
  Register::new(field_b(insn))
}

fn reg_c(insn: EncodedInstruction) -> Register {
  Register::new(insn.bits(11, 16))
}

fn const16(insn: EncodedInstruction) -> Immediate {
  Immediate::new(insn.bits(0, 16), 16)
}

fn const21(insn: EncodedInstruction) -> Immediate {
  Immediate::new(insn.bits(0, 21), 21)
}

/// `s::[bp+<displacement>]`
fn frame_slot<T: Into<Operand>>(displacement: T) -> Reference {
  Reference::new(Expression::add(Register::bp(), displacement), AddressSpace::Stack)
}

/// Fallback for opcodes without a table entry.
pub fn unknown(_insn: EncodedInstruction) -> Operands {
  vec![]
}

pub fn no_operands(_insn: EncodedInstruction) -> Operands {
  vec![]
}

pub fn reg(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into()]
}

pub fn reg_reg(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into(), reg_b(insn).into()]
}

pub fn reg_reg_reg(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into(), reg_b(insn).into(), reg_c(insn).into()]
}

pub fn reg_const21(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into(), const21(insn).into()]
}

pub fn reg_const8(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into(), Immediate::new(insn.bits(0, 8), 8).into()]
}

pub fn reg_reg_const8(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into(), reg_b(insn).into(), Immediate::new(insn.bits(0, 8), 8).into()]
}

/// Global by index: `mkstr`, `ld_global32i`, `ld_global8i`.
pub fn reg_global21(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into(), Reference::new(const21(insn), AddressSpace::Global).into()]
}

/// The 21 bit field supplies the upper bits of a 32 bit constant.
pub fn reg_const21_lsh11(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into(), Immediate::new(insn.bits(0, 21) << 11, 32).into()]
}

/// `jz`/`jnz`: the code offset is in words.
pub fn conditional_branch(insn: EncodedInstruction) -> Operands {
  let offset = Immediate::new(insn.bits(0, 21) << 2, 23);
  vec![reg_a(insn).into(), Reference::ip_relative(offset, AddressSpace::Code).into()]
}

pub fn jump(insn: EncodedInstruction) -> Operands {
  let offset = Immediate::new(insn.bits(0, 21) << 2, 21);
  vec![Reference::ip_relative(offset, AddressSpace::Code).into()]
}

fn reg_base_const16(insn: EncodedInstruction, space: AddressSpace) -> Operands {
  let address = Expression::add(reg_b(insn), const16(insn));
  vec![reg_a(insn).into(), Reference::new(address, space).into()]
}

pub fn reg_base_const16_stack(insn: EncodedInstruction) -> Operands {
  reg_base_const16(insn, AddressSpace::Stack)
}

pub fn reg_base_const16_global(insn: EncodedInstruction) -> Operands {
  reg_base_const16(insn, AddressSpace::Global)
}

pub fn reg_base_const16_unified(insn: EncodedInstruction) -> Operands {
  reg_base_const16(insn, AddressSpace::Unified)
}

/// `ld_local32b`: the base is implicitly the frame pointer.
pub fn load_local(insn: EncodedInstruction) -> Operands {
  vec![reg_a(insn).into(), frame_slot(const16(insn)).into()]
}

/// `push_local32`: field A is a flag rather than a register.
pub fn push_local(insn: EncodedInstruction) -> Operands {
  vec![Immediate::boolean(field_a(insn), 5).into(), frame_slot(const16(insn)).into()]
}

/// Register field zero means a direct call by function index in `[1, 21)`.
pub fn call(insn: EncodedInstruction) -> Operands {
  let flag = Immediate::boolean(insn.bits(0, 1), 1);
  let target: Operand = match field_a(insn) {
    0     => Immediate::new(insn.bits(1, 21), 20).into(),
    index => Register::new(index).into()
  };
  vec![target, flag.into()]
}

/// `push bp` is encoding space for pushing a 21 bit immediate.
pub fn push(insn: EncodedInstruction) -> Operands {
  let operand: Operand = match field_a(insn) {
    Register::BP => const21(insn).into(),
    index        => Register::new(index).into()
  };
  vec![operand]
}

pub fn pop(insn: EncodedInstruction) -> Operands {
  vec![Immediate::new(insn.bits(4, 26), 22).into(), Immediate::new(insn.bits(0, 4), 4).into()]
}

// ToDo: The immediate packs several fields whose split is not known yet.
pub fn retn(insn: EncodedInstruction) -> Operands {
  vec![const16(insn).into()]
}

/**
  `st_mem32`, `st_mem8`, `st_gc`. With a frame pointer base the 16 bit field is a
  displacement. With any other base it selects the address space instead:

    ```text
    0      g::[base]
    1      s::[base]
    other  u::[base]
    ```

  A value register of `sp` stores the constant zero.
*/
pub fn store(insn: EncodedInstruction) -> Operands {
  let base  = field_a(insn);
  let value = field_b(insn);
  let imm   = insn.bits(0, 16);

  let destination = match base {
    Register::BP => frame_slot(const16(insn)),
    _ => {
      let space = match imm {
        0 => AddressSpace::Global,
        1 => AddressSpace::Stack,
        _ => AddressSpace::Unified
      };
      Reference::new(Register::new(base), space)
    }
  };

  let source: Operand = match value {
    Register::SP => Immediate::new(0, 32).into(),
    index        => Register::new(index).into()
  };

  vec![destination.into(), source]
}

/// Always frame relative; a register other than `bp` adds a dynamic offset.
pub fn decref(insn: EncodedInstruction) -> Operands {
  let offset: Operand = match field_a(insn) {
    Register::BP => const21(insn).into(),
    index        => Expression::add(Register::new(index), const21(insn)).into()
  };
  vec![frame_slot(offset).into()]
}

/// A zero displacement is a plain register move.
pub fn mov(insn: EncodedInstruction) -> Operands {
  let displacement = const16(insn);
  let source: Operand = match displacement.value {
    0 => reg_b(insn).into(),
    _ => Expression::add(reg_b(insn), displacement).into()
  };
  vec![reg_a(insn).into(), source]
}
