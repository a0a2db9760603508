//! The operand language of decoded instructions: registers, immediates, arithmetic expressions
//! and address space references. Each variant knows its own textual form.

use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::bitview::Word;

pub type RegisterIndex = u8;

/// One of the 32 general purpose registers. The last two double as frame and stack pointer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Register(RegisterIndex);

impl Register {
  pub const COUNT: Word = 32;
  /// Frame (base) pointer.
  pub const BP: Word = 30;
  /// Stack pointer.
  pub const SP: Word = 31;

  /// Panics if `index` is not a 5 bit register number.
  pub fn new(index: Word) -> Register {
    assert!(index < Register::COUNT, "register index {} out of range", index);
    Register(index as RegisterIndex)
  }

  pub fn bp() -> Register {
    Register::new(Register::BP)
  }

  pub fn index(&self) -> RegisterIndex {
    self.0
  }

  pub fn name(&self) -> String {
    match self.0 as Word {
      Register::BP => "bp".to_string(),
      Register::SP => "sp".to_string(),
      i            => format!("r{}", i)
    }
  }
}

impl Display for Register {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}


/// How the bits of an immediate are meant to be read.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ImmediateKind {
  /// Plain constant, `#1Ch`.
  Const,
  /// Boolean flag, `true`/`false`.
  ConstBool,
  /// Q11 fixed point, `#3.1024`.
  Fixed,
}

/// Number of fraction bits of a `Fixed` immediate.
pub const FIXED_FRACTION_BITS: Word = 11;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Immediate {
  pub value: Word,
  /// Declared width of the field the value came from.
  pub bits : u8,
  pub kind : ImmediateKind,
}

impl Immediate {
  pub fn new(value: Word, bits: u8) -> Immediate {
    Immediate::with_kind(value, bits, ImmediateKind::Const)
  }

  pub fn boolean(value: Word, bits: u8) -> Immediate {
    Immediate::with_kind(value, bits, ImmediateKind::ConstBool)
  }

  pub fn fixed(value: Word, bits: u8) -> Immediate {
    Immediate::with_kind(value, bits, ImmediateKind::Fixed)
  }

  pub fn with_kind(value: Word, bits: u8, kind: ImmediateKind) -> Immediate {
    Immediate{ value, bits, kind }
  }
}

impl Display for Immediate {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.kind {

      ImmediateKind::Const => {
        write!(f, "#{:02X}h", self.value)
      }

      ImmediateKind::ConstBool => {
        write!(f, "{}", self.value != 0)
      }

      ImmediateKind::Fixed => {
        let fraction_mask: Word = (1 << FIXED_FRACTION_BITS) - 1;
        write!(f, "#{}.{}", self.value >> FIXED_FRACTION_BITS, self.value & fraction_mask)
      }

    }
  }
}


#[derive(
  StrumDisplay, IntoStaticStr, EnumString,
  Copy,         Clone,         Eq, PartialEq, Hash, Debug
)]
pub enum Operator {
  #[strum(serialize = "+")]
  Add,
  #[strum(serialize = "-")]
  Sub,
  #[strum(serialize = "<<")]
  Shl,
  #[strum(serialize = ">>")]
  Shr,
}

/// `lhs<op>rhs`. In practice both sides are registers or immediates, except that a frame
/// relative `decref` nests one addition inside another.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expression {
  pub lhs      : Box<Operand>,
  pub rhs      : Box<Operand>,
  pub operator : Operator,
}

impl Expression {
  pub fn new<L, R>(lhs: L, operator: Operator, rhs: R) -> Expression
    where L: Into<Operand>, R: Into<Operand>
  {
    Expression{
      lhs: Box::new(lhs.into()),
      rhs: Box::new(rhs.into()),
      operator
    }
  }

  pub fn add<L: Into<Operand>, R: Into<Operand>>(lhs: L, rhs: R) -> Expression {
    Expression::new(lhs, Operator::Add, rhs)
  }

  pub fn sub<L: Into<Operand>, R: Into<Operand>>(lhs: L, rhs: R) -> Expression {
    Expression::new(lhs, Operator::Sub, rhs)
  }

  pub fn shl<L: Into<Operand>, R: Into<Operand>>(lhs: L, rhs: R) -> Expression {
    Expression::new(lhs, Operator::Shl, rhs)
  }

  pub fn shr<L: Into<Operand>, R: Into<Operand>>(lhs: L, rhs: R) -> Expression {
    Expression::new(lhs, Operator::Shr, rhs)
  }

  /// True if either side is an immediate.
  pub fn has_immediate(&self) -> bool {
    self.lhs.is_immediate() || self.rhs.is_immediate()
  }
}

impl Display for Expression {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}{}{}", self.lhs, self.operator, self.rhs)
  }
}


/// The logical memory spaces of the VM. The serialization is the prefix used in assembly.
#[derive(
  StrumDisplay, IntoStaticStr, EnumString,
  Copy,         Clone,         Eq, PartialEq, Hash, Debug
)]
pub enum AddressSpace {
  #[strum(serialize = "c")]
  Code,
  #[strum(serialize = "g")]
  Global,
  #[strum(serialize = "u")]
  Unified,
  #[strum(serialize = "s")]
  Stack,
}

/// A memory access: `<space>::[<+ if ip relative><inner>]`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Reference {
  pub inner       : Box<Operand>,
  pub space       : AddressSpace,
  pub ip_relative : bool,
}

impl Reference {
  pub fn new<T: Into<Operand>>(inner: T, space: AddressSpace) -> Reference {
    Reference{ inner: Box::new(inner.into()), space, ip_relative: false }
  }

  pub fn ip_relative<T: Into<Operand>>(inner: T, space: AddressSpace) -> Reference {
    Reference{ inner: Box::new(inner.into()), space, ip_relative: true }
  }

  pub fn prefix(&self) -> &'static str {
    self.space.into()
  }

  /// The bracketed part, without the space prefix.
  pub fn expression(&self) -> String {
    match self.ip_relative {
      true  => format!("+{}", self.inner),
      false => format!("{}", self.inner)
    }
  }
}

impl Display for Reference {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}::[{}]", self.prefix(), self.expression())
  }
}


/// Coarse operand shape, as a disassembler host classifies operands for cross references.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OperandClass {
  Immediate,
  Register,
  /// Address computed from an expression involving an immediate.
  Phrase,
  /// Direct memory address.
  Memory,
  /// Address computed from registers only.
  Displacement,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Operand {
  Register(Register),
  Immediate(Immediate),
  Expression(Expression),
  Reference(Reference),
}

impl Operand {
  pub fn is_immediate(&self) -> bool {
    match self {
      Operand::Immediate(_) => true,
      _ => false
    }
  }

  pub fn as_reference(&self) -> Option<&Reference> {
    match self {
      Operand::Reference(reference) => Some(reference),
      _ => None
    }
  }

  pub fn class(&self) -> OperandClass {
    match self {
      Operand::Immediate(_)  => OperandClass::Immediate,
      Operand::Register(_)   => OperandClass::Register,
      Operand::Expression(_) => OperandClass::Phrase,
      Operand::Reference(reference) => {
        match &*reference.inner {
          Operand::Immediate(_)  => OperandClass::Memory,
          Operand::Register(_)   => OperandClass::Register,
          Operand::Expression(e) if e.has_immediate() => OperandClass::Phrase,
          Operand::Expression(_) => OperandClass::Displacement,
          // Never produced by the decoder.
          Operand::Reference(_)  => OperandClass::Memory,
        }
      }
    }
  }

  /// The address a direct `Memory` operand points at.
  pub fn memory_address(&self) -> Option<Word> {
    match self {
      Operand::Reference(reference) => match &*reference.inner {
        Operand::Immediate(imm) => Some(imm.value),
        _ => None
      },
      _ => None
    }
  }
}

impl Display for Operand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Operand::Register(r)   => write!(f, "{}", r),
      Operand::Immediate(i)  => write!(f, "{}", i),
      Operand::Expression(e) => write!(f, "{}", e),
      Operand::Reference(r)  => write!(f, "{}", r),
    }
  }
}

impl From<Register> for Operand {
  fn from(r: Register) -> Self {
    Operand::Register(r)
  }
}

impl From<Immediate> for Operand {
  fn from(i: Immediate) -> Self {
    Operand::Immediate(i)
  }
}

impl From<Expression> for Operand {
  fn from(e: Expression) -> Self {
    Operand::Expression(e)
  }
}

impl From<Reference> for Operand {
  fn from(r: Reference) -> Self {
    Operand::Reference(r)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn register_names(){
    assert_eq!(Register::new(0).to_string(), "r0");
    assert_eq!(Register::new(29).to_string(), "r29");
    assert_eq!(Register::new(30).to_string(), "bp");
    assert_eq!(Register::new(31).to_string(), "sp");
  }

  #[test]
  #[should_panic]
  fn register_out_of_range(){
    Register::new(32);
  }

  #[test]
  fn immediates(){
    assert_eq!(Immediate::new(5, 20).to_string(), "#05h");
    assert_eq!(Immediate::new(0x1C, 16).to_string(), "#1Ch");
    assert_eq!(Immediate::new(0x1F_FFFF, 21).to_string(), "#1FFFFFh");
    assert_eq!(Immediate::boolean(1, 1).to_string(), "true");
    assert_eq!(Immediate::boolean(0, 5).to_string(), "false");
    assert_eq!(Immediate::boolean(17, 5).to_string(), "true");
    assert_eq!(Immediate::fixed((3 << 11) | 1024, 32).to_string(), "#3.1024");
    assert_eq!(Immediate::fixed(0, 32).to_string(), "#0.0");
  }

  #[test]
  fn expressions(){
    let e = Expression::add(Register::bp(), Immediate::new(8, 16));
    assert_eq!(e.to_string(), "bp+#08h");
    assert_eq!(Expression::sub(Register::new(1), Register::new(2)).to_string(), "r1-r2");
    assert_eq!(Expression::shl(Register::new(1), Immediate::new(2, 5)).to_string(), "r1<<#02h");
    assert_eq!(Expression::shr(Register::new(1), Immediate::new(2, 5)).to_string(), "r1>>#02h");
  }

  #[test]
  fn references(){
    let code = Reference::ip_relative(Immediate::new(4, 21), AddressSpace::Code);
    assert_eq!(code.to_string(), "c::[+#04h]");

    let global = Reference::new(Immediate::new(0x10, 21), AddressSpace::Global);
    assert_eq!(global.to_string(), "g::[#10h]");

    let unified = Reference::new(Register::new(4), AddressSpace::Unified);
    assert_eq!(unified.to_string(), "u::[r4]");

    let stack = Reference::new(
      Expression::add(Register::bp(), Immediate::new(0xC, 16)),
      AddressSpace::Stack
    );
    assert_eq!(stack.to_string(), "s::[bp+#0Ch]");
  }

  #[test]
  fn classes(){
    let imm: Operand = Immediate::new(1, 8).into();
    assert_eq!(imm.class(), OperandClass::Immediate);

    let mem: Operand = Reference::new(Immediate::new(0x40, 21), AddressSpace::Global).into();
    assert_eq!(mem.class(), OperandClass::Memory);
    assert_eq!(mem.memory_address(), Some(0x40));

    let reg_ref: Operand = Reference::new(Register::new(3), AddressSpace::Stack).into();
    assert_eq!(reg_ref.class(), OperandClass::Register);
    assert_eq!(reg_ref.memory_address(), None);

    let phrase: Operand = Reference::new(
      Expression::add(Register::new(3), Immediate::new(4, 16)),
      AddressSpace::Unified
    ).into();
    assert_eq!(phrase.class(), OperandClass::Phrase);

    let displ: Operand = Reference::new(
      Expression::add(Register::new(3), Register::new(4)),
      AddressSpace::Unified
    ).into();
    assert_eq!(displ.class(), OperandClass::Displacement);

    let expr: Operand = Expression::add(Register::new(3), Register::new(4)).into();
    assert_eq!(expr.class(), OperandClass::Phrase);
  }
}
