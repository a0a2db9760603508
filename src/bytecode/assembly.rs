/*!
  The human readable textual form of bytecode is called assembly. One instruction renders as
  its mnemonic left-justified to `MNEMONIC_WIDTH` columns, a space, then the operands
  separated by `", "`:

    ```text
    add              r0, r0, r0
    ld_local32       r1, s::[bp+#08h]
    jz               r2, c::[+#10h]
    ```

  Rendering reads nothing but the instruction itself.
*/

use std::fmt::{Display, Formatter};

use super::DecodedInstruction;

pub const MNEMONIC_WIDTH: usize = 16;

pub fn render(instruction: &DecodedInstruction) -> String {
  instruction.to_string()
}

impl Display for DecodedInstruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{:<width$} {}",
      self.mnemonic(),
      self.operands()
          .iter()
          .map(|op| op.to_string())
          .collect::<Vec<String>>()
          .join(", "),
      width = MNEMONIC_WIDTH
    )
  }
}
