//! Opcode keywords and binary operators of the X instruction set.
//!
//! The keyword table is immutable data: [`Opcode::ALL`] lists every opcode
//! once and [`Opcode::keyword`] gives its canonical spelling. Lookup goes
//! through [`Opcode::from_keyword`], which is the only place text is
//! mapped to an opcode.

use std::fmt;

/// Identifies the operation an instruction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Start a new frame `n` slots below the top of the stack.
    Args,
    /// Pop two values, apply a binary operator, push the result.
    Bop,
    /// Call the function at a resolved address.
    Call,
    /// Pop a value, branch if it is zero.
    FalseBranch,
    /// Unconditional branch.
    Goto,
    /// Stop execution.
    Halt,
    /// Branch target marker.
    Label,
    /// Push a literal, optionally naming a local variable.
    Lit,
    /// Push the value at a frame offset.
    Load,
    /// Discard the top `n` values.
    Pop,
    /// Read an integer from input and push it.
    Read,
    /// Return from the current function.
    Return,
    /// Pop a value into a frame offset.
    Store,
    /// Print the top of the stack.
    Write,
    /// Toggle the stack dump diagnostic.
    Dump,
    /// Bind a formal parameter name to a frame offset (debug marker).
    Formal,
    /// Function entry and source line range (debug marker).
    Function,
    /// Current source line (debug marker).
    Line,
}

impl Opcode {
    /// Every opcode, in table order.
    pub const ALL: [Opcode; 18] = [
        Opcode::Args,
        Opcode::Bop,
        Opcode::Call,
        Opcode::FalseBranch,
        Opcode::Goto,
        Opcode::Halt,
        Opcode::Label,
        Opcode::Lit,
        Opcode::Load,
        Opcode::Pop,
        Opcode::Read,
        Opcode::Return,
        Opcode::Store,
        Opcode::Write,
        Opcode::Dump,
        Opcode::Formal,
        Opcode::Function,
        Opcode::Line,
    ];

    /// Canonical keyword as it appears in bytecode text.
    pub fn keyword(self) -> &'static str {
        match self {
            Opcode::Args => "ARGS",
            Opcode::Bop => "BOP",
            Opcode::Call => "CALL",
            Opcode::FalseBranch => "FALSEBRANCH",
            Opcode::Goto => "GOTO",
            Opcode::Halt => "HALT",
            Opcode::Label => "LABEL",
            Opcode::Lit => "LIT",
            Opcode::Load => "LOAD",
            Opcode::Pop => "POP",
            Opcode::Read => "READ",
            Opcode::Return => "RETURN",
            Opcode::Store => "STORE",
            Opcode::Write => "WRITE",
            Opcode::Dump => "DUMP",
            Opcode::Formal => "FORMAL",
            Opcode::Function => "FUNCTION",
            Opcode::Line => "LINE",
        }
    }

    /// Look up an opcode by keyword, ignoring ASCII case.
    pub fn from_keyword(word: &str) -> Option<Opcode> {
        Self::ALL
            .iter()
            .find(|op| op.keyword().eq_ignore_ascii_case(word))
            .copied()
    }

    /// True for the markers that only carry meaning for the debugger.
    pub fn is_debug_marker(self) -> bool {
        matches!(self, Opcode::Formal | Opcode::Function | Opcode::Line)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Operator carried by a BOP instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Or,
    And,
}

impl BinaryOp {
    /// Every operator, in table order.
    pub const ALL: [BinaryOp; 12] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Le,
        BinaryOp::Ge,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Or,
        BinaryOp::And,
    ];

    /// Operator symbol as written after `BOP`.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Or => "|",
            BinaryOp::And => "&",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        Self::ALL.iter().find(|op| op.symbol() == symbol).copied()
    }

    /// Apply the operator to `left` and `right`.
    ///
    /// Arithmetic wraps on overflow. Comparisons and the logical operators
    /// produce 1 for true and 0 for false; `|` and `&` treat only the
    /// value 1 as true. Returns `None` for division by zero.
    pub fn apply(self, left: i32, right: i32) -> Option<i32> {
        let flag = |b: bool| if b { 1 } else { 0 };
        let value = match self {
            BinaryOp::Add => left.wrapping_add(right),
            BinaryOp::Sub => left.wrapping_sub(right),
            BinaryOp::Mul => left.wrapping_mul(right),
            BinaryOp::Div => {
                if right == 0 {
                    return None;
                }
                left.wrapping_div(right)
            }
            BinaryOp::Eq => flag(left == right),
            BinaryOp::Ne => flag(left != right),
            BinaryOp::Le => flag(left <= right),
            BinaryOp::Ge => flag(left >= right),
            BinaryOp::Lt => flag(left < right),
            BinaryOp::Gt => flag(left > right),
            BinaryOp::Or => flag(left == 1 || right == 1),
            BinaryOp::And => flag(left == 1 && right == 1),
        };
        Some(value)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
