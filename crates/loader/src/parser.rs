//! Parser for X bytecode tokens → instructions.
//!
//! Dispatches on the opcode to the operand pattern it takes. Operands past
//! the ones an opcode needs are ignored.

use crate::error::LoadError;
use crate::lexer::Token;
use xlang_common::{BinaryOp, Instruction, Jump, Opcode};

/// Parse the tokens of a single line into an instruction.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(tokens: &[Token<'_>], line: usize) -> Result<Option<Instruction>, LoadError> {
    let Some(first) = tokens.first() else {
        return Ok(None);
    };

    let opcode = match first {
        Token::Word(word) => Opcode::from_keyword(word),
        Token::Int { .. } => None,
    }
    .ok_or_else(|| LoadError::UnknownOpcode {
        line,
        token: first.text(),
    })?;

    let operands = Operands {
        args: &tokens[1..],
        line,
        opcode: opcode.keyword(),
    };

    let instr = match opcode {
        // No operands
        Opcode::Halt => Instruction::Halt,
        Opcode::Read => Instruction::Read,
        Opcode::Write => Instruction::Write,

        // Optional name
        Opcode::Return => Instruction::Return {
            name: operands.optional_name(0),
        },

        // Count
        Opcode::Args => Instruction::Args {
            count: operands.count(0, 1)?,
        },
        Opcode::Pop => Instruction::Pop {
            count: operands.count(0, 1)?,
        },

        // Jump target
        Opcode::Call => Instruction::Call(Jump::new(operands.name(0, 1)?)),
        Opcode::FalseBranch => Instruction::FalseBranch(Jump::new(operands.name(0, 1)?)),
        Opcode::Goto => Instruction::Goto(Jump::new(operands.name(0, 1)?)),
        Opcode::Label => Instruction::Label {
            name: operands.name(0, 1)?,
        },

        // Integer, optional name
        Opcode::Lit => Instruction::Lit {
            value: operands.int(0, 1)?,
            name: operands.optional_name(1),
        },

        // Offset + name
        Opcode::Load => Instruction::Load {
            offset: operands.count(0, 2)?,
            name: operands.name(1, 2)?,
        },
        Opcode::Store => Instruction::Store {
            offset: operands.count(0, 2)?,
            name: operands.name(1, 2)?,
        },

        Opcode::Bop => {
            let token = operands.name(0, 1)?;
            let op = BinaryOp::from_symbol(&token)
                .ok_or(LoadError::UnknownOperator { line, token })?;
            Instruction::Bop(op)
        }

        Opcode::Dump => {
            let token = operands.name(0, 1)?;
            let enabled = if token.eq_ignore_ascii_case("ON") {
                true
            } else if token.eq_ignore_ascii_case("OFF") {
                false
            } else {
                return Err(LoadError::InvalidDumpMode { line, token });
            };
            Instruction::Dump { enabled }
        }

        // Debug markers
        Opcode::Formal => Instruction::Formal {
            name: operands.name(0, 2)?,
            offset: operands.count(1, 2)?,
        },
        Opcode::Function => Instruction::Function {
            name: operands.name(0, 3)?,
            start: operands.int(1, 3)?,
            end: operands.int(2, 3)?,
        },
        Opcode::Line => Instruction::Line {
            line: operands.int(0, 1)?,
        },
    };

    Ok(Some(instr))
}

/// Operand tokens of one line plus what is needed to report errors.
struct Operands<'t, 'a> {
    args: &'t [Token<'a>],
    line: usize,
    opcode: &'static str,
}

impl Operands<'_, '_> {
    fn get(&self, idx: usize, expected: usize) -> Result<&Token<'_>, LoadError> {
        self.args.get(idx).ok_or(LoadError::MissingOperand {
            line: self.line,
            opcode: self.opcode,
            expected,
        })
    }

    /// Any token, as text.
    fn name(&self, idx: usize, expected: usize) -> Result<String, LoadError> {
        self.get(idx, expected).map(Token::text)
    }

    fn optional_name(&self, idx: usize) -> Option<String> {
        self.args.get(idx).map(Token::text)
    }

    /// An integer that fits in `i32`.
    fn int(&self, idx: usize, expected: usize) -> Result<i32, LoadError> {
        let token = self.get(idx, expected)?;
        match token {
            Token::Int { value, .. } => i32::try_from(*value).ok(),
            Token::Word(_) => None,
        }
        .ok_or_else(|| self.invalid_number(token))
    }

    /// A non-negative integer used as a count or frame offset.
    fn count(&self, idx: usize, expected: usize) -> Result<usize, LoadError> {
        let token = self.get(idx, expected)?;
        match token {
            Token::Int { value, .. } => usize::try_from(*value).ok(),
            Token::Word(_) => None,
        }
        .ok_or_else(|| self.invalid_number(token))
    }

    fn invalid_number(&self, token: &Token<'_>) -> LoadError {
        LoadError::InvalidNumber {
            line: self.line,
            token: token.text(),
        }
    }
}
