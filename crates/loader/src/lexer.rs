//! Tokenizer for X bytecode text.

/// A single token from a bytecode line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// An opcode keyword, name, label or operator, exactly as written.
    Word(&'a str),
    /// A decimal integer literal, optionally signed, with its text as
    /// written.
    Int { value: i64, raw: &'a str },
}

impl<'a> Token<'a> {
    /// The token exactly as written, for names and error messages.
    pub(crate) fn text(&self) -> String {
        match self {
            Token::Word(text) | Token::Int { raw: text, .. } => (*text).to_string(),
        }
    }
}

/// Split one line of bytecode into whitespace-separated tokens.
///
/// Returns an empty Vec for blank lines. There is no comment syntax: the
/// parser ignores whatever follows an instruction's operands.
pub(crate) fn tokenize_line(line: &str) -> Vec<Token<'_>> {
    line.split_whitespace()
        .map(|word| match word.parse::<i64>() {
            Ok(value) => Token::Int { value, raw: word },
            Err(_) => Token::Word(word),
        })
        .collect()
}
