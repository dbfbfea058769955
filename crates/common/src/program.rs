//! Program construction and two-pass address resolution.
//!
//! Loading is split in two: instructions are collected in source order
//! into a [`ProgramBuilder`], then [`ProgramBuilder::finalize`] maps every
//! label and function marker to its index and produces a new [`Program`]
//! in which every GOTO, FALSEBRANCH and CALL carries an absolute target.
//! Forward references resolve because the whole stream is known before
//! any target is looked up.

use crate::error::ResolveError;
use crate::instruction::Instruction;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// A resolved, immutable X program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
    labels: HashMap<String, usize>,
}

impl Program {
    /// Resolve `instructions` strictly: any resolution problem is an error.
    pub fn resolve(instructions: Vec<Instruction>) -> Result<Self, Vec<ResolveError>> {
        ProgramBuilder::from(instructions).build()
    }

    /// The instruction at `pc`, if any.
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    /// All instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Index of the instruction that defines `name`.
    pub fn address_of(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

/// Unresolved instructions collected in source order.
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded instruction.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Resolve every jump target and produce the final program.
    ///
    /// Best-effort: problems are returned alongside the program. Jumps to
    /// undefined labels are left without a target, and executing one is a
    /// runtime error.
    pub fn finalize(self) -> (Program, Vec<ResolveError>) {
        let (labels, mut errors) = collect_labels(&self.instructions);

        let instructions: Vec<Instruction> = self
            .instructions
            .into_iter()
            .enumerate()
            .map(|(at, instr)| {
                let Some(jump) = instr.jump() else {
                    return instr;
                };
                let target = labels.get(&jump.label).copied();
                if target.is_none() {
                    debug!(at, label = %jump.label, "undefined label");
                    errors.push(ResolveError::UndefinedLabel {
                        at,
                        label: jump.label.clone(),
                    });
                }
                instr.with_target(target)
            })
            .collect();

        debug!(
            instructions = instructions.len(),
            labels = labels.len(),
            errors = errors.len(),
            "program finalized"
        );

        (
            Program {
                instructions,
                labels,
            },
            errors,
        )
    }

    /// Resolve strictly: any resolution problem fails the build.
    pub fn build(self) -> Result<Program, Vec<ResolveError>> {
        let (program, errors) = self.finalize();
        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }
}

impl From<Vec<Instruction>> for ProgramBuilder {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl FromIterator<Instruction> for ProgramBuilder {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

/// Map every defined name to its instruction index.
///
/// LABEL definitions take precedence over FUNCTION markers of the same
/// name. A repeated LABEL keeps its first definition and is reported.
fn collect_labels(instructions: &[Instruction]) -> (HashMap<String, usize>, Vec<ResolveError>) {
    let mut labels = HashMap::new();
    let mut errors = Vec::new();

    for (at, instr) in instructions.iter().enumerate() {
        if let Instruction::Label { name } = instr {
            match labels.entry(name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(at);
                }
                Entry::Occupied(slot) => {
                    debug!(at, label = %name, "duplicate label");
                    errors.push(ResolveError::DuplicateLabel {
                        at,
                        label: name.clone(),
                        first: *slot.get(),
                    });
                }
            }
        }
    }

    for (at, instr) in instructions.iter().enumerate() {
        if let Instruction::Function { name, .. } = instr {
            labels.entry(name.clone()).or_insert(at);
        }
    }

    (labels, errors)
}
