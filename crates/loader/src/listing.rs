//! Listing: resolved program → numbered text.
//!
//! One instruction per line, prefixed by its index. Jumps show the
//! resolved address in place of the compiler's suffix, so
//! `GOTO continue<<3>>` resolved to index 17 lists as `GOTO continue<<17>>`.

use xlang_common::{Instruction, Program};

/// Render a program listing.
pub fn listing(program: &Program) -> String {
    let width = program.len().saturating_sub(1).to_string().len();
    let mut out = String::new();
    for (index, instr) in program.iter().enumerate() {
        out.push_str(&format!("{index:>width$}: {}\n", render(instr)));
    }
    out
}

fn render(instr: &Instruction) -> String {
    match instr.jump() {
        Some(jump) => format!("{} {}", instr.opcode(), jump.describe()),
        None => instr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xlang_common::{Jump, ProgramBuilder};

    #[test]
    fn listing_numbers_instructions() {
        let program = Program::resolve(vec![
            Instruction::Lit { value: 1, name: None },
            Instruction::Write,
            Instruction::Halt,
        ])
        .unwrap();
        assert_eq!(listing(&program), "0: LIT 1\n1: WRITE\n2: HALT\n");
    }

    #[test]
    fn listing_shows_resolved_targets() {
        let program = Program::resolve(vec![
            Instruction::Goto(Jump::new("end<<1>>")),
            Instruction::Label {
                name: "end<<1>>".into(),
            },
        ])
        .unwrap();
        assert_eq!(listing(&program), "0: GOTO end<<1>>\n1: LABEL end<<1>>\n");
    }

    #[test]
    fn listing_pads_indices() {
        let code: Vec<Instruction> = (0..11).map(|_| Instruction::Halt).collect();
        let program = Program::resolve(code).unwrap();
        let text = listing(&program);
        assert!(text.starts_with(" 0: HALT\n"));
        assert!(text.ends_with("10: HALT\n"));
    }

    #[test]
    fn unresolved_jump_lists_bare_label() {
        let (program, errors) = ProgramBuilder::from(vec![Instruction::Call(Jump::new("nowhere"))]).finalize();
        assert_eq!(errors.len(), 1);
        assert_eq!(listing(&program), "0: CALL nowhere\n");
    }

    #[test]
    fn empty_program_lists_nothing() {
        assert_eq!(listing(&Program::default()), "");
    }
}
