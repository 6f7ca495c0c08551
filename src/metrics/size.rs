//! Method size estimates

use crate::metadata::Instruction;

/// Estimate authored source lines from debug-line mappings.
///
/// A line is counted only when it is greater than the last mapped line
/// seen; jumping back (loop bodies, reordered blocks) updates the last
/// line without counting. Hidden and absent mappings are skipped entirely.
pub fn logical_line_count(instructions: &[Instruction]) -> u32 {
    let mut count = 0;
    let mut last: Option<u32> = None;

    for line in instructions
        .iter()
        .filter_map(|ins| ins.line.and_then(|l| l.visible()))
    {
        if last.map_or(true, |prev| line > prev) {
            count += 1;
        }
        last = Some(line);
    }

    count
}

/// Count instructions, ignoring `nop`, `box` and `unbox`
pub fn instruction_count(instructions: &[Instruction]) -> u32 {
    instructions
        .iter()
        .filter(|ins| !ins.is_elided_from_size())
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::OpCode;

    fn lines(mapped: &[u32]) -> Vec<Instruction> {
        mapped
            .iter()
            .map(|&l| Instruction::new(OpCode::Nop).at_line(l))
            .collect()
    }

    #[test]
    fn test_backward_jump_not_recounted() {
        assert_eq!(logical_line_count(&lines(&[1, 2, 2, 5, 3, 6])), 4);
    }

    #[test]
    fn test_backward_jump_lowers_last_seen() {
        // 10 counts, back to 4 (not counted), then 7 > 4 counts again
        assert_eq!(logical_line_count(&lines(&[10, 4, 7])), 2);
    }

    #[test]
    fn test_hidden_lines_ignored() {
        let mut body = lines(&[3]);
        body.push(Instruction::new(OpCode::Nop).hidden());
        body.push(Instruction::new(OpCode::Ret).at_line(4));
        assert_eq!(logical_line_count(&body), 2);

        // Hidden does not update the last-seen line either
        let body = vec![
            Instruction::new(OpCode::Nop).at_line(5),
            Instruction::new(OpCode::Nop).hidden(),
            Instruction::new(OpCode::Nop).at_line(5),
        ];
        assert_eq!(logical_line_count(&body), 1);
    }

    #[test]
    fn test_unmapped_instructions() {
        let body = vec![
            Instruction::new(OpCode::Ldarg0),
            Instruction::new(OpCode::Ret),
        ];
        assert_eq!(logical_line_count(&body), 0);
        assert_eq!(logical_line_count(&[]), 0);
    }

    #[test]
    fn test_instruction_count_elides_markers() {
        let body = vec![
            Instruction::new(OpCode::Nop),
            Instruction::new(OpCode::Ldarg0),
            Instruction::new(OpCode::Box("System.Int32".into())),
            Instruction::new(OpCode::Unbox("System.Int32".into())),
            Instruction::new(OpCode::UnboxAny("System.Int32".into())),
            Instruction::new(OpCode::Ret),
        ];
        assert_eq!(instruction_count(&body), 3);
    }
}
