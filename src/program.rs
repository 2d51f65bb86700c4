use std::ops::Range;

use crate::decoder::{decode_line, Token};
use crate::error::{ErrorKind, HrmError};
use crate::instruction::{Instruction, Mnemonic};
use crate::symbol::LabelTable;

/// Program text split into lines, with its labels resolved.
///
/// Lines are 0-based here and 1-based in every diagnostic.
pub struct Program {
    src: String,
    /// Byte range of each line in `src`, without surrounding whitespace.
    lines: Vec<Range<usize>>,
    labels: LabelTable,
    size: usize,
}

impl Program {
    /// Fails on malformed or duplicate label declarations. Any other malformed line is only
    /// reported if execution reaches it.
    pub fn load(src: impl Into<String>) -> Result<Self, HrmError> {
        let src = src.into();
        let mut lines = Vec::new();
        let mut offset = 0;
        for line in src.split('\n') {
            let start = offset + (line.len() - line.trim_start().len());
            let end = offset + line.trim_end().len();
            lines.push(start..end.max(start));
            offset += line.len() + 1;
        }

        let mut labels = LabelTable::default();
        let mut size = 0;
        for (idx, range) in lines.iter().enumerate() {
            let error = |kind: ErrorKind| HrmError::new(kind, idx + 1).with_span(span(range));
            let Ok(decoded) = decode_line(idx + 1, &src[range.clone()]) else {
                continue;
            };
            match decoded.token {
                Token::Label(label) => {
                    if !decoded.args.is_empty() {
                        return Err(error(ErrorKind::TrailingLabel {
                            label: label.to_string(),
                        }));
                    }
                    if let Err(first) = labels.insert(label, idx) {
                        return Err(error(ErrorKind::DuplicateLabel {
                            label: label.to_string(),
                            first: first + 1,
                        }));
                    }
                }
                Token::Instruction(mnemonic) => {
                    if mnemonic
                        .parse::<Mnemonic>()
                        .is_ok_and(|mnemonic| mnemonic.is_effectful())
                    {
                        size += 1;
                    }
                }
                Token::Comment | Token::Empty => (),
            }
        }

        Ok(Program {
            src,
            lines,
            labels,
            size,
        })
    }

    /// Decode every line and its arguments without running anything.
    ///
    /// Jump targets are checked too. Names and addresses depend on the run, so they are not.
    pub fn check(&self) -> Result<(), HrmError> {
        for idx in 0..self.len() {
            let error = |kind: ErrorKind| HrmError::new(kind, idx + 1).with_span(self.span(idx));
            let decoded = decode_line(idx + 1, self.line(idx))
                .map_err(|err| err.with_span(self.span(idx)))?;
            let Token::Instruction(mnemonic) = decoded.token else {
                continue;
            };
            let mnemonic: Mnemonic = mnemonic.parse().map_err(error)?;
            if let Instruction::Jump(_, label) =
                Instruction::parse(mnemonic, decoded.args).map_err(error)?
            {
                if self.labels.get(&label).is_none() {
                    return Err(error(ErrorKind::UnknownLabel { label }));
                }
            }
        }
        Ok(())
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Trimmed text of the line at `idx`.
    pub fn line(&self, idx: usize) -> &str {
        &self.src[self.lines[idx].clone()]
    }

    /// Source span of the line at `idx`, for diagnostics.
    pub fn span(&self, idx: usize) -> (usize, usize) {
        span(&self.lines[idx])
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Number of effectful instruction lines.
    pub fn size(&self) -> usize {
        self.size
    }
}

fn span(range: &Range<usize>) -> (usize, usize) {
    (range.start, range.end - range.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_lines() {
        let program = Program::load("  inbox  \n\n# hi\r\n:loop\noutbox").unwrap();
        assert_eq!(program.len(), 5);
        assert_eq!(program.line(0), "inbox");
        assert_eq!(program.span(0), (2, 5));
        assert_eq!(program.line(1), "");
        assert_eq!(program.line(2), "# hi");
        assert_eq!(program.line(4), "outbox");
        assert_eq!(program.labels().get("loop"), Some(3));
    }

    #[test]
    fn size_counts_effectful_lines() {
        let program = Program::load(
            "init 0 1\nname 0 $a\ndata 1 2\n# inbox\n:top\ninbox\noutbox\ncopyfrom 0\ncopyto 0\n\
             bump+ 0\nbump- 0\nadd 0\nsub 0\njump :top\njumpneg :top\njumpzero :top\nouthbox\n",
        )
        .unwrap();
        assert_eq!(program.size(), 11);
    }

    #[test]
    fn duplicate_label() {
        let err = Program::load(":a\ninbox\n:a\n").err().unwrap();
        assert_eq!(err.line(), 3);
        assert_eq!(
            err.kind(),
            &ErrorKind::DuplicateLabel {
                label: "a".into(),
                first: 1
            }
        );
    }

    #[test]
    fn label_must_be_alone() {
        let err = Program::load("inbox\n:a outbox\n").err().unwrap();
        assert_eq!(err.line(), 2);
        assert_eq!(err.kind().code(), "hrm::syntax");
    }

    #[test]
    fn malformed_lines_are_deferred() {
        assert!(Program::load("inbox\n@@@\n").is_ok());
    }

    #[test]
    fn check_whole_program() {
        let program = Program::load("inbox\n:a\njumpzero :a\ncopyto $x\noutbox").unwrap();
        assert_eq!(program.check(), Ok(()));

        let program = Program::load("inbox\njump :b\n:a").unwrap();
        let err = program.check().unwrap_err();
        assert_eq!(err.line(), 2);
        assert_eq!(err.kind(), &ErrorKind::UnknownLabel { label: "b".into() });

        let program = Program::load("inbox\n\ncopyto 1 2").unwrap();
        let err = program.check().unwrap_err();
        assert_eq!(err.line(), 3);
        assert_eq!(err.kind().code(), "hrm::arity");

        let program = Program::load("outhbox").unwrap();
        assert_eq!(
            program.check().unwrap_err().kind().code(),
            "hrm::unknown_instruction"
        );
    }
}
