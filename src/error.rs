use std::{error::Error, fmt};

use miette::{Diagnostic, LabeledSpan, SourceSpan};

use crate::value::{Value, ValueKind};

/// Fatal error raised while loading or running a program.
///
/// Always tagged with the 1-based line it was raised on. The span, when present, points at
/// that line inside the source it came from, so the report can show it.
#[derive(Debug, PartialEq)]
pub struct HrmError {
    kind: ErrorKind,
    line: usize,
    span: Option<SourceSpan>,
}

/// What kind of token an argument was expected to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    /// Start of a line: instruction, label, comment or nothing.
    Line,
    MemRef,
    Literal,
    Name,
    Label,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Syntax {
        found: String,
        expected: Expected,
    },
    /// Label declaration followed by more text.
    TrailingLabel {
        label: String,
    },
    DuplicateLabel {
        label: String,
        /// 1-based line of the first declaration.
        first: usize,
    },
    Arity {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    Address {
        address: i64,
        memory_size: usize,
    },
    /// Indirect reference through a cell that does not hold an integer.
    Pointer {
        cell: usize,
        value: Value,
    },
    UnknownName {
        name: String,
    },
    UnknownLabel {
        label: String,
    },
    Type {
        mnemonic: &'static str,
        accumulator: ValueKind,
        operand: ValueKind,
    },
    NotInteger {
        mnemonic: &'static str,
        cell: usize,
        found: ValueKind,
    },
    EmptyAccumulator {
        mnemonic: &'static str,
    },
    Overflow {
        mnemonic: &'static str,
    },
    UnknownInstruction {
        mnemonic: String,
    },
}

impl HrmError {
    pub fn new(kind: ErrorKind, line: usize) -> Self {
        HrmError {
            kind,
            line,
            span: None,
        }
    }

    pub fn with_span(mut self, span: impl Into<SourceSpan>) -> Self {
        self.span = Some(span.into());
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

impl ErrorKind {
    /// Diagnostic code, one per error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } | Self::TrailingLabel { .. } | Self::DuplicateLabel { .. } => {
                "hrm::syntax"
            }
            Self::Arity { .. } => "hrm::arity",
            Self::Address { .. } | Self::Pointer { .. } => "hrm::address",
            Self::UnknownName { .. } | Self::UnknownLabel { .. } => "hrm::unknown_symbol",
            Self::Type { .. }
            | Self::NotInteger { .. }
            | Self::EmptyAccumulator { .. }
            | Self::Overflow { .. } => "hrm::type",
            Self::UnknownInstruction { .. } => "hrm::unknown_instruction",
        }
    }

    fn help(&self) -> String {
        match self {
            Self::Syntax { expected, .. } => expected.help().to_string(),
            Self::TrailingLabel { .. } => "put the instruction on the line after the label".into(),
            Self::DuplicateLabel { first, .. } => {
                format!("this label was already declared on line {first}")
            }
            Self::Arity { .. } => "check the number of arguments for this instruction".into(),
            Self::Address { memory_size, .. } => {
                format!("addresses should be in range [0,{}]", memory_size.saturating_sub(1))
            }
            Self::Pointer { .. } => "only cells holding an integer can be dereferenced".into(),
            Self::UnknownName { .. } => {
                "names must be declared with `name` before they are used".into()
            }
            Self::UnknownLabel { .. } => "declare the label on a line of its own, like `:loop`".into(),
            Self::Type { .. } | Self::NotInteger { .. } => {
                "arithmetic only works on values of the same type".into()
            }
            Self::EmptyAccumulator { .. } => "use `inbox` or `copyfrom` to pick up a value first".into(),
            Self::Overflow { .. } => "values must fit in a signed 64-bit integer".into(),
            Self::UnknownInstruction { .. } => {
                "check the list of available instructions in the documentation".into()
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "unexpected token",
            Self::TrailingLabel { .. } => "label with trailing text",
            Self::DuplicateLabel { .. } => "duplicate label",
            Self::Arity { .. } => "wrong number of arguments",
            Self::Address { .. } | Self::Pointer { .. } => "invalid address",
            Self::UnknownName { .. } => "unknown name",
            Self::UnknownLabel { .. } => "unknown label",
            Self::Type { .. } | Self::NotInteger { .. } => "type mismatch",
            Self::EmptyAccumulator { .. } => "empty accumulator",
            Self::Overflow { .. } => "overflow",
            Self::UnknownInstruction { .. } => "unknown instruction",
        }
    }
}

impl Expected {
    fn help(&self) -> &'static str {
        match self {
            Self::Line => "lines should start with an instruction, a `:label` or a `#` comment",
            Self::MemRef => "memory references look like `3`, `[3]`, `$name` or `[$name]`",
            Self::Literal => "literals are integers like `-7` or characters like `'a'`",
            Self::Name => "names start with a letter or `_`, optionally prefixed with `$`",
            Self::Label => "jump targets look like `:loop`",
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "instruction",
            Self::MemRef => "location",
            Self::Literal => "literal",
            Self::Name => "name",
            Self::Label => "jump label",
        };
        f.write_str(name)
    }
}

impl Error for HrmError {}

impl fmt::Display for HrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error on line {}: {}", self.line, self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { found, expected } => {
                write!(f, "'{}' is not a valid {}", found, expected)
            }
            Self::TrailingLabel { label } => {
                write!(f, "label ':{}' must be alone on its line", label)
            }
            Self::DuplicateLabel { label, .. } => write!(f, "duplicate label ':{}'", label),
            Self::Arity {
                mnemonic,
                expected,
                found,
            } => write!(
                f,
                "instruction '{}' should have had {} arguments, it had {}",
                mnemonic, expected, found
            ),
            Self::Address {
                address,
                memory_size,
            } => write!(
                f,
                "invalid memory address {}, should be in range [0,{}]",
                address,
                memory_size.saturating_sub(1)
            ),
            Self::Pointer { cell, value } => write!(
                f,
                "cell {} holds {} '{}', which is not a memory address",
                cell,
                value.kind(),
                value
            ),
            Self::UnknownName { name } => write!(f, "unknown name '{}'", name),
            Self::UnknownLabel { label } => write!(f, "unknown label ':{}'", label),
            Self::Type {
                mnemonic,
                accumulator,
                operand,
            } => write!(
                f,
                "cannot {} {} and {}",
                mnemonic, accumulator, operand
            ),
            Self::NotInteger {
                mnemonic,
                cell,
                found,
            } => write!(
                f,
                "cannot {} cell {}, it holds a {}",
                mnemonic, cell, found
            ),
            Self::EmptyAccumulator { mnemonic } => {
                write!(f, "'{}' needs a value, but the accumulator is empty", mnemonic)
            }
            Self::Overflow { mnemonic } => write!(f, "'{}' overflowed", mnemonic),
            Self::UnknownInstruction { mnemonic } => write!(f, "bad instruction '{}'", mnemonic),
        }
    }
}

impl Diagnostic for HrmError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.help()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::at(
            span,
            self.kind.label(),
        ))))
    }
}
