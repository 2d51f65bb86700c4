// Parsing
pub mod decoder;
mod instruction;
pub use instruction::{Condition, Instruction, Mnemonic};
mod program;
pub use program::Program;
mod symbol;

// Running
mod machine;
pub use machine::{Config, Exhaustion, Halt, Machine, Statistics, DEFAULT_MEMORY_SIZE};
mod debugger;
pub use debugger::DebuggerOptions;
pub mod host;
pub mod output;
mod value;
pub use value::{Value, ValueKind};

mod error;
pub use error::{ErrorKind, Expected, HrmError};

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 4;
