use std::cell::RefCell;
use std::io::{stdout, Write};
use std::str::Chars;

use colored::{ColoredString, Colorize};

use crate::value::Value;

#[macro_export]
macro_rules! dprintln {
    ( $cond:expr ) => {{
        #[allow(unused_imports)]
        use $crate::output::Condition::*;
        $crate::output::Output::Debugger($cond).print_str("\n");
    }};
    ( $cond:expr, $fmt:literal $($tt:tt)* ) => {{
        #[allow(unused_imports)]
        use $crate::output::Condition::*;
        let s = format!(
            concat!($fmt, "\n")
            $($tt)*
        );
        $crate::output::Output::Debugger($cond).print_str(&s);
    }};
}

/// Where a piece of output goes, and how it is styled.
#[derive(Clone, Copy, Debug)]
pub enum Output {
    /// Values produced by the program. Stdout, never styled.
    Normal,
    /// Non-fatal diagnostics. Stderr.
    Warning,
    /// Single-step traces and prompts. Stderr.
    Debugger(Condition),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Printed even with `--minimal`, without color.
    Always,
    /// Dropped with `--minimal`.
    Sometimes,
}

struct Decolored<'a> {
    chars: Chars<'a>,
}

impl Output {
    thread_local! {
        static IS_MINIMAL: RefCell<bool> = const { RefCell::new(false) };
    }

    pub fn set_minimal(new_value: bool) -> bool {
        Self::IS_MINIMAL.with(|value| value.replace(new_value))
    }
    pub fn is_minimal() -> bool {
        Self::IS_MINIMAL.with(|value| *value.borrow())
    }

    pub fn print_str(&self, string: &str) {
        match self {
            Self::Normal => {
                print!("{}", string);
                let _ = stdout().flush();
            }
            Self::Warning => {
                if Self::is_minimal() {
                    eprint_colorless(string);
                } else {
                    eprint!("{}", ColoredString::from(string).yellow());
                }
            }
            Self::Debugger(condition) => match (Self::is_minimal(), *condition) {
                (false, _) => {
                    eprint!("{}", ColoredString::from(string).blue());
                }
                (true, Condition::Always) => {
                    eprint_colorless(string);
                }
                (true, Condition::Sometimes) => (),
            },
        }
    }

    pub fn print_value(&self, value: Value) {
        self.print_str(&format!("{}\n", value));
    }
}

/// Accumulator as shown in traces: `-` when empty, characters quoted.
pub fn accumulator(value: Option<Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(Value::Int(val)) => val.to_string(),
        Some(Value::Char(ch)) => format!("'{}'", ch),
    }
}

impl<'a> Decolored<'a> {
    pub fn new(string: &'a str) -> Self {
        Self {
            chars: string.chars(),
        }
    }
}

impl<'a> Iterator for Decolored<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ch) = self.chars.next() {
            // Skip everything between '\x1b' and 'm' (inclusive)
            if ch == '\x1b' {
                while self.chars.next().is_some_and(|ch| ch != 'm') {}
                continue;
            }
            return Some(ch);
        }
        None
    }
}

fn eprint_colorless(string: &str) {
    eprint!("{}", Decolored::new(string).collect::<String>());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decolored() {
        assert_eq!(Decolored::new("abcdef").collect::<String>(), "abcdef");
        assert_eq!(
            Decolored::new("abc\x1b[0;2mdef\x1b[0m").collect::<String>(),
            "abcdef"
        );
        assert_eq!(Decolored::new("abc\x1b[0xyz").collect::<String>(), "abc");
        assert_eq!(
            Decolored::new("abc\x1bw[0bxyzmdef").collect::<String>(),
            "abcdef"
        );
    }

    #[test]
    fn accumulator_display() {
        assert_eq!(accumulator(None), "-");
        assert_eq!(accumulator(Some(Value::Int(-3))), "-3");
        assert_eq!(accumulator(Some(Value::Char('q'))), "'q'");
    }

    #[test]
    fn minimal_flag_is_replaced() {
        assert!(!Output::set_minimal(true));
        assert!(Output::is_minimal());
        assert!(Output::set_minimal(false));
    }
}
