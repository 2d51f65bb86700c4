use std::io::{self, BufRead};

use crate::debugger::{Debugger, DebuggerOptions};
use crate::decoder::resolve_value;
use crate::output::{Condition, Output};
use crate::value::Value;

/// Answer to a single-step prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

/// Everything the machine needs from the outside world while running.
pub trait Host {
    /// Sink for `outbox`.
    fn output(&mut self, value: Value);
    /// Non-fatal diagnostics.
    fn warning(&mut self, message: &str);
    /// Only used by the `QUERY` exhaustion policy. `None` ends the program.
    fn request_input(&mut self) -> Option<Value>;
    /// Only used in single-step mode, before every line.
    fn request_step(&mut self, line: usize, text: &str, acc: Option<Value>) -> Step;
}

/// Host backed by stdout, stderr and stdin.
pub struct Terminal {
    debugger: Option<Debugger>,
}

impl Terminal {
    pub fn new(debugger_opts: Option<DebuggerOptions>) -> Self {
        Self {
            debugger: debugger_opts.map(Debugger::new),
        }
    }
}

impl Host for Terminal {
    fn output(&mut self, value: Value) {
        Output::Normal.print_value(value);
    }

    fn warning(&mut self, message: &str) {
        Output::Warning.print_str(&format!("Warning: {}\n", message));
    }

    fn request_input(&mut self) -> Option<Value> {
        let mut stdin = io::stdin().lock();
        loop {
            Output::Debugger(Condition::Sometimes)
                .print_str("Enter a value for the inbox instruction: ");
            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => (),
                Err(err) => {
                    self.warning(&format!("failed to read input: {}", err));
                    return None;
                }
            }
            match resolve_value(line.trim()) {
                Ok(value) => return Some(value),
                Err(err) => self.warning(&err.to_string()),
            }
        }
    }

    fn request_step(&mut self, line: usize, text: &str, acc: Option<Value>) -> Step {
        match &mut self.debugger {
            Some(debugger) => debugger.wait_for_step(line, text, acc),
            None => Step::Continue,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Host that records everything and answers from queues.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub outputs: Vec<Value>,
        pub warnings: Vec<String>,
        pub inputs: VecDeque<Value>,
        /// Lines shown in single-step mode.
        pub traced: Vec<usize>,
        /// Quit when this many steps have been shown.
        pub quit_after: Option<usize>,
    }

    impl Host for Recorder {
        fn output(&mut self, value: Value) {
            self.outputs.push(value);
        }

        fn warning(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }

        fn request_input(&mut self) -> Option<Value> {
            self.inputs.pop_front()
        }

        fn request_step(&mut self, line: usize, _text: &str, _acc: Option<Value>) -> Step {
            if self.quit_after == Some(self.traced.len()) {
                return Step::Quit;
            }
            self.traced.push(line);
            Step::Continue
        }
    }

    #[test]
    fn terminal_without_debugger_never_blocks() {
        let mut terminal = Terminal::new(None);
        assert_eq!(terminal.request_step(1, "inbox", None), Step::Continue);
    }
}
