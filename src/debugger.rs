use std::io::{self, BufRead, IsTerminal};

use console::{Key, Term};

use crate::dprintln;
use crate::host::Step;
use crate::output::accumulator;
use crate::value::Value;

/// Leave this as a struct, in case more options are added in the future. Plus it is more explicit.
#[derive(Debug, Default)]
pub struct DebuggerOptions {
    /// Step commands to read before falling back to the terminal or stdin.
    pub command: Option<String>,
}

/// Single-step controller: shows each line before it runs and waits for a command.
pub struct Debugger {
    status: Status,
    argument: Option<ArgumentSource>,
    stream: Stream,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    WaitForCommand,
    /// Stop prompting, run to the end.
    Continue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Next,
    Continue,
    Quit,
}

/// Stdin or interactive terminal.
enum Stream {
    Stdin,
    Terminal(Term),
}

/// Commands given on the command line, separated by whitespace or `;`.
struct ArgumentSource {
    commands: std::vec::IntoIter<String>,
}

impl Debugger {
    pub fn new(opts: DebuggerOptions) -> Self {
        let stream = if io::stdin().is_terminal() {
            Stream::Terminal(Term::stderr())
        } else {
            Stream::Stdin
        };
        Self {
            status: Status::WaitForCommand,
            argument: opts.command.map(|command| ArgumentSource::from(&command)),
            stream,
        }
    }

    /// Show the line about to run and block until told to go on or quit.
    pub fn wait_for_step(&mut self, line: usize, text: &str, acc: Option<Value>) -> Step {
        if self.status == Status::Continue {
            return Step::Continue;
        }
        dprintln!(Always, "{:>4} [{}] {}", line, accumulator(acc), text);
        loop {
            let command = match self.read() {
                Ok(command) => command,
                Err(input) => {
                    dprintln!(
                        Always,
                        "Unknown command '{}'. Use n(ext), c(ontinue) or q(uit).",
                        input
                    );
                    continue;
                }
            };
            return match command {
                Command::Next => Step::Continue,
                Command::Continue => {
                    self.status = Status::Continue;
                    Step::Continue
                }
                Command::Quit => Step::Quit,
            };
        }
    }

    /// End of input quits. `Err` holds unrecognised input.
    fn read(&mut self) -> Result<Command, String> {
        if let Some(command) = self.argument.as_mut().and_then(ArgumentSource::next_command) {
            return Command::parse(&command);
        }
        match &self.stream {
            Stream::Terminal(term) => match term.read_key() {
                Ok(Key::Enter | Key::Char(' ' | 'n')) => Ok(Command::Next),
                Ok(Key::Char('c')) => Ok(Command::Continue),
                Ok(Key::Char('q') | Key::Escape) | Err(_) => Ok(Command::Quit),
                Ok(Key::Char(ch)) => Err(ch.to_string()),
                Ok(key) => Err(format!("{:?}", key)),
            },
            Stream::Stdin => {
                let mut line = String::new();
                match io::stdin().lock().read_line(&mut line) {
                    Ok(0) | Err(_) => Ok(Command::Quit),
                    Ok(_) => Command::parse(line.trim()),
                }
            }
        }
    }
}

impl Command {
    fn parse(input: &str) -> Result<Self, String> {
        match input {
            "" | "n" | "next" => Ok(Self::Next),
            "c" | "continue" => Ok(Self::Continue),
            "q" | "quit" => Ok(Self::Quit),
            _ => Err(input.to_string()),
        }
    }
}

impl ArgumentSource {
    fn from(argument: &str) -> Self {
        let commands: Vec<String> = argument
            .split(|ch: char| ch == ';' || ch.is_whitespace())
            .filter(|command| !command.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            commands: commands.into_iter(),
        }
    }

    fn next_command(&mut self) -> Option<String> {
        self.commands.next()
    }
}
