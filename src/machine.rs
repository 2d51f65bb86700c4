use clap::ValueEnum;

use crate::decoder::{decode_line, MemRef, Target, Token};
use crate::error::{ErrorKind, HrmError};
use crate::host::{Host, Step};
use crate::instruction::{Condition, Instruction, Mnemonic};
use crate::program::Program;
use crate::symbol::SymbolTable;
use crate::value::{Value, ValueKind};

/// Memory size used when none is given.
pub const DEFAULT_MEMORY_SIZE: usize = 25;

/// What `inbox` does once the input stream has run out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Exhaustion {
    /// Print a warning and carry on, leaving the accumulator as it was.
    #[default]
    #[value(name = "WARN")]
    Warn,
    /// Stop the program normally.
    #[value(name = "STOP")]
    Stop,
    /// Ask for the missing value.
    #[value(name = "QUERY")]
    Query,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub memory_size: usize,
    pub exhaustion: Exhaustion,
    /// Ask the host before every line.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            memory_size: DEFAULT_MEMORY_SIZE,
            exhaustion: Exhaustion::default(),
            debug: false,
        }
    }
}

/// Why a run stopped without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Halt {
    /// Ran past the last line.
    End,
    /// `inbox` found no input under `STOP`, or the host had none under `QUERY`.
    InputExhausted,
    /// Quit from single-step mode.
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Statistics {
    /// Effectful instruction lines in the program.
    pub size: usize,
    /// Effectful instructions executed.
    pub steps: usize,
}

/// Complete machine state during a run.
pub struct Machine<'p, H: Host> {
    program: &'p Program,
    host: H,
    config: Config,
    /// Empty until something is picked up.
    acc: Option<Value>,
    memory: Vec<Value>,
    /// 0-based line about to run
    ip: usize,
    input: Vec<Value>,
    /// Next unread value in `input`
    cursor: usize,
    names: SymbolTable,
    steps: usize,
}

impl<'p, H: Host> Machine<'p, H> {
    pub fn new(program: &'p Program, input: Vec<Value>, config: Config, host: H) -> Self {
        Machine {
            program,
            host,
            config,
            acc: None,
            memory: vec![Value::default(); config.memory_size],
            ip: 0,
            input,
            cursor: 0,
            names: SymbolTable::default(),
            steps: 0,
        }
    }

    /// Run until the program halts. Errors are fatal; the machine must not be stepped again.
    pub fn run(&mut self) -> Result<Halt, HrmError> {
        loop {
            if let Some(halt) = self.step()? {
                return Ok(halt);
            }
        }
    }

    /// Run a single line. `Some` once the program has halted.
    pub fn step(&mut self) -> Result<Option<Halt>, HrmError> {
        if self.ip >= self.program.len() {
            return Ok(Some(Halt::End));
        }
        let program = self.program;
        let line = self.ip + 1;
        let text = program.line(self.ip);
        let decoded = decode_line(line, text).map_err(|err| err.with_span(program.span(self.ip)))?;

        if self.config.debug && self.host.request_step(line, text, self.acc) == Step::Quit {
            return Ok(Some(Halt::Quit));
        }

        let Token::Instruction(mnemonic) = decoded.token else {
            // Blank, comment or label
            self.ip += 1;
            return Ok(None);
        };
        let mnemonic: Mnemonic = mnemonic.parse().map_err(|kind| self.error(kind))?;
        if mnemonic.is_effectful() {
            self.steps += 1;
        }
        let instr = Instruction::parse(mnemonic, decoded.args).map_err(|kind| self.error(kind))?;
        self.execute(instr).map_err(|kind| self.error(kind))
    }

    fn execute(&mut self, instr: Instruction) -> Result<Option<Halt>, ErrorKind> {
        match instr {
            Instruction::Inbox => {
                if let Some(value) = self.input.get(self.cursor).copied() {
                    self.cursor += 1;
                    self.acc = Some(value);
                } else {
                    match self.config.exhaustion {
                        Exhaustion::Warn => self
                            .host
                            .warning("attempting to input data, but there is no more"),
                        Exhaustion::Stop => return Ok(Some(Halt::InputExhausted)),
                        Exhaustion::Query => match self.host.request_input() {
                            Some(value) => self.acc = Some(value),
                            None => return Ok(Some(Halt::InputExhausted)),
                        },
                    }
                }
            }
            Instruction::Outbox => {
                let value = self.holding("outbox")?;
                self.host.output(value);
            }
            Instruction::CopyFrom(memref) => {
                let addr = self.address(&memref)?;
                self.acc = Some(self.memory[addr]);
            }
            Instruction::CopyTo(memref) => {
                let addr = self.address(&memref)?;
                self.memory[addr] = self.holding("copyto")?;
            }
            Instruction::BumpUp(memref) => self.bump(&memref, 1, "bump+")?,
            Instruction::BumpDown(memref) => self.bump(&memref, -1, "bump-")?,
            Instruction::Add(memref) => {
                let addr = self.address(&memref)?;
                let acc = self.holding("add")?;
                self.acc = Some(add(acc, self.memory[addr])?);
            }
            Instruction::Sub(memref) => {
                let addr = self.address(&memref)?;
                let acc = self.holding("sub")?;
                self.acc = Some(sub(acc, self.memory[addr])?);
            }
            Instruction::Init(memref, value) => {
                let addr = self.address(&memref)?;
                self.memory[addr] = value;
            }
            Instruction::Name(memref, name) => {
                let addr = self.address(&memref)?;
                self.names.bind(name, addr);
            }
            Instruction::Jump(condition, label) => {
                // Label must exist whether or not the jump is taken
                let target = self
                    .program
                    .labels()
                    .get(&label)
                    .ok_or(ErrorKind::UnknownLabel { label })?;
                let taken = match condition {
                    Condition::Always => true,
                    Condition::Negative => self.acc.is_some_and(|acc| acc.is_negative()),
                    Condition::Zero => self.acc.is_some_and(|acc| acc.is_zero()),
                };
                if taken {
                    self.ip = target;
                    return Ok(None);
                }
            }
            Instruction::Data(values) => {
                self.input = values;
                self.cursor = 0;
            }
        }
        self.ip += 1;
        Ok(None)
    }

    /// Resolve a memory reference to an address inside memory, following names and pointers.
    fn address(&self, memref: &MemRef) -> Result<usize, ErrorKind> {
        let addr = match &memref.target {
            Target::Address(addr) => *addr,
            Target::Name(name) => {
                let addr = self
                    .names
                    .get(name)
                    .ok_or_else(|| ErrorKind::UnknownName { name: name.clone() })?;
                addr as i64
            }
        };
        let addr = self.check_address(addr)?;
        if !memref.indirect {
            return Ok(addr);
        }
        match self.memory[addr] {
            Value::Int(pointer) => self.check_address(pointer),
            value => Err(ErrorKind::Pointer { cell: addr, value }),
        }
    }

    fn check_address(&self, addr: i64) -> Result<usize, ErrorKind> {
        usize::try_from(addr)
            .ok()
            .filter(|addr| *addr < self.memory.len())
            .ok_or(ErrorKind::Address {
                address: addr,
                memory_size: self.memory.len(),
            })
    }

    fn bump(&mut self, memref: &MemRef, delta: i64, mnemonic: &'static str) -> Result<(), ErrorKind> {
        let addr = self.address(memref)?;
        let Value::Int(val) = self.memory[addr] else {
            return Err(ErrorKind::NotInteger {
                mnemonic,
                cell: addr,
                found: self.memory[addr].kind(),
            });
        };
        let val = Value::Int(val.checked_add(delta).ok_or(ErrorKind::Overflow { mnemonic })?);
        self.memory[addr] = val;
        self.acc = Some(val);
        Ok(())
    }

    fn holding(&self, mnemonic: &'static str) -> Result<Value, ErrorKind> {
        self.acc.ok_or(ErrorKind::EmptyAccumulator { mnemonic })
    }

    /// Tag with the current line.
    fn error(&self, kind: ErrorKind) -> HrmError {
        HrmError::new(kind, self.ip + 1).with_span(self.program.span(self.ip))
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            size: self.program.size(),
            steps: self.steps,
        }
    }

    pub fn accumulator(&self) -> Option<Value> {
        self.acc
    }

    pub fn memory(&self) -> &[Value] {
        &self.memory
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

fn add(acc: Value, operand: Value) -> Result<Value, ErrorKind> {
    const MNEMONIC: &str = "add";
    match (acc, operand) {
        (Value::Int(a), Value::Int(b)) => a
            .checked_add(b)
            .map(Value::Int)
            .ok_or(ErrorKind::Overflow { mnemonic: MNEMONIC }),
        _ => Err(mismatch(MNEMONIC, acc.kind(), operand.kind())),
    }
}

/// Two characters subtract to the distance between them.
fn sub(acc: Value, operand: Value) -> Result<Value, ErrorKind> {
    const MNEMONIC: &str = "sub";
    match (acc, operand) {
        (Value::Int(a), Value::Int(b)) => a
            .checked_sub(b)
            .map(Value::Int)
            .ok_or(ErrorKind::Overflow { mnemonic: MNEMONIC }),
        (Value::Char(a), Value::Char(b)) => Ok(Value::Int(a as i64 - b as i64)),
        _ => Err(mismatch(MNEMONIC, acc.kind(), operand.kind())),
    }
}

fn mismatch(mnemonic: &'static str, accumulator: ValueKind, operand: ValueKind) -> ErrorKind {
    ErrorKind::Type {
        mnemonic,
        accumulator,
        operand,
    }
}
