use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, NamedSource, Report, Result, WrapErr};

use hrm::decoder::parse_input;
use hrm::host::Terminal;
use hrm::output::Output;
use hrm::{Config, DebuggerOptions, Exhaustion, Halt, HrmError, Machine, Program, Statistics};

/// hrm runs programs written in the office-worker assembly of Human Resource Machine.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a program file to run with default options
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program and print its outbox and statistics
    Run {
        /// Program file to run
        name: PathBuf,
        #[command(flatten)]
        opts: RunOptions,
    },
    /// Run a program one line at a time
    Debug {
        /// Program file to run
        name: PathBuf,
        /// Read step commands (`n`, `c`, `q`) from argument
        #[arg(short, long)]
        command: Option<String>,
        #[command(flatten)]
        opts: RunOptions,
    },
    /// Check a program without running it
    Check {
        /// Program file to check
        name: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunOptions {
    /// File of input data, read by `inbox`
    #[arg(short, long)]
    data: Option<PathBuf>,
    /// Size of scratch memory
    #[arg(short, long = "memsize", default_value_t = hrm::DEFAULT_MEMORY_SIZE, value_parser = memory_size)]
    memory_size: usize,
    /// What `inbox` does when there is no more input data
    #[arg(short, long = "inbox", value_enum, ignore_case = true, default_value_t = Exhaustion::Warn)]
    inbox: Exhaustion,
    /// Produce minimal output, suited for blackbox tests
    #[arg(long)]
    minimal: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            data: None,
            memory_size: hrm::DEFAULT_MEMORY_SIZE,
            inbox: Exhaustion::default(),
            minimal: false,
        }
    }
}

impl Args {
    fn is_minimal(&self) -> bool {
        match &self.command {
            Some(Command::Run { opts, .. }) | Some(Command::Debug { opts, .. }) => opts.minimal,
            _ => false,
        }
    }
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    // `HRM_MINIMAL=1` forces `--minimal`, for black-box tests
    let forced = std::env::var("HRM_MINIMAL").is_ok_and(|value| value == "1");
    Output::set_minimal(args.is_minimal() || forced);

    let color = !Output::is_minimal();
    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(hrm::DIAGNOSTIC_CONTEXT_LINES)
                .color(color)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run { name, opts } => run(&name, opts, None),
            Command::Debug {
                name,
                command,
                opts,
            } => run(&name, opts, Some(DebuggerOptions { command })),
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let src = read_file(&name)?;
                let program =
                    Program::load(src.as_str()).map_err(|err| report(err, &name, &src))?;
                program
                    .check()
                    .map_err(|err| report(err, &name, program.src()))?;
                message(Green, "Success", "no errors found!");
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(&path, RunOptions::default(), None)
    } else {
        println!("\n~ hrm v{VERSION} ~");
        println!("{SHORT_INFO}");
        Ok(())
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

/// Status line on stderr, dropped with `--minimal`.
fn message(color: MsgColor, left: &str, right: &str) {
    if Output::is_minimal() {
        return;
    }
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    eprintln!("{left:>12} {right}");
}

fn statistics(stats: Statistics) {
    if Output::is_minimal() {
        eprintln!("Size = {}", stats.size);
        eprintln!("Steps = {}", stats.steps);
        return;
    }
    message(MsgColor::Cyan, "Size", &stats.size.to_string());
    message(MsgColor::Cyan, "Steps", &stats.steps.to_string());
}

fn run(name: &Path, opts: RunOptions, debugger_opts: Option<DebuggerOptions>) -> Result<()> {
    file_message(MsgColor::Green, "Loading", name);
    let src = read_file(name)?;
    let program = Program::load(src.as_str()).map_err(|err| report(err, name, &src))?;

    let input = match &opts.data {
        Some(path) => {
            let data = read_file(path)?;
            parse_input(&data).map_err(|err| report(err, path, &data))?
        }
        None => Vec::new(),
    };

    let config = Config {
        memory_size: opts.memory_size,
        exhaustion: opts.inbox,
        debug: debugger_opts.is_some(),
    };
    let mut machine = Machine::new(&program, input, config, Terminal::new(debugger_opts));

    message(MsgColor::Green, "Running", "program");
    let result = machine.run();
    statistics(machine.statistics());

    match result.map_err(|err| report(err, name, program.src()))? {
        Halt::End => file_message(MsgColor::Green, "Completed", name),
        Halt::InputExhausted => message(
            MsgColor::Cyan,
            "Stopped",
            "tried to read data that is not there",
        ),
        Halt::Quit => message(MsgColor::Cyan, "Quit", "stopped from debugger"),
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not read `{}`", path.display()))
}

/// Attach the file an error was raised in, so the offending line is shown.
fn report(err: HrmError, path: &Path, src: &str) -> Report {
    Report::new(err).with_source_code(NamedSource::new(
        path.display().to_string(),
        src.to_string(),
    ))
}

const MAX_MEMORY_SIZE: usize = 1 << 16;

/// Parse a memory size in `1..=MAX_MEMORY_SIZE`.
fn memory_size(arg: &str) -> std::result::Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(0) => Err("memory size must be at least 1".to_string()),
        Ok(size) if size > MAX_MEMORY_SIZE => Err(format!(
            "memory size must be at most {MAX_MEMORY_SIZE}"
        )),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}

const SHORT_INFO: &str = r"
Welcome to hrm, an interpreter for the assembly language of Human Resource Machine.
Please use `-h` or `--help` to access the usage instructions and documentation.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
