//! Console test harness: loads a CP/M-style test ROM (ZEXDOC, ZEXALL,
//! prelim, ...) at 0x0100 and runs it until it halts or warm-boots,
//! streaming BDOS console output to stdout.
//!
//! Exit status: 0 when the program finishes on its own, nonzero when the
//! T-state budget runs out first (divergence guard) or on host I/O errors.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use zeal_machines::cpm::{CpmMachine, LoadError};

#[derive(Parser)]
#[command(name = "zeal", about = "Cycle-counted Z80 emulator test harness")]
struct Args {
    /// Test ROM image, loaded at 0x0100
    rom: PathBuf,

    /// Disassemble each instruction before executing it
    #[arg(long)]
    trace: bool,

    /// Abort with a nonzero exit once this many T-states have elapsed
    #[arg(long, default_value_t = 200_000_000_000)]
    max_tstates: u64,

    /// Restore a save-state blob before running
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write a save-state blob after the run
    #[arg(long)]
    save_state: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum HarnessError {
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot load program: {0}")]
    Load(#[from] LoadError),
    #[error("cannot restore state: {0}")]
    State(#[from] zeal_core::cpu::z80::SaveStateLenError),
    #[error("T-state budget of {0} exhausted")]
    BudgetExhausted(u64),
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("zeal: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), HarnessError> {
    let rom = std::fs::read(&args.rom).map_err(|source| HarnessError::ReadFile {
        path: args.rom.clone(),
        source,
    })?;

    let mut machine = CpmMachine::new();
    machine.load_program(&rom)?;
    info!("loaded {} ({} bytes)", args.rom.display(), rom.len());

    if let Some(path) = &args.load_state {
        let blob = std::fs::read(path).map_err(|source| HarnessError::ReadFile {
            path: path.clone(),
            source,
        })?;
        machine.cpu.load_state(&blob)?;
        info!("restored state from {}", path.display());
    }

    let mut stdout = std::io::stdout();
    let result = loop {
        if machine.finished() {
            break Ok(());
        }
        if machine.cpu.cycles >= args.max_tstates {
            break Err(HarnessError::BudgetExhausted(args.max_tstates));
        }
        if args.trace {
            let (line, _) = machine.cpu.disassemble(machine.cpu.pc);
            eprintln!("{}", line);
        }
        machine.step();

        let output = machine.drain_output();
        if !output.is_empty() {
            stdout.write_all(&output).ok();
            stdout.flush().ok();
        }
    };

    if let Some(path) = &args.save_state {
        std::fs::write(path, machine.cpu.save_state()).map_err(|source| {
            HarnessError::WriteFile {
                path: path.clone(),
                source,
            }
        })?;
        info!("saved state to {}", path.display());
    }

    println!();
    info!("finished after {} T-states", machine.cpu.cycles);
    result
}
