//! MIPS32 cycle-level simulator CLI.
//!
//! Loads an assembled JSON program image, runs it on the selected engine and
//! prints the final register file and statistics. It supports:
//! 1. **Topology selection:** Any engine, with forwarding, decode-stage branches and delay slots toggled.
//! 2. **Config files:** A JSON configuration; command-line flags override it.
//! 3. **Breakpoints:** Stop at given addresses and report where the run halted.

use std::path::PathBuf;
use std::{fs, process};

use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mipsim_core::config::{Config, TopologyKind};
use mipsim_core::sim::RunOutcome;
use mipsim_core::{Program, Simulator};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Topology {
    SingleCycle,
    MultiCycle,
    Pipelined,
    MultiAlu,
}

impl From<Topology> for TopologyKind {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::SingleCycle => Self::SingleCycle,
            Topology::MultiCycle => Self::MultiCycle,
            Topology::Pipelined => Self::Pipelined,
            Topology::MultiAlu => Self::MultiAluPipelined,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "mipsim",
    author,
    version,
    about = "Cycle-level MIPS32 simulator",
    long_about = "Run an assembled program image on a single-cycle, multi-cycle or pipelined MIPS32 core.\n\nExamples:\n  mipsim program.json\n  mipsim program.json --topology pipelined --no-forwarding\n  RUST_LOG=mipsim_core=debug mipsim program.json -b 0x400010"
)]
struct Cli {
    /// Program image (JSON).
    program: PathBuf,

    /// Simulator configuration (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Execution engine.
    #[arg(short, long, value_enum)]
    topology: Option<Topology>,

    /// Disable operand forwarding.
    #[arg(long)]
    no_forwarding: bool,

    /// Resolve branches in decode.
    #[arg(long)]
    branch_on_decode: bool,

    /// Execute the instruction after each control transfer.
    #[arg(long)]
    delay_slots: bool,

    /// Trace every stage of every cycle.
    #[arg(long)]
    trace: bool,

    /// Breakpoint address (hex with 0x prefix, or decimal). Repeatable.
    #[arg(short, long = "break", value_parser = parse_address)]
    breakpoints: Vec<u32>,

    /// Statistics sections to print (summary, core, instruction_mix, control).
    #[arg(long, value_delimiter = ',')]
    stats: Vec<String>,
}

fn parse_address(text: &str) -> Result<u32, String> {
    let parsed = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .map_or_else(|| text.parse(), |hex| u32::from_str_radix(hex, 16));
    parsed.map_err(|e| format!("invalid address {text:?}: {e}"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    process::exit(match run(&cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            1
        }
    });
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
            Config::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(topology) = cli.topology {
        config.pipeline.topology = topology.into();
    }
    if cli.no_forwarding {
        config.pipeline.forwarding = false;
    }
    if cli.branch_on_decode {
        config.pipeline.branch_on_decode = true;
    }
    if cli.delay_slots {
        config.pipeline.delay_slots = true;
    }
    if cli.trace {
        config.general.trace_instructions = true;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<i32, String> {
    let config = load_config(cli)?;
    let program = Program::from_json_file(&cli.program)
        .map_err(|e| format!("{}: {e}", cli.program.display()))?;

    println!(
        "[*] {} on {:?} (forwarding: {}, branch on decode: {}, delay slots: {})",
        cli.program.display(),
        config.pipeline.topology,
        config.pipeline.forwarding,
        config.pipeline.branch_on_decode,
        config.pipeline.delay_slots
    );

    let mut sim = Simulator::with_defaults(&config, &program).map_err(|e| e.to_string())?;
    for &pc in &cli.breakpoints {
        if !sim.add_breakpoint(pc) {
            warn!(pc = format_args!("{pc:#010x}"), "duplicate breakpoint ignored");
        }
    }

    let outcome = sim.run();
    let code = match outcome {
        Ok(RunOutcome::Finished(code)) => {
            println!("\n[*] Exit code {code}");
            code
        }
        Ok(RunOutcome::Breakpoint(pc)) => {
            let label = program
                .symbols
                .iter()
                .find_map(|(name, &addr)| (addr == pc).then_some(name.as_str()));
            match label {
                Some(label) => println!("\n[*] Breakpoint at {pc:#010x} <{label}>"),
                None => println!("\n[*] Breakpoint at {pc:#010x}"),
            }
            0
        }
        Ok(RunOutcome::Stopped) => {
            println!("\n[*] Stopped");
            0
        }
        Err(e) => {
            eprintln!("\n[!] FATAL: {e}");
            sim.exit_code().unwrap_or(1)
        }
    };

    println!();
    sim.registers().dump();
    println!();
    if cli.stats.is_empty() {
        sim.stats().print();
    } else {
        sim.stats().print_sections(&cli.stats);
    }
    Ok(code)
}
