use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_num::maybe_hex;

use chip8_disasm::{
    DisasmOptions, Disassembler, ROM_START_ADDRESS, TrailingBytePolicy, UnknownStyle, rom,
};

const STDOUT: &str = "stdout";

/// Tools to run, debug, and (dis)assemble CHIP-8 ROMs
#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Disassemble a CHIP-8 ROM file
    ///
    /// Reads the ROM, splits it into two-byte opcodes and maps each one to its
    /// instruction. Writes to stdout unless an output file is given.
    #[command(visible_alias = "d")]
    Disassemble {
        /// Path to the ROM file to disassemble
        rom_path: PathBuf,

        /// Output file to write to
        #[arg(short, long, default_value = STDOUT)]
        output: String,

        /// Virtual address of the first ROM byte
        #[arg(long, default_value_t = ROM_START_ADDRESS, value_parser = maybe_hex::<u16>)]
        load_address: u16,

        /// Print unknown opcodes without their address and bytes
        #[arg(long)]
        bare_unknown: bool,

        /// Fail on ROMs with an odd number of bytes instead of dropping the last one
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Disassemble {
            rom_path,
            output,
            load_address,
            bare_unknown,
            strict,
        } => {
            let options = DisasmOptions {
                load_address,
                unknown_style: if bare_unknown {
                    UnknownStyle::Bare
                } else {
                    UnknownStyle::Addressed
                },
                trailing_byte: if strict {
                    TrailingBytePolicy::Reject
                } else {
                    TrailingBytePolicy::Truncate
                },
            };

            disassemble(&rom_path, &output, options)?;
        }
    }

    Ok(())
}

fn disassemble(rom_path: &Path, output: &str, options: DisasmOptions) -> anyhow::Result<usize> {
    let rom = rom::load(rom_path).with_context(|| format!("failed to load {}", rom_path.display()))?;

    let writer: Box<dyn Write> = if is_stdout(output) {
        Box::new(io::stdout().lock())
    } else {
        let file = File::create(output).context("failed to open output file for writing")?;
        Box::new(BufWriter::new(file))
    };

    let dest = if is_stdout(output) { STDOUT } else { output };
    let written = Disassembler::new(options)
        .write_to(&rom, writer)
        .with_context(|| format!("failed to disassemble {}", rom_path.display()))?;

    log::info!("{}", report(written, dest));

    Ok(written)
}

fn is_stdout(output: &str) -> bool {
    output.is_empty() || output == STDOUT
}

fn report(written: usize, dest: &str) -> String {
    format!("wrote out {written} bytes to {dest}")
}
