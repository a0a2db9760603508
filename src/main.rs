//! Command line disassembler for GalaxyScript VM bytecode images.
//!
//! ```text
//! gsdisas <input.gsvm> [-o <output>] [--table] [--base <hex>]
//! ```
//!
//! Without `-o` the assembly goes to stdout. `--table` prints an addressed listing instead of
//! plain assembly, with addresses starting at `--base` (hexadecimal, default 0). Log
//! verbosity is taken from `GSDISAS_LOG`.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use log::info;

use gsdisas::{disassemble, logging, Listing, Word};

struct Options {
  input  : PathBuf,
  output : Option<PathBuf>,
  table  : bool,
  base   : Word,
}

fn usage() -> &'static str {
  "usage: gsdisas <input.gsvm> [-o <output>] [--table] [--base <hex>]"
}

fn parse_base(text: &str) -> Result<Word> {
  let digits = text.trim_start_matches("0x").trim_start_matches("0X");
  Word::from_str_radix(digits, 16).with_context(|| format!("invalid base address `{}`", text))
}

fn parse_options(args: &[String]) -> Result<Options> {
  let mut input  = None;
  let mut output = None;
  let mut table  = false;
  let mut base   = 0;

  let mut i = 0;
  while i < args.len() {
    match args[i].as_str() {

      k @ "-o" | k @ "--output" => {
        i += 1;
        match args.get(i) {
          Some(path) => output = Some(PathBuf::from(path)),
          None       => bail!("{} requires an argument\n{}", k, usage())
        }
      }

      "--table" => {
        table = true;
      }

      "--base" => {
        i += 1;
        match args.get(i) {
          Some(text) => base = parse_base(text)?,
          None       => bail!("--base requires an argument\n{}", usage())
        }
      }

      other if other.starts_with('-') => {
        bail!("unexpected argument: {}\n{}", other, usage());
      }

      path => {
        if input.is_some() {
          bail!("more than one input file given\n{}", usage());
        }
        input = Some(PathBuf::from(path));
      }

    }
    i += 1;
  }

  match input {
    Some(input) => Ok(Options{ input, output, table, base }),
    None        => bail!("{}", usage())
  }
}

fn install_logger() -> Result<()> {
  logging::init().map_err(|e| anyhow!("installing logger: {}", e))
}

fn main() -> Result<()> {
  install_logger()?;

  let args: Vec<String> = env::args().skip(1).collect();
  if args.iter().any(|a| a == "-h" || a == "--help") {
    println!("{}", usage());
    return Ok(());
  }
  let options = parse_options(&args)?;

  let bytes = fs::read(&options.input)
      .with_context(|| format!("read {}", options.input.display()))?;

  let start = Instant::now();
  let text = match options.table {
    true  => Listing::new(options.base, &bytes)?.to_string(),
    false => disassemble(&bytes)?
  };
  info!("disassembled {} word(s) in {:?}", bytes.len() / 4, start.elapsed());

  match &options.output {
    Some(path) => {
      fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    }
    None => {
      let stdout = io::stdout();
      let mut handle = stdout.lock();
      handle.write_all(text.as_bytes()).context("write to stdout")?;
    }
  }

  Ok(())
}
