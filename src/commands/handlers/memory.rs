//! `rd [-w WIDTH] <address> [count]`: hex and ASCII dump of target memory.

use crate::commands::command::{Command, CommandContext, CommandFailure};
use crate::commands::contract::ArgumentContract;
use crate::session::{Endian, Session, SessionError};
use clap::{value_parser, Arg, ArgMatches};
use std::io::Write;

const ROW_BYTES: usize = 16;

pub struct ReadMemoryCommand {
    contract: ArgumentContract,
}

impl ReadMemoryCommand {
    pub fn new() -> Self {
        let parser = clap::Command::new("rd")
            .about("Read and display target memory")
            .arg(
                Arg::new("width")
                    .short('w')
                    .long("width")
                    .value_name("BYTES")
                    .value_parser(parse_width)
                    .help("Unit size: 1, 2, 4 or 8 (default: target word size)"),
            )
            .arg(
                Arg::new("address")
                    .required(true)
                    .value_name("ADDRESS")
                    .value_parser(parse_address)
                    .help("Start address, hex with 0x prefix or decimal"),
            )
            .arg(
                Arg::new("count")
                    .value_name("COUNT")
                    .value_parser(value_parser!(u64).range(1..))
                    .default_value("1")
                    .help("Number of units to display"),
            );
        Self {
            contract: ArgumentContract::new(parser),
        }
    }
}

impl Default for ReadMemoryCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for ReadMemoryCommand {
    fn name(&self) -> &str {
        "rd"
    }

    fn summary(&self) -> Option<&str> {
        Some("Read and display target memory")
    }

    fn contract(&self) -> &ArgumentContract {
        &self.contract
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &ArgMatches) -> Result<(), CommandFailure> {
        let address = *args
            .get_one::<u64>("address")
            .ok_or_else(|| CommandFailure::failed("missing address"))?;
        let count = args.get_one::<u64>("count").copied().unwrap_or(1);
        let width = match args.get_one::<usize>("width") {
            Some(w) => *w,
            None => ctx.session.word_size(),
        };
        if ![1, 2, 4, 8].contains(&width) {
            return Err(CommandFailure::failed(format!(
                "unsupported unit size {width} for this target"
            )));
        }
        // The last byte may sit at the very top of the address space.
        count
            .checked_mul(width as u64)
            .and_then(|len| address.checked_add(len - 1))
            .ok_or_else(|| CommandFailure::failed("address range wraps around"))?;

        let units_per_row = ROW_BYTES / width;
        let endian = ctx.session.endian();
        let mut remaining = count;
        let mut row_addr = address;

        while remaining > 0 {
            ctx.check_interrupt()?;
            let units = remaining.min(units_per_row as u64) as usize;

            let mut hex = Vec::with_capacity(units);
            let mut raw = Vec::with_capacity(units * width);
            for i in 0..units {
                let unit_addr = row_addr + (i * width) as u64;
                let value = read_unit(&*ctx.session, unit_addr, width)?;
                hex.push(format!("{:0w$x}", value, w = width * 2));
                raw.extend(unit_bytes(value, width, endian));
            }

            writeln!(
                ctx.out,
                "{:016x}:  {:<hex_w$}  {}",
                row_addr,
                hex.join(" "),
                ascii_repr(&raw),
                hex_w = units_per_row * (width * 2 + 1) - 1
            )?;

            remaining -= units as u64;
            if remaining > 0 {
                row_addr += (units * width) as u64;
            }
        }
        Ok(())
    }
}

/// Parses `0x`-prefixed hex or decimal addresses.
fn parse_address(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|_| format!("invalid address '{s}'"))
}

fn parse_width(s: &str) -> Result<usize, String> {
    match s {
        "1" => Ok(1),
        "2" => Ok(2),
        "4" => Ok(4),
        "8" => Ok(8),
        _ => Err(format!("invalid unit size '{s}' (expected 1, 2, 4 or 8)")),
    }
}

fn read_unit(session: &dyn Session, address: u64, width: usize) -> Result<u64, SessionError> {
    Ok(match width {
        1 => session.read_u8(address)? as u64,
        2 => session.read_u16(address)? as u64,
        4 => session.read_u32(address)? as u64,
        _ => session.read_u64(address)?,
    })
}

/// Bytes of a unit in target memory order.
fn unit_bytes(value: u64, width: usize, endian: Endian) -> Vec<u8> {
    match endian {
        Endian::Little => value.to_le_bytes()[..width].to_vec(),
        Endian::Big => value.to_be_bytes()[8 - width..].to_vec(),
    }
}

fn ascii_repr(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| {
            if (0x20..=0x7e).contains(b) {
                *b as char
            } else {
                '.'
            }
        })
        .collect()
}
