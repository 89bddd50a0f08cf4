//! Output rendering for calculated subnets
//!
//! Supports:
//! - Human-readable label/value table with highlighted bit-strings
//! - JSON (pretty and compact)
//! - CSV with a single header row per stream

use anyhow::Result;
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use netcalc_cidr::{group_bits, Subnet};
use std::io::{Stderr, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table output
    Human,
    /// JSON output (pretty-printed)
    Json,
    /// JSON output (compact)
    JsonCompact,
    /// CSV output
    Csv,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Include the binary section in human output
    pub show_binary: bool,
}

/// Style of one run of characters in a rendered bit-string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitStyle {
    /// Bit inside the prefix
    Network,
    /// Bit identifying the host
    Host,
    /// Dot between octets
    Separator,
}

impl BitStyle {
    fn paint(self, text: &str) -> ColoredString {
        match self {
            BitStyle::Network => text.blue().bold(),
            BitStyle::Host | BitStyle::Separator => text.normal(),
        }
    }
}

/// Split a bit-string into styled runs, with a separator between octets
///
/// Bits before `prefix_len` are [`BitStyle::Network`], the rest
/// [`BitStyle::Host`].
pub fn bit_segments(bits: &str, prefix_len: u8) -> Vec<(BitStyle, String)> {
    let prefix_len = usize::from(prefix_len);
    let mut segments: Vec<(BitStyle, String)> = Vec::new();
    let mut bit_index = 0;

    for c in group_bits(bits).chars() {
        let style = if c == '.' {
            BitStyle::Separator
        } else {
            bit_index += 1;
            if bit_index <= prefix_len {
                BitStyle::Network
            } else {
                BitStyle::Host
            }
        };
        match segments.last_mut() {
            Some((last, run)) if *last == style && style != BitStyle::Separator => run.push(c),
            _ => segments.push((style, c.to_string())),
        }
    }

    segments
}

fn paint_bits(bits: &str, prefix_len: u8) -> String {
    bit_segments(bits, prefix_len)
        .iter()
        .map(|(style, text)| style.paint(text).to_string())
        .collect()
}

/// Writes subnets to an output stream in the configured format
///
/// Notices that must not mix with machine-readable output go to `err`.
pub struct Renderer<W: Write, E: Write = Stderr> {
    out: W,
    err: E,
    options: RenderOptions,
    csv_header_written: bool,
}

impl<W: Write, E: Write> Renderer<W, E> {
    pub fn new(out: W, err: E, options: RenderOptions) -> Self {
        Self {
            out,
            err,
            options,
            csv_header_written: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }

    /// Print the input prompt (human output only)
    pub fn prompt(&mut self, text: &str) -> Result<()> {
        if self.options.format == OutputFormat::Human {
            write!(self.out, "{}", text.cyan())?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Report rejected input
    ///
    /// Machine-readable formats keep `out` clean and send the notice to `err`.
    pub fn notice(&mut self, text: &str) -> Result<()> {
        if self.options.format == OutputFormat::Human {
            writeln!(self.out, "{}", text.red())?;
        } else {
            writeln!(self.err, "{}", text.red())?;
            self.err.flush()?;
        }
        Ok(())
    }

    /// Report a failed target on the error stream, whatever the format
    pub fn error(&mut self, text: &str) -> Result<()> {
        writeln!(self.err, "{} {}", "✗".red(), text)?;
        self.err.flush()?;
        Ok(())
    }

    /// Move past a dangling prompt once input ends
    pub fn finish(&mut self) -> Result<()> {
        if self.options.format == OutputFormat::Human {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn render(&mut self, subnet: &Subnet) -> Result<()> {
        match self.options.format {
            OutputFormat::Human => self.write_human(subnet)?,
            OutputFormat::Json => self.write_json(subnet, true)?,
            OutputFormat::JsonCompact => self.write_json(subnet, false)?,
            OutputFormat::Csv => self.write_csv(subnet)?,
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_human(&mut self, subnet: &Subnet) -> Result<()> {
        let out = &mut self.out;
        writeln!(out)?;
        writeln!(out, "{}", format!("Subnet {}", subnet).bold().cyan())?;
        writeln!(out, "{}", "─".repeat(50).dimmed())?;
        writeln!(out, "{:>20}: {}", "IP address".bold(), subnet.address())?;
        writeln!(out, "{:>20}: {}", "CIDR prefix".bold(), subnet.prefix_len())?;
        writeln!(out, "{:>20}: {}", "Subnet mask".bold(), subnet.mask())?;
        writeln!(out, "{:>20}: {}", "Wildcard mask".bold(), subnet.wildcard_mask())?;
        writeln!(out, "{:>20}: {}", "Network id".bold(), subnet.network())?;
        writeln!(out, "{:>20}: {}", "Broadcast".bold(), subnet.broadcast())?;
        writeln!(out)?;
        writeln!(
            out,
            "{:>20}: {}",
            "Available hosts".bold(),
            subnet.available_hosts().to_string().green()
        )?;
        writeln!(
            out,
            "{:>20}: {}",
            "First usable host".bold(),
            subnet.first_usable_host()
        )?;
        writeln!(
            out,
            "{:>20}: {}",
            "Last usable host".bold(),
            subnet.last_usable_host()
        )?;

        if self.options.show_binary {
            let prefix_len = subnet.prefix_len();
            writeln!(out)?;
            for (label, bits) in [
                ("IP address (bin)", subnet.address_bits()),
                ("Subnet mask (bin)", subnet.mask_bits()),
                ("Network id (bin)", subnet.network_bits()),
                ("Broadcast (bin)", subnet.broadcast_bits()),
            ] {
                writeln!(out, "{:>20}: {}", label.bold(), paint_bits(&bits, prefix_len))?;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_json(&mut self, subnet: &Subnet, pretty: bool) -> Result<()> {
        let report = subnet.report();
        if pretty {
            serde_json::to_writer_pretty(&mut self.out, &report)?;
        } else {
            serde_json::to_writer(&mut self.out, &report)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_csv(&mut self, subnet: &Subnet) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(!self.csv_header_written)
            .from_writer(&mut self.out);
        wtr.serialize(subnet.report())?;
        wtr.flush()?;
        self.csv_header_written = true;
        Ok(())
    }
}
