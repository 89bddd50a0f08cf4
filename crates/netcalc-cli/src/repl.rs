//! Interactive read-calculate-print loop
//!
//! Reads one CIDR expression per line until end of input or a quit command.

use crate::render::Renderer;
use anyhow::Result;
use netcalc_cidr::Subnet;
use std::io::{BufRead, Write};

pub const PROMPT: &str = "IP address or network id in CIDR notation (e.g. 192.168.0.0/24): ";
pub const INVALID_INPUT: &str = "Invalid input.";

const QUIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// Counts of accepted and rejected lines for one session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub accepted: usize,
    pub rejected: usize,
}

fn is_quit(line: &str) -> bool {
    QUIT_COMMANDS
        .iter()
        .any(|cmd| line.eq_ignore_ascii_case(cmd))
}

/// Run the loop (blocking)
///
/// Parse failures never end the session: they are logged, reported with a
/// generic notice, and the next line is read.
pub fn run<R: BufRead, W: Write, E: Write>(
    mut input: R,
    renderer: &mut Renderer<W, E>,
) -> Result<SessionStats> {
    let mut stats = SessionStats::default();
    let mut buf = Vec::new();

    loop {
        renderer.prompt(PROMPT)?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            renderer.finish()?;
            break;
        }

        // non-UTF-8 lines count as rejected input
        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::debug!(bytes = buf.len(), "rejected non-UTF-8 input");
            renderer.notice(INVALID_INPUT)?;
            stats.rejected += 1;
            continue;
        };
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        if is_quit(line) {
            break;
        }

        match Subnet::parse(line) {
            Ok(subnet) => {
                tracing::debug!(input = line, %subnet, "calculated subnet");
                renderer.render(&subnet)?;
                stats.accepted += 1;
            }
            Err(err) => {
                tracing::debug!(input = line, error = %err, "rejected input");
                renderer.notice(INVALID_INPUT)?;
                stats.rejected += 1;
            }
        }
    }

    tracing::info!(
        accepted = stats.accepted,
        rejected = stats.rejected,
        "session ended"
    );
    Ok(stats)
}
