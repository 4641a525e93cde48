//! Console input for the interactive client
//!
//! Lines are checked locally before they go on the wire, so obviously
//! malformed input never costs a round trip.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::protocol::{parse_operand, Operator, TERMINATOR};

/// Default number of tries before the client gives up on a prompt
pub const DEFAULT_PROMPT_ATTEMPTS: usize = 5;

const PROMPT: &str = "Enter the commands to send to the server: ";

const FORMAT_HINT: &str =
    "Invalid input format. Please use the format: operator [+-*/] value value or = to close the connection";

/// Outcome of a local input check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCheck {
    /// `op a b`, ready to send
    Calculation,

    /// `=`, the last thing sent on this session
    Terminate,

    /// Would only get an error back
    Invalid,
}

/// Check that a line is `=` or `op num num` before sending it
pub fn validate_input(line: &str) -> InputCheck {
    let line = line.trim_start();
    let mut chars = line.chars();

    match chars.next() {
        Some(TERMINATOR) => InputCheck::Terminate,
        Some(symbol) if Operator::from_symbol(symbol).is_some() => {
            // Extra operands are ignored by the server, so they pass here too
            let mut operands = chars.as_str().split_whitespace();
            match (operands.next(), operands.next()) {
                (Some(a), Some(b)) if parse_operand(a).is_ok() && parse_operand(b).is_ok() => {
                    InputCheck::Calculation
                }
                _ => InputCheck::Invalid,
            }
        }
        _ => InputCheck::Invalid,
    }
}

/// Prompt until a valid command is entered
///
/// Gives up after `attempts` invalid lines and returns `None`, as it does
/// at end of input. Lines longer than `buffer_size - 1` bytes are cut to
/// fit one frame.
pub fn prompt_command<R, W>(
    input: &mut R,
    output: &mut W,
    attempts: usize,
    buffer_size: usize,
) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    let limit = buffer_size.saturating_sub(1);

    for _ in 0..attempts {
        write!(output, "\n{}", PROMPT)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let mut line = line.trim_end_matches(&['\r', '\n'][..]).to_string();
        if line.len() > limit {
            writeln!(
                output,
                "Input string is too long, it will be truncated to {} characters.",
                limit
            )?;
            line = truncate_to_boundary(&line, limit).to_string();
        }

        match validate_input(&line) {
            InputCheck::Invalid => writeln!(output, "{}", FORMAT_HINT)?,
            InputCheck::Terminate => {
                writeln!(output, "Closing the connection...")?;
                return Ok(Some(line));
            }
            InputCheck::Calculation => return Ok(Some(line)),
        }
    }

    writeln!(output, "Too many invalid attempts.")?;
    Ok(None)
}

fn truncate_to_boundary(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
