//! Command parser
//!
//! Grammar: `[ws] OP A B` or `[ws] = ...`.
//!
//! Checks run in this order:
//! 1. `=` as the first non-whitespace character terminates, whatever follows
//! 2. the operator must be one of `+ - * /`
//! 3. operand tokens (split on spaces) must be plain decimal numbers
//! 4. at least two operands are required
//!
//! Only the first [`MAX_OPERANDS`] tokens are looked at. Anything after
//! them is ignored rather than rejected.

use crate::error::ProtocolError;
use super::{Command, Operator};

/// Number of operands read from a request
pub const MAX_OPERANDS: usize = 2;

/// Terminator token
pub const TERMINATOR: char = '=';

/// Parse one request line (newline already stripped)
pub fn parse(line: &str) -> Result<Command, ProtocolError> {
    let line = line.trim_start();

    let mut chars = line.chars();
    let symbol = match chars.next() {
        Some(c) => c,
        None => return Err(ProtocolError::InvalidOperand(String::new())),
    };

    if symbol == TERMINATOR {
        return Ok(Command::Terminate);
    }

    let operator = Operator::from_symbol(symbol).ok_or(ProtocolError::UnknownOperator(symbol))?;

    let mut operands = Vec::with_capacity(MAX_OPERANDS);
    for token in chars.as_str().split(' ').filter(|t| !t.is_empty()).take(MAX_OPERANDS) {
        operands.push(parse_operand(token)?);
    }

    if operands.len() < MAX_OPERANDS {
        return Err(ProtocolError::InsufficientOperands);
    }

    Ok(Command::Calculate { operator, operands })
}

/// Parse a signed integer or decimal (`-3`, `+4.5`, `.5`, `7.`)
///
/// Exponents, `inf` and `NaN` are rejected even though `f64::from_str`
/// would take them.
pub fn parse_operand(token: &str) -> Result<f64, ProtocolError> {
    if !is_decimal(token) {
        return Err(ProtocolError::InvalidOperand(token.to_string()));
    }

    token
        .parse::<f64>()
        .map_err(|_| ProtocolError::InvalidOperand(token.to_string()))
}

fn is_decimal(token: &str) -> bool {
    let unsigned = token.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(token);

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };

    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    !(whole.is_empty() && fraction.is_empty()) && digits(whole) && digits(fraction)
}
