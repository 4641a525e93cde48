//! Evaluator
//!
//! Left fold over the operands with a single fixed operator:
//! `[a, b, c]` is `(a op b) op c`. No precedence, no mixing.

use crate::error::ProtocolError;
use super::Operator;

/// Apply `operator` across `operands` from left to right
///
/// A zero divisor anywhere in the fold aborts with `DivisionByZero`;
/// whatever was accumulated so far is dropped.
pub fn evaluate(operator: Operator, operands: &[f64]) -> Result<f64, ProtocolError> {
    let (first, rest) = match operands {
        [first, rest @ ..] if !rest.is_empty() => (*first, rest),
        _ => return Err(ProtocolError::InsufficientOperands),
    };

    rest.iter().try_fold(first, |acc, &rhs| apply(operator, acc, rhs))
}

fn apply(operator: Operator, lhs: f64, rhs: f64) -> Result<f64, ProtocolError> {
    match operator {
        Operator::Add => Ok(lhs + rhs),
        Operator::Subtract => Ok(lhs - rhs),
        Operator::Multiply => Ok(lhs * rhs),
        // -0.0 == 0.0, so both zeros are caught
        Operator::Divide if rhs == 0.0 => Err(ProtocolError::DivisionByZero),
        Operator::Divide => Ok(lhs / rhs),
    }
}
