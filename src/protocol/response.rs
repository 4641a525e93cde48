//! Response definitions
//!
//! Represents replies to clients and their text encoding.

use crate::config::EncoderMode;
use crate::error::ProtocolError;
use super::Operator;

/// Reply to a terminate request
pub const BYE: &str = "Bye";

/// A response to send to a client
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Session is ending
    Bye,

    /// Successful evaluation
    Value {
        operator: Operator,
        operands: Vec<f64>,
        result: f64,
    },

    /// Request was rejected; the session carries on
    Error(ProtocolError),
}

impl Response {
    /// True for the reply that closes a session
    pub fn is_bye(&self) -> bool {
        matches!(self, Response::Bye)
    }

    /// Render the reply as wire text
    ///
    /// The text is not limited here; framing truncates it to the buffer.
    pub fn encode(&self, mode: EncoderMode) -> String {
        match self {
            Response::Bye => BYE.to_string(),
            Response::Value { result, .. } if mode == EncoderMode::Plain => format!("{:.2}", result),
            Response::Value {
                operator,
                operands,
                result,
            } => {
                let separator = format!(" {} ", operator);
                let expression = operands
                    .iter()
                    .map(|operand| format!("{:.2}", operand))
                    .collect::<Vec<_>>()
                    .join(&separator);
                format!("{} = {:.2}", expression, result)
            }
            Response::Error(e) => e.to_string(),
        }
    }
}

impl From<ProtocolError> for Response {
    fn from(e: ProtocolError) -> Self {
        Response::Error(e)
    }
}
