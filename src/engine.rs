//! Engine Module
//!
//! The request pipeline shared by both transports.
//!
//! ## Responsibilities
//! - Parse a request line into a [`Command`]
//! - Evaluate arithmetic commands
//! - Turn the outcome into a [`Response`] and its wire text
//!
//! The engine holds no per-session state, so one instance can serve any
//! number of sessions and datagrams.

use crate::config::EncoderMode;
use crate::protocol::{evaluate, parse, Command, Response};

/// The calculator behind every session and exchange
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    /// How successful results are rendered
    mode: EncoderMode,
}

impl Engine {
    pub fn new(mode: EncoderMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> EncoderMode {
        self.mode
    }

    /// Run a request line through parse and evaluate
    pub fn execute(&self, line: &str) -> Response {
        match parse(line) {
            Ok(command) => self.execute_command(command),
            Err(e) => Response::Error(e),
        }
    }

    /// Evaluate an already parsed command
    pub fn execute_command(&self, command: Command) -> Response {
        match command {
            Command::Terminate => Response::Bye,
            Command::Calculate { operator, operands } => match evaluate(operator, &operands) {
                Ok(result) => Response::Value {
                    operator,
                    operands,
                    result,
                },
                Err(e) => Response::Error(e),
            },
        }
    }

    /// Render a response in this engine's mode
    pub fn encode(&self, response: &Response) -> String {
        response.encode(self.mode)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EncoderMode::Plain)
    }
}
