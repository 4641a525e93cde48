//! Protocol Module
//!
//! Defines the text protocol spoken between calculator clients and servers.
//!
//! ## Request Format
//! ```text
//! OP A B        OP ∈ { + - * / },  A, B signed decimals
//! =             close the session (anything after it is ignored)
//! ```
//!
//! ## Responses
//! - `7.00` (plain) or `3.00 + 4.00 = 7.00` (echo)
//! - `Bye` after `=`
//! - an error line for rejected requests
//!
//! Responses are not requests: a reply fed back into the parser is
//! rejected.

mod command;
mod response;
mod codec;
mod eval;
mod parser;

pub use command::{Command, Operator};
pub use response::{Response, BYE};
pub use codec::{
    encode_frame, encode_datagram, decode_frame, truncate,
    read_frame, write_frame,
};
pub use eval::evaluate;
pub use parser::{parse, parse_operand, MAX_OPERANDS, TERMINATOR};
