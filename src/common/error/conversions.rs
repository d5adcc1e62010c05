//! Error conversion implementations.
//!
//! Low-level reader failures surface as malformed-table errors: running off
//! the end of a buffer while decoding means a declared length lied.

use super::types::Error;
use crate::common::binary::BinaryError;

impl From<BinaryError> for Error {
    fn from(err: BinaryError) -> Self {
        match err {
            BinaryError::InsufficientData {
                expected,
                available,
            } => Error::MalformedTable {
                table: "record",
                reason: format!("needs {} bytes, {} available", expected, available),
            },
            BinaryError::ParseError(msg) => Error::MalformedTable {
                table: "record",
                reason: msg,
            },
        }
    }
}
