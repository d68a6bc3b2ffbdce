//! Response decoder module
//!
//! Turns a response body into warehouse records. A page must decode to a
//! JSON array of objects; anything else is a decode error.

mod decoders;

pub use decoders::{JsonDecoder, RecordDecoder};

#[cfg(test)]
mod tests;
