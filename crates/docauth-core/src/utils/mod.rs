// Utility functions: identifier codec.

pub mod id;

pub use id::{decode_id, encode_id};
