// Identifier codec: converts between the store's `ObjectId` keys and the
// opaque string ids handed to the protocol layer.
//
// The external form is the 24-character lowercase hex rendering of the key.
// Uppercase hex is rejected so that every key has exactly one external id.

use bson::oid::ObjectId;

use crate::error::{AdapterError, AdapterResult};

/// Length of an encoded external identifier.
pub const EXTERNAL_ID_LEN: usize = 24;

/// Encode an internal key as an external identifier.
pub fn encode_id(key: &ObjectId) -> String {
    key.to_hex()
}

/// Decode an external identifier back into the internal key.
///
/// Fails with [`AdapterError::MalformedIdentifier`] unless `external` is
/// exactly 24 lowercase hex digits.
pub fn decode_id(external: &str) -> AdapterResult<ObjectId> {
    let well_formed = external.len() == EXTERNAL_ID_LEN
        && external
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));

    if !well_formed {
        return Err(AdapterError::MalformedIdentifier(external.to_string()));
    }

    ObjectId::parse_str(external)
        .map_err(|_| AdapterError::MalformedIdentifier(external.to_string()))
}
