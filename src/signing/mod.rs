//! Hashing, encoding and the vendor request-signing disciplines.
//!
//! Every routine here is deterministic for a fixed clock and nonce; time and
//! randomness only enter through [`SignContext`].

mod acs3;
mod canonical;
mod clock;
mod tc3;
mod volc;
mod wsse;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

pub use acs3::{ACS3_ALGORITHM, Acs3Signer};
pub use canonical::{
    CanonicalHeaders, canonical_headers, canonical_query, canonical_request, flatten_params,
};
pub use clock::{Clock, FixedClock, FixedNonce, NonceSource, RandomNonce, SignContext, SystemClock};
pub use tc3::{TC3_ALGORITHM, Tc3Signer};
pub use volc::{VOLC_ALGORITHM, VolcSigner};
pub use wsse::{WsseToken, base36};

/// Hex SHA-256 of the empty string.
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// HMAC-SHA256. Keys of any length are valid, so construction cannot fail.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take a key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

pub fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> String {
    hex::encode(hmac_sha256(key, data))
}

pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - _ . ~` is escaped,
/// so space becomes `%20`, `*` becomes `%2A` and `~` stays literal.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
