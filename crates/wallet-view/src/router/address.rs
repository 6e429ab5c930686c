//! Base58check address format.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of version byte plus 20-byte key/script hash.
const PAYLOAD_LEN: usize = 21;

fn checksum(payload: &[u8]) -> [u8; 4] {
    let digest = Sha256::digest(Sha256::digest(payload));
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Decode base58 text into bytes.
fn decode_base58(text: &str) -> Option<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::with_capacity(text.len());
    for c in text.bytes() {
        let mut carry = ALPHABET.iter().position(|&a| a == c)? as u32;
        for b in bytes.iter_mut().rev() {
            carry += u32::from(*b) * 58;
            *b = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let leading = text.bytes().take_while(|&c| c == b'1').count();
    let mut out = vec![0u8; leading];
    out.extend(bytes);
    Some(out)
}

/// Encode bytes as base58 text.
fn encode_base58(data: &[u8]) -> String {
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for &byte in data {
        let mut carry = u32::from(byte);
        for d in digits.iter_mut().rev() {
            carry += u32::from(*d) << 8;
            *d = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.insert(0, (carry % 58) as u8);
            carry /= 58;
        }
    }
    let leading = data.iter().take_while(|&&b| b == 0).count();
    let mut out = String::with_capacity(leading + digits.len());
    out.extend(std::iter::repeat('1').take(leading));
    out.extend(digits.iter().map(|&d| char::from(ALPHABET[d as usize])));
    out
}

/// Address rules of the active network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFormat {
    /// Accepted version bytes (key hash, script hash)
    pub versions: Vec<u8>,
}

impl AddressFormat {
    /// Create a format accepting the given version bytes.
    pub fn new(versions: impl Into<Vec<u8>>) -> Self {
        Self {
            versions: versions.into(),
        }
    }

    /// Check an address: base58 alphabet, checksum, length and version byte.
    #[must_use]
    pub fn is_valid(&self, address: &str) -> bool {
        let Some(raw) = decode_base58(address.trim()) else {
            return false;
        };
        if raw.len() != PAYLOAD_LEN + 4 {
            return false;
        }
        let (payload, check) = raw.split_at(PAYLOAD_LEN);
        checksum(payload) == check && self.versions.contains(&payload[0])
    }

    /// Build an address from a version byte and a 20-byte hash.
    #[must_use]
    pub fn encode(version: u8, hash: &[u8; 20]) -> String {
        let mut raw = Vec::with_capacity(PAYLOAD_LEN + 4);
        raw.push(version);
        raw.extend_from_slice(hash);
        let check = checksum(&raw);
        raw.extend_from_slice(&check);
        encode_base58(&raw)
    }
}
