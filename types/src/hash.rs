//! Claim identity key.
//!
//! Two claims describe the same remote transfer when they agree on sender,
//! recipient, txid, txts, amount, reward and data. The identity key is the
//! Blake2b-256 digest of those fields, each length-prefixed so that field
//! boundaries cannot be shifted.

use crate::{Address, Amount, Timestamp};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// Deduplication key of a claimed transfer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimId([u8; 32]);

impl ClaimId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn derive(
        sender: &Address,
        recipient: &Address,
        txid: &str,
        txts: Timestamp,
        amount: Amount,
        reward: Amount,
        data: &str,
    ) -> Self {
        let mut hasher = Blake2b256::new();
        for field in [sender.as_str(), recipient.as_str(), txid] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(txts.as_secs().to_be_bytes());
        hasher.update(amount.to_be_bytes());
        hasher.update(reward.to_be_bytes());
        hasher.update((data.len() as u64).to_be_bytes());
        hasher.update(data.as_bytes());
        let result = hasher.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Self(output)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Hex text in human-readable formats (JSON, TOML), raw bytes otherwise.
impl Serialize for ClaimId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(&self.0))
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ClaimId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode32(&s)
                .map(Self)
                .ok_or_else(|| serde::de::Error::custom("expected 64 hex characters"))
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn decode32(s: &str) -> Option<[u8; 32]> {
        if s.len() != 64 || !s.is_ascii() {
            return None;
        }
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16).ok()?;
        }
        Some(out)
    }
}
