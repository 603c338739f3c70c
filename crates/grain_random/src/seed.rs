use md5::{Digest, Md5};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::info;

/// The value all pseudo-randomness of a generator derives from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Seed {
    Int(u64),
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("byte {0} is outside 0..=255")]
    ByteOutOfRange(i64),
    #[error("negative seed {0} cannot be used")]
    Negative(i64),
}

impl Seed {
    /// Draws a fresh seed from the thread RNG. The value is logged so a run
    /// can be repeated.
    pub fn entropy() -> Self {
        let value = rand::random::<u64>();
        info!(seed = value, "no seed given, using entropy");
        Seed::Int(value)
    }

    pub fn from_i64(value: i64) -> Result<Self, SeedError> {
        if value < 0 {
            return Err(SeedError::Negative(value));
        }
        Ok(Seed::Int(value as u64))
    }

    pub fn from_byte_values(values: &[i64]) -> Result<Self, SeedError> {
        let bytes = values
            .iter()
            .map(|&v| u8::try_from(v).map_err(|_| SeedError::ByteOutOfRange(v)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Seed::Bytes(bytes))
    }

    /// Collapses the seed into the 64-bit value the random sources start from.
    ///
    /// Short byte strings are read little-endian; anything longer than eight
    /// bytes goes through MD5 first.
    pub fn to_u64(&self) -> u64 {
        match self {
            Seed::Int(value) => *value,
            Seed::Text(text) => bytes_to_u64(text.as_bytes()),
            Seed::Bytes(bytes) => bytes_to_u64(bytes),
        }
    }
}

fn bytes_to_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    if bytes.len() <= 8 {
        buf[..bytes.len()].copy_from_slice(bytes);
    } else {
        let mut hasher = Md5::new();
        hasher.update(bytes);
        let hash = hasher.finalize();
        buf.copy_from_slice(&hash[..8]);
    }
    u64::from_le_bytes(buf)
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Int(0)
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Seed::Int(value)
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Seed::Text(value.to_string())
    }
}

impl From<String> for Seed {
    fn from(value: String) -> Self {
        Seed::Text(value)
    }
}

impl From<Vec<u8>> for Seed {
    fn from(value: Vec<u8>) -> Self {
        Seed::Bytes(value)
    }
}

impl From<&[u8]> for Seed {
    fn from(value: &[u8]) -> Self {
        Seed::Bytes(value.to_vec())
    }
}

impl Display for Seed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Seed::Int(value) => write!(f, "{}", value),
            Seed::Text(text) => write!(f, "{:?}", text),
            Seed::Bytes(bytes) => write!(f, "{:02x?}", bytes),
        }
    }
}
