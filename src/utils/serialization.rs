// Snapshot encoding on top of bincode 2.0
// Fixed-width integers keep every record the same size on disk, arrays are written raw
use crate::error::{BlockchainError, Result};

fn snapshot_config() -> impl bincode::config::Config {
    bincode::config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

/// Serialize data into the fixed-width snapshot layout
pub fn serialize<T: bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    bincode::encode_to_vec(data, snapshot_config())
        .map_err(|e| BlockchainError::Serialization(format!("Serialization failed: {e}")))
}

/// Deserialize a snapshot, rejecting truncated input and trailing garbage
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: bincode::Decode<()>,
{
    let (data, consumed) = bincode::decode_from_slice(bytes, snapshot_config())
        .map_err(|e| BlockchainError::Serialization(format!("Deserialization failed: {e}")))?;
    if consumed != bytes.len() {
        return Err(BlockchainError::Serialization(format!(
            "Trailing bytes after snapshot: {} of {} consumed",
            consumed,
            bytes.len()
        )));
    }
    Ok(data)
}
