use chrono::Local;
use ring::digest::{Context, SHA256};

use crate::error::{BlockchainError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Width of the ctime-style timestamp stored in every block.
pub const TIMESTAMP_LEN: usize = 30;

/// Seconds since the Unix epoch, used to time mining passes.
pub fn current_timestamp() -> Result<u64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| BlockchainError::Io(format!("System time error: {e}")))?;
    Ok(duration.as_secs())
}

/// Local time rendered like C's `ctime` ("Thu Oct 16 09:12:44 2026\n"),
/// NUL-padded to a fixed width.
pub fn display_timestamp() -> [u8; TIMESTAMP_LEN] {
    let rendered = Local::now().format("%a %b %e %H:%M:%S %Y\n").to_string();
    let mut buf = [0u8; TIMESTAMP_LEN];
    let len = rendered.len().min(TIMESTAMP_LEN);
    buf[..len].copy_from_slice(&rendered.as_bytes()[..len]);
    buf
}

pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_ref());
    out
}
