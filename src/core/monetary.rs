// Monetary constants. All values are whole token units; there are no subunits.

/// Flat fee charged to the sender of every transfer and paid to the miner
pub const TRANSACTION_FEE: u64 = 250;

/// Maximum number of transfers mined into one block
pub const BLOCK_CAPACITY: usize = 5;

/// Tokens credited by a `grant` to seed a new account
pub const GRANT_AMOUNT: u64 = 2_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(TRANSACTION_FEE, 250);
        assert_eq!(BLOCK_CAPACITY, 5);
        assert!(GRANT_AMOUNT > TRANSACTION_FEE);
    }
}
