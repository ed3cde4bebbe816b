/// Fee owed on a job, in base units. Integer arithmetic, floors toward
/// zero so the fee never exceeds the configured basis points.
pub fn fee_amount(total_base_units: u64, fee_bps: u64) -> u64 {
    (total_base_units as u128 * fee_bps as u128 / 10_000) as u64
}

/// Split an amount across `n` recipients, remainder on the first.
pub fn split_between(amount: u64, n: usize) -> Vec<u64> {
    if n == 0 {
        return Vec::new();
    }

    let n64 = n as u64;
    let share = amount / n64;
    let remainder = amount % n64;

    let mut shares = vec![share; n];
    shares[0] += remainder;
    shares
}
