//! Helper functions for decomposing a grid over a set of processes.

/// Factor `n` into `(n1, n2)` with `n1 * n2 = n` and `n1 >= n2`, as close to square as possible.
///
/// # Arguments
/// * `n` - Number of processes, must be positive.
pub fn bifactor(n: usize) -> (usize, usize) {
    let mut n2 = (n as f64).sqrt() as usize;
    // Guard against rounding in the square root
    while (n2 + 1) * (n2 + 1) <= n {
        n2 += 1;
    }
    while n2 > 1 && n % n2 != 0 {
        n2 -= 1;
    }
    let n2 = n2.max(1);
    (n / n2, n2)
}

/// Inclusive bounds of the share of `n` indices given to `index` out of `parts` contiguous,
/// balanced pieces. Shares may be empty when `parts > n`, returned as `hi = lo - 1`.
///
/// # Arguments
/// * `n` - Number of indices to divide.
/// * `parts` - Number of pieces.
/// * `index` - Piece requested, in `0..parts`.
pub fn split(n: usize, parts: usize, index: usize) -> (i64, i64) {
    let lo = (index * n / parts) as i64;
    let hi = ((index + 1) * n / parts) as i64 - 1;
    (lo, hi)
}
