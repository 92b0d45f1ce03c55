//! Binomial-coefficient arithmetic and the bijection between integer ranks and $`k`$-subsets.
//!
//! All $`k`$-subsets of $`\{0, \ldots, n - 1\}`$ are ordered lexicographically by their
//! increasingly sorted elements, so that for $`n = 4`$ and $`k = 2`$ the order is
//! `[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]`. The position of a subset in this order is its
//! *rank*.

use std::ops::Range;

use crate::error::{invalid_arg, resource_exceeded, DociError};


/// Computes the number of $`k`$-subsets of a set of $`n`$ items, accepting signed arguments.
///
/// # Arguments
///
/// * `n` - The number of items.
/// * `k` - The number of items chosen.
///
/// # Returns
///
/// The binomial coefficient $`\binom{n}{k}`$.
///
/// # Errors
///
/// [`DociError::InvalidArgument`] if `n < 0`, `k < 0` or `k > n`, and
/// [`DociError::ResourceExceeded`] if the coefficient does not fit in a `u64`.
pub fn choose(n: i64, k: i64) -> Result<u64, DociError> {
    if n < 0 || k < 0 {
        invalid_arg!("Binomial coefficient arguments must be non-negative, got n = {n}, k = {k}.");
    }
    let n = usize::try_from(n).map_err(|_| {
        DociError::ResourceExceeded(format!("`{n}` cannot be represented as `usize`."))
    })?;
    let k = usize::try_from(k).map_err(|_| {
        DociError::ResourceExceeded(format!("`{k}` cannot be represented as `usize`."))
    })?;
    binomial(n, k)
}

/// Computes the binomial coefficient $`\binom{n}{k}`$ with checked arithmetic.
///
/// The coefficient is built up as $`\binom{n-k+i}{i}`$ for $`i = 1, \ldots, \min(k, n-k)`$. Every
/// partial value is a binomial coefficient no larger than the final one, and each of them is
/// checked against the range of `u64`.
///
/// # Errors
///
/// [`DociError::InvalidArgument`] if `k > n`, and [`DociError::ResourceExceeded`] if the
/// coefficient or any partial value does not fit in a `u64`.
pub fn binomial(n: usize, k: usize) -> Result<u64, DociError> {
    if k > n {
        invalid_arg!("Cannot choose {k} items out of {n}.");
    }
    let k = k.min(n - k);
    let mut value: u128 = 1;
    for i in 1..=k {
        value = value.checked_mul((n - k + i) as u128).ok_or_else(|| {
            DociError::ResourceExceeded(format!(
                "Partial product for C({n}, {k}) overflows during evaluation."
            ))
        })? / (i as u128);
        if value > u128::from(u64::MAX) {
            resource_exceeded!("C({n}, {k}) exceeds the representable range of `u64`.");
        }
    }
    u64::try_from(value)
        .map_err(|_| DociError::ResourceExceeded(format!("C({n}, {k}) exceeds `u64`.")))
}

/// Writes the $`k`$-subset of rank `rank` into `combination` without allocating, where $`k`$ is
/// the length of `combination`.
///
/// The subset is built greedily: at each position, candidates are skipped for as long as the
/// number of subsets beginning with them is not larger than the remaining rank.
///
/// # Errors
///
/// [`DociError::InvalidArgument`] if `k > n` or `rank` $`\ge \binom{n}{k}`$.
pub fn fill_combination(rank: u64, n: usize, combination: &mut [usize]) -> Result<(), DociError> {
    let k = combination.len();
    let total = binomial(n, k)?;
    if rank >= total {
        invalid_arg!("Rank {rank} is out of range for C({n}, {k}) = {total}.");
    }
    let mut remaining = rank;
    let mut candidate = 0;
    for position in 0..k {
        loop {
            let count = binomial(n - candidate - 1, k - position - 1)?;
            if remaining < count {
                break;
            }
            remaining -= count;
            candidate += 1;
        }
        combination[position] = candidate;
        candidate += 1;
    }
    Ok(())
}

/// Converts a rank into the corresponding $`k`$-subset of $`\{0, \ldots, n - 1\}`$.
///
/// # Arguments
///
/// * `rank` - The rank, which must lie in $`[0, \binom{n}{k})`$.
/// * `n` - The number of items.
/// * `k` - The number of items chosen.
///
/// # Returns
///
/// The increasingly sorted subset.
pub fn rank_to_combination(rank: u64, n: usize, k: usize) -> Result<Vec<usize>, DociError> {
    let mut combination = vec![0; k];
    fill_combination(rank, n, &mut combination)?;
    Ok(combination)
}

/// Converts a $`k`$-subset of $`\{0, \ldots, n - 1\}`$ into its rank. This is the exact inverse
/// of [`rank_to_combination`].
///
/// # Errors
///
/// [`DociError::InvalidArgument`] if `combination` is not strictly increasing or contains an
/// element not smaller than `n`, and [`DociError::ResourceExceeded`] if the rank overflows `u64`.
pub fn combination_to_rank(combination: &[usize], n: usize) -> Result<u64, DociError> {
    let k = combination.len();
    if combination.windows(2).any(|pair| pair[0] >= pair[1]) {
        invalid_arg!("Combination `{combination:?}` is not strictly increasing.");
    }
    if combination.last().is_some_and(|&last| last >= n) {
        invalid_arg!("Combination `{combination:?}` contains items outside [0, {n}).");
    }
    let mut rank = 0u64;
    let mut candidate = 0;
    for (position, &item) in combination.iter().enumerate() {
        while candidate < item {
            rank = rank
                .checked_add(binomial(n - candidate - 1, k - position - 1)?)
                .ok_or_else(|| {
                    DociError::ResourceExceeded(format!(
                        "The rank of `{combination:?}` among the {k}-subsets of {n} items \
                        overflows `u64`."
                    ))
                })?;
            candidate += 1;
        }
        candidate = item + 1;
    }
    Ok(rank)
}

/// Advances `combination` in place to its lexicographic successor among the $`k`$-subsets of
/// $`\{0, \ldots, n - 1\}`$.
///
/// # Returns
///
/// `false` if `combination` was already the last subset, in which case it is left unchanged.
pub fn next_combination(combination: &mut [usize], n: usize) -> bool {
    let k = combination.len();
    if k > n {
        return false;
    }
    for i in (0..k).rev() {
        if combination[i] < n - k + i {
            combination[i] += 1;
            for j in (i + 1)..k {
                combination[j] = combination[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Splits the rank interval $`[0, \text{total})`$ into at most `nparts` contiguous, non-empty
/// ranges, in increasing order.
pub fn partition_ranks(total: u64, nparts: usize) -> Vec<Range<u64>> {
    let nparts = u64::try_from(nparts.max(1)).unwrap_or(u64::MAX);
    let chunk = total / nparts + u64::from(total % nparts != 0);
    if chunk == 0 {
        return Vec::new();
    }
    (0..total)
        .step_by(usize::try_from(chunk).unwrap_or(usize::MAX))
        .map(|start| start..start.saturating_add(chunk).min(total))
        .collect()
}
