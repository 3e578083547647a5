//! Bucket placement.
//!
//! Keys are placed with the classic base-31 polynomial string hash,
//! `h = Σ byte[i] * 31^(len-1-i)`, reduced modulo the bucket count. The
//! hash is unseeded, so placement and therefore iteration order are
//! reproducible across runs. Arithmetic wraps on overflow.

const BASE: usize = 31;

/// Base-31 polynomial hash over the key bytes (Horner form).
#[inline]
pub fn polynomial_hash(key: &str) -> usize {
    key.bytes()
        .fold(0usize, |h, b| h.wrapping_mul(BASE).wrapping_add(b as usize))
}

/// Bucket index of `key` in a table of `buckets` chains.
///
/// Always in `[0, buckets)`; the empty key lands in bucket 0.
#[inline]
pub fn bucket_index(key: &str, buckets: usize) -> usize {
    debug_assert!(buckets > 0);
    polynomial_hash(key) % buckets
}
