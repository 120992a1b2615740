use blake3::Hasher;

/// Full 32-byte BLAKE3 digest of a derived cache key.
#[inline]
pub fn hash_key(derived_key: &str) -> [u8; 32] {
    *blake3::hash(derived_key.as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for Bloom filter bit positions, where a rare collision only raises the
/// false-positive rate. Unlike `std::hash`, the output is identical across
/// processes and builds, so two workers marking the same key agree on its bits.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Returns the two independent 64-bit hashes used for Kirsch–Mitzenmacher
/// double hashing (`h1 + i * h2`).
#[inline]
pub fn hash_pair(data: &[u8]) -> (u64, u64) {
    let hash = blake3::hash(data);
    let bytes = hash.as_bytes();
    let h1 = u64::from_le_bytes(
        bytes[0..8]
            .try_into()
            .expect("BLAKE3 always produces at least 16 bytes"),
    );
    let h2 = u64::from_le_bytes(
        bytes[8..16]
            .try_into()
            .expect("BLAKE3 always produces at least 16 bytes"),
    );
    // An even step would only ever visit half the positions of an even-sized filter.
    (h1, h2 | 1)
}

/// Stable, process-independent digest for a `(namespace, raw_key)` pair,
/// rendered as lowercase hex.
///
/// The namespace is length-prefixed so `("ab", "c")` and `("a", "bc")` never collide.
pub fn record_digest(namespace: &str, raw_key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(&(namespace.len() as u64).to_le_bytes());
    hasher.update(namespace.as_bytes());
    hasher.update(raw_key.as_bytes());
    hasher.finalize().to_hex().to_string()
}
