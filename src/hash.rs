//! The abstract hash capability the Hash_DRBG engine is built against.
//!
//! The engine never names a concrete hash algorithm directly; it is
//! generic over [`Hash`], a small streaming-hash capability modeled on the
//! `HASH_init`/`HASH_update`/`HASH_final` cycle of the reference
//! implementation. Concrete bindings for the seven algorithms the variant
//! table in the crate root names (SHA-1, SHA-224/256/384/512, SHA-512/224,
//! SHA-512/256) are provided by [`DigestHash`], a thin adapter over the
//! `digest::Digest` family.

use digest::{Digest, FixedOutputReset};

/// A streaming hash capability.
///
/// Implementations are used repeatedly through `reset -> update* ->
/// finalize_into` cycles on the same instance, mirroring the reference
/// implementation's `init`/`update`/`final` calls on one bound `HASH*`.
pub trait Hash {
    /// The digest length in bytes (20/28/32/48/64 depending on algorithm).
    fn output_len(&self) -> usize;
    /// Discards any buffered input and returns the hash to its initial state.
    fn reset(&mut self);
    /// Absorbs `data` into the hash state.
    fn update(&mut self, data: &[u8]);
    /// Finalizes the hash, writing `self.output_len()` bytes to `out`, and
    /// resets the hash so it is ready for another `update`/`finalize_into`
    /// cycle.
    ///
    /// # Panics
    /// Panics if `out` is shorter than `self.output_len()`.
    fn finalize_into(&mut self, out: &mut [u8]);
}

/// Adapts any `digest::Digest` implementation to the [`Hash`] trait.
pub struct DigestHash<D> {
    inner: D,
}

impl<D: Digest> DigestHash<D> {
    pub fn new() -> Self {
        DigestHash { inner: D::new() }
    }
}

impl<D: Digest> Default for DigestHash<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest + FixedOutputReset> Hash for DigestHash<D> {
    fn output_len(&self) -> usize {
        <D as Digest>::output_size()
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.inner);
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize_into(&mut self, out: &mut [u8]) {
        let digest = Digest::finalize_reset(&mut self.inner);
        out[..digest.len()].copy_from_slice(&digest);
    }
}

pub type Sha1 = DigestHash<sha1::Sha1>;
pub type Sha224 = DigestHash<sha2::Sha224>;
pub type Sha256 = DigestHash<sha2::Sha256>;
pub type Sha384 = DigestHash<sha2::Sha384>;
pub type Sha512 = DigestHash<sha2::Sha512>;
pub type Sha512_224 = DigestHash<sha2::Sha512_224>;
pub type Sha512_256 = DigestHash<sha2::Sha512_256>;
