//! The caller-visible generator facade: selection, lifecycle, and the
//! request-chunking loop that transparently reseeds on counter exhaustion.

use crate::entropy::{self, EntropySource};
use crate::errors::DrbgError;
use crate::hash;
use crate::hash_drbg::HashDrbgState;
use crate::registry::{self, HashKind, VariantEntry};
use zeroize::Zeroize;

/// The bound Hash_DRBG engine for one of the seven variants in the
/// registry, dispatched by a `match` rather than a C-style vtable.
enum DrbgEngine {
    Sha1(HashDrbgState<hash::Sha1>),
    Sha224(HashDrbgState<hash::Sha224>),
    Sha256(HashDrbgState<hash::Sha256>),
    Sha384(HashDrbgState<hash::Sha384>),
    Sha512(HashDrbgState<hash::Sha512>),
    Sha512_224(HashDrbgState<hash::Sha512_224>),
    Sha512_256(HashDrbgState<hash::Sha512_256>),
}

impl DrbgEngine {
    fn new(kind: HashKind, seed_len: usize) -> Self {
        match kind {
            HashKind::Sha1 => DrbgEngine::Sha1(HashDrbgState::new(seed_len, hash::Sha1::new())),
            HashKind::Sha224 => {
                DrbgEngine::Sha224(HashDrbgState::new(seed_len, hash::Sha224::new()))
            }
            HashKind::Sha256 => {
                DrbgEngine::Sha256(HashDrbgState::new(seed_len, hash::Sha256::new()))
            }
            HashKind::Sha384 => {
                DrbgEngine::Sha384(HashDrbgState::new(seed_len, hash::Sha384::new()))
            }
            HashKind::Sha512 => {
                DrbgEngine::Sha512(HashDrbgState::new(seed_len, hash::Sha512::new()))
            }
            HashKind::Sha512_224 => {
                DrbgEngine::Sha512_224(HashDrbgState::new(seed_len, hash::Sha512_224::new()))
            }
            HashKind::Sha512_256 => {
                DrbgEngine::Sha512_256(HashDrbgState::new(seed_len, hash::Sha512_256::new()))
            }
        }
    }

    fn instantiate(&mut self, entropy: &[u8], personalization: &[u8]) {
        match self {
            DrbgEngine::Sha1(s) => s.instantiate(entropy, personalization),
            DrbgEngine::Sha224(s) => s.instantiate(entropy, personalization),
            DrbgEngine::Sha256(s) => s.instantiate(entropy, personalization),
            DrbgEngine::Sha384(s) => s.instantiate(entropy, personalization),
            DrbgEngine::Sha512(s) => s.instantiate(entropy, personalization),
            DrbgEngine::Sha512_224(s) => s.instantiate(entropy, personalization),
            DrbgEngine::Sha512_256(s) => s.instantiate(entropy, personalization),
        }
    }

    fn reseed(&mut self, entropy: &[u8], additional_input: &[u8]) {
        match self {
            DrbgEngine::Sha1(s) => s.reseed(entropy, additional_input),
            DrbgEngine::Sha224(s) => s.reseed(entropy, additional_input),
            DrbgEngine::Sha256(s) => s.reseed(entropy, additional_input),
            DrbgEngine::Sha384(s) => s.reseed(entropy, additional_input),
            DrbgEngine::Sha512(s) => s.reseed(entropy, additional_input),
            DrbgEngine::Sha512_224(s) => s.reseed(entropy, additional_input),
            DrbgEngine::Sha512_256(s) => s.reseed(entropy, additional_input),
        }
    }

    fn generate(
        &mut self,
        additional_input: Option<&[u8]>,
        out: &mut [u8],
        requested_len: usize,
    ) -> Result<usize, DrbgError> {
        match self {
            DrbgEngine::Sha1(s) => s.generate(additional_input, out, requested_len),
            DrbgEngine::Sha224(s) => s.generate(additional_input, out, requested_len),
            DrbgEngine::Sha256(s) => s.generate(additional_input, out, requested_len),
            DrbgEngine::Sha384(s) => s.generate(additional_input, out, requested_len),
            DrbgEngine::Sha512(s) => s.generate(additional_input, out, requested_len),
            DrbgEngine::Sha512_224(s) => s.generate(additional_input, out, requested_len),
            DrbgEngine::Sha512_256(s) => s.generate(additional_input, out, requested_len),
        }
    }

    #[cfg(test)]
    fn reseed_counter(&self) -> u64 {
        match self {
            DrbgEngine::Sha1(s) => s.reseed_counter(),
            DrbgEngine::Sha224(s) => s.reseed_counter(),
            DrbgEngine::Sha256(s) => s.reseed_counter(),
            DrbgEngine::Sha384(s) => s.reseed_counter(),
            DrbgEngine::Sha512(s) => s.reseed_counter(),
            DrbgEngine::Sha512_224(s) => s.reseed_counter(),
            DrbgEngine::Sha512_256(s) => s.reseed_counter(),
        }
    }

    #[cfg(test)]
    fn force_reseed_counter(&mut self, value: u64) {
        match self {
            DrbgEngine::Sha1(s) => s.set_reseed_counter(value),
            DrbgEngine::Sha224(s) => s.set_reseed_counter(value),
            DrbgEngine::Sha256(s) => s.set_reseed_counter(value),
            DrbgEngine::Sha384(s) => s.set_reseed_counter(value),
            DrbgEngine::Sha512(s) => s.set_reseed_counter(value),
            DrbgEngine::Sha512_224(s) => s.set_reseed_counter(value),
            DrbgEngine::Sha512_256(s) => s.set_reseed_counter(value),
        }
    }
}

/// A live Hash_DRBG generator instance: a registry entry, a bound engine, a
/// reference to an entropy source list, and a zeroizing scratch buffer for
/// freshly drawn entropy.
///
/// There is no separate `free`: tearing down a `Random` is just letting it
/// go out of scope. [`Drop`] zeroizes the entropy scratch buffer, and the
/// engine's own `Drop` (see [`HashDrbgState`]) zeroizes `V`, `C`, and `t`
/// unconditionally, even if construction never got past `new` — teardown is
/// safe on a partially-initialized instance by construction, not by a
/// caller-followed convention.
pub struct Random<'a> {
    entry: &'static VariantEntry,
    engine: DrbgEngine,
    entropy_src: &'a [EntropySource],
    entropy_buf: Vec<u8>,
}

impl<'a> Random<'a> {
    /// Selects the first registry entry whose security strength is at least
    /// `min_bits` and whose flags satisfy `required_flags`, and builds a
    /// generator around it bound to `src`.
    pub fn new(
        src: &'a [EntropySource],
        min_bits: u16,
        required_flags: u16,
    ) -> Result<Self, DrbgError> {
        if src.is_empty() {
            return Err(DrbgError::ParamNull);
        }
        let entry = registry::lookup_by_bits(min_bits, required_flags).ok_or(DrbgError::NotFound)?;
        Ok(Self::build(src, entry))
    }

    /// Selects the registry entry with the given `id`, subject to the same
    /// flag filter as [`Random::new`], and builds a generator around it.
    pub fn new_by_id(
        src: &'a [EntropySource],
        id: u8,
        required_flags: u16,
    ) -> Result<Self, DrbgError> {
        if src.is_empty() {
            return Err(DrbgError::ParamNull);
        }
        let entry = registry::lookup_by_id(id, required_flags).ok_or(DrbgError::NotFound)?;
        Ok(Self::build(src, entry))
    }

    fn build(src: &'a [EntropySource], entry: &'static VariantEntry) -> Self {
        let engine = DrbgEngine::new(entry.hash_kind, entry.seed_len);
        // `security_bits / 8 * 4` bytes, per the facade's entropy scratch
        // buffer convention — comfortably above the largest single draw
        // (`1.5 * security_bits` bits).
        let entropy_buf = vec![0u8; entry.security_bits as usize / 8 * 4];
        Random {
            entry,
            engine,
            entropy_src: src,
            entropy_buf,
        }
    }

    /// The bound variant's human-readable name.
    pub fn impl_name(&self) -> &'static str {
        self.entry.name
    }

    /// Seeds the generator with `1.5 * security_bits` bits of fresh entropy
    /// plus `personalization`.
    pub fn init(&mut self, personalization: &[u8]) -> Result<(), DrbgError> {
        let bits_requested = (self.entry.security_bits as u32) * 3 / 2;
        let elen = entropy::generate(self.entropy_src, bits_requested, &mut self.entropy_buf)?;
        self.engine.instantiate(&self.entropy_buf[..elen], personalization);
        self.entropy_buf[..elen].zeroize();
        Ok(())
    }

    /// Reseeds the generator with `security_bits` bits of fresh entropy plus
    /// `additional_input`.
    pub fn seed(&mut self, additional_input: &[u8]) -> Result<(), DrbgError> {
        let bits_requested = self.entry.security_bits as u32;
        let elen = entropy::generate(self.entropy_src, bits_requested, &mut self.entropy_buf)?;
        self.engine.reseed(&self.entropy_buf[..elen], additional_input);
        self.entropy_buf[..elen].zeroize();
        Ok(())
    }

    /// Fills `out` with `out.len()` bytes of generated data, reseeding
    /// transparently as needed.
    pub fn generate(&mut self, out: &mut [u8]) -> Result<(), DrbgError> {
        self.generate_with_input(&[], out)
    }

    /// Fills `out` with `out.len()` bytes of generated data, mixing in
    /// `additional_input` for this call, reseeding transparently as needed.
    ///
    /// Internally chunks the request across multiple engine `Generate`
    /// calls (each capped at `2^16` bytes). If the engine reports
    /// [`DrbgError::ReseedRequired`], this reseeds with fresh entropy only
    /// (no additional input) and retries the same chunk; any other error is
    /// returned immediately.
    pub fn generate_with_input(
        &mut self,
        additional_input: &[u8],
        out: &mut [u8],
    ) -> Result<(), DrbgError> {
        let ai: Option<&[u8]> = if additional_input.is_empty() {
            None
        } else {
            Some(additional_input)
        };
        let mut cursor = 0usize;
        let mut remaining = out.len();
        while remaining > 0 {
            match self.engine.generate(ai, &mut out[cursor..], remaining) {
                Ok(produced) => {
                    cursor += produced;
                    remaining -= produced;
                }
                Err(DrbgError::ReseedRequired) => {
                    self.seed(&[])?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn reseed_counter(&self) -> u64 {
        self.engine.reseed_counter()
    }

    #[cfg(test)]
    pub(crate) fn force_reseed_counter(&mut self, value: u64) {
        self.engine.force_reseed_counter(value);
    }
}

impl<'a> Drop for Random<'a> {
    fn drop(&mut self) {
        self.entropy_buf.zeroize();
    }
}

/// Integrates `Random` with the `rand` ecosystem.
///
/// `RngCore`'s methods are infallible, so `fill_bytes` panics if entropy
/// collection or an internal reseed fails — there is no other option within
/// the trait's signature. Prefer [`Random::generate`] directly when you want
/// a `Result`.
impl<'a> rand_core::RngCore for Random<'a> {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.generate(dst)
            .expect("entropy or reseed failure while generating random bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{EntropyFlags, EntropySource};

    // A scripted source returning a fixed byte pattern with ample credit,
    // for deterministic facade-level tests that don't depend on the host's
    // real entropy sources.
    fn filler(out: &mut [u8]) -> Option<(usize, u32)> {
        for b in out.iter_mut().take(2) {
            *b = 0xAB;
        }
        Some((2, 32))
    }

    fn fixed_source() -> EntropySource {
        EntropySource {
            name: "fixed",
            flags: EntropyFlags::NONE,
            func: filler,
        }
    }

    #[test]
    fn new_selects_first_registry_entry_meeting_bits() {
        let sources = [fixed_source()];
        let gen = Random::new(&sources, 128, 0).unwrap();
        assert_eq!(gen.impl_name(), "Hash_DRBG SHA1");
    }

    #[test]
    fn new_by_id_selects_exact_entry() {
        let sources = [fixed_source()];
        let gen = Random::new_by_id(&sources, 3, 0).unwrap();
        assert_eq!(gen.impl_name(), "Hash_DRBG SHA256");
    }

    #[test]
    fn new_by_id_not_found_for_unknown_id() {
        let sources = [fixed_source()];
        assert_eq!(
            Random::new_by_id(&sources, 200, 0).unwrap_err(),
            DrbgError::NotFound
        );
    }

    #[test]
    fn new_requires_a_nonempty_source_list() {
        let sources: [EntropySource; 0] = [];
        assert_eq!(
            Random::new(&sources, 128, 0).unwrap_err(),
            DrbgError::ParamNull
        );
    }

    #[test]
    fn init_then_generate_produces_requested_length() {
        let sources = [fixed_source()];
        let mut gen = Random::new_by_id(&sources, 3, 0).unwrap();
        gen.init(b"personalization").unwrap();
        let mut out = [0u8; 128];
        gen.generate(&mut out).unwrap();
        assert!(out.iter().any(|&b| b != 0));
    }

    #[test]
    fn determinism_same_entropy_and_personalization_same_output() {
        let sources = [fixed_source()];
        let mut a = Random::new_by_id(&sources, 3, 0).unwrap();
        let mut b = Random::new_by_id(&sources, 3, 0).unwrap();
        a.init(b"ctx").unwrap();
        b.init(b"ctx").unwrap();
        let mut out_a = [0u8; 64];
        let mut out_b = [0u8; 64];
        a.generate(&mut out_a).unwrap();
        b.generate(&mut out_b).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn chunking_above_2_16_produces_exact_length_in_one_call() {
        let sources = [fixed_source()];
        let mut gen = Random::new_by_id(&sources, 3, 0).unwrap();
        gen.init(b"").unwrap();
        let mut out = vec![0u8; 200_000];
        gen.generate(&mut out).unwrap();
        assert_eq!(gen.reseed_counter(), 1 + (200_000u64).div_ceil(1 << 16));
    }

    #[test]
    fn reseed_on_counter_exhaustion_recovers_transparently() {
        let sources = [fixed_source()];
        let mut gen = Random::new_by_id(&sources, 3, 0).unwrap();
        gen.init(b"").unwrap();
        gen.force_reseed_counter((1u64 << 48) - 1);
        let mut out = [0u8; 32];
        gen.generate(&mut out).unwrap();
        // The engine reseeded mid-call, so the post-call counter reflects
        // one successful Generate since that reseed.
        assert_eq!(gen.reseed_counter(), 2);
    }

    #[test]
    fn generate_with_empty_additional_input_matches_generate() {
        let sources = [fixed_source()];
        let mut a = Random::new_by_id(&sources, 3, 0).unwrap();
        let mut b = Random::new_by_id(&sources, 3, 0).unwrap();
        a.init(b"ctx").unwrap();
        b.init(b"ctx").unwrap();
        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.generate(&mut out_a).unwrap();
        b.generate_with_input(&[], &mut out_b).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn rng_core_fill_bytes_is_infallible_on_a_healthy_generator() {
        use rand_core::RngCore;
        let sources = [fixed_source()];
        let mut gen = Random::new_by_id(&sources, 3, 0).unwrap();
        gen.init(b"").unwrap();
        let mut out = [0u8; 16];
        gen.fill_bytes(&mut out);
        assert!(out.iter().any(|&b| b != 0));
        let _ = gen.next_u32();
        let _ = gen.next_u64();
    }
}
