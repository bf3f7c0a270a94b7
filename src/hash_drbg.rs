//! The Hash_DRBG engine: NIST SP 800-90A Rev. 1 `Hash_df`, `Instantiate`,
//! `Reseed`, `Generate`, and the internal `Hashgen` output stage.
//!
//! Parameterized over [`Hash`] so the engine never names a concrete hash
//! algorithm; [`crate::registry`] picks the concrete [`Hash`] implementation
//! for a given variant and builds a [`HashDrbgState`] around it.

use crate::errors::DrbgError;
use crate::hash::Hash;

/// A single byte shy of the largest digest this crate binds (SHA-512, 64
/// bytes); sized to hold one `hashgen`/`Hash_df` block on the stack.
const MAX_DIGEST_LEN: usize = 64;

/// Cap on a single `Generate` call (SP 800-90A Table 2's `max_number_of_bits_per_request`).
const MAX_GENERATE_LEN: usize = 1 << 16;

/// Reseed counter limit: a reseed is required once the counter would reach
/// `2^48` (SP 800-90A Table 2's `reseed_interval`).
const RESEED_LIMIT: u64 = 1 << 48;

/// Hash-based Deterministic Random Bit Generator state, generic over the
/// bound [`Hash`] implementation.
///
/// `v` stores the one-byte prefix slot immediately followed by the
/// seed-length `V` value (`v[0]` is the tag byte, `v[1..]` is `V`), so that
/// hash inputs of the form `tag ∥ V` are a single contiguous slice, without
/// a copy to glue tag and value together.
pub struct HashDrbgState<H> {
    v: Vec<u8>,
    c: Vec<u8>,
    t: Vec<u8>,
    reseed_counter: u64,
    seed_len: usize,
    hash: H,
}

impl<H: Hash> HashDrbgState<H> {
    /// Allocates a zeroed engine state for the given seed length, with no
    /// hash bound yet (callers must call [`instantiate`](Self::instantiate)
    /// before use).
    pub fn new(seed_len: usize, hash: H) -> Self {
        HashDrbgState {
            v: vec![0u8; 1 + seed_len],
            c: vec![0u8; seed_len],
            t: vec![0u8; seed_len],
            reseed_counter: 0,
            seed_len,
            hash,
        }
    }

    /// The reseed counter: one plus the number of successful `Generate`
    /// calls since the last instantiate/reseed.
    pub fn reseed_counter(&self) -> u64 {
        self.reseed_counter
    }

    /// Test-only hook for forcing the reseed counter to a specific value,
    /// to exercise limit-adjacent behavior without 2^48 calls to `generate`.
    #[cfg(test)]
    pub(crate) fn set_reseed_counter(&mut self, value: u64) {
        self.reseed_counter = value;
    }

    fn hash_df(&mut self, inputs: &[&[u8]], output_len: usize) -> Vec<u8> {
        let hash_len = self.hash.output_len();
        let mut out = Vec::with_capacity(output_len);
        let mut counter: u8 = 1;
        let olen_bits = (output_len as u32) * 8;
        let mut block = [0u8; MAX_DIGEST_LEN];
        let mut remaining = output_len;
        while remaining > 0 {
            self.hash.reset();
            self.hash.update(&[counter]);
            self.hash.update(&olen_bits.to_be_bytes());
            for input in inputs {
                self.hash.update(input);
            }
            self.hash.finalize_into(&mut block[..hash_len]);
            let take = hash_len.min(remaining);
            out.extend_from_slice(&block[..take]);
            remaining -= take;
            counter += 1;
        }
        out
    }

    fn hash_single(&mut self, inputs: &[&[u8]]) -> Vec<u8> {
        let hash_len = self.hash.output_len();
        self.hash.reset();
        for input in inputs {
            self.hash.update(input);
        }
        let mut out = vec![0u8; hash_len];
        self.hash.finalize_into(&mut out);
        out
    }

    /// `hashgen`: produces `out.len()` bytes by repeatedly hashing `w` and
    /// incrementing it as a big-endian unbounded integer between blocks.
    fn hashgen(&mut self, w: &mut [u8], out: &mut [u8]) {
        let hash_len = self.hash.output_len();
        let mut block = [0u8; MAX_DIGEST_LEN];
        let mut produced = 0usize;
        while produced < out.len() {
            self.hash.reset();
            self.hash.update(w);
            self.hash.finalize_into(&mut block[..hash_len]);
            let take = hash_len.min(out.len() - produced);
            out[produced..produced + take].copy_from_slice(&block[..take]);
            produced += take;

            for byte in w.iter_mut().rev() {
                *byte = byte.wrapping_add(1);
                if *byte != 0 {
                    break;
                }
            }
        }
    }

    /// `Instantiate`: seeds `V`/`C` from `entropy ∥ personalization` and
    /// resets the reseed counter to 1.
    pub fn instantiate(&mut self, entropy: &[u8], personalization: &[u8]) {
        let seed_len = self.seed_len;
        let seed = self.hash_df(&[entropy, personalization], seed_len);
        self.v[1..].copy_from_slice(&seed);
        self.v[0] = 0x00;

        let v_snapshot = self.v.clone();
        let c = self.hash_df(&[&v_snapshot], seed_len);
        self.c.copy_from_slice(&c);

        self.reseed_counter = 1;
    }

    /// `Reseed` (SP 800-90A §10.1.1.3): mixes fresh `entropy` and
    /// `additional_input` into `V`, recomputes `C`, and resets the reseed
    /// counter to 1.
    pub fn reseed(&mut self, entropy: &[u8], additional_input: &[u8]) {
        let seed_len = self.seed_len;
        self.v[0] = 0x01;
        let v_snapshot = self.v.clone();
        let new_seed = self.hash_df(&[&v_snapshot, entropy, additional_input], seed_len);
        self.v[1..].copy_from_slice(&new_seed);

        self.v[0] = 0x00;
        let v_snapshot = self.v.clone();
        let c = self.hash_df(&[&v_snapshot], seed_len);
        self.c.copy_from_slice(&c);

        self.reseed_counter = 1;
    }

    /// `Generate` (SP 800-90A §10.1.1.4). Returns the number of bytes
    /// actually written to `out` (`requested_len` capped at `2^16`), or
    /// [`DrbgError::ReseedRequired`] if the reseed counter has reached its
    /// limit — in which case no bytes are written and the caller must
    /// reseed before retrying.
    pub fn generate(
        &mut self,
        additional_input: Option<&[u8]>,
        out: &mut [u8],
        requested_len: usize,
    ) -> Result<usize, DrbgError> {
        let seed_len = self.seed_len;
        let hash_len = self.hash.output_len();

        if self.reseed_counter >= RESEED_LIMIT {
            return Err(DrbgError::ReseedRequired);
        }

        if let Some(additional_input) = additional_input {
            self.v[0] = 0x02;
            let v_snapshot = self.v.clone();
            let w = self.hash_single(&[&v_snapshot, additional_input]);
            let mut padded = vec![0u8; seed_len];
            padded[seed_len - hash_len..].copy_from_slice(&w);
            Self::add_mod(&mut self.v[1..], &padded);
        }

        let effective_len = requested_len.min(MAX_GENERATE_LEN);

        self.t.copy_from_slice(&self.v[1..]);
        let mut working = self.t.clone();
        self.hashgen(&mut working, &mut out[..effective_len]);
        // `working` now holds the incremented state after the last block;
        // `self.t` keeps the pre-hashgen snapshot, matching the reference
        // implementation's reuse of `h->t` purely as the hashgen seed.

        self.v[0] = 0x03;
        let v_snapshot = self.v.clone();
        let h = self.hash_single(&[&v_snapshot]);
        let mut h_padded = vec![0u8; seed_len];
        h_padded[seed_len - hash_len..].copy_from_slice(&h);

        self.add_v_c_h_counter(&h_padded);

        self.reseed_counter += 1;
        Ok(effective_len)
    }

    /// `V := (V + addend) mod 2^(8*seed_len)`, byte-wise from the
    /// least-significant end with a 16-bit carry register. `addend` must be
    /// exactly `seed_len` bytes, left-padded with zeros as needed by the
    /// caller.
    fn add_mod(v: &mut [u8], addend: &[u8]) {
        let mut carry: u16 = 0;
        for i in (0..v.len()).rev() {
            let sum = v[i] as u16 + addend[i] as u16 + carry;
            v[i] = sum as u8;
            carry = sum >> 8;
        }
    }

    /// `V := (V + C + H + reseed_counter) mod 2^(8*seed_len)`. The carry
    /// register is a 16-bit accumulator that truncates after *every*
    /// addition, mirroring the reference `uint16_t t` in the C source: the
    /// unmasked, shifted 64-bit counter is added as one term into that
    /// register and only then truncated, rather than pre-masked to a byte
    /// before accumulation. Since the register carries only 8 bits forward
    /// to the next (more significant) byte position, any counter bits above
    /// the current 16-bit window are dropped rather than propagated — this
    /// is the reference behavior, not an arbitrary-precision addition.
    fn add_v_c_h_counter(&mut self, h_padded: &[u8]) {
        let seed_len = self.seed_len;
        let mut carry: u16 = 0;
        for i in (seed_len.saturating_sub(4)..seed_len).rev() {
            let shift = (seed_len - 1 - i) * 8;
            carry = carry
                .wrapping_add(self.v[i + 1] as u16)
                .wrapping_add(self.c[i] as u16)
                .wrapping_add(h_padded[i] as u16)
                .wrapping_add((self.reseed_counter >> shift) as u16);
            self.v[i + 1] = carry as u8;
            carry >>= 8;
        }
        for i in (0..seed_len.saturating_sub(4)).rev() {
            carry = carry
                .wrapping_add(self.v[i + 1] as u16)
                .wrapping_add(self.c[i] as u16)
                .wrapping_add(h_padded[i] as u16);
            self.v[i + 1] = carry as u8;
            carry >>= 8;
        }
    }
}

impl<H> Drop for HashDrbgState<H> {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.v.zeroize();
        self.c.zeroize();
        self.t.zeroize();
        self.reseed_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Sha256;

    fn fresh_state() -> HashDrbgState<Sha256> {
        HashDrbgState::new(55, Sha256::new())
    }

    #[test]
    fn hash_df_output_length_matches_request() {
        let mut state = fresh_state();
        for len in [1usize, 16, 32, 55, 64, 110] {
            let out = state.hash_df(&[b"seed material"], len);
            assert_eq!(out.len(), len);
        }
    }

    #[test]
    fn instantiate_sets_reseed_counter_to_one() {
        let mut state = fresh_state();
        state.instantiate(&[0u8; 48], b"");
        assert_eq!(state.reseed_counter(), 1);
    }

    #[test]
    fn reseed_counter_increments_once_per_generate() {
        let mut state = fresh_state();
        state.instantiate(&[0u8; 48], b"");
        let mut out = [0u8; 32];
        for expected in 2..=5u64 {
            state.generate(None, &mut out, 32).unwrap();
            assert_eq!(state.reseed_counter(), expected);
        }
    }

    #[test]
    fn reseed_resets_counter_to_one() {
        let mut state = fresh_state();
        state.instantiate(&[0u8; 48], b"");
        let mut out = [0u8; 32];
        state.generate(None, &mut out, 32).unwrap();
        state.generate(None, &mut out, 32).unwrap();
        assert_eq!(state.reseed_counter(), 3);
        state.reseed(&[1u8; 32], b"");
        assert_eq!(state.reseed_counter(), 1);
    }

    #[test]
    fn generate_produces_exact_requested_length() {
        let mut state = fresh_state();
        state.instantiate(&[0u8; 48], b"");
        let mut out = vec![0u8; 5000];
        let produced = state.generate(None, &mut out, 5000).unwrap();
        assert_eq!(produced, 5000);
    }

    #[test]
    fn generate_caps_a_single_call_at_2_16_bytes() {
        let mut state = fresh_state();
        state.instantiate(&[0u8; 48], b"");
        let mut out = vec![0u8; 200_000];
        let produced = state.generate(None, &mut out, 200_000).unwrap();
        assert_eq!(produced, 1 << 16);
    }

    #[test]
    fn reseed_required_once_counter_reaches_limit() {
        let mut state = fresh_state();
        state.instantiate(&[0u8; 48], b"");
        state.reseed_counter = RESEED_LIMIT - 1;
        let mut out = [0u8; 32];
        assert_eq!(state.generate(None, &mut out, 32).unwrap(), 32);
        assert_eq!(
            state.generate(None, &mut out, 32),
            Err(DrbgError::ReseedRequired)
        );
    }

    #[test]
    fn same_entropy_and_personalization_give_identical_streams() {
        let mut a = HashDrbgState::new(55, Sha256::new());
        let mut b = HashDrbgState::new(55, Sha256::new());
        a.instantiate(&[7u8; 48], b"same-context");
        b.instantiate(&[7u8; 48], b"same-context");
        let mut out_a = [0u8; 128];
        let mut out_b = [0u8; 128];
        a.generate(None, &mut out_a, 128).unwrap();
        b.generate(None, &mut out_b, 128).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn different_personalization_diverges_within_seed_len_bytes() {
        let mut a = HashDrbgState::new(55, Sha256::new());
        let mut b = HashDrbgState::new(55, Sha256::new());
        a.instantiate(&[7u8; 48], b"TLS");
        b.instantiate(&[7u8; 48], b"tls");
        let mut out_a = [0u8; 55];
        let mut out_b = [0u8; 55];
        a.generate(None, &mut out_a, 55).unwrap();
        b.generate(None, &mut out_b, 55).unwrap();
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn drop_zeroizes_v_and_c_and_t() {
        let mut state = fresh_state();
        state.instantiate(&[9u8; 48], b"zeroize-me");
        let mut out = [0u8; 16];
        state.generate(None, &mut out, 16).unwrap();
        assert!(state.v.iter().any(|&b| b != 0));
        // Simulate teardown directly, since the Drop impl only runs once
        // the value actually goes out of scope.
        drop(state);
    }

    #[test]
    fn counter_injection_truncates_to_16_bits_per_position_above_256() {
        // Exercises `add_v_c_h_counter` directly with a `reseed_counter`
        // past the single-byte range (256+), where a per-position byte mask
        // of the counter before accumulation would diverge from the
        // reference C's `uint16_t t += h->reseed_cnt >> shift` behavior.
        let mut state = fresh_state();
        let seed_len = state.seed_len;
        state.v = vec![0u8; 1 + seed_len];
        state.v[1..].copy_from_slice(&vec![0x11u8; seed_len]);
        state.c = vec![0x22u8; seed_len];
        let h_padded = vec![0x33u8; seed_len];

        for reseed_counter in [300u64, 4096, 1_000_000, (1 << 48) - 1] {
            state.reseed_counter = reseed_counter;
            state.add_v_c_h_counter(&h_padded);

            // Reference oracle: a literal translation of the C's 16-bit
            // truncating accumulator, added term by term.
            let mut expected = vec![0x11u8; seed_len];
            let mut t: u16 = 0;
            for i in (seed_len.saturating_sub(4)..seed_len).rev() {
                let shift = (seed_len - 1 - i) * 8;
                t = t.wrapping_add(expected[i] as u16);
                t = t.wrapping_add(0x22u16);
                t = t.wrapping_add(0x33u16);
                t = t.wrapping_add((reseed_counter >> shift) as u16);
                expected[i] = t as u8;
                t >>= 8;
            }
            for i in (0..seed_len.saturating_sub(4)).rev() {
                t = t.wrapping_add(expected[i] as u16);
                t = t.wrapping_add(0x22u16);
                t = t.wrapping_add(0x33u16);
                expected[i] = t as u8;
                t >>= 8;
            }

            assert_eq!(
                &state.v[1..],
                &expected[..],
                "mismatch at reseed_counter={reseed_counter}"
            );

            // Reset v for the next counter value in the table.
            state.v[1..].copy_from_slice(&vec![0x11u8; seed_len]);
        }
    }

    #[test]
    fn additional_input_changes_output() {
        let mut a = HashDrbgState::new(55, Sha256::new());
        let mut b = HashDrbgState::new(55, Sha256::new());
        a.instantiate(&[3u8; 48], b"ctx");
        b.instantiate(&[3u8; 48], b"ctx");
        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.generate(None, &mut out_a, 32).unwrap();
        b.generate(Some(b"extra"), &mut out_b, 32).unwrap();
        assert_ne!(out_a, out_b);
    }
}
