//! A NIST SP 800-90A Rev. 1 `Hash_DRBG` implementation with a pluggable
//! entropy orchestrator.
//!
//! `Hash_DRBG` is the hash-function-based construction from SP 800-90A: a
//! deterministic random bit generator whose internal state (`V`, `C`, a
//! reseed counter) is carried forward through repeated applications of an
//! approved hash function. This crate provides:
//!
//! - [`hash_drbg::HashDrbgState`], the bare `Instantiate`/`Reseed`/`Generate`
//!   state machine, generic over a [`hash::Hash`] implementation;
//! - [`registry`], a static table of the seven supported variants (one per
//!   SHA-1/SHA-2 hash function) and lookup by security strength or id;
//! - [`entropy`], a source-composing orchestrator that accumulates bit
//!   credit across one or more entropy sources until a target is met;
//! - [`Random`], the facade tying a registry entry, an engine, and an
//!   entropy source list together into the caller-visible generator type,
//!   with [`rand_core::RngCore`] support for interop with the rest of the
//!   `rand` ecosystem.
//!
//! # Example
//! ```
//! use hash_drbg::{entropy, Random};
//!
//! let sources = entropy::default_sources();
//! let mut rng = Random::new(&sources, 128, 0).expect("SHA-1 variant is always registered");
//! rng.init(b"example-application").expect("entropy sources should be available");
//!
//! let mut out = [0u8; 32];
//! rng.generate(&mut out).expect("generation should succeed");
//! ```
//!
//! # Security considerations
//! `Random` zeroizes its internal `V`/`C`/`t` state and entropy scratch
//! buffer on drop (see [`hash_drbg::HashDrbgState`]'s and [`Random`]'s
//! `Drop` implementations), but it cannot zeroize copies made by the
//! entropy sources themselves or by the caller's own buffers. Callers
//! handling the output of [`Random::generate`] as key material are
//! responsible for zeroizing their own copies.

pub mod entropy;
mod errors;
mod facade;
pub mod hash;
pub mod hash_drbg;
pub mod registry;

pub use errors::DrbgError;
pub use facade::Random;

pub use entropy::{default_sources, generate as generate_entropy, EntropyFlags, EntropySource};
pub use registry::{lookup_by_bits, lookup_by_id, HashKind, VariantEntry, VARIANTS};
