use core::fmt;

/// Error conditions raised by the entropy orchestrator, the Hash_DRBG engine,
/// and the generator facade.
///
/// Variants correspond to the error taxonomy of the reference C
/// implementation (`RANDOM_ERR_*`): argument-shape errors, lookup errors,
/// resource errors, entropy errors, and the internally-recovered
/// reseed-required condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrbgError {
    /// No registry entry satisfies the selection criteria passed to
    /// [`Random::new`](crate::Random::new) or
    /// [`Random::new_by_id`](crate::Random::new_by_id).
    NotFound,
    /// A required argument was absent (e.g. an empty entropy source list).
    ParamNull,
    /// Dynamic memory allocation failed.
    ///
    /// Reserved for parity with the C API's error taxonomy. Rust's global
    /// allocator aborts the process on allocation failure rather than
    /// returning a [`Result`], so this variant is currently unreachable from
    /// safe code paths in this crate.
    Alloc,
    /// The entropy orchestrator could not accumulate the requested number of
    /// bits of entropy credit before every source failed in the same pass.
    Entropy,
    /// The Hash_DRBG engine's reseed counter reached its limit and a reseed
    /// is required before generation can continue.
    ///
    /// Recovered internally by
    /// [`Random::generate_with_input`](crate::Random::generate_with_input)
    /// and only escapes to a caller if the recovery reseed itself fails, in
    /// which case the reseed's own error is returned instead.
    ReseedRequired,
}

impl fmt::Display for DrbgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrbgError::NotFound => {
                write!(f, "no generator implementation satisfies the request")
            }
            DrbgError::ParamNull => write!(f, "a required argument was absent"),
            DrbgError::Alloc => write!(f, "memory allocation failed"),
            DrbgError::Entropy => {
                write!(f, "entropy orchestrator could not meet the requested bit target")
            }
            DrbgError::ReseedRequired => {
                write!(f, "reseed counter exhausted, reseed required")
            }
        }
    }
}

impl std::error::Error for DrbgError {}
