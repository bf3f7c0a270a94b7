//! The entropy orchestrator: composes a list of entropy sources into a
//! single draw producing at least a requested number of entropy bits.
//!
//! Sources are tried in declared order, repeatedly, until the accumulated
//! bit credit meets the target or a full pass collects nothing new.

use crate::errors::DrbgError;

/// Flag bits governing how an [`EntropySource`] participates in a draw.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EntropyFlags(u8);

impl EntropyFlags {
    /// No flags set.
    pub const NONE: EntropyFlags = EntropyFlags(0);
    /// Use this source at most once per [`generate`] call, after it first
    /// succeeds.
    pub const ONCE: EntropyFlags = EntropyFlags(0x01);
    /// Skip this source on any pass where an earlier source already
    /// succeeded.
    pub const NO_PREV: EntropyFlags = EntropyFlags(0x02);

    pub const fn contains(self, other: EntropyFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for EntropyFlags {
    type Output = EntropyFlags;
    fn bitor(self, rhs: EntropyFlags) -> EntropyFlags {
        EntropyFlags(self.0 | rhs.0)
    }
}

/// A single entropy source.
///
/// `func` writes up to a small number of bytes to its output slice, returning
/// `Some((bytes_written, bit_credit))` on success or `None` if no entropy
/// was available this call (e.g. a non-blocking kernel RNG device with
/// nothing ready).
#[derive(Clone, Copy)]
pub struct EntropySource {
    pub name: &'static str,
    pub flags: EntropyFlags,
    pub func: fn(&mut [u8]) -> Option<(usize, u32)>,
}

/// Draws entropy from `sources` until `bits_requested` bits of credit have
/// accumulated, writing concatenated raw bytes into `out`.
///
/// Returns the number of bytes written. `out` must be large enough to hold
/// the worst case (every source's maximum per-call byte count, times the
/// number of passes needed) — the facade sizes its entropy scratch buffer
/// as `security_bits / 8 * 4` bytes for this reason.
///
/// # Algorithm
/// One or more passes over `sources` in declared order, until either the
/// accumulated bit credit meets `bits_requested` (success) or a full pass
/// makes no source succeed (failure). Within a pass:
/// - a source already satisfied because it is `ONCE`-flagged is skipped;
/// - a `NO_PREV`-flagged source is skipped if an earlier source in the same
///   pass already succeeded;
/// - on success, the source's credit is added to the running total and, if
///   `ONCE`-flagged, it is marked as done for the remainder of this call.
pub fn generate(
    sources: &[EntropySource],
    bits_requested: u32,
    out: &mut [u8],
) -> Result<usize, DrbgError> {
    if sources.is_empty() {
        return Err(DrbgError::ParamNull);
    }
    assert!(
        sources.len() <= 64,
        "entropy orchestrator supports at most 64 sources"
    );

    let mut accumulated_bits: u32 = 0;
    let mut once_done: u64 = 0;
    let mut cursor = 0usize;

    loop {
        let mut any_succeeded = false;
        for (i, source) in sources.iter().enumerate() {
            if once_done & (1 << i) != 0 {
                continue;
            }
            if source.flags.contains(EntropyFlags::NO_PREV) && any_succeeded {
                continue;
            }
            let Some((len, bits)) = (source.func)(&mut out[cursor..]) else {
                continue;
            };
            cursor += len;
            accumulated_bits += bits;
            if source.flags.contains(EntropyFlags::ONCE) {
                once_done |= 1 << i;
            }
            any_succeeded = true;
        }
        if accumulated_bits >= bits_requested {
            return Ok(cursor);
        }
        if !any_succeeded {
            return Err(DrbgError::Entropy);
        }
    }
}

/// Reads two bytes from the OS kernel random number generator.
///
/// Treated as a non-blocking read: any error (including a transient
/// would-block condition on platforms that surface one) is reported as this
/// source not succeeding on this call, rather than as a hard error.
#[cfg(feature = "getrandom")]
pub fn kernel_random(out: &mut [u8]) -> Option<(usize, u32)> {
    let mut buf = [0u8; 2];
    getrandom::fill(&mut buf).ok()?;
    out[..2].copy_from_slice(&buf);
    Some((2, 12))
}

/// Reads two bytes from the RDRAND instruction on x86_64.
///
/// Retries up to 10 times, matching `RDRAND_RETRY` in the reference
/// implementation.
#[cfg(all(feature = "hardware", target_arch = "x86_64"))]
pub fn hardware_rdrand(out: &mut [u8]) -> Option<(usize, u32)> {
    const RDRAND_RETRY: u8 = 10;
    let mut value: u16 = 0;
    for _ in 0..RDRAND_RETRY {
        let ok = unsafe { std::arch::x86_64::_rdrand16_step(&mut value) };
        if ok == 1 {
            out[..2].copy_from_slice(&value.to_ne_bytes());
            return Some((2, 9));
        }
    }
    None
}

/// Reads the low 16 bits of the CPU cycle counter on x86_64.
#[cfg(all(feature = "hardware", target_arch = "x86_64"))]
pub fn hardware_rdtsc(out: &mut [u8]) -> Option<(usize, u32)> {
    let cycles = unsafe { std::arch::x86_64::_rdtsc() };
    out[..2].copy_from_slice(&(cycles as u16).to_ne_bytes());
    Some((2, 5))
}

/// Reads the microsecond-of-second component of the wall clock.
#[cfg(feature = "std")]
pub fn wall_clock_micros(out: &mut [u8]) -> Option<(usize, u32)> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let usec = (now.subsec_micros() & 0xFFFF) as u16;
    out[..2].copy_from_slice(&usec.to_ne_bytes());
    Some((2, 4))
}

/// The default entropy source list, in declared order: the kernel RNG
/// device first (if the `getrandom` feature is enabled), then the hardware
/// sources (if the `hardware` feature is enabled on x86_64), then the
/// wall-clock source last.
pub fn default_sources() -> Vec<EntropySource> {
    #[allow(unused_mut)]
    let mut sources = Vec::new();

    #[cfg(feature = "getrandom")]
    sources.push(EntropySource {
        name: "kernel random device",
        flags: EntropyFlags::NONE,
        func: kernel_random,
    });

    #[cfg(all(feature = "hardware", target_arch = "x86_64"))]
    {
        sources.push(EntropySource {
            name: "RDRAND",
            flags: EntropyFlags::NO_PREV,
            func: hardware_rdrand,
        });
        sources.push(EntropySource {
            name: "RDTSC",
            flags: EntropyFlags::NONE,
            func: hardware_rdtsc,
        });
    }

    #[cfg(feature = "std")]
    sources.push(EntropySource {
        name: "wall clock microseconds",
        flags: EntropyFlags::ONCE,
        func: wall_clock_micros,
    });

    sources
}
