//! The generator registry: a static, immutable table mapping a Hash_DRBG
//! variant identifier or security-strength requirement onto the concrete
//! hash binding and seed length needed to construct it.
//!
//! There is no vtable of function pointers here (a tagged-enum substitution
//! fits a systems language with a real type system better); dispatch is a
//! `match` over [`HashKind`] in the generator facade that builds the right
//! monomorphized [`crate::hash_drbg::HashDrbgState`].

/// Which concrete [`crate::hash::Hash`] implementation a variant binds to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HashKind {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

/// A registry entry describing one Hash_DRBG variant.
#[derive(Clone, Copy, Debug)]
pub struct VariantEntry {
    pub id: u8,
    pub name: &'static str,
    pub security_bits: u16,
    pub flags: u16,
    pub seed_len: usize,
    pub hash_kind: HashKind,
}

/// The seven Hash_DRBG variants, in declaration order — *not* numeric id
/// order. This matters: [`lookup_by_bits`] returns the first entry whose
/// security strength satisfies the request, so the declaration order is
/// observable behavior, not an implementation detail.
pub const VARIANTS: &[VariantEntry] = &[
    VariantEntry {
        id: 1,
        name: "Hash_DRBG SHA1",
        security_bits: 128,
        flags: 0,
        seed_len: 55,
        hash_kind: HashKind::Sha1,
    },
    VariantEntry {
        id: 2,
        name: "Hash_DRBG SHA224",
        security_bits: 192,
        flags: 0,
        seed_len: 55,
        hash_kind: HashKind::Sha224,
    },
    VariantEntry {
        id: 5,
        name: "Hash_DRBG SHA512",
        security_bits: 256,
        flags: 0,
        seed_len: 111,
        hash_kind: HashKind::Sha512,
    },
    VariantEntry {
        id: 4,
        name: "Hash_DRBG SHA384",
        security_bits: 256,
        flags: 0,
        seed_len: 111,
        hash_kind: HashKind::Sha384,
    },
    VariantEntry {
        id: 3,
        name: "Hash_DRBG SHA256",
        security_bits: 256,
        flags: 0,
        seed_len: 55,
        hash_kind: HashKind::Sha256,
    },
    VariantEntry {
        id: 7,
        name: "Hash_DRBG SHA512_256",
        security_bits: 256,
        flags: 0,
        seed_len: 55,
        hash_kind: HashKind::Sha512_256,
    },
    VariantEntry {
        id: 6,
        name: "Hash_DRBG SHA512_224",
        security_bits: 192,
        flags: 0,
        seed_len: 55,
        hash_kind: HashKind::Sha512_224,
    },
];

/// Returns the first variant whose security strength is at least `min_bits`
/// and whose flags satisfy `required_flags` (`entry.flags & required_flags
/// == required_flags`), scanning in declaration order.
pub fn lookup_by_bits(min_bits: u16, required_flags: u16) -> Option<&'static VariantEntry> {
    VARIANTS
        .iter()
        .find(|v| v.security_bits >= min_bits && (v.flags & required_flags) == required_flags)
}

/// Returns the variant with the given `id`, subject to the same flag
/// filter as [`lookup_by_bits`].
pub fn lookup_by_id(id: u8, required_flags: u16) -> Option<&'static VariantEntry> {
    VARIANTS
        .iter()
        .find(|v| v.id == id && (v.flags & required_flags) == required_flags)
}
