//! Finite-field Diffie-Hellman over well-known safe-prime MODP groups.
//!
//! The crate covers the full key lifecycle (generation, validation, import and
//! export in raw, packet, and Base64 shapes), shared-secret agreement, hybrid
//! encryption of short symmetric keys, and ElGamal-style signatures over
//! message digests. Groups come from a built-in catalog of RFC 3526 parameters
//! between 1536 and 8192 bits, or from caller-supplied hex or DER parameters.
//!
//! Private exponents and every buffer that ever held secret material are wiped
//! when released. All operations run to completion on the caller's stack; the
//! crate holds no mutable global state.

mod constants;
pub mod encrypt;
pub mod errors;
pub mod groups;
pub mod hashes;
pub mod kex;
pub mod keys;
pub mod sign;

pub use encrypt::{decrypt_key, decrypt_key_into, encrypt_key};
pub use errors::DhError;
pub use groups::{group_sizes, groupsize_to_keysize, DhGroup};
pub use hashes::HashAlg;
pub use kex::SharedSecret;
pub use keys::{DhKey, DhPrivateKey, DhPublicKey, KeyKind};
pub use sign::{sign_hash, verify_hash};
