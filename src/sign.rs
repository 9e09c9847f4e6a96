//! This module implements ElGamal-style signatures over message digests.
//!
//! With private exponent `x` and the digest interpreted as an integer `M`, the
//! signer draws a fresh random `k`, computes `a = g^k mod p` and
//! `b = (M - x*a) * k^-1 mod (p-1)/2`, and emits the pair `(a, b)` as a DER
//! sequence of two integers. Verification accepts when
//! `y^a * a^b = g^(x*a) * g^(k * (M - x*a) * k^-1) = g^M (mod p)` matches
//! `g^M mod p` recomputed from the digest.
//!
//! Reduction happens modulo `(p-1)/2`, the prime order of the subgroup the
//! catalog bases generate, so the drawn `k` needs no gcd check beyond
//! invertibility. The nonce `k` MUST be fresh per signature; the scheme has no
//! hash-domain binding of its own.

use crate::errors::DhError;
use crate::groups::groupsize_to_keysize;
use crate::keys::{DhPrivateKey, DhPublicKey};
use der::asn1::UintRef;
use der::{Decode, Encode, Sequence};
use num_bigint::traits::ModInverse;
use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// The wire shape of a signature: the pair `(a, b)`.
#[derive(Sequence)]
struct DhSignature<'a> {
    a: UintRef<'a>,
    b: UintRef<'a>,
}

/// Signs a message digest with a private key.
///
/// # Arguments
///
/// * `digest` - The digest to sign, interpreted as an unsigned big-endian
///   integer.
/// * `rng` - A cryptographically secure random source for the nonce.
/// * `key` - The signer's private key.
///
/// # Returns
///
/// * `Vec<u8>` - The DER-encoded signature sequence.
///
/// # Errors
///
/// * [`DhError::InvalidKeySize`] - Returned if the key's group size maps to no
///   recommended nonce length.
/// * [`DhError::PrngReadError`] - Returned if the random source fails.
/// * [`DhError::ArithmeticError`] - Returned if the drawn nonce is not
///   invertible modulo the subgroup order.
pub fn sign_hash<R: RngCore + CryptoRng>(
    digest: &[u8],
    rng: &mut R,
    key: &DhPrivateKey,
) -> Result<Vec<u8>, DhError> {
    let keysize = groupsize_to_keysize(key.group_size());
    if keysize == 0 {
        return Err(DhError::InvalidKeySize);
    }

    // the subgroup order is prime, so any nonzero k is invertible
    let mut buf = Zeroizing::new(vec![0u8; keysize]);
    rng.try_fill_bytes(buf.as_mut())?;
    let k = Zeroizing::new(BigUint::from_bytes_be(&buf));

    let p = key.group().prime();
    let order = (p - &BigUint::one()) >> 1;

    let a = key.group().base().modpow(&k, p);

    let k_inv = (&*k)
        .mod_inverse(&order)
        .and_then(|inverse| inverse.to_biguint())
        .ok_or(DhError::ArithmeticError)?;
    let xa = (&*key.x * &a) % &order;
    let m = BigUint::from_bytes_be(digest) % &order;
    let b = (&k_inv * &((m + &order - &xa) % &order)) % &order;

    let a_bytes = a.to_bytes_be();
    let b_bytes = b.to_bytes_be();
    let sequence = DhSignature {
        a: UintRef::new(&a_bytes)?,
        b: UintRef::new(&b_bytes)?,
    };
    Ok(sequence.to_der()?)
}

/// Verifies a signature over a message digest.
///
/// A signature that decodes but does not satisfy the verification equation is
/// reported as `Ok(false)`, not as an error. No range check is performed on
/// the decoded `a`; the verification equation itself rejects forgeries.
///
/// # Arguments
///
/// * `signature` - The DER-encoded signature sequence.
/// * `digest` - The digest that was signed.
/// * `key` - The signer's public key.
///
/// # Returns
///
/// * `bool` - `true` if the signature verifies, `false` otherwise.
///
/// # Errors
///
/// * [`DhError::EncodingError`] - Returned if the sequence does not decode.
pub fn verify_hash(
    signature: &[u8],
    digest: &[u8],
    key: &DhPublicKey,
) -> Result<bool, DhError> {
    let sequence = DhSignature::from_der(signature)?;
    let a = BigUint::from_bytes_be(sequence.a.as_bytes());
    let b = BigUint::from_bytes_be(sequence.b.as_bytes());

    let p = key.group().prime();
    let m = BigUint::from_bytes_be(digest);
    let expected = key.group().base().modpow(&m, p);

    let ya = key.public_value().modpow(&a, p);
    let ab = a.modpow(&b, p);
    Ok((ya * ab) % p == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_verify_round_trip() {
        let key = DhPrivateKey::generate(&mut OsRng, 256).unwrap();
        let digest: Vec<u8> = (0u8..16).collect();

        let signature = sign_hash(&digest, &mut OsRng, &key).unwrap();
        assert!(verify_hash(&signature, &digest, &key.public_key()).unwrap());
    }

    #[test]
    fn test_verify_rejects_flipped_digest_bit() {
        let key = DhPrivateKey::generate(&mut OsRng, 256).unwrap();
        let digest: Vec<u8> = (0u8..16).collect();
        let signature = sign_hash(&digest, &mut OsRng, &key).unwrap();

        let mut tampered = digest.clone();
        tampered[0] ^= 1;
        assert!(!verify_hash(&signature, &tampered, &key.public_key()).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_signer() {
        let signer = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let other = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let digest = [0x42u8; 20];

        let signature = sign_hash(&digest, &mut OsRng, &signer).unwrap();
        assert!(!verify_hash(&signature, &digest, &other.public_key()).unwrap());
    }

    #[test]
    fn test_signatures_are_randomized() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let digest = [0x17u8; 16];
        let first = sign_hash(&digest, &mut OsRng, &key).unwrap();
        let second = sign_hash(&digest, &mut OsRng, &key).unwrap();
        assert_ne!(first, second);
        assert!(verify_hash(&first, &digest, &key.public_key()).unwrap());
        assert!(verify_hash(&second, &digest, &key.public_key()).unwrap());
    }

    #[test]
    fn test_garbage_signature_is_an_error() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let digest = [0u8; 16];
        assert!(verify_hash(&[0xDE, 0xAD, 0xBE, 0xEF], &digest, &key.public_key()).is_err());
    }
}
