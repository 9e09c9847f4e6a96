//! This module implements the hybrid construction for moving a short symmetric
//! key under a Diffie-Hellman public key.
//!
//! Encryption generates a fresh ephemeral key pair in the recipient's group,
//! derives the shared secret with the recipient's public key, hashes it into a
//! one-time pad, and XORs the plaintext into the pad. The result travels as a
//! DER sequence of the digest identifier, the ephemeral public value, and the
//! masked bytes; decryption rebuilds the pad from the recipient's private key.
//!
//! The construction provides confidentiality only; it carries no integrity
//! protection of its own.

use crate::errors::DhError;
use crate::hashes::HashAlg;
use crate::keys::{DhPrivateKey, DhPublicKey};
use der::asn1::{ObjectIdentifier, OctetStringRef};
use der::{Decode, Encode, Sequence};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// The wire shape of an encrypted key: the digest identifier, the ephemeral
/// public value, and the masked plaintext.
#[derive(Sequence)]
struct EncryptedKey<'a> {
    hash_oid: ObjectIdentifier,
    ephemeral: OctetStringRef<'a>,
    ciphertext: OctetStringRef<'a>,
}

/// Encrypts a short symmetric key under a peer public key.
///
/// # Arguments
///
/// * `plaintext` - The key material to protect; at most `hash.output_len()`
///   octets.
/// * `rng` - A cryptographically secure random source for the ephemeral key.
/// * `hash` - The digest used to derive the masking pad.
/// * `peer` - The recipient's public key.
///
/// # Returns
///
/// * `Vec<u8>` - The DER-encoded ciphertext sequence.
///
/// # Errors
///
/// * [`DhError::InvalidHash`] - Returned if the digest is too short to cover
///   the plaintext.
/// * [`DhError::PrngReadError`] - Returned if the random source fails while
///   generating the ephemeral key.
pub fn encrypt_key<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    rng: &mut R,
    hash: HashAlg,
    peer: &DhPublicKey,
) -> Result<Vec<u8>, DhError> {
    if plaintext.len() > hash.output_len() {
        return Err(DhError::InvalidHash);
    }

    // fresh ephemeral pair in the recipient's group
    let ephemeral = DhPrivateKey::generate_in(rng, peer.group().clone())?;
    let ephemeral_public = ephemeral.public_key().to_raw();

    let shared = ephemeral.shared_secret(peer)?;
    let mut pad = Zeroizing::new(hash.digest(shared.as_bytes()));
    for (pad_byte, msg_byte) in pad.iter_mut().zip(plaintext.iter()) {
        *pad_byte ^= msg_byte;
    }

    let sequence = EncryptedKey {
        hash_oid: hash.oid(),
        ephemeral: OctetStringRef::new(&ephemeral_public)?,
        ciphertext: OctetStringRef::new(&pad[..plaintext.len()])?,
    };
    Ok(sequence.to_der()?)
}

/// Decrypts a symmetric key produced by [`encrypt_key`].
///
/// # Arguments
///
/// * `input` - The DER-encoded ciphertext sequence.
/// * `key` - The private key matching the public key used to encrypt.
///
/// # Returns
///
/// * `Zeroizing<Vec<u8>>` - The recovered key material, wiped on drop.
///
/// # Errors
///
/// * [`DhError::EncodingError`] - Returned if the sequence does not decode.
/// * [`DhError::InvalidPacket`] - Returned if the digest identifier is
///   unknown, or if the masked bytes are longer than the digest.
/// * [`DhError::InvalidArgument`] - Returned if the embedded ephemeral value
///   fails validation against the recipient's group.
pub fn decrypt_key(input: &[u8], key: &DhPrivateKey) -> Result<Zeroizing<Vec<u8>>, DhError> {
    let sequence = EncryptedKey::from_der(input)?;
    let hash = HashAlg::from_oid(&sequence.hash_oid).ok_or(DhError::InvalidPacket)?;

    let ephemeral = DhPublicKey::from_raw(sequence.ephemeral.as_bytes(), key.group())?;
    let shared = key.shared_secret(&ephemeral)?;
    let pad = Zeroizing::new(hash.digest(shared.as_bytes()));

    let ciphertext = sequence.ciphertext.as_bytes();
    if ciphertext.len() > pad.len() {
        return Err(DhError::InvalidPacket);
    }

    let mut plaintext = Zeroizing::new(Vec::with_capacity(ciphertext.len()));
    for (masked, pad_byte) in ciphertext.iter().zip(pad.iter()) {
        plaintext.push(masked ^ pad_byte);
    }
    Ok(plaintext)
}

/// Decrypts a symmetric key into a caller-supplied buffer.
///
/// # Returns
///
/// * `usize` - The number of bytes written.
///
/// # Errors
///
/// * [`DhError::BufferOverflow`] - Returned if `out` is too small; carries the
///   required length so the caller can retry.
/// * Any error [`decrypt_key`] can produce.
pub fn decrypt_key_into(
    input: &[u8],
    key: &DhPrivateKey,
    out: &mut [u8],
) -> Result<usize, DhError> {
    let plaintext = decrypt_key(input, key)?;
    let required = plaintext.len();
    if out.len() < required {
        return Err(DhError::BufferOverflow(required));
    }
    out[..required].copy_from_slice(&plaintext);
    Ok(required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = DhPrivateKey::generate(&mut OsRng, 256).unwrap();
        let plaintext: Vec<u8> = (0u8..16).collect();

        let blob = encrypt_key(&plaintext, &mut OsRng, HashAlg::Md5, &key.public_key()).unwrap();
        let recovered = decrypt_key(&blob, &key).unwrap();

        assert_eq!(recovered.len(), 16);
        assert_eq!(&recovered[..], &plaintext[..]);
    }

    #[test]
    fn test_round_trip_at_digest_capacity() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let plaintext = [0xA5u8; 32];

        let blob = encrypt_key(&plaintext, &mut OsRng, HashAlg::Sha256, &key.public_key()).unwrap();
        let recovered = decrypt_key(&blob, &key).unwrap();
        assert_eq!(&recovered[..], &plaintext[..]);
    }

    #[test]
    fn test_plaintext_longer_than_digest() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let plaintext = [0u8; 17];
        assert!(matches!(
            encrypt_key(&plaintext, &mut OsRng, HashAlg::Md5, &key.public_key()),
            Err(DhError::InvalidHash)
        ));
    }

    #[test]
    fn test_unknown_digest_identifier() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let ephemeral_public = key.public_key().to_raw();
        let bogus = EncryptedKey {
            hash_oid: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.11591.12.2"),
            ephemeral: OctetStringRef::new(&ephemeral_public).unwrap(),
            ciphertext: OctetStringRef::new(&[0u8; 16]).unwrap(),
        };
        let blob = bogus.to_der().unwrap();
        assert!(matches!(decrypt_key(&blob, &key), Err(DhError::InvalidPacket)));
    }

    #[test]
    fn test_ciphertext_longer_than_digest() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let ephemeral_public = key.public_key().to_raw();
        let oversize = EncryptedKey {
            hash_oid: HashAlg::Md5.oid(),
            ephemeral: OctetStringRef::new(&ephemeral_public).unwrap(),
            ciphertext: OctetStringRef::new(&[0u8; 17]).unwrap(),
        };
        let blob = oversize.to_der().unwrap();
        assert!(matches!(decrypt_key(&blob, &key), Err(DhError::InvalidPacket)));
    }

    #[test]
    fn test_decrypt_into_reports_required_length() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let plaintext: Vec<u8> = (0u8..16).collect();
        let blob = encrypt_key(&plaintext, &mut OsRng, HashAlg::Md5, &key.public_key()).unwrap();

        let mut small = [0u8; 4];
        match decrypt_key_into(&blob, &key, &mut small) {
            Err(DhError::BufferOverflow(required)) => assert_eq!(required, 16),
            other => panic!("expected a buffer overflow, got {:?}", other),
        }

        let mut out = [0u8; 16];
        let written = decrypt_key_into(&blob, &key, &mut out).unwrap();
        assert_eq!(written, 16);
        assert_eq!(&out[..], &plaintext[..]);
    }

    #[test]
    fn test_garbage_does_not_decode() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        assert!(decrypt_key(&[0x00, 0x01, 0x02], &key).is_err());
    }
}
