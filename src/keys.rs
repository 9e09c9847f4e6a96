//! This module provides the key objects at the center of the crate: the public
//! and private halves of a Diffie-Hellman key pair, their generation, their
//! validation, and every supported import and export shape (raw big-endian
//! values, the length-prefixed key packet, and Base64 text transport).
//!
//! A private key owns its exponent as a wiped-on-drop secret; any buffer that
//! ever held random draws is wiped the same way.

use crate::constants::{BIGNUM_LEN_PREFIX, MAX_KEYGEN_DRAWS, PACKET_HEADER, PACKET_HEADER_LEN};
use crate::errors::DhError;
use crate::groups::{groupsize_to_keysize, DhGroup};
use arrayref::array_ref;
use base64::{engine::general_purpose, Engine as _};
use log::debug;
use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Discriminates the two key flavors on the wire; the discriminant doubles as
/// the packet kind byte and is stable across export and import.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    Public = 0,
    Private = 1,
}

impl KeyKind {
    /// Maps a packet kind byte back to a [`KeyKind`].
    pub(crate) fn from_byte(byte: u8) -> Option<KeyKind> {
        match byte {
            0 => Some(KeyKind::Public),
            1 => Some(KeyKind::Private),
            _ => None,
        }
    }

    /// Returns the packet kind byte.
    pub(crate) fn as_byte(self) -> u8 {
        self as u8
    }
}

/// The public half of a Diffie-Hellman key: group parameters plus the public
/// value `y = g^x mod p`.
#[derive(Clone, Debug)]
pub struct DhPublicKey {
    pub(crate) group: DhGroup,
    pub(crate) y: BigUint,
}

impl DhPublicKey {
    /// Imports a public key from a raw minimal-length unsigned big-endian
    /// public value and a named group.
    ///
    /// # Arguments
    ///
    /// * `input` - The public value as unsigned big-endian bytes.
    /// * `group` - The group the value belongs to.
    ///
    /// # Returns
    ///
    /// * [`DhPublicKey`] - The imported key.
    ///
    /// # Errors
    ///
    /// * [`DhError::InvalidArgument`] - Returned if the value does not lie
    ///   strictly between 1 and p-1.
    pub fn from_raw(input: &[u8], group: &DhGroup) -> Result<DhPublicKey, DhError> {
        let y = BigUint::from_bytes_be(input);
        if !group.is_valid_public_value(&y) {
            return Err(DhError::InvalidArgument);
        }
        Ok(DhPublicKey {
            group: group.clone(),
            y,
        })
    }

    /// Exports the public value as minimal-length unsigned big-endian bytes.
    pub fn to_raw(&self) -> Vec<u8> {
        self.y.to_bytes_be()
    }

    /// Exports the key as a self-describing key packet.
    ///
    /// # Returns
    ///
    /// * `Vec<u8>` - Header, kind byte, then the length-prefixed group
    ///   parameters and public value.
    pub fn export(&self) -> Vec<u8> {
        export_packet(&self.group, KeyKind::Public, &self.y)
    }

    /// Exports the key packet as a base64-encoded string.
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.export())
    }

    /// Returns the group the key belongs to.
    pub fn group(&self) -> &DhGroup {
        &self.group
    }

    /// Returns the group size in octets.
    pub fn group_size(&self) -> usize {
        self.group.size()
    }

    /// Returns the public value `y`.
    pub fn public_value(&self) -> &BigUint {
        &self.y
    }
}

impl From<&DhPrivateKey> for DhPublicKey {
    /// Derives the public half of a [`DhPrivateKey`].
    fn from(key: &DhPrivateKey) -> DhPublicKey {
        DhPublicKey {
            group: key.group.clone(),
            y: key.y.clone(),
        }
    }
}

/// The private half of a Diffie-Hellman key pair.
///
/// Holds the secret exponent `x` alongside the cached public value; the
/// exponent is wiped when the key is dropped.
#[derive(Clone)]
pub struct DhPrivateKey {
    pub(crate) group: DhGroup,
    pub(crate) x: Zeroizing<BigUint>,
    pub(crate) y: BigUint,
}

impl DhPrivateKey {
    /// Generates a key pair in the catalog group covering `groupsize` octets.
    ///
    /// # Arguments
    ///
    /// * `rng` - A cryptographically secure random source.
    /// * `groupsize` - The requested prime size in octets.
    ///
    /// # Returns
    ///
    /// * [`DhPrivateKey`] - The generated key pair.
    ///
    /// # Errors
    ///
    /// * [`DhError::InvalidKeySize`] - Returned if no catalog group covers the
    ///   requested size.
    /// * [`DhError::PrngReadError`] - Returned if the random source fails.
    pub fn generate<R: RngCore + CryptoRng>(
        rng: &mut R,
        groupsize: usize,
    ) -> Result<DhPrivateKey, DhError> {
        DhPrivateKey::generate_in(rng, DhGroup::for_size(groupsize)?)
    }

    /// Generates a key pair in a caller-supplied group given as hex strings.
    ///
    /// # Errors
    ///
    /// * [`DhError::InvalidGroup`] - Returned if either string is not valid
    ///   hexadecimal.
    /// * [`DhError::InvalidKeySize`] - Returned if the prime is larger than any
    ///   supported group size.
    /// * [`DhError::PrngReadError`] - Returned if the random source fails.
    pub fn generate_with_params<R: RngCore + CryptoRng>(
        rng: &mut R,
        prime_hex: &str,
        base_hex: &str,
    ) -> Result<DhPrivateKey, DhError> {
        DhPrivateKey::generate_in(rng, DhGroup::from_hex(prime_hex, base_hex)?)
    }

    /// Generates a key pair in a group supplied as a DER `DHParameter`
    /// sequence, the format produced by `openssl dhparam -outform DER`.
    ///
    /// # Errors
    ///
    /// * [`DhError::EncodingError`] - Returned if the parameter blob does not
    ///   decode.
    /// * [`DhError::InvalidKeySize`] - Returned if the prime is larger than any
    ///   supported group size.
    /// * [`DhError::PrngReadError`] - Returned if the random source fails.
    pub fn generate_from_dhparam<R: RngCore + CryptoRng>(
        rng: &mut R,
        dhparam: &[u8],
    ) -> Result<DhPrivateKey, DhError> {
        DhPrivateKey::generate_in(rng, DhGroup::from_der(dhparam)?)
    }

    /// Generates a key pair in an already materialized group.
    ///
    /// Draws the recommended number of random octets for the group size,
    /// interprets them as the secret exponent, and retries until the derived
    /// public value lies strictly between 1 and p-1.
    ///
    /// # Errors
    ///
    /// * [`DhError::InvalidKeySize`] - Returned if the group size maps to no
    ///   recommended exponent length.
    /// * [`DhError::PrngReadError`] - Returned if the random source fails.
    /// * [`DhError::PrngFailure`] - Returned if no acceptable public value is
    ///   drawn within the retry budget.
    pub fn generate_in<R: RngCore + CryptoRng>(
        rng: &mut R,
        group: DhGroup,
    ) -> Result<DhPrivateKey, DhError> {
        let keysize = groupsize_to_keysize(group.size());
        if keysize == 0 {
            return Err(DhError::InvalidKeySize);
        }

        let one = BigUint::one();
        let p_minus_1 = group.prime() - &one;
        let mut buf = Zeroizing::new(vec![0u8; keysize]);

        for draw in 0..MAX_KEYGEN_DRAWS {
            rng.try_fill_bytes(buf.as_mut())?;
            let x = Zeroizing::new(BigUint::from_bytes_be(&buf));
            let y = group.base().modpow(&x, group.prime());
            // reject y <= 1 and y >= p-1
            if y > one && y < p_minus_1 {
                if draw > 0 {
                    debug!("accepted public value after {} rejected draws", draw);
                }
                return Ok(DhPrivateKey { group, x, y });
            }
        }
        Err(DhError::PrngFailure)
    }

    /// Imports a private key from a raw minimal-length unsigned big-endian
    /// exponent and a named group. The public value is derived by
    /// exponentiation and validated before the key is returned.
    ///
    /// # Errors
    ///
    /// * [`DhError::InvalidArgument`] - Returned if the derived public value
    ///   does not lie strictly between 1 and p-1.
    pub fn from_raw(input: &[u8], group: &DhGroup) -> Result<DhPrivateKey, DhError> {
        let x = Zeroizing::new(BigUint::from_bytes_be(input));
        let y = group.base().modpow(&x, group.prime());
        if !group.is_valid_public_value(&y) {
            return Err(DhError::InvalidArgument);
        }
        Ok(DhPrivateKey {
            group: group.clone(),
            x,
            y,
        })
    }

    /// Exports the secret exponent as minimal-length unsigned big-endian
    /// bytes. The returned buffer is wiped when dropped.
    pub fn to_raw(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.x.to_bytes_be())
    }

    /// Exports the key as a self-describing key packet.
    ///
    /// # Arguments
    ///
    /// * `kind` - [`KeyKind::Private`] exports the secret exponent,
    ///   [`KeyKind::Public`] exports only the public value.
    pub fn export(&self, kind: KeyKind) -> Vec<u8> {
        match kind {
            KeyKind::Private => export_packet(&self.group, KeyKind::Private, &self.x),
            KeyKind::Public => export_packet(&self.group, KeyKind::Public, &self.y),
        }
    }

    /// Exports a key packet of the requested kind as a base64-encoded string.
    pub fn to_base64(&self, kind: KeyKind) -> String {
        general_purpose::STANDARD.encode(self.export(kind))
    }

    /// Returns the public half of the key pair.
    pub fn public_key(&self) -> DhPublicKey {
        DhPublicKey::from(self)
    }

    /// Returns the group the key belongs to.
    pub fn group(&self) -> &DhGroup {
        &self.group
    }

    /// Returns the group size in octets.
    pub fn group_size(&self) -> usize {
        self.group.size()
    }
}

/// A key of either flavor, as reconstructed from a key packet.
#[derive(Clone)]
pub enum DhKey {
    Public(DhPublicKey),
    Private(DhPrivateKey),
}

impl DhKey {
    /// Imports a key from a key packet produced by [`DhPublicKey::export`] or
    /// [`DhPrivateKey::export`].
    ///
    /// A private-kind packet carries only the exponent; the public value is
    /// reconstructed by exponentiation rather than trusted from the stream.
    ///
    /// # Errors
    ///
    /// * [`DhError::InvalidPacket`] - Returned if the packet is truncated or
    ///   the header does not match.
    /// * [`DhError::TypeMismatch`] - Returned if the kind byte is unknown.
    pub fn import(input: &[u8]) -> Result<DhKey, DhError> {
        if input.len() < PACKET_HEADER_LEN + 1 {
            return Err(DhError::InvalidPacket);
        }
        if input[..PACKET_HEADER_LEN] != PACKET_HEADER {
            return Err(DhError::InvalidPacket);
        }
        let kind = KeyKind::from_byte(input[PACKET_HEADER_LEN]).ok_or(DhError::TypeMismatch)?;

        let mut pos = PACKET_HEADER_LEN + 1;
        let prime = read_bignum(input, &mut pos)?;
        let base = read_bignum(input, &mut pos)?;
        let value = read_bignum(input, &mut pos)?;
        let group = DhGroup::new(prime, base);

        match kind {
            KeyKind::Public => Ok(DhKey::Public(DhPublicKey { group, y: value })),
            KeyKind::Private => {
                let x = Zeroizing::new(value);
                let y = group.base().modpow(&x, group.prime());
                Ok(DhKey::Private(DhPrivateKey { group, x, y }))
            }
        }
    }

    /// Imports a key from a base64-encoded key packet.
    ///
    /// # Errors
    ///
    /// * [`DhError::Base64DecodeError`] - Returned if the text is not valid
    ///   Base64.
    /// * [`DhError::InvalidPacket`] / [`DhError::TypeMismatch`] - As for
    ///   [`DhKey::import`].
    pub fn from_base64(value: &str) -> Result<DhKey, DhError> {
        let bytes = general_purpose::STANDARD.decode(value)?;
        DhKey::import(&bytes)
    }

    /// Returns the kind of the imported key.
    pub fn kind(&self) -> KeyKind {
        match self {
            DhKey::Public(_) => KeyKind::Public,
            DhKey::Private(_) => KeyKind::Private,
        }
    }

    /// Returns the group size in octets.
    pub fn group_size(&self) -> usize {
        match self {
            DhKey::Public(key) => key.group_size(),
            DhKey::Private(key) => key.group_size(),
        }
    }

    /// Returns the public half of the key, whichever flavor it is.
    pub fn public_key(&self) -> DhPublicKey {
        match self {
            DhKey::Public(key) => key.clone(),
            DhKey::Private(key) => key.public_key(),
        }
    }
}

/// Serializes a key packet: fixed header, kind byte, then the length-prefixed
/// group parameters and the exported value.
fn export_packet(group: &DhGroup, kind: KeyKind, value: &BigUint) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(PACKET_HEADER_LEN + 1 + 3 * (BIGNUM_LEN_PREFIX + group.size()));
    out.extend_from_slice(&PACKET_HEADER);
    out.push(kind.as_byte());
    write_bignum(&mut out, group.prime());
    write_bignum(&mut out, group.base());
    write_bignum(&mut out, value);
    out
}

/// Appends a bignum as a 4-byte big-endian length followed by the
/// minimal-length unsigned big-endian magnitude.
fn write_bignum(out: &mut Vec<u8>, value: &BigUint) {
    let magnitude = value.to_bytes_be();
    out.extend_from_slice(&(magnitude.len() as u32).to_be_bytes());
    out.extend_from_slice(&magnitude);
}

/// Reads one length-prefixed bignum, advancing `pos` past it.
fn read_bignum(input: &[u8], pos: &mut usize) -> Result<BigUint, DhError> {
    if input.len() < *pos + BIGNUM_LEN_PREFIX {
        return Err(DhError::InvalidPacket);
    }
    let len = u32::from_be_bytes(*array_ref![input, *pos, 4]) as usize;
    *pos += BIGNUM_LEN_PREFIX;
    if input.len() < *pos + len {
        return Err(DhError::InvalidPacket);
    }
    let value = BigUint::from_bytes_be(&input[*pos..*pos + len]);
    *pos += len;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_catalog_walk() {
        for size in [192, 256, 384, 512, 768, 1024] {
            let key = DhPrivateKey::generate(&mut OsRng, size).unwrap();
            assert_eq!(key.group_size(), size);
        }
    }

    #[test]
    fn test_generate_rejects_oversized_group() {
        assert!(matches!(
            DhPrivateKey::generate(&mut OsRng, 1025),
            Err(DhError::InvalidKeySize)
        ));
    }

    #[test]
    fn test_generated_key_invariants() {
        let key = DhPrivateKey::generate(&mut OsRng, 256).unwrap();
        let one = BigUint::one();
        let p_minus_1 = key.group().prime() - &one;
        assert!(key.y > one);
        assert!(key.y < p_minus_1);
        assert_eq!(key.y, key.group().base().modpow(&key.x, key.group().prime()));
        assert!(key.to_raw().len() <= groupsize_to_keysize(256));
    }

    #[test]
    fn test_generate_with_params() {
        let group = DhGroup::for_size(192).unwrap();
        let prime_hex = group.prime().to_str_radix(16);
        let base_hex = group.base().to_str_radix(16);
        let key = DhPrivateKey::generate_with_params(&mut OsRng, &prime_hex, &base_hex).unwrap();
        assert_eq!(key.group(), &group);
    }

    #[test]
    fn test_generate_from_dhparam() {
        let group = DhGroup::for_size(192).unwrap();
        let dhparam = group.to_der().unwrap();
        let key = DhPrivateKey::generate_from_dhparam(&mut OsRng, &dhparam).unwrap();
        assert_eq!(key.group(), &group);
    }

    #[test]
    fn test_export_import_public_packet() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let packet = key.export(KeyKind::Public);
        let imported = DhKey::import(&packet).unwrap();
        assert_eq!(imported.kind(), KeyKind::Public);
        assert_eq!(imported.public_key().public_value(), &key.y);
    }

    #[test]
    fn test_export_import_private_packet() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let packet = key.export(KeyKind::Private);
        let imported = DhKey::import(&packet).unwrap();
        assert_eq!(imported.kind(), KeyKind::Private);
        // y is reconstructed from the exponent and must match the original
        match imported {
            DhKey::Private(imported) => {
                assert_eq!(*imported.x, *key.x);
                assert_eq!(imported.y, key.y);
            }
            DhKey::Public(_) => panic!("expected a private key"),
        }
    }

    #[test]
    fn test_import_rejects_bad_header() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let mut packet = key.export(KeyKind::Public);
        packet[0] ^= 0xFF;
        assert!(matches!(DhKey::import(&packet), Err(DhError::InvalidPacket)));
    }

    #[test]
    fn test_import_rejects_unknown_kind() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let mut packet = key.export(KeyKind::Public);
        packet[PACKET_HEADER_LEN] = 7;
        assert!(matches!(DhKey::import(&packet), Err(DhError::TypeMismatch)));
    }

    #[test]
    fn test_import_rejects_truncated_packet() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let packet = key.export(KeyKind::Public);
        for cut in [0, PACKET_HEADER_LEN, packet.len() / 2, packet.len() - 1] {
            assert!(matches!(
                DhKey::import(&packet[..cut]),
                Err(DhError::InvalidPacket)
            ));
        }
    }

    #[test]
    fn test_raw_round_trip() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let group = key.group().clone();

        let public = DhPublicKey::from_raw(&key.public_key().to_raw(), &group).unwrap();
        assert_eq!(public.public_value(), &key.y);

        let private = DhPrivateKey::from_raw(&key.to_raw(), &group).unwrap();
        assert_eq!(*private.x, *key.x);
        assert_eq!(private.y, key.y);
    }

    #[test]
    fn test_raw_import_rejects_small_order_values() {
        let group = DhGroup::for_size(192).unwrap();
        let p_minus_1 = group.prime() - &BigUint::one();
        for y in [BigUint::from(0u32), BigUint::from(1u32), p_minus_1] {
            assert!(matches!(
                DhPublicKey::from_raw(&y.to_bytes_be(), &group),
                Err(DhError::InvalidArgument)
            ));
        }
    }

    #[test]
    fn test_base64_round_trip() {
        let key = DhPrivateKey::generate(&mut OsRng, 192).unwrap();
        let text = key.to_base64(KeyKind::Public);
        let imported = DhKey::from_base64(&text).unwrap();
        assert_eq!(imported.public_key().public_value(), &key.y);
    }
}
