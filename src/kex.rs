//! This module implements shared-secret agreement between a local private key
//! and a peer public key.
//!
//! Both sides must carry identical group parameters, and the peer value is
//! re-validated before use so the two small-order elements a safe-prime group
//! admits can never reach the exponentiation. The derived secret is the raw
//! result of `y_peer^x mod p` in minimal-length unsigned big-endian form, and
//! is wiped when dropped.

use crate::errors::DhError;
use crate::keys::{DhPrivateKey, DhPublicKey};
use zeroize::Zeroizing;

/// The byte string shared by two parties after a successful key agreement.
///
/// The backing buffer is wiped when the value is dropped.
#[derive(Clone)]
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    /// Returns the secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the secret length in octets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for SharedSecret {
    /// Returns a shared reference to the secret bytes.
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl DhPrivateKey {
    /// Derives the shared secret with a peer public key.
    ///
    /// # Arguments
    ///
    /// * `peer` - The peer's public key.
    ///
    /// # Returns
    ///
    /// * [`SharedSecret`] - `peer.y ^ x mod p` as minimal-length unsigned
    ///   big-endian bytes, with no leading-zero padding.
    ///
    /// # Errors
    ///
    /// * [`DhError::TypeMismatch`] - Returned if the two keys do not carry
    ///   identical group parameters.
    /// * [`DhError::InvalidArgument`] - Returned if the peer public value does
    ///   not lie strictly between 1 and p-1.
    pub fn shared_secret(&self, peer: &DhPublicKey) -> Result<SharedSecret, DhError> {
        if self.group != peer.group {
            return Err(DhError::TypeMismatch);
        }
        if !self.group.is_valid_public_value(&peer.y) {
            return Err(DhError::InvalidArgument);
        }
        let secret = peer.y.modpow(&self.x, self.group.prime());
        Ok(SharedSecret(Zeroizing::new(secret.to_bytes_be())))
    }

    /// Derives the shared secret into a caller-supplied buffer.
    ///
    /// # Arguments
    ///
    /// * `peer` - The peer's public key.
    /// * `out` - The destination buffer.
    ///
    /// # Returns
    ///
    /// * `usize` - The number of bytes written.
    ///
    /// # Errors
    ///
    /// * [`DhError::BufferOverflow`] - Returned if `out` is too small; carries
    ///   the required length so the caller can retry.
    /// * [`DhError::TypeMismatch`] / [`DhError::InvalidArgument`] - As for
    ///   [`DhPrivateKey::shared_secret`].
    pub fn shared_secret_into(
        &self,
        peer: &DhPublicKey,
        out: &mut [u8],
    ) -> Result<usize, DhError> {
        let secret = self.shared_secret(peer)?;
        let required = secret.len();
        if out.len() < required {
            return Err(DhError::BufferOverflow(required));
        }
        out[..required].copy_from_slice(secret.as_bytes());
        Ok(required)
    }
}
