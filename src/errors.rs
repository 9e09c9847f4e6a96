//! This module defines the error type shared by every fallible operation in the crate.
//! A single enum, [`DhError`], covers the key lifecycle, the agreement and signature
//! pipelines, and the serialization boundary, so callers match on one type regardless
//! of which operation failed.

use std::fmt::{Display, Formatter};

/// Represents errors that can occur across the DH key lifecycle and protocols.
#[derive(Debug)]
pub enum DhError {
    /// Error indicating a supplied value failed validation,
    /// e.g. a peer public value outside the open interval (1, p-1).
    InvalidArgument,

    /// Error indicating the group parameters could not be parsed.
    InvalidGroup,

    /// Error indicating that no supported group matches the requested size,
    /// or that the size maps to no recommended exponent length.
    InvalidKeySize,

    /// Error indicating a serialized blob is malformed, truncated,
    /// or names an algorithm the registry does not know.
    InvalidPacket,

    /// Error indicating two keys do not share group parameters,
    /// or a key packet carries an unknown kind byte.
    TypeMismatch,

    /// Error indicating the chosen digest is too short to cover the plaintext.
    InvalidHash,

    /// Error indicating the destination buffer is too small.
    /// Carries the required size in bytes so the caller can retry.
    BufferOverflow(usize),

    /// Error indicating key generation exhausted its retry budget
    /// without drawing an acceptable public value.
    PrngFailure,

    /// Error occurring when the random source fails to produce bytes.
    PrngReadError(rand::Error),

    /// Error indicating a modular inverse does not exist for the drawn nonce.
    ArithmeticError,

    /// Error occurring during DER encoding or decoding.
    EncodingError(der::Error),

    /// Error occurring during Base64 decoding of encoded data.
    Base64DecodeError(base64::DecodeError),
}

impl Display for DhError {
    /// Formats the error message for display.
    ///
    /// # Arguments
    ///
    /// * `f` - A formatter used to write the error message.
    ///
    /// # Returns
    ///
    /// * `fmt::Result` - Indicating whether the operation succeeded or failed.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self {
            DhError::InvalidArgument => write!(f, "Invalid argument"),
            DhError::InvalidGroup => write!(f, "Invalid group parameters"),
            DhError::InvalidKeySize => write!(f, "Invalid key size"),
            DhError::InvalidPacket => write!(f, "Invalid packet"),
            DhError::TypeMismatch => write!(f, "Key type mismatch"),
            DhError::InvalidHash => write!(f, "Invalid hash for this plaintext"),
            DhError::BufferOverflow(required) => {
                write!(f, "Buffer overflow: {} bytes required", required)
            }
            DhError::PrngFailure => write!(f, "PRNG failed to produce a usable key"),
            DhError::PrngReadError(e) => write!(f, "PRNG read error: {}", e),
            DhError::ArithmeticError => write!(f, "Arithmetic error"),
            DhError::EncodingError(e) => write!(f, "Encoding error: {}", e),
            DhError::Base64DecodeError(e) => write!(f, "Base64 decode error: {}", e),
        }
    }
}

/// Implements the standard error trait for [`DhError`].
impl std::error::Error for DhError {}

/// Conversion from a DER codec error to [`DhError::EncodingError`].
impl From<der::Error> for DhError {
    fn from(value: der::Error) -> Self {
        DhError::EncodingError(value)
    }
}

/// Conversion from a random-source error to [`DhError::PrngReadError`].
impl From<rand::Error> for DhError {
    fn from(value: rand::Error) -> Self {
        DhError::PrngReadError(value)
    }
}

/// Conversion from Base64 DecodeError to [`DhError::Base64DecodeError`].
impl From<base64::DecodeError> for DhError {
    fn from(value: base64::DecodeError) -> Self {
        DhError::Base64DecodeError(value)
    }
}
