// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Keyed-hash signing and verification of the unsigned `header.payload`
//! text.

use std::str::FromStr;

use bherror::{traits::ForeignError as _, Error};
use openssl::{hash::MessageDigest, memcmp, pkey::PKey, sign::Signer};
use serde::{Deserialize, Serialize};

use crate::{codec::base64_url_encode, error::SignatureError, lexer::is_base64url_char, Result};

/// JWS `"alg"` header parameter value for **HMAC using SHA-256**.
pub const SIGNING_ALG_HS256: &str = "HS256";
/// JWS `"alg"` header parameter value for **HMAC using SHA-384**.
pub const SIGNING_ALG_HS384: &str = "HS384";
/// JWS `"alg"` header parameter value for **RSASSA-PKCS1-v1_5 using
/// SHA-256**.
pub const SIGNING_ALG_RS256: &str = "RS256";
/// JWS `"alg"` header parameter value for **ECDSA using P-256 and SHA-256**.
pub const SIGNING_ALG_ES256: &str = "ES256";

/// The closed set of recognized signing algorithms.
///
/// Only the keyed-hash algorithms have a signer; the asymmetric ones are
/// recognized by the semantic stage but rejected when signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256
    Hs256,
    /// HMAC with SHA-384
    Hs384,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    Rs256,
    /// ECDSA over P-256 with SHA-256
    Es256,
}

impl SigningAlgorithm {
    /// Looks up the algorithm named by an `alg` header value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            SIGNING_ALG_HS256 => Some(Self::Hs256),
            SIGNING_ALG_HS384 => Some(Self::Hs384),
            SIGNING_ALG_RS256 => Some(Self::Rs256),
            SIGNING_ALG_ES256 => Some(Self::Es256),
            _ => None,
        }
    }

    /// Returns `true` if a signer exists for this algorithm.
    pub fn is_implemented(self) -> bool {
        matches!(self, Self::Hs256 | Self::Hs384)
    }

    fn message_digest(self) -> Result<MessageDigest, SignatureError> {
        match self {
            Self::Hs256 => Ok(MessageDigest::sha256()),
            Self::Hs384 => Ok(MessageDigest::sha384()),
            Self::Rs256 | Self::Es256 => {
                Err(Error::root(SignatureError::AlgorithmNotImplemented(self)))
            }
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = Error<SignatureError>;

    fn from_str(value: &str) -> Result<Self, SignatureError> {
        Self::from_name(value)
            .ok_or_else(|| Error::root(SignatureError::UnsupportedAlgorithm(value.to_owned())))
    }
}

impl std::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Self::Hs256 => SIGNING_ALG_HS256,
            Self::Hs384 => SIGNING_ALG_HS384,
            Self::Rs256 => SIGNING_ALG_RS256,
            Self::Es256 => SIGNING_ALG_ES256,
        };
        write!(f, "{}", name)
    }
}

/// Everything needed to produce or check one signature.
///
/// A context is consumed by [`SignatureContext::sign`] or
/// [`SignatureContext::verify`], and is never persisted.
#[derive(Debug)]
pub struct SignatureContext<'a> {
    algorithm: SigningAlgorithm,
    secret: &'a [u8],
    unsigned: &'a str,
}

impl<'a> SignatureContext<'a> {
    /// Creates a context signing `unsigned` with `secret` under `algorithm`.
    pub fn new(algorithm: SigningAlgorithm, secret: &'a [u8], unsigned: &'a str) -> Self {
        Self {
            algorithm,
            secret,
            unsigned,
        }
    }

    /// The algorithm of this context.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Computes the base64url (unpadded) signature of the unsigned text.
    pub fn sign(self) -> Result<String, SignatureError> {
        self.compute().map(base64_url_encode)
    }

    /// Checks `provided` against a freshly computed signature.
    ///
    /// A mismatch is `Ok(false)`; only a `provided` value outside the
    /// base64url alphabet, or a backend failure, is an error. The comparison
    /// runs in constant time for signatures of equal length.
    pub fn verify(self, provided: &str) -> Result<bool, SignatureError> {
        if !provided.chars().all(is_base64url_char) {
            return Err(Error::root(SignatureError::MalformedSignature));
        }

        let expected = self.sign()?;

        Ok(expected.len() == provided.len()
            && memcmp::eq(expected.as_bytes(), provided.as_bytes()))
    }

    fn compute(&self) -> Result<Vec<u8>, SignatureError> {
        let digest = self.algorithm.message_digest()?;

        let key = PKey::hmac(self.secret).foreign_err(|| SignatureError::CryptoBackend)?;
        let mut signer = Signer::new(digest, &key).foreign_err(|| SignatureError::CryptoBackend)?;
        signer
            .update(self.unsigned.as_bytes())
            .foreign_err(|| SignatureError::CryptoBackend)?;
        signer
            .sign_to_vec()
            .foreign_err(|| SignatureError::CryptoBackend)
    }
}

/// Signs `unsigned` with `secret` under the algorithm named `algorithm`.
///
/// Unknown and unimplemented algorithms fail before any cryptographic work.
pub fn sign(unsigned: &str, secret: &[u8], algorithm: &str) -> Result<String, SignatureError> {
    let algorithm = resolve(algorithm)?;
    SignatureContext::new(algorithm, secret, unsigned).sign()
}

/// Verifies the `provided` signature of `unsigned` with `secret` under the
/// algorithm named `algorithm`.
pub fn verify(
    unsigned: &str,
    provided: &str,
    secret: &[u8],
    algorithm: &str,
) -> Result<bool, SignatureError> {
    let algorithm = resolve(algorithm)?;
    SignatureContext::new(algorithm, secret, unsigned).verify(provided)
}

/// Resolves an `alg` value to an algorithm which has a signer.
pub(crate) fn resolve(algorithm: &str) -> Result<SigningAlgorithm, SignatureError> {
    let algorithm: SigningAlgorithm = algorithm.parse()?;
    if !algorithm.is_implemented() {
        return Err(Error::root(SignatureError::AlgorithmNotImplemented(
            algorithm,
        )));
    }
    Ok(algorithm)
}
