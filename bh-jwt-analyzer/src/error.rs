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

use crate::{
    parser::ParserState,
    semantic::ValueKind,
    signature::SigningAlgorithm,
    token::Segment,
};

/// Error raised while scanning either the encoded token or one of its decoded
/// JSON segments.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum LexicalError {
    /// The token does not split into exactly three `.`-separated segments.
    #[strum(to_string = "Token must have exactly 3 segments separated by '.', found {0}")]
    Structure(usize),

    /// A segment which must carry data is empty.
    #[strum(to_string = "The {0} segment must not be empty")]
    EmptySegment(Segment),

    /// An encoded segment contains a character outside the base64url
    /// alphabet.
    #[strum(to_string = "Encoded {0} segment contains '{1}', which is outside the base64url alphabet")]
    EncodedAlphabet(Segment, char),

    /// A decoded segment contains a character outside the restricted JSON
    /// alphabet.
    #[strum(to_string = "Decoded {0} contains '{1}', which is outside the JSON alphabet")]
    DecodedAlphabet(Segment, char),

    /// A quoted string in a decoded segment is malformed.
    #[strum(to_string = "Invalid string in {0}: {1}")]
    StringFormat(Segment, String),

    /// A character of the JSON alphabet appeared where no token can start.
    #[strum(to_string = "Unexpected character '{1}' at position {2} in {0}")]
    UnexpectedCharacter(Segment, char, usize),
}

impl bherror::BhError for LexicalError {}

/// Error raised while converting between raw segments and their JSON text.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum CodecError {
    /// The segment is not valid padded base64url, or does not decode to UTF-8.
    #[strum(to_string = "Unable to decode the {0} segment as base64url UTF-8 text")]
    Base64Decode(Segment),

    /// The JSON object could not be serialized.
    #[strum(to_string = "Unable to serialize the {0} as JSON")]
    Serialization(Segment),
}

impl bherror::BhError for CodecError {}

/// Error raised by the grammar parser.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum GrammarError {
    /// The encoded token stream does not hold exactly three segments.
    #[strum(to_string = "Encoded token must consist of 3 segments, found {0}")]
    SegmentCount(usize),

    /// An encoded segment is not a word over the base64url alphabet.
    #[strum(to_string = "The {0} segment is not a valid base64url word")]
    InvalidEncodedSegment(Segment),

    /// A token violates the expected grammar transition.
    #[strum(to_string = "Expected {1} in {0}, found {2}")]
    UnexpectedToken(Segment, ParserState, String),

    /// The token stream ended before the object was closed.
    #[strum(to_string = "Expected {1} in {0}, found end of input")]
    UnexpectedEnd(Segment, ParserState),

    /// The braces of a nested object value are not balanced.
    #[strum(to_string = "Unbalanced braces in a nested object of {0}")]
    UnbalancedNestedObject(Segment),

    /// Tokens follow the brace closing the outermost object.
    #[strum(to_string = "Unexpected {1} after the end of the {0} object")]
    TrailingToken(Segment, String),
}

impl bherror::BhError for GrammarError {}

/// Error raised when a decoded segment is turned into a JSON object.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum JsonError {
    /// The decoded text is not valid JSON.
    #[strum(to_string = "The {0} is not valid JSON")]
    Malformed(Segment),

    /// The decoded text is valid JSON, but not an object.
    #[strum(to_string = "The {0} is not a JSON object")]
    NotAnObject(Segment),
}

impl bherror::BhError for JsonError {}

/// The code reported for a failed semantic check.
///
/// Several distinct checks share a code.
#[derive(
    strum_macros::Display,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum SemanticCode {
    /// Missing mandatory header fields.
    E1,
    /// Wrong header `typ`.
    E2,
    /// Unrecognized header `alg`.
    E3,
    /// String claim of the wrong type, or an expired token.
    E4,
    /// Integer claim of the wrong type, or a token not valid yet.
    E5,
    /// Empty claims, temporal disorder or inconsistent claim types.
    E6,
    /// Missing signature.
    E7,
}

/// Error raised by the claim validator.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum SemanticError {
    /// The header lacks `alg` or `typ`.
    #[strum(to_string = "E1: the header must contain the `alg` and `typ` fields")]
    MissingHeaderFields,

    /// The header `typ` is not `JWT`.
    #[strum(to_string = "E2: the header `typ` must be \"JWT\", found {0}")]
    InvalidType(String),

    /// The header `alg` is not among the recognized algorithms.
    #[strum(to_string = "E3: unrecognized algorithm {0}")]
    UnrecognizedAlgorithm(String),

    /// The signature segment is empty.
    #[strum(to_string = "E7: the token carries no signature although `alg` requires one")]
    MissingSignature,

    /// A registered claim which must be a string is not one.
    #[strum(to_string = "E4: claim `{0}` must be a string")]
    ClaimNotString(String),

    /// A registered claim which must be an integer is not one.
    #[strum(to_string = "E5: claim `{0}` must be an integer")]
    ClaimNotInteger(String),

    /// A claim is null or an empty string.
    #[strum(to_string = "E6: claim `{0}` must not be null or empty")]
    EmptyClaim(String),

    /// `nbf <= iat <= exp` does not hold.
    #[strum(to_string = "E6: temporal claims must satisfy nbf <= iat <= exp (nbf={0}, iat={1}, exp={2})")]
    TemporalOrder(i64, i64, i64),

    /// The token is expired.
    #[strum(to_string = "E4: token expired (exp={1}, current_time={0})")]
    Expired(i64, i64),

    /// The token is not valid yet.
    #[strum(to_string = "E5: token not yet valid (nbf={1}, current_time={0})")]
    NotYetValid(i64, i64),

    /// The same claim name appears with values of different types.
    #[strum(to_string = "E6: claim `{0}` has inconsistent types {1} and {2}")]
    InconsistentClaimType(String, ValueKind, ValueKind),
}

impl SemanticError {
    /// Returns the code reported for this error.
    pub fn code(&self) -> SemanticCode {
        match self {
            Self::MissingHeaderFields => SemanticCode::E1,
            Self::InvalidType(_) => SemanticCode::E2,
            Self::UnrecognizedAlgorithm(_) => SemanticCode::E3,
            Self::MissingSignature => SemanticCode::E7,
            Self::ClaimNotString(_) | Self::Expired(..) => SemanticCode::E4,
            Self::ClaimNotInteger(_) | Self::NotYetValid(..) => SemanticCode::E5,
            Self::EmptyClaim(_) | Self::TemporalOrder(..) | Self::InconsistentClaimType(..) => {
                SemanticCode::E6
            }
        }
    }
}

impl bherror::BhError for SemanticError {}

/// Error in computing or checking a signature.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum SignatureError {
    /// The algorithm is not one we know of.
    #[strum(to_string = "Unsupported signing algorithm {0}")]
    UnsupportedAlgorithm(String),

    /// The algorithm is recognized, but no signer exists for it.
    #[strum(to_string = "Signing algorithm {0} is recognized but not implemented")]
    AlgorithmNotImplemented(SigningAlgorithm),

    /// The provided signature is not a base64url word.
    #[strum(to_string = "Provided signature is not base64url encoded")]
    MalformedSignature,

    /// The cryptographic backend unexpectedly failed.
    #[strum(to_string = "Crypto backend failed")]
    CryptoBackend,
}

impl bherror::BhError for SignatureError {}

/// Error returned when constructing or verifying a whole token.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum JwtError {
    /// Lexical error, e.g. a wrong number of segments.
    #[strum(to_string = "Lexical error: {0}")]
    Lexical(LexicalError),

    /// Encoding or decoding error.
    #[strum(to_string = "Codec error: {0}")]
    Codec(CodecError),

    /// The header is not a JSON object.
    #[strum(to_string = "JSON error: {0}")]
    Json(JsonError),

    /// Signature error, e.g. an unsupported algorithm.
    #[strum(to_string = "Signature error: {0}")]
    Signature(SignatureError),
}

impl bherror::BhError for JwtError {}

/// The [`std::result::Result`] alias used throughout this crate.
pub type Result<T, E> = bherror::Result<T, E>;
