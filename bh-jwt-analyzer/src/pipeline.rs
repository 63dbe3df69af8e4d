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

//! The validation and construction entry points.
//!
//! Validation runs the phases of [`Phase`] strictly in order and stops at the
//! first failing one. Every failure is turned into an [`Analysis::Error`], so
//! callers always get a structured outcome back.

use bherror::{traits::PropagateError as _, BhError, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    codec,
    error::{JwtError, SemanticCode, SemanticError, SignatureError},
    lexer::{tokenize_decoded, tokenize_encoded},
    parser::{self, DerivationNode},
    semantic::{ClaimMap, ClaimValidator},
    signature::{self, SignatureContext, SigningAlgorithm},
    token::{LexToken, Segment, Token, SEGMENT_SEPARATOR},
    JsonObject, Result, SecondsSinceEpoch,
};

/// A phase of the validation pipeline, in execution order.
#[derive(
    strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Phase {
    /// Scanning the encoded token.
    #[serde(rename = "lexico-codificado")]
    #[strum(to_string = "lexico-codificado")]
    EncodedLexing,
    /// Base64url decoding of the header and payload.
    #[serde(rename = "decode")]
    #[strum(to_string = "decode")]
    Decode,
    /// Scanning the decoded header.
    #[serde(rename = "lexico-header")]
    #[strum(to_string = "lexico-header")]
    HeaderLexing,
    /// Scanning the decoded payload.
    #[serde(rename = "lexico-payload")]
    #[strum(to_string = "lexico-payload")]
    PayloadLexing,
    /// Grammar conformance of the whole token.
    #[serde(rename = "sintactico")]
    #[strum(to_string = "sintactico")]
    Syntax,
    /// Turning the decoded texts into JSON objects.
    #[serde(rename = "json-parser")]
    #[strum(to_string = "json-parser")]
    JsonParsing,
    /// Claim checks.
    #[serde(rename = "semantic")]
    #[strum(to_string = "semantic")]
    Semantic,
}

/// The token streams produced by the lexers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStreams {
    /// One token per encoded segment.
    pub encoded: Vec<LexToken>,
    /// The tokens of the decoded header.
    pub header: Vec<LexToken>,
    /// The tokens of the decoded payload.
    pub payload: Vec<LexToken>,
}

/// Everything learned about a token which passed every phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The decoded header.
    pub header: JsonObject,
    /// The decoded payload.
    pub payload: JsonObject,
    /// The signature segment, still encoded.
    pub signature: String,
    /// The lexer outputs.
    pub tokens: TokenStreams,
    /// The derivation record of the parse.
    pub derivation: DerivationNode,
}

/// The first failure the pipeline ran into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    /// The phase which failed.
    pub phase: Phase,
    /// What went wrong.
    pub message: String,
    /// The code of a failed semantic check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<SemanticCode>,
}

impl AnalysisFailure {
    fn new<E: BhError>(phase: Phase, error: Error<E>) -> Self {
        Self {
            phase,
            message: error.error.to_string(),
            code: None,
        }
    }

    fn semantic(error: Error<SemanticError>) -> Self {
        Self {
            phase: Phase::Semantic,
            message: error.error.to_string(),
            code: Some(error.error.code()),
        }
    }
}

/// The outcome of analyzing one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Analysis {
    /// The token passed every phase.
    Ok(AnalysisReport),
    /// The token failed in some phase.
    Error(AnalysisFailure),
}

impl Analysis {
    /// Returns `true` if the token passed every phase.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// The report of a successful analysis.
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Ok(report) => Some(report),
            Self::Error(_) => None,
        }
    }

    /// The failure of an unsuccessful analysis.
    pub fn failure(&self) -> Option<&AnalysisFailure> {
        match self {
            Self::Ok(_) => None,
            Self::Error(failure) => Some(failure),
        }
    }

    /// The phase which failed, if any.
    pub fn phase(&self) -> Option<Phase> {
        self.failure().map(|failure| failure.phase)
    }

    /// The code of the failed semantic check, if any.
    pub fn code(&self) -> Option<SemanticCode> {
        self.failure().and_then(|failure| failure.code)
    }
}

impl From<std::result::Result<AnalysisReport, AnalysisFailure>> for Analysis {
    fn from(result: std::result::Result<AnalysisReport, AnalysisFailure>) -> Self {
        match result {
            Ok(report) => Self::Ok(report),
            Err(failure) => Self::Error(failure),
        }
    }
}

/// The current UNIX time, in seconds.
pub fn now() -> SecondsSinceEpoch {
    chrono::Utc::now().timestamp()
}

/// Analyzes `token` against the system clock.
pub fn analyze(token: &str) -> Analysis {
    analyze_at(token, now())
}

/// Analyzes `token`, checking its time claims against `current_time`.
pub fn analyze_at(token: &str, current_time: SecondsSinceEpoch) -> Analysis {
    let analysis = Analysis::from(run_pipeline(token, current_time));

    match &analysis {
        Analysis::Ok(report) => tracing::debug!(
            header_tokens = report.tokens.header.len(),
            payload_tokens = report.tokens.payload.len(),
            "token passed every phase"
        ),
        Analysis::Error(failure) => tracing::warn!(
            phase = %failure.phase,
            message = %failure.message,
            "token analysis failed"
        ),
    }

    analysis
}

/// Analyzes every token of `tokens` against one reading of the system clock.
///
/// A failing token does not stop the others from being analyzed.
pub fn analyze_batch<I, T>(tokens: I) -> Vec<Analysis>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let current_time = now();
    tokens
        .into_iter()
        .map(|token| analyze_at(token.as_ref(), current_time))
        .collect()
}

fn run_pipeline(
    token: &str,
    current_time: SecondsSinceEpoch,
) -> std::result::Result<AnalysisReport, AnalysisFailure> {
    let lexing = in_phase(Phase::EncodedLexing, tokenize_encoded(token))?;
    let decoded = in_phase(Phase::Decode, codec::decode(&lexing.token))?;

    let header_tokens = in_phase(
        Phase::HeaderLexing,
        tokenize_decoded(&decoded.header_json, Segment::Header),
    )?;
    let payload_tokens = in_phase(
        Phase::PayloadLexing,
        tokenize_decoded(&decoded.payload_json, Segment::Payload),
    )?;

    let derivation = in_phase(
        Phase::Syntax,
        parser::analyze(&lexing.tokens, &header_tokens, &payload_tokens),
    )?;

    let header = in_phase(
        Phase::JsonParsing,
        codec::parse_json_object(&decoded.header_json, Segment::Header),
    )?;
    let payload = in_phase(
        Phase::JsonParsing,
        codec::parse_json_object(&decoded.payload_json, Segment::Payload),
    )?;

    ClaimValidator::new(
        &ClaimMap::from(&header),
        &ClaimMap::from(&payload),
        &decoded.signature_b64,
        current_time,
    )
    .validate()
    .map_err(AnalysisFailure::semantic)?;
    tracing::debug!(phase = %Phase::Semantic, "phase completed");

    Ok(AnalysisReport {
        header,
        payload,
        signature: decoded.signature_b64,
        tokens: TokenStreams {
            encoded: lexing.tokens,
            header: header_tokens,
            payload: payload_tokens,
        },
        derivation,
    })
}

fn in_phase<T, E: BhError>(
    phase: Phase,
    result: Result<T, E>,
) -> std::result::Result<T, AnalysisFailure> {
    match result {
        Ok(value) => {
            tracing::debug!(%phase, "phase completed");
            Ok(value)
        }
        Err(error) => Err(AnalysisFailure::new(phase, error)),
    }
}

/// A request to construct a signed token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeRequest {
    /// The header; its `alg` selects the signing algorithm.
    pub header: JsonObject,
    /// The payload.
    pub payload: JsonObject,
    /// The shared secret.
    pub secret: String,
}

/// The outcome of constructing a token and checking its signature right
/// after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTrip {
    /// Whether the freshly produced signature verified.
    pub valid: bool,
    /// The constructed token.
    pub token: String,
}

/// Builds and signs a token from `header` and `payload`.
///
/// The header `alg` must be `HS256` or `HS384`; anything else fails before
/// the token is serialized.
pub fn encode(header: &JsonObject, payload: &JsonObject, secret: &str) -> Result<String, JwtError> {
    let algorithm = header_algorithm(header)?;

    let unsigned =
        codec::encode(header, payload).match_err(|error| JwtError::Codec(error.clone()))?;
    let signature = SignatureContext::new(algorithm, secret.as_bytes(), &unsigned)
        .sign()
        .match_err(|error| JwtError::Signature(error.clone()))?;

    tracing::info!(%algorithm, "token constructed");

    Ok(format!("{unsigned}{SEGMENT_SEPARATOR}{signature}"))
}

/// Builds and signs a token for every request of `requests`.
///
/// A failing request does not stop the others from being served.
pub fn encode_batch(requests: &[EncodeRequest]) -> Vec<Result<String, JwtError>> {
    requests
        .iter()
        .map(|request| encode(&request.header, &request.payload, &request.secret))
        .collect()
}

/// Verifies the signature segment of the compact `token` with `secret`,
/// under the algorithm named by the token's header.
pub fn verify_token(token: &str, secret: &str) -> Result<bool, JwtError> {
    let token = token
        .parse::<Token>()
        .match_err(|error| JwtError::Lexical(error.clone()))?;
    let decoded = codec::decode(&token).match_err(|error| JwtError::Codec(error.clone()))?;
    let header = codec::parse_json_object(&decoded.header_json, Segment::Header)
        .match_err(|error| JwtError::Json(error.clone()))?;

    let algorithm = header_algorithm(&header)?;
    SignatureContext::new(algorithm, secret.as_bytes(), &token.unsigned())
        .verify(token.signature_b64())
        .match_err(|error| JwtError::Signature(error.clone()))
}

/// Builds a token like [`encode`], then immediately verifies its signature.
pub fn verify_round_trip(
    header: &JsonObject,
    payload: &JsonObject,
    secret: &str,
) -> Result<RoundTrip, JwtError> {
    let token = encode(header, payload, secret)?;
    let valid = verify_token(&token, secret)?;

    tracing::info!(valid, "round trip verified");

    Ok(RoundTrip { valid, token })
}

fn header_algorithm(header: &JsonObject) -> Result<SigningAlgorithm, JwtError> {
    let name = match header.get("alg") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => "<missing>".to_owned(),
    };

    signature::resolve(&name)
        .match_err(|error: &SignatureError| JwtError::Signature(error.clone()))
}
