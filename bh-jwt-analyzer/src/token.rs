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

use std::str::FromStr;

use bherror::Error;
use serde::{Deserialize, Serialize};

use crate::error::LexicalError;

pub(crate) const SEGMENT_SEPARATOR: char = '.';

/// One of the three components of a compact token.
#[derive(
    strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Segment {
    /// The JOSE header.
    Header,
    /// The claims.
    Payload,
    /// The signature over `header.payload`.
    Signature,
}

impl Segment {
    /// All segments, in the order in which they appear in a token.
    pub const ALL: [Segment; 3] = [Segment::Header, Segment::Payload, Segment::Signature];
}

/// A compact token split into its three raw, still encoded, segments.
///
/// Only the segment count and the presence of the header and payload are
/// checked when parsing; the alphabet of the segments is the concern of
/// [`crate::lexer::tokenize_encoded`]. The signature segment may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    header: String,
    payload: String,
    signature: String,
}

impl Token {
    /// The base64url encoded header.
    pub fn header_b64(&self) -> &str {
        &self.header
    }

    /// The base64url encoded payload.
    pub fn payload_b64(&self) -> &str {
        &self.payload
    }

    /// The base64url encoded signature, possibly empty.
    pub fn signature_b64(&self) -> &str {
        &self.signature
    }

    /// Returns the raw text of the given segment.
    pub fn segment(&self, segment: Segment) -> &str {
        match segment {
            Segment::Header => &self.header,
            Segment::Payload => &self.payload,
            Segment::Signature => &self.signature,
        }
    }

    /// Returns all segments paired with their raw text, in token order.
    pub fn segments(&self) -> [(Segment, &str); 3] {
        Segment::ALL.map(|segment| (segment, self.segment(segment)))
    }

    /// The text over which the signature is computed, i.e. `header.payload`.
    pub fn unsigned(&self) -> String {
        format!("{}{SEGMENT_SEPARATOR}{}", self.header, self.payload)
    }
}

impl FromStr for Token {
    type Err = Error<LexicalError>;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.trim().split(SEGMENT_SEPARATOR).collect();

        let &[header, payload, signature] = parts.as_slice() else {
            return Err(Error::root(LexicalError::Structure(parts.len())));
        };

        for (segment, text) in [(Segment::Header, header), (Segment::Payload, payload)] {
            if text.is_empty() {
                return Err(Error::root(LexicalError::EmptySegment(segment)));
            }
        }

        Ok(Self {
            header: header.to_owned(),
            payload: payload.to_owned(),
            signature: signature.to_owned(),
        })
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SEGMENT_SEPARATOR}{}{SEGMENT_SEPARATOR}{}",
            self.header, self.payload, self.signature
        )
    }
}

/// The kind of a [`LexToken`].
///
/// The first three kinds are produced by the encoded-token lexer, the rest by
/// the decoded-segment lexer.
#[derive(
    strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// The encoded header segment.
    #[serde(rename = "HEADER_TOKEN")]
    #[strum(to_string = "HEADER_TOKEN")]
    HeaderSegment,
    /// The encoded payload segment.
    #[serde(rename = "PAYLOAD_TOKEN")]
    #[strum(to_string = "PAYLOAD_TOKEN")]
    PayloadSegment,
    /// The encoded signature segment.
    #[serde(rename = "SIGNATURE_TOKEN")]
    #[strum(to_string = "SIGNATURE_TOKEN")]
    SignatureSegment,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// A quoted string or a bare alphanumeric word.
    String,
    /// `true` or `false`.
    Boolean,
}

impl TokenKind {
    /// The token kind the encoded-token lexer emits for `segment`.
    pub fn for_segment(segment: Segment) -> Self {
        match segment {
            Segment::Header => Self::HeaderSegment,
            Segment::Payload => Self::PayloadSegment,
            Segment::Signature => Self::SignatureSegment,
        }
    }
}

/// A lexical token: its kind and the literal text it was produced from.
///
/// For strings the literal is the body without the surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexToken {
    /// The kind of the token.
    pub kind: TokenKind,
    /// The matched text.
    pub literal: String,
    #[serde(skip)]
    pub(crate) quoted: bool,
}

impl LexToken {
    pub(crate) fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
            quoted: false,
        }
    }

    /// A string token read from a quoted literal.
    pub(crate) fn quoted(literal: impl Into<String>) -> Self {
        Self {
            quoted: true,
            ..Self::new(TokenKind::String, literal)
        }
    }
}

impl std::fmt::Display for LexToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_segments() {
        let token: Token = "  aGVhZGVy.cGF5bG9hZA.c2ln \n".parse().unwrap();

        assert_eq!(token.header_b64(), "aGVhZGVy");
        assert_eq!(token.payload_b64(), "cGF5bG9hZA");
        assert_eq!(token.signature_b64(), "c2ln");
        assert_eq!(token.unsigned(), "aGVhZGVy.cGF5bG9hZA");
        assert_eq!(token.to_string(), "aGVhZGVy.cGF5bG9hZA.c2ln");
    }

    #[test]
    fn test_parse_wrong_segment_count() {
        for (input, count) in [("abc", 1), ("abc.def", 2), ("a.b.c.d", 4), ("", 1)] {
            let error = input.parse::<Token>().unwrap_err();
            assert_eq!(error.error, LexicalError::Structure(count), "input `{input}`");
        }

        let error = ".....broken.token.here.....".parse::<Token>().unwrap_err();
        assert!(matches!(error.error, LexicalError::Structure(_)));
    }

    #[test]
    fn test_parse_empty_segments() {
        let error = "eyJhbGciOiJIUzI1NiJ9..signature"
            .parse::<Token>()
            .unwrap_err();
        assert_eq!(error.error, LexicalError::EmptySegment(Segment::Payload));

        let error = ".e30.signature".parse::<Token>().unwrap_err();
        assert_eq!(error.error, LexicalError::EmptySegment(Segment::Header));

        let token: Token = "eyJhbGciOiJub25lIn0.eyJpZCI6MX0.".parse().unwrap();
        assert_eq!(token.signature_b64(), "");
    }

    #[test]
    fn test_token_kind_names() {
        assert_eq!(TokenKind::HeaderSegment.to_string(), "HEADER_TOKEN");
        assert_eq!(TokenKind::LBrace.to_string(), "L_BRACE");
        assert_eq!(
            serde_json::to_value(TokenKind::SignatureSegment).unwrap(),
            "SIGNATURE_TOKEN"
        );
        assert_eq!(serde_json::to_value(TokenKind::RBrace).unwrap(), "R_BRACE");
    }
}
