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

//! Grammar conformance of the encoded token and of its decoded segments.
//!
//! Each decoded segment must follow the flat object grammar
//!
//! ```text
//! object -> '{' (pair (',' pair)*)? '}'
//! pair   -> STRING ':' value
//! value  -> STRING | BOOLEAN | NUMBER | object
//! ```
//!
//! Nested object values are skipped by counting brace depth, so their
//! contents are not grammar-checked; only the balance of their braces is.

use bherror::Error;

use crate::{
    error::GrammarError,
    lexer::is_base64url_char,
    token::{LexToken, Segment, TokenKind},
    Result,
};

mod derivation;

pub use derivation::DerivationNode;

/// The states of the object parser, each named after the construct it
/// expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    /// Expecting `{` opening the object.
    ExpectOpenBrace,
    /// Expecting the first key or `}` closing an empty object.
    ExpectKeyOrClose,
    /// Expecting a key after `,`.
    ExpectKey,
    /// Expecting `:` after a key.
    ExpectColon,
    /// Expecting a value after `:`.
    ExpectValue,
    /// Expecting `,` or `}` after a value.
    ExpectCommaOrClose,
    /// The outermost object has been closed.
    Accepted,
}

impl std::fmt::Display for ParserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let expected = match self {
            Self::ExpectOpenBrace => "'{' opening the object",
            Self::ExpectKeyOrClose => "a STRING key or '}'",
            Self::ExpectKey => "a STRING key",
            Self::ExpectColon => "':' after the key",
            Self::ExpectValue => "a value",
            Self::ExpectCommaOrClose => "',' or '}'",
            Self::Accepted => "the end of input",
        };
        f.write_str(expected)
    }
}

/// Checks the grammar of the whole token: first the encoded segments, then
/// the header object, then the payload object.
///
/// On success, returns the derivation record of the token.
pub fn analyze(
    encoded: &[LexToken],
    header: &[LexToken],
    payload: &[LexToken],
) -> Result<DerivationNode, GrammarError> {
    let segments = check_encoded(encoded)?;
    let header = parse_object(header, Segment::Header)?;
    let payload = parse_object(payload, Segment::Payload)?;

    Ok(DerivationNode::token(segments, header, payload))
}

/// Re-checks that the encoded token consists of the header, payload and
/// signature segments, each a word over `[A-Za-z0-9-_]`.
///
/// Only the signature may be empty.
pub fn check_encoded(encoded: &[LexToken]) -> Result<Vec<DerivationNode>, GrammarError> {
    if encoded.len() != Segment::ALL.len() {
        return Err(Error::root(GrammarError::SegmentCount(encoded.len())));
    }

    encoded
        .iter()
        .zip(Segment::ALL)
        .map(|(token, segment)| {
            let well_formed = token.kind == TokenKind::for_segment(segment)
                && (segment == Segment::Signature || !token.literal.is_empty())
                && token.literal.chars().all(is_base64url_char);

            if well_formed {
                Ok(DerivationNode::segment(&token.literal))
            } else {
                Err(Error::root(GrammarError::InvalidEncodedSegment(segment)))
            }
        })
        .collect()
}

/// Parses the token stream of one decoded segment as a flat object.
pub fn parse_object(
    tokens: &[LexToken],
    segment: Segment,
) -> Result<DerivationNode, GrammarError> {
    let mut state = ParserState::ExpectOpenBrace;
    let mut pairs = Vec::new();
    let mut key = "";
    let mut index = 0;

    while state != ParserState::Accepted {
        let Some(token) = tokens.get(index) else {
            return Err(Error::root(GrammarError::UnexpectedEnd(segment, state)));
        };

        state = match (state, token.kind) {
            (ParserState::ExpectOpenBrace, TokenKind::LBrace) => ParserState::ExpectKeyOrClose,
            (ParserState::ExpectKeyOrClose | ParserState::ExpectCommaOrClose, TokenKind::RBrace) => {
                ParserState::Accepted
            }
            (ParserState::ExpectKeyOrClose | ParserState::ExpectKey, TokenKind::String) => {
                key = &token.literal;
                ParserState::ExpectColon
            }
            (ParserState::ExpectColon, TokenKind::Colon) => ParserState::ExpectValue,
            (ParserState::ExpectValue, TokenKind::String | TokenKind::Boolean) => {
                pairs.push(DerivationNode::pair(key, DerivationNode::scalar(token)));
                ParserState::ExpectCommaOrClose
            }
            (ParserState::ExpectValue, TokenKind::LBrace) => {
                let end = skip_balanced(tokens, index, segment)?;
                pairs.push(DerivationNode::pair(
                    key,
                    DerivationNode::nested_object(&tokens[index..end]),
                ));
                index = end - 1;
                ParserState::ExpectCommaOrClose
            }
            (ParserState::ExpectCommaOrClose, TokenKind::Comma) => ParserState::ExpectKey,
            (state, _) => {
                return Err(Error::root(GrammarError::UnexpectedToken(
                    segment,
                    state,
                    token.to_string(),
                )))
            }
        };
        index += 1;
    }

    if let Some(trailing) = tokens.get(index) {
        return Err(Error::root(GrammarError::TrailingToken(
            segment,
            trailing.to_string(),
        )));
    }

    Ok(DerivationNode::object(segment, pairs))
}

/// Skips the balanced brace region opening at `start`, returning the index
/// just past its closing brace.
fn skip_balanced(
    tokens: &[LexToken],
    start: usize,
    segment: Segment,
) -> Result<usize, GrammarError> {
    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate().skip(start) {
        match token.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Ok(index + 1);
                }
            }
            _ => {}
        }
    }

    Err(Error::root(GrammarError::UnbalancedNestedObject(segment)))
}
