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

use bherror::Error;

use crate::{
    error::LexicalError,
    token::{LexToken, Segment, TokenKind},
    Result,
};

const JSON_PUNCTUATION: [char; 8] = ['{', '}', ':', ',', '"', ' ', '-', '_'];

fn is_json_alphabet_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || JSON_PUNCTUATION.contains(&character)
}

/// Tokenizes the decoded JSON text of the `segment`.
///
/// The text is first checked against the restricted alphabet of letters,
/// digits and `{ } : , " - _` plus space. Then:
/// - braces, colons and commas become single-character tokens,
/// - a `"`-delimited run becomes a [`TokenKind::String`] whose body may only
///   hold alphanumerics and spaces,
/// - a maximal alphanumeric run outside quotes becomes a
///   [`TokenKind::Boolean`] when it reads `true` or `false`, and a
///   [`TokenKind::String`] otherwise (numbers included),
/// - spaces between tokens are skipped.
pub fn tokenize_decoded(json: &str, segment: Segment) -> Result<Vec<LexToken>, LexicalError> {
    if let Some(character) = json.chars().find(|&c| !is_json_alphabet_char(c)) {
        return Err(Error::root(LexicalError::DecodedAlphabet(
            segment, character,
        )));
    }

    DecodedLexer::new(json, segment).tokenize()
}

/// Scanner over text that already passed the alphabet check, so every
/// character is a single ASCII byte.
struct DecodedLexer<'a> {
    text: &'a str,
    segment: Segment,
    position: usize,
    tokens: Vec<LexToken>,
}

impl<'a> DecodedLexer<'a> {
    fn new(text: &'a str, segment: Segment) -> Self {
        Self {
            text,
            segment,
            position: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.position).copied()
    }

    fn tokenize(mut self) -> Result<Vec<LexToken>, LexicalError> {
        while let Some(byte) = self.peek() {
            match byte {
                b' ' => self.position += 1,
                b'{' => self.punctuation(TokenKind::LBrace, "{"),
                b'}' => self.punctuation(TokenKind::RBrace, "}"),
                b':' => self.punctuation(TokenKind::Colon, ":"),
                b',' => self.punctuation(TokenKind::Comma, ","),
                b'"' => self.quoted_string()?,
                byte if byte.is_ascii_alphanumeric() => self.bare_word(),
                other => {
                    return Err(Error::root(LexicalError::UnexpectedCharacter(
                        self.segment,
                        other as char,
                        self.position,
                    )))
                }
            }
        }

        Ok(self.tokens)
    }

    fn punctuation(&mut self, kind: TokenKind, literal: &'static str) {
        self.tokens.push(LexToken::new(kind, literal));
        self.position += 1;
    }

    fn quoted_string(&mut self) -> Result<(), LexicalError> {
        // skip the opening quote
        self.position += 1;
        let start = self.position;

        loop {
            match self.peek() {
                Some(b'"') => break,
                Some(byte) if byte.is_ascii_alphanumeric() || byte == b' ' => self.position += 1,
                Some(other) => {
                    return Err(Error::root(LexicalError::StringFormat(
                        self.segment,
                        format!(
                            "character '{}' at position {}; only letters, digits and spaces are allowed",
                            other as char, self.position
                        ),
                    )))
                }
                None => {
                    return Err(Error::root(LexicalError::StringFormat(
                        self.segment,
                        format!("string starting at position {} is not terminated", start - 1),
                    )))
                }
            }
        }

        self.tokens.push(LexToken::quoted(&self.text[start..self.position]));
        // skip the closing quote
        self.position += 1;

        Ok(())
    }

    fn bare_word(&mut self) {
        let start = self.position;
        while self.peek().is_some_and(|byte| byte.is_ascii_alphanumeric()) {
            self.position += 1;
        }

        let word = &self.text[start..self.position];
        let kind = match word {
            "true" | "false" => TokenKind::Boolean,
            _ => TokenKind::String,
        };
        self.tokens.push(LexToken::new(kind, word));
    }
}
