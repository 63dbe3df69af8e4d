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

use serde::{Deserialize, Serialize};

use crate::token::{LexToken, Segment, TokenKind};

pub(crate) const RULE_TOKEN: &str = "token -> segment '.' segment '.' segment";
pub(crate) const RULE_SEGMENT: &str = "segment -> base64url-char*";
pub(crate) const RULE_OBJECT: &str = "object -> '{' (pair (',' pair)*)? '}'";
pub(crate) const RULE_PAIR: &str = "pair -> STRING ':' value";
pub(crate) const RULE_STRING: &str = "value -> STRING";
pub(crate) const RULE_NUMBER: &str = "value -> NUMBER";
pub(crate) const RULE_BOOLEAN: &str = "value -> BOOLEAN";
pub(crate) const RULE_NESTED_OBJECT: &str = "value -> object";

/// A node of the derivation record built while parsing.
///
/// The record is informational; whether a token parses is decided by the
/// parser alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationNode {
    /// The grammar rule which matched.
    pub rule: String,
    /// The matched value: segment text, key, literal or segment name.
    pub value: String,
    /// Child nodes, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DerivationNode>,
}

impl DerivationNode {
    fn new(rule: &str, value: impl Into<String>, children: Vec<DerivationNode>) -> Self {
        Self {
            rule: rule.to_owned(),
            value: value.into(),
            children,
        }
    }

    pub(crate) fn token(
        segments: Vec<DerivationNode>,
        header: DerivationNode,
        payload: DerivationNode,
    ) -> Self {
        let mut children = segments;
        children.push(header);
        children.push(payload);
        Self::new(RULE_TOKEN, "", children)
    }

    pub(crate) fn segment(literal: &str) -> Self {
        Self::new(RULE_SEGMENT, literal, Vec::new())
    }

    pub(crate) fn object(segment: Segment, pairs: Vec<DerivationNode>) -> Self {
        Self::new(RULE_OBJECT, segment.to_string(), pairs)
    }

    pub(crate) fn pair(key: &str, value: DerivationNode) -> Self {
        Self::new(RULE_PAIR, key, vec![value])
    }

    /// A scalar value. Bare words made only of ASCII digits are number literals.
    pub(crate) fn scalar(token: &LexToken) -> Self {
        let rule = match token.kind {
            TokenKind::Boolean => RULE_BOOLEAN,
            _ if !token.quoted && is_number_literal(&token.literal) => RULE_NUMBER,
            _ => RULE_STRING,
        };
        Self::new(rule, token.literal.as_str(), Vec::new())
    }

    /// A nested object value, whose contents are not descended into.
    pub(crate) fn nested_object(tokens: &[LexToken]) -> Self {
        let text: String = tokens.iter().map(|token| token.literal.as_str()).collect();
        Self::new(RULE_NESTED_OBJECT, text, Vec::new())
    }

    /// Depth-first iterator over this node and all its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &DerivationNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

fn is_number_literal(literal: &str) -> bool {
    !literal.is_empty() && literal.bytes().all(|byte| byte.is_ascii_digit())
}
