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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate validates and constructs compact [JSON Web Tokens (JWT)][1]
//! signed with a shared secret, treating validation as a compiler pipeline.
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7519
//!
//! # Details
//!
//! A token is validated by [`analyze`] (or [`analyze_at`] with an explicit
//! current time) in the following phases, stopping at the first failure:
//!
//! 1. [`lexer::tokenize_encoded`] checks the three segments against the
//!    base64url alphabet,
//! 2. [`codec::decode`] decodes the header and payload,
//! 3. [`lexer::tokenize_decoded`] scans each decoded segment against a
//!    restricted JSON alphabet,
//! 4. [`parser::analyze`] checks the grammar and records the derivation,
//! 5. [`codec::parse_json_object`] turns both segments into JSON objects,
//! 6. [`semantic::ClaimValidator`] checks the header and the claims.
//!
//! The outcome is always an [`Analysis`]; failures name their [`Phase`].
//!
//! Tokens are constructed by [`encode`], which signs with `HS256` or
//! `HS384` through [`signature::SignatureContext`].
//!
//! # Examples
//!
//! ```
//! use bh_jwt_analyzer::{analyze_at, json_object, verify_round_trip, Phase, SemanticCode};
//!
//! let header = json_object!({ "alg": "HS256", "typ": "JWT" });
//! let payload = json_object!({ "sub": "alice", "exp": 1700003600 });
//!
//! let round_trip = verify_round_trip(&header, &payload, "secret").unwrap();
//! assert!(round_trip.valid);
//!
//! let analysis = analyze_at(&round_trip.token, 1700000000);
//! assert_eq!(analysis.report().unwrap().payload, payload);
//!
//! // an hour later the token is expired
//! let analysis = analyze_at(&round_trip.token, 1700007200);
//! assert_eq!(analysis.phase(), Some(Phase::Semantic));
//! assert_eq!(analysis.code(), Some(SemanticCode::E4));
//! ```

pub mod codec;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod signature;

mod error;
mod pipeline;
mod token;

pub use error::*;
pub use pipeline::*;
pub use token::{LexToken, Segment, Token, TokenKind};

/// A JSON object, as decoded from a header or payload.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// UNIX time, in seconds.
pub type SecondsSinceEpoch = i64;

/// Helper macro with the same syntax as [`serde_json::json`] specialized for
/// constructing JSON objects.
///
/// It will construct a [`JsonObject`] rather than a [`serde_json::Value`],
/// and panic if the syntax is valid JSON but not an object.
#[macro_export]
macro_rules! json_object {
    ($stuff:tt) => {
        match ::serde_json::json!($stuff) {
            ::serde_json::Value::Object(o) => o,
            _ => unreachable!("JSON literal wasn't an object"),
        }
    };
}
