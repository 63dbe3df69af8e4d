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

//! Lexical analysis over the two alphabets of a compact token.
//!
//! The encoded token is scanned against the base64url alphabet by
//! [`tokenize_encoded`], and each decoded JSON segment against a restricted
//! JSON alphabet by [`tokenize_decoded`].

mod decoded;
mod encoded;

pub use decoded::tokenize_decoded;
pub use encoded::{tokenize_encoded, EncodedLexing};

pub(crate) use encoded::is_base64url_char;
