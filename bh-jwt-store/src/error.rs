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

use bh_jwt_analyzer::JwtError;

/// Error type returned by [`TokenStore`](crate::TokenStore) implementations.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum StoreError {
    /// A writer panicked while holding the store lock.
    #[strum(to_string = "Store lock poisoned")]
    LockPoisoned,

    /// The requested token could not be constructed, so there is nothing to
    /// record.
    #[strum(to_string = "Token construction failed: {0}")]
    Construction(JwtError),
}

impl bherror::BhError for StoreError {}
