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

//! This crate stores the outcomes of [`bh_jwt_analyzer`] for later lookup.
//!
//! # Details
//!
//! The [`TokenStore`] trait is the interface to a store of analysis and
//! construction records. [`InMemoryStore`] implements it without any
//! external service; other backends are expected to implement the trait
//! themselves.
//!
//! A store is always constructed explicitly and handed to whoever needs it.
//! The [`analyze_and_record`] and [`encode_and_record`] helpers run the
//! analyzer and store its outcome in one go.
//!
//! # Examples
//!
//! ```
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! use bh_jwt_store::{analyze_and_record, AnalysisQuery, InMemoryStore, TokenStore, DEFAULT_LIMIT};
//!
//! let store = InMemoryStore::new();
//! let (_, analysis) = analyze_and_record(&store, "abc.def").await.unwrap();
//! assert!(!analysis.is_ok());
//!
//! let records = store
//!     .find_analyses(&AnalysisQuery::all().token("abc.def"), DEFAULT_LIMIT)
//!     .await
//!     .unwrap();
//! assert_eq!(records.len(), 1);
//! # }
//! ```

use bh_jwt_analyzer::{Analysis, EncodeRequest};
use bherror::traits::PropagateError as _;

mod error;
mod memory;
mod records;
mod store;

pub use error::*;
pub use memory::InMemoryStore;
pub use records::*;
pub use store::TokenStore;

/// The [`std::result::Result`] alias used throughout this crate.
pub type Result<T, E> = bherror::Result<T, E>;

/// Analyzes `token` against the system clock and stores the outcome.
pub async fn analyze_and_record<S: TokenStore>(
    store: &S,
    token: &str,
) -> Result<(RecordId, Analysis), StoreError> {
    let analysis = bh_jwt_analyzer::analyze(token);
    let id = store.save_analysis(token, &analysis).await?;
    Ok((id, analysis))
}

/// Constructs the token described by `request` and stores the construction.
///
/// Nothing is stored if the token cannot be constructed.
pub async fn encode_and_record<S: TokenStore>(
    store: &S,
    request: EncodeRequest,
) -> Result<(RecordId, String), StoreError> {
    let signed_token = bh_jwt_analyzer::encode(&request.header, &request.payload, &request.secret)
        .match_err(|error| StoreError::Construction(error.clone()))?;

    let EncodeRequest {
        header,
        payload,
        secret,
    } = request;
    let id = store
        .save_construction(NewConstruction {
            header,
            payload,
            secret,
            signed_token: signed_token.clone(),
        })
        .await?;

    Ok((id, signed_token))
}
