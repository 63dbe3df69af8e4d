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

use std::future::Future;

use bh_jwt_analyzer::Analysis;

use crate::{
    AnalysisQuery, AnalysisRecord, ConstructionRecord, NewConstruction, RecordId, Result,
    StoreError,
};

/// Storage of past token analyses and constructions.
///
/// Implementations must tolerate concurrent writers, but need not order
/// writes from independent callers in any particular way.
pub trait TokenStore: Sync {
    /// Stores the `result` of analyzing `token`.
    fn save_analysis(
        &self,
        token: &str,
        result: &Analysis,
    ) -> impl Future<Output = Result<RecordId, StoreError>> + Send;

    /// Returns at most `limit` analyses matching `query`, newest first.
    fn find_analyses(
        &self,
        query: &AnalysisQuery,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AnalysisRecord>, StoreError>> + Send;

    /// Deletes every stored analysis, returning how many there were.
    fn clear_analyses(&self) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Stores a token construction.
    fn save_construction(
        &self,
        construction: NewConstruction,
    ) -> impl Future<Output = Result<RecordId, StoreError>> + Send;

    /// Returns at most `limit` constructions, newest first.
    fn find_constructions(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ConstructionRecord>, StoreError>> + Send;
}
