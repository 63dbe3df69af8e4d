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

use std::{
    cmp::Reverse,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
};

use bh_jwt_analyzer::Analysis;
use bherror::Error;
use chrono::Utc;

use crate::{
    AnalysisQuery, AnalysisRecord, AnalysisStatus, ConstructionRecord, NewConstruction, RecordId,
    Result, StoreError, TokenStore,
};

/// A [`TokenStore`] keeping every record in memory.
///
/// Locks are only ever held for the synchronous part of an operation, never
/// across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    next_id: AtomicU64,
    analyses: Mutex<Vec<AnalysisRecord>>,
    constructions: Mutex<Vec<ConstructionRecord>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> RecordId {
        RecordId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn analyses(&self) -> Result<MutexGuard<'_, Vec<AnalysisRecord>>, StoreError> {
        self.analyses
            .lock()
            .map_err(|_| Error::root(StoreError::LockPoisoned))
    }

    fn constructions(&self) -> Result<MutexGuard<'_, Vec<ConstructionRecord>>, StoreError> {
        self.constructions
            .lock()
            .map_err(|_| Error::root(StoreError::LockPoisoned))
    }

    fn insert_analysis(&self, token: &str, result: &Analysis) -> Result<RecordId, StoreError> {
        let id = self.next_id();
        let record = AnalysisRecord {
            id,
            token: token.to_owned(),
            result: result.clone(),
            created_at: Utc::now(),
        };
        self.analyses()?.push(record);

        tracing::info!(%id, status = ?AnalysisStatus::from(result), "analysis stored");
        Ok(id)
    }

    fn select_analyses(
        &self,
        query: &AnalysisQuery,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>, StoreError> {
        let mut found: Vec<_> = self
            .analyses()?
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();

        found.sort_by_key(|record| Reverse((record.created_at, record.id)));
        found.truncate(limit);
        Ok(found)
    }

    fn remove_analyses(&self) -> Result<usize, StoreError> {
        let removed = std::mem::take(&mut *self.analyses()?).len();

        tracing::info!(removed, "analyses cleared");
        Ok(removed)
    }

    fn insert_construction(&self, construction: NewConstruction) -> Result<RecordId, StoreError> {
        let id = self.next_id();
        let record = ConstructionRecord::new(id, construction, Utc::now());
        self.constructions()?.push(record);

        tracing::info!(%id, "construction stored");
        Ok(id)
    }

    fn select_constructions(&self, limit: usize) -> Result<Vec<ConstructionRecord>, StoreError> {
        let mut found = self.constructions()?.clone();

        found.sort_by_key(|record| Reverse((record.created_at, record.id)));
        found.truncate(limit);
        Ok(found)
    }
}

impl TokenStore for InMemoryStore {
    async fn save_analysis(&self, token: &str, result: &Analysis) -> Result<RecordId, StoreError> {
        self.insert_analysis(token, result)
    }

    async fn find_analyses(
        &self,
        query: &AnalysisQuery,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>, StoreError> {
        self.select_analyses(query, limit)
    }

    async fn clear_analyses(&self) -> Result<usize, StoreError> {
        self.remove_analyses()
    }

    async fn save_construction(
        &self,
        construction: NewConstruction,
    ) -> Result<RecordId, StoreError> {
        self.insert_construction(construction)
    }

    async fn find_constructions(
        &self,
        limit: usize,
    ) -> Result<Vec<ConstructionRecord>, StoreError> {
        self.select_constructions(limit)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use bh_jwt_analyzer::{analyze_at, json_object, Phase};

    use super::*;
    use crate::DEFAULT_LIMIT;

    const NOW: i64 = 1_700_000_000;

    fn failed(token: &str) -> Analysis {
        let analysis = analyze_at(token, NOW);
        assert!(!analysis.is_ok());
        analysis
    }

    fn valid() -> (String, Analysis) {
        let token = bh_jwt_analyzer::encode(
            &json_object!({ "alg": "HS256", "typ": "JWT" }),
            &json_object!({ "sub": "alice" }),
            "Furina",
        )
        .unwrap();
        let analysis = analyze_at(&token, NOW);
        assert!(analysis.is_ok());
        (token, analysis)
    }

    #[tokio::test]
    async fn test_save_and_find_analyses() {
        let store = InMemoryStore::new();
        let (token, analysis) = valid();

        let first = store.save_analysis("abc", &failed("abc")).await.unwrap();
        let second = store.save_analysis(&token, &analysis).await.unwrap();
        assert_ne!(first, second);

        let found = store
            .find_analyses(&AnalysisQuery::all(), DEFAULT_LIMIT)
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|record| record.id).collect();
        assert_eq!(ids, [second, first]);
        assert_eq!(found[0].result, analysis);
        assert_eq!(found[1].token, "abc");
    }

    #[tokio::test]
    async fn test_query_filters() {
        let store = InMemoryStore::new();
        let (token, analysis) = valid();

        store.save_analysis("abc", &failed("abc")).await.unwrap();
        store.save_analysis(&token, &analysis).await.unwrap();
        let unsigned = "eyJhbGciOiJub25lIn0.eyJpZCI6MX0.";
        store
            .save_analysis(unsigned, &failed(unsigned))
            .await
            .unwrap();

        let by_token = store
            .find_analyses(&AnalysisQuery::all().token("abc"), DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(by_token.len(), 1);
        assert_eq!(by_token[0].token, "abc");

        let ok = store
            .find_analyses(&AnalysisQuery::all().status(AnalysisStatus::Ok), DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].token, token);

        let semantic = store
            .find_analyses(&AnalysisQuery::all().phase(Phase::Semantic), DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(semantic.len(), 1);
        assert_eq!(semantic[0].status(), AnalysisStatus::Error);

        let none = store
            .find_analyses(
                &AnalysisQuery::all()
                    .token("abc")
                    .status(AnalysisStatus::Ok),
                DEFAULT_LIMIT,
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_limit() {
        let store = InMemoryStore::new();
        let analysis = failed("abc");

        for _ in 0..DEFAULT_LIMIT + 5 {
            store.save_analysis("abc", &analysis).await.unwrap();
        }

        let found = store
            .find_analyses(&AnalysisQuery::all(), DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(found.len(), DEFAULT_LIMIT);
        assert_eq!(found[0].id, RecordId(DEFAULT_LIMIT as u64 + 4));

        let found = store.find_analyses(&AnalysisQuery::all(), 0).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_clear_analyses() {
        let store = InMemoryStore::new();
        let analysis = failed("abc");
        store.save_analysis("abc", &analysis).await.unwrap();
        store.save_analysis("abc", &analysis).await.unwrap();

        assert_eq!(store.clear_analyses().await.unwrap(), 2);
        assert_eq!(store.clear_analyses().await.unwrap(), 0);
        assert!(store
            .find_analyses(&AnalysisQuery::all(), DEFAULT_LIMIT)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_constructions() {
        let store = InMemoryStore::new();
        let construction = |signed_token: &str| NewConstruction {
            header: json_object!({ "alg": "HS256", "typ": "JWT" }),
            payload: json_object!({ "sub": "alice" }),
            secret: "Furina".to_owned(),
            signed_token: signed_token.to_owned(),
        };

        let first = store.save_construction(construction("first")).await.unwrap();
        let second = store.save_construction(construction("second")).await.unwrap();

        let found = store.find_constructions(DEFAULT_LIMIT).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, second);
        assert_eq!(found[0].signed_token, "second");
        assert_eq!(found[1].id, first);

        // constructions are kept apart from analyses
        assert_eq!(store.clear_analyses().await.unwrap(), 0);
        assert_eq!(store.find_constructions(1).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers() {
        let store = Arc::new(InMemoryStore::new());
        let analysis = failed("abc");

        let writers: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let analysis = analysis.clone();
                tokio::spawn(async move { store.save_analysis("abc", &analysis).await })
            })
            .collect();

        let mut ids = Vec::new();
        for writer in writers {
            ids.push(writer.await.unwrap().unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);

        let found = store.find_analyses(&AnalysisQuery::all(), 100).await.unwrap();
        assert_eq!(found.len(), 16);
    }

    #[test]
    fn test_poisoned_lock() {
        let store = Arc::new(InMemoryStore::new());

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.analyses.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let error = store.insert_analysis("abc", &failed("abc")).unwrap_err();
        assert_matches!(error.error, StoreError::LockPoisoned);
    }
}
