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

use bh_jwt_analyzer::{Analysis, JsonObject, Phase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The number of records returned by a query unless told otherwise.
pub const DEFAULT_LIMIT: usize = 50;

/// Identifier of a stored record, unique within its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a stored analysis accepted its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// The token passed every phase.
    Ok,
    /// The token failed in some phase.
    Error,
}

impl From<&Analysis> for AnalysisStatus {
    fn from(analysis: &Analysis) -> Self {
        if analysis.is_ok() {
            Self::Ok
        } else {
            Self::Error
        }
    }
}

/// A stored token analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// The record identifier.
    pub id: RecordId,
    /// The analyzed token, as submitted.
    pub token: String,
    /// The outcome of the analysis.
    pub result: Analysis,
    /// When the record was stored.
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// The status of the stored outcome.
    pub fn status(&self) -> AnalysisStatus {
        AnalysisStatus::from(&self.result)
    }
}

/// A token construction, before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConstruction {
    /// The header the token was built from.
    pub header: JsonObject,
    /// The payload the token was built from.
    pub payload: JsonObject,
    /// The secret the token was signed with.
    pub secret: String,
    /// The resulting signed token.
    pub signed_token: String,
}

/// A stored token construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionRecord {
    /// The record identifier.
    pub id: RecordId,
    /// The header the token was built from.
    pub header: JsonObject,
    /// The payload the token was built from.
    pub payload: JsonObject,
    /// The secret the token was signed with.
    pub secret: String,
    /// The resulting signed token.
    pub signed_token: String,
    /// When the record was stored.
    pub created_at: DateTime<Utc>,
}

impl ConstructionRecord {
    pub(crate) fn new(
        id: RecordId,
        construction: NewConstruction,
        created_at: DateTime<Utc>,
    ) -> Self {
        let NewConstruction {
            header,
            payload,
            secret,
            signed_token,
        } = construction;

        Self {
            id,
            header,
            payload,
            secret,
            signed_token,
            created_at,
        }
    }
}

/// Filter over stored analyses. Every set field must match; the default
/// query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisQuery {
    /// Only analyses of exactly this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Only analyses with this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AnalysisStatus>,
    /// Only analyses which failed in this phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

impl AnalysisQuery {
    /// A query matching everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the query to analyses of `token`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Restricts the query to analyses with `status`.
    pub fn status(mut self, status: AnalysisStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the query to analyses which failed in `phase`.
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Returns `true` if `record` satisfies this query.
    pub fn matches(&self, record: &AnalysisRecord) -> bool {
        self.token.as_ref().map_or(true, |token| *token == record.token)
            && self.status.map_or(true, |status| status == record.status())
            && self
                .phase
                .map_or(true, |phase| record.result.phase() == Some(phase))
    }
}
