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

//! Domain-level checks over the decoded header and payload claims.

use std::collections::HashMap;

use bherror::Error;
use serde_json::Value;

use crate::{error::SemanticError, signature::SigningAlgorithm, Result, SecondsSinceEpoch};

mod claims;

pub use claims::{ClaimMap, ValueKind};

/// The header parameters every token must carry.
pub const REQUIRED_HEADER_FIELDS: [&str; 2] = ["alg", "typ"];

/// The only accepted value of the `typ` header parameter.
pub const TOKEN_TYPE: &str = "JWT";

/// Registered claims whose value must be a string.
pub const STRING_CLAIMS: [&str; 4] = ["iss", "sub", "aud", "jti"];

/// Registered claims whose value must be an integer number of seconds.
pub const INTEGER_CLAIMS: [&str; 3] = ["exp", "nbf", "iat"];

/// Runs the semantic checks over one decoded token.
///
/// The checks run in a fixed order and stop at the first violation:
///
/// 1. the header has both `alg` and `typ`,
/// 2. `typ` is `"JWT"`,
/// 3. `alg` is a recognized algorithm,
/// 4. the signature segment is not empty,
/// 5. every registered claim has the right type and no claim is `null` or
///    an empty string,
/// 6. the temporal claims are ordered, and the token is neither expired nor
///    not yet valid at `current_time`,
/// 7. no claim name appears with values of different types.
#[derive(Debug, Clone, Copy)]
pub struct ClaimValidator<'a> {
    header: &'a ClaimMap,
    payload: &'a ClaimMap,
    signature: &'a str,
    current_time: SecondsSinceEpoch,
}

impl<'a> ClaimValidator<'a> {
    /// Creates a validator for the given decoded segments, checking time
    /// claims against `current_time`.
    pub fn new(
        header: &'a ClaimMap,
        payload: &'a ClaimMap,
        signature: &'a str,
        current_time: SecondsSinceEpoch,
    ) -> Self {
        Self {
            header,
            payload,
            signature,
            current_time,
        }
    }

    /// Runs all the checks, returning the first violation.
    pub fn validate(&self) -> Result<(), SemanticError> {
        self.check_required_header_fields()?;
        self.check_type()?;
        self.check_algorithm()?;
        self.check_signature_present()?;
        self.check_claim_types()?;
        self.check_time_claims()?;
        self.check_type_consistency()
    }

    fn check_required_header_fields(&self) -> Result<(), SemanticError> {
        if REQUIRED_HEADER_FIELDS
            .iter()
            .all(|field| self.header.contains(field))
        {
            Ok(())
        } else {
            Err(Error::root(SemanticError::MissingHeaderFields))
        }
    }

    fn check_type(&self) -> Result<(), SemanticError> {
        match self.header.get("typ") {
            Some(Value::String(typ)) if typ == TOKEN_TYPE => Ok(()),
            other => Err(Error::root(SemanticError::InvalidType(describe(other)))),
        }
    }

    fn check_algorithm(&self) -> Result<(), SemanticError> {
        match self.header.get("alg") {
            Some(Value::String(alg)) if SigningAlgorithm::from_name(alg).is_some() => Ok(()),
            other => Err(Error::root(SemanticError::UnrecognizedAlgorithm(
                describe(other),
            ))),
        }
    }

    fn check_signature_present(&self) -> Result<(), SemanticError> {
        if self.signature.trim().is_empty() {
            return Err(Error::root(SemanticError::MissingSignature));
        }
        Ok(())
    }

    fn check_claim_types(&self) -> Result<(), SemanticError> {
        for (name, value) in self.payload.iter() {
            if STRING_CLAIMS.contains(&name) && !value.is_string() {
                return Err(Error::root(SemanticError::ClaimNotString(name.to_owned())));
            }

            if INTEGER_CLAIMS.contains(&name) && ValueKind::of(value) != ValueKind::Integer {
                return Err(Error::root(SemanticError::ClaimNotInteger(name.to_owned())));
            }

            if value.is_null() || value.as_str() == Some("") {
                return Err(Error::root(SemanticError::EmptyClaim(name.to_owned())));
            }
        }
        Ok(())
    }

    fn check_time_claims(&self) -> Result<(), SemanticError> {
        let exp = self.time_claim("exp");
        let nbf = self.time_claim("nbf");
        let iat = self.time_claim("iat");

        if let (Some(exp), Some(nbf), Some(iat)) = (exp, nbf, iat) {
            if !(nbf <= iat && iat <= exp) {
                return Err(Error::root(SemanticError::TemporalOrder(nbf, iat, exp)));
            }
        }

        if let Some(exp) = exp {
            if self.current_time > exp {
                return Err(Error::root(SemanticError::Expired(self.current_time, exp)));
            }
        }

        if let Some(nbf) = nbf {
            if self.current_time < nbf {
                return Err(Error::root(SemanticError::NotYetValid(
                    self.current_time,
                    nbf,
                )));
            }
        }

        Ok(())
    }

    /// Reads an integer time claim. Values beyond `i64` saturate, which only
    /// pushes them further into the future.
    fn time_claim(&self, name: &str) -> Option<SecondsSinceEpoch> {
        let value = self.payload.get(name)?;
        value
            .as_i64()
            .or_else(|| value.as_u64().map(|_| SecondsSinceEpoch::MAX))
    }

    fn check_type_consistency(&self) -> Result<(), SemanticError> {
        let mut symbols: HashMap<&str, ValueKind> = HashMap::new();

        for (name, value) in self.payload.iter() {
            let kind = ValueKind::of(value);
            match symbols.get(name) {
                Some(&declared) if declared != kind => {
                    return Err(Error::root(SemanticError::InconsistentClaimType(
                        name.to_owned(),
                        declared,
                        kind,
                    )));
                }
                Some(_) => {}
                None => {
                    symbols.insert(name, kind);
                }
            }
        }
        Ok(())
    }
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "nothing".to_owned(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::{error::SemanticCode, json_object};

    const NOW: SecondsSinceEpoch = 1_700_000_000;

    fn header() -> ClaimMap {
        ClaimMap::from(json_object!({ "alg": "HS256", "typ": "JWT" }))
    }

    fn validate(header: &ClaimMap, payload: &ClaimMap, signature: &str) -> SemanticError {
        ClaimValidator::new(header, payload, signature, NOW)
            .validate()
            .unwrap_err()
            .error
    }

    fn validate_payload(payload: crate::JsonObject) -> Result<(), SemanticError> {
        ClaimValidator::new(&header(), &payload.into(), "c2ln", NOW).validate()
    }

    #[test]
    fn test_valid_claims() {
        validate_payload(json_object!({
            "iss": "issuer",
            "sub": "alice",
            "nbf": NOW - 10,
            "iat": NOW - 5,
            "exp": NOW + 3600,
            "admin": true,
            "profile": { "name": "" },
        }))
        .unwrap();

        validate_payload(json_object!({})).unwrap();
    }

    #[test]
    fn test_missing_header_fields() {
        let header = ClaimMap::from(json_object!({ "alg": "none" }));
        let error = validate(&header, &ClaimMap::new(), "");

        assert_eq!(error, SemanticError::MissingHeaderFields);
        assert_eq!(error.code(), SemanticCode::E1);
    }

    #[test]
    fn test_invalid_type() {
        let header = ClaimMap::from(json_object!({ "alg": "HS256", "typ": "JWS" }));
        let error = validate(&header, &ClaimMap::new(), "c2ln");

        assert_eq!(error, SemanticError::InvalidType("\"JWS\"".to_owned()));
        assert_eq!(error.code(), SemanticCode::E2);
    }

    #[test]
    fn test_unrecognized_algorithm() {
        let header = ClaimMap::from(json_object!({ "alg": "none", "typ": "JWT" }));
        let error = validate(&header, &ClaimMap::new(), "");

        assert_eq!(error.code(), SemanticCode::E3);
        assert_eq!(error.to_string(), "E3: unrecognized algorithm \"none\"");

        let header = ClaimMap::from(json_object!({ "alg": 256, "typ": "JWT" }));
        assert_eq!(validate(&header, &ClaimMap::new(), "").code(), SemanticCode::E3);
    }

    #[test]
    fn test_recognized_algorithms() {
        for alg in ["HS256", "HS384", "RS256", "ES256"] {
            let header = ClaimMap::from(json_object!({ "alg": alg, "typ": "JWT" }));
            ClaimValidator::new(&header, &ClaimMap::new(), "c2ln", NOW)
                .validate()
                .unwrap();
        }
    }

    #[test]
    fn test_missing_signature() {
        let error = validate(&header(), &ClaimMap::new(), "  ");

        assert_eq!(error, SemanticError::MissingSignature);
        assert_eq!(error.code(), SemanticCode::E7);
    }

    #[test]
    fn test_claim_types() {
        let error = validate_payload(json_object!({ "sub": 42 })).unwrap_err();
        assert_eq!(error.error, SemanticError::ClaimNotString("sub".to_owned()));
        assert_eq!(error.error.code(), SemanticCode::E4);

        let error = validate_payload(json_object!({ "iat": "yesterday" })).unwrap_err();
        assert_eq!(error.error, SemanticError::ClaimNotInteger("iat".to_owned()));
        assert_eq!(error.error.code(), SemanticCode::E5);

        let error = validate_payload(json_object!({ "exp": 1.5 })).unwrap_err();
        assert_eq!(error.error, SemanticError::ClaimNotInteger("exp".to_owned()));

        let error = validate_payload(json_object!({ "nbf": true })).unwrap_err();
        assert_eq!(error.error, SemanticError::ClaimNotInteger("nbf".to_owned()));
    }

    #[test]
    fn test_empty_claims() {
        let error = validate_payload(json_object!({ "name": "" })).unwrap_err();
        assert_eq!(error.error, SemanticError::EmptyClaim("name".to_owned()));
        assert_eq!(error.error.code(), SemanticCode::E6);

        let error = validate_payload(json_object!({ "name": null })).unwrap_err();
        assert_eq!(error.error, SemanticError::EmptyClaim("name".to_owned()));

        // the type check of a registered claim comes first
        let error = validate_payload(json_object!({ "iss": null })).unwrap_err();
        assert_eq!(error.error, SemanticError::ClaimNotString("iss".to_owned()));
    }

    #[test]
    fn test_temporal_order() {
        let error = validate_payload(json_object!({
            "nbf": NOW - 10,
            "iat": NOW - 20,
            "exp": NOW + 10,
        }))
        .unwrap_err();

        assert_eq!(
            error.error,
            SemanticError::TemporalOrder(NOW - 10, NOW - 20, NOW + 10)
        );
        assert_eq!(error.error.code(), SemanticCode::E6);

        // without all three claims there is no ordering to check
        validate_payload(json_object!({ "iat": NOW + 10, "exp": NOW + 5 })).unwrap();
    }

    #[test]
    fn test_expired() {
        let error = validate_payload(json_object!({ "exp": 100 })).unwrap_err();

        assert_eq!(error.error, SemanticError::Expired(NOW, 100));
        assert_eq!(error.error.code(), SemanticCode::E4);

        validate_payload(json_object!({ "exp": NOW })).unwrap();
    }

    #[test]
    fn test_not_yet_valid() {
        let error = validate_payload(json_object!({ "nbf": NOW + 60 })).unwrap_err();

        assert_eq!(error.error, SemanticError::NotYetValid(NOW, NOW + 60));
        assert_eq!(error.error.code(), SemanticCode::E5);

        validate_payload(json_object!({ "nbf": NOW })).unwrap();
        validate_payload(json_object!({ "exp": u64::MAX })).unwrap();
    }

    #[test]
    fn test_inconsistent_claim_types() {
        let payload: ClaimMap = [("role", json!("admin")), ("role", json!(["admin"]))]
            .into_iter()
            .collect();
        let error = validate(&header(), &payload, "c2ln");

        assert_matches!(
            error,
            SemanticError::InconsistentClaimType(ref name, ValueKind::String, ValueKind::Array)
                if name == "role"
        );
        assert_eq!(error.code(), SemanticCode::E6);

        let payload: ClaimMap = [("role", json!("admin")), ("role", json!("user"))]
            .into_iter()
            .collect();
        ClaimValidator::new(&header(), &payload, "c2ln", NOW)
            .validate()
            .unwrap();
    }
}
