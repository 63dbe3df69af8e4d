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

use bh_jwt_analyzer::{
    analyze_at, encode_batch, json_object, verify_round_trip, verify_token, Analysis,
    EncodeRequest,
};

/// Current time in seconds from the UNIX epoch.
const CURRENT_TIME: i64 = 1_700_000_000;

/// The secret shared between the issuer and the verifier.
const SECRET: &str = "Furina";

fn main() {
    let header = json_object!({ "alg": "HS256", "typ": "JWT" });
    let payload = json_object!({
        "sub": "alice",
        "iat": CURRENT_TIME,
        "nbf": CURRENT_TIME,
        "exp": CURRENT_TIME + 3600,
        "admin": true,
    });

    // construct the token and check its signature right away
    let round_trip = verify_round_trip(&header, &payload, SECRET).unwrap();
    assert!(round_trip.valid);
    println!("Constructed: {}", round_trip.token);

    // run the whole validation pipeline over it
    match analyze_at(&round_trip.token, CURRENT_TIME) {
        Analysis::Ok(report) => {
            println!(
                "Valid token with {} header and {} payload tokens",
                report.tokens.header.len(),
                report.tokens.payload.len()
            );
            for node in report.derivation.iter() {
                println!("  {} [{}]", node.rule, node.value);
            }
        }
        Analysis::Error(failure) => println!("Rejected in {}: {}", failure.phase, failure.message),
    }

    // the signature does not verify with some other secret
    assert!(!verify_token(&round_trip.token, "Neuvillette").unwrap());

    // a couple of broken tokens, each failing in its own phase
    for token in [
        "abc.def",
        "eyJhbGciOiJub25lIn0.eyJpZCI6MX0.",
        ".....broken.token.here.....",
    ] {
        let analysis = analyze_at(token, CURRENT_TIME);
        println!(
            "{token}: {}",
            serde_json::to_string(&analysis).unwrap()
        );
    }

    // batch construction keeps going past a failing request
    let requests = [
        EncodeRequest {
            header: json_object!({ "alg": "HS384", "typ": "JWT" }),
            payload: json_object!({ "sub": "bob" }),
            secret: SECRET.to_owned(),
        },
        EncodeRequest {
            header: json_object!({ "alg": "RS256", "typ": "JWT" }),
            payload: json_object!({ "sub": "carol" }),
            secret: SECRET.to_owned(),
        },
    ];
    for outcome in encode_batch(&requests) {
        match outcome {
            Ok(token) => println!("Encoded: {token}"),
            Err(error) => println!("Not encoded: {}", error.error),
        }
    }
}
