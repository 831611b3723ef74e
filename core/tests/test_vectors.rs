//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or error messages. Comparing parsed JSON (not
//! raw strings) avoids false negatives from field-ordering differences.

use poll_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, PollClient};
use serde::Serialize;
use serde_json::Value;

const BASE: &str = "http://localhost:3000/api";

fn client() -> PollClient {
    PollClient::new(BASE)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn str_field<'a>(case: &'a Value, key: &str) -> &'a str {
    case[key].as_str().unwrap_or_else(|| panic!("missing string field `{key}`"))
}

fn token(case: &Value) -> Option<&str> {
    case.get("token").and_then(Value::as_str)
}

fn to_value<T: Serialize>(result: Result<T, ApiError>) -> Result<Value, ApiError> {
    result.map(|v| serde_json::to_value(v).unwrap())
}

/// Drive every case in `raw`: check the built request, then feed the
/// simulated response through `parse` and compare with the expectation.
fn run_vectors<B, P>(raw: &str, build: B, parse: P)
where
    B: Fn(&PollClient, &Value) -> HttpRequest,
    P: Fn(&PollClient, &Value, HttpResponse) -> Result<Value, ApiError>,
{
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let c = client();

    for case in vectors["cases"].as_array().unwrap() {
        let name = str_field(case, "name");
        let expected_req = &case["expected_request"];

        // Verify build
        let req = build(&c, case);
        assert_eq!(req.method, parse_method(str_field(expected_req, "method")), "{name}: method");
        assert_eq!(req.path, format!("{BASE}{}", str_field(expected_req, "path")), "{name}: path");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match &expected_req["body"] {
            Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
            expected => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected, "{name}: body");
            }
        }

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().map(str::to_string),
        };
        let result = parse(&c, case, response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.to_string(), expected_error.as_str().unwrap(), "{name}: error message");
            assert_eq!(
                err.status(),
                Some(sim["status"].as_u64().unwrap() as u16),
                "{name}: error status"
            );
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}

#[test]
fn get_poll_test_vectors() {
    run_vectors(
        include_str!("../../test-vectors/get_poll.json"),
        |c, case| c.build_get_poll(str_field(case, "input_id")),
        |c, _, resp| to_value(c.parse_get_poll(resp)),
    );
}

#[test]
fn create_poll_test_vectors() {
    run_vectors(
        include_str!("../../test-vectors/create_poll.json"),
        |c, case| c.build_create_poll(&case["input"], token(case)).unwrap(),
        |c, _, resp| to_value(c.parse_create_poll(resp)),
    );
}

#[test]
fn list_events_test_vectors() {
    run_vectors(
        include_str!("../../test-vectors/list_events.json"),
        |c, case| c.build_list_events(token(case)),
        |c, _, resp| to_value(c.parse_list_events(resp)),
    );
}

#[test]
fn delete_poll_test_vectors() {
    run_vectors(
        include_str!("../../test-vectors/delete_poll.json"),
        |c, case| c.build_delete_poll(str_field(case, "input_id"), token(case)),
        |c, _, resp| to_value(c.parse_delete_poll(resp)),
    );
}

#[test]
fn votes_test_vectors() {
    run_vectors(
        include_str!("../../test-vectors/votes.json"),
        |c, case| {
            let poll_id = str_field(case, "poll_id");
            match str_field(case, "kind") {
                "submit" => c.build_submit_vote(poll_id, &case["input"]).unwrap(),
                "update" => c
                    .build_update_votes(poll_id, str_field(case, "participant_id"), &case["input"])
                    .unwrap(),
                other => panic!("unknown kind: {other}"),
            }
        },
        |c, case, resp| match str_field(case, "kind") {
            "submit" => to_value(c.parse_submit_vote(resp)),
            _ => to_value(c.parse_update_votes(resp)),
        },
    );
}

#[test]
fn admin_auth_test_vectors() {
    run_vectors(
        include_str!("../../test-vectors/admin_auth.json"),
        |c, case| match str_field(case, "kind") {
            "signup" => c.build_signup_admin(&case["input"]).unwrap(),
            "login" => c.build_login_admin(&case["input"]).unwrap(),
            "logout" => c.build_logout_admin(token(case)),
            other => panic!("unknown kind: {other}"),
        },
        |c, case, resp| match str_field(case, "kind") {
            "signup" => to_value(c.parse_signup_admin(resp)),
            "login" => to_value(c.parse_login_admin(resp)),
            _ => to_value(c.parse_logout_admin(resp)),
        },
    );
}
