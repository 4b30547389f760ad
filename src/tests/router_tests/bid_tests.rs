use crate::tests::utils::{bid_payload, body_json, create_bid, init_test_state, seed_units, send};
use http::Method;
use serde_json::json;

#[test]
fn create_bid_returns_created_with_temporal_status() {
    let state = init_test_state();

    let resp = send(&state, Method::POST, "/api/bids", Some(bid_payload()));
    assert_eq!(resp.status(), 201);

    let bid = body_json(resp);
    assert_eq!(bid["status"], "pending");
    assert_eq!(bid["requester_email"], "dana@example.com");
    assert_eq!(bid["temporal_status"], "In Progress");
    assert_eq!(bid["days_to_complete"], 75);
}

#[test]
fn bid_ending_before_it_starts_is_unprocessable() {
    let state = init_test_state();
    let mut payload = bid_payload();
    payload["start_date"] = json!("2024-04-01");

    let resp = send(&state, Method::POST, "/api/bids", Some(payload));
    assert_eq!(resp.status(), 422);

    let body = body_json(resp);
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("Validation"));
}

#[test]
fn bid_with_unknown_category_is_rejected() {
    let state = init_test_state();
    let mut payload = bid_payload();
    payload["job_categories"] = json!(["cat-swimming-pool"]);

    let resp = send(&state, Method::POST, "/api/bids", Some(payload));
    assert_eq!(resp.status(), 422);
}

#[test]
fn malformed_json_is_a_bad_request() {
    let state = init_test_state();
    let req = http::Request::builder()
        .method(Method::POST)
        .uri("/api/bids")
        .body(astra::Body::from("{not json".to_string()))
        .unwrap();

    let resp = crate::router::respond(req, &state);
    assert_eq!(resp.status(), 400);
}

#[test]
fn list_bids_filters_by_status() {
    let state = init_test_state();
    let first = create_bid(&state);
    let second = create_bid(&state);

    let resp = send(&state, Method::POST, &format!("/api/bids/{second}/reject"), None);
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp)["status"], "rejected");

    let all = body_json(send(&state, Method::GET, "/api/bids", None));
    assert_eq!(all.as_array().unwrap().len(), 2);

    let pending = body_json(send(&state, Method::GET, "/api/bids?status=pending", None));
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], first.as_str());
    assert_eq!(pending[0]["temporal_status"], "In Progress");

    let resp = send(&state, Method::GET, "/api/bids?status=archived", None);
    assert_eq!(resp.status(), 400);
}

#[test]
fn accept_promotes_and_second_accept_conflicts() {
    let state = init_test_state();
    seed_units(&state);
    let bid_id = create_bid(&state);

    let resp = send(&state, Method::POST, &format!("/api/bids/{bid_id}/accept"), None);
    assert_eq!(resp.status(), 201);
    let job = body_json(resp);
    assert_eq!(job["id"], bid_id.as_str());
    assert_eq!(job["units"].as_array().unwrap().len(), 2);
    assert_eq!(job["summary"]["task_count"], 4);
    assert_eq!(job["units"][0]["tasks"][0]["status"], "Not Started");

    let resp = send(&state, Method::POST, &format!("/api/bids/{bid_id}/accept"), None);
    assert_eq!(resp.status(), 409);

    let bid = body_json(send(&state, Method::GET, &format!("/api/bids/{bid_id}"), None));
    assert_eq!(bid["status"], "accepted");
}

#[test]
fn unknown_bid_is_not_found_as_json() {
    let state = init_test_state();

    let resp = send(&state, Method::GET, "/api/bids/bid-missing", None);
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp)["error"], true);
}

#[test]
fn bid_dates_may_carry_a_time_of_day() {
    let state = init_test_state();
    let mut payload = bid_payload();
    payload["start_date"] = json!("2024-01-15T08:30");
    payload["end_date"] = json!("2024-03-30T17:00:00");

    let resp = send(&state, Method::POST, "/api/bids", Some(payload));
    assert_eq!(resp.status(), 201);

    let bid = body_json(resp);
    assert_eq!(bid["start_date"], "2024-01-15");
    assert_eq!(bid["end_date"], "2024-03-30");
    assert_eq!(bid["days_to_complete"], 75);

    let mut payload = bid_payload();
    payload["end_date"] = json!("end of March");
    let resp = send(&state, Method::POST, "/api/bids", Some(payload));
    assert_eq!(resp.status(), 400);
}
