use crate::db::connection::TempDb;
use crate::db::init_db;
use crate::domain::clock::FixedClock;
use crate::router::respond;
use crate::state::AppState;
use astra::{Body, Response};
use chrono::NaiveDate;
use http::{Method, Request};
use serde_json::Value;
use std::io::Read;
use std::ops::Deref;

/// App state over its own temp-file database; the file goes away with it.
pub struct TestState {
    state: AppState,
    _db: TempDb,
}

impl Deref for TestState {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.state
    }
}

/// Fresh database with the production schema, clock pinned to 2024-02-01.
pub fn init_test_state() -> TestState {
    let tmp = TempDb::new("router");
    let db = tmp.database();
    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    let now = NaiveDate::from_ymd_opt(2024, 2, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    TestState {
        state: AppState::new(db, false).with_clock(FixedClock(now)),
        _db: tmp,
    }
}

pub fn send(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> Response {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    respond(req, state)
}

pub fn body_string(resp: Response) -> String {
    let mut out = String::new();
    resp.into_body().reader().read_to_string(&mut out).unwrap();
    out
}

pub fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}

/// Two inventory units, 101 (1200 -> 1450) and 102 (1100 -> 1300).
pub fn seed_units(state: &AppState) {
    for (number, pre, post) in [("101", 1200.0, 1450.0), ("102", 1100.0, 1300.0)] {
        let resp = send(
            state,
            Method::POST,
            "/api/units",
            Some(serde_json::json!({
                "unit_number": number,
                "floor_plan": "1B/1BA",
                "pre_rent": pre,
                "post_rent": post,
            })),
        );
        assert_eq!(resp.status(), 201);
    }
}

pub fn bid_payload() -> Value {
    serde_json::json!({
        "requester_name": "Dana Reyes",
        "requester_email": "Dana@Example.com",
        "property_ref": "Maple Court",
        "start_date": "2024-01-15",
        "end_date": "2024-03-30",
        "scope_type": "job_category",
        "job_categories": ["cat-kitchen-cabinets", "cat-flooring"],
    })
}

/// Creates a bid through the API and returns its id.
pub fn create_bid(state: &AppState) -> String {
    let resp = send(state, Method::POST, "/api/bids", Some(bid_payload()));
    assert_eq!(resp.status(), 201);
    body_json(resp)["id"].as_str().unwrap().to_string()
}

/// Seeds inventory, creates a bid and accepts it; returns the job JSON.
pub fn create_job(state: &AppState) -> Value {
    seed_units(state);
    let bid_id = create_bid(state);
    let resp = send(state, Method::POST, &format!("/api/bids/{bid_id}/accept"), None);
    assert_eq!(resp.status(), 201);
    body_json(resp)
}
