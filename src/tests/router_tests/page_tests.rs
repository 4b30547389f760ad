use crate::tests::utils::{body_string, create_job, init_test_state, send};
use http::Method;
use serde_json::json;

#[test]
fn home_page_lists_bids_and_jobs() {
    let state = init_test_state();
    let resp = send(
        &state,
        Method::PUT,
        "/api/property",
        Some(json!({
            "name": "Maple Court",
            "address_line": "12 Maple Ct",
            "city": "Provo",
            "state_abbr": "UT",
            "postal_code": "84601",
            "unit_count": 24,
        })),
    );
    assert_eq!(resp.status(), 200);
    create_job(&state);

    let resp = send(&state, Method::GET, "/", None);
    assert_eq!(resp.status(), 200);
    let html = body_string(resp);
    assert!(html.contains("Maple Court"));
    assert!(html.contains("id=\"bids\""));
    assert!(html.contains("id=\"jobs\""));
    assert!(html.contains("Dana Reyes"));
}

#[test]
fn job_page_renders_units_and_board() {
    let state = init_test_state();
    let job = create_job(&state);
    let job_id = job["id"].as_str().unwrap();

    let resp = send(&state, Method::GET, &format!("/jobs/{job_id}"), None);
    assert_eq!(resp.status(), 200);
    let html = body_string(resp);
    assert!(html.contains("id=\"units\""));
    assert!(html.contains("Kitchen Cabinets"));
    assert!(html.contains(&format!("/jobs/{job_id}/budget.xlsx")));
}

#[test]
fn budget_export_is_a_spreadsheet() {
    let state = init_test_state();
    let job = create_job(&state);
    let job_id = job["id"].as_str().unwrap();

    let resp = send(&state, Method::GET, &format!("/jobs/{job_id}/budget.xlsx"), None);
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["Content-Type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[test]
fn unknown_page_renders_html_not_found() {
    let state = init_test_state();

    let resp = send(&state, Method::GET, "/nowhere", None);
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
}

#[test]
fn missing_property_is_not_found() {
    let state = init_test_state();

    let resp = send(&state, Method::GET, "/api/property", None);
    assert_eq!(resp.status(), 404);
}
