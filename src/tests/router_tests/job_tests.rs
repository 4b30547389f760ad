use crate::tests::utils::{body_json, create_job, init_test_state, send};
use http::Method;
use serde_json::{json, Value};

fn first_task(job: &Value) -> (String, String) {
    let unit = &job["units"][0];
    (
        unit["id"].as_str().unwrap().to_string(),
        unit["tasks"][0]["id"].as_str().unwrap().to_string(),
    )
}

#[test]
fn job_detail_reports_premium_and_variance() {
    let state = init_test_state();
    let job = create_job(&state);
    let (_, task_id) = first_task(&job);

    let resp = send(
        &state,
        Method::PATCH,
        &format!("/api/tasks/{task_id}"),
        Some(json!({ "budget": 14500.0, "invoiced_amount": 8000.0, "contractor_name": "Acme" })),
    );
    assert_eq!(resp.status(), 200);

    let job_id = job["id"].as_str().unwrap();
    let detail = body_json(send(&state, Method::GET, &format!("/api/jobs/{job_id}"), None));
    let unit = &detail["units"][0];

    assert_eq!(unit["premium"]["dollar_amount"], 250.0);
    let pct = unit["premium"]["percentage"].as_f64().unwrap();
    assert!((pct - 20.833333).abs() < 1e-4);

    assert_eq!(unit["variance"]["dollar_amount"], -6500.0);
    let pct = unit["variance"]["percentage"].as_f64().unwrap();
    assert!((pct + 44.827586).abs() < 1e-4);

    assert_eq!(unit["tasks"][0]["contractor_name"], "Acme");
    assert_eq!(detail["temporal_status"], "In Progress");
    assert_eq!(detail["revision"], 1);
}

#[test]
fn kanban_move_updates_board_and_revision() {
    let state = init_test_state();
    let job = create_job(&state);
    let job_id = job["id"].as_str().unwrap();
    let (unit_id, task_id) = first_task(&job);

    let resp = send(
        &state,
        Method::PATCH,
        &format!("/api/tasks/{task_id}/status"),
        Some(json!({ "target": format!("{unit_id}/in_progress"), "expected_revision": 0 })),
    );
    assert_eq!(resp.status(), 200);
    let moved = body_json(resp);
    assert_eq!(moved["outcome"], "moved");
    assert_eq!(moved["from"], "Not Started");
    assert_eq!(moved["to"], "In Progress");
    assert_eq!(moved["job"]["revision"], 1);

    let board = body_json(send(&state, Method::GET, &format!("/api/jobs/{job_id}/board"), None));
    let cells = &board["lanes"][0]["cells"];
    assert_eq!(cells[0]["cell_id"], format!("{unit_id}/not_started"));
    assert_eq!(cells[0]["task_ids"].as_array().unwrap().len(), 1);
    assert_eq!(cells[1]["task_ids"][0], task_id.as_str());
    assert_eq!(board["lanes"][0]["unit_id"], unit_id.as_str());
}

#[test]
fn stale_revision_is_a_conflict() {
    let state = init_test_state();
    let job = create_job(&state);
    let (unit_id, task_id) = first_task(&job);
    let uri = format!("/api/tasks/{task_id}/status");

    let resp = send(
        &state,
        Method::PATCH,
        &uri,
        Some(json!({ "target": format!("{unit_id}/completed"), "expected_revision": 0 })),
    );
    assert_eq!(resp.status(), 200);

    let resp = send(
        &state,
        Method::PATCH,
        &uri,
        Some(json!({ "target": format!("{unit_id}/on_hold"), "expected_revision": 0 })),
    );
    assert_eq!(resp.status(), 409);
    assert_eq!(body_json(resp)["error"], true);
}

#[test]
fn drop_on_another_unit_leaves_task_in_place() {
    let state = init_test_state();
    let job = create_job(&state);
    let (_, task_id) = first_task(&job);
    let other_unit = job["units"][1]["id"].as_str().unwrap();

    let resp = send(
        &state,
        Method::PATCH,
        &format!("/api/tasks/{task_id}/status"),
        Some(json!({ "target": format!("{other_unit}/completed") })),
    );
    assert_eq!(resp.status(), 200);
    let body = body_json(resp);
    assert_eq!(body["outcome"], "unchanged");
    assert_eq!(body["job"]["revision"], 0);
    assert_eq!(body["job"]["units"][0]["tasks"][0]["status"], "Not Started");
}

#[test]
fn unit_update_changes_rents() {
    let state = init_test_state();
    let job = create_job(&state);
    let (unit_id, _) = first_task(&job);

    let resp = send(
        &state,
        Method::PATCH,
        &format!("/api/units/{unit_id}"),
        Some(json!({ "post_rent": 1500.0, "status": "In Progress" })),
    );
    assert_eq!(resp.status(), 200);
    let unit = &body_json(resp)["units"][0];
    assert_eq!(unit["premium"]["dollar_amount"], 300.0);
    assert_eq!(unit["status"], "In Progress");

    let resp = send(
        &state,
        Method::PATCH,
        &format!("/api/units/{unit_id}"),
        Some(json!({ "pre_rent": -1.0 })),
    );
    assert_eq!(resp.status(), 422);
}

#[test]
fn job_list_carries_summaries() {
    let state = init_test_state();
    create_job(&state);

    let jobs = body_json(send(&state, Method::GET, "/api/jobs", None));
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["summary"]["unit_count"], 2);
}

#[test]
fn unknown_task_is_not_found() {
    let state = init_test_state();

    let resp = send(
        &state,
        Method::PATCH,
        "/api/tasks/task-missing/status",
        Some(json!({ "target": "unit-1/completed" })),
    );
    assert_eq!(resp.status(), 404);
}
