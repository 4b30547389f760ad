use crate::db::bids::{accept_bid, get_bid, insert_bid, list_bids, reject_bid};
use crate::db::jobs::{list_jobs, move_task_status, require_job, update_task, update_unit};
use crate::db::reference::{
    get_property, insert_contractor, insert_inventory_unit, known_references, list_contractors,
    list_inventory_units, list_job_categories, save_property,
};
use crate::domain::bid::{BidStatus, NewBid};
use crate::domain::ids::new_id;
use crate::domain::job::{TaskUpdate, UnitUpdate};
use crate::domain::kanban::{Board, MoveOutcome};
use crate::domain::reference::{NewContractor, NewInventoryUnit, Property};
use crate::domain::views::{BidView, JobListItem, JobView};
use crate::errors::ServerError;
use crate::responses::{
    error_to_response, html_response, json_created, json_response, xlsx_response, ResultResp,
};
use crate::spreadsheets::build_budget_workbook;
use crate::state::AppState;
use crate::templates::pages::{home_page, job_page, HomeVm};
use astra::{Request, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Body of a kanban drop.
#[derive(Debug, Deserialize)]
struct MoveRequest {
    target: String,
    #[serde(default)]
    expected_revision: Option<i64>,
}

#[derive(Serialize)]
struct MoveResponse<'a> {
    #[serde(flatten)]
    outcome: &'a MoveOutcome,
    job: JobView<'a>,
}

/// Entry point for the server: routes the request, renders any error and logs the result.
pub fn respond(req: Request, state: &AppState) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let wants_json = path.starts_with("/api/");

    let resp = match handle(req, state) {
        Ok(resp) => resp,
        Err(err) => {
            if err.status_code() >= 500 {
                error!(%method, %path, error = %err, "request failed");
            } else {
                warn!(%method, %path, error = %err, "request rejected");
            }
            error_to_response(err, wants_json)
        }
    };

    info!(%method, %path, status = resp.status().as_u16(), "request");
    resp
}

pub fn handle(mut req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = parse_query(&req);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        // HTML
        ("GET", []) => home(state),
        ("GET", ["jobs", job_id]) => {
            let job = state.db.with_conn(|conn| require_job(conn, job_id))?;
            let view = JobView::new(&job, state.clock.now());
            html_response(job_page(&view, &Board::from_job(&job)))
        }
        ("GET", ["jobs", job_id, "budget.xlsx"]) => {
            let job = state.db.with_conn(|conn| require_job(conn, job_id))?;
            let buffer = build_budget_workbook(&JobView::new(&job, state.clock.now()))?;
            xlsx_response(buffer, &format!("{job_id}-budget.xlsx"))
        }

        // Property and reference data
        ("GET", ["api", "property"]) => {
            let property = state
                .db
                .with_conn(|conn| get_property(conn))?
                .ok_or_else(|| ServerError::NotFound("property has not been onboarded".into()))?;
            json_response(&property)
        }
        ("PUT", ["api", "property"]) => {
            let property: Property = read_json(&mut req)?;
            property.validate()?;
            let now = state.clock.now();
            state
                .db
                .with_conn(|conn| save_property(conn, &property, now))?;
            info!(name = %property.name, "property saved");
            json_response(&property)
        }
        ("GET", ["api", "job-categories"]) => {
            json_response(&state.db.with_conn(|conn| list_job_categories(conn))?)
        }
        ("GET", ["api", "contractors"]) => {
            json_response(&state.db.with_conn(|conn| list_contractors(conn))?)
        }
        ("POST", ["api", "contractors"]) => {
            let payload: NewContractor = read_json(&mut req)?;
            let contractor = payload.into_contractor(new_id("con"))?;
            let now = state.clock.now();
            state
                .db
                .with_conn(|conn| insert_contractor(conn, &contractor, now))?;
            info!(contractor_id = %contractor.id, "contractor created");
            json_created(&contractor)
        }
        ("GET", ["api", "units"]) => {
            json_response(&state.db.with_conn(|conn| list_inventory_units(conn))?)
        }
        ("POST", ["api", "units"]) => {
            let payload: NewInventoryUnit = read_json(&mut req)?;
            let unit = payload.into_unit(new_id("inv"))?;
            let now = state.clock.now();
            state
                .db
                .with_conn(|conn| insert_inventory_unit(conn, &unit, now))?;
            info!(unit_id = %unit.id, unit_number = %unit.unit_number, "inventory unit added");
            json_created(&unit)
        }

        // Bids
        ("GET", ["api", "bids"]) => {
            let status = query
                .get("status")
                .map(|s| s.parse::<BidStatus>())
                .transpose()
                .map_err(ServerError::BadRequest)?;
            let bids = state.db.with_conn(|conn| list_bids(conn, status))?;
            let now = state.clock.now();
            let views: Vec<BidView> = bids.iter().map(|b| BidView::new(b, now)).collect();
            json_response(&views)
        }
        ("POST", ["api", "bids"]) => {
            let payload: NewBid = read_json(&mut req)?;
            let now = state.clock.now();
            let bid = state.db.with_conn(|conn| {
                let known = known_references(conn)?;
                let bid = payload.into_bid(new_id("bid"), now, &known)?;
                insert_bid(conn, &bid)?;
                Ok(bid)
            })?;
            info!(bid_id = %bid.id, scope = bid.scope_type.as_str(), "bid created");
            json_created(&BidView::new(&bid, now))
        }
        ("GET", ["api", "bids", bid_id]) => {
            let bid = state
                .db
                .with_conn(|conn| get_bid(conn, bid_id))?
                .ok_or_else(|| ServerError::NotFound(format!("bid {bid_id}")))?;
            json_response(&BidView::new(&bid, state.clock.now()))
        }
        ("POST", ["api", "bids", bid_id, "accept"]) => {
            let now = state.clock.now();
            let job = state.db.with_conn(|conn| accept_bid(conn, bid_id, now))?;
            json_created(&JobView::new(&job, now))
        }
        ("POST", ["api", "bids", bid_id, "reject"]) => {
            let bid = state.db.with_conn(|conn| reject_bid(conn, bid_id))?;
            json_response(&BidView::new(&bid, state.clock.now()))
        }

        // Jobs
        ("GET", ["api", "jobs"]) => {
            let jobs = state.db.with_conn(|conn| list_jobs(conn))?;
            let now = state.clock.now();
            let items: Vec<JobListItem> = jobs.iter().map(|j| JobListItem::new(j, now)).collect();
            json_response(&items)
        }
        ("GET", ["api", "jobs", job_id]) => {
            let job = state.db.with_conn(|conn| require_job(conn, job_id))?;
            json_response(&JobView::new(&job, state.clock.now()))
        }
        ("GET", ["api", "jobs", job_id, "board"]) => {
            let job = state.db.with_conn(|conn| require_job(conn, job_id))?;
            json_response(&Board::from_job(&job))
        }

        // Tasks and units
        ("PATCH", ["api", "tasks", task_id, "status"]) => {
            let body: MoveRequest = read_json(&mut req)?;
            let (outcome, job) = state.db.with_conn(|conn| {
                move_task_status(
                    conn,
                    task_id,
                    &body.target,
                    body.expected_revision,
                    &state.transitions,
                )
            })?;
            json_response(&MoveResponse {
                outcome: &outcome,
                job: JobView::new(&job, state.clock.now()),
            })
        }
        ("PATCH", ["api", "tasks", task_id]) => {
            let update: TaskUpdate = read_json(&mut req)?;
            let job = state
                .db
                .with_conn(|conn| update_task(conn, task_id, &update))?;
            json_response(&JobView::new(&job, state.clock.now()))
        }
        ("PATCH", ["api", "units", unit_id]) => {
            let update: UnitUpdate = read_json(&mut req)?;
            let job = state
                .db
                .with_conn(|conn| update_unit(conn, unit_id, &update))?;
            json_response(&JobView::new(&job, state.clock.now()))
        }

        _ => Err(ServerError::NotFound(format!("{method} {path}"))),
    }
}

fn home(state: &AppState) -> ResultResp {
    let (property, bids, jobs) = state.db.with_conn(|conn| {
        Ok((get_property(conn)?, list_bids(conn, None)?, list_jobs(conn)?))
    })?;
    let now = state.clock.now();

    let vm = HomeVm {
        property_name: property.map(|p| p.name),
        bids: bids.iter().map(|b| BidView::new(b, now)).collect(),
        jobs: jobs.iter().map(|j| JobListItem::new(j, now)).collect(),
    };
    html_response(home_page(&vm))
}

fn read_json<T: DeserializeOwned>(req: &mut Request) -> Result<T, ServerError> {
    Ok(serde_json::from_reader(req.body_mut().reader())?)
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}
