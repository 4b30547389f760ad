// src/db/bids.rs
use crate::db::jobs::insert_job;
use crate::db::reference::{list_inventory_units, list_job_categories};
use crate::db::{parse_json, parse_text, to_json, write_error};
use crate::domain::bid::{Bid, BidStatus};
use crate::domain::ids::new_id;
use crate::domain::job::Job;
use crate::domain::promotion::promote;
use crate::errors::ServerError;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

const BID_COLUMNS: &str = r#"
    id, requester_name, requester_email, requester_phone, company_name, property_ref,
    start_date, end_date, scope_type, job_categories, units, contractors, notes,
    created_at, status
"#;

fn bid_from_row(row: &Row<'_>) -> rusqlite::Result<Bid> {
    Ok(Bid {
        id: row.get(0)?,
        requester_name: row.get(1)?,
        requester_email: row.get(2)?,
        requester_phone: row.get(3)?,
        company_name: row.get(4)?,
        property_ref: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        scope_type: parse_text(8, row.get(8)?)?,
        job_categories: parse_json(9, row.get(9)?)?,
        units: parse_json(10, row.get(10)?)?,
        contractors: parse_json(11, row.get(11)?)?,
        notes: row.get(12)?,
        created_at: row.get(13)?,
        status: parse_text(14, row.get(14)?)?,
    })
}

pub fn insert_bid(conn: &Connection, bid: &Bid) -> Result<(), ServerError> {
    conn.execute(
        r#"
        insert into bids (
            id, requester_name, requester_email, requester_phone, company_name, property_ref,
            start_date, end_date, scope_type, job_categories, units, contractors, notes,
            created_at, status
        ) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
        params![
            &bid.id,
            &bid.requester_name,
            &bid.requester_email,
            &bid.requester_phone,
            &bid.company_name,
            &bid.property_ref,
            bid.start_date,
            bid.end_date,
            bid.scope_type.as_str(),
            to_json(&bid.job_categories)?,
            to_json(&bid.units)?,
            to_json(&bid.contractors)?,
            &bid.notes,
            bid.created_at,
            bid.status.as_str(),
        ],
    )
    .map_err(|e| write_error("insert bid failed", e))?;
    Ok(())
}

pub fn get_bid(conn: &Connection, bid_id: &str) -> Result<Option<Bid>, ServerError> {
    conn.query_row(
        &format!("select {BID_COLUMNS} from bids where id = ?1"),
        params![bid_id],
        bid_from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("failed to load bid {bid_id}: {e}")))
}

/// Newest first, optionally narrowed to one lifecycle status.
pub fn list_bids(conn: &Connection, status: Option<BidStatus>) -> Result<Vec<Bid>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        r#"
        select {BID_COLUMNS}
        from bids
        where (?1 is null or status = ?1)
        order by created_at desc, id desc
        "#
    ))?;

    let rows = stmt.query_map(params![status.map(BidStatus::as_str)], bid_from_row)?;

    let mut bids = Vec::new();
    for r in rows {
        bids.push(r?);
    }
    Ok(bids)
}

/// Compare-and-set on the status column so a concurrent accept/reject loses cleanly.
fn update_bid_status(
    conn: &Connection,
    bid_id: &str,
    from: BidStatus,
    to: BidStatus,
) -> Result<(), ServerError> {
    let changed = conn.execute(
        "update bids set status = ?1 where id = ?2 and status = ?3",
        params![to.as_str(), bid_id, from.as_str()],
    )?;
    if changed == 0 {
        return Err(ServerError::Conflict(format!(
            "bid {bid_id} is no longer {from}"
        )));
    }
    Ok(())
}

/// Accept a pending bid and promote it into a job, in one transaction.
pub fn accept_bid(
    conn: &mut Connection,
    bid_id: &str,
    now: NaiveDateTime,
) -> Result<Job, ServerError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut bid =
        get_bid(&tx, bid_id)?.ok_or_else(|| ServerError::NotFound(format!("bid {bid_id}")))?;
    bid.transition(BidStatus::Accepted)?;
    update_bid_status(&tx, bid_id, BidStatus::Pending, BidStatus::Accepted)?;

    let inventory = list_inventory_units(&tx)?;
    let categories = list_job_categories(&tx)?;
    let job = promote(&bid, &inventory, &categories, now, new_id)?;
    insert_job(&tx, &job)?;

    tx.commit()?;

    info!(
        bid_id,
        units = job.units.len(),
        tasks = job.task_count(),
        "bid accepted and promoted to job"
    );
    Ok(job)
}

pub fn reject_bid(conn: &mut Connection, bid_id: &str) -> Result<Bid, ServerError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut bid =
        get_bid(&tx, bid_id)?.ok_or_else(|| ServerError::NotFound(format!("bid {bid_id}")))?;
    bid.transition(BidStatus::Rejected)?;
    update_bid_status(&tx, bid_id, BidStatus::Pending, BidStatus::Rejected)?;

    tx.commit()?;

    info!(bid_id, "bid rejected");
    Ok(bid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_connection;
    use crate::db::jobs::get_job;
    use crate::db::reference::known_references;
    use crate::db::reference::tests::{now, seed_inventory};
    use crate::domain::bid::tests::new_bid;
    use crate::domain::bid::ScopeType;

    fn stored_bid(conn: &Connection, id: &str) -> Bid {
        let mut payload = new_bid();
        payload.contractors.clear();
        payload.job_categories = vec!["cat-kitchen-cabinets".into(), "cat-flooring".into()];
        let bid = payload
            .into_bid(id.into(), now(), &known_references(conn).unwrap())
            .unwrap();
        insert_bid(conn, &bid).unwrap();
        bid
    }

    #[test]
    fn bid_round_trips_through_store() {
        let conn = test_connection();
        let bid = stored_bid(&conn, "bid-1");

        let loaded = get_bid(&conn, "bid-1").unwrap().unwrap();
        assert_eq!(loaded, bid);
        assert!(get_bid(&conn, "bid-404").unwrap().is_none());
    }

    #[test]
    fn list_filters_by_status() {
        let mut conn = test_connection();
        stored_bid(&conn, "bid-1");
        stored_bid(&conn, "bid-2");
        reject_bid(&mut conn, "bid-2").unwrap();

        assert_eq!(list_bids(&conn, None).unwrap().len(), 2);
        let pending = list_bids(&conn, Some(BidStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "bid-1");
    }

    #[test]
    fn accept_promotes_inventory_into_job() {
        let mut conn = test_connection();
        seed_inventory(&conn);
        stored_bid(&conn, "bid-1");

        let job = accept_bid(&mut conn, "bid-1", now()).unwrap();
        assert_eq!(job.units.len(), 2);
        assert_eq!(job.task_count(), 4);

        let stored = get_job(&conn, "bid-1").unwrap().unwrap();
        assert_eq!(stored, job);
        assert_eq!(
            get_bid(&conn, "bid-1").unwrap().unwrap().status,
            BidStatus::Accepted
        );
    }

    #[test]
    fn accepting_twice_is_a_conflict() {
        let mut conn = test_connection();
        seed_inventory(&conn);
        stored_bid(&conn, "bid-1");

        accept_bid(&mut conn, "bid-1", now()).unwrap();
        let err = accept_bid(&mut conn, "bid-1", now()).unwrap_err();
        assert!(matches!(err, ServerError::Conflict(_)));

        let err = reject_bid(&mut conn, "bid-1").unwrap_err();
        assert!(matches!(err, ServerError::Conflict(_)));
    }

    #[test]
    fn failed_promotion_rolls_back_status() {
        let mut conn = test_connection();
        seed_inventory(&conn);
        let mut payload = new_bid();
        payload.contractors.clear();
        payload.scope_type = ScopeType::Unit;
        payload.units = vec!["inv-101".into()];
        let bid = payload
            .into_bid("bid-7".into(), now(), &known_references(&conn).unwrap())
            .unwrap();
        insert_bid(&conn, &bid).unwrap();
        conn.execute("delete from inventory_units where id = 'inv-101'", [])
            .unwrap();

        let err = accept_bid(&mut conn, "bid-7", now()).unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
        assert_eq!(
            get_bid(&conn, "bid-7").unwrap().unwrap().status,
            BidStatus::Pending
        );
    }

    #[test]
    fn unknown_bid_is_not_found() {
        let mut conn = test_connection();
        assert!(matches!(
            accept_bid(&mut conn, "nope", now()),
            Err(ServerError::NotFound(_))
        ));
    }
}
