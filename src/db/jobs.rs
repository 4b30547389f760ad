// src/db/jobs.rs
use crate::db::parse_text;
use crate::domain::job::{Job, JobTask, TaskUpdate, Unit, UnitUpdate};
use crate::domain::kanban::{move_task, MoveOutcome, TransitionGraph};
use crate::domain::status::parse_date;
use crate::errors::ServerError;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

/// Writes a freshly promoted job with all of its units and tasks.
pub fn insert_job(tx: &Connection, job: &Job) -> Result<(), ServerError> {
    tx.execute(
        r#"
        insert into jobs (id, bid_id, property_ref, start_date, end_date, created_at, revision)
        values (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            &job.id,
            &job.bid_id,
            &job.property_ref,
            job.start_date,
            job.end_date,
            job.created_at,
            job.revision,
        ],
    )
    .map_err(|e| crate::db::write_error("insert job failed", e))?;

    let mut unit_stmt = tx.prepare(
        r#"
        insert into units (id, job_id, position, unit_number, floor_plan, status, pre_rent, post_rent)
        values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )?;
    let mut task_stmt = tx.prepare(
        r#"
        insert into job_tasks (
            id, unit_id, position, job_number, name, status, start_date, end_date,
            contractor_name, budget, bid_amount, invoiced_amount
        ) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )?;

    for (unit_pos, unit) in job.units.iter().enumerate() {
        unit_stmt.execute(params![
            &unit.id,
            &job.id,
            unit_pos as i64,
            &unit.unit_number,
            &unit.floor_plan,
            unit.status.label(),
            unit.pre_rent,
            unit.post_rent,
        ])?;

        for (task_pos, task) in unit.tasks.iter().enumerate() {
            task_stmt.execute(params![
                &task.id,
                &unit.id,
                task_pos as i64,
                task.job_number,
                &task.name,
                task.status.label(),
                task.start_date,
                task.end_date,
                &task.contractor_name,
                task.budget,
                task.bid_amount,
                task.invoiced_amount,
            ])?;
        }
    }

    debug!(job_id = %job.id, units = job.units.len(), "job written");
    Ok(())
}

fn stored_date(raw: rusqlite::Result<Option<String>>) -> Option<NaiveDate> {
    raw.ok().flatten().as_deref().and_then(parse_date)
}

fn load_tasks(conn: &Connection, unit_id: &str) -> Result<Vec<JobTask>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select id, unit_id, job_number, name, status, start_date, end_date,
               contractor_name, budget, bid_amount, invoiced_amount
        from job_tasks
        where unit_id = ?1
        order by position
        "#,
    )?;

    let rows = stmt.query_map(params![unit_id], |row| {
        Ok(JobTask {
            id: row.get(0)?,
            unit_id: row.get(1)?,
            job_number: row.get(2)?,
            name: row.get(3)?,
            status: parse_text(4, row.get(4)?)?,
            // Unreadable dates degrade to "no date" and classify as Unknown.
            start_date: stored_date(row.get(5)),
            end_date: stored_date(row.get(6)),
            contractor_name: row.get(7)?,
            budget: row.get(8)?,
            bid_amount: row.get(9)?,
            invoiced_amount: row.get(10)?,
        })
    })?;

    let mut tasks = Vec::new();
    for r in rows {
        tasks.push(r?);
    }
    Ok(tasks)
}

fn load_units(conn: &Connection, job_id: &str) -> Result<Vec<Unit>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select id, job_id, unit_number, floor_plan, status, pre_rent, post_rent
        from units
        where job_id = ?1
        order by position
        "#,
    )?;

    let rows = stmt.query_map(params![job_id], |row| {
        Ok(Unit {
            id: row.get(0)?,
            job_id: row.get(1)?,
            unit_number: row.get(2)?,
            floor_plan: row.get(3)?,
            status: parse_text(4, row.get(4)?)?,
            total_bid: 0.0,
            total_budget: 0.0,
            total_invoiced: 0.0,
            percent_complete: 0.0,
            pre_rent: row.get(5)?,
            post_rent: row.get(6)?,
            tasks: Vec::new(),
        })
    })?;

    let mut units = Vec::new();
    for r in rows {
        let mut unit = r?;
        unit.tasks = load_tasks(conn, &unit.id)?;
        unit.recalculate();
        units.push(unit);
    }
    Ok(units)
}

pub fn get_job(conn: &Connection, job_id: &str) -> Result<Option<Job>, ServerError> {
    let head = conn
        .query_row(
            r#"
            select id, bid_id, property_ref, start_date, end_date, created_at, revision
            from jobs
            where id = ?1
            "#,
            params![job_id],
            |row| {
                Ok(Job {
                    id: row.get(0)?,
                    bid_id: row.get(1)?,
                    property_ref: row.get(2)?,
                    start_date: row.get(3)?,
                    end_date: row.get(4)?,
                    created_at: row.get(5)?,
                    revision: row.get(6)?,
                    units: Vec::new(),
                })
            },
        )
        .optional()?;

    match head {
        Some(mut job) => {
            job.units = load_units(conn, &job.id)?;
            Ok(Some(job))
        }
        None => Ok(None),
    }
}

pub fn require_job(conn: &Connection, job_id: &str) -> Result<Job, ServerError> {
    get_job(conn, job_id)?.ok_or_else(|| ServerError::NotFound(format!("job {job_id}")))
}

pub fn list_jobs(conn: &Connection) -> Result<Vec<Job>, ServerError> {
    let mut stmt = conn.prepare("select id from jobs order by created_at desc, id desc")?;
    let ids = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut jobs = Vec::new();
    for id in ids {
        jobs.push(require_job(conn, &id?)?);
    }
    Ok(jobs)
}

fn job_id_for_task(conn: &Connection, task_id: &str) -> Result<String, ServerError> {
    conn.query_row(
        r#"
        select u.job_id
        from job_tasks t
        join units u on u.id = t.unit_id
        where t.id = ?1
        "#,
        params![task_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| ServerError::NotFound(format!("task {task_id}")))
}

fn job_id_for_unit(conn: &Connection, unit_id: &str) -> Result<String, ServerError> {
    conn.query_row(
        "select job_id from units where id = ?1",
        params![unit_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| ServerError::NotFound(format!("unit {unit_id}")))
}

fn check_revision(job: &Job, expected: Option<i64>) -> Result<(), ServerError> {
    match expected {
        Some(rev) if rev != job.revision => Err(ServerError::Conflict(format!(
            "job {} is at revision {}, not {rev}",
            job.id, job.revision
        ))),
        _ => Ok(()),
    }
}

/// Increments the job revision, guarded by the revision the change was based on.
fn bump_revision(tx: &Connection, job: &mut Job) -> Result<(), ServerError> {
    let changed = tx.execute(
        "update jobs set revision = revision + 1 where id = ?1 and revision = ?2",
        params![&job.id, job.revision],
    )?;
    if changed == 0 {
        return Err(ServerError::Conflict(format!(
            "job {} changed concurrently",
            job.id
        )));
    }
    job.revision += 1;
    Ok(())
}

fn save_task(tx: &Connection, task: &JobTask) -> Result<(), ServerError> {
    tx.execute(
        r#"
        update job_tasks set
            name = ?1, status = ?2, start_date = ?3, end_date = ?4, contractor_name = ?5,
            budget = ?6, bid_amount = ?7, invoiced_amount = ?8
        where id = ?9
        "#,
        params![
            &task.name,
            task.status.label(),
            task.start_date,
            task.end_date,
            &task.contractor_name,
            task.budget,
            task.bid_amount,
            task.invoiced_amount,
            &task.id,
        ],
    )?;
    Ok(())
}

fn save_unit(tx: &Connection, unit: &Unit) -> Result<(), ServerError> {
    tx.execute(
        "update units set status = ?1, pre_rent = ?2, post_rent = ?3 where id = ?4",
        params![unit.status.label(), unit.pre_rent, unit.post_rent, &unit.id],
    )?;
    Ok(())
}

/// Kanban drop of `task_id` onto board cell `target`, persisted.
/// Returns the outcome and the job as it stands afterwards.
pub fn move_task_status(
    conn: &mut Connection,
    task_id: &str,
    target: &str,
    expected_revision: Option<i64>,
    graph: &TransitionGraph,
) -> Result<(MoveOutcome, Job), ServerError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let job_id = job_id_for_task(&tx, task_id)?;
    let mut job = require_job(&tx, &job_id)?;
    check_revision(&job, expected_revision)?;

    let outcome = move_task(&mut job, task_id, target, graph)?;
    if let MoveOutcome::Moved { from, to, .. } = &outcome {
        if let Some(task) = job.task(task_id) {
            save_task(&tx, task)?;
        }
        bump_revision(&tx, &mut job)?;
        info!(job_id = %job.id, task_id, %from, %to, revision = job.revision, "task moved");
    }

    tx.commit()?;
    Ok((outcome, job))
}

pub fn update_task(
    conn: &mut Connection,
    task_id: &str,
    update: &TaskUpdate,
) -> Result<Job, ServerError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let job_id = job_id_for_task(&tx, task_id)?;
    let mut job = require_job(&tx, &job_id)?;
    check_revision(&job, update.expected_revision)?;

    let (unit, idx) = job
        .locate_task_mut(task_id)
        .ok_or_else(|| ServerError::NotFound(format!("task {task_id}")))?;
    update.apply(&mut unit.tasks[idx])?;
    save_task(&tx, &unit.tasks[idx])?;
    unit.recalculate();

    bump_revision(&tx, &mut job)?;
    tx.commit()?;

    info!(job_id = %job.id, task_id, revision = job.revision, "task updated");
    Ok(job)
}

pub fn update_unit(
    conn: &mut Connection,
    unit_id: &str,
    update: &UnitUpdate,
) -> Result<Job, ServerError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let job_id = job_id_for_unit(&tx, unit_id)?;
    let mut job = require_job(&tx, &job_id)?;
    check_revision(&job, update.expected_revision)?;

    let unit = job
        .units
        .iter_mut()
        .find(|u| u.id == unit_id)
        .ok_or_else(|| ServerError::NotFound(format!("unit {unit_id}")))?;
    update.apply(unit)?;
    save_unit(&tx, unit)?;

    bump_revision(&tx, &mut job)?;
    tx.commit()?;

    info!(job_id = %job.id, unit_id, revision = job.revision, "unit updated");
    Ok(job)
}
