// src/db/reference.rs
use crate::db::write_error;
use crate::domain::bid::KnownReferences;
use crate::domain::reference::{CategoryKind, Contractor, InventoryUnit, JobCategory, Property};
use crate::errors::ServerError;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;

pub fn list_job_categories(conn: &Connection) -> Result<Vec<JobCategory>, ServerError> {
    let mut stmt = conn.prepare(
        "select id, name, kind, material, product from job_categories order by position, name",
    )?;

    let rows = stmt.query_map([], |row| {
        let kind: String = row.get(2)?;
        let kind = match kind.as_str() {
            "Interior" => CategoryKind::Interior,
            "Exterior" => CategoryKind::Exterior,
            other => {
                return Err(rusqlite::Error::FromSqlConversionFailure(
                    2,
                    Type::Text,
                    format!("unknown category kind `{other}`").into(),
                ))
            }
        };
        Ok(JobCategory {
            id: row.get(0)?,
            name: row.get(1)?,
            kind,
            material: row.get(3)?,
            product: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_contractors(conn: &Connection) -> Result<Vec<Contractor>, ServerError> {
    let mut stmt = conn.prepare(
        "select id, company_name, contact_name, email, location from contractors order by company_name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Contractor {
            id: row.get(0)?,
            company_name: row.get(1)?,
            contact_name: row.get(2)?,
            email: row.get(3)?,
            location: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_contractor(
    conn: &Connection,
    contractor: &Contractor,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    conn.execute(
        r#"
        insert into contractors (id, company_name, contact_name, email, location, created_at)
        values (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            &contractor.id,
            &contractor.company_name,
            &contractor.contact_name,
            &contractor.email,
            &contractor.location,
            now,
        ],
    )
    .map_err(|e| write_error("insert contractor failed", e))?;
    Ok(())
}

/// Inventory order is onboarding order.
pub fn list_inventory_units(conn: &Connection) -> Result<Vec<InventoryUnit>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select id, unit_number, floor_plan, pre_rent, post_rent
        from inventory_units
        order by created_at, rowid
        "#,
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(InventoryUnit {
            id: row.get(0)?,
            unit_number: row.get(1)?,
            floor_plan: row.get(2)?,
            pre_rent: row.get(3)?,
            post_rent: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Unit numbers are unique within the inventory; a duplicate is a conflict.
pub fn insert_inventory_unit(
    conn: &Connection,
    unit: &InventoryUnit,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    conn.execute(
        r#"
        insert into inventory_units (id, unit_number, floor_plan, pre_rent, post_rent, created_at)
        values (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            &unit.id,
            &unit.unit_number,
            &unit.floor_plan,
            unit.pre_rent,
            unit.post_rent,
            now,
        ],
    )
    .map_err(|e| write_error("insert unit failed", e))?;
    Ok(())
}

pub fn get_property(conn: &Connection) -> Result<Option<Property>, ServerError> {
    conn.query_row(
        r#"
        select name, address_line, city, state_abbr, postal_code, unit_count
        from property
        where id = 1
        "#,
        [],
        |row| {
            Ok(Property {
                name: row.get(0)?,
                address_line: row.get(1)?,
                city: row.get(2)?,
                state_abbr: row.get(3)?,
                postal_code: row.get(4)?,
                unit_count: row.get(5)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("failed to load property: {e}")))
}

pub fn save_property(
    conn: &Connection,
    property: &Property,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    conn.execute(
        r#"
        insert into property (id, name, address_line, city, state_abbr, postal_code, unit_count, updated_at)
        values (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
        on conflict(id) do update set
            name = excluded.name,
            address_line = excluded.address_line,
            city = excluded.city,
            state_abbr = excluded.state_abbr,
            postal_code = excluded.postal_code,
            unit_count = excluded.unit_count,
            updated_at = excluded.updated_at
        "#,
        params![
            &property.name,
            &property.address_line,
            &property.city,
            &property.state_abbr,
            &property.postal_code,
            property.unit_count,
            now,
        ],
    )?;
    Ok(())
}

/// Ids a new bid may reference.
pub fn known_references(conn: &Connection) -> Result<KnownReferences, ServerError> {
    fn ids(conn: &Connection, sql: &str) -> Result<HashSet<String>, ServerError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = HashSet::new();
        for r in rows {
            out.insert(r?);
        }
        Ok(out)
    }

    Ok(KnownReferences {
        job_categories: ids(conn, "select id from job_categories")?,
        units: ids(conn, "select id from inventory_units")?,
        contractors: ids(conn, "select id from contractors")?,
    })
}
