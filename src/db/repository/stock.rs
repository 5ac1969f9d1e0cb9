use rusqlite::{params, Connection, Row};

use crate::db::row::{opt_date_at, timestamp_at, uuid_at};
use crate::db::{format_timestamp, DatabaseError};
use crate::models::MedicineStock;

const STOCK_COLUMNS: &str =
    "id, medicine_name, quantity, unit, price, supplier, expiry_date, created_at, updated_at";

fn stock_from_row(row: &Row<'_>) -> rusqlite::Result<MedicineStock> {
    Ok(MedicineStock {
        id: uuid_at(row, 0)?,
        medicine_name: row.get(1)?,
        quantity: row.get(2)?,
        unit: row.get(3)?,
        price: row.get(4)?,
        supplier: row.get(5)?,
        expiry_date: opt_date_at(row, 6)?,
        created_at: timestamp_at(row, 7)?,
        updated_at: timestamp_at(row, 8)?,
    })
}

/// Plain insert: a second row with the same medicine name is allowed.
pub fn insert_stock(conn: &Connection, stock: &MedicineStock) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicine_stock (id, medicine_name, quantity, unit, price, supplier,
         expiry_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            stock.id.to_string(),
            stock.medicine_name,
            stock.quantity,
            stock.unit,
            stock.price,
            stock.supplier,
            stock.expiry_date.map(|d| d.to_string()),
            format_timestamp(&stock.created_at),
            format_timestamp(&stock.updated_at),
        ],
    )?;
    Ok(())
}

/// All stock rows ordered by medicine name.
pub fn list_stock(conn: &Connection) -> Result<Vec<MedicineStock>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STOCK_COLUMNS} FROM medicine_stock ORDER BY medicine_name ASC, rowid ASC"
    ))?;
    let rows = stmt
        .query_map([], stock_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
