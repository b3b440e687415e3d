use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::params;

use crate::infra::sqlite::schema::open_connection;

pub fn save_column_order(db_path: &Path, route_key: &str, order: &[String]) -> Result<()> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start column order transaction")?;

    tx.execute(
        "DELETE FROM view_column_order WHERE route_key = ?1",
        [route_key],
    )
    .context("failed to clear existing column order")?;

    let mut insert_stmt = tx
        .prepare(
            "INSERT INTO view_column_order(route_key, position, column_id)
             VALUES (?1, ?2, ?3)",
        )
        .context("failed to prepare column order insert")?;

    for (position, column_id) in order.iter().enumerate() {
        insert_stmt
            .execute(params![route_key, position as i64, column_id])
            .context("failed to insert column order")?;
    }

    drop(insert_stmt);
    tx.commit().context("failed to commit column order updates")?;
    Ok(())
}

pub fn load_column_order(db_path: &Path, route_key: &str) -> Result<Vec<String>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT column_id
             FROM view_column_order
             WHERE route_key = ?1
             ORDER BY position ASC",
        )
        .context("failed to prepare column order query")?;

    let order_iter = stmt
        .query_map([route_key], |row| row.get::<_, String>(0))
        .context("failed to query column order")?;

    let mut order = Vec::new();
    for item in order_iter {
        order.push(item.context("failed to read column order row")?);
    }

    Ok(order)
}

pub fn clear_column_order(db_path: &Path, route_key: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "DELETE FROM view_column_order WHERE route_key = ?1",
        [route_key],
    )
    .context("failed to clear column order")?;
    Ok(())
}
