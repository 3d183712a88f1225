use anyhow::{Context, Result};
use std::collections::BTreeSet;

use crate::analyzers::types::RosterMatch;
use crate::config::Columns;
use crate::table::Table;

/// Compares the roll numbers of the authorization table with the batch
/// results table.
pub fn match_roster(auth: &Table, batch: &Table, columns: &Columns) -> Result<RosterMatch> {
    let auth_roll = auth.column(&columns.auth_roll_no).context("Authorization table")?;
    let batch_roll = batch.column(&columns.results_roll_no).context("Batch table")?;

    let authorized: BTreeSet<&str> = auth
        .rows
        .iter()
        .map(|row| Table::cell(row, auth_roll).trim())
        .collect();
    let in_batch: BTreeSet<&str> = batch
        .rows
        .iter()
        .map(|row| Table::cell(row, batch_roll).trim())
        .collect();

    let matching: Vec<String> = authorized
        .intersection(&in_batch)
        .map(|r| r.to_string())
        .collect();
    let missing: Vec<String> = authorized
        .difference(&in_batch)
        .map(|r| r.to_string())
        .collect();

    let matching_rows = batch
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| authorized.contains(Table::cell(row, batch_roll).trim()))
        .map(|(i, _)| i)
        .collect();

    Ok(RosterMatch {
        authorized_count: authorized.len(),
        batch_count: in_batch.len(),
        matching,
        missing,
        matching_rows,
    })
}

/// Batch rows selected by `roster`, as a table with the batch headers.
pub fn matching_students(batch: &Table, roster: &RosterMatch) -> Table {
    Table::new(
        batch.headers.clone(),
        roster
            .matching_rows
            .iter()
            .map(|&i| batch.rows[i].clone())
            .collect(),
    )
}
