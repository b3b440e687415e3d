use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::document::Document;
use crate::domain::entities::table_state::ColumnId;

pub const SELECT_COLUMN: &str = "select";
pub const ACTIONS_COLUMN: &str = "actions";

/// Column definition for a grid over rows of type `T`.
pub struct ColumnSpec<T> {
    pub id: ColumnId,
    pub title: String,
    pub accessor: fn(&T) -> String,
    pub sortable: bool,
    pub filterable: bool,
    pub visible_by_default: bool,
    pub reorderable: bool,
    pub exportable: bool,
}

impl<T> Clone for ColumnSpec<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            accessor: self.accessor,
            sortable: self.sortable,
            filterable: self.filterable,
            visible_by_default: self.visible_by_default,
            reorderable: self.reorderable,
            exportable: self.exportable,
        }
    }
}

impl<T> std::fmt::Debug for ColumnSpec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("reorderable", &self.reorderable)
            .finish()
    }
}

impl<T> ColumnSpec<T> {
    pub fn data(id: &str, title: &str, accessor: fn(&T) -> String) -> Self {
        Self {
            id: ColumnId::new(id),
            title: title.to_string(),
            accessor,
            sortable: true,
            filterable: true,
            visible_by_default: true,
            reorderable: true,
            exportable: true,
        }
    }

    /// Selection checkbox or row action column: pinned, never exported.
    pub fn utility(id: &str, title: &str) -> Self {
        Self {
            id: ColumnId::new(id),
            title: title.to_string(),
            accessor: |_| String::new(),
            sortable: false,
            filterable: false,
            visible_by_default: true,
            reorderable: false,
            exportable: false,
        }
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.visible_by_default = false;
        self
    }

    pub fn value(&self, row: &T) -> String {
        (self.accessor)(row)
    }
}

pub fn fixed_columns<T>(columns: &[ColumnSpec<T>]) -> BTreeSet<ColumnId> {
    columns
        .iter()
        .filter(|column| !column.reorderable)
        .map(|column| column.id.clone())
        .collect()
}

/// Stored ids that still exist, followed by columns the stored order does not mention.
pub fn effective_order<T>(columns: &[ColumnSpec<T>], stored: &[ColumnId]) -> Vec<ColumnId> {
    let known: BTreeSet<&ColumnId> = columns.iter().map(|column| &column.id).collect();
    let mut seen = BTreeSet::new();
    let mut order: Vec<ColumnId> = stored
        .iter()
        .filter(|id| known.contains(id) && seen.insert((*id).clone()))
        .cloned()
        .collect();
    for column in columns {
        if !seen.contains(&column.id) {
            order.push(column.id.clone());
        }
    }
    order
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderRejected {
    OutOfRange,
    FixedColumn(ColumnId),
    BlockedBy(ColumnId),
    UnknownColumn(ColumnId),
}

impl std::fmt::Display for ReorderRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReorderRejected::OutOfRange => write!(f, "column index out of range"),
            ReorderRejected::FixedColumn(id) => write!(f, "column {} cannot be moved", id.0),
            ReorderRejected::BlockedBy(id) => write!(f, "move crosses fixed column {}", id.0),
            ReorderRejected::UnknownColumn(id) => write!(f, "column {} is not visible", id.0),
        }
    }
}

/// Moves the column at `from` to index `to`.
///
/// The move is rejected when the moved column is fixed or when any column
/// strictly between the two positions is fixed.
pub fn propose_reorder(
    order: &[ColumnId],
    fixed: &BTreeSet<ColumnId>,
    from: usize,
    to: usize,
) -> Result<Vec<ColumnId>, ReorderRejected> {
    if from >= order.len() || to >= order.len() {
        return Err(ReorderRejected::OutOfRange);
    }
    if fixed.contains(&order[from]) {
        return Err(ReorderRejected::FixedColumn(order[from].clone()));
    }
    if from == to {
        return Ok(order.to_vec());
    }

    let (low, high) = if from < to { (from, to) } else { (to, from) };
    if let Some(blocker) = order[low + 1..high].iter().find(|id| fixed.contains(*id)) {
        return Err(ReorderRejected::BlockedBy(blocker.clone()));
    }

    let mut next = order.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Ok(next)
}

/// Applies a drag of `source` onto `target` among the visible leaf columns.
///
/// Hidden columns keep their slots in the full order.
pub fn reorder_visible(
    order: &[ColumnId],
    visibility: &BTreeMap<ColumnId, bool>,
    fixed: &BTreeSet<ColumnId>,
    source: &ColumnId,
    target: &ColumnId,
) -> Result<Vec<ColumnId>, ReorderRejected> {
    let is_visible = |id: &ColumnId| visibility.get(id).copied().unwrap_or(true);
    let visible: Vec<ColumnId> = order.iter().filter(|id| is_visible(id)).cloned().collect();

    let from = visible
        .iter()
        .position(|id| id == source)
        .ok_or_else(|| ReorderRejected::UnknownColumn(source.clone()))?;
    let to = visible
        .iter()
        .position(|id| id == target)
        .ok_or_else(|| ReorderRejected::UnknownColumn(target.clone()))?;

    let mut reordered = propose_reorder(&visible, fixed, from, to)?.into_iter();
    Ok(order
        .iter()
        .map(|id| {
            if is_visible(id) {
                reordered.next().unwrap_or_else(|| id.clone())
            } else {
                id.clone()
            }
        })
        .collect())
}

fn optional_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

type DocumentColumn = ColumnSpec<Document>;

pub fn document_columns() -> Vec<ColumnSpec<Document>> {
    vec![
        DocumentColumn::utility(SELECT_COLUMN, ""),
        DocumentColumn::data("id", "ID", |doc: &Document| doc.id.to_string()),
        DocumentColumn::data("fileName", "File name", |doc: &Document| doc.file_name.clone()),
        DocumentColumn::data("project", "Project", |doc: &Document| doc.project.clone()),
        DocumentColumn::data("pageCount", "Pages", |doc: &Document| doc.page_count.to_string()),
        DocumentColumn::data("receivedDate", "Received", |doc: &Document| {
            doc.received_date.clone()
        }),
        DocumentColumn::data("assignedTo", "Analyst", |doc: &Document| {
            optional_text(&doc.assigned_to)
        }),
        DocumentColumn::data("auditor", "Auditor", |doc: &Document| optional_text(&doc.auditor)),
        DocumentColumn::data("hccCodes", "HCC codes", |doc: &Document| doc.hcc_codes.join(" "))
            .hidden_by_default(),
        DocumentColumn::utility(ACTIONS_COLUMN, "Actions"),
    ]
}
