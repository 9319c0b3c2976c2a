// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::model::{Amount, Order, RowStatus, SortDirection};
use crate::pagination::Pagination;
use crate::store::GridRow;

/// Rendering contract of a column. Front ends match on this exhaustively
/// instead of keying renderers by column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Currency,
    Status,
    Actions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Currency(Amount),
    Status(RowStatus),
    Actions,
}

pub const ACTIONS_LABEL: &str = "More";

impl CellValue {
    pub const fn kind(&self) -> ColumnKind {
        match self {
            Self::Text(_) => ColumnKind::Text,
            Self::Currency(_) => ColumnKind::Currency,
            Self::Status(_) => ColumnKind::Status,
            Self::Actions => ColumnKind::Actions,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Currency(amount) => amount.display(),
            Self::Status(status) => status.label().to_owned(),
            Self::Actions => ACTIONS_LABEL.to_owned(),
        }
    }

    /// Text the free-text query is matched against. Action cells are chrome,
    /// not data, and never match.
    pub fn searchable_text(&self) -> Option<String> {
        match self {
            Self::Actions => None,
            other => Some(other.display()),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            (Self::Currency(left), Self::Currency(right)) => left.cmp(right),
            (Self::Status(left), Self::Status(right)) => left.label().cmp(right.label()),
            _ => Ordering::Equal,
        }
    }
}

pub struct Column<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub hideable: bool,
    accessor: fn(&R) -> CellValue,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Column<R> {}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("sortable", &self.sortable)
            .field("hideable", &self.hideable)
            .finish()
    }
}

impl<R> Column<R> {
    pub const fn new(
        key: &'static str,
        label: &'static str,
        kind: ColumnKind,
        accessor: fn(&R) -> CellValue,
    ) -> Self {
        Self {
            key,
            label,
            kind,
            sortable: false,
            hideable: true,
            accessor,
        }
    }

    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Column cannot be hidden.
    pub const fn fixed(mut self) -> Self {
        self.hideable = false;
        self
    }

    pub fn cell(&self, row: &R) -> CellValue {
        (self.accessor)(row)
    }
}

pub fn find_column<'a, R>(columns: &'a [Column<R>], key: &str) -> Option<&'a Column<R>> {
    columns.iter().find(|column| column.key == key)
}

/// Column set of the full orders grid.
pub fn order_columns() -> Vec<Column<Order>> {
    vec![
        Column::new("id", "Order ID", ColumnKind::Text, |order: &Order| {
            CellValue::Text(order.id.to_string())
        })
        .sortable()
        .fixed(),
        Column::new("buyer", "Buyer", ColumnKind::Text, |order: &Order| {
            CellValue::Text(order.buyer.clone())
        })
        .sortable(),
        Column::new("merchant", "Merchant", ColumnKind::Text, |order: &Order| {
            CellValue::Text(order.merchant.clone())
        })
        .sortable(),
        Column::new("status", "Status", ColumnKind::Status, |order: &Order| {
            CellValue::Status(order.status.clone())
        }),
        Column::new("date", "Date/Time", ColumnKind::Text, |order: &Order| {
            CellValue::Text(order.date.clone())
        })
        .sortable(),
        Column::new("amount", "Amount", ColumnKind::Currency, |order: &Order| {
            CellValue::Currency(order.amount)
        })
        .sortable(),
        Column::new("actions", ACTIONS_LABEL, ColumnKind::Actions, |_: &Order| {
            CellValue::Actions
        }),
    ]
}

/// Dashboard grid: same data, no row actions.
pub fn dashboard_columns() -> Vec<Column<Order>> {
    order_columns()
        .into_iter()
        .filter(|column| column.kind != ColumnKind::Actions)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: &'static str,
    pub direction: SortDirection,
}

/// Client-side view settings. Nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSpec {
    pub sort: Option<SortSpec>,
    pub hidden: BTreeSet<&'static str>,
    pub query: String,
    pub pagination: Pagination,
}

impl ViewSpec {
    /// First activation sorts ascending; activating the active key flips it.
    pub fn toggle_sort(&mut self, key: &'static str) -> SortSpec {
        let next = match self.sort {
            Some(current) if current.key == key => SortSpec {
                key,
                direction: current.direction.flipped(),
            },
            _ => SortSpec {
                key,
                direction: SortDirection::Asc,
            },
        };
        self.sort = Some(next);
        next
    }

    pub fn is_hidden(&self, key: &str) -> bool {
        self.hidden.contains(key)
    }

    /// Only an empty query disables filtering; whitespace is matched as typed.
    fn needle(&self) -> Option<String> {
        (!self.query.is_empty()).then(|| self.query.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub sorted: Option<SortDirection>,
}

/// One rendered page of the grid.
#[derive(Debug)]
pub struct GridView<'a, R> {
    pub headers: Vec<HeaderCell>,
    pub columns: Vec<&'a Column<R>>,
    pub rows: Vec<&'a R>,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub matched_rows: usize,
    pub total_rows: usize,
}

impl<R> GridView<'_, R> {
    /// Nothing matched: the front end shows a "no data" row instead of an
    /// empty body.
    pub fn is_empty(&self) -> bool {
        self.matched_rows == 0
    }

    pub fn cells(&self, row: &R) -> Vec<CellValue> {
        self.columns.iter().map(|column| column.cell(row)).collect()
    }

    pub fn summary(&self) -> String {
        format!("Page {} of {}", self.page_index + 1, self.page_count.max(1))
    }
}

/// Projects `rows` through `spec`: filter on visible columns, stable sort,
/// then slice out the current page. `rows` is never modified.
pub fn derive_view<'a, R: GridRow>(
    rows: &'a [R],
    columns: &'a [Column<R>],
    spec: &ViewSpec,
) -> GridView<'a, R> {
    let visible: Vec<&Column<R>> = columns
        .iter()
        .filter(|column| !spec.is_hidden(column.key))
        .collect();

    let needle = spec.needle();
    let mut matched: Vec<&R> = rows
        .iter()
        .filter(|row| row_matches(*row, &visible, needle.as_deref()))
        .collect();

    let sort_column = spec
        .sort
        .and_then(|sort| find_column(columns, sort.key).map(|column| (column, sort.direction)));
    if let Some((column, direction)) = sort_column {
        let mut keyed: Vec<(CellValue, &R)> =
            matched.iter().map(|row| (column.cell(row), *row)).collect();
        keyed.sort_by(|(left, _), (right, _)| {
            let ordering = left.compare(right);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        matched = keyed.into_iter().map(|(_, row)| row).collect();
    }

    let pagination = spec.pagination;
    let matched_rows = matched.len();
    let page_count = pagination.page_count(matched_rows);
    let range = pagination.range(matched_rows);
    let page_index = if page_count == 0 {
        0
    } else {
        range.start / pagination.page_size()
    };

    let headers = visible
        .iter()
        .map(|column| HeaderCell {
            key: column.key,
            label: column.label,
            kind: column.kind,
            sortable: column.sortable,
            sorted: spec
                .sort
                .filter(|sort| sort.key == column.key)
                .map(|sort| sort.direction),
        })
        .collect();

    GridView {
        headers,
        columns: visible,
        rows: matched[range].to_vec(),
        page_index,
        page_size: pagination.page_size(),
        page_count,
        matched_rows,
        total_rows: rows.len(),
    }
}

/// Number of rows that survive the free-text query under `spec`.
pub fn matched_count<R>(rows: &[R], columns: &[Column<R>], spec: &ViewSpec) -> usize {
    let visible: Vec<&Column<R>> = columns
        .iter()
        .filter(|column| !spec.is_hidden(column.key))
        .collect();
    let needle = spec.needle();
    rows.iter()
        .filter(|row| row_matches(*row, &visible, needle.as_deref()))
        .count()
}

fn row_matches<R>(row: &R, visible: &[&Column<R>], needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    visible.iter().any(|column| {
        column
            .cell(row)
            .searchable_text()
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}
