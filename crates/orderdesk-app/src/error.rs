// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use thiserror::Error;

use crate::ids::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyncOperation {
    ListOrders,
    FetchDetail,
    PatchStatus,
    PatchDetail,
    DeleteOrder,
    LoadInfo,
}

impl SyncOperation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListOrders => "load orders",
            Self::FetchDetail => "load order details",
            Self::PatchStatus => "change status",
            Self::PatchDetail => "update order details",
            Self::DeleteOrder => "delete order",
            Self::LoadInfo => "load dashboard",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform failure for any remote call: transport errors, non-2xx responses
/// and undecodable payloads all end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed{}: {cause}", target_suffix(.id.as_ref()))]
pub struct SyncError {
    pub operation: SyncOperation,
    pub id: Option<OrderId>,
    pub cause: String,
}

impl SyncError {
    pub fn new(operation: SyncOperation, id: Option<&OrderId>, error: &anyhow::Error) -> Self {
        Self {
            operation,
            id: id.cloned(),
            cause: format!("{error:#}"),
        }
    }
}

fn target_suffix(id: Option<&OrderId>) -> String {
    id.map(|id| format!(" for {id}")).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("{}", out_of_range_message(*.requested, *.page_count))]
    OutOfRangePage { requested: i64, page_count: usize },
    #[error("page {0:?} is not a page number")]
    InvalidPageInput(String),
    #[error("rows per page must be one of 10, 20, 30, 50, 100; got {0}")]
    InvalidPageSize(usize),
    #[error("order {0} already has a change in flight -- wait for it to finish")]
    MutationPending(OrderId),
    #[error("orders are already loading")]
    ReloadPending,
    #[error("the dashboard grid is read-only -- open the orders view to make changes")]
    ReadOnly,
    #[error("no order details are open")]
    DetailNotOpen,
    #[error("nothing to update -- change payment method or pickup time first")]
    EmptyDetailPatch,
    #[error("{0}")]
    InvalidDetailPatch(String),
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error("column {0} cannot be sorted")]
    ColumnNotSortable(&'static str),
    #[error("column {0} cannot be hidden")]
    ColumnNotHideable(&'static str),
    #[error("keep one column visible")]
    KeepOneColumnVisible,
    #[error("order {0} is not in the current list")]
    UnknownOrder(OrderId),
    #[error(transparent)]
    Remote(#[from] SyncError),
}

fn out_of_range_message(requested: i64, page_count: usize) -> String {
    if page_count == 0 {
        format!("page {requested} is out of range; there are no pages to show")
    } else {
        format!("page {requested} is out of range (1-{page_count})")
    }
}
