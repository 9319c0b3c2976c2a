// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::collections::VecDeque;
use tracing::debug;

use crate::error::{SyncError, SyncOperation};
use crate::ids::{DetailTicket, OrderId};
use crate::model::{DetailPatch, InfoCard, Order, OrderDetail, OrderStatus};
use crate::state::{GridCommand, GridEvent, OrdersGrid};

/// The REST resource behind the grid. Implementations make exactly one call
/// per method and never retry.
pub trait OrdersBackend {
    fn list_orders(&self) -> Result<Vec<Order>>;
    fn order_detail(&self, id: &OrderId) -> Result<OrderDetail>;
    fn patch_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order>;
    fn patch_order_detail(&self, id: &OrderId, patch: &DetailPatch) -> Result<OrderDetail>;
    fn delete_order(&self, id: &OrderId) -> Result<()>;
    fn dashboard_info(&self) -> Result<Vec<InfoCard>>;
}

impl<B: OrdersBackend + ?Sized> OrdersBackend for &B {
    fn list_orders(&self) -> Result<Vec<Order>> {
        (**self).list_orders()
    }

    fn order_detail(&self, id: &OrderId) -> Result<OrderDetail> {
        (**self).order_detail(id)
    }

    fn patch_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        (**self).patch_order_status(id, status)
    }

    fn patch_order_detail(&self, id: &OrderId, patch: &DetailPatch) -> Result<OrderDetail> {
        (**self).patch_order_detail(id, patch)
    }

    fn delete_order(&self, id: &OrderId) -> Result<()> {
        (**self).delete_order(id)
    }

    fn dashboard_info(&self) -> Result<Vec<InfoCard>> {
        (**self).dashboard_info()
    }
}

/// A remote call the grid has asked for. Whoever owns the backend runs it
/// and hands the completion back to [`OrdersGrid::apply_completion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteJob {
    ListOrders,
    FetchDetail { ticket: DetailTicket, id: OrderId },
    PatchStatus { id: OrderId, status: OrderStatus },
    PatchDetail { id: OrderId, patch: DetailPatch },
    DeleteOrder { id: OrderId },
    LoadInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCompletion {
    OrdersListed(Result<Vec<Order>, SyncError>),
    DetailFetched {
        ticket: DetailTicket,
        id: OrderId,
        result: Result<OrderDetail, SyncError>,
    },
    StatusPatched {
        id: OrderId,
        status: OrderStatus,
        result: Result<Order, SyncError>,
    },
    DetailPatched {
        id: OrderId,
        result: Result<OrderDetail, SyncError>,
    },
    OrderDeleted {
        id: OrderId,
        result: Result<(), SyncError>,
    },
    InfoLoaded(Result<Vec<InfoCard>, SyncError>),
}

impl RemoteJob {
    pub const fn operation(&self) -> SyncOperation {
        match self {
            Self::ListOrders => SyncOperation::ListOrders,
            Self::FetchDetail { .. } => SyncOperation::FetchDetail,
            Self::PatchStatus { .. } => SyncOperation::PatchStatus,
            Self::PatchDetail { .. } => SyncOperation::PatchDetail,
            Self::DeleteOrder { .. } => SyncOperation::DeleteOrder,
            Self::LoadInfo => SyncOperation::LoadInfo,
        }
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            Self::FetchDetail { id, .. }
            | Self::PatchStatus { id, .. }
            | Self::PatchDetail { id, .. }
            | Self::DeleteOrder { id } => Some(id),
            Self::ListOrders | Self::LoadInfo => None,
        }
    }

    /// Performs the call. Every failure comes back as a [`SyncError`].
    pub fn run<B: OrdersBackend + ?Sized>(self, backend: &B) -> RemoteCompletion {
        let operation = self.operation();
        debug!(%operation, id = ?self.order_id(), "running remote job");
        let fail = |id: Option<&OrderId>, error: anyhow::Error| SyncError::new(operation, id, &error);

        match self {
            Self::ListOrders => {
                RemoteCompletion::OrdersListed(backend.list_orders().map_err(|error| fail(None, error)))
            }
            Self::FetchDetail { ticket, id } => {
                let result = backend
                    .order_detail(&id)
                    .map_err(|error| fail(Some(&id), error));
                RemoteCompletion::DetailFetched { ticket, id, result }
            }
            Self::PatchStatus { id, status } => {
                let result = backend
                    .patch_order_status(&id, status)
                    .map_err(|error| fail(Some(&id), error));
                RemoteCompletion::StatusPatched { id, status, result }
            }
            Self::PatchDetail { id, patch } => {
                let result = backend
                    .patch_order_detail(&id, &patch)
                    .map_err(|error| fail(Some(&id), error));
                RemoteCompletion::DetailPatched { id, result }
            }
            Self::DeleteOrder { id } => {
                let result = backend
                    .delete_order(&id)
                    .map_err(|error| fail(Some(&id), error));
                RemoteCompletion::OrderDeleted { id, result }
            }
            Self::LoadInfo => {
                RemoteCompletion::InfoLoaded(backend.dashboard_info().map_err(|error| fail(None, error)))
            }
        }
    }
}

/// Runs the grid's remote jobs inline against a backend, feeding each
/// completion back until no work is left.
#[derive(Debug, Clone)]
pub struct SyncAdapter<B> {
    backend: B,
}

impl<B: OrdersBackend> SyncAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn dispatch(&self, grid: &mut OrdersGrid, command: GridCommand) -> Vec<GridEvent> {
        let events = grid.dispatch(command);
        self.drive(grid, events)
    }

    /// Executes every [`GridEvent::Remote`] in `events` (and any follow-up
    /// jobs the completions ask for), returning the remaining events in order.
    pub fn drive(&self, grid: &mut OrdersGrid, events: Vec<GridEvent>) -> Vec<GridEvent> {
        let mut pending: VecDeque<GridEvent> = events.into();
        let mut out = Vec::new();
        while let Some(event) = pending.pop_front() {
            match event {
                GridEvent::Remote(job) => {
                    let completion = job.run(&self.backend);
                    pending.extend(grid.apply_completion(completion));
                }
                other => out.push(other),
            }
        }
        out
    }

    pub fn load(&self, grid: &mut OrdersGrid) -> Vec<GridEvent> {
        self.dispatch(grid, GridCommand::Reload)
    }

    pub fn change_status(
        &self,
        grid: &mut OrdersGrid,
        id: OrderId,
        status: OrderStatus,
    ) -> Vec<GridEvent> {
        self.dispatch(grid, GridCommand::ChangeStatus { id, status })
    }

    pub fn delete(&self, grid: &mut OrdersGrid, id: OrderId) -> Vec<GridEvent> {
        self.dispatch(grid, GridCommand::DeleteOrder(id))
    }

    pub fn view_details(&self, grid: &mut OrdersGrid, id: OrderId) -> Vec<GridEvent> {
        self.dispatch(grid, GridCommand::ViewDetails(id))
    }

    pub fn update_details(&self, grid: &mut OrdersGrid, patch: DetailPatch) -> Vec<GridEvent> {
        self.dispatch(grid, GridCommand::UpdateDetail(patch))
    }
}
