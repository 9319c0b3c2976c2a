// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

use crate::detail::{DetailOutcome, DetailPanel};
use crate::error::{GridError, SyncError, SyncOperation};
use crate::ids::OrderId;
use crate::model::{DetailPatch, InfoCard, Order, OrderStatus};
use crate::pagination::Pagination;
use crate::store::{RowStore, StoreChange};
use crate::sync::{RemoteCompletion, RemoteJob};
use crate::view::{
    Column, GridView, ViewSpec, dashboard_columns, derive_view, find_column, matched_count,
    order_columns,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridVariant {
    /// Orders page: every column plus row actions.
    Full,
    /// Grid embedded in the dashboard. Read-only.
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCommand {
    ToggleSort(String),
    ClearSort,
    SetQuery(String),
    ClearQuery,
    ToggleColumn(String),
    ShowAllColumns,
    SetPageSize(usize),
    CyclePageSize(isize),
    GoToPage(i64),
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    ViewDetails(OrderId),
    CloseDetail,
    ChangeStatus { id: OrderId, status: OrderStatus },
    DeleteOrder(OrderId),
    UpdateDetail(DetailPatch),
    Reload,
    LoadInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    RowsChanged,
    SortChanged,
    QueryChanged,
    ColumnsChanged,
    PageChanged { page_index: usize, page_count: usize },
    DetailChanged,
    InfoChanged,
    Notice(Notice),
    Remote(RemoteJob),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridOptions {
    pub page_size: Option<usize>,
    pub hidden_columns: Vec<String>,
}

/// The orders grid: row store, view settings, detail panel and the set of
/// mutations still waiting on the backend. All state changes go through
/// [`OrdersGrid::dispatch`] and [`OrdersGrid::apply_completion`].
#[derive(Debug)]
pub struct OrdersGrid {
    variant: GridVariant,
    columns: Vec<Column<Order>>,
    store: RowStore<Order>,
    changes: Receiver<StoreChange<OrderId>>,
    spec: ViewSpec,
    detail: DetailPanel,
    in_flight: BTreeMap<OrderId, SyncOperation>,
    loading: bool,
    info: Vec<InfoCard>,
}

impl OrdersGrid {
    pub fn new(variant: GridVariant) -> Self {
        let columns = match variant {
            GridVariant::Full => order_columns(),
            GridVariant::Dashboard => dashboard_columns(),
        };
        let mut store = RowStore::new();
        let changes = store.subscribe();
        Self {
            variant,
            columns,
            store,
            changes,
            spec: ViewSpec::default(),
            detail: DetailPanel::default(),
            in_flight: BTreeMap::new(),
            loading: false,
            info: Vec::new(),
        }
    }

    pub fn with_options(variant: GridVariant, options: &GridOptions) -> Result<Self, GridError> {
        let mut grid = Self::new(variant);
        if let Some(page_size) = options.page_size {
            grid.spec.pagination = Pagination::with_page_size(page_size)?;
        }
        for name in &options.hidden_columns {
            let key = hideable_column_key(name)?;
            if find_column(&grid.columns, key).is_some() {
                grid.spec.hidden.insert(key);
            }
        }
        Ok(grid)
    }

    pub fn variant(&self) -> GridVariant {
        self.variant
    }

    pub fn columns(&self) -> &[Column<Order>] {
        &self.columns
    }

    pub fn store(&self) -> &RowStore<Order> {
        &self.store
    }

    /// Direct store access for callers that own their own mutations. Call
    /// [`OrdersGrid::reconcile`] afterwards so the view catches up.
    pub fn store_mut(&mut self) -> &mut RowStore<Order> {
        &mut self.store
    }

    pub fn spec(&self) -> &ViewSpec {
        &self.spec
    }

    pub fn detail(&self) -> &DetailPanel {
        &self.detail
    }

    pub fn info(&self) -> &[InfoCard] {
        &self.info
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_operation(&self, id: &OrderId) -> Option<SyncOperation> {
        self.in_flight.get(id).copied()
    }

    pub fn view(&self) -> GridView<'_, Order> {
        derive_view(self.store.rows(), &self.columns, &self.spec)
    }

    pub fn page_summary(&self) -> String {
        self.spec.pagination.summary(self.matched_rows())
    }

    fn matched_rows(&self) -> usize {
        matched_count(self.store.rows(), &self.columns, &self.spec)
    }

    pub fn dispatch(&mut self, command: GridCommand) -> Vec<GridEvent> {
        match self.try_dispatch(command) {
            Ok(events) => events,
            Err(error) => rejected(error),
        }
    }

    fn try_dispatch(&mut self, command: GridCommand) -> Result<Vec<GridEvent>, GridError> {
        match command {
            GridCommand::ToggleSort(name) => {
                let column = find_column(&self.columns, &name)
                    .ok_or_else(|| GridError::UnknownColumn(name.clone()))?;
                if !column.sortable {
                    return Err(GridError::ColumnNotSortable(column.key));
                }
                let key = column.key;
                self.spec.toggle_sort(key);
                Ok(vec![GridEvent::SortChanged])
            }
            GridCommand::ClearSort => {
                if self.spec.sort.take().is_none() {
                    return Ok(Vec::new());
                }
                Ok(vec![GridEvent::SortChanged])
            }
            GridCommand::SetQuery(query) => Ok(self.set_query(query)),
            GridCommand::ClearQuery => Ok(self.set_query(String::new())),
            GridCommand::ToggleColumn(name) => {
                let key = self.hideable_column(&name)?;
                if self.spec.hidden.contains(key) {
                    self.spec.hidden.remove(key);
                } else {
                    let visible = self
                        .columns
                        .iter()
                        .filter(|column| !self.spec.is_hidden(column.key))
                        .count();
                    if visible <= 1 {
                        return Err(GridError::KeepOneColumnVisible);
                    }
                    self.spec.hidden.insert(key);
                }
                let mut events = vec![GridEvent::ColumnsChanged];
                events.extend(self.clamp_page());
                Ok(events)
            }
            GridCommand::ShowAllColumns => {
                if self.spec.hidden.is_empty() {
                    return Ok(Vec::new());
                }
                self.spec.hidden.clear();
                let mut events = vec![GridEvent::ColumnsChanged];
                events.extend(self.clamp_page());
                Ok(events)
            }
            GridCommand::SetPageSize(page_size) => {
                let matched = self.matched_rows();
                self.spec.pagination.set_page_size(page_size, matched)?;
                Ok(vec![self.page_event(matched)])
            }
            GridCommand::CyclePageSize(delta) => {
                let matched = self.matched_rows();
                self.spec.pagination.step_page_size(delta, matched);
                Ok(vec![self.page_event(matched)])
            }
            GridCommand::GoToPage(requested) => {
                let matched = self.matched_rows();
                self.spec.pagination.go_to_page(requested, matched)?;
                Ok(vec![self.page_event(matched)])
            }
            GridCommand::NextPage => {
                let matched = self.matched_rows();
                let moved = self.spec.pagination.next(matched);
                Ok(self.page_moved(moved, matched))
            }
            GridCommand::PreviousPage => {
                let matched = self.matched_rows();
                let moved = self.spec.pagination.previous();
                Ok(self.page_moved(moved, matched))
            }
            GridCommand::FirstPage => {
                let matched = self.matched_rows();
                let moved = self.spec.pagination.first();
                Ok(self.page_moved(moved, matched))
            }
            GridCommand::LastPage => {
                let matched = self.matched_rows();
                let moved = self.spec.pagination.last(matched);
                Ok(self.page_moved(moved, matched))
            }
            GridCommand::ViewDetails(id) => {
                if !self.store.contains(&id) {
                    return Err(GridError::UnknownOrder(id));
                }
                let ticket = self.detail.request(id.clone());
                Ok(vec![
                    GridEvent::DetailChanged,
                    GridEvent::Remote(RemoteJob::FetchDetail { ticket, id }),
                ])
            }
            GridCommand::CloseDetail => {
                if self.detail.close() {
                    Ok(vec![GridEvent::DetailChanged])
                } else {
                    Ok(Vec::new())
                }
            }
            GridCommand::ChangeStatus { id, status } => {
                self.begin_mutation(&id, SyncOperation::PatchStatus)?;
                Ok(vec![GridEvent::Remote(RemoteJob::PatchStatus { id, status })])
            }
            GridCommand::DeleteOrder(id) => {
                self.begin_mutation(&id, SyncOperation::DeleteOrder)?;
                Ok(vec![GridEvent::Remote(RemoteJob::DeleteOrder { id })])
            }
            GridCommand::UpdateDetail(patch) => {
                self.ensure_writable()?;
                let Some((id, current)) = self.detail.detail() else {
                    return Err(GridError::DetailNotOpen);
                };
                let id = id.clone();
                let patch = patch.against(current);
                if patch.is_empty() {
                    return Err(GridError::EmptyDetailPatch);
                }
                patch
                    .validate()
                    .map_err(|error| GridError::InvalidDetailPatch(error.to_string()))?;
                self.begin_mutation(&id, SyncOperation::PatchDetail)?;
                Ok(vec![GridEvent::Remote(RemoteJob::PatchDetail { id, patch })])
            }
            GridCommand::Reload => {
                if self.loading {
                    return Err(GridError::ReloadPending);
                }
                self.loading = true;
                Ok(vec![GridEvent::Remote(RemoteJob::ListOrders)])
            }
            GridCommand::LoadInfo => Ok(vec![GridEvent::Remote(RemoteJob::LoadInfo)]),
        }
    }

    /// Folds a finished remote call back into the grid. Mutations only touch
    /// the store after the backend confirmed them.
    pub fn apply_completion(&mut self, completion: RemoteCompletion) -> Vec<GridEvent> {
        match completion {
            RemoteCompletion::OrdersListed(result) => {
                self.loading = false;
                match result {
                    Ok(rows) => {
                        info!(count = rows.len(), "orders loaded");
                        self.store.reset(rows);
                        self.reconcile()
                    }
                    Err(error) => failed(error),
                }
            }
            RemoteCompletion::DetailFetched { ticket, id, result } => {
                match self.detail.resolve(ticket, result) {
                    DetailOutcome::Opened(_) => vec![GridEvent::DetailChanged],
                    DetailOutcome::Failed(error) => {
                        let mut events = vec![GridEvent::DetailChanged];
                        events.extend(failed(error));
                        events
                    }
                    DetailOutcome::Stale => {
                        debug!(%id, "stale detail response ignored");
                        Vec::new()
                    }
                }
            }
            RemoteCompletion::StatusPatched { id, status, result } => {
                self.in_flight.remove(&id);
                match result {
                    Ok(_) => {
                        info!(%id, status = status.as_str(), "order status changed");
                        self.store.patch_status(&id, status);
                        let mut events = self.reconcile();
                        events.push(GridEvent::Notice(Notice::success(format!(
                            "order {id} is now {}",
                            status.label()
                        ))));
                        events
                    }
                    Err(error) => failed(error),
                }
            }
            RemoteCompletion::DetailPatched { id, result } => {
                self.in_flight.remove(&id);
                match result {
                    Ok(_) => {
                        info!(%id, "order details updated");
                        let mut events = vec![GridEvent::Notice(Notice::success(format!(
                            "order {id} details updated"
                        )))];
                        if self.detail.shown_id() == Some(&id) {
                            let ticket = self.detail.request(id.clone());
                            events.push(GridEvent::DetailChanged);
                            events.push(GridEvent::Remote(RemoteJob::FetchDetail { ticket, id }));
                        }
                        events
                    }
                    Err(error) => failed(error),
                }
            }
            RemoteCompletion::OrderDeleted { id, result } => {
                self.in_flight.remove(&id);
                match result {
                    Ok(()) => {
                        info!(%id, "order deleted");
                        self.store.remove(&id);
                        let mut events = self.reconcile();
                        events.push(GridEvent::Notice(Notice::success(format!(
                            "order {id} deleted"
                        ))));
                        events
                    }
                    Err(error) => failed(error),
                }
            }
            RemoteCompletion::InfoLoaded(result) => match result {
                Ok(cards) => {
                    self.info = cards;
                    vec![GridEvent::InfoChanged]
                }
                Err(error) => failed(error),
            },
        }
    }

    /// Catches the view up with store changes made since the last call:
    /// a reset returns to page 1, a removal closes a detail panel showing
    /// that row, and the page index is clamped to the surviving rows.
    pub fn reconcile(&mut self) -> Vec<GridEvent> {
        let changes: Vec<_> = self.changes.try_iter().collect();
        if changes.is_empty() {
            return Vec::new();
        }

        let mut events = vec![GridEvent::RowsChanged];
        let mut page_moved = false;
        let mut detail_closed = false;
        for change in changes {
            match change {
                StoreChange::Reset { .. } => {
                    page_moved |= self.spec.pagination.reset();
                    if let Some(shown) = self.detail.shown_id().cloned()
                        && !self.store.contains(&shown)
                    {
                        detail_closed |= self.detail.on_row_removed(&shown);
                    }
                }
                StoreChange::Removed { id, .. } => {
                    detail_closed |= self.detail.on_row_removed(&id);
                }
                StoreChange::Patched { .. } => {}
            }
        }

        let matched = self.matched_rows();
        page_moved |= self.spec.pagination.clamp(matched);
        if detail_closed {
            events.push(GridEvent::DetailChanged);
        }
        if page_moved {
            events.push(self.page_event(matched));
        }
        events
    }

    fn set_query(&mut self, query: String) -> Vec<GridEvent> {
        if self.spec.query == query {
            return Vec::new();
        }
        self.spec.query = query;
        self.spec.pagination.reset();
        let matched = self.matched_rows();
        vec![GridEvent::QueryChanged, self.page_event(matched)]
    }

    fn clamp_page(&mut self) -> Option<GridEvent> {
        let matched = self.matched_rows();
        self.spec
            .pagination
            .clamp(matched)
            .then(|| self.page_event(matched))
    }

    fn page_moved(&self, moved: bool, matched: usize) -> Vec<GridEvent> {
        if moved {
            vec![self.page_event(matched)]
        } else {
            Vec::new()
        }
    }

    fn page_event(&self, matched: usize) -> GridEvent {
        GridEvent::PageChanged {
            page_index: self.spec.pagination.page_index(),
            page_count: self.spec.pagination.page_count(matched),
        }
    }

    fn ensure_writable(&self) -> Result<(), GridError> {
        match self.variant {
            GridVariant::Full => Ok(()),
            GridVariant::Dashboard => Err(GridError::ReadOnly),
        }
    }

    fn begin_mutation(&mut self, id: &OrderId, operation: SyncOperation) -> Result<(), GridError> {
        self.ensure_writable()?;
        if !self.store.contains(id) {
            return Err(GridError::UnknownOrder(id.clone()));
        }
        if self.in_flight.contains_key(id) {
            return Err(GridError::MutationPending(id.clone()));
        }
        self.in_flight.insert(id.clone(), operation);
        Ok(())
    }

    fn hideable_column(&self, name: &str) -> Result<&'static str, GridError> {
        let column = find_column(&self.columns, name)
            .ok_or_else(|| GridError::UnknownColumn(name.to_owned()))?;
        if !column.hideable {
            return Err(GridError::ColumnNotHideable(column.key));
        }
        Ok(column.key)
    }
}

/// Checks a configured column name against the full orders column set.
pub fn hideable_column_key(name: &str) -> Result<&'static str, GridError> {
    let column = order_columns()
        .into_iter()
        .find(|column| column.key == name)
        .ok_or_else(|| GridError::UnknownColumn(name.to_owned()))?;
    if !column.hideable {
        return Err(GridError::ColumnNotHideable(column.key));
    }
    Ok(column.key)
}

fn rejected(error: GridError) -> Vec<GridEvent> {
    debug!(%error, "grid command rejected");
    vec![GridEvent::Notice(Notice::error(error.to_string()))]
}

fn failed(error: SyncError) -> Vec<GridEvent> {
    warn!(
        operation = %error.operation,
        id = ?error.id,
        cause = %error.cause,
        "remote call failed"
    );
    vec![GridEvent::Notice(Notice::error(error.to_string()))]
}

#[cfg(test)]
mod tests {
    use super::{
        GridCommand, GridEvent, GridOptions, GridVariant, Notice, NoticeLevel, OrdersGrid,
    };
    use crate::{
        Amount, DetailPatch, GridError, Order, OrderDetail, OrderId, OrderStatus, RemoteCompletion,
        RemoteJob, RowStatus, SyncError, SyncOperation,
    };

    fn order(index: usize) -> Order {
        Order {
            id: OrderId::new(format!("RSQ{index:04}")),
            buyer: format!("Buyer {index}"),
            merchant: "Jaya Grocer".to_owned(),
            status: RowStatus::Known(OrderStatus::Preparing),
            amount: Amount::ZERO,
            date: format!("2024-06-{:02} 10:00", index % 28 + 1),
        }
    }

    fn seeded(variant: GridVariant, count: usize) -> OrdersGrid {
        let mut grid = OrdersGrid::new(variant);
        grid.dispatch(GridCommand::Reload);
        grid.apply_completion(RemoteCompletion::OrdersListed(Ok(
            (1..=count).map(order).collect()
        )));
        grid
    }

    fn notice(events: &[GridEvent]) -> Option<&Notice> {
        events.iter().find_map(|event| match event {
            GridEvent::Notice(notice) => Some(notice),
            _ => None,
        })
    }

    fn error_text(error: GridError) -> Vec<GridEvent> {
        vec![GridEvent::Notice(Notice::error(error.to_string()))]
    }

    #[test]
    fn reload_requests_list_once() {
        let mut grid = OrdersGrid::new(GridVariant::Full);
        assert_eq!(
            grid.dispatch(GridCommand::Reload),
            vec![GridEvent::Remote(RemoteJob::ListOrders)]
        );
        assert!(grid.is_loading());
        assert_eq!(
            grid.dispatch(GridCommand::Reload),
            error_text(GridError::ReloadPending)
        );
    }

    #[test]
    fn second_mutation_for_same_id_is_rejected_until_first_finishes() {
        let mut grid = seeded(GridVariant::Full, 3);
        let id = OrderId::from("RSQ0002");

        let first = grid.dispatch(GridCommand::ChangeStatus {
            id: id.clone(),
            status: OrderStatus::Completed,
        });
        assert_eq!(
            first,
            vec![GridEvent::Remote(RemoteJob::PatchStatus {
                id: id.clone(),
                status: OrderStatus::Completed,
            })]
        );
        assert_eq!(grid.pending_operation(&id), Some(SyncOperation::PatchStatus));

        let second = grid.dispatch(GridCommand::DeleteOrder(id.clone()));
        assert_eq!(second, error_text(GridError::MutationPending(id.clone())));

        grid.apply_completion(RemoteCompletion::StatusPatched {
            id: id.clone(),
            status: OrderStatus::Completed,
            result: Ok(order(2)),
        });
        assert_eq!(grid.pending_operation(&id), None);
        assert_eq!(
            grid.dispatch(GridCommand::DeleteOrder(id.clone())),
            vec![GridEvent::Remote(RemoteJob::DeleteOrder { id })]
        );
    }

    #[test]
    fn failed_status_change_leaves_row_untouched() {
        let mut grid = seeded(GridVariant::Full, 3);
        let id = OrderId::from("RSQ0001");
        grid.dispatch(GridCommand::ChangeStatus {
            id: id.clone(),
            status: OrderStatus::Refund,
        });

        let events = grid.apply_completion(RemoteCompletion::StatusPatched {
            id: id.clone(),
            status: OrderStatus::Refund,
            result: Err(SyncError::new(
                SyncOperation::PatchStatus,
                Some(&id),
                &anyhow::anyhow!("server returned 500"),
            )),
        });

        let notice = notice(&events).expect("failure notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("change status failed for RSQ0001"));
        assert_eq!(
            grid.store().get(&id).map(|row| row.status.clone()),
            Some(RowStatus::Known(OrderStatus::Preparing))
        );
        assert_eq!(grid.pending_operation(&id), None);
    }

    #[test]
    fn dashboard_grid_rejects_mutations() {
        let mut grid = seeded(GridVariant::Dashboard, 3);
        assert_eq!(
            grid.dispatch(GridCommand::DeleteOrder(OrderId::from("RSQ0001"))),
            error_text(GridError::ReadOnly)
        );
        assert!(
            grid.columns()
                .iter()
                .all(|column| column.key != "actions")
        );
    }

    #[test]
    fn id_column_cannot_be_hidden() {
        let mut grid = seeded(GridVariant::Full, 3);
        assert_eq!(
            grid.dispatch(GridCommand::ToggleColumn("id".to_owned())),
            error_text(GridError::ColumnNotHideable("id"))
        );
        assert_eq!(
            grid.dispatch(GridCommand::ToggleColumn("nope".to_owned())),
            error_text(GridError::UnknownColumn("nope".to_owned()))
        );
        assert_eq!(
            grid.dispatch(GridCommand::ToggleColumn("buyer".to_owned())),
            vec![GridEvent::ColumnsChanged]
        );
        assert!(grid.spec().is_hidden("buyer"));
    }

    #[test]
    fn status_column_is_not_sortable() {
        let mut grid = seeded(GridVariant::Full, 3);
        assert_eq!(
            grid.dispatch(GridCommand::ToggleSort("status".to_owned())),
            error_text(GridError::ColumnNotSortable("status"))
        );
    }

    #[test]
    fn out_of_range_page_is_reported_without_moving() {
        let mut grid = seeded(GridVariant::Full, 25);
        grid.dispatch(GridCommand::GoToPage(2));

        let events = grid.dispatch(GridCommand::GoToPage(9));
        assert_eq!(
            events,
            error_text(GridError::OutOfRangePage {
                requested: 9,
                page_count: 3
            })
        );
        assert_eq!(grid.spec().pagination.page_index(), 1);
        assert_eq!(grid.page_summary(), "Page 2 of 3");
    }

    #[test]
    fn deleting_the_only_row_on_last_page_clamps() {
        let mut grid = seeded(GridVariant::Full, 21);
        grid.dispatch(GridCommand::LastPage);
        assert_eq!(grid.spec().pagination.page_index(), 2);

        let id = OrderId::from("RSQ0021");
        grid.dispatch(GridCommand::DeleteOrder(id.clone()));
        let events = grid.apply_completion(RemoteCompletion::OrderDeleted { id, result: Ok(()) });

        assert!(events.contains(&GridEvent::PageChanged {
            page_index: 1,
            page_count: 2
        }));
        assert_eq!(grid.view().rows.len(), 10);
    }

    #[test]
    fn reload_returns_to_first_page() {
        let mut grid = seeded(GridVariant::Full, 25);
        grid.dispatch(GridCommand::LastPage);

        grid.dispatch(GridCommand::Reload);
        let events = grid.apply_completion(RemoteCompletion::OrdersListed(Ok(
            (1..=25).map(order).collect()
        )));
        assert!(events.contains(&GridEvent::RowsChanged));
        assert_eq!(grid.spec().pagination.page_index(), 0);
    }

    #[test]
    fn detail_patch_triggers_refetch_of_open_panel() {
        let mut grid = seeded(GridVariant::Full, 3);
        let id = OrderId::from("RSQ0003");

        let events = grid.dispatch(GridCommand::ViewDetails(id.clone()));
        let Some(GridEvent::Remote(RemoteJob::FetchDetail { ticket, .. })) = events.last().cloned()
        else {
            panic!("expected a detail fetch");
        };
        grid.apply_completion(RemoteCompletion::DetailFetched {
            ticket,
            id: id.clone(),
            result: Ok(OrderDetail {
                id: None,
                items: Vec::new(),
                payment_method: "Card".to_owned(),
                pickup_time: "20:00".to_owned(),
                subtotal: Amount::ZERO,
                service_tax: Amount::ZERO,
                voucher_applied: Amount::ZERO,
            }),
        });

        let unchanged = grid.dispatch(GridCommand::UpdateDetail(DetailPatch {
            payment_method: Some("Card".to_owned()),
            pickup_time: None,
        }));
        assert_eq!(unchanged, error_text(GridError::EmptyDetailPatch));

        let patch = DetailPatch {
            payment_method: Some("Cash".to_owned()),
            pickup_time: None,
        };
        let events = grid.dispatch(GridCommand::UpdateDetail(patch.clone()));
        assert_eq!(
            events,
            vec![GridEvent::Remote(RemoteJob::PatchDetail {
                id: id.clone(),
                patch
            })]
        );

        let events = grid.apply_completion(RemoteCompletion::DetailPatched {
            id: id.clone(),
            result: Err(SyncError::new(
                SyncOperation::PatchDetail,
                Some(&id),
                &anyhow::anyhow!("timed out"),
            )),
        });
        assert_eq!(notice(&events).map(|notice| notice.level), Some(NoticeLevel::Error));
        assert!(grid.detail().is_open());
    }

    #[test]
    fn options_apply_page_size_and_hidden_columns() {
        let grid = OrdersGrid::with_options(
            GridVariant::Dashboard,
            &GridOptions {
                page_size: Some(20),
                hidden_columns: vec!["merchant".to_owned(), "actions".to_owned()],
            },
        )
        .expect("valid options");
        assert_eq!(grid.spec().pagination.page_size(), 20);
        assert!(grid.spec().is_hidden("merchant"));
        assert!(!grid.spec().is_hidden("actions"));

        let invalid = OrdersGrid::with_options(
            GridVariant::Full,
            &GridOptions {
                page_size: Some(15),
                hidden_columns: Vec::new(),
            },
        );
        assert_eq!(invalid.err(), Some(GridError::InvalidPageSize(15)));
    }
}
