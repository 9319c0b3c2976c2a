// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use orderdesk_app::{
    Amount, DetailPatch, DetailState, GridCommand, GridEvent, GridVariant, InfoCard, NoticeLevel,
    Order, OrderDetail, OrderId, OrderStatus, OrdersBackend, OrdersGrid, RemoteJob, RowStatus,
    SyncAdapter,
};
use std::cell::RefCell;
use std::collections::BTreeSet;

#[derive(Default)]
struct FakeBackend {
    orders: RefCell<Vec<Order>>,
    calls: RefCell<Vec<String>>,
    failing: RefCell<BTreeSet<&'static str>>,
}

impl FakeBackend {
    fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders: RefCell::new(orders),
            ..Self::default()
        }
    }

    fn fail(&self, call: &'static str) {
        self.failing.borrow_mut().insert(call);
    }

    fn record(&self, call: &'static str, id: Option<&OrderId>) -> Result<()> {
        let entry = match id {
            Some(id) => format!("{call} {id}"),
            None => call.to_owned(),
        };
        self.calls.borrow_mut().push(entry);
        if self.failing.borrow().contains(call) {
            bail!("server returned 500 Internal Server Error");
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl OrdersBackend for FakeBackend {
    fn list_orders(&self) -> Result<Vec<Order>> {
        self.record("list", None)?;
        Ok(self.orders.borrow().clone())
    }

    fn order_detail(&self, id: &OrderId) -> Result<OrderDetail> {
        self.record("detail", Some(id))?;
        Ok(detail_for(id))
    }

    fn patch_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        self.record("patch-status", Some(id))?;
        let mut orders = self.orders.borrow_mut();
        let order = orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or_else(|| anyhow!("server returned 404 Not Found"))?;
        order.status = RowStatus::Known(status);
        Ok(order.clone())
    }

    fn patch_order_detail(&self, id: &OrderId, _patch: &DetailPatch) -> Result<OrderDetail> {
        self.record("patch-detail", Some(id))?;
        Ok(detail_for(id))
    }

    fn delete_order(&self, id: &OrderId) -> Result<()> {
        self.record("delete", Some(id))?;
        self.orders.borrow_mut().retain(|order| &order.id != id);
        Ok(())
    }

    fn dashboard_info(&self) -> Result<Vec<InfoCard>> {
        self.record("info", None)?;
        Ok(vec![InfoCard {
            title: "Orders today".to_owned(),
            value: "12".to_owned(),
            detail: "+3 from yesterday".to_owned(),
        }])
    }
}

fn detail_for(id: &OrderId) -> OrderDetail {
    OrderDetail {
        id: Some(id.clone()),
        items: Vec::new(),
        payment_method: format!("Card for {id}"),
        pickup_time: "20:00".to_owned(),
        subtotal: Amount::ZERO,
        service_tax: Amount::ZERO,
        voucher_applied: Amount::ZERO,
    }
}

fn order(id: &str, merchant: &str, status: OrderStatus) -> Order {
    Order {
        id: OrderId::from(id),
        buyer: "Nur Aisyah".to_owned(),
        merchant: merchant.to_owned(),
        status: RowStatus::Known(status),
        amount: Amount::ZERO,
        date: "2024-06-04 20:00".to_owned(),
    }
}

fn numbered(count: usize) -> Vec<Order> {
    (1..=count)
        .map(|index| order(&format!("RSQ{index:04}"), "Jaya Grocer", OrderStatus::Pending))
        .collect()
}

fn loaded(backend: &FakeBackend) -> (SyncAdapter<&FakeBackend>, OrdersGrid) {
    let adapter = SyncAdapter::new(backend);
    let mut grid = OrdersGrid::new(GridVariant::Full);
    adapter.load(&mut grid);
    (adapter, grid)
}

fn visible_ids(grid: &OrdersGrid) -> Vec<String> {
    grid.view()
        .rows
        .iter()
        .map(|row| row.id.to_string())
        .collect()
}

fn notices(events: &[GridEvent]) -> Vec<(NoticeLevel, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            GridEvent::Notice(notice) => Some((notice.level, notice.message.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn twenty_five_rows_paginate_into_three_pages() {
    let backend = FakeBackend::with_orders(numbered(25));
    let (adapter, mut grid) = loaded(&backend);

    assert_eq!(grid.view().page_count, 3);

    adapter.dispatch(&mut grid, GridCommand::GoToPage(3));
    assert_eq!(
        visible_ids(&grid),
        vec!["RSQ0021", "RSQ0022", "RSQ0023", "RSQ0024", "RSQ0025"]
    );

    let events = adapter.dispatch(&mut grid, GridCommand::GoToPage(4));
    assert_eq!(
        notices(&events),
        vec![(
            NoticeLevel::Error,
            "page 4 is out of range (1-3)".to_owned()
        )]
    );
    assert_eq!(grid.view().page_index, 2);
}

#[test]
fn status_change_lands_in_store_after_backend_confirms() {
    let backend = FakeBackend::with_orders(vec![
        order("RSQ0059", "Jaya Grocer", OrderStatus::Pending),
        order("RSQ0060", "Jaya Grocer", OrderStatus::Preparing),
    ]);
    let (adapter, mut grid) = loaded(&backend);
    let id = OrderId::from("RSQ0060");

    let events = adapter.change_status(&mut grid, id.clone(), OrderStatus::Completed);

    assert_eq!(
        grid.store().get(&id).map(|row| row.status.as_str()),
        Some("completed")
    );
    let notices = notices(&events);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, NoticeLevel::Success);
    assert!(notices[0].1.to_lowercase().contains("completed"));
    assert!(backend.calls().contains(&"patch-status RSQ0060".to_owned()));
}

#[test]
fn failed_delete_keeps_row_and_reports_error() {
    let backend = FakeBackend::with_orders(numbered(3));
    let (adapter, mut grid) = loaded(&backend);
    backend.fail("delete");

    let events = adapter.delete(&mut grid, OrderId::from("RSQ0002"));

    assert_eq!(grid.store().len(), 3);
    assert_eq!(
        notices(&events),
        vec![(
            NoticeLevel::Error,
            "delete order failed for RSQ0002: server returned 500 Internal Server Error"
                .to_owned()
        )]
    );
}

#[test]
fn free_text_query_filters_and_clearing_restores_first_page() {
    let mut orders = numbered(18);
    for index in 0..12 {
        orders.push(order(
            &format!("MV{index:04}"),
            "Village Grocer Mid Valley Megamall",
            OrderStatus::Pending,
        ));
    }
    let backend = FakeBackend::with_orders(orders);
    let (adapter, mut grid) = loaded(&backend);

    adapter.dispatch(&mut grid, GridCommand::SetQuery("Mid Valley".to_owned()));
    let view = grid.view();
    assert_eq!(view.matched_rows, 12);
    assert!(view.rows.iter().all(|row| row.merchant.contains("Mid Valley")));

    adapter.dispatch(&mut grid, GridCommand::NextPage);
    assert_eq!(grid.view().page_index, 1);

    let events = adapter.dispatch(&mut grid, GridCommand::ClearQuery);
    assert!(events.contains(&GridEvent::QueryChanged));
    let view = grid.view();
    assert_eq!(view.matched_rows, 30);
    assert_eq!(view.page_index, 0);
    assert_eq!(view.page_count, 3);
}

#[test]
fn removing_the_open_row_closes_the_detail_panel() {
    let backend = FakeBackend::with_orders(vec![
        order("X", "Jaya Grocer", OrderStatus::Pending),
        order("Y", "Jaya Grocer", OrderStatus::Pending),
    ]);
    let (adapter, mut grid) = loaded(&backend);
    let id = OrderId::from("X");

    adapter.view_details(&mut grid, id.clone());
    assert!(grid.detail().is_open());

    grid.store_mut().remove(&id);
    let events = grid.reconcile();

    assert!(events.contains(&GridEvent::DetailChanged));
    assert_eq!(grid.detail().state(), &DetailState::Closed);
    assert!(grid.detail().detail().is_none());
}

#[test]
fn deleting_the_open_row_through_backend_closes_the_panel() {
    let backend = FakeBackend::with_orders(numbered(2));
    let (adapter, mut grid) = loaded(&backend);
    let id = OrderId::from("RSQ0001");

    adapter.view_details(&mut grid, id.clone());
    let events = adapter.delete(&mut grid, id.clone());

    assert!(events.contains(&GridEvent::DetailChanged));
    assert!(!grid.detail().is_visible());
    assert!(!grid.store().contains(&id));
    assert_eq!(
        notices(&events),
        vec![(NoticeLevel::Success, "order RSQ0001 deleted".to_owned())]
    );
}

#[test]
fn superseded_detail_response_is_ignored() -> Result<()> {
    let backend = FakeBackend::with_orders(numbered(2));
    let (_, mut grid) = loaded(&backend);

    let first = grid.dispatch(GridCommand::ViewDetails(OrderId::from("RSQ0001")));
    let second = grid.dispatch(GridCommand::ViewDetails(OrderId::from("RSQ0002")));
    let job = |events: Vec<GridEvent>| {
        events.into_iter().find_map(|event| match event {
            GridEvent::Remote(job) => Some(job),
            _ => None,
        })
    };
    let first = job(first).ok_or_else(|| anyhow!("first fetch job"))?;
    let second = job(second).ok_or_else(|| anyhow!("second fetch job"))?;

    let late = grid.apply_completion(second.run(&backend));
    assert_eq!(late, vec![GridEvent::DetailChanged]);
    let stale = grid.apply_completion(first.run(&backend));
    assert!(stale.is_empty());

    let shown = grid
        .detail()
        .detail()
        .map(|(id, detail)| (id.to_string(), detail.payment_method.clone()));
    assert_eq!(
        shown,
        Some(("RSQ0002".to_owned(), "Card for RSQ0002".to_owned()))
    );
    Ok(())
}

#[test]
fn detail_update_refetches_panel() {
    let backend = FakeBackend::with_orders(numbered(1));
    let (adapter, mut grid) = loaded(&backend);
    let id = OrderId::from("RSQ0001");

    adapter.view_details(&mut grid, id);
    let events = adapter.update_details(
        &mut grid,
        DetailPatch {
            payment_method: None,
            pickup_time: Some("21:30".to_owned()),
        },
    );

    assert!(
        notices(&events)
            .iter()
            .any(|(level, _)| *level == NoticeLevel::Success)
    );
    assert_eq!(
        backend.calls(),
        vec![
            "list".to_owned(),
            "detail RSQ0001".to_owned(),
            "patch-detail RSQ0001".to_owned(),
            "detail RSQ0001".to_owned(),
        ]
    );
    assert!(grid.detail().is_open());
}

#[test]
fn failed_list_leaves_an_empty_grid_and_a_notice() {
    let backend = FakeBackend::default();
    backend.fail("list");
    let adapter = SyncAdapter::new(&backend);
    let mut grid = OrdersGrid::new(GridVariant::Full);

    let events = adapter.load(&mut grid);

    assert!(!grid.is_loading());
    assert!(grid.view().is_empty());
    assert_eq!(grid.page_summary(), "Page 1 of 1");
    assert_eq!(notices(&events)[0].0, NoticeLevel::Error);
}

#[test]
fn dashboard_info_cards_load() {
    let backend = FakeBackend::default();
    let adapter = SyncAdapter::new(&backend);
    let mut grid = OrdersGrid::new(GridVariant::Dashboard);

    let events = adapter.dispatch(&mut grid, GridCommand::LoadInfo);

    assert_eq!(events, vec![GridEvent::InfoChanged]);
    assert_eq!(grid.info()[0].title, "Orders today");
}

#[test]
fn remote_job_is_emitted_before_any_store_change() {
    let backend = FakeBackend::with_orders(numbered(1));
    let (_adapter, mut grid) = loaded(&backend);
    let id = OrderId::from("RSQ0001");

    let events = grid.dispatch(GridCommand::ChangeStatus {
        id: id.clone(),
        status: OrderStatus::Refund,
    });

    assert_eq!(
        events,
        vec![GridEvent::Remote(RemoteJob::PatchStatus {
            id: id.clone(),
            status: OrderStatus::Refund,
        })]
    );
    assert_eq!(
        grid.store().get(&id).map(|row| row.status.clone()),
        Some(RowStatus::Known(OrderStatus::Pending))
    );
}
