// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use orderdesk_app::{
    DetailPatch, InfoCard, Order, OrderDetail, OrderId, OrderStatus, OrdersBackend, RemoteJob,
};
use orderdesk_remote::Client;
use orderdesk_testkit::MemoryBackend;
use orderdesk_tui::{GridRuntime, GridTarget, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

/// Orders API runtime. Every remote job runs on its own worker thread so the
/// UI keeps drawing while a call is outstanding.
pub struct RemoteRuntime {
    client: Client,
}

impl RemoteRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl OrdersBackend for RemoteRuntime {
    fn list_orders(&self) -> Result<Vec<Order>> {
        self.client.list_orders()
    }

    fn order_detail(&self, id: &OrderId) -> Result<OrderDetail> {
        self.client.order_detail(id)
    }

    fn patch_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        self.client.patch_order_status(id, status)
    }

    fn patch_order_detail(&self, id: &OrderId, patch: &DetailPatch) -> Result<OrderDetail> {
        self.client.patch_order_detail(id, patch)
    }

    fn delete_order(&self, id: &OrderId) -> Result<()> {
        self.client.delete_order(id)
    }

    fn dashboard_info(&self) -> Result<Vec<InfoCard>> {
        self.client.dashboard_info()
    }
}

impl GridRuntime for RemoteRuntime {
    fn spawn_remote(
        &mut self,
        target: GridTarget,
        job: RemoteJob,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("orderdesk-remote".to_owned())
            .spawn(move || {
                let completion = job.run(&client);
                if tx.send(InternalEvent::Remote { target, completion }).is_err() {
                    debug!("ui closed before remote job finished");
                }
            })
            .context("spawn remote worker")?;
        Ok(())
    }
}

/// In-memory runtime behind `--demo`; jobs run inline.
pub struct DemoRuntime {
    backend: MemoryBackend,
}

impl DemoRuntime {
    pub fn new(backend: MemoryBackend) -> Self {
        Self { backend }
    }
}

impl OrdersBackend for DemoRuntime {
    fn list_orders(&self) -> Result<Vec<Order>> {
        self.backend.list_orders()
    }

    fn order_detail(&self, id: &OrderId) -> Result<OrderDetail> {
        self.backend.order_detail(id)
    }

    fn patch_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        self.backend.patch_order_status(id, status)
    }

    fn patch_order_detail(&self, id: &OrderId, patch: &DetailPatch) -> Result<OrderDetail> {
        self.backend.patch_order_detail(id, patch)
    }

    fn delete_order(&self, id: &OrderId) -> Result<()> {
        self.backend.delete_order(id)
    }

    fn dashboard_info(&self) -> Result<Vec<InfoCard>> {
        self.backend.dashboard_info()
    }
}

impl GridRuntime for DemoRuntime {}
