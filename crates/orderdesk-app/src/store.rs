// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, warn};

use crate::ids::OrderId;
use crate::model::{Order, OrderStatus, RowStatus};

/// A row type the grid can hold: anything with a stable, unique id.
pub trait GridRow: Clone {
    type Id: Clone + Ord + fmt::Debug + fmt::Display;

    fn row_id(&self) -> &Self::Id;
}

impl GridRow for Order {
    type Id = OrderId;

    fn row_id(&self) -> &OrderId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange<Id> {
    Reset { len: usize },
    Patched { id: Id },
    Removed { id: Id, index: usize },
}

/// Authoritative copy of the rows currently shown. Mutations are broadcast to
/// every live subscriber; unknown ids are ignored rather than reported.
#[derive(Debug)]
pub struct RowStore<R: GridRow> {
    rows: Vec<R>,
    subscribers: Vec<Sender<StoreChange<R::Id>>>,
}

impl<R: GridRow> Default for RowStore<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            subscribers: Vec::new(),
        }
    }
}

impl<R: GridRow> RowStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.rows.iter().find(|row| row.row_id() == id)
    }

    pub fn contains(&self, id: &R::Id) -> bool {
        self.get(id).is_some()
    }

    pub fn subscribe(&mut self) -> Receiver<StoreChange<R::Id>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Replaces the whole collection. Later duplicates of an id are dropped so
    /// the store never holds two rows with the same id.
    pub fn reset(&mut self, rows: Vec<R>) -> StoreChange<R::Id> {
        let mut seen = BTreeSet::new();
        let mut unique = Vec::with_capacity(rows.len());
        for row in rows {
            if seen.insert(row.row_id().clone()) {
                unique.push(row);
            } else {
                warn!(id = %row.row_id(), "dropping row with duplicate id");
            }
        }

        self.rows = unique;
        let change = StoreChange::Reset {
            len: self.rows.len(),
        };
        self.publish(change.clone());
        change
    }

    /// Applies `edit` to the row with `id`. The edit must leave the id alone.
    pub fn patch(&mut self, id: &R::Id, edit: impl FnOnce(&mut R)) -> Option<StoreChange<R::Id>> {
        let Some(row) = self.rows.iter_mut().find(|row| row.row_id() == id) else {
            debug!(%id, "patch ignored for unknown row");
            return None;
        };
        edit(row);
        debug_assert!(row.row_id() == id, "row patch changed the row id");

        let change = StoreChange::Patched { id: id.clone() };
        self.publish(change.clone());
        Some(change)
    }

    pub fn remove(&mut self, id: &R::Id) -> Option<R> {
        let Some(index) = self.rows.iter().position(|row| row.row_id() == id) else {
            debug!(%id, "remove ignored for unknown row");
            return None;
        };
        let removed = self.rows.remove(index);
        self.publish(StoreChange::Removed {
            id: id.clone(),
            index,
        });
        Some(removed)
    }

    fn publish(&mut self, change: StoreChange<R::Id>) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}

impl RowStore<Order> {
    pub fn patch_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Option<StoreChange<OrderId>> {
        self.patch(id, |row| row.status = RowStatus::Known(status))
    }
}
