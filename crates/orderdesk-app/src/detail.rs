// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::error::SyncError;
use crate::ids::{DetailTicket, OrderId};
use crate::model::OrderDetail;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    #[default]
    Closed,
    Loading {
        ticket: DetailTicket,
        id: OrderId,
    },
    Open {
        id: OrderId,
        detail: OrderDetail,
    },
    /// Last fetch failed. Renders as closed; the error went out as a notice.
    Failed {
        id: OrderId,
        error: SyncError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Opened(OrderId),
    Failed(SyncError),
    /// Superseded by a newer request; the payload was dropped.
    Stale,
}

/// Per-order detail panel. Every request gets a fresh ticket and only the
/// newest ticket may resolve the panel.
#[derive(Debug, Clone, Default)]
pub struct DetailPanel {
    state: DetailState,
    next_ticket: u64,
}

impl DetailPanel {
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn request(&mut self, id: OrderId) -> DetailTicket {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = DetailTicket::new(self.next_ticket);
        self.state = DetailState::Loading { ticket, id };
        ticket
    }

    pub fn resolve(
        &mut self,
        ticket: DetailTicket,
        result: Result<OrderDetail, SyncError>,
    ) -> DetailOutcome {
        let id = match &self.state {
            DetailState::Loading {
                ticket: current,
                id,
            } if *current == ticket => id.clone(),
            _ => {
                debug!(ticket = ticket.get(), "discarding stale detail response");
                return DetailOutcome::Stale;
            }
        };

        match result {
            Ok(detail) => {
                self.state = DetailState::Open {
                    id: id.clone(),
                    detail,
                };
                DetailOutcome::Opened(id)
            }
            Err(error) => {
                self.state = DetailState::Failed {
                    id,
                    error: error.clone(),
                };
                DetailOutcome::Failed(error)
            }
        }
    }

    pub fn close(&mut self) -> bool {
        let was_visible = self.is_visible();
        self.state = DetailState::Closed;
        was_visible
    }

    /// Closes the panel when it is loading or showing `id`.
    pub fn on_row_removed(&mut self, id: &OrderId) -> bool {
        let affected = match &self.state {
            DetailState::Loading { id: shown, .. } | DetailState::Open { id: shown, .. } => {
                shown == id
            }
            DetailState::Closed | DetailState::Failed { .. } => false,
        };
        if affected {
            self.state = DetailState::Closed;
        }
        affected
    }

    /// Id the panel is loading or showing.
    pub fn shown_id(&self) -> Option<&OrderId> {
        match &self.state {
            DetailState::Loading { id, .. } | DetailState::Open { id, .. } => Some(id),
            DetailState::Closed | DetailState::Failed { .. } => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DetailState::Loading { .. })
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DetailState::Open { .. })
    }

    pub fn is_visible(&self) -> bool {
        self.shown_id().is_some()
    }

    pub fn detail(&self) -> Option<(&OrderId, &OrderDetail)> {
        match &self.state {
            DetailState::Open { id, detail } => Some((id, detail)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DetailOutcome, DetailPanel, DetailState};
    use crate::{Amount, OrderDetail, OrderId, SyncError, SyncOperation};

    fn detail(method: &str) -> OrderDetail {
        OrderDetail {
            id: None,
            items: Vec::new(),
            payment_method: method.to_owned(),
            pickup_time: "20:00".to_owned(),
            subtotal: Amount::ZERO,
            service_tax: Amount::ZERO,
            voucher_applied: Amount::ZERO,
        }
    }

    #[test]
    fn fetch_success_opens_panel() {
        let mut panel = DetailPanel::default();
        let ticket = panel.request(OrderId::from("RSQ0001"));
        assert!(panel.is_loading());

        let outcome = panel.resolve(ticket, Ok(detail("Card")));
        assert_eq!(outcome, DetailOutcome::Opened(OrderId::from("RSQ0001")));
        assert_eq!(
            panel.detail().map(|(_, detail)| detail.payment_method.as_str()),
            Some("Card")
        );
    }

    #[test]
    fn superseded_fetch_is_discarded() {
        let mut panel = DetailPanel::default();
        let first = panel.request(OrderId::from("RSQ0001"));
        let second = panel.request(OrderId::from("RSQ0002"));

        assert_eq!(panel.resolve(first, Ok(detail("Card"))), DetailOutcome::Stale);
        assert!(panel.is_loading());

        panel.resolve(second, Ok(detail("Cash")));
        assert_eq!(
            panel.detail().map(|(id, _)| id.clone()),
            Some(OrderId::from("RSQ0002"))
        );
    }

    #[test]
    fn late_response_after_close_is_stale() {
        let mut panel = DetailPanel::default();
        let ticket = panel.request(OrderId::from("RSQ0001"));
        panel.close();

        assert_eq!(panel.resolve(ticket, Ok(detail("Card"))), DetailOutcome::Stale);
        assert_eq!(panel.state(), &DetailState::Closed);
    }

    #[test]
    fn fetch_failure_leaves_panel_hidden() {
        let mut panel = DetailPanel::default();
        let id = OrderId::from("RSQ0001");
        let ticket = panel.request(id.clone());
        let error = SyncError::new(
            SyncOperation::FetchDetail,
            Some(&id),
            &anyhow::anyhow!("server returned 500"),
        );

        assert_eq!(
            panel.resolve(ticket, Err(error.clone())),
            DetailOutcome::Failed(error)
        );
        assert!(!panel.is_visible());
    }

    #[test]
    fn removing_shown_row_closes_panel() {
        let mut panel = DetailPanel::default();
        let ticket = panel.request(OrderId::from("X"));
        panel.resolve(ticket, Ok(detail("Card")));

        assert!(!panel.on_row_removed(&OrderId::from("Y")));
        assert!(panel.is_open());

        assert!(panel.on_row_removed(&OrderId::from("X")));
        assert_eq!(panel.state(), &DetailState::Closed);
        assert!(panel.detail().is_none());
    }
}
