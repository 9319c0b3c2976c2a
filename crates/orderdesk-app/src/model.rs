// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::ids::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    WaitPickup,
    Cancel,
    Refund,
    Completed,
    NoPickup,
}

impl OrderStatus {
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Preparing,
        Self::WaitPickup,
        Self::Cancel,
        Self::Refund,
        Self::Completed,
        Self::NoPickup,
    ];

    /// Order in which the "change status" menu lists the choices.
    pub const MENU: [Self; 7] = [
        Self::Preparing,
        Self::WaitPickup,
        Self::Completed,
        Self::Cancel,
        Self::Pending,
        Self::Refund,
        Self::NoPickup,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::WaitPickup => "waitpickup",
            Self::Cancel => "cancel",
            Self::Refund => "refund",
            Self::Completed => "completed",
            Self::NoPickup => "nopickup",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "preparing" => Some(Self::Preparing),
            "waitpickup" => Some(Self::WaitPickup),
            "cancel" => Some(Self::Cancel),
            "refund" => Some(Self::Refund),
            "completed" => Some(Self::Completed),
            "nopickup" => Some(Self::NoPickup),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Preparing => "Preparing",
            Self::WaitPickup => "Waiting for pickup...",
            Self::Cancel => "Cancel",
            Self::Refund => "Refund",
            Self::Completed => "Completed",
            Self::NoPickup => "Did not pickup",
        }
    }

    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Preparing => StatusTone::Warning,
            Self::WaitPickup => StatusTone::Info,
            Self::Completed => StatusTone::Success,
            Self::Pending | Self::Cancel | Self::Refund | Self::NoPickup => StatusTone::Neutral,
        }
    }
}

/// Presentation class for a status badge; front ends map it to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Warning,
    Info,
    Success,
}

pub const UNKNOWN_STATUS_LABEL: &str = "Unknown";

/// Status as received from the backend. Values outside the known set are
/// kept verbatim so they survive a round trip and render as "Unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RowStatus {
    Known(OrderStatus),
    Unknown(String),
}

impl RowStatus {
    pub fn known(&self) -> Option<OrderStatus> {
        match self {
            Self::Known(status) => Some(*status),
            Self::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(status) => status.as_str(),
            Self::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Known(status) => status.label(),
            Self::Unknown(_) => UNKNOWN_STATUS_LABEL,
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            Self::Known(status) => status.tone(),
            Self::Unknown(_) => StatusTone::Neutral,
        }
    }
}

impl From<OrderStatus> for RowStatus {
    fn from(value: OrderStatus) -> Self {
        Self::Known(value)
    }
}

impl From<String> for RowStatus {
    fn from(value: String) -> Self {
        match OrderStatus::parse(&value) {
            Some(status) => Self::Known(status),
            None => Self::Unknown(value),
        }
    }
}

impl From<RowStatus> for String {
    fn from(value: RowStatus) -> Self {
        match value {
            RowStatus::Known(status) => status.as_str().to_owned(),
            RowStatus::Unknown(raw) => raw,
        }
    }
}

/// Non-negative ringgit amount held in sen. The wire format is a JSON number
/// in ringgit (`12.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: i64) -> Result<Self> {
        if cents < 0 {
            bail!("amount cannot be negative, got {cents} sen");
        }
        Ok(Self(cents))
    }

    pub fn from_decimal(value: f64) -> Result<Self> {
        if !value.is_finite() {
            bail!("amount must be a finite number, got {value}");
        }
        if value < 0.0 {
            bail!("amount cannot be negative, got {value}");
        }
        Ok(Self((value * 100.0).round() as i64))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0).max(0))
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn display(self) -> String {
        let ringgit = self.0 / 100;
        let sen = self.0 % 100;
        format!("RM{}.{sen:02}", group_thousands(ringgit.unsigned_abs()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::from_decimal(value).map_err(serde::de::Error::custom)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// One sales order as listed by `GET /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer: String,
    pub merchant: String,
    pub status: RowStatus,
    pub amount: Amount,
    /// Sortable timestamp text; the backend guarantees lexicographic order
    /// matches chronological order.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub price: Amount,
    pub expiry: String,
    /// Quantity ordered.
    pub amount: u32,
}

impl LineItem {
    pub fn line_total(&self) -> Amount {
        Amount(self.price.cents().saturating_mul(i64::from(self.amount)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub items: Vec<LineItem>,
    pub payment_method: String,
    pub pickup_time: String,
    pub subtotal: Amount,
    pub service_tax: Amount,
    pub voucher_applied: Amount,
}

impl OrderDetail {
    pub fn total(&self) -> Amount {
        self.subtotal
            .saturating_add(self.service_tax)
            .saturating_sub(self.voucher_applied)
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }
}

/// Body of `PATCH /orders/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPatch {
    pub status: OrderStatus,
}

/// Body of `PATCH /order_details/{id}`; only the fields that are set are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetailPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
}

impl DetailPatch {
    pub fn is_empty(&self) -> bool {
        self.payment_method.is_none() && self.pickup_time.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(method) = &self.payment_method
            && method.trim().is_empty()
        {
            bail!("payment method cannot be blank -- enter a method or leave it unchanged");
        }
        if let Some(pickup) = &self.pickup_time
            && pickup.trim().is_empty()
        {
            bail!("pickup time cannot be blank -- enter a time or leave it unchanged");
        }
        Ok(())
    }

    /// Drops fields that would not change `current`.
    pub fn against(mut self, current: &OrderDetail) -> Self {
        if self.payment_method.as_deref() == Some(current.payment_method.as_str()) {
            self.payment_method = None;
        }
        if self.pickup_time.as_deref() == Some(current.pickup_time.as_str()) {
            self.pickup_time = None;
        }
        self
    }
}

/// Dashboard summary card from `GET /info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoCard {
    pub title: String,
    pub value: String,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Amount, DetailPatch, Order, OrderDetail, OrderStatus, RowStatus, StatusTone};
    use anyhow::Result;

    #[test]
    fn status_parse_round_trips_every_value() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn menu_lists_every_status_once() {
        let mut menu = OrderStatus::MENU.to_vec();
        menu.sort();
        let mut all = OrderStatus::ALL.to_vec();
        all.sort();
        assert_eq!(menu, all);
    }

    #[test]
    fn unknown_status_decodes_and_renders_as_unknown() -> Result<()> {
        let order: Order = serde_json::from_str(
            r#"{"id":"RSQ0001","buyer":"Aina","merchant":"Jaya Grocer","status":"lost","amount":12.5,"date":"2024-06-04 20:00"}"#,
        )?;
        assert_eq!(order.status, RowStatus::Unknown("lost".to_owned()));
        assert_eq!(order.status.label(), "Unknown");
        assert_eq!(order.status.tone(), StatusTone::Neutral);
        assert_eq!(order.amount.cents(), 1250);

        let encoded = serde_json::to_value(&order)?;
        assert_eq!(encoded["status"], "lost");
        Ok(())
    }

    #[test]
    fn status_tone_follows_badge_styles() {
        assert_eq!(OrderStatus::Preparing.tone(), StatusTone::Warning);
        assert_eq!(OrderStatus::WaitPickup.tone(), StatusTone::Info);
        assert_eq!(OrderStatus::Completed.tone(), StatusTone::Success);
        assert_eq!(OrderStatus::Refund.tone(), StatusTone::Neutral);
    }

    #[test]
    fn status_patch_serializes_lowercase_wire_value() -> Result<()> {
        let body = serde_json::to_string(&super::StatusPatch {
            status: OrderStatus::WaitPickup,
        })?;
        assert_eq!(body, r#"{"status":"waitpickup"}"#);
        Ok(())
    }

    #[test]
    fn negative_amount_is_rejected_at_decode_time() {
        let decoded = serde_json::from_str::<Amount>("-1.0");
        assert!(decoded.is_err());
    }

    #[test]
    fn amount_display_groups_thousands() -> Result<()> {
        assert_eq!(Amount::from_cents(0)?.display(), "RM0.00");
        assert_eq!(Amount::from_cents(1_250)?.display(), "RM12.50");
        assert_eq!(Amount::from_cents(123_456_789)?.display(), "RM1,234,567.89");
        Ok(())
    }

    #[test]
    fn detail_total_subtracts_voucher() -> Result<()> {
        let detail: OrderDetail = serde_json::from_str(
            r#"{"items":[{"name":"Bread","price":4.5,"expiry":"2 days","amount":2}],
                "payment_method":"Card","pickup_time":"20:00",
                "subtotal":9.0,"service_tax":0.54,"voucher_applied":0.9}"#,
        )?;
        assert_eq!(detail.total().cents(), 864);
        assert_eq!(detail.item_count(), 2);
        assert_eq!(detail.items[0].line_total().cents(), 900);
        Ok(())
    }

    #[test]
    fn item_count_holds_quantities_past_u32() -> Result<()> {
        let detail: OrderDetail = serde_json::from_str(
            r#"{"items":[{"name":"Rice","price":1,"expiry":"1 year","amount":4294967295},
                         {"name":"Salt","price":1,"expiry":"1 year","amount":4294967295}],
                "payment_method":"Card","pickup_time":"20:00",
                "subtotal":0,"service_tax":0,"voucher_applied":0}"#,
        )?;
        assert_eq!(detail.item_count(), 2 * u64::from(u32::MAX));
        Ok(())
    }

    #[test]
    fn detail_patch_skips_unset_fields_and_rejects_blank_values() -> Result<()> {
        let patch = DetailPatch {
            payment_method: Some("Cash".to_owned()),
            pickup_time: None,
        };
        assert_eq!(
            serde_json::to_string(&patch)?,
            r#"{"payment_method":"Cash"}"#
        );
        assert!(patch.validate().is_ok());

        let blank = DetailPatch {
            payment_method: None,
            pickup_time: Some("  ".to_owned()),
        };
        assert!(blank.validate().is_err());
        Ok(())
    }
}
