// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use orderdesk_app::{
    Amount, DetailPatch, InfoCard, LineItem, Order, OrderDetail, OrderId, OrderStatus,
    OrdersBackend, RowStatus, SyncOperation,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use time::OffsetDateTime;
use time::macros::{datetime, format_description};

pub const DEMO_ORDER_COUNT: usize = 57;
pub const DEMO_SEED: u64 = 60;

const FIRST_NAMES: [&str; 16] = [
    "Aina", "Hafiz", "Mei Ling", "Arjun", "Nurul", "Wei Jie", "Siti", "Kumar", "Farah", "Jun Hao",
    "Priya", "Amir", "Chloe", "Irfan", "Kavitha", "Daniel",
];
const LAST_NAMES: [&str; 14] = [
    "Rahman", "Tan", "Lim", "Abdullah", "Wong", "Subramaniam", "Ismail", "Lee", "Ong", "Yusof",
    "Raj", "Chong", "Hassan", "Ng",
];

const GROCERS: [&str; 6] = [
    "Jaya Grocer",
    "Village Grocer",
    "Mercato",
    "Lotus's",
    "AEON Big",
    "Cold Storage",
];
const LOCATIONS: [&str; 8] = [
    "Mid Valley Megamall",
    "Bangsar South",
    "Sunway Pyramid",
    "1 Utama",
    "Pavilion KL",
    "IOI City Mall",
    "The Gardens Mall",
    "Publika",
];

const STATUS_WEIGHTS: [OrderStatus; 12] = [
    OrderStatus::Completed,
    OrderStatus::Completed,
    OrderStatus::Completed,
    OrderStatus::Preparing,
    OrderStatus::Preparing,
    OrderStatus::WaitPickup,
    OrderStatus::WaitPickup,
    OrderStatus::Pending,
    OrderStatus::Pending,
    OrderStatus::Cancel,
    OrderStatus::Refund,
    OrderStatus::NoPickup,
];

const PRODUCTS: [(&str, i64); 12] = [
    ("Wholemeal Bread", 450),
    ("Fresh Milk 1L", 789),
    ("Kampung Eggs (10)", 1_190),
    ("Pandan Kaya", 620),
    ("Jasmine Rice 5kg", 2_899),
    ("Fuji Apples (4)", 1_250),
    ("Chicken Breast 500g", 1_480),
    ("Greek Yogurt", 960),
    ("Teh Tarik Sachets", 1_350),
    ("Sourdough Loaf", 1_600),
    ("Bananas (bunch)", 520),
    ("Cheddar Block", 2_150),
];
const EXPIRIES: [&str; 5] = ["1 day", "2 days", "3 days", "5 days", "1 week"];
const PAYMENT_METHODS: [&str; 5] = [
    "Card",
    "Cash",
    "Touch 'n Go eWallet",
    "GrabPay",
    "FPX Online Banking",
];

const SERVICE_TAX_PERCENT: i64 = 6;
const WINDOW_START: OffsetDateTime = datetime!(2024-05-01 08:00 UTC);
const WINDOW_SECONDS: i64 = 60 * 24 * 60 * 60;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as u64;
        min + (self.next_u64() % span) as i64
    }
}

/// Seeded generator of plausible grocery pickup orders.
#[derive(Debug, Clone)]
pub struct OrderFaker {
    rng: DeterministicRng,
}

impl OrderFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn order(&mut self, number: usize) -> Order {
        let buyer = format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES));
        let merchant = format!("{} {}", self.pick(&GROCERS), self.pick(&LOCATIONS));
        let status = STATUS_WEIGHTS[self.rng.int_n(STATUS_WEIGHTS.len())];
        let amount = Amount::from_cents(self.rng.int_range(500, 50_000)).unwrap_or_default();
        let offset = self.rng.int_range(0, WINDOW_SECONDS);
        Order {
            id: OrderId::new(format!("RSQ{number:04}")),
            buyer,
            merchant,
            status: RowStatus::Known(status),
            amount,
            date: order_date(WINDOW_START + time::Duration::seconds(offset)),
        }
    }

    /// Orders numbered from 1, in list order.
    pub fn orders(&mut self, count: usize) -> Vec<Order> {
        (1..=count).map(|number| self.order(number)).collect()
    }

    pub fn order_detail(&mut self, order: &Order) -> OrderDetail {
        let item_count = 1 + self.rng.int_n(4);
        let items: Vec<LineItem> = (0..item_count)
            .map(|_| {
                let (name, cents) = PRODUCTS[self.rng.int_n(PRODUCTS.len())];
                LineItem {
                    name: name.to_owned(),
                    price: Amount::from_cents(cents).unwrap_or_default(),
                    expiry: self.pick(&EXPIRIES).to_owned(),
                    amount: 1 + self.rng.int_n(3) as u32,
                }
            })
            .collect();

        let subtotal = items
            .iter()
            .fold(Amount::ZERO, |total, item| total.saturating_add(item.line_total()));
        let service_tax =
            Amount::from_cents(subtotal.cents() * SERVICE_TAX_PERCENT / 100).unwrap_or_default();
        let voucher_applied = if self.rng.int_n(3) == 0 {
            Amount::from_cents(subtotal.cents().min(500)).unwrap_or_default()
        } else {
            Amount::ZERO
        };

        OrderDetail {
            id: Some(order.id.clone()),
            items,
            payment_method: self.pick(&PAYMENT_METHODS).to_owned(),
            pickup_time: format!(
                "{:02}:{:02}",
                self.rng.int_range(9, 21),
                self.rng.int_range(0, 3) * 15
            ),
            subtotal,
            service_tax,
            voucher_applied,
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn fixture_orders(count: usize) -> Vec<Order> {
    OrderFaker::new(DEMO_SEED).orders(count)
}

/// Dashboard cards derived from the current orders.
pub fn summarize(orders: &[Order]) -> Vec<InfoCard> {
    let count = |wanted: &[OrderStatus]| {
        orders
            .iter()
            .filter(|order| order.status.known().is_some_and(|status| wanted.contains(&status)))
            .count()
    };
    let revenue = orders
        .iter()
        .filter(|order| order.status.known() == Some(OrderStatus::Completed))
        .fold(Amount::ZERO, |total, order| total.saturating_add(order.amount));

    vec![
        InfoCard {
            title: "Total revenue".to_owned(),
            value: revenue.display(),
            detail: format!("from {} completed orders", count(&[OrderStatus::Completed])),
        },
        InfoCard {
            title: "Orders".to_owned(),
            value: orders.len().to_string(),
            detail: format!(
                "{} pending, {} preparing",
                count(&[OrderStatus::Pending]),
                count(&[OrderStatus::Preparing])
            ),
        },
        InfoCard {
            title: "Awaiting pickup".to_owned(),
            value: count(&[OrderStatus::WaitPickup]).to_string(),
            detail: "ready at the counter".to_owned(),
        },
        InfoCard {
            title: "Lost orders".to_owned(),
            value: count(&[OrderStatus::Cancel, OrderStatus::Refund, OrderStatus::NoPickup])
                .to_string(),
            detail: "cancelled, refunded or not picked up".to_owned(),
        },
    ]
}

fn order_date(at: OffsetDateTime) -> String {
    at.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default()
}

#[derive(Debug, Default)]
struct MemoryState {
    orders: Vec<Order>,
    details: BTreeMap<OrderId, OrderDetail>,
    failing: BTreeSet<SyncOperation>,
    calls: Vec<String>,
}

/// In-process stand-in for the orders API. Each operation can be armed to
/// fail once with [`MemoryBackend::fail_next`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new(orders: Vec<Order>, details: BTreeMap<OrderId, OrderDetail>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                orders,
                details,
                ..MemoryState::default()
            }),
        }
    }

    /// `count` faked orders, each with a matching detail record.
    pub fn seeded(seed: u64, count: usize) -> Self {
        let mut faker = OrderFaker::new(seed);
        let orders = faker.orders(count);
        let details = orders
            .iter()
            .map(|order| (order.id.clone(), faker.order_detail(order)))
            .collect();
        Self::new(orders, details)
    }

    pub fn demo() -> Self {
        Self::seeded(DEMO_SEED, DEMO_ORDER_COUNT)
    }

    pub fn fail_next(&self, operation: SyncOperation) -> Result<()> {
        self.lock()?.failing.insert(operation);
        Ok(())
    }

    pub fn orders(&self) -> Result<Vec<Order>> {
        Ok(self.lock()?.orders.clone())
    }

    /// Every call made so far, as `"<operation>"` or `"<operation> <id>"`.
    pub fn calls(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.calls.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory backend lock poisoned"))
    }

    fn enter(
        &self,
        operation: SyncOperation,
        id: Option<&OrderId>,
    ) -> Result<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock()?;
        state.calls.push(match id {
            Some(id) => format!("{operation} {id}"),
            None => operation.to_string(),
        });
        if state.failing.remove(&operation) {
            bail!("server error (500): injected failure");
        }
        Ok(state)
    }
}

fn not_found(id: &OrderId) -> anyhow::Error {
    anyhow!("server error (404): order {id} not found")
}

impl OrdersBackend for MemoryBackend {
    fn list_orders(&self) -> Result<Vec<Order>> {
        let state = self.enter(SyncOperation::ListOrders, None)?;
        Ok(state.orders.clone())
    }

    fn order_detail(&self, id: &OrderId) -> Result<OrderDetail> {
        let state = self.enter(SyncOperation::FetchDetail, Some(id))?;
        state.details.get(id).cloned().ok_or_else(|| not_found(id))
    }

    fn patch_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        let mut state = self.enter(SyncOperation::PatchStatus, Some(id))?;
        let order = state
            .orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or_else(|| not_found(id))?;
        order.status = RowStatus::Known(status);
        Ok(order.clone())
    }

    fn patch_order_detail(&self, id: &OrderId, patch: &DetailPatch) -> Result<OrderDetail> {
        let mut state = self.enter(SyncOperation::PatchDetail, Some(id))?;
        patch.validate()?;
        let detail = state.details.get_mut(id).ok_or_else(|| not_found(id))?;
        if let Some(method) = &patch.payment_method {
            detail.payment_method = method.clone();
        }
        if let Some(pickup) = &patch.pickup_time {
            detail.pickup_time = pickup.clone();
        }
        Ok(detail.clone())
    }

    fn delete_order(&self, id: &OrderId) -> Result<()> {
        let mut state = self.enter(SyncOperation::DeleteOrder, Some(id))?;
        let before = state.orders.len();
        state.orders.retain(|order| &order.id != id);
        if state.orders.len() == before {
            return Err(not_found(id));
        }
        state.details.remove(id);
        Ok(())
    }

    fn dashboard_info(&self) -> Result<Vec<InfoCard>> {
        let state = self.enter(SyncOperation::LoadInfo, None)?;
        Ok(summarize(&state.orders))
    }
}
