// ============================================================================
// Order Book Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

use super::{Order, Side, Trade};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Snapshot Types
// ============================================================================

/// One price level of a book snapshot.
///
/// `cumulative_qty` is the running total of resting quantity from the best
/// price down to this level, ready for rendering a depth curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepthLevel {
    pub price: Decimal,
    pub quantity: u64,
    pub cumulative_qty: u64,
}

/// Immutable view of the book: depth per side plus the full per-order
/// listing, both in priority order (best price first, FIFO within a level).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookSnapshot {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
    pub bid_orders: Vec<Order>,
    pub ask_orders: Vec<Order>,
}

impl BookSnapshot {
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|level| level.price)
    }

    /// Current spread (best ask minus best bid).
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }
}

// ============================================================================
// Book Internals
// ============================================================================

/// Book state guarded by the exclusive lock.
///
/// Both sides are keyed by price; bids are traversed descending and asks
/// ascending, so the first key in traversal order is the best price. Each
/// level holds a FIFO queue: insertion order is submission order, and an
/// order never changes position until it is fully filled or expired.
struct BookInner {
    bids: BTreeMap<Decimal, VecDeque<Order>>,
    asks: BTreeMap<Decimal, VecDeque<Order>>,
    trades: Vec<Trade>,
    next_trade_id: u64,
}

/// Find the first compatible (same routing triple) bid/ask pair in the two
/// top-of-book queues, scanning each queue front to back.
fn find_compatible_pair(bids: &VecDeque<Order>, asks: &VecDeque<Order>) -> Option<(usize, usize)> {
    for (bid_idx, bid) in bids.iter().enumerate() {
        for (ask_idx, ask) in asks.iter().enumerate() {
            if bid.routing() == ask.routing() {
                return Some((bid_idx, ask_idx));
            }
        }
    }
    None
}

/// Drop fully executed orders, then drop emptied price levels.
fn cleanup_side(side: &mut BTreeMap<Decimal, VecDeque<Order>>) {
    for queue in side.values_mut() {
        queue.retain(|order| order.remaining_qty > 0);
    }
    side.retain(|_, queue| !queue.is_empty());
}

/// Move every order matching `expired` out of `side` into `removed`,
/// preserving the queue order of survivors.
fn drain_expired(
    side: &mut BTreeMap<Decimal, VecDeque<Order>>,
    removed: &mut Vec<Order>,
    expired: impl Fn(&Order) -> bool,
) {
    for queue in side.values_mut() {
        let mut kept = VecDeque::with_capacity(queue.len());
        for order in queue.drain(..) {
            if expired(&order) {
                removed.push(order);
            } else {
                kept.push_back(order);
            }
        }
        *queue = kept;
    }
    side.retain(|_, queue| !queue.is_empty());
}

impl BookInner {
    fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            trades: Vec::new(),
            next_trade_id: 1,
        }
    }

    fn insert(&mut self, order: Order) {
        let side = match order.side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        side.entry(order.price).or_default().push_back(order);
    }

    /// One matching sweep. Returns the trades produced by this call, in
    /// production order; each is also appended to the trade log.
    fn sweep(&mut self) -> Vec<Trade> {
        let mut produced = Vec::new();

        loop {
            let Some(best_bid) = self.bids.keys().next_back().copied() else {
                break;
            };
            let Some(best_ask) = self.asks.keys().next().copied() else {
                break;
            };
            // Book is not crossed
            if best_bid < best_ask {
                break;
            }

            let pair = find_compatible_pair(&self.bids[&best_bid], &self.asks[&best_ask]);
            let Some((bid_idx, ask_idx)) = pair else {
                // No compatible pair at the top of book ends the sweep;
                // queues are never reordered to force one.
                break;
            };

            if let (Some(bid_queue), Some(ask_queue)) =
                (self.bids.get_mut(&best_bid), self.asks.get_mut(&best_ask))
            {
                let now = Utc::now();
                let bid = &bid_queue[bid_idx];
                let trade_qty = bid.remaining_qty.min(ask_queue[ask_idx].remaining_qty);

                // Resting-ask price wins on a cross
                let trade = Trade {
                    trade_id: self.next_trade_id,
                    buy_order_id: bid.order_id,
                    sell_order_id: ask_queue[ask_idx].order_id,
                    market_code: bid.market_code.clone(),
                    currency: bid.currency.clone(),
                    price: ask_queue[ask_idx].price,
                    quantity: trade_qty,
                    timestamp: now,
                };
                self.next_trade_id += 1;

                bid_queue[bid_idx].remaining_qty -= trade_qty;
                ask_queue[ask_idx].remaining_qty -= trade_qty;

                self.trades.push(trade.clone());
                produced.push(trade);
            }

            // One trade per compatible-pair selection, then cleanup, then
            // restart; a partially filled order keeps its queue position.
            cleanup_side(&mut self.bids);
            cleanup_side(&mut self.asks);
        }

        produced
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// Per-venue book of resting orders on two priced sides.
///
/// All mutation happens under one exclusive lock: an insert, a matching
/// sweep, or an expiry sweep each hold it for their full duration, so a
/// produced trade is observable only after both orders' remaining
/// quantities have been updated and the trade appended to the log.
pub struct OrderBook {
    inner: Mutex<BookInner>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BookInner::new()),
        }
    }

    /// Place a validated order at the tail of its side's queue for
    /// `order.price`. No matching occurs here.
    pub fn insert(&self, order: Order) {
        self.inner.lock().insert(order);
    }

    /// Run a matching sweep; return the trades it produced.
    pub fn match_orders(&self) -> Vec<Trade> {
        self.inner.lock().sweep()
    }

    /// Insert an order and immediately sweep, under a single lock
    /// acquisition. An order that crosses the book is matched before this
    /// returns.
    pub fn insert_and_match(&self, order: Order) -> Vec<Trade> {
        let mut inner = self.inner.lock();
        inner.insert(order);
        inner.sweep()
    }

    /// The most recent trade, if any.
    pub fn last_trade(&self) -> Option<Trade> {
        self.inner.lock().trades.last().cloned()
    }

    /// Full copy of the trade log, in execution order.
    pub fn trades(&self) -> Vec<Trade> {
        self.inner.lock().trades.clone()
    }

    pub fn trade_count(&self) -> usize {
        self.inner.lock().trades.len()
    }

    /// Remove GTD orders whose expiration has passed, from both sides.
    /// Returns the removed orders. DAY orders are untouched.
    pub fn expire_gtd(&self, now: DateTime<Utc>) -> Vec<Order> {
        let mut inner = self.inner.lock();
        let mut removed = Vec::new();
        drain_expired(&mut inner.bids, &mut removed, |order| order.is_expired(now));
        drain_expired(&mut inner.asks, &mut removed, |order| order.is_expired(now));
        removed
    }

    /// Remove all DAY orders from both sides, returning them. Called at the
    /// daily reset: a DAY order's lifetime is the trading day.
    pub fn expire_day(&self) -> Vec<Order> {
        let mut inner = self.inner.lock();
        let mut removed = Vec::new();
        drain_expired(&mut inner.bids, &mut removed, |order| !order.is_gtd());
        drain_expired(&mut inner.asks, &mut removed, |order| !order.is_gtd());
        removed
    }

    /// All resting GTD orders, bids first, in book traversal order.
    pub fn gtd_orders(&self) -> Vec<Order> {
        let inner = self.inner.lock();
        inner
            .bids
            .iter()
            .rev()
            .chain(inner.asks.iter())
            .flat_map(|(_, queue)| queue.iter())
            .filter(|order| order.is_gtd())
            .cloned()
            .collect()
    }

    pub fn bid_level_count(&self) -> usize {
        self.inner.lock().bids.len()
    }

    pub fn ask_level_count(&self) -> usize {
        self.inner.lock().asks.len()
    }

    /// Read-only view of both sides for display and depth-chart
    /// construction.
    pub fn snapshot(&self) -> BookSnapshot {
        let inner = self.inner.lock();

        let mut snapshot = BookSnapshot::default();
        let mut cumulative = 0u64;
        for (price, queue) in inner.bids.iter().rev() {
            let quantity: u64 = queue.iter().map(|order| order.remaining_qty).sum();
            cumulative += quantity;
            snapshot.bids.push(DepthLevel {
                price: *price,
                quantity,
                cumulative_qty: cumulative,
            });
            snapshot.bid_orders.extend(queue.iter().cloned());
        }

        cumulative = 0;
        for (price, queue) in inner.asks.iter() {
            let quantity: u64 = queue.iter().map(|order| order.remaining_qty).sum();
            cumulative += quantity;
            snapshot.asks.push(DepthLevel {
                price: *price,
                quantity,
                cumulative_qty: cumulative,
            });
            snapshot.ask_orders.extend(queue.iter().cloned());
        }

        snapshot
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
