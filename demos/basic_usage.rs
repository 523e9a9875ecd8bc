// ============================================================================
// Basic Usage Example
// ============================================================================

use chrono::Utc;
use exchange_core::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Matching Engine Example ===\n");

    // Venue reference data: one Paris-listed instrument, lot 100, tick 0.01
    let registry = Arc::new(InstrumentRegistry::new());
    registry.register(Instrument::new(
        1,
        "XPAR",
        "EUR",
        "ACME SA",
        2024,
        InstrumentState::Active,
        Decimal::new(15000, 2),
        5,
        100,
        2,
        0,
    ));

    let book = Arc::new(OrderBook::new());
    let engine = MatchingEngine::new(
        EngineConfig::default(),
        Arc::clone(&registry),
        Arc::clone(&book),
        Arc::new(LineSink::new(std::io::stdout())),
    );

    engine.start();
    println!("Created engine for instrument 1 on XPAR/EUR\n");

    // Resting asks at rising prices
    println!("Adding ask orders...");
    for i in 0..5i64 {
        engine.submit(Order::new_day(
            2000 + i as u64,
            "XPAR",
            "EUR",
            Utc::now(),
            Decimal::new(15100 + i * 10, 2),
            100,
            Side::Ask,
            LimitType::Limit,
            1,
            7,
        ));
    }

    // Resting bids below the spread
    println!("Adding bid orders...");
    for i in 0..5i64 {
        engine.submit(Order::new_day(
            1000 + i as u64,
            "XPAR",
            "EUR",
            Utc::now(),
            Decimal::new(14990 - i * 10, 2),
            100,
            Side::Bid,
            LimitType::Limit,
            1,
            7,
        ));
    }

    println!("\n=== Order Book Snapshot ===");
    let snapshot = book.snapshot();
    println!("\nBids:");
    for level in &snapshot.bids {
        println!(
            "  {} @ {} (cumulative {})",
            level.quantity, level.price, level.cumulative_qty
        );
    }
    println!("\nAsks:");
    for level in &snapshot.asks {
        println!(
            "  {} @ {} (cumulative {})",
            level.quantity, level.price, level.cumulative_qty
        );
    }
    println!("\nSpread: {:?}", snapshot.spread());

    // A bid that crosses the first three ask levels
    println!("\n=== Submitting Crossing Bid ===");
    engine.submit(Order::new_day(
        1100,
        "XPAR",
        "EUR",
        Utc::now(),
        Decimal::new(15120, 2),
        300,
        Side::Bid,
        LimitType::Limit,
        1,
        7,
    ));

    println!("\nTrades:");
    for trade in book.trades() {
        println!(
            "  #{} buy {} / sell {}: {} @ {}",
            trade.trade_id, trade.buy_order_id, trade.sell_order_id, trade.quantity, trade.price
        );
    }

    // Let the worker run a few ticks before shutting down
    std::thread::sleep(Duration::from_secs(2));

    let report = engine.detailed_stats();
    println!("\n=== Statistics ===");
    println!("Daily trades:       {}", report.daily_trade_count);
    println!("Daily notional:     {:.2}", report.daily_notional);
    println!("Total trades:       {}", report.total_trade_count);
    println!("Matching attempts:  {}", report.matching_attempts);
    println!("Successful matches: {}", report.successful_matches);
    println!("Success rate:       {:.1}%", report.success_rate());

    engine.stop();
}
