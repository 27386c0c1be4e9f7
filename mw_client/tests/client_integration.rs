//! Integration tests for mw_client rendering.
//!
//! Renders complete dashboards built from fixed data, with and without
//! failing panels.

use market_watch::{
    ApiError, ErrorCode, QueryState,
    dashboard::{
        CommissionStatus, DashboardData, ExchangeRate, InterestRate, SalesFigures, SalesPerson,
    },
};
use mw_client::render;
use std::sync::Arc;
use tokio::time::Instant;

fn ok<T>(value: T) -> QueryState<T> {
    QueryState::success(Arc::new(value), Instant::now())
}

fn person(id: i64, name: &str, ytd_commission: i64) -> SalesPerson {
    SalesPerson {
        id,
        sales_person_name: name.to_string(),
        figures: SalesFigures {
            sales_count: 3,
            commission: 10,
            ytd_commission,
            ..SalesFigures::default()
        },
    }
}

fn dashboard() -> DashboardData {
    DashboardData {
        product_management: ok(Vec::new()),
        sales_persons: ok(vec![person(1, "Kim", 500), person(2, "Lee", 900)]),
        institutions: ok(Vec::new()),
        commission_status: ok(vec![CommissionStatus {
            id: 1,
            product_type: "Fund".to_string(),
            commission: 100,
            mtd_commission: 300,
            ytd_commission: 3000,
        }]),
        exchange_rates: ok(vec![ExchangeRate {
            id: Some(1),
            currency_pair: "USD/KRW".to_string(),
            rate: 1362.0,
            date: chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            unit: "KRW".to_string(),
            created_at: None,
        }]),
        interest_rates: ok(vec![
            InterestRate {
                date: "202401".to_string(),
                rate: 3.5,
                unit: "%".to_string(),
                rate_type: "BASE".to_string(),
                description: String::new(),
            },
            InterestRate {
                date: "202406".to_string(),
                rate: 3.25,
                unit: "%".to_string(),
                rate_type: "BASE".to_string(),
                description: String::new(),
            },
        ]),
        consumer_price_index: ok(Vec::new()),
    }
}

#[test]
fn test_full_dashboard_renders_every_panel() {
    let text = render::dashboard(&dashboard());

    for heading in [
        "== Exchange rates ==",
        "== Interest rates ==",
        "== Consumer price index ==",
        "== Products ==",
        "== Sales persons ==",
        "== Institutions ==",
        "== Commission status ==",
    ] {
        assert!(text.contains(heading), "missing {heading}");
    }
    assert!(text.contains("USD/KRW"));
    assert!(text.contains("1362.00"));
    assert!(text.contains("202401 3.50% -> 202406 3.25% (-0.25)"));
    assert!(text.contains("top YTD: Lee (900)"));
    assert!(text.contains("1 product types, commission 100 (MTD 300, YTD 3000)"));
    assert!(text.contains("(no observations)"));
}

#[test]
fn test_failed_panel_shows_friendly_message() {
    let mut data = dashboard();
    data.exchange_rates = QueryState::failure(ApiError::new(ErrorCode::TimeoutError, "timeout"));

    let text = render::dashboard(&data);

    assert!(text.contains("The request timed out. Please try again. [TIMEOUT_ERROR]"));
    // Other panels still render.
    assert!(text.contains("top YTD: Lee (900)"));
    assert!(data.status().is_error);
}
