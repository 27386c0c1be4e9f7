//! Plain-text rendering of dashboard panels and the session countdown.

use market_watch::{
    ApiError, ExpiryInfo, QueryState,
    dashboard::{
        DashboardData,
        selectors::{
            HasSalesFigures, SeriesSummary, commission_totals, cpi_summary, interest_rate_summary,
            latest_rates, sales_totals, top_by_ytd_commission,
        },
    },
};
use std::fmt::Write;

/// Width of the countdown bar in characters
const BAR_WIDTH: usize = 20;

/// Countdown line, e.g. `Session [##########----------] 15m 0s`
pub fn session_line(info: &ExpiryInfo) -> String {
    if info.is_expired {
        return "Session expired".to_string();
    }
    let filled = ((info.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "Session [{}{}] {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        info.time_display
    )
}

/// One panel heading followed by its body, or the panel's error
fn panel<T>(
    out: &mut String,
    title: &str,
    state: &QueryState<T>,
    body: impl FnOnce(&mut String, &T),
) {
    let _ = writeln!(out, "== {title} ==");
    match (state.data(), &state.error) {
        (_, Some(err)) => error_lines(out, err),
        (Some(data), None) => body(out, data),
        (None, None) => {
            let _ = writeln!(out, "  (no data)");
        }
    }
}

fn error_lines(out: &mut String, err: &ApiError) {
    let _ = writeln!(out, "  ! {} [{}]", err.user_message(), err.code);
    for line in err.detail_lines() {
        let _ = writeln!(out, "    {line}");
    }
}

fn summary_line(out: &mut String, unit: &str, summary: Option<SeriesSummary>) {
    match summary {
        Some(s) => {
            let _ = writeln!(
                out,
                "  {} {:.2}{unit} -> {} {:.2}{unit} ({:+.2}), range {:.2}..{:.2}",
                s.first_period,
                s.first,
                s.last_period,
                s.last,
                s.change(),
                s.min,
                s.max
            );
        }
        None => {
            let _ = writeln!(out, "  (no observations)");
        }
    }
}

fn sales_panel<R: HasSalesFigures>(out: &mut String, records: &[R]) {
    let totals = sales_totals(records);
    let _ = writeln!(
        out,
        "  {} rows, {} sales, commission {} (MTD {}, YTD {})",
        records.len(),
        totals.sales_count,
        totals.commission,
        totals.mtd_commission,
        totals.ytd_commission
    );
    if let Some(top) = top_by_ytd_commission(records) {
        let _ = writeln!(
            out,
            "  top YTD: {} ({})",
            top.label(),
            top.figures().ytd_commission
        );
    }
}

/// Every panel of a composite dashboard read
pub fn dashboard(data: &DashboardData) -> String {
    let mut out = String::new();

    panel(&mut out, "Exchange rates", &data.exchange_rates, |out, rates| {
        for (pair, rate) in latest_rates(rates) {
            let _ = writeln!(out, "  {pair:<10} {:>12.2} {} ({})", rate.rate, rate.unit, rate.date);
        }
    });
    panel(&mut out, "Interest rates", &data.interest_rates, |out, rates| {
        summary_line(out, "%", interest_rate_summary(rates));
    });
    panel(
        &mut out,
        "Consumer price index",
        &data.consumer_price_index,
        |out, rows| summary_line(out, "", cpi_summary(rows)),
    );
    panel(&mut out, "Products", &data.product_management, |out, rows| {
        sales_panel(out, rows);
    });
    panel(&mut out, "Sales persons", &data.sales_persons, |out, rows| {
        sales_panel(out, rows);
    });
    panel(&mut out, "Institutions", &data.institutions, |out, rows| {
        sales_panel(out, rows);
    });
    panel(&mut out, "Commission status", &data.commission_status, |out, rows| {
        let totals = commission_totals(rows);
        let _ = writeln!(
            out,
            "  {} product types, commission {} (MTD {}, YTD {})",
            rows.len(),
            totals.commission,
            totals.mtd_commission,
            totals.ytd_commission
        );
    });

    out
}
