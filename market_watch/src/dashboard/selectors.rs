//! Pure derived views over dashboard data.

use super::models::{
    CommissionStatus, ConsumerPriceIndex, ExchangeRate, Institution, InterestRate,
    ProductManagement, SalesFigures, SalesPerson,
};
use std::collections::BTreeMap;

/// Records carrying [`SalesFigures`]
pub trait HasSalesFigures {
    fn label(&self) -> &str;
    fn figures(&self) -> &SalesFigures;
}

impl HasSalesFigures for ProductManagement {
    fn label(&self) -> &str {
        &self.product_name
    }

    fn figures(&self) -> &SalesFigures {
        &self.figures
    }
}

impl HasSalesFigures for SalesPerson {
    fn label(&self) -> &str {
        &self.sales_person_name
    }

    fn figures(&self) -> &SalesFigures {
        &self.figures
    }
}

impl HasSalesFigures for Institution {
    fn label(&self) -> &str {
        &self.institution_name
    }

    fn figures(&self) -> &SalesFigures {
        &self.figures
    }
}

/// Most recent rate per currency pair
pub fn latest_rates(rates: &[ExchangeRate]) -> BTreeMap<String, ExchangeRate> {
    let mut latest: BTreeMap<String, ExchangeRate> = BTreeMap::new();
    for rate in rates {
        match latest.get(&rate.currency_pair) {
            Some(current) if current.date >= rate.date => {}
            _ => {
                latest.insert(rate.currency_pair.clone(), rate.clone());
            }
        }
    }
    latest
}

/// Sum of every record's figures
pub fn sales_totals<R: HasSalesFigures>(records: &[R]) -> SalesFigures {
    records
        .iter()
        .fold(SalesFigures::default(), |mut total, record| {
            total += *record.figures();
            total
        })
}

/// Record with the highest year-to-date commission
pub fn top_by_ytd_commission<R: HasSalesFigures>(records: &[R]) -> Option<&R> {
    records
        .iter()
        .max_by_key(|record| record.figures().ytd_commission)
}

/// Commission totals across product types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommissionTotals {
    pub commission: i64,
    pub mtd_commission: i64,
    pub ytd_commission: i64,
}

pub fn commission_totals(rows: &[CommissionStatus]) -> CommissionTotals {
    rows.iter()
        .fold(CommissionTotals::default(), |total, row| CommissionTotals {
            commission: total.commission + row.commission,
            mtd_commission: total.mtd_commission + row.mtd_commission,
            ytd_commission: total.ytd_commission + row.ytd_commission,
        })
}

/// First/last/min/max of a monthly series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub first_period: String,
    pub last_period: String,
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesSummary {
    /// Change from first to last observation
    pub fn change(&self) -> f64 {
        self.last - self.first
    }
}

fn summarize<'a>(points: impl Iterator<Item = (&'a str, f64)>) -> Option<SeriesSummary> {
    let mut points: Vec<(&str, f64)> = points.collect();
    points.sort_by(|a, b| a.0.cmp(b.0));
    let (first_period, first) = *points.first()?;
    let (last_period, last) = *points.last()?;

    Some(SeriesSummary {
        first_period: first_period.to_string(),
        last_period: last_period.to_string(),
        first,
        last,
        min: points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min),
        max: points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max),
    })
}

pub fn interest_rate_summary(rates: &[InterestRate]) -> Option<SeriesSummary> {
    summarize(rates.iter().map(|r| (r.date.as_str(), r.rate)))
}

pub fn cpi_summary(rows: &[ConsumerPriceIndex]) -> Option<SeriesSummary> {
    summarize(rows.iter().map(|r| (r.date.as_str(), r.cpi)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rate(pair: &str, day: u32, value: f64) -> ExchangeRate {
        ExchangeRate {
            id: None,
            currency_pair: pair.to_string(),
            rate: value,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            unit: "KRW".to_string(),
            created_at: None,
        }
    }

    fn person(name: &str, ytd_commission: i64) -> SalesPerson {
        SalesPerson {
            id: 1,
            sales_person_name: name.to_string(),
            figures: SalesFigures {
                sales_count: 2,
                ytd_commission,
                ..SalesFigures::default()
            },
        }
    }

    #[test]
    fn test_latest_rate_per_pair() {
        let rates = vec![
            rate("USD/KRW", 1, 1350.0),
            rate("USD/KRW", 3, 1362.5),
            rate("JPY/KRW", 2, 8.9),
            rate("USD/KRW", 2, 1355.0),
        ];
        let latest = latest_rates(&rates);

        assert_eq!(latest.len(), 2);
        assert_eq!(latest["USD/KRW"].rate, 1362.5);
        assert_eq!(latest["JPY/KRW"].rate, 8.9);
    }

    #[test]
    fn test_sales_totals_and_top() {
        let people = vec![person("Kim", 100), person("Lee", 300), person("Park", 200)];

        let totals = sales_totals(&people);
        assert_eq!(totals.sales_count, 6);
        assert_eq!(totals.ytd_commission, 600);
        assert_eq!(top_by_ytd_commission(&people).unwrap().label(), "Lee");
        assert!(top_by_ytd_commission::<SalesPerson>(&[]).is_none());
    }

    #[test]
    fn test_commission_totals() {
        let rows = vec![
            CommissionStatus {
                id: 1,
                product_type: "Fund".to_string(),
                commission: 10,
                mtd_commission: 100,
                ytd_commission: 1000,
            },
            CommissionStatus {
                id: 2,
                product_type: "Bond".to_string(),
                commission: 5,
                mtd_commission: 50,
                ytd_commission: 500,
            },
        ];

        assert_eq!(
            commission_totals(&rows),
            CommissionTotals {
                commission: 15,
                mtd_commission: 150,
                ytd_commission: 1500
            }
        );
    }

    #[test]
    fn test_series_summary_orders_by_period() {
        let rows = vec![
            InterestRate {
                date: "202403".to_string(),
                rate: 3.5,
                unit: "%".to_string(),
                rate_type: String::new(),
                description: String::new(),
            },
            InterestRate {
                date: "202401".to_string(),
                rate: 3.25,
                unit: "%".to_string(),
                rate_type: String::new(),
                description: String::new(),
            },
        ];
        let summary = interest_rate_summary(&rows).unwrap();

        assert_eq!(summary.first_period, "202401");
        assert_eq!(summary.last_period, "202403");
        assert_eq!(summary.change(), 0.25);
        assert_eq!(summary.min, 3.25);
        assert_eq!(summary.max, 3.5);
        assert!(cpi_summary(&[]).is_none());
    }
}
