//! Dashboard records and the month range used by the rate panels.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Exchange rate of one currency pair on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    #[serde(default)]
    pub id: Option<i64>,
    /// e.g. `USD/KRW`
    pub currency_pair: String,
    pub rate: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
}

/// Monthly policy rate observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRate {
    /// `YYYYMM`
    pub date: String,
    pub rate: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub rate_type: String,
    #[serde(default)]
    pub description: String,
}

/// Monthly consumer price index observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerPriceIndex {
    /// `YYYYMM`
    pub date: String,
    pub cpi: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub cpi_type: String,
    #[serde(default)]
    pub description: String,
}

/// Sales counters shared by the product, sales-person and institution panels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesFigures {
    pub consultation_count: i64,
    pub sales_count: i64,
    pub commission: i64,
    pub mtd_consultation_count: i64,
    pub mtd_sales_count: i64,
    pub mtd_commission: i64,
    pub ytd_consultation_count: i64,
    pub ytd_sales_count: i64,
    pub ytd_commission: i64,
}

impl std::ops::AddAssign for SalesFigures {
    fn add_assign(&mut self, rhs: Self) {
        self.consultation_count += rhs.consultation_count;
        self.sales_count += rhs.sales_count;
        self.commission += rhs.commission;
        self.mtd_consultation_count += rhs.mtd_consultation_count;
        self.mtd_sales_count += rhs.mtd_sales_count;
        self.mtd_commission += rhs.mtd_commission;
        self.ytd_consultation_count += rhs.ytd_consultation_count;
        self.ytd_sales_count += rhs.ytd_sales_count;
        self.ytd_commission += rhs.ytd_commission;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductManagement {
    pub id: i64,
    pub product_name: String,
    #[serde(flatten)]
    pub figures: SalesFigures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPerson {
    pub id: i64,
    pub sales_person_name: String,
    #[serde(flatten)]
    pub figures: SalesFigures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: i64,
    pub institution_name: String,
    #[serde(flatten)]
    pub figures: SalesFigures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionStatus {
    pub id: i64,
    pub product_type: String,
    pub commission: i64,
    pub mtd_commission: i64,
    pub ytd_commission: i64,
}

/// Partial update of a sales record; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesFiguresPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtd_consultation_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtd_sales_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtd_commission: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ytd_consultation_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ytd_sales_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ytd_commission: Option<i64>,
}

/// Partial update of a commission record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtd_commission: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ytd_commission: Option<i64>,
}

/// Date range errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    /// Not a `YYYYMM` (or `YYYY-MM`) month
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// Start month after end month
    #[error("Start month {start} is after end month {end}")]
    Reversed { start: YearMonth, end: YearMonth },
}

/// Calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// # Errors
    ///
    /// Returns error if `month` is not in `1..=12` or `year` has more than four digits
    pub fn new(year: i32, month: u32) -> Result<Self, DateRangeError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(DateRangeError::InvalidMonth(format!("{year:04}{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Current month in local time
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift back by `months`, saturating at year 0
    pub fn minus_months(self, months: u32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 - i64::from(months);
        let index = index.max(0);
        Self {
            year: (index / 12) as i32,
            month: (index % 12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = DateRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().filter(|c| *c != '-').collect();
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DateRangeError::InvalidMonth(s.to_string()));
        }
        let year = digits[..4]
            .parse()
            .map_err(|_| DateRangeError::InvalidMonth(s.to_string()))?;
        let month = digits[4..]
            .parse()
            .map_err(|_| DateRangeError::InvalidMonth(s.to_string()))?;
        Self::new(year, month)
    }
}

/// Inclusive month range, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: YearMonth,
    end: YearMonth,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns error if `start` is after `end`
    pub fn new(start: YearMonth, end: YearMonth) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// From `months` before `end` through `end`
    pub fn ending(end: YearMonth, months: u32) -> Self {
        Self {
            start: end.minus_months(months),
            end,
        }
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    pub fn end(&self) -> YearMonth {
        self.end
    }

    /// Query-string pairs sent to the rate endpoints
    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start.to_string()),
            ("endDate", self.end.to_string()),
        ]
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::ending(YearMonth::current(), 12)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
