//! Dashboard data: market rates and sales/commission tables.

pub mod api;
pub mod models;
pub mod queries;
pub mod refresh;
pub mod selectors;

pub use api::{DashboardApi, DashboardResource};
pub use models::{
    CommissionPatch, CommissionStatus, ConsumerPriceIndex, DateRange, DateRangeError, ExchangeRate,
    Institution, InterestRate, ProductManagement, SalesFigures, SalesFiguresPatch, SalesPerson,
    YearMonth,
};
pub use queries::{DASHBOARD_QUERIES, DashboardData, DashboardQueries};
pub use refresh::RefreshCoordinator;
