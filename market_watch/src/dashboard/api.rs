//! Typed calls for the market-data and sales endpoints.

use super::models::{
    CommissionPatch, CommissionStatus, ConsumerPriceIndex, DateRange, ExchangeRate, Institution,
    InterestRate, ProductManagement, SalesFiguresPatch, SalesPerson,
};
use crate::net::{errors::ApiError, gateway::HttpGateway};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

/// A record type served under `PATH`, listable, fetchable and updatable by id.
pub trait DashboardResource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Endpoint path, e.g. `/product-management`
    const PATH: &'static str;
    /// Query name of the list
    const LIST_QUERY: &'static str;
    /// Query name of a single record
    const ITEM_QUERY: &'static str;
    /// Partial update body
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> i64;
}

impl DashboardResource for ProductManagement {
    const PATH: &'static str = "/product-management";
    const LIST_QUERY: &'static str = "productManagement";
    const ITEM_QUERY: &'static str = "productManagement";
    type Patch = SalesFiguresPatch;

    fn id(&self) -> i64 {
        self.id
    }
}

impl DashboardResource for SalesPerson {
    const PATH: &'static str = "/sales-persons";
    const LIST_QUERY: &'static str = "salesPersons";
    const ITEM_QUERY: &'static str = "salesPerson";
    type Patch = SalesFiguresPatch;

    fn id(&self) -> i64 {
        self.id
    }
}

impl DashboardResource for Institution {
    const PATH: &'static str = "/institutions";
    const LIST_QUERY: &'static str = "institutions";
    const ITEM_QUERY: &'static str = "institution";
    type Patch = SalesFiguresPatch;

    fn id(&self) -> i64 {
        self.id
    }
}

impl DashboardResource for CommissionStatus {
    const PATH: &'static str = "/commission-status";
    const LIST_QUERY: &'static str = "commissionStatus";
    const ITEM_QUERY: &'static str = "commissionStatus";
    type Patch = CommissionPatch;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Market-data and sales endpoints
#[derive(Debug, Clone)]
pub struct DashboardApi {
    gateway: Arc<HttpGateway>,
}

impl DashboardApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    pub async fn exchange_rates(&self) -> Result<Vec<ExchangeRate>, ApiError> {
        self.gateway.get("/exchange-rates").await
    }

    pub async fn interest_rates(&self, range: &DateRange) -> Result<Vec<InterestRate>, ApiError> {
        self.gateway
            .get_with_query("/exchange-rates/interest-rates", &range.query_params())
            .await
    }

    pub async fn consumer_price_index(
        &self,
        range: &DateRange,
    ) -> Result<Vec<ConsumerPriceIndex>, ApiError> {
        self.gateway
            .get_with_query("/exchange-rates/cpi", &range.query_params())
            .await
    }

    pub async fn list<R: DashboardResource>(&self) -> Result<Vec<R>, ApiError> {
        self.gateway.get(R::PATH).await
    }

    pub async fn get<R: DashboardResource>(&self, id: i64) -> Result<R, ApiError> {
        self.gateway.get(&format!("{}/{id}", R::PATH)).await
    }

    pub async fn update<R: DashboardResource>(
        &self,
        id: i64,
        patch: &R::Patch,
    ) -> Result<R, ApiError> {
        self.gateway.put(&format!("{}/{id}", R::PATH), patch).await
    }
}
