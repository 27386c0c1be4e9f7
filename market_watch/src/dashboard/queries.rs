//! Cached reads and writes of dashboard data.
//!
//! Every read goes through the shared [`QueryClient`] under a stable key so
//! concurrent views of the same data share one request.

use super::{
    api::{DashboardApi, DashboardResource},
    models::{
        CommissionStatus, ConsumerPriceIndex, DateRange, ExchangeRate, Institution, InterestRate,
        ProductManagement, SalesPerson,
    },
};
use crate::{
    net::errors::ApiError,
    query::{
        CompositeStatus, InvalidateAndSeed, MutationOptions, QueryClient, QueryKey, QueryOptions,
        QueryState, QueryStatus,
    },
};
use std::time::Duration;

pub const EXCHANGE_RATES: &str = "exchangeRates";
pub const INTEREST_RATES: &str = "interestRates";
pub const CONSUMER_PRICE_INDEX: &str = "consumerPriceIndex";

/// Query names a dashboard refresh invalidates
pub const DASHBOARD_QUERIES: [&str; 7] = [
    ProductManagement::LIST_QUERY,
    SalesPerson::LIST_QUERY,
    Institution::LIST_QUERY,
    CommissionStatus::LIST_QUERY,
    EXCHANGE_RATES,
    INTEREST_RATES,
    CONSUMER_PRICE_INDEX,
];

/// Resource lists go stale after five minutes, sooner than the rate panels
pub fn list_options() -> QueryOptions {
    QueryOptions::dashboard().with_stale_time(Duration::from_secs(5 * 60))
}

pub fn exchange_rates_key() -> QueryKey {
    QueryKey::new(EXCHANGE_RATES)
}

pub fn interest_rates_key(range: &DateRange) -> QueryKey {
    QueryKey::new(INTEREST_RATES)
        .with(range.start().to_string())
        .with(range.end().to_string())
}

pub fn consumer_price_index_key(range: &DateRange) -> QueryKey {
    QueryKey::new(CONSUMER_PRICE_INDEX)
        .with(range.start().to_string())
        .with(range.end().to_string())
}

pub fn list_key<R: DashboardResource>() -> QueryKey {
    QueryKey::new(R::LIST_QUERY)
}

pub fn item_key<R: DashboardResource>(id: i64) -> QueryKey {
    QueryKey::new(R::ITEM_QUERY).with(id)
}

/// Every dashboard query, read together
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub product_management: QueryState<Vec<ProductManagement>>,
    pub sales_persons: QueryState<Vec<SalesPerson>>,
    pub institutions: QueryState<Vec<Institution>>,
    pub commission_status: QueryState<Vec<CommissionStatus>>,
    pub exchange_rates: QueryState<Vec<ExchangeRate>>,
    pub interest_rates: QueryState<Vec<InterestRate>>,
    pub consumer_price_index: QueryState<Vec<ConsumerPriceIndex>>,
}

impl DashboardData {
    /// Loading if any part is loading; error of the first failed part
    pub fn status(&self) -> CompositeStatus {
        CompositeStatus::from_parts([
            &self.product_management as &dyn QueryStatus,
            &self.sales_persons,
            &self.institutions,
            &self.commission_status,
            &self.exchange_rates,
            &self.interest_rates,
            &self.consumer_price_index,
        ])
    }
}

/// Dashboard reads and writes through the cache
#[derive(Debug, Clone)]
pub struct DashboardQueries {
    cache: QueryClient,
    api: DashboardApi,
}

impl DashboardQueries {
    pub fn new(cache: QueryClient, api: DashboardApi) -> Self {
        Self { cache, api }
    }

    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }

    pub async fn exchange_rates(&self) -> QueryState<Vec<ExchangeRate>> {
        let api = self.api.clone();
        self.cache
            .query(&exchange_rates_key(), QueryOptions::dashboard(), move || {
                let api = api.clone();
                async move { api.exchange_rates().await }
            })
            .await
    }

    pub async fn interest_rates(&self, range: &DateRange) -> QueryState<Vec<InterestRate>> {
        let api = self.api.clone();
        let range = *range;
        self.cache
            .query(
                &interest_rates_key(&range),
                QueryOptions::dashboard(),
                move || {
                    let api = api.clone();
                    async move { api.interest_rates(&range).await }
                },
            )
            .await
    }

    pub async fn consumer_price_index(
        &self,
        range: &DateRange,
    ) -> QueryState<Vec<ConsumerPriceIndex>> {
        let api = self.api.clone();
        let range = *range;
        self.cache
            .query(
                &consumer_price_index_key(&range),
                QueryOptions::dashboard(),
                move || {
                    let api = api.clone();
                    async move { api.consumer_price_index(&range).await }
                },
            )
            .await
    }

    pub async fn list<R: DashboardResource>(&self) -> QueryState<Vec<R>> {
        let api = self.api.clone();
        self.cache
            .query(&list_key::<R>(), list_options(), move || {
                let api = api.clone();
                async move { api.list::<R>().await }
            })
            .await
    }

    /// Single record; id 0 means "none selected" and never fetches
    pub async fn by_id<R: DashboardResource>(&self, id: i64) -> QueryState<R> {
        if id == 0 {
            return QueryState::idle();
        }
        let api = self.api.clone();
        self.cache
            .query(&item_key::<R>(id), QueryOptions::individual(), move || {
                let api = api.clone();
                async move { api.get::<R>(id).await }
            })
            .await
    }

    /// Update a record, then mark its list stale and seed its item entry
    ///
    /// # Errors
    ///
    /// Returns the server error once the retry is exhausted; the cache is untouched
    pub async fn update<R: DashboardResource>(
        &self,
        id: i64,
        patch: R::Patch,
    ) -> Result<R, ApiError> {
        let hook = InvalidateAndSeed::new(R::LIST_QUERY, |record: &R| item_key::<R>(record.id()));
        let label = format!("update {}[{id}]", R::ITEM_QUERY);
        self.cache
            .mutate(
                &label,
                &MutationOptions::default(),
                || self.api.update::<R>(id, &patch),
                &hook,
            )
            .await
    }

    /// All seven dashboard queries, issued concurrently
    pub async fn dashboard(&self, range: &DateRange) -> DashboardData {
        let (
            product_management,
            sales_persons,
            institutions,
            commission_status,
            exchange_rates,
            interest_rates,
            consumer_price_index,
        ) = tokio::join!(
            self.list::<ProductManagement>(),
            self.list::<SalesPerson>(),
            self.list::<Institution>(),
            self.list::<CommissionStatus>(),
            self.exchange_rates(),
            self.interest_rates(range),
            self.consumer_price_index(range),
        );

        DashboardData {
            product_management,
            sales_persons,
            institutions,
            commission_status,
            exchange_rates,
            interest_rates,
            consumer_price_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::models::YearMonth;

    #[test]
    fn test_range_keys_carry_both_bounds() {
        let range = DateRange::new(YearMonth::new(2024, 1).unwrap(), YearMonth::new(2024, 6).unwrap())
            .unwrap();

        assert_eq!(interest_rates_key(&range).to_string(), r#"interestRates["202401", "202406"]"#);
        assert_eq!(
            consumer_price_index_key(&range).to_string(),
            r#"consumerPriceIndex["202401", "202406"]"#
        );
        assert_ne!(interest_rates_key(&range), interest_rates_key(&DateRange::default()));
    }

    #[test]
    fn test_list_options_keep_dashboard_cache_time() {
        let options = list_options();
        assert_eq!(options.stale_time, Duration::from_secs(300));
        assert_eq!(options.cache_time, QueryOptions::dashboard().cache_time);
    }

    #[test]
    fn test_item_keys() {
        assert_eq!(item_key::<SalesPerson>(7).to_string(), "salesPerson[7]");
        assert_eq!(list_key::<Institution>().to_string(), "institutions");
        assert_eq!(DASHBOARD_QUERIES.len(), 7);
    }
}
