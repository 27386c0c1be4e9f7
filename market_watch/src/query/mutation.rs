//! Mutations and their post-commit cache hooks.

use super::{
    client::{QueryClient, with_retry},
    key::QueryKey,
    options::MutationOptions,
};
use crate::net::errors::ApiError;
use async_trait::async_trait;
use std::future::Future;

/// Cache maintenance run after a mutation succeeds
#[async_trait]
pub trait PostCommit<O>: Send + Sync {
    async fn on_success(&self, cache: &QueryClient, output: &O);
}

/// Mark the list query stale, then seed the item entry with the returned record.
pub struct InvalidateAndSeed<O> {
    list: &'static str,
    item_key: fn(&O) -> QueryKey,
}

impl<O> InvalidateAndSeed<O> {
    pub fn new(list: &'static str, item_key: fn(&O) -> QueryKey) -> Self {
        Self { list, item_key }
    }
}

#[async_trait]
impl<O> PostCommit<O> for InvalidateAndSeed<O>
where
    O: Clone + Send + Sync + 'static,
{
    async fn on_success(&self, cache: &QueryClient, output: &O) {
        cache.invalidate(self.list).await;
        cache
            .set_query_data(&(self.item_key)(output), output.clone())
            .await;
    }
}

impl QueryClient {
    /// Run a mutation with retries, then its post-commit hook
    ///
    /// The hook runs only on success. Readers observe the prior cached value
    /// until the hook has run.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted
    pub async fn mutate<O, F, Fut>(
        &self,
        label: &str,
        options: &MutationOptions,
        run: F,
        hook: &dyn PostCommit<O>,
    ) -> Result<O, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<O, ApiError>>,
    {
        let output = with_retry(label, options.retry, options.retry_delay, run).await?;
        hook.on_success(self, &output).await;
        log::info!("Mutation {} committed", label);
        Ok(output)
    }
}
