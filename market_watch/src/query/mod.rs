//! Query cache orchestration: keyed, parameterized queries with freshness
//! windows, retries, in-flight de-duplication and invalidation.

pub mod client;
pub mod collector;
pub mod key;
pub mod mutation;
pub mod options;
pub mod select;
pub mod state;

pub use client::QueryClient;
pub use collector::{CacheCollector, DEFAULT_GC_INTERVAL};
pub use key::{ParamValue, QueryKey};
pub use mutation::{InvalidateAndSeed, PostCommit};
pub use options::{MutationOptions, QueryOptions, RefetchTrigger};
pub use select::Selector;
pub use state::{CompositeStatus, QueryState, QueryStatus};
