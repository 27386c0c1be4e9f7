//! Authentication: credential persistence, input validation, the auth endpoints
//! and their cached reads.

pub mod api;
pub mod credentials;
pub mod models;
pub mod queries;
pub mod store;
pub mod validation;

pub use api::AuthApi;
pub use credentials::{CredentialStore, TOKEN_KEY, USER_KEY};
pub use models::{Credentials, LoginRequest, SignUpRequest, UserId, UserProfile};
pub use queries::AuthQueries;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
