//! Admin API clients.
//!
//! - [`HttpClient`]: session-bound HTTP transport with retry handling
//! - [`GraphqlClient`]: the GraphQL Admin API surface built on it

mod errors;
mod graphql;
mod http;

pub use errors::{GraphqlError, HttpError, HttpResponseError, MaxHttpRetriesExceededError};
pub use graphql::GraphqlClient;
pub use http::{HttpClient, HttpResponse, RETRY_WAIT_TIME};
