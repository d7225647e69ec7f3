//! Typed client-side request layer for the ERP REST backend.
//!
//! # Overview
//! `Dispatcher` exposes one async operation per backend verb (create, read,
//! update, delete, filter, search, list, listAll, summary, upload, convert,
//! mail and generic get/post/patch). Each operation injects the current
//! bearer token, builds the path and query, performs the exchange, classifies
//! the response and returns an `Envelope`. Operations never fail; callers
//! branch on `Envelope::success`.
//!
//! # Design
//! - `ApiClient` builds `HttpRequest` values without I/O; a `Transport`
//!   executes them. `UreqTransport` is the provided network transport.
//! - Token, origin and credential mode are resolved per call into an
//!   immutable `ExchangeConfig`; there is no shared mutable client state.
//! - `classify` is pure. Notifications are returned as values and forwarded
//!   to an injected `NotificationSink`.
//! - `FilterQuery` and `QueryOptions` are separate types, so the filter
//!   endpoint can only ever receive `filter` and `equal`.

pub mod auth;
pub mod cancel;
pub mod classify;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod form;
pub mod http;
pub mod notify;
pub mod params;
pub mod query;
pub mod status;
pub mod transport;
pub mod verb;

pub use auth::{bearer_token, AuthSnapshot, MemoryState, PersistedState};
pub use cancel::{CancelSource, CancelToken};
pub use classify::{classify, transport_failure, Classified};
pub use client::ApiClient;
pub use config::{ClientConfig, ExchangeConfig};
pub use dispatcher::Dispatcher;
pub use envelope::{Envelope, Pagination};
pub use error::RequestError;
pub use form::FormData;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{
    CollectingSink, Notification, NotificationKind, NotificationSink, NullSink, ToastBoard, TracingSink,
};
pub use params::{CreateParams, EntityParams, FilterParams, IdParams, OptionsParams, UpdateParams};
pub use query::{FilterQuery, QueryOptions, Scalar};
pub use transport::{Transport, UreqTransport};
pub use verb::{NotificationPolicy, Verb};
