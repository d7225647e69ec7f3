//! The verb-shaped façade over the ERP backend.
//!
//! # Design
//! Every operation follows the same linear sequence: resolve a fresh
//! `ExchangeConfig` from the current auth state, build the request, run the
//! exchange (raced against the attached cancel token, if any), classify,
//! forward the notification to the sink, return the envelope. Operations
//! never fail: transport problems come back as `{success: false, error}`.
//!
//! There are no retries. A failed exchange is reported once.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::PersistedState;
use crate::cancel::{CancelSource, CancelToken};
use crate::classify::{classify, decode, transport_failure, Classified};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::RequestError;
use crate::form::FormData;
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::NotificationSink;
use crate::params::{CreateParams, EntityParams, FilterParams, IdParams, OptionsParams, UpdateParams};
use crate::transport::Transport;
use crate::verb::{NotificationPolicy, Verb};

pub struct Dispatcher<T, S, N> {
    config: Arc<ClientConfig>,
    transport: Arc<T>,
    state: Arc<S>,
    sink: Arc<N>,
    cancel: Option<CancelToken>,
    policy: Option<NotificationPolicy>,
}

impl<T, S, N> Clone for Dispatcher<T, S, N> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
            state: Arc::clone(&self.state),
            sink: Arc::clone(&self.sink),
            cancel: self.cancel.clone(),
            policy: self.policy,
        }
    }
}

impl<T, S, N> Dispatcher<T, S, N>
where
    T: Transport,
    S: PersistedState,
    N: NotificationSink,
{
    pub fn new(config: ClientConfig, transport: Arc<T>, state: Arc<S>, sink: Arc<N>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            state,
            sink,
            cancel: None,
            policy: None,
        }
    }

    /// A copy of this dispatcher whose calls can be aborted through `token`.
    pub fn with_cancel(&self, token: CancelToken) -> Self {
        let mut scoped = self.clone();
        scoped.cancel = Some(token);
        scoped
    }

    /// A copy of this dispatcher that uses `policy` instead of each verb's
    /// default. This also turns on classification for `get` and `post`.
    pub fn with_policy(&self, policy: NotificationPolicy) -> Self {
        let mut scoped = self.clone();
        scoped.policy = Some(policy);
        scoped
    }

    /// A fresh cancellation source for use with `with_cancel`.
    pub fn source(&self) -> CancelSource {
        CancelSource::new()
    }

    pub async fn create<B: Serialize, R: DeserializeOwned>(&self, params: CreateParams<B>) -> Envelope<R> {
        let request = self.client().build_create(&params);
        self.run(Verb::Create, request).await
    }

    pub async fn create_and_upload<R: DeserializeOwned>(&self, params: CreateParams<FormData>) -> Envelope<R> {
        let request = self.client().build_create_and_upload(&params);
        self.run(Verb::CreateAndUpload, Ok(request)).await
    }

    pub async fn read<R: DeserializeOwned>(&self, params: IdParams) -> Envelope<R> {
        let request = self.client().build_read(&params);
        self.run(Verb::Read, Ok(request)).await
    }

    pub async fn update<B: Serialize, R: DeserializeOwned>(&self, params: UpdateParams<B>) -> Envelope<R> {
        let request = self.client().build_update(&params);
        self.run(Verb::Update, request).await
    }

    pub async fn update_and_upload<R: DeserializeOwned>(&self, params: UpdateParams<FormData>) -> Envelope<R> {
        let request = self.client().build_update_and_upload(&params);
        self.run(Verb::UpdateAndUpload, Ok(request)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, params: IdParams) -> Envelope<R> {
        let request = self.client().build_delete(&params);
        self.run(Verb::Delete, Ok(request)).await
    }

    pub async fn filter<R: DeserializeOwned>(&self, params: FilterParams) -> Envelope<R> {
        let request = self.client().build_filter(&params);
        self.run(Verb::Filter, Ok(request)).await
    }

    pub async fn search<R: DeserializeOwned>(&self, params: OptionsParams) -> Envelope<R> {
        let request = self.client().build_search(&params);
        self.run(Verb::Search, Ok(request)).await
    }

    pub async fn list<R: DeserializeOwned>(&self, params: OptionsParams) -> Envelope<R> {
        let request = self.client().build_list(&params);
        self.run(Verb::List, Ok(request)).await
    }

    pub async fn list_all<R: DeserializeOwned>(&self, params: OptionsParams) -> Envelope<R> {
        let request = self.client().build_list_all(&params);
        self.run(Verb::ListAll, Ok(request)).await
    }

    pub async fn summary<R: DeserializeOwned>(&self, params: OptionsParams) -> Envelope<R> {
        let request = self.client().build_summary(&params);
        self.run(Verb::Summary, Ok(request)).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, params: CreateParams<B>) -> Envelope<R> {
        let request = self.client().build_post(&params);
        self.run(Verb::Post, request).await
    }

    pub async fn get<R: DeserializeOwned>(&self, params: EntityParams) -> Envelope<R> {
        let request = self.client().build_get(&params);
        self.run(Verb::Get, Ok(request)).await
    }

    pub async fn patch<B: Serialize, R: DeserializeOwned>(&self, params: CreateParams<B>) -> Envelope<R> {
        let request = self.client().build_patch(&params);
        self.run(Verb::Patch, request).await
    }

    pub async fn upload<R: DeserializeOwned>(&self, params: UpdateParams<FormData>) -> Envelope<R> {
        let request = self.client().build_upload(&params);
        self.run(Verb::Upload, Ok(request)).await
    }

    pub async fn mail<B: Serialize, R: DeserializeOwned>(&self, params: CreateParams<B>) -> Envelope<R> {
        let request = self.client().build_mail(&params);
        self.run(Verb::Mail, request).await
    }

    pub async fn convert<R: DeserializeOwned>(&self, params: IdParams) -> Envelope<R> {
        let request = self.client().build_convert(&params);
        self.run(Verb::Convert, Ok(request)).await
    }

    /// Whether an image is reachable at `url` (an absolute URL). Any failure,
    /// including a non-200 status, reads as `false`.
    pub async fn check_image(&self, url: &str) -> bool {
        let request = self.client().build_check_image(url);
        match self.exchange(request).await {
            Ok(response) => response.status == 200,
            Err(err) => {
                debug!(url, error = %err, "image check failed");
                false
            }
        }
    }

    /// Per-call request builder. The auth state is read here, once per
    /// operation.
    fn client(&self) -> ApiClient {
        ApiClient::new(self.config.resolve(self.state.as_ref()))
    }

    async fn run<R: DeserializeOwned>(
        &self,
        verb: Verb,
        request: Result<HttpRequest, RequestError>,
    ) -> Envelope<R> {
        let policy = self.policy.or_else(|| verb.default_policy());
        match self.attempt(verb, request, policy).await {
            Ok(Classified {
                envelope,
                notification,
            }) => {
                if let Some(notification) = notification {
                    self.sink.show(&notification);
                }
                envelope
            }
            Err(err) => {
                if err.is_aborted() {
                    debug!(%verb, "request aborted by caller");
                } else {
                    warn!(%verb, error = %err, "request failed");
                }
                transport_failure(&err)
            }
        }
    }

    async fn attempt<R: DeserializeOwned>(
        &self,
        verb: Verb,
        request: Result<HttpRequest, RequestError>,
        policy: Option<NotificationPolicy>,
    ) -> Result<Classified<R>, RequestError> {
        let request = request?;
        debug!(%verb, method = %request.method, url = %request.path, "dispatching request");
        let response = self.exchange(request).await?;
        match policy {
            Some(policy) => classify(&response, policy),
            None => Ok(Classified {
                envelope: decode(&response)?,
                notification: None,
            }),
        }
    }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let Some(token) = &self.cancel else {
            return self.transport.execute(request).await;
        };
        if token.is_cancelled() {
            return Err(RequestError::Aborted);
        }
        tokio::select! {
            biased;
            () = token.cancelled() => Err(RequestError::Aborted),
            result = self.transport.execute(request) => result,
        }
    }
}
