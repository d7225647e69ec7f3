//! Network exchange.
//!
//! # Design
//! `Transport` is the I/O seam: it takes an `HttpRequest` and produces an
//! `HttpResponse` for any status the server answers with. Only failures to
//! get an answer at all are errors. `UreqTransport` runs the blocking ureq
//! client on tokio's blocking pool so callers never block their executor.

use std::future::Future;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, RequestError>> + Send;
}

/// ureq-backed transport.
///
/// Credentialed exchanges share one agent, and with it one cookie jar.
/// Exchanges with `with_credentials == false` get a fresh agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            agent: new_agent(config),
            config: config.clone(),
        }
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let agent = if request.with_credentials {
            self.agent.clone()
        } else {
            new_agent(&self.config)
        };
        tokio::task::spawn_blocking(move || send(&agent, request))
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?
    }
}

/// Disables ureq's status-as-error behavior so 4xx/5xx come back as data.
fn new_agent(config: &ClientConfig) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(config.timeout))
        .build()
        .new_agent()
}

fn send(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, RequestError> {
    debug!(method = %req.method, url = %req.path, "sending request");

    let result = match req.method {
        HttpMethod::Get => {
            let mut builder = agent.get(&req.path);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        HttpMethod::Delete => {
            let mut builder = agent.delete(&req.path);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        HttpMethod::Post | HttpMethod::Patch => {
            let mut builder = if req.method == HttpMethod::Post {
                agent.post(&req.path)
            } else {
                agent.patch(&req.path)
            };
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match &req.body {
                Some(body) => builder.send(body.as_slice()),
                None => builder.send_empty(),
            }
        }
    };

    let mut response = result.map_err(transport_error)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(transport_error)?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn transport_error(err: ureq::Error) -> RequestError {
    match err {
        ureq::Error::Timeout(_) => RequestError::Timeout,
        other => RequestError::Network(other.to_string()),
    }
}
