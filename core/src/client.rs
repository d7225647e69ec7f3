//! Request builder for the ERP backend.
//!
//! # Design
//! `ApiClient` is the sans-IO half of the request layer: it turns verb
//! parameters into `HttpRequest` values and never touches the network. It is
//! built per call from an `ExchangeConfig`, so the base URL, credential mode
//! and bearer token travel with each request instead of living in shared
//! mutable defaults.

use serde::Serialize;

use crate::config::ExchangeConfig;
use crate::error::RequestError;
use crate::form::FormData;
use crate::http::{HttpMethod, HttpRequest};
use crate::params::{CreateParams, EntityParams, FilterParams, IdParams, OptionsParams, UpdateParams};
use crate::verb::Verb;

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ExchangeConfig,
}

impl ApiClient {
    pub fn new(config: ExchangeConfig) -> Self {
        Self { config }
    }

    pub fn build_create<B: Serialize>(&self, params: &CreateParams<B>) -> Result<HttpRequest, RequestError> {
        self.json_request(Verb::Create, &params.entity, "", &params.json_data)
    }

    pub fn build_create_and_upload(&self, params: &CreateParams<FormData>) -> HttpRequest {
        self.multipart_request(Verb::CreateAndUpload, &params.entity, "", &params.json_data)
    }

    pub fn build_read(&self, params: &IdParams) -> HttpRequest {
        self.request(Verb::Read, &params.entity, &encode_id(&params.id), None)
    }

    pub fn build_update<B: Serialize>(&self, params: &UpdateParams<B>) -> Result<HttpRequest, RequestError> {
        self.json_request(Verb::Update, &params.entity, &encode_id(&params.id), &params.json_data)
    }

    pub fn build_update_and_upload(&self, params: &UpdateParams<FormData>) -> HttpRequest {
        self.multipart_request(
            Verb::UpdateAndUpload,
            &params.entity,
            &encode_id(&params.id),
            &params.json_data,
        )
    }

    pub fn build_delete(&self, params: &IdParams) -> HttpRequest {
        self.request(Verb::Delete, &params.entity, &encode_id(&params.id), None)
    }

    pub fn build_filter(&self, params: &FilterParams) -> HttpRequest {
        self.request(Verb::Filter, &params.entity, &params.query.to_query_string(), None)
    }

    pub fn build_search(&self, params: &OptionsParams) -> HttpRequest {
        self.options_request(Verb::Search, params)
    }

    pub fn build_list(&self, params: &OptionsParams) -> HttpRequest {
        self.options_request(Verb::List, params)
    }

    pub fn build_list_all(&self, params: &OptionsParams) -> HttpRequest {
        self.options_request(Verb::ListAll, params)
    }

    pub fn build_summary(&self, params: &OptionsParams) -> HttpRequest {
        self.options_request(Verb::Summary, params)
    }

    pub fn build_post<B: Serialize>(&self, params: &CreateParams<B>) -> Result<HttpRequest, RequestError> {
        self.json_request(Verb::Post, &params.entity, "", &params.json_data)
    }

    pub fn build_get(&self, params: &EntityParams) -> HttpRequest {
        self.request(Verb::Get, &params.entity, "", None)
    }

    pub fn build_patch<B: Serialize>(&self, params: &CreateParams<B>) -> Result<HttpRequest, RequestError> {
        self.json_request(Verb::Patch, &params.entity, "", &params.json_data)
    }

    pub fn build_upload(&self, params: &UpdateParams<FormData>) -> HttpRequest {
        self.multipart_request(Verb::Upload, &params.entity, &encode_id(&params.id), &params.json_data)
    }

    pub fn build_mail<B: Serialize>(&self, params: &CreateParams<B>) -> Result<HttpRequest, RequestError> {
        self.json_request(Verb::Mail, &params.entity, "", &params.json_data)
    }

    pub fn build_convert(&self, params: &IdParams) -> HttpRequest {
        self.request(Verb::Convert, &params.entity, &encode_id(&params.id), None)
    }

    /// A plain GET for an absolute URL, without the bearer token.
    pub fn build_check_image(&self, url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: url.to_string(),
            headers: Vec::new(),
            body: None,
            with_credentials: false,
        }
    }

    fn options_request(&self, verb: Verb, params: &OptionsParams) -> HttpRequest {
        self.request(verb, &params.entity, &params.options.to_query_string(), None)
    }

    fn json_request<B: Serialize>(
        &self,
        verb: Verb,
        entity: &str,
        tail: &str,
        data: &B,
    ) -> Result<HttpRequest, RequestError> {
        let body = serde_json::to_vec(data).map_err(|e| RequestError::Serialization(e.to_string()))?;
        Ok(self.request(verb, entity, tail, Some((JSON.to_string(), body))))
    }

    fn multipart_request(&self, verb: Verb, entity: &str, tail: &str, form: &FormData) -> HttpRequest {
        self.request(verb, entity, tail, Some(form.encode()))
    }

    fn request(&self, verb: Verb, entity: &str, tail: &str, body: Option<(String, Vec<u8>)>) -> HttpRequest {
        let mut headers = Vec::new();
        let body = body.map(|(content_type, bytes)| {
            headers.push(("content-type".to_string(), content_type));
            bytes
        });
        if let Some(token) = &self.config.bearer {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method: verb.method(),
            path: format!(
                "{}/{}{}{tail}",
                self.config.base_url,
                entity.trim_start_matches('/'),
                verb.suffix()
            ),
            headers,
            body,
            with_credentials: self.config.with_credentials,
        }
    }
}

fn encode_id(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
