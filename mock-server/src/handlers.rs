use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::store::merge;
use crate::AppState;

const RESERVED: [&str; 3] = ["id", "created", "removed"];
const PUBLIC_IMAGES: [&str; 2] = ["logo.png", "idurar-crm-erp.svg"];

pub fn reply(status: StatusCode, success: bool, result: Value, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": success,
            "result": result,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn fail(status: StatusCode, message: impl Into<String>) -> Response {
    reply(status, false, Value::Null, message)
}

fn not_found() -> Response {
    fail(StatusCode::NOT_FOUND, "No document found")
}

/// A JSON body, with malformed input answered in the wire envelope.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, Response> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| fail(StatusCode::BAD_REQUEST, rejection.body_text()))
}

fn parse_id(raw: &str) -> Result<Uuid, Response> {
    raw.parse()
        .map_err(|_| fail(StatusCode::BAD_REQUEST, format!("Invalid id: {raw}")))
}

/// Request fields from either a JSON object or a multipart form. Files in a
/// multipart form are recorded under `files` by name and size.
pub struct Fields(pub Map<String, Value>);

impl<S: Send + Sync> FromRequest<S> for Fields {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        let mut fields = if multipart {
            let form = Multipart::from_request(req, state)
                .await
                .map_err(|e| fail(StatusCode::BAD_REQUEST, e.to_string()))?;
            read_form(form).await?
        } else {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| fail(StatusCode::BAD_REQUEST, e.to_string()))?;
            match value {
                Value::Object(map) => map,
                _ => return Err(fail(StatusCode::BAD_REQUEST, "Expected a JSON object")),
            }
        };
        for key in RESERVED {
            fields.remove(key);
        }
        Ok(Fields(fields))
    }
}

async fn read_form(mut form: Multipart) -> Result<Map<String, Value>, Response> {
    let mut fields = Map::new();
    let mut files = Vec::new();
    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| fail(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| fail(StatusCode::BAD_REQUEST, e.to_string()))?;
                files.push(json!({"field": name, "filename": filename, "size": bytes.len()}));
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| fail(StatusCode::BAD_REQUEST, e.to_string()))?;
                fields.insert(name, Value::String(text));
            }
        }
    }
    if !files.is_empty() {
        fields.insert("files".to_string(), Value::Array(files));
    }
    Ok(fields)
}

// --- auth & settings ---

pub async fn login(State(state): State<AppState>, payload: Result<Json<Value>, JsonRejection>) -> Response {
    let input = match json_body(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let email = input["email"].as_str().unwrap_or_default();
    let password = input["password"].as_str().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Email and password are required");
    }
    let token = state
        .token
        .clone()
        .unwrap_or_else(|| "mock-token".to_string());
    reply(
        StatusCode::OK,
        true,
        json!({"token": token, "name": email}),
        "Successfully login user",
    )
}

pub async fn get_settings(State(state): State<AppState>) -> Response {
    let store = state.db.read().await;
    reply(StatusCode::OK, true, Value::Object(store.settings.clone()), "Settings retrieved")
}

pub async fn replace_settings(State(state): State<AppState>, Fields(fields): Fields) -> Response {
    let mut store = state.db.write().await;
    store.settings = fields;
    reply(StatusCode::OK, true, Value::Object(store.settings.clone()), "Settings saved")
}

pub async fn update_settings(State(state): State<AppState>, Fields(fields): Fields) -> Response {
    let mut store = state.db.write().await;
    merge(&mut store.settings, fields);
    reply(StatusCode::OK, true, Value::Object(store.settings.clone()), "Settings updated")
}

// --- entity CRUD ---

pub async fn create(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Fields(fields): Fields,
) -> Response {
    if fields.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "No data provided");
    }
    let record = state.db.write().await.insert(&entity, fields);
    reply(
        StatusCode::CREATED,
        true,
        record.to_json(),
        format!("{entity} created successfully"),
    )
}

pub async fn read(State(state): State<AppState>, Path((entity, id)): Path<(String, String)>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let store = state.db.read().await;
    match store.get(&entity, id) {
        Some(record) => reply(
            StatusCode::OK,
            true,
            record.to_json(),
            format!("{entity} retrieved successfully"),
        ),
        None => not_found(),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Fields(fields): Fields,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let mut store = state.db.write().await;
    let Some(record) = store.get_mut(&entity, id) else {
        return not_found();
    };
    merge(&mut record.fields, fields);
    reply(
        StatusCode::OK,
        true,
        record.to_json(),
        format!("{entity} updated successfully"),
    )
}

pub async fn upload(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Fields(fields): Fields,
) -> Response {
    if !fields.contains_key("files") {
        return fail(StatusCode::BAD_REQUEST, "No file uploaded");
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let mut store = state.db.write().await;
    let Some(record) = store.get_mut(&entity, id) else {
        return not_found();
    };
    merge(&mut record.fields, fields);
    reply(StatusCode::OK, true, record.to_json(), "File uploaded successfully")
}

pub async fn remove(State(state): State<AppState>, Path((entity, id)): Path<(String, String)>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let mut store = state.db.write().await;
    let Some(record) = store.get_mut(&entity, id) else {
        return not_found();
    };
    record.removed = true;
    reply(
        StatusCode::OK,
        true,
        record.to_json(),
        format!("{entity} deleted successfully"),
    )
}

// --- collections ---

type Params = Query<HashMap<String, String>>;

fn narrowed(params: &HashMap<String, String>) -> Option<(&str, &str)> {
    let filter = params.get("filter").filter(|v| !v.is_empty())?;
    let equal = params.get("equal").filter(|v| !v.is_empty())?;
    Some((filter.as_str(), equal.as_str()))
}

fn positive(params: &HashMap<String, String>, key: &str, default: u64) -> Result<u64, Response> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| fail(StatusCode::BAD_REQUEST, format!("Invalid {key}: {raw}"))),
    }
}

pub async fn list(State(state): State<AppState>, Path(entity): Path<String>, Query(params): Params) -> Response {
    let size_key = if params.contains_key("items") { "items" } else { "limit" };
    let (page, limit) = match (positive(&params, "page", 1), positive(&params, size_key, 10)) {
        (Ok(page), Ok(limit)) => (page, limit),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    let Some(start) = (page - 1)
        .checked_mul(limit)
        .and_then(|start| usize::try_from(start).ok())
    else {
        return fail(StatusCode::BAD_REQUEST, format!("Invalid page: {page}"));
    };
    let store = state.db.read().await;
    let records: Vec<_> = store
        .active(&entity)
        .into_iter()
        .filter(|record| match narrowed(&params) {
            Some((field, value)) => record.field_text(field).as_deref() == Some(value),
            None => true,
        })
        .filter(|record| match params.get("q").filter(|q| !q.is_empty()) {
            Some(q) => record.matches(q, None),
            None => true,
        })
        .collect();

    let total = records.len() as u64;
    let pages = total.div_ceil(limit);
    let result: Vec<Value> = records
        .iter()
        .skip(start)
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .map(|record| record.to_json())
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "result": result,
            "pagination": {
                "page": page,
                "limit": limit,
                "pages": pages,
                "total": total,
                "prev": if page > 1 { Some(page - 1) } else { None },
                "next": if page < pages { Some(page + 1) } else { None },
            },
            "message": format!("{entity} list retrieved successfully"),
        })),
    )
        .into_response()
}

pub async fn list_all(State(state): State<AppState>, Path(entity): Path<String>) -> Response {
    let store = state.db.read().await;
    let result: Vec<Value> = store.active(&entity).iter().map(|r| r.to_json()).collect();
    reply(
        StatusCode::OK,
        true,
        Value::Array(result),
        format!("All {entity} retrieved successfully"),
    )
}

pub async fn filter(State(state): State<AppState>, Path(entity): Path<String>, Query(params): Params) -> Response {
    let store = state.db.read().await;
    let result: Vec<Value> = store
        .active(&entity)
        .into_iter()
        .filter(|record| match narrowed(&params) {
            Some((field, value)) => record.field_text(field).as_deref() == Some(value),
            None => true,
        })
        .map(|record| record.to_json())
        .collect();
    reply(
        StatusCode::OK,
        true,
        Value::Array(result),
        format!("Filtered {entity} retrieved successfully"),
    )
}

pub async fn search(State(state): State<AppState>, Path(entity): Path<String>, Query(params): Params) -> Response {
    let q = params.get("q").map(String::as_str).unwrap_or_default();
    let fields: Option<Vec<&str>> = params
        .get("fields")
        .map(|raw| raw.split(',').map(str::trim).filter(|f| !f.is_empty()).collect());
    let store = state.db.read().await;
    let result: Vec<Value> = store
        .active(&entity)
        .into_iter()
        .filter(|record| q.is_empty() || record.matches(q, fields.as_deref()))
        .map(|record| record.to_json())
        .collect();
    reply(
        StatusCode::OK,
        true,
        Value::Array(result),
        format!("Search {entity} retrieved successfully"),
    )
}

pub async fn summary(State(state): State<AppState>, Path(entity): Path<String>) -> Response {
    let store = state.db.read().await;
    let records = store.active(&entity);
    let mut by_status: Map<String, Value> = Map::new();
    for status in records.iter().filter_map(|r| r.field_text("status")) {
        let count = by_status.get(&status).and_then(Value::as_u64).unwrap_or(0);
        by_status.insert(status, json!(count + 1));
    }
    reply(
        StatusCode::OK,
        true,
        json!({"total": records.len(), "status": by_status}),
        format!("{entity} summary retrieved successfully"),
    )
}

// --- actions ---

pub async fn mail(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let input = match json_body(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let Some(raw) = input["id"].as_str() else {
        return fail(StatusCode::BAD_REQUEST, "An id is required");
    };
    let id = match parse_id(raw) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let store = state.db.read().await;
    if store.get(&entity, id).is_none() {
        return not_found();
    }
    reply(
        StatusCode::OK,
        true,
        Value::Null,
        format!("{entity} sent successfully"),
    )
}

pub async fn convert(State(state): State<AppState>, Path((entity, id)): Path<(String, String)>) -> Response {
    if entity != "quote" {
        return fail(StatusCode::BAD_REQUEST, format!("{entity} cannot be converted"));
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let mut store = state.db.write().await;
    let Some(quote) = store.get_mut(&entity, id) else {
        return not_found();
    };
    if quote.fields.get("converted") == Some(&Value::Bool(true)) {
        return fail(StatusCode::BAD_REQUEST, "Quote already converted");
    }
    quote.fields.insert("converted".to_string(), Value::Bool(true));
    let mut fields = quote.fields.clone();
    fields.remove("converted");
    fields.insert("converted_from".to_string(), json!(id));
    let invoice = store.insert("invoice", fields);
    reply(
        StatusCode::OK,
        true,
        invoice.to_json(),
        "Quote converted to invoice successfully",
    )
}

pub async fn public_image(Path(name): Path<String>) -> Response {
    if PUBLIC_IMAGES.contains(&name.as_str()) {
        let content_type = if name.ends_with(".svg") { "image/svg+xml" } else { "image/png" };
        ([(header::CONTENT_TYPE, content_type)], Vec::from(&b"\x89PNG"[..])).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
