//! Response classification.
//!
//! # Design
//! `classify` is a pure function from a completed exchange and a policy to
//! the envelope plus, optionally, the notification to show. Success is the
//! body's `success` flag, never the HTTP status: a 200 saying
//! `"success": false` is a failure, a 400 saying `"success": true` is not.
//! An empty message counts as no message. A body that is not JSON at all,
//! or a success whose `result` does not fit `T`, is an error-path outcome
//! and produces no notification.

use serde::de::DeserializeOwned;

use crate::envelope::Envelope;
use crate::error::RequestError;
use crate::http::HttpResponse;
use crate::notify::Notification;
use crate::status::status_message;
use crate::verb::NotificationPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct Classified<T> {
    pub envelope: Envelope<T>,
    pub notification: Option<Notification>,
}

/// Decodes the body without classifying it.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<Envelope<T>, RequestError> {
    serde_json::from_str(&response.body).map_err(|e| RequestError::Decode {
        status: response.status,
        reason: e.to_string(),
    })
}

pub fn classify<T: DeserializeOwned>(
    response: &HttpResponse,
    policy: NotificationPolicy,
) -> Result<Classified<T>, RequestError> {
    let mut envelope = decode::<T>(response)?;
    let stated = envelope.message.clone().filter(|message| !message.is_empty());
    let text = stated
        .clone()
        .or_else(|| status_message(response.status).map(str::to_string))
        .unwrap_or_default();

    let notification = if envelope.success {
        policy
            .notify_on_success
            .then(|| Notification::success(text))
    } else {
        if stated.is_none() && !text.is_empty() {
            envelope.message = Some(text.clone());
        }
        policy
            .notify_on_failed
            .then(|| Notification::error(response.status, text))
    };

    Ok(Classified {
        envelope,
        notification,
    })
}

/// The envelope for a failed exchange. Carries only `success: false` and the
/// error description.
pub fn transport_failure<T>(err: &RequestError) -> Envelope<T> {
    Envelope::from_error(err)
}
