//! Form extraction accepting urlencoded and multipart bodies

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::server::api::ErrorResponse;

/// Form fields of `POST /translate/`
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateForm {
    pub text: String,
    pub language: String,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn missing_field(name: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            detail: format!("Missing form field '{}'", name),
        }),
    )
        .into_response()
}

impl TranslateForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, Response> {
        let mut text = None;
        let mut language = None;

        while let Some(field) = multipart.next_field().await.map_err(IntoResponse::into_response)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("text") => text = Some(field.text().await.map_err(IntoResponse::into_response)?),
                Some("language") => {
                    language = Some(field.text().await.map_err(IntoResponse::into_response)?)
                }
                _ => {}
            }
        }

        Ok(Self {
            text: text.ok_or_else(|| missing_field("text"))?,
            language: language.ok_or_else(|| missing_field("language"))?,
        })
    }
}

#[async_trait]
impl<S> FromRequest<S> for TranslateForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Self::from_multipart(multipart).await
        } else {
            let Form(form) = Form::<TranslateForm>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(form)
        }
    }
}
