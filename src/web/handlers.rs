use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use log::{debug, error};
use serde_json::json;
use tera::{Context, Tera};
use uuid::Uuid;

use crate::web::error::ApiError;
use crate::web::models::ChatProxyResponse;
use crate::web::proxy::{parse_request, ChatProxy};
use crate::widget::{EMPTY_REPLY, GREETING, LOADING, NETWORK_APOLOGY, STATUS_APOLOGY};

// Landing page; the widget reads its fixed texts from data attributes
pub async fn index(tera: web::Data<Tera>) -> impl Responder {
    let mut context = Context::new();
    context.insert("greeting", GREETING);
    context.insert("loading", LOADING);
    context.insert("empty_reply", EMPTY_REPLY);
    context.insert("status_apology", STATUS_APOLOGY);
    context.insert("network_apology", NETWORK_APOLOGY);
    match tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Could not render index.html: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// System prompt + history + message, forwarded upstream
pub async fn chat_proxy(
    proxy: web::Data<ChatProxy>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();

    let api_key = proxy.api_key()?;
    let body = body.map_err(|e| {
        error!("[{}] Could not read request body: {}", request_id, e);
        if e.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::MissingMessage
        }
    })?;
    let request = parse_request(&body)?;

    debug!(
        "[{}] Chat request ({} history messages)",
        request_id,
        request.history.len()
    );

    let reply = proxy.reply(request_id, api_key, request).await?;
    Ok(HttpResponse::Ok().json(ChatProxyResponse { reply }))
}

pub async fn method_not_allowed() -> HttpResponse {
    ApiError::MethodNotAllowed.error_response()
}
