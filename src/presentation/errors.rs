// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::services::dispatcher::DispatchError;

/// 校验失败时返回给客户端的固定消息
pub const MISSING_PARAMETERS: &str = "Missing required parameters";
/// 意外错误时返回给客户端的固定消息
pub const SCRAPE_FAILED: &str = "An error occurred while scraping jobs";

/// 应用错误类型
///
/// 封装所有可能的应用层错误。内部细节只写入日志，客户端只看到固定消息。
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.downcast_ref::<DispatchError>() {
            Some(DispatchError::Validation(reason)) => {
                warn!("Rejected scrape request: {}", reason);
                (StatusCode::BAD_REQUEST, MISSING_PARAMETERS)
            }
            _ => {
                error!("Error in scraping process: {:#}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, SCRAPE_FAILED)
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
