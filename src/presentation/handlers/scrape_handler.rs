// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::extract::{rejection::JsonRejection, Extension, Json};
use std::sync::Arc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::{
    application::dto::scrape_request::ScrapeRequestDto,
    domain::models::job::AggregateReport,
    domain::services::dispatcher::{DispatchError, RequestDispatcher},
    presentation::errors::AppError,
};

/// 处理职位抓取请求
///
/// 请求体无法解析与缺少参数一样按校验错误处理。整个请求在一个带请求 ID 的 span 中执行。
pub async fn scrape_jobs(
    Extension(dispatcher): Extension<Arc<RequestDispatcher>>,
    payload: Result<Json<ScrapeRequestDto>, JsonRejection>,
) -> Result<Json<AggregateReport>, AppError> {
    let span = info_span!("scrape", request_id = %Uuid::new_v4());

    async move {
        let Json(dto) =
            payload.map_err(|rejection| DispatchError::Validation(rejection.body_text()))?;
        let request = dto.into_request()?;
        let report = dispatcher.dispatch(request).await?;
        Ok::<_, AppError>(Json(report))
    }
    .instrument(span)
    .await
}
