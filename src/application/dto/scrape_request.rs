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

use crate::domain::models::job::ScrapeRequest;
use crate::domain::services::dispatcher::DispatchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::Validate;

/// 职位抓取请求数据传输对象
///
/// 所有字段在反序列化阶段都是可选的，缺失与空值统一由校验报告
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequestDto {
    /// 职位名称
    #[validate(required, length(min = 1))]
    pub job_title: Option<String>,
    /// 地点
    #[validate(required, length(min = 1))]
    pub location: Option<String>,
    /// 目标国家代码列表
    #[validate(required, length(min = 1))]
    pub countries: Option<Vec<String>>,
    /// 搜索过滤参数，原样透传
    pub filters: Option<BTreeMap<String, Value>>,
}

impl ScrapeRequestDto {
    /// 校验并转换为领域请求
    ///
    /// 过滤参数中字符串原样保留，数字和布尔值转为字符串，null 被忽略
    pub fn into_request(self) -> Result<ScrapeRequest, DispatchError> {
        self.validate()
            .map_err(|e| DispatchError::Validation(e.to_string()))?;

        let missing = |field: &str| {
            DispatchError::Validation(format!("missing required parameter `{}`", field))
        };
        let job_title = self.job_title.ok_or_else(|| missing("jobTitle"))?;
        let location = self.location.ok_or_else(|| missing("location"))?;
        let countries = self.countries.ok_or_else(|| missing("countries"))?;

        let mut request = ScrapeRequest::new(job_title, location, countries);
        for (key, value) in self.filters.unwrap_or_default() {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            };
            request = request.with_filter(key, value);
        }

        Ok(request)
    }
}
