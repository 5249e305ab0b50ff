use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppError;
use crate::routes::notification::model::PushEndpoint;

/// 单次投递的HTTP超时，避免挂死的端点拖住整个请求
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 同一用户多端点的并发投递上限
const PUSH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// 推送投递器
///
/// 按端点独立投递，单个端点失败只记录日志，不影响其余端点；
/// 部分成功是常态而非错误
#[derive(Clone)]
pub struct PushDispatcher {
    client: reqwest::Client,
}

impl PushDispatcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build push HTTP client");
        Self { client }
    }

    /// 向某用户的全部注册端点投递，返回成功投递的端点数
    ///
    /// 无端点时直接成功返回，不发起任何外部调用
    pub async fn dispatch(
        &self,
        pool: &PgPool,
        user_id: &str,
        payload: &PushPayload,
    ) -> Result<usize, AppError> {
        let endpoints = PushEndpoint::list_for_user(pool, user_id).await?;
        if endpoints.is_empty() {
            return Ok(0);
        }

        let total = endpoints.len();
        let results: Vec<bool> = stream::iter(endpoints)
            .map(|ep| async move {
                match self.send_one(&ep.endpoint, payload).await {
                    Ok(()) => true,
                    Err(e) => {
                        let expired = e.status().is_some_and(|s| {
                            s == reqwest::StatusCode::NOT_FOUND || s == reqwest::StatusCode::GONE
                        });
                        if expired {
                            tracing::info!(endpoint = %ep.endpoint, "推送订阅已失效，移除端点");
                            if let Err(e) = PushEndpoint::remove(pool, ep.id).await {
                                tracing::warn!(error = %e, "移除失效端点失败");
                            }
                        } else {
                            tracing::warn!(endpoint = %ep.endpoint, error = %e, "推送端点投递失败");
                        }
                        false
                    }
                }
            })
            .buffer_unordered(PUSH_CONCURRENCY)
            .collect()
            .await;

        let delivered = results.into_iter().filter(|ok| *ok).count();
        tracing::debug!(user_id, delivered, total, "推送投递完成");

        Ok(delivered)
    }

    async fn send_one(&self, endpoint: &str, payload: &PushPayload) -> Result<(), reqwest::Error> {
        self.client
            .post(endpoint)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl Default for PushDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_panic() {
        let _dispatcher = PushDispatcher::new();
    }

    #[test]
    fn payload_omits_absent_url() {
        let payload = PushPayload {
            title: "Folks".into(),
            body: "有人关注了你".into(),
            url: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["title"], "Folks");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn payload_includes_url_when_set() {
        let payload = PushPayload {
            title: "Folks".into(),
            body: "新回复".into(),
            url: Some("/post/9".into()),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["url"], "/post/9");
    }
}
