use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::notify::NotificationKind;

/// 持久化的通知记录，只会被标记已读，正常流程中从不硬删除
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub kind: String,
    pub user_id: String,
    pub actor: String,
    pub read: bool,
    pub post_id: Option<i64>,
    pub reply_id: Option<i64>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// 客户端注册的推送端点
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PushEndpoint {
    pub id: i64,
    pub user_id: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: PushKeys,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

pub fn validate_endpoint(endpoint: &str) -> Result<(), String> {
    if !endpoint.starts_with("https://") {
        return Err("推送端点必须是https地址".to_string());
    }
    if endpoint.len() > 2048 {
        return Err("推送端点地址过长".to_string());
    }
    Ok(())
}

impl Notification {
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        actor: &str,
        kind: &NotificationKind,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (kind, user_id, actor, "read", post_id, reply_id, message)
            VALUES ($1, $2, $3, false, $4, $5, $6)
            RETURNING id, kind, user_id, actor, "read", post_id, reply_id, message, created_at
            "#,
        )
        .bind(kind.as_str())
        .bind(user_id)
        .bind(actor)
        .bind(kind.post_id())
        .bind(kind.reply_id())
        .bind(kind.message(actor))
        .fetch_one(pool)
        .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, kind, user_id, actor, "read", post_id, reply_id, message, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY "read" ASC, created_at DESC
            LIMIT 100
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// 只能标记自己的通知，返回是否命中
    pub async fn mark_read(pool: &PgPool, id: i64, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE notifications SET "read" = true WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_read(pool: &PgPool, user_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE notifications SET "read" = true WHERE user_id = $1 AND "read" = false"#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

impl PushEndpoint {
    /// 注册端点；同一端点重复注册时归属到最后一次注册的用户
    pub async fn register(
        pool: &PgPool,
        user_id: &str,
        req: &SubscribeRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PushEndpoint>(
            r#"
            INSERT INTO push_endpoints (user_id, endpoint, p256dh, auth)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (endpoint) DO UPDATE
                SET user_id = EXCLUDED.user_id,
                    p256dh = EXCLUDED.p256dh,
                    auth = EXCLUDED.auth
            RETURNING id, user_id, endpoint, p256dh, auth, created_at
            "#,
        )
        .bind(user_id)
        .bind(&req.endpoint)
        .bind(&req.keys.p256dh)
        .bind(&req.keys.auth)
        .fetch_one(pool)
        .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PushEndpoint>(
            r#"
            SELECT id, user_id, endpoint, p256dh, auth, created_at
            FROM push_endpoints
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn remove(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM push_endpoints WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn remove_by_endpoint(
        pool: &PgPool,
        user_id: &str,
        endpoint: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM push_endpoints WHERE user_id = $1 AND endpoint = $2")
            .bind(user_id)
            .bind(endpoint)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_must_be_https() {
        assert!(validate_endpoint("https://push.example.com/sub/abc").is_ok());
        assert!(validate_endpoint("http://push.example.com/sub/abc").is_err());
        assert!(validate_endpoint("not-a-url").is_err());
    }

    #[test]
    fn endpoint_length_bounded() {
        let long = format!("https://push.example.com/{}", "x".repeat(2048));
        assert!(validate_endpoint(&long).is_err());
    }
}
