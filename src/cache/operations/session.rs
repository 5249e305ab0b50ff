use std::sync::Arc;

use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys::{session_key, session_pattern};
use crate::cache::models::session::CachedSession;

/// 会话缓存操作
pub struct SessionCacheOperations;

impl SessionCacheOperations {
    /// 写入会话，带TTL；令牌和缓存条目总是成对创建
    pub async fn store_session(
        redis: &Arc<RedisClient>,
        user_id: &str,
        token: &str,
        client_ip: Option<String>,
        user_agent: Option<String>,
        ttl: u64,
    ) -> Result<CachedSession, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let session = CachedSession {
            user_id: user_id.to_string(),
            issued_at: chrono::Utc::now().timestamp(),
            client_ip,
            user_agent,
        };

        let key = session_key(user_id, token);
        let json = serde_json::to_string(&session).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "序列化错误", e.to_string()))
        })?;

        let _: () = conn.set_ex(key, json, ttl).await?;

        Ok(session)
    }

    /// 获取会话
    pub async fn get_session(
        redis: &Arc<RedisClient>,
        user_id: &str,
        token: &str,
    ) -> Result<Option<CachedSession>, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let key = session_key(user_id, token);
        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(json) => {
                let session = serde_json::from_str(&json).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "反序列化错误",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// 刷新会话TTL，活跃会话不过期，闲置会话到期清除
    pub async fn touch_session(
        redis: &Arc<RedisClient>,
        user_id: &str,
        token: &str,
        ttl: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let key = session_key(user_id, token);
        let _: () = conn.expire(&key, ttl as i64).await?;

        Ok(())
    }

    /// 删除单个会话（登出、认证未命中时的残留清理）
    pub async fn remove_session(
        redis: &Arc<RedisClient>,
        user_id: &str,
        token: &str,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let key = session_key(user_id, token);
        let _: () = conn.del(key).await?;

        Ok(())
    }

    /// 撤销某用户的全部会话（改密、显式吊销）
    pub async fn revoke_user_sessions(
        redis: &Arc<RedisClient>,
        user_id: &str,
    ) -> Result<u64, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let keys: Vec<String> = conn.keys(session_pattern(user_id)).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let removed: u64 = conn.del(keys).await?;

        Ok(removed)
    }
}
