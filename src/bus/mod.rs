use std::sync::Arc;

use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};

/// 所有实时事件共用一个发布主题，订阅端按信封内的channel字段分流
pub const SOCKET_TOPIC: &str = "socket";

/// 用户私有频道名
pub fn user_channel(user_id: &str) -> String {
    format!("user:{}", user_id)
}

/// 实时事件信封，data为负载的JSON字符串（二次编码）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub channel: String,
    pub event: String,
    pub data: String,
}

impl EventEnvelope {
    pub fn new<T: Serialize>(
        channel: &str,
        event: &str,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(EventEnvelope {
            channel: channel.to_string(),
            event: event.to_string(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// 事件广播总线，基于Redis pub/sub，发后即忘
///
/// 不提供确认、重试或跨频道顺序保证；发布失败原样返回，由调用方记录
#[derive(Clone)]
pub struct EventBus {
    redis: Arc<RedisClient>,
}

impl EventBus {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    /// 向指定频道广播一个事件
    pub async fn publish<T: Serialize>(
        &self,
        channel: &str,
        event: &str,
        payload: &T,
    ) -> Result<(), redis::RedisError> {
        let envelope = EventEnvelope::new(channel, event, payload).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "序列化错误", e.to_string()))
        })?;
        let message = serde_json::to_string(&envelope).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "序列化错误", e.to_string()))
        })?;

        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.publish(SOCKET_TOPIC, message).await?;

        Ok(())
    }

    /// 向某个用户的私有频道广播
    pub async fn publish_to_user<T: Serialize>(
        &self,
        user_id: &str,
        event: &str,
        payload: &T,
    ) -> Result<(), redis::RedisError> {
        self.publish(&user_channel(user_id), event, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_channel_format() {
        assert_eq!(user_channel("7"), "user:7");
    }

    #[test]
    fn envelope_double_encodes_payload() {
        let payload = serde_json::json!({"id": 1});
        let envelope = EventEnvelope::new("user:7", "new_notification", &payload).unwrap();

        assert_eq!(envelope.channel, "user:7");
        assert_eq!(envelope.event, "new_notification");

        // data解码后应还原出原负载
        let decoded: serde_json::Value = serde_json::from_str(&envelope.data).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn envelope_wire_shape() {
        let envelope = EventEnvelope::new("c", "e", &serde_json::json!({"k": "v"})).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["channel"], "c");
        assert_eq!(json["event"], "e");
        assert!(json["data"].is_string());
    }
}
