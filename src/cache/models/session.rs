use serde::{Deserialize, Serialize};

/// 会话缓存数据模型
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedSession {
    pub user_id: String,
    pub issued_at: i64, // Unix timestamp
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}
