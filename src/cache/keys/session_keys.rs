/// 会话缓存键前缀
const SESSION_PREFIX: &str = "session:";

/// 会话键由用户ID和令牌共同组成，伪造会话等价于猜中一条活跃键
pub fn session_key(user_id: &str, token: &str) -> String {
    format!("{}{}:{}", SESSION_PREFIX, user_id, token)
}

/// 匹配某用户全部会话的键模式
pub fn session_pattern(user_id: &str) -> String {
    format!("{}{}:*", SESSION_PREFIX, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_embeds_user_and_token() {
        assert_eq!(session_key("42", "abc"), "session:42:abc");
    }

    #[test]
    fn pattern_covers_all_user_sessions() {
        assert_eq!(session_pattern("42"), "session:42:*");
    }
}
