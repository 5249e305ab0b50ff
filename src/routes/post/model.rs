use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PostReply {
    pub id: i64,
    pub post_id: i64,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
}

pub fn validate_content(content: &str, max_chars: usize) -> Result<(), String> {
    let len = content.chars().count();
    if len == 0 {
        return Err("内容不能为空".to_string());
    }
    if len > max_chars {
        return Err(format!("内容长度不能超过{}个字符", max_chars));
    }
    Ok(())
}

/// 从正文提取@提及的用户名，去重并保持出现顺序
pub fn extract_mentions(content: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();

    for (i, c) in content.char_indices() {
        if c != '@' {
            continue;
        }
        let rest = &content[i + 1..];
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() && !mentions.contains(&name) {
            mentions.push(name);
        }
    }

    mentions
}

impl Post {
    pub async fn create(
        pool: &PgPool,
        author_id: &str,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, content)
            VALUES ($1, $2)
            RETURNING id, author_id, content, created_at
            "#,
        )
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            "SELECT id, author_id, content, created_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// 点赞，重复点赞不报错，返回是否新建
    pub async fn like(pool: &PgPool, post_id: i64, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl PostReply {
    pub async fn create(
        pool: &PgPool,
        post_id: i64,
        author_id: &str,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PostReply>(
            r#"
            INSERT INTO post_replies (post_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, content, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_rules() {
        assert!(validate_content("你好", 2000).is_ok());
        assert!(validate_content("", 2000).is_err());
        assert!(validate_content(&"x".repeat(2001), 2000).is_err());
    }

    #[test]
    fn mentions_extracted_in_order() {
        let mentions = extract_mentions("cc @alice 和 @bob_7，再@alice一次");
        assert_eq!(mentions, vec!["alice".to_string(), "bob_7".to_string()]);
    }

    #[test]
    fn mention_charset_matches_username_charset() {
        use crate::routes::user::model::validate_username;

        // 注册不了的名字也不会被解析为提及
        assert!(validate_username("小明abc").is_err());
        assert!(extract_mentions("@小明abc 你好").is_empty());

        // 能注册的名字一定能被@到
        assert!(validate_username("bob_7").is_ok());
        assert_eq!(extract_mentions("@bob_7 你好"), vec!["bob_7".to_string()]);
    }

    #[test]
    fn bare_at_is_ignored() {
        assert!(extract_mentions("价格是 100 @ 件").is_empty());
        assert!(extract_mentions("没有提及").is_empty());
    }
}
