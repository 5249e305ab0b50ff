use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// 路线图条目状态的闭集
pub const ROADMAP_STATUSES: [&str; 4] = ["suggested", "planned", "in-progress", "done"];

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RoadmapItem {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub status: String,
    pub suggested_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<String>,
}

pub fn validate_title(title: &str) -> Result<(), String> {
    let len = title.chars().count();
    if len < 4 || len > 80 {
        return Err("标题长度必须在4到80个字符之间".to_string());
    }
    Ok(())
}

pub fn validate_body(body: &str) -> Result<(), String> {
    if body.chars().count() > 2000 {
        return Err("描述长度不能超过2000个字符".to_string());
    }
    Ok(())
}

pub fn validate_status(status: &str) -> Result<(), String> {
    if !ROADMAP_STATUSES.contains(&status) {
        return Err(format!("状态无效，允许的取值：{}", ROADMAP_STATUSES.join("、")));
    }
    Ok(())
}

impl RoadmapItem {
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoadmapItem>(
            r#"
            SELECT id, title, body, status, suggested_by, created_at
            FROM roadmap_items
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn suggest(
        pool: &PgPool,
        user_id: &str,
        req: &SuggestRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, RoadmapItem>(
            r#"
            INSERT INTO roadmap_items (title, body, status, suggested_by)
            VALUES ($1, $2, 'suggested', $3)
            RETURNING id, title, body, status, suggested_by, created_at
            "#,
        )
        .bind(&req.title)
        .bind(&req.body)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// 部分字段更新，未给出的字段保持原值；条目不存在时返回None
    pub async fn edit(
        pool: &PgPool,
        id: i64,
        req: &EditRequest,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RoadmapItem>(
            r#"
            UPDATE roadmap_items
            SET title = COALESCE($2, title),
                body = COALESCE($3, body),
                status = COALESCE($4, status)
            WHERE id = $1
            RETURNING id, title, body, status, suggested_by, created_at
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.body)
        .bind(&req.status)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_rules() {
        assert!(validate_title("深色模式支持").is_ok());
        assert!(validate_title("短").is_err());
        assert!(validate_title(&"长".repeat(81)).is_err());
    }

    #[test]
    fn status_closed_set() {
        assert!(validate_status("planned").is_ok());
        assert!(validate_status("in-progress").is_ok());
        assert!(validate_status("shipped").is_err());
    }
}
