use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// 管理面板维护的邮箱白名单条目
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct WhitelistEntry {
    pub email: String,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct WhitelistRequest {
    pub email: String,
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let valid = email.len() <= 254
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        });
    if !valid {
        return Err("邮箱格式无效".to_string());
    }
    Ok(())
}

impl WhitelistEntry {
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, WhitelistEntry>(
            "SELECT email, added_by, created_at FROM whitelist ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// 加入白名单，已存在时不报错，返回是否新建
    pub async fn add(pool: &PgPool, email: &str, added_by: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO whitelist (email, added_by)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(email)
        .bind(added_by)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM whitelist WHERE email = $1")
            .bind(email)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert!(validate_email("folks@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@nodot").is_err());
    }
}
