use axum::Json;
use bcrypt::{DEFAULT_COST, hash, verify};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 会话令牌只携带用户ID，不含任何密钥材料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
}

pub fn sign_session_token(
    user_id: &str,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        id: user_id.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// 解码并校验签名。会话生命周期由缓存TTL决定，令牌本身不设过期时间
pub fn decode_session_token(
    token: &str,
    config: &Config,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        ok: true,
        data: Some(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str) -> Config {
        Config {
            database_url: String::new(),
            redis_url: String::new(),
            jwt_secret: secret.to_string(),
            session_ttl_secs: 3600,
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
        }
    }

    #[test]
    fn token_round_trip() {
        let config = test_config("test-secret");
        let token = sign_session_token("42", &config).unwrap();
        let claims = decode_session_token(&token, &config).unwrap();
        assert_eq!(claims.id, "42");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = test_config("test-secret");
        let other = test_config("other-secret");
        let token = sign_session_token("42", &other).unwrap();
        assert!(decode_session_token(&token, &config).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        let config = test_config("test-secret");
        assert!(decode_session_token("abc", &config).is_err());
        assert!(decode_session_token("", &config).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn success_response_shape() {
        let Json(resp) = success_response(serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"]["id"], 1);
    }
}
