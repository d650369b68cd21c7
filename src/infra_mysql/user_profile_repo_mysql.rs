use super::util::is_dup_key;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

pub struct MySqlUserProfileRepo {
    pool: MySqlPool,
}

impl MySqlUserProfileRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserProfileRepo { pool }
    }
}

#[async_trait::async_trait]
impl UserProfileRepo for MySqlUserProfileRepo {
    async fn find_by_subject(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, ProfileStoreError> {
        let row = sqlx::query(
            r#"
SELECT subject, email, name, nickname, given_name, family_name, picture, last_login
FROM user_profile
WHERE subject = ?
"#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProfileStoreError::Store(format!("query profile: {e}")))?;

        Ok(row.map(|row| UserProfile {
            user_id: UserId(row.get::<String, _>("subject")),
            email: row.get("email"),
            name: row.get("name"),
            nickname: row.get("nickname"),
            given_name: row.get("given_name"),
            family_name: row.get("family_name"),
            picture: row.get("picture"),
            last_login: row.get::<DateTime<Utc>, _>("last_login"),
        }))
    }

    async fn insert(&self, profile: &UserProfile) -> Result<(), ProfileStoreError> {
        sqlx::query(
            r#"
INSERT INTO user_profile
    (subject, email, name, nickname, given_name, family_name, picture, last_login)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(profile.user_id.as_str())
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.nickname)
        .bind(&profile.given_name)
        .bind(&profile.family_name)
        .bind(&profile.picture)
        .bind(profile.last_login)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                ProfileStoreError::Duplicate
            } else {
                ProfileStoreError::Store(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn touch_last_login(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ProfileStoreError> {
        sqlx::query("UPDATE user_profile SET last_login = ? WHERE subject = ?")
            .bind(at)
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| ProfileStoreError::Store(format!("update last_login: {e}")))?;

        Ok(())
    }
}
