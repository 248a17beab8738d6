//! User Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::User;
use crate::utils::time::now_millis;
use shared::roles::Role;

/// 创建用户所需的全部字段 (handler 层组装)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub cpf: String,
    pub phone: Option<String>,
    pub hashed_password: String,
    pub salt: String,
    pub role: Role,
    pub restaurant_unit: Option<RecordId>,
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = BaseRepository::parse_id(id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM users WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: NewUser) -> RepoResult<User> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                data.email
            )));
        }

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE users SET
                    first_name = $first_name,
                    last_name = $last_name,
                    email = $email,
                    cpf = $cpf,
                    phone = $phone,
                    password = $password,
                    salt = $salt,
                    session_token = NONE,
                    role = $role,
                    restaurant_unit = $unit,
                    orders = [],
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("first_name", data.first_name))
            .bind(("last_name", data.last_name))
            .bind(("email", data.email))
            .bind(("cpf", data.cpf))
            .bind(("phone", data.phone))
            .bind(("password", data.hashed_password))
            .bind(("salt", data.salt))
            .bind(("role", data.role))
            .bind(("unit", data.restaurant_unit))
            .bind(("now", now))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Replace the current session token (None clears it)
    pub async fn set_session_token(
        &self,
        thing: RecordId,
        token: Option<String>,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET session_token = $session_token, updated_at = $now")
            .bind(("thing", thing))
            .bind(("session_token", token))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Record an order in the user's back-reference list (idempotent)
    pub async fn add_order(&self, thing: RecordId, order: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET orders = array::union(orders, [$order]), updated_at = $now")
            .bind(("thing", thing))
            .bind(("order", order))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Drop an order from the user's back-reference list
    pub async fn remove_order(&self, thing: RecordId, order: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET orders -= $order, updated_at = $now")
            .bind(("thing", thing))
            .bind(("order", order))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Bind (or unbind) a user to a unit
    pub async fn set_unit(&self, thing: RecordId, unit: Option<RecordId>) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET restaurant_unit = $unit, updated_at = $now")
            .bind(("thing", thing))
            .bind(("unit", unit))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Unbind every user attached to a unit (unit deletion cascade)
    pub async fn unbind_unit(&self, unit: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE users SET restaurant_unit = NONE, updated_at = $now WHERE restaurant_unit = $unit",
            )
            .bind(("unit", unit))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }
}
