//! Restaurant Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Restaurant;
use crate::utils::time::now_millis;
use shared::request::{RegisterRestaurantRequest, RestaurantUpdateRequest};
use shared::types::Address;

#[derive(Clone)]
pub struct RestaurantRepository {
    base: BaseRepository,
}

impl RestaurantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find restaurant by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Restaurant>> {
        let thing = BaseRepository::parse_id(id)?;
        let restaurant: Option<Restaurant> = self.base.db().select(thing).await?;
        Ok(restaurant)
    }

    /// All restaurants, alphabetical (public directory)
    pub async fn find_all(&self) -> RepoResult<Vec<Restaurant>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM restaurants ORDER BY name")
            .await?;
        let restaurants: Vec<Restaurant> = result.take(0)?;
        Ok(restaurants)
    }

    /// Find restaurant by admin email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Restaurant>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM restaurants WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let restaurants: Vec<Restaurant> = result.take(0)?;
        Ok(restaurants.into_iter().next())
    }

    /// Find restaurant by trade name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Restaurant>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM restaurants WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let restaurants: Vec<Restaurant> = result.take(0)?;
        Ok(restaurants.into_iter().next())
    }

    /// Find restaurant by CNPJ
    pub async fn find_by_cnpj(&self, cnpj: &str) -> RepoResult<Option<Restaurant>> {
        let cnpj_owned = cnpj.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM restaurants WHERE cnpj = $cnpj LIMIT 1")
            .bind(("cnpj", cnpj_owned))
            .await?;
        let restaurants: Vec<Restaurant> = result.take(0)?;
        Ok(restaurants.into_iter().next())
    }

    /// Create a new restaurant (tenant + admin account)
    ///
    /// `password` 必须是已哈希的值，`salt` 是对应的账号级 salt。
    /// 邮箱、商号和 CNPJ 全局唯一 (预检 + 唯一索引兜底)。
    pub async fn create(
        &self,
        data: RegisterRestaurantRequest,
        hashed_password: String,
        salt: String,
    ) -> RepoResult<Restaurant> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                data.email
            )));
        }
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Restaurant name '{}' already registered",
                data.name
            )));
        }
        if self.find_by_cnpj(&data.cnpj).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "CNPJ '{}' already registered",
                data.cnpj
            )));
        }

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE restaurants SET
                    first_name = $first_name,
                    last_name = $last_name,
                    cpf = $cpf,
                    email = $email,
                    phone = $phone,
                    password = $password,
                    salt = $salt,
                    session_token = NONE,
                    name = $name,
                    cnpj = $cnpj,
                    social_name = $social_name,
                    address = $address,
                    specialty = $specialty,
                    units = [],
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("first_name", data.first_name))
            .bind(("last_name", data.last_name))
            .bind(("cpf", data.cpf))
            .bind(("email", data.email))
            .bind(("phone", data.phone))
            .bind(("password", hashed_password))
            .bind(("salt", salt))
            .bind(("name", data.name))
            .bind(("cnpj", data.cnpj))
            .bind(("social_name", data.social_name))
            .bind(("address", data.address))
            .bind(("specialty", data.specialty))
            .bind(("now", now))
            .await?;

        let created: Option<Restaurant> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create restaurant".to_string()))
    }

    /// Update restaurant profile fields (partial)
    pub async fn update(
        &self,
        thing: RecordId,
        data: RestaurantUpdateRequest,
    ) -> RepoResult<Restaurant> {
        if let Some(name) = &data.name
            && let Some(existing) = self.find_by_name(name).await?
            && existing.id.as_ref() != Some(&thing)
        {
            return Err(RepoError::Duplicate(format!(
                "Restaurant name '{}' already registered",
                name
            )));
        }
        if let Some(cnpj) = &data.cnpj
            && let Some(existing) = self.find_by_cnpj(cnpj).await?
            && existing.id.as_ref() != Some(&thing)
        {
            return Err(RepoError::Duplicate(format!(
                "CNPJ '{}' already registered",
                cnpj
            )));
        }

        let has_address = data.address.is_some();
        let address: Option<Address> = data.address;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    cnpj = $cnpj OR cnpj,
                    social_name = $social_name OR social_name,
                    address = IF $has_address THEN $address ELSE address END,
                    specialty = $specialty OR specialty,
                    phone = $phone OR phone,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing.clone()))
            .bind(("name", data.name))
            .bind(("cnpj", data.cnpj))
            .bind(("social_name", data.social_name))
            .bind(("has_address", has_address))
            .bind(("address", address))
            .bind(("specialty", data.specialty))
            .bind(("phone", data.phone))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Restaurant>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Restaurant {} not found", thing)))
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

    /// Register a unit under this restaurant
    pub async fn add_unit(&self, thing: RecordId, unit: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE $thing SET units = array::union(units, [$unit]), updated_at = $now",
            )
            .bind(("thing", thing))
            .bind(("unit", unit))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Remove a unit reference
    pub async fn remove_unit(&self, thing: RecordId, unit: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET units -= $unit, updated_at = $now")
            .bind(("thing", thing))
            .bind(("unit", unit))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Hard delete a restaurant with cascade
    ///
    /// 级联语义：门店硬删除，员工解除绑定但保留账号，历史订单保留。
    pub async fn delete_cascade(&self, thing: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"
                UPDATE users SET restaurant_unit = NONE, updated_at = $now
                    WHERE restaurant_unit.restaurant = $thing;
                DELETE restaurant_units WHERE restaurant = $thing;
                DELETE $thing;
                "#,
            )
            .bind(("thing", thing))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }
}
