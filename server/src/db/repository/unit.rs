//! Restaurant Unit Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::RestaurantUnit;
use crate::utils::time::now_millis;
use shared::request::UnitUpdateRequest;

#[derive(Clone)]
pub struct UnitRepository {
    base: BaseRepository,
}

impl UnitRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 解析门店 ID，拒绝指向餐厅本体的矩阵伪门店
    ///
    /// 餐厅本体以 is_matrix=true 投影进门店列表，但它是只读的：
    /// 任何以它为目标的操作都在这里被拦下。
    pub fn parse_unit_id(id: &str) -> RepoResult<RecordId> {
        let thing = BaseRepository::parse_id(id)?;
        if thing.table() == "restaurants" {
            return Err(RepoError::Validation(
                "The matrix unit is read-only".to_string(),
            ));
        }
        if thing.table() != "restaurant_units" {
            return Err(RepoError::Validation(format!("Invalid unit ID: {}", id)));
        }
        Ok(thing)
    }

    /// Find unit by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<RestaurantUnit>> {
        let thing = BaseRepository::parse_id(id)?;
        let unit: Option<RestaurantUnit> = self.base.db().select(thing).await?;
        Ok(unit)
    }

    /// Find all units belonging to a restaurant
    pub async fn find_by_restaurant(&self, restaurant: RecordId) -> RepoResult<Vec<RestaurantUnit>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM restaurant_units WHERE restaurant = $restaurant ORDER BY name")
            .bind(("restaurant", restaurant))
            .await?;
        let units: Vec<RestaurantUnit> = result.take(0)?;
        Ok(units)
    }

    /// Create a new unit under a restaurant
    pub async fn create(
        &self,
        restaurant: RecordId,
        name: String,
        address: String,
        contact: String,
        manager: String,
    ) -> RepoResult<RestaurantUnit> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE restaurant_units SET
                    restaurant = $restaurant,
                    name = $name,
                    address = $address,
                    contact = $contact,
                    manager = $manager,
                    is_active = true,
                    attendants = [],
                    checkout_requests = [],
                    orders = [],
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("restaurant", restaurant))
            .bind(("name", name))
            .bind(("address", address))
            .bind(("contact", contact))
            .bind(("manager", manager))
            .bind(("now", now))
            .await?;

        let created: Option<RestaurantUnit> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create unit".to_string()))
    }

    /// Update unit fields (partial)
    pub async fn update(
        &self,
        thing: RecordId,
        data: UnitUpdateRequest,
    ) -> RepoResult<RestaurantUnit> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    address = $address OR address,
                    contact = $contact OR contact,
                    manager = $manager OR manager,
                    is_active = IF $has_is_active THEN $is_active ELSE is_active END,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing.clone()))
            .bind(("name", data.name))
            .bind(("address", data.address))
            .bind(("contact", data.contact))
            .bind(("manager", data.manager))
            .bind(("has_is_active", data.is_active.is_some()))
            .bind(("is_active", data.is_active))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<RestaurantUnit>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Unit {} not found", thing)))
    }

    /// Attach an attendant to a unit (idempotent)
    pub async fn add_attendant(&self, thing: RecordId, user: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE $thing SET attendants = array::union(attendants, [$user]), updated_at = $now",
            )
            .bind(("thing", thing))
            .bind(("user", user))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Detach an attendant from a unit
    pub async fn remove_attendant(&self, thing: RecordId, user: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET attendants -= $user, updated_at = $now")
            .bind(("thing", thing))
            .bind(("user", user))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Record an order in the unit's back-reference list (idempotent)
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

    /// Drop an order from the unit's back-reference list
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

    /// Mark a table as requesting checkout (idempotent set add)
    pub async fn add_checkout_request(&self, thing: RecordId, table: i64) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE $thing SET checkout_requests = array::union(checkout_requests, [$table]), updated_at = $now",
            )
            .bind(("thing", thing))
            .bind(("table", table))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Clear a table's checkout request (no-op when absent)
    pub async fn remove_checkout_request(&self, thing: RecordId, table: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET checkout_requests -= $table, updated_at = $now")
            .bind(("thing", thing))
            .bind(("table", table))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Hard delete a unit
    pub async fn delete(&self, thing: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(())
    }
}
