//! Product Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate};
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing = BaseRepository::parse_id(id)?;
        let product: Option<Product> = self.base.db().select(thing).await?;
        Ok(product)
    }

    /// All available products of a unit
    pub async fn find_by_unit(&self, unit: RecordId) -> RepoResult<Vec<Product>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM products WHERE restaurant_unit = $unit AND is_available = true ORDER BY name",
            )
            .bind(("unit", unit))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products)
    }

    /// Create a new product under a unit
    pub async fn create(&self, unit: RecordId, data: ProductCreate) -> RepoResult<Product> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE products SET
                    restaurant_unit = $unit,
                    name = $name,
                    description = $description,
                    price = $price,
                    category = $category,
                    is_available = true,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("unit", unit))
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("price", data.price))
            .bind(("category", data.category))
            .bind(("now", now))
            .await?;

        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Hard delete a product
    pub async fn delete(&self, thing: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(())
    }
}
