//! Database Module
//!
//! 嵌入式 SurrealDB：生产用 RocksDb 引擎，测试用 Mem 引擎。
//! 启动时声明唯一索引 (幂等，重复执行无副作用)。

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDb-backed database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!("Database opened at {}", db_path);
        Self::bootstrap(db).await
    }

    /// In-memory database, used by tests
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::bootstrap(db).await
    }

    async fn bootstrap(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns("comanda")
            .use_db("main")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;
        Ok(Self { db })
    }
}

/// 声明索引
///
/// 邮箱跨角色唯一性由业务层跨两张表检查；这里只保证单表唯一。
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS idx_restaurants_email ON restaurants FIELDS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_restaurants_name ON restaurants FIELDS name UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_restaurants_cnpj ON restaurants FIELDS cnpj UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_users_email ON users FIELDS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_orders_unit_table ON orders FIELDS restaurant_unit, metadata.table_number;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
    Ok(())
}
