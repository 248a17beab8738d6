//! 商品目录定价测试
//!
//! 引用商品的订单行必须以目录价为准 (价格快照)，
//! 客户端提交的价格被忽略；跨门店和下架商品被拒绝。

use comanda_server::db::DbService;
use comanda_server::db::models::ProductCreate;
use comanda_server::db::repository::{ProductRepository, RestaurantRepository, UnitRepository};
use comanda_server::orders::OrderLifecycle;
use comanda_server::utils::AppError;
use shared::request::{CreateOrderRequest, OrderItemInput, RegisterRestaurantRequest};
use shared::types::GuestInfo;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

async fn setup() -> (Surreal<Db>, RecordId, RecordId) {
    let db = DbService::new_in_memory().await.unwrap().db;

    let restaurant = RestaurantRepository::new(db.clone())
        .create(
            RegisterRestaurantRequest {
                first_name: "Davi".into(),
                last_name: "Rocha".into(),
                cpf: "99988877766".into(),
                email: "davi@churras.com".into(),
                password: "irrelevant".into(),
                phone: None,
                name: "Churras do Davi".into(),
                cnpj: "11222333000100".into(),
                social_name: None,
                address: None,
                specialty: None,
            },
            "hashed".into(),
            "salt".into(),
        )
        .await
        .unwrap();
    let restaurant_thing = restaurant.id.unwrap();

    let units = UnitRepository::new(db.clone());
    let unit_a = units
        .create(
            restaurant_thing.clone(),
            "Matriz".into(),
            "Rua B, 20".into(),
            "11 98888-0000".into(),
            String::new(),
        )
        .await
        .unwrap();
    let unit_b = units
        .create(
            restaurant_thing,
            "Filial".into(),
            "Rua C, 30".into(),
            "11 97777-0000".into(),
            String::new(),
        )
        .await
        .unwrap();

    (db, unit_a.id.unwrap(), unit_b.id.unwrap())
}

fn order_with(unit: &RecordId, item: OrderItemInput) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: None,
        guest_info: Some(GuestInfo {
            name: "Visitante".into(),
            email: None,
            phone: None,
        }),
        restaurant_unit_id: unit.to_string(),
        items: vec![item],
        table_number: Some(1),
        order_type: None,
        observations: None,
        split_count: None,
    }
}

#[tokio::test]
async fn catalog_price_overrides_client_price() {
    let (db, unit_a, _) = setup().await;
    let product = ProductRepository::new(db.clone())
        .create(
            unit_a.clone(),
            ProductCreate {
                name: "Picanha".into(),
                description: None,
                price: 12.5,
                category: Some("grill".into()),
            },
        )
        .await
        .unwrap();

    // 客户端报价 0.01，服务端以目录价 12.5 重定价
    let order = OrderLifecycle::new(db)
        .create_order(order_with(
            &unit_a,
            OrderItemInput {
                product_id: Some(product.id.unwrap().to_string()),
                name: None,
                price: Some(0.01),
                quantity: Some(2),
            },
        ))
        .await
        .unwrap();

    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Picanha");
    assert_eq!(order.items[0].price, 12.5);
    assert_eq!(order.total, 25.0);
}

#[tokio::test]
async fn product_from_another_unit_is_rejected() {
    let (db, unit_a, unit_b) = setup().await;
    let product = ProductRepository::new(db.clone())
        .create(
            unit_b,
            ProductCreate {
                name: "Farofa".into(),
                description: None,
                price: 8.0,
                category: None,
            },
        )
        .await
        .unwrap();

    let err = OrderLifecycle::new(db)
        .create_order(order_with(
            &unit_a,
            OrderItemInput {
                product_id: Some(product.id.unwrap().to_string()),
                name: None,
                price: None,
                quantity: None,
            },
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn unavailable_product_is_rejected() {
    let (db, unit_a, _) = setup().await;
    let product = ProductRepository::new(db.clone())
        .create(
            unit_a.clone(),
            ProductCreate {
                name: "Costela".into(),
                description: None,
                price: 45.0,
                category: None,
            },
        )
        .await
        .unwrap();
    let product_thing = product.id.unwrap();

    db.query("UPDATE $thing SET is_available = false")
        .bind(("thing", product_thing.clone()))
        .await
        .unwrap();

    let err = OrderLifecycle::new(db.clone())
        .create_order(order_with(
            &unit_a,
            OrderItemInput {
                product_id: Some(product_thing.to_string()),
                name: None,
                price: None,
                quantity: None,
            },
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // 下架商品也不出现在公开目录里
    let listed = ProductRepository::new(db)
        .find_by_unit(unit_a)
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn removed_product_cannot_be_ordered() {
    let (db, unit_a, _) = setup().await;
    let products = ProductRepository::new(db.clone());
    let product = products
        .create(
            unit_a.clone(),
            ProductCreate {
                name: "Maminha".into(),
                description: None,
                price: 38.0,
                category: None,
            },
        )
        .await
        .unwrap();
    let product_thing = product.id.unwrap();

    products.delete(product_thing.clone()).await.unwrap();

    let err = OrderLifecycle::new(db.clone())
        .create_order(order_with(
            &unit_a,
            OrderItemInput {
                product_id: Some(product_thing.to_string()),
                name: None,
                price: None,
                quantity: None,
            },
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let listed = products.find_by_unit(unit_a).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn inline_item_requires_name_and_price() {
    let (db, unit_a, _) = setup().await;
    let lifecycle = OrderLifecycle::new(db);

    let err = lifecycle
        .create_order(order_with(
            &unit_a,
            OrderItemInput {
                product_id: None,
                name: Some("Refrigerante".into()),
                price: None,
                quantity: None,
            },
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = lifecycle
        .create_order(order_with(
            &unit_a,
            OrderItemInput {
                product_id: None,
                name: Some("Refrigerante".into()),
                price: Some(-1.0),
                quantity: None,
            },
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
