//! 桌台结账全流程测试 (内存数据库)
//!
//! 覆盖订单生命周期、桌台账单聚合、幂等结账请求和双重收款保护。

use comanda_server::db::DbService;
use comanda_server::db::repository::{RestaurantRepository, UnitRepository};
use comanda_server::orders::{CheckoutCoordinator, OrderLifecycle};
use comanda_server::utils::AppError;
use shared::request::{
    CheckoutRequest, CreateOrderRequest, OrderItemInput, OrderPatchRequest, ProcessPaymentRequest,
    RegisterRestaurantRequest,
};
use shared::types::{GuestInfo, OrderStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

struct Fixture {
    db: Surreal<Db>,
    restaurant_id: String,
    unit_id: String,
}

async fn setup() -> Fixture {
    let db = DbService::new_in_memory().await.unwrap().db;

    let restaurant = RestaurantRepository::new(db.clone())
        .create(
            RegisterRestaurantRequest {
                first_name: "Ana".into(),
                last_name: "Souza".into(),
                cpf: "11122233344".into(),
                email: "ana@cantina.com".into(),
                password: "irrelevant".into(),
                phone: None,
                name: "Cantina da Ana".into(),
                cnpj: "12345678000100".into(),
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

    let unit = UnitRepository::new(db.clone())
        .create(
            restaurant_thing.clone(),
            "Cantina Centro".into(),
            "Rua A, 10".into(),
            "11 99999-0000".into(),
            String::new(),
        )
        .await
        .unwrap();

    Fixture {
        db,
        restaurant_id: restaurant_thing.to_string(),
        unit_id: unit.id.unwrap().to_string(),
    }
}

fn guest(name: &str) -> GuestInfo {
    GuestInfo {
        name: name.into(),
        email: None,
        phone: None,
    }
}

fn inline_item(name: &str, price: f64, quantity: i64) -> OrderItemInput {
    OrderItemInput {
        product_id: None,
        name: Some(name.into()),
        price: Some(price),
        quantity: Some(quantity),
    }
}

fn guest_order(unit: &str, table: i64, items: Vec<OrderItemInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: None,
        guest_info: Some(guest("Mesa")),
        restaurant_unit_id: unit.into(),
        items,
        table_number: Some(table),
        order_type: None,
        observations: None,
        split_count: None,
    }
}

#[tokio::test]
async fn order_total_is_sum_of_items() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());

    let order = lifecycle
        .create_order(guest_order(
            &fx.unit_id,
            1,
            vec![inline_item("Burger", 10.0, 2), inline_item("Soda", 2.5, 2)],
        ))
        .await
        .unwrap();

    assert_eq!(order.total, 25.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(!order.is_paid);
    assert!(order.is_guest);

    // 门店的反向引用记录了这笔订单
    let unit = UnitRepository::new(fx.db.clone())
        .find_by_id(&fx.unit_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unit.orders, vec![order.id.unwrap()]);
}

#[tokio::test]
async fn unit_order_board_filters_by_status() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());

    lifecycle
        .create_order(guest_order(&fx.unit_id, 1, vec![inline_item("Tea", 4.0, 1)]))
        .await
        .unwrap();
    let cancelled = lifecycle
        .create_order(guest_order(&fx.unit_id, 2, vec![inline_item("Juice", 6.0, 1)]))
        .await
        .unwrap();
    lifecycle
        .cancel_order(&cancelled.id.unwrap().to_string())
        .await
        .unwrap();

    let all = lifecycle.list_by_unit(&fx.unit_id, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let pending = lifecycle
        .list_by_unit(&fx.unit_id, Some(OrderStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].items[0].name, "Tea");
}

#[tokio::test]
async fn guest_and_user_are_mutually_exclusive() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());

    let mut neither = guest_order(&fx.unit_id, 1, vec![inline_item("Coffee", 5.0, 1)]);
    neither.guest_info = None;
    let err = lifecycle.create_order(neither).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut both = guest_order(&fx.unit_id, 1, vec![inline_item("Coffee", 5.0, 1)]);
    both.user_id = Some("users:nobody".into());
    let err = lifecycle.create_order(both).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn guest_orders_require_a_name() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());

    let mut blank = guest_order(&fx.unit_id, 1, vec![inline_item("Coffee", 5.0, 1)]);
    blank.guest_info = Some(guest(""));
    let err = lifecycle.create_order(blank).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // 纯空白的名字同样无效
    let mut spaces = guest_order(&fx.unit_id, 1, vec![inline_item("Coffee", 5.0, 1)]);
    spaces.guest_info = Some(guest("   "));
    let err = lifecycle.create_order(spaces).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn matrix_unit_rejects_orders() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());

    // 餐厅本体的 ID 被当作门店使用时必须被拦下
    let err = lifecycle
        .create_order(guest_order(
            &fx.restaurant_id,
            1,
            vec![inline_item("Coffee", 5.0, 1)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn items_append_and_total_recomputes() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());

    let order = lifecycle
        .create_order(guest_order(&fx.unit_id, 2, vec![inline_item("Pasta", 30.0, 1)]))
        .await
        .unwrap();
    let id = order.id.unwrap().to_string();

    let updated = lifecycle
        .update_order(
            &id,
            OrderPatchRequest {
                items: Some(vec![inline_item("Wine", 20.0, 1)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.items.len(), 2);
    assert_eq!(updated.total, 50.0);
}

#[tokio::test]
async fn terminal_orders_reject_updates() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());

    let order = lifecycle
        .create_order(guest_order(&fx.unit_id, 3, vec![inline_item("Tea", 4.0, 1)]))
        .await
        .unwrap();
    let id = order.id.unwrap().to_string();

    let cancelled = lifecycle.cancel_order(&id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let err = lifecycle
        .update_order(
            &id,
            OrderPatchRequest {
                observations: Some("too late".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    let err = lifecycle.cancel_order(&id).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn completion_via_is_paid_patch() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());

    let order = lifecycle
        .create_order(guest_order(&fx.unit_id, 4, vec![inline_item("Cake", 12.0, 1)]))
        .await
        .unwrap();
    let id = order.id.unwrap().to_string();

    let paid = lifecycle
        .update_order(
            &id,
            OrderPatchRequest {
                is_paid: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(paid.status, OrderStatus::Completed);
    assert!(paid.is_paid);
    assert!(paid.paid_at.is_some());
}

#[tokio::test]
async fn checkout_then_payment_settles_the_table() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());
    let checkout = CheckoutCoordinator::new(fx.db.clone());

    lifecycle
        .create_order(guest_order(&fx.unit_id, 5, vec![inline_item("Feijoada", 60.0, 1)]))
        .await
        .unwrap();
    lifecycle
        .create_order(guest_order(&fx.unit_id, 5, vec![inline_item("Caipirinha", 15.0, 2)]))
        .await
        .unwrap();

    // 请求结账：两单都转入 payment_requested，按 3 人分账
    let bill = checkout
        .request_checkout(CheckoutRequest {
            restaurant_unit_id: fx.unit_id.clone(),
            table_number: 5,
            split_count: Some(3),
        })
        .await
        .unwrap();

    assert_eq!(bill.orders.len(), 2);
    assert!(bill
        .orders
        .iter()
        .all(|o| o.status == OrderStatus::PaymentRequested));
    assert_eq!(bill.summary.total_amount, 90.0);
    assert_eq!(bill.summary.split_count, 3);
    assert_eq!(bill.summary.amount_per_person, 30.0);
    assert!(bill.summary.payment_requested);

    // 重复请求是幂等的
    let again = checkout
        .request_checkout(CheckoutRequest {
            restaurant_unit_id: fx.unit_id.clone(),
            table_number: 5,
            split_count: None,
        })
        .await
        .unwrap();
    assert_eq!(again.orders.len(), 2);

    let unit = UnitRepository::new(fx.db.clone())
        .find_by_id(&fx.unit_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unit.checkout_requests, vec![5]);

    // 收款：整桌结清
    let summary = checkout
        .process_payment(
            ProcessPaymentRequest {
                restaurant_unit_id: fx.unit_id.clone(),
                table_number: 5,
                payment_method: "card".into(),
                staff_id: None,
                split_count: None,
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(summary.orders_processed, 2);
    assert_eq!(summary.total, 90.0);
    assert_eq!(summary.split_count, 3);
    assert_eq!(summary.amount_per_person, 30.0);

    let unit = UnitRepository::new(fx.db.clone())
        .find_by_id(&fx.unit_id)
        .await
        .unwrap()
        .unwrap();
    assert!(unit.checkout_requests.is_empty());

    // 结清的订单留在桌台视图里，整桌 all_paid
    let settled_view = checkout.table_status(&fx.unit_id, 5).await.unwrap();
    assert_eq!(settled_view.orders.len(), 2);
    assert!(settled_view.summary.all_paid);

    // 双重收款保护：已结清的桌台返回 404
    let err = checkout
        .process_payment(
            ProcessPaymentRequest {
                restaurant_unit_id: fx.unit_id.clone(),
                table_number: 5,
                payment_method: "card".into(),
                staff_id: None,
                split_count: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn settlement_only_touches_its_table() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());
    let checkout = CheckoutCoordinator::new(fx.db.clone());

    lifecycle
        .create_order(guest_order(&fx.unit_id, 7, vec![inline_item("Pizza", 40.0, 1)]))
        .await
        .unwrap();
    let other = lifecycle
        .create_order(guest_order(&fx.unit_id, 8, vec![inline_item("Salad", 18.0, 1)]))
        .await
        .unwrap();

    checkout
        .process_payment(
            ProcessPaymentRequest {
                restaurant_unit_id: fx.unit_id.clone(),
                table_number: 7,
                payment_method: "cash".into(),
                staff_id: None,
                split_count: None,
            },
            None,
        )
        .await
        .unwrap();

    let untouched = lifecycle
        .get_order(&other.id.unwrap().to_string())
        .await
        .unwrap();
    assert_eq!(untouched.status, OrderStatus::Pending);
    assert!(!untouched.is_paid);
}

#[tokio::test]
async fn individually_paid_orders_stay_on_the_table_view() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());
    let checkout = CheckoutCoordinator::new(fx.db.clone());

    let first = lifecycle
        .create_order(guest_order(&fx.unit_id, 11, vec![inline_item("Pizza", 40.0, 1)]))
        .await
        .unwrap();
    let second = lifecycle
        .create_order(guest_order(&fx.unit_id, 11, vec![inline_item("Beer", 10.0, 1)]))
        .await
        .unwrap();

    // 第一单单独买单后仍出现在桌台视图，金额照常计入
    lifecycle
        .update_order(
            &first.id.unwrap().to_string(),
            OrderPatchRequest {
                is_paid: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let status = checkout.table_status(&fx.unit_id, 11).await.unwrap();
    assert_eq!(status.orders.len(), 2);
    assert_eq!(status.summary.total_amount, 50.0);
    assert!(!status.summary.all_paid);

    lifecycle
        .update_order(
            &second.id.unwrap().to_string(),
            OrderPatchRequest {
                is_paid: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let status = checkout.table_status(&fx.unit_id, 11).await.unwrap();
    assert_eq!(status.orders.len(), 2);
    assert!(status.summary.all_paid);
}

#[tokio::test]
async fn cancelled_orders_are_excluded_from_the_bill() {
    let fx = setup().await;
    let lifecycle = OrderLifecycle::new(fx.db.clone());
    let checkout = CheckoutCoordinator::new(fx.db.clone());

    lifecycle
        .create_order(guest_order(&fx.unit_id, 9, vec![inline_item("Steak", 70.0, 1)]))
        .await
        .unwrap();
    let cancelled = lifecycle
        .create_order(guest_order(&fx.unit_id, 9, vec![inline_item("Beer", 10.0, 1)]))
        .await
        .unwrap();
    lifecycle
        .cancel_order(&cancelled.id.unwrap().to_string())
        .await
        .unwrap();

    let status = checkout.table_status(&fx.unit_id, 9).await.unwrap();
    assert_eq!(status.orders.len(), 1);
    assert_eq!(status.summary.total_amount, 70.0);

    let bill = checkout
        .request_checkout(CheckoutRequest {
            restaurant_unit_id: fx.unit_id.clone(),
            table_number: 9,
            split_count: None,
        })
        .await
        .unwrap();
    assert_eq!(bill.orders.len(), 1);
}

#[tokio::test]
async fn checkout_on_empty_table_is_not_found() {
    let fx = setup().await;
    let checkout = CheckoutCoordinator::new(fx.db.clone());

    let err = checkout
        .request_checkout(CheckoutRequest {
            restaurant_unit_id: fx.unit_id.clone(),
            table_number: 42,
            split_count: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
