//! 单会话与租户注册语义测试
//!
//! 每个主体只保留最后一次登录的 session_token：
//! 重新登录覆盖旧令牌，登出清空，过期的令牌一律 401。
//! 注册路径上邮箱、商号和 CNPJ 全局唯一。

use std::time::Duration;

use comanda_server::auth::{
    CredentialService, JwtConfig, JwtService, PrincipalKind, resolve_principal,
};
use comanda_server::db::DbService;
use comanda_server::db::models::Restaurant;
use comanda_server::db::repository::{
    RepoError, RestaurantRepository, UserRepository, user::NewUser,
};
use comanda_server::utils::AppError;
use shared::request::RegisterRestaurantRequest;
use shared::roles::Role;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

fn jwt_service() -> JwtService {
    JwtService::with_config(JwtConfig {
        secret: "0123456789abcdef0123456789abcdef".to_string(),
        expiration_minutes: 60,
        issuer: "comanda-server".to_string(),
        audience: "comanda-clients".to_string(),
    })
}

async fn seed_restaurant(db: &Surreal<Db>, creds: &CredentialService) -> Restaurant {
    let salt = creds.generate_salt();
    let hash = creds.hash_password(&salt, "hunter2");
    RestaurantRepository::new(db.clone())
        .create(
            RegisterRestaurantRequest {
                first_name: "Bruno".into(),
                last_name: "Lima".into(),
                cpf: "55566677788".into(),
                email: "bruno@bistro.com".into(),
                password: "hunter2".into(),
                phone: None,
                name: "Bistrô do Bruno".into(),
                cnpj: "98765432000100".into(),
                social_name: None,
                address: None,
                specialty: None,
            },
            hash,
            salt,
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn relogin_invalidates_the_previous_token() {
    let db = DbService::new_in_memory().await.unwrap().db;
    let creds = CredentialService::new("test-secret");
    let jwt = jwt_service();

    let restaurant = seed_restaurant(&db, &creds).await;
    let id = restaurant.id.unwrap().to_string();
    let thing: surrealdb::RecordId = id.parse().unwrap();
    let repo = RestaurantRepository::new(db.clone());

    // 登录校验走哈希比对
    let stored = repo.find_by_email("bruno@bistro.com").await.unwrap().unwrap();
    assert!(creds.verify_password(&stored.salt, "hunter2", &stored.password));
    assert!(!creds.verify_password(&stored.salt, "wrong", &stored.password));

    let token1 = jwt
        .generate_token(&id, "bruno@bistro.com", "restaurant", None)
        .unwrap();
    repo.set_session_token(thing.clone(), Some(token1.clone()))
        .await
        .unwrap();

    let claims1 = jwt.validate_token(&token1).unwrap();
    let principal = resolve_principal(&db, &claims1, &token1).await.unwrap();
    assert_eq!(principal.kind, PrincipalKind::Restaurant);
    assert!(principal.is_admin_context());
    assert_eq!(principal.email, "bruno@bistro.com");

    // iat 前进一秒，保证第二枚令牌与第一枚不同
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let token2 = jwt
        .generate_token(&id, "bruno@bistro.com", "restaurant", None)
        .unwrap();
    assert_ne!(token1, token2);
    repo.set_session_token(thing, Some(token2.clone()))
        .await
        .unwrap();

    // 旧令牌签名仍有效，但会话已被覆盖
    let err = resolve_principal(&db, &claims1, &token1).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));

    let claims2 = jwt.validate_token(&token2).unwrap();
    assert!(resolve_principal(&db, &claims2, &token2).await.is_ok());
}

#[tokio::test]
async fn logout_clears_the_session() {
    let db = DbService::new_in_memory().await.unwrap().db;
    let creds = CredentialService::new("test-secret");
    let jwt = jwt_service();

    let restaurant = seed_restaurant(&db, &creds).await;
    let id = restaurant.id.unwrap().to_string();
    let thing: surrealdb::RecordId = id.parse().unwrap();
    let repo = RestaurantRepository::new(db.clone());

    let token = jwt
        .generate_token(&id, "bruno@bistro.com", "restaurant", None)
        .unwrap();
    repo.set_session_token(thing.clone(), Some(token.clone()))
        .await
        .unwrap();

    let claims = jwt.validate_token(&token).unwrap();
    assert!(resolve_principal(&db, &claims, &token).await.is_ok());

    repo.set_session_token(thing, None).await.unwrap();
    let err = resolve_principal(&db, &claims, &token).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
}

#[tokio::test]
async fn user_principal_carries_role_and_unit() {
    let db = DbService::new_in_memory().await.unwrap().db;
    let creds = CredentialService::new("test-secret");
    let jwt = jwt_service();

    let salt = creds.generate_salt();
    let users = UserRepository::new(db.clone());
    let user = users
        .create(NewUser {
            first_name: "Carla".into(),
            last_name: "Dias".into(),
            email: "carla@bistro.com".into(),
            cpf: "12312312312".into(),
            phone: None,
            hashed_password: creds.hash_password(&salt, "hunter2"),
            salt,
            role: Role::Attendant,
            restaurant_unit: None,
        })
        .await
        .unwrap();
    let id = user.id.unwrap().to_string();
    let thing: surrealdb::RecordId = id.parse().unwrap();

    let token = jwt
        .generate_token(&id, "carla@bistro.com", "user", Some("ATTENDANT"))
        .unwrap();
    users
        .set_session_token(thing, Some(token.clone()))
        .await
        .unwrap();

    let claims = jwt.validate_token(&token).unwrap();
    let principal = resolve_principal(&db, &claims, &token).await.unwrap();
    assert_eq!(principal.kind, PrincipalKind::User);
    assert_eq!(principal.role, Some(Role::Attendant));
    assert!(principal.is_staff());
    assert!(!principal.is_admin_context());
    assert!(principal.satisfies(Role::STAFF));
    assert!(!principal.satisfies(Role::MANAGEMENT));
}

#[tokio::test]
async fn unknown_subject_is_rejected() {
    let db = DbService::new_in_memory().await.unwrap().db;
    let jwt = jwt_service();

    let token = jwt
        .generate_token("restaurants:ghost", "ghost@nowhere.com", "restaurant", None)
        .unwrap();
    let claims = jwt.validate_token(&token).unwrap();
    let err = resolve_principal(&db, &claims, &token).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
}

#[tokio::test]
async fn duplicate_restaurant_name_or_cnpj_is_rejected() {
    let db = DbService::new_in_memory().await.unwrap().db;
    let creds = CredentialService::new("test-secret");
    seed_restaurant(&db, &creds).await;

    let repo = RestaurantRepository::new(db.clone());
    let salt = creds.generate_salt();
    let hash = creds.hash_password(&salt, "hunter2");
    let request = |name: &str, cnpj: &str, email: &str| RegisterRestaurantRequest {
        first_name: "Davi".into(),
        last_name: "Rocha".into(),
        cpf: "99988877766".into(),
        email: email.into(),
        password: "hunter2".into(),
        phone: None,
        name: name.into(),
        cnpj: cnpj.into(),
        social_name: None,
        address: None,
        specialty: None,
    };

    // 商号重复
    let err = repo
        .create(
            request("Bistrô do Bruno", "11111111000111", "davi@outro.com"),
            hash.clone(),
            salt.clone(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));

    // CNPJ 重复
    let err = repo
        .create(
            request("Outro Bistrô", "98765432000100", "davi@outro.com"),
            hash.clone(),
            salt.clone(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));

    // 两者都不同则创建成功
    repo.create(
        request("Outro Bistrô", "11111111000111", "davi@outro.com"),
        hash,
        salt,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn rocksdb_engine_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let db = DbService::new(&tmp.path().join("comanda.db").to_string_lossy())
        .await
        .unwrap()
        .db;

    let creds = CredentialService::new("test-secret");
    let restaurant = seed_restaurant(&db, &creds).await;

    let found = RestaurantRepository::new(db)
        .find_by_email("bruno@bistro.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, restaurant.id);
    assert_eq!(found.name, "Bistrô do Bruno");
}
