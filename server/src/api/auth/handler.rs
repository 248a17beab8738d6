//! Authentication Handlers
//!
//! 统一登录：餐厅管理员存储优先，其次用户存储。
//! 登录成功会覆盖该账号的 `session_token`，旧会话随即失效。

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::AppError;
use crate::auth::{Principal, PrincipalKind};
use crate::core::ServerState;
use crate::db::models::{Restaurant, User};
use crate::db::repository::{
    RestaurantRepository, UnitRepository, UserRepository, user::NewUser,
};
use shared::request::{
    LoginRequest, RegisterClientRequest, RegisterRestaurantRequest, RegisterStaffRequest,
};
use shared::response::{LoginResponse, MessageResponse, PrincipalInfo, UnitSummary};
use shared::roles::Role;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// 同一邮箱不会同时存在于两个存储 (注册时跨表检查)，
/// 所以"餐厅优先"的顺序不会产生歧义。
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()?;
    let db = state.get_db();

    let restaurants = RestaurantRepository::new(db.clone());
    let users = UserRepository::new(db.clone());

    let restaurant = restaurants.find_by_email(&req.email).await?;
    let user = match &restaurant {
        Some(_) => None,
        None => users.find_by_email(&req.email).await?,
    };

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    if let Some(restaurant) = restaurant {
        if !state
            .credentials
            .verify_password(&restaurant.salt, &req.password, &restaurant.password)
        {
            tracing::warn!(email = %req.email, "Login failed - invalid credentials");
            return Err(AppError::invalid_credentials());
        }
        let response = issue_restaurant_session(&state, restaurant).await?;
        return Ok(Json(response));
    }

    let user = user.ok_or_else(|| {
        tracing::warn!(email = %req.email, "Login failed - account not found");
        AppError::invalid_credentials()
    })?;

    if !state
        .credentials
        .verify_password(&user.salt, &req.password, &user.password)
    {
        tracing::warn!(email = %req.email, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let response = issue_user_session(&state, user).await?;
    Ok(Json(response))
}

/// Logout handler — clears the stored session token
pub async fn logout(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<MessageResponse>, AppError> {
    let db = state.get_db();
    match principal.kind {
        PrincipalKind::Restaurant => {
            RestaurantRepository::new(db)
                .set_session_token(principal.id.clone(), None)
                .await?;
        }
        PrincipalKind::User => {
            UserRepository::new(db)
                .set_session_token(principal.id.clone(), None)
                .await?;
        }
    }

    tracing::info!(principal = %principal.id_string(), "Logged out");
    Ok(Json(MessageResponse::new("Logged out")))
}

/// Validate the current session, returning the resolved principal
pub async fn validate(
    Extension(principal): Extension<Principal>,
) -> Result<Json<PrincipalInfo>, AppError> {
    Ok(Json(principal_info(&principal)))
}

/// Register a new restaurant (tenant + admin account), auto-login
pub async fn register_restaurant(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRestaurantRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()?;
    ensure_email_free(&state, &req.email).await?;

    let salt = state.credentials.generate_salt();
    let hashed = state.credentials.hash_password(&salt, &req.password);

    let restaurant = RestaurantRepository::new(state.get_db())
        .create(req, hashed, salt)
        .await?;

    tracing::info!(
        restaurant = restaurant.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        "Restaurant registered"
    );

    let response = issue_restaurant_session(&state, restaurant).await?;
    Ok(Json(response))
}

/// Register a new client account, auto-login
pub async fn register_client(
    State(state): State<ServerState>,
    Json(req): Json<RegisterClientRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()?;
    ensure_email_free(&state, &req.email).await?;

    // 客户可在扫码时绑定门店，绑定的门店必须真实存在
    let unit = match &req.restaurant_unit_id {
        Some(unit_id) => {
            let thing = UnitRepository::parse_unit_id(unit_id)?;
            UnitRepository::new(state.get_db())
                .find_by_id(unit_id)
                .await?
                .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
            Some(thing)
        }
        None => None,
    };

    let salt = state.credentials.generate_salt();
    let hashed = state.credentials.hash_password(&salt, &req.password);

    let user = UserRepository::new(state.get_db())
        .create(NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            cpf: req.cpf,
            phone: req.phone,
            hashed_password: hashed,
            salt,
            role: Role::Client,
            restaurant_unit: unit,
        })
        .await?;

    let response = issue_user_session(&state, user).await?;
    Ok(Json(response))
}

/// Register an attendant bound to a unit (management only)
pub async fn register_attendant(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<RegisterStaffRequest>,
) -> Result<Json<PrincipalInfo>, AppError> {
    create_staff(&state, &principal, req, Role::Attendant).await
}

/// Register a manager bound to a unit (tenant admin only)
pub async fn register_manager(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<RegisterStaffRequest>,
) -> Result<Json<PrincipalInfo>, AppError> {
    if !principal.satisfies(&[Role::Admin]) {
        return Err(AppError::forbidden("Only the tenant admin can create managers"));
    }
    create_staff(&state, &principal, req, Role::Manager).await
}

async fn create_staff(
    state: &ServerState,
    principal: &Principal,
    req: RegisterStaffRequest,
    role: Role,
) -> Result<Json<PrincipalInfo>, AppError> {
    req.validate()?;
    ensure_email_free(state, &req.email).await?;

    let db = state.get_db();
    let units = UnitRepository::new(db.clone());

    let unit_thing = UnitRepository::parse_unit_id(&req.restaurant_unit_id)?;
    let unit = units
        .find_by_id(&req.restaurant_unit_id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;

    // 租户边界：管理员只能操作自己餐厅的门店，经理只能操作自己绑定的门店
    match principal.kind {
        PrincipalKind::Restaurant => {
            if unit.restaurant != principal.id {
                return Err(AppError::forbidden("Unit belongs to another restaurant"));
            }
        }
        PrincipalKind::User => {
            if principal.restaurant_unit.as_ref() != Some(&unit_thing) {
                return Err(AppError::forbidden("You can only manage your own unit"));
            }
        }
    }

    let salt = state.credentials.generate_salt();
    let hashed = state.credentials.hash_password(&salt, &req.password);

    let user = UserRepository::new(db.clone())
        .create(NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            cpf: req.cpf,
            phone: req.phone,
            hashed_password: hashed,
            salt,
            role,
            restaurant_unit: Some(unit_thing.clone()),
        })
        .await?;

    match role {
        Role::Attendant => {
            if let Some(user_id) = user.id.clone() {
                units.add_attendant(unit_thing, user_id).await?;
            }
        }
        Role::Manager => {
            // 门店展示的经理名随新经理更新
            units
                .update(
                    unit_thing,
                    shared::request::UnitUpdateRequest {
                        manager: Some(format!("{} {}", user.first_name, user.last_name)),
                        ..Default::default()
                    },
                )
                .await?;
        }
        _ => {}
    }

    tracing::info!(
        user = user.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        role = role.as_str(),
        "Staff account created"
    );

    Ok(Json(user_info(&user)))
}

// ========== Session helpers ==========

async fn issue_restaurant_session(
    state: &ServerState,
    restaurant: Restaurant,
) -> Result<LoginResponse, AppError> {
    let thing = restaurant
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Restaurant record missing ID"))?;
    let id = thing.to_string();

    let token = state
        .jwt_service
        .generate_token(&id, &restaurant.email, "restaurant", None)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    RestaurantRepository::new(state.get_db())
        .set_session_token(thing, Some(token.clone()))
        .await?;

    tracing::info!(restaurant = %id, "Restaurant admin logged in");

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        token,
        principal: PrincipalInfo {
            id: id.clone(),
            kind: "restaurant".to_string(),
            name: restaurant.name,
            email: restaurant.email,
            role: None,
            restaurant_id: Some(id),
        },
        unit: None,
    })
}

async fn issue_user_session(state: &ServerState, user: User) -> Result<LoginResponse, AppError> {
    let thing = user
        .id
        .clone()
        .ok_or_else(|| AppError::internal("User record missing ID"))?;
    let id = thing.to_string();

    let token = state
        .jwt_service
        .generate_token(&id, &user.email, "user", Some(user.role.as_str()))
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    UserRepository::new(state.get_db())
        .set_session_token(thing, Some(token.clone()))
        .await?;

    // 员工登录时附带其门店摘要
    let unit = match &user.restaurant_unit {
        Some(unit_id) if user.role.is_staff() => UnitRepository::new(state.get_db())
            .find_by_id(&unit_id.to_string())
            .await?
            .map(|u| UnitSummary {
                id: u.id.map(|i| i.to_string()).unwrap_or_default(),
                name: u.name,
            }),
        _ => None,
    };

    tracing::info!(user = %id, role = user.role.as_str(), "User logged in");

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        token,
        principal: user_info(&user),
        unit,
    })
}

fn user_info(user: &User) -> PrincipalInfo {
    PrincipalInfo {
        id: user.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        kind: "user".to_string(),
        name: format!("{} {}", user.first_name, user.last_name),
        email: user.email.clone(),
        role: Some(user.role),
        restaurant_id: None,
    }
}

fn principal_info(principal: &Principal) -> PrincipalInfo {
    PrincipalInfo {
        id: principal.id_string(),
        kind: principal.kind.as_str().to_string(),
        name: principal.display_name.clone(),
        email: principal.email.clone(),
        role: principal.role,
        restaurant_id: match principal.kind {
            PrincipalKind::Restaurant => Some(principal.id_string()),
            PrincipalKind::User => None,
        },
    }
}

/// 邮箱在两个身份存储中都必须未被占用
async fn ensure_email_free(state: &ServerState, email: &str) -> Result<(), AppError> {
    let db = state.get_db();
    if RestaurantRepository::new(db.clone())
        .find_by_email(email)
        .await?
        .is_some()
        || UserRepository::new(db).find_by_email(email).await?.is_some()
    {
        return Err(AppError::conflict(format!(
            "Email '{}' already registered",
            email
        )));
    }
    Ok(())
}
