//! 认证中间件
//!
//! 为 JWT 认证和角色授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::roles::Role;

use crate::AppError;
use crate::auth::{JwtService, Principal, resolve_principal};
use crate::core::ServerState;
use crate::security_log;

/// 认证中间件 - 要求已登录的有效会话
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 再回库核对 `session_token` (单会话语义)。
/// 验证成功后将 [`Principal`] 注入请求扩展。
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 / 会话失效 | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.to_string());

    let header = match auth_header {
        Some(h) => h,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::Unauthorized);
        }
    };

    let token = JwtService::extract_from_header(&header).ok_or(AppError::InvalidToken)?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = format!("{}", e),
            uri = format!("{:?}", req.uri())
        );
        match e {
            crate::auth::JwtError::ExpiredToken => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    })?;

    // 会话核对：令牌必须仍是该账号的当前会话
    let principal = resolve_principal(&state.db, &claims, token).await.map_err(|e| {
        security_log!(
            "WARN",
            "session_invalid",
            subject = claims.sub.clone(),
            uri = format!("{:?}", req.uri())
        );
        e
    })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// 角色检查中间件 - 要求指定角色之一
///
/// 餐厅管理员上下文恒通过 (对自己租户拥有全部权限)。
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/orders/process-payment", post(handler::process_payment))
///     .layer(middleware::from_fn(require_role(Role::STAFF)))
///     .layer(middleware::from_fn_with_state(state, require_auth));
/// ```
///
/// # 错误
///
/// 角色不符返回 403 Forbidden
pub fn require_role(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let principal = req
                .extensions()
                .get::<Principal>()
                .ok_or(AppError::Unauthorized)?;

            if !principal.satisfies(roles) {
                security_log!(
                    "WARN",
                    "role_denied",
                    principal = principal.id_string(),
                    role = format!("{:?}", principal.role),
                    required = format!("{:?}", roles)
                );
                return Err(AppError::forbidden("Insufficient role"));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 员工中间件 - 要求 staff 角色或管理员上下文
///
/// # 错误
///
/// 非员工返回 403 Forbidden
pub async fn require_staff(req: Request, next: Next) -> Result<Response, AppError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or(AppError::Unauthorized)?;

    if !principal.is_staff() {
        security_log!(
            "WARN",
            "staff_required",
            principal = principal.id_string(),
            role = format!("{:?}", principal.role)
        );
        return Err(AppError::forbidden("Staff access required"));
    }

    Ok(next.run(req).await)
}
