use axum::{response::{Response, IntoResponse}};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::models::user::Role;
use crate::state::AppState;
use serde::Serialize;

/// Caller identity and capability, passed explicitly into every service operation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: Role,
    pub username: String,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self, action: &str) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Only admins can {action}")))
        }
    }

    /// Admins act for anyone; drivers only for themselves.
    pub fn require_self_or_admin(&self, driver_id: i64, action: &str) -> Result<(), AppError> {
        if self.is_admin() || self.user_id == driver_id {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Drivers can only {action} for themselves")))
        }
    }
}

#[derive(Serialize)]
struct ErrorBody { error: String, code: &'static str }

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = match req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return unauthorized("Missing Authorization header"),
    };

    // Expect "Bearer <token>"
    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return unauthorized("Invalid Authorization format"),
    };

    let claims = match verify_token(token, &state.config.jwt_secret) {
        Ok(c) => c,
        Err(e) => return unauthorized(&e.to_string()),
    };

    req.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        role: claims.role,
        username: claims.username,
    });

    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string(), code: "unauthorized" });
    (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(user_id: i64, role: Role) -> AuthContext {
        AuthContext { user_id, role, username: "someone".into() }
    }

    #[test]
    fn drivers_act_only_for_themselves() {
        assert!(ctx(5, Role::Driver).require_self_or_admin(5, "submit handovers").is_ok());
        let err = ctx(5, Role::Driver).require_self_or_admin(6, "submit handovers").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn admins_pass_every_check() {
        let admin = ctx(1, Role::Admin);
        assert!(admin.require_admin("verify handovers").is_ok());
        assert!(admin.require_self_or_admin(99, "view summaries").is_ok());
    }

    #[test]
    fn drivers_are_not_admins() {
        assert!(ctx(5, Role::Driver).require_admin("verify handovers").is_err());
    }
}
