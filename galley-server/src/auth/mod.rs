//! Operator context extraction
//!
//! The coordinator sits behind the venue gateway, which authenticates staff
//! and injects identity headers. Every coordinator call takes the operator
//! context explicitly; there is no ambient request state.
//!
//! | Header | Content |
//! |--------|---------|
//! | x-venue-id | Venue (tenant) id |
//! | x-operator-id | Staff member id |
//! | x-operator-name | Staff display name |
//! | x-operator-role | staff \| manager \| admin |

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::models::Role;
use shared::{AppError, AppResult, ErrorCode};

/// Authenticated operator acting on a venue
#[derive(Debug, Clone)]
pub struct Operator {
    pub venue_id: i64,
    pub operator_id: i64,
    pub operator_name: String,
    pub role: Role,
}

impl Operator {
    /// Fail with `RoleRequired` unless the operator holds at least `required`
    pub fn require_role(&self, required: Role) -> AppResult<()> {
        if self.role.at_least(required) {
            Ok(())
        } else {
            Err(AppError::with_message(
                ErrorCode::RoleRequired,
                format!("{} role required", required.as_str()),
            ))
        }
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)
}

fn header_i64(parts: &Parts, name: &str) -> Result<i64, AppError> {
    header_str(parts, name)?
        .parse()
        .map_err(|_| AppError::not_authenticated())
}

impl<S> FromRequestParts<S> for Operator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let venue_id = header_i64(parts, "x-venue-id")?;
        let operator_id = header_i64(parts, "x-operator-id")?;
        let operator_name = header_str(parts, "x-operator-name")?.to_string();
        let role = Role::parse(header_str(parts, "x-operator-role")?)
            .ok_or_else(AppError::not_authenticated)?;

        Ok(Operator {
            venue_id,
            operator_id,
            operator_name,
            role,
        })
    }
}
