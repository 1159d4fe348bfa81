use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::token::{AccessClaims, RefreshClaims, TokenUser};
use crate::models::user::Role;
use crate::service::cookies::{ACCESS_COOKIE, CookieSessionManager, REFRESH_COOKIE};

/// The caller identity resolved by the authentication gate and attached to
/// request context.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn token_user(&self) -> TokenUser {
        TokenUser {
            user_id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

impl From<TokenUser> for CurrentUser {
    fn from(user: TokenUser) -> Self {
        Self {
            id: user.user_id,
            name: user.name,
            role: user.role,
        }
    }
}

fn reject<T>() -> RequestOutcome<T, AppError> {
    Outcome::Error((Status::Unauthorized, AppError::AuthenticationFailed))
}

/// Per-request authentication gate.
///
/// A request moves through at most three states: a valid access cookie
/// resolves immediately; otherwise a refresh cookie whose embedded secret
/// matches the persisted session re-mints both cookies against the existing
/// secret; anything else is rejected. Every rejection path produces the same
/// 401 so a caller cannot tell which check failed.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(manager) = req.rocket().state::<CookieSessionManager>() else {
            return Outcome::Error((Status::InternalServerError, AppError::AuthenticationFailed));
        };

        let jar = req.cookies();

        if let Some(cookie) = jar.get_private(ACCESS_COOKIE)
            && let Ok(claims) = manager.codec().verify::<AccessClaims>(cookie.value())
        {
            let current_user = CurrentUser::from(claims.user);
            req.local_cache(|| Some(current_user.clone()));
            return Outcome::Success(current_user);
        }

        let Some(cookie) = jar.get_private(REFRESH_COOKIE) else {
            return reject();
        };
        let Ok(claims) = manager.codec().verify::<RefreshClaims>(cookie.value()) else {
            return reject();
        };

        let Some(pool) = req.rocket().state::<PgPool>() else {
            return Outcome::Error((Status::InternalServerError, AppError::AuthenticationFailed));
        };
        let repo = PostgresRepository { pool: pool.clone() };

        // A present, valid session row whose secret matches the token is the
        // server-side half of the refresh contract; its absence revokes the
        // token regardless of the signature.
        let session = match repo.find_session_by_user(&claims.user.user_id).await {
            Ok(Some(session)) if session.is_valid && session.secret == claims.refresh_secret => session,
            Ok(_) => return reject(),
            Err(_) => return reject(),
        };

        // Re-issue both cookies bound to the existing stored secret; the
        // secret itself is not rotated.
        let Ok((access, refresh)) = manager.issue(&claims.user, &session.secret) else {
            return reject();
        };
        manager.attach(jar, access, refresh);

        tracing::debug!(user_id = %claims.user.user_id, "access token re-minted from refresh session");

        let current_user = CurrentUser::from(claims.user);
        req.local_cache(|| Some(current_user.clone()));
        Outcome::Success(current_user)
    }
}

/// Authorization checks evaluated against the gate-resolved identity.
#[derive(Debug, Clone, Copy)]
pub enum Permission<'a> {
    /// Caller must hold the admin role.
    Admin,
    /// Caller must own the resource, or be an admin.
    SelfOwned(Uuid),
    /// Caller's role must be one of the listed roles.
    RoleIn(&'a [Role]),
}

impl Permission<'_> {
    pub fn check(&self, user: &CurrentUser) -> Result<(), AppError> {
        match self {
            Permission::Admin => {
                if user.role == Role::Admin {
                    Ok(())
                } else {
                    Err(AppError::Forbidden)
                }
            }
            Permission::RoleIn(roles) => {
                if roles.contains(&user.role) {
                    Ok(())
                } else {
                    Err(AppError::Forbidden)
                }
            }
            Permission::SelfOwned(owner_id) => {
                if user.role == Role::Admin || user.id == *owner_id {
                    Ok(())
                } else {
                    Err(AppError::NotAuthorized)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(id: Uuid, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            name: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn role_in_passes_members_and_rejects_others() {
        let admin = user(Uuid::new_v4(), Role::Admin);
        let regular = user(Uuid::new_v4(), Role::User);

        assert!(Permission::RoleIn(&[Role::Admin]).check(&admin).is_ok());
        assert!(matches!(
            Permission::RoleIn(&[Role::Admin]).check(&regular),
            Err(AppError::Forbidden)
        ));
        assert!(Permission::RoleIn(&[Role::Admin, Role::User]).check(&regular).is_ok());
    }

    #[test]
    fn admin_permission_mirrors_role_in_admin() {
        let admin = user(Uuid::new_v4(), Role::Admin);
        let regular = user(Uuid::new_v4(), Role::User);
        assert!(Permission::Admin.check(&admin).is_ok());
        assert!(Permission::Admin.check(&regular).is_err());
    }

    #[test]
    fn ownership_failure_is_a_401_not_a_403() {
        let regular = user(Uuid::new_v4(), Role::User);
        let err = Permission::SelfOwned(Uuid::new_v4()).check(&regular).unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized));
    }

    proptest! {
        /// Admins pass for any owner; non-admins pass exactly when they own
        /// the resource.
        #[test]
        fn self_owned_holds_for_all_identity_owner_pairs(
            caller in any::<u128>().prop_map(Uuid::from_u128),
            owner in any::<u128>().prop_map(Uuid::from_u128),
            is_admin in any::<bool>(),
        ) {
            let role = if is_admin { Role::Admin } else { Role::User };
            let identity = user(caller, role);
            let allowed = Permission::SelfOwned(owner).check(&identity).is_ok();
            prop_assert_eq!(allowed, is_admin || caller == owner);

            // Owning your own id always passes regardless of role.
            let identity = user(caller, role);
            prop_assert!(Permission::SelfOwned(caller).check(&identity).is_ok());
        }
    }
}
