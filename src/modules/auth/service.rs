use anyhow::anyhow;
use tracing::{info, instrument, warn};

use coursebook_auth::create_session_token;
use coursebook_config::JwtConfig;
use coursebook_core::{AppError, hash_password, verify_dummy_password, verify_password};
use coursebook_db::Store;
use coursebook_models::{AuthResponse, LoginRequest, RegisterRequest, User};

use crate::metrics;
use crate::middleware::auth::AuthUser;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    /// Creates an account and signs the caller in.
    ///
    /// The verifier is computed before anything is written, so a hashing
    /// failure leaves no partial account behind. A failed email lookup aborts
    /// the registration rather than being treated as "not taken".
    #[instrument(skip(store, jwt_config, dto), fields(email = %dto.email))]
    pub async fn register_user(
        store: &dyn Store,
        jwt_config: &JwtConfig,
        dto: RegisterRequest,
    ) -> Result<AuthResponse, AppError> {
        if store.find_user_by_email(&dto.email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let password_hash = hash_password(&dto.password)?;
        let new_user = dto
            .into_new_user(password_hash)
            .map_err(AppError::unprocessable)?;

        let user = store.create_user(new_user).await?;
        metrics::track_user_registered(user.role);
        info!(user_id = %user.id, role = %user.role, "Account registered");

        Self::issue(jwt_config, user)
    }

    /// Never reveals whether the email or the password was wrong. An unknown
    /// email still pays for a bcrypt verification.
    #[instrument(skip(store, jwt_config, dto), fields(email = %dto.email))]
    pub async fn login_user(
        store: &dyn Store,
        jwt_config: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<AuthResponse, AppError> {
        let Some(stored) = store.find_user_by_email(&dto.email).await? else {
            verify_dummy_password(&dto.password);
            metrics::track_login_failure("unknown_email");
            warn!("Login rejected");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &stored.password_hash)? {
            metrics::track_login_failure("wrong_password");
            warn!(user_id = %stored.user.id, "Login rejected");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        metrics::track_login_success(stored.user.role);
        Self::issue(jwt_config, stored.user)
    }

    #[instrument(skip(store))]
    pub async fn get_profile(store: &dyn Store, auth_user: &AuthUser) -> Result<User, AppError> {
        store
            .find_user_by_id(auth_user.id)
            .await?
            .map(|stored| stored.user)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    fn issue(jwt_config: &JwtConfig, user: User) -> Result<AuthResponse, AppError> {
        let token = create_session_token(user.id, &user.email, user.role, jwt_config)?;
        metrics::track_token_issued();
        Ok(AuthResponse::bearer(token, jwt_config.token_ttl_secs, user))
    }
}
