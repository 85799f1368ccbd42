use crate::{
    database::SheetStore,
    models::{AuthenticatedUser, UserRecord},
    services::data_service,
    utils::error::{AppError, AppResult},
};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub type RegisterRequest = LoginRequest;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub admin: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub message: String,
    pub user: AuthenticatedUser,
}

fn required_credentials(request: &LoginRequest) -> AppResult<(String, String)> {
    match (request.email.as_deref(), request.password.as_deref()) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email.to_string(), password.to_string()))
        }
        _ => Err(AppError::InvalidRequest(
            "Email and password are required".to_string(),
        )),
    }
}

fn is_bcrypt_hash(stored: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|p| stored.starts_with(p))
}

/// Plain comparison, or bcrypt verification for hashed rows.
fn password_matches(candidate: &str, stored: &str) -> AppResult<bool> {
    if is_bcrypt_hash(stored) {
        verify(candidate, stored)
            .map_err(|e| AppError::Storage(format!("Password verification error: {}", e)))
    } else {
        Ok(candidate == stored)
    }
}

// User login
pub async fn login(store: &SheetStore, request: &LoginRequest) -> AppResult<LoginResponse> {
    let (email, password) = required_credentials(request)?;

    let store = store.clone();
    tokio::task::spawn_blocking(move || -> AppResult<LoginResponse> {
        let user = store
            .find_user(&email)?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        if !password_matches(&password, &user.password)? {
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        Ok(LoginResponse {
            access_token: user.email.clone(),
            admin: user.is_admin(),
        })
    })
    .await?
}

// User registration
pub async fn register(
    store: &SheetStore,
    request: &RegisterRequest,
    hash_passwords: bool,
) -> AppResult<RegisterResponse> {
    let (email, password) = required_credentials(request)?;

    let blocking_store = store.clone();
    let new_email = email.clone();
    tokio::task::spawn_blocking(move || -> AppResult<()> {
        let stored_password = if hash_passwords {
            hash(&password, DEFAULT_COST)
                .map_err(|e| AppError::Storage(format!("Failed to hash password: {}", e)))?
        } else {
            password
        };
        blocking_store.insert_user(UserRecord::new(new_email, stored_password))
    })
    .await??;

    // The account exists even if its dashboard sheet could not be written
    if let Err(e) = data_service::create_user_data(store, &email).await {
        log::warn!("⚠️  Could not create data sheet for {}: {}", email, e);
    }

    log::info!("✅ User registered successfully: {}", email);

    Ok(RegisterResponse {
        access_token: email,
    })
}

/// Resolves the raw `Authorization` value to a user.
pub async fn authenticate(store: &SheetStore, token: &str) -> AppResult<AuthenticatedUser> {
    let store = store.clone();
    let token = token.to_string();
    tokio::task::spawn_blocking(move || -> AppResult<AuthenticatedUser> {
        store
            .find_user(&token)?
            .map(|user| AuthenticatedUser::from(&user))
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_store;

    fn credentials(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[actix_web::test]
    async fn test_register_then_login() {
        let (_dir, store) = test_store();

        let registered = register(&store, &credentials("a@b.com", "secret"), false)
            .await
            .unwrap();
        assert_eq!(registered.access_token, "a@b.com");

        let logged_in = login(&store, &credentials("a@b.com", "secret")).await.unwrap();
        assert_eq!(logged_in.access_token, "a@b.com");
        assert!(!logged_in.admin);

        // Dashboard sheet is created alongside the account
        assert!(store.read_sheet("a@b.com").unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_login_rejects_wrong_password_and_unknown_user() {
        let (_dir, store) = test_store();
        register(&store, &credentials("a@b.com", "secret"), false).await.unwrap();

        let err = login(&store, &credentials("a@b.com", "nope")).await.unwrap_err();
        assert_eq!(err.message(), "Invalid password");

        let err = login(&store, &credentials("x@b.com", "secret")).await.unwrap_err();
        assert_eq!(err.message(), "User not found");
    }

    #[actix_web::test]
    async fn test_register_rejects_duplicates() {
        let (_dir, store) = test_store();
        register(&store, &credentials("a@b.com", "secret"), false).await.unwrap();

        let err = register(&store, &credentials("a@b.com", "again"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_missing_fields() {
        let (_dir, store) = test_store();
        let request = LoginRequest {
            email: Some("a@b.com".into()),
            password: None,
        };
        let err = login(&store, &request).await.unwrap_err();
        assert_eq!(err.message(), "Email and password are required");

        let err = register(&store, &credentials("", "pw"), false).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[actix_web::test]
    async fn test_hashed_passwords() {
        let (_dir, store) = test_store();
        register(&store, &credentials("h@b.com", "secret"), true).await.unwrap();

        let stored = store.find_user("h@b.com").unwrap().unwrap();
        assert!(is_bcrypt_hash(&stored.password));

        assert!(login(&store, &credentials("h@b.com", "secret")).await.is_ok());
        assert!(login(&store, &credentials("h@b.com", "wrong")).await.is_err());
    }

    #[actix_web::test]
    async fn test_registration_survives_unwritable_sheet_name() {
        let (_dir, store) = test_store();
        // Longer than Excel's 31 character sheet name limit
        let email = "someone.with.a.long.address@example-domain.com";
        register(&store, &credentials(email, "pw"), false).await.unwrap();

        assert!(store.find_user(email).unwrap().is_some());
        assert!(store.read_sheet(email).unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_authenticate() {
        let (_dir, store) = test_store();
        let mut admin = UserRecord::new("root@firm.com", "pw");
        admin.admin = Some("ADMIN".into());
        store.insert_user(admin).unwrap();

        let user = authenticate(&store, "root@firm.com").await.unwrap();
        assert!(user.admin);

        let err = authenticate(&store, "ghost@firm.com").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
