//! API handlers for Bookshelf REST endpoints

pub mod books;
pub mod categories;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod ranking;
pub mod reading;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post, put},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::principal::{Principal, PrincipalClaims},
    AppState,
};

/// Extractor for the caller, verified from the identity provider's bearer token
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| AppError::Authentication(e.to_string()))?;

        let claims = PrincipalClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(Principal::try_from(claims)?))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/library", get(books::get_library))
        .route("/books", post(books::create_book))
        .route("/books/available", get(books::list_available))
        .route("/books/:id", get(books::get_book))
        // Loans
        .route("/books/:id/borrow", post(loans::borrow_book))
        .route("/books/:id/return", post(loans::return_book))
        .route("/loans", get(loans::get_my_loans))
        // Reading
        .route("/books/:id/score", put(reading::score_book))
        .route("/books/:id/progress", put(reading::update_progress))
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        // Ranking
        .route("/ranking", get(ranking::get_ranking))
        .route(
            "/ranking/:year/archive",
            get(ranking::get_archived_ranking).post(ranking::archive_ranking),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        repository::Repository,
        services::{openlibrary::NoCatalog, Services},
    };

    /// State backed by a pool that never connects; only routes that stop
    /// before touching the database can be exercised here.
    fn state() -> AppState {
        let config = AppConfig::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        AppState {
            config: Arc::new(config),
            services: Arc::new(Services::with_lookup(Repository::new(pool), Arc::new(NoCatalog))),
        }
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = create_router(state())
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = create_router(state())
            .oneshot(Request::get("/api/v1/library").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_token_is_unauthorized() {
        let claims = PrincipalClaims {
            sub: "1".to_string(),
            name: None,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: 0,
        };
        let token = claims.create_token("not-the-server-secret").unwrap();

        let response = create_router(state())
            .oneshot(
                Request::get("/api/v1/loans")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_score_rejected_before_storage() {
        let config = AppConfig::default();
        let claims = PrincipalClaims {
            sub: "1".to_string(),
            name: None,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: 0,
        };
        let token = claims.create_token(&config.auth.jwt_secret).unwrap();

        let response = create_router(state())
            .oneshot(
                Request::put("/api/v1/books/1/score")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"rating": 11}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_borrow_body_rejected_before_storage() {
        let config = AppConfig::default();
        let claims = PrincipalClaims {
            sub: "1".to_string(),
            name: None,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: 0,
        };
        let token = claims.create_token(&config.auth.jwt_secret).unwrap();

        let response = create_router(state())
            .oneshot(
                Request::post("/api/v1/books/1/borrow")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"end_date": "next tuesday"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_category_name_rejected() {
        let config = AppConfig::default();
        let claims = PrincipalClaims {
            sub: "1".to_string(),
            name: None,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: 0,
        };
        let token = claims.create_token(&config.auth.jwt_secret).unwrap();

        let response = create_router(state())
            .oneshot(
                Request::post("/api/v1/categories")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
