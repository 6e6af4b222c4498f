//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, categories, health, loans, ranking, reading};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.3.0",
        description = "Book lending and reading tracker REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::get_library,
        books::list_available,
        books::create_book,
        books::get_book,
        // Loans
        loans::get_my_loans,
        loans::borrow_book,
        loans::return_book,
        // Reading
        reading::score_book,
        reading::update_progress,
        // Categories
        categories::list_categories,
        categories::create_category,
        // Ranking
        ranking::get_ranking,
        ranking::archive_ranking,
        ranking::get_archived_ranking,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::BookDetails,
            crate::models::book::LibraryView,
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            // Loans
            crate::models::loan::BorrowBook,
            crate::models::loan::LoanDetails,
            loans::ReturnResponse,
            // Reading
            crate::models::score::Score,
            crate::models::score::ScoreBook,
            crate::models::progress::ReadingProgress,
            crate::models::progress::UpdateProgress,
            // Ranking
            crate::models::ranking::RankingEntry,
            crate::models::ranking::AnnualRanking,
            crate::models::ranking::RankingQuery,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book library"),
        (name = "loans", description = "Lending"),
        (name = "reading", description = "Scores and reading progress"),
        (name = "categories", description = "Thematic categories"),
        (name = "ranking", description = "Book ranking")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_lending_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/books/{id}/borrow"));
        assert!(doc.paths.paths.contains_key("/books/{id}/return"));
        assert!(doc.paths.paths.contains_key("/ranking"));
    }
}
