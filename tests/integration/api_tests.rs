//! API integration tests
//!
//! Need a running server with its database:
//! `cargo test --test api_tests -- --ignored`

use bookshelf_server::models::principal::PrincipalClaims;
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Sign a token the way the identity provider would
fn token_for(user_id: i32) -> String {
    let secret = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    PrincipalClaims {
        sub: user_id.to_string(),
        name: Some(format!("reader-{}", user_id)),
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: chrono::Utc::now().timestamp(),
    }
    .create_token(&secret)
    .expect("Failed to sign token")
}

/// Random-ish id so test runs don't collide on the same rows
fn unique_user() -> i32 {
    (chrono::Utc::now().timestamp_subsec_nanos() % 1_000_000) as i32 + 1_000
}

async fn create_book(client: &Client, token: &str, total_pages: i32) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": "Test Book",
            "edition": "First",
            "total_pages": total_pages
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_create_book_defaults() {
    let client = Client::new();
    let owner = unique_user();
    let token = token_for(owner);

    let book = create_book(&client, &token, 120).await;

    assert_eq!(book["author"], "Unknown author");
    assert_eq!(book["owner_id"], owner);
    assert_eq!(book["on_loan"], false);

    let response = client
        .get(format!("{}/library", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let library: Value = response.json().await.expect("Failed to parse response");
    assert!(library["books"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"] == book["id"]));
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return() {
    let client = Client::new();
    let owner = token_for(unique_user());
    let borrower_id = unique_user() + 1;
    let borrower = token_for(borrower_id);

    let book = create_book(&client, &owner, 200).await;
    let book_id = book["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&borrower)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.unwrap();
    assert_eq!(loan["on_loan"], true);
    assert_eq!(loan["borrowers"], json!([borrower_id]));

    let start = chrono::DateTime::parse_from_rfc3339(loan["start_date"].as_str().unwrap()).unwrap();
    let end = chrono::DateTime::parse_from_rfc3339(loan["end_date"].as_str().unwrap()).unwrap();
    assert_eq!((end - start).num_days(), 150);

    // the borrower starts with an empty reading record
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&borrower)
        .send()
        .await
        .expect("Failed to send request");
    let details: Value = response.json().await.unwrap();
    assert_eq!(details["progress"]["current_page"], 0);

    // a second borrow is refused while on loan
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .bearer_auth(&borrower)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "returned");
    assert_eq!(body["loan"]["borrowers"], json!([]));
    assert_eq!(body["loan"]["on_loan"], false);
}

#[tokio::test]
#[ignore]
async fn test_return_without_loan_is_not_found() {
    let client = Client::new();
    let token = token_for(unique_user());
    let book = create_book(&client, &token, 10).await;

    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_malformed_borrow_body_is_rejected() {
    let client = Client::new();
    let token = token_for(unique_user());
    let book = create_book(&client, &token, 30).await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book["id"]))
        .bearer_auth(&token)
        .json(&json!({ "end_date": "next tuesday" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let details: Value = response.json().await.unwrap();
    assert_eq!(details["book"]["on_loan"], false);
}

#[tokio::test]
#[ignore]
async fn test_progress_percentage() {
    let client = Client::new();
    let token = token_for(unique_user());
    let book = create_book(&client, &token, 200).await;

    let response = client
        .put(format!("{}/books/{}/progress", BASE_URL, book["id"]))
        .bearer_auth(&token)
        .json(&json!({ "current_page": 50 }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let progress: Value = response.json().await.unwrap();
    assert_eq!(progress["percentage"], 25.0);
}

#[tokio::test]
#[ignore]
async fn test_score_upsert_keeps_one_row() {
    let client = Client::new();
    let token = token_for(unique_user());
    let book = create_book(&client, &token, 80).await;

    for rating in [4, 9] {
        let response = client
            .put(format!("{}/books/{}/score", BASE_URL, book["id"]))
            .bearer_auth(&token)
            .json(&json!({ "rating": rating }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
    }

    let response = client
        .get(format!("{}/library", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let library: Value = response.json().await.unwrap();
    let scores: Vec<&Value> = library["scores"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["book_id"] == book["id"])
        .collect();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0]["rating"], 9);
}

#[tokio::test]
#[ignore]
async fn test_ranking_has_at_most_five_rows() {
    let client = Client::new();
    let token = token_for(unique_user());

    let response = client
        .get(format!("{}/ranking", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let ranking: Value = response.json().await.unwrap();
    let rows = ranking.as_array().unwrap();
    assert!(rows.len() <= 5);
    for pair in rows.windows(2) {
        assert!(pair[0]["mean_score"].as_f64() >= pair[1]["mean_score"].as_f64());
    }
    assert!(rows.iter().all(|r| r["votes"].as_i64().unwrap() > 0));
}
