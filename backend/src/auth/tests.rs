use super::*;
use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::Request as HttpRequest,
    middleware::from_fn_with_state,
    routing::get,
};
use domain::value_objects::{enums::user_roles::Role, iam::Identity};
use tower::ServiceExt;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

async fn whoami(Extension(identity): Extension<Identity>) -> String {
    format!("{}:{}", identity.user_id, identity.role)
}

fn app() -> Router {
    let auth = Arc::new(AuthService::new(SECRET.to_string()));

    let buyer_routes = Router::new()
        .route("/me", get(whoami))
        .route_layer(from_fn_with_state(Arc::clone(&auth), authorize));
    let seller_routes = Router::new()
        .route("/seller", get(whoami))
        .route_layer(from_fn_with_state(auth, authorize_seller));

    buyer_routes.merge(seller_routes)
}

fn token(role: Role) -> String {
    AuthService::new(SECRET.to_string())
        .generate_token(7, "ada@example.com", role)
        .unwrap()
}

async fn call(uri: &str, authorization: Option<String>) -> (StatusCode, String) {
    let mut request = HttpRequest::builder().uri(uri);
    if let Some(value) = authorization {
        request = request.header(AUTHORIZATION, value);
    }

    let response = app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn valid_token_reaches_the_handler_with_identity() {
    let (status, body) = call("/me", Some(format!("Bearer {}", token(Role::Buyer)))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "7:buyer");
}

#[tokio::test]
async fn missing_header_is_rejected_with_reason() {
    let (status, body) = call("/me", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "authorization failed");
    assert_eq!(json["reason"], "authorization header missing");
}

#[tokio::test]
async fn malformed_scheme_and_bad_token_are_rejected() {
    let (status, _) = call("/me", Some(format!("Token {}", token(Role::Buyer)))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call("/me", Some("Bearer not-a-jwt".to_string())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("invalid token"));
}

#[tokio::test]
async fn buyer_token_is_rejected_by_the_seller_gate() {
    let (status, body) = call("/seller", Some(format!("Bearer {}", token(Role::Buyer)))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("please join seller program to manage products"));
}

#[tokio::test]
async fn seller_token_passes_the_seller_gate() {
    let (status, body) = call("/seller", Some(format!("Bearer {}", token(Role::Seller)))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "7:seller");
}
