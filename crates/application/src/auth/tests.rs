use super::*;

const SECRET: &str = "supersecretjwtsecretforunittesting123";
// {"alg":"RS256","typ":"JWT"}
const RS256_HEADER: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";

fn service() -> AuthService {
    AuthService::new(SECRET.to_string())
}

fn claims_with_exp(role: Role, exp: i64) -> TokenClaims {
    TokenClaims {
        user_id: 7,
        email: "test@example.com".to_string(),
        role,
        iat: Utc::now().timestamp() - 10,
        exp,
    }
}

fn sign(claims: &impl Serialize, algorithm: Algorithm, secret: &str) -> String {
    encode(
        &Header::new(algorithm),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_generated_token_round_trips() {
    let auth = service();
    let token = auth.generate_token(7, "test@example.com", Role::Seller).unwrap();

    let identity = auth.verify_token(&token).expect("Valid token should pass");
    assert_eq!(identity.user_id, 7);
    assert_eq!(identity.email, "test@example.com");
    assert_eq!(identity.role, Role::Seller);
}

#[test]
fn test_generated_token_expires_after_thirty_days() {
    let auth = service();
    let token = auth.generate_token(7, "test@example.com", Role::Buyer).unwrap();

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    let claims = decode::<TokenClaims>(
        &token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &validation,
    )
    .unwrap()
    .claims;

    assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
}

#[test]
fn test_expired_token_is_rejected() {
    let token = sign(
        &claims_with_exp(Role::Buyer, Utc::now().timestamp() - 1),
        Algorithm::HS256,
        SECRET,
    );

    assert_eq!(service().verify_token(&token), Err(AuthError::TokenExpired));
}

#[test]
fn test_expired_token_with_bad_signature_is_rejected() {
    let token = sign(&claims_with_exp(Role::Buyer, 1), Algorithm::HS256, "wrongsecret");

    assert!(service().verify_token(&token).is_err());
}

#[test]
fn test_invalid_signature_is_rejected() {
    let token = sign(
        &claims_with_exp(Role::Buyer, 9_999_999_999),
        Algorithm::HS256,
        "wrongsecret",
    );

    assert_eq!(service().verify_token(&token), Err(AuthError::InvalidToken));
}

#[test]
fn test_other_hmac_variants_are_accepted() {
    let token = sign(
        &claims_with_exp(Role::Buyer, 9_999_999_999),
        Algorithm::HS512,
        SECRET,
    );

    assert!(service().verify_token(&token).is_ok());
}

#[test]
fn test_non_hmac_algorithm_header_is_rejected() {
    // Re-label a valid HS256 token as RS256 without touching the signature.
    let token = sign(
        &claims_with_exp(Role::Buyer, 9_999_999_999),
        Algorithm::HS256,
        SECRET,
    );
    let (_, body) = token.split_once('.').unwrap();
    let forged = format!("{RS256_HEADER}.{body}");

    assert_eq!(
        service().verify_token(&forged),
        Err(AuthError::UnexpectedAlgorithm)
    );
}

#[test]
fn test_missing_claim_is_rejected_without_panicking() {
    #[derive(Serialize)]
    struct PartialClaims {
        user_id: i32,
        exp: i64,
    }

    let token = sign(
        &PartialClaims {
            user_id: 7,
            exp: 9_999_999_999,
        },
        Algorithm::HS256,
        SECRET,
    );

    assert_eq!(service().verify_token(&token), Err(AuthError::InvalidClaims));
}

#[test]
fn test_mistyped_claim_is_rejected() {
    let claims = serde_json::json!({
        "user_id": "seven",
        "email": "test@example.com",
        "role": "buyer",
        "iat": 1,
        "exp": 9_999_999_999i64,
    });
    let token = sign(&claims, Algorithm::HS256, SECRET);

    assert_eq!(service().verify_token(&token), Err(AuthError::InvalidClaims));
}

#[test]
fn test_unknown_role_is_rejected() {
    let claims = serde_json::json!({
        "user_id": 7,
        "email": "test@example.com",
        "role": "admin",
        "iat": 1,
        "exp": 9_999_999_999i64,
    });
    let token = sign(&claims, Algorithm::HS256, SECRET);

    assert_eq!(service().verify_token(&token), Err(AuthError::InvalidClaims));
}

#[test]
fn test_bearer_header_parsing() {
    let auth = service();
    let token = auth.generate_token(7, "test@example.com", Role::Buyer).unwrap();

    assert_eq!(auth.verify_bearer(None), Err(AuthError::MissingHeader));
    assert_eq!(auth.verify_bearer(Some("")), Err(AuthError::MissingHeader));
    assert_eq!(
        auth.verify_bearer(Some(&token)),
        Err(AuthError::InvalidHeaderFormat)
    );
    assert_eq!(
        auth.verify_bearer(Some(&format!("Basic {token}"))),
        Err(AuthError::InvalidHeaderFormat)
    );
    assert_eq!(
        auth.verify_bearer(Some("Bearer ")),
        Err(AuthError::InvalidHeaderFormat)
    );
    assert!(auth.verify_bearer(Some(&format!("Bearer {token}"))).is_ok());
    assert!(auth.verify_bearer(Some(&format!("bearer {token}"))).is_ok());
}

#[test]
fn test_seller_gate_rejects_buyer_token() {
    let auth = service();
    let buyer = auth.generate_token(7, "test@example.com", Role::Buyer).unwrap();
    let seller = auth.generate_token(8, "shop@example.com", Role::Seller).unwrap();

    assert_eq!(
        auth.verify_seller_bearer(Some(&format!("Bearer {buyer}"))),
        Err(AuthError::NotSeller)
    );
    let identity = auth
        .verify_seller_bearer(Some(&format!("Bearer {seller}")))
        .unwrap();
    assert_eq!(identity.user_id, 8);
}

#[test]
fn test_short_password_is_rejected() {
    let err = service().hash_password("12345").unwrap_err();
    assert!(matches!(err, UseCaseError::Validation(_)));
}

#[test]
fn test_password_hash_verifies() {
    let auth = service();
    let hash = auth.hash_password("secret1").unwrap();

    assert_ne!(hash, "secret1");
    assert!(auth.verify_password("secret1", &hash));
    assert!(!auth.verify_password("secret2", &hash));
    assert!(!auth.verify_password("secret1", "not-a-phc-string"));
}

#[test]
fn test_dummy_verify_builds_a_real_hash_and_never_matches() {
    let auth = service();

    assert!(!auth.verify_against_dummy("secret1"));
    assert!(!auth.verify_against_dummy(DUMMY_PASSWORD));

    let hashed = DUMMY_HASH.get().unwrap();
    assert!(PasswordHash::new(hashed).is_ok());
    assert!(hashed.starts_with("$argon2id$"));
}

#[test]
fn test_token_generation_requires_secret_and_inputs() {
    assert!(AuthService::new(String::new())
        .generate_token(7, "test@example.com", Role::Buyer)
        .is_err());
    assert!(service().generate_token(0, "test@example.com", Role::Buyer).is_err());
    assert!(service().generate_token(7, "", Role::Buyer).is_err());
}

#[test]
fn test_generated_code_is_six_digits() {
    let code = generate_code();
    assert_eq!(code.len(), VERIFICATION_CODE_LEN);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}
