use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn token(sub: &str, role: &str, exp: usize, secret: &str) -> String {
    encode(
        &Header::default(),
        &Claims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp,
        },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_validate_jwt_owner() {
    let sub = "123e4567-e89b-12d3-a456-426614174000";
    let user = validate_jwt(&token(sub, "owner", 9999999999, SECRET), &JwtKeys::new(SECRET))
        .expect("Valid token should pass");

    assert_eq!(user.user_id, Uuid::parse_str(sub).unwrap());
    assert_eq!(user.role, UserRole::Owner);
    assert!(!user.is_admin());
}

#[test]
fn test_validate_jwt_admin() {
    let user = validate_jwt(
        &token("123e4567-e89b-12d3-a456-426614174000", "admin", 9999999999, SECRET),
        &JwtKeys::new(SECRET),
    )
    .unwrap();

    assert!(user.is_admin());
}

#[test]
fn test_validate_jwt_expired() {
    let result = validate_jwt(
        &token("123e4567-e89b-12d3-a456-426614174000", "owner", 1, SECRET),
        &JwtKeys::new(SECRET),
    );

    assert!(result.is_err());
}

#[test]
fn test_validate_jwt_invalid_signature() {
    let result = validate_jwt(
        &token("123e4567-e89b-12d3-a456-426614174000", "owner", 9999999999, "wrongsecret"),
        &JwtKeys::new(SECRET),
    );

    assert!(result.is_err());
}

#[test]
fn test_validate_jwt_unknown_role() {
    let result = validate_jwt(
        &token("123e4567-e89b-12d3-a456-426614174000", "diner", 9999999999, SECRET),
        &JwtKeys::new(SECRET),
    );

    assert_eq!(result.unwrap_err(), "Unsupported role");
}

#[test]
fn test_validate_jwt_non_uuid_subject() {
    let result = validate_jwt(
        &token("not-a-uuid", "owner", 9999999999, SECRET),
        &JwtKeys::new(SECRET),
    );

    assert!(result.is_err());
}
