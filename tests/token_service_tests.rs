//! Token service behaviour through the public API

use std::sync::Arc;

use auth_service::auth::{
    decode, Clock, InvalidTokenReason, ManualClock, TokenError, TokenService, TokenServiceConfig,
    UserIdentity,
};
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

fn alice() -> UserIdentity {
    UserIdentity {
        id: Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
        email: "a@b.com".to_string(),
        username: "alice".to_string(),
    }
}

fn service_at(clock: Arc<ManualClock>) -> TokenService {
    TokenService::with_clock(
        TokenServiceConfig::new("s3cr3t", Duration::hours(24)),
        clock,
    )
}

#[test]
fn test_concrete_scenario() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = service_at(clock.clone());

    let token = service.issue_access_token(&alice()).unwrap();
    let claims = service.validate(&token).unwrap();

    assert_eq!(claims.identity(), alice());
    assert_eq!(claims.sub, "11111111-1111-1111-1111-111111111111");
    assert_eq!(claims.iss, "auth-service");

    clock.advance(Duration::hours(25));
    assert!(matches!(
        service.validate(&token),
        Err(TokenError::InvalidToken(
            InvalidTokenReason::ExpiredOrNotYetValid
        ))
    ));
}

#[test]
fn test_tokens_are_reproducible_for_fixed_time() {
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let a = service_at(Arc::new(ManualClock::new(at)))
        .issue_access_token(&alice())
        .unwrap();
    let b = service_at(Arc::new(ManualClock::new(at)))
        .issue_access_token(&alice())
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(a.split('.').count(), 3);
    assert!(a.starts_with("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9."));
}

#[test]
fn test_decoded_window_matches_lifetime() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = service_at(clock.clone());
    let token = service.issue_access_token(&alice()).unwrap();

    let decoded = decode(&token).unwrap();
    let claims = decoded.claims();
    assert_eq!(claims.iat, clock.now().timestamp());
    assert!(claims.iat <= claims.nbf && claims.nbf <= claims.exp);
    assert_eq!(
        claims.expires_at().unwrap().timestamp(),
        (clock.now() + Duration::hours(24)).timestamp()
    );
}

#[test]
fn test_refresh_flow() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = service_at(clock.clone());
    let user_id = alice().id;

    let refresh_token = service.issue_refresh_token(user_id).unwrap();
    clock.advance(Duration::hours(12));

    let access_token = service.refresh(&refresh_token).unwrap();
    let claims = service.validate(&access_token).unwrap();

    assert_eq!(claims.subject(), user_id);
    assert_eq!(claims.exp, claims.iat + 24 * 60 * 60);
    assert_eq!(claims.iat, clock.now().timestamp());
}

#[test]
fn test_shared_across_threads() {
    let service = Arc::new(TokenService::new(TokenServiceConfig::new(
        "s3cr3t",
        Duration::hours(24),
    )));
    let token = service.issue_access_token(&alice()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            let token = token.clone();
            std::thread::spawn(move || service.validate(&token).unwrap().subject())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), alice().id);
    }
}
