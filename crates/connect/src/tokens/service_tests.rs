use chrono::{Duration, Utc};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bcportal_core::tenants::OAuthField;
use bcportal_core::tokens::{TokenError, TokenServiceTrait};

use super::{TokenService, TokenServiceConfig};
use crate::test_support::{configured_tenant, with_token, MockIdentity, MockTenantRepository};

fn service(
    repo: Arc<MockTenantRepository>,
    identity: Arc<MockIdentity>,
) -> TokenService {
    TokenService::new(repo, identity, TokenServiceConfig::default())
}

#[tokio::test]
async fn test_fresh_token_is_served_from_cache() {
    let tenant = with_token(configured_tenant("T1"), "cached", Duration::hours(1));
    let expires_at = tenant.token_expires_at;
    let repo = Arc::new(MockTenantRepository::with(vec![tenant]));
    let identity = Arc::new(MockIdentity::default());

    let token = service(repo.clone(), identity.clone())
        .ensure_valid_token("T1")
        .await
        .unwrap();

    assert_eq!(token.access_token, "cached");
    assert_eq!(Some(token.expires_at), expires_at);
    assert!(!token.refreshed);
    assert_eq!(identity.call_count(), 0);
    assert_eq!(repo.token_writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_token_expiring_within_margin_is_refreshed_once() {
    let tenant = with_token(configured_tenant("T1"), "stale", Duration::minutes(2));
    let repo = Arc::new(MockTenantRepository::with(vec![tenant]));
    let identity = Arc::new(MockIdentity::default());

    let before = Utc::now();
    let token = service(repo.clone(), identity.clone())
        .ensure_valid_token("T1")
        .await
        .unwrap();

    assert_eq!(identity.call_count(), 1);
    assert!(token.refreshed);
    assert_eq!(token.access_token, "token-T1");
    assert!(token.expires_at - Utc::now() > Duration::minutes(5));

    let expected = before + Duration::seconds(3600);
    assert!((token.expires_at - expected).num_seconds().abs() <= 5);

    let stored = repo.tenant("T1").unwrap();
    assert_eq!(stored.token.as_deref(), Some("token-T1"));
    assert_eq!(stored.token_expires_at, Some(token.expires_at));
}

#[tokio::test]
async fn test_missing_token_is_refreshed() {
    let repo = Arc::new(MockTenantRepository::with(vec![configured_tenant("T1")]));
    let identity = Arc::new(MockIdentity::default());

    let token = service(repo, identity.clone())
        .ensure_valid_token("T1")
        .await
        .unwrap();

    assert!(token.refreshed);
    assert_eq!(identity.call_count(), 1);
}

#[tokio::test]
async fn test_misconfigured_tenant_lists_missing_fields_without_network() {
    let mut tenant = configured_tenant("T1");
    tenant.client_secret = None;
    tenant.scope = Some("   ".to_string());
    let repo = Arc::new(MockTenantRepository::with(vec![tenant]));
    let identity = Arc::new(MockIdentity::default());

    let err = service(repo, identity.clone())
        .ensure_valid_token("T1")
        .await
        .unwrap_err();

    match err {
        TokenError::MisconfiguredAuth { tenant_id, missing } => {
            assert_eq!(tenant_id, "T1");
            assert_eq!(missing, vec![OAuthField::ClientSecret, OAuthField::Scope]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(identity.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_tenant_is_not_found() {
    let repo = Arc::new(MockTenantRepository::default());
    let identity = Arc::new(MockIdentity::default());

    let err = service(repo, identity.clone())
        .ensure_valid_token("missing")
        .await
        .unwrap_err();

    assert!(matches!(err, TokenError::NotFound(id) if id == "missing"));
    assert_eq!(identity.call_count(), 0);
}

#[tokio::test]
async fn test_rejected_refresh_is_not_persisted() {
    let repo = Arc::new(MockTenantRepository::with(vec![configured_tenant("T1")]));
    let identity = Arc::new(MockIdentity::rejecting(&["T1"]));

    let err = service(repo.clone(), identity)
        .ensure_valid_token("T1")
        .await
        .unwrap_err();

    assert!(matches!(err, TokenError::RefreshFailed { status: 401, .. }));
    assert!(!err.is_retryable());
    assert_eq!(repo.token_writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_out_of_range_lifetime_is_rejected_and_not_persisted() {
    for expires_in in [i64::MAX, -30, 0] {
        let repo = Arc::new(MockTenantRepository::with(vec![configured_tenant("T1")]));
        let identity = Arc::new(MockIdentity {
            expires_in: Some(expires_in),
            ..Default::default()
        });

        let err = service(repo.clone(), identity.clone())
            .ensure_valid_token("T1")
            .await
            .unwrap_err();

        assert!(
            matches!(err, TokenError::InvalidResponse(ref msg) if msg.contains("out of range")),
            "expires_in {expires_in}: unexpected error {err:?}"
        );
        assert!(!err.is_retryable());
        assert_eq!(identity.call_count(), 1);
        assert_eq!(repo.token_writes.load(Ordering::SeqCst), 0);
        assert!(repo.tenant("T1").unwrap().token.is_none());
    }
}
