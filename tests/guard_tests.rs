use std::collections::HashMap;

use tribegate_sdk::{
    check_user_role, with_auth, with_permission, GatewayMock, IdentityProvider, RoleRecord,
    SdkError, UserRecord,
};

fn bearer(value: &str) -> HashMap<String, String> {
    let _ = env_logger::builder().is_test(true).try_init();
    HashMap::from([("Authorization".to_string(), format!("Bearer {}", value))])
}

fn pilot_mock() -> GatewayMock {
    GatewayMock::new()
        .with_user(
            "pilot-token",
            UserRecord::new("0xabc", "Pilot").with_role("Fleet Member"),
        )
        .with_roles("0xabc", vec![RoleRecord::new(1, "Fleet Member", "0xroot")])
        .with_grant("0xabc", "acme", "fleet:read")
}

#[tokio::test]
async fn test_with_auth_end_to_end() {
    let mock = pilot_mock();

    let greeting = with_auth(&mock, &bearer("pilot-token"), |user| async move {
        Ok(format!("hello {}", user.character_name))
    })
    .await
    .unwrap();

    assert_eq!(greeting, "hello Pilot");
}

#[tokio::test]
async fn test_with_auth_rejects_malformed_header() {
    let mock = pilot_mock();
    let headers = HashMap::from([(
        "Authorization".to_string(),
        "bearer pilot-token".to_string(),
    )]);

    let result = with_auth(&mock, &headers, |_user| async move { Ok(()) }).await;
    assert!(matches!(result, Err(SdkError::Unauthorized(_))));
}

#[tokio::test]
async fn test_with_permission_end_to_end() {
    let mock = pilot_mock();

    let granted = with_permission(
        &mock,
        &bearer("pilot-token"),
        "acme",
        "fleet:read",
        |user| async move { Ok(user.eth_address) },
    )
    .await
    .unwrap();
    assert_eq!(granted, "0xabc");

    let denied = with_permission(
        &mock,
        &bearer("pilot-token"),
        "acme",
        "fleet:write",
        |_user| async move { Ok(()) },
    )
    .await;
    assert!(matches!(denied, Err(SdkError::Forbidden(_))));
}

#[tokio::test]
async fn test_permission_absence_is_false_not_error() {
    let mock = pilot_mock();

    // The identity service answers 404 for an absent permission record;
    // the client surfaces that as a plain denial
    let allowed = mock
        .check_permission("0xabc", "acme", "fleet:delete", "pilot-token")
        .await
        .unwrap();
    assert!(!allowed);
}

#[tokio::test]
async fn test_check_user_role_over_the_gateway() {
    let mock = pilot_mock();

    assert!(check_user_role(&mock, "0xabc", "Fleet Member", "pilot-token")
        .await
        .unwrap());
    assert!(!check_user_role(&mock, "0xabc", "Director", "pilot-token")
        .await
        .unwrap());
    // Unknown user upstream means "no roles", not an error
    assert!(!check_user_role(&mock, "0xmissing", "Fleet Member", "pilot-token")
        .await
        .unwrap());
}
