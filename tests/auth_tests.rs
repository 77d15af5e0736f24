//! Auth service integration tests: login, token lifecycle and password
//! management over the in-memory store.

mod common;

use staffdir::auth::password;
use staffdir::{AppError, EmployeeStore};

use common::{actor_of, env, new_employee, ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn login_with_seeded_admin() {
    let env = env().await;

    let success = env
        .auth
        .authenticate(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    assert!(!success.must_change_password);
    assert_eq!(success.expires_in_hours, 24);
    assert_eq!(success.actor.id, env.admin.id);

    let actor = env.auth.verify_token(&success.token).await.unwrap();
    assert_eq!(actor.id, env.admin.id);
}

#[tokio::test]
async fn new_employee_logs_in_with_derived_default() {
    let env = env().await;

    let created = env
        .directory
        .create(&env.admin, new_employee("EMP001", "Ada", "Lovelace", None, None))
        .await
        .unwrap();

    // First login uses firstName + employeeNumber and flags the forced
    // change.
    let default = password::default_password("Ada", "EMP001");
    let success = env
        .auth
        .authenticate("emp001@example.com", &default)
        .await
        .unwrap();
    assert!(success.must_change_password);
    assert_eq!(success.actor.id, created.id);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let env = env().await;

    let unknown = env
        .auth
        .authenticate("nobody@example.com", "whatever")
        .await;
    let wrong = env.auth.authenticate(ADMIN_EMAIL, "not-the-password").await;

    assert!(matches!(unknown, Err(AppError::AuthenticationFailure)));
    assert!(matches!(wrong, Err(AppError::AuthenticationFailure)));

    // An inactive account fails the same way even with correct credentials.
    let created = env
        .directory
        .create(&env.admin, new_employee("EMP010", "Ina", "Inactive", None, None))
        .await
        .unwrap();
    let mut record = env.store.find_by_id(created.id).await.unwrap().unwrap();
    record.is_active = false;
    env.store.update(record).await.unwrap();

    let default = password::default_password("Ina", "EMP010");
    let inactive = env.auth.authenticate("emp010@example.com", &default).await;
    assert!(matches!(inactive, Err(AppError::AuthenticationFailure)));
}

#[tokio::test]
async fn token_rejected_after_deactivation_or_deletion() {
    let env = env().await;

    let created = env
        .directory
        .create(&env.admin, new_employee("EMP020", "Tom", "Token", None, None))
        .await
        .unwrap();
    let default = password::default_password("Tom", "EMP020");
    let success = env
        .auth
        .authenticate("emp020@example.com", &default)
        .await
        .unwrap();

    // Token is good while the account is live...
    env.auth.verify_token(&success.token).await.unwrap();

    // ...rejected once the account is deactivated...
    let mut record = env.store.find_by_id(created.id).await.unwrap().unwrap();
    record.is_active = false;
    env.store.update(record).await.unwrap();
    assert!(matches!(
        env.auth.verify_token(&success.token).await,
        Err(AppError::AuthenticationFailure)
    ));

    // ...and after deletion.
    env.directory.delete(&env.admin, created.id).await.unwrap();
    assert!(matches!(
        env.auth.verify_token(&success.token).await,
        Err(AppError::AuthenticationFailure)
    ));
}

#[tokio::test]
async fn garbage_token_rejected() {
    let env = env().await;

    let result = env.auth.verify_token("not.a.token").await;
    assert!(matches!(result, Err(AppError::AuthenticationFailure)));
}

#[tokio::test]
async fn change_password_lifecycle() {
    let env = env().await;

    let created = env
        .directory
        .create(&env.admin, new_employee("EMP030", "Cho", "Change", None, None))
        .await
        .unwrap();
    let actor = actor_of(&env.store, created.id).await;
    let default = password::default_password("Cho", "EMP030");

    // Wrong current password fails.
    assert!(matches!(
        env.auth.change_password(&actor, "wrong", "brand-new-pw").await,
        Err(AppError::AuthenticationFailure)
    ));

    // Too-short and same-as-current are validation errors.
    assert!(matches!(
        env.auth.change_password(&actor, &default, "tiny").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        env.auth.change_password(&actor, &default, &default).await,
        Err(AppError::Validation(_))
    ));

    env.auth
        .change_password(&actor, &default, "brand-new-pw")
        .await
        .unwrap();

    // The old default no longer works and the flag is cleared.
    assert!(matches!(
        env.auth.authenticate("emp030@example.com", &default).await,
        Err(AppError::AuthenticationFailure)
    ));
    let success = env
        .auth
        .authenticate("emp030@example.com", "brand-new-pw")
        .await
        .unwrap();
    assert!(!success.must_change_password);
}

#[tokio::test]
async fn reset_password_is_admin_only_and_rearms_flag() {
    let env = env().await;

    let created = env
        .directory
        .create(&env.admin, new_employee("EMP040", "Rex", "Reset", None, None))
        .await
        .unwrap();
    let actor = actor_of(&env.store, created.id).await;
    let default = password::default_password("Rex", "EMP040");

    // Pick a personal password first.
    env.auth
        .change_password(&actor, &default, "chosen-by-rex")
        .await
        .unwrap();

    // A non-admin may not reset anyone, not even themself.
    assert!(matches!(
        env.auth.reset_password(&actor, created.id).await,
        Err(AppError::PermissionDenied(_))
    ));

    let issued = env
        .auth
        .reset_password(&env.admin, created.id)
        .await
        .unwrap();
    assert_eq!(issued, default);

    let success = env
        .auth
        .authenticate("emp040@example.com", &issued)
        .await
        .unwrap();
    assert!(success.must_change_password);
}
