use super::common::*;

use crate::store::RepositoryError;
use crate::workflows::accounts::domain::{
    LoginRequest, NotificationPreferences, PreferenceUpdate, UserId, UserRole,
};
use crate::workflows::accounts::repository::UserRepository;
use crate::workflows::accounts::{AccountServiceError, TokenIssuer};
use crate::workflows::listings::domain::{EducationLevel, JobCategory};

#[tokio::test]
async fn register_stores_hash_and_sends_welcome() {
    let harness = harness();

    let view = harness
        .service
        .register(registration("meera@example.in"))
        .await
        .expect("registers");

    assert_eq!(view.role, UserRole::User);
    assert!(view.notification_preferences.email_alerts);
    let stored = harness
        .store
        .fetch_by_email("meera@example.in")
        .expect("fetch")
        .expect("present");
    assert!(stored.password_hash.starts_with("$argon2id$"));
    assert_ne!(stored.password_hash, "exam-ready-2025");
    assert_eq!(harness.mail.subjects_for("meera@example.in").len(), 1);
}

#[tokio::test]
async fn register_succeeds_when_welcome_mail_fails() {
    let harness = harness_with(MailSpy::failing());

    let view = harness
        .service
        .register(registration("meera@example.in"))
        .await
        .expect("registration is not blocked by mail");

    assert_eq!(view.email, "meera@example.in");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let harness = harness();
    harness
        .service
        .register(registration("meera@example.in"))
        .await
        .expect("first registration");

    let err = harness
        .service
        .register(registration("MEERA@example.in"))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, AccountServiceError::EmailTaken));
}

#[tokio::test]
async fn register_validates_email_and_password() {
    let harness = harness();

    let mut bad_email = registration("not-an-address");
    bad_email.email = "not-an-address".to_string();
    assert!(matches!(
        harness.service.register(bad_email).await,
        Err(AccountServiceError::InvalidEmail(_))
    ));

    let mut short = registration("short@example.in");
    short.password = "1234567".to_string();
    assert!(matches!(
        harness.service.register(short).await,
        Err(AccountServiceError::WeakPassword)
    ));
    assert_eq!(UserRepository::count(harness.store.as_ref()).expect("count"), 0);
}

#[tokio::test]
async fn login_issues_token_and_records_last_login() {
    let harness = harness();
    let view = harness
        .service
        .register(registration("meera@example.in"))
        .await
        .expect("registers");

    let token = harness
        .service
        .login(LoginRequest {
            email: "meera@example.in".to_string(),
            password: "exam-ready-2025".to_string(),
        })
        .expect("logs in");

    assert_eq!(token.token_type, "bearer");
    let identity = TokenIssuer::new(SECRET, 30)
        .verify(&token.access_token)
        .expect("token verifies");
    assert_eq!(identity.user_id, view.id);
    let stored = UserRepository::fetch(harness.store.as_ref(), &view.id)
        .expect("fetch")
        .expect("present");
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn login_rejects_wrong_password_and_inactive_accounts() {
    let harness = harness();
    let view = harness
        .service
        .register(registration("meera@example.in"))
        .await
        .expect("registers");

    let wrong = harness.service.login(LoginRequest {
        email: "meera@example.in".to_string(),
        password: "not-the-password".to_string(),
    });
    assert!(matches!(wrong, Err(AccountServiceError::InvalidCredentials)));

    let mut stored = UserRepository::fetch(harness.store.as_ref(), &view.id)
        .expect("fetch")
        .expect("present");
    stored.is_active = false;
    UserRepository::update(harness.store.as_ref(), stored).expect("update");

    let inactive = harness.service.login(LoginRequest {
        email: "meera@example.in".to_string(),
        password: "exam-ready-2025".to_string(),
    });
    assert!(matches!(inactive, Err(AccountServiceError::Inactive)));
}

#[tokio::test]
async fn preference_update_changes_only_supplied_fields() {
    let harness = harness();
    let view = harness
        .service
        .register(registration("meera@example.in"))
        .await
        .expect("registers");

    let updated = harness
        .service
        .update_preferences(
            &view.id,
            PreferenceUpdate {
                preferred_job_categories: Some([JobCategory::Railway].into_iter().collect()),
                education_level: None,
                notification_preferences: Some(NotificationPreferences {
                    email_alerts: false,
                    sms_alerts: true,
                    push_notifications: false,
                }),
            },
        )
        .expect("updates");

    assert_eq!(
        updated.preferred_job_categories,
        [JobCategory::Railway].into_iter().collect()
    );
    assert_eq!(updated.education_level, Some(EducationLevel::Graduate));
    assert!(!updated.notification_preferences.email_alerts);

    let cleared = harness
        .service
        .update_preferences(
            &view.id,
            PreferenceUpdate {
                education_level: Some(None),
                ..PreferenceUpdate::default()
            },
        )
        .expect("updates");
    assert_eq!(cleared.education_level, None);
}

#[test]
fn me_reports_missing_account() {
    let harness = harness();
    let err = harness
        .service
        .me(&UserId("ghost".to_string()))
        .expect_err("missing");
    assert!(matches!(
        err,
        AccountServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn ensure_admin_creates_then_promotes() {
    let harness = harness();
    let admin = harness
        .service
        .ensure_admin("root@example.in", "admin-password")
        .expect("creates admin");
    assert_eq!(admin.role, UserRole::Admin);

    let again = harness
        .service
        .ensure_admin("root@example.in", "admin-password")
        .expect("idempotent");
    assert_eq!(again.id, admin.id);

    let member = harness
        .service
        .register(registration("meera@example.in"))
        .await
        .expect("registers");
    let promoted = harness
        .service
        .ensure_admin("meera@example.in", "ignored-password")
        .expect("promotes");
    assert_eq!(promoted.id, member.id);
    assert_eq!(promoted.role, UserRole::Admin);
}
