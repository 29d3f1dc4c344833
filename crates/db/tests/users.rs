use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use fibervision_core::roles::Role;
use fibervision_db::models::session::CreateSession;
use fibervision_db::models::user::CreateUser;
use fibervision_db::models::verification_token::CreateVerificationToken;
use fibervision_db::repositories::{RoleRepo, SessionRepo, UserRepo, VerificationTokenRepo};
use sqlx::PgPool;

async fn create(pool: &PgPool, username: &str) -> fibervision_db::models::user::User {
    let role = RoleRepo::find(pool, Role::User).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Someone".into(),
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: "hash".into(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_violates_named_constraint(pool: PgPool) {
    create(&pool, "dupe").await;
    let role = RoleRepo::find(&pool, Role::User).await.unwrap().unwrap();
    let err = UserRepo::create(
        &pool,
        &CreateUser {
            name: "Other".into(),
            username: "other".into(),
            email: "dupe@example.com".into(),
            password_hash: "hash".into(),
            role_id: role.id,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.constraint() == Some("uq_users_email")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ban_and_unban(pool: PgPool) {
    let user = create(&pool, "rowdy").await;
    let banned = UserRepo::ban(&pool, user.id, Some("spam")).await.unwrap().unwrap();
    assert!(banned.banned);
    assert_eq!(banned.ban_reason.as_deref(), Some("spam"));

    let unbanned = UserRepo::unban(&pool, user.id).await.unwrap().unwrap();
    assert!(!unbanned.banned);
    assert_eq!(unbanned.ban_reason, None);

    assert!(UserRepo::ban(&pool, 9999, None).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_role_and_count(pool: PgPool) {
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
    let user = create(&pool, "promoted").await;
    let admin = RoleRepo::find(&pool, Role::Admin).await.unwrap().unwrap();

    let updated = UserRepo::set_role(&pool, user.id, admin.id).await.unwrap().unwrap();
    assert_eq!(updated.role_id, admin.id);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(RoleRepo::resolve_name(&pool, admin.id).await.unwrap(), "admin");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn verification_tokens_are_single_use(pool: PgPool) {
    let user = create(&pool, "verifier").await;
    VerificationTokenRepo::create(
        &pool,
        &CreateVerificationToken {
            identifier: "email-verification:abc".into(),
            user_id: user.id,
            expires_at: Utc::now() + Duration::hours(1),
        },
    )
    .await
    .unwrap();

    assert!(VerificationTokenRepo::find_valid(&pool, "email-verification:abc")
        .await
        .unwrap()
        .is_some());
    let consumed = VerificationTokenRepo::consume(&pool, "email-verification:abc")
        .await
        .unwrap();
    assert_eq!(consumed.map(|t| t.user_id), Some(user.id));
    assert!(VerificationTokenRepo::consume(&pool, "email-verification:abc")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_tokens_cannot_be_consumed(pool: PgPool) {
    let user = create(&pool, "late").await;
    VerificationTokenRepo::create(
        &pool,
        &CreateVerificationToken {
            identifier: "reset-password:old".into(),
            user_id: user.id,
            expires_at: Utc::now() - Duration::minutes(1),
        },
    )
    .await
    .unwrap();

    assert!(VerificationTokenRepo::consume(&pool, "reset-password:old")
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        VerificationTokenRepo::delete_for_user(&pool, user.id, "reset-password")
            .await
            .unwrap(),
        1
    );
}

fn session(user_id: i64, hash: &str, expires_in: Duration) -> CreateSession {
    CreateSession {
        user_id,
        refresh_token_hash: hash.into(),
        expires_at: Utc::now() + expires_in,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_tokens_are_single_use(pool: PgPool) {
    let user = create(&pool, "rotating").await;
    SessionRepo::create(&pool, &session(user.id, "live", Duration::days(1)))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session(user.id, "stale", Duration::seconds(-1)))
        .await
        .unwrap();

    let claimed = SessionRepo::claim(&pool, "live").await.unwrap().unwrap();
    assert_eq!(claimed.user_id, user.id);
    assert!(SessionRepo::claim(&pool, "live").await.unwrap().is_none());
    assert!(SessionRepo::claim(&pool, "stale").await.unwrap().is_none());
    assert!(SessionRepo::claim(&pool, "never-issued").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revoke_all_sessions(pool: PgPool) {
    let user = create(&pool, "sessions").await;
    let other = create(&pool, "bystander").await;
    for hash in ["h1", "h2"] {
        SessionRepo::create(&pool, &session(user.id, hash, Duration::days(1)))
            .await
            .unwrap();
    }
    SessionRepo::create(&pool, &session(other.id, "h3", Duration::days(1)))
        .await
        .unwrap();

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 2);
    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 0);
    assert!(SessionRepo::claim(&pool, "h1").await.unwrap().is_none());
    assert!(SessionRepo::claim(&pool, "h3").await.unwrap().is_some());
}
