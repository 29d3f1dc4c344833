use fibervision_core::roles::Role;
use fibervision_core::types::DbId;
use fibervision_core::widgets::{SizePreset, WidgetConfig, WidgetType};
use fibervision_db::models::user::CreateUser;
use fibervision_db::repositories::{DashboardLayoutRepo, RoleRepo, UserRepo};
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, username: &str) -> DbId {
    let role = RoleRepo::find(pool, Role::User).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Test User".into(),
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".into(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
    .id
}

fn stat_card(id: &str, x: u32, y: u32) -> WidgetConfig {
    let mut widget = WidgetConfig::new(WidgetType::StatCard, "Cameras", SizePreset::Medium.size());
    widget.id = id.into();
    widget.x = Some(x);
    widget.y = Some(y);
    widget.data = serde_json::json!({ "value": 12 }).as_object().cloned();
    widget
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn absent_layout_is_none(pool: PgPool) {
    let user_id = seed_user(&pool, "empty").await;
    assert!(DashboardLayoutRepo::find_by_user(&pool, user_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_then_fetch_round_trips_and_bumps_version(pool: PgPool) {
    let user_id = seed_user(&pool, "saver").await;
    let widgets = vec![stat_card("w1", 0, 0), stat_card("w2", 4, 0)];

    let first = DashboardLayoutRepo::save(&pool, user_id, &widgets).await.unwrap();
    assert_eq!(first.version, 1);

    let fetched = DashboardLayoutRepo::find_by_user(&pool, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.layout.0, widgets);

    let second = DashboardLayoutRepo::save(&pool, user_id, &widgets[..1]).await.unwrap();
    assert_eq!(second.version, 2);
    assert_eq!(second.id, first.id);
    assert_eq!(second.layout.0.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn layouts_are_per_user(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    DashboardLayoutRepo::save(&pool, alice, &[stat_card("a", 0, 0)]).await.unwrap();

    assert!(DashboardLayoutRepo::find_by_user(&pool, bob).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_is_idempotent(pool: PgPool) {
    let user_id = seed_user(&pool, "clearer").await;
    DashboardLayoutRepo::save(&pool, user_id, &[stat_card("w", 0, 0)]).await.unwrap();

    assert!(DashboardLayoutRepo::delete_by_user(&pool, user_id).await.unwrap());
    assert!(!DashboardLayoutRepo::delete_by_user(&pool, user_id).await.unwrap());
    assert!(DashboardLayoutRepo::find_by_user(&pool, user_id).await.unwrap().is_none());

    // A save after a clear starts over.
    let row = DashboardLayoutRepo::save(&pool, user_id, &[]).await.unwrap();
    assert_eq!(row.version, 1);
}
