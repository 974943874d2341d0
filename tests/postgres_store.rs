//! Store tests against a real Postgres, one fresh database per test

use chirpy::auth::generate_refresh_token;
use chirpy::configuration::{get_configuration, DatabaseSettings};
use chirpy::error::StoreError;
use chirpy::store::{PostgresStore, RefreshTokenStore, UserStore};
use chrono::{Duration, Utc};
use sqlx::{Connection, Executor, PgConnection, PgPool};

async fn spawn_store() -> PostgresStore {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let pool = configure_database(&configuration.database).await;

    PostgresStore::new(pool)
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let store = spawn_store().await;

    store.create_user("a@b.com", "hash").await.unwrap();
    let result = store.create_user("a@b.com", "other-hash").await;

    assert!(matches!(result, Err(StoreError::Conflict(_))), "got {:?}", result);
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let store = spawn_store().await;

    let result = store.get_user_by_email("nobody@b.com").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn update_user_replaces_credentials() {
    let store = spawn_store().await;
    let user = store.create_user("a@b.com", "hash").await.unwrap();

    let updated = store.update_user(user.id, "c@d.com", "new-hash").await.unwrap();

    assert_eq!(updated.id, user.id);
    assert_eq!(updated.email, "c@d.com");
    assert_eq!(updated.password_hash, "new-hash");
    assert!(store.get_user_by_email("a@b.com").await.is_err());
}

#[tokio::test]
async fn refresh_token_round_trips_through_the_table() {
    let store = spawn_store().await;
    let user = store.create_user("a@b.com", "hash").await.unwrap();
    let token = generate_refresh_token().unwrap();
    let expires_at = Utc::now() + Duration::hours(1440);

    let created = store
        .create_refresh_token(&token, user.id, expires_at)
        .await
        .unwrap();
    let fetched = store.get_refresh_token(&token).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.user_id, user.id);
    assert!(fetched.revoked_at.is_none());
    assert!((fetched.expires_at - expires_at).num_milliseconds().abs() < 1);
}

#[tokio::test]
async fn duplicate_refresh_token_is_a_conflict() {
    let store = spawn_store().await;
    let user = store.create_user("a@b.com", "hash").await.unwrap();
    let token = generate_refresh_token().unwrap();
    let expires_at = Utc::now() + Duration::hours(1);

    store.create_refresh_token(&token, user.id, expires_at).await.unwrap();
    let result = store.create_refresh_token(&token, user.id, expires_at).await;

    assert!(matches!(result, Err(StoreError::Conflict(_))), "got {:?}", result);
}

#[tokio::test]
async fn revoking_twice_keeps_first_timestamp() {
    let store = spawn_store().await;
    let user = store.create_user("a@b.com", "hash").await.unwrap();
    let token = generate_refresh_token().unwrap();
    store
        .create_refresh_token(&token, user.id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    store.revoke_refresh_token(&token).await.unwrap();
    let first = store.get_refresh_token(&token).await.unwrap().revoked_at;
    assert!(first.is_some());

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    store.revoke_refresh_token(&token).await.unwrap();
    let second = store.get_refresh_token(&token).await.unwrap();

    assert_eq!(second.revoked_at, first);
    assert!(second.updated_at >= first.unwrap());
}

#[tokio::test]
async fn revoking_unknown_token_is_not_found() {
    let store = spawn_store().await;

    let result = store.revoke_refresh_token(&generate_refresh_token().unwrap()).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let lookup = store.get_refresh_token("missing").await;
    assert!(matches!(lookup, Err(StoreError::NotFound(_))));
}
