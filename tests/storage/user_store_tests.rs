//! UserStore interface tests.
//!
//! These tests verify the contract of the UserStore trait.
//! Each storage implementation should run these tests.

use chrono::NaiveDate;

use startup_profit::auth::hash_password;
use startup_profit::interfaces::{NewUser, ProfileUpdate, StoreError, UserProfile, UserStore};

/// Profile with a recognisable email per user.
pub fn make_profile(username: &str) -> UserProfile {
    UserProfile {
        email: format!("{}@example.com", username),
        phone_no: "5550100".to_string(),
        r_address: "12 Analytical Way".to_string(),
        gender: "female".to_string(),
        age: 36,
        dob: NaiveDate::from_ymd_opt(1988, 12, 10).expect("valid date"),
    }
}

pub fn make_user(username: &str, password: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password_hash: hash_password(password),
        profile: make_profile(username),
    }
}

// =============================================================================
// UserStore::insert_user tests
// =============================================================================

pub async fn test_insert_returns_distinct_ids<S: UserStore>(store: &S) {
    let first = store
        .insert_user(&make_user("test_ids_a", "pw"))
        .await
        .expect("insert should succeed");
    let second = store
        .insert_user(&make_user("test_ids_b", "pw"))
        .await
        .expect("insert should succeed");

    assert_ne!(first, second, "ids should be distinct");
}

pub async fn test_insert_duplicate_username<S: UserStore>(store: &S) {
    store
        .insert_user(&make_user("test_dup", "pw"))
        .await
        .expect("first insert should succeed");

    let err = store
        .insert_user(&make_user("test_dup", "other"))
        .await
        .expect_err("second insert should fail");
    assert!(
        matches!(err, StoreError::UsernameTaken(ref name) if name == "test_dup"),
        "expected UsernameTaken, got {err:?}"
    );
}

// =============================================================================
// UserStore lookup tests
// =============================================================================

pub async fn test_find_by_credentials<S: UserStore>(store: &S) {
    store
        .insert_user(&make_user("test_login", "s3cret"))
        .await
        .expect("insert should succeed");

    let found = store
        .find_by_credentials("test_login", &hash_password("s3cret"))
        .await
        .expect("lookup should succeed")
        .expect("credentials should match");
    assert_eq!(found.username, "test_login");
    assert_eq!(found.profile, make_profile("test_login"));

    let wrong = store
        .find_by_credentials("test_login", &hash_password("guess"))
        .await
        .expect("lookup should succeed");
    assert!(wrong.is_none(), "wrong password should not match");
}

pub async fn test_find_unknown_user<S: UserStore>(store: &S) {
    let found = store
        .find_by_credentials("test_nobody", &hash_password("pw"))
        .await
        .expect("lookup should succeed");
    assert!(found.is_none());

    let found = store.find_by_id(i64::MAX).await.expect("lookup should succeed");
    assert!(found.is_none());
}

pub async fn test_find_by_id_round_trips_profile<S: UserStore>(store: &S) {
    let id = store
        .insert_user(&make_user("test_by_id", "pw"))
        .await
        .expect("insert should succeed");

    let found = store
        .find_by_id(id)
        .await
        .expect("lookup should succeed")
        .expect("user should exist");
    assert_eq!(found.id, id);
    assert_eq!(found.password_hash, hash_password("pw"));
    assert_eq!(found.profile.dob, make_profile("test_by_id").dob);
}

// =============================================================================
// UserStore::update_user tests
// =============================================================================

pub async fn test_update_user<S: UserStore>(store: &S) {
    let id = store
        .insert_user(&make_user("test_update", "pw"))
        .await
        .expect("insert should succeed");

    let mut profile = make_profile("test_update");
    profile.age = 40;
    profile.r_address = "1 New Street".to_string();
    store
        .update_user(
            id,
            &ProfileUpdate {
                username: "test_update_renamed".to_string(),
                profile: profile.clone(),
            },
        )
        .await
        .expect("update should succeed");

    let found = store
        .find_by_id(id)
        .await
        .expect("lookup should succeed")
        .expect("user should exist");
    assert_eq!(found.username, "test_update_renamed");
    assert_eq!(found.profile, profile);
    assert_eq!(found.password_hash, hash_password("pw"), "password unchanged");
}

pub async fn test_update_to_taken_username<S: UserStore>(store: &S) {
    store
        .insert_user(&make_user("test_taken", "pw"))
        .await
        .expect("insert should succeed");
    let id = store
        .insert_user(&make_user("test_taker", "pw"))
        .await
        .expect("insert should succeed");

    let err = store
        .update_user(
            id,
            &ProfileUpdate {
                username: "test_taken".to_string(),
                profile: make_profile("test_taker"),
            },
        )
        .await
        .expect_err("rename onto an existing username should fail");
    assert!(matches!(err, StoreError::UsernameTaken(_)), "got {err:?}");
}

pub async fn test_update_missing_user<S: UserStore>(store: &S) {
    let err = store
        .update_user(
            i64::MAX,
            &ProfileUpdate {
                username: "test_ghost".to_string(),
                profile: make_profile("test_ghost"),
            },
        )
        .await
        .expect_err("update of a missing row should fail");
    assert!(matches!(err, StoreError::NotFound(id) if id == i64::MAX), "got {err:?}");
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all UserStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_user_store_tests {
    ($store:expr) => {
        use $crate::storage::user_store_tests::*;

        test_insert_returns_distinct_ids($store).await;
        println!("  test_insert_returns_distinct_ids: PASSED");

        test_insert_duplicate_username($store).await;
        println!("  test_insert_duplicate_username: PASSED");

        test_find_by_credentials($store).await;
        println!("  test_find_by_credentials: PASSED");

        test_find_unknown_user($store).await;
        println!("  test_find_unknown_user: PASSED");

        test_find_by_id_round_trips_profile($store).await;
        println!("  test_find_by_id_round_trips_profile: PASSED");

        test_update_user($store).await;
        println!("  test_update_user: PASSED");

        test_update_to_taken_username($store).await;
        println!("  test_update_to_taken_username: PASSED");

        test_update_missing_user($store).await;
        println!("  test_update_missing_user: PASSED");
    };
}
