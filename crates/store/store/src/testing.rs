//! Shared conformance suites. Every backend runs these from its own tests.
//!
//! Each test uses fresh owners and unique emails, so a single store instance
//! (including a shared database) can run the whole suite.

use chrono::{DateTime, TimeZone, Utc};

use pantry_core::{
    ExpiredItemCount, ItemId, ItemPatch, MonthlyWaste, NewItem, NewUser, StatusSplit,
    TOP_EXPIRED_LIMIT, UserId, UserPatch,
};

use crate::error::StoreError;
use crate::items::ItemStore;
use crate::stats::StatisticsStore;
use crate::users::UserStore;

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid calendar date")
}

fn new_item(name: &str, expiry: DateTime<Utc>, owner: UserId) -> NewItem {
    NewItem::new(name, "Pantry", expiry, owner).expect("valid test item")
}

/// Run the full item store conformance test suite.
///
/// # Errors
///
/// Returns an error if the backend fails; assertion failures panic.
pub async fn run_item_store_conformance_tests(store: &dyn ItemStore) -> Result<(), StoreError> {
    test_get_missing(store).await?;
    test_insert_and_get(store).await?;
    test_list_by_owner_in_creation_order(store).await?;
    test_update(store).await?;
    test_update_missing(store).await?;
    test_delete(store).await?;
    test_count_tracks_inserts_and_deletes(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn ItemStore) -> Result<(), StoreError> {
    let item = store.get(ItemId::new_v4()).await?;
    assert!(item.is_none(), "get on unknown id should return None");
    Ok(())
}

async fn test_insert_and_get(store: &dyn ItemStore) -> Result<(), StoreError> {
    let owner = UserId::new_v4();
    let created = store
        .insert(new_item("Milk", at(2024, 1, 10), owner).with_notes("2%"))
        .await?;
    assert_eq!(created.name, "Milk");
    assert_eq!(created.category, "Pantry");
    assert_eq!(created.notes, "2%");
    assert_eq!(created.added_by, owner);
    assert_eq!(created.expiry_date, at(2024, 1, 10));

    let fetched = store.get(created.id).await?;
    assert_eq!(fetched.as_ref(), Some(&created));
    Ok(())
}

async fn test_list_by_owner_in_creation_order(store: &dyn ItemStore) -> Result<(), StoreError> {
    let owner = UserId::new_v4();
    let other = UserId::new_v4();
    for name in ["first", "second", "third"] {
        store.insert(new_item(name, at(2024, 3, 1), owner)).await?;
        store.insert(new_item(name, at(2024, 3, 1), other)).await?;
    }

    let items = store.list_by_owner(&owner).await?;
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
    assert!(items.iter().all(|i| i.added_by == owner));

    let nobody = store.list_by_owner(&UserId::new_v4()).await?;
    assert!(nobody.is_empty(), "unknown owner should have no items");
    Ok(())
}

async fn test_update(store: &dyn ItemStore) -> Result<(), StoreError> {
    let owner = UserId::new_v4();
    let created = store.insert(new_item("Bread", at(2024, 2, 1), owner)).await?;
    let patch = ItemPatch {
        expiry_date: Some(at(2024, 2, 5)),
        notes: Some("sourdough".into()),
        ..ItemPatch::default()
    };

    let updated = store
        .update(created.id, &patch)
        .await?
        .expect("update of existing item should return it");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.expiry_date, at(2024, 2, 5));
    assert_eq!(updated.notes, "sourdough");
    assert_eq!(updated.name, "Bread");
    assert_eq!(updated.added_by, owner);
    assert_eq!(updated.created_at, created.created_at);

    let fetched = store.get(created.id).await?;
    assert_eq!(fetched, Some(updated));
    Ok(())
}

async fn test_update_missing(store: &dyn ItemStore) -> Result<(), StoreError> {
    let patch = ItemPatch {
        name: Some("Ghost".into()),
        ..ItemPatch::default()
    };
    let result = store.update(ItemId::new_v4(), &patch).await?;
    assert!(result.is_none(), "update on unknown id should return None");
    Ok(())
}

async fn test_delete(store: &dyn ItemStore) -> Result<(), StoreError> {
    let owner = UserId::new_v4();
    let created = store.insert(new_item("Eggs", at(2024, 4, 1), owner)).await?;

    let removed = store.delete(created.id).await?;
    assert_eq!(removed.as_ref().map(|i| i.id), Some(created.id));
    assert!(store.get(created.id).await?.is_none());
    assert!(store.list_by_owner(&owner).await?.is_empty());

    let again = store.delete(created.id).await?;
    assert!(again.is_none(), "second delete should return None");
    Ok(())
}

async fn test_count_tracks_inserts_and_deletes(store: &dyn ItemStore) -> Result<(), StoreError> {
    let owner = UserId::new_v4();
    let before = store.count().await?;
    let a = store.insert(new_item("A", at(2024, 5, 1), owner)).await?;
    store.insert(new_item("B", at(2024, 5, 2), owner)).await?;
    assert_eq!(store.count().await?, before + 2);

    store.delete(a.id).await?;
    assert_eq!(store.count().await?, before + 1);
    Ok(())
}

/// Check a statistics backend against the items it aggregates.
///
/// `items` must be the store that `stats` reads from.
///
/// # Errors
///
/// Returns an error if the backend fails; assertion failures panic.
pub async fn run_statistics_conformance_tests(
    items: &dyn ItemStore,
    stats: &dyn StatisticsStore,
) -> Result<(), StoreError> {
    test_stats_scenario(items, stats).await?;
    test_stats_empty_owner(stats).await?;
    test_stats_strict_boundary(items, stats).await?;
    test_stats_trend_and_ranking(items, stats).await?;
    Ok(())
}

async fn test_stats_scenario(
    items: &dyn ItemStore,
    stats: &dyn StatisticsStore,
) -> Result<(), StoreError> {
    let owner = UserId::new_v4();
    items.insert(new_item("A", at(2024, 1, 10), owner)).await?;
    items.insert(new_item("B", at(2024, 1, 20), owner)).await?;
    items.insert(new_item("C", at(2030, 12, 1), owner)).await?;
    // Another owner's items never leak in.
    items
        .insert(new_item("A", at(2024, 1, 5), UserId::new_v4()))
        .await?;

    let report = stats.report(&owner, at(2024, 2, 1)).await?;
    assert_eq!(
        report.status_split,
        StatusSplit {
            expired: 2,
            active: 1
        }
    );
    assert_eq!(
        report.monthly_trend,
        vec![MonthlyWaste {
            year: 2024,
            month: 1,
            expired_count: 2
        }]
    );
    assert_eq!(
        report.top_expired,
        vec![
            ExpiredItemCount {
                item_name: "A".into(),
                count: 1
            },
            ExpiredItemCount {
                item_name: "B".into(),
                count: 1
            },
        ]
    );
    Ok(())
}

async fn test_stats_empty_owner(stats: &dyn StatisticsStore) -> Result<(), StoreError> {
    let report = stats.report(&UserId::new_v4(), at(2024, 2, 1)).await?;
    assert_eq!(report.status_split, StatusSplit::default());
    assert!(report.monthly_trend.is_empty());
    assert!(report.top_expired.is_empty());
    Ok(())
}

async fn test_stats_strict_boundary(
    items: &dyn ItemStore,
    stats: &dyn StatisticsStore,
) -> Result<(), StoreError> {
    let owner = UserId::new_v4();
    let now = at(2024, 6, 1);
    items.insert(new_item("Yogurt", now, owner)).await?;

    let split = stats.status_split(&owner, now).await?;
    assert_eq!(
        split,
        StatusSplit {
            expired: 0,
            active: 1
        },
        "an item expiring exactly now is active"
    );
    Ok(())
}

async fn test_stats_trend_and_ranking(
    items: &dyn ItemStore,
    stats: &dyn StatisticsStore,
) -> Result<(), StoreError> {
    let owner = UserId::new_v4();
    let fixtures = [
        ("Milk", at(2023, 11, 3)),
        ("Milk", at(2023, 11, 20)),
        ("Milk", at(2024, 1, 2)),
        ("Bread", at(2024, 1, 9)),
        ("Bread", at(2022, 5, 1)),
        ("Apple", at(2024, 1, 15)),
        ("Apple", at(2024, 1, 16)),
        ("Kale", at(2023, 3, 1)),
        ("Ham", at(2023, 3, 2)),
        ("Tofu", at(2023, 3, 3)),
        ("Rice", at(2031, 1, 1)),
    ];
    for (name, expiry) in fixtures {
        items.insert(new_item(name, expiry, owner)).await?;
    }
    let now = at(2024, 2, 1);

    let trend = stats.monthly_trend(&owner, now).await?;
    let buckets: Vec<(i32, u32, u64)> = trend
        .iter()
        .map(|m| (m.year, m.month, m.expired_count))
        .collect();
    assert_eq!(
        buckets,
        vec![(2022, 5, 1), (2023, 3, 3), (2023, 11, 2), (2024, 1, 4)]
    );

    let top = stats.top_expired(&owner, now, TOP_EXPIRED_LIMIT).await?;
    let ranked: Vec<(&str, u64)> = top.iter().map(|e| (e.item_name.as_str(), e.count)).collect();
    assert_eq!(
        ranked,
        vec![
            ("Milk", 3),
            ("Apple", 2),
            ("Bread", 2),
            ("Ham", 1),
            ("Kale", 1)
        ]
    );

    let top_two = stats.top_expired(&owner, now, 2).await?;
    assert_eq!(top_two.len(), 2);
    Ok(())
}

/// Run the full user store conformance test suite.
///
/// # Errors
///
/// Returns an error if the backend fails; assertion failures panic.
pub async fn run_user_store_conformance_tests(store: &dyn UserStore) -> Result<(), StoreError> {
    test_user_insert_and_lookup(store).await?;
    test_user_duplicate_email(store).await?;
    test_user_update(store).await?;
    test_user_update_email_conflict(store).await?;
    test_user_update_missing(store).await?;
    Ok(())
}

fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@example.com", UserId::new_v4())
}

fn new_user(email: &str) -> NewUser {
    NewUser::new("Test User", email, "$argon2id$test").expect("valid test user")
}

async fn test_user_insert_and_lookup(store: &dyn UserStore) -> Result<(), StoreError> {
    let email = unique_email("lookup");
    let created = store.insert(new_user(&email)).await?;
    assert_eq!(created.email, email);
    assert_eq!(created.password_hash, "$argon2id$test");

    assert_eq!(store.get(created.id).await?.as_ref(), Some(&created));
    assert_eq!(store.find_by_email(&email).await?.as_ref(), Some(&created));
    assert!(store.get(UserId::new_v4()).await?.is_none());
    assert!(
        store
            .find_by_email(&unique_email("nobody"))
            .await?
            .is_none()
    );
    Ok(())
}

async fn test_user_duplicate_email(store: &dyn UserStore) -> Result<(), StoreError> {
    let email = unique_email("dup");
    store.insert(new_user(&email)).await?;
    let result = store.insert(new_user(&email)).await;
    assert!(
        matches!(result, Err(StoreError::Conflict(_))),
        "duplicate email should conflict, got {result:?}"
    );
    Ok(())
}

async fn test_user_update(store: &dyn UserStore) -> Result<(), StoreError> {
    let old_email = unique_email("before");
    let created = store.insert(new_user(&old_email)).await?;
    let new_email = unique_email("after");
    let patch = UserPatch {
        fullname: Some("Renamed".into()),
        email: Some(new_email.clone()),
        password_hash: None,
    };

    let updated = store
        .update(created.id, &patch)
        .await?
        .expect("update of existing user should return it");
    assert_eq!(updated.fullname, "Renamed");
    assert_eq!(updated.email, new_email);
    assert_eq!(updated.password_hash, created.password_hash);

    assert!(store.find_by_email(&old_email).await?.is_none());
    assert_eq!(
        store.find_by_email(&new_email).await?.map(|u| u.id),
        Some(created.id)
    );
    Ok(())
}

async fn test_user_update_email_conflict(store: &dyn UserStore) -> Result<(), StoreError> {
    let taken = unique_email("taken");
    store.insert(new_user(&taken)).await?;
    let mover = store.insert(new_user(&unique_email("mover"))).await?;
    let patch = UserPatch {
        email: Some(taken),
        ..UserPatch::default()
    };
    let result = store.update(mover.id, &patch).await;
    assert!(
        matches!(result, Err(StoreError::Conflict(_))),
        "moving onto a taken email should conflict, got {result:?}"
    );
    Ok(())
}

async fn test_user_update_missing(store: &dyn UserStore) -> Result<(), StoreError> {
    let patch = UserPatch {
        fullname: Some("Nobody".into()),
        ..UserPatch::default()
    };
    assert!(store.update(UserId::new_v4(), &patch).await?.is_none());
    Ok(())
}
