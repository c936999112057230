//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 缓存开关存储的行为测试：内存缓存 + 内存SQLite

#[path = "../common/mod.rs"]
mod common;

use common::memory_store;
use flagcache::{Flag, FlagStore};

#[tokio::test]
async fn test_set_then_get_returns_flag_unchanged() {
    let store = memory_store().await;
    let flag = Flag::new("checkout.v2", true).with_description("new checkout flow");

    store.set(&flag).await.unwrap();
    assert_eq!(store.get("checkout.v2").await.unwrap(), Some(flag.clone()));

    // 缓存被清空后从持久层读回的值相同
    store.cache().clear().await;
    assert_eq!(store.get("checkout.v2").await.unwrap(), Some(flag));
}

#[tokio::test]
async fn test_get_unknown_key_is_not_found() {
    let store = memory_store().await;
    assert_eq!(store.get("never-written").await.unwrap(), None);
    // 未命中不会在缓存中留下任何记录
    assert!(store.cache().get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_is_idempotent() {
    let store = memory_store().await;
    let flag = Flag::new("beta", true);

    store.set(&flag).await.unwrap();
    store.set(&flag).await.unwrap();

    assert_eq!(store.get_all().await.unwrap(), vec![flag.clone()]);
    assert_eq!(store.durable().get_all().await.unwrap(), vec![flag]);
}

#[tokio::test]
async fn test_set_replaces_whole_record() {
    let store = memory_store().await;
    store
        .set(&Flag::new("beta", true).with_description("first"))
        .await
        .unwrap();
    store.set(&Flag::new("beta", false)).await.unwrap();

    let expected = Flag::new("beta", false);
    assert_eq!(store.get("beta").await.unwrap(), Some(expected.clone()));
    assert_eq!(store.durable().get("beta").await.unwrap(), Some(expected));
}

#[tokio::test]
async fn test_delete_absent_key_is_ok() {
    let store = memory_store().await;
    store.delete("ghost").await.unwrap();
    assert_eq!(store.get("ghost").await.unwrap(), None);
}

#[tokio::test]
async fn test_cache_miss_repopulates_cache() {
    let store = memory_store().await;
    let flag = Flag::new("durable-only", true);
    store.durable().set(&flag).await.unwrap();

    assert_eq!(store.get("durable-only").await.unwrap(), Some(flag.clone()));
    assert_eq!(store.cache().get("durable-only").await.unwrap(), Some(flag));
    assert_eq!(store.metrics().count("cache", "get", "miss"), 1);
    assert_eq!(store.metrics().count("cache", "repopulate", "ok"), 1);
}

#[tokio::test]
async fn test_cache_hit_short_circuits_durable_store() {
    let store = memory_store().await;
    let cached = Flag::new("split", true);
    let durable = Flag::new("split", false);
    store.cache().set(&cached).await.unwrap();
    store.durable().set(&durable).await.unwrap();

    assert_eq!(store.get("split").await.unwrap(), Some(cached));
    assert_eq!(store.metrics().count("durable", "get", "hit"), 0);
}

#[tokio::test]
async fn test_beta_lifecycle_scenario() {
    let store = memory_store().await;

    store.set(&Flag::new("beta", true)).await.unwrap();
    assert_eq!(store.get("beta").await.unwrap(), Some(Flag::new("beta", true)));

    store.set(&Flag::new("beta", false)).await.unwrap();
    assert_eq!(
        store.get("beta").await.unwrap(),
        Some(Flag::new("beta", false))
    );

    store.delete("beta").await.unwrap();
    assert_eq!(store.get("beta").await.unwrap(), None);
    assert_eq!(store.cache().get("beta").await.unwrap(), None);
    assert_eq!(store.durable().get("beta").await.unwrap(), None);
}

#[tokio::test]
async fn test_get_all_with_no_flags_is_empty() {
    let store = memory_store().await;
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_all_cold_cache_reads_durable_and_warms_cache() {
    let store = memory_store().await;
    for key in ["gamma", "alpha", "beta"] {
        store.durable().set(&Flag::new(key, true)).await.unwrap();
    }

    let keys: Vec<String> = store
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.key)
        .collect();
    assert_eq!(keys, vec!["alpha", "beta", "gamma"]);
    assert_eq!(store.cache().get_all().await.unwrap().len(), 3);
    assert_eq!(store.metrics().count("cache", "get_all", "miss"), 1);

    store.get_all().await.unwrap();
    assert_eq!(store.metrics().count("cache", "get_all", "hit"), 1);
}

#[tokio::test]
async fn test_get_all_returns_cache_view_when_non_empty() {
    let store = memory_store().await;
    store.set(&Flag::new("a", true)).await.unwrap();
    // 绕过缓存写入的持久记录在缓存非空时不可见
    store.durable().set(&Flag::new("b", true)).await.unwrap();

    let flags = store.get_all().await.unwrap();
    assert_eq!(flags, vec![Flag::new("a", true)]);
}

#[tokio::test]
async fn test_invalid_keys_are_rejected() {
    let store = memory_store().await;
    let too_long = "k".repeat(257);
    for key in ["", too_long.as_str()] {
        assert!(store.set(&Flag::new(key, true)).await.is_err());
        assert!(store.get(key).await.is_err());
        assert!(store.delete(key).await.is_err());
    }
    assert!(store.durable().get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_keys_with_spaces_slashes_and_unicode_roundtrip() {
    let store = memory_store().await;
    for key in ["new checkout", "team/search", "café"] {
        let flag = Flag::new(key, true).with_description("free-form key");
        store.set(&flag).await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), Some(flag.clone()));

        store.cache().clear().await;
        assert_eq!(store.get(key).await.unwrap(), Some(flag));

        store.delete(key).await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), None);
    }
}

#[tokio::test]
async fn test_listed_flags_can_be_read_and_deleted() {
    let store = memory_store().await;
    store
        .durable()
        .set(&Flag::new("legacy flag", true))
        .await
        .unwrap();

    let listed = store.get_all().await.unwrap();
    assert_eq!(listed, vec![Flag::new("legacy flag", true)]);

    for flag in &listed {
        assert_eq!(store.get(&flag.key).await.unwrap(), Some(flag.clone()));
        store.delete(&flag.key).await.unwrap();
    }
    assert!(store.durable().get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_warmup_then_reads_hit_cache() {
    let store = memory_store().await;
    store.durable().set(&Flag::new("a", true)).await.unwrap();
    store.durable().set(&Flag::new("b", false)).await.unwrap();

    assert_eq!(store.warmup().await.unwrap(), 2);
    store.get("a").await.unwrap();
    store.get("b").await.unwrap();
    assert_eq!(store.metrics().count("cache", "get", "hit"), 2);
}
