//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 降级与故障传播测试：使用可注入故障的层

#[path = "../common/mod.rs"]
mod common;

use common::{Op, ScriptedHarness};
use flagcache::error::{FlagError, Tier};
use flagcache::{DeleteOrder, Flag, FlagStore};

fn harness() -> ScriptedHarness {
    ScriptedHarness::new(DeleteOrder::DurableFirst)
}

#[tokio::test]
async fn test_get_falls_back_when_cache_is_down() {
    let h = harness();
    h.durable.inner().set(&Flag::new("beta", true)).await.unwrap();
    h.cache.fail(Op::Get);

    let found = h.store.get("beta").await.unwrap();
    assert_eq!(found, Some(Flag::new("beta", true)));
    // 回退路径上仍尝试回填
    assert_eq!(h.cache.calls(Op::Set), 1);
    assert_eq!(h.cache.inner().get("beta").await.unwrap(), Some(Flag::new("beta", true)));
    assert_eq!(h.store.metrics().count("cache", "get", "error"), 1);
}

#[tokio::test]
async fn test_get_fallback_swallows_repopulation_failure() {
    let h = harness();
    h.durable.inner().set(&Flag::new("beta", true)).await.unwrap();
    h.cache.fail(Op::Get);
    h.cache.fail(Op::Set);

    let found = h.store.get("beta").await.unwrap();
    assert_eq!(found, Some(Flag::new("beta", true)));
    assert_eq!(h.store.metrics().count("cache", "repopulate", "failed"), 1);
}

#[tokio::test]
async fn test_get_fallback_miss_does_not_touch_cache() {
    let h = harness();
    h.cache.fail(Op::Get);

    assert_eq!(h.store.get("ghost").await.unwrap(), None);
    assert_eq!(h.cache.calls(Op::Set), 0);
}

#[tokio::test]
async fn test_get_propagates_population_failure_on_plain_miss() {
    let h = harness();
    h.durable.inner().set(&Flag::new("beta", true)).await.unwrap();
    h.cache.fail(Op::Set);

    let err = h.store.get("beta").await.unwrap_err();
    assert!(matches!(
        err,
        FlagError::Unavailable {
            tier: Tier::Cache,
            ..
        }
    ));
}

#[tokio::test]
async fn test_get_propagates_durable_failure() {
    let h = harness();
    h.durable.fail(Op::Get);

    let err = h.store.get("beta").await.unwrap_err();
    assert_eq!(err.tier(), Some(Tier::Durable));

    // 缓存与持久层同时故障时同样返回持久层错误
    h.cache.fail(Op::Get);
    let err = h.store.get("beta").await.unwrap_err();
    assert_eq!(err.tier(), Some(Tier::Durable));
}

#[tokio::test]
async fn test_set_aborts_when_durable_store_fails() {
    let h = harness();
    h.durable.fail(Op::Set);

    let err = h.store.set(&Flag::new("beta", true)).await.unwrap_err();
    assert_eq!(err.tier(), Some(Tier::Durable));
    assert_eq!(h.cache.calls(Op::Set), 0);
    assert_eq!(h.cache.inner().get("beta").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_reports_partial_write_when_cache_fails() {
    let h = harness();
    h.cache.fail(Op::Set);

    let err = h.store.set(&Flag::new("beta", true)).await.unwrap_err();
    match err {
        FlagError::PartialWrite { key, source } => {
            assert_eq!(key, "beta");
            assert!(source.is_unavailable());
        }
        other => panic!("expected PartialWrite, got {:?}", other),
    }
    assert_eq!(
        h.durable.inner().get("beta").await.unwrap(),
        Some(Flag::new("beta", true))
    );
    assert_eq!(h.store.metrics().count("store", "set", "partial_write"), 1);
}

#[tokio::test]
async fn test_durable_first_delete_order() {
    let h = harness();
    h.store.set(&Flag::new("beta", true)).await.unwrap();
    h.clear_journal();

    h.store.delete("beta").await.unwrap();
    assert_eq!(h.journal(), vec!["durable:delete", "cache:delete"]);
}

#[tokio::test]
async fn test_durable_first_failure_leaves_cache_untouched() {
    let h = harness();
    h.store.set(&Flag::new("beta", true)).await.unwrap();
    h.durable.fail(Op::Delete);

    let err = h.store.delete("beta").await.unwrap_err();
    assert_eq!(err.tier(), Some(Tier::Durable));
    assert_eq!(h.cache.calls(Op::Delete), 0);
    assert_eq!(
        h.cache.inner().get("beta").await.unwrap(),
        Some(Flag::new("beta", true))
    );
}

#[tokio::test]
async fn test_cache_first_delete_order() {
    let h = ScriptedHarness::new(DeleteOrder::CacheFirst);
    h.store.set(&Flag::new("beta", true)).await.unwrap();
    h.clear_journal();

    h.store.delete("beta").await.unwrap();
    assert_eq!(h.journal(), vec!["cache:delete", "durable:delete"]);
}

#[tokio::test]
async fn test_cache_first_cache_failure_skips_durable() {
    let h = ScriptedHarness::new(DeleteOrder::CacheFirst);
    h.store.set(&Flag::new("beta", true)).await.unwrap();
    h.cache.fail(Op::Delete);

    let err = h.store.delete("beta").await.unwrap_err();
    assert_eq!(err.tier(), Some(Tier::Cache));
    assert_eq!(h.durable.calls(Op::Delete), 0);
}

#[tokio::test]
async fn test_cache_first_durable_failure_resurrects_on_next_read() {
    let h = ScriptedHarness::new(DeleteOrder::CacheFirst);
    h.store.set(&Flag::new("beta", true)).await.unwrap();
    h.durable.fail(Op::Delete);

    assert!(h.store.delete("beta").await.is_err());
    assert_eq!(h.cache.inner().get("beta").await.unwrap(), None);

    // 持久层仍有旧记录，下一次读取把它写回缓存
    assert_eq!(
        h.store.get("beta").await.unwrap(),
        Some(Flag::new("beta", true))
    );
    assert_eq!(
        h.cache.inner().get("beta").await.unwrap(),
        Some(Flag::new("beta", true))
    );
}

#[tokio::test]
async fn test_get_all_propagates_cache_enumeration_failure() {
    let h = harness();
    h.durable.inner().set(&Flag::new("beta", true)).await.unwrap();
    h.cache.fail(Op::GetAll);

    let err = h.store.get_all().await.unwrap_err();
    assert_eq!(err.tier(), Some(Tier::Cache));
    assert_eq!(h.durable.calls(Op::GetAll), 0);
}

#[tokio::test]
async fn test_get_all_with_zero_flags_rescans_durable_every_time() {
    let h = harness();
    assert!(h.store.get_all().await.unwrap().is_empty());
    assert!(h.store.get_all().await.unwrap().is_empty());
    assert_eq!(h.durable.calls(Op::GetAll), 2);
}

#[tokio::test]
async fn test_get_all_swallows_repopulation_failure() {
    let h = harness();
    h.durable.inner().set(&Flag::new("a", true)).await.unwrap();
    h.durable.inner().set(&Flag::new("b", false)).await.unwrap();
    h.cache.fail(Op::Set);

    let flags = h.store.get_all().await.unwrap();
    assert_eq!(flags, vec![Flag::new("a", true), Flag::new("b", false)]);
    assert_eq!(h.cache.calls(Op::Set), 2);
    assert_eq!(h.store.metrics().count("cache", "repopulate", "failed"), 1);
}

#[tokio::test]
async fn test_get_all_propagates_durable_failure_on_cold_cache() {
    let h = harness();
    h.durable.fail(Op::GetAll);

    let err = h.store.get_all().await.unwrap_err();
    assert_eq!(err.tier(), Some(Tier::Durable));
}

#[tokio::test]
async fn test_health_reports_failed_tier() {
    let h = harness();
    assert!(h.store.health().await.is_healthy());

    h.cache.fail(Op::Ping);
    let report = h.store.health().await;
    assert!(!report.is_healthy());
    assert!(!report.cache.is_up());
    assert!(report.store.is_up());
    assert_eq!(report.status(), "degraded");

    h.cache.recover(Op::Ping);
    assert!(h.store.health().await.is_healthy());
}

#[tokio::test]
async fn test_failed_operations_are_timed() {
    let h = harness();
    h.durable.fail(Op::Set);
    h.durable.fail(Op::Delete);
    h.cache.fail(Op::GetAll);

    assert!(h.store.set(&Flag::new("beta", true)).await.is_err());
    assert!(h.store.get_all().await.is_err());
    assert!(h.store.delete("beta").await.is_err());

    let metrics = h.store.metrics();
    assert_eq!(metrics.duration_count("set"), 1);
    assert_eq!(metrics.duration_count("get_all"), 1);
    assert_eq!(metrics.duration_count("delete"), 1);
}

#[tokio::test]
async fn test_partial_write_is_timed() {
    let h = harness();
    h.cache.fail(Op::Set);

    assert!(h.store.set(&Flag::new("beta", true)).await.is_err());
    assert_eq!(h.store.metrics().duration_count("set"), 1);
}
