//! Cache layer tests
//!
//! Hit/miss accounting, grant list canonicalization, LRU eviction with
//! small engines, and concurrent access.

use cretoai_acl::{AclConfig, AclEngine, EvaluationContext};
use std::sync::Arc;
use std::thread;

fn small_engine(checkers: usize) -> AclEngine {
    let config = AclConfig::default()
        .with_pattern_cache_capacity(4)
        .with_substitution_cache_capacity(4)
        .with_checker_cache_capacity(checkers)
        .with_shards(1);
    AclEngine::new(config).unwrap()
}

// ============================================================================
// BASIC CACHE OPERATIONS
// ============================================================================

#[test]
fn test_checker_cache_hit() {
    let engine = AclEngine::default();
    let ctx = EvaluationContext::new("u1");

    let first = engine.checker(&["a.b", "c.*"], &ctx);
    let second = engine.checker(&["a.b", "c.*"], &ctx);
    assert!(Arc::ptr_eq(&first, &second));

    let stats = engine.stats().checkers;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_grant_order_collapses() {
    let engine = AclEngine::default();
    let ctx = EvaluationContext::new("u1");

    let first = engine.checker(&["a.b", "c.*", "!d"], &ctx);
    let second = engine.checker(&["!d", "a.b", "c.*", "a.b"], &ctx);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.stats().checkers.entries, 1);
}

#[test]
fn test_context_separates_entries() {
    let engine = AclEngine::default();
    let grants = ["users.me.read"];

    engine.checker(&grants, &EvaluationContext::new("u1"));
    engine.checker(&grants, &EvaluationContext::new("u2"));
    engine.checker(&grants, &EvaluationContext::new("u1").with_session("s1"));

    assert_eq!(engine.stats().checkers.entries, 3);
    assert_eq!(engine.stats().substitutions.entries, 3);
}

#[test]
fn test_patterns_shared_across_subjects() {
    let engine = AclEngine::default();

    engine.checker(&["a.b", "c.#"], &EvaluationContext::new("u1"));
    engine.checker(&["a.b", "c.#"], &EvaluationContext::new("u2"));

    let stats = engine.stats().patterns;
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 2);
}

// ============================================================================
// TRANSPARENCY AND EVICTION
// ============================================================================

#[test]
fn test_cache_transparency() {
    let engine = AclEngine::default();
    let grants = ["confd.users.*", "calld.#", "!confd.users.delete", "users.me.read"];
    let requests = [
        "confd.users.read",
        "confd.users.delete",
        "calld.calls.hangup",
        "admin.reset",
        "users.u1.read",
        "users.u2.read",
    ];

    let cold: Vec<bool> = requests
        .iter()
        .map(|r| {
            engine.clear_caches();
            engine.evaluate(&grants, "u1", None, r).unwrap()
        })
        .collect();
    let warm: Vec<bool> = requests
        .iter()
        .map(|r| engine.evaluate(&grants, "u1", None, r).unwrap())
        .collect();

    assert_eq!(cold, warm);
    assert_eq!(cold, vec![true, false, true, false, true, false]);
}

#[test]
fn test_checker_lru_eviction() {
    let engine = small_engine(2);
    let ctx = EvaluationContext::new("u1");

    let a = engine.checker(&["a"], &ctx);
    engine.checker(&["b"], &ctx);
    // Touch "a" so "b" is least recently used
    engine.checker(&["a"], &ctx);
    engine.checker(&["c"], &ctx);

    let stats = engine.stats().checkers;
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.evictions, 1);

    assert!(Arc::ptr_eq(&a, &engine.checker(&["a"], &ctx)));
    let misses = engine.stats().checkers.misses;
    engine.checker(&["b"], &ctx);
    assert_eq!(engine.stats().checkers.misses, misses + 1);
}

#[test]
fn test_eviction_never_changes_decisions() {
    let engine = small_engine(1);

    for round in 0..3 {
        for subject in ["u1", "u2", "u3"] {
            let grants = ["users.me.#", "!users.me.admin"];
            let own = format!("users.{}.profile", subject);
            let admin = format!("users.{}.admin", subject);

            assert!(engine.evaluate(&grants, subject, None, &own).unwrap(), "round {}", round);
            assert!(!engine.evaluate(&grants, subject, None, &admin).unwrap());
            assert!(!engine.evaluate(&grants, subject, None, "users.other.profile").unwrap());
        }
    }

    let stats = engine.stats();
    assert!(stats.checkers.entries <= 1);
    assert!(stats.patterns.entries <= 4);
    assert!(stats.checkers.evictions > 0);
}

#[test]
fn test_clear_caches() {
    let engine = AclEngine::default();
    engine.evaluate(&["users.me.read"], "u1", None, "users.u1.read").unwrap();

    engine.clear_caches();
    let stats = engine.stats();
    assert_eq!(stats.patterns.entries, 0);
    assert_eq!(stats.substitutions.entries, 0);
    assert_eq!(stats.checkers.entries, 0);
    assert_eq!(stats.checkers.hits + stats.checkers.misses, 0);
}

// ============================================================================
// CONCURRENT ACCESS
// ============================================================================

#[test]
fn test_concurrent_evaluation() {
    let engine = Arc::new(
        AclEngine::new(AclConfig::default().with_checker_cache_capacity(64).with_shards(4)).unwrap(),
    );
    let mut handles = vec![];

    for t in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let subject = format!("u{}", t % 4);
            let grants = ["users.me.*", "calld.#", "!calld.admin.#"];
            for _ in 0..200 {
                let own = format!("users.{}.read", subject);
                assert!(engine.evaluate(&grants, &subject, None, &own).unwrap());
                assert!(engine.evaluate(&grants, &subject, None, "calld.calls.list").unwrap());
                assert!(!engine.evaluate(&grants, &subject, None, "calld.admin.reset").unwrap());
                assert!(!engine.evaluate(&grants, &subject, None, "users.nobody.read").unwrap());
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = engine.stats().checkers;
    assert_eq!(stats.hits + stats.misses, 8 * 200 * 4);
    assert_eq!(stats.entries, 4);
    assert!(stats.hit_rate() > 0.9);
}
