//! Property tests for registry invariants
//!
//! Checks the structural guarantees the rest of the system leans on:
//! version numbering is gapless from 1 even under concurrent registration,
//! and no interleaving of lifecycle operations ever yields two production
//! artifacts.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use promover::config::ForecasterParams;
use promover::deploy::DeploymentController;
use promover::registry::store::InMemoryStore;
use promover::registry::{Registry, Stage};
use promover::rollback::RollbackExecutor;

fn metrics(rmse: f64) -> BTreeMap<String, f64> {
    let mut m = BTreeMap::new();
    m.insert("rmse".to_string(), rmse);
    m
}

// ---------------------------------------------------------------------------
// Concurrent registration
// ---------------------------------------------------------------------------

#[test]
fn test_concurrent_registration_yields_contiguous_versions() {
    const CALLERS: u32 = 8;
    const PER_CALLER: u32 = 5;

    let registry = Arc::new(Registry::new(InMemoryStore::new()));

    let handles: Vec<_> = (0..CALLERS)
        .map(|caller| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let mut versions = Vec::new();
                for i in 0..PER_CALLER {
                    let artifact = registry
                        .register(
                            "m",
                            &format!("s3://models/caller-{caller}-run-{i}"),
                            metrics(5.0 + f64::from(caller * PER_CALLER + i)),
                            &ForecasterParams::default(),
                        )
                        .expect("register should succeed");
                    versions.push(artifact.version);
                }
                versions
            })
        })
        .collect();

    let mut all_versions: Vec<u32> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("thread should not panic"))
        .collect();
    all_versions.sort_unstable();

    // N distinct, contiguous versions starting at 1.
    let expected: Vec<u32> = (1..=CALLERS * PER_CALLER).collect();
    assert_eq!(all_versions, expected);

    // And the registry agrees with what the callers observed.
    let listed: Vec<u32> = registry
        .list_versions("m")
        .expect("read should succeed")
        .iter()
        .map(|a| a.version)
        .collect();
    assert_eq!(listed, expected);
}

#[test]
fn test_concurrent_mutations_on_independent_models() {
    let registry = Arc::new(Registry::new(InMemoryStore::new()));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let model = format!("model-{i}");
                registry
                    .register(&model, "s3://models/run-1", metrics(5.0),
                        &ForecasterParams::default())
                    .expect("register should succeed");
                registry.promote_to_staging(&model, 1).expect("staging should succeed");
                registry.promote_to_production(&model, 1).expect("promotion should succeed");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread should not panic");
    }

    for i in 0..6 {
        let production = registry
            .get_production(&format!("model-{i}"))
            .expect("read should succeed");
        assert_eq!(production.map(|a| a.version), Some(1));
    }
}

// ---------------------------------------------------------------------------
// Invariants under arbitrary operation sequences
// ---------------------------------------------------------------------------

/// One step of a randomized lifecycle exercise.
#[derive(Debug, Clone)]
enum Op {
    Register,
    Stage(u32),
    Smoke(u32, bool),
    Approve(u32),
    Cancel(u32, bool),
    Rollback(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Register),
        (1u32..12).prop_map(Op::Stage),
        ((1u32..12), any::<bool>()).prop_map(|(v, passed)| Op::Smoke(v, passed)),
        (1u32..12).prop_map(Op::Approve),
        ((1u32..12), any::<bool>()).prop_map(|(v, archive)| Op::Cancel(v, archive)),
        (1u32..12).prop_map(Op::Rollback),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_at_most_one_production_under_any_interleaving(
        ops in proptest::collection::vec(op_strategy(), 1..40)
    ) {
        let registry = Registry::new(InMemoryStore::new());
        let controller = DeploymentController::new(&registry);
        let executor = RollbackExecutor::new(&registry);
        let mut registered = 0u32;

        for op in ops {
            // Individual operations may be rejected; the invariants must
            // hold regardless.
            match op {
                Op::Register => {
                    registered += 1;
                    let _ = registry.register(
                        "m",
                        &format!("s3://models/run-{registered}"),
                        metrics(5.0 + f64::from(registered)),
                        &ForecasterParams::default(),
                    );
                }
                Op::Stage(v) => {
                    let _ = controller.begin_staging("m", v);
                }
                Op::Smoke(v, passed) => {
                    let _ = controller.record_smoke_test("m", v, passed);
                }
                Op::Approve(v) => {
                    let _ = controller.record_approval("m", v, "ops");
                }
                Op::Cancel(v, archive) => {
                    let _ = controller.cancel("m", v, archive);
                }
                Op::Rollback(v) => {
                    let _ = executor.rollback("m", v, true);
                }
            }

            let artifacts = registry.list_versions("m").expect("read should succeed");

            let in_production =
                artifacts.iter().filter(|a| a.stage == Stage::Production).count();
            prop_assert!(in_production <= 1, "two artifacts in production");

            let in_staging = artifacts.iter().filter(|a| a.stage == Stage::Staging).count();
            prop_assert!(in_staging <= 1, "two artifacts in staging");

            // Versions stay gapless from 1 regardless of rejected calls.
            let versions: Vec<u32> = artifacts.iter().map(|a| a.version).collect();
            let expected: Vec<u32> = (1..=artifacts.len() as u32).collect();
            prop_assert_eq!(versions, expected);

            // Pointers always refer to artifacts in the matching stage.
            let state = if artifacts.is_empty() {
                continue;
            } else {
                registry.snapshot("m").expect("snapshot should succeed")
            };
            if let Some(v) = state.production_version {
                prop_assert_eq!(
                    state.artifact(v).map(|a| a.stage),
                    Some(Stage::Production)
                );
            }
            if let Some(v) = state.staging_version {
                prop_assert_eq!(state.artifact(v).map(|a| a.stage), Some(Stage::Staging));
            }
        }
    }

    #[test]
    fn prop_archived_never_reaches_production_without_rollback(
        ops in proptest::collection::vec(op_strategy(), 1..30)
    ) {
        let registry = Registry::new(InMemoryStore::new());
        let controller = DeploymentController::new(&registry);
        let mut registered = 0u32;

        for op in ops {
            match op {
                Op::Register => {
                    registered += 1;
                    let _ = registry.register(
                        "m",
                        &format!("s3://models/run-{registered}"),
                        metrics(5.0 + f64::from(registered)),
                        &ForecasterParams::default(),
                    );
                }
                Op::Stage(v) => {
                    let _ = controller.begin_staging("m", v);
                }
                Op::Smoke(v, passed) => {
                    let _ = controller.record_smoke_test("m", v, passed);
                }
                Op::Approve(v) => {
                    let _ = controller.record_approval("m", v, "ops");
                }
                Op::Cancel(v, archive) => {
                    let _ = controller.cancel("m", v, archive);
                }
                // No rollback in this exercise: production may only ever
                // be reached through the staged gate.
                Op::Rollback(_) => {}
            }

            // Every artifact now in production must have passed through
            // Staging immediately before, per the transition history.
            let transitions = registry.transition_history("m").expect("read should succeed");
            for t in &transitions {
                if t.to == Stage::Production {
                    prop_assert_eq!(t.from, Some(Stage::Staging));
                }
            }
        }
    }
}
