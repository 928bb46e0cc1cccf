//! End-to-end lifecycle scenarios.

use std::time::Duration;

use lifecycle_hooks::config::RuntimeConfig;
use lifecycle_hooks::lifecycle::{LaunchOutcome, Loader, ModuleFn, Shutdown, ShutdownReason};
use lifecycle_hooks::registry::{HookRegistry, HookSpec, HookStatus, Phase};
use lifecycle_hooks::HookError;

mod common;

use common::Recorder;

#[test]
fn test_constructor_destructor_fixture() {
    let recorder = Recorder::new();
    let hooks = recorder.clone();
    let fixture = ModuleFn::new("fixture", move |scope| {
        scope.on_startup("my_startup", hooks.hook("startup"))?;
        scope.on_cleanup("my_cleanup", hooks.hook("cleanup"))?;
        Ok(())
    });

    let mut loader = Loader::new(&RuntimeConfig::default());
    loader.load(&fixture).unwrap();
    let main_recorder = recorder.clone();
    let report = loader
        .launch(move |_| {
            main_recorder.push("In main");
            0
        })
        .unwrap();

    assert_eq!(recorder.events(), vec!["startup", "In main", "cleanup"]);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_cleanup_only_for_registered_resource() {
    let recorder = Recorder::new();
    let mut registry = HookRegistry::new();
    registry
        .register(HookSpec::startup().name("A").callback(recorder.hook("A")))
        .unwrap();
    let b = registry
        .register(HookSpec::startup().name("B").callback(recorder.hook("B")))
        .unwrap();
    registry
        .register(HookSpec::releasing(b).name("C").callback(recorder.hook("C")))
        .unwrap();

    let startup = registry.run_startup_phase().unwrap();
    assert_eq!(startup.completed.len(), 2);
    let cleanup = registry.run_cleanup_phase().unwrap();
    assert_eq!(cleanup.invoked.len(), 1);

    assert_eq!(recorder.events(), vec!["A", "B", "C"]);
}

#[test]
fn test_startup_priority_is_stable_for_any_registration_order() {
    let priorities = [3, -1, 0, 3, 0, -1, 2];
    let recorder = Recorder::new();
    let mut registry = HookRegistry::new();
    for (i, priority) in priorities.iter().enumerate() {
        registry
            .register(
                HookSpec::startup()
                    .priority(*priority)
                    .callback(recorder.hook(&format!("{priority}:{i}"))),
            )
            .unwrap();
    }
    registry.run_startup_phase().unwrap();

    let order: Vec<(i32, usize)> = recorder
        .events()
        .iter()
        .map(|e| {
            let (p, i) = e.split_once(':').unwrap();
            (p.parse().unwrap(), i.parse().unwrap())
        })
        .collect();
    let mut expected = order.clone();
    expected.sort();
    assert_eq!(order, expected);
    assert_eq!(order.len(), priorities.len());
}

#[test]
fn test_cleanup_mirrors_startup_execution() {
    let recorder = Recorder::new();
    let mut registry = HookRegistry::new();
    let mut owners = Vec::new();
    for (name, priority) in [("x", 2), ("y", 0), ("z", 1)] {
        let owner = registry
            .register(
                HookSpec::startup()
                    .priority(priority)
                    .callback(recorder.hook(&format!("start {name}"))),
            )
            .unwrap();
        owners.push((name, owner));
    }
    for (name, owner) in owners {
        registry
            .register(HookSpec::releasing(owner).callback(recorder.hook(&format!("stop {name}"))))
            .unwrap();
    }

    registry.run_startup_phase().unwrap();
    registry.run_cleanup_phase().unwrap();
    assert_eq!(
        recorder.events(),
        vec!["start y", "start z", "start x", "stop x", "stop z", "stop y"]
    );
}

#[test]
fn test_failed_startup_hook_excluded_from_cleanup() {
    let recorder = Recorder::new();
    let mut registry = HookRegistry::new();
    let ok = registry.register(HookSpec::startup().callback(recorder.hook("ok"))).unwrap();
    let bad = registry.register(HookSpec::startup().callback(recorder.failing("bad"))).unwrap();
    let never = registry.register(HookSpec::startup().callback(recorder.hook("never"))).unwrap();
    for owner in [ok, bad, never] {
        registry
            .register(HookSpec::releasing(owner).callback(recorder.hook(&format!("release {owner}"))))
            .unwrap();
    }

    let err = registry.run_startup_phase().unwrap_err();
    assert!(matches!(err, HookError::CallbackFailure { ref failure, .. } if failure.handle == bad));
    assert_eq!(registry.status(never), Some(HookStatus::Skipped));
    assert_eq!(recorder.events(), vec!["ok".to_string(), "bad".to_string(), format!("release {ok}")]);
    assert!(matches!(
        registry.run_cleanup_phase(),
        Err(HookError::InvalidPhase { .. })
    ));
}

#[test]
fn test_cleanup_failures_reported_together() {
    let recorder = Recorder::new();
    let hooks = recorder.clone();
    let module = ModuleFn::new("io", move |scope| {
        scope.on_cleanup("close log", hooks.hook("close log"))?;
        scope.on_cleanup("flush cache", hooks.failing("flush cache"))?;
        scope.on_cleanup("sync disk", hooks.failing("sync disk"))?;
        Ok(())
    });
    let mut loader = Loader::new(&RuntimeConfig::default());
    loader.load(&module).unwrap();
    let report = loader.launch(|_| 0).unwrap();

    assert_eq!(recorder.events(), vec!["sync disk", "flush cache", "close log"]);
    let failures = report.cleanup_failures();
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|f| f.phase == Phase::Cleanup));
    assert!(failures.iter().all(|f| f.module.as_deref() == Some("io")));
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_second_pass_invokes_nothing() {
    let recorder = Recorder::new();
    let mut registry = HookRegistry::new();
    registry.register(HookSpec::startup().callback(recorder.hook("s"))).unwrap();
    registry.register(HookSpec::cleanup().callback(recorder.hook("c"))).unwrap();

    registry.run_startup_phase().unwrap();
    assert!(registry.run_startup_phase().is_err());
    registry.run_cleanup_phase().unwrap();
    assert!(registry.run_cleanup_phase().is_err());
    assert!(registry.run_startup_phase().is_err());

    assert_eq!(recorder.events(), vec!["s", "c"]);
}

#[tokio::test]
async fn test_shutdown_signal_runs_cleanup() {
    let recorder = Recorder::new();
    let hooks = recorder.clone();
    let module = ModuleFn::new("server", move |scope| {
        scope.acquire("listener", hooks.hook("bind"), hooks.hook("unbind"))?;
        Ok(())
    });
    let mut loader = Loader::new(&RuntimeConfig::default());
    loader.load(&module).unwrap();

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger(ShutdownReason::Terminate);
    });

    let main_recorder = recorder.clone();
    let report = loader
        .launch_until_shutdown(&shutdown, || async move {
            main_recorder.push("serving");
            std::future::pending::<()>().await;
            0
        })
        .await
        .unwrap();

    assert_eq!(recorder.events(), vec!["bind", "serving", "unbind"]);
    assert!(matches!(
        report.outcome,
        LaunchOutcome::Completed { exit_status: 143, .. }
    ));
    assert_eq!(report.exit_code(), 143);
}
