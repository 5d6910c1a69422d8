//! Session sharing and recovery across managers

use cireg_registry::{Acquisition, ConnectionManager, SessionError, SessionRegistry};
use cireg_test_utils::{catalog_sharing, test_config, CountingBackend};
use std::sync::Arc;

#[test]
fn two_managers_share_one_bootstrap() {
    let backend = Arc::new(CountingBackend::udm());
    let sessions = Arc::new(SessionRegistry::new());

    let a = ConnectionManager::new(test_config(), backend.clone(), sessions.clone());
    let b = ConnectionManager::new(test_config(), backend.clone(), sessions.clone());

    let (first, first_outcome) = a.lock().acquire().unwrap();
    let (second, second_outcome) = b.lock().acquire().unwrap();

    assert_eq!(first_outcome, Acquisition::Recreated);
    assert_eq!(second_outcome, Acquisition::Reused);
    assert_eq!(first, second);
    assert_eq!(backend.bootstraps(), 1);
    assert_eq!(sessions.len(), 1);
}

#[test]
fn concurrent_managers_bootstrap_at_most_once_per_registration() {
    let backend = Arc::new(CountingBackend::udm());
    let sessions = Arc::new(SessionRegistry::new());
    let managers: Vec<ConnectionManager> = (0..8)
        .map(|_| ConnectionManager::new(test_config(), backend.clone(), sessions.clone()))
        .collect();

    let handles: Vec<_> = std::thread::scope(|scope| {
        let workers: Vec<_> = managers
            .iter()
            .map(|manager| scope.spawn(move || manager.acquire_session().unwrap()))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    // Racing bootstraps may each reach the backend, but only one registration survives.
    let winner = sessions.reuse(&test_config()).unwrap();
    assert!(handles.iter().all(|handle| *handle == winner));
    assert_eq!(sessions.len(), 1);
    assert_eq!(backend.closed(), backend.bootstraps() - 1);
}

#[test]
fn bootstrap_failure_propagates_without_retry() {
    let backend = Arc::new(CountingBackend::udm());
    backend.fail_next(1);
    let manager = ConnectionManager::new(test_config(), backend.clone(), Arc::new(SessionRegistry::new()));

    let err = manager.acquire_session().unwrap_err();
    assert!(matches!(err, SessionError::Bootstrap { .. }));
    assert!(err.to_string().contains("admin:******@deploy.test"));
    assert_eq!(backend.bootstraps(), 1);

    // The next call starts over from an empty slot.
    manager.acquire_session().unwrap();
    assert_eq!(backend.bootstraps(), 2);
}

#[test]
fn catalogs_on_same_key_share_descriptors() {
    let backend = Arc::new(CountingBackend::udm());
    let sessions = Arc::new(SessionRegistry::new());
    let a = catalog_sharing(backend.clone(), sessions.clone());
    let b = catalog_sharing(backend.clone(), sessions);

    assert!(a.lookup_type("jee.War").is_ok());
    assert!(b.lookup_type("jee.War").is_ok());
    assert_eq!(backend.bootstraps(), 1);
    assert!(Arc::ptr_eq(&a.snapshot().unwrap(), &b.snapshot().unwrap()));
}

#[test]
fn shutdown_forces_recreate_on_fresh_manager() {
    let backend = Arc::new(CountingBackend::udm());
    let sessions = Arc::new(SessionRegistry::new());
    let first = ConnectionManager::new(test_config(), backend.clone(), sessions.clone());
    let old = first.acquire_session().unwrap();

    assert!(sessions.shutdown(&test_config()));

    let second = ConnectionManager::new(test_config(), backend.clone(), sessions);
    let (fresh, outcome) = second.lock().acquire().unwrap();
    assert_eq!(outcome, Acquisition::Recreated);
    assert_ne!(fresh, old);
    assert_eq!(backend.bootstraps(), 2);

    // The first manager keeps its cached handle.
    assert_eq!(first.acquire_session().unwrap(), old);
}
