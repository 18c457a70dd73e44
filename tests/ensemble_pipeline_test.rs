//! End-to-end campaign tests against a fake solver
//!
//! The fake padcirc writes canned fort.61 / maxele.63 files, so the whole
//! stage / prep / solve / harvest / checkpoint cycle runs for real with no
//! ADCIRC installation.

mod common;

use common::Fixture;
use tiderun::core::ensemble::EnsembleCoordinator;
use tiderun::core::state::{ResultsStore, StateManager};
use tiderun::domain::{Array2, OutputKey};
use tokio::sync::watch;

fn weights(members: usize) -> Array2 {
    let mut weights = Array2::zeros(2, members);
    for member in 0..members {
        weights.set(0, member, 0.03 + 0.01 * member as f64);
        weights.set(1, member, 0.10 + 0.01 * member as f64);
    }
    weights
}

#[tokio::test]
async fn test_full_campaign() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let coordinator = EnsembleCoordinator::new(config).await.unwrap();

    let (_tx, shutdown) = watch::channel(false);
    let weights = weights(3);
    let summary = coordinator.execute(&weights, shutdown).await.unwrap();

    assert_eq!(summary.total_members, 3);
    assert_eq!(summary.successful, 3);
    assert_eq!(summary.failed, 0);
    assert!(summary.is_successful());
    assert!(summary.verification_report.as_ref().unwrap().passed());

    // results file holds the raw harvested arrays
    let store = ResultsStore::new(fixture.save_dir.join("results.json"));
    let results = store.load().unwrap();
    assert_eq!(results.weights, weights);

    let fort61 = &results.data.ts_data[&OutputKey::Fort61];
    assert_eq!(fort61.shape(), (2, 2, 3));
    assert_eq!(fort61.get(0, 0, 0), 0.50);
    assert_eq!(fort61.get(1, 1, 2), 0.85);
    // dry sentinel is preserved raw until analysis applies the fix
    assert_eq!(fort61.get(1, 0, 1), -99999.0);
    assert_eq!(
        results.data.time_obs[&OutputKey::Fort61],
        vec![86400.0, 172800.0]
    );

    let maxele = &results.data.nts_data[&OutputKey::Maxele63];
    assert_eq!(maxele.rows(), 4);
    assert_eq!(maxele.cols(), 3);
    assert_eq!(maxele.get(3, 2), 1.40);
    assert_eq!(maxele.get(2, 0), -99999.0);

    // checkpoint settled every member
    let state = StateManager::new(fixture.save_dir.join("checkpoint.json"));
    let checkpoint = state.load().unwrap().unwrap();
    assert!(checkpoint.is_complete());
    assert_eq!(checkpoint.completed_count(), 3);

    // cleanup removed the run slots
    assert!(!fixture.save_dir.join("rf_dir_1").exists());
    assert!(!fixture.save_dir.join("rf_dir_2").exists());
}

#[tokio::test]
async fn test_dry_fix_on_loaded_results() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let coordinator = EnsembleCoordinator::new(config).await.unwrap();

    let (_tx, shutdown) = watch::channel(false);
    coordinator.execute(&weights(1), shutdown).await.unwrap();

    let store = ResultsStore::new(fixture.save_dir.join("results.json"));
    let mut results = store.load().unwrap();
    results.apply_dry_fix(coordinator.mesh(), &coordinator.control().stations);

    // station 1 sits on node 1 (depth 1.0): 0.50 + 1.0
    let fort61 = &results.data.ts_data[&OutputKey::Fort61];
    assert!((fort61.get(0, 0, 0) - 1.50).abs() < 1e-9);
    // dry station record becomes zero
    assert_eq!(fort61.get(1, 0, 0), 0.0);

    // node depths are 1..4; node 3 was dry
    let maxele = &results.data.nts_data[&OutputKey::Maxele63];
    assert!((maxele.get(0, 0) - 2.10).abs() < 1e-9);
    assert!((maxele.get(1, 0) - 3.20).abs() < 1e-9);
    assert_eq!(maxele.get(2, 0), 0.0);
    assert!((maxele.get(3, 0) - 5.40).abs() < 1e-9);
}

#[tokio::test]
async fn test_resume_skips_settled_members() {
    let fixture = Fixture::new();
    let config = fixture.config();

    let coordinator = EnsembleCoordinator::new(config).await.unwrap();
    let (_tx, shutdown) = watch::channel(false);
    let weights = weights(3);
    let first = coordinator.execute(&weights, shutdown).await.unwrap();
    assert_eq!(first.successful, 3);

    // same inputs, same weights: everything is already settled
    let coordinator = EnsembleCoordinator::new(fixture.config()).await.unwrap();
    let (_tx, shutdown) = watch::channel(false);
    let second = coordinator.execute(&weights, shutdown).await.unwrap();
    assert_eq!(second.successful, 0);
    assert_eq!(second.skipped, 3);
    assert!(second.is_successful());
}

#[tokio::test]
async fn test_member_failures_are_isolated() {
    // solver fails in every slot except rf_dir_1
    let script = "#!/bin/sh
case \"$PWD\" in
*rf_dir_1)
cat > fort.61 <<'EOF'
elevation
2 2 86400.0 43200 1
86400.0 43200
1 0.50
2 0.60
172800.0 86400
1 0.75
2 0.85
EOF
cat > maxele.63 <<'EOF'
max elevation
1 4 0.0 0 1
172800.0 86400
1 1.10
2 1.20
3 1.30
4 1.40
EOF
;;
*) exit 9 ;;
esac
";
    let fixture = Fixture::with_padcirc(script);
    let config = fixture.config();
    let coordinator = EnsembleCoordinator::new(config).await.unwrap();

    let (_tx, shutdown) = watch::channel(false);
    let summary = coordinator.execute(&weights(2), shutdown).await.unwrap();

    // member 0 ran in rf_dir_1 and succeeded; member 1 failed in rf_dir_2
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].member, 1);
    assert_eq!(summary.errors[0].stage, "solve");
    assert!(!summary.is_successful());

    let state = StateManager::new(fixture.save_dir.join("checkpoint.json"));
    let checkpoint = state.load().unwrap().unwrap();
    assert_eq!(checkpoint.completed_count(), 1);
    assert_eq!(checkpoint.failed_count(), 1);
    assert!(checkpoint.is_complete());
}

#[tokio::test]
async fn test_station_campaign_interpolates_qoi() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let coordinator = EnsembleCoordinator::new(config).await.unwrap();

    let (_tx, shutdown) = watch::channel(false);
    let weights = weights(2);
    let (qoi, summary) = coordinator
        .execute_stations(&weights, None, shutdown)
        .await
        .unwrap();

    assert_eq!(summary.successful, 2);
    assert_eq!(qoi.rows(), 2);
    assert_eq!(qoi.cols(), 2);

    // dry-fixed nodal maxima are [2.1, 3.2, 0.0, 5.4]; station 1 at
    // (0.25, 0.25) interpolates in the lower triangle, station 2 at
    // (0.75, 0.75) in the upper one
    for member in 0..2 {
        assert!((qoi.get(member, 0) - 1.85).abs() < 1e-9);
        assert!((qoi.get(member, 1) - 3.50).abs() < 1e-9);
    }

    // QoI matrix is persisted alongside the weights
    let store = ResultsStore::new(fixture.save_dir.join("results.json"));
    let results = store.load().unwrap();
    let saved = results.qoi.unwrap();
    assert!((saved.get(1, 1) - 3.50).abs() < 1e-9);
}
