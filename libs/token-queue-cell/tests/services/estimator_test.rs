use chrono::Utc;

use shared_config::AppConfig;
use token_queue_cell::*;

use super::TestContext;

#[tokio::test]
async fn test_head_of_queue_waits_zero_minutes() {
    let ctx = TestContext::new().await;
    let doctor = ctx.seed_doctor().await;
    let patient = ctx.seed_patient("Asha").await;

    let token = ctx.issue(doctor, patient).await;

    let estimate = ctx.state.estimator.estimate(doctor, token.token_number).await;
    assert_eq!(estimate.wait_minutes, 0);
}

#[tokio::test]
async fn test_empty_queue_estimates_zero_rather_than_erroring() {
    let ctx = TestContext::new().await;
    let doctor = ctx.seed_doctor().await;

    let estimate = ctx.state.estimator.estimate(doctor, 5).await;
    assert_eq!(estimate.wait_minutes, 0);
    assert!(estimate.eta >= Utc::now() - chrono::Duration::seconds(1));
}

#[tokio::test]
async fn test_linear_model_counts_queue_predecessors() {
    let ctx = TestContext::new().await;
    let doctor = ctx.seed_doctor().await;

    // A(1, normal), B(2, normal), C(3, emergency): queue order [C, A, B].
    let _a = ctx.issue(doctor, ctx.seed_patient("A").await).await;
    let b = ctx.issue(doctor, ctx.seed_patient("B").await).await;
    let _c = ctx
        .state
        .scheduler
        .create(
            doctor,
            ctx.seed_patient("C").await,
            None,
            TokenPriority::Emergency,
        )
        .await
        .expect("Failed to create C");

    // Both A and C sit ahead of B.
    let avg = ctx.state.config.avg_minutes_per_patient;
    let estimate = ctx.state.estimator.estimate(doctor, b.token_number).await;
    assert_eq!(estimate.wait_minutes, 2 * avg);
}

#[tokio::test]
async fn test_terminal_tokens_do_not_count_toward_wait() {
    let ctx = TestContext::new().await;
    let doctor = ctx.seed_doctor().await;
    let actor = ctx.receptionist();

    let a = ctx.issue(doctor, ctx.seed_patient("A").await).await;
    let b = ctx.issue(doctor, ctx.seed_patient("B").await).await;

    ctx.state
        .scheduler
        .call(a.id, &actor)
        .await
        .expect("Failed to call A");
    ctx.state
        .scheduler
        .complete(a.id, &actor)
        .await
        .expect("Failed to complete A");

    let estimate = ctx.state.estimator.estimate(doctor, b.token_number).await;
    assert_eq!(estimate.wait_minutes, 0, "Completed predecessors cost nothing");
}

#[tokio::test]
async fn test_in_service_predecessor_still_counts() {
    let ctx = TestContext::new().await;
    let doctor = ctx.seed_doctor().await;
    let actor = ctx.receptionist();

    let a = ctx.issue(doctor, ctx.seed_patient("A").await).await;
    let b = ctx.issue(doctor, ctx.seed_patient("B").await).await;

    ctx.state
        .scheduler
        .call(a.id, &actor)
        .await
        .expect("Failed to call A");

    let avg = ctx.state.config.avg_minutes_per_patient;
    let estimate = ctx.state.estimator.estimate(doctor, b.token_number).await;
    assert_eq!(estimate.wait_minutes, avg);
}

#[tokio::test]
async fn test_eta_tracks_wait_minutes() {
    let ctx = TestContext::new().await;
    let doctor = ctx.seed_doctor().await;

    let _a = ctx.issue(doctor, ctx.seed_patient("A").await).await;
    let b = ctx.issue(doctor, ctx.seed_patient("B").await).await;

    let before = Utc::now();
    let estimate = ctx.state.estimator.estimate(doctor, b.token_number).await;
    let after = Utc::now();

    let offset = chrono::Duration::minutes(estimate.wait_minutes as i64);
    assert!(estimate.eta >= before + offset);
    assert!(estimate.eta <= after + offset);
}

#[tokio::test]
async fn test_doctor_delay_ignored_by_default() {
    let ctx = TestContext::new().await;
    let doctor = ctx.seed_doctor().await;
    let patient = ctx.seed_patient("Asha").await;

    let token = ctx.issue(doctor, patient).await;
    ctx.directory
        .record_delay(doctor, 30, Some("Emergency surgery".to_string()))
        .await
        .expect("Failed to record delay");

    let estimate = ctx.state.estimator.estimate(doctor, token.token_number).await;
    assert_eq!(estimate.wait_minutes, 0, "Delay offset is off by default");
}

#[tokio::test]
async fn test_doctor_delay_offsets_when_enabled() {
    let config = AppConfig {
        apply_doctor_delay: true,
        ..AppConfig::default()
    };
    let ctx = TestContext::with_config(config).await;
    let doctor = ctx.seed_doctor().await;

    let _a = ctx.issue(doctor, ctx.seed_patient("A").await).await;
    let b = ctx.issue(doctor, ctx.seed_patient("B").await).await;

    ctx.directory
        .record_delay(doctor, 15, None)
        .await
        .expect("Failed to record delay");

    let avg = ctx.state.config.avg_minutes_per_patient;
    let estimate = ctx.state.estimator.estimate(doctor, b.token_number).await;
    assert_eq!(estimate.wait_minutes, avg + 15);
}
