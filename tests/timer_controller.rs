mod common;

use std::time::Duration;

use common::{Harness, T0};
use studytrack_lib::{
    db::{NewSession, SessionFilter},
    timer::TimerStatus,
    StudyError,
};

#[tokio::test]
async fn break_accounting_matches_wall_clock() {
    let h = Harness::new();
    let session = h.timer.start("Calculus", "math", None).await.unwrap();
    assert_eq!(session.start_ts, T0);

    h.clock.set(T0 + 100);
    assert_eq!(h.timer.pause(session.id).await.unwrap(), TimerStatus::Paused);
    h.clock.set(T0 + 140);
    assert_eq!(h.timer.resume(session.id).await.unwrap(), TimerStatus::Running);
    h.clock.set(T0 + 200);

    let stopped = h.timer.stop(session.id).await.unwrap();
    assert_eq!(stopped.total_break, 40);
    assert_eq!(stopped.session.duration, 160);
    assert_eq!(stopped.session.end_ts, T0 + 200);

    let stored = h.db.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(stored.duration, 160);
    assert!(h.timer.sampler_session().await.is_none());
}

#[tokio::test]
async fn stop_while_paused_counts_break_up_to_now() {
    let h = Harness::new();
    let session = h.timer.start("Reading", "", None).await.unwrap();

    h.clock.set(T0 + 50);
    h.timer.pause(session.id).await.unwrap();
    h.clock.set(T0 + 80);

    let stopped = h.timer.stop(session.id).await.unwrap();
    assert_eq!(stopped.total_break, 30);
    assert_eq!(stopped.session.duration, 50);
    assert!(h.db.get_open_break(session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn countdown_status_reports_remaining() {
    let h = Harness::new();
    let session = h.timer.start("Essay", "", Some(300)).await.unwrap();
    assert!(session.is_countdown());

    h.clock.advance(120);
    let snapshot = h.timer.status().await.unwrap();

    assert_eq!(snapshot.status, TimerStatus::Running);
    assert!(snapshot.is_countdown);
    assert_eq!(snapshot.elapsed, 120);
    assert_eq!(snapshot.remaining, Some(180));
    assert_eq!(snapshot.display_str(), "00:03:00");
}

#[tokio::test]
async fn empty_name_is_rejected_without_writing() {
    let h = Harness::new();

    let err = h.timer.start("   ", "math", None).await.unwrap_err();
    assert!(matches!(err, StudyError::Validation { field: "name", .. }));

    let err = h.timer.start("Physics", "", Some(-5)).await.unwrap_err();
    assert!(matches!(err, StudyError::Validation { field: "target_duration", .. }));

    let sessions = h.db.list_sessions(&SessionFilter::default()).await.unwrap();
    assert!(sessions.is_empty());
    assert!(h.timer.sampler_session().await.is_none());
}

#[tokio::test]
async fn only_one_session_is_ever_open() {
    let h = Harness::new();
    let first = h.timer.start("First", "", None).await.unwrap();

    let err = h.timer.start("Second", "", None).await.unwrap_err();
    assert!(matches!(err, StudyError::Conflict(_)));
    assert_eq!(h.db.count_open_sessions().await.unwrap(), 1);

    h.clock.advance(10);
    h.timer.stop(first.id).await.unwrap();
    let second = h.timer.start("Second", "", None).await.unwrap();

    assert_eq!(h.db.count_open_sessions().await.unwrap(), 1);
    assert_eq!(h.timer.sampler_session().await, Some(second.id));
}

#[tokio::test]
async fn concurrent_starts_open_a_single_session() {
    let h = Harness::new();

    let attempts = (0..8).map(|i| {
        let timer = h.timer.clone();
        tokio::spawn(async move { timer.start(&format!("attempt {i}"), "", None).await })
    });
    let mut successes = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        if attempt.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(h.db.count_open_sessions().await.unwrap(), 1);
}

#[tokio::test]
async fn stop_unknown_session_changes_nothing() {
    let h = Harness::new();
    let session = h.timer.start("Chemistry", "", None).await.unwrap();

    let err = h.timer.stop(session.id + 100).await.unwrap_err();
    assert!(matches!(err, StudyError::SessionNotFound(_)));

    let stored = h.db.get_session(session.id).await.unwrap().unwrap();
    assert!(stored.is_open());
    assert_eq!(h.timer.sampler_session().await, Some(session.id));
}

#[tokio::test]
async fn stopping_twice_is_a_conflict() {
    let h = Harness::new();
    let session = h.timer.start("History", "", None).await.unwrap();
    h.clock.advance(30);
    h.timer.stop(session.id).await.unwrap();

    h.clock.advance(30);
    let err = h.timer.stop(session.id).await.unwrap_err();
    assert!(matches!(err, StudyError::Conflict(_)));

    let stored = h.db.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(stored.duration, 30);
}

#[tokio::test]
async fn status_elapsed_never_decreases() {
    let h = Harness::new();
    h.timer.start("Biology", "", None).await.unwrap();

    let mut last = 0;
    for step in [0, 5, 0, 10, 1] {
        h.clock.advance(step);
        let snapshot = h.timer.status().await.unwrap();
        assert!(snapshot.elapsed >= last);
        last = snapshot.elapsed;
    }
    assert_eq!(last, 16);
}

#[tokio::test]
async fn paused_status_freezes_elapsed() {
    let h = Harness::new();
    let session = h.timer.start("Music", "", None).await.unwrap();
    h.clock.advance(60);
    h.timer.pause(session.id).await.unwrap();

    h.clock.advance(600);
    let snapshot = h.timer.status().await.unwrap();
    assert_eq!(snapshot.status, TimerStatus::Paused);
    assert_eq!(snapshot.elapsed, 60);
    assert_eq!(snapshot.total_break, 600);
}

#[tokio::test]
async fn pause_and_resume_are_idempotent() {
    let h = Harness::new();
    let session = h.timer.start("Art", "", None).await.unwrap();

    h.clock.advance(10);
    assert_eq!(h.timer.pause(session.id).await.unwrap(), TimerStatus::Paused);
    h.clock.advance(10);
    assert_eq!(h.timer.pause(session.id).await.unwrap(), TimerStatus::Paused);
    assert_eq!(h.db.list_breaks(session.id).await.unwrap().len(), 1);
    assert!(h.timer.sampler_session().await.is_none());

    h.clock.advance(10);
    assert_eq!(h.timer.resume(session.id).await.unwrap(), TimerStatus::Running);
    assert_eq!(h.timer.resume(session.id).await.unwrap(), TimerStatus::Running);

    let breaks = h.db.list_breaks(session.id).await.unwrap();
    assert_eq!(breaks.len(), 1);
    assert_eq!(breaks[0].resume_ts, Some(T0 + 30));
    assert_eq!(h.timer.sampler_session().await, Some(session.id));
}

#[tokio::test]
async fn transitions_on_wrong_session_are_rejected() {
    let h = Harness::new();
    let first = h.timer.start("Old", "", None).await.unwrap();
    h.clock.advance(5);
    h.timer.stop(first.id).await.unwrap();
    let current = h.timer.start("Current", "", None).await.unwrap();

    assert!(matches!(
        h.timer.pause(first.id).await.unwrap_err(),
        StudyError::Conflict(_)
    ));
    assert!(matches!(
        h.timer.resume(first.id).await.unwrap_err(),
        StudyError::Conflict(_)
    ));
    assert!(matches!(
        h.timer.pause(current.id + 50).await.unwrap_err(),
        StudyError::SessionNotFound(_)
    ));
    assert!(h.db.list_breaks(current.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn status_tears_down_dangling_sampler() {
    let h = Harness::new();
    let session = h.timer.start("Geometry", "", None).await.unwrap();
    assert_eq!(h.timer.sampler_session().await, Some(session.id));

    // Closed behind the controller's back.
    h.db.stop_session(session.id, T0 + 5).await.unwrap();

    let snapshot = h.timer.status().await.unwrap();
    assert_eq!(snapshot.status, TimerStatus::Idle);
    assert!(!snapshot.is_active());
    assert!(h.timer.sampler_session().await.is_none());
}

#[tokio::test]
async fn delete_cascades_to_breaks_and_samples() {
    let h = Harness::new();
    let session = h.timer.start("Latin", "lang", None).await.unwrap();
    h.wait_for_samples(session.id, 1).await;

    h.clock.advance(20);
    h.timer.pause(session.id).await.unwrap();
    h.clock.advance(20);
    h.timer.stop(session.id).await.unwrap();

    h.timer.delete(session.id).await.unwrap();

    assert!(h.db.get_session(session.id).await.unwrap().is_none());
    assert!(h.db.list_breaks(session.id).await.unwrap().is_empty());
    assert_eq!(h.db.count_activity_for_session(session.id).await.unwrap(), 0);

    let err = h.timer.delete(session.id).await.unwrap_err();
    assert!(matches!(err, StudyError::SessionNotFound(_)));
}

#[tokio::test]
async fn deleting_the_open_session_stops_its_sampler() {
    let h = Harness::new();
    let session = h.timer.start("Spanish", "", None).await.unwrap();

    h.timer.delete(session.id).await.unwrap();

    assert!(h.timer.sampler_session().await.is_none());
    assert_eq!(h.timer.status().await.unwrap().status, TimerStatus::Idle);
}

#[tokio::test]
async fn recover_restarts_sampler_for_running_session() {
    let h = Harness::new();
    let session = h
        .db
        .insert_session(&NewSession {
            name: "Left running".into(),
            tags: String::new(),
            start_ts: T0 - 60,
            target_duration: 0,
        })
        .await
        .unwrap();

    let restarted = Harness::reopen(h.dir, h.db, Duration::from_secs(3600));
    assert_eq!(restarted.timer.recover().await.unwrap(), Some(TimerStatus::Running));
    assert_eq!(restarted.timer.sampler_session().await, Some(session.id));
}

#[tokio::test]
async fn recover_leaves_paused_session_paused() {
    let h = Harness::new();
    let session = h.timer.start("Overnight", "", None).await.unwrap();
    h.clock.advance(30);
    h.timer.pause(session.id).await.unwrap();
    h.timer.shutdown().await;

    let restarted = Harness::reopen(h.dir, h.db, Duration::from_secs(3600));
    assert_eq!(restarted.timer.recover().await.unwrap(), Some(TimerStatus::Paused));
    assert!(restarted.timer.sampler_session().await.is_none());
}

#[tokio::test]
async fn recover_without_open_session_is_a_no_op() {
    let h = Harness::new();
    assert_eq!(h.timer.recover().await.unwrap(), None);
}
