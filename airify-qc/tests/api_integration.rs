//! Integration tests for the control API
//!
//! Exercises the router in-process via `tower::ServiceExt::oneshot`.

mod helpers;

use airify_common::events::{AirifyEvent, PlaybackState, QueueChangeTrigger};
use airify_qc::catalog::TrackId;
use airify_qc::state::NowPlaying;
use axum::http::StatusCode;
use chrono::Utc;
use helpers::{make_request, order, test_app};
use http::Method;
use std::collections::HashSet;

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(&["a"]);

    let (status, body) = make_request(&app.router, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "airify-qc");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_list_queue() {
    let app = test_app(&["a", "b", "c"]);

    let (status, body) = make_request(&app.router, Method::GET, "/api/queue").await;
    assert_eq!(status, StatusCode::OK);

    let tracks = body.unwrap();
    let tracks = tracks.as_array().unwrap();
    assert_eq!(tracks.len(), 3);
    assert_eq!(tracks[0]["id"], "a");
    assert_eq!(tracks[0]["title"], "Song a");
    assert_eq!(tracks[0]["artist"], "Band a");
    assert_eq!(tracks[0]["duration"], "3:00");
    assert_eq!(tracks[0]["score"], 0);
    // Nothing playing yet
    assert!(tracks.iter().all(|t| t.get("remainingTime").is_none()));
}

#[tokio::test]
async fn test_remaining_time_on_playing_head_only() {
    let app = test_app(&["a", "b"]);
    app.state
        .set_now_playing(Some(NowPlaying {
            track_id: TrackId::from("a"),
            started_at: Utc::now() - chrono::Duration::seconds(60),
        }))
        .await;

    let (_, body) = make_request(&app.router, Method::GET, "/api/queue").await;
    let tracks = body.unwrap();

    let remaining = tracks[0]["remainingTime"].as_u64().unwrap();
    assert!(remaining <= 120_000 && remaining > 110_000, "remaining = {}", remaining);
    assert!(tracks[1].get("remainingTime").is_none());
}

#[tokio::test]
async fn test_vote_up_moves_track_behind_head() {
    let app = test_app(&["a", "b", "c"]);

    let (status, body) = make_request(&app.router, Method::POST, "/api/vote/c/up").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap(), serde_json::json!(true));
    assert_eq!(order(&app.queue).await, vec!["a", "c", "b"]);

    let (_, body) = make_request(&app.router, Method::GET, "/api/queue").await;
    assert_eq!(body.unwrap()[1]["score"], 1);
}

#[tokio::test]
async fn test_vote_on_head_reports_no_move() {
    let app = test_app(&["a", "b", "c"]);

    let (status, body) = make_request(&app.router, Method::POST, "/api/vote/a/down").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap(), serde_json::json!(false));
    assert_eq!(order(&app.queue).await, vec!["a", "b", "c"]);
    assert_eq!(app.queue.catalog().score_of(&TrackId::from("a")), -1);
}

#[tokio::test]
async fn test_vote_unknown_track_is_client_error() {
    let app = test_app(&["a", "b", "c"]);

    let (status, body) = make_request(&app.router, Method::POST, "/api/vote/zzz/up").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.unwrap()["status"].as_str().unwrap().starts_with("error"));
    assert_eq!(order(&app.queue).await, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_vote_invalid_direction_has_no_side_effect() {
    let app = test_app(&["a", "b", "c"]);

    let (status, _) = make_request(&app.router, Method::POST, "/api/vote/c/sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.queue.catalog().score_of(&TrackId::from("c")), 0);
    assert_eq!(order(&app.queue).await, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_vote_requires_post() {
    let app = test_app(&["a", "b"]);

    let (status, _) = make_request(&app.router, Method::GET, "/api/vote/b/up").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_locator_style_ids_in_path() {
    let app = test_app(&["local:track:1", "local:track:2", "local:track:3"]);

    let (status, body) =
        make_request(&app.router, Method::POST, "/api/vote/local:track:3/up").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap(), serde_json::json!(true));
    assert_eq!(
        order(&app.queue).await,
        vec!["local:track:1", "local:track:3", "local:track:2"]
    );
}

#[tokio::test]
async fn test_control_summary() {
    let app = test_app(&["a", "b"]);

    let (status, body) = make_request(&app.router, Method::GET, "/api/control").await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["playlist"]["uri"], "local:test");
    assert_eq!(body["playlist"]["name"], "Test Playlist");
    assert_eq!(body["session"]["user"], "alice");
    assert_eq!(body["state"], "idle");
    assert_eq!(body["queueLength"], 2);
    assert!(body["current"].is_null());

    app.state.set_playback_state(PlaybackState::Playing).await;
    app.state.set_tracks_played(1).await;
    app.state
        .set_now_playing(Some(NowPlaying {
            track_id: TrackId::from("a"),
            started_at: Utc::now(),
        }))
        .await;

    let (_, body) = make_request(&app.router, Method::GET, "/api/control").await;
    let body = body.unwrap();
    assert_eq!(body["state"], "playing");
    assert_eq!(body["tracksPlayed"], 1);
    assert_eq!(body["current"]["id"], "a");
    assert!(body["current"]["remainingTime"].is_u64());
}

#[tokio::test]
async fn test_build_info() {
    let app = test_app(&["a"]);

    let (status, body) = make_request(&app.router, Method::GET, "/api/build_info").await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert!(body["gitHash"].is_string());
    assert!(body["buildProfile"].is_string());
}

#[tokio::test]
async fn test_vote_broadcasts_events() {
    let app = test_app(&["a", "b", "c"]);
    let mut events = app.state.subscribe_events();

    make_request(&app.router, Method::POST, "/api/vote/c/up").await;

    match events.recv().await.unwrap() {
        AirifyEvent::VoteCast {
            track_id,
            direction,
            score,
            moved,
            ..
        } => {
            assert_eq!(track_id, "c");
            assert_eq!(direction, "up");
            assert_eq!(score, 1);
            assert!(moved);
        }
        other => panic!("unexpected event {:?}", other),
    }

    match events.recv().await.unwrap() {
        AirifyEvent::QueueChanged { queue, trigger, .. } => {
            assert_eq!(queue, vec!["a", "c", "b"]);
            assert_eq!(trigger, QueueChangeTrigger::Vote);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_votes_keep_membership() {
    let ids: Vec<String> = (0..12).map(|i| format!("t{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let app = test_app(&id_refs);

    let mut handles = Vec::new();
    for n in 0..96 {
        let router = app.router.clone();
        let path = format!(
            "/api/vote/t{}/{}",
            (n * 7) % 12,
            if n % 3 == 0 { "down" } else { "up" }
        );
        handles.push(tokio::spawn(async move {
            let (status, _) = make_request(&router, Method::POST, &path).await;
            assert_eq!(status, StatusCode::OK);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let final_order = order(&app.queue).await;
    assert_eq!(final_order.len(), 12);
    assert_eq!(final_order[0], "t0");
    let unique: HashSet<&String> = final_order.iter().collect();
    assert_eq!(unique.len(), 12);

    // Every vote landed exactly once: 64 ups and 32 downs in total
    let total: i64 = app.queue.catalog().iter().map(|t| t.score()).sum();
    assert_eq!(total, 64 - 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_head_votes_racing_advance() {
    let ids: Vec<String> = (0..8).map(|i| format!("t{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let app = test_app(&id_refs);

    let mut voters = Vec::new();
    for n in 0..48 {
        let router = app.router.clone();
        let path = format!("/api/vote/t{}/{}", n % 3, if n % 2 == 0 { "up" } else { "down" });
        voters.push(tokio::spawn(async move { make_request(&router, Method::POST, &path).await }));
    }

    let queue = app.queue.clone();
    let advancer = tokio::spawn(async move {
        let mut removed = Vec::new();
        for _ in 0..3 {
            if let Some(committed) = queue.advance().await {
                assert!(!committed.order.contains(&committed.change));
                removed.push(committed.change.to_string());
            }
            tokio::task::yield_now().await;
        }
        removed
    });

    for voter in voters {
        let (status, body) = voter.await.unwrap();
        match status {
            // Rejected votes target a track that was already removed
            StatusCode::NOT_FOUND => {}
            StatusCode::OK => assert!(body.unwrap().is_boolean()),
            other => panic!("unexpected status {}", other),
        }
    }
    let removed = advancer.await.unwrap();
    assert_eq!(removed.len(), 3);

    let remaining = order(&app.queue).await;
    assert_eq!(remaining.len(), 5);
    let remaining_set: HashSet<&String> = remaining.iter().collect();
    assert_eq!(remaining_set.len(), 5);
    for id in &removed {
        assert!(!remaining_set.contains(id), "{} still queued after advance", id);
    }
    let mut all: Vec<String> = removed.iter().chain(remaining.iter()).cloned().collect();
    all.sort();
    assert_eq!(all, ids);

    // Removed tracks can no longer be voted
    let path = format!("/api/vote/{}/up", removed[0]);
    let (status, _) = make_request(&app.router, Method::POST, &path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_head_vote_never_moves_between_advances() {
    let app = test_app(&["a", "b", "c"]);

    for direction in ["down", "up", "down"] {
        let head = order(&app.queue).await[0].clone();
        let (status, body) =
            make_request(&app.router, Method::POST, &format!("/api/vote/{}/{}", head, direction)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap(), serde_json::json!(false));
        assert_eq!(order(&app.queue).await[0], head);

        app.queue.advance().await.unwrap();
        let (status, _) =
            make_request(&app.router, Method::POST, &format!("/api/vote/{}/up", head)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    assert!(app.queue.is_empty().await);
}
