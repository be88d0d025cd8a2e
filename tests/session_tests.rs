// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session

use photobooth::backends::camera::TestPatternDevice;
use photobooth::config::ServerConfig;
use photobooth::counter::{self, CounterService, MemoryStore};
use photobooth::pipelines::photo::{CAPTIONS, IndexSource};
use photobooth::{
    CameraError, CaptureSession, CounterClient, FacingMode, MediaAcquisition, PhotoError,
    SessionPhase,
};
use std::sync::Arc;
use std::time::Duration;

const WIDTH: u32 = 16;
const HEIGHT: u32 = 8;

/// Always picks the same catalog entry
struct Fixed(usize);

impl IndexSource for Fixed {
    fn next_index(&mut self, _len: usize) -> usize {
        self.0
    }
}

fn device() -> Arc<TestPatternDevice> {
    Arc::new(TestPatternDevice::new().with_size(WIDTH, HEIGHT))
}

fn session_on(device: &Arc<TestPatternDevice>) -> CaptureSession {
    let camera = MediaAcquisition::new(device.clone()).with_timing(Duration::ZERO, Duration::ZERO);
    CaptureSession::new(camera).with_captions(Box::new(Fixed(0)))
}

/// Client for a port nothing listens on
async fn unreachable_client() -> CounterClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    CounterClient::new(&format!("http://{}/photobooth", addr), "key", Duration::from_secs(1))
        .unwrap()
}

#[tokio::test]
async fn front_capture_is_mirrored() {
    let device = device();
    let mut session = session_on(&device).with_facing(FacingMode::Front);

    session.start().await.unwrap();
    let captured = session.capture().await.unwrap();

    assert_eq!(captured.facing, FacingMode::Front);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            assert_eq!(
                captured.image.get_pixel(x, y).0,
                TestPatternDevice::pattern_pixel(FacingMode::Front, WIDTH - 1 - x, y)
            );
        }
    }
}

#[tokio::test]
async fn back_capture_is_not_mirrored() {
    let device = device();
    let mut session = session_on(&device).with_facing(FacingMode::Back);

    session.start().await.unwrap();
    let captured = session.capture().await.unwrap();

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            assert_eq!(
                captured.image.get_pixel(x, y).0,
                TestPatternDevice::pattern_pixel(FacingMode::Back, x, y)
            );
        }
    }
}

#[tokio::test]
async fn capture_assigns_caption_from_catalog() {
    let device = device();
    let camera = MediaAcquisition::new(device.clone()).with_timing(Duration::ZERO, Duration::ZERO);
    let mut session = CaptureSession::new(camera).with_captions(Box::new(Fixed(5)));

    session.start().await.unwrap();
    assert_eq!(session.capture().await.unwrap().caption, CAPTIONS[5]);

    session.set_caption("Best day ever").unwrap();
    assert_eq!(session.captured().unwrap().caption, "Best day ever");
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_once_per_second() {
    let device = device();
    let mut session = session_on(&device);
    session.start().await.unwrap();

    let started = tokio::time::Instant::now();
    let mut ticks = Vec::new();
    session
        .countdown_and_capture(|value| ticks.push((value, started.elapsed().as_secs())))
        .await
        .unwrap();

    assert_eq!(ticks, vec![(3, 0), (2, 1), (1, 2)]);
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(session.phase(), SessionPhase::Captured);
    assert_eq!(session.countdown(), None);
}

#[tokio::test(start_paused = true)]
async fn capture_is_refused_during_countdown() {
    let device = device();
    let mut session = session_on(&device);
    session.start().await.unwrap();

    // Drop the countdown future after its first tick
    {
        let countdown = session.countdown_and_capture(|_| {});
        let _ = tokio::time::timeout(Duration::from_millis(500), countdown).await;
    }
    assert_eq!(session.countdown(), Some(3));
    assert_eq!(
        session.capture().await.unwrap_err(),
        PhotoError::CountdownInProgress
    );
    assert!(session.is_live());

    session.cancel_countdown();
    session.capture().await.unwrap();
}

#[tokio::test]
async fn switching_keeps_exactly_one_stream() {
    let device = device();
    let mut session = session_on(&device).with_facing(FacingMode::Front);

    session.start().await.unwrap();
    session.switch_camera().await.unwrap();
    assert_eq!(device.active_streams(), 1);
    assert_eq!(session.facing(), FacingMode::Back);

    session.switch_camera().await.unwrap();
    assert_eq!(device.active_streams(), 1);
    assert_eq!(session.facing(), FacingMode::Front);
    assert!(session.is_live());
}

#[tokio::test]
async fn permission_denied_leaves_session_idle() {
    let device = device();
    let mut session = session_on(&device);
    device.fail_next(CameraError::PermissionDenied);

    let err = session.start().await.unwrap_err();
    assert_eq!(err, CameraError::PermissionDenied);
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(device.active_streams(), 0);
    // Only one attempt; the user retries
    assert_eq!(device.open_count(), 1);

    session.start().await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Live);
}

#[tokio::test]
async fn failed_switch_returns_to_idle() {
    let device = device();
    let mut session = session_on(&device);
    session.start().await.unwrap();

    device.fail_next(CameraError::NotFound);
    assert_eq!(
        session.switch_camera().await.unwrap_err(),
        CameraError::NotFound
    );
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(device.active_streams(), 0);
}

#[tokio::test]
async fn reset_returns_to_idle_and_releases() {
    let device = device();
    let mut session = session_on(&device);
    session.start().await.unwrap();
    session.capture().await.unwrap();

    session.reset();
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.captured().is_none());
    assert_eq!(device.active_streams(), 0);

    session.start().await.unwrap();
    assert_eq!(device.active_streams(), 1);
    session.stop();
    assert_eq!(device.active_streams(), 0);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn dropping_session_releases_camera() {
    let device = device();
    {
        let mut session = session_on(&device);
        session.start().await.unwrap();
        assert_eq!(device.active_streams(), 1);
    }
    assert_eq!(device.active_streams(), 0);
}

#[tokio::test]
async fn unreachable_counter_falls_back_to_local_tally() {
    let device = device();
    let mut session = session_on(&device).with_bridge(unreachable_client().await);

    assert_eq!(session.load_count().await, 0);

    session.start().await.unwrap();
    session.capture().await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Captured);
    assert_eq!(session.capture_count(), 1);

    session.start().await.unwrap();
    session.capture().await.unwrap();
    assert_eq!(session.capture_count(), 2);
}

#[tokio::test]
async fn captures_are_reported_to_counter_service() {
    let config = ServerConfig {
        bind: "127.0.0.1:0".to_string(),
        path_prefix: "/photobooth".to_string(),
        api_key: "key".to_string(),
        store_path: None,
    };
    let store = Arc::new(MemoryStore::new());
    let service = CounterService::new(store);
    service.increment_count().unwrap();
    service.increment_count().unwrap();

    let listener = tokio::net::TcpListener::bind(&config.bind).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        counter::serve_on(listener, service, &config, async move {
            let _ = rx.await;
        })
        .await
    });

    let client = CounterClient::new(
        &format!("http://{}/photobooth", addr),
        "key",
        Duration::from_secs(5),
    )
    .unwrap();
    let device = device();
    let mut session = session_on(&device).with_bridge(client);

    assert_eq!(session.load_count().await, 2);
    session.start().await.unwrap();
    session.capture().await.unwrap();
    assert_eq!(session.capture_count(), 3);

    drop(session);
    let _ = tx.send(());
    server.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn restarting_clears_an_abandoned_countdown() {
    let device = device();
    let mut session = session_on(&device);
    session.start().await.unwrap();

    {
        let countdown = session.countdown_and_capture(|_| {});
        let _ = tokio::time::timeout(Duration::from_millis(500), countdown).await;
    }
    assert_eq!(session.countdown(), Some(3));

    session.start().await.unwrap();
    assert_eq!(session.countdown(), None);
    assert_eq!(device.active_streams(), 1);
    session.capture().await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Captured);
}
