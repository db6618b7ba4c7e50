#![cfg(target_os = "linux")]

use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use randpath::{DirectoryPath, WatchEvent, WatchEventKind, WatchService, WatchState};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_PERIOD: Duration = Duration::from_millis(400);

fn watched(dir: &TempDir) -> DirectoryPath {
    DirectoryPath::validate(&dir.path().to_string_lossy()).expect("temp dir is a directory")
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<WatchEvent>) -> WatchEvent {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("Timeout waiting for watch event")
        .expect("Event channel closed")
}

async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<WatchEvent>) {
    if let Ok(Some(event)) = tokio::time::timeout(QUIET_PERIOD, rx.recv()).await {
        panic!("Unexpected event: {:?}", event);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_create_delete_rename_notifications() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (tx, mut rx) = mpsc::unbounded_channel::<WatchEvent>();
    let mut handle = WatchService::new(vec![watched(&temp_dir)], tx, CancellationToken::new()).spawn();
    assert_eq!(handle.wait_for(WatchState::Running).await, WatchState::Running);

    let test_file = temp_dir.path().join("test.txt");
    fs::write(&test_file, "hello").expect("Failed to write test file");

    let created = next_event(&mut rx).await;
    assert_eq!(created.kind, WatchEventKind::Created);
    assert_eq!(created.name, "test.txt");
    assert_quiet(&mut rx).await;

    let renamed = temp_dir.path().join("renamed.txt");
    fs::rename(&test_file, &renamed).expect("Failed to rename test file");

    let from = next_event(&mut rx).await;
    let to = next_event(&mut rx).await;
    assert_eq!((from.kind, from.name.as_str()), (WatchEventKind::RenamedFrom, "test.txt"));
    assert_eq!((to.kind, to.name.as_str()), (WatchEventKind::RenamedTo, "renamed.txt"));
    assert_quiet(&mut rx).await;

    fs::remove_file(&renamed).expect("Failed to delete test file");

    let deleted = next_event(&mut rx).await;
    assert_eq!(deleted.kind, WatchEventKind::Deleted);
    assert_eq!(deleted.name, "renamed.txt");
    assert_quiet(&mut rx).await;

    handle.shutdown(Duration::from_secs(2)).await.expect("Clean shutdown");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_subdirectory_activity_is_suppressed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (tx, mut rx) = mpsc::unbounded_channel::<WatchEvent>();
    let mut handle = WatchService::new(vec![watched(&temp_dir)], tx, CancellationToken::new()).spawn();
    handle.wait_for(WatchState::Running).await;

    let sub = temp_dir.path().join("albums");
    fs::create_dir(&sub).expect("Failed to create subdirectory");
    fs::rename(&sub, temp_dir.path().join("albums-old")).expect("Failed to rename subdirectory");
    fs::remove_dir(temp_dir.path().join("albums-old")).expect("Failed to remove subdirectory");
    fs::write(temp_dir.path().join("after.txt"), "x").expect("Failed to write file");

    let first = next_event(&mut rx).await;
    assert_eq!(first.kind, WatchEventKind::Created);
    assert_eq!(first.name, "after.txt");

    handle.shutdown(Duration::from_secs(2)).await.expect("Clean shutdown");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_relative_directory_is_watched() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(temp_dir.path().join("media")).expect("Failed to create media dir");
    let original_cwd = std::env::current_dir().expect("Current dir");
    std::env::set_current_dir(temp_dir.path()).expect("Failed to enter temp dir");

    let media = DirectoryPath::validate("media").expect("Relative directory is valid");
    let (tx, mut rx) = mpsc::unbounded_channel::<WatchEvent>();
    let mut handle = WatchService::new(vec![media.clone()], tx, CancellationToken::new()).spawn();
    let state = handle.wait_for(WatchState::Running).await;
    std::env::set_current_dir(original_cwd).expect("Failed to restore current dir");
    assert_eq!(state, WatchState::Running);

    fs::write(temp_dir.path().join("media").join("test.txt"), "x").expect("Failed to write file");

    let event = next_event(&mut rx).await;
    assert_eq!(event.kind, WatchEventKind::Created);
    assert_eq!(event.name, "test.txt");
    assert_eq!(event.directory.as_str(), "media");
    assert_eq!(event.directory, media);

    handle.shutdown(Duration::from_secs(2)).await.expect("Clean shutdown");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_events_name_their_directory() {
    let first = TempDir::new().expect("Failed to create temp dir");
    let second = TempDir::new().expect("Failed to create temp dir");
    let (tx, mut rx) = mpsc::unbounded_channel::<WatchEvent>();
    let mut handle = WatchService::new(
        vec![watched(&first), watched(&second)],
        tx,
        CancellationToken::new(),
    )
    .spawn();
    handle.wait_for(WatchState::Running).await;

    fs::write(second.path().join("b.txt"), "b").expect("Failed to write file");

    let event = next_event(&mut rx).await;
    assert_eq!(event.name, "b.txt");
    assert_eq!(event.directory, watched(&second));

    handle.shutdown(Duration::from_secs(2)).await.expect("Clean shutdown");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancellation_stops_idle_service_promptly() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (tx, _rx) = mpsc::unbounded_channel::<WatchEvent>();
    let cancel = CancellationToken::new();
    let service = WatchService::new(vec![watched(&temp_dir)], tx, cancel.clone());
    let state = service.subscribe_state();
    let mut handle = service.spawn();
    handle.wait_for(WatchState::Running).await;

    let started = Instant::now();
    cancel.cancel();
    assert_eq!(handle.wait_for(WatchState::Stopped).await, WatchState::Stopped);
    assert!(started.elapsed() < Duration::from_secs(1));

    handle.shutdown(Duration::from_secs(2)).await.expect("Clean shutdown");
    assert_eq!(*state.borrow(), WatchState::Stopped);
}

#[tokio::test]
async fn test_no_watchable_directories_stops_immediately() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let gone = watched(&temp_dir);
    drop(temp_dir);

    let (tx, _rx) = mpsc::unbounded_channel::<WatchEvent>();
    let service = WatchService::new(vec![gone], tx, CancellationToken::new());
    let mut state = service.subscribe_state();

    service.run().await.expect("Nothing to watch is not an error");

    assert_eq!(*state.borrow_and_update(), WatchState::Stopped);
}

#[tokio::test]
async fn test_empty_snapshot_stops_immediately() {
    let (tx, _rx) = mpsc::unbounded_channel::<WatchEvent>();
    let mut handle = WatchService::new(Vec::new(), tx, CancellationToken::new()).spawn();

    assert_eq!(handle.wait_for(WatchState::Running).await, WatchState::Stopped);
    handle.shutdown(Duration::from_secs(1)).await.expect("Clean shutdown");
}
