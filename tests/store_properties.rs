use chrono::{Duration, TimeZone, Utc};
use tasklog::config::Config;
use tasklog::storage::Storage;
use tasklog::store::TaskStore;
use tasklog::task::{FinishRequest, StartRequest, StatusFilter};
use tempfile::TempDir;

fn populated_store(dir: &TempDir) -> TaskStore {
    let storage = Storage::new(dir.path().to_path_buf(), Config::default());
    let mut store = TaskStore::open(storage).expect("open");
    let base = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();

    for index in 0..6i64 {
        let started = base + Duration::minutes(index * 37);
        let task = store
            .start_task(StartRequest::new(format!("task {index}")), started)
            .expect("start");
        if index % 2 == 0 {
            store
                .finish_task(FinishRequest::new(task.id), started + Duration::minutes(20))
                .expect("finish");
        }
    }
    store
}

#[test]
fn all_is_merge_of_active_and_finished() {
    let dir = TempDir::new().unwrap();
    let store = populated_store(&dir);

    let all = store.query(StatusFilter::All);
    let mut merged = store.query(StatusFilter::Active);
    merged.extend(store.query(StatusFilter::Finished));
    merged.sort_by_key(|task| task.started_at);

    assert_eq!(all.len(), 6);
    assert_eq!(all, merged);
    assert!(all.windows(2).all(|pair| pair[0].started_at <= pair[1].started_at));
}

#[test]
fn reopen_sees_same_tasks() {
    let dir = TempDir::new().unwrap();
    let expected = populated_store(&dir).query(StatusFilter::All);

    let storage = Storage::new(dir.path().to_path_buf(), Config::default());
    let reopened = TaskStore::open(storage).expect("reopen");
    assert_eq!(reopened.query(StatusFilter::All), expected);
}

#[test]
fn finished_tasks_never_precede_their_start() {
    let dir = TempDir::new().unwrap();
    let store = populated_store(&dir);

    for task in store.query(StatusFilter::Finished) {
        let finished = task.finished_at.expect("finished_at");
        assert!(finished >= task.started_at);
        assert_eq!(task.duration_minutes(), Some(20));
    }
    for task in store.query(StatusFilter::Active) {
        assert!(task.finished_at.is_none());
    }
}
