//! End-to-end: SSE bytes through the router into the persisted store

use bytes::Bytes;
use futures_util::stream;
use std::sync::{Arc, Mutex};
use taskdeck_core::{
    decode_stream, EventRouter, KvStore, MemoryKvStore, TaskStatus, TaskStore, STORAGE_KEY,
};

#[tokio::test]
async fn chunked_task_stream_lands_in_store() {
    let storage = Arc::new(MemoryKvStore::new());
    let store = TaskStore::with_storage(storage.clone());

    let mut router = EventRouter::new();
    let generic_count = Arc::new(Mutex::new(0));
    let counter = generic_count.clone();
    router.add_generic_sink(move |_| *counter.lock().unwrap() += 1);
    let sink = store.clone();
    router.add_task_sink(move |event| sink.apply(event));

    let chunks = vec![
        Ok::<_, std::io::Error>(Bytes::from_static(
            b"data: {\"type\":\"TASK_UPDATE\",\"task_id\":\"t1\",\"task_type\":\"crawl\",\"status\":\"running\",\"progress\":40}\n",
        )),
        Ok(Bytes::from_static(
            b"data: {\"type\":\"TASK_UPDATE\",\"task_id\":\"t1\",\"task_type\":\"crawl\",\"status\":\"completed\",\"progress\":100}\n",
        )),
    ];
    decode_stream(stream::iter(chunks), |event| router.route(&event))
        .await
        .unwrap();

    // Two generic events fired, upserted into a single record
    assert_eq!(*generic_count.lock().unwrap(), 2);
    assert_eq!(store.len(), 1);
    assert_eq!(store.count_by_status(TaskStatus::Completed), 1);
    assert_eq!(store.count_by_status(TaskStatus::Running), 0);

    let record = &store.snapshot()[0];
    assert_eq!(record.task_id, "t1");
    assert_eq!(record.status, TaskStatus::Completed);
    assert_eq!(record.progress, 100);

    // The final state is what got persisted, and a fresh store sees it
    let raw = storage.get(STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"completed\""));
    let reloaded = TaskStore::with_storage(storage);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.snapshot()[0].progress, 100);
}

#[tokio::test]
async fn malformed_line_does_not_stop_the_turn() {
    let store = TaskStore::new();
    let mut router = EventRouter::new();
    let sink = store.clone();
    router.add_task_sink(move |event| sink.apply(event));

    let chunks = vec![Ok::<_, std::io::Error>(Bytes::from_static(
        b"data: {broken\ndata: {\"type\":\"TASK_UPDATE\",\"task_id\":\"t2\",\"task_type\":\"export\",\"status\":\"pending\",\"progress\":0}\n",
    ))];
    decode_stream(stream::iter(chunks), |event| router.route(&event))
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.snapshot()[0].task_id, "t2");
}
