use mygo_bot::conversation::{ConversationLog, ConversationStore, JsonFileStore, Role, update};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_log_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conversations.json");

    {
        let store = JsonFileStore::new(&path);
        update(&store, |log| {
            log.append_turn("U1", Role::User, "文字");
            log.append_turn("U1", Role::Assistant, "這是一則文字回覆！");
        })
        .await
        .unwrap();
    }

    let store = JsonFileStore::new(&path);
    let log = store.load().await.unwrap();
    let record = log.get("U1").unwrap();
    assert_eq!(record.messages.len(), 2);
    assert_eq!(record.messages[1].content, "這是一則文字回覆！");
}

#[tokio::test]
async fn test_file_keeps_non_ascii_verbatim() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conversations.json");
    let store = JsonFileStore::new(&path);
    update(&store, |log| log.append_turn("U1", Role::User, "位置資訊"))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("位置資訊"));
    assert!(!raw.contains("\\u"));
    // Pretty-printed
    assert!(raw.contains('\n'));
}

#[tokio::test]
async fn test_created_at_stable_across_cycles() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("c.json"));

    update(&store, |log| log.append_turn("U1", Role::User, "one"))
        .await
        .unwrap();
    let first = store.load().await.unwrap().get("U1").unwrap().created_at.clone();

    update(&store, |log| log.append_turn("U1", Role::User, "two"))
        .await
        .unwrap();
    let record = store.load().await.unwrap().get("U1").unwrap().clone();
    assert_eq!(record.created_at, first);
    assert_eq!(record.messages.len(), 2);
}

#[tokio::test]
async fn test_delete_missing_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("c.json"));
    update(&store, |log| log.append_turn("U1", Role::User, "hi"))
        .await
        .unwrap();

    let removed = update(&store, |log| log.remove("ghost")).await.unwrap();
    assert!(!removed);
    assert_eq!(store.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_all_then_list_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("c.json"));
    update(&store, |log| {
        log.append_turn("U1", Role::User, "a");
        log.append_turn("U2", Role::User, "b");
    })
    .await
    .unwrap();

    update(&store, ConversationLog::clear).await.unwrap();
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_writers_share_one_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("c.json")));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                update(store.as_ref(), |log| {
                    log.append_turn(&format!("U{}", i % 2), Role::User, format!("m{}", i));
                })
                .await
                .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let log = store.load().await.unwrap();
    let total: usize = log.iter().map(|(_, r)| r.messages.len()).sum();
    assert_eq!(total, 8);
}
