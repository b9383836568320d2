mod source;
mod table;

pub use source::HttpResponseSource;
pub use table::CommandTable;

use std::{sync::Arc, time::Duration};

use futures::{FutureExt, future::BoxFuture};
use smb_core::{
    error::TableError,
    interface::source::{ArcResponseSource, ResponseSource},
    model::command_key::CommandKey,
};
use tokio::{sync::RwLock, time::sleep};
use tracing::{debug, info, warn};

/// 1 回の更新の結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Replaced { entries: usize },
    Retained,
}

/// 定期的に差し替えられるコマンドテーブル。
/// 読み手は常に差し替え前か差し替え後のどちらか一方のテーブル全体を見る。
#[derive(Debug, Clone, Default)]
pub struct CommandTableCache {
    current: Arc<RwLock<Arc<CommandTable>>>,
}

impl CommandTableCache {
    pub fn new() -> CommandTableCache {
        CommandTableCache::default()
    }

    /// 現在のテーブル全体。
    pub async fn snapshot(&self) -> Arc<CommandTable> {
        self.current.read().await.clone()
    }

    /// キーを正規化して応答文を引く。見つからなければ `None`。
    pub async fn lookup(&self, key: impl Into<CommandKey>) -> Option<String> {
        let key = key.into();
        let table = self.snapshot().await;
        table.get(&key).map(ToString::to_string)
    }

    pub async fn replace(&self, table: CommandTable) {
        let table = Arc::new(table);
        let mut locked = self.current.write().await;
        *locked = table;
    }

    /// 1 回分の取得と差し替え。失敗しても元のテーブルは残す。
    pub async fn refresh(&self, source: &dyn ResponseSource) -> RefreshOutcome {
        match fetch_table(source).await {
            Ok(table) => {
                let entries = table.len();
                self.replace(table).await;
                info!("command table refreshed from {}: {entries} entries", source.description());
                RefreshOutcome::Replaced { entries }
            }
            Err(err) => {
                warn!("command table refresh failed, keeping previous table: {err}");
                RefreshOutcome::Retained
            }
        }
    }

    /// `interval` ごとに `refresh` し続ける。最初の 1 回は即座に行う。
    pub fn run(&self, source: ArcResponseSource, interval: Duration) -> BoxFuture<'static, ()> {
        let cloned_self = self.clone();
        async move {
            info!(
                "starting command table refresh every {}s from {}",
                interval.as_secs(),
                source.description()
            );
            loop {
                let outcome = cloned_self.refresh(source.as_ref()).await;
                debug!("refresh tick finished: {outcome:?}");
                sleep(interval).await;
            }
        }
        .boxed()
    }
}

async fn fetch_table(source: &dyn ResponseSource) -> Result<CommandTable, TableError> {
    let body = source.fetch().await?;
    CommandTable::from_json(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use smb_core::error::SourceError;

    /// 用意した結果を順に返し、尽きたら転送エラーを返す。
    struct ScriptedSource {
        bodies: Mutex<VecDeque<Result<String, SourceError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(bodies: impl IntoIterator<Item = Result<&'static str, SourceError>>) -> ScriptedSource {
            ScriptedSource {
                bodies: Mutex::new(bodies.into_iter().map(|b| b.map(ToString::to_string)).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ResponseSource for ScriptedSource {
        fn description(&self) -> String {
            "scripted".to_string()
        }

        fn fetch(&self) -> BoxFuture<'_, Result<String, SourceError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .bodies
                .lock()
                .expect("poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(SourceError::by_transport("connection refused")));
            async move { next }.boxed()
        }
    }

    fn unreachable() -> Result<&'static str, SourceError> {
        Err(SourceError::by_transport("connection refused"))
    }

    #[tokio::test]
    async fn empty_before_first_refresh() {
        let cache = CommandTableCache::new();
        assert_eq!(cache.lookup("ping").await, None);
        assert_eq!(cache.lookup("").await, None);
        assert!(cache.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn lookup_normalizes_key() {
        let cache = CommandTableCache::new();
        let source = ScriptedSource::new([Ok(r#"{"ping": "pong"}"#)]);
        cache.refresh(&source).await;

        for raw in ["PING", " ping", "ping", "!ping"] {
            assert_eq!(cache.lookup(raw).await.as_deref(), Some("pong"), "{raw:?}");
        }
    }

    #[tokio::test]
    async fn keeps_last_good_table_across_failures() {
        let cache = CommandTableCache::new();
        let source = ScriptedSource::new([Ok(r#"{"ping": "pong"}"#)]);
        assert_eq!(cache.refresh(&source).await, RefreshOutcome::Replaced { entries: 1 });

        for _ in 0..50 {
            assert_eq!(cache.refresh(&source).await, RefreshOutcome::Retained);
            assert_eq!(cache.lookup("ping").await.as_deref(), Some("pong"));
        }
        assert_eq!(source.calls(), 51);
    }

    #[tokio::test]
    async fn replaces_instead_of_merging() {
        let cache = CommandTableCache::new();
        let source = ScriptedSource::new([Ok(r#"{"a": "1", "b": "2"}"#), Ok(r#"{"a": "9"}"#)]);
        cache.refresh(&source).await;
        assert_eq!(cache.lookup("b").await.as_deref(), Some("2"));

        assert_eq!(cache.refresh(&source).await, RefreshOutcome::Replaced { entries: 1 });
        assert_eq!(cache.lookup("a").await.as_deref(), Some("9"));
        assert_eq!(cache.lookup("b").await, None);
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        let cache = CommandTableCache::new();
        let source = ScriptedSource::new([Ok(r#"{"ping": "pong"}"#), Ok("not json")]);
        cache.refresh(&source).await;

        assert_eq!(cache.refresh(&source).await, RefreshOutcome::Retained);
        assert_eq!(cache.lookup("ping").await.as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn status_failure_is_retained() {
        let cache = CommandTableCache::new();
        let source = ScriptedSource::new([Ok(r#"{"ping": "pong"}"#), Err(SourceError::Status(404)), unreachable()]);
        cache.refresh(&source).await;

        assert_eq!(cache.refresh(&source).await, RefreshOutcome::Retained);
        assert_eq!(cache.refresh(&source).await, RefreshOutcome::Retained);
        assert_eq!(cache.lookup("ping").await.as_deref(), Some("pong"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_mixed_tables() {
        let cache = CommandTableCache::new();
        let old_table: CommandTable = [("a", "old"), ("b", "old"), ("only_old", "old")].into_iter().collect();
        let new_table: CommandTable = [("a", "new"), ("b", "new"), ("only_new", "new")].into_iter().collect();
        cache.replace(old_table.clone()).await;

        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for i in 0..2000 {
                    let next = if i % 2 == 0 { new_table.clone() } else { old_table.clone() };
                    cache.replace(next).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    for _ in 0..2000 {
                        let table = cache.snapshot().await;
                        let a = table.get(&CommandKey::new("a"));
                        let b = table.get(&CommandKey::new("b"));
                        assert_eq!(a, b);
                        let has_old = table.get(&CommandKey::new("only_old")).is_some();
                        let has_new = table.get(&CommandKey::new("only_new")).is_some();
                        assert!(has_old != has_new);

                        let looked_up = cache.lookup("a").await;
                        assert!(matches!(looked_up.as_deref(), Some("old") | Some("new")));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.expect("writer panicked");
        for reader in readers {
            reader.await.expect("reader panicked");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_at_fixed_interval() {
        let cache = CommandTableCache::new();
        let source = Arc::new(ScriptedSource::new([
            Ok(r#"{"ping": "pong"}"#),
            unreachable(),
            Ok("not json"),
        ]));
        let interval = Duration::from_secs(150);
        let task = tokio::spawn(cache.run(source.clone(), interval));

        // 0s, 150s, 300s, 450s の 4 回
        sleep(interval * 3 + Duration::from_secs(10)).await;
        task.abort();

        assert_eq!(source.calls(), 4);
        assert_eq!(cache.lookup("ping").await.as_deref(), Some("pong"));
    }
}
