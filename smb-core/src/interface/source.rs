use crate::error::SourceError;

use std::sync::Arc;

use futures::future::BoxFuture;

pub type ArcResponseSource = Arc<dyn ResponseSource + 'static>;

/// コマンドテーブルの取得元。
pub trait ResponseSource: Send + Sync {
    fn description(&self) -> String;

    /// テーブルの本文を取得する。パースは呼出し側で行う。
    fn fetch(&self) -> BoxFuture<'_, Result<String, SourceError>>;
}
