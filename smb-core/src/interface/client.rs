use crate::error::ClientError;

use futures::future::BoxFuture;

pub trait SmbClient: Send + Sync + 'static {
    /// ゲートウェイに接続し、切断されるまでイベントを処理する。
    fn execute(&self) -> BoxFuture<'static, Result<(), ClientError>>;

    /// 接続中のゲートウェイを閉じる。
    fn shutdown(&self) -> BoxFuture<'static, ()>;
}
