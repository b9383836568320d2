use std::error::Error as StdError;

use thiserror::Error as ThisError;

type ErasedError = Box<dyn StdError + Send + Sync + 'static>;

/// `ResponseSource` の取得失敗。
#[derive(Debug, ThisError)]
pub enum SourceError {
    /// 接続できない・タイムアウトなど。
    #[error("transport error: {0}")]
    Transport(#[source] ErasedError),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("internal error: {0}")]
    Internal(#[source] ErasedError),
}

impl SourceError {
    pub fn by_transport(source: impl Into<ErasedError>) -> SourceError {
        SourceError::Transport(source.into())
    }

    pub fn by_internal(source: impl Into<ErasedError>) -> SourceError {
        SourceError::Internal(source.into())
    }
}

/// コマンドテーブルの更新失敗。
#[derive(Debug, ThisError)]
pub enum TableError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("malformed table: {0}")]
    Parse(#[source] ErasedError),
}

impl TableError {
    pub fn by_parse(source: impl Into<ErasedError>) -> TableError {
        TableError::Parse(source.into())
    }
}

#[derive(Debug, ThisError)]
pub enum ClientError {
    #[error("communication error: {0}")]
    Communication(#[source] ErasedError),

    #[error("external error: {0}")]
    External(#[source] ErasedError),

    #[error("internal error: {0}")]
    Internal(#[source] ErasedError),
}

impl ClientError {
    pub fn by_communication(source: impl Into<ErasedError>) -> ClientError {
        ClientError::Communication(source.into())
    }

    pub fn by_external(source: impl Into<ErasedError>) -> ClientError {
        ClientError::External(source.into())
    }

    pub fn by_internal(source: impl Into<ErasedError>) -> ClientError {
        ClientError::Internal(source.into())
    }
}
