use crate::domain::events::DomainEvent;
use async_trait::async_trait;
use futures::stream::BoxStream;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// イベントストアポート
///
/// 台帳のドメインイベントを追記専用ログとして保持する。
/// 永続化を導入する場合はこのポートの実装を差し替える。
#[async_trait]
pub trait EventStore: Send + Sync {
    /// イベントを追記する
    ///
    /// 追記は全件成功か全件失敗のどちらか。順序は保持される。
    async fn append(&self, events: Vec<DomainEvent>) -> Result<()>;

    /// すべてのイベントを追記順にストリーム配信する
    ///
    /// `Ledger::replay`による台帳の復元に使用される。
    fn stream_all(&self) -> BoxStream<'_, Result<DomainEvent>>;
}
