use chrono::NaiveDate;

/// 時計ポート
///
/// 貸出日・返却日の基準となる「今日」を提供する。
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
