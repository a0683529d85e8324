//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて同期ロジックを実装します。
//!
//! # 主要コンポーネント
//! - **SynchronizerBuilder**: ポートのワイヤリングと起動時検証
//! - **SnapshotSynchronizer**: 1 サイクル（capture → compare → skip | upload）
//! - **SyncLoop**: initial delay + interval で同期を回し続けるループ
//! - **SyncConfig / ConfigLoader**: 設定の読み込み
//! - **SyncStats**: サイクル結果の集計

pub mod builder;
pub mod config;
pub mod status;
pub mod sync_loop;
pub mod synchronizer;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, SynchronizerBuilder};
pub use self::config::{BodyEncoding, ConfigLoader, RememberPolicy, SyncConfig};
pub use self::status::SyncStats;
pub use self::sync_loop::{Schedule, SyncLoop};
pub use self::synchronizer::{CyclePhase, SnapshotSynchronizer, SyncOptions};
