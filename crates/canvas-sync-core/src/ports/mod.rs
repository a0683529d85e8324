//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait はシンクロナイザーの外側にあるもの（描画面、ページの location、
//! アップロード先の HTTP エンドポイント、時計）へのインターフェースを提供し、
//! テストではダブルに差し替えられるようにします。

pub mod capture_source;
pub mod clock;
pub mod location;
pub mod uploader;

// 主要な trait を再エクスポート
pub use self::capture_source::CaptureSource;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::location::LocationProvider;
pub use self::uploader::Uploader;
