//! canvas-sync-core
//!
//! Periodic, deduplicated, best-effort backup of a canvas snapshot to a
//! remote endpoint.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（snapshot, target id, outcome, errors）
//! - **ports**: 抽象化レイヤー（CaptureSource, LocationProvider, Uploader, Clock）
//! - **impls**: 実装（HttpUploader, FileCaptureSource, テスト用ダブル）
//! - **app**: アプリケーションロジック（builder, synchronizer, sync_loop, config, status）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
