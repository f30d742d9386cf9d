//! メッセージ送信（通知）の実装
//!
//! ## 概要
//!
//! このモジュールは `MessagePusher` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `pipeline`: 各接続の Outbound Pipeline にエンキューする実装

pub mod pipeline;

pub use pipeline::PipelineMessagePusher;
