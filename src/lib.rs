//! FarmAid AI CLI
//!
//! 画像診断・推奨対策・専門家/商品一覧・フィードバックをバックエンドAPI経由で扱う。

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod scanner;
pub mod storage;
