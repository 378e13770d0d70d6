//! 実行中リクエストのガード
//!
//! 同じ論理操作（predict など）の二重実行を拒否する。
//! ガードが破棄されると解放される。

use crate::error::ApiError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 操作ごとの実行中フラグ
#[derive(Debug, Clone)]
pub struct InFlight {
    operation: &'static str,
    busy: Arc<AtomicBool>,
}

impl InFlight {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 実行権を取得（実行中なら Busy）
    pub fn try_acquire(&self) -> Result<InFlightGuard, ApiError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ApiError::Busy {
                operation: self.operation,
            })?;
        Ok(InFlightGuard {
            busy: self.busy.clone(),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// 取得中の実行権
#[derive(Debug)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
