//! 答题块级互斥锁

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 按答题块编码划分的异步锁注册表
///
/// 同一答题块上的写操作串行执行，不同答题块互不影响。
#[derive(Default)]
pub struct BlockLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl BlockLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取答题块的锁，持有返回的 guard 直至操作结束
    pub async fn lock(&self, block_code: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(block_code.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// 清理当前无人持有的锁
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_block_is_serialized() {
        let locks = Arc::new(BlockLocks::new());
        let guard = locks.lock("B1").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("B1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire the lock")
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_blocks_do_not_block() {
        let locks = BlockLocks::new();
        let _b1 = locks.lock("B1").await;
        let b2 = tokio::time::timeout(Duration::from_millis(100), locks.lock("B2")).await;
        assert!(b2.is_ok());
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let locks = BlockLocks::new();
        let held = locks.lock("B1").await;
        drop(locks.lock("B2").await);

        assert_eq!(locks.prune(), 1);
        assert_eq!(locks.len(), 1);

        drop(held);
        assert_eq!(locks.prune(), 1);
        assert!(locks.is_empty());
    }
}
