//! 逾期分配扫描任务

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::grading::GradingEngine;

/// 按固定间隔执行逾期扫描，间隔为 0 时不启动
pub fn spawn_overdue_sweeper(engine: Arc<GradingEngine>, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        debug!("Overdue sweeper disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = engine.sweep_overdue().await {
                error!("Overdue sweep failed: {}", e);
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::GradingPolicy;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_zero_interval_disables_sweeper() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        let engine = Arc::new(GradingEngine::new(Arc::new(storage), GradingPolicy::default()));
        assert!(spawn_overdue_sweeper(engine, 0).is_none());
    }

    #[tokio::test]
    async fn test_sweeper_runs_and_can_be_aborted() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        let engine = Arc::new(GradingEngine::new(Arc::new(storage), GradingPolicy::default()));
        let handle = spawn_overdue_sweeper(engine, 1).expect("sweeper handle");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
