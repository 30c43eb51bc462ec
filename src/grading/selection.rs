//! 阅卷员选择：负载最低者优先，负载相同按 ID 升序

use std::collections::HashMap;

/// 从候选人中选出 count 名负载最低的阅卷员
pub fn pick_least_loaded(candidates: &[i64], loads: &HashMap<i64, u64>, count: usize) -> Vec<i64> {
    let mut ranked: Vec<(u64, i64)> = candidates
        .iter()
        .map(|id| (loads.get(id).copied().unwrap_or(0), *id))
        .collect();
    ranked.sort_unstable();
    ranked.dedup_by_key(|(_, id)| *id);
    ranked.into_iter().take(count).map(|(_, id)| id).collect()
}
