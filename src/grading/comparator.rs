//! 多轮评分比对
//!
//! 纯计算，不访问存储。输入为按轮次升序排列的分数。

use crate::models::grading::entities::{ComparisonOutcome, ComparisonStatus};

use super::GradingPolicy;

/// 浮点比较容差
const EPSILON: f64 = 1e-9;

/// 四舍五入到两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 根据各轮分数计算比对结果
pub fn compare(scores: &[f64], policy: &GradingPolicy) -> ComparisonOutcome {
    if scores.len() < 2 {
        return ComparisonOutcome {
            status: ComparisonStatus::Pending,
            score_difference: None,
            final_score: None,
            needs_manual_review: false,
        };
    }

    let (r1, r2) = (scores[0], scores[1]);
    // 判定使用原始差值，round2 只用于展示
    let raw_difference = (r1 - r2).abs();
    let difference = round2(raw_difference);

    if raw_difference <= policy.tolerance + EPSILON {
        return ComparisonOutcome {
            status: ComparisonStatus::Matched,
            score_difference: Some(difference),
            final_score: Some(round2((r1 + r2) / 2.0)),
            needs_manual_review: false,
        };
    }

    let Some(&r3) = scores.get(2) else {
        return ComparisonOutcome {
            status: ComparisonStatus::NeedsThirdRound,
            score_difference: Some(difference),
            final_score: None,
            needs_manual_review: false,
        };
    };

    let (final_score, needs_manual_review) = resolve_three(r1, r2, r3, policy.tolerance);

    ComparisonOutcome {
        status: ComparisonStatus::ResolvedByThird,
        score_difference: Some(difference),
        final_score: Some(final_score),
        needs_manual_review,
    }
}

/// 三个分数取最接近的一对求平均；距离相同取中位数；
/// 所有两两差值都超出容差时取三者平均并标记人工复核
fn resolve_three(r1: f64, r2: f64, r3: f64, tolerance: f64) -> (f64, bool) {
    let pairs = [
        ((r1 - r2).abs(), r1, r2),
        ((r1 - r3).abs(), r1, r3),
        ((r2 - r3).abs(), r2, r3),
    ];

    let closest = pairs
        .iter()
        .map(|(distance, _, _)| *distance)
        .fold(f64::INFINITY, f64::min);

    if closest > tolerance + EPSILON {
        return (round2((r1 + r2 + r3) / 3.0), true);
    }

    let mut nearest = pairs
        .iter()
        .filter(|(distance, _, _)| (distance - closest).abs() <= EPSILON);

    match (nearest.next(), nearest.next()) {
        (Some((_, a, b)), None) => (round2((a + b) / 2.0), false),
        _ => (round2(median(r1, r2, r3)), false),
    }
}

fn median(a: f64, b: f64, c: f64) -> f64 {
    let mut scores = [a, b, c];
    scores.sort_by(f64::total_cmp);
    scores[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> GradingPolicy {
        GradingPolicy {
            tolerance: 1.0,
            ..GradingPolicy::default()
        }
    }

    #[test]
    fn test_pending_with_fewer_than_two_results() {
        let outcome = compare(&[], &policy());
        assert_eq!(outcome.status, ComparisonStatus::Pending);
        assert_eq!(outcome.final_score, None);

        let outcome = compare(&[7.5], &policy());
        assert_eq!(outcome.status, ComparisonStatus::Pending);
        assert_eq!(outcome.score_difference, None);
    }

    #[test]
    fn test_matched_within_tolerance() {
        let outcome = compare(&[8.0, 8.5], &policy());
        assert_eq!(outcome.status, ComparisonStatus::Matched);
        assert_eq!(outcome.score_difference, Some(0.5));
        assert_eq!(outcome.final_score, Some(8.25));
        assert!(!outcome.needs_manual_review);
    }

    #[test]
    fn test_difference_equal_to_tolerance_matches() {
        let outcome = compare(&[7.0, 8.0], &policy());
        assert_eq!(outcome.status, ComparisonStatus::Matched);
        assert_eq!(outcome.final_score, Some(7.5));

        // 0.1 + 0.2 之类的浮点误差不影响边界判断
        let outcome = compare(&[0.3, 1.3], &policy());
        assert_eq!(outcome.status, ComparisonStatus::Matched);
    }

    #[test]
    fn test_unrounded_difference_above_tolerance() {
        let outcome = compare(&[8.0, 9.004], &policy());
        assert_eq!(outcome.status, ComparisonStatus::NeedsThirdRound);
        assert_eq!(outcome.score_difference, Some(1.0));
        assert_eq!(outcome.final_score, None);

        // 三个分数的两两差值同样按原始值判断
        let outcome = compare(&[2.0, 9.0, 3.004], &policy());
        assert_eq!(outcome.status, ComparisonStatus::ResolvedByThird);
        assert!(outcome.needs_manual_review);
        assert_eq!(outcome.final_score, Some(4.67));
    }

    #[test]
    fn test_needs_third_round() {
        let outcome = compare(&[8.0, 6.0], &policy());
        assert_eq!(outcome.status, ComparisonStatus::NeedsThirdRound);
        assert_eq!(outcome.score_difference, Some(2.0));
        assert_eq!(outcome.final_score, None);
    }

    #[test]
    fn test_resolved_by_closest_pair() {
        let outcome = compare(&[8.0, 6.0, 7.8], &policy());
        assert_eq!(outcome.status, ComparisonStatus::ResolvedByThird);
        assert_eq!(outcome.score_difference, Some(2.0));
        assert_eq!(outcome.final_score, Some(7.9));
        assert!(!outcome.needs_manual_review);
    }

    #[test]
    fn test_tie_uses_median() {
        let outcome = compare(&[6.0, 8.0, 7.0], &policy());
        assert_eq!(outcome.status, ComparisonStatus::ResolvedByThird);
        assert_eq!(outcome.final_score, Some(7.0));
        assert!(!outcome.needs_manual_review);
    }

    #[test]
    fn test_all_pairs_beyond_tolerance_flags_manual_review() {
        let outcome = compare(&[2.0, 9.0, 5.5], &policy());
        assert_eq!(outcome.status, ComparisonStatus::ResolvedByThird);
        assert_eq!(outcome.final_score, Some(5.5));
        assert!(outcome.needs_manual_review);
    }

    #[test]
    fn test_custom_tolerance() {
        let strict = GradingPolicy {
            tolerance: 0.25,
            ..GradingPolicy::default()
        };
        assert_eq!(
            compare(&[8.0, 8.5], &strict).status,
            ComparisonStatus::NeedsThirdRound
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(7.899999), 7.9);
        assert_eq!(round2(8.125), 8.13);
        assert_eq!(round2(0.0), 0.0);
    }
}
