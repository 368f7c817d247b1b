use common_test_utils::*;

use technical_analysis::analyzer::ma_cross_analyzer::{Crossover, MaCrossAnalysis};
use technical_analysis::analyzer::{CROSS_LONG_PERIOD, CROSS_SHORT_PERIOD};
use technical_analysis::config_loader::AnalysisConfig;
use technical_analysis::indicator::IndicatorFrame;
use technical_analysis::model::{Bar, labels};

fn analyze_prefix(bars: &[Bar], len: usize) -> MaCrossAnalysis {
    let series = series_from(bars[..len].to_vec());
    let frame = IndicatorFrame::build(&series, &AnalysisConfig::default());
    MaCrossAnalysis::analyze(&frame, CROSS_SHORT_PERIOD, CROSS_LONG_PERIOD)
}

#[test]
fn test_golden_cross_fires_exactly_at_transition_index() {
    // 200바 횡보 후 상승: 인덱스 200에서 SMA50이 SMA200을 상향 돌파
    let bars = create_crossover_bars(200, 5, 10.0);

    // 돌파 직전 바가 최신이면 교차 없음
    let before = analyze_prefix(&bars, 200);
    assert_ne!(before.crossover, Crossover::GoldenCross);

    // 돌파 바가 최신이면 골든 크로스
    let at = analyze_prefix(&bars, 201);
    assert_eq!(at.crossover, Crossover::GoldenCross);
    assert!(at.is_golden_cross());
    assert_eq!(at.signal().label, labels::GOLDEN_CROSS);
    assert!(at.signal().score > 0);

    // 한 바 지나면 다시 교차 없음 (연속 바 쌍마다 최대 한 번 발동)
    let after = analyze_prefix(&bars, 202);
    assert_eq!(after.crossover, Crossover::None);
    assert_eq!(after.signal().label, labels::BULLISH_ALIGNMENT);
}

#[test]
fn test_death_cross_fires_exactly_at_transition_index() {
    let bars = create_crossover_bars(200, 5, -10.0);

    let at = analyze_prefix(&bars, 201);
    assert_eq!(at.crossover, Crossover::DeathCross);
    assert!(at.is_death_cross());
    assert_eq!(at.signal().label, labels::DEATH_CROSS);
    assert!(at.signal().score < 0);

    let after = analyze_prefix(&bars, 202);
    assert_eq!(after.crossover, Crossover::None);
    assert_eq!(after.signal().label, labels::BEARISH_ALIGNMENT);
}

#[test]
fn test_crossovers_are_mutually_exclusive() {
    // 어떤 접두 구간에서도 골든과 데드가 동시에 발동할 수 없음
    for step in [10.0, -10.0] {
        let bars = create_crossover_bars(200, 8, step);
        for len in 200..=bars.len() {
            let analysis = analyze_prefix(&bars, len);
            assert!(!(analysis.is_golden_cross() && analysis.is_death_cross()));
        }
    }
}

#[test]
fn test_insufficient_history_flag() {
    // SMA200 워밍업 전에는 결측 플래그
    let bars = create_uptrend_bars(100, 100.0, 1.0);
    let analysis = analyze_prefix(&bars, 100);

    assert_eq!(analysis.crossover, Crossover::None);
    assert_eq!(analysis.signal().label, labels::INSUFFICIENT_HISTORY);
    assert_eq!(analysis.signal().score, 0);
}
