use common_test_utils::*;

use technical_analysis::analyzer::candle_pattern_analyzer::{
    CandlePattern, CandlePatternAnalysis,
};
use technical_analysis::model::labels;

#[test]
fn test_doji_on_constant_bars() {
    // 시가와 종가가 같으면 몸통이 0이므로 도지
    let series = series_from(create_constant_bars(10, 100.0));
    let analysis = CandlePatternAnalysis::analyze(&series);

    assert_eq!(analysis.history.len(), 10);
    assert!(analysis.latest_has(CandlePattern::Doji));
}

#[test]
fn test_doji_threshold_is_ten_percent_of_range() {
    // 몸통이 범위의 10%를 넘으면 도지가 아님
    let bars = vec![
        make_bar(0, 100.0, 105.0, 95.0, 101.0, 1000.0),  // 몸통 1, 범위 10 → 도지
        make_bar(1, 100.0, 105.0, 95.0, 102.0, 1000.0),  // 몸통 2, 범위 10 → 아님
    ];
    let series = series_from(bars);
    let analysis = CandlePatternAnalysis::analyze(&series);

    assert!(analysis.at(0).contains(&CandlePattern::Doji));
    assert!(!analysis.at(1).contains(&CandlePattern::Doji));
}

#[test]
fn test_inside_bar_detection() {
    let bars = vec![
        make_bar(0, 100.0, 110.0, 90.0, 105.0, 1000.0),
        // 직전 바의 범위 안에 완전히 포함
        make_bar(1, 104.0, 106.0, 98.0, 99.0, 1000.0),
        // 고가가 직전 바를 넘으므로 인사이드가 아님
        make_bar(2, 99.0, 112.0, 97.0, 110.0, 1000.0),
    ];
    let series = series_from(bars);
    let analysis = CandlePatternAnalysis::analyze(&series);

    // 첫 바는 직전 바가 없으므로 인사이드로 분류되지 않음
    assert!(!analysis.at(0).contains(&CandlePattern::InsideBar));
    assert!(analysis.at(1).contains(&CandlePattern::InsideBar));
    assert!(!analysis.at(2).contains(&CandlePattern::InsideBar));
}

#[test]
fn test_extreme_bullish_candle() {
    // 작은 몸통 19개 뒤의 거대한 양봉
    let mut bars: Vec<_> = (0..19)
        .map(|i| make_bar(i, 100.0, 101.5, 99.0, 101.0, 1000.0))
        .collect();
    bars.push(make_bar(19, 100.0, 111.0, 99.0, 110.0, 1000.0));

    let series = series_from(bars);
    let analysis = CandlePatternAnalysis::analyze(&series);

    assert!(analysis.latest_has(CandlePattern::ExtremeBullish));

    let signals = analysis.signals();
    assert!(signals.iter().any(|s| s.label == labels::EXTREME_BULLISH && s.score > 0));
}

#[test]
fn test_extreme_bearish_candle() {
    let mut bars: Vec<_> = (0..19)
        .map(|i| make_bar(i, 100.0, 101.5, 99.0, 101.0, 1000.0))
        .collect();
    bars.push(make_bar(19, 100.0, 101.0, 89.0, 90.0, 1000.0));

    let series = series_from(bars);
    let analysis = CandlePatternAnalysis::analyze(&series);

    assert!(analysis.latest_has(CandlePattern::ExtremeBearish));
    assert!(analysis.breakdown_signal().score < 0);
}

#[test]
fn test_flat_series_is_never_extreme() {
    // 몸통 평균이 0이면 극단 캔들로 분류하지 않음
    let series = series_from(create_constant_bars(30, 100.0));
    let analysis = CandlePatternAnalysis::analyze(&series);

    for patterns in &analysis.history {
        assert!(!patterns.contains(&CandlePattern::ExtremeBullish));
        assert!(!patterns.contains(&CandlePattern::ExtremeBearish));
    }
}

#[test]
fn test_breakdown_signal_neutral_when_no_pattern() {
    // 몸통이 고르고 범위가 넉넉한 상승 바에서는 어떤 패턴도 발동하지 않음
    let series = series_from(create_uptrend_bars(30, 100.0, 1.0));
    let analysis = CandlePatternAnalysis::analyze(&series);

    assert!(analysis.latest().is_empty());
    let signal = analysis.breakdown_signal();
    assert_eq!(signal.label, labels::NEUTRAL);
    assert_eq!(signal.score, 0);
}

#[test]
fn test_history_is_aligned_with_series() {
    let series = series_from(create_doubling_bars(50));
    let analysis = CandlePatternAnalysis::analyze(&series);
    assert_eq!(analysis.history.len(), series.len());
}
