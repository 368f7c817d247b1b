use common_test_utils::*;

use technical_analysis::analyzer::TREND_MA_PERIOD;
use technical_analysis::analyzer::trend_analyzer::{TrendAnalysis, TrendDirection, TrendStrength};
use technical_analysis::config_loader::AnalysisConfig;
use technical_analysis::indicator::IndicatorFrame;
use technical_analysis::model::labels;

fn analyze(bars: Vec<technical_analysis::model::Bar>) -> TrendAnalysis {
    let series = series_from(bars);
    let frame = IndicatorFrame::build(&series, &AnalysisConfig::default());
    TrendAnalysis::analyze(&series, &frame, TREND_MA_PERIOD)
}

#[test]
fn test_strong_bullish_trend_in_doubling_series() {
    let analysis = analyze(create_doubling_bars(250));

    assert_eq!(analysis.direction, TrendDirection::Bullish);
    assert_eq!(analysis.strength, TrendStrength::Strong);
    assert!(analysis.percent_from_ma.unwrap() > 10.0);

    let signal = analysis.signal();
    assert_eq!(signal.label, labels::TREND_BULLISH_STRONG);
    assert!(signal.score > 0);
}

#[test]
fn test_strong_bearish_trend_in_downtrend() {
    let analysis = analyze(create_downtrend_bars(250, 500.0, 1.0));

    assert_eq!(analysis.direction, TrendDirection::Bearish);
    assert_eq!(analysis.strength, TrendStrength::Strong);
    assert!(analysis.percent_from_ma.unwrap() < -10.0);
    assert!(analysis.signal().score < 0);
}

#[test]
fn test_weak_trend_near_moving_average() {
    // 상수 시계열에서 마지막 종가만 0.5% 위로 이동
    let mut bars = create_constant_bars(210, 100.0);
    let last_index = bars.len() - 1;
    bars[last_index].close = 100.5;
    bars[last_index].high = 102.0;

    let analysis = analyze(bars);
    assert_eq!(analysis.direction, TrendDirection::Bullish);
    assert_eq!(analysis.strength, TrendStrength::Weak);
    assert_eq!(analysis.signal().label, labels::TREND_BULLISH_WEAK);
}

#[test]
fn test_moderate_trend() {
    // 마지막 종가가 이동평균에서 약 5% 위
    let mut bars = create_constant_bars(210, 100.0);
    let last_index = bars.len() - 1;
    bars[last_index].close = 105.0;
    bars[last_index].high = 106.0;

    let analysis = analyze(bars);
    assert_eq!(analysis.strength, TrendStrength::Moderate);
    assert_eq!(analysis.signal().label, labels::TREND_BULLISH_MODERATE);
}

#[test]
fn test_unknown_trend_when_ma_unavailable() {
    // 200바 미만이면 SMA200이 정의되지 않음
    let analysis = analyze(create_uptrend_bars(50, 100.0, 1.0));

    assert_eq!(analysis.direction, TrendDirection::Unknown);
    assert_eq!(analysis.strength, TrendStrength::Unknown);
    assert!(analysis.long_ma.is_none());

    let signal = analysis.signal();
    assert_eq!(signal.label, labels::INSUFFICIENT_HISTORY);
    assert_eq!(signal.score, 0);
}
