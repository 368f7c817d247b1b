use crate::model::{Recommendation, SentimentLabel, Signal, labels};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// 신호 라벨별 점수 가중치 테이블
///
/// 강세 라벨은 항상 같은 계열의 약한 라벨·약세 라벨보다 큰 점수를
/// 가지므로, 강세 신호가 추가되거나 강해지면 총점이 단조 증가합니다.
static SIGNAL_WEIGHTS: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    HashMap::from([
        // 추세 (방향 × 강도)
        (labels::TREND_BULLISH_STRONG, 20),
        (labels::TREND_BULLISH_MODERATE, 12),
        (labels::TREND_BULLISH_WEAK, 5),
        (labels::TREND_BEARISH_STRONG, -20),
        (labels::TREND_BEARISH_MODERATE, -12),
        (labels::TREND_BEARISH_WEAK, -5),
        // 이동평균 교차와 배열 상태
        (labels::GOLDEN_CROSS, 30),
        (labels::DEATH_CROSS, -30),
        (labels::BULLISH_ALIGNMENT, 10),
        (labels::BEARISH_ALIGNMENT, -10),
        // RSI
        (labels::OVERSOLD, 15),
        (labels::OVERBOUGHT, -15),
        (labels::RSI_BULLISH, 8),
        (labels::RSI_BEARISH, -8),
        // MACD
        (labels::BULLISH_CROSSOVER, 20),
        (labels::BEARISH_CROSSOVER, -20),
        (labels::BULLISH_MOMENTUM, 10),
        (labels::BEARISH_MOMENTUM, -10),
        // 볼린저 밴드
        (labels::OVERSOLD_BAND, 10),
        (labels::OVERBOUGHT_BAND, -10),
        // 극단 캔들
        (labels::EXTREME_BULLISH, 5),
        (labels::EXTREME_BEARISH, -5),
    ])
});

/// 고거래량 승수 (총점을 추세 방향으로 증폭)
pub const HIGH_VOLUME_MULTIPLIER: f64 = 1.2;

/// 저거래량 승수 (총점 감쇠)
pub const LOW_VOLUME_MULTIPLIER: f64 = 0.8;

/// 감성 점수 클램프 범위
pub const SCORE_RANGE: (i32, i32) = (-100, 100);

/// 라벨의 점수 가중치 반환 (테이블에 없으면 0)
pub fn signal_weight(label: &str) -> i32 {
    SIGNAL_WEIGHTS.get(label).copied().unwrap_or(0)
}

/// 가중치 테이블에서 점수를 채운 신호 생성
pub fn scored(label: &'static str) -> Signal {
    Signal::new(label, signal_weight(label))
}

/// 발동 신호 목록에 포함할 가치가 있는 신호인지 확인
///
/// 점수가 있는 신호와, 점수는 없지만 정보성이 있는 라벨
/// (doji, inside_bar, 거래량 상태)을 포함합니다.
fn is_notable(signal: &Signal) -> bool {
    signal.score != 0
        || matches!(
            signal.label.as_str(),
            labels::DOJI | labels::INSIDE_BAR | labels::HIGH_VOLUME | labels::LOW_VOLUME
        )
}

/// 지표별 신호를 가중 합산하여 최종 추천 생성
///
/// 거래량 신호는 가산이 아니라 승수로 작용합니다: 고거래량은 합산
/// 점수를 1.2배로 증폭하고(다른 신호들이 가리키는 방향을 확증),
/// 저거래량은 0.8배로 감쇠합니다. 곱한 값을 반올림한 뒤
/// [-100, 100]으로 클램프하고 라벨 구간에 매핑합니다.
///
/// 유효한 프레임이 주어지면 절대 실패하지 않습니다. 워밍업이 부족한
/// 지표는 점수 0으로 처리되고 분해 맵에 insufficient_history로
/// 표시됩니다.
///
/// # Arguments
/// * `indicator_signals` - (지표 이름, 신호) 쌍, §해석기 평가 순서대로
/// * `extra_signals` - 분해 맵 대표 외의 추가 패턴 신호
///
/// # Returns
/// * `Recommendation` - 최종 추천 (결정적: 같은 입력 → 같은 출력)
pub fn recommend(
    indicator_signals: &[(String, Signal)],
    extra_signals: &[Signal],
) -> Recommendation {
    let base: i32 = indicator_signals
        .iter()
        .map(|(_, signal)| signal.score)
        .chain(extra_signals.iter().map(|signal| signal.score))
        .sum();

    // 거래량 승수 결정
    let volume_label = indicator_signals
        .iter()
        .find(|(name, _)| name == "volume")
        .map(|(_, signal)| signal.label.as_str());
    let multiplier = match volume_label {
        Some(labels::HIGH_VOLUME) => HIGH_VOLUME_MULTIPLIER,
        Some(labels::LOW_VOLUME) => LOW_VOLUME_MULTIPLIER,
        _ => 1.0,
    };

    let scaled = (base as f64 * multiplier).round() as i32;
    let sentiment_score = scaled.clamp(SCORE_RANGE.0, SCORE_RANGE.1);
    let label = SentimentLabel::from_score(sentiment_score);

    let signals: Vec<Signal> = indicator_signals
        .iter()
        .map(|(_, signal)| signal)
        .chain(extra_signals.iter())
        .filter(|signal| is_notable(signal))
        .cloned()
        .collect();

    let breakdown: BTreeMap<String, Signal> = indicator_signals
        .iter()
        .map(|(name, signal)| (name.clone(), signal.clone()))
        .collect();

    debug!(
        "추천 산출: 합계 {} × {} → {} ({})",
        base, multiplier, sentiment_score, label
    );

    Recommendation {
        sentiment_score,
        label,
        signals,
        breakdown,
    }
}
