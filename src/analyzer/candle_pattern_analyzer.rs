use crate::model::{Bar, Signal, labels};
use crate::recommendation;
use crate::series::Series;
use serde::Serialize;

/// 단일 바 캔들 패턴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlePattern {
    /// 도지, 우유부단함 (몸통이 범위의 10% 이하)
    Doji,
    /// 인사이드 바, 횡보 (직전 바의 범위 안에 포함)
    InsideBar,
    /// 극단 양봉, 몸통이 평균의 2배 이상
    ExtremeBullish,
    /// 극단 음봉
    ExtremeBearish,
}

impl CandlePattern {
    /// 패턴 라벨 문자열 반환
    pub fn label(&self) -> &'static str {
        match self {
            CandlePattern::Doji => labels::DOJI,
            CandlePattern::InsideBar => labels::INSIDE_BAR,
            CandlePattern::ExtremeBullish => labels::EXTREME_BULLISH,
            CandlePattern::ExtremeBearish => labels::EXTREME_BEARISH,
        }
    }
}

/// 도지 판정: 몸통이 전체 범위의 10% 이하
pub const DOJI_BODY_RATIO: f64 = 0.1;

/// 극단 캔들 판정: 몸통이 직전 평균 몸통의 2배 이상
pub const EXTREME_BODY_MULTIPLIER: f64 = 2.0;

/// 평균 몸통 계산에 사용하는 직전 바 개수
pub const BODY_WINDOW: usize = 20;

/// 도지 패턴 판정
///
/// 범위가 0인 바(사고가 없는 바)도 몸통이 0이므로 도지로 분류됩니다.
fn is_doji(bar: &Bar) -> bool {
    bar.body() <= DOJI_BODY_RATIO * bar.range()
}

/// 인사이드 바 판정 (직전 바 필요)
fn is_inside_bar(previous: &Bar, current: &Bar) -> bool {
    current.high <= previous.high && current.low >= previous.low
}

/// 극단 캔들 판정
///
/// 현재 바를 포함한 직전 최대 20개 바의 평균 몸통과 비교합니다.
/// 평균이 0이면 (완전 횡보) 극단으로 분류하지 않습니다.
fn classify_extreme(bars: &[Bar], index: usize) -> Option<CandlePattern> {
    let start = (index + 1).saturating_sub(BODY_WINDOW);
    let window = &bars[start..=index];
    let average_body = window.iter().map(Bar::body).sum::<f64>() / window.len() as f64;

    if average_body <= 0.0 {
        return None;
    }

    let bar = &bars[index];
    if bar.body() >= EXTREME_BODY_MULTIPLIER * average_body {
        if bar.is_bullish() {
            Some(CandlePattern::ExtremeBullish)
        } else {
            Some(CandlePattern::ExtremeBearish)
        }
    } else {
        None
    }
}

/// 바 하나의 패턴 분류
fn classify_bar(bars: &[Bar], index: usize) -> Vec<CandlePattern> {
    let mut patterns = Vec::new();
    let bar = &bars[index];

    if is_doji(bar) {
        patterns.push(CandlePattern::Doji);
    }
    if index > 0 && is_inside_bar(&bars[index - 1], bar) {
        patterns.push(CandlePattern::InsideBar);
    }
    if let Some(extreme) = classify_extreme(bars, index) {
        patterns.push(extreme);
    }

    patterns
}

/// 캔들 패턴 분석 결과
///
/// 전체 바별 분류 히스토리를 보유하며, 집계기에는 가장 최근 바의
/// 패턴만 전달됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlePatternAnalysis {
    /// 바별 패턴 목록 (시계열과 같은 길이)
    pub history: Vec<Vec<CandlePattern>>,
}

impl CandlePatternAnalysis {
    /// 시계열의 모든 바를 독립적으로 분류
    ///
    /// 각 바는 자기 자신과 직전 바(인사이드 바), 그리고 직전 20개
    /// 바의 평균 몸통(극단 캔들)만 사용합니다.
    pub fn analyze(series: &Series) -> CandlePatternAnalysis {
        let bars = series.bars();
        let history = (0..bars.len()).map(|i| classify_bar(bars, i)).collect();
        CandlePatternAnalysis { history }
    }

    /// 가장 최근 바의 패턴 목록
    pub fn latest(&self) -> &[CandlePattern] {
        self.history.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// 지정된 바의 패턴 목록
    pub fn at(&self, index: usize) -> &[CandlePattern] {
        self.history.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 가장 최근 바에 특정 패턴이 있는지 확인
    pub fn latest_has(&self, pattern: CandlePattern) -> bool {
        self.latest().contains(&pattern)
    }

    /// 가장 최근 바의 패턴을 신호 목록으로 변환
    pub fn signals(&self) -> Vec<Signal> {
        self.latest()
            .iter()
            .map(|pattern| match pattern {
                CandlePattern::Doji => Signal::new(labels::DOJI, 0)
                    .with_detail("도지, 반전 가능성"),
                CandlePattern::InsideBar => Signal::new(labels::INSIDE_BAR, 0)
                    .with_detail("인사이드 바, 횡보 구간"),
                CandlePattern::ExtremeBullish => recommendation::scored(labels::EXTREME_BULLISH)
                    .with_detail("강한 양봉 감지"),
                CandlePattern::ExtremeBearish => recommendation::scored(labels::EXTREME_BEARISH)
                    .with_detail("강한 음봉 감지"),
            })
            .collect()
    }

    /// 분해 맵에 넣을 대표 신호 선택
    ///
    /// 점수 절댓값이 가장 큰 신호를 고르고, 패턴이 없으면 중립 신호를
    /// 반환합니다.
    pub fn breakdown_signal(&self) -> Signal {
        self.signals()
            .into_iter()
            .max_by_key(|signal| signal.score.abs())
            .unwrap_or_else(|| Signal::new(labels::NEUTRAL, 0).with_detail("감지된 패턴 없음"))
    }
}
