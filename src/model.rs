use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 분석 오류
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// 데이터 검증 오류 (잘못된 바 필드)
    DataValidation {
        /// 문제가 된 바의 타임스탬프 (밀리초)
        timestamp: i64,
        /// 오류 설명
        message: String,
    },
    /// 데이터 부족 오류 (워밍업 기간 미충족)
    InsufficientData {
        /// 필요한 최소 바 개수
        required: usize,
        /// 실제 바 개수
        actual: usize,
        /// 오류가 발생한 맥락 (지표 이름 등)
        context: String,
    },
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::DataValidation { timestamp, message } => {
                write!(f, "데이터 검증 오류 (timestamp={}): {}", timestamp, message)
            }
            AnalysisError::InsufficientData {
                required,
                actual,
                context,
            } => {
                write!(
                    f,
                    "데이터 부족 오류 ({}): 최소 {}개 바 필요, 현재 {}개",
                    context, required, actual
                )
            }
        }
    }
}

/// String으로 AnalysisError 변환
impl From<AnalysisError> for String {
    fn from(err: AnalysisError) -> Self {
        err.to_string()
    }
}

/// 분석 결과 타입
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// 외부 데이터 소스에서 수신한 원시 바
///
/// 시세 API는 가격 필드를 숫자 또는 숫자 문자열로 내려주므로
/// 각 필드를 `serde_json::Value`로 받은 뒤 준비 단계에서 강제 변환합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    /// 타임스탬프 (epoch 밀리초)
    pub timestamp: i64,
    pub open: serde_json::Value,
    pub high: serde_json::Value,
    pub low: serde_json::Value,
    pub close: serde_json::Value,
    /// 거래량 (데이터 소스가 OHLC만 제공하면 None)
    #[serde(default)]
    pub volume: Option<serde_json::Value>,
}

/// 검증이 끝난 OHLCV 바
///
/// 불변식: 모든 가격은 유한하고, `low ≤ min(open, close)`,
/// `high ≥ max(open, close)`를 만족합니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub datetime: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 거래량 (없으면 None, 0으로 채우지 않음)
    pub volume: Option<f64>,
}

impl Bar {
    /// 몸통 크기 반환 (|close - open|)
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// 전체 범위 반환 (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// 양봉 여부
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 타임스탬프를 밀리초로 반환
    pub fn timestamp_millis(&self) -> i64 {
        self.datetime.timestamp_millis()
    }
}

impl std::fmt::Display for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bar({}: o={}, h={}, l={}, c={}, v={:?})",
            self.datetime, self.open, self.high, self.low, self.close, self.volume
        )
    }
}

/// 신호 라벨 상수
///
/// 해석기와 가중치 테이블이 같은 문자열을 참조하도록 한 곳에 모아둡니다.
pub mod labels {
    // 추세 (방향 + 강도)
    pub const TREND_BULLISH_STRONG: &str = "bullish_strong";
    pub const TREND_BULLISH_MODERATE: &str = "bullish_moderate";
    pub const TREND_BULLISH_WEAK: &str = "bullish_weak";
    pub const TREND_BEARISH_STRONG: &str = "bearish_strong";
    pub const TREND_BEARISH_MODERATE: &str = "bearish_moderate";
    pub const TREND_BEARISH_WEAK: &str = "bearish_weak";

    // 이동평균 교차 (전환이 없으면 현재 배열 상태를 보고)
    pub const GOLDEN_CROSS: &str = "golden_cross";
    pub const DEATH_CROSS: &str = "death_cross";
    pub const BULLISH_ALIGNMENT: &str = "bullish_alignment";
    pub const BEARISH_ALIGNMENT: &str = "bearish_alignment";

    // RSI
    pub const OVERBOUGHT: &str = "overbought";
    pub const OVERSOLD: &str = "oversold";
    pub const RSI_BULLISH: &str = "bullish";
    pub const RSI_BEARISH: &str = "bearish";

    // 중립
    pub const NEUTRAL: &str = "neutral";

    // MACD
    pub const BULLISH_CROSSOVER: &str = "bullish_crossover";
    pub const BEARISH_CROSSOVER: &str = "bearish_crossover";
    pub const BULLISH_MOMENTUM: &str = "bullish_momentum";
    pub const BEARISH_MOMENTUM: &str = "bearish_momentum";

    // 볼린저 밴드
    pub const OVERBOUGHT_BAND: &str = "overbought_band";
    pub const OVERSOLD_BAND: &str = "oversold_band";
    pub const WITHIN_BANDS: &str = "within_bands";

    // 거래량
    pub const HIGH_VOLUME: &str = "high_volume";
    pub const LOW_VOLUME: &str = "low_volume";
    pub const NORMAL_VOLUME: &str = "normal";

    // 캔들 패턴
    pub const DOJI: &str = "doji";
    pub const INSIDE_BAR: &str = "inside_bar";
    pub const EXTREME_BULLISH: &str = "extreme_bullish";
    pub const EXTREME_BEARISH: &str = "extreme_bearish";

    // 워밍업 미충족 플래그
    pub const INSUFFICIENT_HISTORY: &str = "insufficient_history";
}

/// 해석기가 산출하는 개별 신호
///
/// 라벨, 부호 있는 점수, 선택적 설명 문자열로 구성됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub label: String,
    /// 감성 점수 기여분 (부호 있음)
    pub score: i32,
    pub detail: Option<String>,
}

impl Signal {
    /// 새 신호 생성
    pub fn new(label: impl Into<String>, score: i32) -> Self {
        Signal {
            label: label.into(),
            score,
            detail: None,
        }
    }

    /// 설명 문자열 설정
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// 강세 신호 여부
    pub fn is_bullish(&self) -> bool {
        self.score > 0
    }

    /// 약세 신호 여부
    pub fn is_bearish(&self) -> bool {
        self.score < 0
    }

    /// 워밍업 미충족으로 결측된 신호 여부
    pub fn is_absent(&self) -> bool {
        self.label == labels::INSUFFICIENT_HISTORY
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signal({}: {:+})", self.label, self.score)
    }
}

/// 지지/저항 구분
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    /// 지지선
    Support,
    /// 저항선
    Resistance,
}

/// 레벨 산출 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSource {
    /// 피봇 (국소 극값)
    Pivot,
    /// 이동평균 기반 동적 레벨
    MovingAverage,
}

/// 지지/저항 레벨
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub price: f64,
    pub kind: LevelKind,
    pub source: LevelSource,
    /// 중요도 순위 (0이 가장 최근/중요)
    pub rank: usize,
}

impl Level {
    pub fn new(price: f64, kind: LevelKind, source: LevelSource, rank: usize) -> Self {
        Level {
            price,
            kind,
            source,
            rank,
        }
    }
}

/// 감성 점수에 대응하는 추천 라벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    #[serde(rename = "STRONG_SELL")]
    StrongSell,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "WEAK_SELL")]
    WeakSell,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "WEAK_BUY")]
    WeakBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "STRONG_BUY")]
    StrongBuy,
}

impl SentimentLabel {
    /// 클램프된 감성 점수를 라벨로 변환
    ///
    /// 구간은 전체 [-100, 100] 범위를 빈틈도 겹침도 없이 분할합니다:
    /// ≤-60, (-60,-25], (-25,-5], (-5,5), [5,25), [25,60), ≥60
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s <= -60 => SentimentLabel::StrongSell,
            s if s <= -25 => SentimentLabel::Sell,
            s if s <= -5 => SentimentLabel::WeakSell,
            s if s < 5 => SentimentLabel::Hold,
            s if s < 25 => SentimentLabel::WeakBuy,
            s if s < 60 => SentimentLabel::Buy,
            _ => SentimentLabel::StrongBuy,
        }
    }

    /// 라벨 문자열 반환
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::StrongSell => "STRONG_SELL",
            SentimentLabel::Sell => "SELL",
            SentimentLabel::WeakSell => "WEAK_SELL",
            SentimentLabel::Hold => "HOLD",
            SentimentLabel::WeakBuy => "WEAK_BUY",
            SentimentLabel::Buy => "BUY",
            SentimentLabel::StrongBuy => "STRONG_BUY",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 최종 매매 추천
///
/// 생성 후 변경되지 않는 터미널 출력입니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// 감성 점수 ([-100, 100]으로 클램프됨)
    pub sentiment_score: i32,
    pub label: SentimentLabel,
    /// 발동된 신호 목록 (해석기 평가 순서 유지)
    pub signals: Vec<Signal>,
    /// 지표별 신호 분해 (결측 지표는 insufficient_history로 표시)
    pub breakdown: BTreeMap<String, Signal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_label_partition() {
        // 경계값들이 정확한 라벨에 매핑되는지 확인
        assert_eq!(SentimentLabel::from_score(-100), SentimentLabel::StrongSell);
        assert_eq!(SentimentLabel::from_score(-60), SentimentLabel::StrongSell);
        assert_eq!(SentimentLabel::from_score(-59), SentimentLabel::Sell);
        assert_eq!(SentimentLabel::from_score(-25), SentimentLabel::Sell);
        assert_eq!(SentimentLabel::from_score(-24), SentimentLabel::WeakSell);
        assert_eq!(SentimentLabel::from_score(-5), SentimentLabel::WeakSell);
        assert_eq!(SentimentLabel::from_score(-4), SentimentLabel::Hold);
        assert_eq!(SentimentLabel::from_score(0), SentimentLabel::Hold);
        assert_eq!(SentimentLabel::from_score(4), SentimentLabel::Hold);
        assert_eq!(SentimentLabel::from_score(5), SentimentLabel::WeakBuy);
        assert_eq!(SentimentLabel::from_score(24), SentimentLabel::WeakBuy);
        assert_eq!(SentimentLabel::from_score(25), SentimentLabel::Buy);
        assert_eq!(SentimentLabel::from_score(59), SentimentLabel::Buy);
        assert_eq!(SentimentLabel::from_score(60), SentimentLabel::StrongBuy);
        assert_eq!(SentimentLabel::from_score(100), SentimentLabel::StrongBuy);
    }

    #[test]
    fn test_label_partition_is_total() {
        // [-100, 100]의 모든 정수가 정확히 하나의 라벨을 가짐
        for score in -100..=100 {
            let _ = SentimentLabel::from_score(score);
        }
    }

    #[test]
    fn test_signal_builder() {
        let signal = Signal::new(labels::GOLDEN_CROSS, 30).with_detail("SMA50이 SMA200 상향 돌파");
        assert_eq!(signal.label, "golden_cross");
        assert_eq!(signal.score, 30);
        assert!(signal.is_bullish());
        assert!(!signal.is_absent());
    }

    #[test]
    fn test_bar_helpers() {
        let bar = Bar {
            datetime: DateTime::from_timestamp_millis(0).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 95.0,
            close: 105.0,
            volume: Some(1000.0),
        };
        assert_eq!(bar.body(), 5.0);
        assert_eq!(bar.range(), 15.0);
        assert!(bar.is_bullish());
    }
}
