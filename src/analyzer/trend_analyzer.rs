use crate::indicator::{IndicatorFrame, sma_key};
use crate::model::{Signal, labels};
use crate::recommendation;
use crate::series::Series;
use serde::Serialize;

/// 추세 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// 상승 추세 (종가가 장기 이동평균 위)
    Bullish,
    /// 하락 추세 (종가가 장기 이동평균 아래)
    Bearish,
    /// 판정 불가 (이동평균 워밍업 미충족)
    Unknown,
}

/// 추세 강도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    /// 이동평균에서 2% 미만
    Weak,
    /// 2% 이상 10% 이하
    Moderate,
    /// 10% 초과
    Strong,
    Unknown,
}

/// 약세/강세 경계 (%)
const WEAK_THRESHOLD: f64 = 2.0;
const STRONG_THRESHOLD: f64 = 10.0;

/// 추세 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    /// 장기 이동평균 대비 부호 있는 백분율 거리
    pub percent_from_ma: Option<f64>,
    pub current_price: f64,
    pub long_ma: Option<f64>,
}

impl TrendAnalysis {
    /// 최신 종가와 장기 이동평균을 비교하여 추세 판정
    ///
    /// # Arguments
    /// * `series` - 준비된 시계열
    /// * `frame` - 지표 프레임
    /// * `ma_period` - 장기 이동평균 기간 (일반적으로 200)
    ///
    /// # Returns
    /// * `TrendAnalysis` - 추세 분석 결과
    pub fn analyze(series: &Series, frame: &IndicatorFrame, ma_period: usize) -> TrendAnalysis {
        let current_price = series.last().close;
        let long_ma = frame.latest(&sma_key(ma_period));

        let Some(ma) = long_ma else {
            return TrendAnalysis {
                direction: TrendDirection::Unknown,
                strength: TrendStrength::Unknown,
                percent_from_ma: None,
                current_price,
                long_ma: None,
            };
        };

        let percent = (current_price - ma) / ma * 100.0;
        let magnitude = percent.abs();
        let strength = if magnitude > STRONG_THRESHOLD {
            TrendStrength::Strong
        } else if magnitude >= WEAK_THRESHOLD {
            TrendStrength::Moderate
        } else {
            TrendStrength::Weak
        };
        let direction = if current_price > ma {
            TrendDirection::Bullish
        } else {
            TrendDirection::Bearish
        };

        TrendAnalysis {
            direction,
            strength,
            percent_from_ma: Some(percent),
            current_price,
            long_ma,
        }
    }

    /// 상승 추세 여부
    pub fn is_bullish(&self) -> bool {
        self.direction == TrendDirection::Bullish
    }

    /// 하락 추세 여부
    pub fn is_bearish(&self) -> bool {
        self.direction == TrendDirection::Bearish
    }

    /// 추세를 점수가 매겨진 신호로 변환
    pub fn signal(&self) -> Signal {
        let label = match (self.direction, self.strength) {
            (TrendDirection::Bullish, TrendStrength::Strong) => labels::TREND_BULLISH_STRONG,
            (TrendDirection::Bullish, TrendStrength::Moderate) => labels::TREND_BULLISH_MODERATE,
            (TrendDirection::Bullish, _) => labels::TREND_BULLISH_WEAK,
            (TrendDirection::Bearish, TrendStrength::Strong) => labels::TREND_BEARISH_STRONG,
            (TrendDirection::Bearish, TrendStrength::Moderate) => labels::TREND_BEARISH_MODERATE,
            (TrendDirection::Bearish, _) => labels::TREND_BEARISH_WEAK,
            (TrendDirection::Unknown, _) => {
                return Signal::new(labels::INSUFFICIENT_HISTORY, 0)
                    .with_detail("장기 이동평균 워밍업 미충족");
            }
        };

        let detail = match self.percent_from_ma {
            Some(percent) if percent >= 0.0 => {
                format!("종가가 SMA200보다 {:.2}% 위", percent)
            }
            Some(percent) => format!("종가가 SMA200보다 {:.2}% 아래", -percent),
            None => String::new(),
        };
        recommendation::scored(label).with_detail(detail)
    }
}
