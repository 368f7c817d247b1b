use crate::indicator::{IndicatorFrame, rsi_key};
use crate::model::{Signal, labels};
use crate::recommendation;
use serde::Serialize;

/// 과매수 기준값
pub const OVERBOUGHT_THRESHOLD: f64 = 70.0;

/// 과매도 기준값
pub const OVERSOLD_THRESHOLD: f64 = 30.0;

/// 모멘텀 판정 중심선
pub const MOMENTUM_CENTERLINE: f64 = 50.0;

/// RSI 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiAnalysis {
    pub period: usize,
    /// 최신 RSI 값
    pub value: Option<f64>,
    /// 직전 바의 RSI 값 (모멘텀 판정용)
    pub previous: Option<f64>,
}

impl RsiAnalysis {
    /// 프레임에서 최신 RSI 값을 읽어 분석
    pub fn analyze(frame: &IndicatorFrame, period: usize) -> RsiAnalysis {
        let key = rsi_key(period);
        RsiAnalysis {
            period,
            value: frame.latest(&key),
            previous: frame.prev(&key),
        }
    }

    /// 과매수 여부 (RSI > 70)
    pub fn is_overbought(&self) -> bool {
        self.value.is_some_and(|v| v > OVERBOUGHT_THRESHOLD)
    }

    /// 과매도 여부 (RSI < 30)
    pub fn is_oversold(&self) -> bool {
        self.value.is_some_and(|v| v < OVERSOLD_THRESHOLD)
    }

    /// RSI 상태를 점수가 매겨진 신호로 변환
    ///
    /// 과매수/과매도가 우선하고, 중립 구간에서는 50선 기준의
    /// 상승/하락 모멘텀을 판정합니다.
    pub fn signal(&self) -> Signal {
        let Some(value) = self.value else {
            return Signal::new(labels::INSUFFICIENT_HISTORY, 0)
                .with_detail(format!("RSI_{} 워밍업 미충족", self.period));
        };

        if value > OVERBOUGHT_THRESHOLD {
            return recommendation::scored(labels::OVERBOUGHT)
                .with_detail(format!("RSI {:.1}, 과매수 구간", value));
        }
        if value < OVERSOLD_THRESHOLD {
            return recommendation::scored(labels::OVERSOLD)
                .with_detail(format!("RSI {:.1}, 과매도 구간", value));
        }

        match self.previous {
            Some(previous) if value > previous && value > MOMENTUM_CENTERLINE => {
                recommendation::scored(labels::RSI_BULLISH)
                    .with_detail(format!("RSI {:.1} 상승 중, 50선 위", value))
            }
            Some(previous) if value < previous && value < MOMENTUM_CENTERLINE => {
                recommendation::scored(labels::RSI_BEARISH)
                    .with_detail(format!("RSI {:.1} 하락 중, 50선 아래", value))
            }
            _ => Signal::new(labels::NEUTRAL, 0).with_detail(format!("RSI {:.1}, 중립", value)),
        }
    }
}
