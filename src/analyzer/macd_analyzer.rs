use crate::indicator::{IndicatorFrame, KEY_MACD, KEY_MACD_HIST, KEY_MACD_SIGNAL};
use crate::model::{Signal, labels};
use crate::recommendation;
use serde::Serialize;

/// MACD 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdAnalysis {
    pub macd_line: Option<f64>,
    pub signal_line: Option<f64>,
    pub histogram: Option<f64>,
    prev_macd: Option<f64>,
    prev_signal: Option<f64>,
}

impl MacdAnalysis {
    /// 프레임에서 MACD 라인/시그널/히스토그램의 최신·직전 값을 읽어 분석
    pub fn analyze(frame: &IndicatorFrame) -> MacdAnalysis {
        MacdAnalysis {
            macd_line: frame.latest(KEY_MACD),
            signal_line: frame.latest(KEY_MACD_SIGNAL),
            histogram: frame.latest(KEY_MACD_HIST),
            prev_macd: frame.prev(KEY_MACD),
            prev_signal: frame.prev(KEY_MACD_SIGNAL),
        }
    }

    /// 강세 교차 여부 (직전 바에서 MACD ≤ 시그널, 최신 바에서 MACD > 시그널)
    pub fn is_bullish_crossover(&self) -> bool {
        matches!(
            (self.prev_macd, self.prev_signal, self.macd_line, self.signal_line),
            (Some(pm), Some(ps), Some(m), Some(s)) if pm <= ps && m > s
        )
    }

    /// 약세 교차 여부
    pub fn is_bearish_crossover(&self) -> bool {
        matches!(
            (self.prev_macd, self.prev_signal, self.macd_line, self.signal_line),
            (Some(pm), Some(ps), Some(m), Some(s)) if pm >= ps && m < s
        )
    }

    /// MACD 상태를 점수가 매겨진 신호로 변환
    ///
    /// 교차가 우선하고, 교차가 없으면 히스토그램 부호로 모멘텀을
    /// 판정합니다.
    pub fn signal(&self) -> Signal {
        let (Some(macd_line), Some(signal_line)) = (self.macd_line, self.signal_line) else {
            return Signal::new(labels::INSUFFICIENT_HISTORY, 0)
                .with_detail("MACD 워밍업 미충족");
        };

        if self.is_bullish_crossover() {
            return recommendation::scored(labels::BULLISH_CROSSOVER).with_detail(format!(
                "MACD({:.4})가 시그널({:.4})을 상향 돌파, 매수 신호",
                macd_line, signal_line
            ));
        }
        if self.is_bearish_crossover() {
            return recommendation::scored(labels::BEARISH_CROSSOVER).with_detail(format!(
                "MACD({:.4})가 시그널({:.4})을 하향 돌파, 매도 신호",
                macd_line, signal_line
            ));
        }

        match self.histogram {
            Some(histogram) if histogram > 0.0 => {
                recommendation::scored(labels::BULLISH_MOMENTUM)
                    .with_detail(format!("히스토그램 {:+.4}, 강세 모멘텀", histogram))
            }
            Some(histogram) if histogram < 0.0 => {
                recommendation::scored(labels::BEARISH_MOMENTUM)
                    .with_detail(format!("히스토그램 {:+.4}, 약세 모멘텀", histogram))
            }
            _ => Signal::new(labels::NEUTRAL, 0).with_detail("MACD와 시그널이 일치"),
        }
    }
}
