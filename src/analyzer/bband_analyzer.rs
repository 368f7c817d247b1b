use crate::indicator::{IndicatorFrame, KEY_BB_LOWER, KEY_BB_MIDDLE, KEY_BB_UPPER};
use crate::model::{Signal, labels};
use crate::recommendation;
use crate::series::Series;
use serde::Serialize;

/// 볼린저 밴드 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BbandAnalysis {
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
    pub current_price: f64,
    /// 밴드 내 백분위 위치 (0 = 하단, 1 = 상단)
    pub percent_b: Option<f64>,
}

impl BbandAnalysis {
    /// 최신 종가와 밴드의 상대 위치 분석
    pub fn analyze(series: &Series, frame: &IndicatorFrame) -> BbandAnalysis {
        let current_price = series.last().close;
        let upper = frame.latest(KEY_BB_UPPER);
        let middle = frame.latest(KEY_BB_MIDDLE);
        let lower = frame.latest(KEY_BB_LOWER);

        let percent_b = match (upper, lower) {
            (Some(u), Some(l)) if u > l => Some((current_price - l) / (u - l)),
            // 밴드 폭이 0이면 (분산 0) 중앙으로 간주
            (Some(_), Some(_)) => Some(0.5),
            _ => None,
        };

        BbandAnalysis {
            upper,
            middle,
            lower,
            current_price,
            percent_b,
        }
    }

    /// 가격이 상단 밴드 위인지 확인
    pub fn is_above_upper(&self) -> bool {
        self.upper.is_some_and(|u| self.current_price > u)
    }

    /// 가격이 하단 밴드 아래인지 확인
    pub fn is_below_lower(&self) -> bool {
        self.lower.is_some_and(|l| self.current_price < l)
    }

    /// 밴드 위치를 점수가 매겨진 신호로 변환
    pub fn signal(&self) -> Signal {
        if self.upper.is_none() || self.lower.is_none() {
            return Signal::new(labels::INSUFFICIENT_HISTORY, 0)
                .with_detail("볼린저 밴드 워밍업 미충족");
        }

        if self.is_above_upper() {
            return recommendation::scored(labels::OVERBOUGHT_BAND)
                .with_detail("가격이 상단 밴드 위, 과매수 가능성");
        }
        if self.is_below_lower() {
            return recommendation::scored(labels::OVERSOLD_BAND)
                .with_detail("가격이 하단 밴드 아래, 과매도 가능성");
        }

        let position = self.percent_b.unwrap_or(0.5);
        Signal::new(labels::WITHIN_BANDS, 0)
            .with_detail(format!("밴드 내 위치 {:.0}%", position * 100.0))
    }
}
