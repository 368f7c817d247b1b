use crate::indicator::volume::volume_ratio;
use crate::indicator::{IndicatorFrame, volume_key};
use crate::model::{Signal, labels};
use crate::series::Series;
use serde::Serialize;

/// 고거래량 판정 비율
pub const HIGH_VOLUME_RATIO: f64 = 1.5;

/// 저거래량 판정 비율
pub const LOW_VOLUME_RATIO: f64 = 0.5;

/// 거래량 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysis {
    pub period: usize,
    pub current_volume: Option<f64>,
    pub volume_ma: Option<f64>,
    /// 현재 거래량 / 이동평균 비율
    pub ratio: Option<f64>,
}

impl VolumeAnalysis {
    /// 최신 거래량과 이동평균의 비율 분석
    ///
    /// 시계열에 거래량이 없거나 이동평균이 워밍업 중이면 비율은
    /// None으로 남습니다.
    pub fn analyze(series: &Series, frame: &IndicatorFrame, period: usize) -> VolumeAnalysis {
        let current_volume = series.last().volume;
        let volume_ma = frame.latest(&volume_key(period));

        let ratio = match (current_volume, volume_ma) {
            (Some(current), Some(average)) => Some(volume_ratio(current, average)),
            _ => None,
        };

        VolumeAnalysis {
            period,
            current_volume,
            volume_ma,
            ratio,
        }
    }

    /// 고거래량 여부 (비율 ≥ 1.5)
    pub fn is_high_volume(&self) -> bool {
        self.ratio.is_some_and(|r| r >= HIGH_VOLUME_RATIO)
    }

    /// 저거래량 여부 (비율 ≤ 0.5)
    pub fn is_low_volume(&self) -> bool {
        self.ratio.is_some_and(|r| r <= LOW_VOLUME_RATIO)
    }

    /// 거래량 상태를 신호로 변환
    ///
    /// 거래량 신호 자체는 점수가 없고, 집계기가 승수로 반영합니다.
    pub fn signal(&self) -> Signal {
        let Some(ratio) = self.ratio else {
            return Signal::new(labels::INSUFFICIENT_HISTORY, 0)
                .with_detail("거래량 데이터 없음 또는 워밍업 미충족");
        };

        if ratio >= HIGH_VOLUME_RATIO {
            Signal::new(labels::HIGH_VOLUME, 0)
                .with_detail(format!("거래량이 평균의 {:.2}배, 추세 확증", ratio))
        } else if ratio <= LOW_VOLUME_RATIO {
            Signal::new(labels::LOW_VOLUME, 0)
                .with_detail(format!("거래량이 평균의 {:.2}배, 확증 약함", ratio))
        } else {
            Signal::new(labels::NORMAL_VOLUME, 0)
                .with_detail(format!("거래량이 평균의 {:.2}배", ratio))
        }
    }
}
