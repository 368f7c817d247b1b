use crate::indicator::{IndicatorFrame, sma_key};
use crate::model::{Signal, labels};
use crate::recommendation;
use serde::Serialize;

/// 이동평균 교차 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    /// 골든 크로스 (단기 이동평균이 장기 이동평균을 상향 돌파)
    GoldenCross,
    /// 데드 크로스 (단기 이동평균이 장기 이동평균을 하향 돌파)
    DeathCross,
    /// 교차 없음
    None,
}

/// 이동평균 교차 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaCrossAnalysis {
    pub crossover: Crossover,
    pub short_period: usize,
    pub long_period: usize,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    /// 최신 바와 직전 바 모두에서 두 이동평균이 정의되었는지 여부
    available: bool,
}

impl MaCrossAnalysis {
    /// 최신 바와 직전 바의 이동평균 쌍에서 교차 판정
    ///
    /// 직전 바에서 단기 ≤ 장기였다가 최신 바에서 단기 > 장기가 되면
    /// 골든 크로스, 반대 전이는 데드 크로스입니다. 연속된 바 쌍마다
    /// 최대 한 번만 발동하며 두 교차는 상호 배타적입니다.
    ///
    /// # Arguments
    /// * `frame` - 지표 프레임
    /// * `short_period` - 단기 기간 (일반적으로 50)
    /// * `long_period` - 장기 기간 (일반적으로 200)
    pub fn analyze(
        frame: &IndicatorFrame,
        short_period: usize,
        long_period: usize,
    ) -> MaCrossAnalysis {
        let short_key = sma_key(short_period);
        let long_key = sma_key(long_period);

        let prev_short = frame.prev(&short_key);
        let prev_long = frame.prev(&long_key);
        let short_ma = frame.latest(&short_key);
        let long_ma = frame.latest(&long_key);

        let (crossover, available) = match (prev_short, prev_long, short_ma, long_ma) {
            (Some(ps), Some(pl), Some(s), Some(l)) => {
                let crossover = if ps <= pl && s > l {
                    Crossover::GoldenCross
                } else if ps >= pl && s < l {
                    Crossover::DeathCross
                } else {
                    Crossover::None
                };
                (crossover, true)
            }
            _ => (Crossover::None, false),
        };

        MaCrossAnalysis {
            crossover,
            short_period,
            long_period,
            short_ma,
            long_ma,
            available,
        }
    }

    /// 골든 크로스 여부
    pub fn is_golden_cross(&self) -> bool {
        self.crossover == Crossover::GoldenCross
    }

    /// 데드 크로스 여부
    pub fn is_death_cross(&self) -> bool {
        self.crossover == Crossover::DeathCross
    }

    /// 교차를 점수가 매겨진 신호로 변환
    ///
    /// 교차가 없을 때는 현재 배열 상태(정배열/역배열)를 보고합니다.
    pub fn signal(&self) -> Signal {
        if !self.available {
            return Signal::new(labels::INSUFFICIENT_HISTORY, 0)
                .with_detail("이동평균 워밍업 미충족");
        }

        match self.crossover {
            Crossover::GoldenCross => recommendation::scored(labels::GOLDEN_CROSS).with_detail(
                format!(
                    "SMA{}이 SMA{}을 상향 돌파, 강한 강세 신호",
                    self.short_period, self.long_period
                ),
            ),
            Crossover::DeathCross => recommendation::scored(labels::DEATH_CROSS).with_detail(
                format!(
                    "SMA{}이 SMA{}을 하향 돌파, 강한 약세 신호",
                    self.short_period, self.long_period
                ),
            ),
            Crossover::None => match (self.short_ma, self.long_ma) {
                (Some(s), Some(l)) if s > l => recommendation::scored(labels::BULLISH_ALIGNMENT)
                    .with_detail(format!(
                        "교차 없음, SMA{}이 SMA{} 위 (정배열)",
                        self.short_period, self.long_period
                    )),
                _ => recommendation::scored(labels::BEARISH_ALIGNMENT).with_detail(format!(
                    "교차 없음, SMA{}이 SMA{} 아래 (역배열)",
                    self.short_period, self.long_period
                )),
            },
        }
    }
}
