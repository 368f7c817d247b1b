use crate::indicator::{IndicatorFrame, sma_key};
use crate::model::{Level, LevelKind, LevelSource};
use crate::series::Series;
use serde::Serialize;

/// 피봇 판정 시 양쪽으로 살피는 바 개수 (총 5바 윈도우)
pub const PIVOT_WINDOW: usize = 2;

/// 측면당 유지하는 최대 피봇 레벨 수
pub const MAX_PIVOT_LEVELS: usize = 3;

/// 레벨 중복 제거의 상대 허용 오차 (0.1%)
pub const DEDUP_TOLERANCE: f64 = 0.001;

/// 지지/저항 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportResistanceAnalysis {
    /// 피봇 레벨과 동적 레벨 전체 (피봇 먼저, 순위순)
    pub levels: Vec<Level>,
}

/// 후보 목록을 최근 것부터 중복 제거하여 상위 레벨로 변환
///
/// 같은 가격대(상대 오차 0.1% 이내)의 후보는 하나로 합치고,
/// 가장 최근 후보가 순위 0을 받습니다.
fn dedup_and_rank(candidates: &[(usize, f64)], kind: LevelKind) -> Vec<Level> {
    let mut levels: Vec<Level> = Vec::new();

    for &(_, price) in candidates.iter().rev() {
        if levels.len() >= MAX_PIVOT_LEVELS {
            break;
        }
        let duplicate = levels
            .iter()
            .any(|level| (level.price - price).abs() <= DEDUP_TOLERANCE * price);
        if !duplicate {
            let rank = levels.len();
            levels.push(Level::new(price, kind, LevelSource::Pivot, rank));
        }
    }

    levels
}

impl SupportResistanceAnalysis {
    /// 피봇 기반 지지/저항과 이동평균 기반 동적 레벨 추출
    ///
    /// 인덱스 i의 바는 저가가 [i-2, i+2] 윈도우의 최솟값이면 지지
    /// 후보, 고가가 윈도우 최댓값이면 저항 후보입니다. 후보는 최근
    /// 순으로 중복 제거 후 측면당 최대 3개 유지합니다.
    ///
    /// # Arguments
    /// * `series` - 준비된 시계열
    /// * `frame` - 지표 프레임 (동적 레벨용 SMA)
    /// * `short_period` - 동적 레벨 단기 이동평균 기간 (일반적으로 50)
    /// * `long_period` - 동적 레벨 장기 이동평균 기간 (일반적으로 200)
    pub fn analyze(
        series: &Series,
        frame: &IndicatorFrame,
        short_period: usize,
        long_period: usize,
    ) -> SupportResistanceAnalysis {
        let bars = series.bars();
        let mut support_candidates = Vec::new();
        let mut resistance_candidates = Vec::new();

        if bars.len() > PIVOT_WINDOW * 2 {
            for i in PIVOT_WINDOW..bars.len() - PIVOT_WINDOW {
                let window = &bars[i - PIVOT_WINDOW..=i + PIVOT_WINDOW];

                let window_min = window.iter().map(|bar| bar.low).fold(f64::MAX, f64::min);
                if bars[i].low <= window_min {
                    support_candidates.push((i, bars[i].low));
                }

                let window_max = window.iter().map(|bar| bar.high).fold(f64::MIN, f64::max);
                if bars[i].high >= window_max {
                    resistance_candidates.push((i, bars[i].high));
                }
            }
        }

        let mut levels = dedup_and_rank(&support_candidates, LevelKind::Support);
        levels.extend(dedup_and_rank(&resistance_candidates, LevelKind::Resistance));

        // 이동평균 기반 동적 레벨: 가격 아래면 지지, 위면 저항
        let current_price = series.last().close;
        for period in [short_period, long_period] {
            if let Some(ma) = frame.latest(&sma_key(period)) {
                let kind = if current_price >= ma {
                    LevelKind::Support
                } else {
                    LevelKind::Resistance
                };
                levels.push(Level::new(ma, kind, LevelSource::MovingAverage, 0));
            }
        }

        SupportResistanceAnalysis { levels }
    }

    /// 지지 레벨만 반환 (순위순)
    pub fn supports(&self) -> Vec<&Level> {
        self.levels
            .iter()
            .filter(|level| level.kind == LevelKind::Support)
            .collect()
    }

    /// 저항 레벨만 반환 (순위순)
    pub fn resistances(&self) -> Vec<&Level> {
        self.levels
            .iter()
            .filter(|level| level.kind == LevelKind::Resistance)
            .collect()
    }

    /// 피봇 레벨만 반환
    pub fn pivot_levels(&self) -> Vec<&Level> {
        self.levels
            .iter()
            .filter(|level| level.source == LevelSource::Pivot)
            .collect()
    }

    /// 현재 가격 아래에서 가장 가까운 지지 레벨
    pub fn nearest_support(&self, price: f64) -> Option<&Level> {
        self.supports()
            .into_iter()
            .filter(|level| level.price <= price)
            .max_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// 현재 가격 위에서 가장 가까운 저항 레벨
    pub fn nearest_resistance(&self, price: f64) -> Option<&Level> {
        self.resistances()
            .into_iter()
            .filter(|level| level.price >= price)
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }
}
