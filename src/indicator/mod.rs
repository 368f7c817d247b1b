// 기술적 지표 모듈
// 순수 함수로 정렬된 지표 컬럼을 계산합니다.

pub mod bband;
pub mod ma;
pub mod macd;
pub mod rsi;
pub mod utils;
pub mod volume;

use crate::config_loader::AnalysisConfig;
use crate::model::{AnalysisError, AnalysisResult};
use crate::series::Series;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// MACD 라인 컬럼 키
pub const KEY_MACD: &str = "MACD";
/// MACD 시그널 라인 컬럼 키
pub const KEY_MACD_SIGNAL: &str = "MACD_signal";
/// MACD 히스토그램 컬럼 키
pub const KEY_MACD_HIST: &str = "MACD_hist";
/// 볼린저 상단 밴드 컬럼 키
pub const KEY_BB_UPPER: &str = "BB_upper";
/// 볼린저 중간 밴드 컬럼 키
pub const KEY_BB_MIDDLE: &str = "BB_middle";
/// 볼린저 하단 밴드 컬럼 키
pub const KEY_BB_LOWER: &str = "BB_lower";

/// SMA 컬럼 키 생성 (예: "SMA_50")
pub fn sma_key(period: usize) -> String {
    format!("SMA_{}", period)
}

/// EMA 컬럼 키 생성 (예: "EMA_12")
pub fn ema_key(period: usize) -> String {
    format!("EMA_{}", period)
}

/// RSI 컬럼 키 생성 (예: "RSI_14")
pub fn rsi_key(period: usize) -> String {
    format!("RSI_{}", period)
}

/// 거래량 이동평균 컬럼 키 생성 (예: "Volume_MA_20")
pub fn volume_key(period: usize) -> String {
    format!("Volume_MA_{}", period)
}

/// 지표 이름 → 정렬된 컬럼 매핑
///
/// 각 컬럼은 바마다 하나의 슬롯을 가지며, 워밍업 기간에 해당하는
/// 선두 슬롯은 None입니다. 키 목록은 삽입 순서를 유지합니다.
/// 분석 호출마다 한 번 생성되고 호출이 끝나면 폐기됩니다.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorFrame {
    /// 삽입 순서가 유지되는 키 목록
    keys: Vec<String>,
    /// 키별 컬럼
    columns: BTreeMap<String, Vec<Option<f64>>>,
    /// 바 개수 (모든 컬럼의 길이)
    len: usize,
}

impl IndicatorFrame {
    /// 빈 프레임 생성
    pub fn new(len: usize) -> IndicatorFrame {
        IndicatorFrame {
            keys: Vec::new(),
            columns: BTreeMap::new(),
            len,
        }
    }

    /// 컬럼 삽입
    ///
    /// # Panics
    /// * 컬럼 길이가 프레임 길이와 다르면 패닉 발생
    pub fn insert(&mut self, key: impl Into<String>, column: Vec<Option<f64>>) {
        let key = key.into();
        if column.len() != self.len {
            panic!(
                "컬럼 길이가 프레임 길이와 다릅니다: {} ({} != {})",
                key,
                column.len(),
                self.len
            );
        }
        if !self.columns.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.columns.insert(key, column);
    }

    /// 키 목록 참조 반환 (삽입 순서)
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// 바 개수 반환
    pub fn len(&self) -> usize {
        self.len
    }

    /// 프레임이 비어 있는지 확인
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 컬럼 존재 여부
    pub fn has(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    /// 지정된 키의 컬럼 참조 반환
    pub fn column(&self, key: &str) -> Option<&[Option<f64>]> {
        self.columns.get(key).map(|column| column.as_slice())
    }

    /// 지정된 키·인덱스의 값 반환 (워밍업 구간이면 None)
    pub fn value_at(&self, key: &str, index: usize) -> Option<f64> {
        self.columns.get(key).and_then(|column| {
            column.get(index).copied().flatten()
        })
    }

    /// 가장 최근 바의 값 반환
    pub fn latest(&self, key: &str) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        self.value_at(key, self.len - 1)
    }

    /// 직전 바의 값 반환
    pub fn prev(&self, key: &str) -> Option<f64> {
        if self.len < 2 {
            return None;
        }
        self.value_at(key, self.len - 2)
    }

    /// 시계열에서 전체 지표 프레임 계산 (관대 모드)
    ///
    /// 워밍업이 끝나지 않은 지표는 None 슬롯으로 남고,
    /// 거래량이 없는 시계열에서는 거래량 컬럼이 통째로 생략됩니다.
    /// EMA 컬럼은 (지표, 매개변수) 키의 호출 내 캐시로 한 번만 계산해
    /// MACD가 재사용합니다.
    ///
    /// # Arguments
    /// * `series` - 준비된 시계열
    /// * `config` - 지표 매개변수
    ///
    /// # Returns
    /// * `IndicatorFrame` - 계산된 지표 프레임
    pub fn build(series: &Series, config: &AnalysisConfig) -> IndicatorFrame {
        let closes = series.closes();
        let mut frame = IndicatorFrame::new(closes.len());

        // 호출 내 로컬 캐시 (프로세스 전역 캐시가 아님)
        let mut ema_cache: HashMap<usize, Vec<Option<f64>>> = HashMap::new();

        for &period in &config.sma_periods {
            frame.insert(sma_key(period), ma::sma(&closes, period));
        }

        for &period in &config.ema_periods {
            let column = ema_cache
                .entry(period)
                .or_insert_with(|| ma::ema(&closes, period))
                .clone();
            frame.insert(ema_key(period), column);
        }

        frame.insert(rsi_key(config.rsi_period), rsi::rsi(&closes, config.rsi_period));

        let fast_column = ema_cache
            .entry(config.macd_fast_period)
            .or_insert_with(|| ma::ema(&closes, config.macd_fast_period))
            .clone();
        let slow_column = ema_cache
            .entry(config.macd_slow_period)
            .or_insert_with(|| ma::ema(&closes, config.macd_slow_period))
            .clone();
        let macd_columns =
            macd::macd_from_emas(&fast_column, &slow_column, config.macd_signal_period);
        frame.insert(KEY_MACD, macd_columns.macd);
        frame.insert(KEY_MACD_SIGNAL, macd_columns.signal);
        frame.insert(KEY_MACD_HIST, macd_columns.histogram);

        let bollinger_columns =
            bband::bollinger(&closes, config.bband_period, config.bband_multiplier);
        frame.insert(KEY_BB_UPPER, bollinger_columns.upper);
        frame.insert(KEY_BB_MIDDLE, bollinger_columns.middle);
        frame.insert(KEY_BB_LOWER, bollinger_columns.lower);

        match series.volumes() {
            Some(volumes) => {
                frame.insert(
                    volume_key(config.volume_period),
                    volume::volume_ma(&volumes, config.volume_period),
                );
            }
            None => debug!("거래량 컬럼이 없어 거래량 이동평균을 생략합니다"),
        }

        debug!("지표 프레임 계산 완료: {}개 컬럼", frame.keys.len());
        frame
    }

    /// 시계열에서 전체 지표 프레임 계산 (엄격 모드)
    ///
    /// 워밍업을 채우지 못한 지표가 하나라도 있으면 해당 지표의 이름과
    /// 필요한 최소 바 개수를 담은 `InsufficientData` 오류를 반환합니다.
    pub fn build_complete(
        series: &Series,
        config: &AnalysisConfig,
    ) -> AnalysisResult<IndicatorFrame> {
        for (key, required) in warmup_requirements(config, series.has_volume()) {
            if series.len() < required {
                return Err(AnalysisError::InsufficientData {
                    required,
                    actual: series.len(),
                    context: key,
                });
            }
        }
        Ok(Self::build(series, config))
    }
}

/// 각 지표 컬럼의 최소 필요 바 개수 목록
///
/// 엄격 모드 검사와 결측 플래그 판정에 사용됩니다.
pub fn warmup_requirements(config: &AnalysisConfig, has_volume: bool) -> Vec<(String, usize)> {
    let mut requirements = Vec::new();

    for &period in &config.sma_periods {
        requirements.push((sma_key(period), period));
    }
    for &period in &config.ema_periods {
        requirements.push((ema_key(period), period));
    }
    // Wilder RSI는 period개의 변화량, 즉 period + 1개 바가 필요
    requirements.push((rsi_key(config.rsi_period), config.rsi_period + 1));
    requirements.push((KEY_MACD.to_string(), config.macd_slow_period));
    let signal_warmup = config.macd_slow_period + config.macd_signal_period - 1;
    requirements.push((KEY_MACD_SIGNAL.to_string(), signal_warmup));
    requirements.push((KEY_MACD_HIST.to_string(), signal_warmup));
    requirements.push((KEY_BB_UPPER.to_string(), config.bband_period));
    requirements.push((KEY_BB_MIDDLE.to_string(), config.bband_period));
    requirements.push((KEY_BB_LOWER.to_string(), config.bband_period));
    if has_volume {
        requirements.push((volume_key(config.volume_period), config.volume_period));
    }

    requirements
}
