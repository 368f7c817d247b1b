use crate::analyzer::bband_analyzer::BbandAnalysis;
use crate::analyzer::candle_pattern_analyzer::CandlePatternAnalysis;
use crate::analyzer::ma_cross_analyzer::MaCrossAnalysis;
use crate::analyzer::macd_analyzer::MacdAnalysis;
use crate::analyzer::rsi_analyzer::RsiAnalysis;
use crate::analyzer::support_resistance_analyzer::SupportResistanceAnalysis;
use crate::analyzer::trend_analyzer::TrendAnalysis;
use crate::analyzer::volume_analyzer::VolumeAnalysis;
use crate::analyzer::{CROSS_LONG_PERIOD, CROSS_SHORT_PERIOD, TREND_MA_PERIOD};
use crate::config_loader::AnalysisConfig;
use crate::indicator::IndicatorFrame;
use crate::model::{AnalysisResult, Level, RawBar, Recommendation};
use crate::recommendation;
use crate::series::Series;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

/// 기술적 분석 엔진
///
/// 설정 하나를 보유하는 것 외에는 호출 간 상태를 유지하지 않습니다.
/// 모든 분석은 입력 시계열에 대한 순수 계산이므로 서로 다른 시계열에
/// 대해 동시에 호출해도 안전합니다.
#[derive(Debug, Clone)]
pub struct TechnicalAnalyzer {
    config: AnalysisConfig,
}

impl TechnicalAnalyzer {
    /// 지정된 설정으로 분석기 생성
    pub fn new(config: AnalysisConfig) -> TechnicalAnalyzer {
        TechnicalAnalyzer { config }
    }

    /// 설정 참조 반환
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 원시 바에서 전체 분석 수행
    ///
    /// 시계열 준비 단계의 검증 오류는 전체 분석을 중단시킵니다.
    /// 준비가 끝난 뒤의 지표 워밍업 부족은 결측 플래그로 완화되어
    /// 항상 추천이 산출됩니다.
    ///
    /// # Arguments
    /// * `raw` - 외부 데이터 소스에서 받은 원시 바
    ///
    /// # Returns
    /// * `AnalysisResult<AnalysisReport>` - 분석 리포트 또는 검증 오류
    pub fn analyze(&self, raw: &[RawBar]) -> AnalysisResult<AnalysisReport> {
        let series = Series::prepare(raw)?;
        Ok(self.analyze_series(&series))
    }

    /// 준비된 시계열에서 전체 분석 수행
    ///
    /// 유효한 시계열이 주어지면 실패하지 않습니다.
    pub fn analyze_series(&self, series: &Series) -> AnalysisReport {
        debug!("분석 시작: {}개 바", series.len());

        let frame = IndicatorFrame::build(series, &self.config);
        let patterns = CandlePatternAnalysis::analyze(series);
        let level_analysis = SupportResistanceAnalysis::analyze(
            series,
            &frame,
            CROSS_SHORT_PERIOD,
            CROSS_LONG_PERIOD,
        );

        let trend = TrendAnalysis::analyze(series, &frame, TREND_MA_PERIOD);
        let ma_cross = MaCrossAnalysis::analyze(&frame, CROSS_SHORT_PERIOD, CROSS_LONG_PERIOD);
        let rsi = RsiAnalysis::analyze(&frame, self.config.rsi_period);
        let macd = MacdAnalysis::analyze(&frame);
        let bband = BbandAnalysis::analyze(series, &frame);
        let volume = VolumeAnalysis::analyze(series, &frame, self.config.volume_period);

        // 대표 패턴 신호는 분해 맵으로, 나머지는 추가 신호로 전달
        let representative = patterns.breakdown_signal();
        let mut extra_signals = patterns.signals();
        extra_signals.retain(|signal| *signal != representative);

        // 해석기 평가 순서 고정: 추세 → 교차 → RSI → MACD → 볼린저 → 거래량 → 패턴
        let indicator_signals = vec![
            ("trend".to_string(), trend.signal()),
            ("ma_crossover".to_string(), ma_cross.signal()),
            ("rsi".to_string(), rsi.signal()),
            ("macd".to_string(), macd.signal()),
            ("bollinger".to_string(), bband.signal()),
            ("volume".to_string(), volume.signal()),
            ("candle_pattern".to_string(), representative),
        ];

        let recommendation = recommendation::recommend(&indicator_signals, &extra_signals);
        info!(
            "분석 완료: 점수 {} → {}",
            recommendation.sentiment_score, recommendation.label
        );

        let last_bar = series.last();
        AnalysisReport {
            last_datetime: last_bar.datetime,
            last_close: last_bar.close,
            bar_count: series.len(),
            frame,
            patterns,
            levels: level_analysis.levels,
            recommendation,
        }
    }
}

impl Default for TechnicalAnalyzer {
    fn default() -> Self {
        TechnicalAnalyzer::new(AnalysisConfig::default())
    }
}

/// 한 번의 분석 호출이 산출하는 전체 결과
///
/// 표시 계층은 읽기 전용 접근자로 최신 지표 값과 전체 히스토리를
/// 조회합니다. 엔진은 어떤 포매팅도 수행하지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    last_datetime: DateTime<Utc>,
    last_close: f64,
    bar_count: usize,
    frame: IndicatorFrame,
    patterns: CandlePatternAnalysis,
    levels: Vec<Level>,
    recommendation: Recommendation,
}

impl AnalysisReport {
    /// 마지막 바의 시각
    pub fn last_datetime(&self) -> DateTime<Utc> {
        self.last_datetime
    }

    /// 마지막 바의 종가
    pub fn last_close(&self) -> f64 {
        self.last_close
    }

    /// 분석에 사용된 바 개수
    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    /// 전체 지표 프레임 (차트용 히스토리 포함)
    pub fn frame(&self) -> &IndicatorFrame {
        &self.frame
    }

    /// 지정된 지표의 최신 값
    pub fn latest(&self, key: &str) -> Option<f64> {
        self.frame.latest(key)
    }

    /// 캔들 패턴 분석 결과
    pub fn patterns(&self) -> &CandlePatternAnalysis {
        &self.patterns
    }

    /// 지지/저항 레벨 목록
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// 최종 추천
    pub fn recommendation(&self) -> &Recommendation {
        &self.recommendation
    }
}
