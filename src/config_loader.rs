use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 설정 로드 오류
#[derive(Debug)]
pub enum ConfigError {
    /// 파일 오류
    FileError(String),
    /// 파싱 오류
    ParseError(String),
    /// 유효성 검사 오류
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileError(msg) => write!(f, "설정 파일 오류: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "설정 파싱 오류: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "설정 유효성 검사 오류: {}", msg),
        }
    }
}

/// String으로 ConfigError 변환
impl From<ConfigError> for String {
    fn from(err: ConfigError) -> Self {
        err.to_string()
    }
}

/// 설정 로드 결과
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 설정 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON 형식
    Json,
    /// TOML 형식
    Toml,
    /// 자동 감지 (파일 확장자로부터)
    Auto,
}

/// 설정 유효성 검사 트레이트
pub trait ConfigValidation {
    /// 설정 유효성 검사
    fn validate(&self) -> ConfigResult<()>;
}

/// 인식되는 룩백 프리셋 (일 단위)
pub const LOOKBACK_PRESETS: [u32; 4] = [30, 90, 180, 365];

/// 기본 룩백 기간 (일)
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;

/// 분석 엔진 설정
///
/// 호출 단위로 전달되며, 실행 중에 전역으로 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 룩백 기간 (일)
    pub lookback_days: u32,
    /// SMA 계산 기간 목록
    pub sma_periods: Vec<usize>,
    /// EMA 계산 기간 목록
    pub ema_periods: Vec<usize>,
    /// RSI 계산 기간
    pub rsi_period: usize,
    /// MACD 빠른 EMA 기간
    pub macd_fast_period: usize,
    /// MACD 느린 EMA 기간
    pub macd_slow_period: usize,
    /// MACD 시그널 라인 기간
    pub macd_signal_period: usize,
    /// 볼린저 밴드 기간
    pub bband_period: usize,
    /// 볼린저 밴드 표준편차 승수
    pub bband_multiplier: f64,
    /// 거래량 이동평균 기간
    pub volume_period: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            sma_periods: vec![20, 50, 200],
            ema_periods: vec![12, 26],
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            bband_period: 20,
            bband_multiplier: 2.0,
            volume_period: 20,
        }
    }
}

impl AnalysisConfig {
    /// 룩백 프리셋에서 설정 생성
    ///
    /// # Arguments
    /// * `days` - 룩백 기간 (30/90/180/365만 인정)
    ///
    /// # Returns
    /// * `ConfigResult<AnalysisConfig>` - 설정 또는 유효성 검사 오류
    pub fn from_preset(days: u32) -> ConfigResult<AnalysisConfig> {
        if !LOOKBACK_PRESETS.contains(&days) {
            return Err(ConfigError::ValidationError(format!(
                "인식되지 않는 룩백 프리셋: {} (지원: {:?})",
                days, LOOKBACK_PRESETS
            )));
        }
        Ok(AnalysisConfig {
            lookback_days: days,
            ..AnalysisConfig::default()
        })
    }
}

impl ConfigValidation for AnalysisConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.lookback_days == 0 {
            return Err(ConfigError::ValidationError(
                "룩백 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.sma_periods.is_empty() || self.ema_periods.is_empty() {
            return Err(ConfigError::ValidationError(
                "이동평균 기간 목록은 비어 있을 수 없습니다".to_string(),
            ));
        }
        let zero_period = self
            .sma_periods
            .iter()
            .chain(self.ema_periods.iter())
            .chain([
                &self.rsi_period,
                &self.macd_fast_period,
                &self.macd_slow_period,
                &self.macd_signal_period,
                &self.bband_period,
                &self.volume_period,
            ])
            .any(|&period| period == 0);
        if zero_period {
            return Err(ConfigError::ValidationError(
                "지표 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.macd_fast_period >= self.macd_slow_period {
            return Err(ConfigError::ValidationError(format!(
                "MACD 빠른 기간({})은 느린 기간({})보다 작아야 합니다",
                self.macd_fast_period, self.macd_slow_period
            )));
        }
        if self.bband_multiplier <= 0.0 || !self.bband_multiplier.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "볼린저 밴드 승수가 유효하지 않습니다: {}",
                self.bband_multiplier
            )));
        }
        Ok(())
    }
}

/// 설정 파일 로더
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// 파일에서 설정 로드
    ///
    /// # Arguments
    /// * `path` - 설정 파일 경로
    /// * `format` - 설정 파일 형식 (기본값: Auto)
    ///
    /// # Returns
    /// * `ConfigResult<T>` - 설정 객체 또는 오류
    pub fn load_from_file<T>(path: &Path, format: ConfigFormat) -> ConfigResult<T>
    where
        T: DeserializeOwned + ConfigValidation,
    {
        debug!("설정 파일 로드 시작: {}", path.display());

        let format = if format == ConfigFormat::Auto {
            Self::detect_format(path)?
        } else {
            format
        };

        let content = fs::read_to_string(path).map_err(|e| {
            error!("설정 파일 읽기 실패: {} - {}", path.display(), e);
            ConfigError::FileError(format!("파일 읽기 실패: {}", e))
        })?;

        let config = Self::load_from_string(&content, format)?;
        info!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// 문자열에서 설정 로드
    ///
    /// # Arguments
    /// * `content` - 설정 문자열
    /// * `format` - 설정 형식 (Auto이면 JSON 먼저 시도 후 TOML)
    ///
    /// # Returns
    /// * `ConfigResult<T>` - 설정 객체 또는 오류
    pub fn load_from_string<T>(content: &str, format: ConfigFormat) -> ConfigResult<T>
    where
        T: DeserializeOwned + ConfigValidation,
    {
        let config: T = match format {
            ConfigFormat::Json => Self::parse_json(content)?,
            ConfigFormat::Toml => Self::parse_toml(content)?,
            ConfigFormat::Auto => match Self::parse_json::<T>(content) {
                Ok(config) => config,
                Err(_) => Self::parse_toml(content)?,
            },
        };

        if let Err(e) = config.validate() {
            error!("설정 유효성 검사 실패: {}", e);
            return Err(e);
        }

        Ok(config)
    }

    /// JSON 파싱
    fn parse_json<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
        serde_json::from_str(content).map_err(|e| {
            warn!("JSON 파싱 실패: {}", e);
            ConfigError::ParseError(format!("JSON 파싱 실패: {}", e))
        })
    }

    /// TOML 파싱
    fn parse_toml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
        toml::from_str(content).map_err(|e| {
            warn!("TOML 파싱 실패: {}", e);
            ConfigError::ParseError(format!("TOML 파싱 실패: {}", e))
        })
    }

    /// 파일 형식 감지
    fn detect_format(path: &Path) -> ConfigResult<ConfigFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => {
                warn!("지원되지 않는 파일 형식: {}", path.display());
                Err(ConfigError::FileError(format!(
                    "파일 형식을 감지할 수 없음: {}",
                    path.display()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lookback_days, 90);
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.sma_periods, vec![20, 50, 200]);
    }

    #[test]
    fn test_from_preset() {
        let config = AnalysisConfig::from_preset(30).unwrap();
        assert_eq!(config.lookback_days, 30);

        // 프리셋 목록에 없는 값은 거부
        assert!(matches!(
            AnalysisConfig::from_preset(45),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_fast_over_slow() {
        let config = AnalysisConfig {
            macd_fast_period: 26,
            macd_slow_period: 12,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_period() {
        let config = AnalysisConfig {
            rsi_period: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_string() {
        let toml_str = r#"
            lookback_days = 180
            rsi_period = 21
        "#;
        let config =
            ConfigLoader::load_from_string::<AnalysisConfig>(toml_str, ConfigFormat::Toml).unwrap();
        assert_eq!(config.lookback_days, 180);
        assert_eq!(config.rsi_period, 21);
        // 나머지 필드는 기본값 유지
        assert_eq!(config.macd_slow_period, 26);
    }

    #[test]
    fn test_load_from_json_string() {
        let json = r#"{"lookback_days": 30, "bband_multiplier": 2.5}"#;
        let config =
            ConfigLoader::load_from_string::<AnalysisConfig>(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.bband_multiplier, 2.5);
    }

    #[test]
    fn test_load_from_string_rejects_invalid() {
        let json = r#"{"macd_fast_period": 30}"#;
        let result = ConfigLoader::load_from_string::<AnalysisConfig>(json, ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_from_file_auto_detection() {
        use std::io::Write;

        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "lookback_days = 365").unwrap();

        let config =
            ConfigLoader::load_from_file::<AnalysisConfig>(file.path(), ConfigFormat::Auto)
                .unwrap();
        assert_eq!(config.lookback_days, 365);
    }

    #[test]
    fn test_detect_format_unknown_extension() {
        let result = ConfigLoader::load_from_file::<AnalysisConfig>(
            Path::new("config.yaml"),
            ConfigFormat::Auto,
        );
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }
}
