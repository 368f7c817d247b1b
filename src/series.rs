use crate::model::{AnalysisError, AnalysisResult, Bar, RawBar};
use chrono::DateTime;
use log::debug;
use serde_json::Value;

/// 분석에 필요한 최소 바 개수
pub const MIN_BARS: usize = 2;

/// 검증과 정규화가 끝난 시계열
///
/// 타임스탬프 오름차순으로 정렬되어 있고 (가장 오래된 데이터가 인덱스 0),
/// 타임스탬프는 순증가하며, 길이는 항상 `MIN_BARS` 이상입니다.
/// 생성 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
}

/// 원시 가격 필드를 f64로 강제 변환
///
/// 숫자와 숫자 문자열만 허용하며, 그 외(null, 배열, 비숫자 문자열,
/// NaN/무한대)는 None을 반환합니다.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// 필수 가격 필드 강제 변환 (실패 시 검증 오류)
fn coerce_required(value: &Value, field: &str, timestamp: i64) -> AnalysisResult<f64> {
    coerce_number(value).ok_or_else(|| AnalysisError::DataValidation {
        timestamp,
        message: format!("{} 필드가 숫자가 아닙니다: {}", field, value),
    })
}

/// 바 가격 불변식 검사
fn validate_bar(bar: &Bar) -> AnalysisResult<()> {
    let timestamp = bar.timestamp_millis();
    if bar.low > bar.high {
        return Err(AnalysisError::DataValidation {
            timestamp,
            message: format!("low({})가 high({})보다 큽니다", bar.low, bar.high),
        });
    }
    if bar.open < bar.low || bar.open > bar.high {
        return Err(AnalysisError::DataValidation {
            timestamp,
            message: format!(
                "open({})이 [low({}), high({})] 범위를 벗어났습니다",
                bar.open, bar.low, bar.high
            ),
        });
    }
    if bar.close < bar.low || bar.close > bar.high {
        return Err(AnalysisError::DataValidation {
            timestamp,
            message: format!(
                "close({})가 [low({}), high({})] 범위를 벗어났습니다",
                bar.close, bar.low, bar.high
            ),
        });
    }
    if let Some(volume) = bar.volume {
        if !volume.is_finite() || volume < 0.0 {
            return Err(AnalysisError::DataValidation {
                timestamp,
                message: format!("volume({})이 유효하지 않습니다", volume),
            });
        }
    }
    Ok(())
}

impl Series {
    /// 원시 바 시퀀스에서 시계열 준비
    ///
    /// 각 OHLC 필드를 숫자로 강제 변환하고 (실패 시 해당 바의
    /// 타임스탬프를 담은 검증 오류), 거래량은 없으면 None으로 둡니다.
    /// 타임스탬프 오름차순으로 정렬하며, 중복 타임스탬프는 거부합니다.
    ///
    /// # Arguments
    /// * `raw` - 외부 데이터 소스에서 받은 원시 바 (정렬되지 않았을 수 있음)
    ///
    /// # Returns
    /// * `AnalysisResult<Series>` - 준비된 시계열 또는 오류
    pub fn prepare(raw: &[RawBar]) -> AnalysisResult<Series> {
        let mut bars = Vec::with_capacity(raw.len());

        for item in raw {
            let open = coerce_required(&item.open, "open", item.timestamp)?;
            let high = coerce_required(&item.high, "high", item.timestamp)?;
            let low = coerce_required(&item.low, "low", item.timestamp)?;
            let close = coerce_required(&item.close, "close", item.timestamp)?;
            // 거래량은 선택 필드: 없거나 숫자가 아니면 None (0으로 채우지 않음)
            let volume = item.volume.as_ref().and_then(coerce_number);

            let datetime = DateTime::from_timestamp_millis(item.timestamp).ok_or_else(|| {
                AnalysisError::DataValidation {
                    timestamp: item.timestamp,
                    message: "타임스탬프가 유효하지 않습니다".to_string(),
                }
            })?;

            let bar = Bar {
                datetime,
                open,
                high,
                low,
                close,
                volume,
            };
            validate_bar(&bar)?;
            bars.push(bar);
        }

        Self::from_bars(bars)
    }

    /// 이미 구성된 바 목록에서 시계열 생성
    ///
    /// 정렬, 불변식 검사, 중복 타임스탬프 검사, 최소 길이 검사를
    /// 동일하게 수행합니다.
    pub fn from_bars(mut bars: Vec<Bar>) -> AnalysisResult<Series> {
        for bar in &bars {
            validate_bar(bar)?;
        }

        bars.sort_by_key(|bar| bar.datetime);

        for pair in bars.windows(2) {
            if pair[0].datetime == pair[1].datetime {
                return Err(AnalysisError::DataValidation {
                    timestamp: pair[1].timestamp_millis(),
                    message: "중복된 타임스탬프입니다".to_string(),
                });
            }
        }

        if bars.len() < MIN_BARS {
            return Err(AnalysisError::InsufficientData {
                required: MIN_BARS,
                actual: bars.len(),
                context: "시계열 준비".to_string(),
            });
        }

        debug!("시계열 준비 완료: {}개 바", bars.len());
        Ok(Series { bars })
    }

    /// 바 개수 반환
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 시계열이 비어 있는지 확인 (준비된 시계열은 항상 false)
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 전체 바 슬라이스 반환 (오름차순)
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// 지정된 인덱스의 바 반환
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// 가장 최근 바 반환
    pub fn last(&self) -> &Bar {
        // 길이 >= MIN_BARS 불변식에 의해 항상 존재
        &self.bars[self.bars.len() - 1]
    }

    /// 종가 벡터 반환
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// 거래량 벡터 반환
    ///
    /// 모든 바에 거래량이 있을 때만 Some을 반환합니다. 일부만 있는 경우
    /// 부분 컬럼으로 평균을 왜곡하지 않도록 전체를 결측으로 취급합니다.
    pub fn volumes(&self) -> Option<Vec<f64>> {
        self.bars.iter().map(|bar| bar.volume).collect()
    }

    /// 거래량 컬럼 존재 여부
    pub fn has_volume(&self) -> bool {
        self.bars.iter().all(|bar| bar.volume.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_bar(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> RawBar {
        RawBar {
            timestamp,
            open: json!(open),
            high: json!(high),
            low: json!(low),
            close: json!(close),
            volume: Some(json!(1000.0)),
        }
    }

    #[test]
    fn test_prepare_sorts_ascending() {
        let raw = vec![
            raw_bar(2_000, 10.0, 11.0, 9.0, 10.5),
            raw_bar(1_000, 9.0, 10.0, 8.0, 9.5),
            raw_bar(3_000, 11.0, 12.0, 10.0, 11.5),
        ];
        let series = Series::prepare(&raw).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(0).unwrap().timestamp_millis(), 1_000);
        assert_eq!(series.last().timestamp_millis(), 3_000);
    }

    #[test]
    fn test_prepare_coerces_string_prices() {
        let raw = vec![
            RawBar {
                timestamp: 1_000,
                open: json!("100.5"),
                high: json!("110"),
                low: json!(" 95.0 "),
                close: json!("105.25"),
                volume: None,
            },
            raw_bar(2_000, 105.0, 112.0, 100.0, 108.0),
        ];
        let series = Series::prepare(&raw).unwrap();
        assert_eq!(series.get(0).unwrap().open, 100.5);
        assert_eq!(series.get(0).unwrap().close, 105.25);
    }

    #[test]
    fn test_prepare_rejects_non_numeric_close() {
        let mut raw = vec![raw_bar(1_000, 10.0, 11.0, 9.0, 10.5)];
        raw.push(RawBar {
            timestamp: 2_000,
            open: json!(10.0),
            high: json!(11.0),
            low: json!(9.0),
            close: json!("not-a-number"),
            volume: None,
        });
        match Series::prepare(&raw) {
            Err(AnalysisError::DataValidation { timestamp, .. }) => {
                assert_eq!(timestamp, 2_000);
            }
            other => panic!("검증 오류가 발생해야 함: {:?}", other),
        }
    }

    #[test]
    fn test_prepare_rejects_low_above_high() {
        let raw = vec![
            raw_bar(1_000, 10.0, 11.0, 9.0, 10.5),
            raw_bar(2_000, 10.0, 9.0, 11.0, 10.0),
        ];
        assert!(matches!(
            Series::prepare(&raw),
            Err(AnalysisError::DataValidation { timestamp: 2_000, .. })
        ));
    }

    #[test]
    fn test_prepare_rejects_duplicate_timestamps() {
        let raw = vec![
            raw_bar(1_000, 10.0, 11.0, 9.0, 10.5),
            raw_bar(1_000, 10.5, 11.5, 9.5, 11.0),
        ];
        assert!(matches!(
            Series::prepare(&raw),
            Err(AnalysisError::DataValidation { .. })
        ));
    }

    #[test]
    fn test_prepare_requires_two_bars() {
        let raw = vec![raw_bar(1_000, 10.0, 11.0, 9.0, 10.5)];
        assert!(matches!(
            Series::prepare(&raw),
            Err(AnalysisError::InsufficientData {
                required: MIN_BARS,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_volume_disables_column() {
        let mut raw = vec![raw_bar(1_000, 10.0, 11.0, 9.0, 10.5)];
        raw.push(RawBar {
            timestamp: 2_000,
            open: json!(10.0),
            high: json!(11.0),
            low: json!(9.0),
            close: json!(10.0),
            volume: None,
        });
        let series = Series::prepare(&raw).unwrap();
        assert!(!series.has_volume());
        assert!(series.volumes().is_none());
    }
}
