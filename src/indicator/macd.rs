use crate::indicator::ma::ema;
use crate::indicator::utils::moving_average;

/// MACD 계산 결과 컬럼 묶음
///
/// MACD 라인은 인덱스 `slow - 1`부터, 시그널 라인과 히스토그램은
/// 인덱스 `slow + signal - 2`부터 정의됩니다.
#[derive(Debug, Clone)]
pub struct MacdColumns {
    /// MACD 라인 (빠른 EMA - 느린 EMA)
    pub macd: Vec<Option<f64>>,
    /// 시그널 라인 (MACD 라인의 EMA)
    pub signal: Vec<Option<f64>>,
    /// 히스토그램 (MACD - 시그널)
    pub histogram: Vec<Option<f64>>,
}

/// MACD(이동평균수렴발산) 컬럼 계산
///
/// 미리 계산된 빠른/느린 EMA 컬럼을 재사용하는 변형입니다.
/// 시그널 라인은 정의된 MACD 값들에 대한 EMA로, 처음 `signal_period`개
/// 정의값의 단순 평균으로 시드합니다.
///
/// # Arguments
/// * `fast_ema` - 빠른 EMA 컬럼
/// * `slow_ema` - 느린 EMA 컬럼
/// * `signal_period` - 시그널 라인 기간
///
/// # Returns
/// * `MacdColumns` - MACD/시그널/히스토그램 컬럼
pub fn macd_from_emas(
    fast_ema: &[Option<f64>],
    slow_ema: &[Option<f64>],
    signal_period: usize,
) -> MacdColumns {
    if signal_period == 0 {
        panic!("MACD 시그널 기간은 0보다 커야 합니다");
    }

    let len = fast_ema.len().min(slow_ema.len());
    let mut macd_column = vec![None; len];
    for i in 0..len {
        if let (Some(fast), Some(slow)) = (fast_ema[i], slow_ema[i]) {
            macd_column[i] = Some(fast - slow);
        }
    }

    // 첫 정의 인덱스(느린 EMA 워밍업 종료 지점) 탐색
    let mut signal_column = vec![None; len];
    let start = macd_column.iter().position(|slot| slot.is_some());

    if let Some(start) = start {
        let defined = len - start;
        if defined >= signal_period {
            let alpha = moving_average::calculate_ema_alpha(signal_period);
            let seed_end = start + signal_period;
            let seed_values: Vec<f64> = macd_column[start..seed_end]
                .iter()
                .map(|slot| slot.unwrap_or(0.0))
                .collect();
            let mut previous = moving_average::calculate_mean(&seed_values);
            signal_column[seed_end - 1] = Some(previous);

            for (i, slot) in macd_column.iter().enumerate().skip(seed_end) {
                if let Some(value) = slot {
                    previous = moving_average::calculate_ema_step(*value, previous, alpha);
                    signal_column[i] = Some(previous);
                }
            }
        }
    }

    let mut histogram = vec![None; len];
    for i in 0..len {
        if let (Some(line), Some(signal)) = (macd_column[i], signal_column[i]) {
            histogram[i] = Some(line - signal);
        }
    }

    MacdColumns {
        macd: macd_column,
        signal: signal_column,
        histogram,
    }
}

/// MACD 컬럼 계산 (종가에서 직접)
///
/// # Arguments
/// * `values` - 종가 배열
/// * `fast_period` - 빠른 EMA 기간 (일반적으로 12)
/// * `slow_period` - 느린 EMA 기간 (일반적으로 26)
/// * `signal_period` - 시그널 라인 기간 (일반적으로 9)
///
/// # Returns
/// * `MacdColumns` - MACD/시그널/히스토그램 컬럼
///
/// # Panics
/// * 기간이 0이거나 빠른 기간이 느린 기간 이상이면 패닉 발생
pub fn macd(
    values: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdColumns {
    if fast_period == 0 || slow_period == 0 || signal_period == 0 {
        panic!("MACD 기간은 0보다 커야 합니다");
    }
    if fast_period >= slow_period {
        panic!("빠른 기간은 느린 기간보다 작아야 합니다");
    }

    let fast_ema = ema(values, fast_period);
    let slow_ema = ema(values, slow_period);
    macd_from_emas(&fast_ema, &slow_ema, signal_period)
}
