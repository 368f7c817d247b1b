use log::{debug, error, info};
use std::env;
use std::path::PathBuf;
use technical_analysis::config_loader::{AnalysisConfig, ConfigFormat, ConfigLoader};
use technical_analysis::engine::TechnicalAnalyzer;
use technical_analysis::model::RawBar;

fn main() {
    // 로그 초기화
    env_logger::init();

    info!("기술적 분석 CLI 시작");

    // 커맨드 라인 인수 파싱
    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 2 {
        error!("인수가 충분하지 않습니다. 바 데이터 파일이 필요합니다.");
        println!("사용법: {} <바_데이터.json> [설정_파일.toml|json]", args[0]);
        println!("바 데이터: [{{\"timestamp\": ..., \"open\": ..., ...}}] 형식의 JSON 배열");
        std::process::exit(2);
    }

    // 바 데이터 로드
    let bars_path = PathBuf::from(&args[1]);
    let content = match std::fs::read_to_string(&bars_path) {
        Ok(content) => content,
        Err(e) => {
            error!("바 데이터 파일 읽기 실패: {} - {}", bars_path.display(), e);
            println!("바 데이터 파일 읽기 실패: {}", e);
            std::process::exit(1);
        }
    };

    let raw_bars: Vec<RawBar> = match serde_json::from_str(&content) {
        Ok(bars) => bars,
        Err(e) => {
            error!("바 데이터 파싱 실패: {}", e);
            println!("바 데이터 파싱 실패: {}", e);
            std::process::exit(1);
        }
    };
    info!("바 데이터 로드 완료: {}개", raw_bars.len());

    // 설정 로드 (지정되지 않은 경우 기본 설정 사용)
    let config = if args.len() >= 3 {
        let config_path = PathBuf::from(&args[2]);
        debug!("사용자 지정 설정 파일 사용: {}", config_path.display());
        match ConfigLoader::load_from_file::<AnalysisConfig>(&config_path, ConfigFormat::Auto) {
            Ok(config) => config,
            Err(e) => {
                error!("설정 로드 실패: {}", e);
                println!("설정 로드 실패: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        debug!("기본 설정 사용");
        AnalysisConfig::default()
    };

    // 분석 수행
    let analyzer = TechnicalAnalyzer::new(config);
    let report = match analyzer.analyze(&raw_bars) {
        Ok(report) => report,
        Err(e) => {
            error!("분석 실패: {}", e);
            println!("분석 실패: {}", e);
            std::process::exit(1);
        }
    };

    let recommendation = report.recommendation();
    info!(
        "추천: {} (점수 {})",
        recommendation.label, recommendation.sentiment_score
    );

    // 리포트 전체를 JSON으로 출력
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("리포트 직렬화 실패: {}", e);
            std::process::exit(1);
        }
    }
}
