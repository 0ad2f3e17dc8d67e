//! 전일 가격 수집 CLI.

use clap::{Parser, Subcommand};
use spot_collector::modules::{self, BackfillOptions, IngestionPipeline};
use spot_collector::{CollectorConfig, CollectorError};
use spot_core::logging::{init_logging, LogConfig, LogFormat};
use spot_core::{AreaTag, TaxRate};
use spot_data::{EntsoeClient, InfluxStore};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "spot-collector")]
#[command(about = "ENTSO-E day-ahead price collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 지역 코드 (기본: COUNTRY_CODE 환경변수, 없으면 BE)
    #[arg(long, global = true)]
    country_code: Option<String>,

    /// 세율 (예: 0.06, 기본: TAX 환경변수)
    #[arg(long, global = true)]
    tax: Option<String>,

    /// 로그 레벨 (trace, debug, info, warn, error). RUST_LOG보다 우선
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact). LOG_FORMAT보다 우선
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// 최근 가격 임포트 (과거 7일 ~ 향후 2일)
    Import,

    /// 과거 가격 백필
    Backfill {
        /// 과거 범위 (일)
        #[arg(long, default_value_t = 365)]
        days: i64,

        /// 청크 폭 (일)
        #[arg(long, default_value_t = 30)]
        chunk_days: i64,

        /// 조회/기록 없이 청크 계획만 출력
        #[arg(long)]
        dry_run: bool,

        /// 실행 요약을 JSON으로 stdout에 출력
        #[arg(long)]
        json: bool,
    },

    /// 데몬 모드: 주기적으로 롤링 임포트 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    let mut log_config = LogConfig::from_env("spot_collector=info,spot_data=info");
    if let Some(level) = &cli.log_level {
        log_config.level = format!("spot_collector={level},spot_data={level}");
    }
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format);
    }
    init_logging(log_config)?;

    tracing::info!("Spot Price Collector 시작");

    // 설정 로드 (필수 값 누락 시 종료)
    let config = CollectorConfig::from_env()?;
    tracing::debug!(influx = ?config.influx, entsoe = ?config.entsoe, "설정 로드 완료");

    let area = match &cli.country_code {
        Some(code) => AreaTag::new(code).map_err(CollectorError::from)?,
        None => config.pricing.default_area.clone(),
    };
    let tax_rate = match &cli.tax {
        Some(raw) => raw.parse::<TaxRate>().map_err(CollectorError::from)?,
        None => config.pricing.default_tax,
    };
    area.require_eic_code().map_err(CollectorError::from)?;

    let source = Arc::new(EntsoeClient::new(&config.entsoe)?);
    let store = Arc::new(InfluxStore::new(&config.influx)?);
    let pipeline = IngestionPipeline::new(source, store)
        .with_transform(config.pricing.transform)
        .with_request_delay(config.ingest.request_delay());

    // 명령 실행
    match cli.command {
        Commands::Import => {
            let summary = modules::import_recent(&pipeline, &config, &area, tax_rate).await?;
            summary.log_summary("롤링 임포트");
        }
        Commands::Backfill {
            days,
            chunk_days,
            dry_run,
            json,
        } => {
            let options = BackfillOptions {
                days,
                chunk_days,
                dry_run,
            };
            let summary = modules::backfill(&pipeline, &area, tax_rate, options).await?;
            summary.log_summary("백필");
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            modules::run_until_shutdown(
                config.daemon.interval(),
                async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("종료 신호 대기 실패: {}", e);
                        std::future::pending::<()>().await;
                    }
                },
                || modules::import_recent(&pipeline, &config, &area, tax_rate),
            )
            .await?;
        }
    }

    tracing::info!("Spot Price Collector 종료");

    Ok(())
}
