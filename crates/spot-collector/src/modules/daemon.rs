//! 데몬 모드: 주기적 롤링 임포트.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::{Result, RunSummary};

/// 종료 신호가 올 때까지 `period`마다 `tick`을 실행합니다.
///
/// 첫 실행은 즉시 시작됩니다. 실행 중 발생한 에러는 로그만 남기고 다음
/// 주기로 넘어가지만, [`CollectorError::is_fatal`](crate::CollectorError::is_fatal)
/// 에러는 루프를 끝내고 그대로 반환합니다.
///
/// `shutdown`은 한 번만 고정(pin)되어 모든 주기에서 같은 future가 대기합니다.
/// 실행 도중 들어온 종료 신호는 그 실행이 끝난 뒤 다음 주기 전에 처리됩니다.
pub async fn run_until_shutdown<S, F, Fut>(period: Duration, shutdown: S, mut tick: F) -> Result<()>
where
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RunSummary>>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = interval.tick() => {}
        }

        match tick().await {
            Ok(summary) => summary.log_summary("롤링 임포트"),
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "복구 불가능한 에러, 데몬 중단");
                return Err(e);
            }
            Err(e) => tracing::error!("롤링 임포트 실패: {}", e),
        }

        tracing::info!(
            "=== 임포트 완료, 다음 실행: {}초 후 ===",
            period.as_secs()
        );
    }

    tracing::info!("종료 신호 수신, 데몬 종료 중...");
    Ok(())
}
