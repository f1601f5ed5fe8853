//! 파이프라인 오케스트레이션 -- 읽기/파싱/정규화/trap 분리/집계의 전체 흐름을 관리합니다.
//!
//! [`LogPipeline`]은 한 번 실행되고 소비되는 배치 작업입니다.
//!
//! # 내부 아키텍처
//! ```text
//!                 +-> worker (partition) --+-> mpsc -> parsed writer -> parsed sink
//! LineSource -----+-> worker (partition) --+-> mpsc -> trap writer   -> trap sink
//!                 +-> ...                  |
//!                                          +-> partial Aggregator --(barrier merge)--> report sink
//! ```
//!
//! 1. 소스 파티션을 열거하고 세 싱크를 모두 엽니다. 하나라도 실패하면 읽기 전에 중단합니다.
//! 2. 최대 `workers`개의 태스크가 파티션을 하나씩 맡아 파싱/라우팅/정규화합니다.
//!    워커는 상태를 공유하지 않고 각자의 부분 집계만 유지합니다.
//! 3. 모든 워커를 join 한 뒤(배리어) 부분 집계를 합쳐 리포트를 쓰고 커밋합니다.
//!
//! 취소되거나 실패하면 리포트 싱크는 커밋되지 않은 채 drop 됩니다.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use logtally_core::metrics as names;
use logtally_core::pipeline::{LineReader, LineSource, OutputSink, SinkProvider};
use logtally_core::types::StreamKind;

use crate::aggregate::Aggregator;
use crate::collector::FileSource;
use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::normalize::normalize;
use crate::parser::SyslogParser;
use crate::sink::FileSinkProvider;
use crate::trap::{Route, TrapRouter};

/// 실행 결과 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 실행 식별자 (UUID v4)
    pub run_id: Uuid,
    /// 읽은 소스 파티션 수
    pub sources: usize,
    /// 읽은 전체 라인 수
    pub lines_read: u64,
    /// parsed 스트림에 쓴 레코드 수
    pub parsed: u64,
    /// trap 스트림에 쓴 라인 수
    pub trapped: u64,
    /// 리포트 그룹(서로 다른 프로세스) 수
    pub groups: usize,
    /// 실행 시간 (밀리초)
    pub elapsed_ms: u64,
}

/// 로그 파이프라인 -- 한 번의 배치 실행을 표현합니다.
///
/// # 사용 예시
/// ```ignore
/// use logtally_log_pipeline::{LogPipelineBuilder, PipelineConfig};
///
/// let config = PipelineConfig::default()
///     .with_paths("/var/log/messages", "parsed.tsv", "trap.tsv", "report.csv");
/// let pipeline = LogPipelineBuilder::new().config(config).build()?;
/// let summary = pipeline.run().await?;
/// println!("{} groups", summary.groups);
/// ```
pub struct LogPipeline<S, P> {
    config: PipelineConfig,
    source: S,
    sinks: P,
    parser: SyslogParser,
    router: TrapRouter,
}

impl<S, P> LogPipeline<S, P>
where
    S: LineSource,
    P: SinkProvider,
{
    /// 파이프라인 설정을 반환합니다.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 입력을 끝까지 처리합니다.
    pub async fn run(self) -> Result<RunSummary, LogPipelineError> {
        self.run_until_cancelled(CancellationToken::new()).await
    }

    /// 취소 토큰과 함께 실행합니다.
    ///
    /// 실행 중 토큰이 취소되면 [`LogPipelineError::Cancelled`]를 반환합니다.
    /// 이미 쓴 parsed/trap 라인은 남을 수 있지만 리포트는 쓰지 않습니다.
    pub async fn run_until_cancelled(
        self,
        cancel: CancellationToken,
    ) -> Result<RunSummary, LogPipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);
        self.execute(run_id, cancel).instrument(span).await
    }

    async fn execute(
        self,
        run_id: Uuid,
        cancel: CancellationToken,
    ) -> Result<RunSummary, LogPipelineError> {
        let started = Instant::now();
        let Self {
            config,
            source,
            sinks,
            parser,
            router,
        } = self;
        let workers = config.effective_workers();

        tracing::info!(source = %source.describe(), workers, "starting run");

        // 1. 설정 단계: 읽기 전에 입력과 출력을 모두 확보
        let readers = source.partitions().await?;
        if readers.is_empty() {
            return Err(LogPipelineError::Source {
                source_id: source.describe(),
                reason: "source has no partitions".to_owned(),
            });
        }
        let sources = readers.len();

        let parsed_sink = sinks.open(StreamKind::Parsed).await?;
        let trap_sink = sinks.open(StreamKind::Trap).await?;
        let mut report_sink = sinks.open(StreamKind::Report).await?;

        // 2. 스트림별 writer
        let (parsed_tx, parsed_rx) = mpsc::channel(config.channel_capacity);
        let (trap_tx, trap_rx) = mpsc::channel(config.channel_capacity);
        let parsed_writer = tokio::spawn(drain_to_sink(StreamKind::Parsed, parsed_sink, parsed_rx));
        let trap_writer = tokio::spawn(drain_to_sink(StreamKind::Trap, trap_sink, trap_rx));

        // 3. map 단계 + 배리어
        let ctx = WorkerContext {
            parser,
            router,
            parsed_tx,
            trap_tx,
            delimiter: Arc::from(config.record_delimiter.as_str()),
            abort: cancel.child_token(),
        };
        let mapped = map_partitions(readers, workers, ctx).await;

        // writer 실패가 워커의 채널 에러보다 근본 원인이므로 먼저 확인
        let parsed_written = join_writer(StreamKind::Parsed, parsed_writer).await?;
        let trapped_written = join_writer(StreamKind::Trap, trap_writer).await?;
        let totals = mapped?;

        if cancel.is_cancelled() {
            tracing::warn!("run cancelled, report not written");
            return Err(LogPipelineError::Cancelled);
        }

        // 4. 리포트 (배리어 이후에만)
        let lines_read = totals.lines_read;
        let parsed = totals.counts.total();
        let trapped = totals.trapped;
        let report = totals.counts.finish();
        let groups = report.len();

        for entry in &report {
            report_sink
                .write_line(&entry.to_line(&config.report_delimiter))
                .await?;
        }
        report_sink.commit().await?;
        counter!(names::LINES_WRITTEN_TOTAL, names::LABEL_STREAM => StreamKind::Report.as_str())
            .increment(groups as u64);

        debug_assert_eq!(parsed, parsed_written);
        debug_assert_eq!(trapped, trapped_written);

        let elapsed = started.elapsed();
        gauge!(names::REPORT_GROUPS).set(groups as f64);
        histogram!(names::RUN_DURATION_SECONDS).record(elapsed.as_secs_f64());

        let summary = RunSummary {
            run_id,
            sources,
            lines_read,
            parsed,
            trapped,
            groups,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        };

        tracing::info!(
            sources,
            lines_read,
            parsed,
            trapped,
            groups,
            elapsed_ms = summary.elapsed_ms,
            "run completed"
        );

        Ok(summary)
    }
}

/// 워커가 공유하는 읽기 전용 컨텍스트
#[derive(Clone)]
struct WorkerContext {
    parser: SyslogParser,
    router: TrapRouter,
    parsed_tx: mpsc::Sender<String>,
    trap_tx: mpsc::Sender<String>,
    delimiter: Arc<str>,
    abort: CancellationToken,
}

/// 워커 하나(또는 병합된 전체)의 결과
#[derive(Debug, Default)]
struct MapTotals {
    counts: Aggregator,
    lines_read: u64,
    trapped: u64,
}

impl MapTotals {
    fn merge(&mut self, other: MapTotals) {
        self.counts.merge(other.counts);
        self.lines_read += other.lines_read;
        self.trapped += other.trapped;
    }
}

type WorkerResult = Result<Result<MapTotals, LogPipelineError>, JoinError>;

/// 파티션마다 워커 태스크를 띄우되 동시에 최대 `workers`개만 실행합니다.
///
/// 첫 에러가 발생하면 남은 워커를 중단시키고 그 에러를 반환합니다.
async fn map_partitions<R>(
    readers: Vec<R>,
    workers: usize,
    ctx: WorkerContext,
) -> Result<MapTotals, LogPipelineError>
where
    R: LineReader + 'static,
{
    let abort = ctx.abort.clone();
    let mut join_set = JoinSet::new();
    let mut totals = MapTotals::default();
    let mut first_error: Option<LogPipelineError> = None;

    let mut absorb = |joined: WorkerResult, totals: &mut MapTotals| {
        let outcome = joined.unwrap_or_else(|e| Err(LogPipelineError::Worker(e.to_string())));
        match outcome {
            Ok(partial) => totals.merge(partial),
            Err(err) => {
                if first_error.is_none() {
                    abort.cancel();
                    first_error = Some(err);
                }
            }
        }
    };

    for reader in readers {
        while join_set.len() >= workers {
            match join_set.join_next().await {
                Some(joined) => absorb(joined, &mut totals),
                None => break,
            }
        }
        if ctx.abort.is_cancelled() {
            break;
        }
        join_set.spawn(read_partition(reader, ctx.clone()));
    }

    // writer가 종료될 수 있도록 송신측 원본을 먼저 놓음
    drop(ctx);

    while let Some(joined) = join_set.join_next().await {
        absorb(joined, &mut totals);
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(totals),
    }
}

/// 파티션 하나를 끝까지 읽어 parsed/trap 채널로 보내고 부분 집계를 반환합니다.
async fn read_partition<R: LineReader>(
    mut reader: R,
    ctx: WorkerContext,
) -> Result<MapTotals, LogPipelineError> {
    let source_id = reader.source_id().to_owned();
    tracing::debug!(source = %source_id, "reading partition");

    let mut totals = MapTotals::default();
    loop {
        let next = tokio::select! {
            biased;
            () = ctx.abort.cancelled() => return Err(LogPipelineError::Cancelled),
            next = reader.next_line() => next?,
        };
        let Some(line) = next else {
            break;
        };
        totals.lines_read += 1;

        match ctx.router.route(ctx.parser.parse(line)) {
            Route::Parsed(record) => {
                let record = normalize(record);
                totals.counts.observe(&record);
                ctx.parsed_tx
                    .send(record.to_line(&ctx.delimiter))
                    .await
                    .map_err(|_| closed(StreamKind::Parsed))?;
            }
            Route::Trapped(trap) => {
                totals.trapped += 1;
                ctx.trap_tx
                    .send(trap.to_line(&ctx.delimiter))
                    .await
                    .map_err(|_| closed(StreamKind::Trap))?;
            }
        }
    }

    counter!(names::SOURCES_READ_TOTAL).increment(1);
    counter!(names::LINES_READ_TOTAL).increment(totals.lines_read);
    counter!(names::RECORDS_PARSED_TOTAL).increment(totals.counts.total());
    counter!(names::RECORDS_TRAPPED_TOTAL).increment(totals.trapped);

    tracing::debug!(
        source = %source_id,
        lines = totals.lines_read,
        trapped = totals.trapped,
        "partition done"
    );
    Ok(totals)
}

fn closed(kind: StreamKind) -> LogPipelineError {
    LogPipelineError::Channel(format!("{kind} writer closed"))
}

/// 채널이 닫힐 때까지 라인을 싱크에 쓰고 커밋합니다.
async fn drain_to_sink<K: OutputSink>(
    kind: StreamKind,
    mut sink: K,
    mut rx: mpsc::Receiver<String>,
) -> Result<u64, LogPipelineError> {
    let mut written = 0u64;
    while let Some(line) = rx.recv().await {
        sink.write_line(&line).await?;
        written += 1;
    }
    sink.commit().await?;

    counter!(names::LINES_WRITTEN_TOTAL, names::LABEL_STREAM => kind.as_str()).increment(written);
    Ok(written)
}

async fn join_writer(
    kind: StreamKind,
    handle: JoinHandle<Result<u64, LogPipelineError>>,
) -> Result<u64, LogPipelineError> {
    handle
        .await
        .map_err(|e| LogPipelineError::Worker(format!("{kind} writer failed: {e}")))?
}

/// 로그 파이프라인 빌더
#[derive(Default)]
pub struct LogPipelineBuilder {
    config: PipelineConfig,
}

impl LogPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 설정의 경로로 파일 소스/싱크를 구성해 파이프라인을 빌드합니다.
    pub fn build(self) -> Result<LogPipeline<FileSource, FileSinkProvider>, LogPipelineError> {
        self.config.validate()?;

        let source = FileSource::new(&self.config.input).with_excluded([
            &self.config.parsed_output,
            &self.config.trap_output,
            &self.config.report_output,
        ]);
        let sinks = FileSinkProvider::new(
            &self.config.parsed_output,
            &self.config.trap_output,
            &self.config.report_output,
        );
        self.assemble(source, sinks)
    }

    /// 소스/싱크를 직접 주입해 파이프라인을 빌드합니다.
    ///
    /// 설정의 경로 필드는 사용하지 않습니다.
    pub fn build_with<S, P>(self, source: S, sinks: P) -> Result<LogPipeline<S, P>, LogPipelineError>
    where
        S: LineSource,
        P: SinkProvider,
    {
        self.config.validate_tuning()?;
        self.assemble(source, sinks)
    }

    fn assemble<S, P>(self, source: S, sinks: P) -> Result<LogPipeline<S, P>, LogPipelineError> {
        let parser = SyslogParser::new()?.with_max_line_length(self.config.max_line_length);
        Ok(LogPipeline {
            config: self.config,
            source,
            sinks,
            parser,
            router: TrapRouter::new(),
        })
    }
}
