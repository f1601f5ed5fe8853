//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logtally_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logtally_core::metrics::LINES_READ_TOTAL).increment(1);
//! ```

/// 스트림 레이블 키 (parsed, report, trap)
pub const LABEL_STREAM: &str = "stream";

/// 소스에서 읽은 전체 라인 수 (counter)
pub const LINES_READ_TOTAL: &str = "logtally_lines_read_total";

/// 파싱 + 정규화에 성공한 레코드 수 (counter)
pub const RECORDS_PARSED_TOTAL: &str = "logtally_records_parsed_total";

/// trap으로 보낸 라인 수 (counter)
pub const RECORDS_TRAPPED_TOTAL: &str = "logtally_records_trapped_total";

/// 스트림별로 쓴 라인 수 (counter, label: stream)
pub const LINES_WRITTEN_TOTAL: &str = "logtally_lines_written_total";

/// 읽은 소스 파티션 수 (counter)
pub const SOURCES_READ_TOTAL: &str = "logtally_sources_read_total";

/// 마지막 실행의 리포트 그룹 수 (gauge)
pub const REPORT_GROUPS: &str = "logtally_report_groups";

/// 전체 실행 시간 (histogram, 초)
pub const RUN_DURATION_SECONDS: &str = "logtally_run_duration_seconds";

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(LINES_READ_TOTAL, "Total number of raw lines read from all sources");
    describe_counter!(
        RECORDS_PARSED_TOTAL,
        "Total number of lines parsed and normalized successfully"
    );
    describe_counter!(
        RECORDS_TRAPPED_TOTAL,
        "Total number of lines routed to the trap stream"
    );
    describe_counter!(LINES_WRITTEN_TOTAL, "Lines written per output stream");
    describe_counter!(SOURCES_READ_TOTAL, "Total number of source partitions read");
    describe_gauge!(REPORT_GROUPS, "Number of distinct processes in the last report");
    describe_histogram!(RUN_DURATION_SECONDS, "Wall-clock duration of a pipeline run");
}
