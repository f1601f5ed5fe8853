//! 소스/싱크 trait: 파이프라인 외부 협력자의 확장 포인트 정의
//!
//! 파서/정규화/집계 로직은 이 trait들만 바라보므로, 로컬 파일 구현과
//! 다른 실행 환경의 구현이 같은 코어 로직을 공유할 수 있습니다.

use std::future::Future;

use crate::error::LogTallyError;
use crate::types::{RawLine, StreamKind};

/// 단일 소스 파티션(예: 파일 하나)에서 라인을 순서대로 읽는 trait
pub trait LineReader: Send {
    /// 파티션 식별자
    fn source_id(&self) -> &str;

    /// 다음 라인을 읽습니다. 파티션 끝에 도달하면 `None`을 반환합니다.
    fn next_line(
        &mut self,
    ) -> impl Future<Output = Result<Option<RawLine>, LogTallyError>> + Send;
}

/// 입력 라인 소스 trait
///
/// 새로운 입력 저장소를 지원하려면 이 trait을 구현합니다.
/// 파티션 간 순서는 보장되지 않으며, 파티션은 서로 다른 워커에서 병렬로 읽힐 수 있습니다.
pub trait LineSource: Send + Sync {
    /// 파티션 리더 타입
    type Reader: LineReader + 'static;

    /// 로그/에러 메시지에 사용할 소스 설명
    fn describe(&self) -> String;

    /// 읽을 파티션 목록을 열거합니다.
    fn partitions(
        &self,
    ) -> impl Future<Output = Result<Vec<Self::Reader>, LogTallyError>> + Send;
}

/// 라인 단위 출력 싱크 trait
pub trait OutputSink: Send {
    /// 라인 하나를 씁니다 (개행은 싱크가 붙입니다).
    fn write_line(&mut self, line: &str) -> impl Future<Output = Result<(), LogTallyError>> + Send;

    /// 버퍼를 비우고 출력을 확정합니다.
    ///
    /// 커밋되지 않고 drop된 싱크의 내용은 유효한 출력으로 간주되지 않습니다.
    fn commit(self) -> impl Future<Output = Result<(), LogTallyError>> + Send;
}

/// 스트림 종류별 출력 싱크를 여는 trait
pub trait SinkProvider: Send + Sync {
    /// 싱크 타입
    type Sink: OutputSink + 'static;

    /// 지정한 스트림의 싱크를 엽니다.
    fn open(
        &self,
        kind: StreamKind,
    ) -> impl Future<Output = Result<Self::Sink, LogTallyError>> + Send;
}
