//! 출력 싱크 모듈
//!
//! # 싱크
//! - [`FileSinkProvider`]: 스트림별 로컬 파일. 리포트는 임시 파일에 쓴 뒤 커밋 시 이름을 바꿉니다.
//! - [`MemorySinkProvider`]: 커밋된 라인을 메모리에 보관 (테스트용)
//!
//! 세 스트림(parsed, trap, report)은 서로 다른 대상에 써야 하며,
//! 커밋되지 않은 리포트는 외부에 보이지 않아야 합니다.

pub mod file;
pub mod memory;

pub use file::{FileSink, FileSinkProvider};
pub use memory::{MemorySink, MemorySinkProvider};
