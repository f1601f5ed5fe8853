//! 입력 수집 모듈 -- 라인 소스 구현
//!
//! # 소스
//! - [`FileSource`]: 로컬 파일/디렉토리/와일드카드 경로
//! - [`MemorySource`]: 메모리 내 텍스트 (테스트, 임베딩용)
//!
//! 두 소스 모두 [`LineSource`](logtally_core::pipeline::LineSource)를 구현하며,
//! 파티션(파일) 하나를 하나의 [`LineReader`](logtally_core::pipeline::LineReader)로 노출합니다.
//! 라인 분리 규칙은 공통입니다: `\n`으로 자르고, 끝의 `\r`은 제거하고,
//! 잘못된 UTF-8은 대체 문자로 바꿉니다.

pub mod file;
pub mod memory;

pub use file::{FileReader, FileSource};
pub use memory::{MemoryReader, MemorySource};

/// 개행을 포함할 수 있는 원시 바이트에서 라인 텍스트를 만듭니다.
pub(crate) fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_newline() {
        assert_eq!(decode_line(b"hello\n"), "hello");
    }

    #[test]
    fn decode_strips_crlf() {
        assert_eq!(decode_line(b"hello\r\n"), "hello");
    }

    #[test]
    fn decode_keeps_inner_carriage_return() {
        assert_eq!(decode_line(b"a\rb\n"), "a\rb");
    }

    #[test]
    fn decode_without_newline() {
        assert_eq!(decode_line(b"last line"), "last line");
    }

    #[test]
    fn decode_replaces_invalid_utf8() {
        let text = decode_line(b"ok \xff\xfe end\n");
        assert!(text.starts_with("ok "));
        assert!(text.ends_with(" end"));
        assert!(text.contains('\u{FFFD}'));
    }
}
