//! 메모리 싱크
//!
//! 라인은 싱크 안에 쌓였다가 커밋될 때만 공유 저장소로 옮겨집니다.
//! 따라서 커밋되지 않은 스트림은 [`MemorySinkProvider::lines`]에 나타나지 않습니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use logtally_core::error::{LogTallyError, SinkError};
use logtally_core::pipeline::{OutputSink, SinkProvider};
use logtally_core::types::StreamKind;

type Store = Arc<Mutex<HashMap<StreamKind, Vec<String>>>>;

/// 스트림별 커밋된 라인을 메모리에 보관하는 싱크 공급자
#[derive(Debug, Clone, Default)]
pub struct MemorySinkProvider {
    store: Store,
    fail_open: Option<StreamKind>,
    fail_write: Option<StreamKind>,
}

impl MemorySinkProvider {
    /// 빈 공급자를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지정한 스트림을 열 때 실패하도록 설정합니다.
    pub fn failing_open(mut self, kind: StreamKind) -> Self {
        self.fail_open = Some(kind);
        self
    }

    /// 지정한 스트림에 쓸 때 실패하도록 설정합니다.
    pub fn failing_write(mut self, kind: StreamKind) -> Self {
        self.fail_write = Some(kind);
        self
    }

    /// 스트림에 커밋된 라인을 반환합니다. 커밋되지 않았으면 `None`입니다.
    pub fn lines(&self, kind: StreamKind) -> Option<Vec<String>> {
        lock(&self.store).get(&kind).cloned()
    }

    /// 스트림이 커밋되었는지 확인합니다.
    pub fn is_committed(&self, kind: StreamKind) -> bool {
        lock(&self.store).contains_key(&kind)
    }
}

fn lock(store: &Store) -> MutexGuard<'_, HashMap<StreamKind, Vec<String>>> {
    // 테스트 중 패닉으로 poison 되어도 내용은 그대로 사용
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SinkProvider for MemorySinkProvider {
    type Sink = MemorySink;

    async fn open(&self, kind: StreamKind) -> Result<MemorySink, LogTallyError> {
        if self.fail_open == Some(kind) {
            return Err(SinkError::Create {
                stream: kind.to_string(),
                path: "memory".to_owned(),
                reason: "open refused".to_owned(),
            }
            .into());
        }

        Ok(MemorySink {
            kind,
            lines: Vec::new(),
            store: Arc::clone(&self.store),
            fail_write: self.fail_write == Some(kind),
        })
    }
}

/// [`MemorySinkProvider`]가 여는 싱크
#[derive(Debug)]
pub struct MemorySink {
    kind: StreamKind,
    lines: Vec<String>,
    store: Store,
    fail_write: bool,
}

impl OutputSink for MemorySink {
    async fn write_line(&mut self, line: &str) -> Result<(), LogTallyError> {
        if self.fail_write {
            return Err(SinkError::Write {
                stream: self.kind.to_string(),
                reason: "write refused".to_owned(),
            }
            .into());
        }
        self.lines.push(line.to_owned());
        Ok(())
    }

    async fn commit(self) -> Result<(), LogTallyError> {
        lock(&self.store).insert(self.kind, self.lines);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn committed_lines_are_visible() {
        let provider = MemorySinkProvider::new();
        let mut sink = provider.open(StreamKind::Parsed).await.unwrap();
        sink.write_line("one").await.unwrap();
        sink.write_line("two").await.unwrap();
        assert!(provider.lines(StreamKind::Parsed).is_none());

        sink.commit().await.unwrap();
        assert_eq!(
            provider.lines(StreamKind::Parsed),
            Some(vec!["one".to_owned(), "two".to_owned()])
        );
        assert!(!provider.is_committed(StreamKind::Report));
    }

    #[tokio::test]
    async fn dropped_sink_is_never_committed() {
        let provider = MemorySinkProvider::new();
        let mut sink = provider.open(StreamKind::Report).await.unwrap();
        sink.write_line("sshd,2").await.unwrap();
        drop(sink);
        assert!(!provider.is_committed(StreamKind::Report));
    }

    #[tokio::test]
    async fn failure_injection() {
        let provider = MemorySinkProvider::new()
            .failing_open(StreamKind::Report)
            .failing_write(StreamKind::Trap);

        assert!(provider.open(StreamKind::Report).await.is_err());

        let mut trap = provider.open(StreamKind::Trap).await.unwrap();
        let err = trap.write_line("0\tx").await.unwrap_err();
        assert!(matches!(err, LogTallyError::Sink(SinkError::Write { .. })));

        let mut parsed = provider.open(StreamKind::Parsed).await.unwrap();
        assert!(parsed.write_line("ok").await.is_ok());
    }
}
