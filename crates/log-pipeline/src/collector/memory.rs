//! 메모리 내 라인 소스

use std::sync::Arc;

use logtally_core::error::LogTallyError;
use logtally_core::pipeline::{LineReader, LineSource};
use logtally_core::types::RawLine;

use super::decode_line;

/// 메모리에 올린 텍스트를 파티션 단위로 제공하는 소스
///
/// 파티션마다 하나의 리더가 만들어지며, 오프셋은 파티션 시작 기준 바이트 위치입니다.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    partitions: Vec<(String, Arc<[u8]>)>,
}

impl MemorySource {
    /// 빈 소스를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 텍스트 파티션을 추가합니다.
    pub fn with_partition(self, id: impl Into<String>, text: impl AsRef<str>) -> Self {
        self.with_bytes(id, text.as_ref().as_bytes())
    }

    /// 원시 바이트 파티션을 추가합니다.
    pub fn with_bytes(mut self, id: impl Into<String>, bytes: &[u8]) -> Self {
        self.partitions.push((id.into(), Arc::from(bytes)));
        self
    }

    /// 파티션 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// 파티션이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl LineSource for MemorySource {
    type Reader = MemoryReader;

    fn describe(&self) -> String {
        format!("memory ({} partitions)", self.partitions.len())
    }

    async fn partitions(&self) -> Result<Vec<MemoryReader>, LogTallyError> {
        Ok(self
            .partitions
            .iter()
            .map(|(id, data)| MemoryReader {
                id: id.clone(),
                data: Arc::clone(data),
                pos: 0,
            })
            .collect())
    }
}

/// [`MemorySource`] 파티션 리더
#[derive(Debug)]
pub struct MemoryReader {
    id: String,
    data: Arc<[u8]>,
    pos: usize,
}

impl MemoryReader {
    fn next_raw(&mut self) -> Option<RawLine> {
        let rest = self.data.get(self.pos..).filter(|rest| !rest.is_empty())?;
        let len = rest
            .iter()
            .position(|&b| b == b'\n')
            .map_or(rest.len(), |idx| idx + 1);

        let offset = self.pos as u64;
        let text = decode_line(&rest[..len]);
        self.pos += len;
        Some(RawLine::new(self.id.clone(), offset, text))
    }
}

impl LineReader for MemoryReader {
    fn source_id(&self) -> &str {
        &self.id
    }

    async fn next_line(&mut self) -> Result<Option<RawLine>, LogTallyError> {
        Ok(self.next_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(reader: &mut MemoryReader) -> Vec<RawLine> {
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn lines_carry_byte_offsets() {
        let source = MemorySource::new().with_partition("mem", "ab\ncde\n\nf");
        let mut readers = source.partitions().await.unwrap();
        assert_eq!(readers.len(), 1);

        let lines = drain(&mut readers[0]).await;
        let pairs: Vec<_> = lines.iter().map(|l| (l.offset, l.text.as_str())).collect();
        assert_eq!(pairs, vec![(0, "ab"), (3, "cde"), (7, ""), (8, "f")]);
        assert!(lines.iter().all(|l| l.source == "mem"));
    }

    #[tokio::test]
    async fn empty_partition_yields_nothing() {
        let source = MemorySource::new().with_partition("empty", "");
        let mut readers = source.partitions().await.unwrap();
        assert!(drain(&mut readers[0]).await.is_empty());
        assert!(readers[0].next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn crlf_offsets_count_carriage_return() {
        let source = MemorySource::new().with_partition("win", "a\r\nb\r\n");
        let mut readers = source.partitions().await.unwrap();
        let lines = drain(&mut readers[0]).await;
        assert_eq!(lines[0].text, "a");
        assert_eq!(lines[1].offset, 3);
        assert_eq!(lines[1].text, "b");
    }

    #[tokio::test]
    async fn partitions_are_independent() {
        let source = MemorySource::new()
            .with_partition("one", "x\n")
            .with_partition("two", "y\nz\n");
        assert_eq!(source.len(), 2);
        assert!(source.describe().contains('2'));

        let mut readers = source.partitions().await.unwrap();
        assert_eq!(readers[0].source_id(), "one");
        assert_eq!(drain(&mut readers[1]).await.len(), 2);
        assert_eq!(drain(&mut readers[0]).await.len(), 1);
    }
}
