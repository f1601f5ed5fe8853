//! 파일 기반 라인 소스
//!
//! 입력 경로 해석 규칙:
//! - 일반 파일: 그 파일 하나
//! - 디렉토리: 바로 아래의 일반 파일 전부 (재귀 없음)
//! - 마지막 경로 요소에 `*` 또는 `?`가 있으면 상위 디렉토리에서 와일드카드 매칭
//!
//! 디렉토리/와일드카드 열거 시 `.` 또는 `_`로 시작하는 숨김 파일은 건너뜁니다.
//! [`FileSource::with_excluded`]로 지정한 경로(같은 실행의 출력 파일)도 제외합니다.
//! 해석 결과가 비어 있으면 [`SourceError::NoMatch`]로 실패합니다.

use std::path::{Path, PathBuf};

use regex::Regex;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use logtally_core::error::{LogTallyError, SourceError};
use logtally_core::pipeline::{LineReader, LineSource};
use logtally_core::types::RawLine;

use super::decode_line;

/// 로컬 파일 시스템 소스
#[derive(Debug, Clone)]
pub struct FileSource {
    input: PathBuf,
    /// 입력에서 제외할 경로 (정규화 후 비교)
    excluded: Vec<PathBuf>,
}

impl FileSource {
    /// 입력 경로(파일, 디렉토리, 와일드카드)로 소스를 생성합니다.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            excluded: Vec::new(),
        }
    }

    /// 입력 해석 결과에서 제외할 경로를 지정합니다.
    ///
    /// 출력 파일이 입력 디렉토리 안에 있을 때 다음 실행에서 입력으로 다시
    /// 읽히지 않도록 합니다. 표기가 달라도 같은 파일이면 제외됩니다.
    pub fn with_excluded<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.excluded.extend(paths.into_iter().map(Into::into));
        self
    }

    /// 입력 경로를 반환합니다.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// 입력 경로를 파일 목록으로 해석합니다. 결과는 경로 순으로 정렬됩니다.
    pub async fn resolve(&self) -> Result<Vec<PathBuf>, LogTallyError> {
        let mut files = match tokio::fs::metadata(&self.input).await {
            Ok(meta) if meta.is_dir() => list_dir(&self.input, |_| true).await?,
            Ok(_) => vec![self.input.clone()],
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match wildcard_parts(&self.input) {
                    Some((dir, pattern)) => {
                        let matcher = wildcard_regex(&pattern)?;
                        list_dir(&dir, |name| matcher.is_match(name)).await?
                    }
                    None => Vec::new(),
                }
            }
            Err(e) => return Err(unreadable(&self.input, &e)),
        };

        if !self.excluded.is_empty() {
            files = self.drop_excluded(files).await;
        }

        if files.is_empty() {
            return Err(SourceError::NoMatch {
                pattern: self.input.display().to_string(),
            }
            .into());
        }

        files.sort();
        Ok(files)
    }

    async fn drop_excluded(&self, files: Vec<PathBuf>) -> Vec<PathBuf> {
        // 아직 없는 경로는 입력 목록에도 있을 수 없음
        let mut excluded = Vec::with_capacity(self.excluded.len());
        for path in &self.excluded {
            if let Ok(canonical) = tokio::fs::canonicalize(path).await {
                excluded.push(canonical);
            }
        }
        if excluded.is_empty() {
            return files;
        }

        let mut kept = Vec::with_capacity(files.len());
        for file in files {
            let is_excluded = match tokio::fs::canonicalize(&file).await {
                Ok(canonical) => excluded.contains(&canonical),
                Err(_) => false,
            };
            if is_excluded {
                tracing::debug!(path = %file.display(), "skipping output file in input set");
            } else {
                kept.push(file);
            }
        }
        kept
    }
}

impl LineSource for FileSource {
    type Reader = FileReader;

    fn describe(&self) -> String {
        self.input.display().to_string()
    }

    async fn partitions(&self) -> Result<Vec<FileReader>, LogTallyError> {
        let files = self.resolve().await?;
        tracing::debug!(input = %self.input.display(), files = files.len(), "input resolved");
        Ok(files.into_iter().map(FileReader::new).collect())
    }
}

/// 파일 하나를 라인 단위로 읽는 리더
///
/// 파일은 첫 `next_line` 호출 시 열리며, 끝에 도달하면 닫힙니다.
#[derive(Debug)]
pub struct FileReader {
    path: PathBuf,
    source_id: String,
    reader: Option<BufReader<File>>,
    offset: u64,
    buf: Vec<u8>,
    finished: bool,
}

impl FileReader {
    /// 파일 경로로 리더를 생성합니다.
    pub fn new(path: PathBuf) -> Self {
        let source_id = path.display().to_string();
        Self {
            path,
            source_id,
            reader: None,
            offset: 0,
            buf: Vec::new(),
            finished: false,
        }
    }
}

impl LineReader for FileReader {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn next_line(&mut self) -> Result<Option<RawLine>, LogTallyError> {
        if self.finished {
            return Ok(None);
        }

        if self.reader.is_none() {
            let file = File::open(&self.path)
                .await
                .map_err(|e| unreadable(&self.path, &e))?;
            self.reader = Some(BufReader::new(file));
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        self.buf.clear();
        let read = reader
            .read_until(b'\n', &mut self.buf)
            .await
            .map_err(|e| unreadable(&self.path, &e))?;

        if read == 0 {
            self.finished = true;
            self.reader = None;
            return Ok(None);
        }

        let offset = self.offset;
        self.offset += read as u64;
        Ok(Some(RawLine::new(
            self.source_id.clone(),
            offset,
            decode_line(&self.buf),
        )))
    }
}

fn unreadable(path: &Path, err: &std::io::Error) -> LogTallyError {
    SourceError::Unreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

/// 디렉토리 바로 아래의 숨김이 아닌 일반 파일 중 `accept`를 통과한 것만 반환합니다.
async fn list_dir<F>(dir: &Path, accept: F) -> Result<Vec<PathBuf>, LogTallyError>
where
    F: Fn(&str) -> bool,
{
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(unreadable(dir, &e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| unreadable(dir, &e))? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if is_hidden(name) || !accept(name) {
            continue;
        }
        // 심볼릭 링크는 대상 기준으로 판단
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// 마지막 요소에 와일드카드가 있으면 (상위 디렉토리, 패턴)으로 분리합니다.
fn wildcard_parts(input: &Path) -> Option<(PathBuf, String)> {
    let name = input.file_name()?.to_str()?;
    if !name.contains(['*', '?']) {
        return None;
    }
    let dir = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, name.to_owned()))
}

/// `*`(임의 길이), `?`(한 글자)만 지원하는 와일드카드를 정규식으로 변환합니다.
fn wildcard_regex(pattern: &str) -> Result<Regex, LogTallyError> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut literal = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut literal))),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|e| {
        SourceError::Unreadable {
            path: pattern.to_owned(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    async fn read_all(reader: &mut FileReader) -> Vec<RawLine> {
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn wildcard_matching() {
        let re = wildcard_regex("messages.*").unwrap();
        assert!(re.is_match("messages.1"));
        assert!(re.is_match("messages."));
        assert!(!re.is_match("messages"));
        assert!(!re.is_match("old-messages.1"));

        let re = wildcard_regex("log?.txt").unwrap();
        assert!(re.is_match("log1.txt"));
        assert!(!re.is_match("log12.txt"));
        assert!(!re.is_match("log1xtxt"));
    }

    #[test]
    fn wildcard_parts_only_for_last_component() {
        assert!(wildcard_parts(Path::new("/var/log/messages")).is_none());
        let (dir, pattern) = wildcard_parts(Path::new("/var/log/*.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(pattern, "*.log");

        let (dir, _) = wildcard_parts(Path::new("*.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
    }

    #[tokio::test]
    async fn resolve_single_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "messages", "x\n");
        let files = FileSource::new(&path).resolve().await.unwrap();
        assert_eq!(files, vec![path]);
    }

    #[tokio::test]
    async fn resolve_directory_skips_hidden_and_subdirs() {
        let dir = TempDir::new().unwrap();
        let b = write(&dir, "b.log", "");
        let a = write(&dir, "a.log", "");
        write(&dir, ".hidden", "");
        write(&dir, "_SUCCESS", "");
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = FileSource::new(dir.path()).resolve().await.unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[tokio::test]
    async fn resolve_wildcard() {
        let dir = TempDir::new().unwrap();
        let one = write(&dir, "messages.1", "");
        let two = write(&dir, "messages.2", "");
        write(&dir, "secure.1", "");

        let source = FileSource::new(dir.path().join("messages.*"));
        assert_eq!(source.resolve().await.unwrap(), vec![one, two]);
    }

    #[tokio::test]
    async fn missing_path_is_no_match() {
        let dir = TempDir::new().unwrap();
        let err = FileSource::new(dir.path().join("absent"))
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(err, LogTallyError::Source(SourceError::NoMatch { .. })));
    }

    #[tokio::test]
    async fn wildcard_without_matches_is_no_match() {
        let dir = TempDir::new().unwrap();
        write(&dir, "other.txt", "");
        let err = FileSource::new(dir.path().join("*.log"))
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(err, LogTallyError::Source(SourceError::NoMatch { .. })));
    }

    #[tokio::test]
    async fn empty_directory_is_no_match() {
        let dir = TempDir::new().unwrap();
        let err = FileSource::new(dir.path()).resolve().await.unwrap_err();
        assert!(matches!(err, LogTallyError::Source(SourceError::NoMatch { .. })));
    }

    #[tokio::test]
    async fn resolve_directory_skips_excluded_outputs() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.log", "");
        write(&dir, "parsed", "");
        write(&dir, "trap", "");

        // 다른 표기의 같은 경로, 아직 없는 경로 포함
        let source = FileSource::new(dir.path()).with_excluded([
            dir.path().join("parsed"),
            dir.path().join(".").join("trap"),
            dir.path().join("report"),
        ]);
        assert_eq!(source.resolve().await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn resolve_wildcard_skips_excluded_outputs() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "run.a", "");
        write(&dir, "run.out", "");

        let source = FileSource::new(dir.path().join("run.*"))
            .with_excluded([dir.path().join("run.out")]);
        assert_eq!(source.resolve().await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn excluding_every_file_is_no_match() {
        let dir = TempDir::new().unwrap();
        let only = write(&dir, "parsed", "");

        let err = FileSource::new(dir.path())
            .with_excluded([only])
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(err, LogTallyError::Source(SourceError::NoMatch { .. })));
    }

    #[tokio::test]
    async fn reader_tracks_offsets_and_strips_crlf() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "messages", "first\r\nsecond\n\nlast");
        let mut reader = FileReader::new(path.clone());
        assert_eq!(reader.source_id(), path.display().to_string());

        let lines = read_all(&mut reader).await;
        let pairs: Vec<_> = lines.iter().map(|l| (l.offset, l.text.as_str())).collect();
        assert_eq!(pairs, vec![(0, "first"), (7, "second"), (14, ""), (15, "last")]);

        // 끝에 도달한 뒤에도 계속 None
        assert!(reader.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reader_decodes_invalid_utf8_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary");
        std::fs::write(&path, b"ok\xff\n").unwrap();

        let lines = read_all(&mut FileReader::new(path)).await;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.starts_with("ok"));
    }

    #[tokio::test]
    async fn reader_on_deleted_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let mut reader = FileReader::new(dir.path().join("gone"));
        let err = reader.next_line().await.unwrap_err();
        assert!(matches!(err, LogTallyError::Source(SourceError::Unreadable { .. })));
    }

    #[tokio::test]
    async fn partitions_one_reader_per_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a", "1\n");
        write(&dir, "b", "2\n");
        let source = FileSource::new(dir.path());
        let readers = source.partitions().await.unwrap();
        assert_eq!(readers.len(), 2);
        assert!(readers[0].source_id().ends_with('a'));
    }
}
