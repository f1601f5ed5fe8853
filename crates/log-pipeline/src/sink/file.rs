//! 파일 싱크
//!
//! parsed/trap 스트림은 대상 파일을 바로 생성(기존 내용 삭제)해 씁니다.
//! report 스트림은 대상과 같은 디렉토리의 임시 파일에 쓰고,
//! [`commit`](OutputSink::commit) 시점에 대상 경로로 rename 합니다.
//! 커밋 전에 drop 되면 임시 파일은 삭제되고 대상은 건드리지 않습니다.

use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use logtally_core::error::{LogTallyError, SinkError};
use logtally_core::pipeline::{OutputSink, SinkProvider};
use logtally_core::types::StreamKind;

/// 스트림별 출력 경로를 가진 파일 싱크 공급자
#[derive(Debug, Clone)]
pub struct FileSinkProvider {
    parsed: PathBuf,
    trap: PathBuf,
    report: PathBuf,
}

impl FileSinkProvider {
    /// 세 스트림의 출력 경로로 공급자를 생성합니다.
    pub fn new(
        parsed: impl Into<PathBuf>,
        trap: impl Into<PathBuf>,
        report: impl Into<PathBuf>,
    ) -> Self {
        Self {
            parsed: parsed.into(),
            trap: trap.into(),
            report: report.into(),
        }
    }

    /// 스트림의 출력 경로를 반환합니다.
    pub fn path(&self, kind: StreamKind) -> &Path {
        match kind {
            StreamKind::Parsed => &self.parsed,
            StreamKind::Trap => &self.trap,
            StreamKind::Report => &self.report,
        }
    }
}

impl SinkProvider for FileSinkProvider {
    type Sink = FileSink;

    async fn open(&self, kind: StreamKind) -> Result<FileSink, LogTallyError> {
        let target = self.path(kind).to_path_buf();
        let create_err = |reason: String| -> LogTallyError {
            SinkError::Create {
                stream: kind.to_string(),
                path: target.display().to_string(),
                reason,
            }
            .into()
        };

        if tokio::fs::metadata(&target)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            return Err(create_err("target is a directory".to_owned()));
        }

        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| create_err(e.to_string()))?;

        let (file, staged) = match kind {
            StreamKind::Report => {
                let staging_dir = parent.clone();
                let staged = tokio::task::spawn_blocking(move || NamedTempFile::new_in(staging_dir))
                    .await
                    .map_err(|e| create_err(e.to_string()))?
                    .map_err(|e| create_err(e.to_string()))?;
                let (file, path) = staged.into_parts();
                (File::from_std(file), Some(path))
            }
            StreamKind::Parsed | StreamKind::Trap => {
                let file = File::create(&target)
                    .await
                    .map_err(|e| create_err(e.to_string()))?;
                (file, None)
            }
        };

        tracing::debug!(stream = %kind, path = %target.display(), staged = staged.is_some(), "sink opened");

        Ok(FileSink {
            kind,
            target,
            writer: BufWriter::new(file),
            staged,
        })
    }
}

/// 파일 하나에 라인을 쓰는 싱크
#[derive(Debug)]
pub struct FileSink {
    kind: StreamKind,
    target: PathBuf,
    writer: BufWriter<File>,
    /// 커밋 전까지 출력이 머무는 임시 경로 (report 전용)
    staged: Option<TempPath>,
}

impl FileSink {
    fn write_err(&self, err: std::io::Error) -> LogTallyError {
        SinkError::Write {
            stream: self.kind.to_string(),
            reason: err.to_string(),
        }
        .into()
    }
}

impl OutputSink for FileSink {
    async fn write_line(&mut self, line: &str) -> Result<(), LogTallyError> {
        if let Err(e) = self.writer.write_all(line.as_bytes()).await {
            return Err(self.write_err(e));
        }
        if let Err(e) = self.writer.write_all(b"\n").await {
            return Err(self.write_err(e));
        }
        Ok(())
    }

    async fn commit(mut self) -> Result<(), LogTallyError> {
        let commit_err = |reason: String| -> LogTallyError {
            SinkError::Commit {
                stream: self.kind.to_string(),
                reason,
            }
            .into()
        };

        self.writer
            .flush()
            .await
            .map_err(|e| commit_err(e.to_string()))?;
        self.writer
            .get_mut()
            .sync_all()
            .await
            .map_err(|e| commit_err(e.to_string()))?;

        if let Some(staged) = self.staged.take() {
            let target = self.target.clone();
            tokio::task::spawn_blocking(move || staged.persist(target))
                .await
                .map_err(|e| commit_err(e.to_string()))?
                .map_err(|e| commit_err(e.error.to_string()))?;
        }

        tracing::debug!(stream = %self.kind, path = %self.target.display(), "sink committed");
        Ok(())
    }
}
