//! 프로세스별 집계 -- group by process, count, sort by process
//!
//! [`Aggregator`]는 정규화된 레코드를 받아 프로세스별 건수만 유지합니다.
//! 레코드 자체는 보관하지 않으므로 메모리 사용량은 서로 다른 프로세스 수에 비례합니다.
//!
//! 병렬 워커는 각자 부분 집계를 만들고, 모든 워커가 끝난 뒤(배리어)
//! [`Aggregator::merge`]로 합칩니다. 병합은 정수 덧셈이라 결합/교환 법칙이
//! 성립하므로 워커 순서와 무관하게 같은 결과가 나옵니다.

use std::collections::HashMap;

use logtally_core::types::ProcessCount;

use crate::normalize::NormalizedRecord;

/// 프로세스별 부분/전체 집계 상태
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    counts: HashMap<String, u64>,
    total: u64,
}

impl Aggregator {
    /// 빈 집계기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 한 건을 반영합니다.
    pub fn observe(&mut self, record: &NormalizedRecord) {
        self.add(record.process(), 1);
    }

    fn add(&mut self, process: &str, n: u64) {
        match self.counts.get_mut(process) {
            Some(count) => *count += n,
            None => {
                self.counts.insert(process.to_owned(), n);
            }
        }
        self.total += n;
    }

    /// 다른 부분 집계를 합칩니다.
    pub fn merge(&mut self, other: Aggregator) {
        for (process, n) in other.counts {
            match self.counts.get_mut(&process) {
                Some(count) => *count += n,
                None => {
                    self.counts.insert(process, n);
                }
            }
        }
        self.total += other.total;
    }

    /// 지금까지 반영한 레코드 수를 반환합니다.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// 서로 다른 프로세스 수를 반환합니다.
    pub fn group_count(&self) -> usize {
        self.counts.len()
    }

    /// 집계를 끝내고 프로세스명 오름차순으로 정렬된 결과를 반환합니다.
    ///
    /// 그룹 키가 곧 정렬 키이므로 동률이 없고, 결과는 입력 순서와 무관하게 결정됩니다.
    pub fn finish(self) -> Vec<ProcessCount> {
        let mut report: Vec<ProcessCount> = self
            .counts
            .into_iter()
            .map(|(process, count)| ProcessCount { process, count })
            .collect();
        report.sort_unstable_by(|a, b| a.process.cmp(&b.process));
        report
    }
}

/// 정규화된 레코드 시퀀스를 한 번에 집계합니다.
pub fn aggregate<'a, I>(records: I) -> Vec<ProcessCount>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.observe(record);
    }
    aggregator.finish()
}
