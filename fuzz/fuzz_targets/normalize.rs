#![no_main]

use logtally_log_pipeline::normalize::normalize_process;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    // 어떤 입력에도 패닉 없이 대괄호 없는 이름을 반환해야 한다
    let name = normalize_process(&raw);
    assert!(!name.contains('['));
});
