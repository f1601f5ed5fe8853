#![no_main]

use logtally_core::types::RawLine;
use logtally_log_pipeline::SyslogParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(parser) = SyslogParser::new() else {
        return;
    };
    let text = String::from_utf8_lossy(data).into_owned();

    // 파싱 실패 시 원본 텍스트가 그대로 보존되어야 한다
    if let Err(failure) = parser.parse(RawLine::new("fuzz", 0, text.clone())) {
        assert_eq!(failure.line.text, text);
    }
});
