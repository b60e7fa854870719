#![no_main]

use std::sync::OnceLock;

use ergo_lang::{AnalysisEnv, FsRepository, KnowledgeBase, analyze_document};
use libfuzzer_sys::fuzz_target;

fn knowledge() -> Option<&'static KnowledgeBase> {
    static KNOWLEDGE: OnceLock<Option<KnowledgeBase>> = OnceLock::new();
    KNOWLEDGE.get_or_init(|| KnowledgeBase::builtin().ok()).as_ref()
}

fuzz_target!(|data: &[u8]| {
    let Some(knowledge) = knowledge() else {
        return;
    };
    let input = String::from_utf8_lossy(data);
    let repository = FsRepository::new(vec![std::env::temp_dir().join("easyergo-fuzz-empty")]);
    let env = AnalysisEnv::new(knowledge, &repository);
    let _ = analyze_document(input.as_ref(), "fuzz-1.0.eb", &env);
});
