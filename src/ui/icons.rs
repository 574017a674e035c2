//! Shared UI icons and emojis.
//!
//! Each constant falls back to a plain ASCII marker on terminals that cannot
//! show emoji.

use console::Emoji;

use crate::models::StageKind;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[?]");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");

// Stage indicators
pub static UNIT_TEST_BACKEND: Emoji<'_, '_> = Emoji("🧪 ", "[UB]");
pub static UNIT_TEST_FRONTEND: Emoji<'_, '_> = Emoji("🎨 ", "[UF]");
pub static INTEGRATION_TEST_BACKEND: Emoji<'_, '_> = Emoji("🔗 ", "[IB]");
pub static INTEGRATION_TEST_FRONTEND: Emoji<'_, '_> = Emoji("🧩 ", "[IF]");
pub static CODE_QUALITY: Emoji<'_, '_> = Emoji("📋 ", "[CQ]");
pub static PERFORMANCE_TEST: Emoji<'_, '_> = Emoji("⚡ ", "[PF]");
pub static SECURITY_TEST: Emoji<'_, '_> = Emoji("🔒 ", "[SC]");

pub fn stage_icon(kind: StageKind) -> &'static Emoji<'static, 'static> {
    match kind {
        StageKind::UnitTestBackend => &UNIT_TEST_BACKEND,
        StageKind::UnitTestFrontend => &UNIT_TEST_FRONTEND,
        StageKind::IntegrationTestBackend => &INTEGRATION_TEST_BACKEND,
        StageKind::IntegrationTestFrontend => &INTEGRATION_TEST_FRONTEND,
        StageKind::CodeQuality => &CODE_QUALITY,
        StageKind::PerformanceTest => &PERFORMANCE_TEST,
        StageKind::SecurityTest => &SECURITY_TEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_stage_icons_are_distinct() {
        let fallbacks: HashSet<&str> = StageKind::ALL
            .into_iter()
            .map(|kind| stage_icon(kind).1)
            .collect();
        assert_eq!(fallbacks.len(), StageKind::ALL.len());
    }
}
