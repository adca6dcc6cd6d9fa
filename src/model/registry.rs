use crate::error::{Result, WorkerError};

#[derive(Debug, PartialEq, Eq)]
pub struct StemLayout {
    pub count: u32,
    pub stems: &'static [&'static str],
}

const LAYOUTS: &[StemLayout] = &[
    StemLayout {
        count: 2,
        stems: &["vocals", "accompaniment"],
    },
    StemLayout {
        count: 4,
        stems: &["vocals", "drums", "bass", "other"],
    },
    StemLayout {
        count: 5,
        stems: &["vocals", "drums", "bass", "piano", "other"],
    },
    StemLayout {
        count: 6,
        stems: &["vocals", "drums", "bass", "guitar", "piano", "other"],
    },
];

pub const DEFAULT_STEM_COUNT: u32 = 4;

pub fn layouts() -> &'static [StemLayout] {
    LAYOUTS
}

pub fn resolve_layout(stem_count: u32) -> Result<&'static StemLayout> {
    LAYOUTS
        .iter()
        .find(|l| l.count == stem_count)
        .ok_or_else(|| {
            let supported: Vec<String> = LAYOUTS.iter().map(|l| l.count.to_string()).collect();
            WorkerError::InvalidRequest(format!(
                "Unsupported stem count {stem_count} (supported: {})",
                supported.join(", ")
            ))
        })
}
