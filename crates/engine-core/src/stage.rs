use serde::Serialize;
use std::fmt;

/// Lifecycle of a purge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PurgeStage {
    Init,
    DiscoverOldest,
    ComputeWindow,
    Running,
    Summarize,
    Done,
    Failed,
}

impl PurgeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurgeStage::Init => "Init",
            PurgeStage::DiscoverOldest => "DiscoverOldest",
            PurgeStage::ComputeWindow => "ComputeWindow",
            PurgeStage::Running => "Running",
            PurgeStage::Summarize => "Summarize",
            PurgeStage::Done => "Done",
            PurgeStage::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PurgeStage::Done | PurgeStage::Failed)
    }

    /// Whether the run may move from `self` to `next`.
    pub fn can_advance_to(&self, next: PurgeStage) -> bool {
        use PurgeStage::*;
        matches!(
            (self, next),
            (Init, DiscoverOldest)
                | (Init, ComputeWindow)
                | (Init, Failed)
                | (DiscoverOldest, ComputeWindow)
                | (DiscoverOldest, Failed)
                | (ComputeWindow, Running)
                | (ComputeWindow, Summarize)
                | (ComputeWindow, Failed)
                | (Running, Summarize)
                | (Running, Failed)
                | (Summarize, Done)
        )
    }
}

impl fmt::Display for PurgeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
