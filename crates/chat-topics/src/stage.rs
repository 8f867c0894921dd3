//! Group transformation stages.
//!
//! Each optional clustering step implements `GroupStage`. A disabled step is
//! replaced by `IdentityStage`, so the pipeline runs a fixed list of stages
//! with no per-step flag checks.

use crate::context::ClusterContext;
use crate::group::Group;
use crate::pipeline::ClusterStats;

/// Which step a stage performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Merge groups connected by quoted replies
    ReplyChain,
    /// Merge groups with similar text
    Semantic,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::ReplyChain => write!(f, "reply-chain"),
            StageKind::Semantic => write!(f, "semantic"),
        }
    }
}

/// A `groups -> groups` transformation.
///
/// Implementations must preserve the partition: every input member appears in
/// exactly one output group.
pub trait GroupStage: Send + Sync {
    /// Step this stage performs.
    fn kind(&self) -> StageKind;

    /// Whether this stage changes its input.
    fn is_active(&self) -> bool {
        true
    }

    /// Transform the group partition.
    fn transform(
        &self,
        ctx: &ClusterContext<'_>,
        groups: Vec<Group>,
        stats: &mut ClusterStats,
    ) -> Vec<Group>;
}

/// Stand-in for a disabled stage.
#[derive(Debug, Clone, Copy)]
pub struct IdentityStage {
    kind: StageKind,
}

impl IdentityStage {
    /// Create an identity stage replacing `kind`.
    pub fn new(kind: StageKind) -> Self {
        Self { kind }
    }
}

impl GroupStage for IdentityStage {
    fn kind(&self) -> StageKind {
        self.kind
    }

    fn is_active(&self) -> bool {
        false
    }

    fn transform(
        &self,
        _ctx: &ClusterContext<'_>,
        groups: Vec<Group>,
        _stats: &mut ClusterStats,
    ) -> Vec<Group> {
        groups
    }
}
