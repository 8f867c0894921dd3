//! Reply-chain linking.
//!
//! An explicit reply overrides elapsed time: if a message quotes a message in
//! another group, the two groups merge no matter how far apart they are.
//! Connected groups collapse transitively through the disjoint-set.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::context::ClusterContext;
use crate::group::{merge_components, DisjointSet, Group};
use crate::pipeline::ClusterStats;
use crate::stage::{GroupStage, StageKind};

/// Merges groups connected by `quoted_id` edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyChainLinker;

impl ReplyChainLinker {
    pub fn new() -> Self {
        Self
    }
}

impl GroupStage for ReplyChainLinker {
    fn kind(&self) -> StageKind {
        StageKind::ReplyChain
    }

    #[instrument(skip_all, fields(groups = groups.len()))]
    fn transform(
        &self,
        ctx: &ClusterContext<'_>,
        groups: Vec<Group>,
        stats: &mut ClusterStats,
    ) -> Vec<Group> {
        let mut group_of: HashMap<&str, usize> = HashMap::with_capacity(ctx.messages().len());
        for (index, group) in groups.iter().enumerate() {
            for message in ctx.group_messages(group) {
                group_of.insert(message.id.as_str(), index);
            }
        }

        let mut sets = DisjointSet::new(groups.len());
        let mut dangling = 0usize;

        for (index, group) in groups.iter().enumerate() {
            for message in ctx.group_messages(group) {
                let Some(target) = message.reply_target() else {
                    continue;
                };
                match group_of.get(target) {
                    None => {
                        dangling += 1;
                        debug!(
                            message_id = %message.id,
                            quoted_id = %target,
                            "Quoted message not in batch"
                        );
                    }
                    Some(&target_group) if target_group != index => {
                        stats.reply_edges += 1;
                        if sets.union(index, target_group) {
                            debug!(
                                message_id = %message.id,
                                quoted_id = %target,
                                from = index,
                                to = target_group,
                                "Reply links groups"
                            );
                        }
                    }
                    Some(_) => {}
                }
            }
        }

        if dangling > 0 {
            warn!(
                count = dangling,
                "Ignoring replies to messages outside this batch"
            );
        }
        stats.dangling_replies += dangling;

        merge_components(groups, &mut sets)
    }
}
