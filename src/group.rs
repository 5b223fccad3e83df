//! Compilation Group Balancer
//!
//! Merges the instantiations of one kind into a bounded number of compilation
//! units. Starting from one group with every instance, the largest group is
//! split repeatedly on its most common hierarchy label that is not shared by
//! all of its members, until the target count is reached or nothing can be
//! split any more.
//!
//! Ordering follows a stable ascending sort that is then reversed, both for
//! label counts and for group sizes. Among labels with equal counts the last
//! discovered one wins, and among groups of equal size the later one is split
//! first.

use std::collections::HashMap;

use tracing::trace;

use crate::expand::Instance;
use crate::naming;

/// Grouping parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingOptions {
    /// Maximum number of groups per kind
    pub target: usize,
    /// Kinds with fewer instances than this are left ungrouped
    pub threshold: usize,
}

impl GroupingOptions {
    /// Group into at most `target` units; the threshold defaults to the target
    pub fn new(target: usize) -> Self {
        Self {
            target,
            threshold: target,
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }
}

/// A batch of instances rendered into one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationGroup<'a> {
    pub members: Vec<&'a Instance>,
}

impl<'a> CompilationGroup<'a> {
    /// File stem hashed from member identifiers, so it changes only with membership
    pub fn file_stem(&self) -> String {
        naming::group_file_stem(self.members.iter().map(|m| m.identifier.as_str()))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// How the instances of one kind map onto emitted units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partition<'a> {
    /// Every instance is emitted as its own unit
    Ungrouped,
    /// Instances are merged into these groups
    Grouped(Vec<CompilationGroup<'a>>),
}

impl<'a> Partition<'a> {
    /// Number of units this partition emits for `total` instances
    pub fn unit_count(&self, total: usize) -> usize {
        match self {
            Partition::Ungrouped => total,
            Partition::Grouped(groups) => groups.len(),
        }
    }
}

/// Partition `instances` according to `opts`.
pub fn partition<'a>(instances: &'a [Instance], opts: &GroupingOptions) -> Partition<'a> {
    if instances.is_empty() || instances.len() < opts.threshold {
        return Partition::Ungrouped;
    }

    let mut groups: Vec<Vec<&'a Instance>> = vec![instances.iter().collect()];
    while groups.len() < opts.target {
        if groups[0].len() <= 1 {
            break;
        }
        let Some(label) = split_label(&groups[0]) else {
            break;
        };

        let largest = groups.remove(0);
        let (head, tail): (Vec<_>, Vec<_>) =
            largest.into_iter().partition(|inst| inst.has_label(label));
        trace!(label, head = head.len(), tail = tail.len(), "split group");
        groups.push(head);
        groups.push(tail);

        groups.sort_by_key(Vec::len);
        groups.reverse();
    }

    Partition::Grouped(
        groups
            .into_iter()
            .map(|members| CompilationGroup { members })
            .collect(),
    )
}

/// Most common label that does not occur in every member.
fn split_label<'a>(members: &[&'a Instance]) -> Option<&'a str> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for inst in members.iter().copied() {
        for label in &inst.hierarchy {
            let slot = *index.entry(label.as_str()).or_insert_with(|| {
                counts.push((label.as_str(), 0));
                counts.len() - 1
            });
            counts[slot].1 += 1;
        }
    }

    counts.sort_by_key(|&(_, count)| count);
    counts.reverse();
    // A label repeated inside one hierarchy can outnumber the members while
    // still occurring in all of them; splitting on it would leave an empty side.
    counts
        .into_iter()
        .filter(|&(_, count)| count != members.len())
        .map(|(label, _)| label)
        .find(|label| !members.iter().all(|inst| inst.has_label(label)))
}
