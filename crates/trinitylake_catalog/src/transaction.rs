#[cfg(test)]
#[path = "transaction_test.rs"]
mod transaction_test;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::node::TreeNode;
use crate::version::RootVersion;

/// Isolation level requested for a transaction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IsolationLevel {
    /// Reads see the snapshot captured at begin; writers race optimistically
    /// at commit.
    #[default]
    Snapshot,
}

/// Options for beginning a transaction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TransactionOptions {
    /// The requested isolation level.
    pub isolation_level: IsolationLevel,
}

/// An in-flight transaction: the root snapshot observed at begin and the
/// private working copy carrying the transaction's mutations.
///
/// The beginning root is never mutated; the running root is a clone owned by
/// this transaction alone, so concurrent transactions cannot observe each
/// other until one of them commits.
#[derive(Clone, Debug)]
pub struct RunningTransaction {
    id: String,
    began_at: DateTime<Utc>,
    beginning_version: RootVersion,
    beginning_root: TreeNode,
    running_root: TreeNode,
    isolation_level: IsolationLevel,
}

impl RunningTransaction {
    pub(crate) fn new(
        beginning_version: RootVersion,
        beginning_root: TreeNode,
        options: TransactionOptions,
    ) -> Self {
        let running_root = beginning_root.clone();
        Self {
            id: Uuid::new_v4().to_string(),
            began_at: Utc::now(),
            beginning_version,
            beginning_root,
            running_root,
            isolation_level: options.isolation_level,
        }
    }

    /// An opaque identifier of the transaction.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the transaction began.
    pub fn began_at(&self) -> DateTime<Utc> {
        self.began_at
    }

    /// The root version the snapshot was captured from. A commit publishes
    /// the successor of this version.
    pub fn beginning_version(&self) -> RootVersion {
        self.beginning_version
    }

    /// The immutable snapshot observed at begin.
    pub fn beginning_root(&self) -> &TreeNode {
        &self.beginning_root
    }

    /// The working copy holding the transaction's mutations.
    pub fn running_root(&self) -> &TreeNode {
        &self.running_root
    }

    pub(crate) fn running_root_mut(&mut self) -> &mut TreeNode {
        &mut self.running_root
    }

    /// The isolation level the transaction was begun with.
    pub fn isolation_level(&self) -> IsolationLevel {
        self.isolation_level
    }

    pub(crate) fn into_committed(self, version: RootVersion) -> CommittedTransaction {
        CommittedTransaction {
            id: self.id,
            committed_version: version,
            committed_root: self.running_root.with_version(version),
        }
    }
}

/// Record of a successfully published root.
#[derive(Clone, Debug)]
pub struct CommittedTransaction {
    id: String,
    committed_version: RootVersion,
    committed_root: TreeNode,
}

impl CommittedTransaction {
    /// The identifier of the transaction that produced this root.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The version the root was published at.
    pub fn committed_version(&self) -> RootVersion {
        self.committed_version
    }

    /// The node published at [`committed_version`].
    ///
    /// [`committed_version`]: CommittedTransaction::committed_version
    pub fn committed_root(&self) -> &TreeNode {
        &self.committed_root
    }
}
