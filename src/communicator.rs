//! The distributed all-gather primitive, as consumed by this crate.
//!
//! Distributed runs supply their own [`Communicator`] backed by the message-passing layer of the
//! host application. This crate does not implement any communication itself.
use std::collections::BTreeSet;

pub trait Communicator {
    /// Rank of the calling process.
    fn rank(&self) -> usize;

    /// Number of participating processes.
    fn size(&self) -> usize;

    /// Gathers the strings of every rank. Each rank receives the concatenation of all
    /// contributions.
    fn all_gather_strings(&self, local: &[String]) -> Vec<String>;
}

/// The trivial communicator of a single-process run.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SerialCommunicator;

impl Communicator for SerialCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_gather_strings(&self, local: &[String]) -> Vec<String> {
        local.to_vec()
    }
}

/// The union of the string sets held by all ranks.
pub fn union_across_ranks(local: &BTreeSet<String>, communicator: &dyn Communicator) -> BTreeSet<String> {
    let local: Vec<String> = local.iter().cloned().collect();
    communicator.all_gather_strings(&local).into_iter().collect()
}
