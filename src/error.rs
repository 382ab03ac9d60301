//! Error types for the calculation core

use crate::models::{ItemId, RecipeType};

/// Fatal calculation failures. Everything else degrades to a fallback.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("maximum recursion depth {max_depth} exceeded at node {node_id} (depth {depth})")]
    DepthExceeded {
        depth: usize,
        max_depth: usize,
        node_id: String,
    },

    #[error("No machine found for recipe type: {0}")]
    NoMachine(RecipeType),
}

#[derive(Debug, thiserror::Error)]
pub enum MiningError {
    #[error("no extraction equipment known for item {item_id}")]
    NotMinable { item_id: ItemId },

    #[error("extraction equipment for item {item_id} has no throughput")]
    NoThroughput { item_id: ItemId },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RateError {
    #[error("cannot parse rate '{0}', expected e.g. 1.5, 90/min or 3600/h")]
    Malformed(String),

    #[error("unknown time unit '{0}'")]
    UnknownUnit(String),

    #[error("invalid rate pattern: {0}")]
    Pattern(String),
}
