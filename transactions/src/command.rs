//! Commands: what a transaction does, and who must sign for it.

use reissue_types::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a command carried by a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// An asset-level command named by the caller (issue, move, exit, unlock).
    Asset(String),
    CreateRequest,
    AcceptRequest,
    RejectRequest,
    CreateLock,
    DeactivateLock,
    DeleteLock,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(name) => write!(f, "Asset({name})"),
            Self::CreateRequest => f.write_str("CreateRequest"),
            Self::AcceptRequest => f.write_str("AcceptRequest"),
            Self::RejectRequest => f.write_str("RejectRequest"),
            Self::CreateLock => f.write_str("CreateLock"),
            Self::DeactivateLock => f.write_str("DeactivateLock"),
            Self::DeleteLock => f.write_str("DeleteLock"),
        }
    }
}

/// A command plus the keys required to sign for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub kind: CommandKind,
    pub signers: Vec<PublicKey>,
}

impl Command {
    /// Build a command, dropping repeated signers but keeping first-seen order.
    pub fn new(kind: CommandKind, signers: impl IntoIterator<Item = PublicKey>) -> Self {
        let mut unique = Vec::new();
        for key in signers {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self {
            kind,
            signers: unique,
        }
    }

    pub fn asset(name: impl Into<String>, signers: impl IntoIterator<Item = PublicKey>) -> Self {
        Self::new(CommandKind::Asset(name.into()), signers)
    }
}
