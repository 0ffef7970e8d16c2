//! Entities: the units of ledger state produced and consumed by transactions.

use crate::reissuance::{ReissuanceLock, ReissuanceRequest};
use reissue_types::{EntityRef, Party, PublicKey};
use serde::{Deserialize, Serialize};

/// An opaque asset payload.
///
/// `kind` names the logical asset type for vault queries; `data` is never
/// interpreted by this protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetData {
    pub kind: String,
    pub data: Vec<u8>,
}

impl AssetData {
    pub fn new(kind: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: kind.into(),
            data: data.into(),
        }
    }
}

/// What an entity holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityPayload {
    Asset(AssetData),
    Request(ReissuanceRequest),
    Lock(ReissuanceLock),
}

/// A unit of ledger-held state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub payload: EntityPayload,
    /// Keys entitled to learn about (and usually to spend) this entity.
    pub participants: Vec<PublicKey>,
    /// The consensus authority that must notarise any transaction consuming this entity.
    pub notary: Party,
    /// Index of a sibling output that must be consumed in the same transaction.
    pub encumbrance: Option<u32>,
}

impl Entity {
    pub fn new(payload: EntityPayload, participants: Vec<PublicKey>, notary: Party) -> Self {
        Self {
            payload,
            participants,
            notary,
            encumbrance: None,
        }
    }

    pub fn with_encumbrance(mut self, encumbrance: Option<u32>) -> Self {
        self.encumbrance = encumbrance;
        self
    }

    pub fn is_encumbered(&self) -> bool {
        self.encumbrance.is_some()
    }

    pub fn as_asset(&self) -> Option<&AssetData> {
        match &self.payload {
            EntityPayload::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn as_request(&self) -> Option<&ReissuanceRequest> {
        match &self.payload {
            EntityPayload::Request(request) => Some(request),
            _ => None,
        }
    }

    pub fn as_lock(&self) -> Option<&ReissuanceLock> {
        match &self.payload {
            EntityPayload::Lock(lock) => Some(lock),
            _ => None,
        }
    }
}

/// An entity together with the reference that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAndRef {
    pub entity: Entity,
    pub entity_ref: EntityRef,
}

impl EntityAndRef {
    pub fn new(entity: Entity, entity_ref: EntityRef) -> Self {
        Self { entity, entity_ref }
    }
}
