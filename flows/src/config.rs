//! Validated argument sets for the reissuance operations.
//!
//! Every operation takes one of these structs. `validate()` checks what can
//! be checked without touching stores or the network and runs first.

use crate::error::ReissuanceError;
use reissue_transactions::EntityAndRef;
use reissue_types::{AttachmentId, EntityRef, Party, PublicKey};
use std::collections::HashSet;

/// Whether the issuer signs unlock transactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IssuerSignaturePolicy {
    /// The issuer receives the unlock transaction but does not sign it.
    #[default]
    Observe,
    /// The issuer's key is added to the unlock command's signers.
    Sign,
}

/// Arguments to `request_reissuance`.
#[derive(Clone, Debug)]
pub struct RequestReissuanceConfig {
    pub issuer: Party,
    /// Key held by this node that owns the entities and signs the request.
    pub requester_key: PublicKey,
    pub entity_refs: Vec<EntityRef>,
    /// Asset command the issuer will use to re-create the entities.
    pub issuance_command: String,
    /// Issuance signers besides the issuer and the requester.
    pub extra_issuance_signers: Vec<PublicKey>,
    /// The requester key lives on the issuer's own node.
    pub co_located_requester: bool,
}

impl RequestReissuanceConfig {
    pub fn new(
        issuer: Party,
        requester_key: PublicKey,
        entity_refs: Vec<EntityRef>,
        issuance_command: impl Into<String>,
    ) -> Self {
        Self {
            issuer,
            requester_key,
            entity_refs,
            issuance_command: issuance_command.into(),
            extra_issuance_signers: Vec::new(),
            co_located_requester: false,
        }
    }

    pub fn with_extra_signers(mut self, signers: Vec<PublicKey>) -> Self {
        self.extra_issuance_signers = signers;
        self
    }

    pub fn co_located(mut self) -> Self {
        self.co_located_requester = true;
        self
    }

    pub fn validate(&self) -> Result<(), ReissuanceError> {
        if self.entity_refs.is_empty() {
            return Err(ReissuanceError::invalid("no entities to re-issue"));
        }
        if let Some(r) = first_repeat(&self.entity_refs) {
            return Err(ReissuanceError::invalid(format!("{r} requested twice")));
        }
        if self.issuance_command.is_empty() {
            return Err(ReissuanceError::invalid("issuance command is empty"));
        }
        if self
            .extra_issuance_signers
            .contains(&self.issuer.owning_key)
        {
            return Err(ReissuanceError::invalid(
                "issuer signs issuance implicitly and must not be an extra signer",
            ));
        }
        if self.extra_issuance_signers.contains(&self.requester_key) {
            return Err(ReissuanceError::invalid(
                "requester signs issuance implicitly and must not be an extra signer",
            ));
        }
        Ok(())
    }
}

/// Arguments to `accept_and_reissue`.
#[derive(Clone, Debug)]
pub struct AcceptReissuanceConfig {
    pub request: EntityAndRef,
    /// Overrides the issuance signers named in the request.
    pub extra_issuance_signers: Option<Vec<PublicKey>>,
    /// Keys that must co-sign the eventual unlock.
    pub extra_unlock_signers: Vec<PublicKey>,
}

impl AcceptReissuanceConfig {
    pub fn new(request: EntityAndRef) -> Self {
        Self {
            request,
            extra_issuance_signers: None,
            extra_unlock_signers: Vec::new(),
        }
    }

    pub fn with_extra_signers(mut self, signers: Vec<PublicKey>) -> Self {
        self.extra_issuance_signers = Some(signers);
        self
    }

    pub fn with_unlock_signers(mut self, signers: Vec<PublicKey>) -> Self {
        self.extra_unlock_signers = signers;
        self
    }

    /// The issuance signers in effect: the override, else the request's.
    pub fn issuance_signers(&self) -> Vec<PublicKey> {
        match (&self.extra_issuance_signers, self.request.entity.as_request()) {
            (Some(signers), _) => signers.clone(),
            (None, Some(request)) => request.required_signers.clone(),
            (None, None) => Vec::new(),
        }
    }

    /// Check the request and the signers against the notary that will
    /// finalise the reissue transaction.
    pub fn validate(&self, notary: &Party) -> Result<(), ReissuanceError> {
        let request = self
            .request
            .entity
            .as_request()
            .ok_or_else(|| ReissuanceError::invalid("entity is not a reissuance request"))?;
        for signer in self.issuance_signers() {
            if signer == notary.owning_key {
                return Err(ReissuanceError::invalid("notary must not be an issuance signer"));
            }
            if signer == request.requester {
                return Err(ReissuanceError::invalid(
                    "requester signs issuance implicitly and must not be an extra signer",
                ));
            }
            if signer == request.issuer.owning_key {
                return Err(ReissuanceError::invalid(
                    "issuer signs issuance implicitly and must not be an extra signer",
                ));
            }
        }
        Ok(())
    }
}

/// Arguments to `unlock_reissued_entities`.
#[derive(Clone, Debug)]
pub struct UnlockConfig {
    pub lock: EntityAndRef,
    /// The re-issued copies governed by `lock`.
    pub governed: Vec<EntityAndRef>,
    /// Exit proofs, already imported into the attachment store.
    pub proofs: Vec<AttachmentId>,
    pub unlock_command: String,
    pub extra_signers: Vec<PublicKey>,
    pub issuer_policy: IssuerSignaturePolicy,
}

impl UnlockConfig {
    pub fn new(
        lock: EntityAndRef,
        governed: Vec<EntityAndRef>,
        proofs: Vec<AttachmentId>,
        unlock_command: impl Into<String>,
    ) -> Self {
        Self {
            lock,
            governed,
            proofs,
            unlock_command: unlock_command.into(),
            extra_signers: Vec::new(),
            issuer_policy: IssuerSignaturePolicy::default(),
        }
    }

    pub fn with_extra_signers(mut self, signers: Vec<PublicKey>) -> Self {
        self.extra_signers = signers;
        self
    }

    pub fn with_issuer_policy(mut self, policy: IssuerSignaturePolicy) -> Self {
        self.issuer_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ReissuanceError> {
        if self.lock.entity.as_lock().is_none() {
            return Err(ReissuanceError::invalid("entity is not a reissuance lock"));
        }
        if self.governed.is_empty() {
            return Err(ReissuanceError::invalid("no governed entities to unlock"));
        }
        if self.proofs.is_empty() {
            return Err(ReissuanceError::invalid("unlock needs at least one exit proof"));
        }
        if self.unlock_command.is_empty() {
            return Err(ReissuanceError::invalid("unlock command is empty"));
        }
        Ok(())
    }
}

/// Arguments to `delete_reissued_entities_and_lock`.
#[derive(Clone, Debug)]
pub struct DeleteConfig {
    pub lock: EntityAndRef,
    pub governed: Vec<EntityAndRef>,
    pub exit_command: String,
    /// Signers of the exit command; the requester when empty.
    pub signers: Vec<PublicKey>,
}

impl DeleteConfig {
    pub fn new(
        lock: EntityAndRef,
        governed: Vec<EntityAndRef>,
        exit_command: impl Into<String>,
    ) -> Self {
        Self {
            lock,
            governed,
            exit_command: exit_command.into(),
            signers: Vec::new(),
        }
    }

    pub fn with_signers(mut self, signers: Vec<PublicKey>) -> Self {
        self.signers = signers;
        self
    }

    pub fn validate(&self) -> Result<(), ReissuanceError> {
        if self.lock.entity.as_lock().is_none() {
            return Err(ReissuanceError::invalid("entity is not a reissuance lock"));
        }
        if self.governed.is_empty() {
            return Err(ReissuanceError::invalid("no governed entities to delete"));
        }
        if self.exit_command.is_empty() {
            return Err(ReissuanceError::invalid("exit command is empty"));
        }
        Ok(())
    }
}

/// The first repeated ref, if any.
fn first_repeat(refs: &[EntityRef]) -> Option<EntityRef> {
    let mut seen = HashSet::new();
    refs.iter().copied().find(|r| !seen.insert(*r))
}
