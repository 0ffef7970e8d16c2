//! Signer-set partitioning and role-tagged session fan-out.

use crate::identity::{IdentityService, KeyManager};
use crate::session::{CounterpartySession, Messaging};
use crate::NetworkError;
use reissue_messages::SessionMessage;
use reissue_types::{Party, PublicKey};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// What a counterparty is asked to do in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionRole {
    /// Must check and sign before the transaction is notarised.
    Signer,
    /// Only records the finalised transaction.
    Observer,
}

impl SessionRole {
    pub fn as_flag(self) -> bool {
        matches!(self, Self::Signer)
    }

    pub fn from_flag(signer: bool) -> Self {
        if signer {
            Self::Signer
        } else {
            Self::Observer
        }
    }
}

/// Required signers split by where the signature comes from, plus observers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignerSet {
    /// Required keys held by this node.
    pub local_keys: Vec<PublicKey>,
    /// One entry per counterparty holding at least one required key.
    pub remote_signers: Vec<Party>,
    /// Counterparties that receive the result without signing.
    pub observers: Vec<Party>,
}

impl SignerSet {
    pub fn is_remote_signer(&self, party: &Party) -> bool {
        self.remote_signers.contains(party)
    }

    /// Every remote party with its role, signers first.
    pub fn remote_parties(&self) -> impl Iterator<Item = (&Party, SessionRole)> {
        self.remote_signers
            .iter()
            .map(|p| (p, SessionRole::Signer))
            .chain(self.observers.iter().map(|p| (p, SessionRole::Observer)))
    }
}

/// Builds a [`SignerSet`] from key sets using the identity service.
pub struct SignerSetBuilder<'a> {
    identity: &'a dyn IdentityService,
    keys: &'a dyn KeyManager,
    us: &'a Party,
}

impl<'a> SignerSetBuilder<'a> {
    pub fn new(identity: &'a dyn IdentityService, keys: &'a dyn KeyManager, us: &'a Party) -> Self {
        Self { identity, keys, us }
    }

    /// Partition `required` into local keys and remote signer parties, and
    /// reduce `observer_keys` to the parties that are neither us nor signers.
    ///
    /// A required key that is neither held locally nor mapped to a party fails
    /// with [`NetworkError::UnknownIdentity`]. A required key mapped to our own
    /// party but not held fails with [`NetworkError::KeyNotOwned`]. Unknown
    /// observer keys are skipped: an observer we cannot reach loses nothing
    /// but a copy of the result.
    pub fn build<'k>(
        &self,
        required: impl IntoIterator<Item = &'k PublicKey>,
        observer_keys: impl IntoIterator<Item = &'k PublicKey>,
    ) -> Result<SignerSet, NetworkError> {
        let mut set = SignerSet::default();
        let required: BTreeSet<PublicKey> = required.into_iter().copied().collect();

        for key in &required {
            if self.keys.owns(key) {
                set.local_keys.push(*key);
                continue;
            }
            let party = self
                .identity
                .well_known_party(key)
                .ok_or(NetworkError::UnknownIdentity(*key))?;
            if party == *self.us {
                return Err(NetworkError::KeyNotOwned(*key));
            }
            if !set.remote_signers.contains(&party) {
                set.remote_signers.push(party);
            }
        }

        for key in observer_keys {
            if required.contains(key) || self.keys.owns(key) {
                continue;
            }
            let Some(party) = self.identity.well_known_party(key) else {
                warn!(key = %key, "observer key has no well-known party, skipping");
                continue;
            };
            if party == *self.us
                || set.remote_signers.contains(&party)
                || set.observers.contains(&party)
            {
                continue;
            }
            set.observers.push(party);
        }

        debug!(
            local = set.local_keys.len(),
            remote = set.remote_signers.len(),
            observers = set.observers.len(),
            "signer set built"
        );
        Ok(set)
    }
}

/// A session whose counterparty has already been told its role.
pub struct RoleSession {
    pub role: SessionRole,
    pub session: Box<dyn CounterpartySession>,
}

impl RoleSession {
    pub fn party(&self) -> &Party {
        self.session.counterparty()
    }
}

/// Open one session per remote party of `set` and send its role flag.
///
/// Each party receives exactly one session and exactly one flag, and must
/// acknowledge the flag before any transaction content is sent.
pub async fn open_sessions(
    messaging: &dyn Messaging,
    set: &SignerSet,
) -> Result<Vec<RoleSession>, NetworkError> {
    let mut sessions = Vec::with_capacity(set.remote_signers.len() + set.observers.len());
    for (party, role) in set.remote_parties() {
        let mut session = messaging.open_session(party).await?;
        session
            .send_expecting_ack(SessionMessage::Role {
                signer: role.as_flag(),
            })
            .await?;
        debug!(party = %party, ?role, "session opened");
        sessions.push(RoleSession { role, session });
    }
    Ok(sessions)
}
