//! Counterparty sessions: ordered request/response channels.

use crate::NetworkError;
use async_trait::async_trait;
use reissue_messages::{decode, encode, SessionMessage};
use reissue_types::Party;
use tokio::sync::mpsc;
use tracing::trace;

/// Buffered messages per direction before a sender waits.
const SESSION_BUFFER: usize = 32;

/// One side of a session with a single counterparty.
#[async_trait]
pub trait CounterpartySession: Send {
    fn counterparty(&self) -> &Party;

    async fn send(&mut self, message: SessionMessage) -> Result<(), NetworkError>;

    async fn receive(&mut self) -> Result<SessionMessage, NetworkError>;

    async fn send_and_receive(
        &mut self,
        message: SessionMessage,
    ) -> Result<SessionMessage, NetworkError> {
        self.send(message).await?;
        self.receive().await
    }

    /// Send a message and require an `Ack`.
    async fn send_expecting_ack(&mut self, message: SessionMessage) -> Result<(), NetworkError> {
        let party = self.counterparty().name.clone();
        match self.send_and_receive(message).await? {
            SessionMessage::Ack => Ok(()),
            SessionMessage::Rejected(reason) => Err(NetworkError::Rejected { party, reason }),
            other => Err(NetworkError::UnexpectedMessage {
                party,
                expected: "Ack",
                got: other.kind(),
            }),
        }
    }
}

/// Opens sessions to counterparties.
#[async_trait]
pub trait Messaging: Send + Sync {
    async fn open_session(
        &self,
        counterparty: &Party,
    ) -> Result<Box<dyn CounterpartySession>, NetworkError>;
}

/// A session carried over in-process channels, encoded as on the wire.
pub struct ChannelSession {
    counterparty: Party,
    outbound: mpsc::Sender<Vec<u8>>,
    inbound: mpsc::Receiver<Vec<u8>>,
}

impl ChannelSession {
    /// Two connected ends: the first is held by `a` and talks to `b`.
    pub fn pair(a: Party, b: Party) -> (ChannelSession, ChannelSession) {
        let (a_tx, b_rx) = mpsc::channel(SESSION_BUFFER);
        let (b_tx, a_rx) = mpsc::channel(SESSION_BUFFER);
        (
            ChannelSession {
                counterparty: b,
                outbound: a_tx,
                inbound: a_rx,
            },
            ChannelSession {
                counterparty: a,
                outbound: b_tx,
                inbound: b_rx,
            },
        )
    }
}

#[async_trait]
impl CounterpartySession for ChannelSession {
    fn counterparty(&self) -> &Party {
        &self.counterparty
    }

    async fn send(&mut self, message: SessionMessage) -> Result<(), NetworkError> {
        trace!(to = %self.counterparty, kind = message.kind(), "session send");
        let bytes = encode(&message)?;
        self.outbound
            .send(bytes)
            .await
            .map_err(|_| NetworkError::SessionClosed(self.counterparty.name.clone()))
    }

    async fn receive(&mut self) -> Result<SessionMessage, NetworkError> {
        let bytes = self
            .inbound
            .recv()
            .await
            .ok_or_else(|| NetworkError::SessionClosed(self.counterparty.name.clone()))?;
        let message = decode(&bytes)?;
        trace!(from = %self.counterparty, kind = message.kind(), "session receive");
        Ok(message)
    }
}
