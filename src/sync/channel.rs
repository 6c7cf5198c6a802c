use futures::stream::BoxStream;

use crate::sync::model::ChangeEvent;

/// Subscription lifecycle notifications delivered on the channel stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Subscription acknowledged by the server; push events now flow.
    Connected,
    /// Subscription could not be established or broke down.
    Failed(String),
}

/// One message from the push channel: a lifecycle status change or a
/// committed team mutation, already normalized into typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessage {
    /// Connection lifecycle transition.
    Status(ChannelStatus),
    /// Committed mutation of the team table.
    Event(ChangeEvent),
}

/// Push subscription to the team table's mutation stream.
///
/// `open` hands back the message stream for one subscription attempt.
/// Dropping the stream releases the subscription, which makes closing
/// idempotent by construction; the controller treats the stream ending on
/// its own as a channel failure. Payloads that cannot be normalized into a
/// [`ChangeEvent`] must be dropped by the implementation, never surfaced as
/// untyped data.
pub trait ChangeChannel: Send {
    /// Start one subscription attempt and return its message stream.
    fn open(&mut self) -> BoxStream<'static, ChannelMessage>;
}
