//! Outbound notice delivery.

use lupine_core::Notice;
use lupine_protocol::{Codec, GroupId, PlayerId, Recipient};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Where a table sends its notices.
///
/// Implementations must not block: they are called from inside the table
/// actor between commands.
pub trait NotificationSink: Send + Sync + 'static {
    /// Sends `notice` to everyone in `group`.
    fn broadcast(&self, group: GroupId, notice: &Notice);

    /// Sends `notice` privately to `player`.
    fn direct(&self, group: GroupId, player: PlayerId, notice: &Notice);
}

/// One notice handed to a [`ChannelSink`], or the payload of an
/// [`EncodedSink`] frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub group: GroupId,
    pub to: Recipient,
    pub notice: Notice,
}

/// A sink that forwards every notice into an unbounded channel.
///
/// Deliveries are silently dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Delivery>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, group: GroupId, to: Recipient, notice: &Notice) {
        let delivery = Delivery {
            group,
            to,
            notice: notice.clone(),
        };
        if self.sender.send(delivery).is_err() {
            tracing::trace!(%group, "notice receiver gone, dropping");
        }
    }
}

impl NotificationSink for ChannelSink {
    fn broadcast(&self, group: GroupId, notice: &Notice) {
        self.send(group, Recipient::Group, notice);
    }

    fn direct(&self, group: GroupId, player: PlayerId, notice: &Notice) {
        self.send(group, Recipient::Player(player), notice);
    }
}

/// A sink that encodes every delivery with a [`Codec`] and forwards the
/// bytes, for adapters that ship notices over the wire.
///
/// A delivery that fails to encode is logged and dropped.
#[derive(Debug, Clone)]
pub struct EncodedSink<C: Codec> {
    codec: C,
    sender: mpsc::UnboundedSender<Vec<u8>>,
}

impl<C: Codec> EncodedSink<C> {
    pub fn new(codec: C) -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { codec, sender }, receiver)
    }

    fn send(&self, group: GroupId, to: Recipient, notice: &Notice) {
        let delivery = Delivery {
            group,
            to,
            notice: notice.clone(),
        };
        let frame = match self.codec.encode(&delivery) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%group, %err, "failed to encode notice, dropping");
                return;
            }
        };
        if self.sender.send(frame).is_err() {
            tracing::trace!(%group, "frame receiver gone, dropping");
        }
    }
}

impl<C: Codec> NotificationSink for EncodedSink<C> {
    fn broadcast(&self, group: GroupId, notice: &Notice) {
        self.send(group, Recipient::Group, notice);
    }

    fn direct(&self, group: GroupId, player: PlayerId, notice: &Notice) {
        self.send(group, Recipient::Player(player), notice);
    }
}

#[cfg(test)]
mod tests {
    use lupine_protocol::JsonCodec;

    use super::*;

    #[test]
    fn test_channel_sink_addresses_deliveries() {
        let (sink, mut rx) = ChannelSink::new();
        sink.broadcast(GroupId(5), &Notice::NightFalls { turn: 2 });
        sink.direct(GroupId(5), PlayerId(3), &Notice::NightFalls { turn: 2 });

        assert_eq!(rx.try_recv().unwrap().to, Recipient::Group);
        assert_eq!(rx.try_recv().unwrap().to, Recipient::Player(PlayerId(3)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_encoded_sink_frames_decode_to_the_delivery() {
        let (sink, mut rx) = EncodedSink::new(JsonCodec);
        sink.direct(GroupId(5), PlayerId(3), &Notice::NightFalls { turn: 1 });

        let frame = rx.try_recv().unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.contains(r#""kind":"night-falls""#), "{text}");

        let delivery: Delivery = JsonCodec.decode(&frame).unwrap();
        assert_eq!(
            delivery,
            Delivery {
                group: GroupId(5),
                to: Recipient::Player(PlayerId(3)),
                notice: Notice::NightFalls { turn: 1 },
            }
        );
    }

    #[test]
    fn test_encoded_sink_survives_a_dropped_receiver() {
        let (sink, rx) = EncodedSink::new(JsonCodec);
        drop(rx);
        sink.broadcast(GroupId(1), &Notice::NightFalls { turn: 0 });
    }
}
