//! Domain events emitted by a [`TagEditor`](crate::TagEditor) for host-side
//! listeners.
//!
//! Events always carry snapshots of the collection, never live references, so
//! a listener can hold onto a payload without observing later mutations.

use tokio::sync::mpsc::UnboundedSender;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagEvent {
    /// A tag was appended. `tags` is the post-add snapshot.
    Added { tags: Vec<String> },
    /// A tag was removed. `tags` is the post-removal snapshot.
    Removed {
        tags: Vec<String>,
        removed_tag: String,
    },
}

/// One subscriber's end of the event channel.
///
/// Sending to a closed channel is not an error for the editor: the listener
/// simply went away. The editor drops the sender on the first failed send.
#[derive(Clone, Debug)]
pub(crate) struct TagEventSender(UnboundedSender<TagEvent>);

impl TagEventSender {
    pub(crate) fn new(tx: UnboundedSender<TagEvent>) -> Self {
        Self(tx)
    }

    /// Returns false when the subscriber is gone.
    pub(crate) fn send(&self, event: TagEvent) -> bool {
        match self.0.send(event) {
            Ok(()) => true,
            Err(err) => {
                tracing::trace!("dropping tag event, subscriber gone: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_reports_closed_channels() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let sender = TagEventSender::new(tx);
        assert!(sender.send(TagEvent::Added { tags: vec![] }));
        drop(rx);
        assert!(!sender.send(TagEvent::Added { tags: vec![] }));
    }
}
