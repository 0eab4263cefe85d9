//! Output side of a harvest: where discovered links go.

use std::sync::mpsc::{Sender, SyncSender};

/// The consumer went away; the link was not delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkClosed;

/// Receives links one at a time, in harvest order.
///
/// The harvester is the only writer. A bounded channel makes `send` block
/// while the consumer catches up, which throttles fetching to consumption.
pub trait LinkSink {
    fn send(&mut self, link: String) -> Result<(), SinkClosed>;
}

impl LinkSink for Sender<String> {
    fn send(&mut self, link: String) -> Result<(), SinkClosed> {
        Sender::send(self, link).map_err(|_| SinkClosed)
    }
}

impl LinkSink for SyncSender<String> {
    fn send(&mut self, link: String) -> Result<(), SinkClosed> {
        SyncSender::send(self, link).map_err(|_| SinkClosed)
    }
}

impl LinkSink for Vec<String> {
    fn send(&mut self, link: String) -> Result<(), SinkClosed> {
        self.push(link);
        Ok(())
    }
}

impl<S: LinkSink + ?Sized> LinkSink for &mut S {
    fn send(&mut self, link: String) -> Result<(), SinkClosed> {
        (**self).send(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_sender_delivers() {
        let (mut tx, rx) = mpsc::channel::<String>();
        LinkSink::send(&mut tx, "https://a/1".to_string()).unwrap();
        assert_eq!(rx.recv().unwrap(), "https://a/1");
    }

    #[test]
    fn test_sender_reports_closed() {
        let (mut tx, rx) = mpsc::channel::<String>();
        drop(rx);
        assert_eq!(
            LinkSink::send(&mut tx, "https://a/1".to_string()),
            Err(SinkClosed)
        );
    }

    #[test]
    fn test_sync_sender_reports_closed() {
        let (mut tx, rx) = mpsc::sync_channel::<String>(1);
        drop(rx);
        assert_eq!(
            LinkSink::send(&mut tx, "https://a/1".to_string()),
            Err(SinkClosed)
        );
    }

    #[test]
    fn test_vec_collects() {
        let mut links: Vec<String> = Vec::new();
        links.send("https://a/1".to_string()).unwrap();
        (&mut links).send("https://a/2".to_string()).unwrap();
        assert_eq!(links, vec!["https://a/1", "https://a/2"]);
    }
}
