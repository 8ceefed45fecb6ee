//! External mood command intake, running on its own thread.
//!
//! - [`MoodSubscriber`] normalizes incoming payloads and pushes them into the
//!   [`MoodQueue`], dropping blanks and, with [`DedupMode::Last`], immediate
//!   repeats.
//! - [`udp_subscriber_thread`] receives datagrams on a bound socket.
//! - [`line_subscriber_loop`] reads one command per line (used for stdin).
//!
//! The thread never validates names against the library; that happens on the
//! render thread when the request is popped. It is started and stopped by
//! [`crate::resources::moodsubscriber`].

use std::io::{BufRead, ErrorKind};
use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, warn};

use crate::resources::faceconfig::DedupMode;
use crate::resources::moodlibrary::MoodId;
use crate::resources::moodqueue::MoodQueue;

/// Largest UDP payload over IPv4.
const MAX_DATAGRAM: usize = 65_507;

/// Producer side of the mood queue.
pub struct MoodSubscriber {
    queue: MoodQueue,
    dedup: DedupMode,
    last_command: Option<MoodId>,
}

impl MoodSubscriber {
    /// `initial_mood` counts as the last command, so with
    /// [`DedupMode::Last`] repeating the mood the face starts with is not
    /// queued.
    pub fn new(queue: MoodQueue, initial_mood: &str, dedup: DedupMode) -> Self {
        Self {
            queue,
            dedup,
            last_command: MoodId::parse(initial_mood),
        }
    }

    /// Handle one payload. Returns whether it was queued.
    pub fn on_message(&mut self, payload: &str) -> bool {
        let Some(command) = MoodId::parse(payload) else {
            return false;
        };
        if self.dedup == DedupMode::Last && self.last_command.as_ref() == Some(&command) {
            debug!("Repeated mood command {} dropped", command);
            return false;
        }
        debug!("Queueing mood command {}", command);
        self.queue.push(command.as_str());
        self.last_command = Some(command);
        true
    }
}

/// Extract the payload of a datagram addressed to `channel`.
///
/// A datagram starting with `/` is `<channel> <payload>` and is only accepted
/// when the channel matches; anything else is a bare payload.
pub fn parse_datagram<'a>(datagram: &'a str, channel: &str) -> Option<&'a str> {
    let text = datagram.trim();
    if !text.starts_with('/') {
        return Some(text);
    }
    let (name, payload) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    (name == channel).then_some(payload)
}

/// Body of the UDP command thread.
///
/// The socket must have a read timeout so `stop` is polled regularly.
pub fn udp_subscriber_thread(
    socket: UdpSocket,
    channel: String,
    mut subscriber: MoodSubscriber,
    stop: Arc<AtomicBool>,
) {
    info!(
        "[commands] listening on {:?} channel '{}'",
        socket.local_addr().ok(),
        channel
    );
    let mut buf = vec![0u8; MAX_DATAGRAM];

    while !stop.load(Ordering::Relaxed) {
        match socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                if len == buf.len() {
                    warn!("[commands] datagram from {} may be truncated", from);
                }
                let Ok(text) = std::str::from_utf8(&buf[..len]) else {
                    warn!("[commands] non UTF-8 datagram from {} ignored", from);
                    continue;
                };
                match parse_datagram(text, &channel) {
                    Some(payload) => {
                        subscriber.on_message(payload);
                    }
                    None => debug!("[commands] datagram for another channel: {:?}", text),
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => {
                error!("[commands] receive failed, stopping: {}", e);
                break;
            }
        }
    }
    info!("[commands] UDP subscriber stopped");
}

/// Feed every line of `reader` to `subscriber` until EOF, error or `stop`.
pub fn line_subscriber_loop<R: BufRead>(
    reader: R,
    mut subscriber: MoodSubscriber,
    stop: Arc<AtomicBool>,
) {
    for line in reader.lines() {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        match line {
            Ok(line) => {
                subscriber.on_message(&line);
            }
            Err(e) => {
                warn!("[commands] read failed, stopping: {}", e);
                break;
            }
        }
    }
    debug!("[commands] line subscriber finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn drain(queue: &MoodQueue) -> Vec<String> {
        std::iter::from_fn(|| queue.try_pop())
            .map(|r| r.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_payload_is_normalized() {
        let queue = MoodQueue::new();
        let mut subscriber = MoodSubscriber::new(queue.clone(), "BLANK", DedupMode::Last);
        assert!(subscriber.on_message("  happy \n"));
        assert_eq!(drain(&queue), vec!["HAPPY"]);
    }

    #[test]
    fn test_blank_payload_is_ignored() {
        let queue = MoodQueue::new();
        let mut subscriber = MoodSubscriber::new(queue.clone(), "BLANK", DedupMode::Last);
        assert!(!subscriber.on_message("   "));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_immediate_repeats_are_dropped() {
        let queue = MoodQueue::new();
        let mut subscriber = MoodSubscriber::new(queue.clone(), "BLANK", DedupMode::Last);
        for payload in ["happy", "HAPPY", "Happy", "sad", "happy", "happy"] {
            subscriber.on_message(payload);
        }
        assert_eq!(drain(&queue), vec!["HAPPY", "SAD", "HAPPY"]);
    }

    #[test]
    fn test_initial_mood_counts_as_last_command() {
        let queue = MoodQueue::new();
        let mut subscriber = MoodSubscriber::new(queue.clone(), "blank", DedupMode::Last);
        assert!(!subscriber.on_message("BLANK"));
        assert!(subscriber.on_message("happy"));
        assert!(subscriber.on_message("blank"));
        assert_eq!(drain(&queue), vec!["HAPPY", "BLANK"]);
    }

    #[test]
    fn test_dedup_off_queues_repeats() {
        let queue = MoodQueue::new();
        let mut subscriber = MoodSubscriber::new(queue.clone(), "BLANK", DedupMode::Off);
        for payload in ["blank", "happy", "HAPPY", " ", "happy"] {
            subscriber.on_message(payload);
        }
        assert_eq!(drain(&queue), vec!["BLANK", "HAPPY", "HAPPY", "HAPPY"]);
    }

    #[test]
    fn test_parse_datagram_channels() {
        assert_eq!(parse_datagram("happy\n", "/robot_face"), Some("happy"));
        assert_eq!(parse_datagram("/robot_face sad", "/robot_face"), Some("sad"));
        assert_eq!(parse_datagram("/robot_face", "/robot_face"), Some(""));
        assert_eq!(parse_datagram("/other sad", "/robot_face"), None);
    }

    #[test]
    fn test_udp_thread_keeps_long_payloads_whole() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        let queue = MoodQueue::new();
        let stop = Arc::new(AtomicBool::new(false));
        let subscriber = MoodSubscriber::new(queue.clone(), "BLANK", DedupMode::Last);
        let thread_stop = stop.clone();
        let handle = std::thread::spawn(move || {
            udp_subscriber_thread(socket, "/robot_face".to_string(), subscriber, thread_stop)
        });

        let name = "X".repeat(2000);
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(name.as_bytes(), addr).unwrap();

        let mut received = None;
        for _ in 0..200 {
            if let Some(request) = queue.try_pop() {
                received = Some(request);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();

        assert_eq!(received.unwrap().as_str().len(), 2000);
    }

    #[test]
    fn test_line_loop_feeds_queue() {
        let queue = MoodQueue::new();
        let subscriber = MoodSubscriber::new(queue.clone(), "BLANK", DedupMode::Last);
        let input = Cursor::new("happy\n\nhappy\nsad\n");
        line_subscriber_loop(input, subscriber, Arc::new(AtomicBool::new(false)));
        assert_eq!(drain(&queue), vec!["HAPPY", "SAD"]);
    }

    #[test]
    fn test_udp_thread_receives_and_stops() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        let queue = MoodQueue::new();
        let stop = Arc::new(AtomicBool::new(false));
        let subscriber = MoodSubscriber::new(queue.clone(), "BLANK", DedupMode::Last);
        let thread_stop = stop.clone();
        let handle = std::thread::spawn(move || {
            udp_subscriber_thread(socket, "/robot_face".to_string(), subscriber, thread_stop)
        });

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"/robot_face happy", addr).unwrap();
        sender.send_to(b"/elsewhere sad", addr).unwrap();

        let mut received = None;
        for _ in 0..200 {
            if let Some(request) = queue.try_pop() {
                received = Some(request);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();

        assert_eq!(received.unwrap().as_str(), "HAPPY");
        assert!(queue.is_empty());
    }
}
