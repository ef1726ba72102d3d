//! ## Message receiver
//! Every subsystem owns one `MessageReceiver`: a UDP socket bound to its
//! well-known port, a reader thread, and a bounded priority queue keyed on
//! the first byte of each payload. Lower byte means higher priority, so
//! fault traffic overtakes routine dispatch and arrival traffic that is
//! still queued. Messages with equal priority come out oldest first.
//!
//! The queue is the only synchronization point between the reader thread
//! and the consuming state machine.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io;
use std::mem;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::modules::config;
use crate::modules::udp_functions::udp::ACKNOWLEDGE;

//----------------------------------------------Structs

#[derive(Clone, Debug)]
struct QueuedMessage {
    payload: Vec<u8>,
    seq: u64,
}

impl QueuedMessage {
    fn priority(&self) -> u8 {
        self.payload.first().copied().unwrap_or(u8::MAX)
    }
}

impl Ord for QueuedMessage {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the maximum, flip so the lowest tag comes out
        // first and the oldest message wins within a tag
        self.priority()
            .cmp(&other.priority())
            .then(self.seq.cmp(&other.seq))
            .reverse()
    }
}

impl PartialOrd for QueuedMessage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedMessage {}

#[derive(Debug, Default)]
struct MessageQueue {
    heap: BinaryHeap<QueuedMessage>,
    next_seq: u64,
}

#[derive(Clone, Debug)]
pub struct MessageReceiver {
    queue: Arc<(Mutex<MessageQueue>, Condvar)>,
    local_address: SocketAddr,
}

//----------------------------------------------Functions

impl MessageReceiver {
    /// Binds the ingress socket and starts the reader thread. A failing
    /// bind is fatal, everything after startup keeps the loop alive.
    pub fn init(port: u16) -> io::Result<MessageReceiver> {
        let socket = UdpSocket::bind(("127.0.0.1", port))?;
        let local_address = socket.local_addr()?;
        let queue = Arc::new((Mutex::new(MessageQueue::default()), Condvar::new()));

        let receiver = MessageReceiver {
            queue,
            local_address,
        };
        let reader = receiver.clone();
        thread::spawn(move || receive_loop(socket, reader));

        Ok(receiver)
    }

    /// The bound ingress address, mainly useful when binding port 0
    pub fn local_address(&self) -> SocketAddr {
        self.local_address
    }

    /// Queues one message, dropping it with a warning when the queue
    /// already holds the configured maximum.
    pub fn submit(&self, payload: Vec<u8>) {
        let (lock, condvar) = &*self.queue;
        let mut queue = lock.lock().expect("message queue lock poisoned");

        if queue.heap.len() >= config::MAX_QUEUED_MESSAGES {
            warn!(
                "message queue full, dropping message with first byte {:?}",
                payload.first()
            );
            return;
        }

        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.heap.push(QueuedMessage { payload, seq });
        condvar.notify_all();
    }

    /// Blocks until a message is available and returns the highest
    /// priority one.
    pub fn poll(&self) -> Vec<u8> {
        let (lock, condvar) = &*self.queue;
        let mut queue = lock.lock().expect("message queue lock poisoned");
        loop {
            if let Some(message) = queue.heap.pop() {
                return message.payload;
            }
            queue = condvar
                .wait(queue)
                .expect("message queue lock poisoned");
        }
    }

    /// Like `poll`, but gives up after `timeout` with None
    pub fn poll_timeout(&self, timeout: Duration) -> Option<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let (lock, condvar) = &*self.queue;
        let mut queue = lock.lock().expect("message queue lock poisoned");
        loop {
            if let Some(message) = queue.heap.pop() {
                return Some(message.payload);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = condvar
                .wait_timeout(queue, deadline - now)
                .expect("message queue lock poisoned");
            queue = guard;
        }
    }

    /// Blocks until the queue is non-empty, then pops the head unless it
    /// carries `tag`, in which case the head stays put and None is
    /// returned. The elevator subsystem uses this to leave request
    /// messages in the queue for batch absorption.
    pub fn poll_except(&self, tag: u8) -> Option<Vec<u8>> {
        let (lock, condvar) = &*self.queue;
        let mut queue = lock.lock().expect("message queue lock poisoned");
        loop {
            if let Some(head) = queue.heap.peek() {
                if head.priority() == tag {
                    return None;
                }
                return queue.heap.pop().map(|message| message.payload);
            }
            queue = condvar
                .wait(queue)
                .expect("message queue lock poisoned");
        }
    }

    /// Removes and returns every queued message whose first byte is `tag`,
    /// oldest first. Non-blocking.
    pub fn take_matching(&self, tag: u8) -> Vec<Vec<u8>> {
        let (lock, _) = &*self.queue;
        let mut queue = lock.lock().expect("message queue lock poisoned");

        let (mut matching, rest): (Vec<QueuedMessage>, Vec<QueuedMessage>) =
            mem::take(&mut queue.heap)
                .into_vec()
                .into_iter()
                .partition(|message| message.priority() == tag);
        queue.heap = rest.into();

        matching.sort_by_key(|message| message.seq);
        matching.into_iter().map(|message| message.payload).collect()
    }

    pub fn is_empty(&self) -> bool {
        let (lock, _) = &*self.queue;
        lock.lock()
            .expect("message queue lock poisoned")
            .heap
            .is_empty()
    }
}

/// Reader thread: copies each datagram out of the reuse buffer, queues it
/// and acknowledges the sender. The ACK is informational, nobody waits
/// for it.
fn receive_loop(socket: UdpSocket, receiver: MessageReceiver) {
    let mut buffer = [0u8; config::UDP_BUFFER];

    loop {
        let (size, sender) = match socket.recv_from(&mut buffer) {
            Ok(received) => received,
            Err(e) => {
                error!("failed to receive message: {}", e);
                continue;
            }
        };

        debug!("received message of size {} from {}", size, sender);
        receiver.submit(buffer[..size].to_vec());

        if let Err(e) = socket.send_to(&[ACKNOWLEDGE], sender) {
            debug!("failed to acknowledge {}: {}", sender, e);
        }
    }
}
