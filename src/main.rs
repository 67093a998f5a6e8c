//! Two-node simulation of `rf24-transport` over an in-memory medium.
//!
//! A sender transmits a series of patterned payloads to a receiver, both
//! driven by a shared manual clock. Optional link faults show aborted sends,
//! retries and eviction of the partial messages left behind.

mod cli;

use std::{process::ExitCode, time::Duration};

use clap::Parser;
use rf24_transport::{
    ManualClock,
    Transport,
    TransportConfig,
    network::{MemoryLink, MemoryMedium, NodeAddress},
};
use tracing::{info, warn};

type SimulatedTransport = Transport<MemoryLink, ManualClock>;

fn pattern(index: u32, len: usize) -> Vec<u8> {
    let seed = index.to_le_bytes()[0];
    (0..len)
        .map(|offset| seed.wrapping_add(offset.to_le_bytes()[0]))
        .collect()
}

fn send_with_retries(
    sender: &mut SimulatedTransport,
    to: NodeAddress,
    payload: &[u8],
    retries: u8,
) -> bool {
    for attempt in 0..=retries {
        match sender.send(to, payload) {
            Ok(message_id) => {
                info!(%message_id, attempt, len = payload.len(), "message sent");
                return true;
            }
            Err(err) => warn!(attempt, error = %err, "send aborted"),
        }
    }
    false
}

fn drain(receiver: &mut SimulatedTransport, expected: &[u8]) -> (u32, u32) {
    let mut intact = 0;
    let mut corrupt = 0;
    while let Some(message) = receiver.receive(usize::MAX) {
        if message.payload() == expected {
            intact += 1;
        } else {
            corrupt += 1;
        }
        info!(
            message_id = %message.message_id(),
            source = %message.source(),
            len = message.payload().len(),
            "message received"
        );
    }
    (intact, corrupt)
}

fn main() -> ExitCode {
    // Enable structured logging for the simulation.
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let medium = MemoryMedium::new();
    if let Some(every) = cli.nack_every {
        medium.nack_every(every);
    }

    let clock = ManualClock::new();
    let timeout = Duration::from_millis(cli.timeout_ms);
    let config = TransportConfig::default().with_reassembly_timeout(timeout);
    let sender_address = NodeAddress::new(cli.sender);
    let receiver_address = NodeAddress::new(cli.receiver);
    let mut sender = Transport::with_clock(medium.attach(sender_address), clock.clone(), config);
    let mut receiver = Transport::with_clock(medium.attach(receiver_address), clock.clone(), config);

    let mut intact = 0;
    let mut corrupt = 0;
    for index in 0..cli.messages {
        let payload = pattern(index, cli.payload_size);
        send_with_retries(&mut sender, receiver_address, &payload, cli.retries);
        receiver.poll();
        let (ok, bad) = drain(&mut receiver, &payload);
        intact += ok;
        corrupt += bad;
        clock.advance(Duration::from_millis(cli.interval_ms));
    }

    clock.advance(timeout + Duration::from_millis(1));
    let summary = receiver.poll();
    info!(evicted = summary.evicted.len(), "final reap");

    let sent = sender.stats();
    let received = receiver.stats();
    println!(
        "sent {}/{} messages ({} fragments, {} aborted sends)",
        sent.messages_sent, cli.messages, sent.fragments_sent, sent.send_failures
    );
    println!(
        "received {intact} intact and {corrupt} corrupt messages; {} fragments dropped, {} \
         buffers evicted, {} buffers free",
        received.fragments_dropped,
        received.buffers_evicted,
        receiver.free_buffer_count()
    );

    if corrupt == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
