//! Synthetic trace engine used by the integration tests and the bench
//!
//! 集成测试与基准测试使用的合成追踪引擎
//!
//! Packet layout (little endian):
//!
//! ```text
//! 0   magic        u32
//! 4   sequence     u64
//! 12  begin ts     u64
//! 20  end ts       u64
//! 28  content size u32   bytes used, header included
//! 32  events: ts u64, len u32, payload
//! ```

#![allow(dead_code)]

use packet_mmap::{PacketBuf, Platform, TraceEngine};

pub const MAGIC: u32 = 0xC1FC_1FC1;
pub const HEADER_LEN: usize = 32;
pub const EVENT_HEADER_LEN: usize = 12;

#[derive(Debug, Default)]
pub struct FramingEngine {
    buf: Option<PacketBuf>,
    cursor: usize,
    seq: u64,
    packet_open: bool,
    pub opens: u64,
    pub closes: u64,
    pub events: u64,
    pub dropped: u64,
}

impl FramingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_packet_open(&self) -> bool {
        self.packet_open
    }

    fn packet(&mut self) -> &mut [u8] {
        let buf = self.buf.expect("no packet buffer registered");
        // Safety: the buffer stays registered until close-packet clears it
        unsafe { buf.as_mut_slice() }
    }

    /// Append one event, rolling over to a new packet when the current one is full
    ///
    /// Returns false if the event was dropped.
    pub fn trace_event(&mut self, platform: &mut dyn Platform, payload: &[u8]) -> bool {
        let record = EVENT_HEADER_LEN + payload.len();

        if self.packet_open && self.cursor + record > self.packet().len() {
            platform.close_packet(self);
        }
        if !self.packet_open {
            if platform.is_backend_full() {
                self.dropped += 1;
                return false;
            }
            platform.open_packet(self);
        }
        if self.cursor + record > self.packet().len() {
            self.dropped += 1;
            return false;
        }

        let ts = platform.clock_value();
        let at = self.cursor;
        let packet = self.packet();
        packet[at..at + 8].copy_from_slice(&ts.to_le_bytes());
        packet[at + 8..at + 12].copy_from_slice(&(payload.len() as u32).to_le_bytes());
        packet[at + 12..at + record].copy_from_slice(payload);

        self.cursor += record;
        self.events += 1;
        true
    }
}

impl TraceEngine for FramingEngine {
    fn set_packet_buffer(&mut self, buf: Option<PacketBuf>) {
        self.buf = buf;
    }

    fn open_packet(&mut self, timestamp: u64) {
        let seq = self.seq;
        let packet = self.packet();
        packet[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        packet[4..12].copy_from_slice(&seq.to_le_bytes());
        packet[12..20].copy_from_slice(&timestamp.to_le_bytes());

        self.cursor = HEADER_LEN;
        self.seq += 1;
        self.opens += 1;
        self.packet_open = true;
    }

    fn close_packet(&mut self, timestamp: u64) {
        let used = self.cursor as u32;
        let packet = self.packet();
        packet[20..28].copy_from_slice(&timestamp.to_le_bytes());
        packet[28..32].copy_from_slice(&used.to_le_bytes());

        self.closes += 1;
        self.packet_open = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    pub magic: u32,
    pub seq: u64,
    pub begin: u64,
    pub end: u64,
    pub content_size: u32,
    pub events: usize,
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

fn u64_at(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap())
}

/// Decode every packet of a stream file
pub fn read_packets(stream: &[u8], packet_size: usize) -> Vec<PacketHeader> {
    stream
        .chunks(packet_size)
        .map(|packet| {
            let content_size = u32_at(packet, 28);
            let mut events = 0;
            let mut at = HEADER_LEN;
            while at < content_size as usize {
                at += EVENT_HEADER_LEN + u32_at(packet, at + 8) as usize;
                events += 1;
            }
            PacketHeader {
                magic: u32_at(packet, 0),
                seq: u64_at(packet, 4),
                begin: u64_at(packet, 12),
                end: u64_at(packet, 20),
                content_size,
                events,
            }
        })
        .collect()
}
