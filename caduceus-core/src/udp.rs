//! Streams the demodulated bit stream over UDP as unpacked bytes.
//!
//! Each datagram carries `chunk_size` bytes of 0x00/0x01 values with an
//! inter-packet delay, matching what downstream bit-level consumers expect.
//! Streaming failures are reported to the caller but never abort a run.

use std::io;
use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use crate::config::UdpConfig;

pub struct BitStreamSender {
    socket: UdpSocket,
    dest: String,
    chunk_size: usize,
    delay: Duration,
}

impl BitStreamSender {
    pub fn connect(cfg: &UdpConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            dest: format!("{}:{}", cfg.host, cfg.port),
            chunk_size: cfg.chunk_size.max(1),
            delay: Duration::from_millis(cfg.delay_ms),
        })
    }

    /// Send the unpacked bit stream, one datagram per chunk. Returns the
    /// number of datagrams sent.
    pub fn send_bits(&self, bits: &[u8]) -> io::Result<usize> {
        let mut packets = 0usize;
        for chunk in bits.chunks(self.chunk_size) {
            let payload: Vec<u8> = chunk.iter().map(|&b| u8::from(b != 0)).collect();
            self.socket.send_to(&payload, &self.dest)?;
            packets += 1;
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        Ok(packets)
    }
}
