//! Shared pieces for validating the CPU core against per-opcode JSON test
//! vectors (SingleStepTests layout): the deserialized test-case types and a
//! port-queue bus that feeds IN instructions scripted values.

use serde::Deserialize;

use zeal_core::core::Bus;
use zeal_core::cpu::z80::Z80;

/// Register/memory state before or after one instruction, as stored in the
/// vector files. Shadow pairs are 16-bit words; `ram` lists (address, byte).
#[derive(Debug, Clone, Deserialize)]
pub struct Z80CpuState {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: u8,
    pub h: u8,
    pub l: u8,
    pub i: u8,
    pub r: u8,
    pub wz: u16,
    pub ix: u16,
    pub iy: u16,
    #[serde(rename = "af_")]
    pub af_prime: u16,
    #[serde(rename = "bc_")]
    pub bc_prime: u16,
    #[serde(rename = "de_")]
    pub de_prime: u16,
    #[serde(rename = "hl_")]
    pub hl_prime: u16,
    pub im: u8,
    pub iff1: u8,
    pub iff2: u8,
    pub ei: u8,
    pub ram: Vec<(u16, u8)>,
}

/// One vector: a name like "dd 36 0012", the initial and final states, the
/// per-T-state bus activity (only its length is checked here), and scripted
/// port traffic for the I/O instructions.
#[derive(Debug, Clone, Deserialize)]
pub struct Z80TestCase {
    pub name: String,
    pub initial: Z80CpuState,
    #[serde(rename = "final")]
    pub final_state: Z80CpuState,
    pub cycles: Vec<serde_json::Value>,
    #[serde(default)]
    pub ports: Vec<(u16, u8, String)>,
}

/// Bus that plays back a vector's scripted port reads and records writes
/// for comparison. Memory stays in the CPU's own direct-mapped image.
pub struct PortQueueBus {
    pub read_queue: Vec<(u16, u8)>,
    pub writes: Vec<(u16, u8)>,
}

impl PortQueueBus {
    pub fn new() -> Self {
        Self {
            read_queue: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub fn queue_reads<'a>(&mut self, ports: impl Iterator<Item = &'a (u16, u8, String)>) {
        for (port, value, dir) in ports {
            if dir.starts_with('r') {
                self.read_queue.push((*port, *value));
            }
        }
    }
}

impl Default for PortQueueBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for PortQueueBus {
    fn io_read(&mut self, _cpu: &mut Z80, port: u16) -> u8 {
        if let Some(pos) = self.read_queue.iter().position(|&(p, _)| p == port) {
            self.read_queue.remove(pos).1
        } else {
            0xFF
        }
    }

    fn io_write(&mut self, _cpu: &mut Z80, port: u16, data: u8) {
        self.writes.push((port, data));
    }
}
