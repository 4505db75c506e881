use zeal_core::core::Bus;
use zeal_core::core::mem::NUM_PAGES;
use zeal_core::cpu::z80::Z80;

/// Minimal bus for testing: programmable I/O read value, recorded traffic,
/// scripted interrupt vector byte.
pub struct TestBus {
    pub io_value: u8,
    pub io_reads: Vec<u16>,
    pub io_writes: Vec<(u16, u8)>,
    pub vector: u8,
}

#[allow(dead_code)]
impl TestBus {
    pub fn new() -> Self {
        Self {
            io_value: 0xFF,
            io_reads: Vec::new(),
            io_writes: Vec::new(),
            vector: 0xFF,
        }
    }
}

impl Bus for TestBus {
    fn io_read(&mut self, _cpu: &mut Z80, port: u16) -> u8 {
        self.io_reads.push(port);
        self.io_value
    }

    fn io_write(&mut self, _cpu: &mut Z80, port: u16, data: u8) {
        self.io_writes.push((port, data));
    }

    fn irq_vector(&mut self, _cpu: &mut Z80) -> u8 {
        self.vector
    }
}

/// CPU with the whole address space mapped as RAM, flags cleared, and the
/// given program at address zero.
#[allow(dead_code)]
pub fn cpu_with_program(program: &[u8]) -> Z80 {
    let mut cpu = Z80::new();
    cpu.mem.map_ram(0..NUM_PAGES);
    cpu.mem.load(0, program);
    cpu.pc = 0;
    cpu.f = 0;
    cpu
}

/// Step one instruction and return the T-states it consumed.
#[allow(dead_code)]
pub fn step_cycles(cpu: &mut Z80, bus: &mut TestBus) -> u64 {
    let before = cpu.cycles;
    cpu.step(bus);
    cpu.cycles - before
}
