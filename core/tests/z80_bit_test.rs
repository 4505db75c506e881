mod common;
use common::{TestBus, cpu_with_program, step_cycles};

// --- CB rotates and shifts on registers ---

#[test]
fn test_rlc_b() {
    let mut cpu = cpu_with_program(&[0xCB, 0x00]); // RLC B
    let mut bus = TestBus::new();
    cpu.b = 0x85;

    let cycles = step_cycles(&mut cpu, &mut bus);
    assert_eq!(cycles, 8);
    assert_eq!(cpu.b, 0x0B);
    assert_ne!(cpu.f & 0x01, 0, "bit 7 went into C");
    assert_eq!(cpu.f & 0x04, 0, "0x0B has odd parity");
}

#[test]
fn test_rrc_c() {
    let mut cpu = cpu_with_program(&[0xCB, 0x09]); // RRC C
    let mut bus = TestBus::new();
    cpu.c = 0x01;

    step_cycles(&mut cpu, &mut bus);
    assert_eq!(cpu.c, 0x80);
    assert_ne!(cpu.f & 0x01, 0, "bit 0 went into C");
    assert_ne!(cpu.f & 0x80, 0, "S from the result");
}

#[test]
fn test_rl_through_carry() {
    let mut cpu = cpu_with_program(&[0xCB, 0x10]); // RL B
    let mut bus = TestBus::new();
    cpu.b = 0x80;
    cpu.f = 0x01;

    step_cycles(&mut cpu, &mut bus);
    assert_eq!(cpu.b, 0x01, "old carry rotated in");
    assert_ne!(cpu.f & 0x01, 0, "old bit 7 rotated out");
}

#[test]
fn test_rr_through_carry() {
    let mut cpu = cpu_with_program(&[0xCB, 0x18]); // RR B
    let mut bus = TestBus::new();
    cpu.b = 0x01;
    cpu.f = 0x01;

    step_cycles(&mut cpu, &mut bus);
    assert_eq!(cpu.b, 0x80);
    assert_ne!(cpu.f & 0x01, 0);
}

#[test]
fn test_sla_sra_srl() {
    let mut cpu = cpu_with_program(&[0xCB, 0x20, 0xCB, 0x28, 0xCB, 0x38]); // SLA B; SRA B; SRL B
    let mut bus = TestBus::new();
    cpu.b = 0xC1;

    cpu.step(&mut bus);
    assert_eq!(cpu.b, 0x82, "SLA shifts in zero");
    assert_ne!(cpu.f & 0x01, 0);

    cpu.step(&mut bus);
    assert_eq!(cpu.b, 0xC1, "SRA keeps the sign bit");
    assert_eq!(cpu.f & 0x01, 0);

    cpu.step(&mut bus);
    assert_eq!(cpu.b, 0x60, "SRL shifts in zero");
    assert_ne!(cpu.f & 0x01, 0);
}

#[test]
fn test_sll_inserts_one() {
    let mut cpu = cpu_with_program(&[0xCB, 0x30]); // SLL B (undocumented)
    let mut bus = TestBus::new();
    cpu.b = 0x80;

    step_cycles(&mut cpu, &mut bus);
    assert_eq!(cpu.b, 0x01, "SLL sets bit 0");
    assert_ne!(cpu.f & 0x01, 0);
}

#[test]
fn test_cb_rmw_hl() {
    let mut cpu = cpu_with_program(&[0xCB, 0x06]); // RLC (HL)
    let mut bus = TestBus::new();
    cpu.set_hl(0x4000);
    cpu.mem.load(0x4000, &[0x81]);

    let cycles = step_cycles(&mut cpu, &mut bus);
    assert_eq!(cycles, 15);
    assert_eq!(cpu.mem.read_direct(0x4000), 0x03);
}

// --- BIT/SET/RES ---

#[test]
fn test_bit_0_a() {
    let mut cpu = cpu_with_program(&[0xCB, 0x47]); // BIT 0,A
    let mut bus = TestBus::new();
    cpu.a = 0xFE;

    let cycles = step_cycles(&mut cpu, &mut bus);
    assert_eq!(cycles, 8);
    assert_eq!(cpu.a, 0xFE, "A unchanged");
    assert_ne!(cpu.f & 0x40, 0, "Z set (bit clear)");
    assert_ne!(cpu.f & 0x10, 0, "H set");
    assert_eq!(cpu.f & 0x02, 0, "N clear");
    assert_ne!(cpu.f & 0x04, 0, "PV mirrors Z");
}

#[test]
fn test_bit_7_sign() {
    let mut cpu = cpu_with_program(&[0xCB, 0x7F]); // BIT 7,A
    let mut bus = TestBus::new();
    cpu.a = 0x80;

    step_cycles(&mut cpu, &mut bus);
    assert_ne!(cpu.f & 0x80, 0, "S set when bit 7 tested and set");
    assert_eq!(cpu.f & 0x40, 0, "Z clear");
}

#[test]
fn test_bit_preserves_carry() {
    let mut cpu = cpu_with_program(&[0xCB, 0x47]); // BIT 0,A
    let mut bus = TestBus::new();
    cpu.a = 0x01;
    cpu.f = 0x01;

    step_cycles(&mut cpu, &mut bus);
    assert_ne!(cpu.f & 0x01, 0, "C preserved");
}

#[test]
fn test_bit_hl_xy_from_memptr() {
    let mut cpu = cpu_with_program(&[0xCB, 0x46]); // BIT 0,(HL)
    let mut bus = TestBus::new();
    cpu.set_hl(0x4000);
    cpu.mem.load(0x4000, &[0x01]);
    cpu.memptr = 0x2800;

    let cycles = step_cycles(&mut cpu, &mut bus);
    assert_eq!(cycles, 12);
    assert_eq!(cpu.f & 0x40, 0, "Z clear (bit set)");
    assert_eq!(cpu.f & 0x28, 0x28, "X/Y from the internal pointer high byte");
}

#[test]
fn test_set_and_res() {
    let mut cpu = cpu_with_program(&[0xCB, 0xC7, 0xCB, 0x87]); // SET 0,A; RES 0,A
    let mut bus = TestBus::new();
    cpu.a = 0x00;
    cpu.f = 0xFF;

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x01);
    assert_eq!(cpu.f, 0xFF, "SET leaves flags alone");

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x00);
    assert_eq!(cpu.f, 0xFF, "RES leaves flags alone");
}

#[test]
fn test_set_res_hl() {
    let mut cpu = cpu_with_program(&[0xCB, 0xFE, 0xCB, 0xBE]); // SET 7,(HL); RES 7,(HL)
    let mut bus = TestBus::new();
    cpu.set_hl(0x4000);

    let cycles = step_cycles(&mut cpu, &mut bus);
    assert_eq!(cycles, 15);
    assert_eq!(cpu.mem.read_direct(0x4000), 0x80);
    cpu.step(&mut bus);
    assert_eq!(cpu.mem.read_direct(0x4000), 0x00);
}

// --- Accumulator rotates (main table) ---

#[test]
fn test_rlca() {
    let mut cpu = cpu_with_program(&[0x07]); // RLCA
    let mut bus = TestBus::new();
    cpu.a = 0x81;
    cpu.f = 0xC4; // S, Z, PV — must survive

    let cycles = step_cycles(&mut cpu, &mut bus);
    assert_eq!(cycles, 4);
    assert_eq!(cpu.a, 0x03);
    assert_ne!(cpu.f & 0x01, 0, "C from bit 7");
    assert_eq!(cpu.f & 0xC4, 0xC4, "S/Z/PV preserved");
}

#[test]
fn test_rrca() {
    let mut cpu = cpu_with_program(&[0x0F]); // RRCA
    let mut bus = TestBus::new();
    cpu.a = 0x01;

    step_cycles(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x80);
    assert_ne!(cpu.f & 0x01, 0);
}

#[test]
fn test_rla_rra_through_carry() {
    let mut cpu = cpu_with_program(&[0x17, 0x1F]); // RLA; RRA
    let mut bus = TestBus::new();
    cpu.a = 0x80;
    cpu.f = 0x00;

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x00, "carry was clear");
    assert_ne!(cpu.f & 0x01, 0, "bit 7 into C");

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x80, "carry rotated back in");
    assert_eq!(cpu.f & 0x01, 0);
}

// --- RRD/RLD ---

#[test]
fn test_rrd() {
    let mut cpu = cpu_with_program(&[0xED, 0x67]); // RRD
    let mut bus = TestBus::new();
    cpu.a = 0x12;
    cpu.set_hl(0x4000);
    cpu.mem.load(0x4000, &[0x34]);

    let cycles = step_cycles(&mut cpu, &mut bus);
    assert_eq!(cycles, 18);
    assert_eq!(cpu.a, 0x14);
    assert_eq!(cpu.mem.read_direct(0x4000), 0x23);
    assert_eq!(cpu.memptr, 0x4001);
}

#[test]
fn test_rld() {
    let mut cpu = cpu_with_program(&[0xED, 0x6F]); // RLD
    let mut bus = TestBus::new();
    cpu.a = 0x12;
    cpu.set_hl(0x4000);
    cpu.mem.load(0x4000, &[0x34]);

    let cycles = step_cycles(&mut cpu, &mut bus);
    assert_eq!(cycles, 18);
    assert_eq!(cpu.a, 0x13);
    assert_eq!(cpu.mem.read_direct(0x4000), 0x42);
}

#[test]
fn test_rld_carry_preserved() {
    let mut cpu = cpu_with_program(&[0xED, 0x6F]); // RLD
    let mut bus = TestBus::new();
    cpu.a = 0x00;
    cpu.f = 0x01;
    cpu.set_hl(0x4000);

    step_cycles(&mut cpu, &mut bus);
    assert_ne!(cpu.f & 0x01, 0, "C preserved");
    assert_ne!(cpu.f & 0x40, 0, "Z from the new A");
}
