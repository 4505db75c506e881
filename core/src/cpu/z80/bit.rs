use crate::core::Bus;
use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    // --- Accumulator rotates (main table) ---
    // S/Z/PV are preserved; H and N clear; X/Y from the new A.

    /// RLCA — 4 T
    pub(crate) fn op_rlca(&mut self) {
        let carry = self.a >> 7;
        self.a = (self.a << 1) | carry;
        self.set_rot_a_flags(carry);
    }

    /// RRCA — 4 T
    pub(crate) fn op_rrca(&mut self) {
        let carry = self.a & 1;
        self.a = (self.a >> 1) | (carry << 7);
        self.set_rot_a_flags(carry);
    }

    /// RLA — 4 T (rotate through carry)
    pub(crate) fn op_rla(&mut self) {
        let carry = self.a >> 7;
        let old_c = self.f & Flag::C as u8;
        self.a = (self.a << 1) | old_c;
        self.set_rot_a_flags(carry);
    }

    /// RRA — 4 T (rotate through carry)
    pub(crate) fn op_rra(&mut self) {
        let carry = self.a & 1;
        let old_c = self.f & Flag::C as u8;
        self.a = (self.a >> 1) | (old_c << 7);
        self.set_rot_a_flags(carry);
    }

    fn set_rot_a_flags(&mut self, carry: u8) {
        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8);
        f |= carry & Flag::C as u8;
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
        self.cycles += 4;
    }

    /// Perform a CB rotate/shift operation on a value.
    /// op: 0=RLC, 1=RRC, 2=RL, 3=RR, 4=SLA, 5=SRA, 6=SLL(undoc), 7=SRL.
    /// Returns (result, new_flags). Flags: S, Z, PV(parity), C from the
    /// shifted-out bit, H=0, N=0, X/Y from the result.
    fn do_cb_rotate_shift(&self, op: u8, val: u8) -> (u8, u8) {
        let (result, carry) = match op {
            0 => {
                // RLC: rotate left circular
                let c = (val >> 7) & 1;
                ((val << 1) | c, c)
            }
            1 => {
                // RRC: rotate right circular
                let c = val & 1;
                ((val >> 1) | (c << 7), c)
            }
            2 => {
                // RL: rotate left through carry
                let old_c = if (self.f & Flag::C as u8) != 0 { 1 } else { 0 };
                let c = (val >> 7) & 1;
                ((val << 1) | old_c, c)
            }
            3 => {
                // RR: rotate right through carry
                let old_c = if (self.f & Flag::C as u8) != 0 { 0x80 } else { 0 };
                let c = val & 1;
                ((val >> 1) | old_c, c)
            }
            4 => {
                // SLA: shift left arithmetic
                let c = (val >> 7) & 1;
                (val << 1, c)
            }
            5 => {
                // SRA: shift right arithmetic (preserves sign)
                let c = val & 1;
                (((val as i8) >> 1) as u8, c)
            }
            6 => {
                // SLL: shift left logical, set bit 0 (undocumented)
                let c = (val >> 7) & 1;
                ((val << 1) | 1, c)
            }
            7 => {
                // SRL: shift right logical
                let c = val & 1;
                (val >> 1, c)
            }
            _ => unreachable!(),
        };

        let mut f = 0;
        if result == 0 {
            f |= Flag::Z as u8;
        }
        if (result & 0x80) != 0 {
            f |= Flag::S as u8;
        }
        if Self::get_parity(result) {
            f |= Flag::PV as u8;
        }
        if carry != 0 {
            f |= Flag::C as u8;
        }
        // H = 0, N = 0
        f |= result & (Flag::X as u8 | Flag::Y as u8);

        (result, f)
    }

    /// BIT test flags: Z = ~bit, PV = Z, H=1, N=0, S only for bit 7, C
    /// preserved. X/Y source varies by form and is passed in by the caller.
    fn bit_test_flags(&mut self, bit: u8, val: u8, xy_source: u8) {
        let tested = val & (1 << bit);
        let mut f = self.f & Flag::C as u8;
        f |= Flag::H as u8;
        if tested == 0 {
            f |= Flag::Z as u8;
            f |= Flag::PV as u8;
        }
        if bit == 7 && tested != 0 {
            f |= Flag::S as u8;
        }
        f |= xy_source & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }

    /// Execute a CB-prefixed instruction.
    /// Register ops: 8 T. BIT b,(HL): 12 T. Rotate/shift/SET/RES (HL): 15 T.
    /// BIT b,(HL) sources X/Y from the high byte of MEMPTR.
    pub(crate) fn exec_cb<B: Bus + ?Sized>(&mut self, op: u8, bus: &mut B) {
        let xx = (op >> 6) & 0x03; // 0=rot/shift, 1=BIT, 2=RES, 3=SET
        let yyy = (op >> 3) & 0x07; // bit number or shift operation
        let zzz = op & 0x07; // register index

        if zzz == 6 {
            let addr = self.get_hl();
            match xx {
                1 => {
                    let val = self.read8(bus, addr);
                    let xy = (self.memptr >> 8) as u8;
                    self.bit_test_flags(yyy, val, xy);
                    self.cycles += 12;
                }
                _ => {
                    let val = self.read8(bus, addr);
                    let result = match xx {
                        0 => {
                            let (r, f) = self.do_cb_rotate_shift(yyy, val);
                            self.f = f;
                            r
                        }
                        2 => val & !(1 << yyy), // RES — no flag changes
                        _ => val | (1 << yyy),  // SET — no flag changes
                    };
                    self.write8(bus, addr, result);
                    self.cycles += 15;
                }
            }
        } else {
            let val = self.get_reg8(zzz);
            match xx {
                0 => {
                    let (result, f) = self.do_cb_rotate_shift(yyy, val);
                    self.f = f;
                    self.set_reg8(zzz, result);
                }
                1 => self.bit_test_flags(yyy, val, val),
                2 => self.set_reg8(zzz, val & !(1 << yyy)),
                _ => self.set_reg8(zzz, val | (1 << yyy)),
            }
            self.cycles += 8;
        }
    }

    /// Execute DD CB d op / FD CB d op (indexed bit operations).
    ///
    /// The displacement and sub-opcode are plain data reads (no refresh).
    /// BIT b,(IX+d): 20 T, X/Y from the effective-address high byte.
    /// Rotate/shift/SET/RES (IX+d): 23 T; when the low three bits select a
    /// register other than (HL), the result is also copied to that register
    /// (undocumented double store).
    pub(crate) fn exec_index_cb<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let disp = self.fetch8(bus) as i8;
        let op = self.fetch8(bus);
        let addr = self.index_base().wrapping_add(disp as i16 as u16);
        self.memptr = addr;

        let xx = (op >> 6) & 0x03;
        let yyy = (op >> 3) & 0x07;
        let zzz = op & 0x07;

        if xx == 1 {
            // BIT b,(IX+d) — 20 T with the 4 T prefix already charged
            let val = self.read8(bus, addr);
            self.bit_test_flags(yyy, val, (addr >> 8) as u8);
            self.cycles += 16;
        } else {
            let val = self.read8(bus, addr);
            let result = match xx {
                0 => {
                    let (r, f) = self.do_cb_rotate_shift(yyy, val);
                    self.f = f;
                    r
                }
                2 => val & !(1 << yyy),
                _ => val | (1 << yyy),
            };
            self.write8(bus, addr, result);
            if zzz != 6 {
                self.set_reg8(zzz, result);
            }
            self.cycles += 19;
        }
    }

    /// RRD — 18 T. Low nibble of (HL) into A, the rest shifted right.
    /// S/Z/PV from the new A, H=N=0, C preserved, MEMPTR = HL + 1.
    pub(crate) fn op_rrd<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.get_hl();
        let val = self.read8(bus, addr);
        let new_val = ((self.a & 0x0F) << 4) | (val >> 4);
        self.a = (self.a & 0xF0) | (val & 0x0F);
        self.write8(bus, addr, new_val);
        self.memptr = addr.wrapping_add(1);
        self.set_rotate_digit_flags();
        self.cycles += 18;
    }

    /// RLD — 18 T. Low nibble of A into (HL), the rest shifted left.
    pub(crate) fn op_rld<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.get_hl();
        let val = self.read8(bus, addr);
        let new_val = (val << 4) | (self.a & 0x0F);
        self.a = (self.a & 0xF0) | (val >> 4);
        self.write8(bus, addr, new_val);
        self.memptr = addr.wrapping_add(1);
        self.set_rotate_digit_flags();
        self.cycles += 18;
    }

    fn set_rotate_digit_flags(&mut self) {
        let mut f = self.f & Flag::C as u8;
        if self.a == 0 {
            f |= Flag::Z as u8;
        }
        if (self.a & 0x80) != 0 {
            f |= Flag::S as u8;
        }
        if Self::get_parity(self.a) {
            f |= Flag::PV as u8;
        }
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }
}
