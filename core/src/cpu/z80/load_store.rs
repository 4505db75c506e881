use std::mem;

use crate::core::Bus;
use crate::cpu::z80::{Flag, IndexMode, Z80};

impl Z80 {
    /// LD rr,nn — 10 T
    pub(crate) fn op_ld_rr_nn<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let val = self.fetch16(bus);
        self.set_rp((opcode >> 4) & 0x03, val);
        self.cycles += 10;
    }

    /// LD r,n — 7 T register / 10 T (HL) / 19 T (IX+d).
    /// The indexed memory form reads the displacement before the immediate
    /// and only pays a 5 T penalty (the operand fetch overlaps the address
    /// computation).
    pub(crate) fn op_ld_r_n<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let r = (opcode >> 3) & 0x07;
        if r == 6 {
            if self.index_mode == IndexMode::HL {
                let val = self.fetch8(bus);
                let addr = self.get_hl();
                self.write8(bus, addr, val);
                self.cycles += 10;
            } else {
                let disp = self.fetch8(bus) as i8;
                let val = self.fetch8(bus);
                let addr = self.index_base().wrapping_add(disp as i16 as u16);
                self.memptr = addr;
                self.write8(bus, addr, val);
                self.cycles += 15;
            }
        } else {
            let val = self.fetch8(bus);
            self.set_reg8_ix(r, val);
            self.cycles += 7;
        }
    }

    /// LD r,r' — 4 T register-to-register, 7 T (19 T indexed) through memory.
    /// When one side is the memory slot, the register side is NOT remapped
    /// to IXH/IXL/IYH/IYL: LD H,(IX+d) loads H itself.
    pub(crate) fn op_ld_r_r<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;

        if src == 6 {
            let addr = self.operand_addr(bus);
            let val = self.read8(bus, addr);
            self.set_reg8(dst, val);
            self.cycles += 7;
        } else if dst == 6 {
            let val = self.get_reg8(src);
            let addr = self.operand_addr(bus);
            self.write8(bus, addr, val);
            self.cycles += 7;
        } else {
            let val = self.get_reg8_ix(src);
            self.set_reg8_ix(dst, val);
            self.cycles += 4;
        }
    }

    /// LD (BC),A — 7 T. MEMPTR: A into the high byte, BC+1 low.
    pub(crate) fn op_ld_bc_a<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.get_bc();
        let a = self.a;
        self.write8(bus, addr, a);
        self.memptr = ((a as u16) << 8) | (addr.wrapping_add(1) & 0x00FF);
        self.cycles += 7;
    }

    /// LD (DE),A — 7 T
    pub(crate) fn op_ld_de_a<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.get_de();
        let a = self.a;
        self.write8(bus, addr, a);
        self.memptr = ((a as u16) << 8) | (addr.wrapping_add(1) & 0x00FF);
        self.cycles += 7;
    }

    /// LD A,(BC) — 7 T
    pub(crate) fn op_ld_a_bc<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.get_bc();
        self.a = self.read8(bus, addr);
        self.memptr = addr.wrapping_add(1);
        self.cycles += 7;
    }

    /// LD A,(DE) — 7 T
    pub(crate) fn op_ld_a_de<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.get_de();
        self.a = self.read8(bus, addr);
        self.memptr = addr.wrapping_add(1);
        self.cycles += 7;
    }

    /// LD (nn),A — 13 T
    pub(crate) fn op_ld_nn_a<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        let a = self.a;
        self.write8(bus, addr, a);
        self.memptr = ((a as u16) << 8) | (addr.wrapping_add(1) & 0x00FF);
        self.cycles += 13;
    }

    /// LD A,(nn) — 13 T
    pub(crate) fn op_ld_a_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        self.a = self.read8(bus, addr);
        self.memptr = addr.wrapping_add(1);
        self.cycles += 13;
    }

    /// LD (nn),HL — 16 T (LD (nn),IX/IY under a prefix)
    pub(crate) fn op_ld_nn_hl<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = self.get_rp(2);
        self.write16(bus, addr, val);
        self.memptr = addr.wrapping_add(1);
        self.cycles += 16;
    }

    /// LD HL,(nn) — 16 T
    pub(crate) fn op_ld_hl_nn_ind<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = self.read16(bus, addr);
        self.set_rp(2, val);
        self.memptr = addr.wrapping_add(1);
        self.cycles += 16;
    }

    /// LD SP,HL — 6 T (LD SP,IX/IY under a prefix)
    pub(crate) fn op_ld_sp_hl(&mut self) {
        self.sp = self.get_rp(2);
        self.cycles += 6;
    }

    /// EX AF,AF' — 4 T
    pub(crate) fn op_ex_af_af(&mut self) {
        mem::swap(&mut self.a, &mut self.a_prime);
        mem::swap(&mut self.f, &mut self.f_prime);
        self.cycles += 4;
    }

    /// EX DE,HL — 4 T. Always the real DE/HL pair, prefix or not.
    pub(crate) fn op_ex_de_hl(&mut self) {
        mem::swap(&mut self.d, &mut self.h);
        mem::swap(&mut self.e, &mut self.l);
        self.cycles += 4;
    }

    /// EXX — 4 T. Swaps BC/DE/HL with the shadow bank; AF stays put.
    pub(crate) fn op_exx(&mut self) {
        mem::swap(&mut self.b, &mut self.b_prime);
        mem::swap(&mut self.c, &mut self.c_prime);
        mem::swap(&mut self.d, &mut self.d_prime);
        mem::swap(&mut self.e, &mut self.e_prime);
        mem::swap(&mut self.h, &mut self.h_prime);
        mem::swap(&mut self.l, &mut self.l_prime);
        self.cycles += 4;
    }

    /// IN A,(n) — 11 T. Port high byte comes from A; no flags.
    pub(crate) fn op_in_a_n<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let n = self.fetch8(bus);
        let port = ((self.a as u16) << 8) | n as u16;
        self.a = bus.io_read(self, port);
        self.memptr = port.wrapping_add(1);
        self.cycles += 11;
    }

    /// OUT (n),A — 11 T
    pub(crate) fn op_out_n_a<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let n = self.fetch8(bus);
        let a = self.a;
        let port = ((a as u16) << 8) | n as u16;
        bus.io_write(self, port, a);
        self.memptr = ((a as u16) << 8) | (n.wrapping_add(1) as u16);
        self.cycles += 11;
    }

    // --- ED-prefixed loads and port I/O ---

    /// LD I,A — 9 T, no flags
    pub(crate) fn op_ld_i_a(&mut self) {
        self.i = self.a;
        self.cycles += 9;
    }

    /// LD R,A — 9 T, no flags. All eight bits of R are written; only the
    /// refresh increments preserve bit 7.
    pub(crate) fn op_ld_r_a(&mut self) {
        self.r = self.a;
        self.cycles += 9;
    }

    /// LD A,I — 9 T. S/Z from the value, H=N=0, P/V mirrors IFF2.
    pub(crate) fn op_ld_a_i(&mut self) {
        self.a = self.i;
        self.set_ld_ir_flags();
        self.cycles += 9;
    }

    /// LD A,R — 9 T. Same flag rule as LD A,I.
    pub(crate) fn op_ld_a_r(&mut self) {
        self.a = self.r;
        self.set_ld_ir_flags();
        self.cycles += 9;
    }

    fn set_ld_ir_flags(&mut self) {
        let mut f = self.f & Flag::C as u8;
        if self.a == 0 {
            f |= Flag::Z as u8;
        }
        if (self.a & 0x80) != 0 {
            f |= Flag::S as u8;
        }
        if self.iff2 {
            f |= Flag::PV as u8;
        }
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }

    /// LD (nn),rr — 20 T (ED 43/53/63/73)
    pub(crate) fn op_ld_nn_rr_ed<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = self.get_rp((opcode >> 4) & 0x03);
        self.write16(bus, addr, val);
        self.memptr = addr.wrapping_add(1);
        self.cycles += 20;
    }

    /// LD rr,(nn) — 20 T (ED 4B/5B/6B/7B)
    pub(crate) fn op_ld_rr_nn_ed<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let addr = self.fetch16(bus);
        let val = self.read16(bus, addr);
        self.set_rp((opcode >> 4) & 0x03, val);
        self.memptr = addr.wrapping_add(1);
        self.cycles += 20;
    }

    /// IN r,(C) — 12 T. S/Z/P from the value, H=N=0, C preserved.
    /// ED 70 (r = 6) only sets flags and discards the value.
    pub(crate) fn op_in_r_c<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let r = (opcode >> 3) & 0x07;
        let port = self.get_bc();
        let val = bus.io_read(self, port);
        self.memptr = port.wrapping_add(1);
        if r != 6 {
            self.set_reg8(r, val);
        }
        let mut f = self.f & Flag::C as u8;
        if val == 0 {
            f |= Flag::Z as u8;
        }
        if (val & 0x80) != 0 {
            f |= Flag::S as u8;
        }
        if Self::get_parity(val) {
            f |= Flag::PV as u8;
        }
        f |= val & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
        self.cycles += 12;
    }

    /// OUT (C),r — 12 T, no flags. ED 71 (r = 6) outputs zero.
    pub(crate) fn op_out_c_r<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let r = (opcode >> 3) & 0x07;
        let val = if r == 6 { 0 } else { self.get_reg8(r) };
        let port = self.get_bc();
        bus.io_write(self, port, val);
        self.memptr = port.wrapping_add(1);
        self.cycles += 12;
    }
}
