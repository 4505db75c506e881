use crate::core::Bus;
use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    // --- Block transfer ---

    /// LDI/LDD — 16 T. (DE) <- (HL), pointers step, BC counts down.
    /// Undocumented X/Y: bits 3 and 1 of (value + A). P/V = BC != 0;
    /// S, Z and C are preserved; H = N = 0.
    pub(crate) fn op_ldi_ldd<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let dec = (opcode & 0x08) != 0;
        let src = self.get_hl();
        let val = self.read8(bus, src);
        let dst = self.get_de();
        self.write8(bus, dst, val);

        let delta: u16 = if dec { 0xFFFF } else { 1 };
        self.set_hl(src.wrapping_add(delta));
        self.set_de(dst.wrapping_add(delta));
        self.set_bc(self.get_bc().wrapping_sub(1));

        let n = val.wrapping_add(self.a);
        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::C as u8);
        if self.get_bc() != 0 {
            f |= Flag::PV as u8;
        }
        if (n & 0x08) != 0 {
            f |= Flag::X as u8;
        }
        if (n & 0x02) != 0 {
            f |= Flag::Y as u8;
        }
        self.f = f;
        self.cycles += 16;
    }

    /// LDIR/LDDR — 21 T repeating / 16 T on the last iteration.
    /// One iteration per step: while BC != 0 the PC is rewound over the
    /// two opcode bytes, which is what keeps the repeat interruptible.
    pub(crate) fn op_ldir_lddr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.op_ldi_ldd(opcode, bus);
        if self.get_bc() != 0 {
            self.pc = self.pc.wrapping_sub(2);
            self.memptr = self.pc.wrapping_add(1);
            self.cycles += 5;
        }
    }

    // --- Block compare ---

    /// CPI/CPD — 16 T. Compare A with (HL), HL steps, BC counts down.
    /// Undocumented X/Y: bits 3 and 1 of (A - value - H), with H computed
    /// from the compare. P/V = BC != 0; C preserved; N set.
    pub(crate) fn op_cpi_cpd<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let dec = (opcode & 0x08) != 0;
        let addr = self.get_hl();
        let val = self.read8(bus, addr);
        let result = self.a.wrapping_sub(val);
        let half = (self.a & 0x0F) < (val & 0x0F);

        let delta: u16 = if dec { 0xFFFF } else { 1 };
        self.set_hl(addr.wrapping_add(delta));
        self.set_bc(self.get_bc().wrapping_sub(1));
        self.memptr = if dec {
            self.memptr.wrapping_sub(1)
        } else {
            self.memptr.wrapping_add(1)
        };

        let mut f = (self.f & Flag::C as u8) | Flag::N as u8;
        if result == 0 {
            f |= Flag::Z as u8;
        }
        if (result & 0x80) != 0 {
            f |= Flag::S as u8;
        }
        if half {
            f |= Flag::H as u8;
        }
        if self.get_bc() != 0 {
            f |= Flag::PV as u8;
        }
        let n = result.wrapping_sub(if half { 1 } else { 0 });
        if (n & 0x08) != 0 {
            f |= Flag::X as u8;
        }
        if (n & 0x02) != 0 {
            f |= Flag::Y as u8;
        }
        self.f = f;
        self.cycles += 16;
    }

    /// CPIR/CPDR — 21 T repeating / 16 T when done.
    /// Repeats while BC != 0 and the byte was not found (Z clear).
    pub(crate) fn op_cpir_cpdr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.op_cpi_cpd(opcode, bus);
        let found = (self.f & Flag::Z as u8) != 0;
        if self.get_bc() != 0 && !found {
            self.pc = self.pc.wrapping_sub(2);
            self.memptr = self.pc.wrapping_add(1);
            self.cycles += 5;
        }
    }

    // --- Block I/O ---
    // Flag rules for all four: Z/S/X/Y from the decremented B, N from bit 7
    // of the transferred byte, H = C = carry of the k sum, P/V = parity of
    // (k & 7) ^ B. INI/IND read the port with B still undecremented; the
    // OUT forms decrement B before the port sees it.

    /// INI/IND — 16 T. Port (BC) -> (HL), B counts down, HL steps.
    pub(crate) fn op_ini_ind<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let dec = (opcode & 0x08) != 0;
        let port = self.get_bc();
        let val = bus.io_read(self, port);
        self.memptr = if dec {
            port.wrapping_sub(1)
        } else {
            port.wrapping_add(1)
        };
        self.b = self.b.wrapping_sub(1);
        let addr = self.get_hl();
        self.write8(bus, addr, val);
        let delta: u16 = if dec { 0xFFFF } else { 1 };
        self.set_hl(addr.wrapping_add(delta));

        let stepped_c = if dec {
            self.c.wrapping_sub(1)
        } else {
            self.c.wrapping_add(1)
        };
        let k = (val as u16) + (stepped_c as u16);
        self.set_block_io_flags(val, k);
        self.cycles += 16;
    }

    /// INIR/INDR — 21 T repeating / 16 T when done (B = 0).
    pub(crate) fn op_inir_indr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.op_ini_ind(opcode, bus);
        if self.b != 0 {
            self.pc = self.pc.wrapping_sub(2);
            self.cycles += 5;
        }
    }

    /// OUTI/OUTD — 16 T. (HL) -> port (BC after B--), HL steps.
    pub(crate) fn op_outi_outd<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let dec = (opcode & 0x08) != 0;
        self.b = self.b.wrapping_sub(1);
        let addr = self.get_hl();
        let val = self.read8(bus, addr);
        let port = self.get_bc();
        bus.io_write(self, port, val);
        self.memptr = if dec {
            port.wrapping_sub(1)
        } else {
            port.wrapping_add(1)
        };
        let delta: u16 = if dec { 0xFFFF } else { 1 };
        self.set_hl(addr.wrapping_add(delta));

        let k = (val as u16) + (self.l as u16);
        self.set_block_io_flags(val, k);
        self.cycles += 16;
    }

    /// OTIR/OTDR — 21 T repeating / 16 T when done (B = 0).
    pub(crate) fn op_otir_otdr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        self.op_outi_outd(opcode, bus);
        if self.b != 0 {
            self.pc = self.pc.wrapping_sub(2);
            self.cycles += 5;
        }
    }

    fn set_block_io_flags(&mut self, val: u8, k: u16) {
        let b = self.b;
        let mut f = 0;
        if b == 0 {
            f |= Flag::Z as u8;
        }
        if (b & 0x80) != 0 {
            f |= Flag::S as u8;
        }
        f |= b & (Flag::X as u8 | Flag::Y as u8);
        if (val & 0x80) != 0 {
            f |= Flag::N as u8;
        }
        if k > 0xFF {
            f |= Flag::H as u8 | Flag::C as u8;
        }
        if Self::get_parity(((k & 0x07) as u8) ^ b) {
            f |= Flag::PV as u8;
        }
        self.f = f;
    }
}
