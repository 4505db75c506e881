use crate::core::Bus;
use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    /// Evaluate a condition code (3 bits from opcode bits 5-3).
    /// 0=NZ, 1=Z, 2=NC, 3=C, 4=PO, 5=PE, 6=P, 7=M
    pub(crate) fn eval_condition(&self, cc: u8) -> bool {
        match cc {
            0 => (self.f & Flag::Z as u8) == 0,  // NZ
            1 => (self.f & Flag::Z as u8) != 0,  // Z
            2 => (self.f & Flag::C as u8) == 0,  // NC
            3 => (self.f & Flag::C as u8) != 0,  // C
            4 => (self.f & Flag::PV as u8) == 0, // PO (parity odd)
            5 => (self.f & Flag::PV as u8) != 0, // PE (parity even)
            6 => (self.f & Flag::S as u8) == 0,  // P (positive)
            7 => (self.f & Flag::S as u8) != 0,  // M (minus)
            _ => unreachable!(),
        }
    }

    /// JP nn — 10 T
    pub(crate) fn op_jp_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        self.memptr = addr;
        self.pc = addr;
        self.cycles += 10;
    }

    /// JP cc,nn — 10 T both paths; the target lands in MEMPTR either way.
    pub(crate) fn op_jp_cc_nn<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let cc = (opcode >> 3) & 0x07;
        let addr = self.fetch16(bus);
        self.memptr = addr;
        if self.eval_condition(cc) {
            self.pc = addr;
        }
        self.cycles += 10;
    }

    /// JP (HL) — 4 T. Really "JP HL" (load PC from HL/IX/IY).
    pub(crate) fn op_jp_hl(&mut self) {
        self.pc = self.get_rp(2); // respects index mode
        self.cycles += 4;
    }

    /// JR e — 12 T
    pub(crate) fn op_jr_e<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let disp = self.fetch8(bus) as i8;
        self.pc = self.pc.wrapping_add(disp as i16 as u16);
        self.memptr = self.pc;
        self.cycles += 12;
    }

    /// JR cc,e — 12 T taken / 7 T not taken (NZ/Z/NC/C only)
    pub(crate) fn op_jr_cc_e<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let cc = (opcode >> 3) & 0x03;
        let disp = self.fetch8(bus) as i8;
        if self.eval_condition(cc) {
            self.pc = self.pc.wrapping_add(disp as i16 as u16);
            self.memptr = self.pc;
            self.cycles += 12;
        } else {
            self.cycles += 7;
        }
    }

    /// DJNZ e — 13 T taken / 8 T not taken
    pub(crate) fn op_djnz<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let disp = self.fetch8(bus) as i8;
        self.b = self.b.wrapping_sub(1);
        if self.b != 0 {
            self.pc = self.pc.wrapping_add(disp as i16 as u16);
            self.memptr = self.pc;
            self.cycles += 13;
        } else {
            self.cycles += 8;
        }
    }

    /// CALL nn — 17 T
    pub(crate) fn op_call_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        self.memptr = addr;
        let ret = self.pc;
        self.push16(bus, ret);
        self.pc = addr;
        self.cycles += 17;
    }

    /// CALL cc,nn — 17 T taken / 10 T not taken
    pub(crate) fn op_call_cc_nn<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let cc = (opcode >> 3) & 0x07;
        let addr = self.fetch16(bus);
        self.memptr = addr;
        if self.eval_condition(cc) {
            let ret = self.pc;
            self.push16(bus, ret);
            self.pc = addr;
            self.cycles += 17;
        } else {
            self.cycles += 10;
        }
    }

    /// RET — 10 T
    pub(crate) fn op_ret<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pop16(bus);
        self.memptr = self.pc;
        self.cycles += 10;
    }

    /// RET cc — 11 T taken / 5 T not taken
    pub(crate) fn op_ret_cc<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let cc = (opcode >> 3) & 0x07;
        if self.eval_condition(cc) {
            self.pc = self.pop16(bus);
            self.memptr = self.pc;
            self.cycles += 11;
        } else {
            self.cycles += 5;
        }
    }

    /// RST p — 11 T. Target is encoded in opcode bits 5-3.
    pub(crate) fn op_rst<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let ret = self.pc;
        self.push16(bus, ret);
        self.pc = (opcode & 0x38) as u16;
        self.memptr = self.pc;
        self.cycles += 11;
    }

    /// RETN/RETI — 14 T. IFF1 is restored from IFF2 (the NMI shadow).
    pub(crate) fn op_retn<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pop16(bus);
        self.memptr = self.pc;
        self.iff1 = self.iff2;
        self.cycles += 14;
    }
}
