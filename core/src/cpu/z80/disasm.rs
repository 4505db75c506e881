//! Z80 disassembler, a debug aid for trace logging and interactive
//! inspection. Reads memory through side-effect-free peeks (direct pages
//! only) so disassembling never perturbs hooked hardware.
//!
//! Templates use `#` for a 16-bit immediate, `*` for an 8-bit immediate,
//! `%` for a relative-branch target, and `(hl)` is rewritten to the
//! indexed form under DD/FD. Literals render as `$XXXX`/`$XX`.

use crate::cpu::z80::Z80;

#[rustfmt::skip]
const MAIN: [&str; 256] = [
    // 0x00
    "nop",        "ld bc,#",    "ld (bc),a",  "inc bc",     "inc b",      "dec b",      "ld b,*",     "rlca",
    "ex af,af'",  "add hl,bc",  "ld a,(bc)",  "dec bc",     "inc c",      "dec c",      "ld c,*",     "rrca",
    // 0x10
    "djnz %",     "ld de,#",    "ld (de),a",  "inc de",     "inc d",      "dec d",      "ld d,*",     "rla",
    "jr %",       "add hl,de",  "ld a,(de)",  "dec de",     "inc e",      "dec e",      "ld e,*",     "rra",
    // 0x20
    "jr nz,%",    "ld hl,#",    "ld (#),hl",  "inc hl",     "inc h",      "dec h",      "ld h,*",     "daa",
    "jr z,%",     "add hl,hl",  "ld hl,(#)",  "dec hl",     "inc l",      "dec l",      "ld l,*",     "cpl",
    // 0x30
    "jr nc,%",    "ld sp,#",    "ld (#),a",   "inc sp",     "inc (hl)",   "dec (hl)",   "ld (hl),*",  "scf",
    "jr c,%",     "add hl,sp",  "ld a,(#)",   "dec sp",     "inc a",      "dec a",      "ld a,*",     "ccf",
    // 0x40
    "ld b,b",     "ld b,c",     "ld b,d",     "ld b,e",     "ld b,h",     "ld b,l",     "ld b,(hl)",  "ld b,a",
    "ld c,b",     "ld c,c",     "ld c,d",     "ld c,e",     "ld c,h",     "ld c,l",     "ld c,(hl)",  "ld c,a",
    // 0x50
    "ld d,b",     "ld d,c",     "ld d,d",     "ld d,e",     "ld d,h",     "ld d,l",     "ld d,(hl)",  "ld d,a",
    "ld e,b",     "ld e,c",     "ld e,d",     "ld e,e",     "ld e,h",     "ld e,l",     "ld e,(hl)",  "ld e,a",
    // 0x60
    "ld h,b",     "ld h,c",     "ld h,d",     "ld h,e",     "ld h,h",     "ld h,l",     "ld h,(hl)",  "ld h,a",
    "ld l,b",     "ld l,c",     "ld l,d",     "ld l,e",     "ld l,h",     "ld l,l",     "ld l,(hl)",  "ld l,a",
    // 0x70
    "ld (hl),b",  "ld (hl),c",  "ld (hl),d",  "ld (hl),e",  "ld (hl),h",  "ld (hl),l",  "halt",       "ld (hl),a",
    "ld a,b",     "ld a,c",     "ld a,d",     "ld a,e",     "ld a,h",     "ld a,l",     "ld a,(hl)",  "ld a,a",
    // 0x80
    "add a,b",    "add a,c",    "add a,d",    "add a,e",    "add a,h",    "add a,l",    "add a,(hl)", "add a,a",
    "adc a,b",    "adc a,c",    "adc a,d",    "adc a,e",    "adc a,h",    "adc a,l",    "adc a,(hl)", "adc a,a",
    // 0x90
    "sub b",      "sub c",      "sub d",      "sub e",      "sub h",      "sub l",      "sub (hl)",   "sub a",
    "sbc a,b",    "sbc a,c",    "sbc a,d",    "sbc a,e",    "sbc a,h",    "sbc a,l",    "sbc a,(hl)", "sbc a,a",
    // 0xA0
    "and b",      "and c",      "and d",      "and e",      "and h",      "and l",      "and (hl)",   "and a",
    "xor b",      "xor c",      "xor d",      "xor e",      "xor h",      "xor l",      "xor (hl)",   "xor a",
    // 0xB0
    "or b",       "or c",       "or d",       "or e",       "or h",       "or l",       "or (hl)",    "or a",
    "cp b",       "cp c",       "cp d",       "cp e",       "cp h",       "cp l",       "cp (hl)",    "cp a",
    // 0xC0
    "ret nz",     "pop bc",     "jp nz,#",    "jp #",       "call nz,#",  "push bc",    "add a,*",    "rst $00",
    "ret z",      "ret",        "jp z,#",     "?",          "call z,#",   "call #",     "adc a,*",    "rst $08",
    // 0xD0
    "ret nc",     "pop de",     "jp nc,#",    "out (*),a",  "call nc,#",  "push de",    "sub *",      "rst $10",
    "ret c",      "exx",        "jp c,#",     "in a,(*)",   "call c,#",   "?",          "sbc a,*",    "rst $18",
    // 0xE0
    "ret po",     "pop hl",     "jp po,#",    "ex (sp),hl", "call po,#",  "push hl",    "and *",      "rst $20",
    "ret pe",     "jp (hl)",    "jp pe,#",    "ex de,hl",   "call pe,#",  "?",          "xor *",      "rst $28",
    // 0xF0
    "ret p",      "pop af",     "jp p,#",     "di",         "call p,#",   "push af",    "or *",       "rst $30",
    "ret m",      "ld sp,hl",   "jp m,#",     "ei",         "call m,#",   "?",          "cp *",       "rst $38",
];

const REG8: [&str; 8] = ["b", "c", "d", "e", "h", "l", "(hl)", "a"];
const ROT: [&str; 8] = ["rlc", "rrc", "rl", "rr", "sla", "sra", "sll", "srl"];
const RP: [&str; 4] = ["bc", "de", "hl", "sp"];

fn cb_mnemonic(op: u8) -> String {
    let yyy = (op >> 3) & 0x07;
    let reg = REG8[(op & 0x07) as usize];
    match op >> 6 {
        0 => format!("{} {}", ROT[yyy as usize], reg),
        1 => format!("bit {},{}", yyy, reg),
        2 => format!("res {},{}", yyy, reg),
        _ => format!("set {},{}", yyy, reg),
    }
}

fn ed_template(op: u8) -> Option<String> {
    let fixed = match op {
        0x47 => "ld i,a",
        0x4F => "ld r,a",
        0x57 => "ld a,i",
        0x5F => "ld a,r",
        0x67 => "rrd",
        0x6F => "rld",
        0x4D | 0x5D | 0x6D | 0x7D => "reti",
        0x70 => "in (c)",
        0x71 => "out (c),0",
        0xA0 => "ldi",
        0xA1 => "cpi",
        0xA2 => "ini",
        0xA3 => "outi",
        0xA8 => "ldd",
        0xA9 => "cpd",
        0xAA => "ind",
        0xAB => "outd",
        0xB0 => "ldir",
        0xB1 => "cpir",
        0xB2 => "inir",
        0xB3 => "otir",
        0xB8 => "lddr",
        0xB9 => "cpdr",
        0xBA => "indr",
        0xBB => "otdr",
        _ => "",
    };
    if !fixed.is_empty() {
        return Some(fixed.to_string());
    }

    let rp = RP[((op >> 4) & 0x03) as usize];
    match op {
        op if (op & 0xC7) == 0x40 => Some(format!("in {},(c)", REG8[((op >> 3) & 7) as usize])),
        op if (op & 0xC7) == 0x41 => Some(format!("out (c),{}", REG8[((op >> 3) & 7) as usize])),
        op if (op & 0xCF) == 0x42 => Some(format!("sbc hl,{}", rp)),
        op if (op & 0xCF) == 0x43 => Some(format!("ld (#),{}", rp)),
        op if (op & 0xC7) == 0x44 => Some("neg".to_string()),
        op if (op & 0xC7) == 0x45 => Some("retn".to_string()),
        op if (op & 0xC7) == 0x46 => Some(
            match op {
                0x56 | 0x76 => "im 1",
                0x5E | 0x7E => "im 2",
                _ => "im 0",
            }
            .to_string(),
        ),
        op if (op & 0xCF) == 0x4A => Some(format!("adc hl,{}", rp)),
        op if (op & 0xCF) == 0x4B => Some(format!("ld {},(#)", rp)),
        _ => None,
    }
}

/// Rewrite a main-table template for a DD/FD prefix: `(hl)` becomes the
/// displaced form, HL/H/L operands become the index register and its
/// undocumented halves. EX DE,HL is exempt and JP (HL) has no displacement.
fn index_template(main: &str, reg: &str) -> String {
    if main == "ex de,hl" {
        return main.to_string();
    }
    if main == "jp (hl)" {
        return format!("jp ({})", reg);
    }
    if main.contains("(hl)") {
        return main.replace("(hl)", &format!("({}+d)", reg));
    }
    let Some((mnemonic, operands)) = main.split_once(' ') else {
        return main.to_string();
    };
    let mapped: Vec<String> = operands
        .split(',')
        .map(|operand| match operand {
            "hl" => reg.to_string(),
            "h" => format!("{}h", reg),
            "l" => format!("{}l", reg),
            other => other.to_string(),
        })
        .collect();
    format!("{} {}", mnemonic, mapped.join(","))
}

fn index_cb_mnemonic(op: u8, reg: &str, disp: i8) -> String {
    let yyy = (op >> 3) & 0x07;
    let zzz = (op & 0x07) as usize;
    let mem = format!("({}{})", reg, signed_disp(disp));
    match op >> 6 {
        1 => format!("bit {},{}", yyy, mem),
        0 if zzz != 6 => format!("{} {},{}", ROT[yyy as usize], mem, REG8[zzz]),
        0 => format!("{} {}", ROT[yyy as usize], mem),
        2 if zzz != 6 => format!("res {},{},{}", yyy, mem, REG8[zzz]),
        2 => format!("res {},{}", yyy, mem),
        3 if zzz != 6 => format!("set {},{},{}", yyy, mem, REG8[zzz]),
        _ => format!("set {},{}", yyy, mem),
    }
}

fn signed_disp(disp: i8) -> String {
    if disp < 0 {
        format!("-${:02X}", (disp as i16).unsigned_abs())
    } else {
        format!("+${:02X}", disp)
    }
}

impl Z80 {
    /// Disassemble the instruction at `pc`: returns the formatted line
    /// (address, raw bytes, mnemonic) and the address of the next
    /// instruction.
    pub fn disassemble(&self, pc: u16) -> (String, u16) {
        let mut p = pc;
        let mut bytes: Vec<u8> = Vec::new();

        let mut take = |p: &mut u16, bytes: &mut Vec<u8>| -> u8 {
            let val = self.mem.peek(*p);
            *p = p.wrapping_add(1);
            bytes.push(val);
            val
        };

        let op = take(&mut p, &mut bytes);
        let template = match op {
            0xCB => {
                let sub = take(&mut p, &mut bytes);
                cb_mnemonic(sub)
            }
            0xED => {
                let sub = take(&mut p, &mut bytes);
                ed_template(sub).unwrap_or_else(|| "?".to_string())
            }
            0xDD | 0xFD => {
                let reg = if op == 0xDD { "ix" } else { "iy" };
                let sub = take(&mut p, &mut bytes);
                match sub {
                    0xCB => {
                        let disp = take(&mut p, &mut bytes) as i8;
                        let sub_op = take(&mut p, &mut bytes);
                        index_cb_mnemonic(sub_op, reg, disp)
                    }
                    // A further prefix byte restarts decoding; show the
                    // dangling prefix as a no-op-sized unknown.
                    0xDD | 0xED | 0xFD => {
                        p = p.wrapping_sub(1);
                        bytes.pop();
                        "?".to_string()
                    }
                    _ => index_template(MAIN[sub as usize], reg),
                }
            }
            _ => MAIN[op as usize].to_string(),
        };

        let text = self.expand(&template, &mut p, &mut bytes);

        let byte_str = bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        (format!("${:04X}: {:<11}  {}", pc, byte_str, text), p)
    }

    /// Fill a template's operand slots from the instruction stream.
    fn expand(&self, template: &str, p: &mut u16, bytes: &mut Vec<u8>) -> String {
        let mut take = |p: &mut u16, bytes: &mut Vec<u8>| -> u8 {
            let val = self.mem.peek(*p);
            *p = p.wrapping_add(1);
            bytes.push(val);
            val
        };

        let mut out = String::with_capacity(template.len() + 8);
        let mut chars = template.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '#' => {
                    let lo = take(p, bytes) as u16;
                    let hi = take(p, bytes) as u16;
                    out.push_str(&format!("${:04X}", (hi << 8) | lo));
                }
                '*' => {
                    let val = take(p, bytes);
                    out.push_str(&format!("${:02X}", val));
                }
                '%' => {
                    let disp = take(p, bytes) as i8;
                    let target = p.wrapping_add(disp as i16 as u16);
                    out.push_str(&format!("${:04X}", target));
                }
                '+' if chars.peek() == Some(&'d') => {
                    chars.next();
                    let disp = take(p, bytes) as i8;
                    out.push_str(&signed_disp(disp));
                }
                _ => out.push(ch),
            }
        }
        out
    }
}
