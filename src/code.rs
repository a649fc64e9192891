//! Method-body decoding: try/catch resolution and the two-pass
//! instruction traversal.
//!
//! Pass A discovers reachable instruction starts from `{0}` plus the
//! exception-handler addresses, validating branch targets, switch
//! payloads, and pool indices as it goes; anything undecodable is marked
//! and later surfaces as a `BadOp` placeholder. Pass B walks the
//! discovered starts in address order, interleaving labels (which may
//! land *inside* a preceding wider instruction) with fully decoded
//! operand sets.

use std::collections::{BTreeSet, VecDeque};

use log::warn;

use crate::buffers::{read_u2, read_u4, read_uleb128, read_sleb128, sbyte, sint, slice, sshort, ubyte, uint, ushort};
use crate::error::DexError;
use crate::ops::{op_info, Format, IndexType, Op, OpInfo};
use crate::reader::DexFileReader;
use crate::types::{DexLabel, Method};
use crate::visitor::{ArrayData, ConstValue, DexCodeVisitor};
use crate::Config;

fn check_target(info: &OpInfo, target: i64, insn_len: usize) -> Result<u32, DexError>
{
    if target < 0 || target * 2 > insn_len as i64
    {
        fail!("jump out of insn {} -> {:04x}", info.name, target);
    }
    Ok(target as u32)
}

/// A 64-bit literal stored as four little-endian code units.
fn wide_literal(insn: &[u8], offset: usize) -> Result<i64, DexError>
{
    let mut z: u64 = 0;
    for j in 0..4
    {
        z |= (ushort(insn, offset + 2 * j)? as u16 as u64) << (16 * j);
    }
    Ok(z as i64)
}

impl DexFileReader
{
    pub(crate) fn accept_code(
        &self,
        code_off: u32,
        dcv: &mut dyn DexCodeVisitor,
        config: Config,
        is_static: bool,
        method: &Method,
    ) -> Result<(), DexError>
    {
        let image = self.image();
        let mut ix = code_off as usize;
        let registers_size = read_u2(image, &mut ix)?;
        let _ins_size = read_u2(image, &mut ix)?;
        let _outs_size = read_u2(image, &mut ix)?;
        let tries_size = read_u2(image, &mut ix)?;
        let debug_info_off = read_u4(image, &mut ix)?;
        let insn_count = read_u4(image, &mut ix)? as usize;

        let insn = slice(image, ix, insn_count.checked_mul(2).ok_or_else(|| err!("instruction count overflow"))?)?;
        ix += insn.len();

        dcv.visit_register(registers_size);

        let mut labels: BTreeSet<u32> = BTreeSet::new();
        let mut handlers: BTreeSet<u32> = BTreeSet::new();

        if tries_size > 0
        {
            if insn_count & 1 != 0
            {
                ix += 2; // alignment padding
            }
            self.find_try_catch(&mut ix, dcv, tries_size, insn_count as u32, &mut labels, &mut handlers)?;
        }

        if debug_info_off != 0 && !config.contains(Config::SKIP_DEBUG)
        {
            if let Some(ddv) = dcv.visit_debug()
            {
                self.read_debug_info(debug_info_off, registers_size, is_static, method, &mut labels, ddv, config)?;
                ddv.visit_end();
            }
        }

        let mut visited: BTreeSet<u32> = BTreeSet::new();
        let mut bad_ops: BTreeSet<u32> = BTreeSet::new();
        self.find_labels(insn, &mut visited, &mut bad_ops, &mut labels, &handlers, method);
        self.accept_insn(insn, dcv, &visited, &bad_ops, &labels)?;

        dcv.visit_end();
        Ok(())
    }

    /// Parse `tries_size` try items plus the handler list that follows
    /// them, emitting `visit_try_catch` and collecting handler addresses
    /// as traversal roots.
    fn find_try_catch(
        &self,
        ix: &mut usize,
        dcv: &mut dyn DexCodeVisitor,
        tries_size: u16,
        insn_count: u32,
        labels: &mut BTreeSet<u32>,
        handlers: &mut BTreeSet<u32>,
    ) -> Result<(), DexError>
    {
        let image = self.image();
        let handler_list_base = *ix + tries_size as usize * 8;

        for _ in 0..tries_size
        {
            let start_addr = read_u4(image, ix)?;
            let range_count = read_u2(image, ix)? as u32;
            let handler_off = read_u2(image, ix)? as usize;
            if start_addr > insn_count
            {
                continue;
            }
            labels.insert(start_addr);
            let end = start_addr + range_count;
            labels.insert(end);

            let mut hix = handler_list_base + handler_off;
            let list_size = read_sleb128(image, &mut hix)?;
            // a non-positive count flags a trailing catch-all handler
            let catch_all = list_size <= 0;
            let typed = list_size.unsigned_abs() as usize;

            let mut handler_labels = Vec::with_capacity(typed + 1);
            let mut types: Vec<Option<String>> = Vec::with_capacity(typed + 1);

            for _ in 0..typed
            {
                let type_id = read_uleb128(image, &mut hix)?;
                let handler = read_uleb128(image, &mut hix)?;
                labels.insert(handler);
                handlers.insert(handler);
                types.push(Some(self.type_at(type_id)?));
                handler_labels.push(DexLabel(handler));
            }
            if catch_all
            {
                let handler = read_uleb128(image, &mut hix)?;
                labels.insert(handler);
                handlers.insert(handler);
                types.push(None);
                handler_labels.push(DexLabel(handler));
            }

            dcv.visit_try_catch(DexLabel(start_addr), DexLabel(end), &handler_labels, &types);
        }
        Ok(())
    }

    /// Pass A: reachability scan. Undecodable starts are recorded in
    /// `bad_ops` and warned about, never fatal.
    fn find_labels(
        &self,
        insn: &[u8],
        visited: &mut BTreeSet<u32>,
        bad_ops: &mut BTreeSet<u32>,
        labels: &mut BTreeSet<u32>,
        handlers: &BTreeSet<u32>,
        method: &Method,
    )
    {
        let mut q: VecDeque<u32> = VecDeque::new();
        q.push_back(0);
        q.extend(handlers.iter().copied());

        while let Some(offset) = q.pop_front()
        {
            if !visited.insert(offset)
            {
                continue;
            }
            if let Err(e) = self.travel_insn(labels, &mut q, insn, offset)
            {
                bad_ops.insert(offset);
                warn!("GLITCH: {:04x} {} | {}", offset, method, e);
            }
        }
    }

    fn travel_insn(
        &self,
        labels: &mut BTreeSet<u32>,
        q: &mut VecDeque<u32>,
        insn: &[u8],
        offset: u32,
    ) -> Result<(), DexError>
    {
        let u1offset = offset as usize * 2;
        if u1offset >= insn.len()
        {
            fail!("not enough space for reading instruction");
        }
        let opcode = insn[u1offset];
        let info = match op_info(opcode)
        {
            Some(info) => info,
            None => fail!("zero-width instruction op={:#04x}", opcode),
        };

        let mut can_continue = true;

        if info.can_branch()
        {
            let mut skip_target = false;
            let delta = match info.format
            {
                Format::Fmt10t => Some(sbyte(insn, u1offset + 1)? as i64),
                Format::Fmt20t | Format::Fmt21t => Some(sshort(insn, u1offset + 2)? as i64),
                Format::Fmt22t =>
                {
                    let u = ubyte(insn, u1offset + 1)?;
                    if (u & 0x0F) == (u >> 4) & 0x0F
                    {
                        match info.op
                        {
                            // always taken, equivalent to a goto
                            Op::IfEq | Op::IfGe | Op::IfLe => can_continue = false,
                            // never taken
                            Op::IfNe | Op::IfGt | Op::IfLt => skip_target = true,
                            _ => {}
                        }
                    }
                    Some(sshort(insn, u1offset + 2)? as i64)
                }
                Format::Fmt30t | Format::Fmt31t => Some(sint(insn, u1offset + 2)? as i64),
                _ => None,
            };
            if let Some(delta) = delta
            {
                if !skip_target
                {
                    let t = check_target(info, offset as i64 + delta, insn.len())?;
                    q.push_back(t);
                    labels.insert(t);
                }
            }
        }

        if info.can_switch()
        {
            // the fall-through is the switch's default target
            labels.insert(offset + info.format.size());

            let payload = 2 * (offset as i64 + sint(insn, u1offset + 2)? as i64);
            if payload < 0 || payload + 2 >= insn.len() as i64
            {
                fail!("bad payload offset for {}", info.name);
            }
            let payload = payload as usize;
            let marker = insn[payload + 1];
            if marker != 0x01 && marker != 0x02
            {
                fail!("bad payload for {}", info.name);
            }
            let size = ushort(insn, payload + 2)?;
            // packed data holds targets right after first_key, sparse
            // data puts them behind the key table
            let base = if marker == 0x01 { payload + 8 } else { payload + 4 + 4 * size as usize };
            for i in 0..size as usize
            {
                let target = offset as i64 + sint(insn, base + i * 4)? as i64;
                let t = check_target(info, target, insn.len())?;
                q.push_back(t);
                labels.insert(t);
            }
        }

        if can_continue && info.index_type != IndexType::None
        {
            let idx = if info.index_type == IndexType::StringRef && info.format == Format::Fmt31c
            {
                uint(insn, u1offset + 2)?
            }
            else
            {
                ushort(insn, u1offset + 2)?
            };
            let limit = match info.index_type
            {
                IndexType::StringRef => self.string_ids_size,
                IndexType::TypeRef => self.type_ids_size,
                IndexType::FieldRef => self.field_ids_size,
                IndexType::MethodRef => self.method_ids_size,
                IndexType::None => unreachable!(),
            };
            if idx < 0 || idx as u32 >= limit
            {
                fail!("index-out-of-range for {} index: {}", info.name, idx);
            }
        }

        if can_continue && info.can_continue()
        {
            if info.op == Op::Nop
            {
                // a NOP may really be a payload pseudo-instruction; skip
                // past the whole payload, not one code unit
                match ubyte(insn, u1offset + 1)?
                {
                    0x00 => q.push_back(offset + 1),
                    0x01 =>
                    {
                        let size = ushort(insn, u1offset + 2)?;
                        q.push_back(offset + size as u32 * 2 + 4);
                    }
                    0x02 =>
                    {
                        let size = ushort(insn, u1offset + 2)?;
                        q.push_back(offset + size as u32 * 4 + 2);
                    }
                    0x03 =>
                    {
                        let element_width = ushort(insn, u1offset + 2)?;
                        let size = uint(insn, u1offset + 4)?;
                        let next = offset as i64 + (size as i64 * element_width as i64 + 1) / 2 + 4;
                        if !(0..=u32::MAX as i64).contains(&next)
                        {
                            fail!("bad fill-array-data payload size {}", size);
                        }
                        q.push_back(next as u32);
                    }
                    _ => {}
                }
            }
            else
            {
                q.push_back(offset + info.format.size());
            }
        }

        Ok(())
    }

    /// Pass B: emission in address order, labels first at each offset.
    fn accept_insn(
        &self,
        insn: &[u8],
        dcv: &mut dyn DexCodeVisitor,
        visited: &BTreeSet<u32>,
        bad_ops: &BTreeSet<u32>,
        labels: &BTreeSet<u32>,
    ) -> Result<(), DexError>
    {
        let mut label_iter = labels.iter().copied().peekable();

        for &offset in visited
        {
            // a label may sit inside the preceding (wider) instruction;
            // emit every label at or before this offset first
            while let Some(&l) = label_iter.peek()
            {
                if l > offset
                {
                    break;
                }
                dcv.visit_label(DexLabel(l));
                label_iter.next();
            }

            if bad_ops.contains(&offset)
            {
                dcv.visit_stmt_0r(Op::BadOp);
                continue;
            }

            let u1offset = offset as usize * 2;
            let opcode = insn[u1offset];
            let info = match op_info(opcode)
            {
                Some(info) => info,
                None => fail!("zero-width instruction op={:#04x}", opcode),
            };
            let op = info.op;

            match info.format
            {
                Format::Fmt10x => dcv.visit_stmt_0r(op),
                Format::Fmt11x => dcv.visit_stmt_1r(op, ubyte(insn, u1offset + 1)?),
                Format::Fmt12x =>
                {
                    let a = ubyte(insn, u1offset + 1)?;
                    dcv.visit_stmt_2r(op, a & 0xF, a >> 4);
                }
                Format::Fmt10t | Format::Fmt20t | Format::Fmt30t =>
                {
                    let delta = match info.format
                    {
                        Format::Fmt10t => sbyte(insn, u1offset + 1)?,
                        Format::Fmt20t => sshort(insn, u1offset + 2)?,
                        _ => sint(insn, u1offset + 2)?,
                    };
                    dcv.visit_jump_stmt(op, -1, -1, DexLabel((offset as i64 + delta as i64) as u32));
                }
                Format::Fmt21t =>
                {
                    let target = offset as i64 + sshort(insn, u1offset + 2)? as i64;
                    dcv.visit_jump_stmt(op, ubyte(insn, u1offset + 1)?, -1, DexLabel(target as u32));
                }
                Format::Fmt22t =>
                {
                    let target = offset as i64 + sshort(insn, u1offset + 2)? as i64;
                    let a = ubyte(insn, u1offset + 1)?;
                    let b = a & 0x0F;
                    let c = a >> 4;
                    if b == c
                    {
                        match op
                        {
                            Op::IfEq | Op::IfGe | Op::IfLe =>
                            {
                                // always taken: degrade to a plain goto
                                dcv.visit_jump_stmt(Op::Goto, 0, 0, DexLabel(target as u32));
                            }
                            Op::IfNe | Op::IfGt | Op::IfLt =>
                            {
                                // never taken: nothing to emit
                            }
                            _ => dcv.visit_jump_stmt(op, b, c, DexLabel(target as u32)),
                        }
                    }
                    else
                    {
                        dcv.visit_jump_stmt(op, b, c, DexLabel(target as u32));
                    }
                }
                Format::Fmt31t => self.accept_payload_insn(insn, dcv, offset, info)?,
                Format::Fmt21c =>
                {
                    let a = ubyte(insn, u1offset + 1)?;
                    let b = ushort(insn, u1offset + 2)?;
                    match info.index_type
                    {
                        IndexType::StringRef =>
                        {
                            dcv.visit_const_stmt(op, a, ConstValue::String(self.string_at(b as u32)?));
                        }
                        IndexType::FieldRef =>
                        {
                            dcv.visit_field_stmt(op, a, -1, self.get_field(b as u32)?);
                        }
                        IndexType::TypeRef =>
                        {
                            if op == Op::ConstClass
                            {
                                dcv.visit_const_stmt(op, a, ConstValue::Type(self.type_at(b as u32)?));
                            }
                            else
                            {
                                dcv.visit_type_stmt(op, a, -1, self.type_at(b as u32)?);
                            }
                        }
                        _ => {}
                    }
                }
                Format::Fmt22c =>
                {
                    let a = ubyte(insn, u1offset + 1)?;
                    let b = ushort(insn, u1offset + 2)?;
                    match info.index_type
                    {
                        IndexType::FieldRef =>
                        {
                            dcv.visit_field_stmt(op, a & 0xF, a >> 4, self.get_field(b as u32)?);
                        }
                        IndexType::TypeRef =>
                        {
                            dcv.visit_type_stmt(op, a & 0xF, a >> 4, self.type_at(b as u32)?);
                        }
                        _ => {}
                    }
                }
                Format::Fmt31c =>
                {
                    if info.index_type == IndexType::StringRef
                    {
                        let a = ubyte(insn, u1offset + 1)?;
                        let b = uint(insn, u1offset + 2)?;
                        dcv.visit_const_stmt(op, a, ConstValue::String(self.string_at(b as u32)?));
                    }
                }
                Format::Fmt35c | Format::Fmt3rc =>
                {
                    let a = ubyte(insn, u1offset + 1)?;
                    let b = ushort(insn, u1offset + 2)?;
                    let regs = if info.format == Format::Fmt35c
                    {
                        let dc = ubyte(insn, u1offset + 4)?;
                        let fe = ubyte(insn, u1offset + 5)?;
                        let count = (a >> 4) as usize;
                        let mut regs = vec![0i32; count];
                        if count <= 5
                        {
                            if count >= 5
                            {
                                regs[4] = a & 0xF;
                            }
                            if count >= 4
                            {
                                regs[3] = (fe >> 4) & 0xF;
                            }
                            if count >= 3
                            {
                                regs[2] = fe & 0xF;
                            }
                            if count >= 2
                            {
                                regs[1] = (dc >> 4) & 0xF;
                            }
                            if count >= 1
                            {
                                regs[0] = dc & 0xF;
                            }
                        }
                        regs
                    }
                    else
                    {
                        // range form: a consecutive registers from CCCC
                        let c = ushort(insn, u1offset + 4)?;
                        (0..a).map(|i| c + i).collect()
                    };
                    if info.index_type == IndexType::TypeRef
                    {
                        dcv.visit_filled_new_array_stmt(op, &regs, self.type_at(b as u32)?);
                    }
                    else
                    {
                        dcv.visit_method_stmt(op, &regs, self.get_method(b as u32)?);
                    }
                }
                Format::Fmt22x =>
                {
                    dcv.visit_stmt_2r(op, ubyte(insn, u1offset + 1)?, ushort(insn, u1offset + 2)?);
                }
                Format::Fmt23x =>
                {
                    dcv.visit_stmt_3r(
                        op,
                        ubyte(insn, u1offset + 1)?,
                        ubyte(insn, u1offset + 2)?,
                        ubyte(insn, u1offset + 3)?,
                    );
                }
                Format::Fmt32x =>
                {
                    dcv.visit_stmt_2r(op, ushort(insn, u1offset + 2)?, ushort(insn, u1offset + 4)?);
                }
                Format::Fmt11n =>
                {
                    let a = sbyte(insn, u1offset + 1)?;
                    dcv.visit_const_stmt(op, a & 0xF, ConstValue::Int(a >> 4));
                }
                Format::Fmt21h =>
                {
                    let a = ubyte(insn, u1offset + 1)?;
                    let b = sshort(insn, u1offset + 2)?;
                    if op == Op::ConstHigh16
                    {
                        dcv.visit_const_stmt(op, a, ConstValue::Int(b << 16));
                    }
                    else
                    {
                        dcv.visit_const_stmt(op, a, ConstValue::Long((b as i64) << 48));
                    }
                }
                Format::Fmt21s | Format::Fmt31i =>
                {
                    let a = ubyte(insn, u1offset + 1)?;
                    let b = if info.format == Format::Fmt21s
                    {
                        sshort(insn, u1offset + 2)?
                    }
                    else
                    {
                        sint(insn, u1offset + 2)?
                    };
                    // const/16 and const stay 32-bit, the wide forms sign-extend
                    if op == Op::Const16 || op == Op::Const
                    {
                        dcv.visit_const_stmt(op, a, ConstValue::Int(b));
                    }
                    else
                    {
                        dcv.visit_const_stmt(op, a, ConstValue::Long(b as i64));
                    }
                }
                Format::Fmt22b =>
                {
                    dcv.visit_stmt_2r1n(
                        op,
                        ubyte(insn, u1offset + 1)?,
                        ubyte(insn, u1offset + 2)?,
                        sbyte(insn, u1offset + 3)?,
                    );
                }
                Format::Fmt22s =>
                {
                    let a = ubyte(insn, u1offset + 1)?;
                    let b = sshort(insn, u1offset + 2)?;
                    dcv.visit_stmt_2r1n(op, a & 0xF, a >> 4, b);
                }
                Format::Fmt51l =>
                {
                    let a = ubyte(insn, u1offset + 1)?;
                    dcv.visit_const_stmt(op, a, ConstValue::Long(wide_literal(insn, u1offset + 2)?));
                }
            }
        }

        for l in label_iter
        {
            dcv.visit_label(DexLabel(l));
        }
        Ok(())
    }

    /// `31t` instructions reference a payload: fill-array-data copies the
    /// typed element data, the two switches resolve their target tables.
    fn accept_payload_insn(
        &self,
        insn: &[u8],
        dcv: &mut dyn DexCodeVisitor,
        offset: u32,
        info: &OpInfo,
    ) -> Result<(), DexError>
    {
        let u1offset = offset as usize * 2;
        let target = offset as i64 + sint(insn, u1offset + 2)? as i64;
        let a = ubyte(insn, u1offset + 1)?;
        if target < 0
        {
            fail!("bad payload offset for {}", info.name);
        }
        let payload = target as usize * 2;

        match info.op
        {
            Op::FillArrayData =>
            {
                let element_width = ushort(insn, payload + 2)?;
                let size = uint(insn, payload + 4)?;
                if size < 0
                {
                    fail!("bad fill-array-data payload size {}", size);
                }
                let size = size as usize;
                let base = payload + 8;
                match element_width
                {
                    1 =>
                    {
                        let mut data = Vec::with_capacity(size);
                        for i in 0..size
                        {
                            data.push(sbyte(insn, base + i)? as i8);
                        }
                        dcv.visit_fill_array_data_stmt(info.op, a, ArrayData::Byte(data));
                    }
                    2 =>
                    {
                        let mut data = Vec::with_capacity(size);
                        for i in 0..size
                        {
                            data.push(sshort(insn, base + 2 * i)? as i16);
                        }
                        dcv.visit_fill_array_data_stmt(info.op, a, ArrayData::Short(data));
                    }
                    4 =>
                    {
                        let mut data = Vec::with_capacity(size);
                        for i in 0..size
                        {
                            data.push(sint(insn, base + 4 * i)?);
                        }
                        dcv.visit_fill_array_data_stmt(info.op, a, ArrayData::Int(data));
                    }
                    8 =>
                    {
                        let mut data = Vec::with_capacity(size);
                        for i in 0..size
                        {
                            data.push(wide_literal(insn, base + 8 * i)?);
                        }
                        dcv.visit_fill_array_data_stmt(info.op, a, ArrayData::Long(data));
                    }
                    w => warn!("GLITCH: bad fill-array-data element width {}", w),
                }
            }
            Op::SparseSwitch =>
            {
                let size = sshort(insn, payload + 2)?;
                if size < 0
                {
                    fail!("bad switch payload size {}", size);
                }
                let size = size as usize;
                let mut keys = Vec::with_capacity(size);
                let mut targets = Vec::with_capacity(size);
                let mut z = payload + 4;
                for _ in 0..size
                {
                    keys.push(sint(insn, z)?);
                    z += 4;
                }
                for _ in 0..size
                {
                    targets.push(DexLabel((offset as i64 + sint(insn, z)? as i64) as u32));
                    z += 4;
                }
                dcv.visit_sparse_switch_stmt(info.op, a, &keys, &targets);
            }
            _ =>
            {
                // packed-switch
                let size = sshort(insn, payload + 2)?;
                if size < 0
                {
                    fail!("bad switch payload size {}", size);
                }
                let size = size as usize;
                let first_key = sint(insn, payload + 4)?;
                let mut targets = Vec::with_capacity(size);
                let mut z = payload + 8;
                for _ in 0..size
                {
                    targets.push(DexLabel((offset as i64 + sint(insn, z)? as i64) as u32));
                    z += 4;
                }
                dcv.visit_packed_switch_stmt(info.op, a, first_key, &targets);
            }
        }
        Ok(())
    }
}
