//! The DEX debug-info state machine.
//!
//! A `debug_info_item` is a little bytecode program over the state
//! `(address, line, locals)`; executing it yields parameter names, local
//! variable liveness, line numbers, and prologue/epilogue marks. Every
//! emitted event materializes the label for its address in the method's
//! label map so pass B interleaves it correctly.

use std::collections::BTreeSet;

use log::debug;

use crate::buffers::{read_u1, read_uleb128, read_uleb128p1, read_sleb128};
use crate::error::DexError;
use crate::reader::DexFileReader;
use crate::types::{DexLabel, Method};
use crate::visitor::DexDebugVisitor;
use crate::Config;

const DBG_END_SEQUENCE: u8 = 0x00;
const DBG_ADVANCE_PC: u8 = 0x01;
const DBG_ADVANCE_LINE: u8 = 0x02;
const DBG_START_LOCAL: u8 = 0x03;
const DBG_START_LOCAL_EXTENDED: u8 = 0x04;
const DBG_END_LOCAL: u8 = 0x05;
const DBG_RESTART_LOCAL: u8 = 0x06;
const DBG_SET_PROLOGUE_END: u8 = 0x07;
const DBG_SET_EPILOGUE_BEGIN: u8 = 0x08;
const DBG_SET_FILE: u8 = 0x09;
const DBG_FIRST_SPECIAL: u8 = 0x0a;
const DBG_LINE_BASE: i32 = -4;
const DBG_LINE_RANGE: u32 = 15;

#[derive(Clone)]
struct LocalEntry
{
    name: Option<String>,
    type_desc: Option<String>,
    signature: Option<String>,
}

fn set_entry(entries: &mut [Option<LocalEntry>], reg: usize, entry: LocalEntry) -> Result<(), DexError>
{
    match entries.get_mut(reg)
    {
        Some(slot) =>
        {
            *slot = Some(entry);
            Ok(())
        }
        None => Err(err!("local register v{} out of range", reg)),
    }
}

impl DexFileReader
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn read_debug_info(
        &self,
        offset: u32,
        reg_size: u16,
        is_static: bool,
        method: &Method,
        labels: &mut BTreeSet<u32>,
        ddv: &mut dyn DexDebugVisitor,
        config: Config,
    ) -> Result<(), DexError>
    {
        let image = self.image();
        let trace = config.contains(Config::ENABLE_DEBUG_LOG);
        let mut ix = offset as usize;

        let mut address: u32 = 0;
        let mut line: i32 = read_uleb128(image, &mut ix)? as i32;
        let sz_params = read_uleb128(image, &mut ix)? as usize;

        let mut last_entry: Vec<Option<LocalEntry>> = vec![None; reg_size as usize];

        // parameters live in the top registers; wide types take two slots
        let args_size: u32 = method
            .parameter_types
            .iter()
            .map(|p| if p == "J" || p == "D" { 2 } else { 1 })
            .sum();
        let mut cur_reg = (reg_size as u32)
            .checked_sub(args_size)
            .ok_or_else(|| err!("{} argument slots do not fit in {} registers", args_size, reg_size))?;

        if !is_static
        {
            // implicit `this` sits just below the declared parameters
            let this_reg = cur_reg
                .checked_sub(1)
                .ok_or_else(|| err!("no register left for this"))?;
            set_entry(
                &mut last_entry,
                this_reg as usize,
                LocalEntry {
                    name: Some("this".to_string()),
                    type_desc: Some(method.owner.clone()),
                    signature: None,
                },
            )?;
            if trace
            {
                debug!("v{} :this, {}", this_reg, method.owner);
            }
        }

        if sz_params > method.parameter_types.len()
        {
            fail!("debug info names {} parameters, method has {}", sz_params, method.parameter_types.len());
        }
        for i in 0..sz_params
        {
            let param_type = &method.parameter_types[i];
            let name_idx = read_uleb128p1(image, &mut ix)?;
            let name = self.get_string(name_idx)?;
            set_entry(
                &mut last_entry,
                cur_reg as usize,
                LocalEntry {
                    name: name.clone(),
                    type_desc: Some(param_type.clone()),
                    signature: None,
                },
            )?;
            if let Some(ref n) = name
            {
                ddv.visit_parameter_name(i, n);
            }
            if trace
            {
                debug!("v{} :{:?}, {}", cur_reg, name, param_type);
            }
            cur_reg += 1;
            if param_type == "J" || param_type == "D"
            {
                cur_reg += 1;
            }
        }

        loop
        {
            let opcode = read_u1(image, &mut ix)?;
            match opcode
            {
                DBG_END_SEQUENCE => return Ok(()),

                DBG_ADVANCE_PC => address = address.wrapping_add(read_uleb128(image, &mut ix)?),

                DBG_ADVANCE_LINE => line = line.wrapping_add(read_sleb128(image, &mut ix)?),

                DBG_START_LOCAL | DBG_START_LOCAL_EXTENDED =>
                {
                    let reg = read_uleb128(image, &mut ix)?;
                    let name_idx = read_uleb128p1(image, &mut ix)?;
                    let type_idx = read_uleb128p1(image, &mut ix)?;
                    let signature = if opcode == DBG_START_LOCAL_EXTENDED
                    {
                        let sig_idx = read_uleb128p1(image, &mut ix)?;
                        self.get_string(sig_idx)?
                    }
                    else
                    {
                        None
                    };
                    let name = self.get_string(name_idx)?;
                    let type_desc = self.get_type(type_idx)?;
                    if trace
                    {
                        debug!("Start: v{} :{:?}, {:?} // {:?}", reg, name, type_desc, signature);
                    }
                    set_entry(
                        &mut last_entry,
                        reg as usize,
                        LocalEntry {
                            name: name.clone(),
                            type_desc: type_desc.clone(),
                            signature: signature.clone(),
                        },
                    )?;
                    labels.insert(address);
                    ddv.visit_start_local(
                        reg,
                        DexLabel(address),
                        name.as_deref(),
                        type_desc.as_deref(),
                        signature.as_deref(),
                    );
                }

                DBG_RESTART_LOCAL =>
                {
                    let reg = read_uleb128(image, &mut ix)?;
                    let entry = last_entry
                        .get(reg as usize)
                        .and_then(|e| e.as_ref())
                        .ok_or_else(|| err!("RESTART_LOCAL on unknown register v{}", reg))?;
                    if trace
                    {
                        debug!("Restart: v{} :{:?}, {:?} // {:?}", reg, entry.name, entry.type_desc, entry.signature);
                    }
                    labels.insert(address);
                    ddv.visit_restart_local(reg, DexLabel(address));
                }

                DBG_END_LOCAL =>
                {
                    let reg = read_uleb128(image, &mut ix)?;
                    let entry = last_entry
                        .get(reg as usize)
                        .and_then(|e| e.as_ref())
                        .ok_or_else(|| err!("END_LOCAL on unknown register v{}", reg))?;
                    if trace
                    {
                        debug!("End: v{} :{:?}, {:?} // {:?}", reg, entry.name, entry.type_desc, entry.signature);
                    }
                    labels.insert(address);
                    ddv.visit_end_local(reg, DexLabel(address));
                }

                DBG_SET_PROLOGUE_END =>
                {
                    labels.insert(address);
                    ddv.visit_prologue(DexLabel(address));
                }

                DBG_SET_EPILOGUE_BEGIN =>
                {
                    labels.insert(address);
                    ddv.visit_epilogue(DexLabel(address));
                }

                DBG_SET_FILE =>
                {
                    // source file name index, not exposed
                    let _ = read_uleb128p1(image, &mut ix)?;
                }

                special =>
                {
                    let adj = (special - DBG_FIRST_SPECIAL) as u32;
                    address = address.wrapping_add(adj / DBG_LINE_RANGE);
                    line = line.wrapping_add(DBG_LINE_BASE + (adj % DBG_LINE_RANGE) as i32);
                    labels.insert(address);
                    if trace
                    {
                        debug!("line {} @{:04x}", line, address);
                    }
                    ddv.visit_line_number(line, DexLabel(address));
                }
            }
        }
    }
}
