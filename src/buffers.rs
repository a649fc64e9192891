//! Primitive little-endian reads over the DEX byte image.
//!
//! Two addressing styles coexist: cursor reads (`read_*`, advancing a
//! caller-owned `&mut usize`) for sequentially encoded items, and
//! offset-addressed reads (`ubyte`..`uint`) for random access into an
//! instruction array. Both are bounds checked and never panic.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::DexError;
use crate::leb;

pub(crate) fn read_u1(bytes: &[u8], ix: &mut usize) -> Result<u8, DexError>
{
    if bytes.len() < *ix + 1
    {
        fail!("unexpected end of stream reading u1 at index {}", *ix);
    }
    let result = bytes[*ix];
    *ix += 1;
    Ok(result)
}

pub(crate) fn read_u2(bytes: &[u8], ix: &mut usize) -> Result<u16, DexError>
{
    if bytes.len() < *ix + 2
    {
        fail!("unexpected end of stream reading u2 at index {}", *ix);
    }
    let result = LittleEndian::read_u16(&bytes[*ix..]);
    *ix += 2;
    Ok(result)
}

pub(crate) fn read_u4(bytes: &[u8], ix: &mut usize) -> Result<u32, DexError>
{
    if bytes.len() < *ix + 4
    {
        fail!("unexpected end of stream reading u4 at index {}", *ix);
    }
    let result = LittleEndian::read_u32(&bytes[*ix..]);
    *ix += 4;
    Ok(result)
}

pub(crate) fn read_uleb128(bytes: &[u8], ix: &mut usize) -> Result<u32, DexError>
{
    let (val, size) = leb::decode_uleb128(&bytes[(*ix).min(bytes.len())..])?;
    *ix += size;
    Ok(val)
}

pub(crate) fn read_uleb128p1(bytes: &[u8], ix: &mut usize) -> Result<i32, DexError>
{
    let (val, size) = leb::decode_uleb128p1(&bytes[(*ix).min(bytes.len())..])?;
    *ix += size;
    Ok(val)
}

pub(crate) fn read_sleb128(bytes: &[u8], ix: &mut usize) -> Result<i32, DexError>
{
    let (val, size) = leb::decode_sleb128(&bytes[(*ix).min(bytes.len())..])?;
    *ix += size;
    Ok(val)
}

/// Encoded-value scalar: `hint` carries `length - 1` in bits 5..7; read
/// that many bytes little-endian and sign-extend to 64 bits.
pub(crate) fn read_int_bits(bytes: &[u8], ix: &mut usize, hint: u8) -> Result<i64, DexError>
{
    let length = ((hint >> 5) & 0x7) as usize + 1;
    let mut value: u64 = 0;
    for j in 0..length
    {
        value |= (read_u1(bytes, ix)? as u64) << (j * 8);
    }
    let shift = (8 - length) * 8;
    Ok(((value << shift) as i64) >> shift)
}

/// As [`read_int_bits`] without the sign extension.
pub(crate) fn read_uint_bits(bytes: &[u8], ix: &mut usize, hint: u8) -> Result<u64, DexError>
{
    let length = ((hint >> 5) & 0x7) as usize + 1;
    let mut value: u64 = 0;
    for j in 0..length
    {
        value |= (read_u1(bytes, ix)? as u64) << (j * 8);
    }
    Ok(value)
}

/// Float/double scalar: bytes are left-aligned in the 64-bit word, the
/// DEX writer having dropped the zero low-order bytes.
pub(crate) fn read_float_bits(bytes: &[u8], ix: &mut usize, hint: u8) -> Result<u64, DexError>
{
    let length = ((hint >> 5) & 0x7) as usize + 1;
    let mut value: u64 = 0;
    for j in 0..length
    {
        value |= (read_u1(bytes, ix)? as u64) << (j * 8);
    }
    Ok(value << ((8 - length) * 8))
}

/// Carve a read-only window out of the image.
pub(crate) fn slice(bytes: &[u8], offset: usize, length: usize) -> Result<&[u8], DexError>
{
    match offset.checked_add(length)
    {
        Some(end) if end <= bytes.len() => Ok(&bytes[offset..end]),
        _ => Err(err!("section [{:#x}..+{:#x}] outside the image ({} bytes)", offset, length, bytes.len())),
    }
}

// Offset-addressed reads into an instruction array. All return i32 so the
// traversal arithmetic matches the signed code-unit offsets it produces.

pub(crate) fn ubyte(data: &[u8], offset: usize) -> Result<i32, DexError>
{
    match data.get(offset)
    {
        Some(&b) => Ok(b as i32),
        None => Err(err!("unexpected end of stream reading u1 at index {}", offset)),
    }
}

pub(crate) fn sbyte(data: &[u8], offset: usize) -> Result<i32, DexError>
{
    Ok(ubyte(data, offset)? as i8 as i32)
}

pub(crate) fn ushort(data: &[u8], offset: usize) -> Result<i32, DexError>
{
    if data.len() < offset + 2
    {
        fail!("unexpected end of stream reading u2 at index {}", offset);
    }
    Ok(LittleEndian::read_u16(&data[offset..]) as i32)
}

pub(crate) fn sshort(data: &[u8], offset: usize) -> Result<i32, DexError>
{
    Ok(ushort(data, offset)? as i16 as i32)
}

pub(crate) fn sint(data: &[u8], offset: usize) -> Result<i32, DexError>
{
    if data.len() < offset + 4
    {
        fail!("unexpected end of stream reading u4 at index {}", offset);
    }
    Ok(LittleEndian::read_u32(&data[offset..]) as i32)
}

pub(crate) fn uint(data: &[u8], offset: usize) -> Result<i32, DexError>
{
    sint(data, offset)
}
