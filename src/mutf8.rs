//! MUTF-8 string decoding.
//!
//! DEX stores strings as a ULEB128 UTF-16 code-unit count followed by
//! NUL-terminated modified UTF-8 (the Java dialect: overlong `C0 80` for
//! NUL, supplementary code points as CESU-8 surrogate pairs). The heavy
//! lifting is done by `cesu8`; this module adds the framing and checks
//! the declared count against what was actually decoded.

use crate::buffers::{read_u1, read_uleb128};
use crate::error::DexError;

/// Decode one `string_data_item` at `*ix`.
pub(crate) fn read_string(bytes: &[u8], ix: &mut usize) -> Result<String, DexError>
{
    let utf16_size = read_uleb128(bytes, ix)? as usize;

    let start = *ix;
    loop
    {
        if read_u1(bytes, ix)? == 0
        {
            break;
        }
    }
    let raw = &bytes[start..*ix - 1];

    let decoded = match cesu8::from_java_cesu8(raw)
    {
        Ok(s) => s.into_owned(),
        Err(_) => fail!("bad string: invalid MUTF-8 sequence"),
    };

    let code_units = decoded.encode_utf16().count();
    if code_units != utf16_size
    {
        fail!("bad string: declared {} utf16 units, decoded {}", utf16_size, code_units);
    }

    Ok(decoded)
}
