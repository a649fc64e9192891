//! The Dalvik `035` opcode map: one record per assigned opcode byte with
//! its format, pool-index kind, and traversal flags.
//!
//! The table drives both traversal passes: discovery asks `can_branch` /
//! `can_switch` / `can_continue` and `format.size()`, emission switches
//! on `format` and `index_type`.

use bitflags::bitflags;
use once_cell::sync::Lazy;

bitflags! {
    pub struct OpFlags: u8 {
        const CAN_CONTINUE = 0x1;
        const CAN_BRANCH = 0x2;
        const CAN_SWITCH = 0x4;
    }
}

/// Instruction encoding formats of the 035 instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format
{
    Fmt10x,
    Fmt12x,
    Fmt11n,
    Fmt11x,
    Fmt10t,
    Fmt20t,
    Fmt22x,
    Fmt21t,
    Fmt21s,
    Fmt21h,
    Fmt21c,
    Fmt23x,
    Fmt22b,
    Fmt22t,
    Fmt22s,
    Fmt22c,
    Fmt30t,
    Fmt32x,
    Fmt31i,
    Fmt31t,
    Fmt31c,
    Fmt35c,
    Fmt3rc,
    Fmt51l,
}

impl Format
{
    /// Instruction width in 16-bit code units.
    pub const fn size(self) -> u32
    {
        match self
        {
            Format::Fmt10x | Format::Fmt12x | Format::Fmt11n | Format::Fmt11x | Format::Fmt10t => 1,

            Format::Fmt20t
            | Format::Fmt22x
            | Format::Fmt21t
            | Format::Fmt21s
            | Format::Fmt21h
            | Format::Fmt21c
            | Format::Fmt23x
            | Format::Fmt22b
            | Format::Fmt22t
            | Format::Fmt22s
            | Format::Fmt22c => 2,

            Format::Fmt30t
            | Format::Fmt32x
            | Format::Fmt31i
            | Format::Fmt31t
            | Format::Fmt31c
            | Format::Fmt35c
            | Format::Fmt3rc => 3,

            Format::Fmt51l => 5,
        }
    }
}

/// What kind of pool index the instruction's B operand carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType
{
    None,
    StringRef,
    TypeRef,
    FieldRef,
    MethodRef,
}

/// One Dalvik opcode. Discriminants are the opcode byte values; `BadOp`
/// is the placeholder emitted for undecodable instruction starts.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op
{
    Nop = 0x00,
    Move = 0x01,
    MoveFrom16 = 0x02,
    Move16 = 0x03,
    MoveWide = 0x04,
    MoveWideFrom16 = 0x05,
    MoveWide16 = 0x06,
    MoveObject = 0x07,
    MoveObjectFrom16 = 0x08,
    MoveObject16 = 0x09,
    MoveResult = 0x0a,
    MoveResultWide = 0x0b,
    MoveResultObject = 0x0c,
    MoveException = 0x0d,
    ReturnVoid = 0x0e,
    Return = 0x0f,
    ReturnWide = 0x10,
    ReturnObject = 0x11,
    Const4 = 0x12,
    Const16 = 0x13,
    Const = 0x14,
    ConstHigh16 = 0x15,
    ConstWide16 = 0x16,
    ConstWide32 = 0x17,
    ConstWide = 0x18,
    ConstWideHigh16 = 0x19,
    ConstString = 0x1a,
    ConstStringJumbo = 0x1b,
    ConstClass = 0x1c,
    MonitorEnter = 0x1d,
    MonitorExit = 0x1e,
    CheckCast = 0x1f,
    InstanceOf = 0x20,
    ArrayLength = 0x21,
    NewInstance = 0x22,
    NewArray = 0x23,
    FilledNewArray = 0x24,
    FilledNewArrayRange = 0x25,
    FillArrayData = 0x26,
    Throw = 0x27,
    Goto = 0x28,
    Goto16 = 0x29,
    Goto32 = 0x2a,
    PackedSwitch = 0x2b,
    SparseSwitch = 0x2c,
    CmplFloat = 0x2d,
    CmpgFloat = 0x2e,
    CmplDouble = 0x2f,
    CmpgDouble = 0x30,
    CmpLong = 0x31,
    IfEq = 0x32,
    IfNe = 0x33,
    IfLt = 0x34,
    IfGe = 0x35,
    IfGt = 0x36,
    IfLe = 0x37,
    IfEqz = 0x38,
    IfNez = 0x39,
    IfLtz = 0x3a,
    IfGez = 0x3b,
    IfGtz = 0x3c,
    IfLez = 0x3d,
    Aget = 0x44,
    AgetWide = 0x45,
    AgetObject = 0x46,
    AgetBoolean = 0x47,
    AgetByte = 0x48,
    AgetChar = 0x49,
    AgetShort = 0x4a,
    Aput = 0x4b,
    AputWide = 0x4c,
    AputObject = 0x4d,
    AputBoolean = 0x4e,
    AputByte = 0x4f,
    AputChar = 0x50,
    AputShort = 0x51,
    Iget = 0x52,
    IgetWide = 0x53,
    IgetObject = 0x54,
    IgetBoolean = 0x55,
    IgetByte = 0x56,
    IgetChar = 0x57,
    IgetShort = 0x58,
    Iput = 0x59,
    IputWide = 0x5a,
    IputObject = 0x5b,
    IputBoolean = 0x5c,
    IputByte = 0x5d,
    IputChar = 0x5e,
    IputShort = 0x5f,
    Sget = 0x60,
    SgetWide = 0x61,
    SgetObject = 0x62,
    SgetBoolean = 0x63,
    SgetByte = 0x64,
    SgetChar = 0x65,
    SgetShort = 0x66,
    Sput = 0x67,
    SputWide = 0x68,
    SputObject = 0x69,
    SputBoolean = 0x6a,
    SputByte = 0x6b,
    SputChar = 0x6c,
    SputShort = 0x6d,
    InvokeVirtual = 0x6e,
    InvokeSuper = 0x6f,
    InvokeDirect = 0x70,
    InvokeStatic = 0x71,
    InvokeInterface = 0x72,
    InvokeVirtualRange = 0x74,
    InvokeSuperRange = 0x75,
    InvokeDirectRange = 0x76,
    InvokeStaticRange = 0x77,
    InvokeInterfaceRange = 0x78,
    NegInt = 0x7b,
    NotInt = 0x7c,
    NegLong = 0x7d,
    NotLong = 0x7e,
    NegFloat = 0x7f,
    NegDouble = 0x80,
    IntToLong = 0x81,
    IntToFloat = 0x82,
    IntToDouble = 0x83,
    LongToInt = 0x84,
    LongToFloat = 0x85,
    LongToDouble = 0x86,
    FloatToInt = 0x87,
    FloatToLong = 0x88,
    FloatToDouble = 0x89,
    DoubleToInt = 0x8a,
    DoubleToLong = 0x8b,
    DoubleToFloat = 0x8c,
    IntToByte = 0x8d,
    IntToChar = 0x8e,
    IntToShort = 0x8f,
    AddInt = 0x90,
    SubInt = 0x91,
    MulInt = 0x92,
    DivInt = 0x93,
    RemInt = 0x94,
    AndInt = 0x95,
    OrInt = 0x96,
    XorInt = 0x97,
    ShlInt = 0x98,
    ShrInt = 0x99,
    UshrInt = 0x9a,
    AddLong = 0x9b,
    SubLong = 0x9c,
    MulLong = 0x9d,
    DivLong = 0x9e,
    RemLong = 0x9f,
    AndLong = 0xa0,
    OrLong = 0xa1,
    XorLong = 0xa2,
    ShlLong = 0xa3,
    ShrLong = 0xa4,
    UshrLong = 0xa5,
    AddFloat = 0xa6,
    SubFloat = 0xa7,
    MulFloat = 0xa8,
    DivFloat = 0xa9,
    RemFloat = 0xaa,
    AddDouble = 0xab,
    SubDouble = 0xac,
    MulDouble = 0xad,
    DivDouble = 0xae,
    RemDouble = 0xaf,
    AddInt2Addr = 0xb0,
    SubInt2Addr = 0xb1,
    MulInt2Addr = 0xb2,
    DivInt2Addr = 0xb3,
    RemInt2Addr = 0xb4,
    AndInt2Addr = 0xb5,
    OrInt2Addr = 0xb6,
    XorInt2Addr = 0xb7,
    ShlInt2Addr = 0xb8,
    ShrInt2Addr = 0xb9,
    UshrInt2Addr = 0xba,
    AddLong2Addr = 0xbb,
    SubLong2Addr = 0xbc,
    MulLong2Addr = 0xbd,
    DivLong2Addr = 0xbe,
    RemLong2Addr = 0xbf,
    AndLong2Addr = 0xc0,
    OrLong2Addr = 0xc1,
    XorLong2Addr = 0xc2,
    ShlLong2Addr = 0xc3,
    ShrLong2Addr = 0xc4,
    UshrLong2Addr = 0xc5,
    AddFloat2Addr = 0xc6,
    SubFloat2Addr = 0xc7,
    MulFloat2Addr = 0xc8,
    DivFloat2Addr = 0xc9,
    RemFloat2Addr = 0xca,
    AddDouble2Addr = 0xcb,
    SubDouble2Addr = 0xcc,
    MulDouble2Addr = 0xcd,
    DivDouble2Addr = 0xce,
    RemDouble2Addr = 0xcf,
    AddIntLit16 = 0xd0,
    RsubInt = 0xd1,
    MulIntLit16 = 0xd2,
    DivIntLit16 = 0xd3,
    RemIntLit16 = 0xd4,
    AndIntLit16 = 0xd5,
    OrIntLit16 = 0xd6,
    XorIntLit16 = 0xd7,
    AddIntLit8 = 0xd8,
    RsubIntLit8 = 0xd9,
    MulIntLit8 = 0xda,
    DivIntLit8 = 0xdb,
    RemIntLit8 = 0xdc,
    AndIntLit8 = 0xdd,
    OrIntLit8 = 0xde,
    XorIntLit8 = 0xdf,
    ShlIntLit8 = 0xe0,
    ShrIntLit8 = 0xe1,
    UshrIntLit8 = 0xe2,
    /// Placeholder for an instruction start that failed to decode.
    BadOp = 0x100,
}

impl Op
{
    /// The Dalvik mnemonic, or `"bad-opcode"` for [`Op::BadOp`].
    pub fn name(self) -> &'static str
    {
        if self == Op::BadOp
        {
            return "bad-opcode";
        }
        match &OPS[self as usize]
        {
            Some(info) => info.name,
            None => "unknown",
        }
    }
}

/// Per-opcode attributes: fixed for the lifetime of the instruction set.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo
{
    pub op: Op,
    pub name: &'static str,
    pub format: Format,
    pub index_type: IndexType,
    flags: OpFlags,
}

impl OpInfo
{
    pub fn can_continue(&self) -> bool
    {
        self.flags.contains(OpFlags::CAN_CONTINUE)
    }

    pub fn can_branch(&self) -> bool
    {
        self.flags.contains(OpFlags::CAN_BRANCH)
    }

    pub fn can_switch(&self) -> bool
    {
        self.flags.contains(OpFlags::CAN_SWITCH)
    }
}

/// Look up the attribute record for an opcode byte; `None` for the
/// unassigned gaps of the 035 map.
pub fn op_info(opcode: u8) -> Option<&'static OpInfo>
{
    OPS[opcode as usize].as_ref()
}

static OPS: Lazy<[Option<OpInfo>; 256]> = Lazy::new(|| {
    use Format::*;
    use IndexType::*;
    use Op::*;

    let cont = OpFlags::CAN_CONTINUE;
    let none = OpFlags::empty();
    let branch = OpFlags::CAN_BRANCH;
    let cond = OpFlags::CAN_CONTINUE | OpFlags::CAN_BRANCH;
    let switch = OpFlags::CAN_CONTINUE | OpFlags::CAN_SWITCH;

    let mut t: [Option<OpInfo>; 256] = [Option::None; 256];
    let mut def = |op: Op, name: &'static str, format: Format, index_type: IndexType, flags: OpFlags| {
        t[op as usize] = Option::Some(OpInfo { op, name, format, index_type, flags });
    };

    def(Nop, "nop", Fmt10x, None, cont);
    def(Move, "move", Fmt12x, None, cont);
    def(MoveFrom16, "move/from16", Fmt22x, None, cont);
    def(Move16, "move/16", Fmt32x, None, cont);
    def(MoveWide, "move-wide", Fmt12x, None, cont);
    def(MoveWideFrom16, "move-wide/from16", Fmt22x, None, cont);
    def(MoveWide16, "move-wide/16", Fmt32x, None, cont);
    def(MoveObject, "move-object", Fmt12x, None, cont);
    def(MoveObjectFrom16, "move-object/from16", Fmt22x, None, cont);
    def(MoveObject16, "move-object/16", Fmt32x, None, cont);
    def(MoveResult, "move-result", Fmt11x, None, cont);
    def(MoveResultWide, "move-result-wide", Fmt11x, None, cont);
    def(MoveResultObject, "move-result-object", Fmt11x, None, cont);
    def(MoveException, "move-exception", Fmt11x, None, cont);
    def(ReturnVoid, "return-void", Fmt10x, None, none);
    def(Return, "return", Fmt11x, None, none);
    def(ReturnWide, "return-wide", Fmt11x, None, none);
    def(ReturnObject, "return-object", Fmt11x, None, none);
    def(Const4, "const/4", Fmt11n, None, cont);
    def(Const16, "const/16", Fmt21s, None, cont);
    def(Const, "const", Fmt31i, None, cont);
    def(ConstHigh16, "const/high16", Fmt21h, None, cont);
    def(ConstWide16, "const-wide/16", Fmt21s, None, cont);
    def(ConstWide32, "const-wide/32", Fmt31i, None, cont);
    def(ConstWide, "const-wide", Fmt51l, None, cont);
    def(ConstWideHigh16, "const-wide/high16", Fmt21h, None, cont);
    def(ConstString, "const-string", Fmt21c, StringRef, cont);
    def(ConstStringJumbo, "const-string/jumbo", Fmt31c, StringRef, cont);
    def(ConstClass, "const-class", Fmt21c, TypeRef, cont);
    def(MonitorEnter, "monitor-enter", Fmt11x, None, cont);
    def(MonitorExit, "monitor-exit", Fmt11x, None, cont);
    def(CheckCast, "check-cast", Fmt21c, TypeRef, cont);
    def(InstanceOf, "instance-of", Fmt22c, TypeRef, cont);
    def(ArrayLength, "array-length", Fmt12x, None, cont);
    def(NewInstance, "new-instance", Fmt21c, TypeRef, cont);
    def(NewArray, "new-array", Fmt22c, TypeRef, cont);
    def(FilledNewArray, "filled-new-array", Fmt35c, TypeRef, cont);
    def(FilledNewArrayRange, "filled-new-array/range", Fmt3rc, TypeRef, cont);
    def(FillArrayData, "fill-array-data", Fmt31t, None, cont);
    def(Throw, "throw", Fmt11x, None, none);
    def(Goto, "goto", Fmt10t, None, branch);
    def(Goto16, "goto/16", Fmt20t, None, branch);
    def(Goto32, "goto/32", Fmt30t, None, branch);
    def(PackedSwitch, "packed-switch", Fmt31t, None, switch);
    def(SparseSwitch, "sparse-switch", Fmt31t, None, switch);
    def(CmplFloat, "cmpl-float", Fmt23x, None, cont);
    def(CmpgFloat, "cmpg-float", Fmt23x, None, cont);
    def(CmplDouble, "cmpl-double", Fmt23x, None, cont);
    def(CmpgDouble, "cmpg-double", Fmt23x, None, cont);
    def(CmpLong, "cmp-long", Fmt23x, None, cont);
    def(IfEq, "if-eq", Fmt22t, None, cond);
    def(IfNe, "if-ne", Fmt22t, None, cond);
    def(IfLt, "if-lt", Fmt22t, None, cond);
    def(IfGe, "if-ge", Fmt22t, None, cond);
    def(IfGt, "if-gt", Fmt22t, None, cond);
    def(IfLe, "if-le", Fmt22t, None, cond);
    def(IfEqz, "if-eqz", Fmt21t, None, cond);
    def(IfNez, "if-nez", Fmt21t, None, cond);
    def(IfLtz, "if-ltz", Fmt21t, None, cond);
    def(IfGez, "if-gez", Fmt21t, None, cond);
    def(IfGtz, "if-gtz", Fmt21t, None, cond);
    def(IfLez, "if-lez", Fmt21t, None, cond);
    def(Aget, "aget", Fmt23x, None, cont);
    def(AgetWide, "aget-wide", Fmt23x, None, cont);
    def(AgetObject, "aget-object", Fmt23x, None, cont);
    def(AgetBoolean, "aget-boolean", Fmt23x, None, cont);
    def(AgetByte, "aget-byte", Fmt23x, None, cont);
    def(AgetChar, "aget-char", Fmt23x, None, cont);
    def(AgetShort, "aget-short", Fmt23x, None, cont);
    def(Aput, "aput", Fmt23x, None, cont);
    def(AputWide, "aput-wide", Fmt23x, None, cont);
    def(AputObject, "aput-object", Fmt23x, None, cont);
    def(AputBoolean, "aput-boolean", Fmt23x, None, cont);
    def(AputByte, "aput-byte", Fmt23x, None, cont);
    def(AputChar, "aput-char", Fmt23x, None, cont);
    def(AputShort, "aput-short", Fmt23x, None, cont);
    def(Iget, "iget", Fmt22c, FieldRef, cont);
    def(IgetWide, "iget-wide", Fmt22c, FieldRef, cont);
    def(IgetObject, "iget-object", Fmt22c, FieldRef, cont);
    def(IgetBoolean, "iget-boolean", Fmt22c, FieldRef, cont);
    def(IgetByte, "iget-byte", Fmt22c, FieldRef, cont);
    def(IgetChar, "iget-char", Fmt22c, FieldRef, cont);
    def(IgetShort, "iget-short", Fmt22c, FieldRef, cont);
    def(Iput, "iput", Fmt22c, FieldRef, cont);
    def(IputWide, "iput-wide", Fmt22c, FieldRef, cont);
    def(IputObject, "iput-object", Fmt22c, FieldRef, cont);
    def(IputBoolean, "iput-boolean", Fmt22c, FieldRef, cont);
    def(IputByte, "iput-byte", Fmt22c, FieldRef, cont);
    def(IputChar, "iput-char", Fmt22c, FieldRef, cont);
    def(IputShort, "iput-short", Fmt22c, FieldRef, cont);
    def(Sget, "sget", Fmt21c, FieldRef, cont);
    def(SgetWide, "sget-wide", Fmt21c, FieldRef, cont);
    def(SgetObject, "sget-object", Fmt21c, FieldRef, cont);
    def(SgetBoolean, "sget-boolean", Fmt21c, FieldRef, cont);
    def(SgetByte, "sget-byte", Fmt21c, FieldRef, cont);
    def(SgetChar, "sget-char", Fmt21c, FieldRef, cont);
    def(SgetShort, "sget-short", Fmt21c, FieldRef, cont);
    def(Sput, "sput", Fmt21c, FieldRef, cont);
    def(SputWide, "sput-wide", Fmt21c, FieldRef, cont);
    def(SputObject, "sput-object", Fmt21c, FieldRef, cont);
    def(SputBoolean, "sput-boolean", Fmt21c, FieldRef, cont);
    def(SputByte, "sput-byte", Fmt21c, FieldRef, cont);
    def(SputChar, "sput-char", Fmt21c, FieldRef, cont);
    def(SputShort, "sput-short", Fmt21c, FieldRef, cont);
    def(InvokeVirtual, "invoke-virtual", Fmt35c, MethodRef, cont);
    def(InvokeSuper, "invoke-super", Fmt35c, MethodRef, cont);
    def(InvokeDirect, "invoke-direct", Fmt35c, MethodRef, cont);
    def(InvokeStatic, "invoke-static", Fmt35c, MethodRef, cont);
    def(InvokeInterface, "invoke-interface", Fmt35c, MethodRef, cont);
    def(InvokeVirtualRange, "invoke-virtual/range", Fmt3rc, MethodRef, cont);
    def(InvokeSuperRange, "invoke-super/range", Fmt3rc, MethodRef, cont);
    def(InvokeDirectRange, "invoke-direct/range", Fmt3rc, MethodRef, cont);
    def(InvokeStaticRange, "invoke-static/range", Fmt3rc, MethodRef, cont);
    def(InvokeInterfaceRange, "invoke-interface/range", Fmt3rc, MethodRef, cont);
    def(NegInt, "neg-int", Fmt12x, None, cont);
    def(NotInt, "not-int", Fmt12x, None, cont);
    def(NegLong, "neg-long", Fmt12x, None, cont);
    def(NotLong, "not-long", Fmt12x, None, cont);
    def(NegFloat, "neg-float", Fmt12x, None, cont);
    def(NegDouble, "neg-double", Fmt12x, None, cont);
    def(IntToLong, "int-to-long", Fmt12x, None, cont);
    def(IntToFloat, "int-to-float", Fmt12x, None, cont);
    def(IntToDouble, "int-to-double", Fmt12x, None, cont);
    def(LongToInt, "long-to-int", Fmt12x, None, cont);
    def(LongToFloat, "long-to-float", Fmt12x, None, cont);
    def(LongToDouble, "long-to-double", Fmt12x, None, cont);
    def(FloatToInt, "float-to-int", Fmt12x, None, cont);
    def(FloatToLong, "float-to-long", Fmt12x, None, cont);
    def(FloatToDouble, "float-to-double", Fmt12x, None, cont);
    def(DoubleToInt, "double-to-int", Fmt12x, None, cont);
    def(DoubleToLong, "double-to-long", Fmt12x, None, cont);
    def(DoubleToFloat, "double-to-float", Fmt12x, None, cont);
    def(IntToByte, "int-to-byte", Fmt12x, None, cont);
    def(IntToChar, "int-to-char", Fmt12x, None, cont);
    def(IntToShort, "int-to-short", Fmt12x, None, cont);
    def(AddInt, "add-int", Fmt23x, None, cont);
    def(SubInt, "sub-int", Fmt23x, None, cont);
    def(MulInt, "mul-int", Fmt23x, None, cont);
    def(DivInt, "div-int", Fmt23x, None, cont);
    def(RemInt, "rem-int", Fmt23x, None, cont);
    def(AndInt, "and-int", Fmt23x, None, cont);
    def(OrInt, "or-int", Fmt23x, None, cont);
    def(XorInt, "xor-int", Fmt23x, None, cont);
    def(ShlInt, "shl-int", Fmt23x, None, cont);
    def(ShrInt, "shr-int", Fmt23x, None, cont);
    def(UshrInt, "ushr-int", Fmt23x, None, cont);
    def(AddLong, "add-long", Fmt23x, None, cont);
    def(SubLong, "sub-long", Fmt23x, None, cont);
    def(MulLong, "mul-long", Fmt23x, None, cont);
    def(DivLong, "div-long", Fmt23x, None, cont);
    def(RemLong, "rem-long", Fmt23x, None, cont);
    def(AndLong, "and-long", Fmt23x, None, cont);
    def(OrLong, "or-long", Fmt23x, None, cont);
    def(XorLong, "xor-long", Fmt23x, None, cont);
    def(ShlLong, "shl-long", Fmt23x, None, cont);
    def(ShrLong, "shr-long", Fmt23x, None, cont);
    def(UshrLong, "ushr-long", Fmt23x, None, cont);
    def(AddFloat, "add-float", Fmt23x, None, cont);
    def(SubFloat, "sub-float", Fmt23x, None, cont);
    def(MulFloat, "mul-float", Fmt23x, None, cont);
    def(DivFloat, "div-float", Fmt23x, None, cont);
    def(RemFloat, "rem-float", Fmt23x, None, cont);
    def(AddDouble, "add-double", Fmt23x, None, cont);
    def(SubDouble, "sub-double", Fmt23x, None, cont);
    def(MulDouble, "mul-double", Fmt23x, None, cont);
    def(DivDouble, "div-double", Fmt23x, None, cont);
    def(RemDouble, "rem-double", Fmt23x, None, cont);
    def(AddInt2Addr, "add-int/2addr", Fmt12x, None, cont);
    def(SubInt2Addr, "sub-int/2addr", Fmt12x, None, cont);
    def(MulInt2Addr, "mul-int/2addr", Fmt12x, None, cont);
    def(DivInt2Addr, "div-int/2addr", Fmt12x, None, cont);
    def(RemInt2Addr, "rem-int/2addr", Fmt12x, None, cont);
    def(AndInt2Addr, "and-int/2addr", Fmt12x, None, cont);
    def(OrInt2Addr, "or-int/2addr", Fmt12x, None, cont);
    def(XorInt2Addr, "xor-int/2addr", Fmt12x, None, cont);
    def(ShlInt2Addr, "shl-int/2addr", Fmt12x, None, cont);
    def(ShrInt2Addr, "shr-int/2addr", Fmt12x, None, cont);
    def(UshrInt2Addr, "ushr-int/2addr", Fmt12x, None, cont);
    def(AddLong2Addr, "add-long/2addr", Fmt12x, None, cont);
    def(SubLong2Addr, "sub-long/2addr", Fmt12x, None, cont);
    def(MulLong2Addr, "mul-long/2addr", Fmt12x, None, cont);
    def(DivLong2Addr, "div-long/2addr", Fmt12x, None, cont);
    def(RemLong2Addr, "rem-long/2addr", Fmt12x, None, cont);
    def(AndLong2Addr, "and-long/2addr", Fmt12x, None, cont);
    def(OrLong2Addr, "or-long/2addr", Fmt12x, None, cont);
    def(XorLong2Addr, "xor-long/2addr", Fmt12x, None, cont);
    def(ShlLong2Addr, "shl-long/2addr", Fmt12x, None, cont);
    def(ShrLong2Addr, "shr-long/2addr", Fmt12x, None, cont);
    def(UshrLong2Addr, "ushr-long/2addr", Fmt12x, None, cont);
    def(AddFloat2Addr, "add-float/2addr", Fmt12x, None, cont);
    def(SubFloat2Addr, "sub-float/2addr", Fmt12x, None, cont);
    def(MulFloat2Addr, "mul-float/2addr", Fmt12x, None, cont);
    def(DivFloat2Addr, "div-float/2addr", Fmt12x, None, cont);
    def(RemFloat2Addr, "rem-float/2addr", Fmt12x, None, cont);
    def(AddDouble2Addr, "add-double/2addr", Fmt12x, None, cont);
    def(SubDouble2Addr, "sub-double/2addr", Fmt12x, None, cont);
    def(MulDouble2Addr, "mul-double/2addr", Fmt12x, None, cont);
    def(DivDouble2Addr, "div-double/2addr", Fmt12x, None, cont);
    def(RemDouble2Addr, "rem-double/2addr", Fmt12x, None, cont);
    def(AddIntLit16, "add-int/lit16", Fmt22s, None, cont);
    def(RsubInt, "rsub-int", Fmt22s, None, cont);
    def(MulIntLit16, "mul-int/lit16", Fmt22s, None, cont);
    def(DivIntLit16, "div-int/lit16", Fmt22s, None, cont);
    def(RemIntLit16, "rem-int/lit16", Fmt22s, None, cont);
    def(AndIntLit16, "and-int/lit16", Fmt22s, None, cont);
    def(OrIntLit16, "or-int/lit16", Fmt22s, None, cont);
    def(XorIntLit16, "xor-int/lit16", Fmt22s, None, cont);
    def(AddIntLit8, "add-int/lit8", Fmt22b, None, cont);
    def(RsubIntLit8, "rsub-int/lit8", Fmt22b, None, cont);
    def(MulIntLit8, "mul-int/lit8", Fmt22b, None, cont);
    def(DivIntLit8, "div-int/lit8", Fmt22b, None, cont);
    def(RemIntLit8, "rem-int/lit8", Fmt22b, None, cont);
    def(AndIntLit8, "and-int/lit8", Fmt22b, None, cont);
    def(OrIntLit8, "or-int/lit8", Fmt22b, None, cont);
    def(XorIntLit8, "xor-int/lit8", Fmt22b, None, cont);
    def(ShlIntLit8, "shl-int/lit8", Fmt22b, None, cont);
    def(ShrIntLit8, "shr-int/lit8", Fmt22b, None, cont);
    def(UshrIntLit8, "ushr-int/lit8", Fmt22b, None, cont);

    t
});
