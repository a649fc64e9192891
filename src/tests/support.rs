//! Test support: a small in-memory DEX image builder and a visitor that
//! collects the whole event stream into comparable node trees.

use crate::encoded_values::Value;
use crate::leb::{encode_sleb128, encode_uleb128, encode_uleb128p1};
use crate::ops::Op;
use crate::types::{DexLabel, Field, Method, Visibility};
use crate::visitor::*;

pub const NO_IDX: u32 = 0xFFFF_FFFF;

fn w2(out: &mut Vec<u8>, v: u16)
{
    out.extend_from_slice(&v.to_le_bytes());
}

fn w4(out: &mut Vec<u8>, v: u32)
{
    out.extend_from_slice(&v.to_le_bytes());
}

fn uleb(out: &mut Vec<u8>, v: u32)
{
    out.extend(encode_uleb128(v));
}

fn align4(out: &mut Vec<u8>)
{
    while out.len() % 4 != 0
    {
        out.push(0);
    }
}

/* ---------------- image builder ---------------- */

#[derive(Default)]
pub struct DexImage
{
    pub strings: Vec<String>,
    /// type_id entries, each a string index
    pub types: Vec<u32>,
    /// (shorty string idx, return type idx, parameter type idxs)
    pub protos: Vec<(u32, u32, Vec<u16>)>,
    /// (owner type idx, type idx, name string idx)
    pub fields: Vec<(u16, u16, u32)>,
    /// (owner type idx, proto idx, name string idx)
    pub methods: Vec<(u16, u16, u32)>,
    pub classes: Vec<ClassDef>,
}

pub struct ClassDef
{
    pub class_type: u32,
    pub access_flags: u32,
    pub superclass: u32,
    pub source_file: u32,
    pub interfaces: Vec<u16>,
    pub annotations: Option<AnnotationsDir>,
    pub data: Option<ClassData>,
    /// raw `encoded_array` bytes
    pub static_values: Option<Vec<u8>>,
}

impl ClassDef
{
    pub fn new(class_type: u32, superclass: u32) -> ClassDef
    {
        ClassDef {
            class_type,
            access_flags: 0x1, // public
            superclass,
            source_file: NO_IDX,
            interfaces: vec![],
            annotations: None,
            data: None,
            static_values: None,
        }
    }
}

#[derive(Default)]
pub struct ClassData
{
    /// (absolute field idx, access flags)
    pub static_fields: Vec<(u32, u32)>,
    pub instance_fields: Vec<(u32, u32)>,
    pub direct_methods: Vec<MethodDef>,
    pub virtual_methods: Vec<MethodDef>,
}

pub struct MethodDef
{
    pub method_idx: u32,
    pub access_flags: u32,
    pub code: Option<Code>,
}

#[derive(Default)]
pub struct Code
{
    pub registers: u16,
    pub ins: u16,
    pub insns: Vec<u16>,
    pub tries: Vec<TryItem>,
    /// raw `debug_info_item` bytes
    pub debug: Option<Vec<u8>>,
}

pub struct TryItem
{
    pub start: u32,
    pub count: u16,
    /// (type idx, handler address)
    pub handlers: Vec<(u32, u32)>,
    pub catch_all: Option<u32>,
}

#[derive(Default)]
pub struct AnnotationsDir
{
    /// raw `annotation_item`s on the class itself
    pub class_annotations: Vec<Vec<u8>>,
    /// field idx -> raw `annotation_item`s
    pub field_annotations: Vec<(u32, Vec<Vec<u8>>)>,
    pub method_annotations: Vec<(u32, Vec<Vec<u8>>)>,
    /// method idx -> per-parameter annotation sets (None = no set)
    pub parameter_annotations: Vec<(u32, Vec<Option<Vec<Vec<u8>>>>)>,
}

impl DexImage
{
    pub fn build(&self) -> Vec<u8>
    {
        let data_base = 0x70
            + 4 * self.strings.len()
            + 4 * self.types.len()
            + 12 * self.protos.len()
            + 8 * self.fields.len()
            + 8 * self.methods.len()
            + 32 * self.classes.len();

        let mut data: Vec<u8> = vec![];

        let mut string_offs = vec![];
        for s in &self.strings
        {
            string_offs.push((data_base + data.len()) as u32);
            uleb(&mut data, s.encode_utf16().count() as u32);
            data.extend_from_slice(&cesu8::to_java_cesu8(s));
            data.push(0);
        }

        let mut proto_param_offs = vec![];
        for (_, _, params) in &self.protos
        {
            proto_param_offs.push(emit_type_list(&mut data, data_base, params));
        }

        struct ClassOffs
        {
            interfaces: u32,
            annotations: u32,
            class_data: u32,
            static_values: u32,
        }

        let mut class_offs = vec![];
        for class in &self.classes
        {
            let interfaces = emit_type_list(&mut data, data_base, &class.interfaces);

            let annotations = match &class.annotations
            {
                Some(dir) => emit_annotations_dir(&mut data, data_base, dir),
                None => 0,
            };

            let static_values = match &class.static_values
            {
                Some(raw) =>
                {
                    let off = (data_base + data.len()) as u32;
                    data.extend_from_slice(raw);
                    off
                }
                None => 0,
            };

            let class_data = match &class.data
            {
                Some(cd) => emit_class_data(&mut data, data_base, cd),
                None => 0,
            };

            class_offs.push(ClassOffs { interfaces, annotations, class_data, static_values });
        }

        /* assemble the image */
        let mut out: Vec<u8> = vec![];
        out.extend_from_slice(b"dex\n035\0");
        w4(&mut out, 0); // checksum
        out.extend_from_slice(&[0u8; 20]); // signature
        let file_size = (data_base + data.len()) as u32;
        w4(&mut out, file_size);
        w4(&mut out, 0x70);
        w4(&mut out, 0x1234_5678);
        w4(&mut out, 0); // link_size
        w4(&mut out, 0); // link_off
        w4(&mut out, 0); // map_off

        let mut off = 0x70u32;
        let mut table = |out: &mut Vec<u8>, count: usize, stride: u32| {
            w4(out, count as u32);
            w4(out, if count == 0 { 0 } else { off });
            off += count as u32 * stride;
        };
        table(&mut out, self.strings.len(), 4);
        table(&mut out, self.types.len(), 4);
        table(&mut out, self.protos.len(), 12);
        table(&mut out, self.fields.len(), 8);
        table(&mut out, self.methods.len(), 8);
        table(&mut out, self.classes.len(), 32);
        w4(&mut out, data.len() as u32);
        w4(&mut out, data_base as u32);
        assert_eq!(out.len(), 0x70);

        for so in &string_offs
        {
            w4(&mut out, *so);
        }
        for t in &self.types
        {
            w4(&mut out, *t);
        }
        for (i, (shorty, ret, _)) in self.protos.iter().enumerate()
        {
            w4(&mut out, *shorty);
            w4(&mut out, *ret);
            w4(&mut out, proto_param_offs[i]);
        }
        for (owner, ty, name) in &self.fields
        {
            w2(&mut out, *owner);
            w2(&mut out, *ty);
            w4(&mut out, *name);
        }
        for (owner, proto, name) in &self.methods
        {
            w2(&mut out, *owner);
            w2(&mut out, *proto);
            w4(&mut out, *name);
        }
        for (i, class) in self.classes.iter().enumerate()
        {
            let co = &class_offs[i];
            w4(&mut out, class.class_type);
            w4(&mut out, class.access_flags);
            w4(&mut out, class.superclass);
            w4(&mut out, co.interfaces);
            w4(&mut out, class.source_file);
            w4(&mut out, co.annotations);
            w4(&mut out, co.class_data);
            w4(&mut out, co.static_values);
        }

        out.extend_from_slice(&data);
        out
    }
}

fn emit_type_list(data: &mut Vec<u8>, data_base: usize, types: &[u16]) -> u32
{
    if types.is_empty()
    {
        return 0;
    }
    align4(data);
    let off = (data_base + data.len()) as u32;
    w4(data, types.len() as u32);
    for &t in types
    {
        w2(data, t);
    }
    off
}

fn emit_code(data: &mut Vec<u8>, data_base: usize, code: &Code) -> u32
{
    let debug_off = match &code.debug
    {
        Some(raw) =>
        {
            let off = (data_base + data.len()) as u32;
            data.extend_from_slice(raw);
            off
        }
        None => 0,
    };

    align4(data);
    let code_off = (data_base + data.len()) as u32;
    w2(data, code.registers);
    w2(data, code.ins);
    w2(data, 0); // outs
    w2(data, code.tries.len() as u16);
    w4(data, debug_off);
    w4(data, code.insns.len() as u32);
    for &u in &code.insns
    {
        w2(data, u);
    }

    if !code.tries.is_empty()
    {
        if code.insns.len() % 2 == 1
        {
            w2(data, 0); // padding
        }

        // handler list first so try items can carry real offsets
        let mut blob = vec![];
        uleb(&mut blob, code.tries.len() as u32);
        let mut handler_offs = vec![];
        for t in &code.tries
        {
            handler_offs.push(blob.len() as u16);
            let typed = t.handlers.len() as i32;
            blob.extend(encode_sleb128(if t.catch_all.is_some() { -typed } else { typed }));
            for (ty, addr) in &t.handlers
            {
                uleb(&mut blob, *ty);
                uleb(&mut blob, *addr);
            }
            if let Some(addr) = t.catch_all
            {
                uleb(&mut blob, addr);
            }
        }

        for (t, hoff) in code.tries.iter().zip(handler_offs)
        {
            w4(data, t.start);
            w2(data, t.count);
            w2(data, hoff);
        }
        data.extend_from_slice(&blob);
    }

    code_off
}

fn emit_class_data(data: &mut Vec<u8>, data_base: usize, cd: &ClassData) -> u32
{
    let direct_code: Vec<u32> = cd
        .direct_methods
        .iter()
        .map(|m| m.code.as_ref().map(|c| emit_code(data, data_base, c)).unwrap_or(0))
        .collect();
    let virtual_code: Vec<u32> = cd
        .virtual_methods
        .iter()
        .map(|m| m.code.as_ref().map(|c| emit_code(data, data_base, c)).unwrap_or(0))
        .collect();

    let off = (data_base + data.len()) as u32;
    uleb(data, cd.static_fields.len() as u32);
    uleb(data, cd.instance_fields.len() as u32);
    uleb(data, cd.direct_methods.len() as u32);
    uleb(data, cd.virtual_methods.len() as u32);

    for group in [&cd.static_fields, &cd.instance_fields]
    {
        let mut last = 0;
        for (idx, flags) in group.iter()
        {
            uleb(data, idx - last);
            uleb(data, *flags);
            last = *idx;
        }
    }
    for (group, code_offs) in [(&cd.direct_methods, &direct_code), (&cd.virtual_methods, &virtual_code)]
    {
        let mut last = 0;
        for (m, code_off) in group.iter().zip(code_offs.iter())
        {
            uleb(data, m.method_idx - last);
            uleb(data, m.access_flags);
            uleb(data, *code_off);
            last = m.method_idx;
        }
    }
    off
}

fn emit_annotation_set(data: &mut Vec<u8>, data_base: usize, items: &[Vec<u8>]) -> u32
{
    let item_offs: Vec<u32> = items
        .iter()
        .map(|raw| {
            let off = (data_base + data.len()) as u32;
            data.extend_from_slice(raw);
            off
        })
        .collect();
    align4(data);
    let off = (data_base + data.len()) as u32;
    w4(data, items.len() as u32);
    for io in item_offs
    {
        w4(data, io);
    }
    off
}

fn emit_annotations_dir(data: &mut Vec<u8>, data_base: usize, dir: &AnnotationsDir) -> u32
{
    let class_set = if dir.class_annotations.is_empty()
    {
        0
    }
    else
    {
        emit_annotation_set(data, data_base, &dir.class_annotations)
    };

    let field_sets: Vec<(u32, u32)> = dir
        .field_annotations
        .iter()
        .map(|(idx, items)| (*idx, emit_annotation_set(data, data_base, items)))
        .collect();
    let method_sets: Vec<(u32, u32)> = dir
        .method_annotations
        .iter()
        .map(|(idx, items)| (*idx, emit_annotation_set(data, data_base, items)))
        .collect();

    let param_lists: Vec<(u32, u32)> = dir
        .parameter_annotations
        .iter()
        .map(|(idx, params)| {
            let set_offs: Vec<u32> = params
                .iter()
                .map(|p| match p
                {
                    Some(items) => emit_annotation_set(data, data_base, items),
                    None => 0,
                })
                .collect();
            align4(data);
            let list_off = (data_base + data.len()) as u32;
            w4(data, set_offs.len() as u32);
            for so in set_offs
            {
                w4(data, so);
            }
            (*idx, list_off)
        })
        .collect();

    align4(data);
    let off = (data_base + data.len()) as u32;
    w4(data, class_set);
    w4(data, field_sets.len() as u32);
    w4(data, method_sets.len() as u32);
    w4(data, param_lists.len() as u32);
    for (idx, so) in field_sets.iter().chain(method_sets.iter())
    {
        w4(data, *idx);
        w4(data, *so);
    }
    for (idx, lo) in param_lists
    {
        w4(data, idx);
        w4(data, lo);
    }
    off
}

/* ---------------- encoded value encoders ---------------- */

fn signed_bytes(v: i64, max: usize) -> Vec<u8>
{
    let all = v.to_le_bytes();
    let mut len = max;
    while len > 1
    {
        let top = all[len - 1];
        let next_negative = (all[len - 2] as i8) < 0;
        if (top == 0x00 && !next_negative) || (top == 0xFF && next_negative)
        {
            len -= 1;
        }
        else
        {
            break;
        }
    }
    all[..len].to_vec()
}

fn unsigned_bytes(v: u64, max: usize) -> Vec<u8>
{
    let all = v.to_le_bytes();
    let mut len = max;
    while len > 1 && all[len - 1] == 0
    {
        len -= 1;
    }
    all[..len].to_vec()
}

fn ev(tag: u8, payload: Vec<u8>) -> Vec<u8>
{
    let mut out = vec![tag | ((payload.len() as u8 - 1) << 5)];
    out.extend(payload);
    out
}

pub fn ev_byte(v: i8) -> Vec<u8>
{
    vec![0x00, v as u8]
}

pub fn ev_short(v: i16) -> Vec<u8>
{
    ev(0x02, signed_bytes(v as i64, 2))
}

pub fn ev_char(v: u16) -> Vec<u8>
{
    ev(0x03, unsigned_bytes(v as u64, 2))
}

pub fn ev_int(v: i32) -> Vec<u8>
{
    ev(0x04, signed_bytes(v as i64, 4))
}

pub fn ev_long(v: i64) -> Vec<u8>
{
    ev(0x06, signed_bytes(v, 8))
}

pub fn ev_float(v: f32) -> Vec<u8>
{
    // high-order bytes of the 64-bit left-aligned form, low zeros dropped
    ev_double_bits((v.to_bits() as u64) << 32)
}

pub fn ev_double(v: f64) -> Vec<u8>
{
    let mut raw = ev_double_bits(v.to_bits());
    raw[0] = 0x11 | (raw[0] & 0xE0);
    raw
}

fn ev_double_bits(bits: u64) -> Vec<u8>
{
    let all = bits.to_le_bytes();
    let start = all.iter().position(|&b| b != 0).unwrap_or(7);
    let payload = all[start..].to_vec();
    let mut out = vec![0x10 | ((payload.len() as u8 - 1) << 5)];
    out.extend(payload);
    out
}

pub fn ev_string(idx: u32) -> Vec<u8>
{
    ev(0x17, unsigned_bytes(idx as u64, 4))
}

pub fn ev_type(idx: u32) -> Vec<u8>
{
    ev(0x18, unsigned_bytes(idx as u64, 4))
}

pub fn ev_field(idx: u32) -> Vec<u8>
{
    ev(0x19, unsigned_bytes(idx as u64, 4))
}

pub fn ev_method(idx: u32) -> Vec<u8>
{
    ev(0x1a, unsigned_bytes(idx as u64, 4))
}

pub fn ev_enum(idx: u32) -> Vec<u8>
{
    ev(0x1b, unsigned_bytes(idx as u64, 4))
}

pub fn ev_array(items: &[Vec<u8>]) -> Vec<u8>
{
    let mut out = vec![0x1c];
    uleb(&mut out, items.len() as u32);
    for item in items
    {
        out.extend_from_slice(item);
    }
    out
}

pub fn ev_null() -> Vec<u8>
{
    vec![0x1e]
}

pub fn ev_bool(v: bool) -> Vec<u8>
{
    vec![0x1f | ((v as u8) << 5)]
}

pub fn encoded_annotation(type_idx: u32, elements: &[(u32, Vec<u8>)]) -> Vec<u8>
{
    let mut out = vec![];
    uleb(&mut out, type_idx);
    uleb(&mut out, elements.len() as u32);
    for (name_idx, value) in elements
    {
        uleb(&mut out, *name_idx);
        out.extend_from_slice(value);
    }
    out
}

pub fn ev_annotation(type_idx: u32, elements: &[(u32, Vec<u8>)]) -> Vec<u8>
{
    let mut out = vec![0x1d];
    out.extend(encoded_annotation(type_idx, elements));
    out
}

pub fn annotation_item(visibility: u8, type_idx: u32, elements: &[(u32, Vec<u8>)]) -> Vec<u8>
{
    let mut out = vec![visibility];
    out.extend(encoded_annotation(type_idx, elements));
    out
}

/// A raw `encoded_array` (for `static_values_off`).
pub fn encoded_array(items: &[Vec<u8>]) -> Vec<u8>
{
    let mut out = vec![];
    uleb(&mut out, items.len() as u32);
    for item in items
    {
        out.extend_from_slice(item);
    }
    out
}

/// Raw `debug_info_item` bytes; `ops` must end with `DBG_END_SEQUENCE`.
pub fn debug_info(line_start: u32, param_name_idxs: &[i32], ops: &[u8]) -> Vec<u8>
{
    let mut out = encode_uleb128(line_start);
    out.extend(encode_uleb128(param_name_idxs.len() as u32));
    for &p in param_name_idxs
    {
        out.extend(encode_uleb128p1(p));
    }
    out.extend_from_slice(ops);
    out
}

/* ---------------- collecting visitor ---------------- */

#[derive(Debug, Default, PartialEq)]
pub struct FileNode
{
    pub classes: Vec<ClassNode>,
}

#[derive(Debug, PartialEq)]
pub struct ClassNode
{
    pub access: u32,
    pub name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub source: Option<String>,
    pub annotations: Vec<AnnNode>,
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
}

#[derive(Debug, PartialEq)]
pub struct AnnNode
{
    pub type_desc: String,
    pub visibility: Visibility,
    pub elements: Vec<(String, Value)>,
}

#[derive(Debug, PartialEq)]
pub struct FieldNode
{
    pub access: u32,
    pub field: Field,
    pub value: Option<Value>,
    pub annotations: Vec<AnnNode>,
}

#[derive(Debug, PartialEq)]
pub struct MethodNode
{
    pub access: u32,
    pub method: Method,
    pub annotations: Vec<AnnNode>,
    pub param_annotations: Vec<ParamAnnNode>,
    pub code: Option<CodeNode>,
}

#[derive(Debug, PartialEq)]
pub struct ParamAnnNode
{
    pub index: usize,
    pub annotations: Vec<AnnNode>,
}

#[derive(Debug, Default, PartialEq)]
pub struct CodeNode
{
    pub registers: u16,
    pub events: Vec<CodeEvent>,
    pub debug: DebugNode,
}

#[derive(Debug, Default, PartialEq)]
pub struct DebugNode
{
    pub events: Vec<DebugEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CodeEvent
{
    Label(u32),
    TryCatch
    {
        start: u32,
        end: u32,
        handlers: Vec<u32>,
        types: Vec<Option<String>>,
    },
    Stmt0R(Op),
    Stmt1R(Op, i32),
    Stmt2R(Op, i32, i32),
    Stmt3R(Op, i32, i32, i32),
    Stmt2R1N(Op, i32, i32, i32),
    Const(Op, i32, ConstValue),
    FieldStmt(Op, i32, i32, Field),
    TypeStmt(Op, i32, i32, String),
    Jump(Op, i32, i32, u32),
    MethodStmt(Op, Vec<i32>, Method),
    FilledNewArray(Op, Vec<i32>, String),
    FillArrayData(Op, i32, ArrayData),
    PackedSwitch(Op, i32, i32, Vec<u32>),
    SparseSwitch(Op, i32, Vec<i32>, Vec<u32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DebugEvent
{
    ParamName(usize, String),
    StartLocal(u32, u32, Option<String>, Option<String>, Option<String>),
    RestartLocal(u32, u32),
    EndLocal(u32, u32),
    Line(i32, u32),
    Prologue(u32),
    Epilogue(u32),
}

impl DexFileVisitor for FileNode
{
    fn visit_class(
        &mut self,
        access_flags: u32,
        name: &str,
        superclass: Option<&str>,
        interfaces: &[String],
    ) -> Option<&mut dyn DexClassVisitor>
    {
        self.classes.push(ClassNode {
            access: access_flags,
            name: name.to_string(),
            superclass: superclass.map(str::to_string),
            interfaces: interfaces.to_vec(),
            source: None,
            annotations: vec![],
            fields: vec![],
            methods: vec![],
        });
        Some(self.classes.last_mut().unwrap())
    }
}

fn push_annotation<'a>(
    annotations: &'a mut Vec<AnnNode>,
    type_desc: &str,
    visibility: Visibility,
) -> Option<&'a mut dyn DexAnnotationVisitor>
{
    annotations.push(AnnNode {
        type_desc: type_desc.to_string(),
        visibility,
        elements: vec![],
    });
    Some(annotations.last_mut().unwrap())
}

impl DexAnnotationVisitor for AnnNode
{
    fn visit_element(&mut self, name: &str, value: Value)
    {
        self.elements.push((name.to_string(), value));
    }
}

impl DexAnnotationAble for ClassNode
{
    fn visit_annotation(&mut self, type_desc: &str, visibility: Visibility)
        -> Option<&mut dyn DexAnnotationVisitor>
    {
        push_annotation(&mut self.annotations, type_desc, visibility)
    }
}

impl DexClassVisitor for ClassNode
{
    fn visit_source(&mut self, file: &str)
    {
        self.source = Some(file.to_string());
    }

    fn visit_field(&mut self, access_flags: u32, field: Field, value: Option<Value>)
        -> Option<&mut dyn DexFieldVisitor>
    {
        self.fields.push(FieldNode { access: access_flags, field, value, annotations: vec![] });
        Some(self.fields.last_mut().unwrap())
    }

    fn visit_method(&mut self, access_flags: u32, method: Method) -> Option<&mut dyn DexMethodVisitor>
    {
        self.methods.push(MethodNode {
            access: access_flags,
            method,
            annotations: vec![],
            param_annotations: vec![],
            code: None,
        });
        Some(self.methods.last_mut().unwrap())
    }
}

impl DexAnnotationAble for FieldNode
{
    fn visit_annotation(&mut self, type_desc: &str, visibility: Visibility)
        -> Option<&mut dyn DexAnnotationVisitor>
    {
        push_annotation(&mut self.annotations, type_desc, visibility)
    }
}

impl DexFieldVisitor for FieldNode {}

impl DexAnnotationAble for MethodNode
{
    fn visit_annotation(&mut self, type_desc: &str, visibility: Visibility)
        -> Option<&mut dyn DexAnnotationVisitor>
    {
        push_annotation(&mut self.annotations, type_desc, visibility)
    }
}

impl DexMethodVisitor for MethodNode
{
    fn visit_parameter_annotation(&mut self, index: usize) -> Option<&mut dyn DexAnnotationAble>
    {
        self.param_annotations.push(ParamAnnNode { index, annotations: vec![] });
        Some(self.param_annotations.last_mut().unwrap())
    }

    fn visit_code(&mut self) -> Option<&mut dyn DexCodeVisitor>
    {
        self.code = Some(CodeNode::default());
        Some(self.code.as_mut().unwrap())
    }
}

impl DexAnnotationAble for ParamAnnNode
{
    fn visit_annotation(&mut self, type_desc: &str, visibility: Visibility)
        -> Option<&mut dyn DexAnnotationVisitor>
    {
        push_annotation(&mut self.annotations, type_desc, visibility)
    }
}

impl DexCodeVisitor for CodeNode
{
    fn visit_register(&mut self, total: u16)
    {
        self.registers = total;
    }

    fn visit_try_catch(&mut self, start: DexLabel, end: DexLabel, handlers: &[DexLabel], types: &[Option<String>])
    {
        self.events.push(CodeEvent::TryCatch {
            start: start.0,
            end: end.0,
            handlers: handlers.iter().map(|l| l.0).collect(),
            types: types.to_vec(),
        });
    }

    fn visit_label(&mut self, label: DexLabel)
    {
        self.events.push(CodeEvent::Label(label.0));
    }

    fn visit_debug(&mut self) -> Option<&mut dyn DexDebugVisitor>
    {
        Some(&mut self.debug)
    }

    fn visit_stmt_0r(&mut self, op: Op)
    {
        self.events.push(CodeEvent::Stmt0R(op));
    }

    fn visit_stmt_1r(&mut self, op: Op, a: i32)
    {
        self.events.push(CodeEvent::Stmt1R(op, a));
    }

    fn visit_stmt_2r(&mut self, op: Op, a: i32, b: i32)
    {
        self.events.push(CodeEvent::Stmt2R(op, a, b));
    }

    fn visit_stmt_3r(&mut self, op: Op, a: i32, b: i32, c: i32)
    {
        self.events.push(CodeEvent::Stmt3R(op, a, b, c));
    }

    fn visit_stmt_2r1n(&mut self, op: Op, dst: i32, src: i32, value: i32)
    {
        self.events.push(CodeEvent::Stmt2R1N(op, dst, src, value));
    }

    fn visit_const_stmt(&mut self, op: Op, dst: i32, value: ConstValue)
    {
        self.events.push(CodeEvent::Const(op, dst, value));
    }

    fn visit_field_stmt(&mut self, op: Op, a: i32, b: i32, field: Field)
    {
        self.events.push(CodeEvent::FieldStmt(op, a, b, field));
    }

    fn visit_type_stmt(&mut self, op: Op, a: i32, b: i32, type_desc: String)
    {
        self.events.push(CodeEvent::TypeStmt(op, a, b, type_desc));
    }

    fn visit_jump_stmt(&mut self, op: Op, a: i32, b: i32, label: DexLabel)
    {
        self.events.push(CodeEvent::Jump(op, a, b, label.0));
    }

    fn visit_method_stmt(&mut self, op: Op, regs: &[i32], method: Method)
    {
        self.events.push(CodeEvent::MethodStmt(op, regs.to_vec(), method));
    }

    fn visit_filled_new_array_stmt(&mut self, op: Op, regs: &[i32], type_desc: String)
    {
        self.events.push(CodeEvent::FilledNewArray(op, regs.to_vec(), type_desc));
    }

    fn visit_fill_array_data_stmt(&mut self, op: Op, reg: i32, data: ArrayData)
    {
        self.events.push(CodeEvent::FillArrayData(op, reg, data));
    }

    fn visit_packed_switch_stmt(&mut self, op: Op, reg: i32, first_key: i32, targets: &[DexLabel])
    {
        self.events.push(CodeEvent::PackedSwitch(op, reg, first_key, targets.iter().map(|l| l.0).collect()));
    }

    fn visit_sparse_switch_stmt(&mut self, op: Op, reg: i32, keys: &[i32], targets: &[DexLabel])
    {
        self.events.push(CodeEvent::SparseSwitch(op, reg, keys.to_vec(), targets.iter().map(|l| l.0).collect()));
    }
}

impl DexDebugVisitor for DebugNode
{
    fn visit_parameter_name(&mut self, index: usize, name: &str)
    {
        self.events.push(DebugEvent::ParamName(index, name.to_string()));
    }

    fn visit_start_local(
        &mut self,
        reg: u32,
        label: DexLabel,
        name: Option<&str>,
        type_desc: Option<&str>,
        signature: Option<&str>,
    )
    {
        self.events.push(DebugEvent::StartLocal(
            reg,
            label.0,
            name.map(str::to_string),
            type_desc.map(str::to_string),
            signature.map(str::to_string),
        ));
    }

    fn visit_restart_local(&mut self, reg: u32, label: DexLabel)
    {
        self.events.push(DebugEvent::RestartLocal(reg, label.0));
    }

    fn visit_end_local(&mut self, reg: u32, label: DexLabel)
    {
        self.events.push(DebugEvent::EndLocal(reg, label.0));
    }

    fn visit_line_number(&mut self, line: i32, label: DexLabel)
    {
        self.events.push(DebugEvent::Line(line, label.0));
    }

    fn visit_prologue(&mut self, label: DexLabel)
    {
        self.events.push(DebugEvent::Prologue(label.0));
    }

    fn visit_epilogue(&mut self, label: DexLabel)
    {
        self.events.push(DebugEvent::Epilogue(label.0));
    }
}

/* ---------------- canned images ---------------- */

/// A one-class image (`LFoo;` extends `Ljava/lang/Object;`) with one
/// static method `run()V` holding `code`.
///
/// String/type pool layout: 0 `"I"`, 1 `"J"`, 2 `"LFoo;"`,
/// 3 `"Ljava/lang/Object;"`, 4 `"V"`, 5 `"run"`, and type idx == string
/// idx for 0..=4.
pub fn single_method_image(code: Code) -> Vec<u8>
{
    let mut image = DexImage::default();
    image.strings = ["I", "J", "LFoo;", "Ljava/lang/Object;", "V", "run"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    image.types = vec![0, 1, 2, 3, 4];
    image.protos = vec![(4, 4, vec![])]; // ()V
    image.methods = vec![(2, 0, 5)]; // LFoo;->run()V

    let mut class = ClassDef::new(2, 3);
    class.data = Some(ClassData {
        direct_methods: vec![MethodDef {
            method_idx: 0,
            access_flags: 0x8 | 0x1, // public static
            code: Some(code),
        }],
        ..ClassData::default()
    });
    image.classes = vec![class];
    image.build()
}

/// Pipe `image` into a fresh [`FileNode`] tree.
pub fn collect(image: &[u8], config: crate::Config) -> FileNode
{
    let reader = crate::DexFileReader::new(image.to_vec()).expect("reader");
    let mut node = FileNode::default();
    reader.pipe(&mut node, config).expect("pipe");
    node
}

/// The code events of the first method of the first class.
pub fn code_events(image: &[u8]) -> Vec<CodeEvent>
{
    let node = collect(image, crate::Config::empty());
    node.classes[0].methods[0]
        .code
        .as_ref()
        .expect("code")
        .events
        .clone()
}
