//! The visitor tree the reader drives.
//!
//! Every factory method (`visit_class`, `visit_field`, `visit_method`,
//! `visit_code`, `visit_debug`, `visit_annotation`,
//! `visit_parameter_annotation`) may return `None` to skip that subtree;
//! the reader then performs no work whose only purpose would be feeding
//! it. Event methods default to no-ops so adapters only override what
//! they care about.
//!
//! Registers in code events are passed as `i32`, with `-1` marking an
//! unused slot (a `goto` has no registers, a `sget` no object register).

use crate::encoded_values::Value;
use crate::ops::Op;
use crate::types::{DexLabel, Field, Method, Visibility};

/// A constant operand of a `const*` instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue
{
    /// 32-bit literal (`const/4`, `const/16`, `const`, `const/high16`).
    Int(i32),
    /// 64-bit literal (`const-wide` family).
    Long(i64),
    /// `const-string` / `const-string/jumbo`.
    String(String),
    /// `const-class`, as a type descriptor.
    Type(String),
}

/// The payload of a `fill-array-data` instruction, typed by element width.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData
{
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
}

/// Anything that can carry annotations: classes, fields, methods, and
/// method parameters.
pub trait DexAnnotationAble
{
    /// Announce one annotation; `None` skips its elements.
    fn visit_annotation(&mut self, type_desc: &str, visibility: Visibility)
        -> Option<&mut dyn DexAnnotationVisitor>;
}

/// Sink for the `(name, value)` elements of a single annotation.
pub trait DexAnnotationVisitor
{
    fn visit_element(&mut self, _name: &str, _value: Value) {}
    fn visit_end(&mut self) {}
}

/// Root of the tree: receives every class definition in the image.
pub trait DexFileVisitor
{
    /// Announce a class; `None` skips the whole class.
    fn visit_class(
        &mut self,
        access_flags: u32,
        name: &str,
        superclass: Option<&str>,
        interfaces: &[String],
    ) -> Option<&mut dyn DexClassVisitor>;

    fn visit_end(&mut self) {}
}

pub trait DexClassVisitor: DexAnnotationAble
{
    fn visit_source(&mut self, _file: &str) {}

    /// Announce a field. `value` is its static initializer when present
    /// and not skipped by configuration.
    fn visit_field(&mut self, access_flags: u32, field: Field, value: Option<Value>)
        -> Option<&mut dyn DexFieldVisitor>;

    fn visit_method(&mut self, access_flags: u32, method: Method)
        -> Option<&mut dyn DexMethodVisitor>;

    fn visit_end(&mut self) {}
}

pub trait DexFieldVisitor: DexAnnotationAble
{
    fn visit_end(&mut self) {}
}

pub trait DexMethodVisitor: DexAnnotationAble
{
    /// Annotations of the `index`-th parameter; `None` skips them.
    fn visit_parameter_annotation(&mut self, _index: usize) -> Option<&mut dyn DexAnnotationAble>
    {
        None
    }

    /// The method body; `None` skips code decoding entirely.
    fn visit_code(&mut self) -> Option<&mut dyn DexCodeVisitor>
    {
        None
    }

    fn visit_end(&mut self) {}
}

/// Sink for one method body: register count, try/catch ranges, labels,
/// debug events, and the instruction stream in address order.
pub trait DexCodeVisitor
{
    fn visit_register(&mut self, _total: u16) {}

    /// One `try_item`: `[start, end)` protected range, handler labels and
    /// their exception types; `None` in `types` marks the catch-all slot.
    fn visit_try_catch(
        &mut self,
        _start: DexLabel,
        _end: DexLabel,
        _handlers: &[DexLabel],
        _types: &[Option<String>],
    )
    {
    }

    fn visit_label(&mut self, _label: DexLabel) {}

    /// Debug events for this body; `None` skips the debug-info stream.
    fn visit_debug(&mut self) -> Option<&mut dyn DexDebugVisitor>
    {
        None
    }

    fn visit_stmt_0r(&mut self, _op: Op) {}
    fn visit_stmt_1r(&mut self, _op: Op, _a: i32) {}
    fn visit_stmt_2r(&mut self, _op: Op, _a: i32, _b: i32) {}
    fn visit_stmt_3r(&mut self, _op: Op, _a: i32, _b: i32, _c: i32) {}
    /// Two registers plus an immediate (`*/lit8`, `*/lit16`).
    fn visit_stmt_2r1n(&mut self, _op: Op, _dst: i32, _src: i32, _value: i32) {}
    fn visit_const_stmt(&mut self, _op: Op, _dst: i32, _value: ConstValue) {}
    fn visit_field_stmt(&mut self, _op: Op, _a: i32, _b: i32, _field: Field) {}
    fn visit_type_stmt(&mut self, _op: Op, _a: i32, _b: i32, _type_desc: String) {}
    fn visit_jump_stmt(&mut self, _op: Op, _a: i32, _b: i32, _label: DexLabel) {}
    fn visit_method_stmt(&mut self, _op: Op, _regs: &[i32], _method: Method) {}
    fn visit_filled_new_array_stmt(&mut self, _op: Op, _regs: &[i32], _type_desc: String) {}
    fn visit_fill_array_data_stmt(&mut self, _op: Op, _reg: i32, _data: ArrayData) {}
    fn visit_packed_switch_stmt(&mut self, _op: Op, _reg: i32, _first_key: i32, _targets: &[DexLabel]) {}
    fn visit_sparse_switch_stmt(&mut self, _op: Op, _reg: i32, _keys: &[i32], _targets: &[DexLabel]) {}

    fn visit_end(&mut self) {}
}

/// Sink for the debug-info micro-VM: parameter names, local liveness,
/// line numbers, prologue/epilogue marks.
pub trait DexDebugVisitor
{
    fn visit_parameter_name(&mut self, _index: usize, _name: &str) {}

    fn visit_start_local(
        &mut self,
        _reg: u32,
        _label: DexLabel,
        _name: Option<&str>,
        _type_desc: Option<&str>,
        _signature: Option<&str>,
    )
    {
    }

    fn visit_restart_local(&mut self, _reg: u32, _label: DexLabel) {}
    fn visit_end_local(&mut self, _reg: u32, _label: DexLabel) {}
    fn visit_line_number(&mut self, _line: i32, _label: DexLabel) {}
    fn visit_prologue(&mut self, _label: DexLabel) {}
    fn visit_epilogue(&mut self, _label: DexLabel) {}
    fn visit_end(&mut self) {}
}
