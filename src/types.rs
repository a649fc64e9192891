/* Value entities emitted to visitors */

use std::fmt;

/* Access flags */
pub const ACC_PUBLIC: u32 = 0x1;
pub const ACC_PRIVATE: u32 = 0x2;
pub const ACC_PROTECTED: u32 = 0x4;
pub const ACC_STATIC: u32 = 0x8;
pub const ACC_FINAL: u32 = 0x10;
pub const ACC_SYNCHRONIZED: u32 = 0x20;
pub const ACC_VOLATILE: u32 = 0x40;
pub const ACC_BRIDGE: u32 = 0x40;
pub const ACC_TRANSIENT: u32 = 0x80;
pub const ACC_VARARGS: u32 = 0x80;
pub const ACC_NATIVE: u32 = 0x100;
pub const ACC_INTERFACE: u32 = 0x200;
pub const ACC_ABSTRACT: u32 = 0x400;
pub const ACC_STRICT: u32 = 0x800;
pub const ACC_SYNTHETIC: u32 = 0x1000;
pub const ACC_ANNOTATION: u32 = 0x2000;
pub const ACC_ENUM: u32 = 0x4000;
pub const ACC_CONSTRUCTOR: u32 = 0x10000;
pub const ACC_DECLARED_SYNCHRONIZED: u32 = 0x20000;

/// `0xffffffff`, the DEX "no index" sentinel (`-1` as a signed index).
pub const NO_INDEX: i32 = -1;

/// A position in a method's instruction stream, in 16-bit code units.
///
/// Labels are value entities: two labels with the same offset are the
/// same label. They are materialized when something branches to the
/// offset, names it as a handler, or attaches a debug event to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DexLabel(pub u32);

impl fmt::Display for DexLabel
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "L{:04x}", self.0)
    }
}

/// A field reference: owner type, name, and field type, all as JVM-style
/// descriptors. Equal by components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field
{
    pub owner: String,
    pub name: String,
    pub type_desc: String,
}

impl fmt::Display for Field
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}->{}:{}", self.owner, self.name, self.type_desc)
    }
}

/// A method reference: owner type, name, parameter types and return
/// type. Equal by components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method
{
    pub owner: String,
    pub name: String,
    pub parameter_types: Vec<String>,
    pub return_type: String,
}

impl fmt::Display for Method
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}->{}(", self.owner, self.name)?;
        for p in &self.parameter_types
        {
            write!(f, "{}", p)?;
        }
        write!(f, "){}", self.return_type)
    }
}

/// Annotation retention, the first byte of an `annotation_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility
{
    Build,
    Runtime,
    System,
}

impl Visibility
{
    pub(crate) fn from_u8(v: u8) -> Option<Visibility>
    {
        match v
        {
            0x00 => Some(Visibility::Build),
            0x01 => Some(Visibility::Runtime),
            0x02 => Some(Visibility::System),
            _ => None,
        }
    }
}
