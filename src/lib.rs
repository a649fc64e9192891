//! # dexpipe
//!
//! A streaming reader for Android DEX (Dalvik Executable) files.
//!
//! The reader decodes the binary container and drives a caller-supplied
//! [visitor tree](visitor) with every class, field, method, instruction,
//! try/catch range, annotation, and debug event it finds. Nothing is
//! buffered beyond the current method: consumers build whatever model
//! they need from the event stream, or return `None` from a factory
//! method to skip a subtree entirely.
//!
//! Input may be a raw `.dex` image or a ZIP/APK archive, in which case
//! every `*.dex` member is parsed in archive order into the same
//! visitor.
//!
//! ```no_run
//! use dexpipe::{Config, DexReader};
//! use dexpipe::visitor::{DexClassVisitor, DexFileVisitor};
//!
//! struct ClassLister { names: Vec<String> }
//!
//! impl DexFileVisitor for ClassLister {
//!     fn visit_class(&mut self, _access: u32, name: &str, _superclass: Option<&str>,
//!                    _interfaces: &[String]) -> Option<&mut dyn DexClassVisitor> {
//!         self.names.push(name.to_string());
//!         None // class headers only
//!     }
//! }
//!
//! let bytes = std::fs::read("classes.dex").unwrap();
//! let reader = DexReader::new(&bytes).unwrap();
//! let mut lister = ClassLister { names: vec![] };
//! reader.pipe(&mut lister, Config::SKIP_CODE).unwrap();
//! println!("{} classes", lister.names.len());
//! ```

use bitflags::bitflags;

#[macro_use]
pub mod error;

mod buffers;
mod code;
mod debug_info;
mod leb;
mod mutf8;
mod reader;

pub mod encoded_values;
pub mod ops;
pub mod types;
pub mod visitor;

#[cfg(test)]
mod tests;

pub use error::DexError;
pub use reader::DexFileReader;

use visitor::DexFileVisitor;

bitflags! {
    /// Configuration flags for [`DexReader::pipe`].
    pub struct Config: u32 {
        /// Omit source file, debug-info events, and line numbers.
        const SKIP_DEBUG = 1;
        /// Do not decode method bodies (implies [`Config::SKIP_DEBUG`]).
        const SKIP_CODE = 1 << 2;
        /// Do not emit annotations.
        const SKIP_ANNOTATION = 1 << 3;
        /// Do not decode static field initializers.
        const SKIP_FIELD_CONSTANT = 1 << 4;
        /// Log per-class failures instead of aborting the pipe.
        const IGNORE_READ_EXCEPTION = 1 << 5;
        /// Emit duplicate-signature methods instead of keeping only the
        /// first of each group.
        const KEEP_ALL_METHODS = 1 << 6;
        /// With [`Config::SKIP_CODE`], still decode `<clinit>` bodies.
        const KEEP_CLINIT = 1 << 7;
        /// Trace the debug-info state machine through `log::debug!`.
        const ENABLE_DEBUG_LOG = 1 << 16;
    }
}

/// Reader over a `.dex` image or an archive of them.
///
/// For an archive, every `*.dex` member gets an independent
/// [`DexFileReader`] and their event streams are concatenated in
/// archive order.
#[derive(Debug)]
pub struct DexReader
{
    readers: Vec<DexFileReader>,
}

impl DexReader
{
    /// Sniff `data` as either a raw DEX image or a ZIP archive holding
    /// `*.dex` members.
    pub fn new(data: &[u8]) -> Result<DexReader, DexError>
    {
        if data.len() < 3
        {
            fail!("File too small to be a dex/zip");
        }

        if data.starts_with(b"dex")
        {
            Ok(DexReader { readers: vec![DexFileReader::new(data.to_vec())?] })
        }
        else if data.starts_with(b"PK")
        {
            let mut readers = vec![];
            let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data))
                .map_err(|e| err!("failed to open zip: {}", e))?;
            for i in 0..archive.len()
            {
                let mut entry = archive
                    .by_index(i)
                    .map_err(|e| err!("failed to open zip entry {}: {}", i, e))?;
                if !entry.name().ends_with(".dex")
                {
                    continue;
                }
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                std::io::Read::read_to_end(&mut entry, &mut bytes)
                    .map_err(|e| err!("failed to inflate {}: {}", entry.name(), e))?;
                readers.push(DexFileReader::new(bytes)?);
            }
            if readers.is_empty()
            {
                fail!("Can not find classes.dex in zip file");
            }
            Ok(DexReader { readers })
        }
        else
        {
            fail!("the src file not a .dex or zip file");
        }
    }

    /// Drive `dv` over every class of every member, in archive order.
    pub fn pipe(&self, dv: &mut dyn DexFileVisitor, config: Config) -> Result<(), DexError>
    {
        for reader in &self.readers
        {
            reader.pipe(dv, config)?;
        }
        Ok(())
    }

    /// Class type descriptors across all members, in pipe order.
    pub fn class_names(&self) -> Result<Vec<String>, DexError>
    {
        let mut names = vec![];
        for reader in &self.readers
        {
            names.extend(reader.class_names()?);
        }
        Ok(names)
    }
}
