//! The single-image DEX reader: header validation, section carving, pool
//! lookups, and the per-class pipeline that drives a visitor tree.

use std::collections::HashMap;

use log::warn;

use crate::buffers::{read_u1, read_u2, read_u4, read_uleb128, read_float_bits, read_int_bits, read_uint_bits, slice};
use crate::encoded_values::*;
use crate::error::DexError;
use crate::mutf8;
use crate::types::{Field, Method, Visibility, ACC_CONSTRUCTOR, ACC_STATIC, NO_INDEX};
use crate::visitor::{DexAnnotationAble, DexClassVisitor, DexFileVisitor};
use crate::Config;

const MAGIC_035: u32 = 0x0035_3330;
const ENDIAN_CONSTANT: u32 = 0x1234_5678;

/// One fixed-stride ID table carved out of the image.
#[derive(Debug, Clone, Copy)]
struct Section
{
    off: usize,
    len: usize,
}

/// Reader over a single in-memory `.dex` image.
///
/// The image is immutable and every lookup positions its own local
/// cursor, so [`pipe`](DexFileReader::pipe) may be called any number of
/// times (with different visitors and flags) over the same reader.
#[derive(Debug)]
pub struct DexFileReader
{
    image: Vec<u8>,
    string_ids: Section,
    type_ids: Section,
    proto_ids: Section,
    field_ids: Section,
    method_ids: Section,
    class_defs: Section,
    pub(crate) string_ids_size: u32,
    pub(crate) type_ids_size: u32,
    pub(crate) field_ids_size: u32,
    pub(crate) method_ids_size: u32,
    class_defs_size: u32,
}

fn carve(data: &[u8], off: u32, count: u32, stride: u32) -> Result<Section, DexError>
{
    let len = count as u64 * stride as u64;
    if len > usize::MAX as u64
    {
        fail!("section of {} entries * {} bytes does not fit in memory", count, stride);
    }
    slice(data, off as usize, len as usize)?;
    Ok(Section { off: off as usize, len: len as usize })
}

impl DexFileReader
{
    /// Read the header of `data` and carve the six ID sections.
    ///
    /// A version other than `035`, a header size other than `0x70`, or a
    /// non-standard endian tag are warnings, not errors; the reader still
    /// attempts to parse.
    pub fn new(data: Vec<u8>) -> Result<DexFileReader, DexError>
    {
        if data.len() < 0x70
        {
            fail!("not enough bytes for a dex header");
        }

        let mut ix = 4; // past the "dex\n" magic
        if read_u4(&data, &mut ix)? & 0x00FF_FFFF != MAGIC_035
        {
            warn!("unexpected dex version");
        }

        ix += 4 + 20 + 4; // checksum, signature, file_size
        if read_u4(&data, &mut ix)? != 0x70
        {
            warn!("unexpected dex header size");
        }
        if read_u4(&data, &mut ix)? != ENDIAN_CONSTANT
        {
            warn!("unexpected dex endian tag");
        }

        ix += 4 + 4 + 4; // link_size, link_off, map_off

        let string_ids_size = read_u4(&data, &mut ix)?;
        let string_ids_off = read_u4(&data, &mut ix)?;
        let type_ids_size = read_u4(&data, &mut ix)?;
        let type_ids_off = read_u4(&data, &mut ix)?;
        let proto_ids_size = read_u4(&data, &mut ix)?;
        let proto_ids_off = read_u4(&data, &mut ix)?;
        let field_ids_size = read_u4(&data, &mut ix)?;
        let field_ids_off = read_u4(&data, &mut ix)?;
        let method_ids_size = read_u4(&data, &mut ix)?;
        let method_ids_off = read_u4(&data, &mut ix)?;
        let class_defs_size = read_u4(&data, &mut ix)?;
        let class_defs_off = read_u4(&data, &mut ix)?;

        let string_ids = carve(&data, string_ids_off, string_ids_size, 4)?;
        let type_ids = carve(&data, type_ids_off, type_ids_size, 4)?;
        let proto_ids = carve(&data, proto_ids_off, proto_ids_size, 12)?;
        let field_ids = carve(&data, field_ids_off, field_ids_size, 8)?;
        let method_ids = carve(&data, method_ids_off, method_ids_size, 8)?;
        let class_defs = carve(&data, class_defs_off, class_defs_size, 32)?;

        Ok(DexFileReader {
            image: data,
            string_ids,
            type_ids,
            proto_ids,
            field_ids,
            method_ids,
            class_defs,
            string_ids_size,
            type_ids_size,
            field_ids_size,
            method_ids_size,
            class_defs_size,
        })
    }

    fn section(&self, s: Section) -> &[u8]
    {
        &self.image[s.off..s.off + s.len]
    }

    pub(crate) fn image(&self) -> &[u8]
    {
        &self.image
    }

    /// Type descriptors of all class definitions, in definition order.
    pub fn class_names(&self) -> Result<Vec<String>, DexError>
    {
        (0..self.class_defs_size)
            .map(|i| {
                let mut ix = i as usize * 32;
                let class_type = read_u4(self.section(self.class_defs), &mut ix)?;
                self.type_at(class_type)
            })
            .collect()
    }

    /// Drive `dv` over every class definition in the image.
    ///
    /// With [`Config::IGNORE_READ_EXCEPTION`] a class that fails to
    /// decode is logged and skipped; otherwise the error (wrapped with
    /// the class index and name) aborts the pipe.
    pub fn pipe(&self, dv: &mut dyn DexFileVisitor, config: Config) -> Result<(), DexError>
    {
        for class_idx in 0..self.class_defs_size
        {
            self.pipe_one(dv, class_idx, config)?;
        }
        dv.visit_end();
        Ok(())
    }

    /// Drive `dv` over the single class definition at `class_idx`.
    pub fn pipe_class(&self, dv: &mut dyn DexFileVisitor, class_idx: u32, config: Config)
        -> Result<(), DexError>
    {
        if class_idx >= self.class_defs_size
        {
            fail!("class index {} out of range ({} classes)", class_idx, self.class_defs_size);
        }
        self.pipe_one(dv, class_idx, config)?;
        dv.visit_end();
        Ok(())
    }

    fn pipe_one(&self, dv: &mut dyn DexFileVisitor, class_idx: u32, config: Config)
        -> Result<(), DexError>
    {
        match self.accept_class_def(dv, class_idx, config)
        {
            Err(e) if config.contains(Config::IGNORE_READ_EXCEPTION) =>
            {
                log::error!("{}", e);
                Ok(())
            }
            other => other,
        }
    }

    fn accept_class_def(&self, dv: &mut dyn DexFileVisitor, class_idx: u32, config: Config)
        -> Result<(), DexError>
    {
        let mut ix = class_idx as usize * 32;
        let defs = self.section(self.class_defs);
        let class_type_idx = read_u4(defs, &mut ix)?;
        let access_flags = read_u4(defs, &mut ix)?;
        let superclass_idx = read_u4(defs, &mut ix)? as i32;
        let interfaces_off = read_u4(defs, &mut ix)?;
        let source_file_idx = read_u4(defs, &mut ix)? as i32;
        let annotations_off = read_u4(defs, &mut ix)?;
        let class_data_off = read_u4(defs, &mut ix)?;
        let static_values_off = read_u4(defs, &mut ix)?;

        let class_name = self
            .type_at(class_type_idx)
            .map_err(|e| e.context(format!("while reading class [{}]", class_idx)))?;

        let result = (|| -> Result<(), DexError> {
            let superclass = self.get_type(superclass_idx)?;
            let interfaces = self.get_type_list(interfaces_off)?;

            if let Some(dcv) = dv.visit_class(access_flags, &class_name, superclass.as_deref(), &interfaces)
            {
                self.accept_class(dcv, source_file_idx, annotations_off, class_data_off, static_values_off, config)?;
                dcv.visit_end();
            }
            Ok(())
        })();

        result.map_err(|e| e.context(format!("while reading class [{}]{}", class_idx, class_name)))
    }

    fn accept_class(
        &self,
        dcv: &mut dyn DexClassVisitor,
        source_file_idx: i32,
        annotations_off: u32,
        class_data_off: u32,
        static_values_off: u32,
        config: Config,
    ) -> Result<(), DexError>
    {
        if !config.contains(Config::SKIP_DEBUG) && source_file_idx != NO_INDEX
        {
            if let Some(file) = self.get_string(source_file_idx)?
            {
                dcv.visit_source(&file);
            }
        }

        // index -> annotation_set offset maps from the directory
        let mut field_annos: HashMap<u32, u32> = HashMap::new();
        let mut method_annos: HashMap<u32, u32> = HashMap::new();
        let mut param_annos: HashMap<u32, u32> = HashMap::new();

        if !config.contains(Config::SKIP_ANNOTATION) && annotations_off != 0
        {
            let mut ix = annotations_off as usize;
            let class_annotations_off = read_u4(&self.image, &mut ix)?;
            let field_annotation_size = read_u4(&self.image, &mut ix)?;
            let method_annotation_size = read_u4(&self.image, &mut ix)?;
            let parameter_annotation_size = read_u4(&self.image, &mut ix)?;

            for (count, map) in [
                (field_annotation_size, &mut field_annos),
                (method_annotation_size, &mut method_annos),
                (parameter_annotation_size, &mut param_annos),
            ]
            {
                for _ in 0..count
                {
                    let idx = read_u4(&self.image, &mut ix)?;
                    let off = read_u4(&self.image, &mut ix)?;
                    map.insert(idx, off);
                }
            }

            if class_annotations_off != 0
            {
                self.read_annotation_set_item(class_annotations_off, dcv)
                    .map_err(|e| e.context("while reading class annotations".to_string()))?;
            }
        }

        if class_data_off != 0
        {
            let mut ix = class_data_off as usize;
            let static_fields = read_uleb128(&self.image, &mut ix)?;
            let instance_fields = read_uleb128(&self.image, &mut ix)?;
            let direct_methods = read_uleb128(&self.image, &mut ix)?;
            let virtual_methods = read_uleb128(&self.image, &mut ix)?;

            let constants = if !config.contains(Config::SKIP_FIELD_CONSTANT) && static_values_off != 0
            {
                let mut cix = static_values_off as usize;
                Some(self.read_encoded_array(&mut cix)?)
            }
            else
            {
                None
            };

            let mut last_index = 0;
            for i in 0..static_fields
            {
                // extra fields get no constant, extra constants are dropped
                let value = constants.as_ref().and_then(|c| c.get(i as usize).cloned());
                last_index = self.accept_field(&mut ix, last_index, dcv, &field_annos, value, config)?;
            }

            last_index = 0;
            for _ in 0..instance_fields
            {
                last_index = self.accept_field(&mut ix, last_index, dcv, &field_annos, None, config)?;
            }

            for group_size in [direct_methods, virtual_methods]
            {
                last_index = 0;
                let mut first_method = true;
                for _ in 0..group_size
                {
                    last_index = self.accept_method(&mut ix, last_index, dcv, &method_annos, &param_annos, config, first_method)?;
                    first_method = false;
                }
            }
        }

        Ok(())
    }

    fn accept_field(
        &self,
        ix: &mut usize,
        last_index: u32,
        dcv: &mut dyn DexClassVisitor,
        field_annos: &HashMap<u32, u32>,
        value: Option<Value>,
        config: Config,
    ) -> Result<u32, DexError>
    {
        let diff = read_uleb128(&self.image, ix)?;
        let field_access_flags = read_uleb128(&self.image, ix)?;
        let field_id = last_index.wrapping_add(diff);
        let field = self.get_field(field_id)?;

        if let Some(dfv) = dcv.visit_field(field_access_flags, field.clone(), value)
        {
            if !config.contains(Config::SKIP_ANNOTATION)
            {
                if let Some(&annotation_off) = field_annos.get(&field_id)
                {
                    self.read_annotation_set_item(annotation_off, dfv)
                        .map_err(|e| e.context(format!("while reading annotations of field {}", field)))?;
                }
            }
            dfv.visit_end();
        }

        Ok(field_id)
    }

    fn accept_method(
        &self,
        ix: &mut usize,
        last_index: u32,
        dcv: &mut dyn DexClassVisitor,
        method_annos: &HashMap<u32, u32>,
        param_annos: &HashMap<u32, u32>,
        config: Config,
        first_method: bool,
    ) -> Result<u32, DexError>
    {
        let offset = *ix;
        let diff = read_uleb128(&self.image, ix)?;
        let method_access_flags = read_uleb128(&self.image, ix)?;
        let code_off = read_uleb128(&self.image, ix)?;
        let method_id = last_index.wrapping_add(diff);
        let method = self.get_method(method_id)?;

        // a repeated index means a duplicated signature; only the first
        // entry survives unless the caller asked to keep all of them
        if !first_method && diff == 0
        {
            warn!("GLITCH: duplicated method {} @{:08x}", method, offset);
            if !config.contains(Config::KEEP_ALL_METHODS)
            {
                warn!("WARN: skip method {} @{:08x}", method, offset);
                return Ok(method_id);
            }
        }

        if method_access_flags & ACC_CONSTRUCTOR == 0
            && (method.name == "<init>" || method.name == "<clinit>")
        {
            warn!("GLITCH: method {} @{:08x} not marked as ACC_CONSTRUCTOR", method, offset);
        }

        let result = (|| -> Result<(), DexError> {
            if let Some(dmv) = dcv.visit_method(method_access_flags, method.clone())
            {
                if !config.contains(Config::SKIP_ANNOTATION)
                {
                    if let Some(&annotation_off) = method_annos.get(&method_id)
                    {
                        self.read_annotation_set_item(annotation_off, dmv)
                            .map_err(|e| e.context("while reading method annotations".to_string()))?;
                    }
                    if let Some(&param_off) = param_annos.get(&method_id)
                    {
                        self.read_annotation_set_ref_list(param_off, dmv)
                            .map_err(|e| e.context("while reading parameter annotations".to_string()))?;
                    }
                }

                if code_off != 0
                {
                    let keep = if config.contains(Config::SKIP_CODE)
                    {
                        config.contains(Config::KEEP_CLINIT) && method.name == "<clinit>"
                    }
                    else
                    {
                        true
                    };
                    if keep
                    {
                        if let Some(dcv2) = dmv.visit_code()
                        {
                            self.accept_code(code_off, dcv2, config, method_access_flags & ACC_STATIC != 0, &method)
                                .map_err(|e| e.context(format!("while reading code @{:08x}", code_off)))?;
                        }
                    }
                }

                dmv.visit_end();
            }
            Ok(())
        })();

        result.map_err(|e| e.context(format!("while reading method [{}]", method)))?;
        Ok(method_id)
    }

    fn read_annotation_set_ref_list(
        &self,
        offset: u32,
        dmv: &mut dyn crate::visitor::DexMethodVisitor,
    ) -> Result<(), DexError>
    {
        let mut ix = offset as usize;
        let size = read_u4(&self.image, &mut ix)?;
        for j in 0..size as usize
        {
            let param_annotation_off = read_u4(&self.image, &mut ix)?;
            if param_annotation_off == 0
            {
                continue;
            }
            if let Some(dpav) = dmv.visit_parameter_annotation(j)
            {
                self.read_annotation_set_item(param_annotation_off, dpav)
                    .map_err(|e| e.context(format!("while reading annotations of parameter [{}]", j)))?;
            }
        }
        Ok(())
    }

    fn read_annotation_set_item<D>(&self, offset: u32, daa: &mut D) -> Result<(), DexError>
    where
        D: DexAnnotationAble + ?Sized,
    {
        let mut ix = offset as usize;
        let size = read_u4(&self.image, &mut ix)?;
        for _ in 0..size
        {
            let annotation_off = read_u4(&self.image, &mut ix)?;
            self.read_annotation_item(annotation_off, daa)?;
        }
        Ok(())
    }

    fn read_annotation_item<D>(&self, offset: u32, daa: &mut D) -> Result<(), DexError>
    where
        D: DexAnnotationAble + ?Sized,
    {
        let mut ix = offset as usize;
        let visibility_byte = read_u1(&self.image, &mut ix)?;
        let visibility = Visibility::from_u8(visibility_byte)
            .ok_or_else(|| err!("bad annotation visibility {:#04x}", visibility_byte))?;

        let type_idx = read_uleb128(&self.image, &mut ix)?;
        let size = read_uleb128(&self.image, &mut ix)?;
        let type_desc = self.type_at(type_idx)?;

        if let Some(av) = daa.visit_annotation(&type_desc, visibility)
        {
            for _ in 0..size
            {
                let name_idx = read_uleb128(&self.image, &mut ix)?;
                let name = self.string_at(name_idx)?;
                let value = self.read_encoded_value(&mut ix)?;
                av.visit_element(&name, value);
            }
            av.visit_end();
        }
        Ok(())
    }

    pub(crate) fn read_encoded_array(&self, ix: &mut usize) -> Result<Vec<Value>, DexError>
    {
        let size = read_uleb128(&self.image, ix)?;
        let mut values = Vec::with_capacity((size as usize).min(64));
        for _ in 0..size
        {
            values.push(self.read_encoded_value(ix)?);
        }
        Ok(values)
    }

    fn read_encoded_annotation(&self, ix: &mut usize) -> Result<EncodedAnnotation, DexError>
    {
        let type_idx = read_uleb128(&self.image, ix)?;
        let size = read_uleb128(&self.image, ix)?;
        let type_desc = self.type_at(type_idx)?;
        let mut elements = Vec::with_capacity((size as usize).min(64));
        for _ in 0..size
        {
            let name_idx = read_uleb128(&self.image, ix)?;
            let name = self.string_at(name_idx)?;
            elements.push((name, self.read_encoded_value(ix)?));
        }
        Ok(EncodedAnnotation { type_desc, elements })
    }

    /// Decode one `encoded_value`; the low 5 bits of the leading byte
    /// select the variant, the high 3 carry the packed byte length.
    fn read_encoded_value(&self, ix: &mut usize) -> Result<Value, DexError>
    {
        let b = read_u1(&self.image, ix)?;
        match b & 0x1F
        {
            VALUE_BYTE => Ok(Value::Byte(read_int_bits(&self.image, ix, b)? as i8)),
            VALUE_SHORT => Ok(Value::Short(read_int_bits(&self.image, ix, b)? as i16)),
            VALUE_CHAR => Ok(Value::Char(read_uint_bits(&self.image, ix, b)? as u16)),
            VALUE_INT => Ok(Value::Int(read_int_bits(&self.image, ix, b)? as i32)),
            VALUE_LONG => Ok(Value::Long(read_int_bits(&self.image, ix, b)?)),
            VALUE_FLOAT => {
                let bits = read_float_bits(&self.image, ix, b)?;
                Ok(Value::Float(f32::from_bits((bits >> 32) as u32)))
            }
            VALUE_DOUBLE => Ok(Value::Double(f64::from_bits(read_float_bits(&self.image, ix, b)?))),
            VALUE_STRING => {
                let id = read_uint_bits(&self.image, ix, b)? as u32;
                Ok(Value::String(self.string_at(id)?))
            }
            VALUE_TYPE => {
                let id = read_uint_bits(&self.image, ix, b)? as u32;
                Ok(Value::Type(self.type_at(id)?))
            }
            VALUE_FIELD => {
                let id = read_uint_bits(&self.image, ix, b)? as u32;
                Ok(Value::Field(self.get_field(id)?))
            }
            VALUE_METHOD => {
                let id = read_uint_bits(&self.image, ix, b)? as u32;
                Ok(Value::Method(self.get_method(id)?))
            }
            VALUE_ENUM => {
                let id = read_uint_bits(&self.image, ix, b)? as u32;
                Ok(Value::Enum(self.get_field(id)?))
            }
            VALUE_ARRAY => Ok(Value::Array(self.read_encoded_array(ix)?)),
            VALUE_ANNOTATION => Ok(Value::Annotation(self.read_encoded_annotation(ix)?)),
            VALUE_NULL => Ok(Value::Null),
            VALUE_BOOLEAN => Ok(Value::Boolean((b >> 5) & 0x3 != 0)),
            t => Err(err!("unsupported encoded value type {:#04x}", t)),
        }
    }

    /// Pool lookup: string by index; `-1` resolves to the null string.
    pub(crate) fn get_string(&self, id: i32) -> Result<Option<String>, DexError>
    {
        if id == NO_INDEX
        {
            return Ok(None);
        }
        let mut ix = (id as u32 as usize).wrapping_mul(4);
        let data_off = read_u4(self.section(self.string_ids), &mut ix)? as usize;
        let mut data_ix = data_off;
        let s = mutf8::read_string(&self.image, &mut data_ix)
            .map_err(|e| e.context(format!("while loading string {}@{:08x}", id, data_off)))?;
        Ok(Some(s))
    }

    pub(crate) fn string_at(&self, idx: u32) -> Result<String, DexError>
    {
        match self.get_string(idx as i32)?
        {
            Some(s) => Ok(s),
            None => Err(err!("unexpected NO_INDEX string")),
        }
    }

    /// Pool lookup: type descriptor by index; `-1` resolves to `None`.
    pub(crate) fn get_type(&self, id: i32) -> Result<Option<String>, DexError>
    {
        if id == NO_INDEX
        {
            return Ok(None);
        }
        let mut ix = (id as u32 as usize).wrapping_mul(4);
        let string_idx = read_u4(self.section(self.type_ids), &mut ix)?;
        self.get_string(string_idx as i32)
    }

    pub(crate) fn type_at(&self, idx: u32) -> Result<String, DexError>
    {
        match self.get_type(idx as i32)?
        {
            Some(s) => Ok(s),
            None => Err(err!("unexpected NO_INDEX type")),
        }
    }

    /// Pool lookup: the `(owner, type, name)` record of a `field_id_item`.
    pub(crate) fn get_field(&self, id: u32) -> Result<Field, DexError>
    {
        let mut ix = (id as usize).wrapping_mul(8);
        let ids = self.section(self.field_ids);
        let owner_idx = read_u2(ids, &mut ix)? as u32;
        let type_idx = read_u2(ids, &mut ix)? as u32;
        let name_idx = read_u4(ids, &mut ix)?;
        Ok(Field {
            owner: self.type_at(owner_idx)?,
            name: self.string_at(name_idx)?,
            type_desc: self.type_at(type_idx)?,
        })
    }

    /// Pool lookup: a `method_id_item` with its prototype dereferenced.
    pub(crate) fn get_method(&self, id: u32) -> Result<Method, DexError>
    {
        let mut ix = (id as usize).wrapping_mul(8);
        let ids = self.section(self.method_ids);
        let owner_idx = read_u2(ids, &mut ix)? as u32;
        let proto_idx = read_u2(ids, &mut ix)? as u32;
        let name_idx = read_u4(ids, &mut ix)?;

        // proto_id_item: skip shorty_idx, read return type and parameters
        let mut pix = (proto_idx as usize).wrapping_mul(12) + 4;
        let protos = self.section(self.proto_ids);
        let return_type_idx = read_u4(protos, &mut pix)?;
        let parameters_off = read_u4(protos, &mut pix)?;

        Ok(Method {
            owner: self.type_at(owner_idx)?,
            name: self.string_at(name_idx)?,
            parameter_types: self.get_type_list(parameters_off)?,
            return_type: self.type_at(return_type_idx)?,
        })
    }

    /// Pool lookup: a `type_list` by image offset; offset 0 is empty.
    pub(crate) fn get_type_list(&self, offset: u32) -> Result<Vec<String>, DexError>
    {
        if offset == 0
        {
            return Ok(vec![]);
        }
        let mut ix = offset as usize;
        let size = read_u4(&self.image, &mut ix)?;
        let mut types = Vec::with_capacity((size as usize).min(64));
        for _ in 0..size
        {
            let type_idx = read_u2(&self.image, &mut ix)? as u32;
            types.push(self.type_at(type_idx)?);
        }
        Ok(types)
    }
}
