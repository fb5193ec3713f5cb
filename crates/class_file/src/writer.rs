use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use log::{debug, trace};

use crate::{
    class_file::{FieldInfo, MethodInfo},
    constant_pool::CpInfo,
    io::WriteClassExt,
    ClassFile, ClassFileError, ConstantPool, Result,
};

type Endian = BigEndian;

/// Writes a class file in the same stage order [`crate::Parser`] reads it.
pub struct Writer<W> {
    w: W,
}
impl<W: Write> Writer<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    pub fn write(&mut self, class_file: &ClassFile) -> Result<()> {
        self.w.write_u4(class_file.magic)?;
        self.w.write_u2(class_file.minor_version)?;
        self.w.write_u2(class_file.major_version)?;

        self.write_constant_pool(&class_file.constant_pool)?;

        self.w.write_u2(class_file.access_flags.bits())?;
        self.w.write_u2(class_file.this_class)?;
        self.w.write_u2(class_file.super_class)?;

        self.w
            .write_count(class_file.interfaces.len(), "interfaces")?;
        for interface in &class_file.interfaces {
            self.w.write_u2(*interface)?;
        }

        self.w.write_count(class_file.fields.len(), "fields")?;
        for field in &class_file.fields {
            self.write_field_info(field)?;
        }

        self.w.write_count(class_file.methods.len(), "methods")?;
        for method in &class_file.methods {
            self.write_method_info(method)?;
        }

        class_file.attributes.write_to(&mut self.w)?;
        debug!(
            "Wrote {} interfaces, {} fields, {} methods, {} attributes",
            class_file.interfaces.len(),
            class_file.fields.len(),
            class_file.methods.len(),
            class_file.attributes.len()
        );

        Ok(())
    }

    fn write_field_info(&mut self, field: &FieldInfo) -> Result<()> {
        self.w.write_u2(field.access_flags.bits())?;
        self.w.write_u2(field.name_index)?;
        self.w.write_u2(field.descriptor_index)?;
        field.attributes.write_to(&mut self.w)
    }

    fn write_method_info(&mut self, method: &MethodInfo) -> Result<()> {
        self.w.write_u2(method.access_flags.bits())?;
        self.w.write_u2(method.name_index)?;
        self.w.write_u2(method.descriptor_index)?;
        method.attributes.write_to(&mut self.w)
    }

    fn write_constant_pool(&mut self, constant_pool: &ConstantPool) -> Result<()> {
        let count = constant_pool.count();
        let constant_pool_count =
            u16::try_from(count).map_err(|_| ClassFileError::CollectionTooLarge {
                what: "constant pool slots",
                len: count as usize,
            })?;
        self.w.write_u2(constant_pool_count)?;

        let mut expected_index = 1u32;
        for (index, cp_info) in constant_pool.iter() {
            debug_assert_eq!(expected_index, index as u32);
            trace!("#{} = {:?}", index, cp_info);

            self.write_cp_info(cp_info)?;
            expected_index += cp_info.slot_size();
        }
        debug!(
            "Wrote constant pool: count {}, {} entries",
            constant_pool_count,
            constant_pool.len()
        );

        Ok(())
    }

    fn write_cp_info(&mut self, cp_info: &CpInfo) -> Result<()> {
        self.w.write_u1(cp_info.tag())?;
        match cp_info {
            CpInfo::Utf8(utf8) => {
                self.w.write_count(utf8.bytes.len(), "Utf8 bytes")?;
                self.w.write_all(&utf8.bytes)?;
            }
            CpInfo::Integer(int) => self.w.write_i32::<Endian>(*int)?,
            CpInfo::Float(bits) => self.w.write_u4(*bits)?,
            CpInfo::Long(long) => self.w.write_i64::<Endian>(*long)?,
            CpInfo::Double(bits) => self.w.write_u64::<Endian>(*bits)?,
            CpInfo::Class(class) => self.w.write_u2(class.name_index)?,
            CpInfo::String(string) => self.w.write_u2(string.string_index)?,
            CpInfo::FieldRef(ref_info)
            | CpInfo::MethodRef(ref_info)
            | CpInfo::InterfaceMethodRef(ref_info) => {
                self.w.write_u2(ref_info.class_index)?;
                self.w.write_u2(ref_info.name_and_type_index)?;
            }
            CpInfo::NameAndType(name_and_type) => {
                self.w.write_u2(name_and_type.name_index)?;
                self.w.write_u2(name_and_type.descriptor_index)?;
            }
            CpInfo::MethodHandle(handle) => {
                self.w.write_u1(handle.reference_kind)?;
                self.w.write_u2(handle.reference_index)?;
            }
            CpInfo::MethodType(method_type) => self.w.write_u2(method_type.descriptor_index)?,
            CpInfo::Dynamic(dynamic) | CpInfo::InvokeDynamic(dynamic) => {
                self.w.write_u2(dynamic.bootstrap_method_attr_index)?;
                self.w.write_u2(dynamic.name_and_type_index)?;
            }
            CpInfo::Module(module) => self.w.write_u2(module.name_index)?,
            CpInfo::Package(package) => self.w.write_u2(package.name_index)?,
        }

        Ok(())
    }
}
