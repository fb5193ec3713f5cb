use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, trace};

use crate::{
    attributes::{AttributeRegistry, Attributes},
    class_file::{FieldInfo, MethodInfo, MAGIC},
    constant_pool::{
        ClassInfo, CpInfo, DynamicInfo, MethodHandleInfo, MethodTypeInfo, ModuleInfo,
        NameAndTypeInfo, PackageInfo, RefInfo, StringInfo, Utf8Info,
    },
    error::MalformedConstantPool,
    io::ReadClassExt,
    AccessFlags, ClassFile, ClassFileError, ConstantPool, Result,
};

type Endian = BigEndian;

/// Reads one class file from a forward-only byte source.
///
/// Any failure aborts the whole read, there is no partial result.
pub struct Parser<R> {
    r: R,
    registry: AttributeRegistry,
}
impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self::with_registry(r, AttributeRegistry::default())
    }

    pub fn with_registry(r: R, registry: AttributeRegistry) -> Self {
        Self { r, registry }
    }

    pub fn into_inner(self) -> R {
        self.r
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;
        debug!("Class file version {}.{}", major_version, minor_version);

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u2()?);
        let this_class = self.r.read_u2()?;
        let super_class = self.r.read_u2()?;
        let interfaces_count = self.r.read_u2()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;

        let fields_count = self.r.read_u2()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.r.read_u2()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes(&constant_pool)?;
        debug!(
            "Parsed {} interfaces, {} fields, {} methods, {} attributes",
            interfaces.len(),
            fields.len(),
            methods.len(),
            attributes.len()
        );

        Ok(ClassFile {
            magic,
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self, constant_pool: &ConstantPool) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u2()?);
        let name_index = self.r.read_u2()?;
        let descriptor_index = self.r.read_u2()?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, constant_pool: &ConstantPool) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u2()?);
        let name_index = self.r.read_u2()?;
        let descriptor_index = self.r.read_u2()?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<u32> {
        match self.r.read_u4()? {
            MAGIC => Ok(MAGIC),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.r.read_u2()?;
        let major = self.r.read_u2()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.r.read_u2()?;
        if constant_pool_count == 0 {
            return Err(MalformedConstantPool::ZeroCount.into());
        }

        let mut constant_pool = ConstantPool::new();
        while constant_pool.count() < constant_pool_count as u32 {
            let index = constant_pool.count() as u16;
            let cp_info = self.parse_cp_info(index)?;
            trace!("#{} = {:?}", index, cp_info);

            if constant_pool.count() + cp_info.slot_size() > constant_pool_count as u32 {
                return Err(MalformedConstantPool::WideEntryOverflow(index).into());
            }
            constant_pool.push(cp_info)?;
        }
        debug!(
            "Parsed constant pool: count {}, {} entries",
            constant_pool_count,
            constant_pool.len()
        );

        constant_pool.validate()?;
        Ok(constant_pool)
    }

    fn parse_cp_info(&mut self, index: u16) -> Result<CpInfo> {
        let tag = self.r.read_u1()?;
        let cp_info = match tag {
            CpInfo::UTF8 => self.parse_utf8(index)?,
            CpInfo::INTEGER => CpInfo::Integer(self.r.read_i32::<Endian>()?),
            CpInfo::FLOAT => CpInfo::Float(self.r.read_u4()?),
            CpInfo::LONG => CpInfo::Long(self.r.read_i64::<Endian>()?),
            CpInfo::DOUBLE => CpInfo::Double(self.r.read_u64::<Endian>()?),
            CpInfo::CLASS => CpInfo::Class(ClassInfo {
                name_index: self.r.read_u2()?,
            }),
            CpInfo::STRING => CpInfo::String(StringInfo {
                string_index: self.r.read_u2()?,
            }),
            CpInfo::FIELD_REF => CpInfo::FieldRef(self.parse_ref_info()?),
            CpInfo::METHOD_REF => CpInfo::MethodRef(self.parse_ref_info()?),
            CpInfo::INTERFACE_METHOD_REF => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            CpInfo::NAME_AND_TYPE => self.parse_name_and_type_info()?,
            CpInfo::METHOD_HANDLE => self.parse_method_handle()?,
            CpInfo::METHOD_TYPE => CpInfo::MethodType(MethodTypeInfo {
                descriptor_index: self.r.read_u2()?,
            }),
            CpInfo::DYNAMIC => CpInfo::Dynamic(self.parse_dynamic_info()?),
            CpInfo::INVOKE_DYNAMIC => CpInfo::InvokeDynamic(self.parse_dynamic_info()?),
            CpInfo::MODULE => CpInfo::Module(ModuleInfo {
                name_index: self.r.read_u2()?,
            }),
            CpInfo::PACKAGE => CpInfo::Package(PackageInfo {
                name_index: self.r.read_u2()?,
            }),
            _ => return Err(MalformedConstantPool::InvalidTag { tag, index }.into()),
        };

        Ok(cp_info)
    }

    fn parse_utf8(&mut self, index: u16) -> Result<CpInfo> {
        let length = self.r.read_u2()?;
        let bytes = self.r.read_bytes(length as usize).map_err(|e| match e {
            ClassFileError::UnexpectedEndOfStream => {
                MalformedConstantPool::Utf8Overrun { index, length }.into()
            }
            e => e,
        })?;

        Ok(CpInfo::Utf8(Utf8Info { bytes }))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.r.read_u2()?;
        let descriptor_index = self.r.read_u2()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.r.read_u1()?;
        let reference_index = self.r.read_u2()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_dynamic_info(&mut self) -> Result<DynamicInfo> {
        let bootstrap_method_attr_index = self.r.read_u2()?;
        let name_and_type_index = self.r.read_u2()?;

        Ok(DynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.r.read_u2()?;
        let name_and_type_index = self.r.read_u2()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attributes(&mut self, constant_pool: &ConstantPool) -> Result<Attributes> {
        Attributes::read_from(&mut self.r, constant_pool, &self.registry)
    }
}
