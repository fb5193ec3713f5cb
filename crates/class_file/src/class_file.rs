use std::{
    borrow::Cow,
    io::{Read, Write},
};

use crate::{
    attributes::{Attribute, AttributeInfo, Attributes},
    constant_pool::ClassInfo,
    matches_cp_info,
    parser::Parser,
    writer::Writer,
    AccessFlags, ClassFileError, ConstantPool, Result,
};

pub const MAGIC: u32 = 0xCAFEBABE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    pub magic: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn new(major_version: u16, minor_version: u16) -> Self {
        Self {
            magic: MAGIC,
            minor_version,
            major_version,
            constant_pool: ConstantPool::new(),
            access_flags: AccessFlags::empty(),
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Attributes::default(),
        }
    }

    pub fn parse(bytes: impl Read) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn write_to(&self, w: impl Write) -> Result<()> {
        Writer::new(w).write(self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    pub fn super_class(&self) -> Result<Option<Cow<'_, str>>> {
        // If the value of the super_class item is zero, then this class file must represent the
        // class Object, the only class or interface without a direct superclass.
        if self.super_class == 0 {
            return Ok(None);
        }

        // Otherwise the constant_pool entry at that index must be a CONSTANT_Class_info
        // structure representing the direct superclass of the class defined by this class file.
        self.class_info_name(self.super_class).map(Some)
    }

    pub fn class_name(&self) -> Result<Cow<'_, str>> {
        self.class_info_name(self.this_class)
    }

    pub fn interface_names(&self) -> Result<Vec<Cow<'_, str>>> {
        self.interfaces
            .iter()
            .map(|index| self.class_info_name(*index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<Cow<'_, str>> {
        self.constant_pool.get_utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<Cow<'_, str>> {
        self.constant_pool.get_utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<Cow<'_, str>> {
        self.constant_pool.get_utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<Cow<'_, str>> {
        self.constant_pool.get_utf8(method.descriptor_index)
    }

    fn class_info_name(&self, index: u16) -> Result<Cow<'_, str>> {
        let ClassInfo { name_index } = matches_cp_info!(self.constant_pool, index, Class)?;
        self.constant_pool.get_utf8(*name_index)
    }

    /// Checks that every constant pool index held by the class, its members and
    /// their attributes points at an entry. Only the bounds are checked, not
    /// the kind of the entry.
    pub fn validate(&self) -> Result<()> {
        self.constant_pool.validate()?;

        self.check_index(self.this_class)?;
        if self.super_class != 0 {
            self.check_index(self.super_class)?;
        }
        for interface in &self.interfaces {
            self.check_index(*interface)?;
        }

        let members = self
            .fields
            .iter()
            .map(|f| (f.name_index, f.descriptor_index, &f.attributes))
            .chain(
                self.methods
                    .iter()
                    .map(|m| (m.name_index, m.descriptor_index, &m.attributes)),
            );
        for (name_index, descriptor_index, attributes) in members {
            self.check_index(name_index)?;
            self.check_index(descriptor_index)?;
            self.check_attributes(attributes)?;
        }

        self.check_attributes(&self.attributes)
    }

    fn check_attributes(&self, attributes: &Attributes) -> Result<()> {
        for Attribute {
            attribute_name_index,
            info,
        } in attributes
        {
            self.check_index(*attribute_name_index)?;
            for index in info.references() {
                self.check_index(index)?;
            }
            if let AttributeInfo::Code(code) = info {
                self.check_attributes(&code.attributes)?;
            }
        }

        Ok(())
    }

    fn check_index(&self, index: u16) -> Result<()> {
        if !self.constant_pool.contains(index) {
            return Err(ClassFileError::InvalidConstantPoolIndex(index));
        }

        Ok(())
    }
}
impl Default for ClassFile {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
