// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7

use std::io::Write;

use super::{AttributeInput, Attributes};
use crate::{
    io::{ReadClassExt, WriteClassExt},
    AccessFlags, Result,
};

/// An attribute with a fixed, name-determined layout.
pub trait KnownAttribute: Sized + Into<super::AttributeInfo> {
    const NAME: &'static str;

    /// Reads the payload, without the name index and length prefix.
    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self>;

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()>;

    /// Constant pool indices held by the payload. Optional indices are left
    /// out when zero, nested attributes are not included.
    fn references(&self) -> Vec<u16> {
        Vec::new()
    }
}

fn read_table<'a, T>(
    input: &mut AttributeInput<'a>,
    mut read_entry: impl FnMut(&mut AttributeInput<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = input.read_u2()?;
    (0..count).map(|_| read_entry(input)).collect()
}

fn write_table<W: Write + ?Sized, T>(
    w: &mut W,
    entries: &[T],
    what: &'static str,
    mut write_entry: impl FnMut(&mut W, &T) -> Result<()>,
) -> Result<()> {
    w.write_count(entries.len(), what)?;
    for entry in entries {
        write_entry(w, entry)?;
    }

    Ok(())
}

fn non_zero(index: u16) -> Option<u16> {
    (index != 0).then_some(index)
}

fn read_indices(input: &mut AttributeInput<'_>) -> Result<Vec<u16>> {
    read_table(input, |input| input.read_u2())
}

fn write_indices<W: Write + ?Sized>(w: &mut W, indices: &[u16], what: &'static str) -> Result<()> {
    write_table(w, indices, what, |w, index| w.write_u2(*index))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantValueAttribute {
    pub constantvalue_index: u16,
}
impl KnownAttribute for ConstantValueAttribute {
    const NAME: &'static str = "ConstantValue";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self {
            constantvalue_index: input.read_u2()?,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_u2(self.constantvalue_index)
    }

    fn references(&self) -> Vec<u16> {
        vec![self.constantvalue_index]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl KnownAttribute for CodeAttribute {
    const NAME: &'static str = "Code";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        let max_stack = input.read_u2()?;
        let max_locals = input.read_u2()?;
        let code_length = input.read_u4()?;
        let code = input.read_bytes(code_length as usize)?;
        let exception_table = read_table(input, |input| {
            Ok(ExceptionTableEntry {
                start_pc: input.read_u2()?,
                end_pc: input.read_u2()?,
                handler_pc: input.read_u2()?,
                catch_type: input.read_u2()?,
            })
        })?;
        let attributes = input.read_attributes()?;

        Ok(Self {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_u2(self.max_stack)?;
        w.write_u2(self.max_locals)?;
        w.write_length(self.code.len(), "code bytes")?;
        w.write_all(&self.code)?;
        write_table(w, &self.exception_table, "exception table entries", |w, entry| {
            w.write_u2(entry.start_pc)?;
            w.write_u2(entry.end_pc)?;
            w.write_u2(entry.handler_pc)?;
            w.write_u2(entry.catch_type)
        })?;
        self.attributes.write_to(w)
    }

    fn references(&self) -> Vec<u16> {
        self.exception_table
            .iter()
            .map(|entry| entry.catch_type)
            .filter(|catch_type| *catch_type != 0)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionsAttribute {
    pub exception_index_table: Vec<u16>,
}
impl KnownAttribute for ExceptionsAttribute {
    const NAME: &'static str = "Exceptions";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self {
            exception_index_table: read_indices(input)?,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_indices(w, &self.exception_index_table, "exceptions")
    }

    fn references(&self) -> Vec<u16> {
        self.exception_index_table.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    /// Zero for top-level, local and anonymous classes.
    pub outer_class_info_index: u16,
    /// Zero for anonymous classes.
    pub inner_name_index: u16,
    pub inner_class_access_flags: AccessFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassesAttribute {
    pub classes: Vec<InnerClass>,
}
impl KnownAttribute for InnerClassesAttribute {
    const NAME: &'static str = "InnerClasses";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        let classes = read_table(input, |input| {
            Ok(InnerClass {
                inner_class_info_index: input.read_u2()?,
                outer_class_info_index: input.read_u2()?,
                inner_name_index: input.read_u2()?,
                inner_class_access_flags: AccessFlags::from_bits_truncate(input.read_u2()?),
            })
        })?;

        Ok(Self { classes })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_table(w, &self.classes, "inner classes", |w, class| {
            w.write_u2(class.inner_class_info_index)?;
            w.write_u2(class.outer_class_info_index)?;
            w.write_u2(class.inner_name_index)?;
            w.write_u2(class.inner_class_access_flags.bits())
        })
    }

    fn references(&self) -> Vec<u16> {
        self.classes
            .iter()
            .flat_map(|class| {
                [
                    Some(class.inner_class_info_index),
                    non_zero(class.outer_class_info_index),
                    non_zero(class.inner_name_index),
                ]
            })
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingMethodAttribute {
    pub class_index: u16,
    /// Zero when the class is not enclosed by a method or constructor.
    pub method_index: u16,
}
impl KnownAttribute for EnclosingMethodAttribute {
    const NAME: &'static str = "EnclosingMethod";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self {
            class_index: input.read_u2()?,
            method_index: input.read_u2()?,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_u2(self.class_index)?;
        w.write_u2(self.method_index)
    }

    fn references(&self) -> Vec<u16> {
        [Some(self.class_index), non_zero(self.method_index)]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntheticAttribute;
impl KnownAttribute for SyntheticAttribute {
    const NAME: &'static str = "Synthetic";

    fn read_info(_input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self)
    }

    fn write_info<W: Write + ?Sized>(&self, _w: &mut W) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeprecatedAttribute;
impl KnownAttribute for DeprecatedAttribute {
    const NAME: &'static str = "Deprecated";

    fn read_info(_input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self)
    }

    fn write_info<W: Write + ?Sized>(&self, _w: &mut W) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureAttribute {
    pub signature_index: u16,
}
impl KnownAttribute for SignatureAttribute {
    const NAME: &'static str = "Signature";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self {
            signature_index: input.read_u2()?,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_u2(self.signature_index)
    }

    fn references(&self) -> Vec<u16> {
        vec![self.signature_index]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileAttribute {
    pub sourcefile_index: u16,
}
impl KnownAttribute for SourceFileAttribute {
    const NAME: &'static str = "SourceFile";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self {
            sourcefile_index: input.read_u2()?,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_u2(self.sourcefile_index)
    }

    fn references(&self) -> Vec<u16> {
        vec![self.sourcefile_index]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumberTableAttribute {
    pub line_number_table: Vec<LineNumber>,
}
impl KnownAttribute for LineNumberTableAttribute {
    const NAME: &'static str = "LineNumberTable";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        let line_number_table = read_table(input, |input| {
            Ok(LineNumber {
                start_pc: input.read_u2()?,
                line_number: input.read_u2()?,
            })
        })?;

        Ok(Self { line_number_table })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_table(w, &self.line_number_table, "line numbers", |w, line| {
            w.write_u2(line.start_pc)?;
            w.write_u2(line.line_number)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableTableAttribute {
    pub local_variable_table: Vec<LocalVariable>,
}
impl KnownAttribute for LocalVariableTableAttribute {
    const NAME: &'static str = "LocalVariableTable";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        let local_variable_table = read_table(input, |input| {
            Ok(LocalVariable {
                start_pc: input.read_u2()?,
                length: input.read_u2()?,
                name_index: input.read_u2()?,
                descriptor_index: input.read_u2()?,
                index: input.read_u2()?,
            })
        })?;

        Ok(Self {
            local_variable_table,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_table(w, &self.local_variable_table, "local variables", |w, local| {
            w.write_u2(local.start_pc)?;
            w.write_u2(local.length)?;
            w.write_u2(local.name_index)?;
            w.write_u2(local.descriptor_index)?;
            w.write_u2(local.index)
        })
    }

    fn references(&self) -> Vec<u16> {
        self.local_variable_table
            .iter()
            .flat_map(|local| [local.name_index, local.descriptor_index])
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: u16,
    pub bootstrap_arguments: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethodsAttribute {
    pub bootstrap_methods: Vec<BootstrapMethod>,
}
impl KnownAttribute for BootstrapMethodsAttribute {
    const NAME: &'static str = "BootstrapMethods";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        let bootstrap_methods = read_table(input, |input| {
            Ok(BootstrapMethod {
                bootstrap_method_ref: input.read_u2()?,
                bootstrap_arguments: read_indices(input)?,
            })
        })?;

        Ok(Self { bootstrap_methods })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_table(w, &self.bootstrap_methods, "bootstrap methods", |w, method| {
            w.write_u2(method.bootstrap_method_ref)?;
            write_indices(w, &method.bootstrap_arguments, "bootstrap arguments")
        })
    }

    fn references(&self) -> Vec<u16> {
        self.bootstrap_methods
            .iter()
            .flat_map(|method| {
                std::iter::once(method.bootstrap_method_ref)
                    .chain(method.bootstrap_arguments.iter().copied())
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestHostAttribute {
    pub host_class_index: u16,
}
impl KnownAttribute for NestHostAttribute {
    const NAME: &'static str = "NestHost";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self {
            host_class_index: input.read_u2()?,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_u2(self.host_class_index)
    }

    fn references(&self) -> Vec<u16> {
        vec![self.host_class_index]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestMembersAttribute {
    pub classes: Vec<u16>,
}
impl KnownAttribute for NestMembersAttribute {
    const NAME: &'static str = "NestMembers";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self {
            classes: read_indices(input)?,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_indices(w, &self.classes, "nest members")
    }

    fn references(&self) -> Vec<u16> {
        self.classes.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermittedSubclassesAttribute {
    pub classes: Vec<u16>,
}
impl KnownAttribute for PermittedSubclassesAttribute {
    const NAME: &'static str = "PermittedSubclasses";

    fn read_info(input: &mut AttributeInput<'_>) -> Result<Self> {
        Ok(Self {
            classes: read_indices(input)?,
        })
    }

    fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_indices(w, &self.classes, "permitted subclasses")
    }

    fn references(&self) -> Vec<u16> {
        self.classes.clone()
    }
}
