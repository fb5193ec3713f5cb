mod known;
mod registry;

use std::{
    borrow::Cow,
    fmt,
    io::{Read, Write},
};

use log::trace;

pub use self::known::*;
pub use self::registry::{known_factory, AttributeFactory, AttributeInput, AttributeRegistry};
use crate::{
    io::{ReadClassExt, WriteClassExt},
    ConstantPool, Result,
};

/// An attribute attached to a class, field, method or Code attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: AttributeInfo,
}
impl Attribute {
    pub fn new(attribute_name_index: u16, info: impl Into<AttributeInfo>) -> Self {
        Self {
            attribute_name_index,
            info: info.into(),
        }
    }

    /// Builds a known attribute, adding its name to `constant_pool` if needed.
    pub fn known<T: KnownAttribute>(constant_pool: &mut ConstantPool, attribute: T) -> Result<Self> {
        Ok(Self::new(constant_pool.utf8_index(T::NAME)?, attribute))
    }

    /// Builds an attribute the codec writes back byte for byte.
    pub fn raw(constant_pool: &mut ConstantPool, name: &str, info: Vec<u8>) -> Result<Self> {
        Ok(Self::new(
            constant_pool.utf8_index(name)?,
            AttributeInfo::Raw(RawAttribute { info }),
        ))
    }

    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Cow<'a, str>> {
        constant_pool.get_utf8(self.attribute_name_index)
    }

    pub fn read_from<R: Read + ?Sized>(
        r: &mut R,
        constant_pool: &ConstantPool,
        registry: &AttributeRegistry,
    ) -> Result<Self> {
        let attribute_name_index = r.read_u2()?;
        let attribute_length = r.read_u4()?;
        let info = r.read_bytes(attribute_length as usize)?;

        let name = constant_pool.get_utf8(attribute_name_index)?;
        trace!("Attribute {} ({} bytes)", name, attribute_length);

        Ok(Self {
            attribute_name_index,
            info: registry.parse(&name, info, constant_pool),
        })
    }

    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        let mut info = Vec::new();
        self.info.write_info(&mut info)?;

        w.write_u2(self.attribute_name_index)?;
        w.write_length(info.len(), "attribute bytes")?;
        w.write_all(&info)?;

        Ok(())
    }
}

macro_rules! known_attributes {
    ($($variant:ident($ty:ident)),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum AttributeInfo {
            $($variant($ty),)*
            /// An attribute without a registered factory, or one whose bytes
            /// did not match its registered shape.
            Raw(RawAttribute),
        }
        impl AttributeInfo {
            pub fn write_info<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
                match self {
                    $(AttributeInfo::$variant(a) => a.write_info(w),)*
                    AttributeInfo::Raw(raw) => Ok(w.write_all(&raw.info)?),
                }
            }

            /// Constant pool indices held by a known payload, empty for raw
            /// attributes.
            pub fn references(&self) -> Vec<u16> {
                match self {
                    $(AttributeInfo::$variant(a) => a.references(),)*
                    AttributeInfo::Raw(_) => Vec::new(),
                }
            }

            /// `None` for raw attributes.
            pub fn known_name(&self) -> Option<&'static str> {
                match self {
                    $(AttributeInfo::$variant(_) => Some(<$ty as KnownAttribute>::NAME),)*
                    AttributeInfo::Raw(_) => None,
                }
            }
        }

        $(
            impl From<$ty> for AttributeInfo {
                fn from(a: $ty) -> Self {
                    AttributeInfo::$variant(a)
                }
            }
        )*

        impl Default for AttributeRegistry {
            fn default() -> Self {
                let mut registry = Self::empty();
                $(registry.register_known::<$ty>();)*
                registry
            }
        }
    };
}

known_attributes! {
    ConstantValue(ConstantValueAttribute),
    Code(CodeAttribute),
    Exceptions(ExceptionsAttribute),
    InnerClasses(InnerClassesAttribute),
    EnclosingMethod(EnclosingMethodAttribute),
    Synthetic(SyntheticAttribute),
    Deprecated(DeprecatedAttribute),
    Signature(SignatureAttribute),
    SourceFile(SourceFileAttribute),
    LineNumberTable(LineNumberTableAttribute),
    LocalVariableTable(LocalVariableTableAttribute),
    BootstrapMethods(BootstrapMethodsAttribute),
    NestHost(NestHostAttribute),
    NestMembers(NestMembersAttribute),
    PermittedSubclasses(PermittedSubclassesAttribute),
}

impl From<RawAttribute> for AttributeInfo {
    fn from(raw: RawAttribute) -> Self {
        AttributeInfo::Raw(raw)
    }
}

#[derive(Clone, PartialEq, Eq, Default)]
pub struct RawAttribute {
    pub info: Vec<u8>,
}
impl RawAttribute {
    pub fn length(&self) -> usize {
        self.info.len()
    }
}
impl fmt::Debug for RawAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAttribute")
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn read_from<R: Read + ?Sized>(
        r: &mut R,
        constant_pool: &ConstantPool,
        registry: &AttributeRegistry,
    ) -> Result<Self> {
        let attributes_count = r.read_u2()?;
        (0..attributes_count)
            .map(|_| Attribute::read_from(r, constant_pool, registry))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_count(self.0.len(), "attributes")?;
        for attribute in &self.0 {
            attribute.write_to(w)?;
        }

        Ok(())
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0.iter().find(|a| {
            a.name(constant_pool)
                .map(|attribute_name| attribute_name == name)
                .unwrap_or(false)
        })
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match &a.info {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn signature(&self) -> Option<&SignatureAttribute> {
        self.0.iter().find_map(|a| match &a.info {
            AttributeInfo::Signature(signature) => Some(signature),
            _ => None,
        })
    }

    pub fn source_file(&self) -> Option<&SourceFileAttribute> {
        self.0.iter().find_map(|a| match &a.info {
            AttributeInfo::SourceFile(source_file) => Some(source_file),
            _ => None,
        })
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
