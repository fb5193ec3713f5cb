use std::{collections::HashMap, fmt, io};

use log::{trace, warn};

use super::{AttributeInfo, Attributes, KnownAttribute, RawAttribute};
use crate::{ClassFileError, ConstantPool, Result};

/// Parses the payload of one attribute kind.
///
/// [`AttributeInfo`] is closed, so a factory registered under a new name
/// produces one of the built-in layouts or [`AttributeInfo::Raw`].
pub type AttributeFactory = fn(&mut AttributeInput<'_>) -> Result<AttributeInfo>;

pub fn known_factory<T: KnownAttribute>(input: &mut AttributeInput<'_>) -> Result<AttributeInfo> {
    T::read_info(input).map(Into::into)
}

/// Maps attribute names to the factories that understand them.
///
/// Names are matched exactly. Attributes whose name has no factory are kept
/// as [`AttributeInfo::Raw`].
#[derive(Clone)]
pub struct AttributeRegistry {
    factories: HashMap<String, AttributeFactory>,
}
impl AttributeRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Returns the factory previously registered under `name`, if any.
    ///
    /// The factory may reinterpret any name as one of the built-in layouts,
    /// for example a vendor attribute that shares the shape of `NestHost`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: AttributeFactory,
    ) -> Option<AttributeFactory> {
        self.factories.insert(name.into(), factory)
    }

    pub fn register_known<T: KnownAttribute>(&mut self) {
        self.register(T::NAME, known_factory::<T>);
    }

    pub fn with(mut self, name: impl Into<String>, factory: AttributeFactory) -> Self {
        self.register(name, factory);
        self
    }

    pub fn unregister(&mut self, name: &str) -> Option<AttributeFactory> {
        self.factories.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<AttributeFactory> {
        self.factories.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub(crate) fn parse(
        &self,
        name: &str,
        info: Vec<u8>,
        constant_pool: &ConstantPool,
    ) -> AttributeInfo {
        let Some(factory) = self.get(name) else {
            trace!("No factory for {}, keeping {} bytes", name, info.len());
            return AttributeInfo::Raw(RawAttribute { info });
        };

        let mut input = AttributeInput::new(&info, constant_pool, self);
        match factory(&mut input).and_then(|attribute| input.finish(name).map(|()| attribute)) {
            Ok(attribute) => attribute,
            Err(e) => {
                warn!("Keeping {} as raw bytes: {}", name, e);
                AttributeInfo::Raw(RawAttribute { info })
            }
        }
    }
}
impl fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.factories.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("AttributeRegistry")
            .field("names", &names)
            .finish()
    }
}

/// The payload of a single attribute, handed to its factory.
///
/// Reads past the end of the payload fail with
/// [`ClassFileError::UnexpectedEndOfStream`].
pub struct AttributeInput<'a> {
    r: &'a [u8],
    length: usize,
    constant_pool: &'a ConstantPool,
    registry: &'a AttributeRegistry,
}
impl<'a> AttributeInput<'a> {
    pub fn new(
        info: &'a [u8],
        constant_pool: &'a ConstantPool,
        registry: &'a AttributeRegistry,
    ) -> Self {
        Self {
            r: info,
            length: info.len(),
            constant_pool,
            registry,
        }
    }

    pub fn constant_pool(&self) -> &'a ConstantPool {
        self.constant_pool
    }

    pub fn remaining(&self) -> usize {
        self.r.len()
    }

    pub fn consumed(&self) -> usize {
        self.length - self.r.len()
    }

    /// Reads a nested attribute table, as found inside Code.
    pub fn read_attributes(&mut self) -> Result<Attributes> {
        let (constant_pool, registry) = (self.constant_pool, self.registry);
        Attributes::read_from(self, constant_pool, registry)
    }

    fn finish(&self, name: &str) -> Result<()> {
        if !self.r.is_empty() {
            return Err(ClassFileError::AttributeLengthMismatch {
                name: name.to_owned(),
                declared: self.length,
                consumed: self.consumed(),
            });
        }

        Ok(())
    }
}
impl io::Read for AttributeInput<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut self.r, buf)
    }
}
