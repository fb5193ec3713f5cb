use std::{borrow::Cow, collections::BTreeMap, ops::Index};

use cesu8::{from_java_cesu8, to_java_cesu8, Cesu8DecodingError};

use crate::{error::MalformedConstantPool, ClassFileError, Result};

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {{
        let index: u16 = $index;
        match $cp.get(index) {
            Some($crate::constant_pool::CpInfo::$i(n)) => Ok(n),
            Some(c) => Err($crate::ClassFileError::UnexpectedConstantPoolEntry(
                stringify!($i),
                c.clone(),
            )),
            None => Err($crate::ClassFileError::InvalidConstantPoolIndex(index)),
        }
    }};
}

/// The constant pool, addressed by logical index starting at 1.
///
/// `Long` and `Double` entries make the index following them unusable, so the
/// declared count (what the format writes as `constant_pool_count`) is kept
/// apart from the number of stored entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    cp_infos: BTreeMap<u16, CpInfo>,
    next_index: u32,
}
impl ConstantPool {
    pub fn new() -> Self {
        Self {
            cp_infos: BTreeMap::new(),
            next_index: 1,
        }
    }

    /// Appends `cp_info` at the next usable index and returns that index.
    pub fn push(&mut self, cp_info: CpInfo) -> Result<u16> {
        let index = u16::try_from(self.next_index)
            .ok()
            .filter(|index| *index < u16::MAX)
            .ok_or(ClassFileError::CollectionTooLarge {
                what: "constant pool entries",
                len: self.next_index as usize,
            })?;

        self.next_index += cp_info.slot_size();
        self.cp_infos.insert(index, cp_info);

        Ok(index)
    }

    /// Returns `None` for index 0, the slot after a `Long`/`Double`, and
    /// anything past the end of the pool.
    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        self.cp_infos.get(&index)
    }

    pub fn contains(&self, index: u16) -> bool {
        self.cp_infos.contains_key(&index)
    }

    /// The value written as `constant_pool_count`: one more than the highest
    /// usable index.
    pub fn count(&self) -> u32 {
        self.next_index
    }

    /// Number of stored entries, which is below `count() - 1` whenever the
    /// pool holds double-width entries.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> {
        self.cp_infos.iter().map(|(index, cp_info)| (*index, cp_info))
    }

    pub fn get_utf8(&self, index: u16) -> Result<Cow<'_, str>> {
        let utf8 = matches_cp_info!(self, index, Utf8)?;
        Ok(utf8.to_str()?)
    }

    /// Index of a Utf8 entry holding `s`, appending one if none exists.
    pub fn utf8_index(&mut self, s: &str) -> Result<u16> {
        let bytes = to_java_cesu8(s).into_owned();
        let existing = self.iter().find_map(|(index, cp_info)| match cp_info {
            CpInfo::Utf8(utf8) if utf8.bytes == bytes => Some(index),
            _ => None,
        });

        match existing {
            Some(index) => Ok(index),
            None => self.push(CpInfo::Utf8(Utf8Info { bytes })),
        }
    }

    /// Index of a Class entry naming `name`, appending entries as needed.
    pub fn class_index(&mut self, name: &str) -> Result<u16> {
        let name_index = self.utf8_index(name)?;
        let existing = self.iter().find_map(|(index, cp_info)| match cp_info {
            CpInfo::Class(class) if class.name_index == name_index => Some(index),
            _ => None,
        });

        match existing {
            Some(index) => Ok(index),
            None => self.push(CpInfo::Class(ClassInfo { name_index })),
        }
    }

    /// Checks that every index held by an entry points at a stored entry.
    /// The kind of the referenced entry is not checked.
    pub fn validate(&self) -> Result<()> {
        for (at, cp_info) in self.iter() {
            if let Some(index) = cp_info
                .references()
                .into_iter()
                .find(|index| !self.contains(*index))
            {
                return Err(MalformedConstantPool::InvalidIndex { at, index }.into());
            }
        }

        Ok(())
    }
}
impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}
impl Index<u16> for ConstantPool {
    type Output = CpInfo;

    /// # Panics
    ///
    /// If there is no entry at `index`, see [`ConstantPool::get`].
    fn index(&self, index: u16) -> &Self::Output {
        &self.cp_infos[&index]
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = (&'a u16, &'a CpInfo);
    type IntoIter = std::collections::btree_map::Iter<'a, u16, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CpInfo {
    Utf8(Utf8Info),
    Integer(i32),
    /// Raw IEEE 754 bits, so NaN payloads survive a round trip.
    Float(u32),
    Long(i64),
    /// Raw IEEE 754 bits.
    Double(u64),
    Class(ClassInfo),
    String(StringInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Module(ModuleInfo),
    Package(PackageInfo),
}
impl CpInfo {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;

    pub fn tag(&self) -> u8 {
        match self {
            CpInfo::Utf8(_) => Self::UTF8,
            CpInfo::Integer(_) => Self::INTEGER,
            CpInfo::Float(_) => Self::FLOAT,
            CpInfo::Long(_) => Self::LONG,
            CpInfo::Double(_) => Self::DOUBLE,
            CpInfo::Class(_) => Self::CLASS,
            CpInfo::String(_) => Self::STRING,
            CpInfo::FieldRef(_) => Self::FIELD_REF,
            CpInfo::MethodRef(_) => Self::METHOD_REF,
            CpInfo::InterfaceMethodRef(_) => Self::INTERFACE_METHOD_REF,
            CpInfo::NameAndType(_) => Self::NAME_AND_TYPE,
            CpInfo::MethodHandle(_) => Self::METHOD_HANDLE,
            CpInfo::MethodType(_) => Self::METHOD_TYPE,
            CpInfo::Dynamic(_) => Self::DYNAMIC,
            CpInfo::InvokeDynamic(_) => Self::INVOKE_DYNAMIC,
            CpInfo::Module(_) => Self::MODULE,
            CpInfo::Package(_) => Self::PACKAGE,
        }
    }

    /// Number of logical indices the entry occupies.
    pub fn slot_size(&self) -> u32 {
        match self {
            CpInfo::Long(_) | CpInfo::Double(_) => 2,
            _ => 1,
        }
    }

    pub fn float(value: f32) -> Self {
        CpInfo::Float(value.to_bits())
    }

    pub fn double(value: f64) -> Self {
        CpInfo::Double(value.to_bits())
    }

    /// Constant pool indices held by this entry. `bootstrap_method_attr_index`
    /// points into the BootstrapMethods attribute and is not included.
    pub fn references(&self) -> Vec<u16> {
        match self {
            CpInfo::Utf8(_)
            | CpInfo::Integer(_)
            | CpInfo::Float(_)
            | CpInfo::Long(_)
            | CpInfo::Double(_) => vec![],
            CpInfo::Class(ClassInfo { name_index })
            | CpInfo::Module(ModuleInfo { name_index })
            | CpInfo::Package(PackageInfo { name_index }) => vec![*name_index],
            CpInfo::String(StringInfo { string_index }) => vec![*string_index],
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                vec![r.class_index, r.name_and_type_index]
            }
            CpInfo::NameAndType(n) => vec![n.name_index, n.descriptor_index],
            CpInfo::MethodHandle(h) => vec![h.reference_index],
            CpInfo::MethodType(t) => vec![t.descriptor_index],
            CpInfo::Dynamic(d) | CpInfo::InvokeDynamic(d) => vec![d.name_and_type_index],
        }
    }
}

/// The raw modified UTF-8 bytes of a Utf8 constant.
#[derive(PartialEq, Eq, Clone, Default)]
pub struct Utf8Info {
    pub bytes: Vec<u8>,
}
impl Utf8Info {
    /// Decodes the modified UTF-8 bytes. A zero byte or a byte in
    /// `0xF0..=0xFF` never appears in a well-formed entry.
    pub fn to_str(&self) -> Result<Cow<'_, str>, Cesu8DecodingError> {
        if self.bytes.iter().any(|b| *b == 0 || *b >= 0xF0) {
            return Err(Cesu8DecodingError);
        }

        from_java_cesu8(&self.bytes)
    }
}
impl From<&str> for Utf8Info {
    fn from(s: &str) -> Self {
        Self {
            bytes: to_java_cesu8(s).into_owned(),
        }
    }
}
impl std::fmt::Debug for Utf8Info {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_str() {
            Ok(s) => write!(f, "{:?}", s),
            Err(_) => write!(f, "{:?}", self.bytes),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ClassInfo {
    // The constant_pool entry at name_index must be a CONSTANT_Utf8_info structure
    // representing a valid binary class or interface name encoded in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StringInfo {
    pub string_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

/// Shared by `CONSTANT_Dynamic_info` and `CONSTANT_InvokeDynamic_info`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ModuleInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PackageInfo {
    pub name_index: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_reserves_the_next_index() {
        let mut cp = ConstantPool::new();
        assert_eq!(1, cp.push(CpInfo::Integer(7)).unwrap());
        assert_eq!(2, cp.push(CpInfo::Long(-1)).unwrap());
        assert_eq!(4, cp.push(CpInfo::double(0.5)).unwrap());
        assert_eq!(6, cp.push(CpInfo::Utf8("x".into())).unwrap());

        assert!(cp.get(3).is_none());
        assert!(cp.get(5).is_none());
        assert_eq!(7, cp.count());
        assert_eq!(4, cp.len());
    }

    #[test]
    fn utf8_index_reuses_entries() {
        let mut cp = ConstantPool::new();
        let a = cp.utf8_index("Signature").unwrap();
        let b = cp.class_index("java/lang/Object").unwrap();
        assert_eq!(a, cp.utf8_index("Signature").unwrap());
        assert_eq!(b, cp.class_index("java/lang/Object").unwrap());
        assert_eq!(3, cp.len());
    }

    #[test]
    fn nul_is_two_bytes() {
        let utf8 = Utf8Info::from("a\0b");
        assert_eq!(vec![b'a', 0xC0, 0x80, b'b'], utf8.bytes);
        assert_eq!("a\0b", utf8.to_str().unwrap());
    }

    #[test]
    fn supplementary_characters_use_surrogates() {
        let utf8 = Utf8Info::from("\u{1F600}");
        assert_eq!(vec![0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80], utf8.bytes);
        assert_eq!("\u{1F600}", utf8.to_str().unwrap());
    }

    #[test]
    fn bmp_characters_match_utf8() {
        let utf8 = Utf8Info::from("é€");
        assert_eq!("é€".as_bytes(), utf8.bytes.as_slice());
        assert_eq!("é€", utf8.to_str().unwrap());
    }

    #[test]
    fn bytes_outside_modified_utf8_are_rejected() {
        for bytes in [
            vec![b'a', 0x00, b'b'],
            vec![0xF0, 0x9F, 0x98, 0x80],
            vec![b'a', 0xE2, 0x82],
        ] {
            assert!(Utf8Info { bytes }.to_str().is_err());
        }
    }
}
