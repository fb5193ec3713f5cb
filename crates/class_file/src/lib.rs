// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
pub mod constant_pool;
mod error;
pub mod io;
mod parser;
mod writer;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo, MAGIC};
pub use access_flags::AccessFlags;
pub use attributes::{Attribute, AttributeInfo, AttributeRegistry, Attributes};
pub use constant_pool::{ConstantPool, CpInfo};
pub use error::{ClassFileError, MalformedConstantPool};
pub use parser::Parser;
pub use writer::Writer;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
