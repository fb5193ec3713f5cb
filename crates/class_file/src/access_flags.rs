use bitflags::bitflags;

bitflags! {
    /// Access and property flags shared by classes, fields and methods.
    ///
    /// Several bits mean different things depending on where they appear, the
    /// alternative names are provided as associated constants below. Every
    /// bit of the `u2` is named, so `from_bits_truncate` never loses data.
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

impl AccessFlags {
    /// Methods only.
    pub const SYNCHRONIZED: AccessFlags = AccessFlags::SUPER;
    /// Methods only.
    pub const BRIDGE: AccessFlags = AccessFlags::VOLATILE;
    /// Methods only.
    pub const VARARGS: AccessFlags = AccessFlags::TRANSIENT;
    /// Fields and parameters only.
    pub const MANDATED: AccessFlags = AccessFlags::MODULE;
}

impl Default for AccessFlags {
    fn default() -> Self {
        AccessFlags::empty()
    }
}
