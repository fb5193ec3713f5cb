#![allow(dead_code)]

use jcodec_class_file::{
    attributes::{
        CodeAttribute, ConstantValueAttribute, DeprecatedAttribute, ExceptionsAttribute,
        LineNumber, LineNumberTableAttribute, SignatureAttribute, SourceFileAttribute,
    },
    constant_pool::{NameAndTypeInfo, RefInfo, StringInfo},
    AccessFlags, Attribute, Attributes, ClassFile, CpInfo, FieldInfo, MethodInfo,
};

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

/// Magic, version 52.0 and the given `constant_pool_count` followed by raw
/// pool bytes.
pub fn header_and_pool(constant_pool_count: u16, pool: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
    bytes.extend_from_slice(&constant_pool_count.to_be_bytes());
    bytes.extend_from_slice(pool);
    bytes
}

/// Access flags, this/super class and zero interface, field, method and
/// attribute counts.
pub fn empty_body() -> Vec<u8> {
    vec![0x00, 0x21, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
}

/// The equivalent of compiling:
///
/// ```java
/// package my;
///
/// @Deprecated
/// public class MyClass implements Runnable {
///     private final int myField = 0;
///     static final long BIG = 1L << 40;
///
///     public MyClass() {}
///
///     public float add(int i) throws java.io.IOException { ... }
/// }
/// ```
pub fn my_class() -> ClassFile {
    let mut class_file = ClassFile::new(61, 0);
    class_file.access_flags = AccessFlags::PUBLIC | AccessFlags::SUPER;

    let cp = &mut class_file.constant_pool;
    class_file.this_class = cp.class_index("my/MyClass").unwrap();
    class_file.super_class = cp.class_index("java/lang/Object").unwrap();
    class_file.interfaces = vec![cp.class_index("java/lang/Runnable").unwrap()];

    let big = cp.push(CpInfo::Long(1 << 40)).unwrap();
    cp.push(CpInfo::double(f64::NAN)).unwrap();
    cp.push(CpInfo::Float(0x7fc0_0001)).unwrap();
    let greeting = cp.utf8_index("hello\0world").unwrap();
    cp.push(CpInfo::String(StringInfo {
        string_index: greeting,
    }))
    .unwrap();

    let my_field = FieldInfo {
        access_flags: AccessFlags::PRIVATE | AccessFlags::FINAL,
        name_index: cp.utf8_index("myField").unwrap(),
        descriptor_index: cp.utf8_index("I").unwrap(),
        attributes: Attributes::default(),
    };
    let big_field = FieldInfo {
        access_flags: AccessFlags::STATIC | AccessFlags::FINAL,
        name_index: cp.utf8_index("BIG").unwrap(),
        descriptor_index: cp.utf8_index("J").unwrap(),
        attributes: Attributes(vec![Attribute::known(
            cp,
            ConstantValueAttribute {
                constantvalue_index: big,
            },
        )
        .unwrap()]),
    };

    let object = cp.class_index("java/lang/Object").unwrap();
    let init_name = cp.utf8_index("<init>").unwrap();
    let init_descriptor = cp.utf8_index("()V").unwrap();
    let init_name_and_type = cp
        .push(CpInfo::NameAndType(NameAndTypeInfo {
            name_index: init_name,
            descriptor_index: init_descriptor,
        }))
        .unwrap();
    let object_init = cp
        .push(CpInfo::MethodRef(RefInfo {
            class_index: object,
            name_and_type_index: init_name_and_type,
        }))
        .unwrap();
    let [hi, lo] = object_init.to_be_bytes();

    let line_numbers = Attribute::known(
        cp,
        LineNumberTableAttribute {
            line_number_table: vec![LineNumber {
                start_pc: 0,
                line_number: 6,
            }],
        },
    )
    .unwrap();
    let constructor = MethodInfo {
        access_flags: AccessFlags::PUBLIC,
        name_index: init_name,
        descriptor_index: init_descriptor,
        attributes: Attributes(vec![Attribute::known(
            cp,
            CodeAttribute {
                max_stack: 1,
                max_locals: 1,
                // aload_0, invokespecial Object.<init>, return
                code: vec![0x2a, 0xb7, hi, lo, 0xb1],
                exception_table: vec![],
                attributes: Attributes(vec![line_numbers]),
            },
        )
        .unwrap()]),
    };

    let io_exception = cp.class_index("java/io/IOException").unwrap();
    let add = MethodInfo {
        access_flags: AccessFlags::PUBLIC,
        name_index: cp.utf8_index("add").unwrap(),
        descriptor_index: cp.utf8_index("(I)F").unwrap(),
        attributes: Attributes(vec![
            Attribute::known(
                cp,
                CodeAttribute {
                    max_stack: 1,
                    max_locals: 2,
                    // iload_1, i2f, freturn
                    code: vec![0x1b, 0x86, 0xae],
                    exception_table: vec![],
                    attributes: Attributes::default(),
                },
            )
            .unwrap(),
            Attribute::known(
                cp,
                ExceptionsAttribute {
                    exception_index_table: vec![io_exception],
                },
            )
            .unwrap(),
        ]),
    };

    let source_file = cp.utf8_index("MyClass.java").unwrap();
    let signature = cp.utf8_index("Ljava/lang/Object;Ljava/lang/Runnable;").unwrap();
    class_file.attributes = Attributes(vec![
        Attribute::known(
            cp,
            SourceFileAttribute {
                sourcefile_index: source_file,
            },
        )
        .unwrap(),
        Attribute::known(
            cp,
            SignatureAttribute {
                signature_index: signature,
            },
        )
        .unwrap(),
        Attribute::known(cp, DeprecatedAttribute).unwrap(),
        Attribute::raw(cp, "Foo", vec![0x01, 0x02]).unwrap(),
    ]);

    class_file.fields = vec![my_field, big_field];
    class_file.methods = vec![constructor, add];
    class_file
}
