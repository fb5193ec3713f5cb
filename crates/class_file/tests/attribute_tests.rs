mod common;

use jcodec_class_file::{
    attributes::{
        known_factory, AttributeInput, BootstrapMethod, BootstrapMethodsAttribute, CodeAttribute,
        EnclosingMethodAttribute, ExceptionTableEntry, InnerClass, InnerClassesAttribute,
        KnownAttribute, LocalVariable, LocalVariableTableAttribute, NestHostAttribute,
        NestMembersAttribute, PermittedSubclassesAttribute, RawAttribute, SignatureAttribute,
        SourceFileAttribute, SyntheticAttribute,
    },
    io::ReadClassExt,
    AccessFlags, Attribute, AttributeInfo, AttributeRegistry, Attributes, ClassFile,
    ClassFileError, CpInfo, Parser, Result,
};

use common::{init_logger, my_class};

fn class_with_attributes(
    build: impl FnOnce(&mut jcodec_class_file::ConstantPool) -> Vec<Attribute>,
) -> ClassFile {
    init_logger();
    let mut class_file = ClassFile::new(61, 0);
    class_file.this_class = class_file.constant_pool.class_index("A").unwrap();
    class_file.attributes = Attributes(build(&mut class_file.constant_pool));
    class_file
}

fn reparse(class_file: &ClassFile, registry: AttributeRegistry) -> ClassFile {
    let bytes = class_file.to_bytes().unwrap();
    let parsed = Parser::with_registry(bytes.as_slice(), registry)
        .parse()
        .unwrap();
    assert_eq!(bytes, parsed.to_bytes().unwrap());
    parsed
}

#[test]
fn test_signature_resolves_through_the_pool() {
    init_logger();
    let mut class_file = ClassFile::new(52, 0);
    class_file
        .constant_pool
        .push(CpInfo::Utf8("Signature".into()))
        .unwrap();
    class_file
        .constant_pool
        .push(CpInfo::Utf8("Ljava/util/List;".into()))
        .unwrap();
    class_file.attributes.push(Attribute::new(
        1,
        SignatureAttribute { signature_index: 2 },
    ));

    let parsed = ClassFile::parse(class_file.to_bytes().unwrap().as_slice()).unwrap();
    let attribute = &parsed.attributes.0[0];
    assert_eq!("Signature", attribute.name(&parsed.constant_pool).unwrap());

    let AttributeInfo::Signature(signature) = &attribute.info else {
        panic!("expected a Signature attribute, got {:?}", attribute.info);
    };
    assert_eq!(
        "Ljava/util/List;",
        parsed
            .constant_pool
            .get_utf8(signature.signature_index)
            .unwrap()
    );
    assert_eq!(Some(signature), parsed.attributes.signature());
}

#[test]
fn test_unknown_attribute_passthrough() {
    let class_file = class_with_attributes(|cp| {
        vec![Attribute::raw(cp, "Foo", vec![0x01, 0x02]).unwrap()]
    });

    let parsed = reparse(&class_file, AttributeRegistry::default());
    let attribute = &parsed.attributes.0[0];
    assert_eq!("Foo", attribute.name(&parsed.constant_pool).unwrap());
    assert_eq!(
        AttributeInfo::Raw(RawAttribute {
            info: vec![0x01, 0x02]
        }),
        attribute.info
    );
    assert!(parsed
        .attributes
        .find_by_name("Foo", &parsed.constant_pool)
        .is_some());
    assert!(parsed
        .attributes
        .find_by_name("foo", &parsed.constant_pool)
        .is_none());
}

#[test]
fn test_attribute_wire_layout() {
    let class_file = class_with_attributes(|cp| {
        vec![Attribute::raw(cp, "Foo", vec![0x01, 0x02]).unwrap()]
    });
    let bytes = class_file.to_bytes().unwrap();
    let name_index = class_file.attributes.0[0].attribute_name_index;

    // attributes_count, name index, length, payload
    let [hi, lo] = name_index.to_be_bytes();
    assert_eq!(
        [0x00, 0x01, hi, lo, 0x00, 0x00, 0x00, 0x02, 0x01, 0x02],
        bytes[bytes.len() - 10..]
    );
}

#[test]
fn test_names_are_case_sensitive() {
    let class_file = class_with_attributes(|cp| {
        vec![Attribute::raw(cp, "signature", vec![0x00, 0x01]).unwrap()]
    });

    let parsed = reparse(&class_file, AttributeRegistry::default());
    assert_eq!(None, parsed.attributes.0[0].info.known_name());
    assert_eq!(None, parsed.attributes.signature());
}

#[test]
fn test_known_name_written_raw_is_interpreted() {
    let class_file = class_with_attributes(|cp| {
        vec![Attribute::raw(cp, "SourceFile", vec![0x00, 0x01]).unwrap()]
    });

    let parsed = reparse(&class_file, AttributeRegistry::default());
    assert_eq!(
        Some(&SourceFileAttribute {
            sourcefile_index: 1
        }),
        parsed.attributes.source_file()
    );
}

#[test]
fn test_shape_mismatch_degrades_to_raw() {
    let class_file = class_with_attributes(|cp| {
        vec![
            // one byte too many for a Signature
            Attribute::raw(cp, "Signature", vec![0x00, 0x01, 0xFF]).unwrap(),
            // one byte too few for a SourceFile
            Attribute::raw(cp, "SourceFile", vec![0x00]).unwrap(),
            // Code whose code_length points past the payload
            Attribute::raw(cp, "Code", vec![0, 1, 0, 1, 0, 0, 0, 9, 0xB1]).unwrap(),
            // Synthetic must be empty
            Attribute::raw(cp, "Synthetic", vec![0x00]).unwrap(),
        ]
    });

    let parsed = reparse(&class_file, AttributeRegistry::default());
    assert_eq!(class_file.attributes, parsed.attributes);
    assert!(parsed
        .attributes
        .iter()
        .all(|a| matches!(a.info, AttributeInfo::Raw(_))));
}

#[test]
fn test_truncated_attribute_payload() {
    let class_file = class_with_attributes(|cp| {
        vec![Attribute::raw(cp, "Foo", vec![0x01, 0x02]).unwrap()]
    });
    let bytes = class_file.to_bytes().unwrap();

    assert!(matches!(
        ClassFile::parse(&bytes[..bytes.len() - 1]),
        Err(ClassFileError::UnexpectedEndOfStream)
    ));
}

#[test]
fn test_attribute_name_must_be_utf8() {
    let mut class_file = class_with_attributes(|_| vec![]);
    class_file.attributes.push(Attribute::new(
        class_file.this_class,
        SyntheticAttribute,
    ));
    let bytes = class_file.to_bytes().unwrap();

    assert!(matches!(
        ClassFile::parse(bytes.as_slice()),
        Err(ClassFileError::UnexpectedConstantPoolEntry("Utf8", _))
    ));

    class_file.attributes.0[0].attribute_name_index = 0x1234;
    let bytes = class_file.to_bytes().unwrap();
    assert!(matches!(
        ClassFile::parse(bytes.as_slice()),
        Err(ClassFileError::InvalidConstantPoolIndex(0x1234))
    ));
}

#[test]
fn test_empty_registry_keeps_everything_raw() {
    let class_file = my_class();
    let parsed = reparse(&class_file, AttributeRegistry::empty());

    let attributes = parsed
        .attributes
        .iter()
        .chain(parsed.methods.iter().flat_map(|m| m.attributes.iter()))
        .chain(parsed.fields.iter().flat_map(|f| f.attributes.iter()));
    for attribute in attributes {
        assert!(matches!(attribute.info, AttributeInfo::Raw(_)));
    }
    assert_eq!(None, parsed.methods[0].attributes.code());
}

#[test]
fn test_custom_factory() {
    fn read_tag(input: &mut AttributeInput<'_>) -> Result<AttributeInfo> {
        Ok(NestHostAttribute {
            host_class_index: input.read_u2()?,
        }
        .into())
    }

    let class_file = class_with_attributes(|cp| {
        vec![
            Attribute::raw(cp, "Foo", vec![0x00, 0x01]).unwrap(),
            Attribute::raw(cp, "Bar", vec![0x00, 0x01]).unwrap(),
        ]
    });
    let registry = AttributeRegistry::empty()
        .with("Foo", read_tag)
        .with("Bar", known_factory::<NestHostAttribute>);
    assert!(registry.contains("Foo"));
    assert!(!registry.contains("NestHost"));

    let parsed = reparse(&class_file, registry);
    for attribute in &parsed.attributes {
        assert_eq!(
            AttributeInfo::NestHost(NestHostAttribute {
                host_class_index: 1
            }),
            attribute.info
        );
    }
}

#[test]
fn test_code_with_nested_attributes() {
    init_logger();
    let class_file = my_class();
    let parsed = reparse(&class_file, AttributeRegistry::default());

    let code = parsed.methods[0].attributes.code().unwrap();
    assert_eq!(1, code.max_stack);
    assert_eq!(vec![0x2a, 0xb7], code.code[..2].to_vec());
    assert_eq!(1, code.attributes.len());
    assert_eq!(
        "LineNumberTable",
        code.attributes.0[0].name(&parsed.constant_pool).unwrap()
    );
    assert_eq!(
        class_file.methods[0].attributes.code(),
        parsed.methods[0].attributes.code()
    );
}

#[test]
fn test_every_known_attribute_round_trips() {
    let class_file = class_with_attributes(|cp| {
        let object = cp.class_index("java/lang/Object").unwrap();
        let inner = cp.class_index("A$B").unwrap();
        let name = cp.utf8_index("B").unwrap();
        let descriptor = cp.utf8_index("LA;").unwrap();
        let outer = cp.class_index("A").unwrap();
        let local_variables = Attribute::known(
            cp,
            LocalVariableTableAttribute {
                local_variable_table: vec![LocalVariable {
                    start_pc: 0,
                    length: 3,
                    name_index: name,
                    descriptor_index: descriptor,
                    index: 0,
                }],
            },
        )
        .unwrap();
        let code = Attribute::known(
            cp,
            CodeAttribute {
                max_stack: 2,
                max_locals: 3,
                code: vec![0x00, 0x00, 0xB1],
                exception_table: vec![ExceptionTableEntry {
                    start_pc: 0,
                    end_pc: 2,
                    handler_pc: 2,
                    catch_type: 0,
                }],
                attributes: Attributes(vec![local_variables]),
            },
        )
        .unwrap();

        vec![
            code,
            Attribute::known(
                cp,
                InnerClassesAttribute {
                    classes: vec![InnerClass {
                        inner_class_info_index: inner,
                        outer_class_info_index: outer,
                        inner_name_index: name,
                        inner_class_access_flags: AccessFlags::PRIVATE | AccessFlags::STATIC,
                    }],
                },
            )
            .unwrap(),
            Attribute::known(
                cp,
                EnclosingMethodAttribute {
                    class_index: object,
                    method_index: 0,
                },
            )
            .unwrap(),
            Attribute::known(
                cp,
                BootstrapMethodsAttribute {
                    bootstrap_methods: vec![
                        BootstrapMethod {
                            bootstrap_method_ref: object,
                            bootstrap_arguments: vec![name, descriptor],
                        },
                        BootstrapMethod {
                            bootstrap_method_ref: object,
                            bootstrap_arguments: vec![],
                        },
                    ],
                },
            )
            .unwrap(),
            Attribute::known(cp, NestMembersAttribute { classes: vec![inner] }).unwrap(),
            Attribute::known(
                cp,
                PermittedSubclassesAttribute {
                    classes: vec![inner, object],
                },
            )
            .unwrap(),
            Attribute::known(cp, SyntheticAttribute).unwrap(),
        ]
    });

    let parsed = reparse(&class_file, AttributeRegistry::default());
    assert_eq!(class_file, parsed);
    assert!(parsed.validate().is_ok());
    for attribute in &parsed.attributes {
        assert_eq!(
            attribute.info.known_name().unwrap(),
            attribute.name(&parsed.constant_pool).unwrap()
        );
    }
}

#[test]
fn test_known_names_match_registry() {
    let registry = AttributeRegistry::default();
    for name in [
        "ConstantValue",
        "Code",
        "Exceptions",
        "InnerClasses",
        "EnclosingMethod",
        "Synthetic",
        "Deprecated",
        "Signature",
        "SourceFile",
        "LineNumberTable",
        "LocalVariableTable",
        "BootstrapMethods",
        "NestHost",
        "NestMembers",
        "PermittedSubclasses",
    ] {
        assert!(registry.contains(name), "{} is not registered", name);
    }
    assert_eq!("Code", CodeAttribute::NAME);
}
