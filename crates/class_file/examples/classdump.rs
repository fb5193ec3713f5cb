use std::{env, fs};

use jcodec_class_file::{ClassFile, CpInfo};

fn main() {
    pretty_env_logger::init();

    let path = env::args().nth(1).expect("usage: classdump <path/to/Foo.class>");
    let bytes = fs::read(&path).unwrap();
    let class_file = ClassFile::parse(bytes.as_slice()).unwrap();

    println!("Class: {}", class_file.class_name().unwrap());
    println!(
        "Version: {}.{}",
        class_file.major_version, class_file.minor_version
    );
    println!("Access flags: {:?}", class_file.access_flags);
    if let Some(super_class) = class_file.super_class().unwrap() {
        println!("Super class: {}", super_class);
    }
    for interface in class_file.interface_names().unwrap() {
        println!("Implements: {}", interface);
    }
    println!();

    let cp = &class_file.constant_pool;
    println!("Constant pool ({} slots):", cp.count());
    for (index, cp_info) in cp {
        match cp_info {
            CpInfo::Utf8(utf8) => match utf8.to_str() {
                Ok(s) => println!("    #{:<5} Utf8 {:?}", index, s),
                Err(e) => log::warn!("#{}: {}", index, e),
            },
            other => println!("    #{:<5} {:?}", index, other),
        }
    }
    println!();

    println!("Fields:");
    for field in &class_file.fields {
        println!(
            "    {} {}",
            class_file.field_name(field).unwrap(),
            class_file.field_descriptor(field).unwrap()
        );
    }
    println!();

    println!("Methods:");
    for method in &class_file.methods {
        println!(
            "    {}{}",
            class_file.method_name(method).unwrap(),
            class_file.method_descriptor(method).unwrap()
        );
        for attribute in &method.attributes {
            println!("        {}", attribute.name(cp).unwrap());
        }
    }
    println!();

    println!("Attributes:");
    for attribute in &class_file.attributes {
        let name = attribute.name(cp).unwrap();
        match attribute.info.known_name() {
            Some(_) => println!("    {}", name),
            None => println!("    {} {:?}", name, attribute.info),
        }
    }

    if class_file.to_bytes().unwrap() != bytes {
        log::warn!("Re-encoding {} did not reproduce the input", path);
    }
}
