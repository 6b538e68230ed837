//! Class and singleton references through the registry

use std::sync::Arc;

use objpack::wire::format::*;
use objpack::*;
use pretty_assertions::assert_eq;

fn unpack_in(registry: &Registry, bytes: &[u8]) -> std::result::Result<Value, DecodeError> {
    unpack_with(bytes, registry, &CodecConfig::default()).map(|(value, _)| value)
}

#[test]
fn test_class_reference_payload() {
    let class = Value::class(Class::new("builtins", "int"));
    let bytes = pack(&class).unwrap();

    let mut expected = vec![EXT8, 13, 0x06, FIXSTR | 8];
    expected.extend_from_slice(b"builtins");
    expected.push(FIXSTR | 3);
    expected.extend_from_slice(b"int");
    assert_eq!(bytes, expected);
}

#[test]
fn test_class_resolves_to_same_object() {
    let registry = Registry::empty();
    let class = Arc::new(Class::new("shapes", "Circle"));
    registry.register(&Value::Class(class.clone())).unwrap();

    let bytes = pack(&Value::Class(class.clone())).unwrap();
    let Value::Class(found) = unpack_in(&registry, &bytes).unwrap() else {
        panic!("expected a class");
    };
    assert!(Arc::ptr_eq(&found, &class));
}

#[test]
fn test_singleton_resolves_to_same_object() {
    let registry = Registry::empty();
    let marker = Arc::new(Singleton::new("MISSING"));
    registry.register(&Value::Singleton(marker.clone())).unwrap();

    let bytes = pack(&Value::Singleton(marker.clone())).unwrap();
    assert_eq!(&bytes[..2], &[FIXEXT8, 0x07]);

    let Value::Singleton(found) = unpack_in(&registry, &bytes).unwrap() else {
        panic!("expected a singleton");
    };
    assert!(Arc::ptr_eq(&found, &marker));
}

#[test]
fn test_sentinels_are_preregistered() {
    let registry = Registry::new();
    for sentinel in [Value::not_implemented(), Value::ellipsis()] {
        let bytes = pack(&sentinel).unwrap();
        assert_eq!(unpack_in(&registry, &bytes).unwrap(), sentinel);
    }
}

#[test]
fn test_unresolved_class_names_module_and_qualname() {
    let bytes = pack(&Value::class(Class::new("app.models", "User"))).unwrap();
    let err = unpack_in(&Registry::empty(), &bytes).unwrap_err();
    assert!(matches!(
        &err,
        DecodeError::UnresolvedReference { kind: "class", name } if name == "app.models.User"
    ));
    assert_eq!(
        err.to_string(),
        "cannot unpack class 'app.models.User': not registered"
    );
}

#[test]
fn test_unresolved_builtin_class_drops_module() {
    let bytes = pack(&Value::class(Class::new("builtins", "dict"))).unwrap();
    assert!(matches!(
        unpack_in(&Registry::empty(), &bytes),
        Err(DecodeError::UnresolvedReference { name, .. }) if name == "dict"
    ));
}

#[test]
fn test_unresolved_singleton() {
    let bytes = pack(&Value::singleton(Singleton::new("Sentinel"))).unwrap();
    assert!(matches!(
        unpack_in(&Registry::empty(), &bytes),
        Err(DecodeError::UnresolvedReference { kind: "singleton", name }) if name == "Sentinel"
    ));
}

#[test]
fn test_unresolved_garbage_key() {
    let bytes = [FIXEXT2, 0x06, 0xc1, 0xc1];
    assert!(matches!(
        unpack_in(&Registry::empty(), &bytes),
        Err(DecodeError::UnresolvedReference { name, .. }) if name == "<2 byte key>"
    ));
}

fn nested_class_frames(levels: usize) -> Vec<u8> {
    let mut inner = vec![FIXSTR | 1, b'm', FIXSTR | 1, b'C'];
    let mut headers = Vec::with_capacity(levels);
    let mut len = inner.len();
    for _ in 0..levels {
        let header = match u8::try_from(len) {
            Ok(len) => vec![EXT8, len],
            Err(_) => match u16::try_from(len) {
                Ok(len) => [&[EXT16][..], &len.to_be_bytes()].concat(),
                Err(_) => [&[EXT32][..], &(len as u32).to_be_bytes()].concat(),
            },
        };
        len += header.len() + 1;
        headers.push(header);
    }
    let mut bytes = Vec::with_capacity(len);
    for header in headers.iter().rev() {
        bytes.extend_from_slice(header);
        bytes.push(0x06);
    }
    bytes.append(&mut inner);
    bytes
}

#[test]
fn test_deeply_nested_unresolved_keys() {
    let bytes = nested_class_frames(200_000);
    assert_eq!(bytes[0], EXT32);
    let expected = format!("<{} byte key>", bytes.len() - 6);
    assert!(matches!(
        unpack_in(&Registry::empty(), &bytes),
        Err(DecodeError::UnresolvedReference { kind: "class", name }) if name == expected
    ));
}

#[test]
fn test_object_frame_in_unresolved_key_is_not_built() {
    let built = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = built.clone();
    let class = Arc::new(
        Class::new("shapes", "Tracked").with_constructor(move |class, args| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Box::new(Instance::new(class.clone(), args.to_vec())) as Box<dyn Reducible>)
        }),
    );
    let registry = Registry::empty();
    registry.register(&Value::Class(class.clone())).unwrap();

    let object = pack(&Value::object(Instance::new(class, vec![]))).unwrap();
    let key_len = u8::try_from(object.len()).unwrap();
    let mut bytes = vec![EXT8, key_len, 0x06];
    bytes.extend_from_slice(&object);

    assert!(matches!(
        unpack_in(&registry, &bytes),
        Err(DecodeError::UnresolvedReference { kind: "class", .. })
    ));
    assert_eq!(built.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn test_global_register() {
    let class = Arc::new(Class::new("tests.registry", "GloballyKnown"));
    register(&Value::Class(class.clone())).unwrap();

    let bytes = pack(&Value::Class(class.clone())).unwrap();
    let (value, _) = unpack(&bytes).unwrap();
    let Value::Class(found) = value else {
        panic!("expected a class");
    };
    assert!(Arc::ptr_eq(&found, &class));
}

// ═══════════════════════════════════════════════════════════════════════
// Objects that reduce to a singleton name
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Color(&'static str);

impl Reducible for Color {
    fn type_name(&self) -> &str {
        "Color"
    }

    fn reduce(&self) -> anyhow::Result<ReductionOutcome> {
        Ok(ReductionOutcome::Singleton(format!("Color.{}", self.0)))
    }
}

#[test]
fn test_singleton_reducing_object() {
    let registry = Registry::empty();
    let red = Value::object(Color("RED"));
    registry.register(&red).unwrap();

    let bytes = pack(&red).unwrap();
    assert_eq!(bytes[2], 0x07);

    let Value::Object(found) = unpack_in(&registry, &bytes).unwrap() else {
        panic!("expected the registered object");
    };
    let Value::Object(original) = &red else {
        unreachable!()
    };
    assert!(found.ptr_eq(original));
}

#[test]
fn test_plain_instance_is_not_registrable() {
    let class = Arc::new(Class::generic("shapes", "Square"));
    let square = Value::object(Instance::new(class, vec![]));
    assert!(matches!(
        Registry::empty().register(&square),
        Err(RegisterError::NotRegistrable { found }) if found == "Square"
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Concurrent use
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_concurrent_register_and_resolve() {
    let registry = Registry::empty();
    let classes: Vec<Arc<Class>> = (0..64)
        .map(|i| Arc::new(Class::new("tests.concurrent", format!("C{}", i))))
        .collect();
    let packed: Vec<Vec<u8>> = classes
        .iter()
        .map(|class| pack(&Value::Class(class.clone())).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for chunk in classes.chunks(16) {
            let registry = &registry;
            scope.spawn(move || {
                for class in chunk {
                    registry.register(&Value::Class(class.clone())).unwrap();
                }
            });
        }
        for _ in 0..4 {
            let (registry, classes, packed) = (&registry, &classes, &packed);
            scope.spawn(move || {
                for (class, bytes) in classes.iter().zip(packed) {
                    match unpack_in(registry, bytes) {
                        Ok(Value::Class(found)) => assert!(Arc::ptr_eq(&found, class)),
                        Ok(other) => panic!("unexpected {:?}", other),
                        Err(err) => assert!(matches!(
                            err,
                            DecodeError::UnresolvedReference { kind: "class", .. }
                        )),
                    }
                }
            });
        }
    });

    assert_eq!(registry.len(), classes.len());
    for (class, bytes) in classes.iter().zip(&packed) {
        let Value::Class(found) = unpack_in(&registry, bytes).unwrap() else {
            panic!("expected a class");
        };
        assert!(Arc::ptr_eq(&found, class));
    }
}
