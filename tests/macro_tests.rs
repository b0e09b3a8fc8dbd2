//! Integration tests for `#[derive(Reflect)]`.

use sge::{
    FieldFlags, PropertyFlags, Reflect, Registry, RegistryBuilder, TypeFlags, TypeHash,
};

/// Test basic `#[derive(Reflect)]` usage.
#[derive(Reflect)]
struct SimpleType {
    #[allow(dead_code)]
    value: i32,
}

#[test]
fn test_simple_reflect_derive() {
    assert_eq!(SimpleType::NAME, "SimpleType");
    let registry = RegistryBuilder::with_primitives()
        .register::<SimpleType>()
        .unwrap()
        .build()
        .unwrap();
    let ty = registry.type_of::<SimpleType>().unwrap();
    assert_eq!(ty.type_hash(), TypeHash::from_name("SimpleType"));
    assert_eq!(ty.num_fields(), 0);
    assert_eq!(ty.num_properties(), 0);
    assert!(!ty.has_init());
    assert!(!ty.has_copy_init());
}

/// Test `#[derive(Reflect)]` with a custom name and lifecycle capabilities.
#[derive(Reflect, Debug, Default, Clone, PartialEq)]
#[reflect(name = "Vec3", default, clone, eq)]
struct Vector3 {
    #[reflect(property)]
    x: f32,
    #[reflect(property, collapsed)]
    y: f32,
    #[reflect(property, editor_only, editor_hidden, name = "depth")]
    z: f32,
}

/// Test field descriptors and read-only members.
#[derive(Reflect, Default)]
#[reflect(default, no_construct)]
struct Body {
    #[reflect(field)]
    position: Vector3,
    #[reflect(field, readonly)]
    mass: f64,
    #[reflect(field, transient)]
    sleeping: bool,
    #[reflect(property, readonly)]
    id: u64,
    #[allow(dead_code)]
    scratch: Vec<u8>,
}

fn registry() -> &'static Registry {
    RegistryBuilder::with_primitives()
        .register::<Vector3>()
        .unwrap()
        .register::<Body>()
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn test_reflect_derive_with_name() {
    let registry = registry();
    assert_eq!(Vector3::NAME, "Vec3");
    let ty = registry.find_type("Vec3").unwrap();
    assert!(ty.is::<Vector3>());
    assert!(ty.has_init());
    assert!(ty.has_copy_assign());
    assert!(ty.has_equality_compare());

    let mut names = Vec::new();
    ty.enumerate_properties(|name, _| names.push(name.to_string()));
    assert_eq!(names, ["x", "y", "depth"]);

    let depth = ty.find_property("depth").unwrap();
    assert_eq!(
        depth.flags(),
        PropertyFlags::EDITOR_ONLY | PropertyFlags::EDITOR_HIDDEN
    );
    assert_eq!(
        ty.find_property("y").unwrap().flags(),
        PropertyFlags::EDITOR_DEFAULT_COLLAPSED
    );
    assert!(ty.find_property("z").is_none());

    // Every property is backed by a field of the same name.
    let mut fields = Vec::new();
    ty.enumerate_fields(|name, field| fields.push((name.to_string(), field.offset())));
    assert_eq!(
        fields,
        [
            ("x".to_string(), std::mem::offset_of!(Vector3, x)),
            ("y".to_string(), std::mem::offset_of!(Vector3, y)),
            ("depth".to_string(), std::mem::offset_of!(Vector3, z)),
        ]
    );
    assert_eq!(ty.find_field("depth").unwrap().flags(), FieldFlags::PUBLIC);

    let mut v = Vector3::default();
    depth.set_value(registry.any_mut(&mut v).unwrap(), &2.5f32);
    assert_eq!(v.z, 2.5);
}

#[test]
fn test_reflect_derive_fields() {
    let registry = registry();
    let ty = registry.type_of::<Body>().unwrap();
    assert!(ty.flags().contains(TypeFlags::SCRIPT_NOCONSTRUCT));
    assert_eq!(ty.num_fields(), 4);
    assert_eq!(ty.num_properties(), 1);

    let position = ty.find_field("position").unwrap();
    assert_eq!(position.offset(), std::mem::offset_of!(Body, position));
    assert_eq!(position.field_type().name(), "Vec3");
    assert_eq!(position.flags(), FieldFlags::PUBLIC);

    let mass = ty.find_field("mass").unwrap();
    assert!(mass.is_read_only());
    assert!(mass.flags().contains(FieldFlags::TRANSIENT));

    let sleeping = ty.find_field("sleeping").unwrap();
    assert_eq!(sleeping.flags(), FieldFlags::PUBLIC | FieldFlags::TRANSIENT);
    assert!(!sleeping.is_read_only());
    assert!(ty.find_field("scratch").is_none());

    let id = ty.find_property("id").unwrap();
    assert!(id.is_read_only());
    let id_field = ty.find_field("id").unwrap();
    assert!(id_field.is_read_only());
    assert_eq!(id_field.field_type().name(), "uint64");

    let mut body = Body {
        id: 11,
        ..Body::default()
    };
    position
        .get_mut(registry.any_mut(&mut body).unwrap())
        .get_mut::<Vector3>()
        .y = 4.0;
    assert_eq!(body.position.y, 4.0);
    assert_eq!(id.get_cloned::<u64>(registry.any(&body).unwrap()), Some(11));
}
