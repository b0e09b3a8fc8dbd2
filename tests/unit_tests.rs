//! Integration tests for runtime reflection using the global registry.
//!
//! One registry is built and installed per test binary; every test reads it
//! through `get_type` or the shared `registry()` helper.

use std::fmt;
use std::mem::{ManuallyDrop, MaybeUninit};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use sge::modules::{IToString, to_string};
use sge::{
    Any, ArgAny, EnumInfoBuilder, EnumPropertyKind, ErasedBox, FieldFlags, Interface,
    InterfaceInfo, NativeTypeInfoBuilder, PropertyFlags, PropertyKind, Registry, RegistryBuilder,
    RegistrationError, Representation, TypeHash, TypeKind, UFunction, get_type, reflect_field,
    reflect_field_property, try_get_type,
};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Line {
    start: Point,
    end: Point,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Flags: u32 {
        const A = 1;
        const B = 2;
        const C = 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
enum Shape {
    Circle,
    Square,
}

#[derive(Debug, Clone)]
struct Tracked {
    id: u32,
    drops: Arc<AtomicUsize>,
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
#[repr(C)]
struct Entity {
    id: u32,
    name: String,
}

/// Starts with an `Entity`, registered as deriving from it.
#[derive(Debug, Default, Clone, PartialEq)]
#[repr(C)]
struct Actor {
    entity: Entity,
    health: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct Spawn {
    source: Entity,
}

/// A custom interface: renders a value for debugging overlays.
struct Stringify {
    stringify: fn(Any<'_>) -> String,
}

static STRINGIFY: InterfaceInfo = InterfaceInfo::new("Stringify");

impl Interface for Stringify {
    fn info() -> &'static InterfaceInfo {
        &STRINGIFY
    }
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<&'static Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let registry = build_registry().unwrap();
        registry.install().unwrap();
        registry
    })
}

fn build_registry() -> Result<&'static Registry, RegistrationError> {
    let point = NativeTypeInfoBuilder::<Point>::new("Point")
        .default_init()
        .copyable()
        .equality()
        .constructor(Point::default)?
        .constructor(|x: i32, y: i32| Point { x, y })?
        .named_constructor("diagonal", |v: i32| Point { x: v, y: v })?;
    let point = reflect_field_property!(
        point,
        Point,
        x,
        FieldFlags::PUBLIC,
        PropertyFlags::EDITOR_DEFAULT_COLLAPSED
    )?;
    let point = reflect_field_property!(
        point,
        Point,
        y,
        FieldFlags::PUBLIC,
        PropertyFlags::EDITOR_DEFAULT_COLLAPSED
    )?;
    let point = point
        .readonly_property("length_sq", |p: &Point| p.x * p.x + p.y * p.y, PropertyFlags::empty())?
        .implements(Stringify {
            stringify: |this: Any<'_>| format!("Point{}", this.get::<Point>()),
        })?;

    let line = NativeTypeInfoBuilder::<Line>::new("Line")
        .default_init()
        .copyable()
        .equality()
        .constructor(|start: Point, end: Point| Line { start, end })?
        .property(
            "end",
            |l: &Line| l.end.clone(),
            |l: &mut Line, end: Point| l.end = end,
            PropertyFlags::empty(),
        )?;
    let line = reflect_field!(line, Line, start, FieldFlags::PUBLIC)?;
    let line = reflect_field!(line, Line, end, FieldFlags::PUBLIC | FieldFlags::READONLY)?;

    let tracked = NativeTypeInfoBuilder::<Tracked>::new("Tracked")
        .copyable()
        .equality();

    let entity = NativeTypeInfoBuilder::<Entity>::new("Entity")
        .default_init()
        .copyable()
        .equality()
        .readonly_property("label", |e: &Entity| format!("#{} {}", e.id, e.name), PropertyFlags::empty())?;
    let entity = reflect_field_property!(entity, Entity, id, FieldFlags::PUBLIC)?;
    let entity = reflect_field!(entity, Entity, name, FieldFlags::PUBLIC)?;

    // SAFETY: `Actor` is `#[repr(C)]` with an `Entity` as its first field.
    let actor = unsafe {
        NativeTypeInfoBuilder::<Actor>::new("Actor")
            .default_init()
            .copyable()
            .equality()
            .extends::<Entity>()
    };
    let actor = reflect_field!(actor, Actor, health, FieldFlags::PUBLIC)?;

    let spawn = NativeTypeInfoBuilder::<Spawn>::new("Spawn")
        .constructor(|source: Entity| Spawn { source })?;

    let shape = EnumInfoBuilder::<Shape>::enumeration("Shape")
        .value("Circle", Shape::Circle)?
        .value("Square", Shape::Square)?;

    sge::modules::install(RegistryBuilder::with_primitives())?
        .register_type(point)?
        .register_type(line)?
        .register_type(tracked)?
        .register_type(entity)?
        .register_type(actor)?
        .register_type(spawn)?
        .register_enum(EnumInfoBuilder::<Flags>::bit_flags("Flags")?)?
        .register_enum(shape)?
        .implement::<Point, _>(IToString::of::<Point>())?
        .build()
}

// =============================================================================
// Descriptors
// =============================================================================

#[test]
fn test_single_descriptor_per_type() {
    let registry = registry();
    let point = get_type::<Point>();
    assert!(std::ptr::eq(point, registry.type_of::<Point>().unwrap()));
    assert!(std::ptr::eq(point, registry.find_type("Point").unwrap()));
    assert!(std::ptr::eq(
        point,
        registry.find_type_by_hash(TypeHash::from_name("Point")).unwrap()
    ));
    assert!(point.is::<Point>());
    assert_eq!(point.kind(), TypeKind::Native);
    assert_eq!(point.size(), std::mem::size_of::<Point>());
    assert!(try_get_type::<Vec<u8>>().is_none());
}

#[test]
fn test_second_registry_cannot_install() {
    let installed = registry();
    assert!(installed.install().is_ok());
    let other = RegistryBuilder::new().build().unwrap();
    assert_eq!(other.install(), Err(RegistrationError::AlreadyInstalled));
    assert!(std::ptr::eq(Registry::global().unwrap(), installed));
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_point_properties() {
    let registry = registry();
    let point = get_type::<Point>();

    let mut names = Vec::new();
    point.enumerate_properties(|name, prop| names.push((name.to_string(), prop.is_read_only())));
    assert_eq!(
        names,
        [
            ("x".to_string(), false),
            ("y".to_string(), false),
            ("length_sq".to_string(), true)
        ]
    );

    let x = point.find_property("x").unwrap();
    let y = point.find_property("y").unwrap();
    assert_eq!(x.property_type().name(), "int32");
    assert_eq!(x.flags(), PropertyFlags::EDITOR_DEFAULT_COLLAPSED);

    let mut p = Point { x: 1, y: 2 };
    assert_eq!(x.get_cloned::<i32>(registry.any(&p).unwrap()), Some(1));

    x.set_value(registry.any_mut(&mut p).unwrap(), &10i32);
    y.mutate(registry.any_mut(&mut p).unwrap(), |mut value| {
        *value.get_mut::<i32>() += 5;
    });
    assert_eq!(p, Point { x: 10, y: 7 });

    let length_sq = point.find_property("length_sq").unwrap();
    assert_eq!(length_sq.get_cloned::<i32>(registry.any(&p).unwrap()), Some(149));
}

#[test]
fn test_read_only_property_rejects_writes() {
    let registry = registry();
    let length_sq = get_type::<Point>().find_property("length_sq").unwrap();
    let mut p = Point { x: 3, y: 4 };

    let set = catch_unwind(AssertUnwindSafe(|| {
        length_sq.set_value(registry.any_mut(&mut p).unwrap(), &0i32);
    }));
    assert!(set.is_err());

    let mutate = catch_unwind(AssertUnwindSafe(|| {
        length_sq.mutate(registry.any_mut(&mut p).unwrap(), |mut value| {
            *value.get_mut::<i32>() = 0;
        });
    }));
    assert!(mutate.is_err());
    assert_eq!(p, Point { x: 3, y: 4 });
}

#[test]
#[should_panic(expected = "property 'Point.length_sq' is read-only")]
fn test_read_only_property_panics() {
    let registry = registry();
    let mut p = Point::default();
    get_type::<Point>()
        .find_property("length_sq")
        .unwrap()
        .set_value(registry.any_mut(&mut p).unwrap(), &1i32);
}

#[test]
fn test_computed_property_round_trip() {
    let registry = registry();
    let end = get_type::<Line>().find_property("end").unwrap();
    let mut line = Line::default();

    end.set_value(registry.any_mut(&mut line).unwrap(), &Point { x: 4, y: 5 });
    assert_eq!(line.end, Point { x: 4, y: 5 });

    end.mutate(registry.any_mut(&mut line).unwrap(), |mut value| {
        value.get_mut::<Point>().y = 9;
    });
    assert_eq!(line.end, Point { x: 4, y: 9 });

    let mut seen = None;
    end.get(registry.any(&line).unwrap(), |value| {
        seen = Some(value.get::<Point>().clone());
    });
    assert_eq!(seen, Some(Point { x: 4, y: 9 }));
}

#[test]
#[should_panic(expected = "expects a 'int32', got a 'double'")]
fn test_property_set_checks_value_type() {
    let registry = registry();
    let mut p = Point::default();
    let x = get_type::<Point>().find_property("x").unwrap();
    x.set(registry.any_mut(&mut p).unwrap(), registry.any(&1.0f64).unwrap());
}

// =============================================================================
// Fields
// =============================================================================

#[test]
fn test_line_fields() {
    let registry = registry();
    let line_ty = get_type::<Line>();
    let start = line_ty.find_field("start").unwrap();
    let end = line_ty.find_field("end").unwrap();
    assert_eq!(start.offset(), std::mem::offset_of!(Line, start));
    assert!(std::ptr::eq(start.field_type(), get_type::<Point>()));
    assert!(end.is_read_only());

    let mut line = Line::default();
    start.get_mut(registry.any_mut(&mut line).unwrap()).get_mut::<Point>().x = 3;
    assert_eq!(line.start.x, 3);
    assert_eq!(start.get(registry.any(&line).unwrap()).get::<Point>().x, 3);

    let mut fields = Vec::new();
    line_ty.enumerate_fields(|name, field| fields.push((name.to_string(), field.index())));
    assert_eq!(fields, [("start".to_string(), 0), ("end".to_string(), 1)]);
}

#[test]
#[should_panic(expected = "field 'Line.end' is read-only")]
fn test_read_only_field_rejects_mutable_access() {
    let registry = registry();
    let mut line = Line::default();
    let end = get_type::<Line>().find_field("end").unwrap();
    let _ = end.get_mut(registry.any_mut(&mut line).unwrap());
}

#[test]
fn test_field_properties_register_fields() {
    let registry = registry();
    let point = get_type::<Point>();
    assert_eq!(point.num_fields(), 2);

    let mut fields = Vec::new();
    point.enumerate_fields(|name, field| fields.push((name.to_string(), field.offset(), field.flags())));
    assert_eq!(
        fields,
        [
            ("x".to_string(), std::mem::offset_of!(Point, x), FieldFlags::PUBLIC),
            ("y".to_string(), std::mem::offset_of!(Point, y), FieldFlags::PUBLIC),
        ]
    );

    // The field and the property view the same memory.
    let mut p = Point { x: 1, y: 2 };
    point
        .find_property("y")
        .unwrap()
        .set_value(registry.any_mut(&mut p).unwrap(), &20i32);
    let y = point.find_field("y").unwrap();
    assert_eq!(*y.get(registry.any(&p).unwrap()).get::<i32>(), 20);
    *y.get_mut(registry.any_mut(&mut p).unwrap()).get_mut::<i32>() = 21;
    assert_eq!(
        point.find_property("y").unwrap().get_cloned::<i32>(registry.any(&p).unwrap()),
        Some(21)
    );
}

// =============================================================================
// Inheritance
// =============================================================================

#[test]
fn test_derived_type_descriptors() {
    registry();
    let entity = get_type::<Entity>();
    let actor = get_type::<Actor>();
    assert!(std::ptr::eq(actor.base().unwrap(), entity));
    assert!(entity.base().is_none());
    assert!(actor.derives_from(entity));
    assert!(actor.derives_from(actor));
    assert!(!entity.derives_from(actor));
    assert!(!actor.derives_from(get_type::<Point>()));
}

#[test]
fn test_base_members_through_derived_view() {
    let registry = registry();
    let entity = get_type::<Entity>();
    let mut actor = Actor {
        entity: Entity {
            id: 5,
            name: "scout".to_string(),
        },
        health: 80,
    };

    let id_field = entity.find_field("id").unwrap();
    assert_eq!(*id_field.get(registry.any(&actor).unwrap()).get::<u32>(), 5);
    let name_field = entity.find_field("name").unwrap();
    name_field
        .get_mut(registry.any_mut(&mut actor).unwrap())
        .get_mut::<String>()
        .push_str("-2");
    assert_eq!(actor.entity.name, "scout-2");

    let id = entity.find_property("id").unwrap();
    id.set_value(registry.any_mut(&mut actor).unwrap(), &9u32);
    id.mutate(registry.any_mut(&mut actor).unwrap(), |mut value| {
        *value.get_mut::<u32>() += 1;
    });
    assert_eq!(actor.entity.id, 10);

    let label = entity.find_property("label").unwrap();
    assert_eq!(
        label.get_cloned::<String>(registry.any(&actor).unwrap()).as_deref(),
        Some("#10 scout-2")
    );

    let health = get_type::<Actor>().find_field("health").unwrap();
    assert_eq!(*health.get(registry.any(&actor).unwrap()).get::<i32>(), 80);
}

#[test]
#[should_panic(expected = "field 'Actor.health' accessed through a 'Entity'")]
fn test_derived_field_rejects_base_view() {
    let registry = registry();
    let entity = Entity::default();
    let health = get_type::<Actor>().find_field("health").unwrap();
    let _ = health.get(registry.any(&entity).unwrap());
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_flags_properties() {
    let registry = registry();
    let flags = get_type::<Flags>();
    assert_eq!(flags.kind(), TypeKind::Enum);

    let mut names = Vec::new();
    flags.enumerate_properties(|name, prop| names.push((name.to_string(), prop.kind())));
    assert_eq!(
        names,
        [
            ("A".to_string(), PropertyKind::Enum { kind: EnumPropertyKind::BitFlag, value: 1 }),
            ("B".to_string(), PropertyKind::Enum { kind: EnumPropertyKind::BitFlag, value: 2 }),
            ("C".to_string(), PropertyKind::Enum { kind: EnumPropertyKind::BitFlag, value: 4 }),
        ]
    );

    let a = flags.find_property("A").unwrap();
    let b = flags.find_property("B").unwrap();
    let mut value = Flags::A | Flags::C;
    assert_eq!(a.get_cloned::<bool>(registry.any(&value).unwrap()), Some(true));
    assert_eq!(b.get_cloned::<bool>(registry.any(&value).unwrap()), Some(false));

    b.set_value(registry.any_mut(&mut value).unwrap(), &true);
    assert_eq!(value, Flags::all());
    a.set_value(registry.any_mut(&mut value).unwrap(), &false);
    assert_eq!(value, Flags::B | Flags::C);
    a.set_value(registry.any_mut(&mut value).unwrap(), &false);
    assert_eq!(value, Flags::B | Flags::C);
}

#[test]
fn test_flags_keep_unnamed_bits() {
    let registry = registry();
    let flags = get_type::<Flags>();
    let b = flags.find_property("B").unwrap();
    let c = flags.find_property("C").unwrap();

    let mut value = Flags::from_bits_retain(0x9);
    b.set_value(registry.any_mut(&mut value).unwrap(), &true);
    assert_eq!(value.bits(), 0xb);
    c.mutate(registry.any_mut(&mut value).unwrap(), |mut on| {
        *on.get_mut::<bool>() = true;
    });
    assert_eq!(value.bits(), 0xf);
    b.set_value(registry.any_mut(&mut value).unwrap(), &false);
    assert_eq!(value.bits(), 0xd);
}

#[test]
fn test_enum_lifecycle() {
    registry();
    let flags = get_type::<Flags>();
    assert!(flags.has_init());
    let mut value = Flags::all();
    let mut copy = MaybeUninit::<Flags>::uninit();
    unsafe {
        flags.init((&mut value as *mut Flags).cast());
        assert_eq!(value, Flags::empty());
        value = Flags::B;
        flags.copy_init(copy.as_mut_ptr().cast(), (&value as *const Flags).cast());
        assert!(flags.equality_compare(
            copy.as_ptr().cast(),
            (&value as *const Flags).cast()
        ));
    }
}

#[test]
fn test_enumerator_properties() {
    let registry = registry();
    let shape = get_type::<Shape>();
    let circle = shape.find_property("Circle").unwrap();
    let square = shape.find_property("Square").unwrap();

    let mut value = Shape::Square;
    assert_eq!(circle.get_cloned::<bool>(registry.any(&value).unwrap()), Some(false));
    assert_eq!(square.get_cloned::<bool>(registry.any(&value).unwrap()), Some(true));

    square.set_value(registry.any_mut(&mut value).unwrap(), &false);
    assert_eq!(value, Shape::Circle);
    square.mutate(registry.any_mut(&mut value).unwrap(), |mut on| {
        *on.get_mut::<bool>() = true;
    });
    assert_eq!(value, Shape::Square);
}

// =============================================================================
// Interfaces
// =============================================================================

#[test]
fn test_stringify_on_point_not_line() {
    let registry = registry();
    let point = Point { x: 1, y: 2 };
    let line = Line::default();

    let view = registry.any(&point).unwrap();
    let record = view.get_implementation(&STRINGIFY).unwrap();
    let stringify = record.downcast::<Stringify>().unwrap();
    assert_eq!((stringify.stringify)(view), "Point(1, 2)");

    assert!(registry.any(&line).unwrap().get_implementation(&STRINGIFY).is_none());
    assert!(STRINGIFY.is_implemented_by(get_type::<Point>()));
    assert!(!STRINGIFY.is_implemented_by(get_type::<Line>()));
    assert!(std::ptr::eq(registry.find_interface("Stringify").unwrap(), &STRINGIFY));
}

#[test]
fn test_standard_interfaces() {
    let registry = registry();
    let point = Point { x: -3, y: 8 };
    assert_eq!(to_string(registry.any(&point).unwrap()).as_deref(), Some("(-3, 8)"));
    assert_eq!(to_string(registry.any(&7u64).unwrap()).as_deref(), Some("7"));
    assert_eq!(to_string(registry.any(&Line::default()).unwrap()), None);

    let mut value = 0i64;
    let used = sge::modules::from_string(registry.any_mut(&mut value).unwrap(), "123;");
    assert_eq!(used, Some(3));
    assert_eq!(value, 123);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_copy_then_equal_then_independent_drop() {
    registry();
    let tracked = get_type::<Tracked>();
    assert!(!tracked.has_init());
    assert!(tracked.has_copy_init());

    let drops = Arc::new(AtomicUsize::new(0));
    let original = ErasedBox::new(
        Tracked {
            id: 7,
            drops: Arc::clone(&drops),
        },
        tracked,
    );
    let copy = original.try_clone().unwrap();
    unsafe {
        assert!(tracked.equality_compare(original.as_any().as_ptr(), copy.as_any().as_ptr()));
    }
    assert!(original.as_any().equals(copy.as_any()).unwrap());

    drop(original);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(copy.downcast_ref::<Tracked>().unwrap().id, 7);
    drop(copy);
    assert_eq!(drops.load(Ordering::SeqCst), 2);
}

#[test]
fn test_move_and_assign_through_descriptor() {
    registry();
    let tracked = get_type::<Tracked>();
    assert!(tracked.has_move_init());
    assert!(tracked.has_move_assign());
    assert!(tracked.has_copy_assign());

    let drops = Arc::new(AtomicUsize::new(0));
    let make = |id| Tracked {
        id,
        drops: Arc::clone(&drops),
    };

    let mut first = ManuallyDrop::new(make(1));
    let second = make(2);
    let mut third = ManuallyDrop::new(make(3));
    let mut slot = MaybeUninit::<Tracked>::uninit();
    let dst = slot.as_mut_ptr().cast::<u8>();
    unsafe {
        // The source is moved out and must not be dropped again.
        tracked.move_init(dst, (&mut *first as *mut Tracked).cast());
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        assert_eq!((*slot.as_ptr()).id, 1);

        // The old value is dropped, the source stays alive.
        tracked.copy_assign(dst, (&second as *const Tracked).cast());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert_eq!((*slot.as_ptr()).id, 2);
        assert_eq!(second.id, 2);

        tracked.move_assign(dst, (&mut *third as *mut Tracked).cast());
        assert_eq!(drops.load(Ordering::SeqCst), 2);
        assert_eq!((*slot.as_ptr()).id, 3);

        tracked.drop(dst);
    }
    assert_eq!(drops.load(Ordering::SeqCst), 3);
    drop(second);
    assert_eq!(drops.load(Ordering::SeqCst), 4);
}

#[test]
fn test_new_default_requires_init() {
    registry();
    assert!(ErasedBox::new_default(get_type::<Tracked>()).is_none());
    let point = ErasedBox::new_default(get_type::<Point>()).unwrap();
    assert_eq!(point.into_inner::<Point>().ok(), Some(Point::default()));
}

#[test]
fn test_float_equality_treats_nan_as_equal() {
    registry();
    let double = get_type::<f64>();
    let (a, b) = (f64::NAN, f64::NAN);
    unsafe {
        assert!(double.equality_compare(
            (&a as *const f64).cast(),
            (&b as *const f64).cast()
        ));
    }
}

// =============================================================================
// Constructors
// =============================================================================

#[test]
fn test_positional_constructors() {
    registry();
    let point = get_type::<Point>();
    assert_eq!(point.num_constructors(), 2);
    assert!(point.find_constructor(1).is_none());

    let ctor = point.find_constructor(2).unwrap();
    let args = [ArgAny::from(3i32), ArgAny::from(4i32)];
    assert!(ctor.accepts(&args));
    assert!(!ctor.accepts(&[ArgAny::from(3i32), ArgAny::from(4u8)]));

    let mut slot = MaybeUninit::<Point>::uninit();
    unsafe {
        ctor.invoke(slot.as_mut_ptr().cast(), &args);
        assert_eq!(slot.assume_init(), Point { x: 3, y: 4 });
    }

    let boxed = ErasedBox::construct(point.find_constructor(0).unwrap(), &[]);
    assert_eq!(boxed.downcast_ref::<Point>(), Some(&Point::default()));
}

#[test]
fn test_named_and_object_constructors() {
    let registry = registry();
    let point = get_type::<Point>();
    let diagonal = point.find_named_constructor("diagonal").unwrap();
    assert_eq!(diagonal.name(), Some("diagonal"));
    let boxed = ErasedBox::construct(diagonal, &[ArgAny::from(6i32)]);
    assert_eq!(boxed.downcast_ref::<Point>(), Some(&Point { x: 6, y: 6 }));

    let start = Point { x: 1, y: 1 };
    let end = Point { x: 2, y: 3 };
    let args = [
        ArgAny::object(registry.any(&start).unwrap()),
        ArgAny::object(registry.any(&end).unwrap()),
    ];
    let line = ErasedBox::construct(get_type::<Line>().find_constructor(2).unwrap(), &args);
    assert_eq!(line.into_inner::<Line>().ok(), Some(Line { start, end }));
}

#[test]
fn test_constructor_accepts_derived_argument() {
    let registry = registry();
    let ctor = get_type::<Spawn>().find_constructor(1).unwrap();
    assert!(std::ptr::eq(ctor.arg_types().next().unwrap(), get_type::<Entity>()));

    let actor = Actor {
        entity: Entity {
            id: 3,
            name: "archer".to_string(),
        },
        health: 40,
    };
    let args = [ArgAny::object(registry.any(&actor).unwrap())];
    assert!(args[0].matches(get_type::<Entity>()));
    assert!(ctor.accepts(&args));
    assert_eq!(args[0].try_get::<Entity>(), Some(&actor.entity));

    let spawn = ErasedBox::construct(ctor, &args);
    assert_eq!(
        spawn.into_inner::<Spawn>().ok(),
        Some(Spawn {
            source: actor.entity.clone()
        })
    );

    let point = Point::default();
    let wrong = [ArgAny::object(registry.any(&point).unwrap())];
    assert!(!wrong[0].matches(get_type::<Entity>()));
    assert!(!ctor.accepts(&wrong));
    assert!(wrong[0].try_get::<Entity>().is_none());
}

#[test]
#[should_panic]
fn test_constructor_arity_mismatch_panics() {
    registry();
    let ctor = get_type::<Point>().find_constructor(2).unwrap();
    let mut slot = MaybeUninit::<Point>::uninit();
    unsafe { ctor.invoke(slot.as_mut_ptr().cast(), &[ArgAny::from(1i32)]) };
}

// =============================================================================
// Unique functions
// =============================================================================

#[test]
fn test_ufunction_move_leaves_source_empty() {
    let offset = 10;
    let mut f: UFunction<(i32,), i32> = UFunction::new(move |a: i32| a + offset);
    assert_eq!(f.representation(), Representation::Inline);

    let g = f.take();
    assert!(f.is_empty());
    assert_eq!(g.call((5,)), 15);
}

// =============================================================================
// Registration errors
// =============================================================================

#[test]
fn test_registration_errors() {
    let err = NativeTypeInfoBuilder::<Point>::new("Point")
        .projected_property("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x, PropertyFlags::empty())
        .unwrap()
        .readonly_property("x", |p: &Point| p.x, PropertyFlags::empty())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        RegistrationError::DuplicateRegistration { kind: "property", .. }
    ));

    let err = NativeTypeInfoBuilder::<Point>::new("Point")
        .constructor(|x: i32, y: i32| Point { x, y })
        .unwrap()
        .constructor(|start: Point, end: Point| Point { x: start.x, y: end.y })
        .err()
        .unwrap();
    assert_eq!(
        err,
        RegistrationError::DuplicateConstructorArity {
            type_name: "Point".to_string(),
            arity: 2
        }
    );

    let err = RegistryBuilder::with_primitives()
        .register_enum(EnumInfoBuilder::<Shape>::enumeration("Shape"))
        .err()
        .unwrap();
    assert_eq!(err, RegistrationError::EmptyEnum("Shape".to_string()));
}
