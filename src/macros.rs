/// Builds a [`Value`](crate::Value) tree from a JSON-like literal.
///
/// Bare literals go through `Value::from`, so their Rust type picks the value kind:
/// `3` is an `Int`, `(3u8)` a `Byte`, `2.5` a `Double`. Wrap anything that is more than
/// one token (negative numbers, typed literals, expressions) in parentheses.
///
/// ```rust
/// use serde_tdf::{tdf, Value};
///
/// let slime = tdf!({
///     "health": (3u8),
///     "name": "Slime",
///     "drops": ["gel", null],
///     "offset": (-1i64)
/// });
/// assert_eq!(slime.as_object().unwrap()["health"], Value::Byte(3));
/// ```
#[macro_export]
macro_rules! tdf {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(::std::vec![$($crate::tdf!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::TdfMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::TdfMap::new();
        $(
            object.insert($key.to_string(), $crate::tdf!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($s:expr) => {
        $crate::Value::from($s)
    };
}

/// Registers a struct with the object mapper.
///
/// Generates [`Typed`](crate::Typed), [`Reflect`](crate::Reflect) and
/// [`FromReflect`](crate::FromReflect) for a struct that implements `Default`, exposing
/// the listed fields as members. The module identifier used in polymorphism tags comes
/// after `in`; without it, the calling crate's name is used.
///
/// A member written `field: Type as Base` is stored as `Type` but encoded and decoded
/// with `Base` as its implied type. This is how a polymorphic slot declares the type it
/// expects: an instance of exactly `Base` is written untagged, anything else is tagged.
///
/// ```rust
/// use serde_tdf::{reflect_record, Reflect};
///
/// #[derive(Default)]
/// struct Slime {
///     health: u8,
/// }
///
/// #[derive(Default)]
/// struct Spawner {
///     template: Option<Box<dyn Reflect>>,
///     count: u32,
/// }
///
/// reflect_record!(Slime in "game" { health: u8 });
/// reflect_record!(Spawner in "game" {
///     template: Option<Box<dyn Reflect>> as Option<Slime>,
///     count: u32,
/// });
/// ```
#[macro_export]
macro_rules! reflect_record {
    (@implied $fty:ty) => {
        <$fty as $crate::Typed>::type_info
    };

    (@implied $fty:ty, $implied:ty) => {
        <$implied as $crate::Typed>::type_info
    };

    (@impl $ty:ident, $module:expr, $($field:ident : $fty:ty $(as $implied:ty)?),* $(,)?) => {
        impl $crate::Typed for $ty {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo {
                    id: ::std::any::TypeId::of::<$ty>(),
                    module: $module,
                    name: ::std::any::type_name::<$ty>(),
                    kind: $crate::TypeKind::Record {
                        members: || ::std::vec![$(
                            $crate::Member {
                                name: ::std::stringify!($field),
                                ty: $crate::reflect_record!(@implied $fty $(, $implied)?),
                                get: |owner| {
                                    owner
                                        .downcast_ref::<$ty>()
                                        .map(|record| &record.$field as &dyn $crate::Reflect)
                                },
                                set: |owner, value| {
                                    let record = owner.downcast_mut::<$ty>().ok_or_else(|| {
                                        $crate::Error::type_mismatch(
                                            ::std::any::type_name::<$ty>(),
                                            "a record of another type",
                                        )
                                    })?;
                                    record.$field =
                                        <$fty as $crate::FromReflect>::from_reflect(value)?;
                                    ::std::result::Result::Ok(())
                                },
                            }
                        ),*],
                        construct: || {
                            ::std::boxed::Box::new(<$ty as ::std::default::Default>::default())
                        },
                    },
                }
            }
        }

        impl $crate::Reflect for $ty {
            fn type_info(&self) -> $crate::TypeInfo {
                <$ty as $crate::Typed>::type_info()
            }

            fn reflect(&self) -> $crate::ReflectRef<'_> {
                $crate::ReflectRef::Record(self)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::FromReflect for $ty {
            fn from_reflect(value: ::std::boxed::Box<dyn $crate::Reflect>) -> $crate::Result<Self> {
                if value.is::<()>() {
                    return ::std::result::Result::Ok(<$ty as ::std::default::Default>::default());
                }
                value.downcast::<$ty>().map(|record| *record)
            }
        }
    };

    ($ty:ident in $module:literal { $($body:tt)* }) => {
        $crate::reflect_record!(@impl $ty, $module, $($body)*);
    };

    ($ty:ident { $($body:tt)* }) => {
        $crate::reflect_record!(@impl $ty, ::std::env!("CARGO_CRATE_NAME"), $($body)*);
    };
}

#[cfg(test)]
mod tests {
    use crate::{Mapper, Member, Reflect, TdfMap, TypeInfo, Value};

    #[test]
    fn test_tdf_macro_primitives() {
        assert_eq!(tdf!(null), Value::Null);
        assert_eq!(tdf!(true), Value::Bool(true));
        assert_eq!(tdf!(false), Value::Bool(false));
        assert_eq!(tdf!(42), Value::Int(42));
        assert_eq!(tdf!(3.5), Value::Double(3.5));
        assert_eq!(tdf!((7u16)), Value::UShort(7));
        assert_eq!(tdf!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_tdf_macro_containers() {
        assert_eq!(tdf!([]), Value::Array(vec![]));
        assert_eq!(tdf!({}), Value::Object(TdfMap::new()));

        let value = tdf!({ "a": [1, (2i64)], "b": { "c": null } });
        let object = value.as_object().unwrap();
        assert_eq!(
            object["a"],
            Value::Array(vec![Value::Int(1), Value::Long(2)])
        );
        assert_eq!(object["b"].as_object().unwrap()["c"], Value::Null);
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[derive(Default)]
    struct Inventory {
        slots: Vec<String>,
        owner: Option<Box<dyn Reflect>>,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Owner {
        name: String,
    }

    reflect_record!(Owner { name: String });
    reflect_record!(Inventory in "items" {
        slots: Vec<String>,
        owner: Option<Box<dyn Reflect>> as Owner,
    });

    #[test]
    fn test_reflect_record_descriptor() {
        let info = TypeInfo::of::<Inventory>();
        assert_eq!(info.module, "items");
        assert_eq!(info.name, std::any::type_name::<Inventory>());

        let members: Vec<Member> = info.members();
        let names: Vec<_> = members.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["slots", "owner"]);
        assert!(members[1].type_info().is::<Owner>());
    }

    #[test]
    fn test_default_module_is_crate_name() {
        assert_eq!(TypeInfo::of::<Owner>().module, "serde_tdf");
    }

    #[test]
    fn test_implied_override_controls_tagging() {
        let mapper = Mapper::new();
        let inventory = Inventory {
            slots: vec!["sword".to_string()],
            owner: Some(Box::new(Owner {
                name: "Ada".to_string(),
            })),
        };
        let value = mapper.encode_as(&inventory).unwrap();
        assert_eq!(
            value,
            tdf!({ "slots": ["sword"], "owner": { "name": "Ada" } })
        );

        let decoded: Inventory = mapper.decode_as(&value).unwrap();
        let owner = decoded.owner.unwrap();
        assert_eq!(
            owner.downcast_ref::<Owner>(),
            Some(&Owner {
                name: "Ada".to_string()
            })
        );
    }
}
