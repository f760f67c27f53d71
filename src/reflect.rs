//! Runtime type descriptors for the object mapper.
//!
//! Rust has no open-ended runtime reflection, so every type the [`Mapper`](crate::Mapper)
//! handles carries a static [`TypeInfo`] descriptor: its identity, the module and full
//! name written into polymorphism tags, and a [`TypeKind`] describing how values of the
//! type are built and taken apart.
//!
//! Three traits split the work:
//!
//! - [`Typed`] gives the static descriptor of a type.
//! - [`Reflect`] is the object-safe runtime view of a value (`&dyn Reflect`).
//! - [`FromReflect`] assigns a decoded value into a concrete type, coercing scalars.
//!
//! They are implemented here for the primitive scalars, `String`, `Vec<T>`, `[T; N]`,
//! `Box<[T]>`, `Option<T>` and `Box<dyn Reflect>`. User records get them from the
//! [`reflect_record!`](crate::reflect_record) macro.

use rust_decimal::Decimal;
use std::any::{type_name, Any, TypeId};
use std::fmt;

use crate::{Error, Result, Value, ValueKind};

/// Lazily produces a [`TypeInfo`]; keeps recursive types finite.
pub type TypeFn = fn() -> TypeInfo;

/// Static descriptor of a mappable type.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    pub id: TypeId,
    /// Module identifier written after `!` in polymorphism tags.
    pub module: &'static str,
    /// Fully-qualified type name written as the tag value.
    pub name: &'static str,
    pub kind: TypeKind,
}

/// How values of a type are built and taken apart.
#[derive(Clone, Copy)]
pub enum TypeKind {
    /// The unit type; encodes as `Null`.
    Null,
    /// A primitive or string, stored as the given value kind.
    Scalar(ValueKind),
    /// A growable byte sequence, stored as `Binary`.
    Bytes,
    /// `Option<T>`: transparent for the inner type, `None` is `Null`.
    Optional(TypeFn),
    /// A growable collection, filled by appending decoded elements.
    Sequence {
        element: TypeFn,
        construct: fn() -> Box<dyn Reflect>,
        push: fn(&mut dyn Any, Box<dyn Reflect>) -> Result<()>,
    },
    /// A collection allocated at its final length from all decoded elements at once.
    FixedSequence {
        element: TypeFn,
        /// Required element count, `None` when any length fits.
        len: Option<usize>,
        collect: fn(Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>>,
    },
    /// A record with named members.
    Record {
        members: fn() -> Vec<Member>,
        construct: fn() -> Box<dyn Reflect>,
    },
    /// A polymorphic slot with no concrete type of its own.
    Abstract,
}

impl TypeInfo {
    /// The descriptor of `T`.
    #[must_use]
    pub fn of<T: Typed + ?Sized>() -> TypeInfo {
        <T as Typed>::type_info()
    }

    /// Returns `true` if this describes the type `T`.
    #[must_use]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Strips any number of `Option` layers.
    #[must_use]
    pub fn unwrap_optional(&self) -> TypeInfo {
        match self.kind {
            TypeKind::Optional(inner) => inner().unwrap_optional(),
            _ => *self,
        }
    }

    /// Declared element type of a collection.
    #[must_use]
    pub fn element(&self) -> Option<TypeInfo> {
        match self.kind {
            TypeKind::Sequence { element, .. } | TypeKind::FixedSequence { element, .. } => {
                Some(element())
            }
            TypeKind::Bytes => Some(TypeInfo::of::<u8>()),
            TypeKind::Optional(inner) => inner().element(),
            _ => None,
        }
    }

    /// Declared members of a record; empty for every other kind.
    #[must_use]
    pub fn members(&self) -> Vec<Member> {
        match self.kind {
            TypeKind::Record { members, .. } => members(),
            _ => Vec::new(),
        }
    }

    /// Creates a blank instance: a default record, an empty collection, or `()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConstructible`] for scalar, fixed-size and abstract types.
    pub fn construct(&self) -> Result<Box<dyn Reflect>> {
        match self.kind {
            TypeKind::Record { construct, .. } | TypeKind::Sequence { construct, .. } => {
                Ok(construct())
            }
            TypeKind::Bytes => Ok(Box::new(Vec::<u8>::new())),
            TypeKind::Null => Ok(Box::new(())),
            _ => Err(Error::NotConstructible(self.name.to_string())),
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("module", &self.module)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A named, typed, gettable and settable member of a record.
#[derive(Clone, Copy)]
pub struct Member {
    pub name: &'static str,
    /// Declared type, used as the implied type when encoding and decoding the member.
    pub ty: TypeFn,
    /// Borrows the member out of an instance of the owning record.
    pub get: fn(&dyn Any) -> Option<&dyn Reflect>,
    /// Assigns a decoded value to the member of an instance of the owning record.
    pub set: fn(&mut dyn Any, Box<dyn Reflect>) -> Result<()>,
}

impl Member {
    /// The member's declared type.
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        (self.ty)()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("ty", &(self.ty)().name)
            .finish()
    }
}

/// Runtime view of a value.
pub enum ReflectRef<'a> {
    Null,
    Scalar(Value),
    Bytes(&'a [u8]),
    Sequence(Vec<&'a dyn Reflect>),
    /// A record; read its members through its own [`TypeInfo`].
    Record(&'a dyn Reflect),
}

/// Object-safe access to a value whose type is only known at runtime.
pub trait Reflect: Any {
    /// Descriptor of the value's runtime type.
    fn type_info(&self) -> TypeInfo;

    fn reflect(&self) -> ReflectRef<'_>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl dyn Reflect {
    /// Returns `true` if the value's runtime type is `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Recovers the concrete value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the runtime type is not `T`.
    pub fn downcast<T: Typed + Any>(self: Box<Self>) -> Result<Box<T>> {
        let found = self.type_info().name;
        self.into_any()
            .downcast::<T>()
            .map_err(|_| Error::type_mismatch(<T as Typed>::type_info().name, found))
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Reflect<{}>", self.type_info().name)
    }
}

/// Static descriptor of a type.
pub trait Typed {
    fn type_info() -> TypeInfo;
}

/// Construction of a concrete value from a decoded one.
pub trait FromReflect: Sized {
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` cannot be assigned to `Self`.
    fn from_reflect(value: Box<dyn Reflect>) -> Result<Self>;
}

fn builtin<T: Any + ?Sized>(kind: TypeKind) -> TypeInfo {
    TypeInfo {
        id: TypeId::of::<T>(),
        module: "std",
        name: type_name::<T>(),
        kind,
    }
}

fn downcast_owned<T: Typed + Any>(value: Box<dyn Reflect>) -> Result<T> {
    value.downcast::<T>().map(|boxed| *boxed)
}

macro_rules! impl_reflect_base {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    };
}

macro_rules! impl_scalar {
    ($($t:ty => $kind:ident, $accessor:ident);* $(;)?) => {
        $(
            impl Typed for $t {
                fn type_info() -> TypeInfo {
                    builtin::<$t>(TypeKind::Scalar(ValueKind::$kind))
                }
            }

            impl Reflect for $t {
                fn type_info(&self) -> TypeInfo {
                    <$t as Typed>::type_info()
                }

                fn reflect(&self) -> ReflectRef<'_> {
                    ReflectRef::Scalar(Value::from(self.clone()))
                }

                impl_reflect_base!();
            }

            impl FromReflect for $t {
                fn from_reflect(value: Box<dyn Reflect>) -> Result<Self> {
                    match value.reflect() {
                        ReflectRef::Scalar(scalar) => Ok(scalar.$accessor()),
                        ReflectRef::Null => Ok(<$t>::default()),
                        _ => Err(Error::type_mismatch(
                            stringify!($t),
                            value.type_info().name,
                        )),
                    }
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool, to_bool;
    String => String, to_text;
    u8 => Byte, to_u8;
    i8 => SByte, to_i8;
    char => Char, to_char;
    i16 => Short, to_i16;
    u16 => UShort, to_u16;
    i32 => Int, to_i32;
    u32 => UInt, to_u32;
    i64 => Long, to_i64;
    u64 => ULong, to_u64;
    f32 => Float, to_f32;
    f64 => Double, to_f64;
    Decimal => Decimal, to_decimal;
}

impl Typed for () {
    fn type_info() -> TypeInfo {
        builtin::<()>(TypeKind::Null)
    }
}

impl Reflect for () {
    fn type_info(&self) -> TypeInfo {
        <() as Typed>::type_info()
    }

    fn reflect(&self) -> ReflectRef<'_> {
        ReflectRef::Null
    }

    impl_reflect_base!();
}

impl FromReflect for () {
    fn from_reflect(_value: Box<dyn Reflect>) -> Result<Self> {
        Ok(())
    }
}

impl<T: Reflect + Typed + FromReflect> Typed for Vec<T> {
    fn type_info() -> TypeInfo {
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            return builtin::<Vec<T>>(TypeKind::Bytes);
        }
        builtin::<Vec<T>>(TypeKind::Sequence {
            element: <T as Typed>::type_info,
            construct: || Box::new(Vec::<T>::new()),
            push: |target, item| {
                let target = target
                    .downcast_mut::<Vec<T>>()
                    .ok_or_else(|| Error::type_mismatch(type_name::<Vec<T>>(), "another type"))?;
                target.push(T::from_reflect(item)?);
                Ok(())
            },
        })
    }
}

impl<T: Reflect + Typed + FromReflect> Reflect for Vec<T> {
    fn type_info(&self) -> TypeInfo {
        <Vec<T> as Typed>::type_info()
    }

    fn reflect(&self) -> ReflectRef<'_> {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<Vec<u8>>() {
            return ReflectRef::Bytes(bytes);
        }
        ReflectRef::Sequence(self.iter().map(|item| item as &dyn Reflect).collect())
    }

    impl_reflect_base!();
}

impl<T: Reflect + Typed + FromReflect> FromReflect for Vec<T> {
    fn from_reflect(value: Box<dyn Reflect>) -> Result<Self> {
        if matches!(value.reflect(), ReflectRef::Null) {
            return Ok(Vec::new());
        }
        downcast_owned(value)
    }
}

impl<T: Reflect + Typed + FromReflect, const N: usize> Typed for [T; N] {
    fn type_info() -> TypeInfo {
        builtin::<[T; N]>(TypeKind::FixedSequence {
            element: <T as Typed>::type_info,
            len: Some(N),
            collect: |items| {
                let values = items
                    .into_iter()
                    .map(T::from_reflect)
                    .collect::<Result<Vec<T>>>()?;
                let array: [T; N] = values.try_into().map_err(|values: Vec<T>| {
                    Error::type_mismatch(
                        &format!("{} elements", N),
                        &format!("{} elements", values.len()),
                    )
                })?;
                Ok(Box::new(array))
            },
        })
    }
}

impl<T: Reflect + Typed + FromReflect, const N: usize> Reflect for [T; N] {
    fn type_info(&self) -> TypeInfo {
        <[T; N] as Typed>::type_info()
    }

    fn reflect(&self) -> ReflectRef<'_> {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<[u8; N]>() {
            return ReflectRef::Bytes(bytes);
        }
        ReflectRef::Sequence(self.iter().map(|item| item as &dyn Reflect).collect())
    }

    impl_reflect_base!();
}

impl<T: Reflect + Typed + FromReflect, const N: usize> FromReflect for [T; N] {
    fn from_reflect(value: Box<dyn Reflect>) -> Result<Self> {
        downcast_owned(value)
    }
}

impl<T: Reflect + Typed + FromReflect> Typed for Box<[T]> {
    fn type_info() -> TypeInfo {
        builtin::<Box<[T]>>(TypeKind::FixedSequence {
            element: <T as Typed>::type_info,
            len: None,
            collect: |items| {
                let values = items
                    .into_iter()
                    .map(T::from_reflect)
                    .collect::<Result<Vec<T>>>()?;
                Ok(Box::new(values.into_boxed_slice()))
            },
        })
    }
}

impl<T: Reflect + Typed + FromReflect> Reflect for Box<[T]> {
    fn type_info(&self) -> TypeInfo {
        <Box<[T]> as Typed>::type_info()
    }

    fn reflect(&self) -> ReflectRef<'_> {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<Box<[u8]>>() {
            return ReflectRef::Bytes(bytes);
        }
        ReflectRef::Sequence(self.iter().map(|item| item as &dyn Reflect).collect())
    }

    impl_reflect_base!();
}

impl<T: Reflect + Typed + FromReflect> FromReflect for Box<[T]> {
    fn from_reflect(value: Box<dyn Reflect>) -> Result<Self> {
        if matches!(value.reflect(), ReflectRef::Null) {
            return Ok(Vec::new().into_boxed_slice());
        }
        downcast_owned(value)
    }
}

impl<T: Reflect + Typed + FromReflect> Typed for Option<T> {
    fn type_info() -> TypeInfo {
        builtin::<Option<T>>(TypeKind::Optional(<T as Typed>::type_info))
    }
}

impl<T: Reflect + Typed + FromReflect> Reflect for Option<T> {
    fn type_info(&self) -> TypeInfo {
        <Option<T> as Typed>::type_info()
    }

    fn reflect(&self) -> ReflectRef<'_> {
        match self {
            Some(inner) => inner.reflect(),
            None => ReflectRef::Null,
        }
    }

    impl_reflect_base!();
}

impl<T: Reflect + Typed + FromReflect> FromReflect for Option<T> {
    fn from_reflect(value: Box<dyn Reflect>) -> Result<Self> {
        if matches!(value.reflect(), ReflectRef::Null) {
            return Ok(None);
        }
        T::from_reflect(value).map(Some)
    }
}

impl Typed for Box<dyn Reflect> {
    fn type_info() -> TypeInfo {
        TypeInfo {
            id: TypeId::of::<Box<dyn Reflect>>(),
            module: "std",
            name: "dyn Reflect",
            kind: TypeKind::Abstract,
        }
    }
}

/// Fully transparent: every method answers for the boxed value.
impl Reflect for Box<dyn Reflect> {
    fn type_info(&self) -> TypeInfo {
        (**self).type_info()
    }

    fn reflect(&self) -> ReflectRef<'_> {
        (**self).reflect()
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        (**self).as_any_mut()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        Reflect::into_any(*self)
    }
}

impl FromReflect for Box<dyn Reflect> {
    fn from_reflect(value: Box<dyn Reflect>) -> Result<Self> {
        Ok(value)
    }
}
