//! Type-directed translation between runtime objects and value trees.
//!
//! Encoding walks a [`Reflect`] graph depth-first and produces a [`Value`]. Decoding walks
//! a [`Value`] and builds the objects its static context expects, the *implied type* at
//! each position. Where the runtime type of a record differs from the implied type, the
//! encoder injects a polymorphism tag as the object's first entry:
//!
//! ```text
//! !game: 'game::KingSlime'
//! health: 30B
//! ```
//!
//! The decoder looks at the first entry only. A `!` key anywhere else is skipped like any
//! other tag, and the object falls back to its implied type.
//!
//! Three strategies are injectable per [`Mapper`]:
//!
//! - [`MemberEnumerator`] lists a type's members ([`DeclaredMembers`] by default).
//! - [`TypeResolver`] maps a tag back to a type ([`TypeRegistry`] by default).
//! - [`UnusedValueReporter`] hears about keys with no matching member ([`LogUnused`] by default).

use crate::map::TYPE_TAG_PREFIX;
use crate::reflect::{FromReflect, Member, Reflect, ReflectRef, TypeInfo, TypeKind, Typed};
use crate::registry::{TypeRegistry, TypeResolver};
use crate::{Error, Result, TdfMap, Value};

/// Lists the members the mapper reads and writes on a record type.
pub trait MemberEnumerator {
    fn members(&self, ty: &TypeInfo) -> Vec<Member>;
}

/// Every member the type declares.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredMembers;

impl MemberEnumerator for DeclaredMembers {
    fn members(&self, ty: &TypeInfo) -> Vec<Member> {
        ty.members()
    }
}

/// Receives decoded keys that matched no member, or more than one.
///
/// Reporting never aborts a decode; the entry is skipped.
pub trait UnusedValueReporter {
    fn report(&self, ty: &TypeInfo, key: &str, value: &Value);
}

/// Logs every unused key at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUnused;

impl UnusedValueReporter for LogUnused {
    fn report(&self, ty: &TypeInfo, key: &str, value: &Value) {
        tracing::warn!(
            type_name = ty.name,
            key,
            kind = value.kind().name(),
            "decoded key has no matching member"
        );
    }
}

impl<F> UnusedValueReporter for F
where
    F: Fn(&TypeInfo, &str, &Value),
{
    fn report(&self, ty: &TypeInfo, key: &str, value: &Value) {
        self(ty, key, value);
    }
}

/// Reflective encoder and decoder with injectable member, type and drift strategies.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::{reflect_record, tdf, Mapper};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Slime {
///     health: u8,
///     name: String,
/// }
///
/// reflect_record!(Slime in "game" { health: u8, name: String });
///
/// let mapper = Mapper::new();
/// let slime = Slime { health: 3, name: "Slime".to_string() };
///
/// let value = mapper.encode_as(&slime).unwrap();
/// assert_eq!(value, tdf!({ "health": (3u8), "name": "Slime" }));
/// assert_eq!(mapper.decode_as::<Slime>(&value).unwrap(), slime);
/// ```
pub struct Mapper {
    members: Box<dyn MemberEnumerator>,
    resolver: Box<dyn TypeResolver>,
    unused: Box<dyn UnusedValueReporter>,
}

impl Default for Mapper {
    fn default() -> Self {
        Mapper {
            members: Box::new(DeclaredMembers),
            resolver: Box::new(TypeRegistry::new()),
            unused: Box::new(LogUnused),
        }
    }
}

impl Mapper {
    /// A mapper with declared members, an empty registry and logged drift.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_member_enumerator(mut self, members: impl MemberEnumerator + 'static) -> Self {
        self.members = Box::new(members);
        self
    }

    #[must_use]
    pub fn with_type_resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn with_unused_reporter(mut self, reporter: impl UnusedValueReporter + 'static) -> Self {
        self.unused = Box::new(reporter);
        self
    }

    /// Encodes `value` as it would appear at a position whose static type is `implied`.
    ///
    /// # Errors
    ///
    /// Returns an error if a member accessor does not accept its owning record.
    pub fn encode(&self, value: &dyn Reflect, implied: Option<&TypeInfo>) -> Result<Value> {
        match value.reflect() {
            ReflectRef::Null => Ok(Value::Null),
            ReflectRef::Scalar(scalar) => Ok(scalar),
            ReflectRef::Bytes(bytes) => Ok(Value::Binary(bytes.to_vec())),
            ReflectRef::Sequence(items) => {
                let element = value.type_info().unwrap_optional().element();
                items
                    .into_iter()
                    .map(|item| self.encode(item, element.as_ref()))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            ReflectRef::Record(record) => self.encode_record(record, implied),
        }
    }

    fn encode_record(&self, record: &dyn Reflect, implied: Option<&TypeInfo>) -> Result<Value> {
        let info = record.type_info();
        let members = self.members.members(&info);
        let mut map = TdfMap::with_capacity(members.len() + 1);

        if implied.map(TypeInfo::unwrap_optional) != Some(info) {
            map.insert(
                format!("{TYPE_TAG_PREFIX}{}", info.module),
                Value::from(info.name),
            );
        }

        for member in members {
            let current = (member.get)(record.as_any())
                .ok_or_else(|| Error::type_mismatch(info.name, "a record of another type"))?;
            let encoded = self.encode(current, Some(&member.type_info()))?;
            map.insert(member.name.to_string(), encoded);
        }
        Ok(Value::Object(map))
    }

    /// Decodes `value` into the object its position expects.
    ///
    /// Scalars come back as their native payload (`Int` as `i32`, `String` as `String`,
    /// `Null` as `()`); assignment into a member coerces them to the member's type.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownModule`] / [`Error::UnknownType`] for an unresolvable tag.
    /// - [`Error::MissingImpliedType`] for an array, or an untagged object, with no implied type.
    /// - [`Error::NotConstructible`] when the target type cannot hold the value.
    /// - [`Error::TypeMismatch`] when a decoded member does not fit its declaration.
    pub fn decode(&self, value: &Value, implied: Option<&TypeInfo>) -> Result<Box<dyn Reflect>> {
        let implied = implied.map(TypeInfo::unwrap_optional);
        match value {
            Value::Object(map) => self.decode_object(map, implied),
            Value::Array(items) => self.decode_array(items, implied),
            Value::Binary(bytes) => decode_binary(bytes, implied),
            scalar => Ok(decode_scalar(scalar)),
        }
    }

    fn decode_object(&self, map: &TdfMap, implied: Option<TypeInfo>) -> Result<Box<dyn Reflect>> {
        let concrete = match map.type_tag() {
            Some((module, name)) => {
                let name = name.to_text();
                let resolved = self.resolver.resolve(module, &name)?;
                tracing::trace!(module, name = %name, "resolved polymorphism tag");
                resolved
            }
            None => implied.ok_or(Error::MissingImpliedType("object"))?,
        };

        let mut instance = concrete.construct()?;
        let members = self.members.members(&concrete);

        for (key, entry) in map {
            if key.starts_with(TYPE_TAG_PREFIX) {
                continue;
            }
            let mut matching = members.iter().filter(|member| member.name == key.as_str());
            match (matching.next(), matching.next()) {
                (Some(member), None) => {
                    let decoded = self.decode(entry, Some(&member.type_info()))?;
                    (member.set)(instance.as_any_mut(), decoded)?;
                }
                _ => self.unused.report(&concrete, key, entry),
            }
        }
        Ok(instance)
    }

    fn decode_array(&self, items: &[Value], implied: Option<TypeInfo>) -> Result<Box<dyn Reflect>> {
        let target = implied.ok_or(Error::MissingImpliedType("array"))?;
        let element = target.element();

        match target.kind {
            TypeKind::Bytes => items
                .iter()
                .map(|item| u8::from_reflect(self.decode(item, element.as_ref())?))
                .collect::<Result<Vec<u8>>>()
                .map(|bytes| Box::new(bytes) as Box<dyn Reflect>),
            TypeKind::Sequence { push, .. } => {
                let mut instance = target.construct()?;
                for item in items {
                    push(instance.as_any_mut(), self.decode(item, element.as_ref())?)?;
                }
                Ok(instance)
            }
            TypeKind::FixedSequence { len, collect, .. } => {
                check_fixed_len(&target, len, items.len())?;
                let decoded = items
                    .iter()
                    .map(|item| self.decode(item, element.as_ref()))
                    .collect::<Result<Vec<_>>>()?;
                collect(decoded)
            }
            _ => Err(Error::NotConstructible(target.name.to_string())),
        }
    }

    /// Encodes `value` at a position statically typed as `T`.
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn encode_as<T: Reflect + Typed>(&self, value: &T) -> Result<Value> {
        self.encode(value, Some(&<T as Typed>::type_info()))
    }

    /// Decodes `value` at a position statically typed as `T` and assigns the result to a `T`.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_as<T: Typed + FromReflect>(&self, value: &Value) -> Result<T> {
        T::from_reflect(self.decode(value, Some(&<T as Typed>::type_info()))?)
    }
}

fn check_fixed_len(target: &TypeInfo, expected: Option<usize>, found: usize) -> Result<()> {
    match expected {
        Some(expected) if expected != found => Err(Error::type_mismatch(
            &format!("{} with {expected} elements", target.name),
            &format!("{found} elements"),
        )),
        _ => Ok(()),
    }
}

fn decode_binary(bytes: &[u8], implied: Option<TypeInfo>) -> Result<Box<dyn Reflect>> {
    let Some(target) = implied else {
        return Ok(Box::new(bytes.to_vec()));
    };
    match target.kind {
        TypeKind::Sequence { push, .. } => {
            let mut instance = target.construct()?;
            for &byte in bytes {
                push(instance.as_any_mut(), Box::new(byte))?;
            }
            Ok(instance)
        }
        TypeKind::FixedSequence { len, collect, .. } => {
            check_fixed_len(&target, len, bytes.len())?;
            collect(
                bytes
                    .iter()
                    .map(|&byte| Box::new(byte) as Box<dyn Reflect>)
                    .collect(),
            )
        }
        _ => Ok(Box::new(bytes.to_vec())),
    }
}

fn decode_scalar(value: &Value) -> Box<dyn Reflect> {
    match value {
        Value::Bool(b) => Box::new(*b),
        Value::String(s) => Box::new(s.clone()),
        Value::Byte(n) => Box::new(*n),
        Value::SByte(n) => Box::new(*n),
        Value::Char(c) => Box::new(*c),
        Value::Short(n) => Box::new(*n),
        Value::UShort(n) => Box::new(*n),
        Value::Int(n) => Box::new(*n),
        Value::UInt(n) => Box::new(*n),
        Value::Long(n) => Box::new(*n),
        Value::ULong(n) => Box::new(*n),
        Value::Float(f) => Box::new(*f),
        Value::Double(f) => Box::new(*f),
        Value::Decimal(d) => Box::new(*d),
        Value::Binary(bytes) => Box::new(bytes.clone()),
        Value::Null | Value::Object(_) | Value::Array(_) => Box::new(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reflect_record, tdf};

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    reflect_record!(Point in "geometry" { x: i32, y: i32 });

    #[test]
    fn test_encode_record_at_its_own_type_has_no_tag() {
        let value = Mapper::new().encode_as(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value, tdf!({ "x": 1, "y": 2 }));
    }

    #[test]
    fn test_encode_without_implied_type_tags_the_record() {
        let value = Mapper::new().encode(&Point { x: 1, y: 2 }, None).unwrap();
        let map = value.as_object().unwrap();
        let (module, name) = map.type_tag().unwrap();
        assert_eq!(module, "geometry");
        assert_eq!(name.as_str(), Some(std::any::type_name::<Point>()));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_scalars_decode_to_native_payloads() {
        let mapper = Mapper::new();
        let decoded = mapper.decode(&Value::Short(4), None).unwrap();
        assert_eq!(decoded.downcast_ref::<i16>(), Some(&4));

        let decoded = mapper.decode(&Value::Null, None).unwrap();
        assert!(decoded.is::<()>());
    }

    #[test]
    fn test_member_assignment_coerces_scalars() {
        let point: Point = Mapper::new()
            .decode_as(&tdf!({ "x": (7u8), "y": "-3" }))
            .unwrap();
        assert_eq!(point, Point { x: 7, y: -3 });
    }

    #[test]
    fn test_binary_decodes_into_byte_sequences() {
        let mapper = Mapper::new();
        let value = Value::Binary(vec![1, 2, 3]);

        assert_eq!(mapper.decode_as::<Vec<u8>>(&value).unwrap(), vec![1, 2, 3]);
        assert_eq!(mapper.decode_as::<[u8; 3]>(&value).unwrap(), [1, 2, 3]);
        assert_eq!(
            mapper.decode_as::<Vec<u16>>(&value).unwrap(),
            vec![1u16, 2, 3]
        );
        assert!(mapper.decode_as::<[u8; 2]>(&value).is_err());
    }

    #[test]
    fn test_array_into_byte_sequence() {
        let bytes: Vec<u8> = Mapper::new().decode_as(&tdf!([1, 2])).unwrap();
        assert_eq!(bytes, vec![1, 2]);
    }

    #[test]
    fn test_array_without_implied_type_is_fatal() {
        assert!(matches!(
            Mapper::new().decode(&tdf!([1]), None),
            Err(Error::MissingImpliedType("array"))
        ));
    }

    #[test]
    fn test_array_into_scalar_is_not_constructible() {
        assert!(matches!(
            Mapper::new().decode_as::<i32>(&tdf!([1])),
            Err(Error::NotConstructible(_))
        ));
    }

    #[test]
    fn test_custom_member_enumerator_hides_members() {
        struct OnlyX;

        impl MemberEnumerator for OnlyX {
            fn members(&self, ty: &TypeInfo) -> Vec<Member> {
                ty.members().into_iter().filter(|m| m.name == "x").collect()
            }
        }

        let mapper = Mapper::new()
            .with_member_enumerator(OnlyX)
            .with_unused_reporter(|_: &TypeInfo, _: &str, _: &Value| {});
        let value = mapper.encode_as(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value, tdf!({ "x": 1 }));

        let point: Point = mapper.decode_as(&tdf!({ "x": 5, "y": 6 })).unwrap();
        assert_eq!(point, Point { x: 5, y: 0 });
    }
}
