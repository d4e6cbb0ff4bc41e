//! Field-mapping registry for the structured codec.
//!
//! A target aggregate is described in two levels: the outer type implements
//! [`Schema`] and names one [`Section`] per member; each section type names
//! one key per member. Leaves must be `i64` or `String`. Any other leaf type is
//! reported as [`Error::UnsupportedKind`] when the registry is built, before
//! any decode or encode starts.
//!
//! The [`schema!`](crate::schema) macro writes both impls from a
//! `"tag" => member` list; `"-"` as the tag marks a member as ignored.
//!
//! ## Examples
//!
//! ```rust
//! use lvmconf::{schema, FieldMap, FieldKind};
//!
//! #[derive(Default)]
//! struct Lvm {
//!     config: Config,
//! }
//!
//! #[derive(Default)]
//! struct Config {
//!     some_field: i64,
//!     profile_dir: String,
//!     cached: bool,
//! }
//!
//! schema! { impl Schema for Lvm { "config" => config } }
//! schema! {
//!     impl Section for Config {
//!         "some_field" => some_field,
//!         "profile_dir" => profile_dir,
//!         "-" => cached,
//!     }
//! }
//!
//! let fields = FieldMap::<Lvm>::new().unwrap();
//! let keys: Vec<_> = fields.iter().map(|f| f.key()).collect();
//! assert_eq!(keys, vec!["profile_dir", "some_field"]);
//! assert_eq!(fields.get("config", "some_field").map(|f| f.kind()), Some(FieldKind::Int64));
//! ```

use crate::{Error, Result, Value};
use indexmap::IndexMap;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use tracing::{debug, trace};

/// Leaf kinds a binding can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int64,
    String,
}

impl FieldKind {
    /// Kind of the leaf type `F`, or `None` if `F` is not supported.
    #[must_use]
    pub fn of<F: Any>() -> Option<FieldKind> {
        let id = TypeId::of::<F>();
        if id == TypeId::of::<i64>() {
            Some(FieldKind::Int64)
        } else if id == TypeId::of::<String>() {
            Some(FieldKind::String)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Int64 => "int64",
            FieldKind::String => "string",
        }
    }
}

/// The outer level of a structured target: one member per section.
pub trait Schema: Sized + 'static {
    fn bind(binder: &mut Binder<Self>) -> Result<()>;
}

/// The inner level: one member per key of a section.
pub trait Section: Sized + 'static {
    fn bind<T: 'static>(binder: &mut SectionBinder<'_, T, Self>) -> Result<()>;
}

/// Borrowing accessors from an outer value to one of its members.
struct Lens<T, S> {
    get: fn(&T) -> &S,
    get_mut: fn(&mut T) -> &mut S,
}

impl<T, S> Clone for Lens<T, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, S> Copy for Lens<T, S> {}

trait Accessor<T>: Send + Sync {
    fn get<'a>(&self, target: &'a T) -> &'a dyn Any;
    fn get_mut<'a>(&self, target: &'a mut T) -> &'a mut dyn Any;
}

/// Target → section member → leaf.
struct Path<T, S, F> {
    section: Lens<T, S>,
    field: Lens<S, F>,
}

impl<T: 'static, S: 'static, F: Any> Accessor<T> for Path<T, S, F> {
    fn get<'a>(&self, target: &'a T) -> &'a dyn Any {
        (self.field.get)((self.section.get)(target))
    }

    fn get_mut<'a>(&self, target: &'a mut T) -> &'a mut dyn Any {
        (self.field.get_mut)((self.section.get_mut)(target))
    }
}

/// One `(section, key)` bound to a typed location inside `T`.
pub struct FieldBinding<T> {
    section: String,
    key: String,
    kind: FieldKind,
    accessor: Box<dyn Accessor<T>>,
}

impl<T> FieldBinding<T> {
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Reads the bound location.
    pub fn read(&self, target: &T) -> Result<Value> {
        let slot = self.accessor.get(target);
        let value = match self.kind {
            FieldKind::Int64 => slot.downcast_ref::<i64>().map(|v| Value::Int64(*v)),
            FieldKind::String => slot
                .downcast_ref::<String>()
                .map(|v| Value::String(v.clone())),
        };
        value.ok_or_else(|| self.slot_error())
    }

    /// Overwrites the bound location.
    ///
    /// The value must match the binding's kind.
    pub fn write(&self, target: &mut T, value: Value) -> Result<()> {
        let slot = self.accessor.get_mut(target);
        let written = match (self.kind, value) {
            (FieldKind::Int64, Value::Int64(v)) => slot.downcast_mut::<i64>().map(|s| *s = v),
            (FieldKind::String, Value::String(v)) => {
                slot.downcast_mut::<String>().map(|s| *s = v)
            }
            (kind, other) => {
                return Err(Error::type_mismatch(
                    &self.section,
                    &self.key,
                    kind.as_str(),
                    other.kind(),
                ))
            }
        };
        written.ok_or_else(|| self.slot_error())
    }

    fn slot_error(&self) -> Error {
        Error::unsupported_kind(&self.section, &self.key, "slot changed type after binding")
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("section", &self.section)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Collects bindings while a [`Schema`] walks its sections.
pub struct Binder<T> {
    bindings: Vec<FieldBinding<T>>,
}

impl<T: 'static> Binder<T> {
    fn new() -> Self {
        Binder {
            bindings: Vec::new(),
        }
    }

    /// Binds the member reached through `get`/`get_mut` as section `name`.
    pub fn section<S: Section>(
        &mut self,
        name: &str,
        get: fn(&T) -> &S,
        get_mut: fn(&mut T) -> &mut S,
    ) -> Result<()> {
        validate_name(name)?;
        let mut inner = SectionBinder {
            binder: self,
            section: name.to_string(),
            lens: Lens { get, get_mut },
        };
        S::bind(&mut inner)
    }

    /// Records that `member` carries the ignore marker.
    pub fn ignore(&mut self, member: &str) {
        trace!(member, "ignoring section member");
    }
}

/// Collects the keys of one section.
pub struct SectionBinder<'b, T, S> {
    binder: &'b mut Binder<T>,
    section: String,
    lens: Lens<T, S>,
}

impl<'b, T: 'static, S: 'static> SectionBinder<'b, T, S> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.section
    }

    /// Binds the leaf reached through `get`/`get_mut` as `key`.
    pub fn field<F: Any>(
        &mut self,
        key: &str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> Result<()> {
        validate_name(key)?;
        let kind = FieldKind::of::<F>()
            .ok_or_else(|| Error::unsupported_kind(&self.section, key, type_name::<F>()))?;
        self.binder.bindings.push(FieldBinding {
            section: self.section.clone(),
            key: key.to_string(),
            kind,
            accessor: Box::new(Path {
                section: self.lens,
                field: Lens { get, get_mut },
            }),
        });
        Ok(())
    }

    /// Records that `member` carries the ignore marker.
    pub fn ignore(&mut self, member: &str) {
        trace!(section = %self.section, member, "ignoring key member");
    }
}

/// All bindings of a target type, bucketed by section.
///
/// Lookup by `(section, key)` is a hash lookup per level; iteration is sorted
/// by section then key. Build it once per type and reuse it across calls.
pub struct FieldMap<T> {
    sections: IndexMap<String, IndexMap<String, FieldBinding<T>>>,
}

impl<T: Schema> FieldMap<T> {
    pub fn new() -> Result<Self> {
        let mut binder = Binder::new();
        T::bind(&mut binder)?;
        Self::from_bindings(binder.bindings)
    }
}

impl<T> FieldMap<T> {
    fn from_bindings(bindings: Vec<FieldBinding<T>>) -> Result<Self> {
        let total = bindings.len();
        let mut sections: IndexMap<String, IndexMap<String, FieldBinding<T>>> = IndexMap::new();
        for binding in bindings {
            let bucket = sections.entry(binding.section.clone()).or_default();
            if bucket.contains_key(&binding.key) {
                return Err(Error::duplicate_field(&binding.section, &binding.key));
            }
            bucket.insert(binding.key.clone(), binding);
        }

        sections.sort_keys();
        for bucket in sections.values_mut() {
            bucket.sort_keys();
        }
        debug!(sections = sections.len(), fields = total, "built field map");
        Ok(FieldMap { sections })
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&FieldBinding<T>> {
        self.sections.get(section)?.get(key)
    }

    /// Section names in sorted order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Bindings of one section in key order.
    pub fn fields<'a>(&'a self, section: &str) -> impl Iterator<Item = &'a FieldBinding<T>> {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|bucket| bucket.values())
    }

    /// Every binding, by section then key.
    pub fn iter(&self) -> impl Iterator<Item = &FieldBinding<T>> {
        self.sections.values().flat_map(|bucket| bucket.values())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.values().map(IndexMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for FieldMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Characters that would change how a name lexes.
const RESERVED: [char; 8] = ['{', '}', '=', '#', '"', '[', ']', '/'];

/// Checks that a section or key name can be written and read back unchanged.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_name(name, "name is empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(Error::invalid_name(name, "name contains whitespace"));
    }
    if let Some(ch) = name.chars().find(|ch| RESERVED.contains(ch)) {
        return Err(Error::invalid_name(
            name,
            &format!("name contains reserved character {:?}", ch),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[derive(Debug, Default, PartialEq)]
    struct Lvm {
        config: Config,
        devices: Devices,
        scratch: Devices,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Config {
        some_field: i64,
        profile_dir: String,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Devices {
        dir: String,
        scan_lvs: i64,
        note: String,
    }

    schema! {
        impl Schema for Lvm {
            "devices" => devices,
            "config" => config,
            "-" => scratch,
        }
    }

    schema! {
        impl Section for Config {
            "some_field" => some_field,
            "profile_dir" => profile_dir,
        }
    }

    schema! {
        impl Section for Devices {
            "scan_lvs" => scan_lvs,
            "dir" => dir,
            "-" => note,
        }
    }

    #[test]
    fn test_bindings_sorted_by_section_then_key() {
        let fields = FieldMap::<Lvm>::new().unwrap();
        let order: Vec<_> = fields
            .iter()
            .map(|f| format!("{}/{}", f.section(), f.key()))
            .collect();
        assert_eq!(
            order,
            vec![
                "config/profile_dir",
                "config/some_field",
                "devices/dir",
                "devices/scan_lvs",
            ]
        );
        assert_eq!(fields.len(), 4);
        assert_eq!(fields.sections().collect::<Vec<_>>(), vec!["config", "devices"]);
    }

    #[test]
    fn test_ignored_members_are_not_bound() {
        let fields = FieldMap::<Lvm>::new().unwrap();
        assert!(fields.get("devices", "note").is_none());
        assert!(fields.get("scratch", "dir").is_none());
    }

    #[test]
    fn test_read_and_write_through_binding() {
        let fields = FieldMap::<Lvm>::new().unwrap();
        let mut target = Lvm::default();

        let binding = fields.get("config", "some_field").unwrap();
        binding.write(&mut target, Value::Int64(9)).unwrap();
        assert_eq!(target.config.some_field, 9);
        assert_eq!(binding.read(&target).unwrap(), Value::Int64(9));

        let binding = fields.get("devices", "dir").unwrap();
        binding.write(&mut target, Value::from("/dev")).unwrap();
        assert_eq!(target.devices.dir, "/dev");
        assert_eq!(target.scratch, Devices::default());
    }

    #[test]
    fn test_write_kind_mismatch() {
        let fields = FieldMap::<Lvm>::new().unwrap();
        let mut target = Lvm::default();
        let binding = fields.get("config", "some_field").unwrap();
        let err = binding.write(&mut target, Value::from("x")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(target.config.some_field, 0);
    }

    #[derive(Default)]
    struct Bad {
        section: BadSection,
    }

    #[derive(Default)]
    struct BadSection {
        enabled: bool,
    }

    schema! { impl Schema for Bad { "global" => section } }
    schema! { impl Section for BadSection { "enabled" => enabled } }

    #[test]
    fn test_unsupported_kind_is_schema_error() {
        let err = FieldMap::<Bad>::new().unwrap_err();
        match err {
            Error::UnsupportedKind {
                section,
                key,
                type_name,
            } => {
                assert_eq!(section, "global");
                assert_eq!(key, "enabled");
                assert_eq!(type_name, "bool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[derive(Default)]
    struct Twice {
        a: Config,
    }

    impl Schema for Twice {
        fn bind(binder: &mut Binder<Self>) -> Result<()> {
            binder.section("config", |t| &t.a, |t| &mut t.a)?;
            binder.section("config", |t| &t.a, |t| &mut t.a)
        }
    }

    #[test]
    fn test_duplicate_binding() {
        assert!(matches!(
            FieldMap::<Twice>::new(),
            Err(Error::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("profile_dir").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a=b").is_err());
    }

    #[test]
    fn test_field_kind_of() {
        assert_eq!(FieldKind::of::<i64>(), Some(FieldKind::Int64));
        assert_eq!(FieldKind::of::<String>(), Some(FieldKind::String));
        assert_eq!(FieldKind::of::<i32>(), None);
        assert_eq!(FieldKind::of::<&'static str>(), None);
    }
}
