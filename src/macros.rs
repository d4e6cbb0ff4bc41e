/// Implements [`Schema`](crate::Schema) or [`Section`](crate::Section) from a
/// list of `"tag" => member` pairs.
///
/// A tag of `"-"` marks the member as ignored: it is neither decoded nor
/// encoded.
///
/// # Examples
///
/// ```rust
/// use lvmconf::{from_str_into, schema};
///
/// #[derive(Default)]
/// struct Lvm {
///     devices: Devices,
/// }
///
/// #[derive(Default)]
/// struct Devices {
///     dir: String,
///     scan_lvs: i64,
///     seen: Vec<String>,
/// }
///
/// schema! { impl Schema for Lvm { "devices" => devices } }
/// schema! {
///     impl Section for Devices {
///         "dir" => dir,
///         "scan_lvs" => scan_lvs,
///         "-" => seen,
///     }
/// }
///
/// let mut lvm = Lvm::default();
/// from_str_into("devices {\n\tdir = \"/dev\"\n\tscan_lvs = 1\n}\n", &mut lvm).unwrap();
/// assert_eq!(lvm.devices.dir, "/dev");
/// assert_eq!(lvm.devices.scan_lvs, 1);
/// ```
#[macro_export]
macro_rules! schema {
    (@section $binder:ident, "-", $member:ident) => {
        $binder.ignore(stringify!($member));
    };

    (@section $binder:ident, $tag:tt, $member:ident) => {
        $binder.section($tag, |t| &t.$member, |t| &mut t.$member)?;
    };

    (@field $binder:ident, "-", $member:ident) => {
        $binder.ignore(stringify!($member));
    };

    (@field $binder:ident, $tag:tt, $member:ident) => {
        $binder.field($tag, |s| &s.$member, |s| &mut s.$member)?;
    };

    (impl Schema for $ty:ty { $($tag:tt => $member:ident),* $(,)? }) => {
        impl $crate::Schema for $ty {
            #[allow(unused_variables)]
            fn bind(binder: &mut $crate::fields::Binder<Self>) -> $crate::Result<()> {
                $( $crate::schema!(@section binder, $tag, $member); )*
                Ok(())
            }
        }
    };

    (impl Section for $ty:ty { $($tag:tt => $member:ident),* $(,)? }) => {
        impl $crate::Section for $ty {
            #[allow(unused_variables)]
            fn bind<T: 'static>(
                binder: &mut $crate::fields::SectionBinder<'_, T, Self>,
            ) -> $crate::Result<()> {
                $( $crate::schema!(@field binder, $tag, $member); )*
                Ok(())
            }
        }
    };
}

/// Builds a [`ConfigMap`](crate::ConfigMap) from `"section/key" => value`
/// pairs. Values go through [`Value::from`](crate::Value).
///
/// # Examples
///
/// ```rust
/// use lvmconf::{config_map, Value};
///
/// let map = config_map! {
///     "global/umask" => 63,
///     "devices/filter" => vec!["a|.*|"],
/// };
/// assert_eq!(map.get("global/umask"), Some(&Value::Int64(63)));
/// assert!(config_map! {}.is_empty());
/// ```
#[macro_export]
macro_rules! config_map {
    () => {
        $crate::ConfigMap::new()
    };

    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ConfigMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use crate::{FieldMap, Value};

    #[derive(Default)]
    struct Outer {
        inner: Inner,
        skipped: Inner,
    }

    #[derive(Default)]
    struct Inner {
        n: i64,
        s: String,
    }

    schema! { impl Schema for Outer { "inner" => inner, "-" => skipped } }
    schema! { impl Section for Inner { "n" => n, "s" => s, } }

    #[test]
    fn test_schema_macro_binds_tags() {
        let fields = FieldMap::<Outer>::new().unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.get("inner", "n").is_some());
        assert!(fields.get("skipped", "n").is_none());
    }

    #[test]
    fn test_config_map_macro() {
        let map = config_map! {
            "a/x" => 1,
            "a/y" => "text",
            "b/z" => Vec::<String>::new(),
        };
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a/x", "a/y", "b/z"]);
        assert_eq!(map.get("b/z"), Some(&Value::EmptyList));
    }
}
