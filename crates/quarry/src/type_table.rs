use quarry_core::schema::{TypeRow, TypeTable};

use indexmap::IndexMap;

/// Constants generated from an enumeration table with [`type_table!`].
pub trait TypeTableEnum: Copy + Sized + 'static {
    /// Table the constants were read from
    const TABLE: &'static str;

    /// Primary key column of the table
    const PK: &'static str = "id";

    /// Every constant, ordered by id.
    fn all() -> &'static [Self];

    fn id(self) -> i64;

    /// Human-readable name of the constant.
    fn name(self) -> &'static str;

    fn from_id(id: i64) -> Option<Self> {
        Self::all().iter().copied().find(|value| value.id() == id)
    }

    /// Reverse lookup by name, ignoring case.
    fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|value| value.name().eq_ignore_ascii_case(name))
    }

    /// The constants as the rows of their table.
    fn type_table() -> TypeTable {
        TypeTable {
            table: Self::TABLE.to_string(),
            pk: Self::PK.to_string(),
            rows: Self::all()
                .iter()
                .map(|value| TypeRow {
                    id: value.id(),
                    name: value.name().to_string(),
                    fields: IndexMap::new(),
                })
                .collect(),
        }
    }
}

/// Declares the constants of an enumeration table.
///
/// ```
/// quarry::type_table! {
///     /// Lifecycle of a project
///     pub enum ProjectStatusType in "project_status_type" {
///         Open = 1 => "Open",
///         Cancelled = 2 => "Cancelled",
///         Completed = 3 => "Completed",
///         Planned = 4 => "Planned",
///     }
/// }
///
/// use quarry::TypeTableEnum;
///
/// assert_eq!(ProjectStatusType::Completed.id(), 3);
/// assert_eq!("planned".parse::<ProjectStatusType>().unwrap(), ProjectStatusType::Planned);
/// ```
///
/// The enum converts into a [`Value`](crate::Value) holding its id, back
/// from one with `TryFrom`, and to and from its name with `Display` and
/// `FromStr`.
#[macro_export]
macro_rules! type_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident in $table:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $id:literal => $label:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $crate::TypeTableEnum for $name {
            const TABLE: &'static str = $table;

            fn all() -> &'static [Self] {
                &[ $( $name::$variant, )* ]
            }

            fn id(self) -> i64 {
                match self {
                    $( $name::$variant => $id, )*
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )*
                }
            }
        }

        impl $crate::codegen_support::fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut $crate::codegen_support::fmt::Formatter<'_>,
            ) -> $crate::codegen_support::fmt::Result {
                f.write_str($crate::TypeTableEnum::name(*self))
            }
        }

        impl $crate::codegen_support::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> $crate::Result<Self> {
                <Self as $crate::TypeTableEnum>::from_name(s).ok_or_else(|| {
                    $crate::Error::type_conversion($crate::Value::from(s), stringify!($name))
                })
            }
        }

        impl From<$name> for $crate::Value {
            fn from(value: $name) -> $crate::Value {
                $crate::Value::I64($crate::TypeTableEnum::id(value))
            }
        }

        impl TryFrom<$crate::Value> for $name {
            type Error = $crate::Error;

            fn try_from(value: $crate::Value) -> $crate::Result<Self> {
                let id = value.to_i64()?;
                <Self as $crate::TypeTableEnum>::from_id(id).ok_or_else(|| {
                    $crate::Error::type_conversion(value, stringify!($name))
                })
            }
        }
    };
}
