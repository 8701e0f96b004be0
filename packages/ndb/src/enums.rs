//! Enums stored by EnumProperty.
//!
//! An enum property stores a member's integer value and hands back a member
//! of the declared enum on read. [`NdbEnum`] is the contract a Rust enum
//! meets to take part; [`ndb_enum!`](crate::ndb_enum) writes the impl.

use std::any::TypeId;
use std::fmt;

use crate::TypeError;

/// A fieldless enum whose members carry integer values.
pub trait NdbEnum: Copy + Eq + fmt::Debug + 'static {
    /// The enum's name, used in error messages.
    const NAME: &'static str;

    /// Every member with its name.
    const MEMBERS: &'static [(&'static str, Self)];

    /// The integer a member is stored as.
    fn value(self) -> i64;

    fn from_value(value: i64) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .find(|(_, member)| member.value() == value)
            .map(|(_, member)| *member)
    }

    fn member_name(self) -> &'static str {
        Self::MEMBERS
            .iter()
            .find(|(_, member)| *member == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }
}

/// Declare an enum usable with EnumProperty.
///
/// Every variant needs an explicit integer value.
///
/// ```rust
/// simplendb::ndb_enum! {
///     pub enum Quality {
///         Gold = 2,
///         Silver = 1,
///         Bronze = 0,
///     }
/// }
///
/// use simplendb::NdbEnum;
/// assert_eq!(Quality::from_value(1), Some(Quality::Silver));
/// assert_eq!(Quality::Gold.value(), 2);
/// ```
#[macro_export]
macro_rules! ndb_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant = $value),+
        }

        impl $crate::NdbEnum for $name {
            const NAME: &'static str = stringify!($name);
            const MEMBERS: &'static [(&'static str, Self)] =
                &[$((stringify!($variant), $name::$variant)),+];

            fn value(self) -> i64 {
                self as i64
            }
        }
    };
}

fn lookup<E: NdbEnum>(value: i64) -> Option<&'static str> {
    E::from_value(value).map(NdbEnum::member_name)
}

/// Identifies a declared enum at runtime.
///
/// This is what an EnumProperty's `enum` option holds.
#[derive(Clone, Copy)]
pub struct EnumType {
    name: &'static str,
    type_id: TypeId,
    lookup: fn(i64) -> Option<&'static str>,
}

impl EnumType {
    pub fn of<E: NdbEnum>() -> Self {
        Self {
            name: E::NAME,
            type_id: TypeId::of::<E>(),
            lookup: lookup::<E>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The member name for `value`, if `value` belongs to this enum.
    pub fn member_name(&self, value: i64) -> Option<&'static str> {
        (self.lookup)(value)
    }

    pub fn is<E: NdbEnum>(&self) -> bool {
        self.type_id == TypeId::of::<E>()
    }

    /// A member of this enum by stored value.
    pub fn member(&self, value: i64) -> Result<EnumValue, TypeError> {
        match self.member_name(value) {
            Some(_) => Ok(EnumValue {
                enum_type: *self,
                value,
            }),
            None => Err(TypeError::NotAMember {
                enum_name: self.name,
                value,
            }),
        }
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EnumType {}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumType").field(&self.name).finish()
    }
}

/// A member of some [`NdbEnum`], tagged with its enum type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumValue {
    enum_type: EnumType,
    value: i64,
}

impl EnumValue {
    pub fn of<E: NdbEnum>(member: E) -> Self {
        Self {
            enum_type: EnumType::of::<E>(),
            value: member.value(),
        }
    }

    pub fn enum_type(&self) -> EnumType {
        self.enum_type
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn name(&self) -> &'static str {
        self.enum_type.member_name(self.value).unwrap_or("?")
    }

    /// Back to the Rust enum, if this is a member of `E`.
    pub fn to<E: NdbEnum>(&self) -> Option<E> {
        if self.enum_type.is::<E>() {
            E::from_value(self.value)
        } else {
            None
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enum_type.name(), self.name())
    }
}
