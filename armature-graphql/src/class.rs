// Class identity and GraphQL type references

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a resolver type.
///
/// Two references are equal when they point at the same Rust type; the
/// name is the type's declared identifier without module path or generics.
#[derive(Clone, Copy)]
pub struct ClassRef {
    id: TypeId,
    name: &'static str,
}

impl ClassRef {
    /// Reference the type `T`
    ///
    /// # Example
    ///
    /// ```
    /// use armature_graphql::ClassRef;
    ///
    /// struct Location;
    ///
    /// assert_eq!(ClassRef::of::<Location>().name(), "Location");
    /// ```
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: declared_name(std::any::type_name::<T>()),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassRef").field(&self.name).finish()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strip the module path and generic arguments from a type name.
fn declared_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// The GraphQL object type a field resolver is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A literal type name, e.g. `"User"`
    Named(String),
    /// A Rust type whose declared name is the GraphQL type name
    Class(ClassRef),
}

impl TypeRef {
    /// Reference the Rust type `T`
    pub fn class<T: 'static>() -> Self {
        Self::Class(ClassRef::of::<T>())
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Self::Class(_))
    }

    /// The resolved GraphQL type name
    pub fn type_name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Class(class) => class.name(),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<ClassRef> for TypeRef {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
