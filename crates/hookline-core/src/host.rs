//! Non-owning references to entities managed by the host environment.
//!
//! Variants can point at host types and host objects, but never own them.
//! A reference stays valid only as long as the host keeps the entity alive;
//! once the host drops it the reference reads as absent.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

/// An entity owned by the host environment.
pub trait HostEntity: Send + Sync + 'static {
    /// Fully qualified name, used when rendering debug output.
    fn full_name(&self) -> String;
}

/// A weak handle to a [`HostEntity`].
///
/// The default handle is empty, which is the "absent reference" value.
#[derive(Clone, Default)]
pub struct HostRef(Option<Weak<dyn HostEntity>>);

impl HostRef {
    /// Create a handle pointing at a host entity.
    pub fn new<T: HostEntity>(entity: &Arc<T>) -> Self {
        let weak: Weak<T> = Arc::downgrade(entity);
        Self(Some(weak))
    }

    /// Create an empty handle.
    pub fn none() -> Self {
        Self(None)
    }

    /// Check if this handle was never pointed at anything.
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Check if the handle points at an entity the host has since dropped.
    pub fn is_released(&self) -> bool {
        self.0.as_ref().is_some_and(|weak| weak.strong_count() == 0)
    }

    /// Get the entity if it is still alive.
    pub fn get(&self) -> Option<Arc<dyn HostEntity>> {
        self.0.as_ref().and_then(Weak::upgrade)
    }

    /// Get the entity's full name if it is still alive.
    pub fn full_name(&self) -> Option<String> {
        self.get().map(|entity| entity.full_name())
    }

    /// Name used in debug strings; absent and released handles render as `None`.
    pub(crate) fn display_name(&self) -> String {
        self.full_name().unwrap_or_else(|| "None".to_string())
    }
}

impl From<&Arc<dyn HostEntity>> for HostRef {
    fn from(entity: &Arc<dyn HostEntity>) -> Self {
        Self(Some(Arc::downgrade(entity)))
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "HostRef(None)"),
            Some(_) => match self.full_name() {
                Some(name) => write!(f, "HostRef({name})"),
                None => write!(f, "HostRef(<released>)"),
            },
        }
    }
}

macro_rules! host_ref_kind {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name(HostRef);

        impl $name {
            /// Create a reference to a host entity.
            pub fn new<T: HostEntity>(entity: &Arc<T>) -> Self {
                Self(HostRef::new(entity))
            }

            /// Create an absent reference.
            pub fn none() -> Self {
                Self(HostRef::none())
            }

            /// Get the underlying handle.
            pub fn handle(&self) -> &HostRef {
                &self.0
            }
        }

        impl From<HostRef> for $name {
            fn from(handle: HostRef) -> Self {
                Self(handle)
            }
        }

        impl Deref for $name {
            type Target = HostRef;

            fn deref(&self) -> &HostRef {
                &self.0
            }
        }
    };
}

host_ref_kind!(
    /// Reference to a host type (a class, blueprint or schema the host owns).
    TypeRef
);

host_ref_kind!(
    /// Reference to a host object instance.
    ObjectRef
);
