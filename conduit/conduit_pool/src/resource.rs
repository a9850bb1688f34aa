//! Collaborator traits and connection parameters.
//!
//! The pool never opens connections itself. It asks a [`ResourceFactory`]
//! for new resources and hands them out wrapped in [`Pooled`] handles.

use std::fmt;
use std::ops::{Deref, DerefMut};
use uuid::Uuid;

/// A resource that can be kept in a pool
pub trait Resource: Send + 'static {
    /// Error reported when closing fails
    type Error: std::error::Error + Send + Sync + 'static;

    /// Close the underlying connection
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// Creates new resources from connection parameters
pub trait ResourceFactory: Send + Sync + 'static {
    /// The resource type produced by this factory
    type Resource: Resource;

    /// Error reported when a resource cannot be created
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a new resource against `endpoint`
    fn create(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> Result<Self::Resource, Self::Error>;
}

/// Address of the backing service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from an address string
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as given
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Endpoint {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// User name and password presented to the backing service
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// The user name
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The password
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identifier assigned to every resource a pool creates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Create a new random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resource together with the identity the pool tracks it by.
///
/// Dereferences to the resource so callers can use it directly.
pub struct Pooled<R> {
    id: ResourceId,
    resource: R,
}

impl<R> Pooled<R> {
    /// Wrap a resource under a fresh identifier
    pub fn new(resource: R) -> Self {
        Self {
            id: ResourceId::new(),
            resource,
        }
    }

    /// Identifier of this resource
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Take the resource out of the handle
    pub fn into_inner(self) -> R {
        self.resource
    }
}

impl<R: Resource> Pooled<R> {
    /// Close the resource, giving it up for good
    pub fn close(mut self) -> Result<(), R::Error> {
        self.resource.close()
    }
}

impl<R> Deref for Pooled<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.resource
    }
}

impl<R> DerefMut for Pooled<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.resource
    }
}

impl<R: fmt::Debug> fmt::Debug for Pooled<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .finish()
    }
}
