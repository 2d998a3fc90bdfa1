//! Security gate deciding which types may be created from input
//!
//! Unmarshalling untrusted input must not create arbitrary types. Every type resolved while
//! reading is checked against the configured permissions before anything else happens with it:
//! a single matching deny rejects the type, otherwise at least one allow must match.

mod permissions;

pub use self::permissions::{
	AbstractTypePermission,
	AnyTypePermission,
	ExplicitTypePermission,
	NullPermission,
	PrimitiveTypePermission,
	RegexTypePermission,
	TypeHierarchyPermission,
	WildcardTypePermission,
};

use crate::{
	errors,
	types::{
		TypeName,
		TypeRegistry,
	},
	Result,
};

/// Predicate on types
pub trait TypePermission: Send + Sync {
	/// Whether the permission matches the type
	fn allows(&self, ty: &TypeName, types: &TypeRegistry) -> bool;
}

impl<F> TypePermission for F
where
	F: Fn(&TypeName) -> bool + Send + Sync,
{
	fn allows(&self, ty: &TypeName, _types: &TypeRegistry) -> bool {
		self(ty)
	}
}

/// Allow and deny lists; rejects everything not explicitly allowed
#[derive(Default)]
pub struct Permissions {
	allow: Vec<Box<dyn TypePermission>>,
	deny: Vec<Box<dyn TypePermission>>,
}

impl Permissions {
	/// Permissions rejecting every type
	pub fn new() -> Self {
		Self::default()
	}

	/// Accept types matching `permission` (unless denied)
	pub fn allow(&mut self, permission: impl TypePermission + 'static) {
		self.allow.push(Box::new(permission));
	}

	/// Reject types matching `permission`, regardless of any allow
	pub fn deny(&mut self, permission: impl TypePermission + 'static) {
		self.deny.push(Box::new(permission));
	}

	/// Drop all allows and denies
	pub fn clear(&mut self) {
		self.allow.clear();
		self.deny.clear();
	}

	/// Whether the type may be created
	pub fn is_allowed(&self, ty: &TypeName, types: &TypeRegistry) -> bool {
		!self.deny.iter().any(|p| p.allows(ty, types)) && self.allow.iter().any(|p| p.allows(ty, types))
	}

	/// Fail with `Forbidden` unless the type may be created
	pub fn check(&self, ty: &TypeName, types: &TypeRegistry) -> Result<()> {
		if self.deny.iter().any(|p| p.allows(ty, types)) {
			tracing::warn!(%ty, "type explicitly denied");
			return Err(errors::forbidden(ty));
		}
		if self.allow.iter().any(|p| p.allows(ty, types)) {
			return Ok(());
		}
		tracing::warn!(%ty, "type not allowed");
		Err(errors::forbidden(ty))
	}
}
