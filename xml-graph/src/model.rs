//! Dynamic object graph
//!
//! Values are either immutable basic values (numbers, strings, enum constants, ...) which are
//! always handled by value, or objects behind an `ObjectRef`. Objects are shared through the
//! handle; two handles denote the same object if they point to the same allocation, regardless of
//! the object contents.

use crate::types::TypeName;
use std::{
	borrow::Cow,
	cell::{
		Ref,
		RefCell,
		RefMut,
	},
	collections::HashMap,
	fmt,
	rc::Rc,
};

/// Constant of an enum type
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
	/// Enum type
	pub ty: TypeName,
	/// Constant name
	pub variant: Cow<'static, str>,
}

impl EnumValue {
	/// New enum constant
	pub fn new(ty: impl Into<TypeName>, variant: impl Into<Cow<'static, str>>) -> Self {
		Self {
			ty: ty.into(),
			variant: variant.into(),
		}
	}
}

/// A node of the object graph
#[derive(Clone, Debug)]
pub enum Value {
	/// Absent value
	Null,
	/// Boolean
	Bool(bool),
	/// Integer
	Int(i64),
	/// Floating point number
	Float(f64),
	/// Single character
	Char(char),
	/// String
	Str(String),
	/// Enum constant
	Enum(EnumValue),
	/// Shared, mutable object
	Object(ObjectRef),
}

impl Value {
	/// Runtime type of the value
	pub fn type_name(&self) -> TypeName {
		match self {
			Self::Null => TypeName::NULL,
			Self::Bool(_) => TypeName::BOOL,
			Self::Int(_) => TypeName::INT,
			Self::Float(_) => TypeName::FLOAT,
			Self::Char(_) => TypeName::CHAR,
			Self::Str(_) => TypeName::STRING,
			Self::Enum(e) => e.ty.clone(),
			Self::Object(o) => o.borrow().ty().clone(),
		}
	}

	/// Whether this is `Value::Null`
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Object handle if this is an object
	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			Self::Object(o) => Some(o),
			_ => None,
		}
	}

	/// String content if this is a string
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	/// Integer if this is an integer
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(i) => Some(*i),
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<char> for Value {
	fn from(v: char) -> Self {
		Self::Char(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::Str(v.into())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::Str(v)
	}
}

impl From<EnumValue> for Value {
	fn from(v: EnumValue) -> Self {
		Self::Enum(v)
	}
}

impl From<ObjectRef> for Value {
	fn from(v: ObjectRef) -> Self {
		Self::Object(v)
	}
}

impl From<&ObjectRef> for Value {
	fn from(v: &ObjectRef) -> Self {
		Self::Object(v.clone())
	}
}

/// Content of an object
#[derive(Clone, Debug)]
pub enum ObjectData {
	/// Named fields
	Fields(Vec<(String, Value)>),
	/// Collection items
	Items(Vec<Value>),
	/// Map entries
	Entries(Vec<(Value, Value)>),
}

/// Object of some runtime type
#[derive(Clone, Debug)]
pub struct Object {
	ty: TypeName,
	data: ObjectData,
}

impl Object {
	/// New object
	pub fn new(ty: impl Into<TypeName>, data: ObjectData) -> Self {
		Self { ty: ty.into(), data }
	}

	/// Runtime type
	pub fn ty(&self) -> &TypeName {
		&self.ty
	}

	/// Content
	pub fn data(&self) -> &ObjectData {
		&self.data
	}

	/// Mutable content
	pub fn data_mut(&mut self) -> &mut ObjectData {
		&mut self.data
	}

	/// Field value; `None` if not set or not a struct object.
	pub fn field(&self, name: &str) -> Option<&Value> {
		match &self.data {
			ObjectData::Fields(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
			_ => None,
		}
	}

	/// Set a field, replacing an existing value
	///
	/// Does nothing for non-struct objects.
	pub fn set_field(&mut self, name: &str, value: Value) {
		if let ObjectData::Fields(fields) = &mut self.data {
			match fields.iter_mut().find(|(n, _)| n == name) {
				Some((_, v)) => *v = value,
				None => fields.push((name.to_owned(), value)),
			}
		}
	}

	/// Collection items; empty for other objects
	pub fn items(&self) -> &[Value] {
		match &self.data {
			ObjectData::Items(items) => items,
			_ => &[],
		}
	}

	/// Append collection item
	pub fn push_item(&mut self, value: Value) {
		if let ObjectData::Items(items) = &mut self.data {
			items.push(value);
		}
	}

	/// Map entries; empty for other objects
	pub fn entries(&self) -> &[(Value, Value)] {
		match &self.data {
			ObjectData::Entries(entries) => entries,
			_ => &[],
		}
	}

	/// Append map entry
	pub fn push_entry(&mut self, key: Value, value: Value) {
		if let ObjectData::Entries(entries) = &mut self.data {
			entries.push((key, value));
		}
	}
}

/// Shared handle to an object; identity is the allocation.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
	/// Wrap a new object
	pub fn new(object: Object) -> Self {
		Self(Rc::new(RefCell::new(object)))
	}

	/// Struct object with the given fields
	pub fn structure<I, N>(ty: impl Into<TypeName>, fields: I) -> Self
	where
		I: IntoIterator<Item = (N, Value)>,
		N: Into<String>,
	{
		let fields = fields.into_iter().map(|(n, v)| (n.into(), v)).collect();
		Self::new(Object::new(ty, ObjectData::Fields(fields)))
	}

	/// Collection object
	pub fn collection(ty: impl Into<TypeName>, items: impl IntoIterator<Item = Value>) -> Self {
		Self::new(Object::new(ty, ObjectData::Items(items.into_iter().collect())))
	}

	/// Map object
	pub fn map(ty: impl Into<TypeName>, entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
		Self::new(Object::new(ty, ObjectData::Entries(entries.into_iter().collect())))
	}

	/// Immutable access
	///
	/// Panics if the object is currently borrowed mutably.
	pub fn borrow(&self) -> Ref<'_, Object> {
		self.0.borrow()
	}

	/// Mutable access
	///
	/// Panics if the object is currently borrowed.
	pub fn borrow_mut(&self) -> RefMut<'_, Object> {
		self.0.borrow_mut()
	}

	/// Whether both handles denote the same object
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Identity key; only stable while a handle to the object is alive.
	pub fn identity(&self) -> usize {
		Rc::as_ptr(&self.0) as *const () as usize
	}
}

impl fmt::Debug for ObjectRef {
	// contents might be cyclic
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0.try_borrow() {
			Ok(o) => write!(f, "ObjectRef({} @ {:#x})", o.ty(), self.identity()),
			Err(_) => write!(f, "ObjectRef(<borrowed> @ {:#x})", self.identity()),
		}
	}
}

/// Identity-preserving structural equality
///
/// Two graphs are isomorphic if there is a one-to-one mapping between their objects under which
/// all types and contents compare equal: shared objects must be shared in both graphs, cycles must
/// be cycles in both. Struct fields holding `Null` count as unset.
pub fn isomorphic(a: &Value, b: &Value) -> bool {
	Isomorphism::default().values(a, b)
}

#[derive(Default)]
struct Isomorphism {
	forward: HashMap<usize, usize>,
	backward: HashMap<usize, usize>,
}

impl Isomorphism {
	fn values(&mut self, a: &Value, b: &Value) -> bool {
		match (a, b) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
			(Value::Char(a), Value::Char(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::Enum(a), Value::Enum(b)) => a == b,
			(Value::Object(a), Value::Object(b)) => self.objects(a, b),
			_ => false,
		}
	}

	fn objects(&mut self, a: &ObjectRef, b: &ObjectRef) -> bool {
		let (ia, ib) = (a.identity(), b.identity());
		match (self.forward.get(&ia), self.backward.get(&ib)) {
			(Some(&mapped), _) => return mapped == ib,
			(None, Some(_)) => return false,
			(None, None) => (),
		}
		self.forward.insert(ia, ib);
		self.backward.insert(ib, ia);

		let (a, b) = (a.borrow(), b.borrow());
		if a.ty() != b.ty() {
			return false;
		}
		match (a.data(), b.data()) {
			// a null field is the same as a missing one
			(ObjectData::Fields(fa), ObjectData::Fields(fb)) => {
				let count = |fields: &[(String, Value)]| fields.iter().filter(|(_, v)| !v.is_null()).count();
				count(fa.as_slice()) == count(fb.as_slice())
					&& fa
						.iter()
						.filter(|(_, va)| !va.is_null())
						.all(|(name, va)| match b.field(name) {
							Some(vb) => self.values(va, vb),
							None => false,
						})
			},
			(ObjectData::Items(xa), ObjectData::Items(xb)) => {
				xa.len() == xb.len() && xa.iter().zip(xb).all(|(va, vb)| self.values(va, vb))
			},
			(ObjectData::Entries(ea), ObjectData::Entries(eb)) => {
				ea.len() == eb.len()
					&& ea
						.iter()
						.zip(eb)
						.all(|((ka, va), (kb, vb))| self.values(ka, kb) && self.values(va, vb))
			},
			_ => false,
		}
	}
}
