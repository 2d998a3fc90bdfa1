//! Graph walks: marshalling and unmarshalling contexts and reference tracking

mod marshal;
mod references;
mod unmarshal;

pub use self::{
	marshal::MarshallingContext,
	references::ReferenceMode,
	unmarshal::UnmarshallingContext,
};
