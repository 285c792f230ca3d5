//! Vertex input descriptors.
//!
//! A pipeline's vertex input is declared as a set of buffer bindings plus a
//! set of attributes referencing those bindings. The pair is also the key of
//! the VAO cache, so both structs are plain hashable values.

use crate::data::BufferDataType;

/// Rate at which a vertex buffer binding advances.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InputRate {
    PerVertex,
    /// Advance once every `divisor` instances.
    PerInstance { divisor: u32 },
}

/// One vertex buffer binding slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexBindingInfo {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: InputRate,
}

/// One vertex attribute, referencing a binding slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexAttribInfo {
    pub location: u32,
    pub binding: u32,
    pub data_type: BufferDataType,
    /// Offset of the attribute relative to the start of an element.
    pub offset: u32,
}

/// Element type of an index buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    pub fn size(self) -> usize {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}
