//! Buffer storage descriptors and mapping contracts.

use bitflags::bitflags;

bitflags! {
    /// Flag set of an immutable buffer storage allocation.
    pub struct BufferStorageFlags: u8 {
        const MAP_READ = 0b0000_0001;
        const MAP_WRITE = 0b0000_0010;
        const MAP_PERSISTENT = 0b0000_0100;
        const MAP_COHERENT = 0b0000_1000;
        const DYNAMIC_STORAGE = 0b0001_0000;
        const CLIENT_STORAGE = 0b0010_0000;
    }
}

/// Client access hint of a mutable buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MutableAccess {
    WriteOnly,
    ReadOnly,
    NoTransfer,
}

/// Update frequency hint of a mutable buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MutableUsage {
    Static,
    Dynamic,
    Stream,
}

/// Storage class of a buffer.
///
/// Immutable buffers are allocated once with a fixed flag set and reject
/// `realloc` and `orphan`; mutable buffers carry a usage hint pair instead.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Immutable(BufferStorageFlags),
    Mutable {
        access: MutableAccess,
        usage: MutableUsage,
    },
}

impl BufferKind {
    pub fn is_immutable(&self) -> bool {
        matches!(self, BufferKind::Immutable(_))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BufferDesc {
    pub size: usize,
    pub kind: BufferKind,
}

impl BufferDesc {
    pub fn immutable(size: usize, flags: BufferStorageFlags) -> BufferDesc {
        BufferDesc {
            size,
            kind: BufferKind::Immutable(flags),
        }
    }

    pub fn mutable(size: usize, access: MutableAccess, usage: MutableUsage) -> BufferDesc {
        BufferDesc {
            size,
            kind: BufferKind::Mutable { access, usage },
        }
    }
}

/// Transfer direction of a mapping.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MapTransfer {
    Read,
    Write,
    ReadWrite,
}

impl MapTransfer {
    pub fn includes_read(self) -> bool {
        matches!(self, MapTransfer::Read | MapTransfer::ReadWrite)
    }
}

/// Invalidation request attached to a mapping. Rejected when the transfer
/// includes reads.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MapInvalidate {
    None,
    Range,
    EntireBuffer,
}

/// Persistence of a mapping across GPU consumption.
///
/// A non-coherent persistent mapping requires an explicit flush before the
/// GPU reads the written range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MapPersistence {
    None,
    Coherent,
    Incoherent,
}
