//! Buffer objects.

use log::error;

use ignis_render::{
    BufferDesc, BufferKind, BufferStorageFlags, Error, MapInvalidate, MapPersistence, MapTransfer,
    Result,
};

use crate::api::{BufferObj, BufferParameter, GlApi, MapAccessFlags};
use crate::device::Device;

/// Linear GPU memory.
///
/// Immutable buffers are backed by fixed storage and reject reallocation
/// and orphaning; mutable buffers may be re-specified at any time. A buffer
/// has at most one active mapping.
pub struct Buffer {
    pub(crate) obj: BufferObj,
    pub(crate) uid: u32,
    desc: BufferDesc,
    mapped: bool,
}

impl Buffer {
    pub fn new(
        gl: &dyn GlApi,
        device: &mut Device,
        desc: BufferDesc,
        initial_data: Option<&[u8]>,
    ) -> Result<Buffer> {
        if let Some(data) = initial_data {
            if data.len() != desc.size {
                error!(
                    "buffer initial data size {} does not match allocation size {}",
                    data.len(),
                    desc.size
                );
                return Err(Error::InvalidArgument(
                    "initial data size does not match buffer size",
                ));
            }
        }

        let obj = gl.create_buffer();
        match desc.kind {
            BufferKind::Immutable(flags) => {
                gl.named_buffer_storage(obj, desc.size, initial_data, flags)
            }
            BufferKind::Mutable { access, usage } => {
                gl.named_buffer_data(obj, desc.size, initial_data, access, usage)
            }
        }

        // read the allocation back; a short size means the driver ran out
        // of memory without raising an error
        let allocated = gl.get_named_buffer_parameter_i64(obj, BufferParameter::Size);
        if allocated != desc.size as i64 {
            gl.delete_buffer(obj);
            error!(
                "buffer allocation came back with {} bytes, requested {}",
                allocated, desc.size
            );
            return Err(Error::AllocationFailed);
        }

        device.total_buffers += 1;
        device.buffer_memory += desc.size;

        Ok(Buffer {
            obj,
            uid: device.gen_uid(),
            desc,
            mapped: false,
        })
    }

    pub fn size(&self) -> usize {
        self.desc.size
    }

    pub fn kind(&self) -> BufferKind {
        self.desc.kind
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    /// The backend object name, for interop and inspection.
    pub fn gl_handle(&self) -> BufferObj {
        self.obj
    }

    fn storage_flags(&self) -> BufferStorageFlags {
        match self.desc.kind {
            BufferKind::Immutable(flags) => flags,
            BufferKind::Mutable { .. } => {
                BufferStorageFlags::MAP_READ
                    | BufferStorageFlags::MAP_WRITE
                    | BufferStorageFlags::DYNAMIC_STORAGE
            }
        }
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        if offset.checked_add(len).map_or(true, |end| end > self.desc.size) {
            error!(
                "buffer range {}..{} out of bounds (size {})",
                offset,
                offset + len,
                self.desc.size
            );
            return Err(Error::InvalidArgument("buffer range out of bounds"));
        }
        Ok(())
    }

    /// Uploads `data` at `offset`. Immutable buffers must carry the
    /// dynamic-storage flag.
    pub fn write(&self, gl: &dyn GlApi, offset: usize, data: &[u8]) -> Result<()> {
        self.check_range(offset, data.len())?;
        if !self
            .storage_flags()
            .contains(BufferStorageFlags::DYNAMIC_STORAGE)
        {
            error!("write to immutable buffer without dynamic-storage flag");
            return Err(Error::InvalidArgument(
                "buffer storage does not allow client writes",
            ));
        }
        gl.named_buffer_sub_data(self.obj, offset, data);
        Ok(())
    }

    /// Blocking readback of `out.len()` bytes starting at `offset`.
    pub fn read(&self, gl: &dyn GlApi, offset: usize, out: &mut [u8]) -> Result<()> {
        self.check_range(offset, out.len())?;
        gl.get_named_buffer_sub_data(self.obj, offset, out);
        Ok(())
    }

    /// Re-specifies the storage of a mutable buffer.
    pub fn realloc(&mut self, gl: &dyn GlApi, device: &mut Device, size: usize, data: Option<&[u8]>) -> Result<()> {
        let (access, usage) = match self.desc.kind {
            BufferKind::Immutable(_) => {
                error!("realloc on immutable buffer");
                return Err(Error::InvalidArgument("immutable buffers cannot realloc"));
            }
            BufferKind::Mutable { access, usage } => (access, usage),
        };
        if self.mapped {
            return Err(Error::InvalidArgument("buffer is mapped"));
        }
        gl.named_buffer_data(self.obj, size, data, access, usage);
        device.buffer_memory = device.buffer_memory - self.desc.size + size;
        self.desc.size = size;
        Ok(())
    }

    /// Orphans the data store of a mutable buffer, detaching pending GPU
    /// reads from future writes.
    pub fn orphan(&self, gl: &dyn GlApi) -> Result<()> {
        match self.desc.kind {
            BufferKind::Immutable(_) => {
                error!("orphan on immutable buffer");
                Err(Error::InvalidArgument("immutable buffers cannot orphan"))
            }
            BufferKind::Mutable { access, usage } => {
                gl.named_buffer_data(self.obj, self.desc.size, None, access, usage);
                Ok(())
            }
        }
    }

    /// Maps `len` bytes at `offset` and returns the client pointer.
    ///
    /// Contract checks: the transfer direction must be permitted by the
    /// storage flags, invalidation is rejected for reading transfers, and
    /// persistence requires persistent storage. Unsynchronized mappings
    /// disable the driver's pending-operation barrier; overlapping writes
    /// become the caller's problem.
    pub fn map(
        &mut self,
        gl: &dyn GlApi,
        offset: usize,
        len: usize,
        transfer: MapTransfer,
        invalidate: MapInvalidate,
        persistence: MapPersistence,
        flush_explicit: bool,
        unsynchronized: bool,
    ) -> Result<*mut u8> {
        self.check_range(offset, len)?;
        if self.mapped {
            error!("buffer is already mapped");
            return Err(Error::InvalidArgument("buffer is already mapped"));
        }

        let storage = self.storage_flags();
        let mut access = MapAccessFlags::empty();
        match transfer {
            MapTransfer::Read => access |= MapAccessFlags::READ,
            MapTransfer::Write => access |= MapAccessFlags::WRITE,
            MapTransfer::ReadWrite => access |= MapAccessFlags::READ | MapAccessFlags::WRITE,
        }
        if transfer.includes_read() && !storage.contains(BufferStorageFlags::MAP_READ) {
            return Err(Error::InvalidArgument("storage does not allow map reads"));
        }
        if !transfer.includes_read() && !storage.contains(BufferStorageFlags::MAP_WRITE) {
            return Err(Error::InvalidArgument("storage does not allow map writes"));
        }

        match invalidate {
            MapInvalidate::None => {}
            MapInvalidate::Range | MapInvalidate::EntireBuffer => {
                if transfer.includes_read() {
                    error!("mapping requests invalidation together with reads");
                    return Err(Error::InvalidArgument(
                        "cannot invalidate a mapping that reads",
                    ));
                }
                access |= match invalidate {
                    MapInvalidate::Range => MapAccessFlags::INVALIDATE_RANGE,
                    _ => MapAccessFlags::INVALIDATE_BUFFER,
                };
            }
        }

        match persistence {
            MapPersistence::None => {}
            MapPersistence::Coherent | MapPersistence::Incoherent => {
                if !storage.contains(BufferStorageFlags::MAP_PERSISTENT) {
                    return Err(Error::InvalidArgument(
                        "storage does not allow persistent mappings",
                    ));
                }
                access |= MapAccessFlags::PERSISTENT;
                if persistence == MapPersistence::Coherent {
                    access |= MapAccessFlags::COHERENT;
                }
            }
        }

        if flush_explicit {
            access |= MapAccessFlags::FLUSH_EXPLICIT;
        }
        if unsynchronized {
            access |= MapAccessFlags::UNSYNCHRONIZED;
        }

        let ptr = gl.map_named_buffer_range(self.obj, offset, len, access);
        if ptr.is_null() {
            return Err(Error::AllocationFailed);
        }
        self.mapped = true;
        Ok(ptr)
    }

    pub fn unmap(&mut self, gl: &dyn GlApi) -> Result<()> {
        if !self.mapped {
            return Err(Error::InvalidArgument("buffer is not mapped"));
        }
        self.mapped = false;
        if gl.unmap_named_buffer(self.obj) {
            Ok(())
        } else {
            // contents became undefined (e.g. the backing store was lost)
            Err(Error::AllocationFailed)
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// Makes the written range of a flush-explicit mapping visible to the
    /// GPU.
    pub fn flush_mapped_range(&self, gl: &dyn GlApi, offset: usize, len: usize) -> Result<()> {
        self.check_range(offset, len)?;
        if !self.mapped {
            return Err(Error::InvalidArgument("buffer is not mapped"));
        }
        gl.flush_mapped_named_buffer_range(self.obj, offset, len);
        Ok(())
    }

    /// Invalidates the whole store, or a sub-range.
    pub fn invalidate(&self, gl: &dyn GlApi, range: Option<(usize, usize)>) -> Result<()> {
        match range {
            Some((offset, len)) => {
                self.check_range(offset, len)?;
                gl.invalidate_buffer_sub_data(self.obj, offset, len);
            }
            None => gl.invalidate_buffer_data(self.obj),
        }
        Ok(())
    }

    pub fn destroy(self, gl: &dyn GlApi, device: &mut Device) {
        gl.delete_buffer(self.obj);
        device.total_buffers -= 1;
        device.buffer_memory -= self.desc.size;
    }
}
