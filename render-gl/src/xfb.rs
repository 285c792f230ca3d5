//! Transform feedback objects.

use ignis_render::{Error, Result};

use crate::api::{GlApi, TransformFeedbackObj};
use crate::buffer::Buffer;
use crate::state::State;

pub struct TransformFeedback {
    pub(crate) obj: TransformFeedbackObj,
    pub(crate) uid: u32,
}

impl TransformFeedback {
    pub fn new(gl: &dyn GlApi, state: &mut State, device: &mut crate::device::Device) -> TransformFeedback {
        let obj = gl.create_transform_feedback();
        state.total_transform_feedbacks += 1;
        TransformFeedback {
            obj,
            uid: device.gen_uid(),
        }
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    /// Attaches `buffer` to capture slot `index`.
    pub fn bind_buffer(
        &self,
        gl: &dyn GlApi,
        state: &State,
        index: u32,
        buffer: &Buffer,
        range: Option<(usize, usize)>,
    ) -> Result<()> {
        if index >= state.caps.max_transform_feedback_buffers {
            return Err(Error::InvalidArgument(
                "transform feedback buffer index out of range",
            ));
        }
        match range {
            Some((offset, size)) => {
                if offset + size > buffer.size() {
                    return Err(Error::InvalidArgument(
                        "transform feedback range out of bounds",
                    ));
                }
                gl.transform_feedback_buffer_range(self.obj, index, buffer.obj, offset, size);
            }
            None => gl.transform_feedback_buffer_base(self.obj, index, buffer.obj),
        }
        Ok(())
    }

    pub fn destroy(self, gl: &dyn GlApi, state: &mut State) {
        gl.delete_transform_feedback(self.obj);
        state.total_transform_feedbacks -= 1;
    }
}
