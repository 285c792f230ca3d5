//! Query pools.

use log::error;

use ignis_render::{Error, QueryResultFlags, QueryTarget, Result};

use crate::api::{GlApi, QueryObj};
use crate::state::State;

/// A pool of query objects sharing one target.
pub struct QueryPool {
    target: QueryTarget,
    objs: Vec<QueryObj>,
}

impl QueryPool {
    pub fn new(
        gl: &dyn GlApi,
        state: &mut State,
        target: QueryTarget,
        pool_size: u32,
    ) -> Result<QueryPool> {
        if pool_size == 0 {
            return Err(Error::InvalidArgument("query pool needs at least one query"));
        }
        let objs = (0..pool_size).map(|_| gl.create_query(target)).collect();
        state.total_query_pools += 1;
        Ok(QueryPool { target, objs })
    }

    pub fn target(&self) -> QueryTarget {
        self.target
    }

    pub fn len(&self) -> usize {
        self.objs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objs.is_empty()
    }

    pub(crate) fn obj(&self, index: u32) -> Result<QueryObj> {
        self.objs.get(index as usize).copied().ok_or_else(|| {
            error!("query index {} out of range ({})", index, self.objs.len());
            Error::InvalidArgument("query index out of range")
        })
    }

    /// Host readback of `count` results starting at `first`.
    ///
    /// Results are written at multiples of `stride`, 32- or 64-bit wide per
    /// the flags; with availability requested, the availability word
    /// follows each result at the same width. A timed-out (not yet
    /// available) no-wait query leaves its slot untouched; that is not an
    /// error.
    pub fn get_results(
        &self,
        gl: &dyn GlApi,
        first: u32,
        count: u32,
        out: &mut [u8],
        stride: usize,
        flags: QueryResultFlags,
    ) -> Result<()> {
        let word = if flags.contains(QueryResultFlags::RESULT_64) {
            8
        } else {
            4
        };
        let per_query = if flags.contains(QueryResultFlags::WITH_AVAILABILITY) {
            word * 2
        } else {
            word
        };
        if stride < per_query || stride % word != 0 {
            error!("query result stride {} misaligned", stride);
            return Err(Error::InvalidArgument("misaligned query result stride"));
        }
        if first as usize + count as usize > self.objs.len() {
            return Err(Error::InvalidArgument("query range out of bounds"));
        }
        if out.len() < stride * count as usize {
            return Err(Error::InvalidArgument("query result buffer too small"));
        }

        let wait = flags.contains(QueryResultFlags::WAIT);
        for i in 0..count as usize {
            let obj = self.objs[first as usize + i];
            let available = wait || gl.get_query_available(obj);
            let base = i * stride;
            if available {
                let value = gl.get_query_result_u64(obj, wait);
                write_word(&mut out[base..], value, word);
            }
            if flags.contains(QueryResultFlags::WITH_AVAILABILITY) {
                write_word(&mut out[base + word..], available as u64, word);
            }
        }
        Ok(())
    }

    pub fn destroy(self, gl: &dyn GlApi, state: &mut State) {
        for obj in self.objs {
            gl.delete_query(obj);
        }
        state.total_query_pools -= 1;
    }
}

fn write_word(out: &mut [u8], value: u64, word: usize) {
    if word == 8 {
        out[..8].copy_from_slice(&value.to_le_bytes());
    } else {
        out[..4].copy_from_slice(&(value as u32).to_le_bytes());
    }
}
