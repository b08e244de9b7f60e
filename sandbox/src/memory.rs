//! Call-scoped access to guest linear memory.
//!
//! A host function gets at guest memory only through [`lease`], which splits
//! the `Caller` into the memory bytes and the host context. Both borrows are
//! tied to the `&mut Caller` of the current call, so neither can be stored
//! past its return.

use wasmtime::{Caller, Memory};

use scout_hostapi::HostError;

use crate::host_impl::HostContext;

/// Borrowed view of guest memory, valid for one host call.
pub struct GuestMemory<'a> {
    bytes: &'a mut [u8],
}

impl<'a> GuestMemory<'a> {
    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }
}

/// Get the guest's exported memory from a Caller.
fn get_memory(caller: &mut Caller<'_, HostContext>) -> Option<Memory> {
    caller.get_export("memory").and_then(|e| e.into_memory())
}

/// Lease guest memory and the host context for the duration of one call.
pub fn lease<'a>(
    caller: &'a mut Caller<'_, HostContext>,
) -> Result<(GuestMemory<'a>, &'a mut HostContext), HostError> {
    let memory = get_memory(caller).ok_or(HostError::MissingMemory)?;
    let (bytes, host) = memory.data_and_store_mut(caller);
    Ok((GuestMemory { bytes }, host))
}
