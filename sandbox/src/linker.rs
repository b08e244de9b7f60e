//! Host function registration via Wasmtime linker.
//!
//! Registers the eth2 shard-execution ABI across three namespaces:
//!
//! - `env` — block data, state roots, `debug_printMemHex`, and the bignum stubs
//! - `ewasm` — modular-arithmetic and bignum-stack stubs
//! - `ethereum` — `finish`
//!
//! Memory-touching functions lease guest memory for the call, delegate to
//! the `ShardHostApi` implementation on `HostContext`, and turn a `HostError`
//! into a trap. The stubs do nothing: they exist so that guests built against
//! an interpreter with native bignum opcodes still link.

use log::debug;
use wasmtime::{Caller, Linker};

use scout_hostapi::{hex, types::*, ShardHostApi};

use crate::error::HarnessError;
use crate::host_impl::HostContext;
use crate::memory::lease;

/// Register every statically known host function with the linker.
pub fn register_host_functions(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    register_debug_print_mem_hex(linker)?;
    register_load_pre_state_root(linker)?;
    register_save_post_state_root(linker)?;
    register_block_data_size(linker)?;
    register_block_data_copy(linker)?;
    register_bignum_stubs(linker)?;
    register_ewasm_stubs(linker)?;
    register_ethereum_finish(linker)?;
    Ok(())
}

// ── Debug ──

fn register_debug_print_mem_hex(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    linker.func_wrap(
        ENV_NAMESPACE,
        DEBUG_PRINT_MEM_HEX,
        |mut caller: Caller<'_, HostContext>, offset: i32, len: i32| -> anyhow::Result<()> {
            let (mem, host) = lease(&mut caller)?;
            host.record_call(DEBUG_PRINT_MEM_HEX, &[offset, len]);
            let rendered = host.debug_print_mem_hex(mem.bytes(), offset as u32, len as u32);
            println!("debug_printMemHex mem_pos: {} {}", offset as u32, rendered);
            Ok(())
        },
    )?;
    Ok(())
}

// ── State roots ──

fn register_load_pre_state_root(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    linker.func_wrap(
        ENV_NAMESPACE,
        LOAD_PRE_STATE_ROOT,
        |mut caller: Caller<'_, HostContext>, out_offset: i32| -> anyhow::Result<()> {
            let (mut mem, host) = lease(&mut caller)?;
            host.record_call(LOAD_PRE_STATE_ROOT, &[out_offset]);
            host.load_pre_state_root(mem.bytes_mut(), out_offset as u32)?;
            Ok(())
        },
    )?;
    Ok(())
}

fn register_save_post_state_root(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    linker.func_wrap(
        ENV_NAMESPACE,
        SAVE_POST_STATE_ROOT,
        |mut caller: Caller<'_, HostContext>, in_offset: i32| -> anyhow::Result<()> {
            let (mem, host) = lease(&mut caller)?;
            host.record_call(SAVE_POST_STATE_ROOT, &[in_offset]);
            let root = host.save_post_state_root(mem.bytes(), in_offset as u32)?;
            println!("{}: {}", SAVE_POST_STATE_ROOT, hex::encode(&root));
            Ok(())
        },
    )?;
    Ok(())
}

// ── Block data ──

fn register_block_data_size(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    linker.func_wrap(
        ENV_NAMESPACE,
        BLOCK_DATA_SIZE,
        |mut caller: Caller<'_, HostContext>| -> i32 {
            let host = caller.data_mut();
            host.record_call(BLOCK_DATA_SIZE, &[]);
            host.block_data_size() as i32
        },
    )?;
    Ok(())
}

fn register_block_data_copy(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    linker.func_wrap(
        ENV_NAMESPACE,
        BLOCK_DATA_COPY,
        |mut caller: Caller<'_, HostContext>,
         out_offset: i32,
         src_offset: i32,
         length: i32|
         -> anyhow::Result<()> {
            let (mut mem, host) = lease(&mut caller)?;
            host.record_call(BLOCK_DATA_COPY, &[out_offset, src_offset, length]);
            host.block_data_copy(
                mem.bytes_mut(),
                out_offset as u32,
                src_offset as u32,
                length as u32,
            )?;
            Ok(())
        },
    )?;
    Ok(())
}

// ── Arithmetic stubs ──

/// `env.bignum_*` imports taking three operand pointers.
const BIGNUM_TERNARY: &[&str] = &[
    "bignum_f1m_mul",
    "bignum_f1m_add",
    "bignum_f1m_sub",
    "bignum_frm_mul",
    "bignum_frm_add",
    "bignum_frm_sub",
    "bignum_int_mul",
];

/// `env.bignum_*` imports taking an input and an output pointer.
const BIGNUM_UNARY: &[&str] = &[
    "bignum_f1m_square",
    "bignum_f1m_toMontgomery",
    "bignum_f1m_fromMontgomery",
    "bignum_frm_square",
    "bignum_frm_toMontgomery",
    "bignum_frm_fromMontgomery",
];

/// `env.bignum_*` imports returning a carry/borrow flag.
const BIGNUM_WITH_CARRY: &[&str] = &["bignum_int_add", "bignum_int_sub"];

/// `ewasm` imports taking three pointers.
const EWASM_STUBS: &[&str] = &["addmodbn", "submodbn", "mulmodmontbn", "debugPrint"];

fn register_bignum_stubs(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    for name in BIGNUM_TERNARY {
        linker.func_wrap(ENV_NAMESPACE, name, |_: i32, _: i32, _: i32| {})?;
    }
    for name in BIGNUM_UNARY {
        linker.func_wrap(ENV_NAMESPACE, name, |_: i32, _: i32| {})?;
    }
    for name in BIGNUM_WITH_CARRY {
        linker.func_wrap(ENV_NAMESPACE, name, |_: i32, _: i32, _: i32| -> i32 { 0 })?;
    }
    linker.func_wrap(ENV_NAMESPACE, "bignum_int_div", |_: i32, _: i32, _: i32, _: i32| {})?;
    debug!(
        "registered {} bignum stubs in '{}'",
        BIGNUM_TERNARY.len() + BIGNUM_UNARY.len() + BIGNUM_WITH_CARRY.len() + 1,
        ENV_NAMESPACE
    );
    Ok(())
}

fn register_ewasm_stubs(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    for name in EWASM_STUBS {
        linker.func_wrap(EWASM_NAMESPACE, name, |_: i32, _: i32, _: i32| {})?;
    }
    linker.func_wrap(EWASM_NAMESPACE, "setBignumStack", |_: i32| {})?;
    Ok(())
}

fn register_ethereum_finish(linker: &mut Linker<HostContext>) -> Result<(), HarnessError> {
    linker.func_wrap(ETHEREUM_NAMESPACE, "finish", |_: i32, _: i32| {})?;
    Ok(())
}
