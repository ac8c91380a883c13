#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod error;
pub mod non_error;
pub mod serialize;
pub mod transcribe;
pub mod types;
pub mod value;

pub use error::Error;
pub use non_error::NonError;
pub use serialize::{
    deserialize_error, deserialize_error_from_json, serialize_error, serialize_error_to_json,
};
pub use transcribe::HookContext;
pub use transcribe::classify::Capability;
pub use types::{BUFFER_MARKER, CIRCULAR_MARKER, CommonField, Options, STREAM_MARKER};
pub use value::{Function, ObjectRef, SerializeHook, Value};
