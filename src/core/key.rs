//! Key validation for dynamically typed callers.
//!
//! The typed filter API takes `K: AsRef<[u8]>`, so the compiler already
//! rejects keys that are neither text nor bytes. Callers that route keys
//! through `dyn Any` (plugin hosts, scripting bridges, generic caches) go
//! through [`key_bytes`], which accepts the same set of types at runtime and
//! reports everything else as [`CountBloomError::InvalidKeyType`].

use crate::error::{CountBloomError, Result};
use std::any::Any;

/// View a dynamically typed key as bytes.
///
/// Accepted: `String`, `&'static str`, `Box<str>`, `Vec<u8>`,
/// `&'static [u8]` and `Box<[u8]>`.
///
/// # Errors
///
/// [`CountBloomError::InvalidKeyType`] for any other type. The error carries a
/// type name only when it can be recovered from `dyn Any`.
///
/// # Examples
///
/// ```
/// use countbloom::core::key::key_bytes;
///
/// let owned = String::from("alice");
/// assert_eq!(key_bytes(&owned).unwrap(), b"alice");
/// assert!(key_bytes(&42_u32).is_err());
/// ```
pub fn key_bytes(key: &dyn Any) -> Result<&[u8]> {
    if let Some(s) = key.downcast_ref::<String>() {
        return Ok(s.as_bytes());
    }
    if let Some(s) = key.downcast_ref::<&'static str>() {
        return Ok(s.as_bytes());
    }
    if let Some(s) = key.downcast_ref::<Box<str>>() {
        return Ok(s.as_bytes());
    }
    if let Some(b) = key.downcast_ref::<Vec<u8>>() {
        return Ok(b.as_slice());
    }
    if let Some(b) = key.downcast_ref::<&'static [u8]>() {
        return Ok(b);
    }
    if let Some(b) = key.downcast_ref::<Box<[u8]>>() {
        return Ok(b);
    }

    Err(CountBloomError::invalid_key_type(describe(key)))
}

fn describe(key: &dyn Any) -> &'static str {
    macro_rules! name_of {
        ($($ty:ty),* $(,)?) => {
            $(
                if key.is::<$ty>() {
                    return std::any::type_name::<$ty>();
                }
            )*
        };
    }

    name_of!(
        bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
        (), Vec<String>, Option<String>,
    );
    "unknown"
}
