//! Positional parameter extraction
//!
//! Requests carry their arguments as a JSON array. [`FromParams`] turns that
//! array into a tuple of typed arguments, one array element per tuple field,
//! in order.
//!
//! # Arity Rules
//!
//! - Missing trailing params are deserialized from `null`, so `Option<T>`
//!   arguments may be left out by the caller.
//! - Surplus params are rejected with `Error::InvalidParams`.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::FromParams;
//! use serde_json::json;
//!
//! let (name, excited): (String, Option<bool>) =
//!     FromParams::from_params(vec![json!("pete")]).unwrap();
//! assert_eq!(name, "pete");
//! assert_eq!(excited, None);
//! ```

use jroh_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Conversion from a positional params array into handler arguments
pub trait FromParams: Sized {
    /// Build the arguments, failing with `Error::InvalidParams` on mismatch
    fn from_params(params: Vec<Value>) -> Result<Self>;
}

impl FromParams for Vec<Value> {
    fn from_params(params: Vec<Value>) -> Result<Self> {
        Ok(params)
    }
}

impl FromParams for () {
    fn from_params(params: Vec<Value>) -> Result<Self> {
        check_arity(params.len(), 0)
    }
}

fn check_arity(actual: usize, max: usize) -> Result<()> {
    if actual > max {
        return Err(Error::InvalidParams(format!(
            "expected at most {} params, got {}",
            max, actual
        )));
    }
    Ok(())
}

fn next_param<T: DeserializeOwned>(
    iter: &mut std::vec::IntoIter<Value>,
    position: usize,
) -> Result<T> {
    let value = iter.next().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| Error::InvalidParams(format!("param {}: {}", position, e)))
}

macro_rules! impl_from_params {
    ($arity:expr; $($ty:ident),+) => {
        impl<$($ty),+> FromParams for ($($ty,)+)
        where
            $($ty: DeserializeOwned,)+
        {
            #[allow(non_snake_case)]
            fn from_params(params: Vec<Value>) -> Result<Self> {
                check_arity(params.len(), $arity)?;
                let mut iter = params.into_iter();
                let mut position = 0usize;
                $(
                    let $ty: $ty = next_param(&mut iter, position)?;
                    position += 1;
                )+
                let _ = position;
                Ok(($($ty,)+))
            }
        }
    };
}

impl_from_params!(1; T1);
impl_from_params!(2; T1, T2);
impl_from_params!(3; T1, T2, T3);
impl_from_params!(4; T1, T2, T3, T4);
impl_from_params!(5; T1, T2, T3, T4, T5);
impl_from_params!(6; T1, T2, T3, T4, T5, T6);
impl_from_params!(7; T1, T2, T3, T4, T5, T6, T7);
impl_from_params!(8; T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_accepts_empty() {
        assert!(<()>::from_params(vec![]).is_ok());
    }

    #[test]
    fn test_unit_rejects_surplus() {
        let err = <()>::from_params(vec![json!(1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn test_tuple_in_order() {
        let (a, b, c): (i32, String, bool) =
            FromParams::from_params(vec![json!(1), json!("two"), json!(true)]).unwrap();
        assert_eq!((a, b.as_str(), c), (1, "two", true));
    }

    #[test]
    fn test_type_mismatch_names_position() {
        let err = <(i32, i32)>::from_params(vec![json!(1), json!("x")]).unwrap_err();
        match err {
            Error::InvalidParams(msg) => assert!(msg.starts_with("param 1:")),
            other => panic!("Expected InvalidParams, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_param_fails() {
        let err = <(String,)>::from_params(vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn test_raw_vec_passthrough() {
        let params = vec![json!({"any": "thing"}), json!(null)];
        assert_eq!(Vec::<Value>::from_params(params.clone()).unwrap(), params);
    }
}
