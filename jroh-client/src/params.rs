//! Conversion of call arguments into positional params

use jroh_core::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Argument lists accepted by `JrohClient::call`
///
/// Implemented for `()`, `Vec<Value>` and tuples of up to eight
/// serializable values. Each tuple field becomes one positional param.
///
/// ```rust
/// use jroh_client::IntoParams;
/// use serde_json::json;
///
/// let params = ("pete", 3).into_params().unwrap();
/// assert_eq!(params, vec![json!("pete"), json!(3)]);
/// ```
pub trait IntoParams {
    /// Serialize the arguments, in order
    fn into_params(self) -> Result<Vec<Value>>;
}

impl IntoParams for () {
    fn into_params(self) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }
}

impl IntoParams for Vec<Value> {
    fn into_params(self) -> Result<Vec<Value>> {
        Ok(self)
    }
}

fn to_param<T: Serialize>(value: T, position: usize) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::Serialization(format!("param {}: {}", position, e)))
}

macro_rules! impl_into_params {
    ($($ty:ident => $idx:tt),+) => {
        impl<$($ty: Serialize),+> IntoParams for ($($ty,)+) {
            fn into_params(self) -> Result<Vec<Value>> {
                Ok(vec![$(to_param(self.$idx, $idx)?),+])
            }
        }
    };
}

impl_into_params!(A => 0);
impl_into_params!(A => 0, B => 1);
impl_into_params!(A => 0, B => 1, C => 2);
impl_into_params!(A => 0, B => 1, C => 2, D => 3);
impl_into_params!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_into_params!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_into_params!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_into_params!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_unit_is_empty() {
        assert!(().into_params().unwrap().is_empty());
    }

    #[test]
    fn test_single_element_tuple() {
        assert_eq!(("pete",).into_params().unwrap(), vec![json!("pete")]);
    }

    #[test]
    fn test_order_preserved() {
        let params = (1, "two", Some(3.5), None::<i32>).into_params().unwrap();
        assert_eq!(params, vec![json!(1), json!("two"), json!(3.5), Value::Null]);
    }

    #[test]
    fn test_unserializable_map_key_fails() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON");
        let err = (map,).into_params().unwrap_err();
        assert!(matches!(err, Error::Serialization(ref m) if m.starts_with("param 0:")));
    }
}
