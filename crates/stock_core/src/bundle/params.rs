//! Ordered, named parameter blocks.
//!
//! The optimiser sees parameters as one flat vector; objective functions see
//! them as named blocks (`R0x`, `log_rec_dev`, ...). `ParameterSet` keeps
//! both views consistent: blocks are stored in insertion order and flattened
//! in that order.

use crate::types::BundleError;

/// Named parameter blocks in a stable order.
///
/// # Type Parameters
/// * `T` - Scalar type (e.g., `f64`, `Dual64`, `HyperDual64`)
///
/// # Examples
/// ```
/// use stock_core::bundle::ParameterSet;
///
/// let mut params = ParameterSet::new();
/// params.insert("R0x", vec![5.0_f64]);
/// params.insert("log_rec_dev", vec![0.1, -0.1]);
///
/// assert_eq!(params.flatten(), vec![5.0, 0.1, -0.1]);
///
/// let moved = params.unflatten_like(&[6.0, 0.0, 0.0]).unwrap();
/// assert_eq!(moved.scalar("R0x").unwrap(), 6.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet<T> {
    blocks: Vec<(String, Vec<T>)>,
}

impl<T> Default for ParameterSet<T> {
    fn default() -> Self {
        Self { blocks: Vec::new() }
    }
}

impl<T> ParameterSet<T> {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block, replacing an existing block of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<T>) {
        let name = name.into();
        match self.blocks.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.blocks.push((name, values)),
        }
    }

    /// Look up a block by name.
    pub fn get(&self, name: &str) -> Option<&[T]> {
        self.blocks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Check whether a block exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Required block of any length.
    pub fn vector(&self, name: &str) -> Result<&[T], BundleError> {
        self.get(name)
            .ok_or_else(|| BundleError::MissingParameter(name.to_string()))
    }

    /// Required block of an exact length.
    pub fn vector_len(&self, name: &str, expected: usize) -> Result<&[T], BundleError> {
        let values = self.vector(name)?;
        if values.len() != expected {
            return Err(BundleError::LengthMismatch {
                name: name.to_string(),
                expected,
                got: values.len(),
            });
        }
        Ok(values)
    }

    /// Total number of scalar values across all blocks.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|(_, v)| v.len()).sum()
    }

    /// Check if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block names in flattening order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, values)` in flattening order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.blocks.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Flat-vector labels, `name` for length-one blocks and `name[i]` otherwise.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.len());
        for (n, v) in &self.blocks {
            if v.len() == 1 {
                labels.push(n.clone());
            } else {
                labels.extend((0..v.len()).map(|i| format!("{}[{}]", n, i)));
            }
        }
        labels
    }
}

impl<T: Copy> ParameterSet<T> {
    /// Required block of length one.
    pub fn scalar(&self, name: &str) -> Result<T, BundleError> {
        Ok(self.vector_len(name, 1)?[0])
    }

    /// Concatenate all blocks in order.
    pub fn flatten(&self) -> Vec<T> {
        self.blocks
            .iter()
            .flat_map(|(_, v)| v.iter().copied())
            .collect()
    }

    /// Build a set with this layout from a flat vector.
    ///
    /// # Errors
    /// `BundleError::FlatLength` if `flat.len()` differs from [`Self::len`].
    pub fn unflatten_like<U: Copy>(&self, flat: &[U]) -> Result<ParameterSet<U>, BundleError> {
        if flat.len() != self.len() {
            return Err(BundleError::FlatLength {
                expected: self.len(),
                got: flat.len(),
            });
        }
        let mut offset = 0;
        let blocks = self
            .blocks
            .iter()
            .map(|(n, v)| {
                let block = flat[offset..offset + v.len()].to_vec();
                offset += v.len();
                (n.clone(), block)
            })
            .collect();
        Ok(ParameterSet { blocks })
    }

    /// Convert every value, passing its flat index.
    ///
    /// Used to lift `f64` parameters into dual numbers with a seed on
    /// selected indices.
    pub fn map<U, F>(&self, mut f: F) -> ParameterSet<U>
    where
        F: FnMut(usize, T) -> U,
    {
        let mut index = 0;
        let blocks = self
            .blocks
            .iter()
            .map(|(n, v)| {
                let mapped = v
                    .iter()
                    .map(|&x| {
                        let y = f(index, x);
                        index += 1;
                        y
                    })
                    .collect();
                (n.clone(), mapped)
            })
            .collect();
        ParameterSet { blocks }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::ParameterSet;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    impl<T: Serialize> Serialize for ParameterSet<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.blocks.len()))?;
            for (name, values) in &self.blocks {
                map.serialize_entry(name, values)?;
            }
            map.end()
        }
    }

    struct ParameterSetVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for ParameterSetVisitor<T> {
        type Value = ParameterSet<T>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of parameter names to numbers or arrays of numbers")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut set = ParameterSet::new();
            while let Some((name, value)) = access.next_entry::<String, OneOrMany<T>>()? {
                let values = match value {
                    OneOrMany::One(x) => vec![x],
                    OneOrMany::Many(xs) => xs,
                };
                set.insert(name, values);
            }
            Ok(set)
        }
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for ParameterSet<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(ParameterSetVisitor(PhantomData))
        }
    }
}
