//! Model-agnostic input bundle and reporting side channel.
//!
//! This module provides:
//! - `data`: Observed data fields (`DataSet`, `DataValue`, `Matrix`)
//! - `params`: Ordered, named parameter blocks generic over the scalar type
//! - `report`: Derived quantities recorded during an evaluation
//!
//! The bundle is constructed once per evaluation by the driver, passed by
//! reference to the objective function and never retained by it.

pub mod data;
pub mod params;
pub mod report;

pub use data::{DataSet, DataValue, Matrix};
pub use params::ParameterSet;
pub use report::{Report, ReportEntry, ReportValue};

/// Observed data plus current parameter values for one evaluation.
///
/// Data is always plain `f64`; parameters carry the scalar type of the
/// evaluation so that derivative information flows from them.
///
/// # Examples
/// ```
/// use stock_core::bundle::{DataSet, InputBundle, ParameterSet};
///
/// let bundle: InputBundle<f64> = InputBundle::default()
///     .with_data("M", 0.2)
///     .with_parameter("R0x", vec![4.0]);
///
/// assert_eq!(bundle.data().scalar("M").unwrap(), 0.2);
/// assert_eq!(bundle.parameters().scalar("R0x").unwrap(), 4.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputBundle<T> {
    #[cfg_attr(feature = "serde", serde(default))]
    data: DataSet,
    parameters: ParameterSet<T>,
}

impl<T> Default for InputBundle<T> {
    fn default() -> Self {
        Self {
            data: DataSet::default(),
            parameters: ParameterSet::default(),
        }
    }
}

impl<T> InputBundle<T> {
    /// Create a bundle from data and parameters.
    pub fn new(data: DataSet, parameters: ParameterSet<T>) -> Self {
        Self { data, parameters }
    }

    /// Observed data.
    #[inline]
    pub fn data(&self) -> &DataSet {
        &self.data
    }

    /// Current parameter values.
    #[inline]
    pub fn parameters(&self) -> &ParameterSet<T> {
        &self.parameters
    }

    /// Add or replace a data field.
    pub fn with_data(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.data.insert(name, value);
        self
    }

    /// Add or replace a parameter block.
    pub fn with_parameter(mut self, name: impl Into<String>, values: Vec<T>) -> Self {
        self.parameters.insert(name, values);
        self
    }

    /// Split into data and parameters.
    pub fn into_parts(self) -> (DataSet, ParameterSet<T>) {
        (self.data, self.parameters)
    }
}

impl<T: Copy> InputBundle<T> {
    /// Rebuild the bundle with parameters converted to another scalar type.
    ///
    /// Data is shared by clone; only the parameter values are mapped.
    pub fn map_parameters<U, F>(&self, f: F) -> InputBundle<U>
    where
        F: FnMut(usize, T) -> U,
    {
        InputBundle {
            data: self.data.clone(),
            parameters: self.parameters.map(f),
        }
    }
}
