//! Reporting side channel.
//!
//! Objective functions record derived quantities (biomass trajectories,
//! catchability, reference points) while they evaluate. The report is owned
//! by the caller and passed by `&mut`, so concurrent evaluations never share
//! one.
//!
//! Entries flagged with `ad` mark quantities whose uncertainty the driver may
//! want to propagate (delta method over the Hessian).

use crate::traits::Float;

/// Recorded value, generic over the scalar type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ReportValue<T> {
    /// Single value
    Scalar(T),
    /// Time series or per-age values
    Vector(Vec<T>),
    /// Row-major matrix
    Matrix {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
        /// Row-major values
        values: Vec<T>,
    },
}

impl<T: Copy> ReportValue<T> {
    /// Convert every element.
    pub fn map<U, F: FnMut(T) -> U>(&self, mut f: F) -> ReportValue<U> {
        match self {
            ReportValue::Scalar(v) => ReportValue::Scalar(f(*v)),
            ReportValue::Vector(v) => ReportValue::Vector(v.iter().map(|&x| f(x)).collect()),
            ReportValue::Matrix { rows, cols, values } => ReportValue::Matrix {
                rows: *rows,
                cols: *cols,
                values: values.iter().map(|&x| f(x)).collect(),
            },
        }
    }

    /// Scalar content, if this is a scalar entry.
    pub fn as_scalar(&self) -> Option<T> {
        match self {
            ReportValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Element slice for vector and matrix entries.
    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            ReportValue::Scalar(_) => None,
            ReportValue::Vector(v) => Some(v),
            ReportValue::Matrix { values, .. } => Some(values),
        }
    }
}

/// A named report entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportEntry<T> {
    /// Quantity name
    pub name: String,
    /// Recorded value
    pub value: ReportValue<T>,
    /// Whether the driver should propagate uncertainty for this quantity
    pub ad: bool,
}

/// Derived quantities recorded during one evaluation.
///
/// Entries keep recording order; recording a name twice replaces the
/// earlier value.
///
/// # Examples
/// ```
/// use stock_core::bundle::Report;
///
/// let mut report = Report::<f64>::new();
/// report.scalar("q", 0.01);
/// report.vector("B", vec![100.0, 90.0]);
/// report.ad_scalar("R0", 1.0e4);
///
/// assert_eq!(report.get_scalar("q"), Some(0.01));
/// assert_eq!(report.ad_names().collect::<Vec<_>>(), vec!["R0"]);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Report<T> {
    entries: Vec<ReportEntry<T>>,
}

impl<T> Default for Report<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Report<T> {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, value: ReportValue<T>, ad: bool) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.value = value;
                entry.ad = ad;
            }
            None => self.entries.push(ReportEntry {
                name: name.to_string(),
                value,
                ad,
            }),
        }
    }

    /// Record a scalar.
    pub fn scalar(&mut self, name: &str, value: T) {
        self.push(name, ReportValue::Scalar(value), false);
    }

    /// Record a vector.
    pub fn vector(&mut self, name: &str, values: Vec<T>) {
        self.push(name, ReportValue::Vector(values), false);
    }

    /// Record a row-major matrix.
    pub fn matrix(&mut self, name: &str, rows: usize, cols: usize, values: Vec<T>) {
        debug_assert_eq!(values.len(), rows * cols);
        self.push(name, ReportValue::Matrix { rows, cols, values }, false);
    }

    /// Record a scalar flagged for uncertainty propagation.
    pub fn ad_scalar(&mut self, name: &str, value: T) {
        self.push(name, ReportValue::Scalar(value), true);
    }

    /// Record a vector flagged for uncertainty propagation.
    pub fn ad_vector(&mut self, name: &str, values: Vec<T>) {
        self.push(name, ReportValue::Vector(values), true);
    }

    /// Look up an entry.
    pub fn get(&self, name: &str) -> Option<&ReportValue<T>> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.value)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in recording order.
    pub fn entries(&self) -> &[ReportEntry<T>] {
        &self.entries
    }

    /// Names of entries flagged for uncertainty propagation.
    pub fn ad_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.ad)
            .map(|e| e.name.as_str())
    }
}

impl<T: Copy> Report<T> {
    /// Scalar entry by name.
    pub fn get_scalar(&self, name: &str) -> Option<T> {
        self.get(name).and_then(ReportValue::as_scalar)
    }

    /// Vector or matrix entry by name.
    pub fn get_slice(&self, name: &str) -> Option<&[T]> {
        self.get(name).and_then(ReportValue::as_slice)
    }

    /// Convert every recorded value, e.g. project dual numbers onto their real part.
    pub fn map<U, F: FnMut(T) -> U>(&self, mut f: F) -> Report<U> {
        Report {
            entries: self
                .entries
                .iter()
                .map(|e| ReportEntry {
                    name: e.name.clone(),
                    value: e.value.map(&mut f),
                    ad: e.ad,
                })
                .collect(),
        }
    }
}

impl<T: Float> Report<T> {
    /// Names of entries containing a non-finite value.
    pub fn non_finite(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| match &e.value {
                ReportValue::Scalar(v) => !v.is_finite(),
                ReportValue::Vector(v) => v.iter().any(|x| !x.is_finite()),
                ReportValue::Matrix { values, .. } => values.iter().any(|x| !x.is_finite()),
            })
            .map(|e| e.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup() {
        let mut r = Report::<f64>::new();
        r.scalar("h", 0.7);
        r.vector("B", vec![1.0, 2.0]);
        r.matrix("N", 1, 2, vec![3.0, 4.0]);

        assert_eq!(r.len(), 3);
        assert_eq!(r.get_scalar("h"), Some(0.7));
        assert_eq!(r.get_slice("B"), Some(&[1.0, 2.0][..]));
        assert_eq!(r.get_slice("N"), Some(&[3.0, 4.0][..]));
        assert_eq!(r.get_scalar("B"), None);
    }

    #[test]
    fn test_rerecord_replaces() {
        let mut r = Report::<f64>::new();
        r.scalar("q", 1.0);
        r.ad_scalar("q", 2.0);
        assert_eq!(r.len(), 1);
        assert_eq!(r.get_scalar("q"), Some(2.0));
        assert_eq!(r.ad_names().count(), 1);
    }

    #[test]
    fn test_map_projects_values() {
        let mut r = Report::<f64>::new();
        r.vector("B", vec![1.0, 2.0]);
        let doubled = r.map(|x| x * 2.0);
        assert_eq!(doubled.get_slice("B"), Some(&[2.0, 4.0][..]));
    }

    #[test]
    fn test_non_finite() {
        let mut r = Report::<f64>::new();
        r.scalar("ok", 1.0);
        r.vector("bad", vec![1.0, f64::NAN]);
        assert_eq!(r.non_finite(), vec!["bad"]);
    }
}
