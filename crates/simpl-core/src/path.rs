//! Paths naming an array inside the container hierarchy

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PathPart, SimplError, SimplResult};

/// Separator used when a path is stored as a single string
pub const PATH_SEPARATOR: char = '|';

/// Path to an array: data container / attribute matrix / data array
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataArrayPath {
    pub data_container: String,
    pub attribute_matrix: String,
    pub data_array: String,
}

impl DataArrayPath {
    /// Create a new path
    pub fn new(
        data_container: impl Into<String>,
        attribute_matrix: impl Into<String>,
        data_array: impl Into<String>,
    ) -> Self {
        Self {
            data_container: data_container.into(),
            attribute_matrix: attribute_matrix.into(),
            data_array: data_array.into(),
        }
    }

    /// Path with only the data container and attribute matrix set
    pub fn matrix(data_container: impl Into<String>, attribute_matrix: impl Into<String>) -> Self {
        Self::new(data_container, attribute_matrix, "")
    }

    /// Same matrix, different array name
    pub fn with_array(&self, data_array: impl Into<String>) -> Self {
        Self::new(
            self.data_container.clone(),
            self.attribute_matrix.clone(),
            data_array,
        )
    }

    /// Every element empty
    pub fn is_empty(&self) -> bool {
        self.data_container.is_empty()
            && self.attribute_matrix.is_empty()
            && self.data_array.is_empty()
    }

    /// Every element non-empty
    pub fn is_valid(&self) -> bool {
        !self.data_container.is_empty()
            && !self.attribute_matrix.is_empty()
            && !self.data_array.is_empty()
    }

    /// Join the elements with `delimiter`
    pub fn serialize(&self, delimiter: char) -> String {
        format!(
            "{}{d}{}{d}{}",
            self.data_container,
            self.attribute_matrix,
            self.data_array,
            d = delimiter
        )
    }

    /// Split a string produced by [`DataArrayPath::serialize`]. Missing
    /// trailing elements are left empty.
    pub fn deserialize(s: &str, delimiter: char) -> Self {
        let mut parts = s.splitn(3, delimiter);
        Self::new(
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        )
    }

    /// Check that the path can name an array: non-empty and no forward slashes
    pub fn validate(&self) -> SimplResult<()> {
        if self.is_empty() {
            return Err(SimplError::EmptyPath);
        }
        if !self.is_valid() {
            return Err(SimplError::InvalidPath {
                path: self.to_string(),
            });
        }
        self.validate_names()
    }

    /// Check that no element contains a forward slash
    pub fn validate_names(&self) -> SimplResult<()> {
        let parts = [
            (PathPart::DataContainer, &self.data_container),
            (PathPart::AttributeMatrix, &self.attribute_matrix),
            (PathPart::DataArray, &self.data_array),
        ];
        for (part, name) in parts {
            if name.contains('/') {
                return Err(SimplError::ForwardSlash {
                    part,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for DataArrayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize(PATH_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_round_trip() {
        let path = DataArrayPath::new("ImageDataContainer", "CellData", "Confidence Index");
        let s = path.serialize(PATH_SEPARATOR);
        assert_eq!(s, "ImageDataContainer|CellData|Confidence Index");
        assert_eq!(DataArrayPath::deserialize(&s, PATH_SEPARATOR), path);
    }

    #[test]
    fn test_deserialize_partial() {
        let path = DataArrayPath::deserialize("dc|am", PATH_SEPARATOR);
        assert_eq!(path, DataArrayPath::matrix("dc", "am"));
        assert!(!path.is_valid());
        assert!(!path.is_empty());
    }

    #[test]
    fn test_validate_codes() {
        assert_eq!(
            DataArrayPath::default().validate().unwrap_err().code(),
            -80000
        );
        assert_eq!(
            DataArrayPath::matrix("dc", "am").validate().unwrap_err().code(),
            -80001
        );
        assert_eq!(
            DataArrayPath::new("dc", "am", "a/b").validate().unwrap_err().code(),
            -80007
        );
        assert!(DataArrayPath::new("dc", "am", "a").validate().is_ok());
    }
}
