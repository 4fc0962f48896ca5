//! Data types.
//!
//! A [`DataType`] is the native type descriptor handed to a storage engine alongside a raw buffer.

use serde::de::Error;
use thiserror::Error;

/// A data type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[rustfmt::skip]
pub enum DataType {
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    UInt64,
    /// `float16` IEEE 754 half-precision floating point: sign bit, 5 bits exponent, 10 bits mantissa.
    Float16,
    /// `float32` IEEE 754 single-precision floating point: sign bit, 8 bits exponent, 23 bits mantissa.
    Float32,
    /// `float64` IEEE 754 double-precision floating point: sign bit, 11 bits exponent, 52 bits mantissa.
    Float64,
    /// `complex64` real and complex components are each IEEE 754 single-precision floating point.
    Complex64,
    /// `complex128` real and complex components are each IEEE 754 double-precision floating point.
    Complex128,
    /// A variable-length, nul-terminated UTF-8 string.
    ///
    /// In memory, each element of a raw buffer is a `*mut c_char`.
    String,
}

/// An unsupported data type error.
#[derive(Debug, Error)]
#[error("unsupported data type {0}")]
pub struct UnsupportedDataTypeError(String);

/// The size of a data type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DataTypeSize {
    /// Fixed size (in bytes).
    Fixed(usize),
    /// Variable sized.
    Variable,
}

impl DataType {
    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
        }
    }

    /// Returns the [`DataTypeSize`].
    #[must_use]
    pub const fn size(&self) -> DataTypeSize {
        match self {
            Self::Int8 | Self::UInt8 => DataTypeSize::Fixed(1),
            Self::Int16 | Self::UInt16 | Self::Float16 => DataTypeSize::Fixed(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => DataTypeSize::Fixed(4),
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Complex64 => DataTypeSize::Fixed(8),
            Self::Complex128 => DataTypeSize::Fixed(16),
            Self::String => DataTypeSize::Variable,
        }
    }

    /// Returns the size in bytes of a fixed-size data type, otherwise returns [`None`].
    #[must_use]
    pub const fn fixed_size(&self) -> Option<usize> {
        match self.size() {
            DataTypeSize::Fixed(size) => Some(size),
            DataTypeSize::Variable => None,
        }
    }

    /// Returns true if the data type is variable-length.
    ///
    /// Buffers of a variable-length data type hold pointers to engine-owned memory after a read.
    #[must_use]
    pub const fn is_variable_length(&self) -> bool {
        matches!(self.size(), DataTypeSize::Variable)
    }

    /// Create a data type from its name.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if `name` does not identify a supported data type.
    pub fn from_name(name: &str) -> Result<Self, UnsupportedDataTypeError> {
        match name {
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "float16" => Ok(Self::Float16),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            "complex64" => Ok(Self::Complex64),
            "complex128" => Ok(Self::Complex128),
            "string" => Ok(Self::String),
            _ => Err(UnsupportedDataTypeError(name.to_string())),
        }
    }
}

impl TryFrom<&str> for DataType {
    type Error = UnsupportedDataTypeError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::from_name(name)
    }
}

impl serde::Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for DataType {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        Self::from_name(&name).map_err(|err| D::Error::custom(err.to_string()))
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_unknown() {
        let json = r#""unknown""#;
        assert!(serde_json::from_str::<DataType>(json).is_err());
        assert_eq!(
            DataType::from_name("unknown").unwrap_err().to_string(),
            "unsupported data type unknown"
        );
        assert!(DataType::try_from("bool").is_err());
    }

    #[test]
    fn data_type_int32() {
        let json = r#""int32""#;
        let data_type: DataType = serde_json::from_str(json).unwrap();
        assert_eq!(data_type, DataType::Int32);
        assert_eq!(json, serde_json::to_string(&data_type).unwrap());
        assert_eq!(format!("{}", data_type), "int32");
        assert_eq!(data_type.size(), DataTypeSize::Fixed(4));
        assert_eq!(data_type.fixed_size(), Some(4));
        assert!(!data_type.is_variable_length());
    }

    #[test]
    fn data_type_complex128() {
        let data_type = DataType::from_name("complex128").unwrap();
        assert_eq!(data_type, DataType::Complex128);
        assert_eq!(data_type.fixed_size(), Some(16));
    }

    #[test]
    fn data_type_string() {
        let json = r#""string""#;
        let data_type: DataType = serde_json::from_str(json).unwrap();
        assert_eq!(data_type, DataType::String);
        assert_eq!(data_type.size(), DataTypeSize::Variable);
        assert_eq!(data_type.fixed_size(), None);
        assert!(data_type.is_variable_length());
    }

    #[test]
    fn data_type_names_round_trip() {
        let data_types = [
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
            DataType::UInt8,
            DataType::UInt16,
            DataType::UInt32,
            DataType::UInt64,
            DataType::Float16,
            DataType::Float32,
            DataType::Float64,
            DataType::Complex64,
            DataType::Complex128,
            DataType::String,
        ];
        for (index, data_type) in data_types.into_iter().enumerate() {
            // A new variant fails to compile here until it is added to the list above
            let position = match data_type {
                DataType::Int8 => 0,
                DataType::Int16 => 1,
                DataType::Int32 => 2,
                DataType::Int64 => 3,
                DataType::UInt8 => 4,
                DataType::UInt16 => 5,
                DataType::UInt32 => 6,
                DataType::UInt64 => 7,
                DataType::Float16 => 8,
                DataType::Float32 => 9,
                DataType::Float64 => 10,
                DataType::Complex64 => 11,
                DataType::Complex128 => 12,
                DataType::String => 13,
            };
            assert_eq!(position, index);
            assert_eq!(DataType::from_name(data_type.name()).unwrap(), data_type);
            assert_eq!(data_type.to_string(), data_type.name());
        }
    }
}
