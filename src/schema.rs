use core::fmt;
use core::str::FromStr;

use crate::error::Location;
use crate::{Error, Result};

/// Column types a raw block can carry. Engine type codes that are not listed
/// here (null, decimal, blob, geometry, ...) surface as `UnsupportedType`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ColumnType {
    Bool,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    UTinyInt,
    USmallInt,
    UInt,
    UBigInt,
    Float,
    Double,
    Timestamp,
    /// Also called `binary` by the engine.
    VarChar,
    NChar,
    Json,
    VarBinary,
}

impl ColumnType {
    pub const ALL: [ColumnType; 16] = [
        ColumnType::Bool,
        ColumnType::TinyInt,
        ColumnType::SmallInt,
        ColumnType::Int,
        ColumnType::BigInt,
        ColumnType::UTinyInt,
        ColumnType::USmallInt,
        ColumnType::UInt,
        ColumnType::UBigInt,
        ColumnType::Float,
        ColumnType::Double,
        ColumnType::Timestamp,
        ColumnType::VarChar,
        ColumnType::NChar,
        ColumnType::Json,
        ColumnType::VarBinary,
    ];

    pub fn code(self) -> u8 {
        match self {
            ColumnType::Bool => 1,
            ColumnType::TinyInt => 2,
            ColumnType::SmallInt => 3,
            ColumnType::Int => 4,
            ColumnType::BigInt => 5,
            ColumnType::Float => 6,
            ColumnType::Double => 7,
            ColumnType::VarChar => 8,
            ColumnType::Timestamp => 9,
            ColumnType::NChar => 10,
            ColumnType::UTinyInt => 11,
            ColumnType::USmallInt => 12,
            ColumnType::UInt => 13,
            ColumnType::UBigInt => 14,
            ColumnType::Json => 15,
            ColumnType::VarBinary => 16,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ColumnType::Bool),
            2 => Some(ColumnType::TinyInt),
            3 => Some(ColumnType::SmallInt),
            4 => Some(ColumnType::Int),
            5 => Some(ColumnType::BigInt),
            6 => Some(ColumnType::Float),
            7 => Some(ColumnType::Double),
            8 => Some(ColumnType::VarChar),
            9 => Some(ColumnType::Timestamp),
            10 => Some(ColumnType::NChar),
            11 => Some(ColumnType::UTinyInt),
            12 => Some(ColumnType::USmallInt),
            13 => Some(ColumnType::UInt),
            14 => Some(ColumnType::UBigInt),
            15 => Some(ColumnType::Json),
            16 => Some(ColumnType::VarBinary),
            _ => None,
        }
    }

    /// Width of one value in the data region, `None` for variable-length types.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            ColumnType::Bool | ColumnType::TinyInt | ColumnType::UTinyInt => Some(1),
            ColumnType::SmallInt | ColumnType::USmallInt => Some(2),
            ColumnType::Int | ColumnType::UInt | ColumnType::Float => Some(4),
            ColumnType::BigInt | ColumnType::UBigInt | ColumnType::Double => Some(8),
            ColumnType::Timestamp => Some(8),
            ColumnType::VarChar | ColumnType::NChar | ColumnType::Json | ColumnType::VarBinary => {
                None
            }
        }
    }

    pub fn is_var_len(self) -> bool {
        self.fixed_width().is_none()
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Bool => "bool",
            ColumnType::TinyInt => "tinyint",
            ColumnType::SmallInt => "smallint",
            ColumnType::Int => "int",
            ColumnType::BigInt => "bigint",
            ColumnType::UTinyInt => "tinyint unsigned",
            ColumnType::USmallInt => "smallint unsigned",
            ColumnType::UInt => "int unsigned",
            ColumnType::UBigInt => "bigint unsigned",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::Timestamp => "timestamp",
            ColumnType::VarChar => "varchar",
            ColumnType::NChar => "nchar",
            ColumnType::Json => "json",
            ColumnType::VarBinary => "varbinary",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ty = match s.trim().to_ascii_lowercase().as_str() {
            "bool" => ColumnType::Bool,
            "tinyint" | "i8" => ColumnType::TinyInt,
            "smallint" | "i16" => ColumnType::SmallInt,
            "int" | "i32" => ColumnType::Int,
            "bigint" | "i64" => ColumnType::BigInt,
            "tinyint unsigned" | "utinyint" | "u8" => ColumnType::UTinyInt,
            "smallint unsigned" | "usmallint" | "u16" => ColumnType::USmallInt,
            "int unsigned" | "uint" | "u32" => ColumnType::UInt,
            "bigint unsigned" | "ubigint" | "u64" => ColumnType::UBigInt,
            "float" | "f32" => ColumnType::Float,
            "double" | "f64" => ColumnType::Double,
            "timestamp" | "ts" => ColumnType::Timestamp,
            "varchar" | "binary" => ColumnType::VarChar,
            "nchar" => ColumnType::NChar,
            "json" => ColumnType::Json,
            "varbinary" => ColumnType::VarBinary,
            other => {
                return Err(Error::schema(
                    Location::Block,
                    format!("unknown column type: {other}"),
                ));
            }
        };
        Ok(ty)
    }
}

/// Resolution of every timestamp column of one result handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Precision {
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl Precision {
    pub fn code(self) -> i32 {
        match self {
            Precision::Milliseconds => 0,
            Precision::Microseconds => 1,
            Precision::Nanoseconds => 2,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Precision::Milliseconds),
            1 => Ok(Precision::Microseconds),
            2 => Ok(Precision::Nanoseconds),
            _ => Err(Error::schema(
                Location::Block,
                format!("unknown precision code: {code}"),
            )),
        }
    }

    pub fn nanos_per_tick(self) -> i128 {
        match self {
            Precision::Milliseconds => 1_000_000,
            Precision::Microseconds => 1_000,
            Precision::Nanoseconds => 1,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Precision::Milliseconds => "ms",
            Precision::Microseconds => "us",
            Precision::Nanoseconds => "ns",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.unit())
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ms" => Ok(Precision::Milliseconds),
            "us" => Ok(Precision::Microseconds),
            "ns" => Ok(Precision::Nanoseconds),
            other => Err(Error::schema(
                Location::Block,
                format!("unknown precision: {other}"),
            )),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub ty: ColumnType,
    /// Declared byte width. Intrinsic width for fixed types, declared maximum
    /// for variable-length ones.
    pub bytes: u32,
}

impl ColumnDescriptor {
    /// Descriptor with the intrinsic width of a fixed type, or zero for a
    /// variable-length type.
    pub fn of(ty: ColumnType) -> Self {
        let bytes = ty.fixed_width().unwrap_or(0) as u32;
        Self { ty, bytes }
    }

    pub fn var(ty: ColumnType, max_bytes: u32) -> Self {
        Self { ty, bytes: max_bytes }
    }
}

/// Column descriptor table of one result handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSchema {
    columns: Vec<ColumnDescriptor>,
    precision: Precision,
}

impl ResultSchema {
    pub fn new(columns: Vec<ColumnDescriptor>, precision: Precision) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::schema(
                Location::Block,
                "result schema must have at least one column",
            ));
        }
        for (idx, col) in columns.iter().enumerate() {
            if let Some(width) = col.ty.fixed_width() {
                if col.bytes as usize != width {
                    return Err(Error::schema(
                        Location::Column(idx),
                        format!(
                            "declared width {} does not match {} width {width}",
                            col.bytes, col.ty
                        ),
                    ));
                }
            }
        }
        Ok(Self { columns, precision })
    }

    /// Builds the table from the engine's `(type code, declared bytes)` pairs
    /// and precision code.
    pub fn from_engine(fields: &[(u8, i32)], precision_code: i32) -> Result<Self> {
        let precision = Precision::from_code(precision_code)?;
        let mut columns = Vec::with_capacity(fields.len());
        for (column, &(code, bytes)) in fields.iter().enumerate() {
            let ty = ColumnType::from_code(code)
                .ok_or(Error::UnsupportedType { column, code })?;
            let bytes: u32 = bytes.try_into().map_err(|_| {
                Error::schema(
                    Location::Column(column),
                    format!("negative declared width {bytes}"),
                )
            })?;
            columns.push(ColumnDescriptor { ty, bytes });
        }
        Self::new(columns, precision)
    }

    pub fn from_types(types: &[ColumnType], precision: Precision) -> Result<Self> {
        Self::new(types.iter().map(|&ty| ColumnDescriptor::of(ty)).collect(), precision)
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column_types(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.columns.iter().map(|c| c.ty)
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
