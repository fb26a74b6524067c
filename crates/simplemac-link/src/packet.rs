//! Upper-layer packet container.
//!
//! A packet is a byte payload tagged with an element type, plus a
//! string-keyed metadata map. The MAC reads [`RECIPIENT_KEY`] on transmit
//! and writes both [`SENDER_KEY`] and [`RECIPIENT_KEY`] on receive.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::Serialize;
use simplemac_frame::Address;

use crate::error::MacError;

/// Metadata key holding the destination address (read on transmit, optional).
pub const RECIPIENT_KEY: &str = "recipient";

/// Metadata key holding the source address (written on receive).
pub const SENDER_KEY: &str = "sender";

/// Scalar element type of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ElementKind {
    /// Size of one element in bytes.
    pub const fn size(self) -> usize {
        match self {
            ElementKind::U8 | ElementKind::I8 => 1,
            ElementKind::U16 | ElementKind::I16 => 2,
            ElementKind::U32 | ElementKind::I32 | ElementKind::F32 => 4,
            ElementKind::U64 | ElementKind::I64 | ElementKind::F64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::U8 => "uint8",
            ElementKind::I8 => "int8",
            ElementKind::U16 => "uint16",
            ElementKind::I16 => "int16",
            ElementKind::U32 => "uint32",
            ElementKind::I32 => "int32",
            ElementKind::U64 => "uint64",
            ElementKind::I64 => "int64",
            ElementKind::F32 => "float32",
            ElementKind::F64 => "float64",
        }
    }
}

impl FromStr for ElementKind {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim() {
            "uint8" | "u8" => ElementKind::U8,
            "int8" | "i8" => ElementKind::I8,
            "uint16" | "u16" => ElementKind::U16,
            "int16" | "i16" => ElementKind::I16,
            "uint32" | "u32" => ElementKind::U32,
            "int32" | "i32" => ElementKind::I32,
            "uint64" | "u64" => ElementKind::U64,
            "int64" | "i64" => ElementKind::I64,
            "float32" | "f32" => ElementKind::F32,
            "float64" | "f64" => ElementKind::F64,
            other => return Err(MacError::Config(format!("unknown element type {other:?}"))),
        };
        Ok(kind)
    }
}

/// Element type and vector dimension of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DType {
    pub kind: ElementKind,
    pub dimension: usize,
}

impl DType {
    /// Raw bytes. Received payloads always carry this type.
    pub const BYTES: DType = DType::new(ElementKind::U8, 1);

    pub const fn new(kind: ElementKind, dimension: usize) -> Self {
        Self { kind, dimension }
    }

    /// Size of one (possibly vector) element in bytes.
    pub const fn element_size(self) -> usize {
        self.kind.size() * self.dimension
    }
}

impl Default for DType {
    fn default() -> Self {
        Self::BYTES
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dimension == 1 {
            f.write_str(self.kind.name())
        } else {
            write!(f, "{}[{}]", self.kind.name(), self.dimension)
        }
    }
}

/// A typed metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    U16(u16),
    U64(u64),
    I64(i64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
}

impl MetaValue {
    /// Interpret this value as a node address.
    ///
    /// Any integer variant in `0..=0xFFFF` converts; everything else is `None`.
    pub fn as_address(&self) -> Option<Address> {
        match *self {
            MetaValue::U16(v) => Some(Address::new(v)),
            MetaValue::U64(v) => u16::try_from(v).ok().map(Address::new),
            MetaValue::I64(v) => u16::try_from(v).ok().map(Address::new),
            _ => None,
        }
    }
}

impl From<Address> for MetaValue {
    fn from(addr: Address) -> Self {
        MetaValue::U16(addr.get())
    }
}

impl From<u16> for MetaValue {
    fn from(v: u16) -> Self {
        MetaValue::U16(v)
    }
}

impl From<u64> for MetaValue {
    fn from(v: u64) -> Self {
        MetaValue::U64(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::I64(v)
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        MetaValue::Bool(v)
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Str(v)
    }
}

impl From<Vec<u8>> for MetaValue {
    fn from(v: Vec<u8>) -> Self {
        MetaValue::Bytes(v)
    }
}

/// String-keyed packet metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// Insert a value, returning the previous one for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Option<MetaValue> {
        self.0.insert(key.into(), value.into())
    }

    /// The value under `key` as an address, if present and convertible.
    pub fn address(&self, key: &str) -> Option<Address> {
        self.get(key).and_then(MetaValue::as_address)
    }
}

/// A packet exchanged with the upper layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpperPacket {
    pub payload: Bytes,
    pub dtype: DType,
    pub metadata: Metadata,
}

impl UpperPacket {
    /// A raw byte packet with empty metadata.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            dtype: DType::BYTES,
            metadata: Metadata::new(),
        }
    }

    /// Override the payload element type.
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    /// Tag the packet with a destination address.
    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.metadata.insert(RECIPIENT_KEY, recipient);
        self
    }

    /// Attach an arbitrary metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn recipient(&self) -> Option<Address> {
        self.metadata.address(RECIPIENT_KEY)
    }

    pub fn sender(&self) -> Option<Address> {
        self.metadata.address(SENDER_KEY)
    }

    /// Number of whole elements in the payload.
    pub fn elements(&self) -> usize {
        match self.dtype.element_size() {
            0 => 0,
            size => self.payload.len() / size,
        }
    }
}
