//! Registry of the XML schema types an XMLA provider tags values with.
//!
//! The table is fixed at compile time. Lookups never fail: a name or native
//! type that is not in the table resolves to `xsd:string`, so a value of an
//! exotic type is still readable as text.

/// Native scalar type a column or cell is reported as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal,
    Boolean,
    VarChar,
    /// `xsd:dateTime`, decoded as a UTC timestamp
    Date,
}

impl NativeType {
    pub fn name(self) -> &'static str {
        match self {
            NativeType::TinyInt => "TINYINT",
            NativeType::SmallInt => "SMALLINT",
            NativeType::Integer => "INTEGER",
            NativeType::BigInt => "BIGINT",
            NativeType::Float => "FLOAT",
            NativeType::Double => "DOUBLE",
            NativeType::Decimal => "DECIMAL",
            NativeType::Boolean => "BOOLEAN",
            NativeType::VarChar => "VARCHAR",
            NativeType::Date => "DATE",
        }
    }
}

/// XML schema type of a value
///
/// Discriminants index `REGISTRY`; keep both in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsdType {
    Int,
    Integer,
    Double,
    PositiveInteger,
    Decimal,
    Short,
    Float,
    Long,
    Boolean,
    Byte,
    UnsignedByte,
    UnsignedShort,
    UnsignedLong,
    UnsignedInt,
    String,
    DateTime,
}

/// Immutable registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub xsd: XsdType,
    pub name: &'static str,
    pub native: NativeType,
    pub signed: bool,
}

const fn entry(xsd: XsdType, name: &'static str, native: NativeType, signed: bool) -> TypeDescriptor {
    TypeDescriptor {
        xsd,
        name,
        native,
        signed,
    }
}

static REGISTRY: [TypeDescriptor; 16] = [
    entry(XsdType::Int, "xsd:int", NativeType::Integer, true),
    entry(XsdType::Integer, "xsd:integer", NativeType::Integer, true),
    entry(XsdType::Double, "xsd:double", NativeType::Double, true),
    entry(XsdType::PositiveInteger, "xsd:positiveInteger", NativeType::Integer, true),
    entry(XsdType::Decimal, "xsd:decimal", NativeType::Decimal, true),
    entry(XsdType::Short, "xsd:short", NativeType::SmallInt, true),
    entry(XsdType::Float, "xsd:float", NativeType::Float, true),
    entry(XsdType::Long, "xsd:long", NativeType::BigInt, true),
    entry(XsdType::Boolean, "xsd:boolean", NativeType::Boolean, true),
    entry(XsdType::Byte, "xsd:byte", NativeType::TinyInt, true),
    entry(XsdType::UnsignedByte, "xsd:unsignedByte", NativeType::TinyInt, false),
    entry(XsdType::UnsignedShort, "xsd:unsignedShort", NativeType::SmallInt, false),
    entry(XsdType::UnsignedLong, "xsd:unsignedLong", NativeType::BigInt, false),
    entry(XsdType::UnsignedInt, "xsd:unsignedInt", NativeType::Integer, false),
    entry(XsdType::String, "xsd:string", NativeType::VarChar, true),
    entry(XsdType::DateTime, "xsd:dateTime", NativeType::Date, true),
];

impl XsdType {
    /// Look up a type by its prefixed schema name, e.g. `xsd:unsignedLong`.
    ///
    /// Unknown names resolve to [`XsdType::String`].
    pub fn from_name(name: &str) -> Self {
        REGISTRY
            .iter()
            .find(|d| d.name == name)
            .map_or(XsdType::String, |d| d.xsd)
    }

    /// Reverse lookup by native type and signedness.
    ///
    /// Several schema types share a pair (`xsd:int`, `xsd:integer` and
    /// `xsd:positiveInteger` are all signed `INTEGER`); the last entry of
    /// the table wins. Unknown pairs resolve to [`XsdType::String`].
    pub fn from_native(native: NativeType, signed: bool) -> Self {
        REGISTRY
            .iter()
            .rev()
            .find(|d| d.native == native && d.signed == signed)
            .map_or(XsdType::String, |d| d.xsd)
    }

    pub fn descriptor(self) -> &'static TypeDescriptor {
        &REGISTRY[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn native_type(self) -> NativeType {
        self.descriptor().native
    }

    pub fn is_signed(self) -> bool {
        self.descriptor().signed
    }

    /// All registered types in table order
    pub fn all() -> impl Iterator<Item = XsdType> {
        REGISTRY.iter().map(|d| d.xsd)
    }
}

impl std::fmt::Display for XsdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
