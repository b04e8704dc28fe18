use crate::xsd::{NativeType, XsdType};

/// Column of a tabular result, read from the inline row schema
///
/// ```text
/// <xsd:complexType name="row">
///   <xsd:sequence>
///     <xsd:element sql:field="[Measures].[Unit Sales]"
///                  name="_x005b_Measures_x005d_._x005b_Unit_x0020_Sales_x005d_"
///                  type="xsd:double" minOccurs="0"/>
///   </xsd:sequence>
/// </xsd:complexType>
/// ```
///
/// `name` is the element name the field appears under in each row; `label`
/// is the `sql:field` caption used for lookups by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// 1-based position in the row
    pub ordinal: usize,
    pub name: String,
    pub label: String,
    pub xsd_type: XsdType,
}

impl Column {
    pub fn new(ordinal: usize, name: String, label: String, xsd_type: XsdType) -> Self {
        Self {
            ordinal,
            name,
            label,
            xsd_type,
        }
    }

    pub fn native_type(&self) -> NativeType {
        self.xsd_type.native_type()
    }

    pub fn is_signed(&self) -> bool {
        self.xsd_type.is_signed()
    }

    pub fn type_name(&self) -> &'static str {
        self.native_type().name()
    }
}
