use std::collections::BTreeMap;

use crate::constant::{MDDATASET_NS, SLICER_AXIS, XSI_NS};
use crate::error::{Error, Result};
use crate::protocol::r#trait::CellSetHandler;
use crate::protocol::xml::Element;
use crate::raw::{self, FromXsdValue};
use crate::value::Value;
use crate::xsd::XsdType;

/// Cube and axis layout from `OlapInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OlapInfo {
    pub cube_name: Option<String>,
    pub axes: Vec<AxisInfo>,
}

/// One `AxisInfo`: the axis name and the hierarchies laid out on it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisInfo {
    pub name: String,
    pub hierarchies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Axis {
    /// `Axis0`, `Axis1`, ... or `SlicerAxis`
    pub name: String,
    pub tuples: Vec<Tuple>,
}

impl Axis {
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn is_slicer(&self) -> bool {
        self.name == SLICER_AXIS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tuple {
    pub members: Vec<Member>,
}

/// A member reference inside a tuple
///
/// ```text
/// <Member Hierarchy="[Store]">
///   <UName>[Store].[USA]</UName>
///   <Caption>USA</Caption>
///   <LName>[Store].[Store Country]</LName>
///   <LNum>1</LNum>
///   <DisplayInfo>131076</DisplayInfo>
/// </Member>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Member {
    pub hierarchy: String,
    pub unique_name: String,
    pub caption: String,
    pub level_unique_name: String,
    pub level_number: Option<i32>,
    pub display_info: Option<u32>,
    /// Any other child, by local name, in document order
    pub properties: Vec<(String, String)>,
}

impl Member {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A fully buffered multidimensional result
///
/// Cells are stored sparsely by ordinal; an ordinal with no `<Cell>` in the
/// payload is a NULL cell.
#[derive(Debug, Clone, Default)]
pub struct CellSet {
    info: OlapInfo,
    axes: Vec<Axis>,
    filter_axis: Option<Axis>,
    cells: BTreeMap<usize, Element>,
}

impl CellSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cube_name(&self) -> Option<&str> {
        self.info.cube_name.as_deref()
    }

    pub fn olap_info(&self) -> &OlapInfo {
        &self.info
    }

    /// Query axes in order, without the slicer
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    /// The slicer (WHERE clause) axis, if the server sent one
    pub fn filter_axis(&self) -> Option<&Axis> {
        self.filter_axis.as_ref()
    }

    /// Number of addressable cells: the product of the axis lengths
    ///
    /// Fails with `BadUsageError` when the product does not fit in `usize`.
    pub fn cell_count(&self) -> Result<usize> {
        self.axes.iter().try_fold(1_usize, |count, axis| {
            count.checked_mul(axis.len()).ok_or_else(|| {
                Error::BadUsageError(format!(
                    "Cell count of {} axes overflows usize",
                    self.axes.len()
                ))
            })
        })
    }

    /// Number of cells actually present in the payload
    pub fn stored_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Flatten per-axis coordinates into a cell ordinal. Axis 0 varies fastest.
    pub fn ordinal_of(&self, coordinates: &[usize]) -> Result<usize> {
        if coordinates.len() != self.axes.len() {
            return Err(Error::BadUsageError(format!(
                "Expected {} coordinates, got {}",
                self.axes.len(),
                coordinates.len()
            )));
        }
        // every partial product below is bounded by the cell count
        self.cell_count()?;
        let mut ordinal = 0;
        let mut stride = 1;
        for (axis, &coordinate) in self.axes.iter().zip(coordinates) {
            if coordinate >= axis.len() {
                return Err(Error::BadUsageError(format!(
                    "Coordinate {coordinate} is out of range for {} of {} positions",
                    axis.name,
                    axis.len()
                )));
            }
            ordinal += coordinate * stride;
            stride *= axis.len();
        }
        Ok(ordinal)
    }

    pub fn coordinates_of(&self, ordinal: usize) -> Result<Vec<usize>> {
        self.check_ordinal(ordinal)?;
        let mut rest = ordinal;
        Ok(self
            .axes
            .iter()
            .map(|axis| {
                let coordinate = rest % axis.len();
                rest /= axis.len();
                coordinate
            })
            .collect())
    }

    pub fn cell(&self, coordinates: &[usize]) -> Result<Cell<'_>> {
        self.cell_at(self.ordinal_of(coordinates)?)
    }

    pub fn cell_at(&self, ordinal: usize) -> Result<Cell<'_>> {
        self.check_ordinal(ordinal)?;
        Ok(Cell {
            ordinal,
            element: self.cells.get(&ordinal),
        })
    }

    fn check_ordinal(&self, ordinal: usize) -> Result<()> {
        let count = self.cell_count()?;
        if ordinal >= count {
            return Err(Error::BadUsageError(format!(
                "Cell ordinal {ordinal} is out of range for {count} cells"
            )));
        }
        Ok(())
    }
}

impl CellSetHandler for CellSet {
    fn on_olap_info(&mut self, info: OlapInfo) -> Result<()> {
        self.info = info;
        Ok(())
    }

    fn on_axis(&mut self, axis: Axis) -> Result<()> {
        if axis.is_slicer() {
            self.filter_axis = Some(axis);
        } else {
            self.axes.push(axis);
        }
        Ok(())
    }

    fn on_cell(&mut self, ordinal: usize, cell: Element) -> Result<()> {
        self.cells.insert(ordinal, cell);
        Ok(())
    }
}

/// One cell of a [`CellSet`]
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    ordinal: usize,
    element: Option<&'a Element>,
}

impl<'a> Cell<'a> {
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The `<Cell>` element, `None` for a cell absent from the payload
    pub fn element(&self) -> Option<&'a Element> {
        self.element
    }

    fn value_element(&self) -> Option<&'a Element> {
        self.element
            .and_then(|cell| cell.find_child(MDDATASET_NS, "Value"))
    }

    pub fn is_null(&self) -> bool {
        self.value_element().is_none()
    }

    /// Type named by the `xsi:type` attribute of `<Value>`
    pub fn xsd_type(&self) -> XsdType {
        let name = self.value_element().and_then(|value| {
            value
                .attribute_ns(XSI_NS, "type")
                .or_else(|| value.attribute("xsi:type"))
        });
        XsdType::from_name(name.unwrap_or_default())
    }

    pub fn value(&self) -> Result<Value> {
        match self.element {
            Some(cell) => raw::extract(cell, MDDATASET_NS, "Value", self.xsd_type()),
            None => Ok(Value::Null),
        }
    }

    pub fn get<T: FromXsdValue>(&self) -> Result<T> {
        raw::decode(self.value()?)
    }

    /// `FmtValue` as rendered by the server
    pub fn formatted_value(&self) -> Option<String> {
        self.property("FmtValue")
    }

    /// Text of any cell property child, e.g. `FormatString`
    pub fn property(&self, name: &str) -> Option<String> {
        self.element
            .and_then(|cell| cell.find_child(MDDATASET_NS, name))
            .map(Element::text)
    }
}
