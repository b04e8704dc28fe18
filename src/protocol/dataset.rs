use crate::cellset::{Axis, AxisInfo, Member, OlapInfo, Tuple};
use crate::constant::MDDATASET_NS;
use crate::error::{Error, Result};
use crate::protocol::r#trait::CellSetHandler;
use crate::protocol::xml::Element;

/// Read a multidimensional payload and feed it to `handler`
///
/// ```text
/// <root xmlns="urn:schemas-microsoft-com:xml-analysis:mddataset">
///   <xsd:schema/>
///   <OlapInfo>
///     <CubeInfo><Cube><CubeName>Sales</CubeName></Cube></CubeInfo>
///     <AxesInfo><AxisInfo name="Axis0">...</AxisInfo>...</AxesInfo>
///   </OlapInfo>
///   <Axes>
///     <Axis name="Axis0"><Tuples><Tuple><Member/>...</Tuple>...</Tuples></Axis>
///     ...
///   </Axes>
///   <CellData>
///     <Cell CellOrdinal="0"><Value xsi:type="xsd:double">5</Value>...</Cell>
///     ...
///   </CellData>
/// </root>
/// ```
#[tracing::instrument(skip_all)]
pub fn read_cellset<H: CellSetHandler>(payload: Element, handler: &mut H) -> Result<()> {
    let root = payload
        .into_child(MDDATASET_NS, "root")
        .ok_or_else(|| Error::malformed("return element has no dataset root"))?;

    handler.on_olap_info(read_olap_info(&root))?;

    let mut num_cells = 0_usize;
    for child in root.into_child_elements() {
        if child.is(MDDATASET_NS, "Axes") {
            for axis in child.into_child_elements() {
                if axis.is(MDDATASET_NS, "Axis") {
                    handler.on_axis(read_axis(&axis)?)?;
                }
            }
        } else if child.is(MDDATASET_NS, "CellData") {
            for cell in child.into_child_elements() {
                if cell.is(MDDATASET_NS, "Cell") {
                    let ordinal = cell_ordinal(&cell)?;
                    handler.on_cell(ordinal, cell)?;
                    num_cells += 1;
                }
            }
        }
    }
    tracing::debug!(num_cells, "read cellset");

    handler.on_finish()
}

fn read_olap_info(root: &Element) -> OlapInfo {
    let Some(olap_info) = root.find_child(MDDATASET_NS, "OlapInfo") else {
        return OlapInfo::default();
    };

    let cube_name = olap_info
        .find_child(MDDATASET_NS, "CubeInfo")
        .and_then(|info| info.find_child(MDDATASET_NS, "Cube"))
        .and_then(|cube| cube.child_text(MDDATASET_NS, "CubeName"))
        .map(|name| name.trim().to_string());

    let axes = olap_info
        .find_child(MDDATASET_NS, "AxesInfo")
        .map(|axes_info| {
            axes_info
                .find_children(MDDATASET_NS, "AxisInfo")
                .map(|axis_info| AxisInfo {
                    name: axis_info.attribute("name").unwrap_or_default().to_string(),
                    hierarchies: axis_info
                        .find_children(MDDATASET_NS, "HierarchyInfo")
                        .map(|h| h.attribute("name").unwrap_or_default().to_string())
                        .collect(),
                })
                .collect()
        })
        .unwrap_or_default();

    OlapInfo { cube_name, axes }
}

fn read_axis(axis: &Element) -> Result<Axis> {
    let name = axis.attribute("name").unwrap_or_default().to_string();
    let mut tuples = Vec::new();
    if let Some(container) = axis.find_child(MDDATASET_NS, "Tuples") {
        for tuple in container.find_children(MDDATASET_NS, "Tuple") {
            let members = tuple
                .find_children(MDDATASET_NS, "Member")
                .map(read_member)
                .collect::<Result<Vec<_>>>()?;
            tuples.push(Tuple { members });
        }
    }
    tracing::trace!(%name, num_tuples = tuples.len(), "axis");
    Ok(Axis { name, tuples })
}

fn read_member(member: &Element) -> Result<Member> {
    let mut out = Member {
        hierarchy: member.attribute("Hierarchy").unwrap_or_default().to_string(),
        ..Member::default()
    };
    for property in member.child_elements() {
        let text = property.text().trim().to_string();
        match property.local_name() {
            "UName" => out.unique_name = text,
            "Caption" => out.caption = text,
            "LName" => out.level_unique_name = text,
            "LNum" => out.level_number = Some(text.parse().map_err(Error::malformed)?),
            "DisplayInfo" => out.display_info = Some(text.parse().map_err(Error::malformed)?),
            other => out.properties.push((other.to_string(), text)),
        }
    }
    Ok(out)
}

fn cell_ordinal(cell: &Element) -> Result<usize> {
    let ordinal = cell
        .attribute("CellOrdinal")
        .ok_or_else(|| Error::malformed("Cell has no CellOrdinal"))?;
    ordinal.trim().parse().map_err(Error::malformed)
}
