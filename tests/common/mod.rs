//! In-memory transport and canned server responses

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zero_xmla::Opts;
use zero_xmla::error::{Error, Result};
use zero_xmla::transport::Transport;

#[derive(Default)]
pub struct MockState {
    responses: Mutex<VecDeque<Vec<u8>>>,
    requests: Mutex<Vec<String>>,
    closes: AtomicUsize,
}

impl MockState {
    pub fn push_response(&self, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(body.into().into_bytes());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Replays queued responses in order and records every request
pub struct MockTransport {
    state: Arc<MockState>,
}

pub fn mock() -> (MockTransport, Arc<MockState>) {
    let state = Arc::new(MockState::default());
    let transport = MockTransport {
        state: Arc::clone(&state),
    };
    (transport, state)
}

impl Transport for MockTransport {
    fn send(&self, request: &[u8]) -> Result<Vec<u8>> {
        self.state
            .requests
            .lock()
            .unwrap()
            .push(String::from_utf8(request.to_vec()).unwrap());
        self.state
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::HttpStatus {
                status: 500,
                body: "no response queued".to_string(),
            })
    }

    fn close(&self) -> Result<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn opts() -> Opts {
    Opts {
        url: "http://localhost:8080/mondrian/xmla".to_string(),
        catalog: Some("FoodMart".to_string()),
        data_source_info: Some("Provider=Mondrian;DataSource=MondrianFoodMart;".to_string()),
        ..Opts::default()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn envelope(response_element: &str, root: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
    SOAP-ENV:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <SOAP-ENV:Header/>
  <SOAP-ENV:Body>
    <cxmla:{response_element} xmlns:cxmla="urn:schemas-microsoft-com:xml-analysis">
      <cxmla:return>
        {root}
      </cxmla:return>
    </cxmla:{response_element}>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
    )
}

/// MDSCHEMA_CUBES for FoodMart
pub fn cubes_response() -> String {
    envelope(
        "DiscoverResponse",
        r#"<root xmlns="urn:schemas-microsoft-com:xml-analysis:rowset"
              xmlns:xsd="http://www.w3.org/2001/XMLSchema"
              xmlns:sql="urn:schemas-microsoft-com:xml-sql">
          <xsd:schema targetNamespace="urn:schemas-microsoft-com:xml-analysis:rowset">
            <xsd:complexType name="row">
              <xsd:sequence>
                <xsd:element sql:field="CATALOG_NAME" name="CATALOG_NAME" type="xsd:string"/>
                <xsd:element sql:field="CUBE_NAME" name="CUBE_NAME" type="xsd:string"/>
                <xsd:element sql:field="LAST_SCHEMA_UPDATE" name="LAST_SCHEMA_UPDATE" type="xsd:dateTime" minOccurs="0"/>
                <xsd:element sql:field="IS_DRILLTHROUGH_ENABLED" name="IS_DRILLTHROUGH_ENABLED" type="xsd:boolean"/>
              </xsd:sequence>
            </xsd:complexType>
          </xsd:schema>
          <row>
            <CATALOG_NAME>FoodMart</CATALOG_NAME>
            <CUBE_NAME>Sales</CUBE_NAME>
            <LAST_SCHEMA_UPDATE>2024-01-15T10:30:00</LAST_SCHEMA_UPDATE>
            <IS_DRILLTHROUGH_ENABLED>true</IS_DRILLTHROUGH_ENABLED>
          </row>
          <row>
            <CATALOG_NAME>FoodMart</CATALOG_NAME>
            <CUBE_NAME>Warehouse</CUBE_NAME>
            <IS_DRILLTHROUGH_ENABLED>false</IS_DRILLTHROUGH_ENABLED>
          </row>
        </root>"#,
    )
}

/// Tabular result of a statement returning one integer column
pub fn tabular_response() -> String {
    envelope(
        "ExecuteResponse",
        r#"<root xmlns="urn:schemas-microsoft-com:xml-analysis:rowset"
              xmlns:xsd="http://www.w3.org/2001/XMLSchema"
              xmlns:sql="urn:schemas-microsoft-com:xml-sql">
          <xsd:schema>
            <xsd:complexType name="row">
              <xsd:sequence>
                <xsd:element sql:field="[Store].[Store Country].[MEMBER_CAPTION]" name="_x005b_Store_x005d_" type="xsd:string"/>
                <xsd:element sql:field="[Measures].[Unit Sales]" name="_x005b_Measures_x005d_" type="xsd:int" minOccurs="0"/>
              </xsd:sequence>
            </xsd:complexType>
          </xsd:schema>
          <row><_x005b_Store_x005d_>Canada</_x005b_Store_x005d_></row>
          <row><_x005b_Store_x005d_>USA</_x005b_Store_x005d_><_x005b_Measures_x005d_>266773</_x005b_Measures_x005d_></row>
        </root>"#,
    )
}

/// Multidimensional result: [Measures].[Unit Sales] by two genders
pub fn dataset_response() -> String {
    envelope(
        "ExecuteResponse",
        r#"<root xmlns="urn:schemas-microsoft-com:xml-analysis:mddataset"
              xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
          <OlapInfo>
            <CubeInfo><Cube><CubeName>Sales</CubeName></Cube></CubeInfo>
            <AxesInfo>
              <AxisInfo name="Axis0"><HierarchyInfo name="Gender"/></AxisInfo>
            </AxesInfo>
          </OlapInfo>
          <Axes>
            <Axis name="Axis0">
              <Tuples>
                <Tuple><Member Hierarchy="Gender"><UName>[Gender].[F]</UName><Caption>F</Caption><LName>[Gender].[Gender]</LName><LNum>1</LNum></Member></Tuple>
                <Tuple><Member Hierarchy="Gender"><UName>[Gender].[M]</UName><Caption>M</Caption><LName>[Gender].[Gender]</LName><LNum>1</LNum></Member></Tuple>
              </Tuples>
            </Axis>
          </Axes>
          <CellData>
            <Cell CellOrdinal="0"><Value xsi:type="xsd:double">131558</Value><FmtValue>131,558</FmtValue></Cell>
            <Cell CellOrdinal="1"><Value xsi:type="xsd:double">135215</Value><FmtValue>135,215</FmtValue></Cell>
          </CellData>
        </root>"#,
    )
}

pub fn fault_response() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <SOAP-ENV:Fault>
      <faultcode>SOAP-ENV:Server.00HSBE02</faultcode>
      <faultstring>XMLA Execute unexpected exception</faultstring>
      <faultactor>Mondrian</faultactor>
      <detail><XA:error xmlns:XA="http://mondrian.sourceforge.net"><code>00HSBE02</code><desc>MDX object '[Measures].[Nope]' not found in cube 'Sales'</desc></XA:error></detail>
    </SOAP-ENV:Fault>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
        .to_string()
}
