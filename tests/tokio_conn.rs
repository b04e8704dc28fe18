//! Tests for the async connection over an in-memory transport

mod common;

use pretty_assertions::assert_eq;
use zero_xmla::error::Error;
use zero_xmla::tokio::Conn;
use zero_xmla::{RowCursor, Value};

use common::{cubes_response, dataset_response, fault_response, init_tracing, mock, opts};

#[tokio::test]
async fn discover_cubes() {
    init_tracing();
    let (transport, state) = mock();
    state.push_response(cubes_response());
    let mut conn = Conn::with_transport(transport, &opts());

    let mut cubes = conn.discover("MDSCHEMA_CUBES", &[]).await.unwrap();
    let mut names = Vec::new();
    while cubes.next() {
        names.push(cubes.get_by_label::<String>("CUBE_NAME").unwrap());
    }
    assert_eq!(names, ["Sales", "Warehouse"]);
    assert!(state.requests()[0].contains("<Discover xmlns=\"urn:schemas-microsoft-com:xml-analysis\">"));
}

#[tokio::test]
async fn execute_cellset() {
    let (transport, state) = mock();
    state.push_response(dataset_response());
    let mut conn = Conn::with_transport(transport, &opts());

    let cell_set = conn
        .execute("SELECT [Gender].[Gender].Members ON 0 FROM [Sales]")
        .await
        .unwrap();
    assert_eq!(cell_set.cell_count().unwrap(), 2);
    assert_eq!(cell_set.cell(&[0]).unwrap().value().unwrap(), Value::Double(131_558.0));
}

#[tokio::test]
async fn server_fault_is_an_error() {
    let (transport, state) = mock();
    state.push_response(fault_response());
    let mut conn = Conn::with_transport(transport, &opts());

    let result = conn.execute_rowset("SELECT [Measures].[Nope] ON 0 FROM [Sales]").await;
    assert!(matches!(result, Err(Error::ServerFault(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn clones_on_many_tasks_close_once() {
    const TASKS: usize = 8;

    let (transport, state) = mock();
    for _ in 0..TASKS {
        state.push_response(dataset_response());
    }
    let conn = Conn::with_transport(transport, &opts());

    let mut tasks = Vec::new();
    for _ in 0..TASKS {
        let mut clone = conn.try_clone().unwrap();
        tasks.push(tokio::spawn(async move {
            clone.execute("SELECT FROM [Sales]").await.and_then(|cs| cs.cell_count())
        }));
    }
    drop(conn);

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), 2);
    }
    assert_eq!(state.closes(), 1);
    assert_eq!(state.requests().len(), TASKS);
}
