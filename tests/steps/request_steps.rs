//! Steps that build and send requests.
use cucumber::gherkin::Step;
use cucumber::{given, when};
use grpc_bdd::{Error, TableRow};

use crate::world::GreeterWorld;

/// `name | value` rows of a step table, header row skipped
fn table_rows(step: &Step) -> Option<Vec<TableRow>> {
    let table = step.table.as_ref()?;
    Some(
        table
            .rows
            .iter()
            .skip(1)
            .map(|row| TableRow::new(row[0].clone(), row[1].clone()))
            .collect(),
    )
}

#[given(regex = r"^I set request message to\s*(.*)$")]
fn set_message(world: &mut GreeterWorld, step: &Step, content: String) {
    match table_rows(step) {
        Some(rows) => world.session.set_request_message_from_table(&rows),
        None => world
            .session
            .set_request_message_from_str(&content)
            .expect("request message should be valid JSON"),
    }
}

#[given(regex = r"^I set request metadata to\s*(.*)$")]
fn set_metadata(world: &mut GreeterWorld, step: &Step, content: String) {
    match table_rows(step) {
        Some(rows) => world.session.set_request_metadata_from_table(&rows),
        None => world
            .session
            .set_request_metadata_from_str(&content)
            .expect("request metadata should be a JSON object"),
    }
}

#[given(regex = r"^I pipe contents of file (.*) to request message$")]
async fn pipe_message(world: &mut GreeterWorld, file: String) {
    let GreeterWorld { session, fixtures } = world;
    session
        .set_request_message_from_file(&file, &*fixtures)
        .await
        .expect("fixture should load");
}

#[given(regex = r"^I pipe contents of file (.*) to request metadata$")]
async fn pipe_metadata(world: &mut GreeterWorld, file: String) {
    let GreeterWorld { session, fixtures } = world;
    session
        .set_request_metadata_from_file(&file, &*fixtures)
        .await
        .expect("fixture should load");
}

#[when(regex = r"^I request (.*)$")]
async fn request(world: &mut GreeterWorld, rpc: String) {
    // A rejected call is recorded on the session and checked by later steps
    match world.session.invoke(&rpc).await {
        Ok(()) | Err(Error::Invocation { .. }) => {}
        Err(e) => panic!("{e}"),
    }
}
