//! Steps that inspect the last response.
use cucumber::then;

use crate::world::{check, GreeterWorld};

#[then(regex = r"^I store the value of response message path (.*) as (.*) in scenario scope$")]
fn store_path_scenario(world: &mut GreeterWorld, path: String, name: String) {
    world
        .session
        .store_response_path_in_scenario_scope(&path, &name)
        .expect("path should be valid");
}

#[then(regex = r"^I store the value of response message path (.*) as (.*) in global scope$")]
fn store_path_global(world: &mut GreeterWorld, path: String, name: String) {
    world
        .session
        .store_response_path_in_global_scope(&path, &name)
        .expect("path should be valid");
}

#[then(regex = r"^response status should be (.*)$")]
fn status(world: &mut GreeterWorld, code: String) {
    check(world.session.assert_response_status_match(&code));
}

// One sentence covers both pattern and array checks: `should be of type
// array` would otherwise also match `should be (.*)`.
#[then(regex = r"^response message path (.*) should be (.*)$")]
fn path_should_be(world: &mut GreeterWorld, path: String, expected: String) {
    let session = &world.session;
    let result = if expected == "of type array" {
        session.assert_path_is_array(&path)
    } else if let Some(length) = expected.strip_prefix("of type array with length ") {
        session.assert_path_is_array_with_length(&path, length)
    } else {
        session.assert_path_in_response_message_matches_expression(&path, &expected)
    };
    check(result.expect("path and pattern should be valid"));
}

#[then(regex = r"^response message path (.*) should not be (.*)$")]
fn path_should_not_be(world: &mut GreeterWorld, path: String, pattern: String) {
    let result = world
        .session
        .assert_path_in_response_message_does_not_match_expression(&path, &pattern)
        .expect("path and pattern should be valid");
    check(result);
}
