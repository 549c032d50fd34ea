//! Steps that store and check variables.
use cucumber::{given, then};

use crate::world::{check, GreeterWorld};

#[given(regex = r"^I store the raw value (.*) as (.*) in scenario scope$")]
fn store_scenario(world: &mut GreeterWorld, value: String, name: String) {
    world.session.store_value_in_scenario_scope(&name, value);
}

#[given(regex = r"^I store the raw value (.*) as (.*) in global scope$")]
fn store_global(world: &mut GreeterWorld, value: String, name: String) {
    world.session.store_value_in_global_scope(&name, value);
}

#[given(regex = r"^I have (.*) stored in global scope$")]
fn global_exists(world: &mut GreeterWorld, name: String) {
    check(world.session.assert_global_variable_exists(&name));
}

#[then(regex = r"^value of scenario variable (.*) should be (.*)$")]
fn scenario_equal(world: &mut GreeterWorld, name: String, value: String) {
    check(world.session.assert_scenario_variable_value_equal(&name, &value));
}

#[then(regex = r"^value of scenario variable (.*) should not be (.*)$")]
fn scenario_not_equal(world: &mut GreeterWorld, name: String, value: String) {
    check(world.session.assert_scenario_variable_value_not_equal(&name, &value));
}

#[then(regex = r"^value of global variable (.*) should be (.*)$")]
fn global_equal(world: &mut GreeterWorld, name: String, value: String) {
    check(world.session.assert_global_variable_value_equal(&name, &value));
}

#[then(regex = r"^value of global variable (.*) should not be (.*)$")]
fn global_not_equal(world: &mut GreeterWorld, name: String, value: String) {
    check(world.session.assert_global_variable_value_not_equal(&name, &value));
}
