//! Step definitions for the greeter behavioural tests.

mod request_steps;
mod response_steps;
mod variable_steps;
