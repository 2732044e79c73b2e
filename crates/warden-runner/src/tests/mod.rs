//! Test suites for the server lifecycle controller.

mod support;
