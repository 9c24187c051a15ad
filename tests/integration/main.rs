//! End-to-end tests against a live server on an ephemeral port.

mod helpers;
mod presence_test;
mod routing_test;
mod ws_test;
