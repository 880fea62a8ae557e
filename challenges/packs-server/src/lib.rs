//! Network front end for the pack optimizer.
//!
//! Clients send one JSON request per line, `{"quantity": 12001, "packSizes":
//! [250, 500, 1000, 2000, 5000]}`, and receive one Lambda style response per
//! line: `{"statusCode": 200, "headers": {..}, "body": "{\"250\":1, ..}"}`.
//! Invalid input is answered with a 400, solver defects with a 500.

mod connection;
pub mod handler;
pub mod protocol;
pub mod server;
