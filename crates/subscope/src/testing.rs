//! Helpers shared by the HTTP tests.

use std::net::TcpListener;

/// Base url nobody listens on.
pub fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
