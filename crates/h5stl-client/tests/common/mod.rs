#![allow(dead_code)]

use h5stl_client::transport::{HttpReply, SubmitForm, Transport, TransportError};
use h5stl_core::geom::Vec3;
use h5stl_core::model::{Triangle, TriangleMesh};
use std::collections::HashMap;
use std::sync::Mutex;

pub const BASE: &str = "http://127.0.0.1:8000";
pub const EXPORT_URL: &str = "http://127.0.0.1:8000/export_stl/";
pub const VIS_URL: &str = "http://127.0.0.1:8000/h5_to_vis/";
pub const ARTIFACT_URL: &str = "http://127.0.0.1:8000/download/part.stl";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Post { url: String, form: SubmitForm },
    Get { url: String },
}

type Reply = Result<HttpReply, TransportError>;

/// Replies from a fixed table and records every request.
#[derive(Default)]
pub struct FakeTransport {
    posts: HashMap<String, Reply>,
    gets: HashMap<String, Reply>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_post(mut self, url: &str, reply: Reply) -> Self {
        self.posts.insert(url.to_string(), reply);
        self
    }

    pub fn on_get(mut self, url: &str, reply: Reply) -> Self {
        self.gets.insert(url.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    async fn post_form(&self, url: &str, form: SubmitForm) -> Result<HttpReply, TransportError> {
        self.calls.lock().unwrap().push(Call::Post {
            url: url.to_string(),
            form,
        });
        self.posts.get(url).cloned().unwrap_or_else(|| Ok(not_found()))
    }

    async fn get(&self, url: &str) -> Result<HttpReply, TransportError> {
        self.calls.lock().unwrap().push(Call::Get {
            url: url.to_string(),
        });
        self.gets.get(url).cloned().unwrap_or_else(|| Ok(not_found()))
    }
}

pub fn json(status: u16, value: serde_json::Value) -> Reply {
    Ok(HttpReply {
        status,
        content_type: Some("application/json".to_string()),
        body: serde_json::to_vec(&value).unwrap(),
    })
}

pub fn converted(url: &str) -> Reply {
    json(
        200,
        serde_json::json!({
            "message": "STL file successfully saved as: stl_files/part.stl",
            "stl_file_url": url,
        }),
    )
}

pub fn stl(bytes: Vec<u8>) -> Reply {
    Ok(HttpReply {
        status: 200,
        content_type: Some("application/stl".to_string()),
        body: bytes,
    })
}

pub fn html(status: u16) -> Reply {
    Ok(HttpReply {
        status,
        content_type: Some("text/html; charset=utf-8".to_string()),
        body: b"<html><body>oops</body></html>".to_vec(),
    })
}

pub fn refused() -> Reply {
    Err(TransportError("connection refused".to_string()))
}

fn not_found() -> HttpReply {
    HttpReply {
        status: 404,
        content_type: Some("application/json".to_string()),
        body: br#"{"detail":"Not Found"}"#.to_vec(),
    }
}

pub fn stl_bytes(n: usize) -> Vec<u8> {
    let triangles = (0..n)
        .map(|i| {
            let x = i as f32;
            Triangle::new(
                Vec3::new(0.0, 0.0, 1.0),
                [
                    Vec3::new(x, 0.0, 0.0),
                    Vec3::new(x + 0.5, 0.0, 0.0),
                    Vec3::new(x, 0.5, 0.0),
                ],
            )
        })
        .collect();
    h5stl_core::stl::encode(&TriangleMesh::new(triangles), "fixture")
}

pub fn h5_payload() -> Vec<u8> {
    // HDF5 signature followed by filler; the backend is faked anyway.
    let mut bytes = b"\x89HDF\r\n\x1a\n".to_vec();
    bytes.resize(512, 0);
    bytes
}
