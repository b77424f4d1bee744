use std::future::Future;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Minimal transport the backend clients are written against. Paths are
/// relative to whatever base the implementation was built with; bodies are
/// raw JSON bytes.
pub trait HttpClient: Send + Sync {
    fn get(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, Error>> + Send;

    fn put(&self, path: &str, body: Vec<u8>)
    -> impl Future<Output = Result<Vec<u8>, Error>> + Send;
}

impl<T: HttpClient> HttpClient for Arc<T> {
    fn get(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, Error>> + Send {
        (**self).get(path)
    }

    fn put(
        &self,
        path: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, Error>> + Send {
        (**self).put(path, body)
    }
}
