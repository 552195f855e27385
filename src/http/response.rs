/// What the runner keeps from a response: status, raw body and the
/// end-to-end latency up to the last body byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub latency_ms: u64,
}
