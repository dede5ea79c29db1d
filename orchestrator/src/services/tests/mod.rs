//! Service-specific tests
//!
//! Each service has its own test file; shared fixtures live in `common`.


pub mod common {
    use crate::types::ObjectPath;

    pub fn output_path() -> ObjectPath {
        ObjectPath::new("discovered", "weebly/run-1")
    }

    pub fn urls(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("https://site-{i}.test")).collect()
    }

    /// Newline-terminated object body as the writer produces it
    pub fn body_lines(body: &str) -> Vec<String> {
        body.lines().map(str::to_string).collect()
    }
}
