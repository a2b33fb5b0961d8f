//! Deterministic element-id naming shared by both transform pipelines.
//!
//! The two pipelines address nodes directly by id and scan their `Vec`s of
//! places/transitions/flows rather than through a separate indexed graph
//! structure; these two naming helpers are all that's shared between them.

/// Deterministic arc id: `"{src}TO{tgt}"`.
pub fn arc_name(src: &str, tgt: &str) -> String {
    format!("{}TO{}", src, tgt)
}

/// Deterministic silent-node id: `"SILENTFROM{src}TO{tgt}"`.
pub fn silent_node_name(src: &str, tgt: &str) -> String {
    format!("SILENTFROM{}TO{}", src, tgt)
}
