// Lookup is the request hot path: captures are borrowed slices and the
// walk itself must not allocate
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use super::node::{Node, NodeType};
use crate::params::Params;

/// Name of a `{name}` parameter node, without the braces.
pub(crate) fn param_name(path: &[u8]) -> &str {
    std::str::from_utf8(&path[1..path.len() - 1]).expect("wildcard names are valid UTF-8")
}

/// Name of a `/{name...}` catch-all node, without the slash, braces and dots.
pub(crate) fn catch_all_name(path: &[u8]) -> &str {
    std::str::from_utf8(&path[2..path.len() - 4]).expect("wildcard names are valid UTF-8")
}

impl<T> Node<T> {
    /// Look up the value registered for `path`.
    ///
    /// Wildcard captures are appended to `params` if a sink is given; when
    /// it is `None`, parameters are matched but not recorded. The second
    /// return is the trailing-slash-redirect hint: `true` means no value
    /// exists for this path, but one does for the path with exactly one
    /// trailing slash added or removed.
    ///
    /// # Panics
    ///
    /// Panics if the tree is structurally corrupt (a wildcard child that is
    /// neither a parameter nor a catch-all).
    pub fn get_value<'a>(
        &'a self,
        path: &'a str,
        mut params: Option<&mut Params<'a>>,
    ) -> (Option<&'a T>, bool) {
        let full = path;
        let mut offset = 0usize;
        let mut n = self;

        loop {
            let path = &full.as_bytes()[offset..];
            let prefix = &n.path[..];

            if path.len() > prefix.len() {
                if &path[..prefix.len()] == prefix {
                    offset += prefix.len();
                    let path = &full.as_bytes()[offset..];

                    // Without a wildcard child the next node is picked by
                    // the first byte of the remaining path.
                    if !n.wild_child {
                        let idxc = path[0];
                        if let Some(pos) = n.indices.iter().position(|&c| c == idxc) {
                            n = &n.children[pos];
                            continue;
                        }

                        // Nothing found. Recommend removing the trailing
                        // slash if that leaves a registered path.
                        let tsr = path == b"/" && n.value.is_some();
                        return (None, tsr);
                    }

                    n = &n.children[0];
                    match n.node_type {
                        NodeType::Param => {
                            // Consume up to the next '/' or the path end
                            let end = path
                                .iter()
                                .position(|&c| c == b'/')
                                .unwrap_or(path.len());

                            if let Some(ps) = params.as_mut() {
                                // Segment boundaries are ASCII, so the
                                // slice stays on char boundaries.
                                ps.push(param_name(&n.path), &full[offset..offset + end]);
                            }

                            if end < path.len() {
                                if !n.children.is_empty() {
                                    offset += end;
                                    n = &n.children[0];
                                    continue;
                                }

                                // The route stops at the parameter but the
                                // path goes on: only a lone trailing slash
                                // is redirectable.
                                let tsr = path.len() == end + 1;
                                return (None, tsr);
                            }

                            if let Some(value) = n.value.as_ref() {
                                return (Some(value), false);
                            }
                            if n.children.len() == 1 {
                                // Check if a value for this path plus a
                                // trailing slash exists
                                let child = &n.children[0];
                                let tsr = (child.path == b"/" && child.value.is_some())
                                    || (child.path.is_empty() && child.indices == b"/");
                                return (None, tsr);
                            }
                            return (None, false);
                        }
                        NodeType::CatchAll => {
                            if let Some(ps) = params.as_mut() {
                                ps.push(catch_all_name(&n.path), &full[offset..]);
                            }
                            return (n.value.as_ref(), false);
                        }
                        _ => panic!("invalid node type"),
                    }
                }
            } else if path == prefix {
                // We should have reached the node containing the value.
                if let Some(value) = n.value.as_ref() {
                    return (Some(value), false);
                }

                // A wildcard child means a value exists for this path with
                // an additional trailing slash.
                if path == b"/" && n.wild_child && n.node_type != NodeType::Root {
                    return (None, true);
                }

                // Check if a value for this path plus a trailing slash
                // exists, for a trailing slash recommendation.
                if let Some(pos) = n.indices.iter().position(|&c| c == b'/') {
                    let child = &n.children[pos];
                    let tsr = (child.path.len() == 1 && child.value.is_some())
                        || (child.node_type == NodeType::CatchAll
                            && child.children[0].value.is_some());
                    return (None, tsr);
                }

                return (None, false);
            }

            // Nothing found. Recommend adding a trailing slash if that
            // makes the path a registered one.
            let tsr = path == b"/"
                || (prefix.len() == path.len() + 1
                    && prefix[path.len()] == b'/'
                    && path == &prefix[..prefix.len() - 1]
                    && n.value.is_some());
            return (None, tsr);
        }
    }
}
