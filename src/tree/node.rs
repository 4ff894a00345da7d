use std::fmt;

/// Kind of a tree node, deciding how its `path` fragment is interpreted
/// during lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeType {
    /// Plain path fragment, matched byte for byte.
    Static,
    /// The root of a method tree.
    Root,
    /// A `{name}` segment; `path` holds the braced wildcard.
    Param,
    /// A `{name...}` segment; matches to the end of the path.
    CatchAll,
}

/// A single edge of the compressed trie.
///
/// `path` and `indices` are byte buffers rather than strings: an edge split
/// may land inside a multi-byte UTF-8 sequence (the routes `/α` and `/β`
/// share the first byte of their two-byte runes), so fragments are not
/// guaranteed to be valid UTF-8 on their own.
pub struct Node<T> {
    /// Path fragment this node consumes. For wildcard nodes this is the
    /// braced segment (`{name}`, or `/{name...}` including the slash that
    /// fronts a catch-all).
    pub(crate) path: Vec<u8>,
    /// The single child is a wildcard edge rather than a static edge.
    pub(crate) wild_child: bool,
    pub(crate) node_type: NodeType,
    /// First byte of each static child, aligned with `children`. Wildcard
    /// descent is flagged by `wild_child` instead of a sentinel byte, so
    /// this only ever holds static first bytes (including the literal `/`
    /// in front of a catch-all pair).
    pub(crate) indices: Vec<u8>,
    /// Child nodes, sorted by descending `priority`; ties keep insertion
    /// order.
    pub(crate) children: Vec<Node<T>>,
    /// Value bound to the exact path accumulated from the root.
    pub(crate) value: Option<T>,
    /// Number of values reachable through this node.
    pub(crate) priority: u32,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            wild_child: false,
            node_type: NodeType::Static,
            indices: Vec::new(),
            children: Vec::new(),
            value: None,
            priority: 0,
        }
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &String::from_utf8_lossy(&self.path))
            .field("wild_child", &self.wild_child)
            .field("node_type", &self.node_type)
            .field("indices", &String::from_utf8_lossy(&self.indices))
            .field("children", &self.children.len())
            .field("value", &self.value.is_some())
            .field("priority", &self.priority)
            .finish()
    }
}

/// Number of wildcard segments in a registered route path.
pub(crate) fn count_params(path: &str) -> usize {
    path.bytes().filter(|&b| b == b'{').count()
}

fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn find_sub(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Search for the first wildcard segment in `path`.
///
/// Returns `(start, len, valid)` of the wildcard, or `None` if the path has
/// no `{`. `valid` is false when the segment is malformed: an unclosed
/// brace, or bytes (a second wildcard, or literals) trailing the closing
/// brace within the same segment.
fn find_wildcard(path: &[u8]) -> Option<(usize, usize, bool)> {
    let seg_len = |start: usize| {
        path[start..]
            .iter()
            .position(|&b| b == b'/')
            .unwrap_or(path.len() - start)
    };

    for (start, &c) in path.iter().enumerate() {
        if c != b'{' {
            continue;
        }
        for (off, &c2) in path[start + 1..].iter().enumerate() {
            match c2 {
                b'}' => {
                    let end = start + off + 2;
                    return match path.get(end) {
                        None | Some(b'/') => Some((start, end - start, true)),
                        Some(_) => Some((start, seg_len(start), false)),
                    };
                }
                b'{' | b'/' => return Some((start, seg_len(start), false)),
                _ => {}
            }
        }
        // Unclosed brace at the end of the path
        return Some((start, path.len() - start, false));
    }
    None
}

impl<T> Node<T> {
    /// Insert a value at the given route path.
    ///
    /// Restructures the tree as needed: shared prefixes are split into
    /// common ancestors and wildcard segments become dedicated child nodes.
    /// Not safe for concurrent use.
    ///
    /// # Panics
    ///
    /// Panics when the route cannot be registered: malformed wildcards, a
    /// wildcard disagreeing with one already in place, a static segment
    /// shadowed by an existing wildcard, a non-terminal catch-all, or a
    /// duplicate registration for the same path.
    pub fn add_route(&mut self, path: &str, value: T) {
        let full_path = path;
        self.priority += 1;

        // Empty tree
        if self.path.is_empty() && self.indices.is_empty() {
            self.insert_child(path.as_bytes(), full_path, value);
            self.node_type = NodeType::Root;
            return;
        }

        let mut path = path.as_bytes();
        let mut n = self;

        'walk: loop {
            // Find the longest common prefix, which contains no wildcards
            // since an existing key cannot contain one.
            let i = longest_common_prefix(path, &n.path);

            // Split edge
            if i < n.path.len() {
                let child = Node {
                    path: n.path[i..].to_vec(),
                    wild_child: n.wild_child,
                    node_type: NodeType::Static,
                    indices: std::mem::take(&mut n.indices),
                    children: std::mem::take(&mut n.children),
                    value: n.value.take(),
                    priority: n.priority - 1,
                };

                n.indices = vec![n.path[i]];
                n.children = vec![child];
                n.path.truncate(i);
                n.wild_child = false;
            }

            // Make the remainder a child of this node
            if i < path.len() {
                path = &path[i..];

                if n.wild_child {
                    n = &mut n.children[0];
                    n.priority += 1;

                    // The wildcard continues the route only if it matches
                    // the existing one exactly and ends at a segment
                    // boundary.
                    if path.len() >= n.path.len()
                        && n.path[..] == path[..n.path.len()]
                        && n.node_type != NodeType::CatchAll
                        && (n.path.len() >= path.len() || path[n.path.len()] == b'/')
                    {
                        continue 'walk;
                    }

                    // Wildcard conflict
                    let path_seg = if n.node_type == NodeType::CatchAll {
                        path
                    } else {
                        path.split(|&b| b == b'/').next().unwrap_or(path)
                    };
                    let existing = String::from_utf8_lossy(&n.path).into_owned();
                    let prefix_end =
                        find_sub(full_path.as_bytes(), path_seg).unwrap_or(0);
                    panic!(
                        "'{}' in new path '{}' conflicts with existing wildcard '{}' in existing prefix '{}{}'",
                        String::from_utf8_lossy(path_seg),
                        full_path,
                        existing,
                        String::from_utf8_lossy(&full_path.as_bytes()[..prefix_end]),
                        existing,
                    );
                }

                let idxc = path[0];

                // `/` after param
                if n.node_type == NodeType::Param && idxc == b'/' && n.children.len() == 1 {
                    n = &mut n.children[0];
                    n.priority += 1;
                    continue 'walk;
                }

                // Check if a child with the next path byte exists
                if let Some(pos) = n.indices.iter().position(|&c| c == idxc) {
                    let pos = n.increment_child_prio(pos);
                    n = &mut n.children[pos];
                    continue 'walk;
                }

                // Otherwise insert it
                if idxc != b'{' {
                    n.indices.push(idxc);
                    n.children.push(Node::default());
                    let pos = n.increment_child_prio(n.indices.len() - 1);
                    n = &mut n.children[pos];
                }
                n.insert_child(path, full_path, value);
                return;
            }

            // Otherwise bind the value to the current node
            if n.value.is_some() {
                panic!("a handler is already registered for path '{full_path}'");
            }
            n.value = Some(value);
            return;
        }
    }

    /// Increment the priority of the child at `pos` and bubble it forward
    /// past lower-priority siblings. Adjacent swaps keep the order stable
    /// for equal priorities. Returns the child's new position.
    fn increment_child_prio(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let prio = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < prio {
            self.children.swap(new_pos - 1, new_pos);
            self.indices.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }
        new_pos
    }

    /// Fill this (empty) node with the remaining path, carving out wildcard
    /// segments into child nodes as they appear.
    fn insert_child(&mut self, mut path: &[u8], full_path: &str, value: T) {
        let mut n = self;

        loop {
            let Some((start, len, valid)) = find_wildcard(path) else {
                break;
            };
            let wildcard = path[start..start + len].to_vec();

            if !valid {
                panic!(
                    "only one wildcard per path segment is allowed, has: '{}' in path '{}'",
                    String::from_utf8_lossy(&wildcard),
                    full_path
                );
            }

            let catch_all = wildcard.ends_with(b"...}");
            let name = if catch_all {
                &wildcard[1..wildcard.len() - 4]
            } else {
                &wildcard[1..wildcard.len() - 1]
            };

            if name.is_empty() {
                panic!("wildcards must be named with a non-empty name in path '{full_path}'");
            }
            if name.contains(&b'.') {
                panic!(
                    "wildcard name '{}' must not contain '.' in path '{}'",
                    String::from_utf8_lossy(name),
                    full_path
                );
            }

            // A wildcard here would make the node's existing children
            // unreachable.
            if !n.children.is_empty() {
                panic!(
                    "wildcard segment '{}' conflicts with existing children in path '{}'",
                    String::from_utf8_lossy(&wildcard),
                    full_path
                );
            }

            if !catch_all {
                // param
                if start > 0 {
                    // Static prefix before the wildcard
                    n.path = path[..start].to_vec();
                    path = &path[start..];
                }

                n.wild_child = true;
                n.children = vec![Node {
                    node_type: NodeType::Param,
                    path: wildcard.clone(),
                    ..Node::default()
                }];
                n = &mut n.children[0];
                n.priority += 1;

                // If the route does not end with the wildcard, there is
                // another subpath starting with `/`.
                if wildcard.len() < path.len() {
                    path = &path[wildcard.len()..];
                    n.children = vec![Node {
                        priority: 1,
                        ..Node::default()
                    }];
                    n = &mut n.children[0];
                    continue;
                }

                // Otherwise we're done. Insert the value in the new leaf.
                n.value = Some(value);
                return;
            }

            // catch-all
            if start + wildcard.len() != path.len() {
                panic!(
                    "catch-all routes are only allowed at the end of the path in path '{full_path}'"
                );
            }

            if n.path.last() == Some(&b'/') {
                panic!(
                    "catch-all conflicts with existing handle for the path segment root in path '{full_path}'"
                );
            }

            // The slash before the catch-all is consumed by the wildcard
            // node so the captured value keeps it.
            if start == 0 || path[start - 1] != b'/' {
                panic!("no / before catch-all in path '{full_path}'");
            }
            n.path = path[..start - 1].to_vec();

            // First node: catch-all node with empty path
            n.children = vec![Node {
                wild_child: true,
                node_type: NodeType::CatchAll,
                ..Node::default()
            }];
            n.indices = vec![b'/'];
            n = &mut n.children[0];
            n.priority += 1;

            // Second node: node holding the variable
            n.children = vec![Node {
                path: path[start - 1..].to_vec(),
                node_type: NodeType::CatchAll,
                value: Some(value),
                priority: 1,
                ..Node::default()
            }];
            return;
        }

        // No wildcard found, simply insert the path and value
        n.path = path.to_vec();
        n.value = Some(value);
    }
}
