use super::node::{Node, NodeType};

/// Lowercase mapping of a single rune. Mappings that expand to multiple
/// runes fall back to the identity, matching segment-level folding.
fn to_lower(c: char) -> char {
    let mut folded = c.to_lowercase();
    match (folded.next(), folded.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Uppercase mapping of a single rune, same constraints as [`to_lower`].
fn to_upper(c: char) -> char {
    let mut folded = c.to_uppercase();
    match (folded.next(), folded.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Decode the first rune of `bytes`, returning the replacement character
/// with width 1 for invalid sequences.
fn decode_rune(bytes: &[u8]) -> (char, usize) {
    let take = bytes.len().min(4);
    for len in 1..=take {
        if let Ok(s) = std::str::from_utf8(&bytes[..len]) {
            if let Some(c) = s.chars().next() {
                return (c, len);
            }
        }
    }
    (char::REPLACEMENT_CHARACTER, 1)
}

fn is_rune_start(b: u8) -> bool {
    b & 0xC0 != 0x80
}

/// Rune-wise case-insensitive equality on byte slices. Partial runes at the
/// slice edges decode to the replacement character on both sides and so
/// compare equal; their real bytes are matched through the rune buffer.
fn eq_fold(mut a: &[u8], mut b: &[u8]) -> bool {
    while !a.is_empty() && !b.is_empty() {
        let (ca, na) = decode_rune(a);
        let (cb, nb) = decode_rune(b);
        if to_lower(ca) != to_lower(cb) {
            return false;
        }
        a = &a[na..];
        b = &b[nb..];
    }
    a.is_empty() && b.is_empty()
}

fn encode_rune(c: char) -> [u8; 4] {
    let mut rb = [0u8; 4];
    c.encode_utf8(&mut rb);
    rb
}

/// Shift the rune buffer left by `n` bytes, dropping consumed bytes.
fn shift_n_rune_bytes(rb: [u8; 4], n: usize) -> [u8; 4] {
    match n {
        0 => rb,
        1 => [rb[1], rb[2], rb[3], 0],
        2 => [rb[2], rb[3], 0, 0],
        3 => [rb[3], 0, 0, 0],
        _ => [0; 4],
    }
}

impl<T> Node<T> {
    /// Case-insensitive lookup of `path`, returning the registered path in
    /// its canonical casing if one exists.
    ///
    /// With `fix_trailing_slash` set, a path that is off by exactly one
    /// trailing slash is also accepted and the returned path carries the
    /// correction. Wildcard-captured bytes are taken over verbatim.
    ///
    /// # Panics
    ///
    /// Panics if the tree is structurally corrupt (a wildcard child that is
    /// neither a parameter nor a catch-all).
    #[must_use]
    pub fn find_case_insensitive_path(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        let mut ci_path = Vec::with_capacity(path.len() + 1);
        if self.find_ci_path_rec(path.as_bytes(), &mut ci_path, [0; 4], fix_trailing_slash) {
            Some(String::from_utf8_lossy(&ci_path).into_owned())
        } else {
            None
        }
    }

    /// Recursive work horse of [`Node::find_case_insensitive_path`].
    ///
    /// `rb` carries the not-yet-consumed bytes of a case-folded rune across
    /// node boundaries, since an edge split may leave a rune's bytes spread
    /// over several nodes. On success the canonical path has been appended
    /// to `ci_path`.
    fn find_ci_path_rec(
        &self,
        mut path: &[u8],
        ci_path: &mut Vec<u8>,
        mut rb: [u8; 4],
        fix_trailing_slash: bool,
    ) -> bool {
        let mut n = self;
        let mut np_len = n.path.len();

        'walk: while path.len() >= np_len
            && (np_len == 0 || eq_fold(&path[1..np_len], &n.path[1..]))
        {
            // Add the canonical bytes of this node to the result
            let old_path = path;
            path = &path[np_len..];
            ci_path.extend_from_slice(&n.path);

            if path.is_empty() {
                // We should have reached the node containing the value.
                if n.value.is_some() {
                    return true;
                }

                // No value found. Try to fix the path by adding a
                // trailing slash.
                if fix_trailing_slash {
                    if let Some(pos) = n.indices.iter().position(|&c| c == b'/') {
                        let child = &n.children[pos];
                        if (child.path.len() == 1 && child.value.is_some())
                            || (child.node_type == NodeType::CatchAll
                                && child.children[0].value.is_some())
                        {
                            ci_path.push(b'/');
                            return true;
                        }
                        return false;
                    }
                }
                return false;
            }

            if !n.wild_child {
                // Skip rune bytes already processed
                rb = shift_n_rune_bytes(rb, np_len);

                if rb[0] != 0 {
                    // Continue matching the remaining bytes of the
                    // in-flight rune
                    let idxc = rb[0];
                    for (pos, &c) in n.indices.iter().enumerate() {
                        if c == idxc {
                            n = &n.children[pos];
                            np_len = n.path.len();
                            continue 'walk;
                        }
                    }
                } else {
                    // Process a new rune: find the start of the rune that
                    // straddles (or begins at) the node boundary. Runes
                    // are up to 4 bytes long, so the start is at most 3
                    // bytes back.
                    let mut rv = '\0';
                    let mut off = 0;
                    let max = np_len.min(3);
                    while off < max {
                        let i = np_len - off;
                        if is_rune_start(old_path[i]) {
                            rv = decode_rune(&old_path[i..]).0;
                            break;
                        }
                        off += 1;
                    }

                    // Try the lowercase folding first. Both the lowercase
                    // and the uppercase byte might exist as an index, so
                    // this branch has to recurse.
                    let lo = to_lower(rv);
                    rb = shift_n_rune_bytes(encode_rune(lo), off);
                    let idxc = rb[0];
                    for (pos, &c) in n.indices.iter().enumerate() {
                        if c == idxc {
                            let mark = ci_path.len();
                            if n.children[pos].find_ci_path_rec(
                                path,
                                ci_path,
                                rb,
                                fix_trailing_slash,
                            ) {
                                return true;
                            }
                            ci_path.truncate(mark);
                            break;
                        }
                    }

                    // Same for the uppercase rune, if it differs
                    let up = to_upper(rv);
                    if up != lo {
                        rb = shift_n_rune_bytes(encode_rune(up), off);
                        let idxc = rb[0];
                        for (pos, &c) in n.indices.iter().enumerate() {
                            if c == idxc {
                                n = &n.children[pos];
                                np_len = n.path.len();
                                continue 'walk;
                            }
                        }
                    }
                }

                // Nothing found. Recommend dropping the trailing slash if
                // that leaves a registered path.
                if fix_trailing_slash && path == b"/" && n.value.is_some() {
                    return true;
                }
                return false;
            }

            n = &n.children[0];
            match n.node_type {
                NodeType::Param => {
                    // Consume up to the next '/' or the path end; wildcard
                    // bytes are accepted verbatim
                    let end = path.iter().position(|&c| c == b'/').unwrap_or(path.len());
                    ci_path.extend_from_slice(&path[..end]);

                    if end < path.len() {
                        if !n.children.is_empty() {
                            path = &path[end..];
                            n = &n.children[0];
                            np_len = n.path.len();
                            continue 'walk;
                        }

                        // The route stops at the parameter but the path
                        // goes on
                        if fix_trailing_slash && path.len() == end + 1 {
                            return true;
                        }
                        return false;
                    }

                    if n.value.is_some() {
                        return true;
                    }
                    if fix_trailing_slash && n.children.len() == 1 {
                        // Check if a value for this path plus a trailing
                        // slash exists
                        let child = &n.children[0];
                        if child.path == b"/" && child.value.is_some() {
                            ci_path.push(b'/');
                            return true;
                        }
                    }
                    return false;
                }
                NodeType::CatchAll => {
                    ci_path.extend_from_slice(path);
                    return true;
                }
                _ => panic!("invalid node type"),
            }
        }

        // Nothing found. Try to fix the path by adding or removing a
        // trailing slash.
        if fix_trailing_slash {
            if path == b"/" {
                return true;
            }
            if path.len() + 1 == np_len
                && n.path[path.len()] == b'/'
                && eq_fold(&path[1..], &n.path[1..path.len()])
                && n.value.is_some()
            {
                ci_path.extend_from_slice(&n.path);
                return true;
            }
        }
        false
    }
}
