//! Left-leaning red-black tree (Sedgewick), insert-only.
//!
//! `remove` has no place in this core (the MemTable has no tombstone, per
//! spec), which drops the hardest part of a red-black tree — deletion
//! rebalancing — entirely. Only insertion and search are implemented, which
//! is also what lets the tree be written as "return a rebalanced subtree"
//! recursion instead of needing parent pointers (not expressible in safe
//! Rust without `Rc<RefCell<_>>` or unsafe).
//!
//! The left-leaning restriction (red links only ever lean left) is a stricter
//! invariant than a textbook red-black tree requires, but it still satisfies
//! every invariant this core's tests check: root black, no two consecutive
//! red nodes, equal black-height on every root-to-leaf path.

use std::cmp::Ordering;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

pub(crate) struct Node<K, V> {
    pub(crate) color: Color,
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
}

pub(crate) type Link<K, V> = Option<Box<Node<K, V>>>;

impl<K, V> Node<K, V> {
    fn new_red(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            color: Color::Red,
            key,
            value,
            left: None,
            right: None,
        })
    }
}

fn is_red<K, V>(node: &Link<K, V>) -> bool {
    matches!(node, Some(n) if n.color == Color::Red)
}

fn rotate_left<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut x = h.right.take().expect("rotate_left requires a right child");
    h.right = x.left.take();
    x.color = h.color;
    h.color = Color::Red;
    x.left = Some(h);
    x
}

fn rotate_right<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut x = h.left.take().expect("rotate_right requires a left child");
    h.left = x.right.take();
    x.color = h.color;
    h.color = Color::Red;
    x.right = Some(h);
    x
}

fn flip_colors<K, V>(h: &mut Node<K, V>) {
    h.color = flip(h.color);
    if let Some(l) = h.left.as_mut() {
        l.color = flip(l.color);
    }
    if let Some(r) = h.right.as_mut() {
        r.color = flip(r.color);
    }
}

fn flip(c: Color) -> Color {
    match c {
        Color::Red => Color::Black,
        Color::Black => Color::Red,
    }
}

/// Inserts `(key, value)` under `h`, returning the rebalanced subtree and
/// whether a brand-new key was inserted (`false` means an existing key's
/// value was replaced in place).
pub(crate) fn insert<K: Ord, V>(h: Link<K, V>, key: K, value: V) -> (Box<Node<K, V>>, bool) {
    let mut node = match h {
        None => return (Node::new_red(key, value), true),
        Some(n) => n,
    };

    let is_new = match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, is_new) = insert(node.left.take(), key, value);
            node.left = Some(left);
            is_new
        }
        Ordering::Greater => {
            let (right, is_new) = insert(node.right.take(), key, value);
            node.right = Some(right);
            is_new
        }
        Ordering::Equal => {
            node.value = value;
            false
        }
    };

    (fixup(node), is_new)
}

fn fixup<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    if is_red(&h.right) && !is_red(&h.left) {
        h = rotate_left(h);
    }
    if is_red(&h.left) && is_red(&h.left.as_ref().unwrap().left) {
        h = rotate_right(h);
    }
    if is_red(&h.left) && is_red(&h.right) {
        flip_colors(&mut h);
    }
    h
}

/// Forces the root black. Sedgewick's `put` does this after every insertion
/// since a freshly-linked root can come back red from `fixup`.
pub(crate) fn blacken_root<K, V>(h: &mut Box<Node<K, V>>) {
    h.color = Color::Black;
}

pub(crate) fn get<'a, K: Ord, V>(mut h: &'a Link<K, V>, key: &K) -> Option<&'a V> {
    while let Some(node) = h {
        match key.cmp(&node.key) {
            Ordering::Less => h = &node.left,
            Ordering::Greater => h = &node.right,
            Ordering::Equal => return Some(&node.value),
        }
    }
    None
}

pub(crate) fn contains<K: Ord, V>(h: &Link<K, V>, key: &K) -> bool {
    get(h, key).is_some()
}

/// In-order traversal, yielding `(key, value)` references in ascending key
/// order.
pub(crate) fn in_order<'a, K, V>(h: &'a Link<K, V>, out: &mut Vec<(&'a K, &'a V)>) {
    if let Some(node) = h {
        in_order(&node.left, out);
        out.push((&node.key, &node.value));
        in_order(&node.right, out);
    }
}

#[cfg(test)]
pub(crate) fn black_height<K, V>(h: &Link<K, V>) -> Result<usize, String> {
    match h {
        None => Ok(0),
        Some(node) => {
            if node.color == Color::Red {
                if is_red(&node.left) || is_red(&node.right) {
                    return Err("two consecutive red nodes".to_string());
                }
            }
            let left = black_height(&node.left)?;
            let right = black_height(&node.right)?;
            if left != right {
                return Err(format!(
                    "unequal black height: left={left} right={right}"
                ));
            }
            Ok(left + usize::from(node.color == Color::Black))
        }
    }
}
