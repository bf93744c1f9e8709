//! B+-tree index over a [`BlockStore`].
//!
//! The [`BPlusTree`] owns the store and coordinates:
//! - Header creation and validation on open
//! - Root-to-leaf descent with a transient parent path
//! - Leaf insertion, splitting and separator propagation
//! - Diagnostics (tree level, access counts, dumps)

use std::fmt::Write as _;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use log::{debug, info, trace};

use crate::common::{BlockId, Error, Result};
use crate::storage::BlockStore;

use super::header::TreeHeader;
use super::internal::InternalNode;
use super::layout::NodeLayout;
use super::leaf::LeafNode;
use super::node::{InsertOutcome, Node};

/// Internal nodes visited on the way to a leaf, root first.
///
/// Built by one descent and consumed by split propagation in the same
/// operation. Parents are never stored on disk.
type DescentPath = Vec<InternalNode>;

/// A disk-resident B+-tree mapping `i32` keys to `i32` record pointers.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │                    BPlusTree                     │
/// │  ┌──────────────┐  ┌──────────────────────────┐  │
/// │  │ NodeLayout   │  │ TreeHeader (block 0)     │  │
/// │  │ order, sizes │  │ re-read every operation  │  │
/// │  └──────────────┘  └──────────────────────────┘  │
/// │  ┌────────────────────────────────────────────┐  │
/// │  │ BlockStore: header | node | node | ...     │  │
/// │  └────────────────────────────────────────────┘  │
/// └──────────────────────────────────────────────────┘
/// ```
///
/// # Zero Sentinel
/// A zero slot marks "empty", so key 0 and value 0 cannot be stored.
/// `insert` rejects them and `lookup` never finds them.
///
/// # Thread Safety
/// Single-client. Every operation that touches the file takes `&mut self`.
///
/// # Usage
/// ```no_run
/// use blockindex::BPlusTree;
///
/// let mut tree = BPlusTree::open("index.dat", 4096)?;
/// tree.insert(42, 1337)?;
/// assert_eq!(tree.lookup(42)?, Some(1337));
/// assert_eq!(tree.lookup(7)?, None);
/// # Ok::<(), blockindex::Error>(())
/// ```
#[derive(Debug)]
pub struct BPlusTree {
    store: BlockStore,
    layout: NodeLayout,
    /// Copy of block 0, refreshed at the start of each operation.
    header: TreeHeader,
    /// Blocks visited by descents since the last reset.
    tree_level: u32,
}

impl BPlusTree {
    /// Open an index file, creating it with a fresh header if it is empty.
    ///
    /// # Errors
    /// - `Error::BlockSizeTooSmall` if `block_size` is below 38
    /// - `Error::BlockSizeMismatch` if the file was created with another
    ///   block size
    /// - I/O errors from the file
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let layout = NodeLayout::new(block_size)?;

        // Check before the store truncates the file to a multiple of the
        // requested block size.
        if let Some(found) = stored_block_size(path)? {
            if found != block_size {
                return Err(Error::BlockSizeMismatch {
                    expected: block_size,
                    found,
                });
            }
        }

        let mut store = BlockStore::open(path, block_size)?;

        let header = if store.is_empty() {
            let header = TreeHeader::new(block_size);
            let mut block = vec![0u8; block_size];
            header.write_to(&mut block);
            store.write(&block, BlockId::HEADER)?;
            info!(
                "created index {} (block size {}, order {})",
                path.display(),
                block_size,
                layout.order()
            );
            header
        } else {
            let block = store.read(BlockId::HEADER)?;
            let header = TreeHeader::from_bytes(block.as_slice());
            header.validate(block_size)?;
            info!(
                "opened index {} ({} blocks, order {})",
                path.display(),
                store.len(),
                layout.order()
            );
            header
        };

        Ok(Self {
            store,
            layout,
            header,
            tree_level: 0,
        })
    }

    // ========================================================================
    // Public API: Insert and lookup
    // ========================================================================

    /// Insert `key` → `value`, replacing the value if `key` is present.
    ///
    /// # Errors
    /// - `Error::ReservedValue` if `key` or `value` is 0
    /// - I/O and corruption errors; a failure midway through a split may
    ///   leave the file inconsistent
    pub fn insert(&mut self, key: i32, value: i32) -> Result<()> {
        if key == 0 {
            return Err(Error::ReservedValue { field: "key", value: key });
        }
        if value == 0 {
            return Err(Error::ReservedValue { field: "value", value });
        }

        self.reload_header()?;

        match self.header.root {
            None => {
                let id = self.store.frontier();
                let mut leaf = LeafNode::new(id, &self.layout);
                leaf.insert(key, value);
                self.write_leaf(&leaf)?;
                self.set_root(id, true)?;
                Ok(())
            }
            Some(root) => {
                let (leaf, path) = self.descend(root, key)?;
                self.insert_into_leaf(leaf, path, key, value)
            }
        }
    }

    /// Find the record pointer stored for `key`.
    ///
    /// Resets the tree level first, so afterwards [`tree_level`](Self::tree_level)
    /// is the number of blocks on the root-to-leaf path.
    pub fn lookup(&mut self, key: i32) -> Result<Option<i32>> {
        self.tree_level = 0;
        self.reload_header()?;

        let root = match self.header.root {
            Some(root) => root,
            None => return Ok(None),
        };

        let (leaf, _) = self.descend(root, key)?;
        Ok(leaf.get(key))
    }

    // ========================================================================
    // Public API: Header
    // ========================================================================

    /// Root block id as currently stored in the header.
    pub fn root(&mut self) -> Result<Option<BlockId>> {
        self.reload_header()?;
        Ok(self.header.root)
    }

    /// Point the header at a new root and persist it immediately.
    pub fn set_root(&mut self, root: BlockId, is_leaf: bool) -> Result<()> {
        self.reload_header()?;
        self.header.root = Some(root);
        self.header.root_is_leaf = is_leaf;

        let mut block = vec![0u8; self.layout.block_size()];
        self.header.write_to(&mut block);
        self.store.write(&block, BlockId::HEADER)?;

        info!("root is now {} (leaf: {})", root, is_leaf);
        Ok(())
    }

    /// The header as last read.
    pub fn header(&self) -> &TreeHeader {
        &self.header
    }

    /// Human-readable header contents, read fresh from block 0.
    pub fn header_summary(&mut self) -> Result<String> {
        self.reload_header()?;
        Ok(self.header.to_string())
    }

    // ========================================================================
    // Public API: Metrics and info
    // ========================================================================

    /// Blocks visited by descents since the last reset.
    pub fn tree_level(&self) -> u32 {
        self.tree_level
    }

    pub fn reset_tree_level(&mut self) {
        self.tree_level = 0;
    }

    /// Block reads and writes since open or the last reset.
    pub fn access_count(&self) -> u64 {
        self.store.access_count()
    }

    pub fn reset_access_count(&mut self) {
        self.store.reset_access_count();
    }

    pub fn order(&self) -> usize {
        self.layout.order()
    }

    pub fn block_size(&self) -> usize {
        self.layout.block_size()
    }

    pub fn layout(&self) -> &NodeLayout {
        &self.layout
    }

    /// Number of blocks in the file, header included.
    pub fn block_count(&self) -> u32 {
        self.store.len()
    }

    // ========================================================================
    // Public API: Diagnostics
    // ========================================================================

    /// Decode the node stored in block `id`.
    ///
    /// # Errors
    /// Returns `Error::Corrupted` for the header block or a block that does
    /// not hold node `id`.
    pub fn read_node(&mut self, id: BlockId) -> Result<Node> {
        if id.is_header() {
            return Err(Error::Corrupted("block 0 holds the header, not a node".into()));
        }
        let block = self.store.read(id)?;
        Node::decode(block.as_slice(), id, &self.layout)
    }

    /// Decode and render every block in file order.
    pub fn dump_index(&mut self) -> Result<String> {
        let mut out = String::new();
        for index in 0..self.store.len() {
            let id = BlockId::new(index);
            if id.is_header() {
                self.reload_header()?;
                let _ = writeln!(out, "{}", self.header);
            } else {
                let node = self.read_node(id)?;
                let _ = writeln!(out, "{}", node);
            }
        }
        Ok(out)
    }

    // ========================================================================
    // Public API: Lifecycle
    // ========================================================================

    /// Flush and close the index file.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    /// Close the index file and remove it from disk.
    pub fn delete_underlying_store(self) -> Result<()> {
        self.store.delete()
    }

    // ========================================================================
    // Internal: Descent
    // ========================================================================

    fn reload_header(&mut self) -> Result<()> {
        let block = self.store.read(BlockId::HEADER)?;
        self.header = TreeHeader::from_bytes(block.as_slice());
        Ok(())
    }

    /// Walk from `root` to the leaf responsible for `key`.
    ///
    /// Returns the leaf and the internal nodes above it, root first. Each
    /// node is linked to the one visited before it as its parent.
    fn descend(&mut self, root: BlockId, key: i32) -> Result<(LeafNode, DescentPath)> {
        let mut path = DescentPath::new();
        let mut current = root;
        let mut parent = None;

        loop {
            if path.len() > self.store.len() as usize {
                return Err(Error::Corrupted(format!(
                    "descent from {} does not reach a leaf",
                    root
                )));
            }

            let mut node = self.read_node(current)?;
            node.set_parent(parent);
            self.tree_level += 1;

            if current == root && node.is_leaf() != self.header.root_is_leaf {
                return Err(Error::Corrupted(format!(
                    "header says root {} is_leaf={}, block disagrees",
                    root, self.header.root_is_leaf
                )));
            }

            match node {
                Node::Leaf(leaf) => return Ok((leaf, path)),
                Node::Internal(internal) => {
                    trace!("searching for key {} in internal {}", key, internal.id().0);
                    let child = internal.get(key).ok_or_else(|| {
                        Error::Corrupted(format!("{} has no child for key {}", internal.id(), key))
                    })?;
                    parent = Some(internal.id());
                    path.push(internal);
                    current = child;
                }
            }
        }
    }

    // ========================================================================
    // Internal: Insert and split
    // ========================================================================

    fn insert_into_leaf(
        &mut self,
        mut leaf: LeafNode,
        path: DescentPath,
        key: i32,
        value: i32,
    ) -> Result<()> {
        if leaf.insert(key, value) == InsertOutcome::Updated {
            trace!("updated key {} in leaf {}", key, leaf.id().0);
        }

        if !leaf.is_overfull(&self.layout) {
            return self.write_leaf(&leaf);
        }

        let right_id = self.store.frontier();
        let (separator, right) = leaf.split(right_id, &self.layout);
        debug!(
            "split leaf {} -> {} at key {} ({} + {} keys)",
            leaf.id().0,
            right_id.0,
            separator,
            leaf.len(),
            right.len()
        );

        // The new leaf takes the frontier block before anything else is
        // allocated.
        self.write_leaf(&right)?;
        self.write_leaf(&leaf)?;

        self.push_separator(path, leaf.id(), separator, right_id)
    }

    /// Insert `separator` → `right` above `left`, splitting upward as needed.
    fn push_separator(
        &mut self,
        mut path: DescentPath,
        mut left: BlockId,
        mut separator: i32,
        mut right: BlockId,
    ) -> Result<()> {
        loop {
            let mut parent = match path.pop() {
                Some(parent) => parent,
                None => return self.grow_root(left, separator, right),
            };

            debug!(
                "pushing separator {} -> {} into internal {}",
                separator,
                right.0,
                parent.id().0
            );
            parent.insert(separator, right);

            if !parent.is_overfull(&self.layout) {
                return self.write_internal(&parent);
            }

            let sibling_id = self.store.frontier();
            let (promoted, sibling) = parent.split(sibling_id, &self.layout);
            debug!(
                "split internal {} -> {} at key {} ({} + {} keys)",
                parent.id().0,
                sibling_id.0,
                promoted,
                parent.len(),
                sibling.len()
            );

            self.write_internal(&sibling)?;
            self.write_internal(&parent)?;

            left = parent.id();
            separator = promoted;
            right = sibling_id;
        }
    }

    /// Put a new internal root above the old root `left` and its new
    /// sibling `right`.
    fn grow_root(&mut self, left: BlockId, separator: i32, right: BlockId) -> Result<()> {
        let root_id = self.store.frontier();
        let root = InternalNode::new_root(root_id, left, separator, right, &self.layout);
        self.write_internal(&root)?;
        self.set_root(root_id, false)
    }

    fn write_leaf(&mut self, leaf: &LeafNode) -> Result<()> {
        let block = leaf.encode(&self.layout);
        self.store.write(block.as_slice(), leaf.id())
    }

    fn write_internal(&mut self, internal: &InternalNode) -> Result<()> {
        let block = internal.encode(&self.layout);
        self.store.write(block.as_slice(), internal.id())
    }
}

/// Block size recorded in an existing index file, if there is one.
fn stored_block_size(path: &Path) -> Result<Option<usize>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    // Too short to hold a header: the store truncates it and starts fresh
    if file.metadata()?.len() < TreeHeader::SIZE as u64 {
        return Ok(None);
    }

    let mut bytes = [0u8; 4];
    file.read_exact(&mut bytes)?;
    Ok(Some(i32::from_be_bytes(bytes) as u32 as usize))
}
