//! Skeleton hierarchy and bone table

use std::collections::HashMap;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::core::config::DEFAULT_MAX_BONES;
use crate::core::Error;

/// A node of the imported scene graph
///
/// Built once from the importer and immutable afterwards. Not every node is a
/// bone; intermediate nodes still contribute their rest transform to the
/// accumulated global transform of their descendants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkeletonNode {
    pub name: String,
    /// Parent-relative transform used when a clip has no channel for this node
    pub rest_transform: Mat4,
    #[serde(default)]
    pub children: Vec<SkeletonNode>,
    /// Meshes attached to this node in the source scene
    #[serde(default)]
    pub mesh_names: Vec<String>,
}

impl SkeletonNode {
    /// Create a leaf node
    pub fn new(name: impl Into<String>, rest_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            rest_transform,
            children: Vec::new(),
            mesh_names: Vec::new(),
        }
    }

    /// Append a child, builder style
    pub fn with_child(mut self, child: SkeletonNode) -> Self {
        self.children.push(child);
        self
    }

    /// Attach a mesh name, builder style
    pub fn with_mesh(mut self, mesh_name: impl Into<String>) -> Self {
        self.mesh_names.push(mesh_name.into());
        self
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SkeletonNode::node_count).sum::<usize>()
    }

    /// Depth-first search by name
    pub fn find(&self, name: &str) -> Option<&SkeletonNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Depth-first traversal carrying the accumulated parent transform
    ///
    /// `visit` receives each node with its parent's global transform and returns
    /// the node's own global transform, which becomes the parent transform of its
    /// children.
    pub fn walk<F>(&self, parent_transform: &Mat4, visit: &mut F)
    where
        F: FnMut(&SkeletonNode, &Mat4) -> Mat4,
    {
        let global_transform = visit(self, parent_transform);
        for child in &self.children {
            child.walk(&global_transform, visit);
        }
    }

    /// Global rest transforms of every node, keyed by name
    pub fn rest_globals(&self) -> HashMap<String, Mat4> {
        let mut globals = HashMap::new();
        self.walk(&Mat4::IDENTITY, &mut |node, parent| {
            let global = *parent * node.rest_transform;
            globals.insert(node.name.clone(), global);
            global
        });
        globals
    }
}

/// A skinned bone: its palette slot is its index in the [`BoneTable`]
#[derive(Clone, Debug, PartialEq)]
pub struct BoneInfo {
    pub name: String,
    /// Inverse bind pose
    pub offset_matrix: Mat4,
}

/// Name -> palette slot mapping plus per-bone offset matrices
///
/// Indices are assigned in registration order and never change.
#[derive(Clone, Debug)]
pub struct BoneTable {
    bones: Vec<BoneInfo>,
    by_name: HashMap<String, usize>,
    capacity: usize,
}

impl BoneTable {
    /// Create an empty table with the given palette capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            bones: Vec::new(),
            by_name: HashMap::new(),
            capacity,
        }
    }

    /// Register a bone and return its index
    ///
    /// Fails with `CapacityExceeded` past the palette capacity and with
    /// `InvalidArgument` for a duplicate name.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        offset_matrix: Mat4,
    ) -> Result<usize, Error> {
        let name = name.into();

        if self.by_name.contains_key(&name) {
            return Err(Error::InvalidArgument(format!("bone '{}' already exists", name)));
        }

        if self.bones.len() >= self.capacity {
            return Err(Error::CapacityExceeded {
                count: self.bones.len() + 1,
                capacity: self.capacity,
            });
        }

        let index = self.bones.len();
        self.by_name.insert(name.clone(), index);
        self.bones.push(BoneInfo { name, offset_matrix });

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a bone by index
    pub fn get(&self, index: usize) -> Option<&BoneInfo> {
        self.bones.get(index)
    }

    /// Find a bone index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoneInfo> {
        self.bones.iter()
    }
}

impl Default for BoneTable {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BONES)
    }
}

/// Static hierarchy plus bone table, shared read-only by every clip on a model
#[derive(Clone, Debug)]
pub struct Skeleton {
    root: SkeletonNode,
    bones: BoneTable,
}

impl Skeleton {
    pub fn new(root: SkeletonNode, bones: BoneTable) -> Self {
        let skeleton = Self { root, bones };

        let unreachable = skeleton
            .bones
            .iter()
            .filter(|bone| skeleton.root.find(&bone.name).is_none())
            .count();
        if unreachable > 0 {
            log::warn!(
                "{} of {} bones have no node in the hierarchy and will stay at identity",
                unreachable,
                skeleton.bones.len()
            );
        }

        skeleton
    }

    /// Build a skeleton whose offset matrices are the inverse of each bone's
    /// global rest transform, so the rest pose skins to identity
    pub fn from_rest_pose(
        root: SkeletonNode,
        bone_names: &[&str],
        capacity: usize,
    ) -> Result<Self, Error> {
        let globals = root.rest_globals();
        let mut bones = BoneTable::new(capacity);

        for name in bone_names {
            let global = globals.get(*name).ok_or_else(|| {
                Error::InvalidArgument(format!("bone '{}' is not in the hierarchy", name))
            })?;
            bones.add_bone(*name, global.inverse())?;
        }

        Ok(Self::new(root, bones))
    }

    pub fn root(&self) -> &SkeletonNode {
        &self.root
    }

    pub fn bones(&self) -> &BoneTable {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Walk the hierarchy from the root with an identity parent transform
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&SkeletonNode, &Mat4) -> Mat4,
    {
        self.root.walk(&Mat4::IDENTITY, &mut visit);
    }

    /// Skinning matrices for the rest pose (no clip applied)
    pub fn rest_pose_palette(&self) -> Vec<Mat4> {
        let mut palette = vec![Mat4::IDENTITY; self.bones.len()];
        self.walk(|node, parent| {
            let global = *parent * node.rest_transform;
            if let Some(index) = self.bones.index_of(&node.name) {
                palette[index] = global * self.bones.bones[index].offset_matrix;
            }
            global
        });
        palette
    }
}
