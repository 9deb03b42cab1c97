//! 基於 SM3 的默克爾樹：存在性與不存在性證明
//!
//! # 哈希規則
//!
//! - 葉子節點: `H(0x00 || record)`
//! - 內部節點: `H(0x01 || left || right)`
//! - 某層節點數為奇數時，最後一個節點與自己配對
//!
//! 前綴確保葉子哈希與內部節點哈希不會互相碰撞。
//!
//! # 存在性證明
//!
//! 證明是從葉子到根的兄弟節點哈希序列，加上葉子索引:
//! - 索引第 i 位為 0: 當前節點在左邊, `current = H(current || sibling)`
//! - 索引第 i 位為 1: 當前節點在右邊, `current = H(sibling || current)`
//!
//! # 不存在性證明
//!
//! 要求葉子按摘要（原始字節的字典序）非遞減排列。目標記錄的摘要在排序序列中的
//! 插入位置 `pos` 兩側的鄰居各附一份存在性證明；左鄰居摘要嚴格小於目標、
//! 右鄰居摘要嚴格大於目標，即可證明目標不在樹中。
//!
//! 對未排序的樹請求不存在性證明會返回 `MerkleError::UnsortedLeaves`。

use sm3_engine::{Digest, Sm3};
use tracing::{debug, warn};

/// 葉子節點哈希前綴
pub const LEAF_PREFIX: [u8; 1] = [0];

/// 內部節點哈希前綴
pub const INNER_PREFIX: [u8; 1] = [1];

/// 默克爾根類型別名
pub type MerkleRoot = Digest;

/// 計算葉子節點的哈希
///
/// # 示例
///
/// ```
/// use merkle_prover::crypto::merkle::hash_leaf;
///
/// let leaf_hash = hash_leaf(b"record");
/// assert_eq!(leaf_hash.len(), 32);
/// assert_eq!(leaf_hash, hash_leaf(b"record"));
/// ```
pub fn hash_leaf(data: &[u8]) -> Digest {
    let mut hasher = Sm3::new();
    hasher.update(&LEAF_PREFIX);
    hasher.update(data);
    hasher.finalize()
}

/// 計算內部節點的哈希 `H(0x01 || left || right)`
pub fn hash_node(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sm3::new();
    hasher.update(&INNER_PREFIX);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize()
}

/// 給定葉子數時，存在性證明的路徑長度（樹高減一）
pub fn proof_depth(leaf_count: u64) -> usize {
    let mut width = leaf_count;
    let mut depth = 0;
    while width > 1 {
        width = (width + 1) / 2;
        depth += 1;
    }
    depth
}

/// 葉子摘要是否按字典序非遞減排列
pub fn is_digest_sorted(leaves: &[Digest]) -> bool {
    first_unsorted(leaves).is_none()
}

fn first_unsorted(leaves: &[Digest]) -> Option<usize> {
    leaves.windows(2).position(|pair| pair[0] > pair[1]).map(|i| i + 1)
}

/// 沿證明路徑逐層向上折疊
fn fold_path(leaf_hash: Digest, leaf_index: u64, path: &[Digest]) -> Digest {
    let mut current_hash = leaf_hash;
    let mut index = leaf_index;

    for sibling in path {
        if index & 1 == 0 {
            current_hash = hash_node(&current_hash, sibling);
        } else {
            current_hash = hash_node(sibling, &current_hash);
        }
        index >>= 1;
    }

    current_hash
}

/// 默克爾樹相關錯誤
#[derive(Debug, thiserror::Error)]
pub enum MerkleError {
    /// 空數據無法構建樹
    #[error("Cannot build tree from empty data")]
    EmptyData,

    /// 無效的葉子索引
    #[error("Invalid leaf index: {index} (total leaves: {total})")]
    InvalidLeafIndex { index: usize, total: usize },

    /// 葉子未按摘要排序，無法生成不存在性證明
    #[error("Leaves are not sorted by digest (first out-of-order leaf at index {index})")]
    UnsortedLeaves { index: usize },
}

/// 存在性證明
///
/// # 示例
///
/// ```
/// use merkle_prover::crypto::merkle::{hash_leaf, hash_node, InclusionProof};
///
/// let l0 = hash_leaf(b"leaf0");
/// let l1 = hash_leaf(b"leaf1");
/// let root = hash_node(&l0, &l1);
///
/// let proof = InclusionProof::new(vec![l1], 0);
/// assert!(proof.verify(b"leaf0", &root, 2));
/// assert!(!proof.verify(b"wrong_data", &root, 2));
/// // 葉子數由驗證方給出，路徑長度或索引不符都會失敗
/// assert!(!proof.verify(b"leaf0", &root, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionProof {
    /// 從葉子到根的兄弟節點哈希，path[0] 是葉子的兄弟
    pub path: Vec<Digest>,

    /// 葉子索引（用於確定每層左右位置）
    pub leaf_index: u64,
}

impl InclusionProof {
    pub fn new(path: Vec<Digest>, leaf_index: u64) -> Self {
        Self { path, leaf_index }
    }

    /// 證明深度（樹高減一）
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// 驗證記錄屬於根為 `root`、共 `leaf_count` 個葉子的樹
    ///
    /// 只需要根與葉子數。索引必須小於 `leaf_count`，路徑長度必須等於
    /// `proof_depth(leaf_count)`；否則只在自配對層不同的索引會折疊出同一個根。
    pub fn verify(&self, record: &[u8], root: &MerkleRoot, leaf_count: u64) -> bool {
        self.verify_leaf_hash(hash_leaf(record), root, leaf_count)
    }

    /// 以葉子哈希而非原始記錄驗證
    pub fn verify_leaf_hash(
        &self,
        leaf_hash: Digest,
        root: &MerkleRoot,
        leaf_count: u64,
    ) -> bool {
        self.leaf_index < leaf_count
            && self.path.len() == proof_depth(leaf_count)
            && &fold_path(leaf_hash, self.leaf_index, &self.path) == root
    }
}

/// 不存在性證明中的一側鄰居
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborProof {
    /// 鄰居的原始記錄，驗證方據此重算摘要
    pub record: Vec<u8>,

    /// 鄰居的存在性證明
    pub proof: InclusionProof,
}

impl NeighborProof {
    pub fn leaf_hash(&self) -> Digest {
        hash_leaf(&self.record)
    }
}

/// 不存在性證明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionProof {
    /// 目標摘要在排序葉子中的插入位置（第一個摘要 >= 目標的索引）
    pub position: u64,

    /// `position - 1` 處的鄰居，`position == 0` 時為空
    pub left: Option<NeighborProof>,

    /// `position` 處的鄰居，`position == leaf_count` 時為空
    pub right: Option<NeighborProof>,
}

/// 驗證一側鄰居：索引、存在性、以及與目標的嚴格順序
fn verify_neighbor(
    neighbor: &NeighborProof,
    expected_index: u64,
    leaf_count: u64,
    root: &MerkleRoot,
    ordered: impl Fn(&Digest) -> bool,
) -> bool {
    let leaf_hash = neighbor.leaf_hash();
    neighbor.proof.leaf_index == expected_index
        && neighbor.proof.verify_leaf_hash(leaf_hash, root, leaf_count)
        && ordered(&leaf_hash)
}

/// 只憑根與葉子數驗證不存在性證明
///
/// 任何一項檢查失敗都返回 `false`。
pub fn verify_exclusion(
    root: &MerkleRoot,
    leaf_count: u64,
    record: &[u8],
    proof: &ExclusionProof,
) -> bool {
    let pos = proof.position;
    if leaf_count == 0 || pos > leaf_count {
        return false;
    }

    let target = hash_leaf(record);

    let left_ok = match (pos > 0, &proof.left) {
        (true, Some(left)) => {
            verify_neighbor(left, pos - 1, leaf_count, root, |leaf| leaf < &target)
        }
        (false, None) => true,
        _ => false,
    };

    let right_ok = match (pos < leaf_count, &proof.right) {
        (true, Some(right)) => {
            verify_neighbor(right, pos, leaf_count, root, |leaf| leaf > &target)
        }
        (false, None) => true,
        _ => false,
    };

    left_ok && right_ok
}

/// 默克爾樹
///
/// 構建後不可變；layers[0] 為葉子層，最後一層只有根。
#[derive(Debug, Clone)]
pub struct MerkleTree {
    layers: Vec<Vec<Digest>>,
    records: Vec<Vec<u8>>,
    root: MerkleRoot,
    /// 第一個破壞摘要順序的葉子索引
    first_unsorted: Option<usize>,
}

impl MerkleTree {
    /// 按輸入順序構建默克爾樹
    ///
    /// # 示例
    ///
    /// ```
    /// use merkle_prover::crypto::merkle::MerkleTree;
    ///
    /// let tree = MerkleTree::build(&[b"a", b"b", b"c"]).unwrap();
    /// let proof = tree.prove_inclusion(2).unwrap();
    ///
    /// assert!(tree.verify_inclusion(b"c", 2, &proof));
    /// assert!(proof.verify(b"c", &tree.root(), 3));
    /// ```
    pub fn build<R: AsRef<[u8]>>(records: &[R]) -> Result<Self, MerkleError> {
        let leaves = records.iter().map(|r| hash_leaf(r.as_ref())).collect();
        let records = records.iter().map(|r| r.as_ref().to_vec()).collect();
        Self::from_leaves(leaves, records)
    }

    /// 先按葉子摘要排序再構建，結果可用於不存在性證明
    pub fn build_sorted<R: AsRef<[u8]>>(records: &[R]) -> Result<Self, MerkleError> {
        let mut keyed: Vec<(Digest, Vec<u8>)> = records
            .iter()
            .map(|r| (hash_leaf(r.as_ref()), r.as_ref().to_vec()))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let (leaves, records) = keyed.into_iter().unzip();
        Self::from_leaves(leaves, records)
    }

    fn from_leaves(leaves: Vec<Digest>, records: Vec<Vec<u8>>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyData);
        }

        let first_unsorted = first_unsorted(&leaves);
        let mut layers = vec![leaves];

        loop {
            let current_layer = &layers[layers.len() - 1];
            if current_layer.len() <= 1 {
                break;
            }

            // 奇數節點：最後一個與自己配對
            let next_layer: Vec<Digest> = current_layer
                .chunks(2)
                .map(|pair| hash_node(&pair[0], pair.get(1).unwrap_or(&pair[0])))
                .collect();

            layers.push(next_layer);
        }

        let root = layers[layers.len() - 1][0];

        debug!(
            "Built Merkle tree: leaves={}, height={}, sorted={}",
            records.len(),
            layers.len(),
            first_unsorted.is_none()
        );

        Ok(MerkleTree {
            layers,
            records,
            root,
            first_unsorted,
        })
    }

    /// 獲取 Merkle 根
    pub fn root(&self) -> MerkleRoot {
        self.root
    }

    /// 獲取葉子總數
    pub fn leaf_count(&self) -> usize {
        self.records.len()
    }

    /// 層數（含葉子層與根）
    pub fn height(&self) -> usize {
        self.layers.len()
    }

    /// 獲取所有葉子的哈希
    pub fn leaf_hashes(&self) -> &[Digest] {
        &self.layers[0]
    }

    /// 按樹中順序獲取記錄
    pub fn record(&self, index: usize) -> Option<&[u8]> {
        self.records.get(index).map(Vec::as_slice)
    }

    /// 葉子是否按摘要排序
    pub fn is_sorted(&self) -> bool {
        self.first_unsorted.is_none()
    }

    /// 記錄是否是樹的葉子
    pub fn contains(&self, record: &[u8]) -> bool {
        let target = hash_leaf(record);
        if self.is_sorted() {
            self.leaf_hashes().binary_search(&target).is_ok()
        } else {
            self.leaf_hashes().contains(&target)
        }
    }

    /// 生成指定葉子的存在性證明
    ///
    /// # 錯誤
    /// - `InvalidLeafIndex`: 索引超出 `[0, leaf_count)`
    pub fn prove_inclusion(&self, leaf_index: usize) -> Result<InclusionProof, MerkleError> {
        if leaf_index >= self.leaf_count() {
            return Err(MerkleError::InvalidLeafIndex {
                index: leaf_index,
                total: self.leaf_count(),
            });
        }

        let mut path = Vec::with_capacity(self.layers.len() - 1);
        let mut current_index = leaf_index;

        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_index = if current_index % 2 == 0 {
                current_index + 1
            } else {
                current_index - 1
            };

            // 最後一個奇數節點的兄弟是自己
            path.push(*layer.get(sibling_index).unwrap_or(&layer[current_index]));

            current_index /= 2;
        }

        Ok(InclusionProof::new(path, leaf_index as u64))
    }

    /// 用本樹的根驗證存在性證明，索引由調用方給出
    pub fn verify_inclusion(&self, record: &[u8], index: usize, proof: &InclusionProof) -> bool {
        index < self.leaf_count()
            && proof.depth() == self.height() - 1
            && fold_path(hash_leaf(record), index as u64, &proof.path) == self.root
    }

    /// 生成不存在性證明
    ///
    /// 若記錄實際存在，返回的證明不會通過驗證。
    ///
    /// # 錯誤
    /// - `UnsortedLeaves`: 樹不是按摘要排序構建的
    pub fn prove_exclusion(&self, record: &[u8]) -> Result<ExclusionProof, MerkleError> {
        if let Some(index) = self.first_unsorted {
            warn!(
                "Refusing exclusion proof: leaf {} breaks digest order",
                index
            );
            return Err(MerkleError::UnsortedLeaves { index });
        }
        debug_assert!(is_digest_sorted(self.leaf_hashes()));

        let target = hash_leaf(record);
        let pos = self.leaf_hashes().partition_point(|leaf| leaf < &target);

        let left = if pos > 0 {
            Some(self.neighbor(pos - 1)?)
        } else {
            None
        };
        let right = if pos < self.leaf_count() {
            Some(self.neighbor(pos)?)
        } else {
            None
        };

        debug!(
            "Exclusion proof: position={}, left={}, right={}",
            pos,
            left.is_some(),
            right.is_some()
        );

        Ok(ExclusionProof {
            position: pos as u64,
            left,
            right,
        })
    }

    fn neighbor(&self, index: usize) -> Result<NeighborProof, MerkleError> {
        Ok(NeighborProof {
            record: self.records[index].clone(),
            proof: self.prove_inclusion(index)?,
        })
    }

    /// 用本樹的根與葉子數驗證不存在性證明
    pub fn verify_exclusion(&self, record: &[u8], proof: &ExclusionProof) -> bool {
        verify_exclusion(&self.root, self.leaf_count() as u64, record, proof)
    }
}
