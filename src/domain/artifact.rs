//! Artifact - 产物有效性判定
//!
//! 小于最小体积的文件视为上次失败运行留下的残缺写入，
//! 不能当作缓存命中。

use std::path::Path;

/// 默认最小产物体积（字节），边界含等于
pub const DEFAULT_MIN_ARTIFACT_BYTES: u64 = 1000;

/// 产物状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// 文件不存在
    Missing,
    /// 文件存在但小于最小体积
    Truncated { size: u64 },
    /// 文件存在且体积达标
    Valid { size: u64 },
}

impl ArtifactStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ArtifactStatus::Valid { .. })
    }
}

/// 探测产物状态
///
/// `min_bytes` 为有效判定阈值：size >= min_bytes 才算有效。
pub async fn artifact_status(path: &Path, min_bytes: u64) -> ArtifactStatus {
    match tokio::fs::metadata(path).await {
        Err(_) => ArtifactStatus::Missing,
        Ok(meta) => {
            let size = meta.len();
            if size < min_bytes {
                tracing::warn!(
                    path = %path.display(),
                    size,
                    min_bytes,
                    "Audio artifact appears truncated or corrupted"
                );
                ArtifactStatus::Truncated { size }
            } else {
                ArtifactStatus::Valid { size }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.mp3");
        assert_eq!(
            artifact_status(&path, DEFAULT_MIN_ARTIFACT_BYTES).await,
            ArtifactStatus::Missing
        );
    }

    #[tokio::test]
    async fn test_threshold_boundary_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();

        let small = dir.path().join("small.mp3");
        tokio::fs::write(&small, vec![0u8; 999]).await.unwrap();
        assert_eq!(
            artifact_status(&small, 1000).await,
            ArtifactStatus::Truncated { size: 999 }
        );

        let exact = dir.path().join("exact.mp3");
        tokio::fs::write(&exact, vec![0u8; 1000]).await.unwrap();
        assert_eq!(
            artifact_status(&exact, 1000).await,
            ArtifactStatus::Valid { size: 1000 }
        );
    }

    #[tokio::test]
    async fn test_is_valid_helper() {
        assert!(ArtifactStatus::Valid { size: 4096 }.is_valid());
        assert!(!ArtifactStatus::Truncated { size: 12 }.is_valid());
        assert!(!ArtifactStatus::Missing.is_valid());
    }
}
