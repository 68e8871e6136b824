use crate::{PrepError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 训练图像子目录。
pub const IMAGES_TR: &str = "imagesTr";
/// 训练标签子目录。
pub const LABELS_TR: &str = "labelsTr";
/// 测试图像子目录。
pub const IMAGES_TS: &str = "imagesTs";
/// 元数据文件名。
pub const DATASET_JSON: &str = "dataset.json";

/// `Dataset<ID>_<case>/{imagesTr,labelsTr,imagesTs}`目录结构。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatasetLayout {
    pub root: PathBuf,
    pub images_tr: PathBuf,
    pub labels_tr: PathBuf,
    pub images_ts: PathBuf,
}

impl DatasetLayout {
    /// 数据集目录名，编号补齐为三位。
    #[inline]
    pub fn dataset_name(dataset_id: u16, case_name: &str) -> String {
        format!("Dataset{dataset_id:03}_{case_name}")
    }

    /// 在`output_root`下定位数据集目录（不创建）。
    pub fn new<P: AsRef<Path>>(output_root: P, dataset_id: u16, case_name: &str) -> Self {
        Self::at(output_root.as_ref().join(Self::dataset_name(dataset_id, case_name)))
    }

    /// 以已有的数据集根目录定位各子目录。
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        Self {
            images_tr: root.join(IMAGES_TR),
            labels_tr: root.join(LABELS_TR),
            images_ts: root.join(IMAGES_TS),
            root,
        }
    }

    /// 创建全部目录。
    pub fn create(&self) -> Result<()> {
        for dir in [&self.images_tr, &self.labels_tr, &self.images_ts] {
            fs::create_dir_all(dir).map_err(PrepError::io(dir))?;
        }
        Ok(())
    }

    #[inline]
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(DATASET_JSON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_names() {
        let layout = DatasetLayout::new("/data/raw", 7, "axones");
        assert_eq!(layout.root, Path::new("/data/raw/Dataset007_axones"));
        assert_eq!(layout.images_tr, Path::new("/data/raw/Dataset007_axones/imagesTr"));
        assert_eq!(layout.labels_tr, Path::new("/data/raw/Dataset007_axones/labelsTr"));
        assert_eq!(layout.images_ts, Path::new("/data/raw/Dataset007_axones/imagesTs"));
        assert_eq!(
            layout.metadata_path(),
            Path::new("/data/raw/Dataset007_axones/dataset.json")
        );
        assert_eq!(DatasetLayout::dataset_name(123, "x"), "Dataset123_x");
    }

    #[test]
    fn test_layout_create() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path(), 1, "c");
        layout.create().unwrap();
        assert!(layout.images_tr.is_dir());
        assert!(layout.labels_tr.is_dir());
        assert!(layout.images_ts.is_dir());
    }
}
