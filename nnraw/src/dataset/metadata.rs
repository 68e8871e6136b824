use crate::{PrepError, Result};
use json::JsonValue;
use std::fs;
use std::path::Path;

/// `dataset.json`的内容。字段名与下游训练框架的约定保持一致。
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetMetadata {
    /// 通道序号 -> 通道名，如`"0" -> "L"`。
    pub channel_names: Vec<(String, String)>,
    /// 类别名 -> 像素值，如`"background" -> 0`。
    pub labels: Vec<(String, u32)>,
    pub num_training: usize,
    pub file_ending: String,
    pub overwrite_image_reader_writer: Option<String>,
}

impl Default for DatasetMetadata {
    fn default() -> Self {
        Self {
            channel_names: vec![("0".to_string(), "L".to_string())],
            labels: vec![("background".to_string(), 0), ("axons".to_string(), 1)],
            num_training: 0,
            file_ending: ".png".to_string(),
            overwrite_image_reader_writer: None,
        }
    }
}

impl DatasetMetadata {
    pub fn to_json(&self) -> JsonValue {
        let mut channel_names = JsonValue::new_object();
        for (index, name) in self.channel_names.iter() {
            channel_names[index.as_str()] = name.as_str().into();
        }
        let mut labels = JsonValue::new_object();
        for (name, value) in self.labels.iter() {
            labels[name.as_str()] = (*value).into();
        }

        let mut root = JsonValue::new_object();
        root["channel_names"] = channel_names;
        root["labels"] = labels;
        root["numTraining"] = self.num_training.into();
        root["file_ending"] = self.file_ending.as_str().into();
        if let Some(ref rw) = self.overwrite_image_reader_writer {
            root["overwrite_image_reader_writer"] = rw.as_str().into();
        }
        root
    }

    /// 写入`path`，4 空格缩进。
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json().pretty(4)).map_err(PrepError::io(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metadata_json() {
        let meta = DatasetMetadata {
            num_training: 5,
            ..Default::default()
        };
        assert_eq!(
            meta.to_json().dump(),
            r#"{"channel_names":{"0":"L"},"labels":{"background":0,"axons":1},"numTraining":5,"file_ending":".png"}"#
        );
    }

    #[test]
    fn test_reader_writer_override() {
        let meta = DatasetMetadata {
            overwrite_image_reader_writer: Some("NaturalImage2DIO".to_string()),
            ..Default::default()
        };
        let v = meta.to_json();
        assert_eq!(v["overwrite_image_reader_writer"], "NaturalImage2DIO");
        assert_eq!(v["numTraining"], 0);
    }

    #[test]
    fn test_write_and_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let meta = DatasetMetadata {
            num_training: 3,
            labels: vec![("background".into(), 0), ("myelin".into(), 1), ("axon".into(), 2)],
            ..Default::default()
        };
        meta.write(&path).unwrap();
        let parsed = json::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["labels"]["axon"], 2);
        assert_eq!(parsed["channel_names"]["0"], "L");
        assert_eq!(parsed["file_ending"], ".png");
        assert!(parsed["overwrite_image_reader_writer"].is_null());
    }
}
