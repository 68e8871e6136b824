//! 数据集转换流水线。
//!
//! 阶段顺序固定（后一阶段消费前一阶段的输出）：
//!
//! 1. 校验源目录；
//! 2. 建立配对表；
//! 3. `Convert`: 转换为单通道 PNG；
//! 4. `Binarize`: 标签二值化；
//! 5. `Verify`: 标签二值性校验（只警告）；
//! 6. `Rename`: 按位置重命名；
//! 7. `Split`: 移出测试样本；
//! 8. `Metadata`: 写入`dataset.json`。
//!
//! 3-8 可以单独关闭。中途失败不会回滚，输出目录需要手动清理。

use super::layout::DatasetLayout;
use super::metadata::DatasetMetadata;
use super::pairing::{pair_sources, Sample};
use super::plan::rename_samples;
use crate::prep::imgio::{self, file_name, DecodeOptions, IMAGE_EXTENSIONS};
use crate::prep::{pixel, AccTimer};
use crate::verify::VerificationReport;
use crate::{PrepError, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 可开关的流水线阶段。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Stage {
    Convert,
    Binarize,
    Verify,
    Rename,
    Split,
    Metadata,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Convert,
        Stage::Binarize,
        Stage::Verify,
        Stage::Rename,
        Stage::Split,
        Stage::Metadata,
    ];

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Stage::Convert => "convert",
            Stage::Binarize => "binarize",
            Stage::Verify => "verify",
            Stage::Rename => "rename",
            Stage::Split => "split",
            Stage::Metadata => "metadata",
        }
    }
}

/// 各阶段的开关，默认全部开启。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Stages {
    enabled: [bool; 6],
}

impl Default for Stages {
    fn default() -> Self {
        Self { enabled: [true; 6] }
    }
}

impl Stages {
    #[inline]
    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.enabled[stage as usize]
    }

    #[inline]
    pub fn set(&mut self, stage: Stage, on: bool) {
        self.enabled[stage as usize] = on;
    }

    /// 关闭`skip`中的阶段。
    pub fn without<I: IntoIterator<Item = Stage>>(mut self, skip: I) -> Self {
        skip.into_iter().for_each(|s| self.set(s, false));
        self
    }
}

/// 转换参数。全部由调用者提供，不从数据推断。
#[derive(Clone, Debug)]
pub struct ConvertConfig {
    pub dataset_id: u16,
    pub case_name: String,
    /// 输入根目录下的训练图像子目录名。
    pub images_subdir: String,
    /// 输入根目录下的标注子目录名。
    pub labels_subdir: String,
    /// 标签文件主干名相对图像的后缀。
    pub label_suffix: String,
    /// 读取的源文件扩展名。
    pub extensions: Vec<String>,
    /// 输出文件扩展名（含点号）。
    pub file_ending: String,
    pub channel_names: Vec<(String, String)>,
    pub labels: Vec<(String, u32)>,
    /// 写入`numTraining`的数量；`None`时使用划分后实际的训练样本数。
    pub num_training: Option<usize>,
    /// 移入测试集的样本数。
    pub num_test: usize,
    pub reader_writer: Option<String>,
    pub stages: Stages,
    pub decode: DecodeOptions,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        let meta = DatasetMetadata::default();
        Self {
            dataset_id: 1,
            case_name: "axones".to_string(),
            images_subdir: "Images_entrainement".to_string(),
            labels_subdir: "Images_annotees".to_string(),
            label_suffix: "_annotee".to_string(),
            extensions: IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            file_ending: meta.file_ending,
            channel_names: meta.channel_names,
            labels: meta.labels,
            num_training: None,
            num_test: 1,
            reader_writer: None,
            stages: Stages::default(),
            decode: DecodeOptions::default(),
        }
    }
}

/// 转换结果。
#[derive(Debug)]
pub struct ConvertReport {
    pub layout: DatasetLayout,
    /// 留在训练集中的样本。
    pub training: Vec<Sample>,
    /// 移入测试集的图像。
    pub test: Vec<PathBuf>,
    /// 因无法读取而排除的源文件。
    pub skipped: Vec<(PathBuf, PrepError)>,
    pub verification: Option<VerificationReport>,
    pub metadata: Option<DatasetMetadata>,
}

/// 将`input_root`下的图像与标注转换为`output_root/Dataset<ID>_<case>`。
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    input_root: P,
    output_root: Q,
    cfg: &ConvertConfig,
) -> Result<ConvertReport> {
    Pipeline::new(input_root.as_ref(), output_root.as_ref(), cfg)?.run()
}

struct Pipeline<'a> {
    cfg: &'a ConvertConfig,
    images_dir: PathBuf,
    labels_dir: PathBuf,
    layout: DatasetLayout,
    samples: Vec<Sample>,
    test: Vec<PathBuf>,
    skipped: Vec<(PathBuf, PrepError)>,
    verification: Option<VerificationReport>,
    metadata: Option<DatasetMetadata>,
    timer: AccTimer,
}

impl<'a> Pipeline<'a> {
    fn new(input_root: &Path, output_root: &Path, cfg: &'a ConvertConfig) -> Result<Self> {
        // 转换阶段只输出 PNG，扩展名必须与编码一致。
        if !cfg.file_ending.eq_ignore_ascii_case(".png") {
            return Err(PrepError::InvalidConfig {
                reason: format!(
                    "file ending `{}` does not match the PNG output",
                    cfg.file_ending
                ),
            });
        }
        let images_dir = input_root.join(&cfg.images_subdir);
        let labels_dir = input_root.join(&cfg.labels_subdir);
        for dir in [&images_dir, &labels_dir] {
            if !dir.is_dir() {
                return Err(PrepError::SourceMissing { path: dir.clone() });
            }
            if imgio::list_files(dir, &cfg.extensions)?.is_empty() {
                return Err(PrepError::SourceEmpty { path: dir.clone() });
            }
        }
        Ok(Self {
            cfg,
            images_dir,
            labels_dir,
            layout: DatasetLayout::new(output_root, cfg.dataset_id, &cfg.case_name),
            samples: Vec::new(),
            test: Vec::new(),
            skipped: Vec::new(),
            verification: None,
            metadata: None,
            timer: AccTimer::new(),
        })
    }

    fn run(mut self) -> Result<ConvertReport> {
        self.samples = pair_sources(
            &self.images_dir,
            &self.labels_dir,
            &self.cfg.label_suffix,
            &self.cfg.extensions,
        )?;
        if self.samples.is_empty() {
            return Err(PrepError::SourceEmpty {
                path: self.labels_dir.clone(),
            });
        }
        info!("配对样本数: {}", self.samples.len());
        self.layout.create()?;
        if !self.cfg.stages.is_enabled(Stage::Convert) {
            // 假定输出目录中已经是转换好的同名文件。
            self.locate_converted();
        }

        for stage in Stage::ALL {
            if !self.cfg.stages.is_enabled(stage) {
                info!("跳过阶段`{}`", stage.name());
                continue;
            }
            self.timer.start();
            match stage {
                Stage::Convert => {
                    self.convert_all()?;
                    if self.samples.is_empty() {
                        return Err(PrepError::SourceEmpty {
                            path: self.images_dir.clone(),
                        });
                    }
                }
                Stage::Binarize => self.binarize_labels()?,
                Stage::Verify => self.verify_labels(),
                Stage::Rename => rename_samples(
                    &mut self.samples,
                    &self.layout,
                    &self.cfg.case_name,
                    &self.cfg.file_ending,
                )?,
                Stage::Split => self.split()?,
                Stage::Metadata => self.write_metadata()?,
            }
            info!(
                "阶段`{}`完成，耗时 {} ms",
                stage.name(),
                self.timer.elapsed().as_millis()
            );
        }
        info!(
            "转换结束: 训练 {} 对, 测试 {} 张, 跳过 {} 个, 共耗时 {} ms",
            self.samples.len(),
            self.test.len(),
            self.skipped.len(),
            self.timer.get_total_ms()
        );

        Ok(ConvertReport {
            layout: self.layout,
            training: self.samples,
            test: self.test,
            skipped: self.skipped,
            verification: self.verification,
            metadata: self.metadata,
        })
    }

    #[inline]
    fn converted_name(&self, src: &Path) -> String {
        format!("{}{}", imgio::file_stem(src), self.cfg.file_ending)
    }

    fn locate_converted(&mut self) {
        for i in 0..self.samples.len() {
            let image = self.layout.images_tr.join(self.converted_name(&self.samples[i].image));
            let label = self.layout.labels_tr.join(self.converted_name(&self.samples[i].label));
            self.samples[i].image = image;
            self.samples[i].label = label;
        }
    }

    fn convert_one(&self, src: &Path, dst_dir: &Path) -> Result<PathBuf> {
        let img = imgio::decode_luma(src, &self.cfg.decode)?;
        let out = dst_dir.join(self.converted_name(src));
        imgio::save_png(&img, &out)?;
        Ok(out)
    }

    /// 图像与标签都转换成功的样本才保留。
    fn convert_all(&mut self) -> Result<()> {
        let samples = std::mem::take(&mut self.samples);
        for sample in samples {
            info!("转换样本`{}`...", sample.key);
            let image = match self.convert_one(&sample.image, &self.layout.images_tr) {
                Ok(p) => p,
                Err(e) => {
                    self.skip(&sample.image, e)?;
                    continue;
                }
            };
            let label = match self.convert_one(&sample.label, &self.layout.labels_tr) {
                Ok(p) => p,
                Err(e) => {
                    fs::remove_file(&image).map_err(PrepError::io(&image))?;
                    self.skip(&sample.label, e)?;
                    continue;
                }
            };
            self.samples.push(Sample {
                key: sample.key,
                image,
                label,
            });
        }
        Ok(())
    }

    fn skip(&mut self, path: &Path, e: PrepError) -> Result<()> {
        if !e.is_per_file() {
            return Err(e);
        }
        warn!("跳过`{}`: {e}", path.display());
        self.skipped.push((path.to_path_buf(), e));
        Ok(())
    }

    fn binarize_labels(&mut self) -> Result<()> {
        for sample in self.samples.iter() {
            let mut img = imgio::decode_luma(&sample.label, &self.cfg.decode)?;
            pixel::binarize(&mut img);
            imgio::save_png(&img, &sample.label)?;
        }
        Ok(())
    }

    fn verify_labels(&mut self) {
        let mut report = VerificationReport::default();
        for sample in self.samples.iter() {
            report.check_file(&sample.label, &self.cfg.decode);
        }
        if report.is_clean() {
            info!("{} 个标签均为二值图像", report.checked);
        } else {
            warn!(
                "{} 个标签中有 {} 个不是二值图像, {} 个无法读取",
                report.checked + report.unreadable.len(),
                report.violations.len(),
                report.unreadable.len()
            );
        }
        self.verification = Some(report);
    }

    /// 按（重命名后的）图像文件名取前`num_test`个样本移入测试集，并删除其标签。
    fn split(&mut self) -> Result<()> {
        let num_test = self.cfg.num_test.min(self.samples.len());
        if num_test > 0 && num_test == self.samples.len() {
            warn!("全部 {num_test} 个样本都将被移入测试集");
        }
        self.samples
            .sort_by(|a, b| file_name(&a.image).cmp(&file_name(&b.image)));
        // 先检查全部目标，避免覆盖已有的测试图像。
        for sample in self.samples[..num_test].iter() {
            let dst = self.layout.images_ts.join(file_name(&sample.image));
            if dst.exists() {
                return Err(PrepError::PlanCollision { target: dst });
            }
        }
        for sample in self.samples.drain(..num_test) {
            let dst = self.layout.images_ts.join(file_name(&sample.image));
            fs::rename(&sample.image, &dst).map_err(PrepError::io(&sample.image))?;
            fs::remove_file(&sample.label).map_err(PrepError::io(&sample.label))?;
            info!("`{}`移入测试集", file_name(&dst));
            self.test.push(dst);
        }
        Ok(())
    }

    fn write_metadata(&mut self) -> Result<()> {
        let meta = DatasetMetadata {
            channel_names: self.cfg.channel_names.clone(),
            labels: self.cfg.labels.clone(),
            num_training: self.cfg.num_training.unwrap_or(self.samples.len()),
            file_ending: self.cfg.file_ending.clone(),
            overwrite_image_reader_writer: self.cfg.reader_writer.clone(),
        };
        if meta.num_training != self.samples.len() {
            warn!(
                "numTraining 为 {}，但训练集实际有 {} 对样本",
                meta.num_training,
                self.samples.len()
            );
        }
        meta.write(self.layout.metadata_path())?;
        self.metadata = Some(meta);
        Ok(())
    }
}
