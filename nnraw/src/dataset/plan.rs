//! 重命名计划：先计算全部 (旧路径 -> 新路径)，检查冲突后再执行。

use super::layout::DatasetLayout;
use super::pairing::Sample;
use super::CHANNEL_SUFFIX;
use crate::prep::imgio::file_name;
use crate::{PrepError, Result};
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// 训练图像的位置命名：`<case>_<idx:03>_0000<ext>`。
#[inline]
pub fn image_name(case_name: &str, index: usize, file_ending: &str) -> String {
    format!("{case_name}_{index:03}{CHANNEL_SUFFIX}{file_ending}")
}

/// 标签的位置命名：`<case>_<idx:03><ext>`。
#[inline]
pub fn label_name(case_name: &str, index: usize, file_ending: &str) -> String {
    format!("{case_name}_{index:03}{file_ending}")
}

/// 一次文件移动。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Move {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// 一组尚未执行的移动。
#[derive(Clone, Debug, Default)]
pub struct RenamePlan {
    moves: Vec<Move>,
}

impl RenamePlan {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, from: PathBuf, to: PathBuf) {
        self.moves.push(Move { from, to });
    }

    #[inline]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// 按配对表顺序为每对样本分配从 1 开始的连续编号。
    /// 第`i`个样本对应`moves[2i]`（图像）与`moves[2i + 1]`（标签）。
    pub fn for_samples(
        samples: &[Sample],
        layout: &DatasetLayout,
        case_name: &str,
        file_ending: &str,
    ) -> Self {
        let mut plan = Self::new();
        for (i, sample) in samples.iter().enumerate() {
            let index = i + 1;
            plan.push(
                sample.image.clone(),
                layout.images_tr.join(image_name(case_name, index, file_ending)),
            );
            plan.push(
                sample.label.clone(),
                layout.labels_tr.join(label_name(case_name, index, file_ending)),
            );
        }
        plan
    }

    /// 检查冲突：目标重复，或目标已存在且不是本计划中的某个源文件。
    pub fn validate(&self) -> Result<()> {
        let sources: HashSet<&PathBuf> = self.moves.iter().map(|m| &m.from).collect();
        let mut targets = HashSet::with_capacity(self.moves.len());
        for m in self.moves.iter() {
            if !targets.insert(&m.to) || (m.to.exists() && !sources.contains(&m.to)) {
                return Err(PrepError::PlanCollision {
                    target: m.to.clone(),
                });
            }
        }
        Ok(())
    }

    /// 执行计划。源与目标可以互相交叠，因此先全部移到临时名，再移到最终名。
    pub fn apply(&self) -> Result<()> {
        let staged: Vec<PathBuf> = self
            .moves
            .iter()
            .enumerate()
            .map(|(i, m)| m.from.with_file_name(format!(".{i}.{}.renaming", file_name(&m.from))))
            .collect();
        for (m, tmp) in self.moves.iter().zip(staged.iter()) {
            fs::rename(&m.from, tmp).map_err(PrepError::io(&m.from))?;
        }
        for (m, tmp) in self.moves.iter().zip(staged.iter()) {
            fs::rename(tmp, &m.to).map_err(PrepError::io(&m.to))?;
            debug!("`{}` -> `{}`", m.from.display(), m.to.display());
        }
        Ok(())
    }
}

/// 以一个计划重命名配对表中的全部图像与标签，并更新表中路径。
pub fn rename_samples(
    samples: &mut [Sample],
    layout: &DatasetLayout,
    case_name: &str,
    file_ending: &str,
) -> Result<()> {
    let plan = RenamePlan::for_samples(samples, layout, case_name, file_ending);
    plan.validate()?;
    plan.apply()?;
    for (sample, pair) in samples.iter_mut().zip(plan.moves().chunks_exact(2)) {
        sample.image = pair[0].to.clone();
        sample.label = pair[1].to.clone();
    }
    Ok(())
}
