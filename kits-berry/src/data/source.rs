use std::borrow::Cow;
use std::path::{Path, PathBuf};

use super::SegVolume;
use crate::EvalResult;

/// 分割体数据来源: 尚未读取的文件路径, 或已在内存中的体数据.
#[derive(Debug, Clone)]
pub enum VolumeSource<'a> {
    /// nii / nii.gz 文件路径.
    Path(Cow<'a, Path>),

    /// 已加载的体数据.
    Volume(&'a SegVolume),
}

impl<'a> VolumeSource<'a> {
    /// 获得体数据. 对路径来源执行阻塞式文件读取, 失败时直接返回错误, 不重试.
    pub fn resolve(self) -> EvalResult<Cow<'a, SegVolume>> {
        match self {
            Self::Path(p) => SegVolume::open(p).map(Cow::Owned),
            Self::Volume(v) => Ok(Cow::Borrowed(v)),
        }
    }
}

impl<'a> From<&'a Path> for VolumeSource<'a> {
    #[inline]
    fn from(p: &'a Path) -> Self {
        Self::Path(Cow::Borrowed(p))
    }
}

impl<'a> From<&'a PathBuf> for VolumeSource<'a> {
    #[inline]
    fn from(p: &'a PathBuf) -> Self {
        Self::Path(Cow::Borrowed(p.as_path()))
    }
}

impl From<PathBuf> for VolumeSource<'_> {
    #[inline]
    fn from(p: PathBuf) -> Self {
        Self::Path(Cow::Owned(p))
    }
}

impl<'a> From<&'a str> for VolumeSource<'a> {
    #[inline]
    fn from(p: &'a str) -> Self {
        Self::Path(Cow::Borrowed(Path::new(p)))
    }
}

impl<'a> From<&'a SegVolume> for VolumeSource<'a> {
    #[inline]
    fn from(v: &'a SegVolume) -> Self {
        Self::Volume(v)
    }
}
