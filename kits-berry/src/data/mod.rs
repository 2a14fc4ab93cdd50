use std::collections::BTreeSet;
use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView, Ix3};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use num::ToPrimitive;

use crate::{EvalError, EvalResult, Idx3d, Spacing3d};

mod source;

pub use source::VolumeSource;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 将 (x, y, z) 转换成 (z, y, x). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [x, y, z]. 体素个数数组.
    let [_, x, y, z, ..] = h.dim;
    (z as usize, y as usize, x as usize)
}

/// 体素间距是否合法 (有限正数).
#[inline]
fn is_valid_spacing(spacing: &Spacing3d) -> bool {
    spacing.iter().all(|s| s.is_finite() && *s > 0.0)
}

/// 3D nii 文件 header 的共用属性.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 按文件头原生顺序 `[x, y, z]` 获取体素间距, 以毫米为单位.
    #[inline]
    fn pix_dim_native(&self) -> [f64; 3] {
        let [_, x, y, z, ..] = self.header().pixdim;
        [x as f64, y as f64, z as f64]
    }

    /// 按数组索引顺序 `[z, y, x]` 获取体素间距, 以毫米为单位.
    ///
    /// nifti 文件头以最快变化轴在前的顺序存储间距, 而体数据以最慢变化轴在前的顺序索引,
    /// 因此这里将原生顺序逆序.
    #[inline]
    fn spacing(&self) -> Spacing3d {
        let mut s = self.pix_dim_native();
        s.reverse();
        s
    }

    /// 体素分辨率在三个维度上是否是各向同的?
    #[inline]
    fn is_isotropic(&self) -> bool {
        let [z, y, x] = self.spacing();
        z == y && z == x
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.spacing().iter().product()
    }
}

/// nii 格式 3D 分割标签图 (预测或真值), 包括 header 和标签数据. 标签值以 `u8` 保存.
#[derive(Debug, Clone)]
pub struct SegVolume {
    header: BoxedHeader,
    data: Array3<u8>,
}

impl NiftiHeaderAttr for SegVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for SegVolume {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl SegVolume {
    /// 打开 nii (或 nii.gz) 文件格式的 3D 分割. `path` 为文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> EvalResult<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // [x, y, z] -> [z, y, x]
        let data = obj
            .into_volume()
            .into_ndarray::<u8>()?
            .into_dimensionality::<Ix3>()?
            .permuted_axes([2, 1, 0]);

        // The nature of nifti data field layout.
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());
        debug_assert_eq!(data.dim(), get_shape_from_header(&header));

        Ok(Self { header, data })
    }

    /// 根据裸标签数据和体素间距直接创建实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 \[z, y, x\] 格式存储.
    /// 2. `spacing` 按照 \[z, y, x\] 格式存储, 必须全为有限正数,
    ///   否则返回 `Err(EvalError::InvalidSpacing)`.
    /// 3. 每一维长度不能超过 `u16::MAX`, 否则返回 `Err(EvalError::VolumeTooLarge)`.
    pub fn from_array(data: Array3<u8>, spacing: Spacing3d) -> EvalResult<Self> {
        if !is_valid_spacing(&spacing) {
            return Err(EvalError::InvalidSpacing(spacing));
        }

        let shape = data.dim();
        let dim = |n: usize| u16::try_from(n).map_err(|_| EvalError::VolumeTooLarge(shape));
        let (z, y, x) = shape;

        let mut header = Box::<NiftiHeader>::default();
        header.dim = [3, dim(x)?, dim(y)?, dim(z)?, 1, 1, 1, 1];
        let [_, px, py, pz, ..] = &mut header.pixdim;
        let [sz, sy, sx] = spacing;
        (*px, *py, *pz) = (sx as f32, sy as f32, sz as f32);

        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        Ok(Self { header, data })
    }

    /// 与 [`Self::from_array`] 相同, 但接受任意整数类型的标签数据.
    ///
    /// 若某个体素值无法表示为 `u8`, 返回 `Err(EvalError::InvalidLabel)`.
    pub fn from_labels<T: ToPrimitive>(
        data: ArrayView<'_, T, Ix3>,
        spacing: Spacing3d,
    ) -> EvalResult<Self> {
        let mut buf = Vec::with_capacity(data.len());
        for (pos, p) in data.indexed_iter() {
            buf.push(p.to_u8().ok_or(EvalError::InvalidLabel(pos))?);
        }
        // 形状与 `buf` 长度一致, 不会失败.
        let arr = Array3::from_shape_vec(data.dim(), buf)?;
        Self::from_array(arr, spacing)
    }

    /// 将该分割保存为 nii (或 nii.gz) 文件.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> EvalResult<()> {
        // [z, y, x] -> [x, y, z]
        let native = self.data.view().permuted_axes([2, 1, 0]);
        WriterOptions::new(path.as_ref())
            .reference_header(&self.header)
            .write_nifti(&native)?;
        Ok(())
    }

    /// 获取数据形状 `(z, y, x)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取数据体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_data(self) -> Array3<u8> {
        self.data
    }

    /// 获取值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 获取出现过的所有标签值 (包括背景), 升序排列.
    pub fn labels_present(&self) -> Vec<u8> {
        self.data
            .iter()
            .copied()
            .collect::<BTreeSet<u8>>()
            .into_iter()
            .collect()
    }
}
