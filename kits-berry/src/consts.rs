//! 通用常量.

/// 单通道标签值.
pub mod gray {
    /// KiTS 数据集中, 背景的体素值.
    pub const KITS_BACKGROUND: u8 = 0;

    /// KiTS 数据集中, 肾脏的体素值.
    pub const KITS_KIDNEY: u8 = 1;

    /// KiTS 数据集中, 肿瘤的体素值.
    pub const KITS_TUMOR: u8 = 2;

    /// KiTS 数据集中, 囊肿的体素值.
    pub const KITS_CYST: u8 = 3;

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, KITS_BACKGROUND)
    }

    /// 体素是否是肾脏?
    #[inline]
    pub const fn is_kidney(p: u8) -> bool {
        matches!(p, KITS_KIDNEY)
    }

    /// 体素是否是肿瘤?
    #[inline]
    pub const fn is_tumor(p: u8) -> bool {
        matches!(p, KITS_TUMOR)
    }

    /// 体素是否是囊肿?
    #[inline]
    pub const fn is_cyst(p: u8) -> bool {
        matches!(p, KITS_CYST)
    }

    /// 体素是否是肿块 (肿瘤或囊肿)?
    #[inline]
    pub const fn is_mass(p: u8) -> bool {
        matches!(p, KITS_TUMOR | KITS_CYST)
    }

    /// 体素是否是肾脏或肿块?
    #[inline]
    pub const fn is_kidney_or_mass(p: u8) -> bool {
        matches!(p, KITS_KIDNEY | KITS_TUMOR | KITS_CYST)
    }
}

/// 原始标签名称.
pub const KITS_LABEL_NAMES: [(u8, &str); 3] = [
    (gray::KITS_KIDNEY, "kidney"),
    (gray::KITS_TUMOR, "tumor"),
    (gray::KITS_CYST, "cyst"),
];

/// 获取原始标签 `label` 的名称. 背景或未知标签返回 `None`.
pub fn label_name(label: u8) -> Option<&'static str> {
    KITS_LABEL_NAMES
        .iter()
        .find_map(|&(l, name)| (l == label).then_some(name))
}

/// 由多个单结构掩码合成标签图时的放置顺序: 先肾脏, 再囊肿, 最后肿瘤.
///
/// 顺序靠后的标签会覆盖与之重叠的靠前标签.
pub const LABEL_AGGREGATION_ORDER: [u8; 3] =
    [gray::KITS_KIDNEY, gray::KITS_CYST, gray::KITS_TUMOR];

/// 指标表的列名. 第 0 列为 Dice, 第 1 列为表面 Dice.
pub const METRIC_NAME_LIST: [&str; 2] = ["Dice", "SD"];

/// 各 HEC 的表面距离容差, 以毫米为单位. 由 KiTS 官方对标注者间差异统计得出.
pub mod tolerance {
    /// `kidney_and_mass` 的容差.
    pub const KIDNEY_AND_MASS_MM: f64 = 1.0330772532390826;

    /// `mass` 的容差.
    pub const MASS_MM: f64 = 1.1328796488598762;

    /// `tumor` 的容差.
    pub const TUMOR_MM: f64 = 1.1498198361434828;
}
