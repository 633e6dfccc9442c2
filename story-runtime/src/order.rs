//! # Order 模块
//!
//! 定义脚本中单条指令（订单）的数据模型。
//!
//! ## 设计说明
//!
//! - [`OrderData`] 保持与表格数据源一致的"宽行"结构：字段含义由
//!   [`OrderType`] 决定，与当前类型无关的字段一律为零值/空串
//! - 类型化的载荷提取（如 [`OrderData::choice_options`]）收敛在本模块，
//!   各 Handler 只通过这些方法读取与自己相关的字段，避免跨类型误用
//! - 所有类型可序列化，便于宿主层做缓存与存档

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::OrderError;

/// 订单类型
///
/// 决定该条订单由哪个 Handler 执行，同时决定其余字段的语义。
/// 表格单元格解析失败时取默认值 `Start`（与数据源的零值约定一致）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderType {
    /// 开始（整体淡入）
    #[default]
    Start,
    /// 角色台词
    Talk,
    /// 地之文・说明文
    Descriptive,
    /// 角色登场
    CharacterEntry,
    /// 角色立绘切换
    CharacterChange,
    /// 角色退场
    CharacterExit,
    /// 背景切换
    ChangeBackground,
    /// BGM 切换（交叉淡化）
    ChangeBgm,
    /// 停止 BGM
    StopBgm,
    /// 播放音效
    PlaySe,
    /// 显示蒸镜（全屏静态图）
    ShowSteel,
    /// 隐藏蒸镜
    HideSteel,
    /// 显示对话框
    ShowDialog,
    /// 隐藏对话框
    HideDialog,
    /// 特殊演出（二级分发，见 [`EffectKind`]）
    Effect,
    /// 等待
    Wait,
    /// 选择分支
    Choice,
    /// 相机震动
    CameraShake,
    /// 淡入
    FadeIn,
    /// 淡出
    FadeOut,
    /// 灯光变更（数据中存在，但未注册 Handler）
    ChangeLighting,
    /// 结束
    End,
}

impl FromStr for OrderType {
    type Err = ();

    /// 从表格单元格解析（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "talk" => Ok(Self::Talk),
            "descriptive" => Ok(Self::Descriptive),
            "characterentry" => Ok(Self::CharacterEntry),
            "characterchange" => Ok(Self::CharacterChange),
            "characterexit" => Ok(Self::CharacterExit),
            "changebackground" => Ok(Self::ChangeBackground),
            "changebgm" => Ok(Self::ChangeBgm),
            "stopbgm" => Ok(Self::StopBgm),
            "playse" => Ok(Self::PlaySe),
            "showsteel" => Ok(Self::ShowSteel),
            "hidesteel" => Ok(Self::HideSteel),
            "showdialog" => Ok(Self::ShowDialog),
            "hidedialog" => Ok(Self::HideDialog),
            "effect" => Ok(Self::Effect),
            "wait" => Ok(Self::Wait),
            "choice" => Ok(Self::Choice),
            "camerashake" => Ok(Self::CameraShake),
            "fadein" => Ok(Self::FadeIn),
            "fadeout" => Ok(Self::FadeOut),
            "changelighting" => Ok(Self::ChangeLighting),
            "end" => Ok(Self::End),
            _ => Err(()),
        }
    }
}

/// 序列类型
///
/// 标记一条订单是开启新的独立计时组（`Append`），
/// 还是与前序订单同组同步演出（`Sequential`，默认）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SequenceType {
    /// 开启新组
    Append,
    /// 并入当前组
    #[default]
    Sequential,
}

impl FromStr for SequenceType {
    type Err = ();

    /// 从表格单元格解析（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "sequential" => Ok(Self::Sequential),
            _ => Err(()),
        }
    }
}

/// 角色立绘槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharacterPosition {
    /// 左侧
    Left,
    /// 中央
    #[default]
    Center,
    /// 右侧
    Right,
    /// 近左
    NearLeft,
    /// 近右
    NearRight,
    /// 远左
    FarLeft,
    /// 远右
    FarRight,
}

impl FromStr for CharacterPosition {
    type Err = ();

    /// 从表格单元格解析（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "middle" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "nearleft" => Ok(Self::NearLeft),
            "nearright" => Ok(Self::NearRight),
            "farleft" => Ok(Self::FarLeft),
            "farright" => Ok(Self::FarRight),
            _ => Err(()),
        }
    }
}

/// 角色表情差分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FacialExpression {
    /// 常态
    #[default]
    Neutral,
    /// 微笑
    Smile,
    /// 悲伤
    Sad,
    /// 愤怒
    Angry,
    /// 惊讶
    Surprised,
    /// 困扰
    Troubled,
}

impl FromStr for FacialExpression {
    type Err = ();

    /// 从表格单元格解析（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "neutral" => Ok(Self::Neutral),
            "smile" => Ok(Self::Smile),
            "sad" => Ok(Self::Sad),
            "angry" => Ok(Self::Angry),
            "surprised" => Ok(Self::Surprised),
            "troubled" => Ok(Self::Troubled),
            _ => Err(()),
        }
    }
}

/// Effect 订单的二级演出类型
///
/// Effect 订单复用 `speaker_id` 字段存放演出编号（从 1 开始），
/// 由 Effect Handler 内部的注册表二次分发。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// 画面闪光
    Flash,
    /// 播放粒子效果
    PlayParticle,
    /// 停止粒子效果
    StopParticle,
    /// 眩晕效果
    Dizziness,
}

impl EffectKind {
    /// 从演出编号解析
    pub fn from_id(id: i32) -> Result<Self, OrderError> {
        match id {
            1 => Ok(Self::Flash),
            2 => Ok(Self::PlayParticle),
            3 => Ok(Self::StopParticle),
            4 => Ok(Self::Dizziness),
            _ => Err(OrderError::UnknownEffectKind { id }),
        }
    }
}

/// 选择分支的一个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchOption {
    /// 选项显示文本
    pub label: String,
    /// 跳转目标订单序号
    pub target_index: usize,
}

/// 一条订单的宽行数据
///
/// 与表格数据源保持字段级兼容：`order_type` 决定哪些字段有意义，
/// 其余字段为零值/空串。构造后不再修改。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderData {
    /// 所属部 ID（出处标识，不参与运行时查找）
    pub part_id: i32,
    /// 所属章 ID
    pub chapter_id: i32,
    /// 所属场景 ID
    pub scene_id: i32,
    /// 表格内的订单编号
    pub order_index: i32,
    /// 订单类型
    pub order_type: OrderType,
    /// 序列类型
    pub sequence: SequenceType,
    /// 说话者 ID（Effect 订单复用为演出编号）
    pub speaker_id: i32,
    /// 文本载荷（Choice 订单复用为选项编码）
    pub dialog_text: String,
    /// 显示名覆盖（Flash 演出复用为颜色十六进制串）
    pub override_display_name: String,
    /// 素材路径
    pub file_path: String,
    /// 角色槽位
    pub position: CharacterPosition,
    /// 表情差分
    pub facial_expression: FacialExpression,
    /// 文字速度覆盖（多个订单类型复用为数值参数）
    pub override_text_speed: f32,
    /// 演出时长（秒）
    pub duration: f32,
}

impl OrderData {
    /// 解析 Choice 订单的选项编码
    ///
    /// `dialog_text` 的格式为 `"文本,目标序号,文本,目标序号,…"`。
    /// 格式错误会同步返回 [`OrderError`]，让脚本错误在制作期立刻暴露，
    /// 而不是默默跳转到错误的位置。
    pub fn choice_options(&self) -> Result<Vec<BranchOption>, OrderError> {
        let fields: Vec<&str> = self.dialog_text.split(',').map(str::trim).collect();

        if fields.is_empty() || fields.len() % 2 != 0 || fields[0].is_empty() {
            return Err(OrderError::MalformedChoicePayload {
                payload: self.dialog_text.clone(),
            });
        }

        fields
            .chunks(2)
            .map(|pair| {
                let target_index =
                    pair[1]
                        .parse::<usize>()
                        .map_err(|_| OrderError::InvalidBranchTarget {
                            value: pair[1].to_string(),
                        })?;
                Ok(BranchOption {
                    label: pair[0].to_string(),
                    target_index,
                })
            })
            .collect()
    }

    /// 解析 Effect 订单的演出类型
    ///
    /// `speaker_id` 字段在 Effect 订单中复用为演出编号。
    pub fn effect_kind(&self) -> Result<EffectKind, OrderError> {
        EffectKind::from_id(self.speaker_id)
    }

    /// 计算文本订单的逐字显示时长（秒）
    ///
    /// 单字速度优先取 `override_text_speed`，为零时回退到配置默认值。
    pub fn reveal_duration(&self, default_text_speed: f32) -> f32 {
        let per_char = if self.override_text_speed != 0.0 {
            self.override_text_speed
        } else {
            default_text_speed
        };
        self.dialog_text.chars().count() as f32 * per_char
    }

    /// 显示名：覆盖值非空时使用覆盖值
    pub fn display_name(&self) -> Option<&str> {
        if self.override_display_name.is_empty() {
            None
        } else {
            Some(&self.override_display_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice_order(payload: &str) -> OrderData {
        OrderData {
            order_type: OrderType::Choice,
            dialog_text: payload.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_order_type_from_str() {
        assert_eq!(OrderType::from_str("Talk"), Ok(OrderType::Talk));
        assert_eq!(OrderType::from_str("TALK"), Ok(OrderType::Talk));
        assert_eq!(OrderType::from_str("ChangeBGM"), Ok(OrderType::ChangeBgm));
        assert_eq!(OrderType::from_str("PlaySE"), Ok(OrderType::PlaySe));
        assert_eq!(OrderType::from_str("unknown"), Err(()));

        // 零值约定：默认类型为 Start
        assert_eq!(OrderType::default(), OrderType::Start);
    }

    #[test]
    fn test_sequence_type_default_is_sequential() {
        assert_eq!(SequenceType::default(), SequenceType::Sequential);
        assert_eq!(SequenceType::from_str("append"), Ok(SequenceType::Append));
    }

    #[test]
    fn test_effect_kind_from_id() {
        assert_eq!(EffectKind::from_id(1), Ok(EffectKind::Flash));
        assert_eq!(EffectKind::from_id(4), Ok(EffectKind::Dizziness));
        assert_eq!(
            EffectKind::from_id(99),
            Err(OrderError::UnknownEffectKind { id: 99 })
        );
    }

    #[test]
    fn test_choice_options_round_trip() {
        let order = choice_order("Go left,4,Go right,9");
        let options = order.choice_options().unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Go left");
        assert_eq!(options[0].target_index, 4);
        assert_eq!(options[1].label, "Go right");
        assert_eq!(options[1].target_index, 9);
    }

    #[test]
    fn test_choice_options_malformed_odd_fields() {
        // 字段数为奇数：缺少最后一个跳转目标
        let order = choice_order("Go left,4,Go right");
        assert!(matches!(
            order.choice_options(),
            Err(OrderError::MalformedChoicePayload { .. })
        ));
    }

    #[test]
    fn test_choice_options_malformed_empty() {
        let order = choice_order("");
        assert!(matches!(
            order.choice_options(),
            Err(OrderError::MalformedChoicePayload { .. })
        ));
    }

    #[test]
    fn test_choice_options_invalid_target() {
        let order = choice_order("Go left,four");
        assert!(matches!(
            order.choice_options(),
            Err(OrderError::InvalidBranchTarget { .. })
        ));
    }

    #[test]
    fn test_reveal_duration() {
        let order = OrderData {
            order_type: OrderType::Talk,
            dialog_text: "你好世界".to_string(),
            ..Default::default()
        };

        // 无覆盖时使用默认速度
        assert!((order.reveal_duration(0.05) - 0.2).abs() < f32::EPSILON);

        // 覆盖速度优先
        let order = OrderData {
            override_text_speed: 0.1,
            ..order
        };
        assert!((order.reveal_duration(0.05) - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_display_name_override() {
        let order = OrderData::default();
        assert_eq!(order.display_name(), None);

        let order = OrderData {
            override_display_name: "？？？".to_string(),
            ..Default::default()
        };
        assert_eq!(order.display_name(), Some("？？？"));
    }

    #[test]
    fn test_order_data_serialization() {
        let order = OrderData {
            order_type: OrderType::Talk,
            sequence: SequenceType::Append,
            speaker_id: 3,
            dialog_text: "你好".to_string(),
            duration: 1.5,
            ..Default::default()
        };

        let json = serde_json::to_string(&order).unwrap();
        let deserialized: OrderData = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
