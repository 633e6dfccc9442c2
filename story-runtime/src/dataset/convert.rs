//! # Convert 模块
//!
//! 把原始表格行转换为订单数据。
//!
//! ## 设计说明
//!
//! - 列的定位靠表头名而不是列序号：表格加列/调列不破坏转换
//! - 单元格缺失或为空一律取零值；枚举列内容无法解析时记 warn
//!   并取默认值，不让单行脏数据打断整表转换

use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

use super::RawSheet;
use crate::error::ConvertError;
use crate::order::OrderData;
use crate::table::OrderTable;

/// 表头列名（与数据表约定一致，匹配时不区分大小写）
mod column {
    pub const PART_ID: &str = "PartId";
    pub const CHAPTER_ID: &str = "ChapterId";
    pub const SCENE_ID: &str = "SceneId";
    pub const ORDER_INDEX: &str = "OrderIndex";
    pub const ORDER_TYPE: &str = "OrderType";
    pub const SEQUENCE: &str = "SequenceType";
    pub const SPEAKER_ID: &str = "SpeakerId";
    pub const DIALOG_TEXT: &str = "DialogText";
    pub const OVERRIDE_DISPLAY_NAME: &str = "OverrideDisplayName";
    pub const FILE_PATH: &str = "FilePath";
    pub const POSITION: &str = "Position";
    pub const FACIAL_EXPRESSION: &str = "FacialExpression";
    pub const OVERRIDE_TEXT_SPEED: &str = "OverrideTextSpeed";
    pub const DURATION: &str = "Duration";
}

/// 场景数据转换器
///
/// 先 [`load_header`](Self::load_header) 建立列索引，之后可转换任意多行。
#[derive(Debug, Default)]
pub struct SceneDataConverter {
    columns: Option<HashMap<String, usize>>,
}

impl SceneDataConverter {
    /// 创建未加载表头的转换器
    pub fn new() -> Self {
        Self::default()
    }

    /// 从表头行建立列名到列序号的索引
    pub fn load_header(&mut self, header: &[String]) -> Result<(), ConvertError> {
        if header.is_empty() {
            return Err(ConvertError::EmptyHeader);
        }

        let mut columns = HashMap::with_capacity(header.len());
        for (index, name) in header.iter().enumerate() {
            columns.insert(name.trim().to_ascii_lowercase(), index);
        }
        self.columns = Some(columns);
        Ok(())
    }

    /// 转换一行数据
    ///
    /// 表头尚未加载时报错；行内缺失/为空的单元格取零值。
    pub fn convert_row(&self, row: &[String]) -> Result<OrderData, ConvertError> {
        let columns = self.columns.as_ref().ok_or(ConvertError::HeaderNotLoaded)?;

        let cell = |name: &str| -> &str {
            columns
                .get(&name.to_ascii_lowercase())
                .and_then(|&index| row.get(index))
                .map(|s| s.trim())
                .unwrap_or("")
        };

        Ok(OrderData {
            part_id: parse_or_zero(cell(column::PART_ID)),
            chapter_id: parse_or_zero(cell(column::CHAPTER_ID)),
            scene_id: parse_or_zero(cell(column::SCENE_ID)),
            order_index: parse_or_zero(cell(column::ORDER_INDEX)),
            order_type: parse_enum(cell(column::ORDER_TYPE), column::ORDER_TYPE),
            sequence: parse_enum(cell(column::SEQUENCE), column::SEQUENCE),
            speaker_id: parse_or_zero(cell(column::SPEAKER_ID)),
            dialog_text: cell(column::DIALOG_TEXT).to_string(),
            override_display_name: cell(column::OVERRIDE_DISPLAY_NAME).to_string(),
            file_path: cell(column::FILE_PATH).to_string(),
            position: parse_enum(cell(column::POSITION), column::POSITION),
            facial_expression: parse_enum(
                cell(column::FACIAL_EXPRESSION),
                column::FACIAL_EXPRESSION,
            ),
            override_text_speed: parse_or_zero(cell(column::OVERRIDE_TEXT_SPEED)),
            duration: parse_or_zero(cell(column::DURATION)),
        })
    }

    /// 转换整张表
    ///
    /// 完全空白的行直接丢弃（表格末尾常见的占位行）。
    pub fn convert_sheet(sheet: &RawSheet) -> Result<OrderTable, ConvertError> {
        let mut converter = Self::new();
        converter.load_header(&sheet.header)?;

        let mut orders = Vec::with_capacity(sheet.rows.len());
        for row in &sheet.rows {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            orders.push(converter.convert_row(row)?);
        }
        Ok(OrderTable::new(orders))
    }
}

/// 数值单元格：空串与解析失败一律取零值
fn parse_or_zero<T: FromStr + Default>(cell: &str) -> T {
    cell.parse().unwrap_or_default()
}

/// 枚举单元格：空串取默认值，非空但无法解析时记 warn 并取默认值
fn parse_enum<T>(cell: &str, column: &str) -> T
where
    T: FromStr + Default,
{
    if cell.is_empty() {
        return T::default();
    }
    match cell.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(target: "story::convert", column, cell, "无法解析的枚举单元格，取默认值");
            T::default()
        }
    }
}
