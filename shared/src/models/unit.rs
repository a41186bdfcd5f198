//! Unit Model

use serde::{Deserialize, Serialize};

/// Property unit entity (房产单元)
///
/// 两条创建路径写入的字段集不同：legacy `createUnit` 使用
/// unitName/unitDetails/developer/amount/sqft，`createUnitWithForceFolder`
/// 使用 name/unitNumber/project/type/area/purchaseValue 等。统一为
/// Option 字段以保持对两种历史记录的读兼容。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub investor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rental: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// 单元专属 Drive 文件夹 (懒创建，首次归档文档时补齐)
    pub google_drive_folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_drive_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_creation_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Unit {
    /// 展示名 - 新字段 `name` 优先，回落到 legacy `unitName`
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.unit_name.as_deref())
            .unwrap_or("")
    }

    /// Drive 文件夹名: "Name (UnitNumber)"，无 unitNumber 时仅为 Name
    pub fn folder_name(&self) -> String {
        match self.unit_number.as_deref().filter(|n| !n.is_empty()) {
            Some(number) => format!("{} ({})", self.display_name(), number),
            None => self.display_name().to_string(),
        }
    }

    /// 是否计入 portfolio — purchaseValue > 0 的单元才算持仓
    pub fn in_portfolio(&self) -> bool {
        self.purchase_value.unwrap_or(0.0) > 0.0
    }
}

/// Clean projection for UI dropdowns (下拉框只显示简单名称)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitProjection {
    pub id: String,
    pub unit_name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqft: Option<String>,
    pub google_drive_folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub dropdown_label: String,
    pub full_details: String,
    /// 是否计入持仓 (purchaseValue > 0)
    pub in_portfolio: bool,
}

impl From<&Unit> for UnitProjection {
    fn from(unit: &Unit) -> Self {
        let name = unit.display_name().to_string();
        let full_details = unit.unit_details.clone().unwrap_or_else(|| {
            format!(
                "{} - {} sqft",
                unit.developer.as_deref().unwrap_or(""),
                unit.sqft.as_deref().unwrap_or("")
            )
        });
        Self {
            id: unit.id.clone(),
            unit_name: name.clone(),
            display_name: name.clone(),
            unit_details: unit.unit_details.clone(),
            developer: unit.developer.clone(),
            amount: unit.amount,
            sqft: unit.sqft.clone(),
            google_drive_folder_id: unit.google_drive_folder_id.clone(),
            created_at: unit.created_at.clone(),
            dropdown_label: name,
            full_details,
            in_portfolio: unit.in_portfolio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(purchase_value: Option<f64>) -> Unit {
        Unit {
            id: "u1".into(),
            investor_id: "inv-1".into(),
            name: Some("Marina Heights".into()),
            unit_name: None,
            unit_number: None,
            project: None,
            unit_type: None,
            area: None,
            unit_details: None,
            developer: None,
            amount: None,
            sqft: None,
            current_value: None,
            purchase_value,
            monthly_rental: None,
            occupancy_status: None,
            location: None,
            google_drive_folder_id: None,
            google_drive_error: None,
            folder_creation_attempts: None,
            created_at: None,
        }
    }

    #[test]
    fn zero_purchase_value_stays_out_of_portfolio() {
        let mut unit = unit(Some(0.0));
        assert!(!unit.in_portfolio());
        assert!(!UnitProjection::from(&unit).in_portfolio);

        unit.purchase_value = Some(250000.0);
        assert!(unit.in_portfolio());
        assert!(UnitProjection::from(&unit).in_portfolio);
    }

    #[test]
    fn missing_purchase_value_counts_as_zero() {
        assert!(!unit(None).in_portfolio());
    }
}
