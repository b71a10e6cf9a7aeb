//! Pure payload → email formatting.

use crate::labels::{self, LabelTable};
use crate::payload::SubmissionPayload;

/// Rendered in place of anything the user left blank.
pub const PLACEHOLDER: &str = "未入力";

/// Separator between multi-select entries.
const LIST_SEPARATOR: &str = "、";

/// Subject and plain-text body for the notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

/// Missing or empty → placeholder, otherwise the value itself.
pub fn as_display_value(value: Option<&str>) -> String {
    match value {
        None | Some("") => PLACEHOLDER.to_string(),
        Some(value) => value.to_string(),
    }
}

/// Entries joined with `、`, or the placeholder for an empty selection.
pub fn as_display_list(values: &[String]) -> String {
    if values.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        values.join(LIST_SEPARATOR)
    }
}

/// Like [`as_display_value`], with the code translated through a label table.
/// Codes absent from the table display literally.
pub fn map_value(value: Option<&str>, table: LabelTable) -> String {
    match value {
        None | Some("") => PLACEHOLDER.to_string(),
        Some(code) => labels::label_for(table, code).unwrap_or(code).to_string(),
    }
}

/// Like [`as_display_list`], with each entry translated through a label table.
pub fn map_value_list(values: &[String], table: LabelTable) -> String {
    if values.is_empty() {
        return PLACEHOLDER.to_string();
    }
    values
        .iter()
        .map(|code| labels::label_for(table, code).unwrap_or(code).to_string())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Trims both parts and joins the non-empty ones with a single space.
pub fn format_full_name(last: Option<&str>, first: Option<&str>) -> String {
    let last = last.map(str::trim).unwrap_or("");
    let first = first.map(str::trim).unwrap_or("");
    match (last.is_empty(), first.is_empty()) {
        (true, true) => PLACEHOLDER.to_string(),
        (false, true) => last.to_string(),
        (true, false) => first.to_string(),
        (false, false) => format!("{last} {first}"),
    }
}

/// Builds the notification email: fixed subject, fixed line order.
pub fn create_email_message(payload: &SubmissionPayload) -> EmailMessage {
    let subject = "アンケートが送信されました".to_string();
    let lines = [
        "以下の内容でアンケートを受け付けました。".to_string(),
        String::new(),
        format!(
            "名前：{}",
            format_full_name(payload.last_name.as_deref(), payload.first_name.as_deref())
        ),
        format!(
            "名前（フリガナ）：{}",
            format_full_name(
                payload.last_name_kana.as_deref(),
                payload.first_name_kana.as_deref()
            )
        ),
        format!("郵便番号：{}", as_display_value(payload.postal_code.as_deref())),
        format!("都道府県：{}", as_display_value(payload.prefecture.as_deref())),
        format!("市区町村：{}", as_display_value(payload.city.as_deref())),
        format!("番地：{}", as_display_value(payload.street.as_deref())),
        format!(
            "建物名・部屋番号：{}",
            as_display_value(payload.building.as_deref())
        ),
        format!("電話：{}", as_display_value(payload.phone.as_deref())),
        format!(
            "メールアドレス：{}",
            as_display_value(payload.email.as_deref())
        ),
        format!(
            "性別：{}",
            map_value(payload.gender.as_deref(), labels::GENDER)
        ),
        format!(
            "ご職業：{}",
            map_value(payload.occupation.as_deref(), labels::OCCUPATION)
        ),
        format!("業種：{}", as_display_value(payload.industry.as_deref())),
        format!(
            "現在のお困り事（複数選択）：{}",
            map_value_list(&payload.living_issues, labels::LIVING_ISSUES)
        ),
        format!(
            "物件種別（複数選択）：{}",
            map_value_list(&payload.property_types, labels::PROPERTY_TYPES)
        ),
        format!("敷地（㎡）：{}", as_display_value(payload.site_area.as_deref())),
        format!(
            "築年数：{}",
            as_display_value(payload.building_age.as_deref())
        ),
        format!(
            "ローン残債（万円）：{}",
            as_display_value(payload.loan_balance.as_deref())
        ),
        format!(
            "債務状況：{}",
            map_value(payload.debt_status.as_deref(), labels::DEBT_STATUS)
        ),
        format!(
            "滞納期間：{}",
            as_display_value(payload.delinquency_period.as_deref())
        ),
        "その他、ご質問・ご相談事項：".to_string(),
        as_display_value(payload.notes.as_deref()),
    ];

    EmailMessage {
        subject,
        body: lines.join("\n"),
    }
}
