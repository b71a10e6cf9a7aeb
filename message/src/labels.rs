//! Code → Japanese label tables for the enumerated questionnaire fields.

/// Static `(code, label)` pairs for one enumerated field.
pub type LabelTable = &'static [(&'static str, &'static str)];

pub static GENDER: LabelTable = &[
    ("male", "男性"),
    ("female", "女性"),
    ("other", "その他"),
    ("no_answer", "無回答"),
];

pub static OCCUPATION: LabelTable = &[
    ("employee", "会社員"),
    ("executive", "会社役員"),
    ("public_servant", "公務員"),
    ("self_employed", "自営業"),
    ("homemaker", "主夫・主婦"),
    ("part_time", "アルバイト"),
    ("student", "学生"),
    ("other", "その他"),
];

pub static LIVING_ISSUES: LabelTable = &[
    ("mortgage", "住宅ローン"),
    ("unsecured_loan", "無担保ローン"),
    ("inheritance", "相続"),
    ("rent", "離婚"),
    ("other", "その他"),
];

pub static PROPERTY_TYPES: LabelTable = &[
    ("land", "土地"),
    ("house", "戸建"),
    ("apartment", "マンション"),
];

pub static DEBT_STATUS: LabelTable = &[
    ("no_delinquency", "滞納無し"),
    ("delinquent", "滞納中"),
    ("repayment_not_started", "競売開始決定済み"),
];

/// Looks up a code in a label table. Callers fall back to the raw code when
/// the table has no entry, so unknown codes display literally.
pub fn label_for(table: LabelTable, code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, label)| *label)
}
